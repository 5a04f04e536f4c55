// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Equi-joins over key columns
//!
//! Every join takes one or more key columns per side and returns the matching
//! row index pairs as a [`JoinResult`]. Input columns are only read.

pub mod config;
mod hash_join;
pub mod keys;
mod sort_join;
mod utils;

use std::time::Instant;

use arrow::datatypes::{
    Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type, UInt32Type,
    UInt64Type, UInt8Type,
};
use log::info;

pub use config::{JoinAlgorithm, JoinConfig, JoinContext, JoinType, NullEquality};
pub use utils::{JoinIndices, JoinResult, NO_MATCH};

use crate::data_types::Type;
use crate::error::{Code, CylonError, CylonResult};
use crate::join::keys::{JoinKey, SideKeys};
use crate::memory::MemoryReservation;
use crate::table::{Column, Table};

/// Bind `$T` to the Arrow primitive type of `$dtype` and evaluate `$body`
macro_rules! dispatch_native_type {
    ($dtype:expr, $T:ident => $body:expr) => {
        match $dtype {
            Type::Int8 => {
                type $T = Int8Type;
                $body
            }
            Type::Int16 => {
                type $T = Int16Type;
                $body
            }
            Type::Int32 => {
                type $T = Int32Type;
                $body
            }
            Type::Int64 => {
                type $T = Int64Type;
                $body
            }
            Type::UInt8 => {
                type $T = UInt8Type;
                $body
            }
            Type::UInt16 => {
                type $T = UInt16Type;
                $body
            }
            Type::UInt32 => {
                type $T = UInt32Type;
                $body
            }
            Type::UInt64 => {
                type $T = UInt64Type;
                $body
            }
            Type::Float => {
                type $T = Float32Type;
                $body
            }
            Type::Double => {
                type $T = Float64Type;
                $body
            }
        }
    };
}

/// Inner join on one or more key columns per side
pub fn inner_join(left: &[Column], right: &[Column], ctx: &JoinContext) -> CylonResult<JoinResult> {
    join(left, right, JoinType::Inner, ctx)
}

/// Left join on one or more key columns per side
///
/// Every left row appears at least once; rows without a partner are paired
/// with [`NO_MATCH`].
pub fn left_join(left: &[Column], right: &[Column], ctx: &JoinContext) -> CylonResult<JoinResult> {
    join(left, right, JoinType::Left, ctx)
}

/// Full outer join of two single key columns with the sort strategy
///
/// The output holds the left join rows followed by a block of the right rows
/// that matched nothing, each paired with [`NO_MATCH`] on the left.
pub fn outer_join(left: &Column, right: &Column) -> CylonResult<JoinResult> {
    outer_join_with_context(left, right, &JoinContext::sort())
}

/// Full outer join of two single key columns
pub fn outer_join_with_context(
    left: &Column,
    right: &Column,
    ctx: &JoinContext,
) -> CylonResult<JoinResult> {
    join(
        std::slice::from_ref(left),
        std::slice::from_ref(right),
        JoinType::FullOuter,
        ctx,
    )
}

/// Join two sets of key columns
///
/// Full outer joins accept a single key column per side only.
pub fn join(
    left: &[Column],
    right: &[Column],
    join_type: JoinType,
    ctx: &JoinContext,
) -> CylonResult<JoinResult> {
    let (left_rows, right_rows) = validate(left, right)?;
    if join_type == JoinType::FullOuter && left.len() > 1 {
        return Err(CylonError::NotImplemented(format!(
            "full outer join on {} key columns, only single column outer joins are supported",
            left.len()
        )));
    }

    let t1 = Instant::now();
    let exec = ctx.context();
    let null_equality = ctx.null_equality();
    let mut reservation = MemoryReservation::new(exec.get_memory_pool(), "join keys");

    let indices = if left.len() == 1 {
        let parallel = exec.parallel_config();
        dispatch_native_type!(left[0].data_type(), T => {
            let l = keys::build_single::<T>(&left[0], null_equality, parallel, &mut reservation)?;
            let r = keys::build_single::<T>(&right[0], null_equality, parallel, &mut reservation)?;
            run(&l, &r, join_type, ctx)?
        })
    } else {
        let rows = keys::build_composite(left, right, &mut reservation)?;
        let l = keys::rows_to_keys(&rows.left, left, null_equality, &mut reservation)?;
        let r = keys::rows_to_keys(&rows.right, right, null_equality, &mut reservation)?;
        run(&l, &r, join_type, ctx)?
    };

    info!(
        "{} {:?} join on {} key column(s) of {} x {} rows produced {} rows in {:?} ms",
        join_type,
        ctx.algorithm(),
        left.len(),
        left_rows,
        right_rows,
        indices.len(),
        Instant::now().duration_since(t1).as_millis()
    );
    Ok(indices.finish())
}

fn run<K: JoinKey>(
    left: &SideKeys<K>,
    right: &SideKeys<K>,
    join_type: JoinType,
    ctx: &JoinContext,
) -> CylonResult<JoinIndices> {
    match ctx.algorithm() {
        JoinAlgorithm::Sort => {
            sort_join::sort_join(left, right, join_type, ctx.flag_sorted_input(), ctx.context())
        }
        JoinAlgorithm::Hash => hash_join::hash_join(left, right, join_type, ctx.context()),
    }
}

/// Check key column shapes and types, returning the row count of each side
fn validate(left: &[Column], right: &[Column]) -> CylonResult<(usize, usize)> {
    if left.is_empty() || right.is_empty() {
        return Err(CylonError::Invalid(
            "a join needs at least one key column per side".to_string(),
        ));
    }
    if left.len() != right.len() {
        return Err(CylonError::Invalid(format!(
            "{} left key columns but {} right key columns",
            left.len(),
            right.len()
        )));
    }
    for (i, (l, r)) in left.iter().zip(right).enumerate() {
        if l.data_type() != r.data_type() {
            return Err(CylonError::TypeError(format!(
                "key column {} is {} on the left but {} on the right",
                i,
                l.data_type(),
                r.data_type()
            )));
        }
    }
    Ok((side_rows(left, "left")?, side_rows(right, "right")?))
}

fn side_rows(columns: &[Column], side: &str) -> CylonResult<usize> {
    let rows = columns[0].length();
    if let Some((i, c)) = columns.iter().enumerate().find(|(_, c)| c.length() != rows) {
        return Err(CylonError::Invalid(format!(
            "{} key column {} has {} rows, expected {}",
            side,
            i,
            c.length(),
            rows
        )));
    }
    if rows > i32::MAX as usize {
        return Err(CylonError::new(
            Code::CapacityError,
            format!("{} side has {} rows, more than an int32 index can address", side, rows),
        ));
    }
    Ok(rows)
}

/// Join two tables on the key columns picked by `config`
///
/// The output holds every column of the left table followed by every column
/// of the right table; unmatched rows are null on the missing side.
pub fn join_tables(left: &Table, right: &Table, config: &JoinConfig) -> CylonResult<Table> {
    let left_keys = left.project(config.left_column_indices())?;
    let right_keys = right.project(config.right_column_indices())?;
    let result = join(&left_keys, &right_keys, config.join_type(), config.join_context())?;
    result.build_final_table(
        left,
        right,
        config.left_table_prefix(),
        config.right_table_prefix(),
    )
}
