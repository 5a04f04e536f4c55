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

//! Join key extraction
//!
//! A single key column is joined on its native values. Several key columns are
//! packed per row into byte strings by one shared [`RowConverter`], so that two
//! rows compare equal exactly when every key column is equal and compare in
//! column-wise lexicographic order otherwise. The packing is exact, so a hash
//! collision between two rows can never be mistaken for a match: hash tables
//! keyed on these rows resolve buckets by full row equality.

use std::fmt::Debug;
use std::hash::Hash;
use std::mem::size_of;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, ArrowPrimitiveType, AsArray};
use arrow::buffer::{BooleanBuffer, NullBuffer};
use arrow::datatypes::{Float32Type, Float64Type};
use arrow_row::{Row, RowConverter, Rows, SortField};
use ordered_float::OrderedFloat;
use rayon::prelude::*;

use crate::arrow::arrow_types::to_arrow_type;
use crate::ctx::ParallelConfig;
use crate::data_types::Type;
use crate::error::CylonResult;
use crate::join::config::NullEquality;
use crate::memory::MemoryReservation;
use crate::table::Column;

/// Anything the join engines can sort, hash and compare
pub trait JoinKey: Ord + Hash + Copy + Send + Sync + Debug {}

impl<T: Ord + Hash + Copy + Send + Sync + Debug> JoinKey for T {}

/// Native value that can act as a join key
///
/// Integers are their own key. Floats are wrapped in [`OrderedFloat`]: `0.0`
/// and `-0.0` are equal, NaN equals NaN and sorts after every other value.
pub trait NativeKey: Copy + Send + Sync {
    type Key: JoinKey;

    fn to_key(self) -> Self::Key;
}

macro_rules! impl_integer_key {
    ($($t:ty),*) => {
        $(
            impl NativeKey for $t {
                type Key = $t;

                #[inline]
                fn to_key(self) -> $t {
                    self
                }
            }
        )*
    };
}

impl_integer_key!(i8, i16, i32, i64, u8, u16, u32, u64);

impl NativeKey for f32 {
    type Key = OrderedFloat<f32>;

    #[inline]
    fn to_key(self) -> OrderedFloat<f32> {
        OrderedFloat(self)
    }
}

impl NativeKey for f64 {
    type Key = OrderedFloat<f64>;

    #[inline]
    fn to_key(self) -> OrderedFloat<f64> {
        OrderedFloat(self)
    }
}

/// Keys of one join side, one per row
///
/// Rows outside `matchable` never take part in matching. They are the rows
/// with a null in some key column when nulls are not equal to each other.
#[derive(Debug)]
pub struct SideKeys<K> {
    keys: Vec<K>,
    matchable: Option<BooleanBuffer>,
}

impl<K: JoinKey> SideKeys<K> {
    pub fn new(keys: Vec<K>, matchable: Option<BooleanBuffer>) -> Self {
        debug_assert!(matchable.as_ref().map_or(true, |m| m.len() == keys.len()));
        Self { keys, matchable }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    #[inline]
    pub fn key(&self, row: usize) -> &K {
        &self.keys[row]
    }

    #[inline]
    pub fn is_matchable(&self, row: usize) -> bool {
        self.matchable.as_ref().map_or(true, |m| m.value(row))
    }

    pub fn unmatchable_count(&self) -> usize {
        self.matchable
            .as_ref()
            .map_or(0, |m| m.len() - m.count_set_bits())
    }

    /// Split row positions into matchable and unmatchable, both ascending
    pub fn split_rows(&self) -> (Vec<u32>, Vec<u32>) {
        match &self.matchable {
            None => ((0..self.keys.len() as u32).collect(), Vec::new()),
            Some(mask) => {
                let excluded = mask.len() - mask.count_set_bits();
                let mut rows = Vec::with_capacity(mask.len() - excluded);
                let mut rest = Vec::with_capacity(excluded);
                for (i, valid) in mask.iter().enumerate() {
                    if valid {
                        rows.push(i as u32);
                    } else {
                        rest.push(i as u32);
                    }
                }
                (rows, rest)
            }
        }
    }
}

/// Mask of rows that can match under `policy`, None when every row can
fn matchable_mask(columns: &[&ArrayRef], policy: NullEquality) -> Option<BooleanBuffer> {
    if policy == NullEquality::NullEqualsNull {
        return None;
    }
    columns
        .iter()
        .fold(None::<NullBuffer>, |acc, c| NullBuffer::union(acc.as_ref(), c.nulls()))
        .filter(|nulls| nulls.null_count() > 0)
        .map(|nulls| nulls.into_inner())
}

/// Extract native keys from a single key column
///
/// Null rows get the key `None`, which only equals other nulls.
pub fn build_single<T>(
    column: &Column,
    policy: NullEquality,
    parallel: &ParallelConfig,
    reservation: &mut MemoryReservation,
) -> CylonResult<SideKeys<Option<<T::Native as NativeKey>::Key>>>
where
    T: ArrowPrimitiveType,
    T::Native: NativeKey,
{
    let array = column.as_primitive::<T>()?;
    reservation.try_grow_for::<Option<<T::Native as NativeKey>::Key>>(array.len())?;

    let values: &[T::Native] = array.values();
    let keys: Vec<_> = match array.nulls() {
        None if parallel.should_parallel_sort(values.len()) => {
            values.par_iter().map(|&v| Some(v.to_key())).collect()
        }
        None => values.iter().map(|&v| Some(v.to_key())).collect(),
        Some(nulls) => values
            .iter()
            .zip(nulls.iter())
            .map(|(&v, valid)| valid.then(|| v.to_key()))
            .collect(),
    };

    Ok(SideKeys::new(keys, matchable_mask(&[column.data()], policy)))
}

/// Rows of both sides encoded by one shared converter
pub struct CompositeRows {
    pub left: Rows,
    pub right: Rows,
}

/// Encoded size of `rows` rows of `columns`, offsets included
fn estimated_rows_size(columns: &[Column], rows: usize) -> usize {
    let per_row: usize = columns
        .iter()
        .map(|c| 1 + c.data_type().byte_width())
        .sum();
    rows.saturating_mul(per_row)
        .saturating_add(rows.saturating_add(1).saturating_mul(size_of::<usize>()))
}

/// Float keys are canonicalised so that row bytes agree with numeric
/// equality: `-0.0` becomes `0.0` and every NaN becomes the positive quiet NaN.
fn normalize_key_array(column: &Column) -> ArrayRef {
    let array = column.data();
    if !column.data_type().is_floating() {
        return array.clone();
    }
    match column.data_type() {
        Type::Float => Arc::new(array.as_primitive::<Float32Type>().unary::<_, Float32Type>(|v| {
            if v == 0.0 {
                0.0
            } else if v.is_nan() {
                f32::NAN
            } else {
                v
            }
        })),
        Type::Double => Arc::new(array.as_primitive::<Float64Type>().unary::<_, Float64Type>(|v| {
            if v == 0.0 {
                0.0
            } else if v.is_nan() {
                f64::NAN
            } else {
                v
            }
        })),
        _ => array.clone(),
    }
}

/// Pack several key columns per side into comparable rows
///
/// Callers have already checked that both sides have the same number of key
/// columns with pairwise equal types.
pub fn build_composite(
    left: &[Column],
    right: &[Column],
    reservation: &mut MemoryReservation,
) -> CylonResult<CompositeRows> {
    let left_rows = left.first().map_or(0, Column::length);
    let right_rows = right.first().map_or(0, Column::length);
    reservation.try_grow(estimated_rows_size(left, left_rows))?;
    reservation.try_grow(estimated_rows_size(right, right_rows))?;

    let fields: Vec<SortField> = left
        .iter()
        .map(|c| SortField::new(to_arrow_type(c.data_type())))
        .collect();
    let converter = RowConverter::new(fields)?;

    let left_arrays: Vec<ArrayRef> = left.iter().map(normalize_key_array).collect();
    let right_arrays: Vec<ArrayRef> = right.iter().map(normalize_key_array).collect();

    Ok(CompositeRows {
        left: converter.convert_columns(&left_arrays)?,
        right: converter.convert_columns(&right_arrays)?,
    })
}

/// Borrow packed rows as per-row keys
pub fn rows_to_keys<'a>(
    rows: &'a Rows,
    columns: &[Column],
    policy: NullEquality,
    reservation: &mut MemoryReservation,
) -> CylonResult<SideKeys<Row<'a>>> {
    reservation.try_grow_for::<Row<'a>>(rows.num_rows())?;
    let keys: Vec<Row<'a>> = rows.iter().collect();
    let arrays: Vec<&ArrayRef> = columns.iter().map(Column::data).collect();
    Ok(SideKeys::new(keys, matchable_mask(&arrays, policy)))
}
