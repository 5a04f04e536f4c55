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

//! Sort-merge join
//!
//! Both sides are ordered by key through a stable index sort, then walked
//! together one run of equal keys at a time. A pair of equal runs emits its
//! cartesian product, left-major. For left and full outer joins a left run
//! without a partner is emitted in place against [`NO_MATCH`]. Right rows
//! without a partner are collected and appended after every left-driven row,
//! ordered by key, followed by right rows whose key can never match.

use std::time::Instant;

use log::{debug, warn};

use crate::arrow::arrow_kernels::{run_length, sort_indices};
use crate::ctx::CylonContext;
use crate::error::CylonResult;
use crate::join::config::JoinType;
use crate::join::keys::{JoinKey, SideKeys};
use crate::join::utils::{JoinIndices, NO_MATCH};
use crate::memory::MemoryReservation;
use crate::util::sort::is_sorted_by_key;

/// Cursor over the runs of equal keys in a sorted row list
struct Runs<'a, K> {
    keys: &'a [K],
    sorted: &'a [u32],
    current: usize,
}

impl<'a, K: JoinKey> Runs<'a, K> {
    fn new(keys: &'a [K], sorted: &'a [u32]) -> Self {
        Self {
            keys,
            sorted,
            current: 0,
        }
    }

    /// Take the next run, empty once the rows are exhausted
    fn advance(&mut self) -> &'a [u32] {
        if self.current == self.sorted.len() {
            return &[];
        }
        let start = self.current;
        self.current += run_length(self.keys, self.sorted, start);
        &self.sorted[start..self.current]
    }

    #[inline]
    fn key_of(&self, run: &[u32]) -> &'a K {
        &self.keys[run[0] as usize]
    }
}

/// Matchable rows of one side in ascending key order
fn order_rows<K: JoinKey>(
    side: &SideKeys<K>,
    rows: Vec<u32>,
    flag_sorted_input: bool,
    ctx: &CylonContext,
    name: &str,
) -> Vec<u32> {
    if flag_sorted_input {
        if is_sorted_by_key(&rows, side.keys()) {
            debug!("{} side already sorted, skipping sort", name);
            return rows;
        }
        warn!("{} side flagged as sorted but is not, sorting", name);
    }
    let parallel = ctx.parallel_config().should_parallel_sort(rows.len());
    sort_indices(side.keys(), rows, parallel)
}

/// Join two sides by sorting and merging
pub(crate) fn sort_join<K: JoinKey>(
    left: &SideKeys<K>,
    right: &SideKeys<K>,
    join_type: JoinType,
    flag_sorted_input: bool,
    ctx: &CylonContext,
) -> CylonResult<JoinIndices> {
    let mut reservation = MemoryReservation::new(ctx.get_memory_pool(), "sort join");
    // one position per row of each side
    reservation.try_grow_for::<u32>(left.len())?;
    reservation.try_grow_for::<u32>(right.len())?;

    if left.unmatchable_count() + right.unmatchable_count() > 0 {
        debug!(
            "{} left and {} right rows have null keys and cannot match",
            left.unmatchable_count(),
            right.unmatchable_count()
        );
    }

    let t1 = Instant::now();
    let (left_rows, left_unmatchable) = left.split_rows();
    let left_sorted = order_rows(left, left_rows, flag_sorted_input, ctx, "left");
    let t2 = Instant::now();
    debug!("Left sorting time : {:?}", t2.duration_since(t1).as_millis());

    let (right_rows, right_unmatchable) = right.split_rows();
    let right_sorted = order_rows(right, right_rows, flag_sorted_input, ctx, "right");
    let t1 = Instant::now();
    debug!("Right sorting time : {:?}", t1.duration_since(t2).as_millis());

    let indices = merge(
        &left_sorted,
        &left_unmatchable,
        left.keys(),
        &right_sorted,
        &right_unmatchable,
        right.keys(),
        join_type,
    );
    debug!(
        "Index join time : {:?}, produced {} rows",
        Instant::now().duration_since(t1).as_millis(),
        indices.len()
    );
    Ok(indices)
}

/// Merge sorted matchable rows of both sides
fn merge<K: JoinKey>(
    left_sorted: &[u32],
    left_unmatchable: &[u32],
    left_keys: &[K],
    right_sorted: &[u32],
    right_unmatchable: &[u32],
    right_keys: &[K],
    join_type: JoinType,
) -> JoinIndices {
    let keep_left = join_type.keeps_unmatched_left();
    let keep_right = join_type.keeps_unmatched_right();

    let mut out = JoinIndices::with_capacity(left_sorted.len().min(right_sorted.len()));
    let mut right_unmatched: Vec<u32> = Vec::new();

    let mut left_runs = Runs::new(left_keys, left_sorted);
    let mut right_runs = Runs::new(right_keys, right_sorted);
    let mut left_subset = left_runs.advance();
    let mut right_subset = right_runs.advance();

    while !left_subset.is_empty() && !right_subset.is_empty() {
        let lk = left_runs.key_of(left_subset);
        let rk = right_runs.key_of(right_subset);

        match lk.cmp(rk) {
            std::cmp::Ordering::Equal => {
                for &l in left_subset {
                    for &r in right_subset {
                        out.push_match(l, r);
                    }
                }
                left_subset = left_runs.advance();
                right_subset = right_runs.advance();
            }
            std::cmp::Ordering::Less => {
                if keep_left {
                    left_subset.iter().for_each(|&l| out.push_left_unmatched(l));
                }
                left_subset = left_runs.advance();
            }
            std::cmp::Ordering::Greater => {
                if keep_right {
                    right_unmatched.extend_from_slice(right_subset);
                }
                right_subset = right_runs.advance();
            }
        }
    }

    if keep_left {
        while !left_subset.is_empty() {
            left_subset.iter().for_each(|&l| out.push_left_unmatched(l));
            left_subset = left_runs.advance();
        }
        left_unmatchable
            .iter()
            .for_each(|&l| out.push_left_unmatched(l));
    }

    if keep_right {
        while !right_subset.is_empty() {
            right_unmatched.extend_from_slice(right_subset);
            right_subset = right_runs.advance();
        }
        right_unmatched
            .iter()
            .chain(right_unmatchable)
            .for_each(|&r| out.push_right_unmatched(r));
    }

    debug_assert!(out.left().iter().zip(out.right()).all(|(&l, &r)| l != NO_MATCH || r != NO_MATCH));
    out
}
