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

//! Hash join
//!
//! One side is loaded into a hash table keyed on the join key, mapping each
//! key to the ascending list of build rows carrying it. The other side probes
//! it row by row. Large inputs build per-chunk tables in parallel which are
//! then merged in chunk order, and probe in parallel chunks whose outputs are
//! concatenated in chunk order.

use std::mem::size_of;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use ahash::RandomState;
use hashbrown::hash_map::Entry;
use hashbrown::HashMap;
use log::debug;
use rayon::prelude::*;

use crate::ctx::CylonContext;
use crate::error::CylonResult;
use crate::join::config::JoinType;
use crate::join::keys::{JoinKey, SideKeys};
use crate::join::utils::JoinIndices;
use crate::memory::MemoryReservation;

type JoinHashMap<K> = HashMap<K, Vec<u32>, RandomState>;

/// Pick the build side, true when building from the right
///
/// Left and full outer joins build from the right so that the probe keeps
/// every left row. Inner joins build from the smaller side.
fn calculate_join_metadata(join_type: JoinType, left_size: usize, right_size: usize) -> bool {
    match join_type {
        JoinType::Left | JoinType::FullOuter => true,
        JoinType::Inner => right_size <= left_size,
    }
}

/// Upper bound of the bytes a table over `rows` build rows occupies
fn estimated_table_size<K>(rows: usize) -> usize {
    if rows == 0 {
        return 0;
    }
    let buckets = rows.saturating_mul(8).div_ceil(7).next_power_of_two();
    buckets
        .saturating_mul(size_of::<(K, Vec<u32>)>() + 1)
        .saturating_add(rows.saturating_mul(size_of::<u32>()))
}

fn build_range<K: JoinKey>(build: &SideKeys<K>, start: usize, end: usize) -> JoinHashMap<K> {
    let mut table = JoinHashMap::with_capacity_and_hasher(end - start, RandomState::new());
    for row in start..end {
        if build.is_matchable(row) {
            table.entry(*build.key(row)).or_default().push(row as u32);
        }
    }
    table
}

fn build_hash_table<K: JoinKey>(
    build: &SideKeys<K>,
    parallel: bool,
    chunk_size: usize,
) -> JoinHashMap<K> {
    let rows = build.len();
    if !parallel {
        return build_range(build, 0, rows);
    }

    let partials: Vec<JoinHashMap<K>> = (0..rows.div_ceil(chunk_size))
        .into_par_iter()
        .map(|chunk| {
            let start = chunk * chunk_size;
            build_range(build, start, (start + chunk_size).min(rows))
        })
        .collect();

    // chunk order keeps every row list ascending
    let mut table = JoinHashMap::with_capacity_and_hasher(rows, RandomState::new());
    for partial in partials {
        for (key, build_rows) in partial {
            match table.entry(key) {
                Entry::Occupied(mut entry) => entry.get_mut().extend(build_rows),
                Entry::Vacant(entry) => {
                    entry.insert(build_rows);
                }
            }
        }
    }
    table
}

/// Probe context shared by all probe chunks
struct Probe<'a, K> {
    table: &'a JoinHashMap<K>,
    probe: &'a SideKeys<K>,
    build_from_right: bool,
    keep_unmatched_probe: bool,
    visited: Option<&'a [AtomicBool]>,
}

impl<K: JoinKey> Probe<'_, K> {
    fn probe_range(&self, start: usize, end: usize) -> JoinIndices {
        let mut out = JoinIndices::with_capacity(end - start);
        for row in start..end {
            let matches = if self.probe.is_matchable(row) {
                self.table.get(self.probe.key(row))
            } else {
                None
            };
            match matches {
                Some(build_rows) => {
                    for &build_row in build_rows {
                        if self.build_from_right {
                            out.push_match(row as u32, build_row);
                        } else {
                            out.push_match(build_row, row as u32);
                        }
                        if let Some(visited) = self.visited {
                            visited[build_row as usize].store(true, Ordering::Relaxed);
                        }
                    }
                }
                None if self.keep_unmatched_probe => out.push_left_unmatched(row as u32),
                None => {}
            }
        }
        out
    }
}

/// Join two sides through a hash table
pub(crate) fn hash_join<K: JoinKey>(
    left: &SideKeys<K>,
    right: &SideKeys<K>,
    join_type: JoinType,
    ctx: &CylonContext,
) -> CylonResult<JoinIndices> {
    let build_from_right = calculate_join_metadata(join_type, left.len(), right.len());
    let (build, probe) = if build_from_right {
        (right, left)
    } else {
        (left, right)
    };

    let parallel_config = ctx.parallel_config();
    let parallel = parallel_config.should_parallel_join(build.len());
    let chunk_size = parallel_config.chunk_size.max(1);

    let mut reservation = MemoryReservation::new(ctx.get_memory_pool(), "hash join");
    reservation.try_grow(estimated_table_size::<K>(build.len()))?;
    if parallel {
        // per-chunk tables live alongside the merged one
        reservation.try_grow(estimated_table_size::<K>(build.len()))?;
    }
    let track_visited = join_type.keeps_unmatched_right();
    if track_visited {
        reservation.try_grow_for::<AtomicBool>(build.len())?;
    }

    let t1 = Instant::now();
    let table = build_hash_table(build, parallel, chunk_size);
    let t2 = Instant::now();
    debug!(
        "Hash table built from {} side with {} keys in : {:?}",
        if build_from_right { "right" } else { "left" },
        table.len(),
        t2.duration_since(t1).as_millis()
    );

    let visited: Vec<AtomicBool> = if track_visited {
        (0..build.len()).map(|_| AtomicBool::new(false)).collect()
    } else {
        Vec::new()
    };
    let prober = Probe {
        table: &table,
        probe,
        build_from_right,
        keep_unmatched_probe: join_type.keeps_unmatched_left(),
        visited: track_visited.then_some(visited.as_slice()),
    };
    debug_assert!(!prober.keep_unmatched_probe || build_from_right);

    let rows = probe.len();
    let mut out = if parallel && rows > chunk_size {
        let chunks: Vec<JoinIndices> = (0..rows.div_ceil(chunk_size))
            .into_par_iter()
            .map(|chunk| {
                let start = chunk * chunk_size;
                prober.probe_range(start, (start + chunk_size).min(rows))
            })
            .collect();
        let mut out = JoinIndices::with_capacity(chunks.iter().map(JoinIndices::len).sum());
        chunks.into_iter().for_each(|chunk| out.append(chunk));
        out
    } else {
        prober.probe_range(0, rows)
    };

    if track_visited {
        visited
            .iter()
            .enumerate()
            .filter(|(_, seen)| !seen.load(Ordering::Relaxed))
            .for_each(|(row, _)| out.push_right_unmatched(row as u32));
    }

    debug!(
        "Probe time : {:?}, produced {} rows",
        Instant::now().duration_since(t2).as_millis(),
        out.len()
    );
    Ok(out)
}
