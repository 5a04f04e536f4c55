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

//! Index sort kernels

use rayon::prelude::*;

/// Stable sort of row positions by their key
///
/// `rows` is a list of positions into `keys`, usually ascending. Rows with
/// equal keys keep their relative order, so ascending input yields ascending
/// positions within every run of equal keys. Large inputs are sorted on the
/// rayon pool; the result is identical either way.
pub fn sort_indices<K>(keys: &[K], mut rows: Vec<u32>, parallel: bool) -> Vec<u32>
where
    K: Ord + Sync,
{
    let by_key = |a: &u32, b: &u32| keys[*a as usize].cmp(&keys[*b as usize]);
    if parallel {
        rows.par_sort_by(by_key);
    } else {
        rows.sort_by(by_key);
    }
    rows
}

/// Length of the run of equal keys starting at `start` in sorted `rows`
#[inline]
pub fn run_length<K: Ord>(keys: &[K], rows: &[u32], start: usize) -> usize {
    let key = &keys[rows[start] as usize];
    rows[start..]
        .iter()
        .take_while(|&&r| keys[r as usize] == *key)
        .count()
}
