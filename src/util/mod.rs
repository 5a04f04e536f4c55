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

//! Utility functions and helpers

pub mod logging;

/// Sorting utilities
pub mod sort {
    /// Check if the rows named by `indices` are in non-decreasing key order
    pub fn is_sorted_by_key<K: Ord>(indices: &[u32], keys: &[K]) -> bool {
        indices
            .windows(2)
            .all(|w| keys[w[0] as usize] <= keys[w[1] as usize])
    }

}
