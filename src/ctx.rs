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

//! Execution context shared by join calls

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::memory::{MemoryPool, UnboundedMemoryPool};

pub const DEFAULT_PARALLEL_SORT_THRESHOLD: usize = 50_000;
pub const DEFAULT_PARALLEL_JOIN_THRESHOLD: usize = 5_000;
pub const DEFAULT_PARALLEL_CHUNK_SIZE: usize = 2048;

/// Thresholds deciding when a kernel fans out over the rayon pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParallelConfig {
    /// Whether parallel execution is enabled at all
    pub enabled: bool,
    /// Minimum rows on one side to sort it in parallel
    pub min_rows_for_parallel_sort: usize,
    /// Minimum build rows to build and probe the hash table in parallel
    pub min_rows_for_parallel_join: usize,
    /// Rows per parallel task
    pub chunk_size: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_rows_for_parallel_sort: DEFAULT_PARALLEL_SORT_THRESHOLD,
            min_rows_for_parallel_join: DEFAULT_PARALLEL_JOIN_THRESHOLD,
            chunk_size: DEFAULT_PARALLEL_CHUNK_SIZE,
        }
    }
}

impl ParallelConfig {
    pub fn new(
        enabled: bool,
        min_rows_for_parallel_sort: usize,
        min_rows_for_parallel_join: usize,
        chunk_size: usize,
    ) -> Self {
        Self {
            enabled,
            min_rows_for_parallel_sort,
            min_rows_for_parallel_join,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Config with parallel execution disabled
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    #[inline]
    pub fn should_parallel_sort(&self, row_count: usize) -> bool {
        self.enabled && row_count >= self.min_rows_for_parallel_sort
    }

    #[inline]
    pub fn should_parallel_join(&self, build_rows: usize) -> bool {
        self.enabled && build_rows >= self.min_rows_for_parallel_join
    }
}

/// The entry point to join execution resources
///
/// Holds the memory pool intermediates are accounted against, the parallel
/// execution thresholds and a free-form string configuration map.
pub struct CylonContext {
    config: RwLock<HashMap<String, String>>,
    memory_pool: Arc<dyn MemoryPool>,
    parallel: ParallelConfig,
}

impl CylonContext {
    pub fn new() -> Self {
        Self {
            config: RwLock::new(HashMap::new()),
            memory_pool: Arc::new(UnboundedMemoryPool::new()),
            parallel: ParallelConfig::default(),
        }
    }

    /// Shared default context
    pub fn init() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn with_memory_pool(mut self, memory_pool: Arc<dyn MemoryPool>) -> Self {
        self.memory_pool = memory_pool;
        self
    }

    pub fn with_parallel_config(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }

    /// Adds a configuration entry
    pub fn add_config(&self, key: impl Into<String>, value: impl Into<String>) {
        let mut config = self.config.write().unwrap_or_else(PoisonError::into_inner);
        config.insert(key.into(), value.into());
    }

    /// Returns a configuration entry, or `default` when absent
    pub fn get_config(&self, key: &str, default: &str) -> String {
        let config = self.config.read().unwrap_or_else(PoisonError::into_inner);
        config.get(key).cloned().unwrap_or_else(|| default.to_string())
    }

    pub fn get_memory_pool(&self) -> Arc<dyn MemoryPool> {
        self.memory_pool.clone()
    }

    pub fn parallel_config(&self) -> &ParallelConfig {
        &self.parallel
    }
}

impl Default for CylonContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CylonContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CylonContext")
            .field("memory_pool", &self.memory_pool)
            .field("parallel", &self.parallel)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::BoundedMemoryPool;

    #[test]
    fn test_config_map() {
        let ctx = CylonContext::new();
        assert_eq!(ctx.get_config("join.label", "none"), "none");
        ctx.add_config("join.label", "nightly");
        assert_eq!(ctx.get_config("join.label", "none"), "nightly");
    }

    #[test]
    fn test_builders() {
        let ctx = CylonContext::new()
            .with_memory_pool(Arc::new(BoundedMemoryPool::new(1024)))
            .with_parallel_config(ParallelConfig::disabled());
        assert_eq!(ctx.get_memory_pool().limit(), Some(1024));
        assert!(!ctx.parallel_config().should_parallel_sort(usize::MAX));
        assert!(!ctx.parallel_config().should_parallel_join(usize::MAX));
    }

    #[test]
    fn test_parallel_thresholds() {
        let config = ParallelConfig::new(true, 10, 20, 0);
        assert_eq!(config.chunk_size, 1);
        assert!(!config.should_parallel_sort(9));
        assert!(config.should_parallel_sort(10));
        assert!(config.should_parallel_join(20));
    }
}
