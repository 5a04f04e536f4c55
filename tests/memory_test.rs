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

//! Memory accounting tests

use std::sync::Arc;

use cylon_join::ctx::CylonContext;
use cylon_join::error::{Code, CylonError};
use cylon_join::join::{inner_join, left_join, JoinContext};
use cylon_join::memory::{BoundedMemoryPool, MemoryPool};
use cylon_join::table::{Column, FromVector};

fn bounded_context(limit: usize) -> (Arc<dyn MemoryPool>, Arc<CylonContext>) {
    let pool: Arc<dyn MemoryPool> = Arc::new(BoundedMemoryPool::new(limit));
    let ctx = Arc::new(CylonContext::new().with_memory_pool(pool.clone()));
    (pool, ctx)
}

fn columns(rows: i64) -> (Column, Column) {
    let left: Vec<i64> = (0..rows).collect();
    let right: Vec<i64> = (0..rows).rev().collect();
    (Column::from_vector(&left), Column::from_vector(&right))
}

#[test]
fn test_out_of_memory_releases_everything() {
    let (left, right) = columns(10_000);
    let (pool, exec) = bounded_context(1024);

    for ctx in [JoinContext::sort(), JoinContext::hash()] {
        let err = inner_join(&[left.clone()], &[right.clone()], &ctx.with_context(exec.clone()))
            .unwrap_err();
        assert_eq!(err.code(), Code::OutOfMemory);
        assert!(matches!(err, CylonError::OutOfMemory { limit: 1024, .. }));
        assert_eq!(pool.reserved(), 0);
    }
}

#[test]
fn test_failure_in_engine_after_keys_reserved() {
    let (left, right) = columns(1_000);
    // room for both key vectors but not for the hash table on top
    let (pool, exec) = bounded_context(2 * 1_000 * 16 + 64);
    let ctx = JoinContext::hash().with_context(exec);

    let err = left_join(&[left], &[right], &ctx).unwrap_err();
    assert_eq!(err.code(), Code::OutOfMemory);
    assert_eq!(pool.reserved(), 0);
}

#[test]
fn test_composite_keys_are_accounted() {
    let (left, right) = columns(5_000);
    let (pool, exec) = bounded_context(4096);
    let ctx = JoinContext::sort().with_context(exec);

    let err = inner_join(
        &[left.clone(), left],
        &[right.clone(), right],
        &ctx,
    )
    .unwrap_err();
    assert_eq!(err.code(), Code::OutOfMemory);
    assert_eq!(pool.reserved(), 0);
}

#[test]
fn test_successful_join_returns_reservations() {
    let (left, right) = columns(2_000);
    let (pool, exec) = bounded_context(64 * 1024 * 1024);

    for ctx in [JoinContext::sort(), JoinContext::hash()] {
        let result = inner_join(&[left.clone()], &[right.clone()], &ctx.with_context(exec.clone()))
            .unwrap();
        assert_eq!(result.len(), 2_000);
        // the result is owned by the caller, not the pool
        assert_eq!(pool.reserved(), 0);
    }
}
