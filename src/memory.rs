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

//! Memory accounting for join intermediates
//!
//! Sort permutations, key vectors and hash tables are reserved against a
//! [`MemoryPool`] before they are allocated. A [`MemoryReservation`] hands its
//! bytes back to the pool when dropped, so an early return with `?` releases
//! everything acquired so far in the same call.

use std::fmt;
use std::mem::size_of;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use log::trace;

use crate::error::{Code, CylonError, CylonResult};

/// Accounting interface for the memory used by a join call
pub trait MemoryPool: Send + Sync + fmt::Debug {
    /// Reserve `bytes`, failing with [`CylonError::OutOfMemory`] if the pool is exhausted
    fn try_reserve(&self, bytes: usize) -> CylonResult<()>;

    /// Return `bytes` previously reserved
    fn release(&self, bytes: usize);

    /// Bytes currently reserved
    fn reserved(&self) -> usize;

    /// Upper bound of the pool, if any
    fn limit(&self) -> Option<usize>;
}

/// Pool that only tracks usage and never refuses a reservation
#[derive(Debug, Default)]
pub struct UnboundedMemoryPool {
    used: AtomicUsize,
}

impl UnboundedMemoryPool {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemoryPool for UnboundedMemoryPool {
    fn try_reserve(&self, bytes: usize) -> CylonResult<()> {
        self.used.fetch_add(bytes, Ordering::Relaxed);
        Ok(())
    }

    fn release(&self, bytes: usize) {
        self.used.fetch_sub(bytes, Ordering::Relaxed);
    }

    fn reserved(&self) -> usize {
        self.used.load(Ordering::Relaxed)
    }

    fn limit(&self) -> Option<usize> {
        None
    }
}

/// Pool with a hard byte limit
#[derive(Debug)]
pub struct BoundedMemoryPool {
    limit: usize,
    used: AtomicUsize,
}

impl BoundedMemoryPool {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            used: AtomicUsize::new(0),
        }
    }
}

impl MemoryPool for BoundedMemoryPool {
    fn try_reserve(&self, bytes: usize) -> CylonResult<()> {
        self.used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                used.checked_add(bytes).filter(|&total| total <= self.limit)
            })
            .map(|_| ())
            .map_err(|used| CylonError::OutOfMemory {
                requested: bytes,
                reserved: used,
                limit: self.limit,
            })
    }

    fn release(&self, bytes: usize) {
        self.used.fetch_sub(bytes, Ordering::AcqRel);
    }

    fn reserved(&self) -> usize {
        self.used.load(Ordering::Acquire)
    }

    fn limit(&self) -> Option<usize> {
        Some(self.limit)
    }
}

/// Bytes held against a pool on behalf of one consumer
///
/// Everything still held is released on drop.
pub struct MemoryReservation {
    pool: Arc<dyn MemoryPool>,
    consumer: &'static str,
    size: usize,
}

impl MemoryReservation {
    /// Create an empty reservation
    pub fn new(pool: Arc<dyn MemoryPool>, consumer: &'static str) -> Self {
        Self {
            pool,
            consumer,
            size: 0,
        }
    }

    /// Bytes currently held
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn consumer(&self) -> &'static str {
        self.consumer
    }

    /// Grow the reservation by `bytes`
    pub fn try_grow(&mut self, bytes: usize) -> CylonResult<()> {
        self.pool.try_reserve(bytes)?;
        self.size += bytes;
        trace!("{} reserved {} bytes (holding {})", self.consumer, bytes, self.size);
        Ok(())
    }

    /// Grow the reservation by the footprint of `count` values of `T`
    pub fn try_grow_for<T>(&mut self, count: usize) -> CylonResult<()> {
        let bytes = count.checked_mul(size_of::<T>()).ok_or_else(|| {
            CylonError::new(
                Code::CapacityError,
                format!("{}: {} elements overflow the address space", self.consumer, count),
            )
        })?;
        self.try_grow(bytes)
    }

    /// Give back up to `bytes`
    pub fn shrink(&mut self, bytes: usize) {
        let bytes = bytes.min(self.size);
        self.pool.release(bytes);
        self.size -= bytes;
    }

    /// Give back everything, returning the number of bytes freed
    pub fn free(&mut self) -> usize {
        let size = self.size;
        self.shrink(size);
        size
    }
}

impl Drop for MemoryReservation {
    fn drop(&mut self) {
        if self.size > 0 {
            trace!("{} releasing {} bytes", self.consumer, self.size);
            self.free();
        }
    }
}

impl fmt::Debug for MemoryReservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryReservation")
            .field("consumer", &self.consumer)
            .field("size", &self.size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_pool_rejects_over_limit() {
        let pool: Arc<dyn MemoryPool> = Arc::new(BoundedMemoryPool::new(100));
        let mut first = MemoryReservation::new(pool.clone(), "first");
        first.try_grow(60).unwrap();

        let mut second = MemoryReservation::new(pool.clone(), "second");
        let err = second.try_grow(50).unwrap_err();
        assert_eq!(err.code(), Code::OutOfMemory);
        assert_eq!(second.size(), 0);
        assert_eq!(pool.reserved(), 60);

        second.try_grow(40).unwrap();
        assert_eq!(pool.reserved(), 100);
    }

    #[test]
    fn test_drop_releases() {
        let pool: Arc<dyn MemoryPool> = Arc::new(BoundedMemoryPool::new(64));
        {
            let mut r = MemoryReservation::new(pool.clone(), "scoped");
            r.try_grow_for::<u32>(16).unwrap();
            assert_eq!(pool.reserved(), 64);
        }
        assert_eq!(pool.reserved(), 0);
    }

    #[test]
    fn test_shrink_is_clamped() {
        let pool: Arc<dyn MemoryPool> = Arc::new(UnboundedMemoryPool::new());
        let mut r = MemoryReservation::new(pool.clone(), "clamped");
        r.try_grow(10).unwrap();
        r.shrink(25);
        assert_eq!(r.size(), 0);
        assert_eq!(pool.reserved(), 0);
        assert_eq!(pool.limit(), None);
    }

    #[test]
    fn test_overflowing_request() {
        let pool: Arc<dyn MemoryPool> = Arc::new(UnboundedMemoryPool::new());
        let mut r = MemoryReservation::new(pool, "overflow");
        let err = r.try_grow_for::<u64>(usize::MAX).unwrap_err();
        assert_eq!(err.code(), Code::CapacityError);
    }
}
