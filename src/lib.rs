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

//! Cylon join: relational equi-joins over columnar data
//!
//! Given key columns of fixed-width values for two inputs, the engine returns
//! the matching row index pairs for inner, left and full outer joins. Matching
//! runs either by sorting and merging or through a hash table, in parallel
//! over rayon for large inputs, with intermediates accounted against a
//! memory pool. Columns are Apache Arrow primitive arrays.
//!
//! ```ignore
//! use cylon_join::{inner_join, Column, FromVector, JoinContext};
//!
//! let left = Column::from_vector(&[0i64, 0, 1, 2, 3]);
//! let right = Column::from_vector(&[0i64, 1, 2, 2, 3]);
//! let result = inner_join(&[left], &[right], &JoinContext::hash())?;
//! assert_eq!(result.len(), 6);
//! ```

pub mod arrow;
pub mod ctx;
pub mod data_types;
pub mod error;
pub mod join;
pub mod memory;
pub mod table;
pub mod util;

// Re-export commonly used types
pub use crate::ctx::{CylonContext, ParallelConfig};
pub use crate::data_types::Type;
pub use crate::error::{Code, CylonError, CylonResult};
pub use crate::join::{
    inner_join, join, join_tables, left_join, outer_join, outer_join_with_context, JoinAlgorithm,
    JoinConfig, JoinContext, JoinResult, JoinType, NullEquality, NO_MATCH,
};
pub use crate::memory::{BoundedMemoryPool, MemoryPool, MemoryReservation, UnboundedMemoryPool};
pub use crate::table::{Column, FromVector, Table};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
