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

//! Join configuration

use std::fmt;
use std::sync::Arc;

use crate::ctx::CylonContext;
use crate::error::{Code, CylonError, CylonResult};

/// Type of join operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinType {
    Inner,
    Left,
    FullOuter,
}

impl JoinType {
    /// Whether left rows without a partner are emitted
    pub fn keeps_unmatched_left(self) -> bool {
        matches!(self, JoinType::Left | JoinType::FullOuter)
    }

    /// Whether right rows without a partner are emitted
    pub fn keeps_unmatched_right(self) -> bool {
        self == JoinType::FullOuter
    }
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JoinType::Inner => "inner",
            JoinType::Left => "left",
            JoinType::FullOuter => "full outer",
        };
        f.write_str(name)
    }
}

/// Join algorithm to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JoinAlgorithm {
    #[default]
    Sort,
    Hash,
}

/// How null key values compare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NullEquality {
    /// A row with a null in any key column matches nothing
    #[default]
    NullNotEqual,
    /// Nulls match nulls in the same key column
    NullEqualsNull,
}

/// Per-call join options
///
/// `flag_sorted_input` is a hint that both key sides are already ascending;
/// it is verified before any sort is skipped. `reserved` is carried for
/// callers and never read.
#[derive(Debug, Clone)]
pub struct JoinContext {
    algorithm: JoinAlgorithm,
    flag_sorted_input: bool,
    reserved: i32,
    null_equality: NullEquality,
    ctx: Arc<CylonContext>,
}

impl Default for JoinContext {
    fn default() -> Self {
        Self::new(JoinAlgorithm::Sort)
    }
}

impl JoinContext {
    pub fn new(algorithm: JoinAlgorithm) -> Self {
        Self::view(false, algorithm, 0)
    }

    /// Create a join context from its raw parts
    pub fn view(flag_sorted_input: bool, algorithm: JoinAlgorithm, reserved: i32) -> Self {
        Self {
            algorithm,
            flag_sorted_input,
            reserved,
            null_equality: NullEquality::default(),
            ctx: CylonContext::init(),
        }
    }

    pub fn sort() -> Self {
        Self::new(JoinAlgorithm::Sort)
    }

    pub fn hash() -> Self {
        Self::new(JoinAlgorithm::Hash)
    }

    pub fn with_sorted_input(mut self, flag_sorted_input: bool) -> Self {
        self.flag_sorted_input = flag_sorted_input;
        self
    }

    pub fn with_null_equality(mut self, null_equality: NullEquality) -> Self {
        self.null_equality = null_equality;
        self
    }

    /// Run against the memory pool and parallel settings of `ctx`
    pub fn with_context(mut self, ctx: Arc<CylonContext>) -> Self {
        self.ctx = ctx;
        self
    }

    pub fn algorithm(&self) -> JoinAlgorithm {
        self.algorithm
    }

    pub fn flag_sorted_input(&self) -> bool {
        self.flag_sorted_input
    }

    pub fn reserved(&self) -> i32 {
        self.reserved
    }

    pub fn null_equality(&self) -> NullEquality {
        self.null_equality
    }

    pub fn context(&self) -> &Arc<CylonContext> {
        &self.ctx
    }
}

/// Configuration for joining two tables on key columns picked by index
#[derive(Debug, Clone)]
pub struct JoinConfig {
    join_type: JoinType,
    left_column_indices: Vec<usize>,
    right_column_indices: Vec<usize>,
    left_table_prefix: String,
    right_table_prefix: String,
    join_context: JoinContext,
}

impl JoinConfig {
    pub fn new(
        join_type: JoinType,
        left_column_indices: Vec<usize>,
        right_column_indices: Vec<usize>,
        join_context: JoinContext,
    ) -> CylonResult<Self> {
        if left_column_indices.len() != right_column_indices.len() {
            return Err(CylonError::new(
                Code::Invalid,
                format!(
                    "{} left key columns but {} right key columns",
                    left_column_indices.len(),
                    right_column_indices.len()
                ),
            ));
        }
        Ok(Self {
            join_type,
            left_column_indices,
            right_column_indices,
            left_table_prefix: "l_".to_string(),
            right_table_prefix: "r_".to_string(),
            join_context,
        })
    }

    /// Inner join on one key column per side
    pub fn inner_join(left_column_idx: usize, right_column_idx: usize) -> Self {
        Self::single(JoinType::Inner, left_column_idx, right_column_idx)
    }

    /// Left join on one key column per side
    pub fn left_join(left_column_idx: usize, right_column_idx: usize) -> Self {
        Self::single(JoinType::Left, left_column_idx, right_column_idx)
    }

    /// Full outer join on one key column per side
    pub fn full_outer_join(left_column_idx: usize, right_column_idx: usize) -> Self {
        Self::single(JoinType::FullOuter, left_column_idx, right_column_idx)
    }

    fn single(join_type: JoinType, left_column_idx: usize, right_column_idx: usize) -> Self {
        Self {
            join_type,
            left_column_indices: vec![left_column_idx],
            right_column_indices: vec![right_column_idx],
            left_table_prefix: "l_".to_string(),
            right_table_prefix: "r_".to_string(),
            join_context: JoinContext::default(),
        }
    }

    pub fn with_join_context(mut self, join_context: JoinContext) -> Self {
        self.join_context = join_context;
        self
    }

    /// Prefixes for column names present in both tables
    pub fn with_prefixes(mut self, left: impl Into<String>, right: impl Into<String>) -> Self {
        self.left_table_prefix = left.into();
        self.right_table_prefix = right.into();
        self
    }

    pub fn join_type(&self) -> JoinType {
        self.join_type
    }

    pub fn left_column_indices(&self) -> &[usize] {
        &self.left_column_indices
    }

    pub fn right_column_indices(&self) -> &[usize] {
        &self.right_column_indices
    }

    pub fn left_table_prefix(&self) -> &str {
        &self.left_table_prefix
    }

    pub fn right_table_prefix(&self) -> &str {
        &self.right_table_prefix
    }

    pub fn join_context(&self) -> &JoinContext {
        &self.join_context
    }

    pub fn is_multi_column(&self) -> bool {
        self.left_column_indices.len() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let ctx = JoinContext::default();
        assert_eq!(ctx.algorithm(), JoinAlgorithm::Sort);
        assert!(!ctx.flag_sorted_input());
        assert_eq!(ctx.null_equality(), NullEquality::NullNotEqual);

        let ctx = JoinContext::view(true, JoinAlgorithm::Hash, 7);
        assert!(ctx.flag_sorted_input());
        assert_eq!(ctx.reserved(), 7);
    }

    #[test]
    fn test_join_type_flags() {
        assert!(!JoinType::Inner.keeps_unmatched_left());
        assert!(JoinType::Left.keeps_unmatched_left());
        assert!(!JoinType::Left.keeps_unmatched_right());
        assert!(JoinType::FullOuter.keeps_unmatched_right());
        assert_eq!(JoinType::FullOuter.to_string(), "full outer");
    }

    #[test]
    fn test_config_rejects_mismatched_keys() {
        let err = JoinConfig::new(JoinType::Inner, vec![0, 1], vec![0], JoinContext::hash())
            .unwrap_err();
        assert_eq!(err.code(), Code::Invalid);

        let config = JoinConfig::new(JoinType::Left, vec![0, 1], vec![1, 0], JoinContext::hash())
            .unwrap()
            .with_prefixes("a_", "b_");
        assert!(config.is_multi_column());
        assert_eq!(config.right_table_prefix(), "b_");
    }
}
