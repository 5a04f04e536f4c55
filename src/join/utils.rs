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

//! Join output assembly

use std::collections::HashMap;

use arrow::array::Int32Array;

use crate::error::CylonResult;
use crate::table::{Column, Table};

/// Index emitted for the missing side of an unmatched row
pub const NO_MATCH: i32 = -1;

/// Growing pair of index vectors, one entry per output row
///
/// Row positions are `u32` internally; callers guarantee every side has at
/// most `i32::MAX` rows, so each fits the output index type.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct JoinIndices {
    left: Vec<i32>,
    right: Vec<i32>,
}

impl JoinIndices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            left: Vec::with_capacity(capacity),
            right: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn push_match(&mut self, left: u32, right: u32) {
        self.left.push(left as i32);
        self.right.push(right as i32);
    }

    #[inline]
    pub fn push_left_unmatched(&mut self, left: u32) {
        self.left.push(left as i32);
        self.right.push(NO_MATCH);
    }

    #[inline]
    pub fn push_right_unmatched(&mut self, right: u32) {
        self.left.push(NO_MATCH);
        self.right.push(right as i32);
    }

    /// Move all rows of `other` to the end
    pub fn append(&mut self, mut other: JoinIndices) {
        self.left.append(&mut other.left);
        self.right.append(&mut other.right);
    }

    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    pub fn left(&self) -> &[i32] {
        &self.left
    }

    pub fn right(&self) -> &[i32] {
        &self.right
    }

    /// Seal into two `Int32` index columns
    pub fn finish(self) -> JoinResult {
        debug_assert!(self
            .left
            .iter()
            .zip(&self.right)
            .all(|(&l, &r)| l != NO_MATCH || r != NO_MATCH));
        let left_indices = Int32Array::from(self.left);
        let right_indices = Int32Array::from(self.right);
        JoinResult {
            left: Column::from_indices(left_indices.clone()),
            right: Column::from_indices(right_indices.clone()),
            left_indices,
            right_indices,
        }
    }
}

/// Output of a join: equally long left and right row index columns
///
/// Row `i` pairs `left[i]` with `right[i]`; [`NO_MATCH`] marks a missing
/// partner. Index columns never carry nulls.
#[derive(Debug, Clone)]
pub struct JoinResult {
    left: Column,
    right: Column,
    left_indices: Int32Array,
    right_indices: Int32Array,
}

impl JoinResult {
    pub fn left(&self) -> &Column {
        &self.left
    }

    pub fn right(&self) -> &Column {
        &self.right
    }

    pub fn into_parts(self) -> (Column, Column) {
        (self.left, self.right)
    }

    pub fn len(&self) -> usize {
        self.left.length()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn left_indices(&self) -> &Int32Array {
        &self.left_indices
    }

    pub fn right_indices(&self) -> &Int32Array {
        &self.right_indices
    }

    /// Output rows as `(left, right)` pairs, in output order
    pub fn pairs(&self) -> Vec<(i32, i32)> {
        self.left_indices()
            .values()
            .iter()
            .copied()
            .zip(self.right_indices().values().iter().copied())
            .collect()
    }

    /// Output rows as pairs in ascending order, for comparing results whose
    /// row order is unspecified
    pub fn sorted_pairs(&self) -> Vec<(i32, i32)> {
        let mut pairs = self.pairs();
        pairs.sort_unstable();
        pairs
    }

    /// Materialise the joined rows of two tables
    ///
    /// Left columns come first. Column names present in both tables get the
    /// respective prefix; unmatched rows hold nulls on the missing side.
    pub fn build_final_table(
        &self,
        left_table: &Table,
        right_table: &Table,
        left_table_prefix: &str,
        right_table_prefix: &str,
    ) -> CylonResult<Table> {
        let names = build_final_table_names(
            left_table.column_names(),
            right_table.column_names(),
            left_table_prefix,
            right_table_prefix,
        );

        let left_indices = self.left_indices();
        let right_indices = self.right_indices();
        let mut columns = Vec::with_capacity(names.len());
        for column in left_table.columns() {
            columns.push(column.take(left_indices)?);
        }
        for column in right_table.columns() {
            columns.push(column.take(right_indices)?);
        }
        Table::from_named_columns(names, columns)
    }
}

/// Output names for the joined table
fn build_final_table_names(
    left: &[String],
    right: &[String],
    left_table_prefix: &str,
    right_table_prefix: &str,
) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(left.len() + right.len());
    let mut column_name_index: HashMap<String, usize> = HashMap::new();

    for name in left {
        column_name_index.insert(name.clone(), names.len());
        names.push(name.clone());
    }

    for name in right {
        if let Some(&idx) = column_name_index.get(name) {
            names[idx] = format!("{}{}", left_table_prefix, names[idx]);
            let prefixed = format!("{}{}", right_table_prefix, name);
            column_name_index.insert(prefixed.clone(), names.len());
            names.push(prefixed);
        } else {
            column_name_index.insert(name.clone(), names.len());
            names.push(name.clone());
        }
    }
    names
}

impl From<JoinIndices> for JoinResult {
    fn from(indices: JoinIndices) -> Self {
        indices.finish()
    }
}
