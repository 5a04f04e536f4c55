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

//! Table - a named set of equally long columns

use std::sync::Arc;

use arrow::array::{ArrayRef, RecordBatch};
use arrow::datatypes::{Field, Schema};

use crate::arrow::arrow_types::to_arrow_type;
use crate::error::{CylonError, CylonResult};

pub mod column;
pub use column::{Column, FromVector};

/// A set of columns sharing one row count
#[derive(Debug, Clone)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Column>,
}

impl Table {
    /// Create a table with generated column names `c0`, `c1`, ...
    pub fn new(columns: Vec<Column>) -> CylonResult<Self> {
        let names = (0..columns.len()).map(|i| format!("c{}", i)).collect();
        Self::from_named_columns(names, columns)
    }

    /// Create a table from column names and columns
    pub fn from_named_columns(names: Vec<String>, columns: Vec<Column>) -> CylonResult<Self> {
        if names.len() != columns.len() {
            return Err(CylonError::Invalid(format!(
                "{} column names given for {} columns",
                names.len(),
                columns.len()
            )));
        }
        if let Some(first) = columns.first() {
            let rows = first.length();
            if let Some((i, c)) = columns.iter().enumerate().find(|(_, c)| c.length() != rows) {
                return Err(CylonError::Invalid(format!(
                    "column {} has {} rows, expected {}",
                    i,
                    c.length(),
                    rows
                )));
            }
        }
        Ok(Self { names, columns })
    }

    /// Get the number of columns
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows
    pub fn rows(&self) -> usize {
        self.columns.first().map(Column::length).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows() == 0
    }

    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Select columns by index, typically the key columns of a join
    pub fn project(&self, column_indices: &[usize]) -> CylonResult<Vec<Column>> {
        column_indices
            .iter()
            .map(|&i| {
                self.columns.get(i).cloned().ok_or_else(|| {
                    CylonError::IndexError(format!(
                        "column index {} out of bounds for table with {} columns",
                        i,
                        self.columns.len()
                    ))
                })
            })
            .collect()
    }

    /// Convert into an Arrow record batch, every field nullable
    pub fn to_record_batch(&self) -> CylonResult<RecordBatch> {
        let fields: Vec<Field> = self
            .names
            .iter()
            .zip(&self.columns)
            .map(|(name, c)| Field::new(name, to_arrow_type(c.data_type()), true))
            .collect();
        let arrays: Vec<ArrayRef> = self.columns.iter().map(|c| c.data().clone()).collect();
        Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_ragged_columns() {
        let result = Table::new(vec![
            Column::from_vector(&[1i32, 2, 3]),
            Column::from_vector(&[1i32, 2]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_project_and_batch() {
        let table = Table::from_named_columns(
            vec!["id".to_string(), "score".to_string()],
            vec![
                Column::from_vector(&[1i64, 2]),
                Column::from_vector(&[0.5f64, 1.5]),
            ],
        )
        .unwrap();
        assert_eq!(table.rows(), 2);
        assert_eq!(table.num_columns(), 2);

        let keys = table.project(&[1]).unwrap();
        assert_eq!(keys.len(), 1);
        assert!(table.project(&[2]).is_err());

        let batch = table.to_record_batch().unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.schema().field(1).name(), "score");
    }
}
