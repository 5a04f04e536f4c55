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

//! Error handling for join operations

use std::fmt;

/// Numeric status codes reported alongside every error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Code {
    Ok = 0,
    OutOfMemory = 1,
    TypeError = 3,
    Invalid = 4,
    CapacityError = 6,
    IndexError = 7,
    NotImplemented = 10,
    ExecutionError = 42,
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Code::Ok => write!(f, "OK"),
            Code::OutOfMemory => write!(f, "Out of memory"),
            Code::TypeError => write!(f, "Type error"),
            Code::Invalid => write!(f, "Invalid"),
            Code::CapacityError => write!(f, "Capacity error"),
            Code::IndexError => write!(f, "Index error"),
            Code::NotImplemented => write!(f, "Not implemented"),
            Code::ExecutionError => write!(f, "Execution error"),
        }
    }
}

/// Main error type for join operations
#[derive(thiserror::Error, Debug)]
pub enum CylonError {
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Invalid operation: {0}")]
    Invalid(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Index out of bounds: {0}")]
    IndexError(String),

    #[error("Type error: {0}")]
    TypeError(String),

    #[error("Out of memory: requested {requested} bytes with {reserved} of {limit} bytes reserved")]
    OutOfMemory {
        requested: usize,
        reserved: usize,
        limit: usize,
    },

    #[error("Generic error with code {code}: {message}")]
    Generic { code: Code, message: String },
}

impl CylonError {
    /// Create a new error with a specific code and message
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        CylonError::Generic {
            code,
            message: message.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> Code {
        match self {
            CylonError::Arrow(_) => Code::ExecutionError,
            CylonError::Invalid(_) => Code::Invalid,
            CylonError::NotImplemented(_) => Code::NotImplemented,
            CylonError::IndexError(_) => Code::IndexError,
            CylonError::TypeError(_) => Code::TypeError,
            CylonError::OutOfMemory { .. } => Code::OutOfMemory,
            CylonError::Generic { code, .. } => *code,
        }
    }
}

/// Type alias for Results using CylonError
pub type CylonResult<T> = Result<T, CylonError>;
