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

//! Arrow type conversion utilities
//!
//! Provides conversion functions between Arrow data types and join key types.

use arrow::datatypes::DataType as ArrowDataType;

use crate::data_types::Type;

/// Convert Arrow data type to a join key type
///
/// Returns None for types that cannot be join keys.
pub fn to_cylon_type(a_type: &ArrowDataType) -> Option<Type> {
    match a_type {
        ArrowDataType::Int8 => Some(Type::Int8),
        ArrowDataType::Int16 => Some(Type::Int16),
        ArrowDataType::Int32 => Some(Type::Int32),
        ArrowDataType::Int64 => Some(Type::Int64),
        ArrowDataType::UInt8 => Some(Type::UInt8),
        ArrowDataType::UInt16 => Some(Type::UInt16),
        ArrowDataType::UInt32 => Some(Type::UInt32),
        ArrowDataType::UInt64 => Some(Type::UInt64),
        ArrowDataType::Float32 => Some(Type::Float),
        ArrowDataType::Float64 => Some(Type::Double),
        _ => None,
    }
}

/// Convert a join key type to the Arrow data type backing it
pub fn to_arrow_type(cylon_type: Type) -> ArrowDataType {
    match cylon_type {
        Type::Int8 => ArrowDataType::Int8,
        Type::Int16 => ArrowDataType::Int16,
        Type::Int32 => ArrowDataType::Int32,
        Type::Int64 => ArrowDataType::Int64,
        Type::UInt8 => ArrowDataType::UInt8,
        Type::UInt16 => ArrowDataType::UInt16,
        Type::UInt32 => ArrowDataType::UInt32,
        Type::UInt64 => ArrowDataType::UInt64,
        Type::Float => ArrowDataType::Float32,
        Type::Double => ArrowDataType::Float64,
    }
}
