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

//! Data types accepted by the join engine
//!
//! Only fixed-width numeric types can be join keys. The set is closed so that
//! key extraction can be resolved to a monomorphized kernel once per call.

use std::fmt;

/// Element type tag of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    /// Signed 8-bit little-endian integer
    Int8,
    /// Signed 16-bit little-endian integer
    Int16,
    /// Signed 32-bit little-endian integer
    Int32,
    /// Signed 64-bit little-endian integer
    Int64,
    /// Unsigned 8-bit little-endian integer
    UInt8,
    /// Unsigned 16-bit little-endian integer
    UInt16,
    /// Unsigned 32-bit little-endian integer
    UInt32,
    /// Unsigned 64-bit little-endian integer
    UInt64,
    /// 4-byte floating point value
    Float,
    /// 8-byte floating point value
    Double,
}

impl Type {
    /// Every supported type, in declaration order
    pub const ALL: [Type; 10] = [
        Type::Int8,
        Type::Int16,
        Type::Int32,
        Type::Int64,
        Type::UInt8,
        Type::UInt16,
        Type::UInt32,
        Type::UInt64,
        Type::Float,
        Type::Double,
    ];

    /// Width of a single value in bytes
    pub fn byte_width(&self) -> usize {
        match self {
            Type::Int8 | Type::UInt8 => 1,
            Type::Int16 | Type::UInt16 => 2,
            Type::Int32 | Type::UInt32 | Type::Float => 4,
            Type::Int64 | Type::UInt64 | Type::Double => 8,
        }
    }

    pub fn is_floating(&self) -> bool {
        matches!(self, Type::Float | Type::Double)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Type::Int8 => "int8",
            Type::Int16 => "int16",
            Type::Int32 => "int32",
            Type::Int64 => "int64",
            Type::UInt8 => "uint8",
            Type::UInt16 => "uint16",
            Type::UInt32 => "uint32",
            Type::UInt64 => "uint64",
            Type::Float => "float",
            Type::Double => "double",
        };
        f.write_str(name)
    }
}

/// Type of the index columns produced by every join
pub const INDEX_TYPE: Type = Type::Int32;
