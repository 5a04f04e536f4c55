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

//! Column type

use std::sync::Arc;

use arrow::array::{
    make_array, Array, ArrayData, ArrayRef, ArrowPrimitiveType, AsArray, Float32Array,
    Float64Array, Int16Array, Int32Array, Int64Array, Int8Array, PrimitiveArray, UInt16Array,
    UInt32Array, UInt64Array, UInt8Array,
};
use arrow::buffer::{BooleanBuffer, Buffer, NullBuffer};
use arrow::compute::take;

use crate::arrow::arrow_types::{to_arrow_type, to_cylon_type};
use crate::data_types::{Type, INDEX_TYPE};
use crate::error::{CylonError, CylonResult};

/// A fixed-width column of values with an optional validity mask
///
/// The values live in an Arrow primitive array; the array's null buffer is the
/// validity mask (a set bit marks a present value). Columns are cheap to clone
/// since the underlying buffers are reference counted, and join operations
/// only ever read them.
#[derive(Debug, Clone)]
pub struct Column {
    type_: Type,
    data_: ArrayRef,
}

impl Column {
    /// Wrap an Arrow array
    ///
    /// Fails with a type error when the array is not one of the supported
    /// fixed-width types.
    pub fn new(data: ArrayRef) -> CylonResult<Self> {
        let type_ = to_cylon_type(data.data_type()).ok_or_else(|| {
            CylonError::TypeError(format!(
                "unsupported column type {:?}, only fixed-width numeric columns are supported",
                data.data_type()
            ))
        })?;
        Ok(Self { type_, data_: data })
    }

    /// Build a column view over a raw value buffer
    ///
    /// `data` must hold at least `size` values of `dtype`. When `validity` is
    /// given it must hold at least `size` bits, least significant bit first.
    /// The buffers are shared, not copied.
    pub fn view(
        data: Buffer,
        validity: Option<Buffer>,
        size: usize,
        dtype: Type,
    ) -> CylonResult<Self> {
        let required = size.checked_mul(dtype.byte_width()).ok_or_else(|| {
            CylonError::Invalid(format!("column of {} {} values is too large", size, dtype))
        })?;
        if data.len() < required {
            return Err(CylonError::Invalid(format!(
                "data buffer holds {} bytes but {} {} values need {}",
                data.len(),
                size,
                dtype,
                required
            )));
        }

        let nulls = match validity {
            Some(bits) => {
                if bits.len().saturating_mul(8) < size {
                    return Err(CylonError::Invalid(format!(
                        "validity buffer holds {} bits but the column has {} rows",
                        bits.len() * 8,
                        size
                    )));
                }
                Some(NullBuffer::new(BooleanBuffer::new(bits, 0, size)))
            }
            None => None,
        };

        let array_data = ArrayData::builder(to_arrow_type(dtype))
            .len(size)
            .add_buffer(data)
            .nulls(nulls)
            .align_buffers(true)
            .build()?;

        Ok(Self {
            type_: dtype,
            data_: make_array(array_data),
        })
    }

    /// Wrap a row index array, the output type of every join
    pub fn from_indices(indices: Int32Array) -> Self {
        Self {
            type_: INDEX_TYPE,
            data_: Arc::new(indices),
        }
    }

    /// Return the data wrapped by column
    pub fn data(&self) -> &ArrayRef {
        &self.data_
    }

    /// Return the element type of the column
    pub fn data_type(&self) -> Type {
        self.type_
    }

    /// Return the number of rows
    pub fn length(&self) -> usize {
        self.data_.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data_.is_empty()
    }

    pub fn null_count(&self) -> usize {
        self.data_.null_count()
    }

    /// The validity mask, if the column carries one
    pub fn validity(&self) -> Option<&NullBuffer> {
        self.data_.nulls()
    }

    pub fn is_valid(&self, row: usize) -> bool {
        self.data_.is_valid(row)
    }

    /// Typed view of the values
    pub fn as_primitive<T: ArrowPrimitiveType>(&self) -> CylonResult<&PrimitiveArray<T>> {
        self.data_.as_primitive_opt::<T>().ok_or_else(|| {
            CylonError::TypeError(format!(
                "column of type {} accessed as {:?}",
                self.type_,
                T::DATA_TYPE
            ))
        })
    }

    /// Gather rows by index, producing a null for every sentinel index
    pub fn take(&self, indices: &Int32Array) -> CylonResult<Column> {
        let length = self.length();
        if let Some(&bad) = indices.values().iter().find(|&&i| i >= 0 && i as usize >= length) {
            return Err(CylonError::IndexError(format!(
                "row index {} out of bounds for column of {} rows",
                bad, length
            )));
        }
        let take_indices: Int32Array = indices
            .values()
            .iter()
            .map(|&i| if i >= 0 { Some(i) } else { None })
            .collect();
        let taken = take(self.data_.as_ref(), &take_indices, None)?;
        Ok(Self {
            type_: self.type_,
            data_: taken,
        })
    }
}

/// Creating columns from vectors of primitive values
pub trait FromVector<T> {
    fn from_vector(data: &[T]) -> Column;

    /// Nullable variant, `None` becomes an invalid row
    fn from_options(data: &[Option<T>]) -> Column;
}

macro_rules! impl_from_vector {
    ($native:ty, $array:ty, $type_:expr) => {
        impl FromVector<$native> for Column {
            fn from_vector(data: &[$native]) -> Column {
                Column {
                    type_: $type_,
                    data_: Arc::new(<$array>::from(data.to_vec())),
                }
            }

            fn from_options(data: &[Option<$native>]) -> Column {
                Column {
                    type_: $type_,
                    data_: Arc::new(<$array>::from(data.to_vec())),
                }
            }
        }
    };
}

impl_from_vector!(i8, Int8Array, Type::Int8);
impl_from_vector!(i16, Int16Array, Type::Int16);
impl_from_vector!(i32, Int32Array, Type::Int32);
impl_from_vector!(i64, Int64Array, Type::Int64);
impl_from_vector!(u8, UInt8Array, Type::UInt8);
impl_from_vector!(u16, UInt16Array, Type::UInt16);
impl_from_vector!(u32, UInt32Array, Type::UInt32);
impl_from_vector!(u64, UInt64Array, Type::UInt64);
impl_from_vector!(f32, Float32Array, Type::Float);
impl_from_vector!(f64, Float64Array, Type::Double);
