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

//! Column construction and gather tests

use arrow::array::{Array, AsArray, Int32Array};
use arrow::buffer::Buffer;
use arrow::datatypes::{Float32Type, UInt16Type};
use cylon_join::data_types::Type;
use cylon_join::error::Code;
use cylon_join::join::{inner_join, JoinContext};
use cylon_join::table::{Column, FromVector};

#[test]
fn test_view_joins_like_owned_column() {
    let values: Vec<u16> = vec![3, 1, 4, 1, 5];
    let view = Column::view(Buffer::from_vec(values.clone()), None, 5, Type::UInt16).unwrap();
    let owned = Column::from_vector(values.as_slice());
    assert_eq!(view.data_type(), Type::UInt16);
    assert_eq!(view.data().as_primitive::<UInt16Type>().values().to_vec(), values);

    let a = inner_join(&[view], &[Column::from_vector(&[1u16])], &JoinContext::sort()).unwrap();
    let b = inner_join(&[owned], &[Column::from_vector(&[1u16])], &JoinContext::sort()).unwrap();
    assert_eq!(a.pairs(), b.pairs());
    assert_eq!(a.pairs(), vec![(1, 0), (3, 0)]);
}

#[test]
fn test_view_with_validity() {
    // rows 0 and 2 valid
    let validity = Buffer::from_vec(vec![0b0000_0101u8]);
    let data = Buffer::from_vec(vec![7.0f32, 8.0, 9.0]);
    let column = Column::view(data, Some(validity), 3, Type::Float).unwrap();
    assert_eq!(column.null_count(), 1);
    assert!(column.validity().is_some());
    assert!(!column.is_valid(1));
    assert_eq!(column.as_primitive::<Float32Type>().unwrap().value(2), 9.0);

    let right = Column::from_vector(&[8.0f32, 9.0]);
    let result = inner_join(&[column], &[right], &JoinContext::hash()).unwrap();
    assert_eq!(result.sorted_pairs(), vec![(2, 1)]);
}

#[test]
fn test_view_rejects_bad_sizes() {
    let data = Buffer::from_vec(vec![1i64, 2, 3]);
    let err = Column::view(data, None, 4, Type::Int64).unwrap_err();
    assert_eq!(err.code(), Code::Invalid);
}

#[test]
fn test_gather_with_sentinels() {
    let column = Column::from_vector(&[10i8, 20, 30]);
    let taken = column.take(&Int32Array::from(vec![-1, 2, 0, -1])).unwrap();
    assert_eq!(taken.length(), 4);
    assert_eq!(taken.null_count(), 2);
    assert!(taken.data().is_null(0));
    assert_eq!(taken.data().as_primitive::<arrow::datatypes::Int8Type>().value(1), 30);
}

#[test]
fn test_all_types_round_trip_through_arrow() {
    for dtype in Type::ALL {
        let data = Buffer::from_vec(vec![0u8; 4 * dtype.byte_width()]);
        let column = Column::view(data, None, 4, dtype).unwrap();
        assert_eq!(column.data_type(), dtype);
        assert_eq!(Column::new(column.data().clone()).unwrap().data_type(), dtype);
    }
}
