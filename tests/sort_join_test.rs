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

//! Sort join operation tests
//!
//! The sort strategy has a defined output order: matches by ascending key,
//! left-major within a key, then unmatched right rows.

use cylon_join::join::{
    inner_join, join, left_join, outer_join, JoinAlgorithm, JoinContext, JoinType, NullEquality,
};
use cylon_join::table::{Column, FromVector};

fn sort_ctx() -> JoinContext {
    JoinContext::view(false, JoinAlgorithm::Sort, 0)
}

/// Inner, left and outer join of the left [0,0,4,5,5] / right [0,0,2,3,5] pair
fn check_joins(left: &Column, right: &Column) {
    let ctx = sort_ctx();

    let result = inner_join(&[left.clone()], &[right.clone()], &ctx).unwrap();
    assert_eq!(result.pairs(), vec![(0, 0), (0, 1), (1, 0), (1, 1), (3, 4), (4, 4)]);

    let result = left_join(&[left.clone()], &[right.clone()], &ctx).unwrap();
    assert_eq!(
        result.pairs(),
        vec![(0, 0), (0, 1), (1, 0), (1, 1), (2, -1), (3, 4), (4, 4)]
    );

    let result = outer_join(left, right).unwrap();
    assert_eq!(
        result.pairs(),
        vec![(0, 0), (0, 1), (1, 0), (1, 1), (2, -1), (3, 4), (4, 4), (-1, 2), (-1, 3)]
    );
}

macro_rules! typed_sort_join_test {
    ($name:ident, $t:ty) => {
        #[test]
        fn $name() {
            let left = [0, 0, 4, 5, 5].map(|v: i32| v as $t);
            let right = [0, 0, 2, 3, 5].map(|v: i32| v as $t);
            check_joins(
                &Column::from_vector(left.as_slice()),
                &Column::from_vector(right.as_slice()),
            );
        }
    };
}

typed_sort_join_test!(test_sort_join_int8, i8);
typed_sort_join_test!(test_sort_join_int16, i16);
typed_sort_join_test!(test_sort_join_int32, i32);
typed_sort_join_test!(test_sort_join_int64, i64);
typed_sort_join_test!(test_sort_join_uint8, u8);
typed_sort_join_test!(test_sort_join_uint16, u16);
typed_sort_join_test!(test_sort_join_uint32, u32);
typed_sort_join_test!(test_sort_join_uint64, u64);
typed_sort_join_test!(test_sort_join_float, f32);
typed_sort_join_test!(test_sort_join_double, f64);

#[test]
fn test_matches_ordered_by_key() {
    let left = Column::from_vector(&[9i64, 3, 7, 3]);
    let right = Column::from_vector(&[7i64, 3, 9]);
    let result = inner_join(&[left], &[right], &sort_ctx()).unwrap();
    // key 3 (left rows 1, 3), key 7, key 9
    assert_eq!(result.pairs(), vec![(1, 1), (3, 1), (2, 0), (0, 2)]);
}

#[test]
fn test_sorted_input_flag() {
    let left = Column::from_vector(&[1i32, 2, 3]);
    let right = Column::from_vector(&[1i32, 3]);
    let ctx = JoinContext::view(true, JoinAlgorithm::Sort, 0);
    let result = inner_join(&[left], &[right], &ctx).unwrap();
    assert_eq!(result.pairs(), vec![(0, 0), (2, 1)]);
}

#[test]
fn test_sorted_input_flag_on_unsorted_data() {
    // the flag is verified, so a wrong hint still gives the right answer
    let left = Column::from_vector(&[3i32, 1, 2]);
    let right = Column::from_vector(&[2i32, 3, 1]);
    let ctx = JoinContext::view(true, JoinAlgorithm::Sort, 0);
    let result = inner_join(&[left], &[right], &ctx).unwrap();
    assert_eq!(result.pairs(), vec![(1, 2), (2, 0), (0, 1)]);
}

#[test]
fn test_float_special_values() {
    let left = Column::from_vector(&[0.0f64, f64::NAN, 1.5]);
    let right = Column::from_vector(&[-0.0f64, f64::NAN, 2.5]);
    let result = inner_join(&[left], &[right], &sort_ctx()).unwrap();
    // NaN sorts last
    assert_eq!(result.pairs(), vec![(0, 0), (1, 1)]);
}

#[test]
fn test_null_keys_never_match_by_default() {
    let left = Column::from_options(&[Some(1i32), None, Some(2)]);
    let right = Column::from_options(&[None, Some(1i32)]);

    let result = inner_join(&[left.clone()], &[right.clone()], &sort_ctx()).unwrap();
    assert_eq!(result.pairs(), vec![(0, 1)]);

    let result = left_join(&[left.clone()], &[right.clone()], &sort_ctx()).unwrap();
    assert_eq!(result.pairs(), vec![(0, 1), (2, -1), (1, -1)]);

    let result = outer_join(&left, &right).unwrap();
    assert_eq!(result.pairs(), vec![(0, 1), (2, -1), (1, -1), (-1, 0)]);
}

#[test]
fn test_null_equals_null() {
    let left = Column::from_options(&[Some(1i32), None, Some(2)]);
    let right = Column::from_options(&[None, Some(1i32)]);
    let ctx = sort_ctx().with_null_equality(NullEquality::NullEqualsNull);

    // None sorts before every value
    let result = inner_join(&[left.clone()], &[right.clone()], &ctx).unwrap();
    assert_eq!(result.pairs(), vec![(1, 0), (0, 1)]);

    let result = join(&[left], &[right], JoinType::FullOuter, &ctx).unwrap();
    assert_eq!(result.pairs(), vec![(1, 0), (0, 1), (2, -1)]);
}

#[test]
fn test_all_unmatched() {
    let left = Column::from_vector(&[5u16, 6]);
    let right = Column::from_vector(&[1u16, 2]);
    let result = outer_join(&left, &right).unwrap();
    assert_eq!(result.pairs(), vec![(0, -1), (1, -1), (-1, 0), (-1, 1)]);
    let result = inner_join(&[left], &[right], &sort_ctx()).unwrap();
    assert!(result.is_empty());
}
