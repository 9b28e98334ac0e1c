//! Tests for the DataFusion accumulator adapters.

use super::*;
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use datafusion::common::ScalarValue;
use datafusion::logical_expr::Accumulator;
use std::sync::Arc;

fn ints(values: &[Option<i64>]) -> ArrayRef {
    Arc::new(Int64Array::from(values.to_vec()))
}

fn floats(values: &[f64]) -> ArrayRef {
    Arc::new(Float64Array::from(values.to_vec()))
}

/// Turns an accumulator's state scalars into the array form `merge_batch` receives.
fn state_arrays(acc: &mut dyn Accumulator) -> Vec<ArrayRef> {
    acc.state()
        .unwrap()
        .into_iter()
        .map(|scalar| scalar.to_array().unwrap())
        .collect()
}

#[cfg(test)]
mod frequency_tests {
    use super::*;

    #[test]
    fn test_summary_skips_nulls() {
        let mut acc = FrequencyAccumulator::new(FrequencyOutput::Summary);
        acc.update_batch(&[ints(&[Some(1), None, Some(2), Some(2), Some(3), Some(4)])])
            .unwrap();

        assert_eq!(acc.descriptives().table().total(), 5);
        let ScalarValue::Utf8(Some(json)) = acc.evaluate().unwrap() else {
            panic!("descriptives should return text");
        };
        assert!(json.starts_with(r#"{"n":5,"sum":12.0,"sum_of_squares":34.0"#));
    }

    #[test]
    fn test_summary_of_nothing_is_empty_object() {
        let mut acc = FrequencyAccumulator::new(FrequencyOutput::Summary);
        assert_eq!(
            acc.evaluate().unwrap(),
            ScalarValue::Utf8(Some("{}".to_string()))
        );
    }

    #[test]
    fn test_mode_and_mode_freq() {
        let mut mode = FrequencyAccumulator::new(FrequencyOutput::Mode);
        mode.update_batch(&[floats(&[1.0, 2.0, 2.0, 3.0])]).unwrap();
        assert_eq!(mode.evaluate().unwrap(), ScalarValue::Float64(Some(2.0)));

        let mut mode_freq = FrequencyAccumulator::new(FrequencyOutput::ModeFreq);
        mode_freq
            .update_batch(&[floats(&[1.0, 2.5, 2.5, 3.0])])
            .unwrap();
        assert_eq!(
            mode_freq.evaluate().unwrap(),
            ScalarValue::Utf8(Some("2.5;2".to_string()))
        );
    }

    #[test]
    fn test_mode_of_nothing_is_null() {
        let mut acc = FrequencyAccumulator::new(FrequencyOutput::Mode);
        assert_eq!(acc.evaluate().unwrap(), ScalarValue::Float64(None));
    }

    #[test]
    fn test_rejects_text_input() {
        let mut acc = FrequencyAccumulator::new(FrequencyOutput::Summary);
        let text: ArrayRef = Arc::new(StringArray::from(vec!["a", "b"]));
        let err = acc.update_batch(&[text]).unwrap_err();
        assert!(err.to_string().contains("Unsupported value type"));
    }

    #[test]
    fn test_rejects_non_finite_values() {
        for bad in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let mut acc = FrequencyAccumulator::new(FrequencyOutput::Summary);
            let err = acc.update_batch(&[floats(&[1.0, bad])]).unwrap_err();
            assert!(err.to_string().contains("non-finite"), "{err}");
            assert!(acc.descriptives().table().is_empty());
        }
    }

    #[test]
    fn test_state_round_trip_through_merge() {
        let mut left = FrequencyAccumulator::new(FrequencyOutput::Summary);
        left.update_batch(&[floats(&[1.0, 2.0])]).unwrap();
        let mut right = FrequencyAccumulator::new(FrequencyOutput::Summary);
        right.update_batch(&[floats(&[2.0, 3.0, 4.0])]).unwrap();

        let states = state_arrays(&mut right);
        left.merge_batch(&states).unwrap();

        let table = left.descriptives().table();
        assert_eq!(table.total(), 5);
        assert_eq!(table.count_of(2.0), 2);
    }

    #[test]
    fn test_merge_rejects_wrong_arity() {
        let mut acc = FrequencyAccumulator::new(FrequencyOutput::Mode);
        assert!(acc.merge_batch(&[floats(&[1.0])]).is_err());
    }
}

#[cfg(test)]
mod bounded_tests {
    use super::*;

    fn rows() -> ArrayRef {
        ints(&[Some(10), Some(20), Some(30), Some(40), Some(50)])
    }

    fn capacity(k: i64) -> ArrayRef {
        ints(&[Some(k); 5])
    }

    #[test]
    fn test_first_three() {
        let mut acc = BoundedListAccumulator::new(ListPolicy::First, 1);
        acc.update_batch(&[rows(), capacity(3)]).unwrap();
        assert_eq!(
            acc.evaluate().unwrap(),
            ScalarValue::Utf8(Some("10;20;30".to_string()))
        );
    }

    #[test]
    fn test_last_three_across_batches() {
        let mut acc = BoundedListAccumulator::new(ListPolicy::Last, 1);
        acc.update_batch(&[ints(&[Some(10), Some(20)]), ints(&[Some(3), Some(3)])])
            .unwrap();
        acc.update_batch(&[ints(&[Some(30), Some(40), Some(50)]), ints(&[Some(9); 3])])
            .unwrap();

        assert_eq!(acc.list().capacity(), Some(3));
        assert_eq!(
            acc.evaluate().unwrap(),
            ScalarValue::Utf8(Some("30;40;50".to_string()))
        );
    }

    #[test]
    fn test_single_value_is_bare() {
        let mut acc = BoundedListAccumulator::new(ListPolicy::First, 1);
        acc.update_batch(&[ints(&[Some(5)])]).unwrap();
        assert_eq!(
            acc.evaluate().unwrap(),
            ScalarValue::Utf8(Some("5".to_string()))
        );
    }

    #[test]
    fn test_no_rows_is_null() {
        let mut acc = BoundedListAccumulator::new(ListPolicy::Last, 1);
        acc.update_batch(&[ints(&[None, None])]).unwrap();
        assert_eq!(acc.evaluate().unwrap(), ScalarValue::Utf8(None));
    }

    #[test]
    fn test_zero_capacity_fails() {
        let mut acc = BoundedListAccumulator::new(ListPolicy::First, 1);
        let err = acc.update_batch(&[rows(), capacity(0)]).unwrap_err();
        assert!(err.to_string().contains("capacity must be positive"));
    }

    #[test]
    fn test_zero_capacity_fails_on_all_null_rows() {
        let mut acc = BoundedListAccumulator::new(ListPolicy::First, 1);
        let err = acc
            .update_batch(&[ints(&[None, None]), ints(&[Some(0), Some(0)])])
            .unwrap_err();
        assert!(err.to_string().contains("capacity must be positive"));
    }

    #[test]
    fn test_all_null_rows_still_fix_capacity() {
        let mut acc = BoundedListAccumulator::new(ListPolicy::Last, 1);
        acc.update_batch(&[ints(&[None]), ints(&[Some(2)])]).unwrap();
        assert_eq!(acc.list().capacity(), Some(2));
        assert_eq!(acc.evaluate().unwrap(), ScalarValue::Utf8(None));

        acc.update_batch(&[ints(&[Some(7), Some(8), Some(9)]), ints(&[Some(2); 3])])
            .unwrap();
        assert_eq!(
            acc.evaluate().unwrap(),
            ScalarValue::Utf8(Some("8;9".to_string()))
        );
    }

    #[test]
    fn test_text_values_are_captured() {
        let mut acc = BoundedListAccumulator::new(ListPolicy::First, 2);
        let text: ArrayRef = Arc::new(StringArray::from(vec!["a", "b", "c"]));
        acc.update_batch(&[text]).unwrap();
        assert_eq!(
            acc.evaluate().unwrap(),
            ScalarValue::Utf8(Some("a;b".to_string()))
        );
    }

    #[test]
    fn test_state_round_trip_through_merge() {
        let mut left = BoundedListAccumulator::new(ListPolicy::Last, 1);
        left.update_batch(&[ints(&[Some(1), Some(2)]), ints(&[Some(3), Some(3)])])
            .unwrap();
        let mut right = BoundedListAccumulator::new(ListPolicy::Last, 1);
        right
            .update_batch(&[ints(&[Some(3), Some(4)]), ints(&[Some(3), Some(3)])])
            .unwrap();

        let states = state_arrays(&mut right);
        left.merge_batch(&states).unwrap();
        assert_eq!(
            left.evaluate().unwrap(),
            ScalarValue::Utf8(Some("2;3;4".to_string()))
        );
    }
}

#[cfg(test)]
mod registration_tests {
    use super::*;

    #[test]
    fn test_all_aggregates_names() {
        let names: Vec<String> = all_aggregates(1)
            .iter()
            .map(|udaf| udaf.name().to_string())
            .collect();
        assert_eq!(
            names,
            vec![DESCRIPTIVES, MODE, MODE_FREQ, FIRST, LAST]
        );
    }

    #[test]
    fn test_list_aggregates_have_aliases() {
        assert_eq!(first_udaf(1).aliases(), &["firstn".to_string()]);
        assert_eq!(last_udaf(1).aliases(), &["lastn".to_string()]);
    }

    #[test]
    fn test_supported_numeric_types() {
        assert!(is_supported_numeric(&DataType::Int32));
        assert!(is_supported_numeric(&DataType::Float64));
        assert!(is_supported_numeric(&DataType::Null));
        assert!(!is_supported_numeric(&DataType::Utf8));
    }
}
