//! Significance filtering.

/// Values above this are not significant. Inclusive bound.
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.05;

/// Keep values `<= 0.05`, preserving order.
pub fn remove_non_significant(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .copied()
        .filter(|&v| v <= SIGNIFICANCE_THRESHOLD)
        .collect()
}

/// Filter `values` when `significant` is set, otherwise pass them through.
pub fn apply(values: Vec<f64>, significant: bool) -> Vec<f64> {
    if significant {
        remove_non_significant(&values)
    } else {
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_values_at_or_below_threshold_in_order() {
        assert_eq!(
            remove_non_significant(&[0.01, 0.06, 0.05, 0.2]),
            vec![0.01, 0.05]
        );
    }

    #[test]
    fn flag_off_is_identity() {
        let input = vec![0.3, 0.01, 0.9, 0.05];
        assert_eq!(apply(input.clone(), false), input);
    }

    #[test]
    fn flag_on_filters() {
        assert_eq!(apply(vec![0.5, 0.002], true), vec![0.002]);
    }

    #[test]
    fn empty_input() {
        assert!(remove_non_significant(&[]).is_empty());
    }
}
