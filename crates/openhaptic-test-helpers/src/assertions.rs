//! Assertion macros for force traces.

/// Assert that two floating-point values are within `tolerance`.
///
/// ```rust
/// use openhaptic_test_helpers::assert_approx_eq;
///
/// assert_approx_eq!(2.5_f32, 2.5001, 1e-3);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $tolerance:expr $(,)?) => {
        let left = $left;
        let right = $right;
        let tolerance = $tolerance;
        let diff = (left - right).abs();
        if !(diff <= tolerance) {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}`,\n  tolerance: `{:?}`",
                left, right, diff, tolerance
            );
        }
    };
    ($left:expr, $right:expr, $tolerance:expr, $($arg:tt)+) => {
        let left = $left;
        let right = $right;
        let tolerance = $tolerance;
        let diff = (left - right).abs();
        if !(diff <= tolerance) {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}`,\n  tolerance: `{:?}`: {}",
                left, right, diff, tolerance, format_args!($($arg)+)
            );
        }
    };
}

/// Assert that a sequence never decreases.
///
/// ```rust
/// use openhaptic_test_helpers::assert_non_decreasing;
///
/// assert_non_decreasing!(&[0.0_f32, 0.5, 0.5, 1.0]);
/// ```
#[macro_export]
macro_rules! assert_non_decreasing {
    ($collection:expr $(,)?) => {
        let collection = $collection;
        let mut iter = collection.iter();
        if let Some(mut prev) = iter.next() {
            for (i, curr) in iter.enumerate() {
                if prev > curr {
                    panic!(
                        "assertion failed: sequence decreases\n  at index {}: {:?} > {:?}",
                        i + 1,
                        prev,
                        curr
                    );
                }
                prev = curr;
            }
        }
    };
}

/// Assert that every value in a sequence is finite.
///
/// ```rust
/// use openhaptic_test_helpers::assert_all_finite;
///
/// assert_all_finite!(&[0.0_f32, 1.0, -3.5]);
/// ```
#[macro_export]
macro_rules! assert_all_finite {
    ($collection:expr $(,)?) => {
        for (i, value) in $collection.iter().enumerate() {
            if !value.is_finite() {
                panic!("assertion failed: value at index {} is {:?}", i, value);
            }
        }
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_approx_eq_passes() {
        assert_approx_eq!(1.0_f32, 1.0005, 1e-3);
        assert_approx_eq!(5.0_f64, 5.0, 0.0, "exact at {}", "the end");
    }

    #[test]
    #[should_panic(expected = "left ≈ right")]
    fn test_approx_eq_fails() {
        assert_approx_eq!(1.0_f32, 1.1, 1e-3);
    }

    #[test]
    #[should_panic(expected = "left ≈ right")]
    fn test_approx_eq_rejects_nan() {
        assert_approx_eq!(f32::NAN, 1.0, 1.0);
    }

    #[test]
    fn test_non_decreasing_allows_plateaus() {
        assert_non_decreasing!(&[0.0_f32, 0.0, 1.0, 1.0, 2.0]);
        assert_non_decreasing!(&Vec::<f32>::new());
    }

    #[test]
    #[should_panic(expected = "at index 2")]
    fn test_non_decreasing_reports_index() {
        assert_non_decreasing!(&[0.0_f32, 1.0, 0.5]);
    }

    #[test]
    #[should_panic(expected = "index 1")]
    fn test_all_finite_catches_nan() {
        assert_all_finite!(&[0.0_f32, f32::NAN]);
    }
}
