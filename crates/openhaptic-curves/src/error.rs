//! Error types for curve construction and loading.

use std::fmt;

/// Error type for curve operations.
///
/// None of these are fatal to the haptic loop: a pipeline without a usable
/// curve produces zero curve force and keeps ticking.
#[derive(Debug, Clone, PartialEq)]
pub enum CurveError {
    /// Fewer than two valid samples survived validation.
    ///
    /// Rows that are non-finite, duplicate or out of order are discarded
    /// before this check.
    TooFewSamples {
        /// Number of valid samples found.
        found: usize,
    },
    /// A scale factor is zero, negative or non-finite.
    InvalidScale {
        /// Which axis ("x" or "y").
        axis: &'static str,
        /// The rejected value.
        value: f32,
    },
    /// The curve source failed to produce samples.
    Source(String),
}

impl fmt::Display for CurveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewSamples { found } => {
                write!(f, "Not enough points in curve: need at least 2, found {found}")
            }
            Self::InvalidScale { axis, value } => {
                write!(f, "Invalid {axis} scale {value}: must be finite and positive")
            }
            Self::Source(msg) => write!(f, "Curve source failed: {msg}"),
        }
    }
}

impl std::error::Error for CurveError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_too_few() {
        let err = CurveError::TooFewSamples { found: 1 };
        let msg = format!("{err}");
        assert!(msg.contains("at least 2"));
        assert!(msg.contains("found 1"));
    }

    #[test]
    fn test_error_display_scale() {
        let err = CurveError::InvalidScale {
            axis: "y",
            value: -1.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("y scale"));
        assert!(msg.contains("-1"));
    }

    #[test]
    fn test_error_is_std_error() {
        let err = CurveError::Source("missing asset".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
