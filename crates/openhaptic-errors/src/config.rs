//! Configuration error types.
//!
//! None of these stop the tick loop. The grabber collects them at wiring
//! time, logs each one, and runs with the clamped or truncated value.

use core::fmt;

use crate::common::ErrorSeverity;

/// Configuration problems detected while wiring a grabber.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Value out of range; it is clamped into `[min, max]`.
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Field name
        field: String,
        /// The invalid value
        value: String,
        /// Minimum allowed value
        min: String,
        /// Maximum allowed value
        max: String,
    },

    /// Value is NaN or infinite; the field falls back to its default.
    #[error("{field} must be finite")]
    NonFinite {
        /// Field name
        field: String,
    },

    /// Prony stiffness and time-constant lists differ in length; the
    /// integrator uses the shorter one.
    #[error("Prony series has {stiffness} stiffness terms but {tau} time constants")]
    PronyLengthMismatch {
        /// Number of stiffness coefficients
        stiffness: usize,
        /// Number of relaxation time constants
        tau: usize,
    },

    /// Curve force is selected but no usable curve is loaded.
    #[error("Curve force selected but no usable curve is loaded")]
    MissingCurve,
}

impl ConfigError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Warning
    }

    /// Create an out of range error for a numeric value.
    pub fn out_of_range<T: fmt::Debug>(field: impl Into<String>, value: T, min: T, max: T) -> Self {
        ConfigError::OutOfRange {
            field: field.into(),
            value: format!("{value:?}"),
            min: format!("{min:?}"),
            max: format!("{max:?}"),
        }
    }

    /// Create a non-finite error.
    pub fn non_finite(field: impl Into<String>) -> Self {
        ConfigError::NonFinite {
            field: field.into(),
        }
    }
}
