//! Grabber error type.

use openhaptic_curves::CurveError;
use openhaptic_errors::{ConfigError, ErrorSeverity, OpenHapticError};

/// Errors surfaced by the grabber outside the tick loop.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GrabberError {
    /// A mandatory collaborator was not wired.
    #[error("Missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    /// A curve could not be loaded; curve force is disabled until a good
    /// reload.
    #[error("Curve unavailable: {0}")]
    Curve(#[from] CurveError),
}

impl GrabberError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            GrabberError::MissingCollaborator(_) => ErrorSeverity::Critical,
            GrabberError::Curve(_) => ErrorSeverity::Warning,
        }
    }
}

impl From<GrabberError> for OpenHapticError {
    fn from(err: GrabberError) -> Self {
        match err {
            GrabberError::MissingCollaborator(name) => OpenHapticError::MissingCollaborator(name),
            GrabberError::Curve(CurveError::TooFewSamples { .. }) => {
                OpenHapticError::Config(ConfigError::MissingCurve)
            }
            GrabberError::Curve(other) => OpenHapticError::other(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openhaptic_errors::ErrorCategory;

    #[test]
    fn test_missing_collaborator_is_critical() {
        let err = GrabberError::MissingCollaborator("force sink");
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        let top: OpenHapticError = err.into();
        assert_eq!(top.category(), ErrorCategory::Wiring);
        assert!(!top.is_recoverable());
    }

    #[test]
    fn test_short_curve_maps_to_config_error() {
        let err = GrabberError::from(CurveError::TooFewSamples { found: 1 });
        assert_eq!(err.severity(), ErrorSeverity::Warning);
        let top: OpenHapticError = err.into();
        assert_eq!(top.category(), ErrorCategory::Config);
        assert!(top.is_recoverable());
    }

    #[test]
    fn test_display() {
        let err = GrabberError::from(CurveError::Source("no file".to_string()));
        assert_eq!(err.to_string(), "Curve unavailable: Curve source failed: no file");
    }
}
