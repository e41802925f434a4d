//! Errors reported by external collaborators.
//!
//! The capture service, force sink and pose source live outside this
//! workspace. Their failures are caught where they are called, logged, and
//! turned into a "no particle" or "hold last value" fallback.

use crate::common::ErrorSeverity;

/// Failure reported by an external collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollaboratorError {
    /// The collaborator is not reachable (bridge down, engine not running).
    #[error("Collaborator unavailable: {0}")]
    Unavailable(String),

    /// A particle handle no longer refers to a live particle.
    #[error("Invalid particle handle {0}")]
    InvalidHandle(u32),

    /// A specific operation failed.
    #[error("{operation} failed: {reason}")]
    Failed {
        /// Operation name (for example `capture` or `set_force`)
        operation: &'static str,
        /// Reason reported by the collaborator
        reason: String,
    },
}

impl CollaboratorError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CollaboratorError::Unavailable(_) => ErrorSeverity::Error,
            CollaboratorError::InvalidHandle(_) => ErrorSeverity::Warning,
            CollaboratorError::Failed { .. } => ErrorSeverity::Warning,
        }
    }

    /// Create an operation failure.
    pub fn failed(operation: &'static str, reason: impl Into<String>) -> Self {
        CollaboratorError::Failed {
            operation,
            reason: reason.into(),
        }
    }
}
