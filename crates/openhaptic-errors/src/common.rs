//! Top-level error type and classification shared by all OpenHaptic crates.

use core::fmt;

use crate::{CollaboratorError, ConfigError};

/// Top-level error type that can wrap all OpenHaptic sub-errors.
#[derive(Debug, thiserror::Error)]
pub enum OpenHapticError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// External collaborator failures
    #[error("Collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),

    /// Mandatory wiring missing at initialisation
    #[error("Missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl OpenHapticError {
    /// Get the error category for classification.
    pub fn category(&self) -> ErrorCategory {
        match self {
            OpenHapticError::Config(_) => ErrorCategory::Config,
            OpenHapticError::Collaborator(_) => ErrorCategory::Collaborator,
            OpenHapticError::MissingCollaborator(_) => ErrorCategory::Wiring,
            OpenHapticError::Other(_) => ErrorCategory::Other,
        }
    }

    /// Get the error severity level.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            OpenHapticError::Config(e) => e.severity(),
            OpenHapticError::Collaborator(e) => e.severity(),
            OpenHapticError::MissingCollaborator(_) => ErrorSeverity::Critical,
            OpenHapticError::Other(_) => ErrorSeverity::Error,
        }
    }

    /// Check if the tick loop can keep running after this error.
    pub fn is_recoverable(&self) -> bool {
        self.severity() < ErrorSeverity::Critical
    }

    /// Create a generic error with a message.
    pub fn other(msg: impl Into<String>) -> Self {
        OpenHapticError::Other(msg.into())
    }
}

/// Error category for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCategory {
    /// Configuration errors
    Config = 0,
    /// External collaborator failures
    Collaborator = 1,
    /// Missing mandatory wiring
    Wiring = 2,
    /// Other errors
    Other = 255,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "Config"),
            ErrorCategory::Collaborator => write!(f, "Collaborator"),
            ErrorCategory::Wiring => write!(f, "Wiring"),
            ErrorCategory::Other => write!(f, "Other"),
        }
    }
}

/// Error severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ErrorSeverity {
    /// Informational, no action required
    Info = 0,
    /// Warning, the pipeline degraded but keeps running
    Warning = 1,
    /// Error, an operation failed
    Error = 2,
    /// Critical, the grabber cannot run
    Critical = 3,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
