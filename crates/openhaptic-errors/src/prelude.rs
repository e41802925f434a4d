//! Prelude module for convenient error handling imports.
//!
//! # Example
//!
//! ```
//! use openhaptic_errors::prelude::*;
//!
//! fn release() -> CollaboratorResult {
//!     Err(CollaboratorError::failed("release", "no particle"))
//! }
//!
//! assert!(release().is_err());
//! ```

pub use crate::{
    CollaboratorResult, Result,
    collaborator::CollaboratorError,
    common::{ErrorCategory, ErrorSeverity, OpenHapticError},
    config::ConfigError,
};
