//! Centralized error types for OpenHaptic
//!
//! This crate provides the error taxonomy shared by the curve, filter and
//! grabber crates.
//!
//! # Architecture
//!
//! - [`common`]: Top-level error type and severity classification
//! - [`config`]: Non-fatal configuration problems reported at wiring time
//! - [`collaborator`]: Failures reported by external collaborators (capture
//!   service, force sink, pose source)
//!
//! # Degradation policy
//!
//! Configuration errors and collaborator failures never halt the tick loop.
//! They are reported once (configuration) or logged at the call site
//! (collaborators) and the affected component degrades to a zero or held
//! contribution.
//!
//! # Example
//!
//! ```
//! use openhaptic_errors::prelude::*;
//!
//! fn check_thickness(value: f32) -> Result<f32> {
//!     if !value.is_finite() {
//!         return Err(ConfigError::non_finite("thickness").into());
//!     }
//!     Ok(value)
//! }
//!
//! assert!(check_thickness(f32::NAN).is_err());
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod collaborator;
pub mod common;
pub mod config;
pub mod prelude;

pub use collaborator::CollaboratorError;
pub use common::{ErrorCategory, ErrorSeverity, OpenHapticError};
pub use config::ConfigError;

/// A specialized `Result` type for OpenHaptic operations.
pub type Result<T> = std::result::Result<T, OpenHapticError>;

/// A specialized `Result` type for calls into external collaborators.
pub type CollaboratorResult<T = ()> = std::result::Result<T, CollaboratorError>;
