//! Biomechanical Force Curves for OpenHaptic
//!
//! This crate turns measured force/displacement data into a quasi-static
//! stiffness response that the haptic loop can evaluate every tick.
//!
//! # Overview
//!
//! - [`CurveTable`]: immutable piecewise-linear table with flat extrapolation
//!   outside the sampled domain
//! - [`CurveSource`]: where samples come from (parsing and file I/O live
//!   outside this crate)
//! - [`SharedCurve`]: a reloadable handle shared between the loader and the
//!   force pipeline
//!
//! # RT Safety
//!
//! `CurveTable::evaluate()` is a binary search plus one lerp:
//! - No heap allocations
//! - O(log n) in the sample count
//! - No syscalls or I/O
//!
//! Building a table (`CurveTable::from_samples`, `SharedCurve::reload`)
//! allocates and should happen outside the haptic tick.
//!
//! # Example
//!
//! ```
//! use openhaptic_curves::{CurveSample, CurveTable};
//!
//! let table = CurveTable::from_samples([
//!     CurveSample::new(0.0, 0.0),
//!     CurveSample::new(1.0, 10.0),
//!     CurveSample::new(2.0, 15.0),
//! ])?;
//!
//! assert_eq!(table.evaluate(-5.0), 0.0);
//! assert_eq!(table.evaluate(10.0), 15.0);
//! assert!((table.evaluate(0.5) - 5.0).abs() < 1e-6);
//! # Ok::<(), openhaptic_curves::CurveError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod prelude;
pub mod shared;
pub mod source;
pub mod table;

pub use error::CurveError;
pub use shared::SharedCurve;
pub use source::{CurveSource, StaticCurveSource};
pub use table::{CurveSample, CurveScale, CurveTable};
