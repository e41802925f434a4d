//! RT-Safe Filters for OpenHaptic Force Pipelines
//!
//! This crate provides the stateful stages that sit between the quasi-static
//! force curve and the actuator command.
//!
//! # Overview
//!
//! - **Overstress**: Prony-series (generalized Maxwell) viscoelastic correction
//! - **Response**: time-step-aware single-pole low-pass on the force scalar
//! - **Direction**: hysteresis gate that holds the command across abrupt
//!   force-direction changes
//! - **Viscous**: rate-proportional damping term
//!
//! # RT Safety
//!
//! All `update` paths are allocation-free and bounded:
//! - No heap allocations after construction
//! - O(1) per stage, O(branches) for the overstress integrator
//! - No syscalls or I/O
//!
//! # Example
//!
//! ```
//! use openhaptic_filters::prelude::*;
//!
//! let mut overstress = OverstressIntegrator::new(&[2.0], &[0.1]);
//! let mut response = ResponseFilter::new();
//!
//! // 1kHz loop, strain stepping from 0 to 0.5
//! let dt = 0.001;
//! let quasi_static = 4.0;
//! overstress.reset_to(0.0);
//! let f = quasi_static + overstress.update(0.5, dt);
//! let f = response.update(f, dt, 0.0);
//! assert!(f > quasi_static);
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod direction;
pub mod prelude;
pub mod prony;
pub mod response;
pub mod state;
pub mod viscous;

pub use direction::{DirectionGate, GateDecision, unit_or_zero};
pub use prony::{OverstressIntegrator, PronyBranch};
pub use response::ResponseFilter;
pub use state::FilterState;
pub use viscous::{ViscousTerm, rate};

/// Smallest time step any stage will integrate over, in seconds.
pub const MIN_DT: f32 = 1e-6;

/// Clamp a frame delta to [`MIN_DT`]; NaN maps to the floor.
#[inline]
pub fn clamp_dt(dt: f32) -> f32 {
    dt.max(MIN_DT)
}
