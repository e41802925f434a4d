//! Prelude for convenient imports.
//!
//! ```
//! use openhaptic_filters::prelude::*;
//!
//! let mut gate = DirectionGate::default();
//! let mut response = ResponseFilter::new();
//! let mut prony = OverstressIntegrator::disabled();
//! FilterState::reset(&mut gate);
//! FilterState::reset(&mut response);
//! FilterState::reset(&mut prony);
//! ```

pub use crate::direction::{DirectionGate, GateDecision, unit_or_zero};
pub use crate::prony::{OverstressIntegrator, PronyBranch};
pub use crate::response::ResponseFilter;
pub use crate::state::FilterState;
pub use crate::viscous::{ViscousTerm, rate};
pub use crate::{MIN_DT, clamp_dt};
