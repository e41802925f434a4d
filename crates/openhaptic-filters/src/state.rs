//! Filter State Reset
//!
//! Grab transitions reset every stage through one trait.

use crate::direction::DirectionGate;
use crate::prony::OverstressIntegrator;
use crate::response::ResponseFilter;
use crate::viscous::ViscousTerm;

/// Common reset operation for pipeline stages.
pub trait FilterState: std::fmt::Debug {
    /// Return the stage to its post-construction state.
    fn reset(&mut self);
}

impl FilterState for ResponseFilter {
    fn reset(&mut self) {
        ResponseFilter::reset(self);
    }
}

impl FilterState for DirectionGate {
    fn reset(&mut self) {
        DirectionGate::reset(self);
    }
}

impl FilterState for OverstressIntegrator {
    fn reset(&mut self) {
        // Re-seeded lazily from the next input.
        self.invalidate();
    }
}

impl FilterState for ViscousTerm {
    fn reset(&mut self) {
        // Stateless
    }
}
