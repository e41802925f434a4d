//! Viscous Term
//!
//! Rate-proportional damping added on top of the quasi-static curve force.

use crate::clamp_dt;

/// Finite-difference rate `(current - previous) / dt`, with `dt` floored.
#[inline]
pub fn rate(current: f32, previous: f32, dt: f32) -> f32 {
    (current - previous) / clamp_dt(dt)
}

/// Speed-proportional resistance `eta * |x_dot|`.
///
/// Unlike a damper on a signed axis, the contribution is always
/// non-negative: tissue resists both loading and unloading.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViscousTerm {
    /// Viscosity coefficient.
    pub eta: f32,
}

impl ViscousTerm {
    /// Create a viscous term. Non-finite or negative `eta` disables it.
    pub fn new(eta: f32) -> Self {
        let eta = if eta.is_finite() { eta.max(0.0) } else { 0.0 };
        Self { eta }
    }

    /// Contribution for strain rate `x_dot`.
    #[inline]
    pub fn contribution(&self, x_dot: f32) -> f32 {
        self.eta * x_dot.abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contribution_ignores_sign() {
        let term = ViscousTerm::new(0.5);
        assert_eq!(term.contribution(2.0), 1.0);
        assert_eq!(term.contribution(-2.0), 1.0);
    }

    #[test]
    fn test_invalid_eta_disables() {
        assert_eq!(ViscousTerm::new(f32::NAN).eta, 0.0);
        assert_eq!(ViscousTerm::new(-1.0).eta, 0.0);
        assert_eq!(ViscousTerm::new(f32::INFINITY).contribution(1.0), 0.0);
    }

    #[test]
    fn test_rate() {
        assert!((rate(1.0, 0.5, 0.1) - 5.0).abs() < 1e-5);
        assert!(rate(1.0, 0.0, 0.0).is_finite());
    }
}
