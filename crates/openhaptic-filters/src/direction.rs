//! Direction Hysteresis Gate
//!
//! Suppresses force chatter by holding the previous actuator command while
//! the force direction swings by more than the smoothing angle.

use glam::Vec3;

/// Squared length below which a vector has no direction.
const DIRECTION_EPSILON_SQ: f32 = 1e-12;

/// Normalize `v`, or return zero when it is too short to have a direction.
#[inline]
pub fn unit_or_zero(v: Vec3) -> Vec3 {
    if v.length_squared() > DIRECTION_EPSILON_SQ {
        v.normalize()
    } else {
        Vec3::ZERO
    }
}

/// Outcome of one gate update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateDecision {
    /// Direction is close enough to the last one; send a fresh command.
    Accept,
    /// Direction changed too much; keep sending the previous command.
    Hold,
}

impl GateDecision {
    /// Check if a fresh command may be sent.
    pub fn is_accept(self) -> bool {
        matches!(self, Self::Accept)
    }
}

/// Hysteresis on 3D force direction.
///
/// The last direction is overwritten on every update, accepted or not, so
/// the gate only delays command updates and never the direction bookkeeping.
/// A zero last direction (after reset) makes the first update compare
/// against zero.
///
/// # Example
///
/// ```
/// use glam::Vec3;
/// use openhaptic_filters::{DirectionGate, GateDecision};
///
/// let mut gate = DirectionGate::new(90.0);
/// let _ = gate.update(Vec3::X);
/// assert_eq!(gate.update(Vec3::Y), GateDecision::Hold);
/// assert_eq!(gate.update(Vec3::new(0.14, 0.99, 0.0)), GateDecision::Accept);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionGate {
    last: Vec3,
    smooth_angle_deg: f32,
    cos_threshold: f32,
}

impl DirectionGate {
    /// Default smoothing angle in degrees.
    pub const DEFAULT_SMOOTH_ANGLE_DEG: f32 = 90.0;

    /// Create a gate with the given smoothing angle, clamped to `[0, 180]`.
    pub fn new(smooth_angle_deg: f32) -> Self {
        let mut gate = Self {
            last: Vec3::ZERO,
            smooth_angle_deg: Self::DEFAULT_SMOOTH_ANGLE_DEG,
            cos_threshold: 0.0,
        };
        gate.set_smooth_angle(smooth_angle_deg);
        gate
    }

    /// Change the smoothing angle and recompute the cosine threshold.
    ///
    /// NaN keeps the current angle.
    pub fn set_smooth_angle(&mut self, smooth_angle_deg: f32) {
        if !smooth_angle_deg.is_nan() {
            self.smooth_angle_deg = smooth_angle_deg.clamp(0.0, 180.0);
        }
        // f64 keeps cos(90 deg) non-negative, so an orthogonal turn is held.
        self.cos_threshold = f64::from(self.smooth_angle_deg).to_radians().cos() as f32;
    }

    /// Compare `candidate` with the last direction and record it.
    #[inline]
    pub fn update(&mut self, candidate: Vec3) -> GateDecision {
        let cos_angle = self.last.dot(candidate);
        self.last = candidate;
        if cos_angle > self.cos_threshold {
            GateDecision::Accept
        } else {
            GateDecision::Hold
        }
    }

    /// Forget the last direction.
    pub fn reset(&mut self) {
        self.last = Vec3::ZERO;
    }

    /// Direction recorded by the last update.
    pub fn last_direction(&self) -> Vec3 {
        self.last
    }

    /// Smoothing angle in degrees.
    pub fn smooth_angle(&self) -> f32 {
        self.smooth_angle_deg
    }

    /// Precomputed `cos(smooth_angle)`.
    pub fn cos_threshold(&self) -> f32 {
        self.cos_threshold
    }
}

impl Default for DirectionGate {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SMOOTH_ANGLE_DEG)
    }
}
