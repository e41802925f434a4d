//! Response Filter
//!
//! Time-step-aware single-pole low-pass on the combined force scalar.

use crate::clamp_dt;

/// Single-pole low-pass state.
///
/// `a = dt / (tau + dt)`, `state = lerp(state, input, a)`. As `dt` grows
/// relative to `tau` the coefficient approaches 1 and the filter degrades to
/// pass-through.
///
/// # RT Safety
///
/// - No heap allocations
/// - O(1) time complexity
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResponseFilter {
    state: f32,
}

impl ResponseFilter {
    /// Create a filter with zero state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter `input` with time constant `tau` over step `dt`.
    ///
    /// A `tau` that is not a positive finite number bypasses the filter:
    /// the input is returned unchanged and no state is stored. A non-finite
    /// input is ignored and the current state is returned.
    ///
    /// # Example
    ///
    /// ```
    /// use openhaptic_filters::ResponseFilter;
    ///
    /// let mut filter = ResponseFilter::new();
    /// assert_eq!(filter.update(3.0, 0.001, 0.0), 3.0);
    /// assert_eq!(filter.value(), 0.0);
    ///
    /// let y = filter.update(1.0, 0.01, 0.01);
    /// assert!((y - 0.5).abs() < 1e-6);
    /// ```
    #[inline]
    pub fn update(&mut self, input: f32, dt: f32, tau: f32) -> f32 {
        if !(tau > 0.0 && tau.is_finite()) {
            return input;
        }
        if !input.is_finite() {
            return self.state;
        }
        let dt = clamp_dt(dt);
        let a = dt / (tau + dt);
        // inf / inf: an unbounded step is pass-through.
        let a = if a.is_finite() { a } else { 1.0 };
        self.state += (input - self.state) * a;
        self.state
    }

    /// Current filtered value.
    pub fn value(&self) -> f32 {
        self.state
    }

    /// Zero the state.
    pub fn reset(&mut self) {
        self.state = 0.0;
    }
}
