//! Prony-Series Overstress
//!
//! Discretized generalized Maxwell model. Each branch is a spring whose rest
//! position `Q` relaxes towards the current strain with time constant `tau`;
//! the branch contributes `K * (x - Q)`.

use crate::clamp_dt;

/// One relaxation branch: stiffness coefficient and time constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PronyBranch {
    /// Stiffness coefficient `K` (N per unit strain, or N/m in displacement mode).
    pub stiffness: f32,
    /// Relaxation time constant in seconds, never below [`OverstressIntegrator::TAU_MIN`].
    pub tau: f32,
}

impl PronyBranch {
    /// Create a branch, clamping `tau` to [`OverstressIntegrator::TAU_MIN`].
    pub fn new(stiffness: f32, tau: f32) -> Self {
        Self {
            stiffness,
            tau: tau.max(OverstressIntegrator::TAU_MIN),
        }
    }

    /// Per-step retention factor `exp(-dt / tau)`.
    #[inline]
    pub fn decay(&self, dt: f32) -> f32 {
        (-dt / self.tau).exp()
    }
}

/// N-branch Prony-series integrator.
///
/// The branch count is fixed at construction. After construction or
/// [`invalidate`](Self::invalidate) the relaxed positions are unseeded; the
/// next [`update`](Self::update) seeds every branch to its input so the
/// correction starts at zero.
///
/// # RT Safety
///
/// `update()` does not allocate; the relaxed-state buffer is sized once.
///
/// # Example
///
/// ```
/// use openhaptic_filters::OverstressIntegrator;
///
/// let mut prony = OverstressIntegrator::new(&[1.0, 0.5], &[0.05, 0.5]);
/// prony.reset_to(0.2);
/// assert_eq!(prony.update(0.2, 0.001), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OverstressIntegrator {
    branches: Vec<PronyBranch>,
    relaxed: Vec<f32>,
    seeded: bool,
}

impl OverstressIntegrator {
    /// Floor applied to every relaxation time constant.
    pub const TAU_MIN: f32 = 1e-4;

    /// Build from parallel coefficient lists.
    ///
    /// Mismatched lengths are truncated to the shorter list and logged.
    pub fn new(stiffness: &[f32], tau: &[f32]) -> Self {
        if stiffness.len() != tau.len() {
            tracing::warn!(
                stiffness = stiffness.len(),
                tau = tau.len(),
                kept = stiffness.len().min(tau.len()),
                "Prony series lengths differ; truncating to the shorter list"
            );
        }
        Self::from_branches(
            stiffness
                .iter()
                .zip(tau)
                .map(|(&k, &t)| PronyBranch::new(k, t))
                .collect(),
        )
    }

    /// Build from branches.
    pub fn from_branches(branches: Vec<PronyBranch>) -> Self {
        let relaxed = vec![0.0; branches.len()];
        Self {
            branches,
            relaxed,
            seeded: false,
        }
    }

    /// An integrator with no branches; always returns zero.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Advance every branch by `dt` with strain `x` and return the summed
    /// overstress.
    ///
    /// A non-finite `x` leaves the state untouched and contributes nothing.
    #[inline]
    pub fn update(&mut self, x: f32, dt: f32) -> f32 {
        if self.branches.is_empty() || !x.is_finite() {
            return 0.0;
        }
        if !self.seeded {
            self.reset_to(x);
        }

        let dt = clamp_dt(dt);
        let mut sum = 0.0;
        for (branch, q) in self.branches.iter().zip(self.relaxed.iter_mut()) {
            let a = branch.decay(dt);
            // a*Q + (1-a)*x, written so that Q == x stays exactly x.
            *q += (1.0 - a) * (x - *q);
            sum += branch.stiffness * (x - *q);
        }
        sum
    }

    /// Seed every branch at `x0` (equilibrium, zero correction).
    pub fn reset_to(&mut self, x0: f32) {
        self.relaxed.fill(x0);
        self.seeded = true;
    }

    /// Mark the state stale; the next update re-seeds from its input.
    pub fn invalidate(&mut self) {
        self.seeded = false;
    }

    /// Correction at strain `x` for the current relaxed state, without
    /// advancing time.
    pub fn overstress(&self, x: f32) -> f32 {
        if !self.seeded {
            return 0.0;
        }
        self.branches
            .iter()
            .zip(&self.relaxed)
            .map(|(branch, &q)| branch.stiffness * (x - q))
            .sum()
    }

    /// Number of active branches.
    pub fn branch_count(&self) -> usize {
        self.branches.len()
    }

    /// Whether any branch is configured.
    pub fn is_enabled(&self) -> bool {
        !self.branches.is_empty()
    }

    /// Whether the relaxed state has been seeded since the last invalidate.
    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    /// Configured branches.
    pub fn branches(&self) -> &[PronyBranch] {
        &self.branches
    }

    /// Relaxed positions `Q_i`.
    pub fn relaxed(&self) -> &[f32] {
        &self.relaxed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_reset_then_update_is_exactly_zero() {
        let mut prony = OverstressIntegrator::new(&[3.0, 1.5, 0.2], &[0.01, 0.1, 1.0]);
        for x0 in [0.0, 0.25, 1.0, 17.5] {
            prony.reset_to(x0);
            assert_eq!(prony.update(x0, 0.001), 0.0);
        }
    }

    #[test]
    fn test_first_update_seeds_lazily() {
        let mut prony = OverstressIntegrator::new(&[2.0], &[0.1]);
        assert!(!prony.is_seeded());
        assert_eq!(prony.update(0.8, 0.001), 0.0);
        assert!(prony.is_seeded());
        assert_eq!(prony.relaxed(), &[0.8]);
    }

    #[test]
    fn test_step_then_relax() {
        let mut prony = OverstressIntegrator::new(&[2.0], &[0.1]);
        prony.reset_to(0.0);

        let first = prony.update(1.0, 0.001);
        assert!(first > 1.9 && first < 2.0);

        let mut last = first;
        for _ in 0..2_000 {
            last = prony.update(1.0, 0.001);
        }
        assert_abs_diff_eq!(last, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_single_step_matches_closed_form() {
        let mut prony = OverstressIntegrator::new(&[5.0], &[0.2]);
        prony.reset_to(0.0);
        let dt = 0.01f32;
        let a = (-dt / 0.2f32).exp();
        let expected = 5.0 * (1.0 - (1.0 - a));
        assert_abs_diff_eq!(prony.update(1.0, dt), expected, epsilon = 1e-6);
    }

    #[test]
    fn test_truncates_mismatched_lengths() {
        let prony = OverstressIntegrator::new(&[1.0, 2.0, 3.0], &[0.1]);
        assert_eq!(prony.branch_count(), 1);
        assert_eq!(prony.relaxed().len(), 1);
    }

    #[test]
    fn test_tau_floor() {
        let prony = OverstressIntegrator::new(&[1.0, 1.0], &[0.0, -5.0]);
        for branch in prony.branches() {
            assert_eq!(branch.tau, OverstressIntegrator::TAU_MIN);
        }
    }

    #[test]
    fn test_zero_branches_is_disabled() {
        let mut prony = OverstressIntegrator::new(&[], &[]);
        assert!(!prony.is_enabled());
        assert_eq!(prony.update(5.0, 0.01), 0.0);
        assert_eq!(OverstressIntegrator::disabled().update(1.0, 1.0), 0.0);
    }

    #[test]
    fn test_invalidate_reseeds_from_next_input() {
        let mut prony = OverstressIntegrator::new(&[1.0], &[0.1]);
        prony.reset_to(0.0);
        let _ = prony.update(1.0, 0.01);
        prony.invalidate();
        assert_eq!(prony.overstress(3.0), 0.0);
        assert_eq!(prony.update(3.0, 0.01), 0.0);
    }

    #[test]
    fn test_non_finite_strain_does_not_poison_state() {
        let mut prony = OverstressIntegrator::new(&[2.0], &[0.05]);
        prony.reset_to(0.5);
        assert_eq!(prony.update(f32::NAN, 0.001), 0.0);
        assert_eq!(prony.update(f32::INFINITY, 0.001), 0.0);
        assert_eq!(prony.relaxed(), &[0.5]);

        // Unseeded integrators stay unseeded.
        prony.invalidate();
        assert_eq!(prony.update(f32::NAN, 0.001), 0.0);
        assert!(!prony.is_seeded());
        assert_eq!(prony.update(0.5, 0.001), 0.0);
    }

    #[test]
    fn test_zero_dt_is_floored() {
        let mut prony = OverstressIntegrator::new(&[1.0], &[0.1]);
        prony.reset_to(0.0);
        let out = prony.update(1.0, 0.0);
        assert!(out.is_finite());
        assert!(out > 0.99);
    }
}
