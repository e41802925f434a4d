//! Grabber configuration.
//!
//! Every field has a default, so a partial JSON document is a valid
//! configuration. Problems are reported by [`GrabberConfig::diagnostics`]
//! and never stop the grabber: [`GrabberConfig::sanitized`] produces the
//! clamped copy that is actually used.

use openhaptic_errors::ConfigError;
use openhaptic_filters::OverstressIntegrator;
use serde::{Deserialize, Serialize};

/// Where the restoring force comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForceSource {
    /// Measured biomechanical curve with optional viscoelastic terms.
    #[default]
    Curve,
    /// Force computed by the physics engine for the captured particle.
    Physics,
}

/// Rate-dependent damping and force smoothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViscoConfig {
    /// Add `eta * |x_dot|` to the curve force.
    pub enabled: bool,
    /// Viscosity coefficient.
    pub eta: f32,
    /// Low-pass time constant on the force scalar in seconds; 0 disables
    /// smoothing. Applies whether or not `enabled` is set.
    pub tau: f32,
}

impl Default for ViscoConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            eta: 0.0,
            tau: 0.0,
        }
    }
}

/// Prony-series (generalized Maxwell) overstress parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PronyConfig {
    /// Add the overstress correction to the curve force.
    pub enabled: bool,
    /// Branch stiffness coefficients `K_i`.
    pub stiffness: Vec<f32>,
    /// Branch relaxation time constants `tau_i` in seconds.
    pub tau: Vec<f32>,
}

impl Default for PronyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            stiffness: vec![0.0],
            tau: vec![0.1],
        }
    }
}

/// Telemetry export switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Record a sample every grabbing render tick.
    pub enabled: bool,
    /// Export displacement as stylus-to-particle distance when the particle
    /// position is available, instead of stylus-to-grab-start.
    pub stylus_to_particle_distance: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            stylus_to_particle_distance: true,
        }
    }
}

/// Complete grabber configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrabberConfig {
    /// Capture radius around the stylus.
    pub grab_sensitivity: f32,
    /// Scale from model force to device command.
    pub force_coef: f32,
    /// Direction hysteresis angle in degrees.
    pub smooth_angle_deg: f32,
    /// Force model.
    pub force_source: ForceSource,
    /// Feed the curve strain (`dist / thickness`) instead of displacement.
    pub x_is_strain: bool,
    /// Effective tissue thickness for the strain computation.
    pub thickness: f32,
    /// Viscous damping and smoothing.
    pub visco: ViscoConfig,
    /// Prony-series overstress.
    pub prony: PronyConfig,
    /// Telemetry export.
    pub export: ExportConfig,
    /// Number of captured particles remembered for tracking.
    pub history_capacity: usize,
}

impl GrabberConfig {
    /// Capture radius range.
    pub const SENSITIVITY_RANGE: (f32, f32) = (0.001, 1.1);
    /// Force coefficient range.
    pub const FORCE_COEF_RANGE: (f32, f32) = (0.01, 1.0);
    /// Smoothing angle range in degrees.
    pub const SMOOTH_ANGLE_RANGE: (f32, f32) = (0.0, 180.0);
    /// Smallest usable thickness.
    pub const THICKNESS_FLOOR: f32 = 1e-4;
    /// Largest grab history.
    pub const HISTORY_CAPACITY_MAX: usize = 4096;

    /// Report every problem with this configuration.
    pub fn diagnostics(&self) -> Vec<ConfigError> {
        let mut issues = Vec::new();

        check_range(
            &mut issues,
            "grab_sensitivity",
            self.grab_sensitivity,
            Self::SENSITIVITY_RANGE,
        );
        check_range(&mut issues, "force_coef", self.force_coef, Self::FORCE_COEF_RANGE);
        check_range(
            &mut issues,
            "smooth_angle_deg",
            self.smooth_angle_deg,
            Self::SMOOTH_ANGLE_RANGE,
        );
        check_range(
            &mut issues,
            "thickness",
            self.thickness,
            (Self::THICKNESS_FLOOR, f32::MAX),
        );
        check_range(&mut issues, "visco.eta", self.visco.eta, (0.0, f32::MAX));
        check_range(&mut issues, "visco.tau", self.visco.tau, (0.0, f32::MAX));
        if self.history_capacity > Self::HISTORY_CAPACITY_MAX {
            issues.push(ConfigError::out_of_range(
                "history_capacity",
                self.history_capacity,
                0,
                Self::HISTORY_CAPACITY_MAX,
            ));
        }

        if self.prony.stiffness.len() != self.prony.tau.len() {
            issues.push(ConfigError::PronyLengthMismatch {
                stiffness: self.prony.stiffness.len(),
                tau: self.prony.tau.len(),
            });
        }
        for (i, k) in self.prony.stiffness.iter().enumerate() {
            if !k.is_finite() {
                issues.push(ConfigError::non_finite(format!("prony.stiffness[{i}]")));
            }
        }
        for (i, t) in self.prony.tau.iter().enumerate() {
            if !t.is_finite() {
                issues.push(ConfigError::non_finite(format!("prony.tau[{i}]")));
            }
        }

        issues
    }

    /// Copy with every value clamped into range, non-finite values replaced
    /// by defaults, and the Prony lists truncated to equal length.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let prony_len = self.prony.stiffness.len().min(self.prony.tau.len());
        let prony_tau_default = OverstressIntegrator::TAU_MIN;

        Self {
            grab_sensitivity: clamp_or(
                self.grab_sensitivity,
                Self::SENSITIVITY_RANGE,
                defaults.grab_sensitivity,
            ),
            force_coef: clamp_or(self.force_coef, Self::FORCE_COEF_RANGE, defaults.force_coef),
            smooth_angle_deg: clamp_or(
                self.smooth_angle_deg,
                Self::SMOOTH_ANGLE_RANGE,
                defaults.smooth_angle_deg,
            ),
            force_source: self.force_source,
            x_is_strain: self.x_is_strain,
            thickness: clamp_or(
                self.thickness,
                (Self::THICKNESS_FLOOR, f32::MAX),
                defaults.thickness,
            ),
            visco: ViscoConfig {
                enabled: self.visco.enabled,
                eta: clamp_or(self.visco.eta, (0.0, f32::MAX), 0.0),
                tau: clamp_or(self.visco.tau, (0.0, f32::MAX), 0.0),
            },
            prony: PronyConfig {
                enabled: self.prony.enabled,
                stiffness: self
                    .prony
                    .stiffness
                    .iter()
                    .take(prony_len)
                    .map(|&k| if k.is_finite() { k } else { 0.0 })
                    .collect(),
                tau: self
                    .prony
                    .tau
                    .iter()
                    .take(prony_len)
                    .map(|&t| if t.is_finite() { t } else { prony_tau_default })
                    .collect(),
            },
            export: self.export,
            history_capacity: self.history_capacity.min(Self::HISTORY_CAPACITY_MAX),
        }
    }

    /// Parse a JSON document; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns the JSON error for malformed documents.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for GrabberConfig {
    fn default() -> Self {
        Self {
            grab_sensitivity: 0.015,
            force_coef: 0.05,
            smooth_angle_deg: 90.0,
            force_source: ForceSource::Curve,
            x_is_strain: true,
            thickness: 0.03,
            visco: ViscoConfig::default(),
            prony: PronyConfig::default(),
            export: ExportConfig::default(),
            history_capacity: 10,
        }
    }
}

fn check_range(issues: &mut Vec<ConfigError>, field: &str, value: f32, (min, max): (f32, f32)) {
    if !value.is_finite() {
        issues.push(ConfigError::non_finite(field));
    } else if value < min || value > max {
        issues.push(ConfigError::out_of_range(field, value, min, max));
    }
}

fn clamp_or(value: f32, (min, max): (f32, f32), fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}
