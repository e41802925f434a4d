//! Per-tick force pipeline.
//!
//! displacement -> curve -> (+ overstress) -> (+ viscous) -> low-pass ->
//! unilateral clamp -> direction -> gate -> device command

use glam::{Quat, Vec3};
use openhaptic_curves::CurveTable;
use openhaptic_filters::{GateDecision, ViscousTerm, clamp_dt, rate, unit_or_zero};

use crate::config::{ForceSource, GrabberConfig};
use crate::session::PipelineMemory;
use crate::telemetry::SampleMode;

/// Anchor distance below which the displacement has no direction.
pub const DISTANCE_EPSILON: f32 = 1e-6;

/// Inputs for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceInput {
    /// Stylus tip in world coordinates.
    pub stylus: Vec3,
    /// Device frame orientation in world coordinates.
    pub device_rotation: Quat,
    /// Displacement origin.
    pub anchor: Vec3,
    /// Effective thickness for strain.
    pub thickness: f32,
    /// Frame delta in seconds (floored before use).
    pub dt: f32,
}

/// Result of one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceOutput {
    /// Device-frame command to write this tick (fresh or held).
    pub command: Vec3,
    /// Gate outcome.
    pub decision: GateDecision,
    /// Force scalar after smoothing and the unilateral clamp.
    pub force_scalar: f32,
    /// World-frame restoring force before the coefficient.
    pub force_world: Vec3,
    /// World-frame command `-force_world * force_coef`.
    pub command_world: Vec3,
    /// Anchor distance.
    pub displacement: f32,
    /// Rate of the anchor distance.
    pub displacement_rate: f32,
    /// Curve input (strain or displacement).
    pub strain: f32,
    /// Rate of the curve input.
    pub strain_rate: f32,
    /// Floored time step used.
    pub dt: f32,
    /// Force model that produced the output.
    pub mode: SampleMode,
}

/// Scalar settings the pipeline reads each tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineSettings {
    /// Force model.
    pub force_source: ForceSource,
    /// Feed strain instead of displacement.
    pub x_is_strain: bool,
    /// Scale from model force to device command.
    pub force_coef: f32,
    /// Add the viscous term.
    pub visco_enabled: bool,
    /// Viscous term.
    pub viscous: ViscousTerm,
    /// Low-pass time constant; 0 disables.
    pub response_tau: f32,
    /// Add the Prony overstress.
    pub prony_enabled: bool,
}

impl PipelineSettings {
    /// Settings from a (sanitized) configuration.
    pub fn from_config(config: &GrabberConfig) -> Self {
        Self {
            force_source: config.force_source,
            x_is_strain: config.x_is_strain,
            force_coef: config.force_coef,
            visco_enabled: config.visco.enabled,
            viscous: ViscousTerm::new(config.visco.eta),
            response_tau: config.visco.tau,
            prony_enabled: config.prony.enabled,
        }
    }

    /// Telemetry mode tag.
    pub fn mode(&self) -> SampleMode {
        SampleMode::new(self.force_source, self.visco_enabled, self.prony_enabled)
    }
}

/// Stateless orchestrator over a session's [`PipelineMemory`].
///
/// # RT Safety
///
/// `compute_curve()` and `compute_physics()` do not allocate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForcePipeline {
    settings: PipelineSettings,
}

impl ForcePipeline {
    /// Create a pipeline.
    pub fn new(settings: PipelineSettings) -> Self {
        Self { settings }
    }

    /// Current settings.
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Enable or disable the Prony term.
    pub fn set_prony_enabled(&mut self, enabled: bool) {
        self.settings.prony_enabled = enabled;
    }

    /// Switch the force model.
    pub fn set_force_source(&mut self, source: ForceSource) {
        self.settings.force_source = source;
    }

    /// Curve-model tick. `curve` of `None` contributes zero curve force.
    pub fn compute_curve(
        &self,
        memory: &mut PipelineMemory,
        curve: Option<&CurveTable>,
        input: &ForceInput,
    ) -> ForceOutput {
        let s = &self.settings;
        let kin = Kinematics::advance(memory, input, s);

        let x = kin.strain.abs();
        let mut force = curve.map_or(0.0, |table| table.evaluate(x));
        if s.prony_enabled {
            force += memory.prony.update(x, kin.dt);
        }
        if s.visco_enabled {
            force += s.viscous.contribution(kin.strain_rate);
        }
        let force = memory.filter.update(force, kin.dt, s.response_tau);
        // Unilateral: push back, never pull. NaN maps to zero.
        let force = force.max(0.0);

        let direction = if kin.distance > DISTANCE_EPSILON {
            kin.offset / kin.distance
        } else {
            Vec3::ZERO
        };
        let force_world = direction * force;

        let mut output = self.gate(memory, force_world, input.device_rotation);
        output.force_scalar = force;
        kin.fill(&mut output, s.mode());
        output
    }

    /// Physics-model tick with the engine's world-frame force.
    ///
    /// `None` (the engine failed this tick) holds the previous command
    /// without touching the gate.
    pub fn compute_physics(
        &self,
        memory: &mut PipelineMemory,
        engine_force: Option<Vec3>,
        input: &ForceInput,
    ) -> ForceOutput {
        let kin = Kinematics::advance(memory, input, &self.settings);

        let mut output = match engine_force {
            Some(force_world) if force_world.is_finite() => {
                let mut output = self.gate(memory, force_world, input.device_rotation);
                output.force_scalar = force_world.length();
                output
            }
            _ => ForceOutput::held(memory.last_command),
        };
        kin.fill(&mut output, SampleMode::Physics);
        output
    }

    fn gate(&self, memory: &mut PipelineMemory, force_world: Vec3, rotation: Quat) -> ForceOutput {
        let coef = self.settings.force_coef;
        let force_local = rotation.inverse() * force_world;
        let decision = memory.gate.update(unit_or_zero(force_local));

        let command = match decision {
            GateDecision::Accept => {
                let fresh = -force_local * coef;
                memory.last_command = fresh;
                fresh
            }
            GateDecision::Hold => memory.last_command,
        };

        ForceOutput {
            command,
            decision,
            force_world,
            command_world: -force_world * coef,
            ..ForceOutput::held(memory.last_command)
        }
    }
}

impl ForceOutput {
    fn held(command: Vec3) -> Self {
        Self {
            command,
            decision: GateDecision::Hold,
            force_scalar: 0.0,
            force_world: Vec3::ZERO,
            command_world: Vec3::ZERO,
            displacement: 0.0,
            displacement_rate: 0.0,
            strain: 0.0,
            strain_rate: 0.0,
            dt: 0.0,
            mode: SampleMode::Elastic,
        }
    }

    /// Check if the command is non-negligible.
    pub fn has_force(&self) -> bool {
        self.command_world.length_squared() > 1e-12
    }
}

/// Displacement bookkeeping shared by both force models.
struct Kinematics {
    offset: Vec3,
    distance: f32,
    distance_rate: f32,
    strain: f32,
    strain_rate: f32,
    dt: f32,
}

impl Kinematics {
    fn advance(memory: &mut PipelineMemory, input: &ForceInput, s: &PipelineSettings) -> Self {
        let offset = input.stylus - input.anchor;
        let distance = offset.length();
        let thickness = input.thickness.max(GrabberConfig::THICKNESS_FLOOR);
        let strain = if s.x_is_strain {
            distance / thickness
        } else {
            distance
        };
        let dt = clamp_dt(input.dt);

        if !s.prony_enabled {
            memory.prony.invalidate();
        }

        let strain_rate = rate(strain, memory.last_x, dt);
        memory.last_x = strain;
        let distance_rate = rate(distance, memory.last_d, dt);
        memory.last_d = distance;

        Self {
            offset,
            distance,
            distance_rate,
            strain,
            strain_rate,
            dt,
        }
    }

    fn fill(&self, output: &mut ForceOutput, mode: SampleMode) {
        output.displacement = self.distance;
        output.displacement_rate = self.distance_rate;
        output.strain = self.strain;
        output.strain_rate = self.strain_rate;
        output.dt = self.dt;
        output.mode = mode;
    }
}
