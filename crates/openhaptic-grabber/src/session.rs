//! Grab session state machine.
//!
//! `Idle -> Grabbing` on a button-down edge with a successful capture;
//! `Grabbing -> Idle` on a button-up edge or an external release. Both
//! transitions reset the pipeline memory. Edges that do not change state
//! are no-ops.

use glam::Vec3;
use openhaptic_filters::{DirectionGate, FilterState, OverstressIntegrator, ResponseFilter};

use crate::collaborators::ParticleHandle;
use crate::config::GrabberConfig;

/// Session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GrabState {
    /// Not holding a particle.
    #[default]
    Idle,
    /// Holding a particle; the force pipeline runs every render tick.
    Grabbing,
}

/// Per-grab working state read and written by the force pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineMemory {
    /// Curve input on the previous tick.
    pub last_x: f32,
    /// Anchor distance on the previous tick.
    pub last_d: f32,
    /// Exported displacement on the previous recorded tick.
    pub last_export_d: f32,
    /// Force-scalar low-pass.
    pub filter: ResponseFilter,
    /// Prony-series overstress.
    pub prony: OverstressIntegrator,
    /// Direction hysteresis.
    pub gate: DirectionGate,
    /// Device-frame command sent on the last accepted tick.
    pub last_command: Vec3,
}

impl PipelineMemory {
    /// Fresh memory for a configuration.
    pub fn new(config: &GrabberConfig) -> Self {
        Self {
            last_x: 0.0,
            last_d: 0.0,
            last_export_d: 0.0,
            filter: ResponseFilter::new(),
            prony: OverstressIntegrator::new(&config.prony.stiffness, &config.prony.tau),
            gate: DirectionGate::new(config.smooth_angle_deg),
            last_command: Vec3::ZERO,
        }
    }

    /// Zero the scalar memory and reset every filter stage. Configuration
    /// (branch count, smoothing angle) is kept.
    pub fn reset(&mut self) {
        self.last_x = 0.0;
        self.last_d = 0.0;
        self.last_export_d = 0.0;
        FilterState::reset(&mut self.filter);
        FilterState::reset(&mut self.prony);
        FilterState::reset(&mut self.gate);
        self.last_command = Vec3::ZERO;
    }
}

/// One grabber's session: state, grab geometry and pipeline memory.
///
/// The session holds no collaborators; the [`Grabber`](crate::Grabber)
/// performs the capture and device calls and then commits the transition
/// here.
#[derive(Debug, Clone, PartialEq)]
pub struct GrabSession {
    state: GrabState,
    anchor: Vec3,
    start: Vec3,
    particle: Option<ParticleHandle>,
    thickness: f32,
    memory: PipelineMemory,
}

impl GrabSession {
    /// Create an idle session.
    pub fn new(config: &GrabberConfig) -> Self {
        Self {
            state: GrabState::Idle,
            anchor: Vec3::ZERO,
            start: Vec3::ZERO,
            particle: None,
            thickness: config.thickness.max(GrabberConfig::THICKNESS_FLOOR),
            memory: PipelineMemory::new(config),
        }
    }

    /// Enter `Grabbing` at `stylus` holding `particle`.
    ///
    /// Returns `false` without touching anything if already grabbing.
    pub fn begin(&mut self, stylus: Vec3, particle: ParticleHandle, thickness: f32) -> bool {
        if self.is_grabbing() {
            return false;
        }
        self.state = GrabState::Grabbing;
        self.start = stylus;
        self.anchor = stylus;
        self.particle = Some(particle);
        self.thickness = thickness.max(GrabberConfig::THICKNESS_FLOOR);
        self.memory.reset();
        true
    }

    /// Return to `Idle` and reset the pipeline memory.
    ///
    /// Returns the released particle, or `None` if the session was already
    /// idle (nothing is reset in that case).
    pub fn end(&mut self) -> Option<ParticleHandle> {
        if !self.is_grabbing() {
            return None;
        }
        self.state = GrabState::Idle;
        self.memory.reset();
        self.particle.take()
    }

    /// Current state.
    pub fn state(&self) -> GrabState {
        self.state
    }

    /// Check if the session is grabbing.
    pub fn is_grabbing(&self) -> bool {
        self.state == GrabState::Grabbing
    }

    /// Displacement origin for the force pipeline.
    pub fn anchor(&self) -> Vec3 {
        self.anchor
    }

    /// Stylus position when the grab began.
    pub fn start(&self) -> Vec3 {
        self.start
    }

    /// Captured particle while grabbing.
    pub fn particle(&self) -> Option<ParticleHandle> {
        self.particle
    }

    /// Effective thickness for the strain computation.
    pub fn thickness(&self) -> f32 {
        self.thickness
    }

    /// Pipeline memory.
    pub fn memory(&self) -> &PipelineMemory {
        &self.memory
    }

    /// Mutable pipeline memory, for the force pipeline.
    pub fn memory_mut(&mut self) -> &mut PipelineMemory {
        &mut self.memory
    }
}
