//! Tick driver tying the session, the force pipeline and the collaborators
//! together.
//!
//! A frame is one [`Grabber::physics_tick`] (pose, button edges, capture and
//! release) followed by one [`Grabber::render_tick`] (drag, force, device
//! command, telemetry). [`Grabber::tick`] runs both in that order, so a
//! transition is always committed before the pipeline reads the session.

use std::fmt;

use glam::Vec3;
use openhaptic_curves::{CurveScale, CurveSource, SharedCurve};
use openhaptic_errors::{CollaboratorError, ConfigError};
use openhaptic_filters::{GateDecision, rate};
use tracing::{debug, info, trace, warn};

use crate::collaborators::{
    CaptureService, DeviceBinding, ForceSink, GrabberVisual, ParticleHandle, PoseSource,
    StylusPose,
};
use crate::config::{ForceSource, GrabberConfig};
use crate::error::GrabberError;
use crate::history::GrabHistory;
use crate::pipeline::{ForceInput, ForceOutput, ForcePipeline, PipelineSettings};
use crate::session::{GrabSession, GrabState};
use crate::telemetry::{
    ExtendedGrabberSample, GrabberSample, SampleMode, TelemetryChannel, TelemetrySink,
};

/// Why a grab ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReleaseCause {
    /// The grab button went up.
    ButtonUp,
    /// The capture service dropped the particle on its own.
    External,
}

/// State change produced by a physics tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Transition {
    /// No edge, or an edge that did not change state.
    #[default]
    None,
    /// Button went down but nothing was captured.
    CaptureMissed,
    /// A grab started on this particle.
    Began(ParticleHandle),
    /// A grab ended.
    Released {
        /// Particle that was held.
        particle: Option<ParticleHandle>,
        /// What ended the grab.
        cause: ReleaseCause,
    },
}

impl Transition {
    /// Check if the session changed state.
    pub fn changed_state(&self) -> bool {
        matches!(self, Self::Began(_) | Self::Released { .. })
    }
}

/// Outcome of one full [`Grabber::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Session state after the tick.
    pub state: GrabState,
    /// Transition committed by the physics tick.
    pub transition: Transition,
    /// Pipeline output; `None` while idle.
    pub output: Option<ForceOutput>,
}

impl TickReport {
    /// Device-frame command written this tick (zero while idle).
    pub fn command(&self) -> Vec3 {
        self.output.map_or(Vec3::ZERO, |output| output.command)
    }

    /// Gate outcome, if the pipeline ran.
    pub fn decision(&self) -> Option<GateDecision> {
        self.output.map(|output| output.decision)
    }

    /// Smoothed force scalar (zero while idle).
    pub fn force_scalar(&self) -> f32 {
        self.output.map_or(0.0, |output| output.force_scalar)
    }
}

fn collaborator_failed(device: &DeviceBinding, operation: &'static str, err: &CollaboratorError) {
    warn!(device = %device.id, operation, error = %err, "collaborator call failed");
}

/// One haptic grabber bound to one device.
///
/// Built with [`GrabberBuilder`]. Collaborator failures inside a tick are
/// logged and degraded (no particle, held command); nothing in the tick path
/// returns an error.
///
/// # Example
///
/// ```
/// use glam::Vec3;
/// use openhaptic_curves::{SharedCurve, StaticCurveSource};
/// use openhaptic_errors::CollaboratorResult;
/// use openhaptic_grabber::prelude::*;
///
/// struct Still;
/// impl PoseSource for Still {
///     fn sample(&mut self) -> CollaboratorResult<StylusPose> {
///         Ok(StylusPose::at(Vec3::ZERO))
///     }
/// }
///
/// struct Nothing;
/// impl CaptureService for Nothing {
///     fn capture(&mut self, _: Vec3, _: f32) -> CollaboratorResult<Option<ParticleHandle>> {
///         Ok(None)
///     }
///     fn release(&mut self) -> CollaboratorResult { Ok(()) }
///     fn current_handle(&self) -> Option<ParticleHandle> { None }
///     fn position(&self, handle: ParticleHandle) -> CollaboratorResult<Vec3> {
///         Err(openhaptic_errors::CollaboratorError::InvalidHandle(handle.0))
///     }
///     fn drag_to(&mut self, _: Vec3) -> CollaboratorResult { Ok(()) }
///     fn particle_force(&mut self, _: Vec3) -> CollaboratorResult<Vec3> { Ok(Vec3::ZERO) }
/// }
///
/// struct Quiet;
/// impl ForceSink for Quiet {
///     fn set_force(&mut self, _: &DeviceId, _: Vec3, _: Vec3) -> CollaboratorResult { Ok(()) }
///     fn set_spring_stiffness(&mut self, _: &DeviceId, _: f32, _: f32) -> CollaboratorResult { Ok(()) }
///     fn grab(&mut self, _: DeviceHandle) -> CollaboratorResult { Ok(()) }
///     fn release(&mut self, _: DeviceHandle) -> CollaboratorResult { Ok(()) }
/// }
///
/// let curve = SharedCurve::load(&StaticCurveSource::from_pairs("tissue", &[(0.0, 0.0), (1.0, 5.0)]));
/// let mut grabber = GrabberBuilder::new(GrabberConfig::default())
///     .pose_source(Still)
///     .capture_service(Nothing)
///     .force_sink(Quiet)
///     .curve(curve)
///     .build()?;
///
/// let report = grabber.tick(0.001);
/// assert_eq!(report.state, GrabState::Idle);
/// assert!(report.output.is_none());
/// # Ok::<(), GrabberError>(())
/// ```
pub struct Grabber {
    config: GrabberConfig,
    device: DeviceBinding,
    pose_source: Box<dyn PoseSource>,
    capture: Box<dyn CaptureService>,
    force_sink: Box<dyn ForceSink>,
    visual: Option<Box<dyn GrabberVisual>>,
    telemetry: TelemetryChannel,
    curve: SharedCurve,
    session: GrabSession,
    pipeline: ForcePipeline,
    history: GrabHistory,
    pose: StylusPose,
    button: bool,
    diagnostics: Vec<ConfigError>,
}

impl Grabber {
    /// Start building a grabber.
    pub fn builder(config: GrabberConfig) -> GrabberBuilder {
        GrabberBuilder::new(config)
    }

    /// Run one physics tick then one render tick.
    pub fn tick(&mut self, frame_delta: f32) -> TickReport {
        let transition = self.physics_tick();
        let output = self.render_tick(frame_delta);
        TickReport {
            state: self.session.state(),
            transition,
            output,
        }
    }

    /// Sample the pose, handle button edges and external releases.
    pub fn physics_tick(&mut self) -> Transition {
        match self.pose_source.sample() {
            Ok(pose) if pose.is_finite() => self.pose = pose,
            Ok(pose) => warn!(
                device = %self.device.id,
                position = ?pose.position,
                "non-finite stylus pose; keeping the previous pose"
            ),
            Err(err) => collaborator_failed(&self.device, "sample", &err),
        }

        let pressed = self.pose.button;
        let was_pressed = std::mem::replace(&mut self.button, pressed);

        let transition = match (was_pressed, pressed) {
            (false, true) => self.button_down(),
            (true, false) => self.release(ReleaseCause::ButtonUp),
            _ => Transition::None,
        };

        if transition == Transition::None
            && self.session.is_grabbing()
            && self.capture.current_handle().is_none()
        {
            return self.release(ReleaseCause::External);
        }
        transition
    }

    /// Drag the particle, compute and write the force, record telemetry.
    ///
    /// Returns `None` while idle.
    pub fn render_tick(&mut self, frame_delta: f32) -> Option<ForceOutput> {
        if !self.session.is_grabbing() {
            return None;
        }

        let pose = self.pose;
        if let Err(err) = self.capture.drag_to(pose.position) {
            collaborator_failed(&self.device, "drag_to", &err);
        }

        let input = ForceInput {
            stylus: pose.position,
            device_rotation: pose.device_rotation,
            anchor: self.session.anchor(),
            thickness: self.session.thickness(),
            dt: frame_delta,
        };

        let output = match self.pipeline.settings().force_source {
            ForceSource::Curve => {
                let table = self.curve.snapshot();
                self.pipeline
                    .compute_curve(self.session.memory_mut(), table.as_deref(), &input)
            }
            ForceSource::Physics => {
                let engine_force = match self.capture.particle_force(pose.position) {
                    Ok(force) => Some(force),
                    Err(err) => {
                        collaborator_failed(&self.device, "particle_force", &err);
                        None
                    }
                };
                self.pipeline
                    .compute_physics(self.session.memory_mut(), engine_force, &input)
            }
        };

        if let Err(err) = self
            .force_sink
            .set_force(&self.device.id, output.command, Vec3::ZERO)
        {
            collaborator_failed(&self.device, "set_force", &err);
        }

        self.export(&pose, &output);
        Some(output)
    }

    fn button_down(&mut self) -> Transition {
        if self.session.is_grabbing() {
            return Transition::None;
        }

        let stylus = self.pose.position;
        let handle = match self.capture.capture(stylus, self.config.grab_sensitivity) {
            Ok(Some(handle)) => handle,
            Ok(None) => {
                debug!(device = %self.device.id, "no particle within grab radius");
                return Transition::CaptureMissed;
            }
            Err(err) => {
                collaborator_failed(&self.device, "capture", &err);
                return Transition::CaptureMissed;
            }
        };

        self.session.begin(stylus, handle, self.config.thickness);
        self.history.push(handle);

        if let Err(err) = self
            .force_sink
            .set_spring_stiffness(&self.device.id, 0.0, 0.0)
        {
            collaborator_failed(&self.device, "set_spring_stiffness", &err);
        }
        info!(device = %self.device.id, particle = %handle, "grab started");
        if let Err(err) = self.force_sink.grab(self.device.handle) {
            collaborator_failed(&self.device, "grab", &err);
        }
        if let Some(visual) = self.visual.as_mut() {
            visual.set_grabber_visual_state(true);
        }

        Transition::Began(handle)
    }

    fn release(&mut self, cause: ReleaseCause) -> Transition {
        if !self.session.is_grabbing() {
            return Transition::None;
        }

        if let Err(err) = self
            .force_sink
            .set_force(&self.device.id, Vec3::ZERO, Vec3::ZERO)
        {
            collaborator_failed(&self.device, "set_force", &err);
        }
        if let Err(err) = self.capture.release() {
            collaborator_failed(&self.device, "release", &err);
        }

        let particle = self.session.end();
        info!(device = %self.device.id, particle = ?particle, cause = ?cause, "grab released");

        if let Err(err) = self.force_sink.release(self.device.handle) {
            collaborator_failed(&self.device, "device_release", &err);
        }
        if let Some(visual) = self.visual.as_mut() {
            visual.set_grabber_visual_state(false);
        }

        Transition::Released { particle, cause }
    }

    fn export(&mut self, pose: &StylusPose, output: &ForceOutput) {
        if !self.config.export.enabled || !self.telemetry.is_running() {
            return;
        }

        let physics = output.mode == SampleMode::Physics;
        let particle = self.session.particle();
        let particle_position = if physics {
            None
        } else {
            particle.and_then(|handle| match self.capture.position(handle) {
                Ok(position) => Some(position),
                Err(err) => {
                    trace!(particle = %handle, error = %err, "particle position unavailable");
                    None
                }
            })
        };

        let displacement = match particle_position {
            Some(position) if self.config.export.stylus_to_particle_distance => {
                pose.position.distance(position)
            }
            _ => pose.position.distance(self.session.start()),
        };

        let grabbing = self.session.is_grabbing();
        let thickness = self.session.thickness();
        let memory = self.session.memory_mut();
        let displacement_rate = rate(displacement, memory.last_export_d, output.dt);
        memory.last_export_d = displacement;

        let identity = (!physics).then(|| self.curve.identity());
        let (curve_name, scale) = match &identity {
            Some((name, scale)) => (&**name, *scale),
            None => ("", CurveScale::IDENTITY),
        };

        let sample = ExtendedGrabberSample {
            base: GrabberSample {
                device: self.device.id.as_str(),
                button: self.button,
                grabbing,
                stylus: pose.position,
                particle,
                particle_position: particle_position.unwrap_or(Vec3::NAN),
                displacement,
                force_command: output.command_world,
                valid_force: output.has_force(),
            },
            displacement_rate,
            strain: output.strain,
            strain_rate: output.strain_rate,
            mode: output.mode,
            x_is_strain: self.config.x_is_strain,
            thickness,
            force_coef: self.config.force_coef,
            visco_enabled: self.config.visco.enabled,
            eta: self.config.visco.eta,
            tau: self.config.visco.tau,
            curve_name,
            curve_x_scale: scale.x,
            curve_y_scale: scale.y,
        };
        self.telemetry.record(&sample);
    }

    /// Change the direction hysteresis angle. Out-of-range values are
    /// clamped; NaN is ignored.
    pub fn set_smooth_angle(&mut self, degrees: f32) {
        let gate = &mut self.session.memory_mut().gate;
        gate.set_smooth_angle(degrees);
        self.config.smooth_angle_deg = gate.smooth_angle();
    }

    /// Enable or disable the Prony term. Re-enabling seeds the integrator
    /// from the next input.
    pub fn set_prony_enabled(&mut self, enabled: bool) {
        self.config.prony.enabled = enabled;
        self.pipeline.set_prony_enabled(enabled);
        if !enabled {
            self.session.memory_mut().prony.invalidate();
        }
    }

    /// Switch between the curve and physics force models.
    pub fn set_force_source(&mut self, source: ForceSource) {
        self.config.force_source = source;
        self.pipeline.set_force_source(source);
    }

    /// Rebuild the curve from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`GrabberError::Curve`] if the source fails or yields fewer
    /// than two valid rows. The curve is then unavailable and contributes
    /// no force until a successful reload.
    pub fn reload_curve(&mut self, source: &dyn CurveSource) -> Result<(), GrabberError> {
        let result = self.curve.reload(source);
        match result {
            Ok(()) => {
                info!(device = %self.device.id, curve = source.name(), "curve reloaded");
                Ok(())
            }
            Err(err) => {
                warn!(
                    device = %self.device.id,
                    curve = source.name(),
                    error = %err,
                    "curve reload failed; curve force disabled"
                );
                Err(err.into())
            }
        }
    }

    /// Positions of every particle in the grab history, `None` where the
    /// lookup failed.
    pub fn tracked_positions(&self) -> Vec<(ParticleHandle, Option<Vec3>)> {
        self.history
            .iter()
            .map(|handle| (handle, self.capture.position(handle).ok()))
            .collect()
    }

    /// Configuration in use (sanitized).
    pub fn config(&self) -> &GrabberConfig {
        &self.config
    }

    /// Issues found when the grabber was built.
    pub fn diagnostics(&self) -> &[ConfigError] {
        &self.diagnostics
    }

    /// Device this grabber drives.
    pub fn device(&self) -> &DeviceBinding {
        &self.device
    }

    /// Grab session.
    pub fn session(&self) -> &GrabSession {
        &self.session
    }

    /// Session state.
    pub fn state(&self) -> GrabState {
        self.session.state()
    }

    /// Check if a particle is held.
    pub fn is_grabbing(&self) -> bool {
        self.session.is_grabbing()
    }

    /// Captured particles, oldest first.
    pub fn history(&self) -> &GrabHistory {
        &self.history
    }

    /// Curve handle; clones share reloads.
    pub fn curve(&self) -> &SharedCurve {
        &self.curve
    }

    /// Pose read on the last physics tick.
    pub fn last_pose(&self) -> StylusPose {
        self.pose
    }

    /// Check if telemetry goes to the extended record.
    pub fn records_extended(&self) -> bool {
        self.telemetry.is_extended()
    }
}

impl fmt::Debug for Grabber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grabber")
            .field("device", &self.device)
            .field("session", &self.session)
            .field("pipeline", &self.pipeline)
            .field("telemetry", &self.telemetry)
            .field("curve", &self.curve.name())
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}

/// Wires a [`Grabber`] to its collaborators.
///
/// Pose source, capture service and force sink are mandatory; the visual and
/// telemetry sink are optional. Configuration problems never fail the build:
/// they are logged once and available from [`Grabber::diagnostics`].
pub struct GrabberBuilder {
    config: GrabberConfig,
    device: DeviceBinding,
    pose_source: Option<Box<dyn PoseSource>>,
    capture: Option<Box<dyn CaptureService>>,
    force_sink: Option<Box<dyn ForceSink>>,
    visual: Option<Box<dyn GrabberVisual>>,
    telemetry: Option<Box<dyn TelemetrySink>>,
    curve: SharedCurve,
}

impl GrabberBuilder {
    /// Start from a configuration with the default device and no curve.
    pub fn new(config: GrabberConfig) -> Self {
        Self {
            config,
            device: DeviceBinding::default(),
            pose_source: None,
            capture: None,
            force_sink: None,
            visual: None,
            telemetry: None,
            curve: SharedCurve::empty(),
        }
    }

    /// Device to drive.
    #[must_use]
    pub fn device(mut self, device: DeviceBinding) -> Self {
        self.device = device;
        self
    }

    /// Stylus pose and button source.
    #[must_use]
    pub fn pose_source(mut self, source: impl PoseSource + 'static) -> Self {
        self.pose_source = Some(Box::new(source));
        self
    }

    /// Particle capture bridge.
    #[must_use]
    pub fn capture_service(mut self, capture: impl CaptureService + 'static) -> Self {
        self.capture = Some(Box::new(capture));
        self
    }

    /// Device force bridge.
    #[must_use]
    pub fn force_sink(mut self, sink: impl ForceSink + 'static) -> Self {
        self.force_sink = Some(Box::new(sink));
        self
    }

    /// Grabber visual props.
    #[must_use]
    pub fn visual(mut self, visual: impl GrabberVisual + 'static) -> Self {
        self.visual = Some(Box::new(visual));
        self
    }

    /// Telemetry recorder.
    #[must_use]
    pub fn telemetry(mut self, sink: impl TelemetrySink + 'static) -> Self {
        self.telemetry = Some(Box::new(sink));
        self
    }

    /// Force curve.
    #[must_use]
    pub fn curve(mut self, curve: SharedCurve) -> Self {
        self.curve = curve;
        self
    }

    /// Build the grabber.
    ///
    /// # Errors
    ///
    /// Returns [`GrabberError::MissingCollaborator`] if the pose source,
    /// capture service or force sink was not provided.
    pub fn build(self) -> Result<Grabber, GrabberError> {
        let pose_source = self
            .pose_source
            .ok_or(GrabberError::MissingCollaborator("pose source"))?;
        let capture = self
            .capture
            .ok_or(GrabberError::MissingCollaborator("capture service"))?;
        let force_sink = self
            .force_sink
            .ok_or(GrabberError::MissingCollaborator("force sink"))?;

        let mut diagnostics = self.config.diagnostics();
        if self.config.force_source == ForceSource::Curve && !self.curve.is_available() {
            diagnostics.push(ConfigError::MissingCurve);
        }
        for issue in &diagnostics {
            warn!(device = %self.device.id, error = %issue, "grabber configuration issue");
        }

        let config = self.config.sanitized();
        let telemetry = TelemetryChannel::new(self.telemetry);
        debug!(
            device = %self.device.id,
            mode = %SampleMode::for_config(&config),
            extended_telemetry = telemetry.is_extended(),
            "grabber ready"
        );

        Ok(Grabber {
            session: GrabSession::new(&config),
            pipeline: ForcePipeline::new(PipelineSettings::from_config(&config)),
            history: GrabHistory::new(config.history_capacity),
            curve: self.curve,
            config,
            device: self.device,
            pose_source,
            capture,
            force_sink,
            visual: self.visual,
            telemetry,
            pose: StylusPose::default(),
            button: false,
            diagnostics,
        })
    }
}

impl fmt::Debug for GrabberBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrabberBuilder")
            .field("config", &self.config)
            .field("device", &self.device)
            .field("pose_source", &self.pose_source.is_some())
            .field("capture", &self.capture.is_some())
            .field("force_sink", &self.force_sink.is_some())
            .field("visual", &self.visual.is_some())
            .field("telemetry", &self.telemetry.is_some())
            .finish_non_exhaustive()
    }
}
