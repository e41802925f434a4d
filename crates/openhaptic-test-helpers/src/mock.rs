//! Recording collaborators for grabber tests.
//!
//! Every mock is a cheap `Clone` over shared state: hand one clone to the
//! [`GrabberBuilder`](openhaptic_grabber::GrabberBuilder) and keep another to
//! script inputs and inspect the calls it received.
//!
//! The `Null*`/`Fixed*` collaborators record nothing and never allocate, for
//! RT safety tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use glam::Vec3;
use openhaptic_errors::{CollaboratorError, CollaboratorResult};
use openhaptic_grabber::{
    CaptureService, DeviceHandle, DeviceId, ExtendedGrabberSample, ForceSink, GrabberSample,
    GrabberVisual, ParticleHandle, PoseSource, StylusPose, TelemetrySink,
};

use crate::must::must;

#[derive(Debug, Default)]
struct PoseScript {
    queue: VecDeque<Option<StylusPose>>,
    last: StylusPose,
}

/// Pose source that replays a script.
///
/// Once the script runs out the last pose is repeated. A scripted failure
/// makes that one sample return an error.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPose {
    script: Rc<RefCell<PoseScript>>,
}

impl ScriptedPose {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_poses(poses: impl IntoIterator<Item = StylusPose>) -> Self {
        let source = Self::new();
        source.extend(poses);
        source
    }

    pub fn push(&self, pose: StylusPose) {
        self.script.borrow_mut().queue.push_back(Some(pose));
    }

    pub fn extend(&self, poses: impl IntoIterator<Item = StylusPose>) {
        self.script
            .borrow_mut()
            .queue
            .extend(poses.into_iter().map(Some));
    }

    /// Make the next unread sample fail.
    pub fn push_failure(&self) {
        self.script.borrow_mut().queue.push_back(None);
    }

    pub fn remaining(&self) -> usize {
        self.script.borrow().queue.len()
    }
}

impl PoseSource for ScriptedPose {
    fn sample(&mut self) -> CollaboratorResult<StylusPose> {
        let mut script = self.script.borrow_mut();
        match script.queue.pop_front() {
            Some(Some(pose)) => {
                script.last = pose;
                Ok(pose)
            }
            Some(None) => Err(CollaboratorError::Unavailable(
                "scripted pose failure".to_string(),
            )),
            None => Ok(script.last),
        }
    }
}

/// A particle known to [`MockCapture`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MockParticle {
    pub handle: ParticleHandle,
    pub position: Vec3,
}

#[derive(Debug, Default)]
struct CaptureState {
    particles: Vec<MockParticle>,
    captured: Option<ParticleHandle>,
    engine_force: Vec3,
    fail_capture: bool,
    fail_position: bool,
    fail_engine: bool,
    drag_targets: Vec<Vec3>,
    releases: usize,
}

/// Capture service over a fixed set of particles.
///
/// `capture` takes the nearest particle within the sensitivity radius.
/// Particles do not move when dragged; drag targets are recorded.
#[derive(Debug, Clone, Default)]
pub struct MockCapture {
    state: Rc<RefCell<CaptureState>>,
}

impl MockCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a particle; handles are assigned in insertion order from 0.
    pub fn add_particle(&self, position: Vec3) -> ParticleHandle {
        let mut state = self.state.borrow_mut();
        let handle = ParticleHandle(u32::try_from(state.particles.len()).unwrap_or(u32::MAX));
        state.particles.push(MockParticle { handle, position });
        handle
    }

    pub fn with_particle(position: Vec3) -> Self {
        let capture = Self::new();
        capture.add_particle(position);
        capture
    }

    /// Force returned by `particle_force`.
    pub fn set_engine_force(&self, force: Vec3) {
        self.state.borrow_mut().engine_force = force;
    }

    pub fn fail_capture(&self, fail: bool) {
        self.state.borrow_mut().fail_capture = fail;
    }

    pub fn fail_position(&self, fail: bool) {
        self.state.borrow_mut().fail_position = fail;
    }

    pub fn fail_engine(&self, fail: bool) {
        self.state.borrow_mut().fail_engine = fail;
    }

    /// Drop the captured particle as the engine would on its own.
    pub fn drop_particle(&self) {
        self.state.borrow_mut().captured = None;
    }

    pub fn captured(&self) -> Option<ParticleHandle> {
        self.state.borrow().captured
    }

    pub fn drag_targets(&self) -> Vec<Vec3> {
        self.state.borrow().drag_targets.clone()
    }

    pub fn releases(&self) -> usize {
        self.state.borrow().releases
    }
}

impl CaptureService for MockCapture {
    fn capture(
        &mut self,
        position: Vec3,
        sensitivity: f32,
    ) -> CollaboratorResult<Option<ParticleHandle>> {
        let mut state = self.state.borrow_mut();
        if state.fail_capture {
            return Err(CollaboratorError::failed("capture", "scripted failure"));
        }
        let nearest = state
            .particles
            .iter()
            .map(|p| (p.handle, p.position.distance(position)))
            .filter(|&(_, distance)| distance <= sensitivity)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(handle, _)| handle);
        state.captured = nearest;
        Ok(nearest)
    }

    fn release(&mut self) -> CollaboratorResult {
        let mut state = self.state.borrow_mut();
        state.captured = None;
        state.releases += 1;
        Ok(())
    }

    fn current_handle(&self) -> Option<ParticleHandle> {
        self.state.borrow().captured
    }

    fn position(&self, handle: ParticleHandle) -> CollaboratorResult<Vec3> {
        let state = self.state.borrow();
        if state.fail_position {
            return Err(CollaboratorError::InvalidHandle(handle.0));
        }
        state
            .particles
            .iter()
            .find(|p| p.handle == handle)
            .map(|p| p.position)
            .ok_or(CollaboratorError::InvalidHandle(handle.0))
    }

    fn drag_to(&mut self, target: Vec3) -> CollaboratorResult {
        self.state.borrow_mut().drag_targets.push(target);
        Ok(())
    }

    fn particle_force(&mut self, _stylus: Vec3) -> CollaboratorResult<Vec3> {
        let state = self.state.borrow();
        if state.fail_engine {
            return Err(CollaboratorError::Unavailable("engine stopped".to_string()));
        }
        Ok(state.engine_force)
    }
}

/// Non-force call received by [`RecordingForceSink`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeviceEvent {
    SpringStiffness(f32, f32),
    Grab(DeviceHandle),
    Release(DeviceHandle),
}

#[derive(Debug, Default)]
struct SinkState {
    forces: Vec<Vec3>,
    devices: Vec<String>,
    events: Vec<DeviceEvent>,
    fail_set_force: bool,
}

/// Force sink that records every call.
#[derive(Debug, Clone, Default)]
pub struct RecordingForceSink {
    state: Rc<RefCell<SinkState>>,
}

impl RecordingForceSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `set_force` fail (the value is still recorded).
    pub fn fail_set_force(&self, fail: bool) {
        self.state.borrow_mut().fail_set_force = fail;
    }

    pub fn forces(&self) -> Vec<Vec3> {
        self.state.borrow().forces.clone()
    }

    pub fn last_force(&self) -> Option<Vec3> {
        self.state.borrow().forces.last().copied()
    }

    /// Device names used for force writes.
    pub fn devices(&self) -> Vec<String> {
        self.state.borrow().devices.clone()
    }

    pub fn events(&self) -> Vec<DeviceEvent> {
        self.state.borrow().events.clone()
    }

    pub fn clear(&self) {
        let mut state = self.state.borrow_mut();
        state.forces.clear();
        state.devices.clear();
        state.events.clear();
    }
}

impl ForceSink for RecordingForceSink {
    fn set_force(&mut self, device: &DeviceId, force: Vec3, _torque: Vec3) -> CollaboratorResult {
        let mut state = self.state.borrow_mut();
        state.forces.push(force);
        state.devices.push(device.as_str().to_string());
        if state.fail_set_force {
            return Err(CollaboratorError::failed("set_force", "device unplugged"));
        }
        Ok(())
    }

    fn set_spring_stiffness(&mut self, _device: &DeviceId, k0: f32, k1: f32) -> CollaboratorResult {
        self.state
            .borrow_mut()
            .events
            .push(DeviceEvent::SpringStiffness(k0, k1));
        Ok(())
    }

    fn grab(&mut self, device: DeviceHandle) -> CollaboratorResult {
        self.state.borrow_mut().events.push(DeviceEvent::Grab(device));
        Ok(())
    }

    fn release(&mut self, device: DeviceHandle) -> CollaboratorResult {
        self.state
            .borrow_mut()
            .events
            .push(DeviceEvent::Release(device));
        Ok(())
    }
}

/// Visual that records each state it is switched to.
#[derive(Debug, Clone, Default)]
pub struct RecordingVisual {
    states: Rc<RefCell<Vec<bool>>>,
}

impl RecordingVisual {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn states(&self) -> Vec<bool> {
        self.states.borrow().clone()
    }
}

impl GrabberVisual for RecordingVisual {
    fn set_grabber_visual_state(&mut self, active: bool) {
        self.states.borrow_mut().push(active);
    }
}

#[derive(Debug, Default)]
struct TelemetryState {
    running: bool,
    basic: Vec<serde_json::Value>,
    extended: Vec<serde_json::Value>,
}

/// Telemetry sink that keeps every record as JSON.
#[derive(Debug, Clone, Default)]
pub struct RecordingTelemetry {
    state: Rc<RefCell<TelemetryState>>,
    extended: bool,
}

impl RecordingTelemetry {
    /// A running sink that accepts only the basic record.
    pub fn basic() -> Self {
        let sink = Self::default();
        sink.set_running(true);
        sink
    }

    /// A running sink that accepts the extended record.
    pub fn extended() -> Self {
        Self {
            extended: true,
            ..Self::basic()
        }
    }

    pub fn set_running(&self, running: bool) {
        self.state.borrow_mut().running = running;
    }

    pub fn basic_samples(&self) -> Vec<serde_json::Value> {
        self.state.borrow().basic.clone()
    }

    pub fn extended_samples(&self) -> Vec<serde_json::Value> {
        self.state.borrow().extended.clone()
    }

    /// Every record, basic and extended, in arrival order per kind.
    pub fn len(&self) -> usize {
        let state = self.state.borrow();
        state.basic.len() + state.extended.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn last_extended(&self) -> Option<serde_json::Value> {
        self.state.borrow().extended.last().cloned()
    }
}

impl TelemetrySink for RecordingTelemetry {
    fn is_running(&self) -> bool {
        self.state.borrow().running
    }

    fn supports_extended_sample(&self) -> bool {
        self.extended
    }

    fn record(&mut self, sample: &GrabberSample<'_>) {
        let value = must(serde_json::to_value(sample));
        self.state.borrow_mut().basic.push(value);
    }

    fn record_extended(&mut self, sample: &ExtendedGrabberSample<'_>) {
        let value = must(serde_json::to_value(sample));
        self.state.borrow_mut().extended.push(value);
    }
}

/// Pose source that always returns the same pose.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPose(pub StylusPose);

impl PoseSource for FixedPose {
    fn sample(&mut self) -> CollaboratorResult<StylusPose> {
        Ok(self.0)
    }
}

/// Capture service that always holds one particle at a fixed position.
#[derive(Debug, Clone, Copy)]
pub struct FixedCapture {
    pub particle: ParticleHandle,
    pub position: Vec3,
    pub engine_force: Vec3,
    captured: bool,
}

impl FixedCapture {
    pub fn new(position: Vec3) -> Self {
        Self {
            particle: ParticleHandle(0),
            position,
            engine_force: Vec3::ZERO,
            captured: false,
        }
    }
}

impl CaptureService for FixedCapture {
    fn capture(&mut self, _: Vec3, _: f32) -> CollaboratorResult<Option<ParticleHandle>> {
        self.captured = true;
        Ok(Some(self.particle))
    }

    fn release(&mut self) -> CollaboratorResult {
        self.captured = false;
        Ok(())
    }

    fn current_handle(&self) -> Option<ParticleHandle> {
        self.captured.then_some(self.particle)
    }

    fn position(&self, _: ParticleHandle) -> CollaboratorResult<Vec3> {
        Ok(self.position)
    }

    fn drag_to(&mut self, _: Vec3) -> CollaboratorResult {
        Ok(())
    }

    fn particle_force(&mut self, _: Vec3) -> CollaboratorResult<Vec3> {
        Ok(self.engine_force)
    }
}

/// Force sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullForceSink;

impl ForceSink for NullForceSink {
    fn set_force(&mut self, _: &DeviceId, _: Vec3, _: Vec3) -> CollaboratorResult {
        Ok(())
    }

    fn set_spring_stiffness(&mut self, _: &DeviceId, _: f32, _: f32) -> CollaboratorResult {
        Ok(())
    }

    fn grab(&mut self, _: DeviceHandle) -> CollaboratorResult {
        Ok(())
    }

    fn release(&mut self, _: DeviceHandle) -> CollaboratorResult {
        Ok(())
    }
}
