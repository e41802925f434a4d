//! Curves, stylus trajectories and a fully wired test rig.

use glam::Vec3;
use openhaptic_curves::{SharedCurve, StaticCurveSource};
use openhaptic_grabber::{
    DeviceBinding, DeviceHandle, Grabber, GrabberBuilder, GrabberConfig, StylusPose, TickReport,
};

use crate::mock::{MockCapture, RecordingForceSink, RecordingTelemetry, RecordingVisual, ScriptedPose};
use crate::must::must;

/// Source for the straight line through `(0, 0)` and `(1, 5)`.
pub fn linear_source() -> StaticCurveSource {
    StaticCurveSource::from_pairs("linear", &[(0.0, 0.0), (1.0, 5.0)])
}

/// Curve for [`linear_source`].
pub fn linear_curve() -> SharedCurve {
    SharedCurve::load(&linear_source())
}

/// Stiffening, toe-region shaped curve typical of soft tissue.
pub fn tissue_source() -> StaticCurveSource {
    StaticCurveSource::from_pairs(
        "tissue",
        &[
            (0.0, 0.0),
            (0.2, 0.1),
            (0.4, 0.4),
            (0.6, 1.0),
            (0.8, 2.2),
            (1.0, 4.0),
        ],
    )
}

/// Curve for [`tissue_source`].
pub fn tissue_curve() -> SharedCurve {
    SharedCurve::load(&tissue_source())
}

/// Constant-velocity stylus motion with the button held.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTrajectory {
    pub from: Vec3,
    pub to: Vec3,
    /// Number of ticks after the starting one.
    pub steps: usize,
}

impl LinearTrajectory {
    pub fn new(from: Vec3, to: Vec3, steps: usize) -> Self {
        Self { from, to, steps }
    }

    /// Pull along +x from the origin by `distance`.
    pub fn pull_x(distance: f32, steps: usize) -> Self {
        Self::new(Vec3::ZERO, Vec3::new(distance, 0.0, 0.0), steps)
    }

    /// Position at tick `i` (0 is `from`, `steps` is `to`).
    pub fn position(&self, i: usize) -> Vec3 {
        if self.steps == 0 {
            return self.to;
        }
        let t = i.min(self.steps) as f32 / self.steps as f32;
        self.from.lerp(self.to, t)
    }

    /// `steps + 1` poses from `from` to `to`, button held.
    pub fn poses(&self) -> impl Iterator<Item = StylusPose> + '_ {
        (0..=self.steps).map(|i| StylusPose::at(self.position(i)).with_button(true))
    }
}

/// A grabber wired to recording mocks, with handles to every mock.
#[derive(Debug)]
pub struct Rig {
    pub grabber: Grabber,
    pub pose: ScriptedPose,
    pub capture: MockCapture,
    pub sink: RecordingForceSink,
    pub visual: RecordingVisual,
    pub telemetry: RecordingTelemetry,
}

impl Rig {
    /// Rig with one particle at the origin, the linear curve and an extended
    /// telemetry sink.
    pub fn new(config: GrabberConfig) -> Self {
        Self::with_parts(config, linear_curve(), RecordingTelemetry::extended())
    }

    pub fn with_parts(
        config: GrabberConfig,
        curve: SharedCurve,
        telemetry: RecordingTelemetry,
    ) -> Self {
        let pose = ScriptedPose::new();
        let capture = MockCapture::with_particle(Vec3::ZERO);
        let sink = RecordingForceSink::new();
        let visual = RecordingVisual::new();

        let grabber = must(
            GrabberBuilder::new(config)
                .device(DeviceBinding::new("Default Device", DeviceHandle(1)))
                .pose_source(pose.clone())
                .capture_service(capture.clone())
                .force_sink(sink.clone())
                .visual(visual.clone())
                .telemetry(telemetry.clone())
                .curve(curve)
                .build(),
        );

        Self {
            grabber,
            pose,
            capture,
            sink,
            visual,
            telemetry,
        }
    }

    /// Script `poses` and tick once per pose.
    pub fn run(
        &mut self,
        poses: impl IntoIterator<Item = StylusPose>,
        frame_delta: f32,
    ) -> Vec<TickReport> {
        let poses: Vec<StylusPose> = poses.into_iter().collect();
        self.pose.extend(poses.iter().copied());
        poses
            .iter()
            .map(|_| self.grabber.tick(frame_delta))
            .collect()
    }

    /// Press the button at the origin.
    pub fn press(&mut self) -> TickReport {
        self.pose.push(StylusPose::at(Vec3::ZERO).with_button(true));
        self.grabber.tick(0.001)
    }

    /// Release the button where the stylus is.
    pub fn lift(&mut self) -> TickReport {
        let at = self.grabber.last_pose().position;
        self.pose.push(StylusPose::at(at));
        self.grabber.tick(0.001)
    }
}
