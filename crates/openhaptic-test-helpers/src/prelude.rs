//! Convenience re-exports.
//!
//! ```rust,ignore
//! use openhaptic_test_helpers::prelude::*;
//! ```

pub use crate::must::{must, must_some, must_with};

#[cfg(feature = "tracking")]
pub use crate::tracking::{AllocationGuard, AllocationReport, TrackingAllocator, track};

#[cfg(feature = "mock")]
pub use crate::mock::{
    DeviceEvent, FixedCapture, FixedPose, MockCapture, MockParticle, NullForceSink,
    RecordingForceSink, RecordingTelemetry, RecordingVisual, ScriptedPose,
};

#[cfg(feature = "fixtures")]
pub use crate::fixtures::{
    LinearTrajectory, Rig, linear_curve, linear_source, tissue_curve, tissue_source,
};

pub use crate::{assert_all_finite, assert_approx_eq, assert_non_decreasing};

#[cfg(feature = "tracking")]
pub use crate::assert_rt_safe;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;
