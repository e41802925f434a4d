//! Prelude for wiring a grabber.
//!
//! ```
//! use openhaptic_grabber::prelude::*;
//!
//! let builder = GrabberBuilder::new(GrabberConfig::default());
//! assert!(matches!(
//!     builder.build(),
//!     Err(GrabberError::MissingCollaborator("pose source"))
//! ));
//! ```

pub use crate::collaborators::{
    CaptureService, DeviceBinding, DeviceHandle, DeviceId, ForceSink, GrabberVisual,
    ParticleHandle, PoseSource, StylusPose,
};
pub use crate::config::{ForceSource, GrabberConfig};
pub use crate::error::GrabberError;
pub use crate::grabber::{Grabber, GrabberBuilder, ReleaseCause, TickReport, Transition};
pub use crate::history::GrabHistory;
pub use crate::pipeline::{ForceInput, ForceOutput, ForcePipeline, PipelineSettings};
pub use crate::session::{GrabSession, GrabState, PipelineMemory};
pub use crate::telemetry::{ExtendedGrabberSample, GrabberSample, SampleMode, TelemetrySink};
