//! Haptic grabber: grab/release state machine and restoring-force pipeline
//!
//! A stylus grabs a particle of a deformable body; while the button is held
//! the grabber pushes back with a force taken from a measured
//! force-displacement curve, optionally corrected by Prony-series
//! viscoelasticity and a viscous term, smoothed, and gated for direction
//! changes before it reaches the device.
//!
//! # Architecture
//!
//! - [`collaborators`]: traits for the pose source, capture service, force
//!   sink and visual props that live outside this crate
//! - [`config`]: serde configuration with non-fatal diagnostics
//! - [`session`]: `Idle`/`Grabbing` state and per-grab pipeline memory
//! - [`pipeline`]: the per-tick force computation
//! - [`telemetry`]: per-tick records and the recorder interface
//! - [`history`]: bounded record of captured particles
//! - [`grabber`]: the tick driver wiring it all together
//!
//! # RT Safety
//!
//! The force pipeline does not allocate. [`Grabber::render_tick`] performs
//! no allocation of its own; the collaborators it calls are responsible for
//! theirs.
//!
//! # Example
//!
//! ```
//! use glam::{Quat, Vec3};
//! use openhaptic_curves::CurveTable;
//! use openhaptic_grabber::prelude::*;
//!
//! let config = GrabberConfig::default();
//! let pipeline = ForcePipeline::new(PipelineSettings::from_config(&config));
//! let mut memory = PipelineMemory::new(&config);
//! let curve = CurveTable::from_pairs(&[(0.0, 0.0), (1.0, 5.0)])?;
//!
//! // Half the thickness away from the anchor: strain 0.5, force 2.5.
//! let input = ForceInput {
//!     stylus: Vec3::new(0.015, 0.0, 0.0),
//!     device_rotation: Quat::IDENTITY,
//!     anchor: Vec3::ZERO,
//!     thickness: 0.03,
//!     dt: 0.001,
//! };
//! let output = pipeline.compute_curve(&mut memory, Some(&curve), &input);
//! assert!((output.force_scalar - 2.5).abs() < 1e-4);
//! # Ok::<(), openhaptic_curves::CurveError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod collaborators;
pub mod config;
pub mod error;
pub mod grabber;
pub mod history;
pub mod pipeline;
pub mod prelude;
pub mod session;
pub mod telemetry;

pub use collaborators::{
    CaptureService, DeviceBinding, DeviceHandle, DeviceId, ForceSink, GrabberVisual,
    ParticleHandle, PoseSource, StylusPose,
};
pub use config::{ExportConfig, ForceSource, GrabberConfig, PronyConfig, ViscoConfig};
pub use error::GrabberError;
pub use grabber::{Grabber, GrabberBuilder, ReleaseCause, TickReport, Transition};
pub use history::GrabHistory;
pub use pipeline::{DISTANCE_EPSILON, ForceInput, ForceOutput, ForcePipeline, PipelineSettings};
pub use session::{GrabSession, GrabState, PipelineMemory};
pub use telemetry::{ExtendedGrabberSample, GrabberSample, SampleMode, TelemetrySink};
