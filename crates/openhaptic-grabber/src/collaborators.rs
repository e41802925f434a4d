//! External collaborator interfaces.
//!
//! The grabber never talks to a device, a physics engine or a recorder
//! directly. It receives these capabilities at construction and calls them
//! synchronously from the tick.

use std::fmt;

use glam::{Quat, Vec3};
use openhaptic_errors::CollaboratorResult;
use serde::{Deserialize, Serialize};

/// Opaque reference to a captured particle in the physics engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticleHandle(pub u32);

impl fmt::Display for ParticleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Name of a haptic device as the force bridge knows it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Create a device id.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Device name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Low-level handle used by the device driver for grab/release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceHandle(pub u32);

/// The device a grabber drives: bridge name plus driver handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceBinding {
    /// Bridge name, used for force and stiffness writes.
    pub id: DeviceId,
    /// Driver handle, used for grab and release.
    pub handle: DeviceHandle,
}

impl DeviceBinding {
    /// Bind a named device.
    pub fn new(id: impl Into<String>, handle: DeviceHandle) -> Self {
        Self {
            id: DeviceId::new(id),
            handle,
        }
    }
}

impl Default for DeviceBinding {
    fn default() -> Self {
        Self::new("Default Device", DeviceHandle(0))
    }
}

/// One stylus reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StylusPose {
    /// Stylus tip in world coordinates.
    pub position: Vec3,
    /// Grab button state.
    pub button: bool,
    /// Device frame orientation in world coordinates (unit quaternion).
    pub device_rotation: Quat,
}

impl StylusPose {
    /// Pose at `position` with the button released and an identity frame.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            button: false,
            device_rotation: Quat::IDENTITY,
        }
    }

    /// Same pose with the given button state.
    #[must_use]
    pub fn with_button(mut self, button: bool) -> Self {
        self.button = button;
        self
    }

    /// Same pose with the given device orientation.
    #[must_use]
    pub fn with_rotation(mut self, device_rotation: Quat) -> Self {
        self.device_rotation = device_rotation;
        self
    }

    /// Whether position and rotation are free of NaN and infinity.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.device_rotation.is_finite()
    }
}

impl Default for StylusPose {
    fn default() -> Self {
        Self::at(Vec3::ZERO)
    }
}

/// Source of stylus position and button state.
pub trait PoseSource {
    /// Read the current pose.
    ///
    /// # Errors
    ///
    /// Returns an error if the device cannot be read this tick; the grabber
    /// keeps the previous pose.
    fn sample(&mut self) -> CollaboratorResult<StylusPose>;
}

/// Particle-physics bridge.
pub trait CaptureService {
    /// Try to capture a particle within `sensitivity` of `position`.
    ///
    /// `Ok(None)` means nothing was in range.
    fn capture(&mut self, position: Vec3, sensitivity: f32)
    -> CollaboratorResult<Option<ParticleHandle>>;

    /// Release whatever particle is captured.
    fn release(&mut self) -> CollaboratorResult;

    /// Particle currently captured, if any.
    fn current_handle(&self) -> Option<ParticleHandle>;

    /// World position of a particle.
    fn position(&self, handle: ParticleHandle) -> CollaboratorResult<Vec3>;

    /// Move the captured particle towards `target`.
    fn drag_to(&mut self, target: Vec3) -> CollaboratorResult;

    /// World-frame force the engine computes for the captured particle with
    /// the stylus at `stylus`.
    fn particle_force(&mut self, stylus: Vec3) -> CollaboratorResult<Vec3>;
}

/// Force bridge to the haptic device.
pub trait ForceSink {
    /// Command a force and torque in the device frame.
    fn set_force(&mut self, device: &DeviceId, force: Vec3, torque: Vec3) -> CollaboratorResult;

    /// Set the device's built-in spring stiffness.
    fn set_spring_stiffness(&mut self, device: &DeviceId, k0: f32, k1: f32) -> CollaboratorResult;

    /// Tell the driver a grab started.
    fn grab(&mut self, device: DeviceHandle) -> CollaboratorResult;

    /// Tell the driver a grab ended.
    fn release(&mut self, device: DeviceHandle) -> CollaboratorResult;
}

/// Visual props that show whether the grabber is closed.
pub trait GrabberVisual {
    /// Switch the props to the grabbing (`true`) or open (`false`) look.
    fn set_grabber_visual_state(&mut self, active: bool);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_particle_handle_display() {
        assert_eq!(ParticleHandle(1126).to_string(), "#1126");
    }

    #[test]
    fn test_default_binding() {
        let binding = DeviceBinding::default();
        assert_eq!(binding.id.as_str(), "Default Device");
        assert_eq!(binding.handle, DeviceHandle(0));
    }

    #[test]
    fn test_pose_builders() {
        let pose = StylusPose::at(Vec3::X)
            .with_button(true)
            .with_rotation(Quat::from_rotation_z(1.0));
        assert!(pose.button);
        assert_eq!(pose.position, Vec3::X);
        assert_ne!(pose.device_rotation, Quat::IDENTITY);
    }

    #[test]
    fn test_handle_serializes_transparently() -> Result<(), serde_json::Error> {
        assert_eq!(serde_json::to_string(&ParticleHandle(7))?, "7");
        assert_eq!(serde_json::to_string(&DeviceId::new("left"))?, "\"left\"");
        Ok(())
    }
}
