//! Telemetry records and the recorder interface.
//!
//! Sinks advertise once whether they accept the extended record; the grabber
//! picks basic or extended recording at build time.

use std::fmt;

use glam::Vec3;
use serde::Serialize;

use crate::collaborators::ParticleHandle;
use crate::config::{ForceSource, GrabberConfig};

/// Which force model produced a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SampleMode {
    /// Curve only.
    Elastic,
    /// Curve plus viscous term.
    Visco,
    /// Curve plus Prony overstress.
    Prony,
    /// Curve plus viscous term and Prony overstress.
    #[serde(rename = "Visco+Prony")]
    ViscoProny,
    /// Physics-engine force.
    Physics,
}

impl SampleMode {
    /// Mode tag for a force model and its enabled terms.
    pub fn new(source: ForceSource, visco_enabled: bool, prony_enabled: bool) -> Self {
        match (source, visco_enabled, prony_enabled) {
            (ForceSource::Physics, _, _) => Self::Physics,
            (ForceSource::Curve, false, false) => Self::Elastic,
            (ForceSource::Curve, true, false) => Self::Visco,
            (ForceSource::Curve, false, true) => Self::Prony,
            (ForceSource::Curve, true, true) => Self::ViscoProny,
        }
    }

    /// Mode tag for a configuration.
    pub fn for_config(config: &GrabberConfig) -> Self {
        Self::new(
            config.force_source,
            config.visco.enabled,
            config.prony.enabled,
        )
    }

    /// Tag as written to recordings.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Elastic => "Elastic",
            Self::Visco => "Visco",
            Self::Prony => "Prony",
            Self::ViscoProny => "Visco+Prony",
            Self::Physics => "Physics",
        }
    }
}

impl fmt::Display for SampleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-tick record accepted by every sink.
///
/// Unavailable particle positions are NaN (serialized as `null`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GrabberSample<'a> {
    /// Device name.
    pub device: &'a str,
    /// Grab button state.
    pub button: bool,
    /// Grab session state.
    pub grabbing: bool,
    /// Stylus tip in world coordinates.
    pub stylus: Vec3,
    /// Captured particle.
    pub particle: Option<ParticleHandle>,
    /// Particle position, NaN when unavailable.
    pub particle_position: Vec3,
    /// Exported displacement.
    pub displacement: f32,
    /// World-frame force command `-force * force_coef`.
    pub force_command: Vec3,
    /// Whether the command is non-negligible.
    pub valid_force: bool,
}

/// Extended record with derivatives and model parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExtendedGrabberSample<'a> {
    /// Fields shared with the basic record.
    #[serde(flatten)]
    pub base: GrabberSample<'a>,
    /// Rate of the exported displacement.
    pub displacement_rate: f32,
    /// Curve input (strain or displacement).
    pub strain: f32,
    /// Rate of the curve input.
    pub strain_rate: f32,
    /// Force model tag.
    pub mode: SampleMode,
    /// Whether the curve input is strain.
    pub x_is_strain: bool,
    /// Effective thickness.
    pub thickness: f32,
    /// Force coefficient.
    pub force_coef: f32,
    /// Viscous term enabled.
    pub visco_enabled: bool,
    /// Viscosity coefficient.
    pub eta: f32,
    /// Force smoothing time constant.
    pub tau: f32,
    /// Curve identity, empty in physics mode.
    pub curve_name: &'a str,
    /// Curve input scale.
    pub curve_x_scale: f32,
    /// Curve output scale.
    pub curve_y_scale: f32,
}

/// Recorder for grabber samples.
pub trait TelemetrySink {
    /// Whether a recording is in progress. Nothing is built or sent otherwise.
    fn is_running(&self) -> bool;

    /// Whether [`record_extended`](Self::record_extended) is supported.
    fn supports_extended_sample(&self) -> bool {
        false
    }

    /// Record a basic sample.
    fn record(&mut self, sample: &GrabberSample<'_>);

    /// Record an extended sample. Defaults to recording its basic part.
    fn record_extended(&mut self, sample: &ExtendedGrabberSample<'_>) {
        self.record(&sample.base);
    }
}

/// Recording path chosen once when the grabber is built.
pub(crate) enum TelemetryChannel {
    Disabled,
    Basic(Box<dyn TelemetrySink>),
    Extended(Box<dyn TelemetrySink>),
}

impl TelemetryChannel {
    pub(crate) fn new(sink: Option<Box<dyn TelemetrySink>>) -> Self {
        match sink {
            None => Self::Disabled,
            Some(sink) if sink.supports_extended_sample() => Self::Extended(sink),
            Some(sink) => Self::Basic(sink),
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        match self {
            Self::Disabled => false,
            Self::Basic(sink) | Self::Extended(sink) => sink.is_running(),
        }
    }

    pub(crate) fn is_extended(&self) -> bool {
        matches!(self, Self::Extended(_))
    }

    pub(crate) fn record(&mut self, sample: &ExtendedGrabberSample<'_>) {
        match self {
            Self::Disabled => {}
            Self::Basic(sink) => sink.record(&sample.base),
            Self::Extended(sink) => sink.record_extended(sample),
        }
    }
}

impl fmt::Debug for TelemetryChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => f.write_str("Disabled"),
            Self::Basic(_) => f.write_str("Basic"),
            Self::Extended(_) => f.write_str("Extended"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CapabilitySink {
        extended: bool,
    }

    impl TelemetrySink for CapabilitySink {
        fn is_running(&self) -> bool {
            true
        }

        fn supports_extended_sample(&self) -> bool {
            self.extended
        }

        fn record(&mut self, _sample: &GrabberSample<'_>) {}
    }

    fn sample() -> ExtendedGrabberSample<'static> {
        ExtendedGrabberSample {
            base: GrabberSample {
                device: "left",
                button: true,
                grabbing: true,
                stylus: Vec3::ZERO,
                particle: Some(ParticleHandle(3)),
                particle_position: Vec3::NAN,
                displacement: 0.0,
                force_command: Vec3::ZERO,
                valid_force: false,
            },
            displacement_rate: 0.0,
            strain: 0.0,
            strain_rate: 0.0,
            mode: SampleMode::Elastic,
            x_is_strain: true,
            thickness: 0.03,
            force_coef: 0.05,
            visco_enabled: false,
            eta: 0.0,
            tau: 0.0,
            curve_name: "",
            curve_x_scale: 1.0,
            curve_y_scale: 1.0,
        }
    }

    #[test]
    fn test_mode_tags() {
        let mut config = GrabberConfig::default();
        assert_eq!(SampleMode::for_config(&config), SampleMode::Elastic);
        config.visco.enabled = true;
        assert_eq!(SampleMode::for_config(&config), SampleMode::Visco);
        config.prony.enabled = true;
        assert_eq!(SampleMode::for_config(&config).as_str(), "Visco+Prony");
        config.visco.enabled = false;
        assert_eq!(SampleMode::for_config(&config), SampleMode::Prony);
        config.force_source = ForceSource::Physics;
        assert_eq!(SampleMode::for_config(&config), SampleMode::Physics);
    }

    #[test]
    fn test_channel_chosen_by_capability() {
        let basic = TelemetryChannel::new(Some(Box::new(CapabilitySink::default())));
        assert!(!basic.is_extended());
        assert!(basic.is_running());
        let extended = TelemetryChannel::new(Some(Box::new(CapabilitySink { extended: true })));
        assert!(extended.is_extended());
        let disabled = TelemetryChannel::new(None);
        assert!(!disabled.is_running());
    }

    #[test]
    fn test_default_extended_records_base() {
        struct BasicOnly(usize);
        impl TelemetrySink for BasicOnly {
            fn is_running(&self) -> bool {
                true
            }
            fn record(&mut self, _sample: &GrabberSample<'_>) {
                self.0 += 1;
            }
        }
        let mut sink = BasicOnly(0);
        sink.record_extended(&sample());
        assert_eq!(sink.0, 1);
    }

    #[test]
    fn test_nan_position_serializes_as_null() -> Result<(), serde_json::Error> {
        let json = serde_json::to_value(sample())?;
        assert_eq!(json["particle_position"], serde_json::json!([null, null, null]));
        assert_eq!(json["mode"], "Elastic");
        assert_eq!(json["particle"], 3);
        Ok(())
    }
}
