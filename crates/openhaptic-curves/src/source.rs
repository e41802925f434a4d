//! Where curve samples come from.
//!
//! Parsing measured data (CSV exports, assets) happens outside this crate.
//! A [`CurveSource`] only hands over the rows it found; validation is done by
//! [`CurveTable::from_samples`](crate::CurveTable::from_samples).

use crate::error::CurveError;
use crate::table::{CurveSample, CurveScale, CurveTable};

/// A provider of raw curve rows.
pub trait CurveSource {
    /// Identity of the data set, recorded in telemetry.
    fn name(&self) -> &str;

    /// Produce the raw rows. Malformed rows may be included; they are
    /// filtered when the table is built.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::Source`] if the data cannot be obtained.
    fn load(&self) -> Result<Vec<CurveSample>, CurveError>;

    /// Unit conversion to apply to the built table.
    fn scale(&self) -> CurveScale {
        CurveScale::IDENTITY
    }
}

impl CurveTable {
    /// Load and validate a table from a source, applying the source's scale.
    ///
    /// # Errors
    ///
    /// Propagates source failures and [`CurveError::TooFewSamples`].
    pub fn from_source(source: &dyn CurveSource) -> Result<Self, CurveError> {
        let samples = source.load()?;
        Ok(Self::from_samples(samples)?.with_scale(source.scale()))
    }
}

/// In-memory curve source.
///
/// # Example
///
/// ```
/// use openhaptic_curves::{CurveSource, CurveTable, StaticCurveSource};
///
/// let source = StaticCurveSource::from_pairs("skin-forearm", &[(0.0, 0.0), (1.0, 5.0)]);
/// let table = CurveTable::from_source(&source)?;
/// assert_eq!(source.name(), "skin-forearm");
/// assert!((table.evaluate(0.5) - 2.5).abs() < 1e-6);
/// # Ok::<(), openhaptic_curves::CurveError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StaticCurveSource {
    name: String,
    samples: Vec<CurveSample>,
    scale: CurveScale,
}

impl StaticCurveSource {
    /// Create a source from samples.
    pub fn new(name: impl Into<String>, samples: Vec<CurveSample>) -> Self {
        Self {
            name: name.into(),
            samples,
            scale: CurveScale::IDENTITY,
        }
    }

    /// Create a source from `(x, y)` pairs.
    pub fn from_pairs(name: impl Into<String>, pairs: &[(f32, f32)]) -> Self {
        Self::new(name, pairs.iter().copied().map(CurveSample::from).collect())
    }

    /// Set the unit scale applied to tables built from this source.
    #[must_use]
    pub fn with_scale(mut self, scale: CurveScale) -> Self {
        self.scale = scale;
        self
    }

    /// Replace the rows, as a re-export of the measured data would.
    pub fn set_samples(&mut self, samples: Vec<CurveSample>) {
        self.samples = samples;
    }
}

impl CurveSource for StaticCurveSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> Result<Vec<CurveSample>, CurveError> {
        Ok(self.samples.clone())
    }

    fn scale(&self) -> CurveScale {
        self.scale
    }
}
