//! Piecewise-linear lookup table built from measured samples.

use serde::{Deserialize, Serialize};

use crate::error::CurveError;

/// One measured `(x, y)` row: displacement or strain against force.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveSample {
    /// Displacement (or strain) coordinate.
    pub x: f32,
    /// Force at `x`.
    pub y: f32,
}

impl CurveSample {
    /// Create a sample.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<(f32, f32)> for CurveSample {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

/// Unit conversion applied around table lookup.
///
/// The input is multiplied by `x` before lookup and the looked-up force is
/// multiplied by `y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveScale {
    /// Input scale.
    pub x: f32,
    /// Output scale.
    pub y: f32,
}

impl CurveScale {
    /// No conversion.
    pub const IDENTITY: Self = Self { x: 1.0, y: 1.0 };

    /// Create a scale, rejecting zero, negative and non-finite factors.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::InvalidScale`] naming the offending axis.
    pub fn new(x: f32, y: f32) -> Result<Self, CurveError> {
        if !(x.is_finite() && x > 0.0) {
            return Err(CurveError::InvalidScale { axis: "x", value: x });
        }
        if !(y.is_finite() && y > 0.0) {
            return Err(CurveError::InvalidScale { axis: "y", value: y });
        }
        Ok(Self { x, y })
    }
}

impl Default for CurveScale {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Immutable piecewise-linear force curve.
///
/// Invariants, established by [`CurveTable::from_samples`]:
/// - at least [`CurveTable::MIN_SAMPLES`] samples
/// - `x` strictly increasing and finite, `y` finite
///
/// Outside the sampled domain the curve is flat: inputs below the first
/// sample return the first force, inputs above the last return the last.
///
/// # RT Safety
///
/// `evaluate()` performs no allocation and runs in O(log n).
#[derive(Debug, Clone, PartialEq)]
pub struct CurveTable {
    xs: Box<[f32]>,
    ys: Box<[f32]>,
    scale: CurveScale,
    discarded: usize,
}

impl CurveTable {
    /// Minimum number of valid samples for a usable curve.
    pub const MIN_SAMPLES: usize = 2;

    /// Guard added to the interval width so a degenerate interval never
    /// divides by zero. Well-formed tables are unaffected.
    pub const INTERVAL_EPSILON: f32 = 1e-12;

    /// Build a table from raw samples.
    ///
    /// Rows are taken in order. A row is discarded when either coordinate is
    /// non-finite, or when its `x` does not exceed the last accepted `x`
    /// (duplicates and out-of-order rows keep the first occurrence).
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::TooFewSamples`] if fewer than two rows survive.
    pub fn from_samples<I>(samples: I) -> Result<Self, CurveError>
    where
        I: IntoIterator<Item = CurveSample>,
    {
        let samples = samples.into_iter();
        let (lower, _) = samples.size_hint();
        let mut xs: Vec<f32> = Vec::with_capacity(lower);
        let mut ys: Vec<f32> = Vec::with_capacity(lower);
        let mut discarded = 0usize;

        for sample in samples {
            let CurveSample { x, y } = sample;
            let in_order = xs.last().is_none_or(|&prev| x > prev);
            if x.is_finite() && y.is_finite() && in_order {
                xs.push(x);
                ys.push(y);
            } else {
                discarded = discarded.saturating_add(1);
            }
        }

        if discarded > 0 {
            tracing::warn!(
                discarded,
                kept = xs.len(),
                "discarded malformed, duplicate or out-of-order curve rows"
            );
        }

        if xs.len() < Self::MIN_SAMPLES {
            return Err(CurveError::TooFewSamples { found: xs.len() });
        }

        Ok(Self {
            xs: xs.into_boxed_slice(),
            ys: ys.into_boxed_slice(),
            scale: CurveScale::IDENTITY,
            discarded,
        })
    }

    /// Build a table from `(x, y)` pairs.
    ///
    /// Same validation as [`CurveTable::from_samples`].
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::TooFewSamples`] if fewer than two rows survive.
    pub fn from_pairs(pairs: &[(f32, f32)]) -> Result<Self, CurveError> {
        Self::from_samples(pairs.iter().copied().map(CurveSample::from))
    }

    /// Replace the unit scale.
    #[must_use]
    pub fn with_scale(mut self, scale: CurveScale) -> Self {
        self.scale = scale;
        self
    }

    /// Evaluate the curve at `x_input` (RT-safe).
    ///
    /// The input is scaled by `scale.x`, clamped flat outside the sampled
    /// domain, linearly interpolated inside it, and the result scaled by
    /// `scale.y`. A NaN input evaluates like an input below the domain.
    #[inline]
    pub fn evaluate(&self, x_input: f32) -> f32 {
        let x = x_input * self.scale.x;

        let (Some(&x_first), Some(&x_last), Some(&y_first), Some(&y_last)) = (
            self.xs.first(),
            self.xs.last(),
            self.ys.first(),
            self.ys.last(),
        ) else {
            return 0.0;
        };

        if x.is_nan() || x <= x_first {
            return y_first * self.scale.y;
        }
        if x >= x_last {
            return y_last * self.scale.y;
        }

        // x_first < x < x_last, so hi lands in 1..len-1.
        let hi = self.xs.partition_point(|&v| v <= x);
        let lo = hi.saturating_sub(1);

        match (
            self.xs.get(lo),
            self.xs.get(hi),
            self.ys.get(lo),
            self.ys.get(hi),
        ) {
            (Some(&x0), Some(&x1), Some(&y0), Some(&y1)) => {
                let t = (x - x0) / (x1 - x0 + Self::INTERVAL_EPSILON);
                (y0 + (y1 - y0) * t) * self.scale.y
            }
            _ => y_last * self.scale.y,
        }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    /// Always false; a table holds at least two samples.
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Number of rows discarded during construction.
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    /// Unit scale in effect.
    pub fn scale(&self) -> CurveScale {
        self.scale
    }

    /// Unscaled sampled domain `(x_first, x_last)`.
    pub fn domain(&self) -> (f32, f32) {
        let first = self.xs.first().copied().unwrap_or(0.0);
        let last = self.xs.last().copied().unwrap_or(0.0);
        (first, last)
    }

    /// Iterate the unscaled samples.
    pub fn samples(&self) -> impl Iterator<Item = CurveSample> + '_ {
        self.xs
            .iter()
            .zip(self.ys.iter())
            .map(|(&x, &y)| CurveSample::new(x, y))
    }

    /// Check if the sampled forces never decrease with `x`.
    pub fn is_monotonic(&self) -> bool {
        self.ys.windows(2).all(|w| match w {
            [a, b] => b >= a,
            _ => true,
        })
    }

    /// Largest scaled force the curve can return.
    pub fn max_force(&self) -> f32 {
        self.ys.iter().copied().fold(f32::NEG_INFINITY, f32::max) * self.scale.y
    }
}

#[derive(Serialize, Deserialize)]
struct CurveTableRepr {
    samples: Vec<CurveSample>,
    #[serde(default)]
    scale: CurveScale,
}

impl Serialize for CurveTable {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        CurveTableRepr {
            samples: self.samples().collect(),
            scale: self.scale,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CurveTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let repr = CurveTableRepr::deserialize(deserializer)?;
        let scale = CurveScale::new(repr.scale.x, repr.scale.y).map_err(serde::de::Error::custom)?;
        CurveTable::from_samples(repr.samples)
            .map(|table| table.with_scale(scale))
            .map_err(serde::de::Error::custom)
    }
}
