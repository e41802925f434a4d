//! Prelude for the curves crate.
//!
//! ```
//! use openhaptic_curves::prelude::*;
//!
//! let table = CurveTable::from_pairs(&[(0.0, 0.0), (1.0, 5.0)])?;
//! assert!((table.evaluate(0.2) - 1.0).abs() < 1e-6);
//! # Ok::<(), CurveError>(())
//! ```

pub use crate::error::CurveError;
pub use crate::shared::SharedCurve;
pub use crate::source::{CurveSource, StaticCurveSource};
pub use crate::table::{CurveSample, CurveScale, CurveTable};
