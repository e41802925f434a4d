//! Reloadable curve handle shared between the loader and the force pipeline.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::CurveError;
use crate::source::CurveSource;
use crate::table::{CurveScale, CurveTable};

#[derive(Debug)]
struct CurveSlot {
    table: Option<Arc<CurveTable>>,
    name: Arc<str>,
}

impl Default for CurveSlot {
    fn default() -> Self {
        Self {
            table: None,
            name: Arc::from(""),
        }
    }
}

/// Shared, atomically replaceable curve.
///
/// Readers take an `Arc` snapshot per tick, so a reload never changes the
/// table under a tick that is already evaluating it. A failed reload leaves
/// the curve unavailable; the pipeline then contributes zero curve force
/// until a good reload arrives.
///
/// # Example
///
/// ```
/// use openhaptic_curves::{SharedCurve, StaticCurveSource};
///
/// let source = StaticCurveSource::from_pairs("tissue", &[(0.0, 0.0), (1.0, 5.0)]);
/// let curve = SharedCurve::load(&source);
/// assert!(curve.is_available());
/// assert_eq!(curve.evaluate(1.0), Some(5.0));
///
/// let empty = StaticCurveSource::from_pairs("tissue", &[]);
/// assert!(curve.reload(&empty).is_err());
/// assert_eq!(curve.evaluate(1.0), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SharedCurve {
    slot: Arc<RwLock<CurveSlot>>,
}

impl SharedCurve {
    /// A handle with no curve loaded.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap an already-built table.
    pub fn from_table(name: &str, table: CurveTable) -> Self {
        Self {
            slot: Arc::new(RwLock::new(CurveSlot {
                table: Some(Arc::new(table)),
                name: Arc::from(name),
            })),
        }
    }

    /// Build from a source. Failures are logged and produce an unavailable
    /// curve rather than an error, so wiring can continue.
    pub fn load(source: &dyn CurveSource) -> Self {
        let curve = Self::empty();
        if let Err(err) = curve.reload(source) {
            tracing::warn!(curve = source.name(), error = %err, "curve unavailable");
        }
        curve
    }

    /// Rebuild from `source` and swap the result in.
    ///
    /// On failure the previous table is dropped and the curve becomes
    /// unavailable.
    ///
    /// # Errors
    ///
    /// Returns the source or validation error.
    pub fn reload(&self, source: &dyn CurveSource) -> Result<(), CurveError> {
        let built = CurveTable::from_source(source);
        let mut slot = self.slot.write();
        slot.name = Arc::from(source.name());
        match built {
            Ok(table) => {
                tracing::debug!(
                    curve = source.name(),
                    samples = table.len(),
                    discarded = table.discarded(),
                    "curve loaded"
                );
                slot.table = Some(Arc::new(table));
                Ok(())
            }
            Err(err) => {
                slot.table = None;
                Err(err)
            }
        }
    }

    /// Current table, if one is loaded.
    #[inline]
    pub fn snapshot(&self) -> Option<Arc<CurveTable>> {
        self.slot.read().table.clone()
    }

    /// Evaluate the current table; `None` when no curve is loaded.
    #[inline]
    pub fn evaluate(&self, x: f32) -> Option<f32> {
        self.slot.read().table.as_ref().map(|table| table.evaluate(x))
    }

    /// Whether a usable table is loaded.
    pub fn is_available(&self) -> bool {
        self.slot.read().table.is_some()
    }

    /// Identity of the last source loaded.
    pub fn name(&self) -> String {
        self.slot.read().name.to_string()
    }

    /// Name and scale read under one lock, so a concurrent reload through
    /// another handle is never seen half applied.
    pub fn identity(&self) -> (Arc<str>, CurveScale) {
        let slot = self.slot.read();
        let scale = slot
            .table
            .as_ref()
            .map_or(CurveScale::IDENTITY, |table| table.scale());
        (Arc::clone(&slot.name), scale)
    }

    /// Scale of the current table, identity when unavailable.
    pub fn scale(&self) -> CurveScale {
        self.slot
            .read()
            .table
            .as_ref()
            .map_or(CurveScale::IDENTITY, |table| table.scale())
    }
}
