//! Ordered record of captured particles.

use crate::collaborators::ParticleHandle;

/// Captured particle handles in capture order, bounded by an explicit
/// capacity.
///
/// A push past capacity is refused and logged; existing entries are never
/// dropped or overwritten.
///
/// # Example
///
/// ```
/// use openhaptic_grabber::{GrabHistory, ParticleHandle};
///
/// let mut history = GrabHistory::new(2);
/// assert!(history.push(ParticleHandle(4)));
/// assert!(history.push(ParticleHandle(9)));
/// assert!(!history.push(ParticleHandle(12)));
/// assert_eq!(history.as_slice(), &[ParticleHandle(4), ParticleHandle(9)]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrabHistory {
    handles: Vec<ParticleHandle>,
    capacity: usize,
}

impl GrabHistory {
    const RESERVED: usize = 16;

    /// Create an empty history holding at most `capacity` handles.
    ///
    /// Storage grows on demand; only a small prefix is reserved up front.
    pub fn new(capacity: usize) -> Self {
        Self {
            handles: Vec::with_capacity(capacity.min(Self::RESERVED)),
            capacity,
        }
    }

    /// Append a handle. Returns `false` if the history is full.
    pub fn push(&mut self, handle: ParticleHandle) -> bool {
        if self.is_full() {
            tracing::warn!(
                particle = %handle,
                capacity = self.capacity,
                "grab history full; particle not tracked"
            );
            return false;
        }
        self.handles.push(handle);
        true
    }

    /// Number of tracked handles.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Check if nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Maximum number of handles.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Check if another push would be refused.
    pub fn is_full(&self) -> bool {
        self.handles.len() >= self.capacity
    }

    /// Tracked handles in capture order.
    pub fn as_slice(&self) -> &[ParticleHandle] {
        &self.handles
    }

    /// Iterate tracked handles in capture order.
    pub fn iter(&self) -> impl Iterator<Item = ParticleHandle> + '_ {
        self.handles.iter().copied()
    }

    /// Forget every handle.
    pub fn clear(&mut self) {
        self.handles.clear();
    }
}

impl Default for GrabHistory {
    fn default() -> Self {
        Self::new(10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_capture_order() {
        let mut history = GrabHistory::new(3);
        for id in [5, 1, 5] {
            assert!(history.push(ParticleHandle(id)));
        }
        let ids: Vec<u32> = history.iter().map(|h| h.0).collect();
        assert_eq!(ids, vec![5, 1, 5]);
        assert!(history.is_full());
    }

    #[test]
    fn test_refuses_past_capacity() {
        let mut history = GrabHistory::new(1);
        assert!(history.push(ParticleHandle(1)));
        assert!(!history.push(ParticleHandle(2)));
        assert_eq!(history.len(), 1);
        assert_eq!(history.as_slice(), &[ParticleHandle(1)]);
    }

    #[test]
    fn test_zero_capacity_tracks_nothing() {
        let mut history = GrabHistory::new(0);
        assert!(!history.push(ParticleHandle(1)));
        assert!(history.is_empty());
    }

    #[test]
    fn test_huge_capacity_does_not_reserve_it() {
        let mut history = GrabHistory::new(usize::MAX);
        assert_eq!(history.capacity(), usize::MAX);
        assert!(history.push(ParticleHandle(7)));
        assert!(!history.is_full());
    }

    #[test]
    fn test_clear() {
        let mut history = GrabHistory::default();
        assert_eq!(history.capacity(), 10);
        let _ = history.push(ParticleHandle(3));
        history.clear();
        assert!(history.is_empty());
    }
}
