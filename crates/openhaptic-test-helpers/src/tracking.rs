//! Allocation tracking for RT safety tests.
//!
//! A test binary installs [`TrackingAllocator`] as its global allocator;
//! [`track`] then counts heap allocations made on the current thread until
//! the guard is dropped.
//!
//! ```rust,ignore
//! use openhaptic_test_helpers::tracking::{TrackingAllocator, track};
//!
//! #[global_allocator]
//! static GLOBAL: TrackingAllocator = TrackingAllocator;
//!
//! let guard = track();
//! grabber.render_tick(0.001);
//! openhaptic_test_helpers::assert_rt_safe!(guard, "render_tick");
//! ```

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::fmt;

thread_local! {
    static ALLOCATION_COUNT: Cell<usize> = const { Cell::new(0) };
    static ALLOCATION_BYTES: Cell<usize> = const { Cell::new(0) };
    static TRACKING_ENABLED: Cell<bool> = const { Cell::new(false) };
}

fn record(bytes: usize) {
    if TRACKING_ENABLED.with(Cell::get) {
        ALLOCATION_COUNT.with(|count| count.set(count.get().saturating_add(1)));
        ALLOCATION_BYTES.with(|total| total.set(total.get().saturating_add(bytes)));
    }
}

/// System allocator wrapper that counts allocations while tracking is on.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackingAllocator;

unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            record(layout.size());
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc_zeroed(layout) };
        if !ptr.is_null() {
            record(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) };
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = unsafe { System.realloc(ptr, layout, new_size) };
        if !new_ptr.is_null() && new_size > layout.size() {
            record(new_size - layout.size());
        }
        new_ptr
    }
}

/// Counts allocations on this thread from creation until drop.
#[derive(Debug)]
pub struct AllocationGuard {
    start_count: usize,
    start_bytes: usize,
}

impl AllocationGuard {
    /// Start tracking.
    pub fn new() -> Self {
        TRACKING_ENABLED.with(|enabled| enabled.set(true));
        Self {
            start_count: ALLOCATION_COUNT.with(Cell::get),
            start_bytes: ALLOCATION_BYTES.with(Cell::get),
        }
    }

    /// Allocations since the guard was created.
    pub fn allocations(&self) -> usize {
        ALLOCATION_COUNT
            .with(Cell::get)
            .saturating_sub(self.start_count)
    }

    /// Bytes allocated since the guard was created.
    pub fn bytes(&self) -> usize {
        ALLOCATION_BYTES
            .with(Cell::get)
            .saturating_sub(self.start_bytes)
    }

    /// Check if anything was allocated.
    pub fn has_allocations(&self) -> bool {
        self.allocations() > 0
    }

    /// Snapshot the counters under a label.
    pub fn report(&self, context: impl Into<String>) -> AllocationReport {
        AllocationReport {
            allocations: self.allocations(),
            bytes: self.bytes(),
            context: context.into(),
        }
    }
}

impl Default for AllocationGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for AllocationGuard {
    fn drop(&mut self) {
        TRACKING_ENABLED.with(|enabled| enabled.set(false));
    }
}

/// Start tracking allocations on this thread.
pub fn track() -> AllocationGuard {
    AllocationGuard::new()
}

/// Panic if the guard saw any allocation.
#[macro_export]
macro_rules! assert_rt_safe {
    ($guard:expr) => {
        $crate::assert_rt_safe!($guard, "tracked section")
    };
    ($guard:expr, $context:expr) => {{
        let guard = &$guard;
        let allocs = guard.allocations();
        if allocs > 0 {
            panic!(
                "RT path allocation violation in '{}': {} allocations ({} bytes) at {}:{}",
                $context,
                allocs,
                guard.bytes(),
                file!(),
                line!()
            );
        }
    }};
}

/// Allocation counts captured for a labelled section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationReport {
    /// Number of allocations.
    pub allocations: usize,
    /// Bytes allocated.
    pub bytes: usize,
    /// Label of the section.
    pub context: String,
}

impl AllocationReport {
    /// Panic unless the section was allocation-free.
    pub fn assert_zero(&self) -> &Self {
        if self.allocations > 0 {
            panic!(
                "Allocation violation in '{}': {} allocations ({} bytes)",
                self.context, self.allocations, self.bytes
            );
        }
        self
    }

    /// Check if the section was allocation-free.
    pub fn is_zero(&self) -> bool {
        self.allocations == 0
    }
}

impl fmt::Display for AllocationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.allocations > 0 {
            write!(
                f,
                "{} allocated {} times ({} bytes)",
                self.context, self.allocations, self.bytes
            )
        } else {
            write!(f, "{}: zero allocations", self.context)
        }
    }
}
