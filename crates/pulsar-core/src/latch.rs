//! Edge latches bridging interrupt context to polling consumers.
//!
//! An [`EdgeLatch`] is a pair of sticky flags set by whoever observes a
//! debounced transition and consumed with take-and-reset semantics by a
//! poller. It behaves like an event queue of depth one per direction:
//! several same-direction transitions between two polls collapse into a
//! single `true`, and a transition that happened before a take is never lost.

use core::sync::atomic::{AtomicBool, Ordering};

/// Sticky turned-on / turned-off flags.
///
/// # Example
///
/// ```rust
/// use pulsar_core::EdgeLatch;
///
/// let latch = EdgeLatch::new();
/// latch.record(true);
/// latch.record(true); // coalesced with the first
///
/// assert!(latch.take_on());
/// assert!(!latch.take_on());
/// assert!(!latch.take_off());
/// ```
#[derive(Debug, Default)]
pub struct EdgeLatch {
    turned_on: AtomicBool,
    turned_off: AtomicBool,
}

/// Both latch flags, taken at the same moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeSnapshot {
    /// A transition to on happened since the previous take.
    pub turned_on: bool,
    /// A transition to off happened since the previous take.
    pub turned_off: bool,
}

impl EdgeSnapshot {
    /// Snapshot with neither flag set.
    pub const NONE: Self = Self {
        turned_on: false,
        turned_off: false,
    };

    /// Returns true if either flag is set.
    #[inline]
    pub const fn any(&self) -> bool {
        self.turned_on || self.turned_off
    }
}

impl EdgeLatch {
    /// Creates a latch with both flags clear.
    pub const fn new() -> Self {
        Self {
            turned_on: AtomicBool::new(false),
            turned_off: AtomicBool::new(false),
        }
    }

    /// Records a debounced transition to `on`.
    #[inline]
    pub fn record(&self, on: bool) {
        if on {
            self.turned_on.store(true, Ordering::Release);
        } else {
            self.turned_off.store(true, Ordering::Release);
        }
    }

    /// Returns and clears the turned-on flag.
    #[inline]
    pub fn take_on(&self) -> bool {
        self.turned_on.swap(false, Ordering::AcqRel)
    }

    /// Returns and clears the turned-off flag.
    #[inline]
    pub fn take_off(&self) -> bool {
        self.turned_off.swap(false, Ordering::AcqRel)
    }

    /// Takes both flags.
    ///
    /// Each flag is swapped individually; an edge landing between the two
    /// swaps is reported now or on the next take, never dropped.
    #[inline]
    pub fn take(&self) -> EdgeSnapshot {
        EdgeSnapshot {
            turned_on: self.take_on(),
            turned_off: self.take_off(),
        }
    }

    /// Reads both flags without clearing them.
    #[inline]
    pub fn peek(&self) -> EdgeSnapshot {
        EdgeSnapshot {
            turned_on: self.turned_on.load(Ordering::Acquire),
            turned_off: self.turned_off.load(Ordering::Acquire),
        }
    }

    /// Clears both flags.
    pub fn clear(&self) {
        self.turned_on.store(false, Ordering::Release);
        self.turned_off.store(false, Ordering::Release);
    }
}
