//! Two-state debouncing for switches and gate inputs.
//!
//! [`Debouncer`] turns a raw stream of rising/falling/unchanged observations
//! into a stable high/low value plus a "just changed" flag. Mechanical
//! contacts and noisy CV gates bounce for a few milliseconds around every
//! transition; the debouncer accepts the first edge immediately and then
//! ignores the opposite direction until the input has had time to settle.
//!
//! # State Machine
//!
//! ```text
//!            rising                      elapsed >= settling
//!   Low ──────────────▶ HighSettling ─────────────────────────▶ High
//!    ▲                                                           │
//!    │ elapsed >= settling                              falling  │
//!    └─────────────────── LowSettling ◀──────────────────────────┘
//! ```
//!
//! Settling is timed from the last accepted transition. Edges that arrive
//! while a `*Settling` state is active never produce a change, so any burst
//! of bounces shorter than the settling time yields exactly one change.
//!
//! # Concurrency
//!
//! The state and the timestamp of the last transition are packed into a
//! single [`AtomicU32`] and updated with compare-and-swap. An interrupt
//! handler may call [`Debouncer::process`] while the cooperative loop calls
//! [`Debouncer::value`] without either observing a torn update.

use core::sync::atomic::{AtomicU32, Ordering};

/// Reference settling time for the module's switches and gates.
pub const DEFAULT_SETTLING_US: u32 = 2000;

/// Bits of the packed word that hold the transition timestamp.
const TIME_BITS: u32 = 30;
const TIME_MASK: u32 = (1 << TIME_BITS) - 1;

/// Direction of a raw input observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Edge {
    /// The input went (or is) high.
    Rising,
    /// The input went (or is) low.
    Falling,
    /// No new information; only the settling timer is checked.
    #[default]
    None,
}

impl Edge {
    /// Converts a sampled input level into an edge direction.
    ///
    /// Level-driven callers (pin interrupts, polled gates) feed the current
    /// level every time; the state machine ignores edges that match the
    /// present state.
    #[inline]
    pub const fn from_level(high: bool) -> Self {
        if high { Edge::Rising } else { Edge::Falling }
    }

    /// Converts a signed up/down indication into an edge direction.
    ///
    /// Positive is rising, negative is falling and zero is [`Edge::None`].
    #[inline]
    pub const fn from_updown(updown: i32) -> Self {
        if updown > 0 {
            Edge::Rising
        } else if updown < 0 {
            Edge::Falling
        } else {
            Edge::None
        }
    }
}

/// Internal state of a [`Debouncer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DebounceState {
    /// Stable low.
    #[default]
    Low,
    /// Recently went low, still ignoring bounces.
    LowSettling,
    /// Stable high.
    High,
    /// Recently went high, still ignoring bounces.
    HighSettling,
}

impl DebounceState {
    /// Returns true if this state represents a logical high.
    #[inline]
    pub const fn is_high(self) -> bool {
        matches!(self, DebounceState::High | DebounceState::HighSettling)
    }

    /// Returns true while the state is waiting out contact bounce.
    #[inline]
    pub const fn is_settling(self) -> bool {
        matches!(self, DebounceState::LowSettling | DebounceState::HighSettling)
    }

    /// Returns the stable counterpart of this state.
    #[inline]
    pub const fn settled(self) -> Self {
        match self {
            DebounceState::LowSettling => DebounceState::Low,
            DebounceState::HighSettling => DebounceState::High,
            other => other,
        }
    }

    const fn to_bits(self) -> u32 {
        match self {
            DebounceState::Low => 0,
            DebounceState::LowSettling => 1,
            DebounceState::High => 2,
            DebounceState::HighSettling => 3,
        }
    }

    const fn from_bits(bits: u32) -> Self {
        match bits & 0b11 {
            0 => DebounceState::Low,
            1 => DebounceState::LowSettling,
            2 => DebounceState::High,
            _ => DebounceState::HighSettling,
        }
    }
}

/// Result of one debounce step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Debounced {
    /// Debounced logical level.
    pub high: bool,
    /// True if this step accepted a transition.
    pub changed: bool,
}

/// Debouncer tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceConfig {
    /// Time after an accepted transition during which opposite edges are ignored.
    pub settling_us: u32,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            settling_us: DEFAULT_SETTLING_US,
        }
    }
}

/// Lock-free two-state debouncer.
///
/// Created in [`DebounceState::Low`].
///
/// # Example
///
/// ```rust
/// use pulsar_core::{Debouncer, Edge};
///
/// let debouncer = Debouncer::new();
///
/// // First rising edge is accepted immediately
/// let step = debouncer.process(Edge::Rising, 0);
/// assert!(step.high && step.changed);
///
/// // Bounce inside the settling window is ignored
/// let step = debouncer.process(Edge::Falling, 500);
/// assert!(step.high && !step.changed);
///
/// // After settling, a falling edge is accepted
/// let step = debouncer.process(Edge::Falling, 2500);
/// assert!(!step.high && step.changed);
/// ```
#[derive(Debug)]
pub struct Debouncer {
    /// `state << 30 | transition_time_us & TIME_MASK`
    word: AtomicU32,
    settling_us: u32,
}

impl Debouncer {
    /// Creates a debouncer with the reference settling time.
    pub const fn new() -> Self {
        Self::with_settling_us(DEFAULT_SETTLING_US)
    }

    /// Creates a debouncer from a [`DebounceConfig`].
    pub const fn with_config(config: DebounceConfig) -> Self {
        Self::with_settling_us(config.settling_us)
    }

    /// Creates a debouncer with an explicit settling time in microseconds.
    ///
    /// The settling time is clamped below 2^30 µs.
    pub const fn with_settling_us(settling_us: u32) -> Self {
        let settling_us = if settling_us > TIME_MASK {
            TIME_MASK
        } else {
            settling_us
        };
        Self {
            word: AtomicU32::new(pack(DebounceState::Low, 0)),
            settling_us,
        }
    }

    /// Returns the configured settling time in microseconds.
    #[inline]
    pub fn settling_us(&self) -> u32 {
        self.settling_us
    }

    /// Feeds one observation into the state machine.
    ///
    /// `now_us` is the current monotonic time. Only its low 30 bits are kept,
    /// so timestamps are compared with wrapping arithmetic.
    pub fn process(&self, edge: Edge, now_us: u64) -> Debounced {
        let now = (now_us as u32) & TIME_MASK;
        let mut current = self.word.load(Ordering::Acquire);
        loop {
            let settled = self.settle(current, now);
            let (next, changed) = match (edge, unpack_state(settled)) {
                (Edge::Rising, DebounceState::Low) => {
                    (pack(DebounceState::HighSettling, now), true)
                }
                (Edge::Falling, DebounceState::High) => {
                    (pack(DebounceState::LowSettling, now), true)
                }
                _ => (settled, false),
            };
            let result = Debounced {
                high: unpack_state(next).is_high(),
                changed,
            };
            if next == current {
                return result;
            }
            match self
                .word
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return result,
                Err(actual) => current = actual,
            }
        }
    }

    /// Returns the debounced level, collapsing an expired settling state.
    ///
    /// Equivalent to `process(Edge::None, now_us).high`.
    #[inline]
    pub fn value(&self, now_us: u64) -> bool {
        self.process(Edge::None, now_us).high
    }

    /// Returns the raw state without checking the settling timer.
    #[inline]
    pub fn state(&self) -> DebounceState {
        unpack_state(self.word.load(Ordering::Acquire))
    }

    /// Forces the debouncer back to [`DebounceState::Low`].
    pub fn reset(&self) {
        let low = pack(DebounceState::Low, 0);
        self.word.store(low, Ordering::Release);
    }

    /// Collapses a settling state whose timer has expired.
    #[inline]
    fn settle(&self, word: u32, now: u32) -> u32 {
        let state = unpack_state(word);
        if !state.is_settling() {
            return word;
        }
        let since = word & TIME_MASK;
        let elapsed = now.wrapping_sub(since) & TIME_MASK;
        if elapsed >= self.settling_us {
            pack(state.settled(), since)
        } else {
            word
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
const fn pack(state: DebounceState, time: u32) -> u32 {
    (state.to_bits() << TIME_BITS) | (time & TIME_MASK)
}

#[inline]
const fn unpack_state(word: u32) -> DebounceState {
    DebounceState::from_bits(word >> TIME_BITS)
}
