//! Quadrature rotary encoder with acceleration and an integrated button.
//!
//! Both quadrature pins raise interrupts that land in the same handler. The
//! handler reads the two levels, steps a 7-state decode table and counts a
//! detent only on the `Cw1 -> Plus` and `Ccw1 -> Minus` transitions, so
//! contact bounce on either pin cannot produce a count.
//!
//! # Decode Table
//!
//! Indexed by `[state][a][b]`. A full clockwise detent walks
//! `AB = 00 -> 10 -> 11 -> 01 -> 00`:
//!
//! ```text
//!          start ──10──▶ cw1 ──11──▶ plus(+1) ──01──▶ cw2 ──00──▶ start
//!          start ──01──▶ ccw1 ──11──▶ minus(-1) ──10──▶ ccw2 ──00──▶ start
//! ```
//!
//! # Acceleration
//!
//! [`Encoder::change_accel`] counts consecutive non-zero polls. Once the run
//! exceeds [`AccelConfig::threshold`], deltas are multiplied by
//! [`AccelConfig::multiplier`]. A zero poll resets the run.

use core::sync::atomic::{AtomicI32, AtomicU8, AtomicU32, Ordering};

use crate::interrupt::InterruptHandler;
use crate::switch::{Switch, SwitchCallback, SwitchConfig};
use crate::{DigitalInput, Polarity, SharedClock};

/// Decoder state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum EncoderState {
    /// Both contacts open.
    #[default]
    Start = 0,
    /// First clockwise phase.
    Cw1 = 1,
    /// Clockwise detent reached.
    Plus = 2,
    /// Last clockwise phase.
    Cw2 = 3,
    /// First counter-clockwise phase.
    Ccw1 = 4,
    /// Counter-clockwise detent reached.
    Minus = 5,
    /// Last counter-clockwise phase.
    Ccw2 = 6,
}

use EncoderState::{Ccw1, Ccw2, Cw1, Cw2, Minus, Plus, Start};

/// Next state, indexed by `[state][a][b]`.
const TRANSITIONS: [[[EncoderState; 2]; 2]; 7] = [
    /* Start */ [[Start, Ccw1], [Cw1, Start]],
    /* Cw1   */ [[Start, Start], [Cw1, Plus]],
    /* Plus  */ [[Start, Cw2], [Cw1, Plus]],
    /* Cw2   */ [[Start, Cw2], [Start, Plus]],
    /* Ccw1  */ [[Start, Ccw1], [Start, Minus]],
    /* Minus */ [[Start, Ccw1], [Ccw2, Minus]],
    /* Ccw2  */ [[Start, Start], [Ccw2, Minus]],
];

impl EncoderState {
    const fn from_u8(value: u8) -> Self {
        match value {
            1 => Cw1,
            2 => Plus,
            3 => Cw2,
            4 => Ccw1,
            5 => Minus,
            6 => Ccw2,
            _ => Start,
        }
    }

    /// Next state after sampling logical levels `a` and `b`.
    #[inline]
    pub const fn next(self, a: bool, b: bool) -> Self {
        TRANSITIONS[self as usize][a as usize][b as usize]
    }

    /// Count produced by the transition `self -> next`.
    #[inline]
    pub const fn delta(self, next: Self) -> i32 {
        match (self, next) {
            (Cw1, Plus) => 1,
            (Ccw1, Minus) => -1,
            _ => 0,
        }
    }
}

/// Notified from interrupt context by an [`Encoder`].
///
/// Button changes arrive through the [`SwitchCallback`] supertrait.
/// Implementations must be interrupt-safe.
pub trait EncoderCallback: SwitchCallback {
    /// Called with `+1` or `-1` for every decoded detent.
    fn on_encoder_change(&self, delta: i32);
}

/// Acceleration tuning for [`Encoder::change_accel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccelConfig {
    /// Consecutive non-zero polls tolerated before scaling kicks in.
    pub threshold: u32,
    /// Factor applied to deltas once the run exceeds `threshold`.
    pub multiplier: i32,
}

impl Default for AccelConfig {
    fn default() -> Self {
        Self {
            threshold: 3,
            multiplier: 5,
        }
    }
}

/// Rotary encoder.
///
/// # Example
///
/// ```rust
/// use pulsar_platform::{Encoder, InterruptHandler, Polarity, SimPin};
///
/// let (a, b) = (SimPin::new(false), SimPin::new(false));
/// let encoder = Encoder::new(&a, &b, Polarity::OnHigh);
///
/// for (la, lb) in [(true, false), (true, true), (false, true), (false, false)] {
///     a.set(la);
///     b.set(lb);
///     encoder.on_interrupt();
/// }
/// assert_eq!(encoder.change(), 1);
/// assert_eq!(encoder.change(), 0);
/// ```
pub struct Encoder<'a> {
    pin_a: Option<&'a dyn DigitalInput>,
    pin_b: Option<&'a dyn DigitalInput>,
    polarity: Polarity,
    state: AtomicU8,
    count: AtomicI32,
    fast_count: AtomicU32,
    accel: AccelConfig,
    button: Switch<'a>,
    callback: Option<&'a dyn EncoderCallback>,
    button_callback: Option<&'a dyn SwitchCallback>,
}

impl core::fmt::Debug for Encoder<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Encoder")
            .field("state", &self.state())
            .field("pending", &self.count.load(Ordering::Relaxed))
            .field("accel", &self.accel)
            .field("button", &self.button)
            .finish()
    }
}

impl Default for Encoder<'_> {
    fn default() -> Self {
        Self::unconfigured()
    }
}

impl<'a> Encoder<'a> {
    /// An encoder with no pins. Never counts, button never pressed.
    pub const fn unconfigured() -> Self {
        Self {
            pin_a: None,
            pin_b: None,
            polarity: Polarity::OnHigh,
            state: AtomicU8::new(Start as u8),
            count: AtomicI32::new(0),
            fast_count: AtomicU32::new(0),
            accel: AccelConfig {
                threshold: 3,
                multiplier: 5,
            },
            button: Switch::unconfigured(),
            callback: None,
            button_callback: None,
        }
    }

    /// Creates an encoder on quadrature pins `a` and `b`.
    ///
    /// The decoder starts from the levels the pins read now, so a knob
    /// resting mid-detent still counts its next full step.
    pub fn new(a: &'a dyn DigitalInput, b: &'a dyn DigitalInput, polarity: Polarity) -> Self {
        let start = Start.next(polarity.apply(a.read()), polarity.apply(b.read()));
        Self {
            pin_a: Some(a),
            pin_b: Some(b),
            polarity,
            state: AtomicU8::new(start as u8),
            ..Self::unconfigured()
        }
    }

    /// Adds the integrated pushbutton.
    pub fn with_button(
        mut self,
        pin: &'a dyn DigitalInput,
        clock: SharedClock<'a>,
        config: SwitchConfig,
    ) -> Self {
        self.button = Switch::new(pin, clock, config);
        if let Some(callback) = self.button_callback {
            self.button = self.button.with_callback(callback);
        }
        self
    }

    /// Sets the acceleration tuning.
    pub fn with_accel(mut self, accel: AccelConfig) -> Self {
        self.accel = accel;
        self
    }

    /// Attaches a callback for detents and button changes.
    pub fn with_callback<C: EncoderCallback>(mut self, callback: &'a C) -> Self {
        self.callback = Some(callback);
        self.button_callback = Some(callback);
        self.button = self.button.with_callback(callback);
        self
    }

    /// Current acceleration tuning.
    #[inline]
    pub fn accel(&self) -> AccelConfig {
        self.accel
    }

    /// Current decoder state.
    #[inline]
    pub fn state(&self) -> EncoderState {
        EncoderState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Feeds logical (polarity-corrected) levels into the decoder.
    ///
    /// Returns the detent produced by this step, `0` if none.
    pub fn step(&self, a: bool, b: bool) -> i32 {
        let previous = match self.state.fetch_update(Ordering::AcqRel, Ordering::Acquire, |s| {
            Some(EncoderState::from_u8(s).next(a, b) as u8)
        }) {
            Ok(prev) | Err(prev) => EncoderState::from_u8(prev),
        };
        let delta = previous.delta(previous.next(a, b));
        if delta != 0 {
            self.count.fetch_add(delta, Ordering::AcqRel);
            if let Some(callback) = self.callback {
                callback.on_encoder_change(delta);
            }
        }
        delta
    }

    /// Takes and resets the accumulated detent count.
    #[inline]
    pub fn change(&self) -> i32 {
        self.count.swap(0, Ordering::AcqRel)
    }

    /// Like [`change`](Self::change), scaled up during fast spinning.
    ///
    /// Call from one context only; the run counter is not shared.
    pub fn change_accel(&self) -> i32 {
        let change = self.change();
        if change == 0 {
            self.fast_count.store(0, Ordering::Relaxed);
            return 0;
        }
        let run = self.fast_count.load(Ordering::Relaxed).saturating_add(1);
        self.fast_count.store(run, Ordering::Relaxed);
        if run > self.accel.threshold {
            change.saturating_mul(self.accel.multiplier)
        } else {
            change
        }
    }

    /// Debounced state of the integrated button.
    #[inline]
    pub fn is_pressed(&self) -> bool {
        self.button.is_on()
    }

    /// Returns and clears the button's turned-on latch.
    #[inline]
    pub fn was_pressed(&self) -> bool {
        self.button.turned_on()
    }

    /// The integrated button. Register it as the handler of the button pin.
    #[inline]
    pub fn button(&self) -> &Switch<'a> {
        &self.button
    }
}

impl InterruptHandler for Encoder<'_> {
    fn on_interrupt(&self) {
        let (Some(a), Some(b)) = (self.pin_a, self.pin_b) else {
            return;
        };
        let a = self.polarity.apply(a.read());
        let b = self.polarity.apply(b.read());
        self.step(a, b);
    }
}
