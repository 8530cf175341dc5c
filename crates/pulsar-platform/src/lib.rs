//! Pulsar Platform - input conditioning for the pulsar effects module
//!
//! This crate turns raw pin levels and ADC readings into debounced logical
//! events. It sits between the hardware collaborators (pin registers, ADC,
//! LEDs), which are described here only as small traits, and the engine that
//! polls the resulting state.
//!
//! # Core Abstractions
//!
//! ## Hardware Boundary
//!
//! - [`InputId`] - Port/pin identity of an interrupt-capable input
//! - [`DigitalInput`] / [`AnalogInput`] / [`DigitalOutput`] - Collaborator traits
//! - [`Polarity`] / [`Pull`] - Electrical configuration of an input
//!
//! ## Interrupt Path
//!
//! - [`InterruptDispatch`] - Per-input handler table invoked from interrupt context
//! - [`InterruptHandler`] - The single `on_interrupt` operation
//! - [`PendingFlag`] - Take-and-reset "an interrupt happened" handler
//!
//! ## Controls
//!
//! - [`Switch`] - Interrupt-driven debounced pushbutton with edge latches
//! - [`Encoder`] - 7-state quadrature decoder with acceleration and an optional button
//! - [`Gate`] / [`CvBank`] - Polled, thresholded CV gates
//!
//! ## Simulation
//!
//! - [`SimPin`], [`SimAdc`], [`SimLed`] - Atomic stand-ins for the hardware
//!   collaborators, used by tests and the host simulator
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! pulsar-platform = { version = "0.1", default-features = false }
//! ```
//!
//! Enable the `tracing` feature to log registrations and interrupt aliasing.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod encoder;
pub mod gate;
pub mod interrupt;
pub mod sim;
pub mod switch;

pub use pulsar_core::{Clock, CvInput, GateSource};

// Re-export main types at crate root
pub use encoder::{AccelConfig, Encoder, EncoderCallback, EncoderState};
pub use gate::{CvBank, DEFAULT_GATE_THRESHOLD, Gate, GateConfig, bipolar, unipolar};
pub use interrupt::{
    InterruptDispatch, InterruptHandler, IrqVector, MAX_HANDLERS, PendingFlag, Registration,
};
pub use sim::{SimAdc, SimLed, SimPin};
pub use switch::{Switch, SwitchCallback, SwitchConfig};

/// Number of pins on one GPIO port.
pub const PINS_PER_PORT: u8 = 16;

/// Clock reference shared by every control that debounces.
pub type SharedClock<'a> = &'a (dyn Clock + Sync);

/// Identity of an interrupt-capable digital input.
///
/// Pins with the same number on different ports share one interrupt line.
///
/// # Example
///
/// ```rust
/// use pulsar_platform::InputId;
///
/// let a3 = InputId::new(0, 3);
/// let b3 = InputId::new(1, 3);
/// assert_eq!(a3.line(), b3.line());
/// assert_ne!(a3, b3);
/// assert_eq!(b3.to_string(), "PB3");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputId {
    /// GPIO port, `0` for port A.
    pub port: u8,
    /// Pin number within the port.
    pub pin: u8,
}

impl InputId {
    /// Creates an input identity.
    #[inline]
    pub const fn new(port: u8, pin: u8) -> Self {
        Self { port, pin }
    }

    /// Interrupt line this input raises, equal to its pin number.
    #[inline]
    pub const fn line(self) -> u8 {
        self.pin
    }

    /// Returns true if the pin number exists on a port.
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.pin < PINS_PER_PORT
    }
}

impl core::fmt::Display for InputId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.port < 26 {
            write!(f, "P{}{}", char::from(b'A' + self.port), self.pin)
        } else {
            write!(f, "P{}.{}", self.port, self.pin)
        }
    }
}

/// Which electrical level means "on".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Polarity {
    /// High level is on.
    #[default]
    OnHigh,
    /// Low level is on (switch to ground with a pull-up).
    OnLow,
}

impl Polarity {
    /// Maps a raw pin level to the logical value.
    #[inline]
    pub const fn apply(self, level: bool) -> bool {
        match self {
            Polarity::OnHigh => level,
            Polarity::OnLow => !level,
        }
    }
}

/// Internal pull resistor setting, recorded for the pin collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pull {
    /// Floating input.
    #[default]
    None,
    /// Internal pull-up.
    Up,
    /// Internal pull-down.
    Down,
}

/// Readable digital pin.
///
/// Must be callable from interrupt context.
pub trait DigitalInput: Sync {
    /// Current raw level of the pin.
    fn read(&self) -> bool;
}

impl<T: DigitalInput + ?Sized> DigitalInput for &T {
    #[inline]
    fn read(&self) -> bool {
        (**self).read()
    }
}

/// Free-running ADC.
pub trait AnalogInput: Sync {
    /// Latest conversion for `channel`, or `None` if the channel does not exist.
    fn read(&self, channel: usize) -> Option<u16>;
}

impl<T: AnalogInput + ?Sized> AnalogInput for &T {
    #[inline]
    fn read(&self, channel: usize) -> Option<u16> {
        (**self).read(channel)
    }
}

/// Writable digital pin, such as a status LED.
pub trait DigitalOutput {
    /// Drives the pin.
    fn write(&self, on: bool);
}

impl<T: DigitalOutput + ?Sized> DigitalOutput for &T {
    #[inline]
    fn write(&self, on: bool) {
        (**self).write(on);
    }
}
