//! Interrupt-driven debounced switch.
//!
//! A [`Switch`] owns a [`Debouncer`] and an [`EdgeLatch`]. Its interrupt
//! handler samples the pin, maps the level through the configured
//! [`Polarity`] and feeds the logical level to the debouncer. Accepted
//! transitions set the latch and, if present, call the [`SwitchCallback`]
//! synchronously from interrupt context.
//!
//! The cooperative context polls with [`Switch::is_on`],
//! [`Switch::turned_on`] and [`Switch::turned_off`].

use pulsar_core::{DebounceConfig, Debouncer, Edge, EdgeLatch, EdgeSnapshot};

use crate::interrupt::InterruptHandler;
use crate::{DigitalInput, Polarity, Pull, SharedClock};

/// Notified from interrupt context when a switch changes.
///
/// Implementations must be interrupt-safe: no blocking, minimal work.
pub trait SwitchCallback: Sync {
    /// Called with the new logical value after a debounced transition.
    fn on_switch_change(&self, on: bool);
}

/// Electrical configuration of a switch input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SwitchConfig {
    /// Level that means "pressed".
    pub polarity: Polarity,
    /// Pull resistor the pin collaborator should enable.
    pub pull: Pull,
    /// Debounce tuning.
    pub debounce: DebounceConfig,
}

impl SwitchConfig {
    /// Active-low button with a pull-up, as wired on the module.
    pub const fn active_low() -> Self {
        Self {
            polarity: Polarity::OnLow,
            pull: Pull::Up,
            debounce: DebounceConfig {
                settling_us: pulsar_core::DEFAULT_SETTLING_US,
            },
        }
    }

    /// Sets the polarity.
    pub const fn with_polarity(mut self, polarity: Polarity) -> Self {
        self.polarity = polarity;
        self
    }

    /// Sets the debounce settling time.
    pub const fn with_settling_us(mut self, settling_us: u32) -> Self {
        self.debounce.settling_us = settling_us;
        self
    }
}

/// Debounced digital switch.
///
/// # Example
///
/// ```rust
/// use pulsar_core::ManualClock;
/// use pulsar_platform::{InterruptHandler, SimPin, Switch, SwitchConfig};
///
/// let clock = ManualClock::new(0);
/// let pin = SimPin::new(true); // released, pulled up
/// let button = Switch::new(&pin, &clock, SwitchConfig::active_low());
/// assert!(!button.is_on());
///
/// pin.set(false);
/// button.on_interrupt();
/// assert!(button.is_on());
/// assert!(button.turned_on());
/// assert!(!button.turned_on());
/// ```
pub struct Switch<'a> {
    pin: Option<&'a dyn DigitalInput>,
    clock: Option<SharedClock<'a>>,
    config: SwitchConfig,
    debouncer: Debouncer,
    latch: EdgeLatch,
    callback: Option<&'a dyn SwitchCallback>,
}

impl core::fmt::Debug for Switch<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Switch")
            .field("configured", &self.is_configured())
            .field("config", &self.config)
            .field("state", &self.debouncer.state())
            .field("latch", &self.latch.peek())
            .finish()
    }
}

impl Default for Switch<'_> {
    fn default() -> Self {
        Self::unconfigured()
    }
}

impl<'a> Switch<'a> {
    /// A switch with no pin. Permanently off, never reports an edge.
    pub const fn unconfigured() -> Self {
        Self {
            pin: None,
            clock: None,
            config: SwitchConfig {
                polarity: Polarity::OnHigh,
                pull: Pull::None,
                debounce: DebounceConfig {
                    settling_us: pulsar_core::DEFAULT_SETTLING_US,
                },
            },
            debouncer: Debouncer::new(),
            latch: EdgeLatch::new(),
            callback: None,
        }
    }

    /// Creates a switch on `pin` and primes it with the current level.
    ///
    /// Priming consumes the edge produced by a pin that is already "on" at
    /// startup, so the first [`turned_on`](Self::turned_on) reflects a real press.
    pub fn new(pin: &'a dyn DigitalInput, clock: SharedClock<'a>, config: SwitchConfig) -> Self {
        let switch = Self {
            pin: Some(pin),
            clock: Some(clock),
            config,
            debouncer: Debouncer::with_config(config.debounce),
            latch: EdgeLatch::new(),
            callback: None,
        };
        switch.prime();
        switch
    }

    /// Attaches a callback invoked from interrupt context on every change.
    ///
    /// Attached after priming, so the startup level never reaches it.
    pub fn with_callback(mut self, callback: &'a dyn SwitchCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Returns true if the switch has a pin.
    #[inline]
    pub fn is_configured(&self) -> bool {
        self.pin.is_some()
    }

    /// Returns the configuration.
    #[inline]
    pub fn config(&self) -> SwitchConfig {
        self.config
    }

    /// Current debounced logical value.
    #[inline]
    pub fn is_on(&self) -> bool {
        match self.clock {
            Some(clock) if self.pin.is_some() => self.debouncer.value(clock.now_us()),
            _ => false,
        }
    }

    /// Returns and clears the turned-on latch.
    #[inline]
    pub fn turned_on(&self) -> bool {
        self.latch.take_on()
    }

    /// Returns and clears the turned-off latch.
    #[inline]
    pub fn turned_off(&self) -> bool {
        self.latch.take_off()
    }

    /// Takes both latches at once.
    #[inline]
    pub fn take_edges(&self) -> EdgeSnapshot {
        self.latch.take()
    }

    /// Samples the pin and feeds the debouncer.
    ///
    /// Returns `Some(on)` if a transition was accepted.
    fn sample(&self) -> Option<bool> {
        let (Some(pin), Some(clock)) = (self.pin, self.clock) else {
            return None;
        };
        let on = self.config.polarity.apply(pin.read());
        let step = self
            .debouncer
            .process(Edge::from_level(on), clock.now_us());
        step.changed.then_some(step.high)
    }

    fn prime(&self) {
        self.sample();
        self.latch.clear();
    }
}

impl InterruptHandler for Switch<'_> {
    fn on_interrupt(&self) {
        if let Some(on) = self.sample() {
            self.latch.record(on);
            if let Some(callback) = self.callback {
                callback.on_switch_change(on);
            }
        }
    }
}
