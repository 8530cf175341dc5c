//! Polled CV gates and the CV input bank.
//!
//! A [`Gate`] is the sampled counterpart of a [`Switch`](crate::Switch):
//! the same debouncer and edge latch, driven by a thresholded ADC reading
//! instead of a pin interrupt. The audio dispatcher refreshes every gate
//! once per block through [`CvBank::update_gates`], which is fast enough to
//! catch gate pulses of a millisecond or two.
//!
//! The level is fed on every refresh, not only when it flips. A bounce that
//! lands inside the settling window is corrected on the first refresh after
//! the window closes.

use core::sync::atomic::{AtomicU16, Ordering};

use pulsar_core::{
    CV_INPUT_COUNT, CvInput, DebounceConfig, Debouncer, Edge, EdgeLatch, EdgeSnapshot,
};

use crate::{AnalogInput, SharedClock};

/// Raw ADC value at or above which a CV input counts as a high gate.
///
/// Close to 5 V on the module's ±12 V input range.
pub const DEFAULT_GATE_THRESHOLD: u16 = 45000;

/// Gate detection tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateConfig {
    /// Raw reading at or above which the gate is high.
    pub threshold: u16,
    /// Debounce tuning.
    pub debounce: DebounceConfig,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_GATE_THRESHOLD,
            debounce: DebounceConfig::default(),
        }
    }
}

/// One debounced, polled gate.
///
/// # Example
///
/// ```rust
/// use pulsar_platform::Gate;
///
/// let gate = Gate::new();
/// gate.update(true, 0);
/// assert!(gate.turned_on());
/// assert!(gate.is_on(500));
/// ```
#[derive(Debug, Default)]
pub struct Gate {
    debouncer: Debouncer,
    latch: EdgeLatch,
}

impl Gate {
    /// Creates a low gate with the reference settling time.
    pub const fn new() -> Self {
        Self {
            debouncer: Debouncer::new(),
            latch: EdgeLatch::new(),
        }
    }

    /// Creates a low gate with custom debounce tuning.
    pub const fn with_config(config: DebounceConfig) -> Self {
        Self {
            debouncer: Debouncer::with_config(config),
            latch: EdgeLatch::new(),
        }
    }

    /// Feeds the current level. Returns true if a transition was accepted.
    #[inline]
    pub fn update(&self, high: bool, now_us: u64) -> bool {
        let step = self.debouncer.process(Edge::from_level(high), now_us);
        if step.changed {
            self.latch.record(step.high);
        }
        step.changed
    }

    /// Thresholds `raw` and feeds the result.
    #[inline]
    pub fn process(&self, raw: u16, threshold: u16, now_us: u64) -> bool {
        self.update(raw >= threshold, now_us)
    }

    /// Feeds the startup level and discards the edge it produces.
    pub fn prime(&self, high: bool, now_us: u64) {
        self.update(high, now_us);
        self.latch.clear();
    }

    /// Current debounced level.
    #[inline]
    pub fn is_on(&self, now_us: u64) -> bool {
        self.debouncer.value(now_us)
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
}

/// The module's analog inputs, each with its own gate.
///
/// Index-based accessors take `usize` because the index usually comes from
/// a program parameter; anything past the last input (for instance the
/// "Fixed" CV source) yields `None` or `false`.
pub struct CvBank<'a> {
    adc: Option<&'a dyn AnalogInput>,
    clock: Option<SharedClock<'a>>,
    threshold: u16,
    raw: [AtomicU16; CV_INPUT_COUNT],
    gates: [Gate; CV_INPUT_COUNT],
}

impl core::fmt::Debug for CvBank<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CvBank")
            .field("configured", &self.adc.is_some())
            .field("threshold", &self.threshold)
            .field("raw", &self.snapshot())
            .finish()
    }
}

impl Default for CvBank<'_> {
    fn default() -> Self {
        Self::unconfigured()
    }
}

impl<'a> CvBank<'a> {
    /// A bank with no ADC. Reads zero, gates stay low.
    pub const fn unconfigured() -> Self {
        Self {
            adc: None,
            clock: None,
            threshold: DEFAULT_GATE_THRESHOLD,
            raw: [AtomicU16::new(0), AtomicU16::new(0), AtomicU16::new(0)],
            gates: [Gate::new(), Gate::new(), Gate::new()],
        }
    }

    /// Creates a bank reading `adc` and primes every gate.
    pub fn new(adc: &'a dyn AnalogInput, clock: SharedClock<'a>, config: GateConfig) -> Self {
        let bank = Self {
            adc: Some(adc),
            clock: Some(clock),
            threshold: config.threshold,
            raw: [AtomicU16::new(0), AtomicU16::new(0), AtomicU16::new(0)],
            gates: core::array::from_fn(|_| Gate::with_config(config.debounce)),
        };
        let now = clock.now_us();
        for input in CvInput::ALL {
            let raw = bank.sample(input);
            bank.gates[input.index()].prime(raw >= bank.threshold, now);
        }
        bank
    }

    /// Gate threshold in raw ADC units.
    #[inline]
    pub fn threshold(&self) -> u16 {
        self.threshold
    }

    /// Reads every channel once and refreshes every gate.
    ///
    /// Called once per audio block.
    pub fn update_gates(&self) {
        let Some(clock) = self.clock else {
            return;
        };
        let now = clock.now_us();
        for input in CvInput::ALL {
            let raw = self.sample(input);
            self.gates[input.index()].process(raw, self.threshold, now);
        }
    }

    /// Last raw reading of input `index`.
    #[inline]
    pub fn raw(&self, index: usize) -> Option<u16> {
        self.raw.get(index).map(|r| r.load(Ordering::Relaxed))
    }

    /// Last raw reading of `input`.
    #[inline]
    pub fn raw_input(&self, input: CvInput) -> u16 {
        self.raw[input.index()].load(Ordering::Relaxed)
    }

    /// Last raw readings of every input, in channel order.
    pub fn snapshot(&self) -> [u16; CV_INPUT_COUNT] {
        core::array::from_fn(|i| self.raw[i].load(Ordering::Relaxed))
    }

    /// The gate of `input`.
    #[inline]
    pub fn gate(&self, input: CvInput) -> &Gate {
        &self.gates[input.index()]
    }

    /// Debounced level of gate `index`.
    pub fn is_gate_on(&self, index: usize) -> bool {
        match (self.gates.get(index), self.clock) {
            (Some(gate), Some(clock)) => gate.is_on(clock.now_us()),
            _ => false,
        }
    }

    /// Returns and clears the turned-on latch of gate `index`.
    pub fn gate_turned_on(&self, index: usize) -> bool {
        self.gates.get(index).is_some_and(Gate::turned_on)
    }

    /// Returns and clears the turned-off latch of gate `index`.
    pub fn gate_turned_off(&self, index: usize) -> bool {
        self.gates.get(index).is_some_and(Gate::turned_off)
    }

    fn sample(&self, input: CvInput) -> u16 {
        let raw = self
            .adc
            .and_then(|adc| adc.read(input.index()))
            .unwrap_or(0);
        self.raw[input.index()].store(raw, Ordering::Relaxed);
        raw
    }
}

// Linear calibration points of the module's CV jacks and pot.
const CV_ZERO: f32 = 31620.0;
const CV_BIPOLAR_HIGH: f32 = 44890.0;
const CV_UNIPOLAR_HIGH: f32 = 52850.0;
const POT_LOW: f32 = 10.0;
const POT_HIGH: f32 = 63475.0;

#[inline]
fn map(raw: u16, in_lo: f32, in_hi: f32, out_lo: f32, out_hi: f32) -> f32 {
    out_lo + (out_hi - out_lo) * (f32::from(raw) - in_lo) / (in_hi - in_lo)
}

/// Scales a raw reading to `[0, 1]`.
///
/// CV jacks map 0 V..8 V, the pot its full travel.
pub fn unipolar(input: CvInput, raw: u16) -> f32 {
    let value = match input {
        CvInput::Pot => map(raw, POT_LOW, POT_HIGH, 0.0, 1.0),
        CvInput::Cv1 | CvInput::Cv2 => map(raw, CV_ZERO, CV_UNIPOLAR_HIGH, 0.0, 1.0),
    };
    value.clamp(0.0, 1.0)
}

/// Scales a raw reading to `[-1, 1]`.
///
/// CV jacks map -5 V..5 V, the pot its full travel.
pub fn bipolar(input: CvInput, raw: u16) -> f32 {
    let value = match input {
        CvInput::Pot => map(raw, POT_LOW, POT_HIGH, -1.0, 1.0),
        CvInput::Cv1 | CvInput::Cv2 => map(raw, CV_ZERO, CV_BIPOLAR_HIGH, 0.0, 1.0),
    };
    value.clamp(-1.0, 1.0)
}
