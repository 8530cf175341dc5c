//! Housekeeping tasks run by the [`Scheduler`](crate::Scheduler).
//!
//! All of these run in the cooperative context. They only read control
//! state through non-consuming accessors, except [`EncoderTask`], which is
//! the sole consumer of the encoder's detent count and button latch.

use pulsar_core::{Clock, CvInput};
use pulsar_platform::{CvBank, DigitalOutput, Encoder, Switch};

use crate::rack::ProgramRack;
use crate::scheduler::Task;

/// Toggles a status LED, showing the main loop is alive.
#[derive(Debug)]
pub struct BlinkTask<L> {
    led: L,
    interval_us: u64,
    on: bool,
}

impl<L: DigitalOutput> BlinkTask<L> {
    /// Creates a blinker with half-period `interval_us`.
    pub fn new(led: L, interval_us: u64) -> Self {
        Self {
            led,
            interval_us,
            on: false,
        }
    }
}

impl<L: DigitalOutput> Task for BlinkTask<L> {
    fn name(&self) -> &'static str {
        "blink"
    }

    fn interval_us(&self) -> u64 {
        self.interval_us
    }

    fn init(&mut self) {
        self.on = false;
        self.led.write(false);
    }

    fn execute(&mut self) {
        self.on = !self.on;
        self.led.write(self.on);
    }
}

/// Mirrors the panel pushbutton onto an LED.
#[derive(Debug)]
pub struct ButtonLedTask<'a, L> {
    led: L,
    button: &'a Switch<'a>,
    interval_us: u64,
}

impl<'a, L: DigitalOutput> ButtonLedTask<'a, L> {
    /// Creates the task.
    pub fn new(led: L, button: &'a Switch<'a>, interval_us: u64) -> Self {
        Self {
            led,
            button,
            interval_us,
        }
    }
}

impl<L: DigitalOutput> Task for ButtonLedTask<'_, L> {
    fn name(&self) -> &'static str {
        "button-led"
    }

    fn interval_us(&self) -> u64 {
        self.interval_us
    }

    fn execute(&mut self) {
        self.led.write(self.button.is_on());
    }
}

/// Mirrors one CV gate onto an LED and logs its level changes.
///
/// Watches the debounced level rather than the edge latches, which belong
/// to the audio dispatcher.
#[derive(Debug)]
pub struct GateLedTask<'a, L> {
    led: L,
    cv: &'a CvBank<'a>,
    input: CvInput,
    interval_us: u64,
    last: bool,
}

impl<'a, L: DigitalOutput> GateLedTask<'a, L> {
    /// Creates the task for the gate of `input`.
    pub fn new(led: L, cv: &'a CvBank<'a>, input: CvInput, interval_us: u64) -> Self {
        Self {
            led,
            cv,
            input,
            interval_us,
            last: false,
        }
    }
}

impl<L: DigitalOutput> Task for GateLedTask<'_, L> {
    fn name(&self) -> &'static str {
        "gate-led"
    }

    fn interval_us(&self) -> u64 {
        self.interval_us
    }

    fn init(&mut self) {
        self.last = self.cv.is_gate_on(self.input.index());
    }

    fn execute(&mut self) {
        let on = self.cv.is_gate_on(self.input.index());
        self.led.write(on);
        if on != self.last {
            self.last = on;
            tracing::debug!(input = ?self.input, on, "gate changed");
        }
    }
}

/// Reports the measured audio frame rate.
///
/// Reads and resets the rack's frame counter, so it must be the only
/// consumer of [`ProgramRack::take_frame_count`].
#[derive(Debug)]
pub struct SampleRateTask<'a, C> {
    rack: &'a ProgramRack,
    clock: C,
    interval_us: u64,
    last_us: u64,
    measured_hz: Option<f64>,
}

impl<'a, C: Clock> SampleRateTask<'a, C> {
    /// Creates the task.
    pub fn new(rack: &'a ProgramRack, clock: C, interval_us: u64) -> Self {
        Self {
            rack,
            clock,
            interval_us,
            last_us: 0,
            measured_hz: None,
        }
    }

    /// Rate computed by the most recent execution.
    pub fn measured_hz(&self) -> Option<f64> {
        self.measured_hz
    }
}

impl<C: Clock> Task for SampleRateTask<'_, C> {
    fn name(&self) -> &'static str {
        "sample-rate"
    }

    fn interval_us(&self) -> u64 {
        self.interval_us
    }

    fn init(&mut self) {
        self.rack.take_frame_count();
        self.last_us = self.clock.now_us();
        self.measured_hz = None;
    }

    fn execute(&mut self) {
        let now = self.clock.now_us();
        let elapsed = now.saturating_sub(self.last_us);
        if elapsed == 0 {
            return;
        }
        self.last_us = now;

        let frames = self.rack.take_frame_count();
        let hz = frames as f64 * 1_000_000.0 / elapsed as f64;
        self.measured_hz = Some(hz);

        let nominal = f64::from(self.rack.sample_rate());
        if (hz - nominal).abs() > nominal * 0.01 {
            tracing::warn!(measured_hz = hz, nominal_hz = nominal, "sample rate off nominal");
        } else {
            tracing::info!(measured_hz = hz, "sample rate");
        }
    }
}

/// Minimal program selector driven by the encoder.
///
/// Detents step through the program list, wrapping at both ends. A press
/// restarts the current program, or starts the first one if none is running.
#[derive(Debug)]
pub struct EncoderTask<'a> {
    encoder: &'a Encoder<'a>,
    rack: &'a ProgramRack,
    interval_us: u64,
}

impl<'a> EncoderTask<'a> {
    /// Creates the selector.
    pub fn new(encoder: &'a Encoder<'a>, rack: &'a ProgramRack, interval_us: u64) -> Self {
        Self {
            encoder,
            rack,
            interval_us,
        }
    }

    fn target(&self, delta: i32) -> Option<usize> {
        let len = i64::try_from(self.rack.len()).ok().filter(|&len| len > 0)?;
        let from = self.rack.current().and_then(|i| i64::try_from(i).ok());
        let next = match from {
            Some(from) => (from + i64::from(delta)).rem_euclid(len),
            // Nothing running: the first step lands on either end of the list.
            None if delta > 0 => 0,
            None => len - 1,
        };
        usize::try_from(next).ok()
    }
}

impl Task for EncoderTask<'_> {
    fn name(&self) -> &'static str {
        "encoder"
    }

    fn interval_us(&self) -> u64 {
        self.interval_us
    }

    fn init(&mut self) {
        self.encoder.change();
        self.encoder.was_pressed();
    }

    fn execute(&mut self) {
        let delta = self.encoder.change_accel();
        if delta != 0 {
            if let Some(next) = self.target(delta) {
                if Some(next) != self.rack.current() {
                    self.rack.run_program(Some(next));
                }
            }
        }

        if self.encoder.was_pressed() && !self.rack.is_empty() {
            self.rack.run_program(Some(self.rack.current().unwrap_or(0)));
        }
    }
}
