//! Atomic stand-ins for the hardware collaborators.
//!
//! Every double is shareable by reference across threads, so a test or the
//! host simulator can flip a pin from one thread while an "interrupt" thread
//! samples it.

use core::sync::atomic::{AtomicBool, AtomicU16, AtomicU32, Ordering};

use pulsar_core::CV_INPUT_COUNT;

use crate::{AnalogInput, DigitalInput, DigitalOutput};

/// Simulated digital input pin.
#[derive(Debug, Default)]
pub struct SimPin {
    level: AtomicBool,
}

impl SimPin {
    /// Creates a pin at `level`.
    pub const fn new(level: bool) -> Self {
        Self {
            level: AtomicBool::new(level),
        }
    }

    /// Drives the pin.
    #[inline]
    pub fn set(&self, level: bool) {
        self.level.store(level, Ordering::Release);
    }

    /// Inverts the pin and returns the new level.
    #[inline]
    pub fn toggle(&self) -> bool {
        !self.level.fetch_xor(true, Ordering::AcqRel)
    }
}

impl DigitalInput for SimPin {
    #[inline]
    fn read(&self) -> bool {
        self.level.load(Ordering::Acquire)
    }
}

/// Simulated free-running ADC with one channel per CV input.
#[derive(Debug, Default)]
pub struct SimAdc {
    channels: [AtomicU16; CV_INPUT_COUNT],
}

impl SimAdc {
    /// Creates an ADC reading zero on every channel.
    pub const fn new() -> Self {
        Self {
            channels: [const { AtomicU16::new(0) }; CV_INPUT_COUNT],
        }
    }

    /// Sets the conversion result of `channel`. Out-of-range channels are ignored.
    #[inline]
    pub fn set(&self, channel: usize, value: u16) {
        if let Some(c) = self.channels.get(channel) {
            c.store(value, Ordering::Relaxed);
        }
    }
}

impl AnalogInput for SimAdc {
    #[inline]
    fn read(&self, channel: usize) -> Option<u16> {
        self.channels.get(channel).map(|c| c.load(Ordering::Relaxed))
    }
}

/// Simulated LED that counts how often it changed.
#[derive(Debug, Default)]
pub struct SimLed {
    on: AtomicBool,
    changes: AtomicU32,
}

impl SimLed {
    /// Creates a dark LED.
    pub const fn new() -> Self {
        Self {
            on: AtomicBool::new(false),
            changes: AtomicU32::new(0),
        }
    }

    /// Returns true if lit.
    #[inline]
    pub fn is_on(&self) -> bool {
        self.on.load(Ordering::Acquire)
    }

    /// Number of on/off changes so far.
    #[inline]
    pub fn changes(&self) -> u32 {
        self.changes.load(Ordering::Acquire)
    }
}

impl DigitalOutput for SimLed {
    fn write(&self, on: bool) {
        if self.on.swap(on, Ordering::AcqRel) != on {
            self.changes.fetch_add(1, Ordering::AcqRel);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_toggle() {
        let pin = SimPin::new(false);
        assert!(pin.toggle());
        assert!(pin.read());
        assert!(!pin.toggle());
    }

    #[test]
    fn test_adc_channels() {
        let adc = SimAdc::new();
        adc.set(1, 700);
        adc.set(5, 1);
        assert_eq!(adc.read(1), Some(700));
        assert_eq!(adc.read(0), Some(0));
        assert_eq!(adc.read(3), None);
    }

    #[test]
    fn test_led_counts_changes() {
        let led = SimLed::new();
        led.write(false);
        led.write(true);
        led.write(true);
        led.write(false);
        assert!(!led.is_on());
        assert_eq!(led.changes(), 2);
    }
}
