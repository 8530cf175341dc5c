//! Engine configuration and its validation error.

use pulsar_core::DebounceConfig;
use pulsar_platform::{AccelConfig, GateConfig};
use thiserror::Error;

/// Errors reported by [`EngineConfig::validate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Sample rate is zero, negative or not finite.
    #[error("invalid sample rate: {0} Hz")]
    SampleRate(f32),

    /// Block size is zero or larger than the dispatcher supports.
    #[error("invalid block size: {size} frames (must be 1..={max})")]
    BlockSize {
        /// Requested block size.
        size: usize,
        /// Largest supported block size.
        max: usize,
    },

    /// Debounce settling time of zero.
    #[error("debounce settling time must be non-zero")]
    SettlingTime,

    /// Acceleration multiplier below one.
    #[error("encoder acceleration multiplier must be at least 1, got {0}")]
    AccelMultiplier(i32),

    /// Gate threshold of zero would hold every gate permanently high.
    #[error("gate threshold must be non-zero")]
    GateThreshold,

    /// A housekeeping task interval of zero.
    #[error("interval for '{task}' must be non-zero")]
    Interval {
        /// Task whose interval is invalid.
        task: &'static str,
    },
}

/// Largest block the audio dispatcher accepts, in frames.
pub const MAX_BLOCK_FRAMES: usize = 256;

/// Startup configuration of the device.
///
/// Defaults match the reference hardware: 48 kHz, 4-frame blocks.
///
/// # Example
///
/// ```rust
/// use pulsar_engine::EngineConfig;
///
/// let config = EngineConfig::default()
///     .with_sample_rate(96_000.0)
///     .with_block_size(16);
/// assert!(config.validate().is_ok());
/// assert!(EngineConfig::default().with_block_size(0).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Audio sample rate in Hz.
    pub sample_rate: f32,
    /// Frames per audio block.
    pub block_size: usize,
    /// Switch debounce tuning.
    pub debounce: DebounceConfig,
    /// Encoder acceleration tuning.
    pub accel: AccelConfig,
    /// CV gate detection.
    pub gate: GateConfig,
    /// Status LED blink half-period.
    pub blink_interval_us: u64,
    /// Button LED refresh period.
    pub button_led_interval_us: u64,
    /// Gate LED refresh period.
    pub gate_led_interval_us: u64,
    /// Period of the measured sample-rate report.
    pub sample_rate_report_us: u64,
    /// Encoder polling period of the program selector.
    pub encoder_poll_us: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            block_size: 4,
            debounce: DebounceConfig::default(),
            accel: AccelConfig::default(),
            gate: GateConfig::default(),
            blink_interval_us: 500_000,
            button_led_interval_us: 50_000,
            gate_led_interval_us: 2_000,
            sample_rate_report_us: 1_000_000,
            encoder_poll_us: 10_000,
        }
    }
}

impl EngineConfig {
    /// Sets the sample rate.
    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Sets the block size.
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Sets the debounce tuning for switches and gates.
    pub fn with_debounce(mut self, debounce: DebounceConfig) -> Self {
        self.debounce = debounce;
        self.gate.debounce = debounce;
        self
    }

    /// Sets the encoder acceleration.
    pub fn with_accel(mut self, accel: AccelConfig) -> Self {
        self.accel = accel;
        self
    }

    /// Sets the gate detection.
    pub fn with_gate(mut self, gate: GateConfig) -> Self {
        self.gate = gate;
        self
    }

    /// Sets the status LED blink half-period.
    pub fn with_blink_interval_us(mut self, interval_us: u64) -> Self {
        self.blink_interval_us = interval_us;
        self
    }

    /// Sets the sample-rate report period.
    pub fn with_sample_rate_report_us(mut self, interval_us: u64) -> Self {
        self.sample_rate_report_us = interval_us;
        self
    }

    /// Duration of one audio block in microseconds.
    pub fn block_period_us(&self) -> f64 {
        self.block_size as f64 * 1_000_000.0 / f64::from(self.sample_rate)
    }

    /// Checks every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(ConfigError::SampleRate(self.sample_rate));
        }
        if self.block_size == 0 || self.block_size > MAX_BLOCK_FRAMES {
            return Err(ConfigError::BlockSize {
                size: self.block_size,
                max: MAX_BLOCK_FRAMES,
            });
        }
        if self.debounce.settling_us == 0 || self.gate.debounce.settling_us == 0 {
            return Err(ConfigError::SettlingTime);
        }
        if self.accel.multiplier < 1 {
            return Err(ConfigError::AccelMultiplier(self.accel.multiplier));
        }
        if self.gate.threshold == 0 {
            return Err(ConfigError::GateThreshold);
        }
        let intervals = [
            ("blink", self.blink_interval_us),
            ("button-led", self.button_led_interval_us),
            ("gate-led", self.gate_led_interval_us),
            ("sample-rate", self.sample_rate_report_us),
            ("encoder", self.encoder_poll_us),
        ];
        if let Some(&(task, _)) = intervals.iter().find(|(_, interval)| *interval == 0) {
            return Err(ConfigError::Interval { task });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = EngineConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert!((config.block_period_us() - 83.333).abs() < 0.01);
    }

    #[test]
    fn test_rejects_bad_audio_settings() {
        assert_eq!(
            EngineConfig::default().with_sample_rate(0.0).validate(),
            Err(ConfigError::SampleRate(0.0))
        );
        assert!(matches!(
            EngineConfig::default().with_sample_rate(f32::NAN).validate(),
            Err(ConfigError::SampleRate(_))
        ));
        assert_eq!(
            EngineConfig::default().with_block_size(1024).validate(),
            Err(ConfigError::BlockSize {
                size: 1024,
                max: MAX_BLOCK_FRAMES
            })
        );
    }

    #[test]
    fn test_rejects_bad_control_settings() {
        let config = EngineConfig::default().with_debounce(DebounceConfig { settling_us: 0 });
        assert_eq!(config.validate(), Err(ConfigError::SettlingTime));

        let config = EngineConfig::default().with_accel(AccelConfig {
            threshold: 3,
            multiplier: 0,
        });
        assert_eq!(config.validate(), Err(ConfigError::AccelMultiplier(0)));

        let config = EngineConfig::default().with_gate(GateConfig {
            threshold: 0,
            ..GateConfig::default()
        });
        assert_eq!(config.validate(), Err(ConfigError::GateThreshold));

        let config = EngineConfig::default().with_blink_interval_us(0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::Interval { task: "blink" })
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ConfigError::BlockSize { size: 0, max: 256 }.to_string(),
            "invalid block size: 0 frames (must be 1..=256)"
        );
        assert_eq!(
            ConfigError::Interval { task: "gate-led" }.to_string(),
            "interval for 'gate-led' must be non-zero"
        );
    }
}
