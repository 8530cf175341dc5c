//! The explicitly constructed top-level device context.
//!
//! [`Device`] owns every control and the program rack. It is built once at
//! startup from a validated [`EngineConfig`], then shared by reference:
//! the interrupt table borrows its controls, the audio context gets an
//! [`AudioDispatch`] view and the main loop gets a [`Scheduler`].

use pulsar_core::{CvInput, Program};
use pulsar_platform::{
    AnalogInput, CvBank, DigitalInput, DigitalOutput, Encoder, InputId, InterruptDispatch,
    Polarity, Registration, SharedClock, Switch, SwitchConfig,
};

use crate::config::{ConfigError, EngineConfig};
use crate::dispatch::AudioDispatch;
use crate::rack::ProgramRack;
use crate::scheduler::Scheduler;
use crate::tasks::{BlinkTask, ButtonLedTask, EncoderTask, GateLedTask, SampleRateTask};

/// Hardware collaborators the device reads.
#[derive(Clone, Copy)]
pub struct DevicePins<'a> {
    /// Encoder quadrature input A.
    pub encoder_a: &'a dyn DigitalInput,
    /// Encoder quadrature input B.
    pub encoder_b: &'a dyn DigitalInput,
    /// Encoder pushbutton.
    pub encoder_switch: &'a dyn DigitalInput,
    /// Panel pushbutton, the third gate source.
    pub button: &'a dyn DigitalInput,
    /// ADC carrying the CV jacks and the pot.
    pub adc: &'a dyn AnalogInput,
}

/// Interrupt identities of the device's digital inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputMap {
    /// Encoder quadrature input A.
    pub encoder_a: InputId,
    /// Encoder quadrature input B.
    pub encoder_b: InputId,
    /// Encoder pushbutton.
    pub encoder_switch: InputId,
    /// Panel pushbutton.
    pub button: InputId,
}

impl Default for InputMap {
    /// Panel wiring of the reference module.
    fn default() -> Self {
        Self {
            encoder_a: InputId::new(1, 9),
            encoder_b: InputId::new(1, 6),
            encoder_switch: InputId::new(1, 8),
            button: InputId::new(0, 7),
        }
    }
}

/// What the single status LED shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LedMode {
    /// Heartbeat blink.
    #[default]
    Blink,
    /// Panel button state.
    Button,
    /// CV1 gate state.
    Gate,
}

/// Outcome of [`Device::register`], one entry per input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registrations {
    /// Encoder input A.
    pub encoder_a: Registration,
    /// Encoder input B.
    pub encoder_b: Registration,
    /// Encoder pushbutton.
    pub encoder_switch: Registration,
    /// Panel pushbutton.
    pub button: Registration,
}

impl Registrations {
    /// Returns true if every handler was installed.
    pub fn all_installed(&self) -> bool {
        [self.encoder_a, self.encoder_b, self.encoder_switch, self.button]
            .iter()
            .all(|r| r.is_installed())
    }
}

/// Controls, CV inputs and programs of one module.
pub struct Device<'a> {
    config: EngineConfig,
    inputs: InputMap,
    clock: SharedClock<'a>,
    encoder: Encoder<'a>,
    button: Switch<'a>,
    cv: CvBank<'a>,
    rack: ProgramRack,
}

impl core::fmt::Debug for Device<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Device")
            .field("config", &self.config)
            .field("inputs", &self.inputs)
            .field("encoder", &self.encoder)
            .field("button", &self.button)
            .field("cv", &self.cv)
            .field("rack", &self.rack)
            .finish()
    }
}

impl<'a> Device<'a> {
    /// Validates `config` and builds the device. No program is current yet.
    pub fn new(
        config: EngineConfig,
        clock: SharedClock<'a>,
        pins: DevicePins<'a>,
        programs: Vec<Box<dyn Program>>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let switch_config =
            SwitchConfig::active_low().with_settling_us(config.debounce.settling_us);
        let encoder = Encoder::new(pins.encoder_a, pins.encoder_b, Polarity::OnLow)
            .with_button(pins.encoder_switch, clock, switch_config)
            .with_accel(config.accel);
        let button = Switch::new(pins.button, clock, switch_config);
        let cv = CvBank::new(pins.adc, clock, config.gate);
        let rack = ProgramRack::new(programs, config.sample_rate);

        tracing::info!(
            sample_rate = config.sample_rate,
            block_size = config.block_size,
            programs = rack.len(),
            "device created"
        );

        Ok(Self {
            config,
            inputs: InputMap::default(),
            clock,
            encoder,
            button,
            cv,
            rack,
        })
    }

    /// Replaces the interrupt identities used by [`register`](Self::register).
    pub fn with_inputs(mut self, inputs: InputMap) -> Self {
        self.inputs = inputs;
        self
    }

    /// Installs the device's handlers in `dispatch`.
    ///
    /// Both encoder inputs share the encoder as handler.
    pub fn register<const N: usize>(
        &'a self,
        dispatch: &mut InterruptDispatch<'a, N>,
    ) -> Registrations {
        let registrations = Registrations {
            encoder_a: dispatch.register(self.inputs.encoder_a, &self.encoder),
            encoder_b: dispatch.register(self.inputs.encoder_b, &self.encoder),
            encoder_switch: dispatch.register(self.inputs.encoder_switch, self.encoder.button()),
            button: dispatch.register(self.inputs.button, &self.button),
        };
        if registrations.all_installed() {
            tracing::debug!(?registrations, "interrupt handlers installed");
        } else {
            tracing::warn!(?registrations, "some interrupt handlers were not installed");
        }
        registrations
    }

    /// Starts the first program, if there is one.
    pub fn start(&self) -> bool {
        !self.rack.is_empty() && self.rack.run_program(Some(0))
    }

    /// Audio-context view.
    pub fn audio(&self) -> AudioDispatch<'_> {
        AudioDispatch::new(&self.rack, &self.cv, &self.button)
    }

    /// Builds the main-loop scheduler: the status LED task, the program
    /// selector and the sample-rate report, in that order.
    pub fn scheduler<L: DigitalOutput + 'a>(
        &'a self,
        led: L,
        mode: LedMode,
    ) -> Scheduler<'a, SharedClock<'a>> {
        let config = &self.config;
        let mut scheduler = Scheduler::new(self.clock);
        match mode {
            LedMode::Blink => scheduler.add(BlinkTask::new(led, config.blink_interval_us)),
            LedMode::Button => scheduler.add(ButtonLedTask::new(
                led,
                &self.button,
                config.button_led_interval_us,
            )),
            LedMode::Gate => scheduler.add(GateLedTask::new(
                led,
                &self.cv,
                CvInput::Cv1,
                config.gate_led_interval_us,
            )),
        };
        scheduler
            .add(EncoderTask::new(&self.encoder, &self.rack, config.encoder_poll_us))
            .add(SampleRateTask::new(
                &self.rack,
                self.clock,
                config.sample_rate_report_us,
            ));
        scheduler
    }

    /// Startup configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Interrupt identities.
    pub fn inputs(&self) -> InputMap {
        self.inputs
    }

    /// Time source shared by every control.
    pub fn clock(&self) -> SharedClock<'a> {
        self.clock
    }

    /// The rotary encoder.
    pub fn encoder(&self) -> &Encoder<'a> {
        &self.encoder
    }

    /// The panel pushbutton.
    pub fn button(&self) -> &Switch<'a> {
        &self.button
    }

    /// The CV inputs.
    pub fn cv(&self) -> &CvBank<'a> {
        &self.cv
    }

    /// The program rack.
    pub fn rack(&self) -> &ProgramRack {
        &self.rack
    }
}
