//! Runtime of the pulsar effects module.
//!
//! This crate ties the input conditioning of `pulsar-platform` to the
//! programs that process audio. It has two entry points, one per execution
//! context:
//!
//! - **Audio context**: [`AudioDispatch::process`], called once per block.
//!   Refreshes the CV gates, snapshots gate edges and runs the current program.
//! - **Cooperative context**: [`Scheduler::run_all`], called back to back by
//!   the main loop. Runs the housekeeping [`tasks`] and switches programs
//!   through [`ProgramRack::run_program`].
//!
//! Interrupt handlers live in `pulsar-platform`; [`Device::register`]
//! installs them.
//!
//! ## Quick Start
//!
//! ```rust
//! use pulsar_core::{Frame, ManualClock, ProcessArgs, Program};
//! use pulsar_engine::{Device, DevicePins, EngineConfig, LedMode};
//! use pulsar_platform::{InterruptDispatch, SimAdc, SimLed, SimPin};
//!
//! struct Mute;
//!
//! impl Program for Mute {
//!     fn name(&self) -> &'static str { "Mute" }
//!     fn init(&mut self, _sample_rate: f32) {}
//!     fn process(&mut self, args: &mut ProcessArgs<'_>) {
//!         args.output.fill(Frame::SILENCE);
//!     }
//! }
//!
//! let clock = ManualClock::new(0);
//! let (a, b, sw, button) = (SimPin::new(true), SimPin::new(true), SimPin::new(true), SimPin::new(true));
//! let adc = SimAdc::new();
//! let pins = DevicePins { encoder_a: &a, encoder_b: &b, encoder_switch: &sw, button: &button, adc: &adc };
//!
//! let device = Device::new(EngineConfig::default(), &clock, pins, vec![Box::new(Mute)])?;
//! let mut irq: InterruptDispatch<'_> = InterruptDispatch::new();
//! device.register(&mut irq);
//! device.start();
//!
//! let led = SimLed::new();
//! let mut scheduler = device.scheduler(&led, LedMode::Blink);
//! scheduler.init_all();
//!
//! let audio = device.audio();
//! let mut output = [Frame::mono(1.0); 4];
//! audio.process(&[Frame::SILENCE; 4], &mut output);
//! scheduler.run_all();
//! assert_eq!(output, [Frame::SILENCE; 4]);
//! # Ok::<(), pulsar_engine::ConfigError>(())
//! ```

pub mod config;
pub mod device;
pub mod dispatch;
pub mod rack;
pub mod scheduler;
pub mod tasks;

pub use config::{ConfigError, EngineConfig, MAX_BLOCK_FRAMES};
pub use device::{Device, DevicePins, InputMap, LedMode, Registrations};
pub use dispatch::AudioDispatch;
pub use rack::ProgramRack;
pub use scheduler::{Scheduler, Task};
pub use tasks::{BlinkTask, ButtonLedTask, EncoderTask, GateLedTask, SampleRateTask};
