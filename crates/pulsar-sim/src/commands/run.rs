//! Runs the device in real time against a simulated panel.
//!
//! The audio context is a thread that processes blocks as fast as the wall
//! clock says the converter would have asked for them. The main thread
//! plays the cooperative context: it drives the simulated panel, raises
//! interrupts through the dispatch table and runs the scheduler.

use std::f32::consts::TAU;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use clap::{Args, ValueEnum};
use pulsar_core::{Clock, CvInput, Frame, SystemClock};
use pulsar_engine::{AudioDispatch, Device, DevicePins, EngineConfig, InputMap, LedMode};
use pulsar_platform::{DigitalInput, InterruptDispatch, SimAdc, SimLed, SimPin};
use pulsar_programs::ProgramList;
use tracing::{debug, info};

/// ADC reading of a high CV gate, well above the default threshold.
const GATE_HIGH: u16 = 60_000;

/// Frequency of the test tone fed to the audio input.
const TONE_HZ: f32 = 220.0;

/// Main loop idle time between scheduler passes.
const MAIN_LOOP_SLEEP: Duration = Duration::from_micros(250);

/// Logical `(a, b)` levels of one clockwise detent.
const CW: [(bool, bool); 4] = [(true, false), (true, true), (false, true), (false, false)];
/// Logical `(a, b)` levels of one counter-clockwise detent.
const CCW: [(bool, bool); 4] = [(false, true), (true, true), (true, false), (false, false)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LedArg {
    /// Heartbeat blink
    Blink,
    /// Follow the panel button
    Button,
    /// Follow the CV1 gate
    Gate,
}

impl From<LedArg> for LedMode {
    fn from(arg: LedArg) -> Self {
        match arg {
            LedArg::Blink => LedMode::Blink,
            LedArg::Button => LedMode::Button,
            LedArg::Gate => LedMode::Gate,
        }
    }
}

#[derive(Args)]
pub struct RunArgs {
    /// Wall-clock run time in seconds
    #[arg(short, long, default_value = "2.0")]
    seconds: f64,

    /// Program to start with (see `pulsar-sim programs`)
    #[arg(short, long)]
    program: Option<String>,

    /// Period of the square wave on CV1 in milliseconds, 0 for none
    #[arg(long, default_value = "250")]
    gate_period_ms: u64,

    /// Period of simulated panel button presses in milliseconds, 0 for none
    #[arg(long, default_value = "0")]
    button_period_ms: u64,

    /// Pot position, 0.0 to 1.0
    #[arg(long, default_value = "0.5")]
    pot: f32,

    /// Encoder detents turned halfway through the run, negative for counter-clockwise
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    turn: i32,

    /// What the status LED shows
    #[arg(long, value_enum, default_value = "blink")]
    led: LedArg,

    /// Sample rate
    #[arg(long, default_value = "48000")]
    sample_rate: u32,

    /// Frames per audio block
    #[arg(long, default_value = "4")]
    block_size: usize,
}

/// Simulated front panel: encoder, panel button and ADC.
///
/// Every switch is wired to ground with a pull-up, so a released contact
/// reads high.
struct Panel {
    encoder_a: SimPin,
    encoder_b: SimPin,
    encoder_switch: SimPin,
    button: SimPin,
    adc: SimAdc,
}

impl Panel {
    fn new() -> Self {
        Self {
            encoder_a: SimPin::new(true),
            encoder_b: SimPin::new(true),
            encoder_switch: SimPin::new(true),
            button: SimPin::new(true),
            adc: SimAdc::new(),
        }
    }

    fn pins(&self) -> DevicePins<'_> {
        DevicePins {
            encoder_a: &self.encoder_a,
            encoder_b: &self.encoder_b,
            encoder_switch: &self.encoder_switch,
            button: &self.button,
            adc: &self.adc,
        }
    }

    fn set_pot(&self, position: f32) {
        let raw = (position.clamp(0.0, 1.0) * f32::from(u16::MAX)).round() as u16;
        self.adc.set(CvInput::Pot.index(), raw);
    }

    fn set_gate(&self, high: bool) {
        self.adc
            .set(CvInput::Cv1.index(), if high { GATE_HIGH } else { 0 });
    }

    /// Drives the panel button and raises its interrupt if the level changed.
    fn press_button(&self, irq: &InterruptDispatch<'_>, inputs: InputMap, pressed: bool) {
        if self.button.read() == pressed {
            self.button.set(!pressed);
            irq.dispatch(inputs.button);
        }
    }

    /// Turns the encoder by `clicks` detents, raising one interrupt per pin change.
    fn turn(&self, irq: &InterruptDispatch<'_>, inputs: InputMap, clicks: i32) {
        let sequence = if clicks >= 0 { &CW } else { &CCW };
        for _ in 0..clicks.unsigned_abs() {
            for &(a, b) in sequence {
                if self.encoder_a.read() == a {
                    self.encoder_a.set(!a);
                    irq.dispatch(inputs.encoder_a);
                }
                if self.encoder_b.read() == b {
                    self.encoder_b.set(!b);
                    irq.dispatch(inputs.encoder_b);
                }
            }
        }
    }
}

/// What the audio thread saw.
#[derive(Debug, Default, Clone, Copy)]
struct AudioReport {
    blocks: u64,
    frames: u64,
    peak_left: f32,
    peak_right: f32,
}

impl AudioReport {
    fn record(&mut self, output: &[Frame]) {
        self.blocks += 1;
        self.frames += output.len() as u64;
        for frame in output {
            self.peak_left = self.peak_left.max(frame.left.abs());
            self.peak_right = self.peak_right.max(frame.right.abs());
        }
    }
}

/// Square wave level at `now_us`, high for the first half of each period.
fn square(now_us: u64, period_us: u64) -> bool {
    period_us == 0 || now_us % period_us < period_us / 2
}

fn audio_loop(
    audio: AudioDispatch<'_>,
    clock: &SystemClock,
    config: &EngineConfig,
    done: &AtomicBool,
) -> AudioReport {
    let sample_rate = f64::from(config.sample_rate);
    let increment = TONE_HZ / config.sample_rate;
    let mut phase = 0.0_f32;
    let mut input = vec![Frame::SILENCE; config.block_size];
    let mut output = vec![Frame::SILENCE; config.block_size];
    let mut report = AudioReport::default();

    while !done.load(Ordering::Acquire) {
        let due = clock.now_us() as f64 * sample_rate / 1e6;
        while (report.frames as f64) < due {
            for frame in &mut input {
                *frame = Frame::mono((TAU * phase).sin() * 0.5);
                phase = (phase + increment).fract();
            }
            audio.process(&input, &mut output);
            report.record(&output);
        }
        thread::sleep(Duration::from_millis(1));
    }
    report
}

pub fn run(args: RunArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        args.seconds.is_finite() && args.seconds > 0.0,
        "Run time must be positive, got {}",
        args.seconds
    );

    let config = EngineConfig::default()
        .with_sample_rate(args.sample_rate as f32)
        .with_block_size(args.block_size);
    let start = match &args.program {
        Some(name) => ProgramList::index_of(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown program: {}", name))?,
        None => 0,
    };

    let clock = SystemClock::new();
    let panel = Panel::new();
    panel.set_pot(args.pot);

    let device = Device::new(
        config,
        &clock,
        panel.pins(),
        ProgramList::standard(config.sample_rate),
    )?;
    let inputs = device.inputs();
    let mut irq: InterruptDispatch<'_> = InterruptDispatch::new();
    let registrations = device.register(&mut irq);
    anyhow::ensure!(
        registrations.all_installed(),
        "Interrupt table rejected a handler: {:?}",
        registrations
    );

    device.rack().run_program(Some(start));
    info!(
        program = ProgramList::NAMES[start],
        sample_rate = config.sample_rate,
        block_size = config.block_size,
        "simulation started"
    );

    let led = SimLed::new();
    let done = AtomicBool::new(false);
    let audio = device.audio();
    let duration_us = (args.seconds * 1e6) as u64;
    let gate_period_us = args.gate_period_ms * 1_000;
    let button_period_us = args.button_period_ms * 1_000;

    let report = thread::scope(|s| -> anyhow::Result<AudioReport> {
        let audio_thread = s.spawn(|| audio_loop(audio, &clock, &config, &done));

        let mut scheduler = device.scheduler(&led, args.led.into());
        scheduler.init_all();
        let mut turned = args.turn == 0;

        loop {
            let now = clock.now_us();
            if now >= duration_us {
                break;
            }
            if gate_period_us > 0 {
                panel.set_gate(square(now, gate_period_us));
            }
            if button_period_us > 0 {
                panel.press_button(&irq, inputs, square(now, button_period_us));
            }
            if !turned && now >= duration_us / 2 {
                debug!(clicks = args.turn, "turning encoder");
                panel.turn(&irq, inputs, args.turn);
                turned = true;
            }
            scheduler.run_all();
            thread::sleep(MAIN_LOOP_SLEEP);
        }

        done.store(true, Ordering::Release);
        audio_thread
            .join()
            .map_err(|_| anyhow::anyhow!("Audio thread panicked"))
    })?;

    let elapsed_s = clock.now_us() as f64 / 1e6;
    let program = device
        .rack()
        .current()
        .and_then(|i| device.rack().names().get(i).copied())
        .unwrap_or("none");

    println!("Program:      {}", program);
    println!("Blocks:       {}", report.blocks);
    println!(
        "Frames:       {} ({:.0} Hz)",
        report.frames,
        report.frames as f64 / elapsed_s
    );
    println!(
        "Peak output:  L {:.3}  R {:.3}",
        report.peak_left, report.peak_right
    );
    println!("LED changes:  {}", led.changes());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulsar_core::ManualClock;
    use pulsar_platform::AnalogInput;

    #[test]
    fn test_square() {
        assert!(square(0, 1_000));
        assert!(square(499, 1_000));
        assert!(!square(500, 1_000));
        assert!(square(1_000, 1_000));
        assert!(square(123, 0));
    }

    #[test]
    fn test_panel_turn_reaches_encoder() {
        let clock = ManualClock::new(0);
        let panel = Panel::new();
        let device = Device::new(EngineConfig::default(), &clock, panel.pins(), Vec::new())
            .expect("default config is valid");
        let mut irq: InterruptDispatch<'_> = InterruptDispatch::new();
        assert!(device.register(&mut irq).all_installed());

        panel.turn(&irq, device.inputs(), 3);
        assert_eq!(device.encoder().change(), 3);
        panel.turn(&irq, device.inputs(), -2);
        assert_eq!(device.encoder().change(), -2);
        assert!(panel.encoder_a.read() && panel.encoder_b.read());
    }

    #[test]
    fn test_panel_button_debounces() {
        let clock = ManualClock::new(0);
        let panel = Panel::new();
        let device = Device::new(EngineConfig::default(), &clock, panel.pins(), Vec::new())
            .expect("default config is valid");
        let mut irq: InterruptDispatch<'_> = InterruptDispatch::new();
        device.register(&mut irq);

        panel.press_button(&irq, device.inputs(), true);
        assert!(device.button().is_on());
        // Repeated level is not a new interrupt
        panel.press_button(&irq, device.inputs(), true);
        clock.advance(10_000);
        panel.press_button(&irq, device.inputs(), false);
        assert!(!device.button().is_on());
        let edges = device.button().take_edges();
        assert!(edges.turned_on && edges.turned_off);
    }

    #[test]
    fn test_pot_scaling() {
        let panel = Panel::new();
        panel.set_pot(1.5);
        assert_eq!(panel.adc.read(CvInput::Pot.index()), Some(u16::MAX));
        panel.set_pot(0.0);
        assert_eq!(panel.adc.read(CvInput::Pot.index()), Some(0));
    }
}
