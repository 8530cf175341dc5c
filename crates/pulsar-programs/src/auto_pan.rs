//! Auto-pan: an LFO sweeps the (mono) input between the two outputs.
//!
//! ```text
//! rate = 0.025 Hz + 4 Hz · pot
//! pan  = sin(2π · phase) / 2          in [-0.5, 0.5]
//! L    = in · (0.5 + pan)
//! R    = in · (0.5 - pan)
//! ```
//!
//! The module has a single audio input, so only the left input channel is
//! used. The pan position of the last frame is published to the display
//! animation.

use core::f32::consts::TAU;
use core::sync::atomic::{AtomicU32, Ordering};

use libm::sinf;
use pulsar_core::{Animation, Frame, ProcessArgs, Program};

use crate::pot;

/// Slowest sweep, with the pot fully down.
pub const MIN_RATE_HZ: f32 = 0.025;
/// Rate added with the pot fully up.
pub const RATE_SPAN_HZ: f32 = 4.0;

/// Pan position shared with the display.
///
/// Written by the audio context, read by the display task.
#[derive(Debug, Default)]
pub struct PanAnimation {
    position: AtomicU32,
}

impl PanAnimation {
    /// Last pan position, in `[-0.5, 0.5]`; positive leans left.
    pub fn position(&self) -> f32 {
        f32::from_bits(self.position.load(Ordering::Relaxed))
    }

    fn set(&self, position: f32) {
        self.position.store(position.to_bits(), Ordering::Relaxed);
    }
}

impl Animation for PanAnimation {
    fn init(&self) {
        self.set(0.0);
    }

    fn step(&self, _step: u32) -> bool {
        true
    }
}

/// LFO-driven stereo panner.
///
/// # Example
///
/// ```rust
/// use pulsar_core::{Frame, ProcessArgs, Program};
/// use pulsar_programs::AutoPan;
///
/// let mut pan = AutoPan::new(48_000.0);
/// pan.init(48_000.0);
///
/// let input = [Frame::new(1.0, 0.0); 4];
/// let mut output = [Frame::SILENCE; 4];
/// pan.process(&mut ProcessArgs::new(&input, &mut output));
///
/// // Equal-sum panning: the two sides always add up to the input
/// for frame in output {
///     assert!((frame.left + frame.right - 1.0).abs() < 1e-6);
/// }
/// ```
#[derive(Debug)]
pub struct AutoPan {
    sample_rate: f32,
    phase: f32,
    animation: PanAnimation,
}

impl AutoPan {
    /// Creates the panner.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            phase: 0.0,
            animation: PanAnimation::default(),
        }
    }

    /// LFO rate for a pot position in `[0, 1]`.
    #[must_use]
    pub fn rate_hz(pot: f32) -> f32 {
        MIN_RATE_HZ + RATE_SPAN_HZ * pot
    }
}

impl Program for AutoPan {
    fn name(&self) -> &'static str {
        "Auto Pan"
    }

    fn init(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.phase = 0.0;
        self.animation.init();
    }

    fn process(&mut self, args: &mut ProcessArgs<'_>) {
        let increment = Self::rate_hz(pot(args)) / self.sample_rate;
        let mut pan = 0.0;
        for (out, inp) in args.output.iter_mut().zip(args.input) {
            pan = sinf(TAU * self.phase) * 0.5;
            self.phase += increment;
            if self.phase >= 1.0 {
                self.phase -= 1.0;
            }
            *out = Frame::new(inp.left * (0.5 + pan), inp.left * (0.5 - pan));
        }
        self.animation.set(pan);
    }

    fn animation(&self) -> Option<&dyn Animation> {
        Some(&self.animation)
    }
}
