//! Bitcrusher: bit-depth reduction plus sample-and-hold rate reduction.
//!
//! # Theory
//!
//! Two mechanisms degrade the signal:
//!
//! - **Bit depth**: the magnitude is converted to a 16-bit integer and the
//!   low `16 - bits` bits are masked off, then the sign is restored. Fewer
//!   bits means coarser amplitude steps and louder quantization noise.
//! - **Crush rate**: a free-running clock at the crush rate decides when a
//!   new input sample is taken; between ticks the last crushed value is
//!   held (zero-order hold). Rates well below the audio rate fold high
//!   frequencies back down as aliasing.
//!
//! The pot drives one of the two, selected by the `Knob control` parameter:
//!
//! ```text
//! BitDepth:   bits = clamp(round(pot · 17), 1, 16)
//! SampleRate: rate = clamp(pot · sample_rate, 40 Hz, sample_rate)
//! ```
//!
//! The other one keeps its last value. The input is mono (left channel) and
//! the crushed sample goes to both outputs.

use libm::{copysignf, fabsf, roundf};
use pulsar_core::{
    Frame, ParamDescriptor, ParamEntry, ParamTable, ParamValue, ProcessArgs, Program,
};

use crate::pot;

/// Lowest crush rate.
pub const MIN_CRUSH_RATE_HZ: f32 = 40.0;
/// Bit depth after creation.
pub const DEFAULT_BIT_DEPTH: u32 = 8;
/// Crush rate after creation.
pub const DEFAULT_CRUSH_RATE_HZ: f32 = 10_000.0;

/// Which setting the pot controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KnobControl {
    /// Pot sets the bit depth.
    #[default]
    BitDepth,
    /// Pot sets the crush rate.
    SampleRate,
}

impl KnobControl {
    /// Menu labels, indexed like the variants.
    pub const LABELS: &'static [&'static str] = &["Bit depth", "Sample rate"];

    /// Variant for a choice index.
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(KnobControl::BitDepth),
            1 => Some(KnobControl::SampleRate),
            _ => None,
        }
    }

    /// Choice index of this variant.
    pub const fn index(self) -> usize {
        self as usize
    }
}

static PARAMS: ParamTable<Bitcrush> = ParamTable::new(&[ParamEntry {
    desc: ParamDescriptor::choice("Knob control", KnobControl::LABELS, 0),
    get: |b| ParamValue::Choice(b.knob.index()),
    set: |b, v| {
        if let Some(knob) = v.as_choice().and_then(KnobControl::from_index) {
            b.knob = knob;
        }
    },
}]);

/// Lo-fi bit and rate reducer.
///
/// ## Parameters
///
/// | Index | Name | Kind | Default |
/// |-------|------|------|---------|
/// | 0 | Knob control | Bit depth / Sample rate | Bit depth |
///
/// # Example
///
/// ```rust
/// use pulsar_programs::Bitcrush;
///
/// let mut crush = Bitcrush::new(48_000.0);
/// crush.set_bit_depth(1);
/// assert_eq!(crush.crush_sample(0.7), 0.5);
/// assert_eq!(crush.crush_sample(-0.3), -0.0);
/// ```
#[derive(Debug, Clone)]
pub struct Bitcrush {
    sample_rate: f32,
    knob: KnobControl,
    bit_depth: u32,
    crush_rate: f32,
    /// Fraction of a crush-clock period elapsed, in `[0, 1)`.
    phase: f32,
    held: f32,
}

impl Bitcrush {
    /// Creates a bitcrusher at 8 bits and 10 kHz.
    pub fn new(sample_rate: f32) -> Self {
        let mut crush = Self {
            sample_rate,
            knob: KnobControl::default(),
            bit_depth: DEFAULT_BIT_DEPTH,
            crush_rate: DEFAULT_CRUSH_RATE_HZ,
            phase: 0.0,
            held: 0.0,
        };
        crush.set_crush_rate(DEFAULT_CRUSH_RATE_HZ);
        crush
    }

    /// Which setting the pot controls.
    #[must_use]
    pub fn knob(&self) -> KnobControl {
        self.knob
    }

    /// Selects which setting the pot controls.
    pub fn set_knob(&mut self, knob: KnobControl) {
        self.knob = knob;
    }

    /// Current bit depth.
    #[must_use]
    pub fn bit_depth(&self) -> u32 {
        self.bit_depth
    }

    /// Sets the bit depth, clamped to 1-16.
    pub fn set_bit_depth(&mut self, bits: u32) {
        self.bit_depth = bits.clamp(1, 16);
    }

    /// Current crush rate in Hz.
    #[must_use]
    pub fn crush_rate(&self) -> f32 {
        self.crush_rate
    }

    /// Sets the crush rate, clamped between 40 Hz and the sample rate.
    pub fn set_crush_rate(&mut self, rate: f32) {
        let top = self.sample_rate.max(MIN_CRUSH_RATE_HZ);
        self.crush_rate = if rate.is_nan() {
            top
        } else {
            rate.clamp(MIN_CRUSH_RATE_HZ, top)
        };
    }

    /// Applies the pot according to the knob selection.
    pub fn apply_pot(&mut self, pot: f32) {
        match self.knob {
            KnobControl::BitDepth => self.set_bit_depth(roundf(pot * 17.0) as u32),
            KnobControl::SampleRate => self.set_crush_rate(pot * self.sample_rate),
        }
    }

    /// Quantizes one sample to the current bit depth.
    #[must_use]
    pub fn crush_sample(&self, x: f32) -> f32 {
        let mask = (0xFFFF_u32 << (16 - self.bit_depth)) & 0xFFFF;
        let magnitude = (fabsf(x) * 65_536.0).min(65_535.0) as u32;
        copysignf((magnitude & mask) as f32 / 65_536.0, x)
    }
}

impl Program for Bitcrush {
    fn name(&self) -> &'static str {
        "Bitcrusher"
    }

    fn init(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.set_crush_rate(self.crush_rate);
        self.phase = 0.0;
        self.held = 0.0;
    }

    fn process(&mut self, args: &mut ProcessArgs<'_>) {
        self.apply_pot(pot(args));

        let increment = self.crush_rate / self.sample_rate;
        for (out, inp) in args.output.iter_mut().zip(args.input) {
            self.phase += increment;
            if self.phase >= 1.0 {
                self.phase -= 1.0;
                self.held = self.crush_sample(inp.left);
            }
            *out = Frame::mono(self.held);
        }
    }

    fn param_count(&self) -> usize {
        PARAMS.len()
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        PARAMS.descriptor(index)
    }

    fn param(&self, index: usize) -> Option<ParamValue> {
        PARAMS.get(self, index)
    }

    fn set_param(&mut self, index: usize, value: ParamValue) -> bool {
        PARAMS.set(self, index, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulsar_core::CvInput;

    const POT_FULL: u16 = u16::MAX;

    fn run(crush: &mut Bitcrush, pot_raw: u16, input: &[Frame]) -> Vec<Frame> {
        let mut output = vec![Frame::SILENCE; input.len()];
        let mut args = ProcessArgs::new(input, &mut output);
        args.cv[CvInput::Pot.index()] = pot_raw;
        crush.process(&mut args);
        output
    }

    #[test]
    fn test_pot_sets_bit_depth() {
        let mut crush = Bitcrush::new(48_000.0);
        crush.apply_pot(0.0);
        assert_eq!(crush.bit_depth(), 1);
        crush.apply_pot(0.5);
        assert_eq!(crush.bit_depth(), 9);
        crush.apply_pot(1.0);
        assert_eq!(crush.bit_depth(), 16);
        assert_eq!(crush.crush_rate(), DEFAULT_CRUSH_RATE_HZ);
    }

    #[test]
    fn test_pot_sets_crush_rate() {
        let mut crush = Bitcrush::new(48_000.0);
        assert!(crush.set_param(0, ParamValue::Choice(1)));
        assert_eq!(crush.knob(), KnobControl::SampleRate);
        crush.apply_pot(0.0);
        assert_eq!(crush.crush_rate(), MIN_CRUSH_RATE_HZ);
        crush.apply_pot(1.0);
        assert_eq!(crush.crush_rate(), 48_000.0);
        assert_eq!(crush.bit_depth(), DEFAULT_BIT_DEPTH);
    }

    #[test]
    fn test_crush_sample_masks_magnitude() {
        let mut crush = Bitcrush::new(48_000.0);
        crush.set_bit_depth(2);
        assert_eq!(crush.crush_sample(0.9), 0.75);
        assert_eq!(crush.crush_sample(-0.6), -0.5);
        crush.set_bit_depth(16);
        assert_eq!(crush.crush_sample(1.0), 65_535.0 / 65_536.0);
        assert_eq!(crush.crush_sample(0.25), 0.25);
    }

    #[test]
    fn test_full_rate_tracks_every_sample() {
        let mut crush = Bitcrush::new(48_000.0);
        crush.init(48_000.0);
        crush.set_knob(KnobControl::SampleRate);
        let input = [
            Frame::mono(0.5),
            Frame::mono(-0.25),
            Frame::mono(0.125),
            Frame::mono(0.0),
        ];
        let out = run(&mut crush, POT_FULL, &input);
        assert_eq!(out, input);
    }

    #[test]
    fn test_low_rate_holds() {
        let mut crush = Bitcrush::new(1_280.0);
        crush.init(1_280.0);
        crush.set_knob(KnobControl::SampleRate);
        crush.set_bit_depth(16);
        // Pot at the bottom: 40 Hz clock, one new sample every 32 frames
        let input: Vec<Frame> = (1..=64).map(|i| Frame::mono(i as f32 / 64.0)).collect();
        let out = run(&mut crush, 0, &input);
        assert!(out[..31].iter().all(|f| *f == Frame::SILENCE));
        assert!(out[31..63].iter().all(|f| *f == Frame::mono(0.5)));
    }

    #[test]
    fn test_params() {
        let mut crush = Bitcrush::new(48_000.0);
        assert_eq!(crush.param_count(), 1);
        assert_eq!(crush.param_info(0).map(|d| d.name), Some("Knob control"));
        assert_eq!(crush.param(0), Some(ParamValue::Choice(0)));
        assert!(!crush.set_param(0, ParamValue::Choice(2)));
        assert!(!crush.set_param(1, ParamValue::Choice(0)));
        // Parameters survive re-initialization
        crush.set_param(0, ParamValue::Choice(1));
        crush.init(48_000.0);
        assert_eq!(crush.param(0), Some(ParamValue::Choice(1)));
    }
}
