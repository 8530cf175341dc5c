//! The program (effect) contract and per-block process arguments.
//!
//! A [`Program`] is one selectable audio effect: a delay, a bitcrusher, a
//! drum voice. The audio dispatcher calls exactly one program per audio
//! block, handing it a [`ProcessArgs`] with the block's buffers and the
//! control inputs sampled for that block.
//!
//! ## Design Decisions
//!
//! - **Object-safe**: programs live as `Box<dyn Program>` in a list built at
//!   startup so the menu can pick between them at runtime.
//! - **Snapshots, not live reads**: gate edges are taken-and-reset once per
//!   block by the dispatcher and handed over as plain booleans. A program
//!   sees each edge in exactly one `process` call.
//! - **Total lookups**: source indices come from generic parameter code, so
//!   an out-of-range CV or gate source yields `None`/`false`, never a panic.

use crate::frame::Frame;
use crate::latch::EdgeSnapshot;
use crate::param::{ParamDescriptor, ParamValue};

/// Number of analog CV inputs sampled per block.
pub const CV_INPUT_COUNT: usize = 3;

/// Number of gate sources snapshotted per block.
pub const GATE_SOURCE_COUNT: usize = 3;

/// Analog inputs, in ADC channel order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CvInput {
    /// Front-panel CV jack 1.
    Cv1 = 0,
    /// Front-panel CV jack 2.
    Cv2 = 1,
    /// Panel potentiometer.
    Pot = 2,
}

impl CvInput {
    /// All inputs in channel order.
    pub const ALL: [CvInput; CV_INPUT_COUNT] = [CvInput::Cv1, CvInput::Cv2, CvInput::Pot];

    /// Menu labels, indexed like [`CvInput::index`], plus a trailing "Fixed"
    /// entry meaning "no CV source".
    pub const LABELS: &'static [&'static str] = &["CV1", "CV2", "Fingers", "Fixed"];

    /// ADC channel index.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Looks up an input by channel index.
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(CvInput::Cv1),
            1 => Some(CvInput::Cv2),
            2 => Some(CvInput::Pot),
            _ => None,
        }
    }
}

/// Inputs that can act as a trigger/gate for a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum GateSource {
    /// Gate derived from CV jack 1.
    Cv1 = 0,
    /// Gate derived from CV jack 2.
    Cv2 = 1,
    /// The panel pushbutton.
    Button = 2,
}

impl GateSource {
    /// All sources in snapshot order.
    pub const ALL: [GateSource; GATE_SOURCE_COUNT] =
        [GateSource::Cv1, GateSource::Cv2, GateSource::Button];

    /// Menu labels, indexed like [`GateSource::index`].
    pub const LABELS: &'static [&'static str] = &["CV1", "CV2", "Button"];

    /// Snapshot index.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Looks up a source by snapshot index.
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(GateSource::Cv1),
            1 => Some(GateSource::Cv2),
            2 => Some(GateSource::Button),
            _ => None,
        }
    }
}

/// Everything a program sees for one audio block.
///
/// Built fresh by the dispatcher for every block and dropped right after
/// the program returns.
#[derive(Debug)]
pub struct ProcessArgs<'a> {
    /// Input frames for this block.
    pub input: &'a [Frame],
    /// Output frames for this block, pre-filled by the caller (usually silence).
    pub output: &'a mut [Frame],
    /// Raw ADC reading for each [`CvInput`].
    pub cv: [u16; CV_INPUT_COUNT],
    /// Edge snapshots for each [`GateSource`], taken once for this block.
    pub gates: [EdgeSnapshot; GATE_SOURCE_COUNT],
}

impl<'a> ProcessArgs<'a> {
    /// Creates arguments with no CV and no gate edges.
    pub fn new(input: &'a [Frame], output: &'a mut [Frame]) -> Self {
        Self {
            input,
            output,
            cv: [0; CV_INPUT_COUNT],
            gates: [EdgeSnapshot::NONE; GATE_SOURCE_COUNT],
        }
    }

    /// Raw reading of CV input `index`, or `None` for "Fixed"/out of range.
    #[inline]
    pub fn cv(&self, index: usize) -> Option<u16> {
        self.cv.get(index).copied()
    }

    /// Raw reading of a specific CV input.
    #[inline]
    pub fn cv_input(&self, input: CvInput) -> u16 {
        self.cv[input.index()]
    }

    /// True if gate source `index` turned on since the previous block.
    #[inline]
    pub fn gate_on(&self, index: usize) -> bool {
        self.gates.get(index).is_some_and(|g| g.turned_on)
    }

    /// True if gate source `index` turned off since the previous block.
    #[inline]
    pub fn gate_off(&self, index: usize) -> bool {
        self.gates.get(index).is_some_and(|g| g.turned_off)
    }

    /// Number of frames in this block.
    #[inline]
    pub fn frames(&self) -> usize {
        self.input.len().min(self.output.len())
    }
}

/// Opaque display animation belonging to a program.
///
/// The core only forwards it to the display layer. Implementations keep
/// their own state in atomics because the audio context may update it while
/// the display task steps it.
pub trait Animation: Send + Sync {
    /// Called when the animation starts.
    fn init(&self) {}

    /// Draws frame `step`. Returns false once the animation has finished.
    fn step(&self, step: u32) -> bool;
}

/// A selectable audio program.
///
/// # Contract
///
/// - [`init`](Program::init) runs in the cooperative context before the
///   program becomes visible to the audio dispatcher.
/// - [`process`](Program::process) runs in the audio context, once per
///   block, and must finish well within the block period. No allocation,
///   no blocking.
///
/// # Example
///
/// ```rust
/// use pulsar_core::{ProcessArgs, Program};
///
/// struct Invert;
///
/// impl Program for Invert {
///     fn name(&self) -> &'static str {
///         "Invert"
///     }
///
///     fn init(&mut self, _sample_rate: f32) {}
///
///     fn process(&mut self, args: &mut ProcessArgs<'_>) {
///         for (out, inp) in args.output.iter_mut().zip(args.input) {
///             *out = inp.scaled(-1.0);
///         }
///     }
/// }
/// ```
pub trait Program: Send {
    /// Display name.
    fn name(&self) -> &'static str;

    /// Prepares the program to run at `sample_rate`. Resets processing state;
    /// parameter values are kept.
    fn init(&mut self, sample_rate: f32);

    /// Processes one audio block.
    fn process(&mut self, args: &mut ProcessArgs<'_>);

    /// Display animation, if the program has one.
    fn animation(&self) -> Option<&dyn Animation> {
        None
    }

    /// Number of configurable parameters.
    fn param_count(&self) -> usize {
        0
    }

    /// Descriptor of parameter `index`.
    fn param_info(&self, _index: usize) -> Option<ParamDescriptor> {
        None
    }

    /// Current value of parameter `index`.
    fn param(&self, _index: usize) -> Option<ParamValue> {
        None
    }

    /// Sets parameter `index`. Returns false if the index or value is rejected.
    fn set_param(&mut self, _index: usize, _value: ParamValue) -> bool {
        false
    }
}
