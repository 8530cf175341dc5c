//! Pulsar Programs - the audio programs of the pulsar effects module
//!
//! Each program implements [`pulsar_core::Program`] and reads its controls
//! from the [`ProcessArgs`] the dispatcher builds for every block:
//!
//! - [`Passthrough`] - Dry copy of the input
//! - [`AutoPan`] - Sine LFO panning, rate on the pot
//! - [`Bitcrush`] - Bit depth and sample-and-hold reduction, pot assignable
//! - [`GateEnvelope`] - Gate-triggered attack/decay VCA
//!
//! [`ProgramList::standard`] builds them all, in menu order.
//!
//! ## Example
//!
//! ```rust
//! use pulsar_core::{CvInput, Frame, ProcessArgs};
//! use pulsar_programs::ProgramList;
//!
//! let mut programs = ProgramList::standard(48_000.0);
//! let input = [Frame::mono(0.5); 4];
//! let mut output = [Frame::SILENCE; 4];
//!
//! for program in &mut programs {
//!     program.init(48_000.0);
//!     let mut args = ProcessArgs::new(&input, &mut output);
//!     args.cv[CvInput::Pot.index()] = 32_000;
//!     program.process(&mut args);
//!     assert!(output.iter().all(|f| f.left.is_finite() && f.right.is_finite()));
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod auto_pan;
pub mod bitcrush;
pub mod gate_envelope;
pub mod list;
pub mod passthrough;

// Re-export main types at crate root
pub use auto_pan::{AutoPan, PanAnimation};
pub use bitcrush::{Bitcrush, KnobControl};
pub use gate_envelope::{GateEnvelope, Stage};
pub use list::ProgramList;
pub use passthrough::Passthrough;

use pulsar_core::{CvInput, ProcessArgs};

/// Pot position for this block in `[0, 1]`.
#[inline]
pub(crate) fn pot(args: &ProcessArgs<'_>) -> f32 {
    pulsar_platform::unipolar(CvInput::Pot, args.cv_input(CvInput::Pot))
}
