//! Per-block audio entry point.
//!
//! [`AudioDispatch::process`] is called by the audio subsystem once per
//! block. In order, it:
//!
//! 1. refreshes every CV gate exactly once
//! 2. locks the current program without waiting, then takes every gate and
//!    button latch once and builds [`ProcessArgs`] with them and the raw CV
//!    readings
//! 3. hands the block to the program
//!
//! With no program current, or with the program held by the cooperative
//! context, the output is left as the caller filled it and the latches keep
//! their edges for the next block.
//! Nothing here allocates, blocks or fails.

use pulsar_core::{CvInput, Frame, ProcessArgs, deinterleave, interleave};
use pulsar_platform::{CvBank, Switch};

use crate::config::MAX_BLOCK_FRAMES;
use crate::rack::ProgramRack;

/// Audio-context view of the device.
///
/// Cheap to copy; holds only references.
#[derive(Debug, Clone, Copy)]
pub struct AudioDispatch<'a> {
    rack: &'a ProgramRack,
    cv: &'a CvBank<'a>,
    button: &'a Switch<'a>,
}

impl<'a> AudioDispatch<'a> {
    /// Creates a dispatcher over a rack, its CV inputs and the gate button.
    pub fn new(rack: &'a ProgramRack, cv: &'a CvBank<'a>, button: &'a Switch<'a>) -> Self {
        Self { rack, cv, button }
    }

    /// The program rack.
    pub fn rack(&self) -> &'a ProgramRack {
        self.rack
    }

    /// Processes one block of stereo frames.
    pub fn process(&self, input: &[Frame], output: &mut [Frame]) {
        self.cv.update_gates();
        self.rack.count_frames(output.len());

        // Latches are taken only while the program is locked
        self.rack.try_with_current(|program| {
            let mut args = ProcessArgs {
                input,
                output,
                cv: self.cv.snapshot(),
                gates: [
                    self.cv.gate(CvInput::Cv1).take_edges(),
                    self.cv.gate(CvInput::Cv2).take_edges(),
                    self.button.take_edges(),
                ],
            };
            program.process(&mut args);
        });
    }

    /// Processes one block of interleaved `L R L R ...` samples.
    ///
    /// Output samples the program does not write are silence. At most
    /// [`MAX_BLOCK_FRAMES`] frames are processed; returns the frame count.
    pub fn process_interleaved(&self, input: &[f32], output: &mut [f32]) -> usize {
        let mut in_frames = [Frame::SILENCE; MAX_BLOCK_FRAMES];
        let mut out_frames = [Frame::SILENCE; MAX_BLOCK_FRAMES];

        // Input frames past the end of `input` stay silent
        let frames = (output.len() / 2).min(MAX_BLOCK_FRAMES);
        deinterleave(input, &mut in_frames[..frames]);
        self.process(&in_frames[..frames], &mut out_frames[..frames]);
        interleave(&out_frames[..frames], output)
    }
}
