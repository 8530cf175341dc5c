//! Dry signal path.

use pulsar_core::{ProcessArgs, Program};

/// Copies the input block to the output unchanged.
///
/// Useful as the "bypass" entry of the program list and as a latency and
/// level reference when testing the audio path.
#[derive(Debug, Clone, Default)]
pub struct Passthrough;

impl Passthrough {
    /// Creates the program.
    pub fn new() -> Self {
        Self
    }
}

impl Program for Passthrough {
    fn name(&self) -> &'static str {
        "Passthrough"
    }

    fn init(&mut self, _sample_rate: f32) {}

    fn process(&mut self, args: &mut ProcessArgs<'_>) {
        let frames = args.frames();
        args.output[..frames].copy_from_slice(&args.input[..frames]);
    }
}
