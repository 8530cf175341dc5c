//! Stereo sample frames and interleaved buffer conversion.
//!
//! The codec delivers interleaved `L R L R ...` samples. Programs work on
//! [`Frame`] slices so they never index channels by hand.

/// One stereo sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Frame {
    /// Left channel.
    pub left: f32,
    /// Right channel.
    pub right: f32,
}

impl Frame {
    /// Digital silence.
    pub const SILENCE: Self = Self {
        left: 0.0,
        right: 0.0,
    };

    /// Creates a frame from both channels.
    #[inline]
    pub const fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }

    /// Creates a frame with the same value on both channels.
    #[inline]
    pub const fn mono(value: f32) -> Self {
        Self {
            left: value,
            right: value,
        }
    }

    /// Returns the average of both channels.
    #[inline]
    pub fn to_mono(self) -> f32 {
        (self.left + self.right) * 0.5
    }

    /// Scales both channels.
    #[inline]
    pub fn scaled(self, gain: f32) -> Self {
        Self {
            left: self.left * gain,
            right: self.right * gain,
        }
    }
}

/// Fills `frames` from an interleaved sample buffer.
///
/// Converts `min(frames.len(), interleaved.len() / 2)` frames and returns
/// that count. A trailing odd sample is ignored.
pub fn deinterleave(interleaved: &[f32], frames: &mut [Frame]) -> usize {
    let mut count = 0;
    for (frame, pair) in frames.iter_mut().zip(interleaved.chunks_exact(2)) {
        *frame = Frame::new(pair[0], pair[1]);
        count += 1;
    }
    count
}

/// Writes `frames` into an interleaved sample buffer.
///
/// Returns the number of frames written.
pub fn interleave(frames: &[Frame], interleaved: &mut [f32]) -> usize {
    let mut count = 0;
    for (frame, pair) in frames.iter().zip(interleaved.chunks_exact_mut(2)) {
        pair[0] = frame.left;
        pair[1] = frame.right;
        count += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deinterleave() {
        let raw = [0.1, 0.2, 0.3, 0.4, 0.5];
        let mut frames = [Frame::SILENCE; 4];
        assert_eq!(deinterleave(&raw, &mut frames), 2);
        assert_eq!(frames[0], Frame::new(0.1, 0.2));
        assert_eq!(frames[1], Frame::new(0.3, 0.4));
        assert_eq!(frames[2], Frame::SILENCE);
    }

    #[test]
    fn test_interleave() {
        let frames = [Frame::new(1.0, -1.0), Frame::mono(0.5)];
        let mut raw = [0.0; 4];
        assert_eq!(interleave(&frames, &mut raw), 2);
        assert_eq!(raw, [1.0, -1.0, 0.5, 0.5]);
    }

    #[test]
    fn test_frame_helpers() {
        assert_eq!(Frame::new(1.0, 0.0).to_mono(), 0.5);
        assert_eq!(Frame::mono(2.0).scaled(0.25), Frame::mono(0.5));
    }
}
