use std::ops::Range;

use crate::Error;

// -------------------------------------------------------------------------------------------------

/// Multiply all samples in the given buffer with the given factor.
#[inline]
pub fn scale_buffer(buffer: &mut [f32], factor: f32) {
    for sample in buffer.iter_mut() {
        *sample *= factor;
    }
}

// -------------------------------------------------------------------------------------------------

/// A stereo, channel-major (planar) block of audio samples, borrowed from the caller for the
/// duration of one process call. Stages process blocks in-place.
#[derive(Debug)]
pub struct AudioBlock<'a> {
    left: &'a mut [f32],
    right: &'a mut [f32],
}

impl<'a> AudioBlock<'a> {
    /// Number of channels in a block. Only stereo layouts are supported.
    pub const CHANNEL_COUNT: usize = 2;

    /// Wrap the given left and right channel buffers. Both buffers must have the same length.
    pub fn new(left: &'a mut [f32], right: &'a mut [f32]) -> Result<Self, Error> {
        if left.len() != right.len() {
            return Err(Error::BlockSizeMismatch {
                left: left.len(),
                right: right.len(),
            });
        }
        Ok(Self { left, right })
    }

    /// Wrap a planar buffer with exactly two channels.
    pub fn from_planar(channels: &'a mut [Vec<f32>]) -> Result<Self, Error> {
        if channels.len() != Self::CHANNEL_COUNT {
            return Err(Error::ParameterError(format!(
                "expected a stereo buffer, got {} channels",
                channels.len()
            )));
        }
        let (left, right) = channels.split_at_mut(1);
        Self::new(left[0].as_mut_slice(), right[0].as_mut_slice())
    }

    /// Number of sample frames in the block.
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.left.len()
    }

    /// True when the block contains no frames.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    #[inline]
    pub fn left(&self) -> &[f32] {
        &*self.left
    }

    #[inline]
    pub fn right(&self) -> &[f32] {
        &*self.right
    }

    /// Access a single channel's samples. 0 is left, 1 is right.
    pub fn channel(&self, index: usize) -> &[f32] {
        match index {
            0 => &*self.left,
            1 => &*self.right,
            _ => panic!("Channel index {index} out of bounds"),
        }
    }

    /// Mutable access to both channels at once.
    #[inline]
    pub fn channels_mut(&mut self) -> (&mut [f32], &mut [f32]) {
        (&mut *self.left, &mut *self.right)
    }

    /// Iterate over `(left, right)` sample pairs.
    #[inline]
    pub fn frames_mut(&mut self) -> impl Iterator<Item = (&mut f32, &mut f32)> {
        self.left.iter_mut().zip(self.right.iter_mut())
    }

    /// Reborrow a range of frames as a new block.
    pub fn sub_block(&mut self, range: Range<usize>) -> AudioBlock<'_> {
        AudioBlock {
            left: &mut self.left[range.clone()],
            right: &mut self.right[range],
        }
    }

    /// Set all samples of both channels to the given value.
    pub fn fill(&mut self, value: f32) {
        self.left.fill(value);
        self.right.fill(value);
    }
}

// -------------------------------------------------------------------------------------------------

/// Copy the given planar stereo channels into an interleaved buffer.
/// Copies as many frames as fit into the interleaved buffer.
pub fn planar_to_interleaved(left: &[f32], right: &[f32], interleaved: &mut [f32]) {
    for ((frame, l), r) in interleaved.chunks_exact_mut(2).zip(left).zip(right) {
        frame[0] = *l;
        frame[1] = *r;
    }
}

// -------------------------------------------------------------------------------------------------

/// Copy the given interleaved stereo buffer into planar channels.
/// Copies as many frames as fit into the planar channels.
pub fn interleaved_to_planar(interleaved: &[f32], left: &mut [f32], right: &mut [f32]) {
    for ((frame, l), r) in interleaved
        .chunks_exact(2)
        .zip(left.iter_mut())
        .zip(right.iter_mut())
    {
        *l = frame[0];
        *r = frame[1];
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planar_interleaved() {
        let left = [1.0, 2.0, 3.0, 4.0];
        let right = [4.0, 3.0, 2.0, 1.0];
        let interleaved = [1.0, 4.0, 2.0, 3.0, 3.0, 2.0, 4.0, 1.0];

        let mut interleaved_copy = [0.0; 8];
        planar_to_interleaved(&left, &right, &mut interleaved_copy);
        assert_eq!(interleaved, interleaved_copy);

        let (mut left_copy, mut right_copy) = ([0.0; 4], [0.0; 4]);
        interleaved_to_planar(&interleaved, &mut left_copy, &mut right_copy);
        assert_eq!(left, left_copy);
        assert_eq!(right, right_copy);
    }

    #[test]
    fn block_construction() {
        let (mut left, mut right) = (vec![0.0; 4], vec![0.0; 3]);
        assert_eq!(
            AudioBlock::new(&mut left, &mut right).unwrap_err(),
            Error::BlockSizeMismatch { left: 4, right: 3 }
        );

        let mut mono = vec![vec![0.0; 4]];
        assert!(AudioBlock::from_planar(&mut mono).is_err());

        let mut stereo = vec![vec![1.0; 4], vec![2.0; 4]];
        let block = AudioBlock::from_planar(&mut stereo).unwrap();
        assert_eq!(block.frame_count(), 4);
        assert_eq!(block.channel(1), &[2.0; 4]);
    }

    #[test]
    fn block_access() {
        let (mut left, mut right) = (vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]);
        let mut block = AudioBlock::new(&mut left, &mut right).unwrap();
        for (l, r) in block.frames_mut() {
            std::mem::swap(l, r);
        }
        assert_eq!(block.left(), &[4.0, 5.0, 6.0]);
        {
            let mut sub = block.sub_block(1..3);
            assert_eq!(sub.frame_count(), 2);
            sub.fill(0.0);
        }
        assert_eq!(block.left(), &[4.0, 0.0, 0.0]);
        assert_eq!(block.right(), &[1.0, 0.0, 0.0]);
    }
}
