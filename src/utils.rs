//! Buffer, smoothing and DSP building blocks used by the processing stages.

pub mod buffer;
pub mod dsp;
pub mod panning;
pub mod smoothed;
