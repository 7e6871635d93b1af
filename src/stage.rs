use crate::{utils::buffer::AudioBlock, Error};

// -------------------------------------------------------------------------------------------------

pub mod fx;
pub mod mixer;
pub mod pre;

// -------------------------------------------------------------------------------------------------

/// Stages are the processing nodes of the [`Graph`](crate::Graph). They manipulate stereo audio
/// blocks in-place in the audio real-time thread and keep state across blocks (filter and delay
/// memory, smoothing state).
///
/// Stages read their parameters from a shared [`ParameterStore`](crate::ParameterStore) once per
/// block. Parameter handles are resolved when a stage gets created, so there are no string
/// lookups in the real-time thread.
///
/// NB: `process` and `reset` are called in realtime audio threads, so they must not block or
/// allocate! `prepare` is called in a non real-time thread before processing starts.
pub trait Stage: Send + 'static {
    /// A unique, static name for the stage, used for logging.
    fn name(&self) -> &'static str;

    /// Ids of the parameters this stage reads from the parameter store.
    fn parameter_ids(&self) -> &'static [&'static str];

    /// Initializes the stage with the audio host's properties.
    ///
    /// This method is called before the stage is used and whenever the sample rate or block
    /// size changes. It runs on a non-real-time thread, so it's safe to perform allocations
    /// (e.g., for delay buffers) here. Stages must also snap their smoothed parameters to the
    /// current parameter values and clear all signal memory.
    ///
    /// The caller validates `sample_rate` and `block_size` before calling `prepare`.
    fn prepare(&mut self, sample_rate: f64, block_size: usize) -> Result<(), Error>;

    /// Processes an audio block in-place. Blocks passed to `process` never exceed the
    /// prepared block size.
    ///
    /// This method is called repeatedly on the real-time audio thread. To avoid audio glitches,
    /// it must not block, allocate memory, or perform other time-consuming operations.
    fn process(&mut self, block: &mut AudioBlock);

    /// Clears all signal memory and jumps to the current parameter values, so no stale energy
    /// gets carried into a newly started playback session.
    ///
    /// Like `process`, this method must not block, allocate memory, or do other time-consuming tasks.
    fn reset(&mut self);

    /// Returns the number of audible sample frames this stage will produce after it received
    /// silence. `None` means unknown.
    fn tail_frames(&self) -> Option<usize> {
        None
    }
}
