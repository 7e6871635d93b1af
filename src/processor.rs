use std::{
    panic::{catch_unwind, AssertUnwindSafe},
    sync::Arc,
};

use crate::{
    graph::{Connection, Graph, Topology},
    params,
    stage::fx::FxStage,
    utils::{
        buffer::{interleaved_to_planar, planar_to_interleaved, AudioBlock},
        panning::PannerLaw,
    },
    Error, ParameterHandle, ParameterStore,
};

// -------------------------------------------------------------------------------------------------

/// Options to configure a [`Processor`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessorOptions {
    /// By default [`PannerLaw::Sin3dB`]: panner law of the input pan.
    pub panner_law: PannerLaw,
    /// By default 8: the fx unit's delay and filter parameters get ramped over
    /// `block_size / fx_smoothing_divisor` samples.
    pub fx_smoothing_divisor: usize,
    /// By default true: catch panics in the processing stages and silence the output,
    /// instead of unwinding into the audio host.
    pub guard_panics: bool,
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self {
            panner_law: PannerLaw::default(),
            fx_smoothing_divisor: FxStage::DEFAULT_SMOOTHING_DIVISOR,
            guard_panics: true,
        }
    }
}

impl ProcessorOptions {
    pub fn panner_law(mut self, panner_law: PannerLaw) -> Self {
        self.panner_law = panner_law;
        self
    }

    pub fn fx_smoothing_divisor(mut self, divisor: usize) -> Self {
        self.fx_smoothing_divisor = divisor;
        self
    }

    pub fn guard_panics(mut self, guard: bool) -> Self {
        self.guard_panics = guard;
        self
    }

    /// Validate all options. Returns Error::ParameterError on errors.
    pub fn validate(&self) -> Result<(), Error> {
        if self.fx_smoothing_divisor == 0 {
            return Err(Error::ParameterError(format!(
                "processor options 'fx_smoothing_divisor' value is '{}'",
                self.fx_smoothing_divisor
            )));
        }
        Ok(())
    }
}

// -------------------------------------------------------------------------------------------------

/// Stereo processor entry point for audio hosts: owns the processing [`Graph`] and selects its
/// [`Topology`] from the `fxPosition` parameter on every processed block.
///
/// Lifecycle: [`Processor::prepare`] must be called with the host's sample rate and max block
/// size before processing. Until then, and after [`Processor::release`], audio passes through
/// unmodified.
///
/// Parameters are read from a shared [`ParameterStore`], which can be modified from any thread
/// while the processor is running. See [`Processor::parameters`].
pub struct Processor {
    options: ProcessorOptions,
    store: Arc<ParameterStore>,
    fx_position: ParameterHandle,
    graph: Option<Graph>,
    sample_rate: f64,
    block_size: usize,
    interleave_buffers: [Vec<f32>; 2],
    panicked: bool,
    warned_unprepared: bool,
    warned_oversized: bool,
}

impl Processor {
    pub const NAME: &str = "Pantheon";
    pub const ACCEPTS_MIDI: bool = false;
    pub const PRODUCES_MIDI: bool = false;
    pub const TAIL_LENGTH_SECONDS: f64 = 0.0;
    pub const CHANNEL_COUNT: usize = AudioBlock::CHANNEL_COUNT;

    /// Create a new processor with default options and a new parameter store.
    pub fn new() -> Result<Self, Error> {
        Self::with_options(ProcessorOptions::default())
    }

    /// Create a new processor with the given options and a new parameter store.
    pub fn with_options(options: ProcessorOptions) -> Result<Self, Error> {
        let store = Arc::new(ParameterStore::new(params::parameter_layout())?);
        Self::with_store(store, options)
    }

    /// Create a new processor, which reads its parameters from the given store. The store must
    /// declare all parameters of [`params::parameter_layout`].
    pub fn with_store(store: Arc<ParameterStore>, options: ProcessorOptions) -> Result<Self, Error> {
        options.validate()?;
        for parameter in params::parameter_layout() {
            store.handle(parameter.id())?;
        }
        let fx_position = store.handle(params::FX_POSITION)?;
        Ok(Self {
            options,
            store,
            fx_position,
            graph: None,
            sample_rate: 0.0,
            block_size: 0,
            interleave_buffers: [Vec::new(), Vec::new()],
            panicked: false,
            warned_unprepared: false,
            warned_oversized: false,
        })
    }

    /// The processor's options.
    pub fn options(&self) -> &ProcessorOptions {
        &self.options
    }

    /// Shared parameter store. Clone the Arc to change parameters from other threads.
    pub fn parameters(&self) -> &Arc<ParameterStore> {
        &self.store
    }

    /// True when the processor got successfully prepared and not yet released.
    pub fn is_prepared(&self) -> bool {
        self.graph.is_some()
    }

    /// Prepared sample rate, or 0 when not prepared.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Prepared max block size, or 0 when not prepared.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Prepare processing with the given sample rate and max block size.
    ///
    /// Re-preparing with an unchanged configuration only resets all stages. On errors, the
    /// processor is left unprepared.
    pub fn prepare(&mut self, sample_rate: f64, block_size: usize) -> Result<(), Error> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            self.release();
            return Err(Error::InvalidSampleRate(sample_rate));
        }
        if block_size == 0 {
            self.release();
            return Err(Error::InvalidBlockSize(block_size));
        }

        self.panicked = false;
        self.warned_unprepared = false;
        self.warned_oversized = false;

        if let Some(graph) = self.graph.as_mut() {
            if self.sample_rate == sample_rate && self.block_size == block_size {
                log::debug!("Resetting processor graph");
                graph.reset();
                return Ok(());
            }
        }

        log::info!("Preparing processor: sample rate {sample_rate}, block size {block_size}");
        let graph = match self.build_graph(sample_rate, block_size) {
            Ok(graph) => graph,
            Err(err) => {
                self.release();
                return Err(err);
            }
        };

        self.graph = Some(graph);
        self.sample_rate = sample_rate;
        self.block_size = block_size;
        self.interleave_buffers = [vec![0.0; block_size], vec![0.0; block_size]];
        Ok(())
    }

    fn build_graph(&self, sample_rate: f64, block_size: usize) -> Result<Graph, Error> {
        let topology = Topology::from_fx_position(self.store.load(self.fx_position));
        let mut graph = Graph::new(Arc::clone(&self.store), &self.options, topology)?;
        graph.prepare(sample_rate, block_size)?;
        log::debug!("Built processor graph with topology {topology}");
        Ok(graph)
    }

    /// Release all processing resources. The processor needs to be prepared again to
    /// process audio.
    pub fn release(&mut self) {
        if self.graph.take().is_some() {
            log::info!("Releasing processor");
        }
        self.sample_rate = 0.0;
        self.block_size = 0;
        self.interleave_buffers = [Vec::new(), Vec::new()];
        self.panicked = false;
    }

    /// Clear all stage state and jump to the current parameter values. Also unmutes a processor
    /// which was silenced after a processing failure.
    pub fn reset(&mut self) {
        if let Some(graph) = self.graph.as_mut() {
            graph.reset();
        }
        self.panicked = false;
    }

    /// Active topology. When not prepared, the topology the processor would start with.
    pub fn topology(&self) -> Topology {
        match &self.graph {
            Some(graph) => graph.topology(),
            None => Topology::from_fx_position(self.store.load(self.fx_position)),
        }
    }

    /// Connections of the active topology. Empty when not prepared.
    pub fn connections(&self) -> &[Connection] {
        match &self.graph {
            Some(graph) => graph.connections(),
            None => &[],
        }
    }

    /// Processing latency in sample frames.
    pub fn latency_samples(&self) -> usize {
        0
    }

    /// Number of sample frames which still may contain signal after the input went silent.
    pub fn tail_samples(&self) -> usize {
        self.graph
            .as_ref()
            .and_then(|graph| graph.tail_frames())
            .unwrap_or(0)
    }

    /// Process a stereo block in-place.
    ///
    /// The topology is updated from the `fxPosition` parameter once per call. Blocks larger than
    /// the prepared block size get processed in chunks.
    pub fn process(&mut self, block: &mut AudioBlock) {
        if block.is_empty() {
            return;
        }
        let Some(graph) = self.graph.as_mut() else {
            if !self.warned_unprepared {
                self.warned_unprepared = true;
                log::warn!("Processor is not prepared: passing audio through");
            }
            return;
        };

        let topology = Topology::from_fx_position(self.store.load(self.fx_position));
        if graph.switch_topology(topology) {
            log::debug!("Switched processor topology to {topology}");
        }

        if block.frame_count() > self.block_size && !self.warned_oversized {
            self.warned_oversized = true;
            log::warn!(
                "Block with {} frames exceeds the prepared block size {}: processing in chunks",
                block.frame_count(),
                self.block_size
            );
        }

        let block_size = self.block_size;
        self.process_guarded(block, |graph, block| {
            let frame_count = block.frame_count();
            let mut offset = 0;
            while offset < frame_count {
                let end = (offset + block_size).min(frame_count);
                graph.process(&mut block.sub_block(offset..end));
                offset = end;
            }
        });
    }

    /// Process an interleaved stereo buffer in-place. A trailing incomplete frame is ignored.
    pub fn process_interleaved(&mut self, interleaved: &mut [f32]) {
        if self.graph.is_none() {
            return;
        }
        let [mut left, mut right] = std::mem::take(&mut self.interleave_buffers);
        let frame_count = interleaved.len() / Self::CHANNEL_COUNT;
        let chunk_len = self.block_size * Self::CHANNEL_COUNT;
        for chunk in interleaved[..frame_count * Self::CHANNEL_COUNT].chunks_mut(chunk_len) {
            let frames = chunk.len() / Self::CHANNEL_COUNT;
            let (left_chunk, right_chunk) = (&mut left[..frames], &mut right[..frames]);
            interleaved_to_planar(chunk, left_chunk, right_chunk);
            if let Ok(mut block) = AudioBlock::new(left_chunk, right_chunk) {
                self.process(&mut block);
            }
            planar_to_interleaved(left_chunk, right_chunk, chunk);
        }
        self.interleave_buffers = [left, right];
    }

    fn process_guarded<F>(&mut self, block: &mut AudioBlock, process: F)
    where
        F: FnOnce(&mut Graph, &mut AudioBlock),
    {
        if self.panicked {
            block.fill(0.0);
            return;
        }
        let Some(graph) = self.graph.as_mut() else {
            return;
        };
        let result = if self.options.guard_panics {
            Self::assert_no_alloc(|| catch_unwind(AssertUnwindSafe(|| process(graph, block))))
        } else {
            Self::assert_no_alloc(|| process(graph, block));
            Ok(())
        };
        if let Err(payload) = result {
            log::error!(
                "Ouch. Processor panicked: {}. Output is muted until the next reset.",
                panic_message::panic_message(&payload)
            );
            self.panicked = true;
            block.fill(0.0);
        }
    }

    fn assert_no_alloc<T, F: FnOnce() -> T>(func: F) -> T {
        #[cfg(feature = "assert-allocs")]
        return assert_no_alloc::assert_no_alloc::<T, F>(func);

        #[cfg(not(feature = "assert-allocs"))]
        return func();
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{graph::NodeId, utils::dsp::filters::allpass::AllPassFilter};

    const SAMPLE_RATE: f64 = 44100.0;
    const BLOCK_SIZE: usize = 64;

    fn init_logger() {
        let _ = simple_logger::init_with_level(log::Level::Debug);
    }

    fn processor() -> Processor {
        init_logger();
        let mut processor = Processor::new().unwrap();
        processor.prepare(SAMPLE_RATE, BLOCK_SIZE).unwrap();
        processor
    }

    fn impulse(len: usize) -> Vec<f32> {
        let mut buffer = vec![0.0; len];
        buffer[0] = 1.0;
        buffer
    }

    fn process(processor: &mut Processor, left: &mut [f32], right: &mut [f32]) {
        processor.process(&mut AudioBlock::new(left, right).unwrap());
    }

    /// Impulse response of two cascaded all-passes at the highest cutoff.
    fn neutral_response(len: usize) -> Vec<f32> {
        let mut filters = [
            AllPassFilter::new(SAMPLE_RATE),
            AllPassFilter::new(SAMPLE_RATE),
        ];
        for filter in &mut filters {
            filter.set_cutoff(SAMPLE_RATE / 2.01);
        }
        impulse(len)
            .into_iter()
            .map(|sample| {
                let first = filters[0].process_sample(sample as f64);
                filters[1].process_sample(first) as f32
            })
            .collect()
    }

    #[test]
    fn options() {
        let options = ProcessorOptions::default();
        assert_eq!(options.panner_law, PannerLaw::Sin3dB);
        assert_eq!(options.fx_smoothing_divisor, 8);
        assert!(options.guard_panics);
        assert!(options.validate().is_ok());

        let options = options
            .panner_law(PannerLaw::Linear)
            .fx_smoothing_divisor(0)
            .guard_panics(false);
        assert_eq!(options.panner_law, PannerLaw::Linear);
        assert!(!options.guard_panics);
        assert!(matches!(options.validate(), Err(Error::ParameterError(_))));
        assert!(Processor::with_options(options).is_err());
    }

    #[test]
    fn store_must_declare_all_parameters() {
        let store = Arc::new(
            ParameterStore::new(params::parameter_layout().into_iter().skip(1).collect()).unwrap(),
        );
        assert_eq!(
            Processor::with_store(store, ProcessorOptions::default()).err(),
            Some(Error::ParameterNotFound(params::INPUT_GAIN.to_owned()))
        );
    }

    #[test]
    fn invalid_prepare() {
        init_logger();
        let mut processor = Processor::new().unwrap();
        assert_eq!(
            processor.prepare(0.0, BLOCK_SIZE),
            Err(Error::InvalidSampleRate(0.0))
        );
        assert!(processor.prepare(-44100.0, BLOCK_SIZE).is_err());
        assert!(processor.prepare(f64::NAN, BLOCK_SIZE).is_err());
        assert_eq!(
            processor.prepare(SAMPLE_RATE, 0),
            Err(Error::InvalidBlockSize(0))
        );
        assert!(!processor.is_prepared());
        assert!(processor.connections().is_empty());

        // unprepared processors pass audio through
        let (mut left, mut right) = ([0.5; 4], [0.25; 4]);
        process(&mut processor, &mut left, &mut right);
        assert_eq!((left, right), ([0.5; 4], [0.25; 4]));

        processor.prepare(SAMPLE_RATE, BLOCK_SIZE).unwrap();
        assert!(processor.is_prepared());

        // failed re-prepares leave the processor unprepared
        assert!(processor.prepare(SAMPLE_RATE, 0).is_err());
        assert!(!processor.is_prepared());
        assert_eq!(processor.block_size(), 0);
    }

    #[test]
    fn very_low_sample_rates() {
        init_logger();
        let mut processor = Processor::new().unwrap();
        processor.prepare(16.0, BLOCK_SIZE).unwrap();
        processor.parameters().set_value(params::ALL_PASS_FREQ, -0.7).unwrap();
        processor.parameters().set_value(params::DELAY_LINE, 0.3).unwrap();
        let (mut left, mut right) = (impulse(BLOCK_SIZE), impulse(BLOCK_SIZE));
        process(&mut processor, &mut left, &mut right);
        assert!(left.iter().chain(right.iter()).all(|sample| sample.is_finite()));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn block_sizes_beyond_ramp_range_are_rejected() {
        init_logger();
        let mut processor = Processor::new().unwrap();
        assert_eq!(
            processor.prepare(SAMPLE_RATE, usize::MAX),
            Err(Error::InvalidBlockSize(usize::MAX))
        );
        assert!(!processor.is_prepared());
    }

    #[test]
    fn neutral_settings() {
        let mut processor = processor();
        let (mut left, mut right) = (impulse(BLOCK_SIZE), impulse(BLOCK_SIZE));
        process(&mut processor, &mut left, &mut right);

        let expected = neutral_response(BLOCK_SIZE);
        for (index, expected) in expected.iter().enumerate() {
            assert!((left[index] - expected).abs() < 1e-6, "{index}");
            assert!((right[index] - expected).abs() < 1e-6, "{index}");
        }
        assert!(left[0] > 0.9);
    }

    #[test]
    fn left_to_right_cross_feed() {
        init_logger();
        let mut processor = Processor::new().unwrap();
        processor
            .parameters()
            .set_value(params::LEFT_TO_RIGHT_GAIN, 4.0)
            .unwrap();
        processor.prepare(SAMPLE_RATE, BLOCK_SIZE).unwrap();

        let (mut left, mut right) = (impulse(BLOCK_SIZE), vec![0.0; BLOCK_SIZE]);
        process(&mut processor, &mut left, &mut right);
        assert!(right[0] > 3.6);
        for (left, right) in left.iter().zip(&right) {
            assert_eq!(*right, *left * 4.0);
        }
    }

    #[test]
    fn topology_follows_fx_position() {
        let mut processor = processor();
        assert_eq!(processor.topology(), Topology::FxBeforeMixer);

        processor
            .parameters()
            .set_value(params::FX_POSITION, 0.5)
            .unwrap();
        // switches happen on the next processed block
        assert_eq!(processor.topology(), Topology::FxBeforeMixer);
        let (mut left, mut right) = (vec![0.0; 8], vec![0.0; 8]);
        process(&mut processor, &mut left, &mut right);
        assert_eq!(processor.topology(), Topology::FxAfterMixer);
        assert!(processor
            .connections()
            .contains(&Connection::new(NodeId::Mixer, NodeId::Fx, 0)));
    }

    #[test]
    fn topology_round_trip_on_passthrough() {
        let input: Vec<f32> = (0..BLOCK_SIZE * 3)
            .map(|i| (i as f32 * 0.1).sin())
            .collect();

        let mut reference = processor();
        reference
            .parameters()
            .set_value(params::FX_POSITION, 0.0)
            .unwrap();
        let mut switched = processor();
        switched
            .parameters()
            .set_value(params::FX_POSITION, 0.0)
            .unwrap();

        let mut reference_output = Vec::new();
        let mut switched_output = Vec::new();
        for (index, chunk) in input.chunks(BLOCK_SIZE).enumerate() {
            // post -> pre -> post
            let fx_position = if index == 1 { 1.0 } else { 0.0 };
            switched
                .parameters()
                .set_value(params::FX_POSITION, fx_position)
                .unwrap();

            let (mut left, mut right) = (chunk.to_vec(), chunk.to_vec());
            process(&mut reference, &mut left, &mut right);
            reference_output.extend(left);

            let (mut left, mut right) = (chunk.to_vec(), chunk.to_vec());
            process(&mut switched, &mut left, &mut right);
            assert_eq!(switched.topology(), Topology::from_fx_position(fx_position));
            switched_output.extend(left);
        }
        for (reference, switched) in reference_output.iter().zip(&switched_output) {
            assert!((reference - switched).abs() < 1e-6);
        }
    }

    #[test]
    fn reset_is_idempotent() {
        let mut processor = processor();
        let store = Arc::clone(processor.parameters());
        store.set_value(params::DELAY_LINE, -0.3).unwrap();
        store.set_value(params::ALL_PASS_FREQ, 0.6).unwrap();
        store.set_value(params::RIGHT_TO_LEFT_GAIN, 0.5).unwrap();

        processor.reset();
        let (mut first_left, mut first_right) = (impulse(BLOCK_SIZE), impulse(BLOCK_SIZE));
        process(&mut processor, &mut first_left, &mut first_right);

        processor.prepare(SAMPLE_RATE, BLOCK_SIZE).unwrap();
        let (mut second_left, mut second_right) = (impulse(BLOCK_SIZE), impulse(BLOCK_SIZE));
        process(&mut processor, &mut second_left, &mut second_right);

        assert_eq!(first_left, second_left);
        assert_eq!(first_right, second_right);
    }

    #[test]
    fn reprepare() {
        let mut processor = processor();
        assert_eq!(processor.tail_samples(), BLOCK_SIZE / 2);
        assert_eq!(processor.latency_samples(), 0);

        processor.prepare(SAMPLE_RATE, BLOCK_SIZE).unwrap();
        assert_eq!(processor.tail_samples(), BLOCK_SIZE / 2);

        processor.prepare(SAMPLE_RATE, BLOCK_SIZE * 2).unwrap();
        assert_eq!(processor.block_size(), BLOCK_SIZE * 2);
        assert_eq!(processor.tail_samples(), BLOCK_SIZE);

        processor.release();
        assert!(!processor.is_prepared());
        assert_eq!(processor.tail_samples(), 0);
    }

    #[test]
    fn oversized_blocks_are_chunked() {
        let input: Vec<f32> = (0..BLOCK_SIZE * 3 + 5)
            .map(|i| ((i * 7) % 13) as f32 / 13.0 - 0.5)
            .collect();

        let setup = |processor: &mut Processor| {
            let store = processor.parameters();
            store.set_value(params::DELAY_LINE, 0.8).unwrap();
            store.set_value(params::ALL_PASS_FREQ, -0.4).unwrap();
            store.set_value(params::INPUT_GAIN, 1.5).unwrap();
            processor.reset();
        };

        let mut chunked = processor();
        setup(&mut chunked);
        let (mut left, mut right) = (input.clone(), input.clone());
        process(&mut chunked, &mut left, &mut right);

        let mut blockwise = processor();
        setup(&mut blockwise);
        let (mut expected_left, mut expected_right) = (Vec::new(), Vec::new());
        for chunk in input.chunks(BLOCK_SIZE) {
            let (mut left, mut right) = (chunk.to_vec(), chunk.to_vec());
            process(&mut blockwise, &mut left, &mut right);
            expected_left.extend(left);
            expected_right.extend(right);
        }
        assert_eq!(left, expected_left);
        assert_eq!(right, expected_right);
    }

    #[test]
    fn interleaved_processing() {
        let input: Vec<f32> = (0..BLOCK_SIZE * 2).map(|i| (i as f32 * 0.05).cos()).collect();

        let mut planar = processor();
        planar
            .parameters()
            .set_value(params::LEFT_TO_RIGHT_GAIN, 0.5)
            .unwrap();
        planar.reset();
        let (mut left, mut right) = (input.clone(), vec![0.0; input.len()]);
        process(&mut planar, &mut left, &mut right);

        let mut interleaved = processor();
        interleaved
            .parameters()
            .set_value(params::LEFT_TO_RIGHT_GAIN, 0.5)
            .unwrap();
        interleaved.reset();
        let mut buffer = vec![0.0; input.len() * 2];
        for (frame, sample) in buffer.chunks_exact_mut(2).zip(&input) {
            frame[0] = *sample;
        }
        interleaved.process_interleaved(&mut buffer);

        for (index, frame) in buffer.chunks_exact(2).enumerate() {
            assert_eq!(frame[0], left[index]);
            assert_eq!(frame[1], right[index]);
        }
    }

    #[test]
    fn panics_mute_until_reset() {
        let mut processor = processor();
        let (mut left, mut right) = ([1.0; 4], [1.0; 4]);
        processor.process_guarded(
            &mut AudioBlock::new(&mut left, &mut right).unwrap(),
            |_, _| panic!("stage failure"),
        );
        assert_eq!((left, right), ([0.0; 4], [0.0; 4]));

        let (mut left, mut right) = ([1.0; 4], [1.0; 4]);
        process(&mut processor, &mut left, &mut right);
        assert_eq!((left, right), ([0.0; 4], [0.0; 4]));

        processor.reset();
        let (mut left, mut right) = ([1.0; 4], [1.0; 4]);
        process(&mut processor, &mut left, &mut right);
        assert!(left.iter().any(|s| *s != 0.0));
    }
}
