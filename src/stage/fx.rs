use std::sync::Arc;

use crate::{
    params,
    utils::{
        buffer::AudioBlock,
        dsp::{delay::DelayLine, filters::allpass::AllPassFilter},
    },
    Error, ParameterStore, SmoothedParameterValue, Stage,
};

// -------------------------------------------------------------------------------------------------

/// Channel an [`FxUnit`] is processing.
///
/// The fx parameters are bidirectional: the negative half of their range drives the left unit,
/// the positive half the right one. Turning a knob away from the center thus only affects one
/// side of the stereo field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ChannelRole {
    Left,
    Right,
}

/// Active parameter half-range per channel role.
struct RoleMapping {
    min: f32,
    max: f32,
}

const ROLE_MAPPINGS: [RoleMapping; 2] = [
    RoleMapping { min: -1.0, max: 0.0 },
    RoleMapping { min: 0.0, max: 1.0 },
];

impl ChannelRole {
    /// Channel index in a stereo block.
    pub const fn index(self) -> usize {
        match self {
            ChannelRole::Left => 0,
            ChannelRole::Right => 1,
        }
    }

    /// The half of the bidirectional parameter range this role responds to.
    pub fn active_range(self) -> (f32, f32) {
        let mapping = &ROLE_MAPPINGS[self.index()];
        (mapping.min, mapping.max)
    }

    /// Amount of the given bidirectional parameter value in range \[0, 1\] for this role.
    #[inline]
    pub fn amount(self, value: f32) -> f32 {
        let (min, max) = self.active_range();
        value.clamp(min, max).abs()
    }

    /// Maps a `delayLine` parameter value to a delay time in samples.
    #[inline]
    pub fn delay_in_samples(self, value: f32, max_delay_in_samples: usize) -> f32 {
        self.amount(value) * max_delay_in_samples as f32
    }

    /// Maps an `allPassFreq` parameter value to an all-pass cutoff frequency in Hz, using a
    /// logarithmic frequency scale: 0 is the Nyquist frequency, a full amount 1 Hz. The
    /// result is clamped to `10..=sample_rate/2.01` Hz. At sample rates below 20.1 Hz the upper
    /// bound wins.
    #[inline]
    pub fn cutoff_frequency(self, value: f32, sample_rate: f64) -> f64 {
        let log_nyquist = (sample_rate / 2.0).log10();
        let exponent = (1.0 - self.amount(value) as f64) * log_nyquist;
        10.0_f64
            .powf(exponent)
            .max(FxUnit::MIN_CUTOFF)
            .min(sample_rate / FxUnit::NYQUIST_DIVISOR)
    }
}

// -------------------------------------------------------------------------------------------------

/// Mono fx chain for one channel: a modulated delay line followed by two cascaded first order
/// all-pass filters, which both receive the same cutoff.
///
/// Parameters are smoothed per sample with a linear ramp, so every output sample uses a freshly
/// interpolated delay time and cutoff.
#[derive(Debug)]
pub struct FxUnit {
    role: ChannelRole,
    sample_rate: f64,
    max_delay_in_samples: usize,
    delay: SmoothedParameterValue,
    filter: SmoothedParameterValue,
    delay_line: DelayLine,
    all_passes: [AllPassFilter; 2],
}

impl FxUnit {
    /// Lowest applied all-pass cutoff in Hz.
    pub const MIN_CUTOFF: f64 = 10.0;
    /// Highest applied all-pass cutoff is `sample_rate / NYQUIST_DIVISOR`.
    pub const NYQUIST_DIVISOR: f64 = 2.01;

    /// Creates a new unit for the given channel role.
    pub fn new(role: ChannelRole, store: &ParameterStore) -> Result<Self, Error> {
        Ok(Self {
            role,
            sample_rate: 44100.0,
            max_delay_in_samples: 0,
            delay: SmoothedParameterValue::new(store, params::DELAY_LINE)?,
            filter: SmoothedParameterValue::new(store, params::ALL_PASS_FREQ)?,
            delay_line: DelayLine::new(0),
            all_passes: [AllPassFilter::new(44100.0), AllPassFilter::new(44100.0)],
        })
    }

    pub fn role(&self) -> ChannelRole {
        self.role
    }

    /// Max delay time: half of the prepared block size.
    pub fn max_delay_in_samples(&self) -> usize {
        self.max_delay_in_samples
    }

    /// Currently applied delay time in samples.
    pub fn delay_in_samples(&self) -> f32 {
        self.delay_line.delay()
    }

    /// Currently applied all-pass cutoff in Hz.
    pub fn cutoff_frequency(&self) -> f64 {
        self.all_passes[0].cutoff()
    }

    /// Allocates the delay line and filters. Parameter ramps take `ramp_length` samples.
    pub fn prepare(
        &mut self,
        sample_rate: f64,
        block_size: usize,
        ramp_length: u32,
        store: &ParameterStore,
    ) {
        self.sample_rate = sample_rate;
        self.max_delay_in_samples = block_size / 2;
        self.delay_line = DelayLine::new(self.max_delay_in_samples);
        self.all_passes = [
            AllPassFilter::new(sample_rate),
            AllPassFilter::new(sample_rate),
        ];
        self.delay.smoother_mut().set_ramp_length(ramp_length);
        self.filter.smoother_mut().set_ramp_length(ramp_length);
        self.reset(store);
    }

    /// Clears delay and filter memory and jumps to the store's current parameter values.
    pub fn reset(&mut self, store: &ParameterStore) {
        self.delay.init(store);
        self.filter.init(store);
        self.apply_parameters(self.delay.current_value(), self.filter.current_value());
        self.delay_line.flush();
        for all_pass in &mut self.all_passes {
            all_pass.reset();
        }
    }

    /// Processes a mono channel buffer in-place.
    pub fn process(&mut self, samples: &mut [f32], store: &ParameterStore) {
        self.delay.update(store);
        self.filter.update(store);

        if self.delay.value_need_ramp() || self.filter.value_need_ramp() {
            for sample in samples.iter_mut() {
                let delay = self.delay.next_value();
                let filter = self.filter.next_value();
                self.apply_parameters(delay, filter);
                *sample = self.process_sample(*sample);
            }
        } else {
            self.apply_parameters(self.delay.target_value(), self.filter.target_value());
            for sample in samples.iter_mut() {
                *sample = self.process_sample(*sample);
            }
        }
    }

    #[inline]
    fn apply_parameters(&mut self, delay: f32, filter: f32) {
        self.delay_line
            .set_delay(self.role.delay_in_samples(delay, self.max_delay_in_samples));
        let cutoff = self.role.cutoff_frequency(filter, self.sample_rate);
        for all_pass in &mut self.all_passes {
            all_pass.set_cutoff(cutoff);
        }
    }

    #[inline]
    fn process_sample(&mut self, input: f32) -> f32 {
        let delayed = self.delay_line.process_sample(input) as f64;
        let [first, second] = &mut self.all_passes;
        second.process_sample(first.process_sample(delayed)) as f32
    }
}

// -------------------------------------------------------------------------------------------------

/// Stereo fx stage: runs a [`FxUnit`] with [`ChannelRole::Left`] on the left and one with
/// [`ChannelRole::Right`] on the right channel.
pub struct FxStage {
    store: Arc<ParameterStore>,
    smoothing_divisor: usize,
    units: [FxUnit; 2],
}

impl FxStage {
    pub const STAGE_NAME: &str = "Fx";

    /// Default divisor of the block size, which gives the parameter ramp length.
    pub const DEFAULT_SMOOTHING_DIVISOR: usize = 8;

    const PARAMETER_IDS: &[&str] = &[params::DELAY_LINE, params::ALL_PASS_FREQ];

    /// Creates a new fx stage. Parameter ramps will take `block_size / smoothing_divisor` samples.
    pub fn new(store: Arc<ParameterStore>, smoothing_divisor: usize) -> Result<Self, Error> {
        if smoothing_divisor == 0 {
            return Err(Error::ParameterError(
                "fx smoothing divisor must be > 0".to_owned(),
            ));
        }
        let units = [
            FxUnit::new(ChannelRole::Left, &store)?,
            FxUnit::new(ChannelRole::Right, &store)?,
        ];
        Ok(Self {
            store,
            smoothing_divisor,
            units,
        })
    }

    /// Access to the unit of the given channel.
    pub fn unit(&self, role: ChannelRole) -> &FxUnit {
        &self.units[role.index()]
    }
}

impl Stage for FxStage {
    fn name(&self) -> &'static str {
        Self::STAGE_NAME
    }

    fn parameter_ids(&self) -> &'static [&'static str] {
        Self::PARAMETER_IDS
    }

    fn prepare(&mut self, sample_rate: f64, block_size: usize) -> Result<(), Error> {
        let ramp_length = u32::try_from(block_size / self.smoothing_divisor)
            .map_err(|_| Error::InvalidBlockSize(block_size))?;
        for unit in &mut self.units {
            unit.prepare(sample_rate, block_size, ramp_length, &self.store);
        }
        Ok(())
    }

    fn process(&mut self, block: &mut AudioBlock) {
        let (left, right) = block.channels_mut();
        let [left_unit, right_unit] = &mut self.units;
        left_unit.process(left, &self.store);
        right_unit.process(right, &self.store);
    }

    fn reset(&mut self) {
        for unit in &mut self.units {
            unit.reset(&self.store);
        }
    }

    fn tail_frames(&self) -> Option<usize> {
        // delay line length only, without the all-pass ringing
        self.units
            .iter()
            .map(FxUnit::max_delay_in_samples)
            .max()
    }
}

// -------------------------------------------------------------------------------------------------
