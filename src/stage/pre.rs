use std::sync::Arc;

use crate::{
    params,
    utils::{
        buffer::{scale_buffer, AudioBlock},
        panning::PannerLaw,
    },
    Error, ParameterStore, SmoothedParameterValue, Stage,
};

// -------------------------------------------------------------------------------------------------

/// Input conditioning stage: applies a linear gain to both channels, then pans the signal with
/// the configured [`PannerLaw`]. Gain and pan changes are ramped over one block.
pub struct PreStage {
    store: Arc<ParameterStore>,
    panner_law: PannerLaw,
    gain: SmoothedParameterValue,
    pan: SmoothedParameterValue,
}

impl PreStage {
    pub const STAGE_NAME: &str = "Pre";

    const PARAMETER_IDS: &[&str] = &[params::INPUT_GAIN, params::INPUT_PAN];

    /// Creates a new pre stage, reading its parameters from the given store.
    pub fn new(store: Arc<ParameterStore>, panner_law: PannerLaw) -> Result<Self, Error> {
        let gain = SmoothedParameterValue::new(&store, params::INPUT_GAIN)?;
        let pan = SmoothedParameterValue::new(&store, params::INPUT_PAN)?;
        Ok(Self {
            store,
            panner_law,
            gain,
            pan,
        })
    }

    /// The applied panner law.
    pub fn panner_law(&self) -> PannerLaw {
        self.panner_law
    }

    fn apply_panning(&mut self, block: &mut AudioBlock) {
        if self.pan.value_need_ramp() {
            let panner_law = self.panner_law;
            let pan = &mut self.pan;
            for (left, right) in block.frames_mut() {
                let (pan_l, pan_r) = panner_law.factors(pan.next_value());
                *left *= pan_l;
                *right *= pan_r;
            }
        } else {
            let (pan_l, pan_r) = self.panner_law.factors(self.pan.target_value());
            if (1.0 - pan_l).abs() > 0.000001 || (1.0 - pan_r).abs() > 0.000001 {
                let (left, right) = block.channels_mut();
                scale_buffer(left, pan_l);
                scale_buffer(right, pan_r);
            }
        }
    }
}

impl Stage for PreStage {
    fn name(&self) -> &'static str {
        Self::STAGE_NAME
    }

    fn parameter_ids(&self) -> &'static [&'static str] {
        Self::PARAMETER_IDS
    }

    fn prepare(&mut self, _sample_rate: f64, block_size: usize) -> Result<(), Error> {
        let ramp_length =
            u32::try_from(block_size).map_err(|_| Error::InvalidBlockSize(block_size))?;
        self.gain.smoother_mut().set_ramp_length(ramp_length);
        self.pan.smoother_mut().set_ramp_length(ramp_length);
        self.reset();
        Ok(())
    }

    fn process(&mut self, block: &mut AudioBlock) {
        self.gain.update(&self.store);
        self.pan.update(&self.store);

        // gain: the same ramp applies to both channels
        if self.gain.value_need_ramp() {
            let smoothed_gain = &mut self.gain;
            for (left, right) in block.frames_mut() {
                let gain = smoothed_gain.next_value();
                *left *= gain;
                *right *= gain;
            }
        } else {
            let gain = self.gain.target_value();
            if (1.0 - gain).abs() > 0.000001 {
                let (left, right) = block.channels_mut();
                scale_buffer(left, gain);
                scale_buffer(right, gain);
            }
        }

        self.apply_panning(block);
    }

    fn reset(&mut self) {
        self.gain.init(&self.store);
        self.pan.init(&self.store);
    }

    fn tail_frames(&self) -> Option<usize> {
        Some(0)
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(panner_law: PannerLaw) -> (Arc<ParameterStore>, PreStage) {
        let store = Arc::new(ParameterStore::new(params::parameter_layout()).unwrap());
        let mut stage = PreStage::new(Arc::clone(&store), panner_law).unwrap();
        stage.prepare(44100.0, 4).unwrap();
        (store, stage)
    }

    fn process(stage: &mut PreStage, left: &mut [f32], right: &mut [f32]) {
        let mut block = AudioBlock::new(left, right).unwrap();
        stage.process(&mut block);
    }

    #[test]
    fn neutral_settings_pass_through() {
        let (_store, mut stage) = stage(PannerLaw::default());
        let (mut left, mut right) = ([0.5, -0.5, 1.0, 0.0], [0.1, 0.2, 0.3, 0.4]);
        process(&mut stage, &mut left, &mut right);
        assert_eq!(left, [0.5, -0.5, 1.0, 0.0]);
        assert_eq!(right, [0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn gain_is_ramped_over_one_block() {
        let (store, mut stage) = stage(PannerLaw::default());
        store.set_value(params::INPUT_GAIN, 2.0).unwrap();
        let (mut left, mut right) = ([1.0; 4], [1.0; 4]);
        process(&mut stage, &mut left, &mut right);
        assert_eq!(left, [1.25, 1.5, 1.75, 2.0]);
        assert_eq!(right, [1.25, 1.5, 1.75, 2.0]);

        let (mut left, mut right) = ([1.0; 4], [1.0; 4]);
        process(&mut stage, &mut left, &mut right);
        assert_eq!(left, [2.0; 4]);
        assert_eq!(right, [2.0; 4]);
    }

    #[test]
    fn panning() {
        let (store, mut stage) = stage(PannerLaw::Balanced);
        store.set_value(params::INPUT_PAN, 1.0).unwrap();
        stage.reset();
        let (mut left, mut right) = ([1.0; 4], [1.0; 4]);
        process(&mut stage, &mut left, &mut right);
        assert_eq!(left, [0.0; 4]);
        assert_eq!(right, [1.0; 4]);
    }

    #[test]
    fn panning_is_ramped() {
        let (store, mut stage) = stage(PannerLaw::Linear);
        store.set_value(params::INPUT_PAN, -1.0).unwrap();
        let (mut left, mut right) = ([1.0; 4], [1.0; 4]);
        process(&mut stage, &mut left, &mut right);
        // linear law: left = 1 - pan, right = 1 + pan
        assert_eq!(left, [1.25, 1.5, 1.75, 2.0]);
        assert_eq!(right, [0.75, 0.5, 0.25, 0.0]);
    }
}
