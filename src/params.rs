//! The processor's parameter set.

use crate::{FloatParameter, ParameterScaling};

// -------------------------------------------------------------------------------------------------

/// Linear input gain, applied before panning.
pub const INPUT_GAIN: &str = "inputGain";
/// Input pan position, -1 is hard left, 1 hard right.
pub const INPUT_PAN: &str = "inputPan";
/// Left to left gain of the mixing matrix.
pub const LEFT_PRE_GAIN: &str = "leftPreGain";
/// Right to right gain of the mixing matrix.
pub const RIGHT_PRE_GAIN: &str = "rightPreGain";
/// Left to right cross-feed gain of the mixing matrix.
pub const LEFT_TO_RIGHT_GAIN: &str = "leftToRightGain";
/// Right to left cross-feed gain of the mixing matrix.
pub const RIGHT_TO_LEFT_GAIN: &str = "rightToLeftGain";
/// Routing position of the fx units: > 0.5 is before the mixer ("pre"), else after it ("post").
pub const FX_POSITION: &str = "fxPosition";
/// Bidirectional delay amount: negative values delay the left, positive ones the right channel.
pub const DELAY_LINE: &str = "delayLine";
/// Bidirectional all-pass amount: negative values shift the left, positive ones the right channel.
pub const ALL_PASS_FREQ: &str = "allPassFreq";

// -------------------------------------------------------------------------------------------------

/// Value curve of the mixing matrix gains: fine control around the center of the range.
pub const MIXER_SCALING: ParameterScaling = ParameterScaling::Skewed {
    factor: 0.5,
    symmetric: true,
};

/// Threshold above which the fx position parameter selects the "pre" routing.
pub const FX_POSITION_THRESHOLD: f32 = 0.5;

// -------------------------------------------------------------------------------------------------

/// Declares all parameters of the processor, in the order hosts should present them.
pub fn parameter_layout() -> Vec<FloatParameter> {
    let mixer_gain = |id, name, default| {
        FloatParameter::new(id, name, -4.0..=4.0, default)
            .with_step(0.01)
            .with_scaling(MIXER_SCALING)
    };
    vec![
        FloatParameter::new(INPUT_GAIN, "Input Gain", 0.0..=2.0, 1.0).with_step(0.01),
        FloatParameter::new(INPUT_PAN, "Input Pan", -1.0..=1.0, 0.0).with_step(0.01),
        mixer_gain(LEFT_PRE_GAIN, "Left Pre Gain", 1.0),
        mixer_gain(RIGHT_PRE_GAIN, "Right Pre Gain", 1.0),
        mixer_gain(LEFT_TO_RIGHT_GAIN, "Left-to-Right Gain", 0.0),
        mixer_gain(RIGHT_TO_LEFT_GAIN, "Right-to-Left Gain", 0.0),
        FloatParameter::new(FX_POSITION, "FX Position", 0.0..=1.0, 1.0),
        FloatParameter::new(DELAY_LINE, "Delay", -1.0..=1.0, 0.0),
        FloatParameter::new(ALL_PASS_FREQ, "All-Pass Filter", -1.0..=1.0, 0.0),
    ]
}

// -------------------------------------------------------------------------------------------------
