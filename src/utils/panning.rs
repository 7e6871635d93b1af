//! Stereo panning laws.

use std::f32::consts::{FRAC_PI_2, SQRT_2};

// -------------------------------------------------------------------------------------------------

/// Panner law, defining how energy gets redistributed between the left and right channel.
///
/// All laws are normalized so that a centered pan (0.0) leaves both channels untouched.
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, strum::Display, strum::EnumString, strum::VariantNames,
)]
pub enum PannerLaw {
    /// Linear crossfade: +6 dB on the fully panned side.
    Linear,
    /// Only attenuates the opposite side, keeping the panned side at unity.
    Balanced,
    /// Constant power sine law: -3 dB at the center before normalization.
    #[default]
    Sin3dB,
    /// Sine law with -4.5 dB at the center.
    Sin4p5dB,
    /// Sine squared law with -6 dB at the center.
    Sin6dB,
    /// Square root law with -3 dB at the center.
    SquareRoot3dB,
    /// Square root law with -4.5 dB at the center.
    SquareRoot4p5dB,
}

impl PannerLaw {
    /// Left and right channel gain factors for the given pan position in range \[-1, 1\].
    pub fn factors(self, pan: f32) -> (f32, f32) {
        let normalized = 0.5 * (pan.clamp(-1.0, 1.0) + 1.0);
        // 2^(3/4): compensation for the -4.5 dB laws
        const BOOST_4P5DB: f32 = 1.681_792_8;
        let (left, right, boost) = match self {
            PannerLaw::Linear => (1.0 - normalized, normalized, 2.0),
            PannerLaw::Balanced => ((1.0 - normalized).min(0.5), normalized.min(0.5), 2.0),
            PannerLaw::Sin3dB => (
                (FRAC_PI_2 * (1.0 - normalized)).sin(),
                (FRAC_PI_2 * normalized).sin(),
                SQRT_2,
            ),
            PannerLaw::Sin4p5dB => (
                (FRAC_PI_2 * (1.0 - normalized)).sin().powf(1.5),
                (FRAC_PI_2 * normalized).sin().powf(1.5),
                BOOST_4P5DB,
            ),
            PannerLaw::Sin6dB => (
                (FRAC_PI_2 * (1.0 - normalized)).sin().powi(2),
                (FRAC_PI_2 * normalized).sin().powi(2),
                2.0,
            ),
            PannerLaw::SquareRoot3dB => ((1.0 - normalized).sqrt(), normalized.sqrt(), SQRT_2),
            PannerLaw::SquareRoot4p5dB => (
                (1.0 - normalized).sqrt().powf(1.5),
                normalized.sqrt().powf(1.5),
                BOOST_4P5DB,
            ),
        };
        (left * boost, right * boost)
    }
}

// -------------------------------------------------------------------------------------------------
