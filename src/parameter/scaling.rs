use std::fmt::Debug;

// -------------------------------------------------------------------------------------------------

/// Parameter value curve for float parameters, applied to convert normalized UI or automation
/// values to the internal, plain values.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub enum ParameterScaling {
    #[default]
    /// Linear scaling: `y = x` (no transformation applied)
    Linear,

    /// Skewed scaling: `y = x^(1/factor)`.
    /// Factor must be > 0.0.
    ///
    /// Factors < 1.0 give finer control at the start of the range, factors > 1.0 at the end.
    ///
    /// When `symmetric` is set, the skew is mirrored around the center of the range instead:
    /// the distance from the center `d = 2x - 1` is skewed as `sign(d) * |d|^(1/factor)`, which
    /// concentrates resolution around the range's midpoint for factors < 1.0.
    Skewed { factor: f32, symmetric: bool },
}

impl ParameterScaling {
    /// Apply scaling to a normalized f32 value.
    pub fn scale(&self, value: f32) -> f32 {
        assert!(
            (0.0..=1.0).contains(&value),
            "Expecting a normalized value here"
        );
        match self {
            ParameterScaling::Linear => value,
            ParameterScaling::Skewed { factor, symmetric } => {
                if *symmetric {
                    let distance = 2.0 * value - 1.0;
                    let skewed = distance.abs().powf(1.0 / factor).copysign(distance);
                    (1.0 + skewed) / 2.0
                } else {
                    value.powf(1.0 / factor)
                }
            }
        }
    }

    /// Apply inverse scaling to a normalized f32 value.
    pub fn unscale(&self, value: f32) -> f32 {
        assert!(
            (0.0..=1.0).contains(&value),
            "Expecting a normalized value here"
        );
        match self {
            ParameterScaling::Linear => value,
            ParameterScaling::Skewed { factor, symmetric } => {
                if *symmetric {
                    let distance = 2.0 * value - 1.0;
                    let unskewed = distance.abs().powf(*factor).copysign(distance);
                    (1.0 + unskewed) / 2.0
                } else {
                    value.powf(*factor)
                }
            }
        }
    }

    pub(crate) const fn validate(&self) {
        match self {
            ParameterScaling::Linear => {}
            ParameterScaling::Skewed { factor, .. } => {
                assert!(
                    *factor > 0.0,
                    "Invalid skewed parameter scaling factor (must be > 0)"
                );
            }
        }
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_is_identity() {
        for value in [0.0, 0.25, 0.5, 1.0] {
            assert_eq!(ParameterScaling::Linear.scale(value), value);
            assert_eq!(ParameterScaling::Linear.unscale(value), value);
        }
    }

    #[test]
    fn symmetric_skew_keeps_center_and_ends() {
        let scaling = ParameterScaling::Skewed {
            factor: 0.5,
            symmetric: true,
        };
        assert_eq!(scaling.scale(0.0), 0.0);
        assert_eq!(scaling.scale(0.5), 0.5);
        assert_eq!(scaling.scale(1.0), 1.0);
        // resolution is concentrated around the center
        assert!((scaling.scale(0.75) - 0.625).abs() < 1e-6);
        assert!((scaling.scale(0.25) - 0.375).abs() < 1e-6);
        for value in [0.1, 0.3, 0.6, 0.9] {
            assert!((scaling.unscale(scaling.scale(value)) - value).abs() < 1e-5);
        }
    }

    #[test]
    fn asymmetric_skew() {
        let scaling = ParameterScaling::Skewed {
            factor: 0.5,
            symmetric: false,
        };
        assert!((scaling.scale(0.5) - 0.25).abs() < 1e-6);
        assert!((scaling.unscale(0.25) - 0.5).abs() < 1e-6);
    }
}
