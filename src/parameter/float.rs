use std::{fmt::Display, ops::RangeInclusive};

use super::ParameterScaling;

// -------------------------------------------------------------------------------------------------

/// A continuous (float) parameter descriptor.
///
/// Descriptors are immutable after declaration. The actual value lives in a
/// [`ParameterStore`](super::ParameterStore).
#[derive(Debug, Clone, PartialEq)]
pub struct FloatParameter {
    id: &'static str,
    name: &'static str,
    range: RangeInclusive<f32>,
    default: f32,
    step: f32,
    unit: &'static str,
    scaling: ParameterScaling,
}

impl FloatParameter {
    /// Create a new float parameter descriptor.
    pub const fn new(
        id: &'static str,
        name: &'static str,
        range: RangeInclusive<f32>,
        default: f32,
    ) -> Self {
        assert!(
            *range.start() < *range.end(),
            "Invalid parameter value range"
        );
        assert!(
            default >= *range.start() && default <= *range.end(),
            "Invalid parameter default value"
        );
        Self {
            id,
            name,
            range,
            default,
            step: 0.0,
            unit: "",
            scaling: ParameterScaling::Linear,
        }
    }

    /// Optional unit for string displays.
    pub const fn with_unit(mut self, unit: &'static str) -> Self {
        self.unit = unit;
        self
    }

    /// Optional step interval: normalized values get snapped to multiples of this interval,
    /// starting from the range's start. 0.0 means continuous.
    pub const fn with_step(mut self, step: f32) -> Self {
        assert!(step >= 0.0, "Invalid parameter step size");
        self.step = step;
        self
    }

    /// Optional value curve, applied when converting from and to normalized values.
    pub const fn with_scaling(mut self, scaling: ParameterScaling) -> Self {
        scaling.validate();
        self.scaling = scaling;
        self
    }

    /// The parameter's unique identifier.
    pub const fn id(&self) -> &'static str {
        self.id
    }

    /// The parameter's display name.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The parameter's unit, if any.
    pub const fn unit(&self) -> &'static str {
        self.unit
    }

    /// The parameter's value range.
    pub fn range(&self) -> &RangeInclusive<f32> {
        &self.range
    }

    /// The parameter's default value.
    pub const fn default_value(&self) -> f32 {
        self.default
    }

    /// The parameter's step interval. 0.0 for continuous parameters.
    pub const fn step(&self) -> f32 {
        self.step
    }

    /// The parameter's value curve.
    pub const fn scaling(&self) -> ParameterScaling {
        self.scaling
    }

    /// Clamp the given plain value to the parameter's range.
    pub fn clamp_value(&self, value: f32) -> f32 {
        value.clamp(*self.range.start(), *self.range.end())
    }

    /// Snap the given plain value to the parameter's step interval and range.
    pub fn snap_value(&self, value: f32) -> f32 {
        if self.step > 0.0 {
            let start = *self.range.start();
            self.clamp_value(start + ((value - start) / self.step).round() * self.step)
        } else {
            self.clamp_value(value)
        }
    }

    /// Normalize the given plain value to a 0.0-1.0 range, applying the value curve.
    pub fn normalize_value(&self, value: f32) -> f32 {
        let (start, end) = (*self.range.start(), *self.range.end());
        let proportion = ((value - start) / (end - start)).clamp(0.0, 1.0);
        self.scaling.unscale(proportion)
    }

    /// Denormalize a 0.0-1.0 ranged value to the corresponding, snapped plain value.
    pub fn denormalize_value(&self, normalized: f32) -> f32 {
        assert!((0.0..=1.0).contains(&normalized));
        let (start, end) = (*self.range.start(), *self.range.end());
        self.snap_value(start + self.scaling.scale(normalized) * (end - start))
    }

    /// Convert the given plain value to a string.
    pub fn value_to_string(&self, value: f32, include_unit: bool) -> String {
        if include_unit && !self.unit.is_empty() {
            format!("{:.2} {}", value, self.unit)
        } else {
            format!("{:.2}", value)
        }
    }

    /// Convert the given string to a clamped plain value.
    pub fn string_to_value(&self, string: &str) -> Option<f32> {
        let value = string
            .trim()
            .trim_end_matches(self.unit)
            .trim()
            .parse::<f32>()
            .ok()?;
        Some(self.clamp_value(value))
    }
}

impl Display for FloatParameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ('{}') {:?} default {}",
            self.name, self.id, self.range, self.default
        )
    }
}

// -------------------------------------------------------------------------------------------------
