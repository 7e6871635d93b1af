use std::fmt::{Debug, Display};

// -------------------------------------------------------------------------------------------------

/// Provides smooth transitions between a current and target f32 value.
/// Smoothing usually needs to be applied to avoid clicks in e.g. volume or other DSP parameter changes.
pub trait SmoothedValue: Debug {
    /// Access to the current, possibly ramped value.
    #[must_use]
    fn current(&self) -> f32;
    /// Access to the target value.
    #[must_use]
    fn target(&self) -> f32;

    /// Ramp, if needed, and get the current ramped value, else returns the target value.
    #[must_use]
    fn next(&mut self) -> f32 {
        if self.need_ramp() {
            self.ramp();
            self.current()
        } else {
            self.target()
        }
    }

    /// Test if ramping is necessary. When ramping is not necessary, parameter changes
    /// may be applied in blocks without calling `next` or `ramp`, which usually is faster.
    #[must_use]
    fn need_ramp(&self) -> bool;
    /// Move current to target value, when ramping is necessary, else does nothing.
    fn ramp(&mut self);

    /// Set current and target to the same value.
    fn init(&mut self, amount: f32);
    /// Set a new target value and ramp current, when current is different from the target.
    fn set_target(&mut self, target: f32);
}

impl Display for dyn SmoothedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.need_ramp() {
            f.write_fmt(format_args!("{}(->{})", self.current(), self.target()))
        } else {
            f.write_fmt(format_args!("{}", self.target()))
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// Linear smoothed value, which ramps linearly towards a new target in a fixed number of steps.
///
/// Every call to [`SmoothedValue::set_target`] with a new target starts a new ramp of exactly
/// `ramp_length` steps from the current value, so the value never moves by more than
/// `|target - current| / ramp_length` per step. A ramp length of 0 disables smoothing.
#[derive(Debug, Clone)]
pub struct LinearSmoothedValue {
    current: f32,
    target: f32,
    step: f32,
    ramp_length: u32,
    num_pending_steps: u32,
}

impl LinearSmoothedValue {
    pub const fn new(value: f32, ramp_length: u32) -> Self {
        LinearSmoothedValue {
            current: value,
            target: value,
            step: 0.0,
            ramp_length,
            num_pending_steps: 0,
        }
    }

    /// Number of steps a new ramp takes to reach its target.
    #[inline(always)]
    pub fn ramp_length(&self) -> u32 {
        self.ramp_length
    }

    /// Set a new ramp length and jump to the current target.
    pub fn set_ramp_length(&mut self, ramp_length: u32) {
        self.ramp_length = ramp_length;
        self.reset();
    }

    /// Current step size of a pending ramp. 0.0 when not ramping.
    #[inline(always)]
    pub fn step(&self) -> f32 {
        if self.num_pending_steps > 0 {
            self.step
        } else {
            0.0
        }
    }

    /// Skip any pending ramp and jump to the target value.
    pub fn reset(&mut self) {
        self.init(self.target);
    }
}

impl SmoothedValue for LinearSmoothedValue {
    #[inline(always)]
    fn current(&self) -> f32 {
        self.current
    }

    #[inline(always)]
    fn target(&self) -> f32 {
        self.target
    }

    #[inline(always)]
    fn need_ramp(&self) -> bool {
        self.num_pending_steps > 0
    }

    fn ramp(&mut self) {
        if self.num_pending_steps > 0 {
            self.num_pending_steps -= 1;
            if self.num_pending_steps == 0 {
                self.current = self.target;
            } else {
                self.current += self.step;
            }
        }
    }

    fn init(&mut self, amount: f32) {
        self.target = amount;
        self.current = amount;
        self.num_pending_steps = 0;
    }

    fn set_target(&mut self, target: f32) {
        if target == self.target {
            return;
        }
        if self.ramp_length == 0 {
            self.init(target);
            return;
        }
        self.target = target;
        self.num_pending_steps = self.ramp_length;
        self.step = (self.target - self.current) / self.ramp_length as f32;
    }
}

impl Default for LinearSmoothedValue {
    fn default() -> Self {
        Self::new(0.0, 0)
    }
}

impl From<f32> for LinearSmoothedValue {
    fn from(value: f32) -> Self {
        Self::new(value, 0)
    }
}

// -------------------------------------------------------------------------------------------------
