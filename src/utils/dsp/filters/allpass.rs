//! First order all-pass filter.

use std::f64::consts::PI;

// -------------------------------------------------------------------------------------------------

/// First order all-pass filter, using the topology-preserving transform (TPT) structure.
///
/// Passes all frequencies at unity gain and shifts their phase by 0 to -180 degrees, with -90
/// degrees at the cutoff frequency. The TPT structure stays stable under per-sample modulation
/// of the cutoff.
/// `v = G * (x - s); y = v + s; s = y + v; out = 2 * y - x`
#[derive(Debug, Clone)]
pub struct AllPassFilter {
    sample_rate: f64,
    cutoff: f64,
    g: f64,
    s: f64, // integrator state
}

impl AllPassFilter {
    /// Create a new filter with the given sample rate, with the cutoff at the Nyquist limit.
    pub fn new(sample_rate: f64) -> Self {
        debug_assert!(sample_rate > 0.0, "Invalid sample rate");
        let mut filter = Self {
            sample_rate,
            cutoff: 0.0,
            g: 0.0,
            s: 0.0,
        };
        filter.set_cutoff(sample_rate / 2.0);
        filter
    }

    /// Currently applied cutoff frequency in Hz.
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Set a new cutoff frequency in Hz. Gets clamped below the Nyquist limit.
    #[inline]
    pub fn set_cutoff(&mut self, cutoff: f64) {
        let cutoff = cutoff.clamp(0.0, self.sample_rate * 0.499);
        if cutoff != self.cutoff {
            self.cutoff = cutoff;
            let g = (PI * cutoff / self.sample_rate).tan();
            self.g = g / (1.0 + g);
        }
    }

    /// Clear the filter's state.
    pub fn reset(&mut self) {
        self.s = 0.0;
    }

    /// Process a single sample.
    #[inline]
    pub fn process_sample(&mut self, input: f64) -> f64 {
        let v = self.g * (input - self.s);
        let y = v + self.s;
        self.s = y + v;
        2.0 * y - input
    }
}

impl Default for AllPassFilter {
    fn default() -> Self {
        Self::new(44100.0)
    }
}

// -------------------------------------------------------------------------------------------------
