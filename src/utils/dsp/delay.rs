//! Delay buffers to delay signals.

// -------------------------------------------------------------------------------------------------

/// Mono delay line buffer with linearly interpolated, fractional delay time support.
///
/// New samples get written before reading, so a delay of 0 passes the input through unchanged.
#[derive(Debug, Default, Clone)]
pub struct DelayLine {
    buffer: Vec<f32>,
    buffer_mask: usize,
    write_pos: usize,
    max_delay: f32,
    delay_frames: usize,
    delay_fraction: f32,
}

impl DelayLine {
    /// Create a new delay buffer with the given max delay time in sample frames.
    pub fn new(max_delay_frames: usize) -> Self {
        // +2: one frame for the current sample and one for interpolating the max delay
        let buffer_frames = (max_delay_frames + 2).next_power_of_two();
        Self {
            buffer: vec![0.0; buffer_frames],
            buffer_mask: buffer_frames - 1,
            write_pos: 0,
            max_delay: max_delay_frames as f32,
            delay_frames: 0,
            delay_fraction: 0.0,
        }
    }

    /// Max delay time in sample frames.
    pub fn max_delay(&self) -> f32 {
        self.max_delay
    }

    /// Current delay time in sample frames.
    pub fn delay(&self) -> f32 {
        self.delay_frames as f32 + self.delay_fraction
    }

    /// Set a new delay time in sample frames. The delay is clamped to `0..=max_delay`.
    #[inline]
    pub fn set_delay(&mut self, delay: f32) {
        let delay = delay.clamp(0.0, self.max_delay);
        let delay_floor = delay.floor();
        self.delay_frames = delay_floor as usize;
        self.delay_fraction = delay - delay_floor;
    }

    /// Reset the delay buffer and write position.
    pub fn flush(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }

    /// Process and add a single new sample and return the delayed sample.
    #[inline]
    pub fn process_sample(&mut self, input: f32) -> f32 {
        self.buffer[self.write_pos] = input;

        let index1 = self.write_pos.wrapping_sub(self.delay_frames) & self.buffer_mask;
        let index2 = index1.wrapping_sub(1) & self.buffer_mask;
        let val1 = self.buffer[index1];
        let val2 = self.buffer[index2];

        self.write_pos = (self.write_pos + 1) & self.buffer_mask;

        val1 + (val2 - val1) * self.delay_fraction
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn impulse_response(delay: &mut DelayLine, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| delay.process_sample(if i == 0 { 1.0 } else { 0.0 }))
            .collect()
    }

    #[test]
    fn zero_delay_is_identity() {
        let mut delay = DelayLine::new(8);
        delay.set_delay(0.0);
        let input = [0.5, -0.25, 1.0, 0.0, 0.3];
        let output: Vec<f32> = input.iter().map(|s| delay.process_sample(*s)).collect();
        assert_eq!(output, input);
    }

    #[test]
    fn integer_delay() {
        let mut delay = DelayLine::new(8);
        delay.set_delay(3.0);
        assert_eq!(
            impulse_response(&mut delay, 6),
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0]
        );
    }

    #[test]
    fn fractional_delay() {
        let mut delay = DelayLine::new(8);
        delay.set_delay(1.25);
        assert_eq!(delay.delay(), 1.25);
        assert_eq!(
            impulse_response(&mut delay, 4),
            vec![0.0, 0.75, 0.25, 0.0]
        );
    }

    #[test]
    fn delay_is_clamped() {
        let mut delay = DelayLine::new(4);
        delay.set_delay(10.0);
        assert_eq!(delay.delay(), 4.0);
        delay.set_delay(-1.0);
        assert_eq!(delay.delay(), 0.0);

        let mut delay = DelayLine::new(4);
        delay.set_delay(4.0);
        assert_eq!(
            impulse_response(&mut delay, 6),
            vec![0.0, 0.0, 0.0, 0.0, 1.0, 0.0]
        );
    }

    #[test]
    fn flush_clears_memory() {
        let mut delay = DelayLine::new(4);
        delay.set_delay(2.0);
        let _ = delay.process_sample(1.0);
        delay.flush();
        assert_eq!(impulse_response(&mut delay, 1), vec![0.0]);
        assert_eq!(delay.process_sample(0.0), 0.0);
    }
}
