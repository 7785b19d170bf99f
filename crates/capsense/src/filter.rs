//! The fixed 5-zero/5-pole low-pass filter applied to every raw capacitance
//! sample.
//!
//! This is a half-band IIR structure with a hard-coded gain and two non-zero
//! feedback coefficients; the even-indexed `yv` coefficients are exactly
//! zero and are written out explicitly below rather than omitted, so the
//! structure stays visibly a 5-pole filter.

const GAIN: f64 = 18.94427191;
const B1: f64 = -0.05572809;
const B3: f64 = -0.63343685;

/// Delay-line state for the low-pass filter.
///
/// `xv` holds the last six raw (gain-scaled) samples, `yv` the last six
/// filtered outputs. `sample` shifts both and returns the new `yv[5]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowPassFilter {
    xv: [f64; 6],
    yv: [f64; 6],
}

impl LowPassFilter {
    /// A filter with all delays zeroed, matching `initLowPass`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Zeroes every delay, as if freshly constructed.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Feeds one raw counter value through the filter and returns `yv[5]`.
    pub fn sample(&mut self, cap_total: u32) -> f64 {
        self.xv.copy_within(1..6, 0);
        self.xv[5] = cap_total as f64 / GAIN;

        self.yv.copy_within(1..6, 0);
        self.yv[5] = (self.xv[0] + self.xv[5])
            + 5.0 * (self.xv[1] + self.xv[4])
            + 10.0 * (self.xv[2] + self.xv[3])
            + B1 * self.yv[1]
            + B3 * self.yv[3];
        self.yv[5]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_input_is_a_fixed_point() {
        let mut f = LowPassFilter::new();
        for _ in 0..6 {
            let y = f.sample(0);
            assert_eq!(y, 0.0);
        }
    }

    #[test]
    fn reset_clears_history() {
        let mut f = LowPassFilter::new();
        for _ in 0..10 {
            f.sample(500);
        }
        f.reset();
        assert_eq!(f.sample(0), 0.0);
    }

    #[test]
    fn nonzero_step_produces_nonzero_output_after_warmup() {
        let mut f = LowPassFilter::new();
        let mut last = 0.0;
        for _ in 0..10 {
            last = f.sample(300);
        }
        assert!(last.abs() > 0.0);
    }
}
