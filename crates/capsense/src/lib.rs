#![cfg_attr(not(feature = "std"), no_std)]

//! # Capacitive Touch-Off Sensing
//!
//! Times an RC charge/discharge cycle on a send/receive GPIO pair, runs the
//! result through a fixed 5-pole low-pass filter, and reports an averaged
//! reading per axis (or for the end-mill conductivity probe). Used by
//! `motion-ctl`'s homing-by-probing loop to detect contact with a
//! conductive workpiece.
//!
//! This crate owns no GPIO directly — callers supply a [`CapPort`]
//! implementation, which is how a 3-axis plate port and a separate
//! end-mill plate port (different physical ports on the original hardware)
//! are both supported without duplicating the timing logic.

mod channel;
mod filter;

pub use channel::{CapError, CapPort};
pub use filter::LowPassFilter;

/// Number of filter-order warm-up samples discarded before an averaged
/// read starts accumulating (filter order + 1, per the original design).
const WARMUP_SAMPLES: usize = 6;

/// The sample count every call site in the original firmware actually
/// used (`10 * 5`). `axis_average`/`end_mill_average` remain generic over
/// the count; this is just the conventional default.
pub const DEFAULT_SAMPLES: u8 = 50;

/// Computes the maximum loop-timing count before a channel is declared
/// open/disconnected, from a CPU clock and an empirically measured
/// loop-timing factor — mirrors `cc_init`'s
/// `(2000 * loop_timing_factor * cpu_hz) / 16_000_000` derivation.
pub fn derive_timeout(loop_timing_factor: u32, cpu_hz: u32) -> u32 {
    ((2000u64 * loop_timing_factor as u64 * cpu_hz as u64) / 16_000_000) as u32
}

/// Per-channel RC timing plus the shared low-pass filter and the last
/// averaged value.
pub struct CapSense<AxisPort, MillPort> {
    axis_port: AxisPort,
    mill_port: MillPort,
    filter: LowPassFilter,
    timeout: u32,
    cap_average: f64,
}

impl<AxisPort, MillPort> CapSense<AxisPort, MillPort>
where
    AxisPort: CapPort,
    MillPort: CapPort,
{
    /// Builds a `CapSense` with an explicit timeout (in loop iterations).
    /// Use [`derive_timeout`] to compute it from the CPU clock.
    pub fn new(axis_port: AxisPort, mill_port: MillPort, timeout: u32) -> Self {
        Self {
            axis_port,
            mill_port,
            filter: LowPassFilter::new(),
            timeout,
            cap_average: 0.0,
        }
    }

    /// The last value reported by `axis_average`/`end_mill_average`.
    pub fn last_average(&self) -> f64 {
        self.cap_average
    }

    /// One RC charge/discharge cycle on the axis port's channel `axis`.
    pub fn measure_axis(&mut self, axis: usize) -> Result<f64, CapError> {
        let total = measure_channel(&mut self.axis_port, axis, self.timeout)?;
        Ok(self.filter.sample(total))
    }

    /// One RC charge/discharge cycle on the single-channel end-mill port.
    pub fn measure_end_mill(&mut self) -> Result<f64, CapError> {
        let total = measure_channel(&mut self.mill_port, 0, self.timeout)?;
        Ok(self.filter.sample(total))
    }

    /// Resets the filter, discards `WARMUP_SAMPLES` readings, then averages
    /// `num_samples` more. Any timeout — during warm-up or averaging —
    /// short-circuits the whole call to `TimedOut` without updating
    /// `last_average`.
    pub fn axis_average(&mut self, axis: usize, num_samples: u8) -> Result<f64, CapError> {
        self.filter.reset();
        for _ in 0..WARMUP_SAMPLES {
            self.measure_axis(axis)?;
        }
        let mut sum = 0.0;
        for _ in 0..num_samples {
            sum += self.measure_axis(axis)?;
        }
        let mean = sum / num_samples as f64;
        self.cap_average = mean;
        Ok(mean)
    }

    /// Identical to `axis_average` but reads the end-mill channel.
    pub fn end_mill_average(&mut self, num_samples: u8) -> Result<f64, CapError> {
        self.filter.reset();
        for _ in 0..WARMUP_SAMPLES {
            self.measure_end_mill()?;
        }
        let mut sum = 0.0;
        for _ in 0..num_samples {
            sum += self.measure_end_mill()?;
        }
        let mean = sum / num_samples as f64;
        self.cap_average = mean;
        Ok(mean)
    }
}

/// Runs one full charge/discharge cycle on `port`'s `channel` and returns
/// the raw loop-iteration count, or `TimedOut` if either half-cycle never
/// crosses its threshold.
fn measure_channel<P: CapPort>(port: &mut P, channel: usize, timeout: u32) -> Result<u32, CapError> {
    let mut total: u32 = 0;

    port.drive_send(channel, false);
    port.prime_recv_low(channel);
    port.release_recv(channel);

    port.drive_send(channel, true);
    while !port.recv_is_high(channel) {
        if total >= timeout {
            return Err(CapError::TimedOut);
        }
        total += 1;
    }

    port.pulse_recv_pull_up(channel);
    port.drive_send(channel, false);
    while port.recv_is_high(channel) {
        if total >= timeout {
            return Err(CapError::TimedOut);
        }
        total += 1;
    }

    #[cfg(feature = "defmt-logging")]
    defmt::trace!("cap sample: channel={=usize} total={=u32}", channel, total);

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A `CapPort` whose two timing loops are driven by a queued list of
    /// "rise after N ticks" counts (or `None` for "never rises" i.e.
    /// timeout), used to exercise `measure_channel`/`axis_average` end to
    /// end without real GPIO.
    struct FakeTimingPort {
        outcomes: std::collections::VecDeque<Option<u32>>,
        calls_this_cycle: u32,
        half: u8,
    }

    impl FakeTimingPort {
        fn new(outcomes: impl IntoIterator<Item = Option<u32>>) -> Self {
            Self {
                outcomes: outcomes.into_iter().collect(),
                calls_this_cycle: 0,
                half: 0,
            }
        }
    }

    impl CapPort for FakeTimingPort {
        fn drive_send(&mut self, _channel: usize, high: bool) {
            if !high {
                // A falling send edge starts a new half-cycle's polling.
                self.calls_this_cycle = 0;
            }
        }
        fn prime_recv_low(&mut self, _channel: usize) {}
        fn release_recv(&mut self, _channel: usize) {}
        fn pulse_recv_pull_up(&mut self, _channel: usize) {
            self.half = 1;
            self.calls_this_cycle = 0;
        }

        fn recv_is_high(&mut self, _channel: usize) -> bool {
            let target = *self.outcomes.front().unwrap_or(&None);
            self.calls_this_cycle += 1;
            match (self.half, target) {
                (0, Some(n)) => self.calls_this_cycle >= n,
                (0, None) => false,
                (1, Some(_)) => {
                    let rising_done = self.calls_this_cycle >= 1;
                    if rising_done {
                        self.outcomes.pop_front();
                        self.half = 0;
                    }
                    !rising_done
                }
                (1, None) => true,
            }
        }
    }

    fn port_with(outcomes: Vec<Option<u32>>) -> FakeTimingPort {
        FakeTimingPort::new(outcomes)
    }

    #[test]
    fn axis_average_times_out_during_warmup() {
        // First warm-up sample never rises -> TimedOut, capAverage untouched.
        let axis_port = port_with(vec![None; 8]);
        let mill_port = port_with(vec![Some(1); 8]);
        let mut cs = CapSense::new(axis_port, mill_port, 50);
        let before = cs.last_average();
        let result = cs.axis_average(0, DEFAULT_SAMPLES);
        assert_eq!(result, Err(CapError::TimedOut));
        assert_eq!(cs.last_average(), before);
    }

    #[test]
    fn axis_average_times_out_during_averaging() {
        // Warm-up (6) succeeds quickly, then the 7th cycle (first averaged
        // sample) never rises.
        let mut outcomes = vec![Some(5); 6];
        outcomes.push(None);
        let axis_port = port_with(outcomes);
        let mill_port = port_with(vec![Some(1)]);
        let mut cs = CapSense::new(axis_port, mill_port, 50);
        let result = cs.axis_average(0, 10);
        assert_eq!(result, Err(CapError::TimedOut));
    }

    #[test]
    fn axis_average_succeeds_with_enough_good_samples() {
        let axis_port = port_with(vec![Some(5); 6 + 10]);
        let mill_port = port_with(vec![Some(1)]);
        let mut cs = CapSense::new(axis_port, mill_port, 50);
        let result = cs.axis_average(0, 10);
        assert!(result.is_ok());
        assert_eq!(cs.last_average(), result.unwrap());
    }

    #[test]
    fn end_mill_average_uses_the_mill_port_independently() {
        let axis_port = port_with(vec![None]);
        let mill_port = port_with(vec![Some(5); 6 + 10]);
        let mut cs = CapSense::new(axis_port, mill_port, 50);
        let result = cs.end_mill_average(10);
        assert!(result.is_ok());
    }

    #[test]
    fn derive_timeout_matches_original_formula() {
        // cc_init: (2000 * 310 * 16_000_000) / 16_000_000 == 2000 * 310
        assert_eq!(derive_timeout(310, 16_000_000), 2000 * 310);
    }
}
