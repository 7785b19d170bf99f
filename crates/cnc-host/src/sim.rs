//! Simulated backends standing in for the real-time planner, capacitive
//! GPIO, and spindle pin — there is no AVR hardware to drive from a host
//! binary, so these record/replay what a real implementation would do.

use std::convert::Infallible;

use capsense::CapPort;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};
use motion_ctl::{CartesianPoint, Planner};
use tracing::debug;

/// Records every line the interpreter queues and reports itself as
/// synchronized instantly (there is no background step-pulse ISR here to
/// wait on).
#[derive(Debug, Default)]
pub struct SimPlanner {
    pub queued_lines: Vec<(CartesianPoint, f64, bool)>,
    pub redefines: Vec<CartesianPoint>,
    pub position: CartesianPoint,
    accel_enabled: bool,
}

impl SimPlanner {
    pub fn new() -> Self {
        Self { accel_enabled: true, ..Default::default() }
    }
}

impl Planner for SimPlanner {
    fn plan_buffer_line(&mut self, target: CartesianPoint, rate: f64, invert_feed_rate: bool) {
        debug!(?target, rate, invert_feed_rate, "plan_buffer_line");
        self.position = target;
        self.queued_lines.push((target, rate, invert_feed_rate));
    }

    fn plan_redefine_current_position(&mut self, pos: CartesianPoint) {
        debug!(?pos, "plan_redefine_current_position");
        self.position = pos;
        self.redefines.push(pos);
    }

    fn is_acceleration_manager_enabled(&self) -> bool {
        self.accel_enabled
    }

    fn set_acceleration_manager_enabled(&mut self, enabled: bool) {
        self.accel_enabled = enabled;
    }

    fn synchronize(&mut self) {
        debug!("synchronize (instant: no background queue on the host simulator)");
    }
}

/// Which half of the RC cycle a channel is currently in — tracked from
/// the `drive_send` sequence `measure_channel` always issues (prime-low,
/// charge-high, discharge-low), since that's the only way to tell the
/// priming low apart from the discharging low.
#[derive(Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    Charging,
    Discharging,
}

/// A deterministic capacitive RC model for demos and the `run`/`batch`
/// subcommands: each channel's simulated plate charges and discharges at
/// a fixed rate over `1.0 / rise_per_cycle` loop iterations, so
/// `measure_channel`'s two polling loops complete the way they would
/// against a real, finite-value capacitor instead of hanging or timing
/// out immediately.
pub struct SimCapChannel {
    rise_per_cycle: f64,
    level: [f64; 4],
    phase: [Phase; 4],
}

impl SimCapChannel {
    pub fn new(rise_per_cycle: f64) -> Self {
        Self { rise_per_cycle, level: [0.0; 4], phase: [Phase::Idle; 4] }
    }
}

impl CapPort for SimCapChannel {
    fn drive_send(&mut self, channel: usize, high: bool) {
        let phase = &mut self.phase[channel.min(3)];
        *phase = if high {
            Phase::Charging
        } else if *phase == Phase::Charging {
            Phase::Discharging
        } else {
            Phase::Idle
        };
    }

    fn prime_recv_low(&mut self, _channel: usize) {}
    fn release_recv(&mut self, _channel: usize) {}
    fn pulse_recv_pull_up(&mut self, _channel: usize) {}

    fn recv_is_high(&mut self, channel: usize) -> bool {
        let channel = channel.min(3);
        match self.phase[channel] {
            Phase::Charging => {
                self.level[channel] = (self.level[channel] + self.rise_per_cycle).min(1.0);
                self.level[channel] >= 1.0
            }
            Phase::Discharging => {
                self.level[channel] = (self.level[channel] - self.rise_per_cycle).max(0.0);
                self.level[channel] > 0.0
            }
            Phase::Idle => false,
        }
    }
}

/// No-op delay: the host simulator isn't driving real motors, so dwells
/// and spin-up/spin-down blocks are recorded, not actually slept through.
#[derive(Default)]
pub struct SimDelay;

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        debug!(ns, "delay_ns (simulated, not actually slept)");
    }
}

/// A spindle enable pin that just remembers its last commanded level.
#[derive(Default)]
pub struct SimSpindlePin {
    pub high: bool,
}

impl ErrorType for SimSpindlePin {
    type Error = Infallible;
}

impl OutputPin for SimSpindlePin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.high = false;
        Ok(())
    }
    fn set_high(&mut self) -> Result<(), Infallible> {
        self.high = true;
        Ok(())
    }
}
