#![no_std]

//! A `no_std` driver for the mill's spindle enable line.
//!
//! Only two states exist, `Off` and `On`, driven through a single GPIO
//! enable line the way [`driver-drv8825`] drives its nENABLE pin — here
//! active-high, matching the original hardware's `SPINDLE_ENABLE_PORT`.
//! Spin-up and spin-down both block for [`MOTOR_SPIN_UP_AND_DOWN_TIME`]
//! milliseconds so the caller never commands motion into a spindle that
//! hasn't reached speed yet.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

/// Direction the spindle was last commanded to turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Cw,
    Ccw,
}

/// Milliseconds to block on spin-up or spin-down, taken from the original
/// firmware's `MOTOR_SPIN_UP_AND_DOWN_TIME`.
pub const MOTOR_SPIN_UP_AND_DOWN_TIME: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LastRun {
    direction: Direction,
    rpm: u32,
}

/// Spindle enable-line controller, generic over any `OutputPin`.
pub struct SpindleCtl<EN> {
    enable: EN,
    enabled: bool,
    last_run: Option<LastRun>,
}

impl<EN, E> SpindleCtl<EN>
where
    EN: OutputPin<Error = E>,
{
    pub fn new(enable: EN) -> Self {
        Self { enable, enabled: false, last_run: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the spindle is currently on, and its last commanded
    /// direction/rpm if so.
    pub fn last_run(&self) -> Option<(Direction, u32)> {
        self.last_run.map(|r| (r.direction, r.rpm))
    }

    /// Drives the enable line high, records `direction`/`rpm`, and blocks
    /// for the spin-up delay.
    pub fn run(&mut self, direction: Direction, rpm: u32, delay: &mut impl DelayNs) -> Result<(), E> {
        self.enable.set_high()?;
        self.enabled = true;
        self.last_run = Some(LastRun { direction, rpm });
        delay.delay_ms(MOTOR_SPIN_UP_AND_DOWN_TIME);
        Ok(())
    }

    /// Clears the enable line, zeroes recorded state, and blocks for the
    /// spin-down delay.
    pub fn stop(&mut self, delay: &mut impl DelayNs) -> Result<(), E> {
        self.enable.set_low()?;
        self.enabled = false;
        self.last_run = None;
        delay.delay_ms(MOTOR_SPIN_UP_AND_DOWN_TIME);
        Ok(())
    }

    /// Clears the enable line and blocks for the spin-down delay, but
    /// keeps the last direction/rpm so `resume` can restart identically.
    pub fn pause(&mut self, delay: &mut impl DelayNs) -> Result<(), E> {
        self.enable.set_low()?;
        self.enabled = false;
        delay.delay_ms(MOTOR_SPIN_UP_AND_DOWN_TIME);
        Ok(())
    }

    /// Re-invokes `run` with the last recorded direction/rpm, if any was
    /// ever set. A no-op if the spindle was never run.
    pub fn resume(&mut self, delay: &mut impl DelayNs) -> Result<(), E> {
        if let Some(last) = self.last_run {
            self.run(last.direction, last.rpm, delay)?;
        }
        Ok(())
    }
}
