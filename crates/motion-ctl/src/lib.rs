#![cfg_attr(not(feature = "std"), no_std)]

//! # Motion Control
//!
//! Dwell/synchronise, chord-segment arc interpolation, homing-by-probing,
//! and origin redefinition, driven entirely through the [`Planner`] trait —
//! this crate never generates a step pulse itself. The real-time,
//! acceleration-limited step planner behind that trait is out of scope
//! here; see `motion::planner` in the stepper-level crate for the kind of
//! thing that implements it.

mod cap_probe;
mod homing;
mod math;
mod planner;
mod point;

pub use cap_probe::CapProbe;
pub use homing::HomingReport;
pub use planner::{AccelGuard, Planner};
pub use point::CartesianPoint;

use embedded_hal::delay::DelayNs;

/// Entry point for the four operations of this crate, generic over a
/// concrete [`Planner`] implementation.
pub struct MotionCtl<P> {
    planner: P,
}

impl<P: Planner> MotionCtl<P> {
    pub fn new(planner: P) -> Self {
        Self { planner }
    }

    pub fn planner(&self) -> &P {
        &self.planner
    }

    pub fn planner_mut(&mut self) -> &mut P {
        &mut self.planner
    }

    pub fn into_planner(self) -> P {
        self.planner
    }

    /// Blocks until the queue drains, then sleeps `ms` milliseconds.
    /// `ms == 0` is a pure synchronise with no sleep.
    pub fn dwell(&mut self, ms: u32, delay: &mut impl DelayNs) {
        self.planner.synchronize();
        if ms > 0 {
            delay.delay_ms(ms);
        }
    }

    /// Traces a circular or helical arc as a sequence of straight chords.
    ///
    /// `axis_plane0`/`axis_plane1` are the indices (0=X, 1=Y, 2=Z) of the
    /// plane's two in-plane axes, permuted per the active plane selection;
    /// `axis_linear` is the remaining axis, advanced linearly across the
    /// arc (helical motion).
    #[allow(clippy::too_many_arguments)]
    pub fn arc(
        &mut self,
        theta0: f64,
        angular_travel: f64,
        radius: f64,
        linear_travel: f64,
        axis_plane0: usize,
        axis_plane1: usize,
        axis_linear: usize,
        feed_rate: f64,
        invert_feed: bool,
        mm_per_arc_segment: f64,
        position: &mut CartesianPoint,
    ) {
        let mut guard = AccelGuard::disable(&mut self.planner);

        let mm = math::hypot(angular_travel * radius, math::abs(linear_travel));
        if mm == 0.0 {
            return;
        }

        let segments = math::ceil(mm / mm_per_arc_segment).max(1.0) as u32;
        let rate = if invert_feed {
            feed_rate * segments as f64
        } else {
            feed_rate
        };

        let theta_step = angular_travel / segments as f64;
        let linear_step = linear_travel / segments as f64;

        let cx = position[axis_plane0] - math::sin(theta0) * radius;
        let cy = position[axis_plane1] - math::cos(theta0) * radius;

        let mut theta = theta0;
        for _ in 0..segments {
            position[axis_linear] += linear_step;
            theta += theta_step;
            position[axis_plane0] = cx + math::sin(theta) * radius;
            position[axis_plane1] = cy + math::cos(theta) * radius;
            guard.planner_mut().plan_buffer_line(*position, rate, invert_feed);
        }
    }

    /// Homes a single axis (0=X, 1=Y, 2=Z) by probing with the axis
    /// capacitive channel, advancing `step` mm at `feed` per iteration.
    #[allow(clippy::too_many_arguments)]
    pub fn home_axis(
        &mut self,
        axis: usize,
        feed: f64,
        step: f64,
        threshold: f64,
        max_iters: u16,
        probe: &mut impl CapProbe,
        position: &mut CartesianPoint,
    ) -> HomingReport {
        homing::home_loop(
            &mut self.planner,
            probe,
            Some(axis),
            axis,
            feed,
            step,
            threshold,
            max_iters,
            position,
        )
    }

    /// Homes the end mill (always Z) by probing with the end-mill
    /// conductivity channel.
    pub fn home_mill(
        &mut self,
        feed: f64,
        step: f64,
        threshold: f64,
        max_iters: u16,
        probe: &mut impl CapProbe,
        position: &mut CartesianPoint,
    ) -> HomingReport {
        homing::home_loop(
            &mut self.planner,
            probe,
            None,
            2,
            feed,
            step,
            threshold,
            max_iters,
            position,
        )
    }

    /// Redefines the current physical location as the origin.
    /// `selection == -1` zeroes all three axes, `0..=2` zeroes just that
    /// axis, any other value is a no-op.
    pub fn cur_pos_is_origin(&mut self, selection: i32, position: &mut CartesianPoint) {
        match selection {
            -1 => *position = CartesianPoint::zero(),
            0 | 1 | 2 => position[selection as usize] = 0.0,
            _ => return,
        }
        self.planner.plan_redefine_current_position(*position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default, Clone)]
    struct Log(Rc<RefCell<Vec<String>>>);

    impl Log {
        fn push(&self, s: impl Into<String>) {
            self.0.borrow_mut().push(s.into());
        }
        fn entries(&self) -> Vec<String> {
            self.0.borrow().clone()
        }
    }

    #[derive(Default)]
    struct FakePlanner {
        log: Log,
        accel_enabled: bool,
        lines: Vec<(CartesianPoint, f64, bool)>,
    }

    impl Planner for FakePlanner {
        fn plan_buffer_line(&mut self, target: CartesianPoint, rate: f64, invert_feed_rate: bool) {
            self.log.push("buffer_line");
            self.lines.push((target, rate, invert_feed_rate));
        }
        fn plan_redefine_current_position(&mut self, _pos: CartesianPoint) {
            self.log.push("redefine");
        }
        fn is_acceleration_manager_enabled(&self) -> bool {
            self.accel_enabled
        }
        fn set_acceleration_manager_enabled(&mut self, enabled: bool) {
            self.accel_enabled = enabled;
        }
        fn synchronize(&mut self) {
            self.log.push("synchronize");
        }
    }

    #[test]
    fn dwell_synchronizes_then_sleeps() {
        let planner = FakePlanner { accel_enabled: true, ..Default::default() };
        let log = planner.log.clone();
        let mut mc = MotionCtl::new(planner);
        let mut delay = NoopDelay::new();
        mc.dwell(10, &mut delay);
        assert_eq!(log.entries(), vec!["synchronize"]);
    }

    #[test]
    fn dwell_zero_still_synchronizes() {
        let planner = FakePlanner::default();
        let log = planner.log.clone();
        let mut mc = MotionCtl::new(planner);
        let mut delay = NoopDelay::new();
        mc.dwell(0, &mut delay);
        assert_eq!(log.entries(), vec!["synchronize"]);
    }

    #[test]
    fn arc_emits_one_line_per_segment_and_closes() {
        // A quarter circle of radius 10 starting at angle 0: arc length
        // ~= pi/2 * 10 ~= 15.7mm, mm_per_arc_segment 1.0 -> 16 segments.
        let planner = FakePlanner::default();
        let mut mc = MotionCtl::new(planner);
        let mut position = CartesianPoint::new(10.0, 0.0, 0.0);
        let angular_travel = core::f64::consts::FRAC_PI_2;
        mc.arc(0.0, angular_travel, 10.0, 0.0, 0, 1, 2, 300.0, false, 1.0, &mut position);

        let lines = &mc.planner().lines;
        assert!(!lines.is_empty());
        let (last_target, _, _) = lines.last().unwrap();
        // Closes near (0, 10): cos/sin of a quarter turn from (10, 0).
        assert!((last_target.x - 0.0).abs() < 1e-6);
        assert!((last_target.y - 10.0).abs() < 1e-6);
    }

    #[test]
    fn arc_with_zero_travel_is_a_noop() {
        let planner = FakePlanner::default();
        let mut mc = MotionCtl::new(planner);
        let mut position = CartesianPoint::zero();
        mc.arc(0.0, 0.0, 0.0, 0.0, 0, 1, 2, 300.0, false, 1.0, &mut position);
        assert!(mc.planner().lines.is_empty());
    }

    struct ScriptedProbe {
        readings: std::collections::VecDeque<Result<f64, capsense::CapError>>,
    }

    impl CapProbe for ScriptedProbe {
        fn axis_average(&mut self, _axis: usize, _n: u8) -> Result<f64, capsense::CapError> {
            self.readings.pop_front().unwrap_or(Ok(0.0))
        }
        fn end_mill_average(&mut self, _n: u8) -> Result<f64, capsense::CapError> {
            self.readings.pop_front().unwrap_or(Ok(0.0))
        }
    }

    #[test]
    fn home_axis_stops_once_threshold_crossed() {
        let planner = FakePlanner::default();
        let mut mc = MotionCtl::new(planner);
        let mut probe = ScriptedProbe {
            readings: vec![Ok(0.1), Ok(0.2), Ok(0.4), Ok(0.9)].into(),
        };
        let mut position = CartesianPoint::zero();
        let report = mc.home_axis(0, 300.0, 0.1, 0.8, 100, &mut probe, &mut position);
        assert!(!report.timed_out);
        assert_eq!(report.iterations, 3);
        assert_eq!(position.x, 0.0);
    }

    #[test]
    fn home_axis_gives_up_on_max_iterations() {
        let planner = FakePlanner::default();
        let mut mc = MotionCtl::new(planner);
        let mut probe = ScriptedProbe {
            readings: vec![Ok(0.1); 10].into(),
        };
        let mut position = CartesianPoint::zero();
        let report = mc.home_axis(0, 300.0, 0.1, 0.8, 3, &mut probe, &mut position);
        assert!(!report.timed_out);
        assert_eq!(report.iterations, 3);
    }

    #[test]
    fn home_axis_reports_timeout() {
        let planner = FakePlanner::default();
        let mut mc = MotionCtl::new(planner);
        let mut probe = ScriptedProbe {
            readings: vec![Ok(0.1), Err(capsense::CapError::TimedOut)].into(),
        };
        let mut position = CartesianPoint::zero();
        let report = mc.home_axis(0, 300.0, 0.1, 0.8, 100, &mut probe, &mut position);
        assert!(report.timed_out);
        assert_eq!(report.iterations, 1);
    }

    #[test]
    fn home_mill_always_moves_z() {
        let planner = FakePlanner::default();
        let mut mc = MotionCtl::new(planner);
        let mut probe = ScriptedProbe {
            readings: vec![Ok(0.1), Ok(0.9)].into(),
        };
        let mut position = CartesianPoint::new(1.0, 2.0, 0.0);
        let _ = mc.home_mill(100.0, 0.05, 0.8, 50, &mut probe, &mut position);
        let (target, _, _) = mc.planner().lines[0];
        assert_eq!(target.x, 1.0);
        assert_eq!(target.y, 2.0);
        assert_eq!(position.z, 0.0);
    }

    #[test]
    fn cur_pos_is_origin_minus_one_zeroes_all() {
        let planner = FakePlanner::default();
        let mut mc = MotionCtl::new(planner);
        let mut position = CartesianPoint::new(1.0, 2.0, 3.0);
        mc.cur_pos_is_origin(-1, &mut position);
        assert_eq!(position, CartesianPoint::zero());
    }

    #[test]
    fn cur_pos_is_origin_zeroes_only_selected_axis() {
        let planner = FakePlanner::default();
        let mut mc = MotionCtl::new(planner);
        let mut position = CartesianPoint::new(1.0, 2.0, 3.0);
        mc.cur_pos_is_origin(1, &mut position);
        assert_eq!(position, CartesianPoint::new(1.0, 0.0, 3.0));
    }

    #[test]
    fn cur_pos_is_origin_other_selection_is_noop() {
        let planner = FakePlanner::default();
        let mut mc = MotionCtl::new(planner);
        let mut position = CartesianPoint::new(1.0, 2.0, 3.0);
        mc.cur_pos_is_origin(7, &mut position);
        assert_eq!(position, CartesianPoint::new(1.0, 2.0, 3.0));
    }
}
