use std::f64::consts::PI;

use cnc_settings::{GCodeStatus, OutputSink, Settings, SettingsStore};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use motion_ctl::{CapProbe, CartesianPoint, MotionCtl, Planner};
use spindle_ctl::{Direction, SpindleCtl};

use crate::action::NextAction;
use crate::params::LineParams;
use crate::state::{InterpreterState, MotionMode};
use crate::token::{self, Tokens};

/// Ties modal interpreter state to its three collaborators — the motion
/// core, the capacitive probe, and the spindle enable line — plus the
/// read/write settings store and the textual output sink, exactly the
/// set of components the system overview assigns to this layer.
pub struct GCodeParser<P, Probe, EN, D, S, O>
where
    P: Planner,
    Probe: CapProbe,
    EN: OutputPin,
    D: DelayNs,
    S: SettingsStore,
    O: OutputSink,
{
    state: InterpreterState,
    motion: MotionCtl<P>,
    probe: Probe,
    spindle: SpindleCtl<EN>,
    delay: D,
    settings: S,
    sink: O,
}

impl<P, Probe, EN, D, S, O> GCodeParser<P, Probe, EN, D, S, O>
where
    P: Planner,
    Probe: CapProbe,
    EN: OutputPin,
    D: DelayNs,
    S: SettingsStore,
    O: OutputSink,
{
    pub fn new(planner: P, probe: Probe, spindle_enable: EN, delay: D, settings: S, sink: O) -> Self {
        let state = InterpreterState::new(&settings);
        Self {
            state,
            motion: MotionCtl::new(planner),
            probe,
            spindle: SpindleCtl::new(spindle_enable),
            delay,
            settings,
            sink,
        }
    }

    pub fn state(&self) -> &InterpreterState {
        &self.state
    }

    pub fn settings(&self) -> &S {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut S {
        &mut self.settings
    }

    pub fn motion(&self) -> &MotionCtl<P> {
        &self.motion
    }

    pub fn motion_mut(&mut self) -> &mut MotionCtl<P> {
        &mut self.motion
    }

    #[cfg(test)]
    pub(crate) fn state_mut_for_test(&mut self) -> &mut InterpreterState {
        &mut self.state
    }

    #[cfg(test)]
    pub(crate) fn probe_mut_for_test(&mut self) -> &mut Probe {
        &mut self.probe
    }

    /// Executes one normalised (uppercase, no whitespace) line and prints
    /// the resulting `ok`/error token through the configured sink.
    pub fn execute_line(&mut self, line: &str) -> GCodeStatus {
        let status = self.execute_line_inner(line);
        if status.is_ok() {
            self.sink.ok();
        } else {
            self.sink.error(status);
        }
        status
    }

    fn execute_line_inner(&mut self, line: &str) -> GCodeStatus {
        if line.starts_with('(') {
            return GCodeStatus::Ok;
        }
        let body = line.strip_prefix('/').unwrap_or(line);

        if let Some(rest) = body.strip_prefix('$') {
            return self.execute_settings_line(rest);
        }

        let (next_action, absolute_override, spindle_changed) = match self.run_pass1(body) {
            Ok(v) => v,
            Err(e) => return e,
        };

        let mut params = LineParams::new(self.state.position, self.state.feed_rate);
        params.spindle_changed = spindle_changed;
        if let Err(e) = self.run_pass2(body, next_action, absolute_override, &mut params) {
            return e;
        }

        if next_action == NextAction::GoHome && !params.p_seen {
            return GCodeStatus::UnsupportedStatement;
        }

        if params.spindle_changed {
            self.motion.dwell(0, &mut self.delay);
            if self.state.spindle_direction != 0 {
                let direction = if self.state.spindle_direction > 0 { Direction::Cw } else { Direction::Ccw };
                let rpm = self.state.spindle_speed.max(0) as u32;
                let _ = self.spindle.run(direction, rpm, &mut self.delay);
            } else {
                let _ = self.spindle.stop(&mut self.delay);
            }
        }

        if let Err(e) = self.dispatch(next_action, &mut params) {
            return e;
        }

        self.state.position = params.target;
        GCodeStatus::Ok
    }

    fn run_pass1(&mut self, body: &str) -> Result<(NextAction, bool, bool), GCodeStatus> {
        let mut next_action = NextAction::Default;
        let mut absolute_override = false;
        let mut spindle_changed = false;

        for tok in Tokens::new(body) {
            let tok = tok?;
            let int_value = tok.value.trunc() as i64;
            match tok.letter {
                'G' => match int_value {
                    0 => self.state.motion_mode = MotionMode::Seek,
                    1 => self.state.motion_mode = MotionMode::Linear,
                    2 => self.state.motion_mode = MotionMode::CwArc,
                    3 => self.state.motion_mode = MotionMode::CcwArc,
                    4 => next_action = NextAction::Dwell,
                    17 => self.state.select_plane(0, 1, 2),
                    18 => self.state.select_plane(0, 2, 1),
                    19 => self.state.select_plane(1, 2, 0),
                    20 => self.state.inches_mode = true,
                    21 => self.state.inches_mode = false,
                    28 => next_action = NextAction::GoHome,
                    30 => next_action = NextAction::MillGoHome,
                    31 => next_action = NextAction::MeasureCap,
                    34 => next_action = NextAction::CurPosIsOrigin,
                    35 => next_action = NextAction::TurnOffAccel,
                    36 => next_action = NextAction::TurnOnAccel,
                    53 => absolute_override = true,
                    80 => self.state.motion_mode = MotionMode::Cancel,
                    90 => self.state.absolute_mode = true,
                    91 => self.state.absolute_mode = false,
                    93 => self.state.inverse_feed_rate_mode = true,
                    94 => self.state.inverse_feed_rate_mode = false,
                    _ => return Err(GCodeStatus::UnsupportedStatement),
                },
                'M' => match int_value {
                    0 | 1 => self.state.program_flow = crate::state::ProgramFlow::Paused,
                    2 | 30 | 60 => self.state.program_flow = crate::state::ProgramFlow::Completed,
                    3 => {
                        self.state.spindle_direction = 1;
                        spindle_changed = true;
                    }
                    5 => {
                        self.state.spindle_direction = 0;
                        spindle_changed = true;
                    }
                    _ => return Err(GCodeStatus::UnsupportedStatement),
                },
                'T' => self.state.tool = int_value.max(0) as u32,
                _ => {}
            }
        }

        Ok((next_action, absolute_override, spindle_changed))
    }

    fn run_pass2(
        &mut self,
        body: &str,
        next_action: NextAction,
        absolute_override: bool,
        params: &mut LineParams,
    ) -> Result<(), GCodeStatus> {
        for tok in Tokens::new(body) {
            let tok = tok?;
            let unit_converted = self.state.to_millimeters(tok.value);
            match tok.letter {
                'F' => {
                    if self.state.inverse_feed_rate_mode {
                        params.inverse_feed_rate = Some(unit_converted);
                    } else if matches!(next_action, NextAction::MillGoHome | NextAction::GoHome) {
                        params.homing_feed_rate = unit_converted / 60.0;
                    } else if self.state.motion_mode == MotionMode::Seek {
                        self.state.seek_rate = unit_converted / 60.0;
                    } else {
                        self.state.feed_rate = unit_converted / 60.0;
                    }
                }
                'I' | 'J' | 'K' => {
                    let axis = (tok.letter as u8 - b'I') as usize;
                    params.offset[axis] = unit_converted;
                }
                'P' => {
                    params.p = tok.value;
                    params.p_seen = true;
                }
                'R' => {
                    params.r = unit_converted;
                    params.radius_mode = true;
                }
                'S' => self.state.spindle_speed = tok.value as i16,
                letter @ ('X' | 'Y' | 'Z') => {
                    let axis = (letter as u8 - b'X') as usize;
                    if self.state.absolute_mode || absolute_override {
                        params.target[axis] = unit_converted;
                    } else {
                        params.target[axis] += unit_converted;
                    }
                }
                'A' => params.homing_dist_to_move = unit_converted,
                'B' => params.homing_threshold = tok.value,
                'C' => params.homing_max_iters = tok.value.trunc().max(0.0) as u16,
                _ => {}
            }
        }

        Ok(())
    }

    fn execute_settings_line(&mut self, rest: &str) -> GCodeStatus {
        if rest.starts_with('$') {
            self.sink.mill_info();
            return GCodeStatus::Ok;
        }
        if rest.is_empty() {
            self.sink.settings_dump(&self.settings);
            return GCodeStatus::Ok;
        }

        let bytes = rest.as_bytes();
        let (n, pos) = match token::read_double(bytes, 0) {
            Some(v) => v,
            None => return GCodeStatus::BadNumberFormat,
        };
        if pos >= bytes.len() || bytes[pos] != b'=' {
            return GCodeStatus::UnsupportedStatement;
        }
        let (value, end) = match token::read_double(bytes, pos + 1) {
            Some(v) => v,
            None => return GCodeStatus::BadNumberFormat,
        };
        if end != bytes.len() {
            return GCodeStatus::UnsupportedStatement;
        }

        self.settings.store(n.trunc().max(0.0) as u32, value);
        GCodeStatus::Ok
    }

    fn dispatch(&mut self, next_action: NextAction, params: &mut LineParams) -> Result<(), GCodeStatus> {
        match next_action {
            NextAction::GoHome => {
                let axis = params.p.trunc() as i64;
                if !(0..=2).contains(&axis) {
                    return Err(GCodeStatus::UnsupportedStatement);
                }
                let axis = axis as usize;
                let report = self.motion.home_axis(
                    axis,
                    params.homing_feed_rate,
                    params.homing_dist_to_move,
                    params.homing_threshold,
                    params.homing_max_iters,
                    &mut self.probe,
                    &mut self.state.position,
                );
                params.target[axis] = 0.0;
                self.sink.times_moved(report.iterations);
            }
            NextAction::MillGoHome => {
                self.motion.dwell(0, &mut self.delay);
                let report = self.motion.home_mill(
                    params.homing_feed_rate,
                    params.homing_dist_to_move,
                    params.homing_threshold,
                    params.homing_max_iters,
                    &mut self.probe,
                    &mut self.state.position,
                );
                params.target[2] = 0.0;
                self.sink.times_moved(report.iterations);
            }
            NextAction::CurPosIsOrigin => {
                let selection = params.p.trunc() as i32;
                self.motion.cur_pos_is_origin(selection, &mut self.state.position);
                match selection {
                    -1 => params.target = CartesianPoint::zero(),
                    0..=2 => params.target[selection as usize] = 0.0,
                    _ => {}
                }
            }
            NextAction::TurnOffAccel => self.motion.planner_mut().set_acceleration_manager_enabled(false),
            NextAction::TurnOnAccel => self.motion.planner_mut().set_acceleration_manager_enabled(true),
            NextAction::Dwell => {
                let ms = (params.p * 1000.0).trunc().max(0.0) as u32;
                self.motion.dwell(ms, &mut self.delay);
            }
            NextAction::MeasureCap => {
                let selection = params.p.trunc() as i64;
                self.measure_cap(selection);
            }
            NextAction::Default => self.dispatch_motion(params)?,
        }
        Ok(())
    }

    fn dispatch_motion(&mut self, params: &mut LineParams) -> Result<(), GCodeStatus> {
        match self.state.motion_mode {
            MotionMode::Cancel => {}
            MotionMode::Seek => {
                self.motion.planner_mut().plan_buffer_line(params.target, self.state.seek_rate, false);
            }
            MotionMode::Linear => {
                let rate = if self.state.inverse_feed_rate_mode {
                    params.inverse_feed_rate.unwrap_or(-1.0)
                } else {
                    self.state.feed_rate
                };
                self.motion.planner_mut().plan_buffer_line(params.target, rate, self.state.inverse_feed_rate_mode);
            }
            MotionMode::CwArc | MotionMode::CcwArc => {
                let plane = self.state.plane;

                if params.radius_mode {
                    let x = params.target[plane.axis_0] - self.state.position[plane.axis_0];
                    let y = params.target[plane.axis_1] - self.state.position[plane.axis_1];
                    params.offset = CartesianPoint::zero();

                    let mut h_x2_div_d = -(4.0 * params.r * params.r - x * x - y * y).sqrt() / x.hypot(y);
                    if h_x2_div_d.is_nan() {
                        return Err(GCodeStatus::FloatingPointError);
                    }
                    if self.state.motion_mode == MotionMode::CcwArc {
                        h_x2_div_d = -h_x2_div_d;
                    }
                    if params.r < 0.0 {
                        h_x2_div_d = -h_x2_div_d;
                    }
                    params.offset[plane.axis_0] = (x - y * h_x2_div_d) / 2.0;
                    params.offset[plane.axis_1] = (y + x * h_x2_div_d) / 2.0;
                }

                let theta_start = theta(-params.offset[plane.axis_0], -params.offset[plane.axis_1]);
                let mut theta_end = theta(
                    params.target[plane.axis_0] - params.offset[plane.axis_0] - self.state.position[plane.axis_0],
                    params.target[plane.axis_1] - params.offset[plane.axis_1] - self.state.position[plane.axis_1],
                );
                if theta_end < theta_start {
                    theta_end += 2.0 * PI;
                }
                let mut angular_travel = theta_end - theta_start;
                if self.state.motion_mode == MotionMode::CcwArc {
                    angular_travel -= 2.0 * PI;
                }

                let radius = params.offset[plane.axis_0].hypot(params.offset[plane.axis_1]);
                let depth = params.target[plane.axis_linear] - self.state.position[plane.axis_linear];
                let rate = if self.state.inverse_feed_rate_mode {
                    params.inverse_feed_rate.unwrap_or(-1.0)
                } else {
                    self.state.feed_rate
                };

                self.motion.arc(
                    theta_start,
                    angular_travel,
                    radius,
                    depth,
                    plane.axis_0,
                    plane.axis_1,
                    plane.axis_linear,
                    rate,
                    self.state.inverse_feed_rate_mode,
                    self.settings.mm_per_arc_segment(),
                    &mut self.state.position,
                );

                self.motion.planner_mut().plan_buffer_line(params.target, rate, self.state.inverse_feed_rate_mode);
            }
        }
        Ok(())
    }

    fn measure_cap(&mut self, selection: i64) {
        if selection == 0 || selection == -2 {
            self.report_axis(0, "X Axis");
        }
        if selection == 1 || selection == -2 {
            self.report_axis(1, "Y Axis");
        }
        if selection == 2 || selection == -2 {
            self.report_axis(2, "Z Axis");
        }
        if selection == -1 || selection == -2 {
            self.report_end_mill();
        }
    }

    fn report_axis(&mut self, axis: usize, label: &str) {
        match self.probe.axis_average(axis, capsense::DEFAULT_SAMPLES) {
            Ok(v) => self.sink.axis_val(label, Some(v)),
            Err(_) => self.sink.axis_val(label, None),
        }
    }

    fn report_end_mill(&mut self) {
        match self.probe.end_mill_average(capsense::DEFAULT_SAMPLES) {
            Ok(v) => self.sink.axis_val("End Mill", Some(v)),
            Err(_) => self.sink.axis_val("End Mill", None),
        }
    }
}

/// Angle in radians of deviance from the positive Y axis; negative to the
/// left of it, positive to the right.
fn theta(x: f64, y: f64) -> f64 {
    let t = (x / y.abs()).atan();
    if y > 0.0 {
        t
    } else if t > 0.0 {
        PI - t
    } else {
        -PI - t
    }
}
