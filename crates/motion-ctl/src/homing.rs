use crate::cap_probe::CapProbe;
use crate::planner::{AccelGuard, Planner};
use crate::point::CartesianPoint;
use capsense::DEFAULT_SAMPLES;

/// Result of a homing-by-probing run: how many approach iterations it took
/// and whether it gave up on a sensor timeout rather than crossing
/// `threshold`. Returned by value instead of printed directly, so the
/// caller (the serial/CLI glue) decides how `TimesMoved = <n>` gets
/// reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HomingReport {
    pub iterations: u16,
    pub timed_out: bool,
}

/// Shared body of `home_axis`/`home_mill`: probes `sample_axis` (or the
/// mill channel when `sample_axis` is `None`) and drives `move_axis` by
/// `step` each iteration, stopping when the filtered reading crosses
/// `threshold`, the probe times out, or `max_iters` is exhausted.
pub(crate) fn home_loop<P: Planner, C: CapProbe>(
    planner: &mut P,
    probe: &mut C,
    sample_axis: Option<usize>,
    move_axis: usize,
    feed: f64,
    step: f64,
    threshold: f64,
    max_iters: u16,
    position: &mut CartesianPoint,
) -> HomingReport {
    let mut guard = AccelGuard::disable(planner);

    let sample = |probe: &mut C| match sample_axis {
        Some(axis) => probe.axis_average(axis, DEFAULT_SAMPLES),
        None => probe.end_mill_average(DEFAULT_SAMPLES),
    };

    guard.planner_mut().synchronize();
    let mut last_average = match sample(probe) {
        Ok(v) => v,
        Err(_) => {
            return HomingReport { iterations: 0, timed_out: true };
        }
    };

    let mut iterations: u16 = 0;
    let mut timed_out = false;

    while iterations < max_iters && !timed_out && last_average < threshold {
        guard.planner_mut().synchronize();

        position[move_axis] = 0.0;
        guard.planner_mut().plan_redefine_current_position(*position);

        let mut target = *position;
        target[move_axis] = step;
        guard.planner_mut().plan_buffer_line(target, feed, false);

        guard.planner_mut().synchronize();

        match sample(probe) {
            Ok(v) => last_average = v,
            Err(_) => timed_out = true,
        }

        iterations += 1;
    }

    position[move_axis] = 0.0;
    guard.planner_mut().plan_redefine_current_position(*position);

    HomingReport { iterations, timed_out }
}
