use crate::CartesianPoint;

/// The real-time motion planner this core drives, but does not implement.
///
/// Step generation, acceleration-limited velocity profiling, and the
/// timer-interrupt step pulse all live below this trait and are out of
/// scope here (see the crate-level docs) — `motion-ctl` only ever calls
/// through this interface, exactly as the original firmware's
/// `motion_control.c` only ever calls `plan_buffer_line` and friends.
pub trait Planner {
    /// Enqueues a Cartesian line to `target` at `rate` (mm/s, or
    /// seconds-per-move when `invert_feed_rate` is set).
    fn plan_buffer_line(&mut self, target: CartesianPoint, rate: f64, invert_feed_rate: bool);

    /// Tells the planner that its internal step counters already
    /// correspond to `pos`, without commanding any motion.
    fn plan_redefine_current_position(&mut self, pos: CartesianPoint);

    /// Whether the planner's acceleration manager is currently enabled.
    fn is_acceleration_manager_enabled(&self) -> bool;

    /// Enables or disables the planner's acceleration manager.
    fn set_acceleration_manager_enabled(&mut self, enabled: bool);

    /// Blocks until every previously queued move has physically completed.
    fn synchronize(&mut self);
}

/// Captures the planner's acceleration-manager flag on construction and
/// restores it on drop, so `arc` and the homing entry points don't have to
/// repeat the capture/restore pairing that `mc_arc` and
/// `mc_do_homing_with_params` each did by hand in the original source.
pub struct AccelGuard<'p, P: Planner> {
    planner: &'p mut P,
    was_enabled: bool,
}

impl<'p, P: Planner> AccelGuard<'p, P> {
    pub fn disable(planner: &'p mut P) -> Self {
        let was_enabled = planner.is_acceleration_manager_enabled();
        planner.set_acceleration_manager_enabled(false);
        Self { planner, was_enabled }
    }

    pub fn planner_mut(&mut self) -> &mut P {
        self.planner
    }
}

impl<'p, P: Planner> Drop for AccelGuard<'p, P> {
    fn drop(&mut self) {
        self.planner.set_acceleration_manager_enabled(self.was_enabled);
    }
}
