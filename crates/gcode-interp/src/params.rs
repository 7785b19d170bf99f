use motion_ctl::CartesianPoint;

/// Everything pass 2 folds out of a line's parameter tokens, handed to
/// dispatch alongside the [`crate::action::NextAction`] pass 1 produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineParams {
    pub target: CartesianPoint,
    pub offset: CartesianPoint,
    /// Raw (not unit-converted) `P` value — its meaning (dwell seconds,
    /// homing axis, origin-redefinition selection, cap channel selection)
    /// depends on the pending `NextAction`.
    pub p: f64,
    pub p_seen: bool,
    /// Unit-converted `R` value (arc radius, radius mode).
    pub r: f64,
    pub radius_mode: bool,
    /// mm/s, defaults to the modal feed rate; overridden by `F` when the
    /// pending action is a homing move.
    pub homing_feed_rate: f64,
    pub homing_dist_to_move: f64,
    pub homing_threshold: f64,
    pub homing_max_iters: u16,
    /// `Some(seconds)` when `F` was read under G93 inverse-feed-rate mode.
    pub inverse_feed_rate: Option<f64>,
    pub spindle_changed: bool,
}

impl LineParams {
    pub fn new(position: CartesianPoint, homing_feed_rate: f64) -> Self {
        Self {
            target: position,
            offset: CartesianPoint::zero(),
            p: 0.0,
            p_seen: false,
            r: 0.0,
            radius_mode: false,
            homing_feed_rate,
            homing_dist_to_move: 0.0,
            homing_threshold: 0.0,
            homing_max_iters: 0,
            inverse_feed_rate: None,
            spindle_changed: false,
        }
    }
}
