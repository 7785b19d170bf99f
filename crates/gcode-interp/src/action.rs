/// The physical action pass 1 determines should be taken once pass 2 has
/// finished folding in parameters, mirroring the original parser's
/// `next_action` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NextAction {
    #[default]
    Default,
    Dwell,
    GoHome,
    MeasureCap,
    MillGoHome,
    CurPosIsOrigin,
    TurnOffAccel,
    TurnOnAccel,
}
