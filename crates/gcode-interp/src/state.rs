use cnc_settings::Settings;
use motion_ctl::CartesianPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionMode {
    #[default]
    Seek,
    Linear,
    CwArc,
    CcwArc,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgramFlow {
    #[default]
    Running,
    Paused,
    Completed,
}

/// The plane currently selected by G17/G18/G19: `axis_0`/`axis_1` are the
/// in-plane axes an arc is traced across, `axis_linear` is the remaining
/// depth axis advanced for helical motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneSelection {
    pub axis_0: usize,
    pub axis_1: usize,
    pub axis_linear: usize,
}

impl Default for PlaneSelection {
    fn default() -> Self {
        Self { axis_0: 0, axis_1: 1, axis_linear: 2 }
    }
}

/// Modal interpreter state, persisting across lines for the life of the
/// session. A single owned record passed explicitly through
/// [`crate::GCodeParser`] rather than hidden process-global state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterpreterState {
    pub motion_mode: MotionMode,
    pub inverse_feed_rate_mode: bool,
    pub inches_mode: bool,
    pub absolute_mode: bool,
    pub program_flow: ProgramFlow,
    /// -1 = CCW, 0 = off, +1 = CW.
    pub spindle_direction: i8,
    /// mm/s.
    pub feed_rate: f64,
    /// mm/s.
    pub seek_rate: f64,
    pub position: CartesianPoint,
    pub tool: u32,
    pub spindle_speed: i16,
    pub plane: PlaneSelection,
}

impl InterpreterState {
    pub fn new(settings: &impl Settings) -> Self {
        Self {
            motion_mode: MotionMode::default(),
            inverse_feed_rate_mode: false,
            inches_mode: false,
            absolute_mode: true,
            program_flow: ProgramFlow::default(),
            spindle_direction: 0,
            feed_rate: settings.default_feed_rate_mm_per_min() / 60.0,
            seek_rate: settings.default_seek_rate_mm_per_min() / 60.0,
            position: CartesianPoint::zero(),
            tool: 0,
            spindle_speed: 0,
            plane: PlaneSelection::default(),
        }
    }

    pub fn select_plane(&mut self, axis_0: usize, axis_1: usize, axis_linear: usize) {
        self.plane = PlaneSelection { axis_0, axis_1, axis_linear };
    }

    /// Converts a value in the currently active unit system to millimetres.
    pub fn to_millimeters(&self, value: f64) -> f64 {
        const MM_PER_INCH: f64 = 25.4;
        if self.inches_mode {
            value * MM_PER_INCH
        } else {
            value
        }
    }
}
