use thiserror::Error;

/// The status-code taxonomy surfaced by `execute_line`, mirroring the
/// original firmware's `gc.status_code` integer codes and the serial
/// protocol's error-token mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GCodeStatus {
    #[error("ok")]
    Ok,
    #[error("bad number format")]
    BadNumberFormat,
    #[error("expected command letter")]
    ExpectedCommandLetter,
    #[error("unsupported statement")]
    UnsupportedStatement,
    #[error("floating point error")]
    FloatingPointError,
}

impl GCodeStatus {
    pub fn is_ok(self) -> bool {
        matches!(self, GCodeStatus::Ok)
    }

    /// The integer code the serial protocol prints for this status.
    pub fn code(self) -> u8 {
        match self {
            GCodeStatus::Ok => 0,
            GCodeStatus::BadNumberFormat => 1,
            GCodeStatus::ExpectedCommandLetter => 2,
            GCodeStatus::UnsupportedStatement => 3,
            GCodeStatus::FloatingPointError => 4,
        }
    }
}
