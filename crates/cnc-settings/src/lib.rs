//! Settings views and the textual output sink shared by the interpreter
//! and its host glue — the "Glue" row of the system overview.

mod settings;
mod sink;
mod status;

pub use settings::{MillSettings, Settings, SettingsStore};
pub use sink::OutputSink;
pub use status::GCodeStatus;
