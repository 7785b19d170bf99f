use crate::settings::Settings;
use crate::status::GCodeStatus;

/// The textual serial-output surface, collapsing the original firmware's
/// `serial_protocol` print helpers (`printPgmString`/`printFloat`/
/// `print_newline`) into one trait so `cnc-host` can back it with
/// `println!`/`tracing::info!` and tests can back it with a recorder.
pub trait OutputSink {
    /// `"<Label> Val: <float>\n"`, or `"timed out\n"` when `value` is
    /// `None` (a capacitance read that timed out).
    fn axis_val(&mut self, axis_label: &str, value: Option<f64>);

    /// `"TimesMoved = <n>\n"`.
    fn times_moved(&mut self, n: u16);

    /// `"ok\n"`.
    fn ok(&mut self);

    /// The error-token mapping for a non-OK status code.
    fn error(&mut self, status: GCodeStatus);

    /// `$$` mill-info dump.
    fn mill_info(&mut self);

    /// `$` settings dump.
    fn settings_dump(&mut self, settings: &dyn Settings);
}
