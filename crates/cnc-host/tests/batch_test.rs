//! End-to-end batch run: a short G-code program through `cnc-host`'s
//! library entry point, asserting the final simulated position and the
//! recorded report lines — the workspace's own convention for an
//! integration test that exercises a whole binary's worth of glue rather
//! than one crate in isolation.

use std::io::Write;

use cnc_host::sink::RecordingSink;
use cnc_host::{build_interpreter, run_batch_file};
use cnc_settings::MillSettings;
use motion_ctl::CartesianPoint;

#[test]
fn batch_program_advances_position_and_reports_per_line() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "(square test program)").unwrap();
    writeln!(file, "G21 G90 G1 X10 Y0 Z0 F600").unwrap();
    writeln!(file, "G1 X10 Y10").unwrap();
    writeln!(file, "G1 X0 Y10").unwrap();
    writeln!(file, "G1 X0 Y0").unwrap();
    file.flush().unwrap();

    let sink = RecordingSink::default();
    let mut interp = build_interpreter(MillSettings::default(), sink.clone());
    let results = run_batch_file(&mut interp, file.path()).unwrap();

    // The comment line does not appear in status results.
    assert_eq!(results.len(), 4);
    assert!(results.iter().all(|(_, status)| status.is_ok()));

    assert_eq!(interp.state().position, CartesianPoint::zero());
    assert_eq!(sink.entries(), vec!["ok"; 4]);
}

#[test]
fn batch_program_stops_reporting_motion_on_a_bad_line_but_continues_the_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "G21 G90 G1 X5 F300").unwrap();
    writeln!(file, "G1 X").unwrap();
    writeln!(file, "G1 X15").unwrap();
    file.flush().unwrap();

    let sink = RecordingSink::default();
    let mut interp = build_interpreter(MillSettings::default(), sink.clone());
    let results = run_batch_file(&mut interp, file.path()).unwrap();

    assert!(results[0].1.is_ok());
    assert!(!results[1].1.is_ok());
    assert!(results[2].1.is_ok());
    // The bad line never updates position; the following line still
    // applies against the last good target.
    assert_eq!(interp.state().position.x, 15.0);
}
