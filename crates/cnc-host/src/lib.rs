//! # cnc-host
//!
//! The supervising process around `gcode-interp`: a line-at-a-time loop
//! (over stdin or a file) that feeds normalised lines into the
//! interpreter, backed by simulated `Planner`/`CapPort`/spindle-pin
//! implementations since there is no real AVR hardware to drive from a
//! host binary. Strictly single-threaded and cooperative: one line in,
//! one status line out, no background tasks.

pub mod config;
pub mod sim;
pub mod sink;

use std::io::BufRead;

use anyhow::{Context, Result};
use capsense::CapSense;
use cnc_settings::{GCodeStatus, MillSettings, OutputSink};
use gcode_interp::GCodeParser;
use tracing::{info, warn};

use sim::{SimCapChannel, SimDelay, SimPlanner, SimSpindlePin};

/// The axis-plate and end-mill channels share one simulated RC model;
/// 310/16MHz mirrors the original `cc_init` loop-timing factor and CPU
/// clock used to derive `capTimeout`.
const LOOP_TIMING_FACTOR: u32 = 310;
const SIM_CPU_HZ: u32 = 16_000_000;
/// Simulated plate charges fully in about 20 loop iterations — fast
/// enough that a `batch` run over a real program finishes promptly.
const SIM_RISE_PER_CYCLE: f64 = 0.05;

pub type HostCapSense = CapSense<SimCapChannel, SimCapChannel>;
pub type HostInterpreter<O> = GCodeParser<SimPlanner, HostCapSense, SimSpindlePin, SimDelay, MillSettings, O>;

/// Builds an interpreter wired to the simulated backends, ready to drive
/// from a `run` REPL or a `batch` file.
pub fn build_interpreter<O: OutputSink>(settings: MillSettings, sink: O) -> HostInterpreter<O> {
    let timeout = capsense::derive_timeout(LOOP_TIMING_FACTOR, SIM_CPU_HZ);
    let probe = CapSense::new(
        SimCapChannel::new(SIM_RISE_PER_CYCLE),
        SimCapChannel::new(SIM_RISE_PER_CYCLE),
        timeout,
    );
    GCodeParser::new(SimPlanner::new(), probe, SimSpindlePin::default(), SimDelay, settings, sink)
}

/// Normalises a raw line the way a real serial front-end would before it
/// ever reaches the interpreter: uppercase, whitespace stripped. Lets
/// `run`/`batch` feed raw human-typed or file lines straight into
/// [`gcode_interp::GCodeParser::execute_line`].
pub fn normalize_line(line: &str) -> String {
    line.chars().filter(|c| !c.is_whitespace()).collect::<String>().to_uppercase()
}

/// Runs one already-normalised-or-not line through `interp`, returning
/// its status. Blank lines are a no-op (`Ok`), matching a serial link
/// that never hands the interpreter an empty line in the first place.
pub fn run_line<O: OutputSink>(interp: &mut HostInterpreter<O>, line: &str) -> GCodeStatus {
    let normalized = normalize_line(line);
    if normalized.is_empty() {
        return GCodeStatus::Ok;
    }
    interp.execute_line(&normalized)
}

/// Processes every line of `path` in order, returning the status of each
/// non-blank line alongside its 1-based line number.
pub fn run_batch_file<O: OutputSink>(
    interp: &mut HostInterpreter<O>,
    path: &std::path::Path,
) -> Result<Vec<(usize, GCodeStatus)>> {
    let file = std::fs::File::open(path).with_context(|| format!("failed to open g-code file: {:?}", path))?;
    let reader = std::io::BufReader::new(file);
    let mut results = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {} of {:?}", idx + 1, path))?;
        let normalized = normalize_line(&line);
        if normalized.is_empty() {
            continue;
        }
        let status = interp.execute_line(&normalized);
        if !status.is_ok() {
            warn!(line = idx + 1, %status, "line rejected");
        }
        results.push((idx + 1, status));
    }

    info!(lines = results.len(), "batch run finished");
    Ok(results)
}

/// Interactive line-at-a-time loop over `reader`, mirroring a serial
/// terminal: one line in, one `ok`/error token out via the interpreter's
/// configured sink.
pub fn run_interactive<O: OutputSink>(interp: &mut HostInterpreter<O>, reader: impl BufRead) -> Result<()> {
    for line in reader.lines() {
        let line = line.context("failed to read a line from stdin")?;
        let normalized = normalize_line(&line);
        if normalized.is_empty() {
            continue;
        }
        interp.execute_line(&normalized);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sink::RecordingSink;
    use std::io::Write;

    #[test]
    fn normalize_line_uppercases_and_strips_whitespace() {
        assert_eq!(normalize_line("g1 x10 y0 f600"), "G1X10Y0F600");
    }

    #[test]
    fn run_line_advances_position_and_reports_ok() {
        let sink = RecordingSink::default();
        let mut interp = build_interpreter(MillSettings::default(), sink.clone());
        let status = run_line(&mut interp, "g21 g90 g1 x10 y0 z0 f600");
        assert!(status.is_ok());
        assert_eq!(interp.state().position, motion_ctl::CartesianPoint::new(10.0, 0.0, 0.0));
        assert_eq!(sink.entries(), vec!["ok".to_string()]);
    }

    #[test]
    fn blank_lines_are_ignored() {
        let sink = RecordingSink::default();
        let mut interp = build_interpreter(MillSettings::default(), sink.clone());
        assert_eq!(run_line(&mut interp, "   "), GCodeStatus::Ok);
        assert!(sink.entries().is_empty());
    }

    #[test]
    fn batch_file_reports_a_status_per_non_blank_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "G21 G90 G1 X10 F600").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "G200").unwrap();
        file.flush().unwrap();

        let sink = RecordingSink::default();
        let mut interp = build_interpreter(MillSettings::default(), sink);
        let results = run_batch_file(&mut interp, file.path()).unwrap();

        assert_eq!(results.len(), 2);
        assert!(results[0].1.is_ok());
        assert!(!results[1].1.is_ok());
    }
}
