//! The textual `OutputSink` backing used by both `run` and `batch`:
//! `println!` for the lines a serial terminal would actually see, plus a
//! `tracing::info!` line per dispatch for structured log consumers.

use std::cell::RefCell;
use std::rc::Rc;

use cnc_settings::{GCodeStatus, OutputSink, Settings};
use tracing::info;

#[derive(Default)]
pub struct ConsoleSink;

impl OutputSink for ConsoleSink {
    fn axis_val(&mut self, axis_label: &str, value: Option<f64>) {
        match value {
            Some(v) => {
                println!("{axis_label} Val: {v}");
                info!(axis_label, value = v, "capacitance reading");
            }
            None => {
                println!("timed out");
                info!(axis_label, "capacitance channel timed out");
            }
        }
    }

    fn times_moved(&mut self, n: u16) {
        println!("TimesMoved = {n}");
        info!(iterations = n, "homing finished");
    }

    fn ok(&mut self) {
        println!("ok");
    }

    fn error(&mut self, status: GCodeStatus) {
        println!("error: {} ({})", status.code(), status);
        info!(code = status.code(), %status, "line rejected");
    }

    fn mill_info(&mut self) {
        println!("r_mill firmware core (host simulator)");
    }

    fn settings_dump(&mut self, settings: &dyn Settings) {
        println!("$0={}", settings.steps_per_mm(0));
        println!("$1={}", settings.steps_per_mm(1));
        println!("$2={}", settings.steps_per_mm(2));
        println!("$3={}", settings.default_feed_rate_mm_per_min());
        println!("$4={}", settings.default_seek_rate_mm_per_min());
        println!("$5={}", settings.mm_per_arc_segment());
    }
}

/// A `Vec<String>`-backed sink for tests — the same collapsing-into-one-
/// trait shape as [`ConsoleSink`], just recording instead of printing, so
/// integration tests can assert on the exact report lines a line
/// produced.
#[derive(Default, Clone)]
pub struct RecordingSink {
    lines: Rc<RefCell<Vec<String>>>,
}

impl RecordingSink {
    pub fn entries(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }
}

impl OutputSink for RecordingSink {
    fn axis_val(&mut self, axis_label: &str, value: Option<f64>) {
        match value {
            Some(v) => self.lines.borrow_mut().push(format!("{axis_label} Val: {v}")),
            None => self.lines.borrow_mut().push("timed out".to_string()),
        }
    }
    fn times_moved(&mut self, n: u16) {
        self.lines.borrow_mut().push(format!("TimesMoved = {n}"));
    }
    fn ok(&mut self) {
        self.lines.borrow_mut().push("ok".to_string());
    }
    fn error(&mut self, status: GCodeStatus) {
        self.lines.borrow_mut().push(format!("error: {status}"));
    }
    fn mill_info(&mut self) {
        self.lines.borrow_mut().push("mill info".to_string());
    }
    fn settings_dump(&mut self, _settings: &dyn Settings) {
        self.lines.borrow_mut().push("settings dump".to_string());
    }
}
