//! A `clap` CLI around the mill's interpreter core: `run` for an
//! interactive, serial-like line loop over stdin, `batch` for replaying a
//! `.nc`/`.gcode` file in one shot. Both share [`cnc_host::build_interpreter`].

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cnc_host::sink::ConsoleSink;
use cnc_host::{build_interpreter, run_batch_file, run_interactive};
use cnc_settings::MillSettings;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "RS274/NGC interpreter core for a 3-axis capacitive-touch-off mill", long_about = None)]
struct Cli {
    /// Optional TOML file overriding the firmware-constant default settings.
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Read G-code lines from stdin one at a time, printing `ok`/error
    /// tokens and reports as they're produced — the host end of a serial
    /// line protocol.
    Run,
    /// Replay a G-code file in one shot and report the status of every
    /// line.
    Batch {
        /// Path to the `.nc`/`.gcode` file to process.
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let settings = match &cli.settings {
        Some(path) => {
            info!(?path, "loading settings override");
            cnc_host::config::HostConfig::load(path)?.into_settings()
        }
        None => MillSettings::default(),
    };

    match cli.command {
        Commands::Run => {
            info!("starting interactive run loop");
            let mut interp = build_interpreter(settings, ConsoleSink);
            let stdin = std::io::stdin();
            run_interactive(&mut interp, stdin.lock())
        }
        Commands::Batch { path } => {
            info!(?path, "starting batch run");
            let mut interp = build_interpreter(settings, ConsoleSink);
            let results = run_batch_file(&mut interp, &path)?;
            let failed = results.iter().filter(|(_, s)| !s.is_ok()).count();
            info!(total = results.len(), failed, "batch run summary");
            Ok(())
        }
    }
}
