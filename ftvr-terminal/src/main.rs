/// FTVR Terminal Demo - head-coupled stereo in the terminal
///
/// Renders a tumbling cube behind a virtual screen for both eyes, side by
/// side, driven either by the keyboard or by a recorded tracking trace.
/// Controls:
///   - WASD / Arrow Keys: Move the glasses
///   - R/F: Move the glasses towards / away from the screen
///   - IJKL: Move the pen
///   - [ / ]: Shrink / grow the interpupillary distance
///   - H: Toggle handedness
///   - Q/ESC: Quit
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use ftvr_core::trace::load_trace;
use ftvr_core::TraceReplay;
use ftvr_terminal::settings::{build_rig, RigArgs, RigFile};
use ftvr_terminal::{KeyboardTracker, TerminalApp, Tracker};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "ftvr-terminal", version, about = "Fish-tank VR stereo renderer for the terminal")]
struct Cli {
    /// Replay a recorded tracking trace instead of keyboard input
    #[arg(long)]
    trace: Option<PathBuf>,

    /// Stop when the trace ends instead of looping
    #[arg(long, requires = "trace")]
    no_loop: bool,

    /// TOML rig description; command-line values take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs here (filtered by RUST_LOG, default "warn")
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(flatten)]
    rig: RigArgs,
}

/// The terminal is owned by the renderer, so logs only go to a file.
fn init_logging(path: Option<&Path>) -> anyhow::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("failed to create log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let rig_file = cli.config.as_deref().map(RigFile::load).transpose()?;
    let rig = build_rig(&cli.rig, rig_file.as_ref())?;

    let tracker = match &cli.trace {
        Some(path) => {
            let samples = load_trace(path).with_context(|| format!("failed to load trace {}", path.display()))?;
            tracing::info!(samples = samples.len(), "replaying trace");
            Tracker::Replay(TraceReplay::new(samples, !cli.no_loop)?)
        }
        None => Tracker::Keyboard(KeyboardTracker::new(rig.config().screen.distance)),
    };

    let mut app = TerminalApp::new(rig, tracker)?;
    app.run()?;
    Ok(())
}
