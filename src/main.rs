//! arcana-replay - drive the gesture engine from a recorded landmark stream
//!
//! Reads s-expression messages (one per line) from a file or stdin and
//! prints the resulting interaction events.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use arcana_gesture::gesture::{EngineConfig, GestureEngine};
use arcana_gesture::replay;

#[derive(Parser, Debug)]
#[command(name = "arcana-replay", about = "Replay hand landmarks through the gesture engine")]
struct Cli {
    /// Replay file (default: stdin)
    input: Option<PathBuf>,

    /// Frames in the majority-vote window
    #[arg(long, default_value_t = 6)]
    history_size: usize,

    /// Minimum votes for a stable gesture
    #[arg(long, default_value_t = 4)]
    stable_min: usize,

    /// Minimum time between dispatched events (ms)
    #[arg(long, default_value_t = 400.0)]
    debounce_ms: f64,

    /// Edge band width in mirrored x
    #[arg(long, default_value_t = 0.18)]
    edge_threshold: f64,

    /// Edge-scroll repeat period (ms)
    #[arg(long, default_value_t = 200.0)]
    edge_scroll_interval_ms: f64,

    /// Record per-frame classification detail
    #[arg(long)]
    debug: bool,

    /// Print the engine status after the replay
    #[arg(long)]
    status: bool,
}

impl Cli {
    fn engine_config(&self) -> anyhow::Result<EngineConfig> {
        anyhow::ensure!(
            self.edge_scroll_interval_ms > 0.0,
            "--edge-scroll-interval-ms must be positive"
        );
        anyhow::ensure!(
            (0.0..=0.5).contains(&self.edge_threshold),
            "--edge-threshold must be within 0..0.5"
        );
        Ok(EngineConfig {
            history_size: self.history_size,
            stable_min: self.stable_min,
            debounce_ms: self.debounce_ms,
            edge_threshold: self.edge_threshold,
            edge_scroll_interval_ms: self.edge_scroll_interval_ms,
            debug: self.debug,
        })
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "arcana_gesture=info,arcana_replay=info".into()),
        )
        .init();

    info!("arcana-replay v{} starting", env!("CARGO_PKG_VERSION"));

    let mut engine = GestureEngine::with_config(cli.engine_config()?, Vec::new());
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let summary = match &cli.input {
        Some(path) => {
            info!("replaying {}", path.display());
            let file = File::open(path)
                .with_context(|| format!("opening replay file {}", path.display()))?;
            replay::run(&mut engine, BufReader::new(file), &mut out)?
        }
        None => {
            info!("replaying stdin");
            replay::run(&mut engine, io::stdin().lock(), &mut out)?
        }
    };

    if cli.status {
        writeln!(out, "{}", engine.status_sexp()).context("writing status")?;
    }
    engine.dispose();

    if summary.errors > 0 {
        info!("{} of {} messages rejected", summary.errors, summary.messages);
    }
    Ok(())
}
