//! tilemerge CLI - drive the rule engine from the command line
//!
//! Commands:
//! - play: apply directions read from stdin and print the board
//! - simulate: play many automated games and report statistics

mod play_cmd;
mod policy;
mod simulate_cmd;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tilemerge_core::EngineConfig;

#[derive(Parser)]
#[command(name = "tilemerge")]
#[command(about = "Sliding-tile merge puzzle engine")]
struct Cli {
    /// Random seed for reproducible games
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Engine configuration JSON file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one game, reading a direction per line from stdin
    Play(play_cmd::PlayArgs),
    /// Play many games with an automated policy
    Simulate(simulate_cmd::SimulateArgs),
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,tilemerge=info,tilemerge_core=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), cli.seed)?;

    match cli.command {
        Commands::Play(args) => play_cmd::run(args, config),
        Commands::Simulate(args) => simulate_cmd::run(args, config),
    }
}

/// Config file (or defaults), with the command-line seed taking precedence
fn load_config(path: Option<&Path>, seed: Option<u64>) -> Result<EngineConfig> {
    let mut config = match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(seed) = seed {
        config.seed = Some(seed);
    }
    Ok(config)
}
