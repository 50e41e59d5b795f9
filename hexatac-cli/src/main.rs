//! HexaTac CLI - Command-line interface
//!
//! Commands:
//! - play: Play against the computer in the terminal
//! - match: Pit two difficulty tiers against each other
//! - benchmark: Time the search at increasing depths

mod benchmark;
mod match_cmd;
mod play;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

use hexatac_core::Settings;

#[derive(Parser)]
#[command(name = "hexatac")]
#[command(about = "HexaTac: connect a line on a hex board against a minimax AI")]
struct Cli {
    /// Random seed for reproducible games
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Settings JSON file (board size, difficulty tiers, evaluator weights)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play against the AI
    Play(play::PlayArgs),
    /// Play AI-vs-AI games between two difficulty tiers
    Match(match_cmd::MatchArgs),
    /// Measure search time per depth
    Benchmark(benchmark::BenchmarkArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Play(args) => play::run(args, &settings, cli.seed),
        Commands::Match(args) => match_cmd::run(args, &settings, cli.seed),
        Commands::Benchmark(args) => benchmark::run(args, &settings, cli.seed),
    }
}

/// Settings from file, or built-in defaults
fn load_settings(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(path) => {
            let settings = Settings::load(path)?;
            tracing::info!("Loaded settings from {}", path.display());
            Ok(settings)
        }
        None => Ok(Settings::default()),
    }
}

/// Create RNG from seed or random
pub(crate) fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}
