//! Benchmark command - time the search at increasing depths
//!
//! The search has no time limit, so callers bound latency by choosing the
//! depth. This reports how long a move takes at each depth.
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: benchmark_depths(), report_results()
//! - Level 3: benchmark_depth(), create_random_position()
//! - Level 4: timing utilities, formatting

use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Args;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use hexatac_core::{
    find_best_move_with, Difficulty, GameConfig, GameState, LineWeights, Settings,
};

use crate::create_rng;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct BenchmarkArgs {
    /// Maximum search depth to test
    #[arg(long, default_value = "4")]
    pub depth: u32,

    /// Number of random positions per depth
    #[arg(long, default_value = "10")]
    pub positions: usize,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Timing for one depth
#[derive(Clone, Debug, serde::Serialize)]
struct BenchmarkResult {
    depth: u32,
    positions: usize,
    #[serde(serialize_with = "as_millis")]
    total_time: Duration,
    #[serde(serialize_with = "as_millis")]
    avg_time: Duration,
    #[serde(serialize_with = "as_millis")]
    max_time: Duration,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run benchmark command
pub fn run(args: BenchmarkArgs, settings: &Settings, seed: Option<u64>) -> Result<()> {
    tracing::info!(
        "Starting benchmarks: {} positions per depth, max depth {}",
        args.positions,
        args.depth
    );

    let results = benchmark_depths(
        settings.board,
        &settings.weights,
        args.depth,
        args.positions,
        seed,
    )?;

    report_results(&results, args.json);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Benchmark every depth from 1 to `max_depth` on the same positions
fn benchmark_depths(
    config: GameConfig,
    weights: &LineWeights,
    max_depth: u32,
    positions: usize,
    seed: Option<u64>,
) -> Result<Vec<BenchmarkResult>> {
    let mut rng = create_rng(seed);
    let states = (0..positions)
        .map(|_| create_random_position(config, &mut rng))
        .collect::<Result<Vec<_>>>()?;

    let mut results = Vec::new();
    for depth in 1..=max_depth {
        tracing::info!("Benchmarking depth {}...", depth);
        results.push(benchmark_depth(&states, weights, depth, &mut rng)?);
    }
    Ok(results)
}

fn report_results(results: &[BenchmarkResult], json: bool) {
    if json {
        match serde_json::to_string_pretty(results) {
            Ok(json) => println!("{}", json),
            Err(e) => tracing::warn!("Failed to serialize results: {}", e),
        }
        return;
    }

    println!("\n=== Search Benchmark ===");
    println!("{:>5}  {:>9}  {:>12}  {:>12}", "depth", "positions", "avg (ms)", "max (ms)");
    for r in results {
        println!(
            "{:>5}  {:>9}  {:>12.3}  {:>12.3}",
            r.depth,
            r.positions,
            millis(r.avg_time),
            millis(r.max_time)
        );
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Time `find_best_move_with` without mistakes on each ongoing position
fn benchmark_depth(
    states: &[GameState],
    weights: &LineWeights,
    depth: u32,
    rng: &mut ChaCha8Rng,
) -> Result<BenchmarkResult> {
    let difficulty = Difficulty::new(depth, 0.0)?;
    let mut total_time = Duration::ZERO;
    let mut max_time = Duration::ZERO;
    let mut timed = 0;

    for state in states.iter().filter(|s| !s.is_over()) {
        let start = Instant::now();
        let mv = find_best_move_with(
            state.board(),
            state.current_player(),
            &difficulty,
            weights,
            rng,
        );
        let elapsed = start.elapsed();

        if mv.is_none() {
            continue;
        }
        total_time += elapsed;
        max_time = max_time.max(elapsed);
        timed += 1;
    }

    let avg_time = if timed > 0 {
        total_time / timed as u32
    } else {
        Duration::ZERO
    };

    Ok(BenchmarkResult {
        depth,
        positions: timed,
        total_time,
        avg_time,
        max_time,
    })
}

/// Random opening: up to a third of the board filled by random moves
fn create_random_position(config: GameConfig, rng: &mut ChaCha8Rng) -> Result<GameState> {
    let mut state = GameState::new(config)?;
    let plies = rng.gen_range(0..=config.cell_count() / 3);

    for _ in 0..plies {
        let moves = state.valid_moves();
        let Some(&mv) = moves.choose(rng) else {
            break;
        };
        state.place(mv)?;
        if state.is_over() {
            break;
        }
    }

    Ok(state)
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn millis(d: Duration) -> f64 {
    d.as_micros() as f64 / 1000.0
}

fn as_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(millis(*d))
}
