//! Match command - play AI-vs-AI games between two difficulty tiers
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_match(), report_results()
//! - Level 3: play_single_game(), compute_match_statistics()
//! - Level 4: formatting utilities

use anyhow::Result;
use clap::Args;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use hexatac_core::{
    play_out, AiPlayer, Difficulty, DifficultyLevel, GameConfig, GameResult, GameState,
    LineWeights, Player, Settings,
};

use crate::create_rng;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct MatchArgs {
    /// Tier of the first AI (plays X in odd-numbered games)
    #[arg(long, default_value = "hard")]
    pub first: DifficultyLevel,

    /// Tier of the second AI
    #[arg(long, default_value = "easy")]
    pub second: DifficultyLevel,

    /// Number of games to play (will alternate colors)
    #[arg(long, default_value = "10")]
    pub games: usize,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Which of the two AIs won a game
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome {
    First,
    Second,
    Draw,
}

/// Result of a single game
#[derive(Clone, Debug)]
struct GameRecord {
    game_number: usize,
    result: GameResult,
    outcome: Outcome,
    moves: usize,
    first_played_x: bool,
}

/// Aggregated match results
#[derive(Clone, Debug)]
struct MatchResults {
    first: DifficultyLevel,
    second: DifficultyLevel,
    games: Vec<GameRecord>,
    first_wins: usize,
    second_wins: usize,
    draws: usize,
    x_wins: usize,
    avg_moves: f32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run match command
///
/// This function reads like a table of contents:
/// 1. Resolve both difficulty profiles
/// 2. Play the match (multiple games)
/// 3. Report results
pub fn run(args: MatchArgs, settings: &Settings, seed: Option<u64>) -> Result<()> {
    let first = settings.difficulties.get(args.first);
    let second = settings.difficulties.get(args.second);

    tracing::info!(
        "Starting match: {} vs {} ({} games, radius={}, length={})",
        args.first,
        args.second,
        args.games,
        settings.board.radius,
        settings.board.winning_length
    );

    let results = play_match(
        settings.board,
        settings.weights,
        (args.first, first),
        (args.second, second),
        args.games,
        seed,
    )?;

    report_results(&results, &args);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Play all games in the match
fn play_match(
    config: GameConfig,
    weights: LineWeights,
    first: (DifficultyLevel, Difficulty),
    second: (DifficultyLevel, Difficulty),
    games: usize,
    seed: Option<u64>,
) -> Result<MatchResults> {
    let mut rng = create_rng(seed);
    let mut records = Vec::with_capacity(games);

    for game_num in 0..games {
        // Alternate colors for fairness
        let first_plays_x = game_num % 2 == 0;

        let record = play_single_game(
            config,
            weights,
            first.1,
            second.1,
            first_plays_x,
            game_num + 1,
            &mut rng,
        )?;

        tracing::info!(
            "Game {}: {:?} ({} moves)",
            record.game_number,
            record.result,
            record.moves
        );

        records.push(record);
    }

    Ok(compute_match_statistics(first.0, second.0, records))
}

/// Report match results
fn report_results(results: &MatchResults, args: &MatchArgs) {
    if args.json {
        print_json_results(results);
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Play one game; each AI gets its own RNG stream derived from `rng`
fn play_single_game(
    config: GameConfig,
    weights: LineWeights,
    first: Difficulty,
    second: Difficulty,
    first_plays_x: bool,
    game_number: usize,
    rng: &mut ChaCha8Rng,
) -> Result<GameRecord> {
    let mut first_ai = AiPlayer::with_seed(first, rng.gen()).with_weights(weights);
    let mut second_ai = AiPlayer::with_seed(second, rng.gen()).with_weights(weights);
    let first_side = if first_plays_x { Player::X } else { Player::O };

    let (x_ai, o_ai) = if first_plays_x {
        (&mut first_ai, &mut second_ai)
    } else {
        (&mut second_ai, &mut first_ai)
    };
    let (state, history) = play_out(GameState::new(config)?, x_ai, o_ai)?;

    let outcome = match state.result() {
        GameResult::Won(player) if player == first_side => Outcome::First,
        GameResult::Won(_) => Outcome::Second,
        _ => Outcome::Draw,
    };

    Ok(GameRecord {
        game_number,
        result: state.result(),
        outcome,
        moves: history.len(),
        first_played_x: first_plays_x,
    })
}

/// Compute aggregate statistics from game records
fn compute_match_statistics(
    first: DifficultyLevel,
    second: DifficultyLevel,
    games: Vec<GameRecord>,
) -> MatchResults {
    let count = |outcome: Outcome| games.iter().filter(|g| g.outcome == outcome).count();
    let first_wins = count(Outcome::First);
    let second_wins = count(Outcome::Second);
    let draws = count(Outcome::Draw);
    let x_wins = games
        .iter()
        .filter(|g| g.result == GameResult::Won(Player::X))
        .count();

    let total_moves: usize = games.iter().map(|g| g.moves).sum();
    let avg_moves = if games.is_empty() {
        0.0
    } else {
        total_moves as f32 / games.len() as f32
    };

    MatchResults {
        first,
        second,
        games,
        first_wins,
        second_wins,
        draws,
        x_wins,
        avg_moves,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn rate(count: usize, total: usize) -> f32 {
    if total > 0 {
        count as f32 / total as f32
    } else {
        0.0
    }
}

/// Print results as JSON
fn print_json_results(results: &MatchResults) {
    #[derive(serde::Serialize)]
    struct JsonGame {
        game_number: usize,
        result: GameResult,
        moves: usize,
        first_played_x: bool,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput {
        first: DifficultyLevel,
        second: DifficultyLevel,
        total_games: usize,
        first_wins: usize,
        second_wins: usize,
        draws: usize,
        x_wins: usize,
        avg_moves: f32,
        first_win_rate: f32,
        games: Vec<JsonGame>,
    }

    let total = results.games.len();
    let output = JsonOutput {
        first: results.first,
        second: results.second,
        total_games: total,
        first_wins: results.first_wins,
        second_wins: results.second_wins,
        draws: results.draws,
        x_wins: results.x_wins,
        avg_moves: results.avg_moves,
        first_win_rate: rate(results.first_wins, total),
        games: results
            .games
            .iter()
            .map(|g| JsonGame {
                game_number: g.game_number,
                result: g.result,
                moves: g.moves,
                first_played_x: g.first_played_x,
            })
            .collect(),
    };

    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{}", json),
        Err(e) => tracing::warn!("Failed to serialize results: {}", e),
    }
}

/// Print results as text
fn print_text_results(results: &MatchResults) {
    let total = results.games.len();

    println!("\n=== Match Results: {} vs {} ===", results.first, results.second);
    println!("Total games:  {}", total);
    println!(
        "{:<6} wins:  {} ({:.1}%)",
        results.first.to_string(),
        results.first_wins,
        rate(results.first_wins, total) * 100.0
    );
    println!(
        "{:<6} wins:  {} ({:.1}%)",
        results.second.to_string(),
        results.second_wins,
        rate(results.second_wins, total) * 100.0
    );
    println!(
        "Draws:        {} ({:.1}%)",
        results.draws,
        rate(results.draws, total) * 100.0
    );
    println!("X wins:       {}", results.x_wins);
    println!("Avg moves:    {:.1}", results.avg_moves);

    println!("\nGame details:");
    for game in &results.games {
        let first_side = if game.first_played_x { 'X' } else { 'O' };
        println!(
            "  Game {}: {:?} in {} moves ({} played {})",
            game.game_number, game.result, game.moves, results.first, first_side
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================
