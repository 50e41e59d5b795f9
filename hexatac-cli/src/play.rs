//! Play command - human vs AI in the terminal
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: run_session() - the turn loop
//! - Level 3: human_turn(), ai_turn(), report_outcome()
//! - Level 4: input parsing

use std::io::{self, BufRead, Write};

use anyhow::Result;
use clap::Args;

use hexatac_core::{
    AiPlayer, Difficulty, DifficultyLevel, GameError, GameResult, GameState, Hex, Player, Settings,
};

use crate::create_rng;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// Difficulty tier (easy, medium, hard)
    #[arg(long, default_value = "medium")]
    pub difficulty: DifficultyLevel,

    /// Override the tier's search depth
    #[arg(long)]
    pub depth: Option<u32>,

    /// Override the tier's mistake probability
    #[arg(long)]
    pub mistake: Option<f64>,

    /// Let the AI take the first move (it plays X)
    #[arg(long)]
    pub ai_first: bool,
}

/// What the human typed on their turn
enum Input {
    Move(Hex),
    Quit,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
pub fn run(args: PlayArgs, settings: &Settings, seed: Option<u64>) -> Result<()> {
    let difficulty = resolve_difficulty(&args, settings)?;
    let ai_side = if args.ai_first { Player::X } else { Player::O };

    tracing::info!(
        "New game: radius={}, length={}, difficulty={} (depth={}, mistake={})",
        settings.board.radius,
        settings.board.winning_length,
        args.difficulty,
        difficulty.depth,
        difficulty.mistake
    );

    let game = GameState::new(settings.board)?;
    let mut ai =
        AiPlayer::with_rng(difficulty, create_rng(seed)).with_weights(settings.weights);

    let stdin = io::stdin();
    let stdout = io::stdout();
    run_session(game, &mut ai, ai_side, stdin.lock(), stdout.lock())?;

    Ok(())
}

// ============================================================================
// LEVEL 2 - TURN LOOP
// ============================================================================

/// Alternate turns until the game ends or input runs out
fn run_session<R: BufRead, W: Write>(
    mut game: GameState,
    ai: &mut AiPlayer,
    ai_side: Player,
    mut input: R,
    mut out: W,
) -> Result<GameState> {
    writeln!(
        out,
        "Connect {} in a row. You are {}. Enter moves as \"q r\", or \"quit\".",
        game.config().winning_length,
        ai_side.opponent().symbol()
    )?;

    loop {
        writeln!(out, "\n{}", game.board())?;

        if game.is_over() {
            report_outcome(&game, ai_side, &mut out)?;
            return Ok(game);
        }

        if game.current_player() == ai_side {
            ai_turn(&mut game, ai, &mut out)?;
            continue;
        }

        if !human_turn(&mut game, &mut input, &mut out)? {
            writeln!(out, "Game abandoned.")?;
            return Ok(game);
        }
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Prompt until a legal move is placed. Returns false if the player quit.
fn human_turn<R: BufRead, W: Write>(
    game: &mut GameState,
    input: &mut R,
    out: &mut W,
) -> Result<bool> {
    loop {
        write!(out, "Your move ({}): ", game.current_player().symbol())?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(false);
        }

        let hex = match parse_input(&line) {
            Ok(Input::Move(hex)) => hex,
            Ok(Input::Quit) => return Ok(false),
            Err(msg) => {
                writeln!(out, "{}", msg)?;
                continue;
            }
        };

        match game.place(hex) {
            Ok(_) => return Ok(true),
            Err(err @ GameError::IllegalMove { .. }) => {
                writeln!(out, "{}", err)?;
            }
            Err(err) => return Err(err.into()),
        }
    }
}

fn ai_turn<W: Write>(game: &mut GameState, ai: &mut AiPlayer, out: &mut W) -> Result<()> {
    let mv = ai.choose_move(game)?;
    game.place(mv)?;
    tracing::debug!(%mv, "AI moved");
    writeln!(out, "AI plays {}", mv)?;
    Ok(())
}

fn report_outcome<W: Write>(game: &GameState, ai_side: Player, out: &mut W) -> Result<()> {
    match game.result() {
        GameResult::Won(player) => {
            let who = if player == ai_side { "the AI" } else { "you" };
            let line: Vec<String> = game.winning_line().iter().map(Hex::to_string).collect();
            writeln!(out, "{} wins ({}): {}", player.symbol(), who, line.join(" "))?;
        }
        GameResult::Draw => writeln!(out, "Draw: the board is full.")?,
        GameResult::Ongoing => {}
    }
    Ok(())
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Tier profile with any command-line overrides applied
fn resolve_difficulty(args: &PlayArgs, settings: &Settings) -> Result<Difficulty> {
    let base = settings.difficulties.get(args.difficulty);
    let difficulty = Difficulty::new(
        args.depth.unwrap_or(base.depth),
        args.mistake.unwrap_or(base.mistake),
    )?;
    Ok(difficulty)
}

/// Accepts "q r", "q,r" or "(q, r)"
fn parse_input(line: &str) -> Result<Input, String> {
    let trimmed = line.trim();
    if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("q") {
        return Ok(Input::Quit);
    }

    let parts: Vec<&str> = trimmed
        .trim_start_matches('(')
        .trim_end_matches(')')
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect();

    match parts.as_slice() {
        [q, r] => {
            let q = q.parse::<i32>().map_err(|_| format!("Could not parse q: {}", q))?;
            let r = r.parse::<i32>().map_err(|_| format!("Could not parse r: {}", r))?;
            Ok(Input::Move(Hex::new(q, r)))
        }
        _ => Err(format!("Could not parse move: {:?} (expected \"q r\")", trimmed)),
    }
}

// ============================================================================
// TESTS
// ============================================================================
