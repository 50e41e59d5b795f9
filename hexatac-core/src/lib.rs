//! HexaTac Core - Game engine and AI
//!
//! This crate provides the core logic for HexaTac, a connection game on a
//! hexagonal board:
//! - Board geometry (centered hexagon in axial coordinates)
//! - Game state, turn order, win and draw detection
//! - Line-based position evaluation
//! - Minimax AI with alpha-beta pruning and difficulty profiles

pub mod board;
pub mod game;
pub mod eval;
pub mod ai;
pub mod config;
pub mod error;

// Re-exports for convenient access
pub use board::{Board, Hex, AXES};
pub use game::{GameResult, GameState, Player};
pub use eval::{evaluate, LineWeights, WIN_SCORE};
pub use ai::{find_best_move, find_best_move_with, play_out, AiPlayer};
pub use config::{Difficulty, DifficultyLevel, DifficultyTable, GameConfig, Settings};
pub use error::{GameError, IllegalReason};
