//! Error taxonomy for the board and decision engine

use thiserror::Error;

use crate::board::Hex;

/// Why a placement was rejected
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum IllegalReason {
    #[error("cell is not on the board")]
    OffBoard,
    #[error("cell is already occupied")]
    Occupied,
    #[error("game is already over")]
    GameOver,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GameError {
    /// Recoverable: the caller does not apply the move and may re-prompt
    #[error("illegal move at {hex}: {reason}")]
    IllegalMove { hex: Hex, reason: IllegalReason },
    /// Search was asked for a move with no empty cells left
    #[error("no move available")]
    NoMoveAvailable,
    /// Fatal at setup; a match must not start
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}
