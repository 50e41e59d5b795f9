//! Game state and turn handling

use serde::{Deserialize, Serialize};

use crate::board::{Board, Hex};
use crate::config::GameConfig;
use crate::error::{GameError, IllegalReason};

// ============================================================================
// CORE TYPES
// ============================================================================

/// Player mark. X always moves first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    X,
    O,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Player::X => 'X',
            Player::O => 'O',
        }
    }
}

/// Game result
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Ongoing,
    Won(Player),
    Draw,
}

impl GameResult {
    pub fn is_terminal(self) -> bool {
        self != GameResult::Ongoing
    }
}

// ============================================================================
// GAME STATE
// ============================================================================

/// State of one match. Only `place` changes it.
#[derive(Clone, Debug)]
pub struct GameState {
    config: GameConfig,
    board: Board,
    current_player: Player,
    result: GameResult,
    winning_line: Vec<Hex>,
    move_count: u32,
}

impl GameState {
    /// Start a match on an empty board with X to move
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        let board = Board::new(&config)?;
        Ok(Self {
            config,
            board,
            current_player: Player::X,
            result: GameResult::Ongoing,
            winning_line: Vec::new(),
            move_count: 0,
        })
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Player whose mark the next `place` puts down
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn result(&self) -> GameResult {
        self.result
    }

    pub fn is_over(&self) -> bool {
        self.result.is_terminal()
    }

    /// Winning player, if the game was won
    pub fn winner(&self) -> Option<Player> {
        match self.result {
            GameResult::Won(player) => Some(player),
            _ => None,
        }
    }

    /// Cells of the winning line (empty unless the game was won)
    pub fn winning_line(&self) -> &[Hex] {
        &self.winning_line
    }

    /// Number of marks placed so far
    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    /// Empty cells in (q, r) order; empty once the game is over
    pub fn valid_moves(&self) -> Vec<Hex> {
        if self.is_over() {
            return Vec::new();
        }
        self.board.empty_cells()
    }

    // ========================================================================
    // MOVE APPLICATION
    // ========================================================================

    /// Place the current player's mark at `hex`.
    ///
    /// A rejected move leaves the state untouched.
    pub fn place(&mut self, hex: Hex) -> Result<GameResult, GameError> {
        if self.is_over() {
            return Err(GameError::IllegalMove {
                hex,
                reason: IllegalReason::GameOver,
            });
        }

        let mover = self.current_player;
        self.board.place(hex, mover)?;
        self.move_count += 1;

        // Win check always precedes the draw check
        if let Some(line) = self.board.winning_line(hex, mover) {
            self.result = GameResult::Won(mover);
            self.winning_line = line;
        } else if self.board.is_full() {
            self.result = GameResult::Draw;
        } else {
            self.current_player = mover.opponent();
        }

        Ok(self.result)
    }
}
