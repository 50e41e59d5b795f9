//! Position evaluation

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::game::Player;

/// Score of a completed line (effectively infinite)
pub const WIN_SCORE: i32 = 100_000;

/// Per-line scores for the static evaluator.
///
/// For a winning length `L`: a full line has `L` own marks, "one short" is
/// `L-1` marks plus one empty cell, "two short" is `L-2` marks plus two
/// empties. Tiers with fewer than two marks never score.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineWeights {
    pub full: i32,
    pub one_short: i32,
    pub two_short: i32,
    /// Opponent one short of a line
    pub opponent_one_short: i32,
    /// Opponent two short of a line
    pub opponent_two_short: i32,
}

impl Default for LineWeights {
    fn default() -> Self {
        // Blocking outweighs advancing at the one-short tier
        Self {
            full: WIN_SCORE,
            one_short: 1_000,
            two_short: 50,
            opponent_one_short: -5_000,
            opponent_two_short: -200,
        }
    }
}

impl LineWeights {
    /// Score one run given its composition
    pub fn score_line(&self, own: usize, opponent: usize, empty: usize, length: usize) -> i32 {
        let mut score = 0;

        if own == length {
            score += self.full;
        } else if own >= 2 && own + 1 == length && empty == 1 {
            score += self.one_short;
        } else if own >= 2 && own + 2 == length && empty == 2 {
            score += self.two_short;
        }

        if opponent >= 2 && opponent + 1 == length && empty == 1 {
            score += self.opponent_one_short;
        } else if opponent >= 2 && opponent + 2 == length && empty == 2 {
            score += self.opponent_two_short;
        }

        score
    }
}

/// Evaluate position from `player`'s perspective.
///
/// The sum saturates at the `i32` bounds.
pub fn evaluate(board: &Board, player: Player, weights: &LineWeights) -> i32 {
    let length = board.winning_length();
    let opponent = player.opponent();

    let total: i64 = board
        .lines()
        .map(|line| {
            let mut own = 0;
            let mut theirs = 0;
            for &idx in line {
                match board.owner_at(idx) {
                    Some(p) if p == player => own += 1,
                    Some(p) if p == opponent => theirs += 1,
                    _ => {}
                }
            }
            let empty = length - own - theirs;
            i64::from(weights.score_line(own, theirs, empty, length))
        })
        .sum();

    total.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
