//! Minimax AI with alpha-beta pruning
//!
//! Move selection runs in three stages:
//! 1. Immediate-threat scan (win now, else block the opponent's win)
//! 2. Mistake injection (random move with the profile's probability)
//! 3. Depth-limited minimax with alpha-beta pruning
//!
//! All exploration happens on board copies; the caller's board is never touched.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::board::{Board, Hex};
use crate::config::Difficulty;
use crate::error::GameError;
use crate::eval::{evaluate, LineWeights, WIN_SCORE};
use crate::game::{GameState, Player};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Search bounds standing in for -inf / +inf
const NEG_INF: i32 = i32::MIN;
const POS_INF: i32 = i32::MAX;

/// Seed used when none is supplied
const DEFAULT_SEED: u64 = 42;

// ============================================================================
// AI PLAYER
// ============================================================================

/// Computer opponent bound to one difficulty profile and its own RNG
pub struct AiPlayer {
    pub difficulty: Difficulty,
    pub weights: LineWeights,
    rng: ChaCha8Rng,
}

impl AiPlayer {
    pub fn new(difficulty: Difficulty) -> Self {
        Self::with_seed(difficulty, DEFAULT_SEED)
    }

    pub fn with_seed(difficulty: Difficulty, seed: u64) -> Self {
        Self::with_rng(difficulty, ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn with_rng(difficulty: Difficulty, rng: ChaCha8Rng) -> Self {
        Self {
            difficulty,
            weights: LineWeights::default(),
            rng,
        }
    }

    /// Set custom evaluator weights
    pub fn with_weights(mut self, weights: LineWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Pick a move for the side to move in `game`
    pub fn choose_move(&mut self, game: &GameState) -> Result<Hex, GameError> {
        if game.is_over() {
            return Err(GameError::NoMoveAvailable);
        }
        find_best_move_with(
            game.board(),
            game.current_player(),
            &self.difficulty,
            &self.weights,
            &mut self.rng,
        )
        .ok_or(GameError::NoMoveAvailable)
    }

    /// Play both sides until the game ends
    pub fn play_game(&mut self, initial: GameState) -> Result<(GameState, Vec<Hex>), GameError> {
        let mut state = initial;
        let mut history = Vec::new();

        while !state.is_over() {
            let mv = self.choose_move(&state)?;
            state.place(mv)?;
            history.push(mv);
        }

        Ok((state, history))
    }
}

/// Play `initial` to the end with `x` moving for X and `o` moving for O
pub fn play_out(
    initial: GameState,
    x: &mut AiPlayer,
    o: &mut AiPlayer,
) -> Result<(GameState, Vec<Hex>), GameError> {
    let mut state = initial;
    let mut history = Vec::new();

    while !state.is_over() {
        let ai = match state.current_player() {
            Player::X => &mut *x,
            Player::O => &mut *o,
        };
        let mv = ai.choose_move(&state)?;
        state.place(mv)?;
        history.push(mv);
    }

    Ok((state, history))
}

// ============================================================================
// MOVE SELECTION
// ============================================================================

/// Choose a move for `player` using the default evaluator weights.
///
/// Returns `None` when the board is full or already holds a completed line.
pub fn find_best_move<R: Rng + ?Sized>(
    board: &Board,
    player: Player,
    difficulty: &Difficulty,
    rng: &mut R,
) -> Option<Hex> {
    find_best_move_with(board, player, difficulty, &LineWeights::default(), rng)
}

/// Choose a move for `player` with explicit evaluator weights
pub fn find_best_move_with<R: Rng + ?Sized>(
    board: &Board,
    player: Player,
    difficulty: &Difficulty,
    weights: &LineWeights,
    rng: &mut R,
) -> Option<Hex> {
    let valid_moves = board.empty_cells();
    if valid_moves.is_empty() || board.has_completed_line() {
        return None;
    }

    if let Some(mv) = find_immediate_threat(board, player, &valid_moves) {
        return Some(mv);
    }

    if rng.gen::<f64>() < difficulty.mistake {
        let mv = valid_moves.choose(rng).copied();
        tracing::debug!(?mv, mistake = difficulty.mistake, "Playing deliberate mistake");
        return mv;
    }

    let mut search = Search::new(player, weights);
    let (score, best) = search.minimax(board, difficulty.depth, true, NEG_INF, POS_INF, None);
    tracing::debug!(
        depth = difficulty.depth,
        nodes = search.nodes,
        score,
        ?best,
        "Search complete"
    );

    match best {
        Some(mv) => Some(mv),
        None => {
            tracing::warn!("Search produced no move, falling back to a random cell");
            valid_moves.choose(rng).copied()
        }
    }
}

/// Win-now beats block-now; first hit in `valid_moves` order wins ties
fn find_immediate_threat(board: &Board, player: Player, valid_moves: &[Hex]) -> Option<Hex> {
    if let Some(&mv) = valid_moves.iter().find(|&&mv| board.completes_line(mv, player)) {
        tracing::debug!(%mv, "Taking immediate win");
        return Some(mv);
    }

    let opponent = player.opponent();
    if let Some(&mv) = valid_moves.iter().find(|&&mv| board.completes_line(mv, opponent)) {
        tracing::debug!(%mv, "Blocking opponent win");
        return Some(mv);
    }

    None
}

// ============================================================================
// MINIMAX WITH ALPHA-BETA
// ============================================================================

/// One search from the point of view of `player` (the maximizing side)
struct Search<'a> {
    player: Player,
    weights: &'a LineWeights,
    nodes: u64,
}

impl<'a> Search<'a> {
    fn new(player: Player, weights: &'a LineWeights) -> Self {
        Self {
            player,
            weights,
            nodes: 0,
        }
    }

    /// Returns the position's value and the move that achieves it.
    /// `last_move` is the move that produced `board`.
    fn minimax(
        &mut self,
        board: &Board,
        depth: u32,
        maximizing: bool,
        mut alpha: i32,
        mut beta: i32,
        last_move: Option<Hex>,
    ) -> (i32, Option<Hex>) {
        self.nodes += 1;
        let opponent = self.player.opponent();

        if let Some(mv) = last_move {
            if let Some(owner) = board.get(mv) {
                if board.completes_line(mv, owner) {
                    let score = if owner == opponent { -WIN_SCORE } else { WIN_SCORE };
                    return (score, last_move);
                }
            }
        }
        if board.is_full() {
            return (0, last_move);
        }

        if depth == 0 {
            return (evaluate(board, self.player, self.weights), last_move);
        }

        let empties = board.empty_indices();
        let Some(&first) = empties.first() else {
            return (evaluate(board, self.player, self.weights), None);
        };

        let mover = if maximizing { self.player } else { opponent };
        let mut best_move = board.hex_at(first);
        let mut best_score = if maximizing { NEG_INF } else { POS_INF };

        for idx in empties {
            let mv = board.hex_at(idx);
            let child = board.with_mark_at(idx, mover);
            let (score, _) = self.minimax(&child, depth - 1, !maximizing, alpha, beta, Some(mv));

            if maximizing {
                if score > best_score {
                    best_score = score;
                    best_move = mv;
                }
                alpha = alpha.max(score);
            } else {
                if score < best_score {
                    best_score = score;
                    best_move = mv;
                }
                beta = beta.min(score);
            }

            if beta <= alpha {
                tracing::trace!(depth, %mv, "Pruned");
                break;
            }
        }

        (best_score, Some(best_move))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn board_with(config: GameConfig, marks: &[(Hex, Player)]) -> Board {
        let mut board = Board::new(&config).unwrap();
        for &(hex, player) in marks {
            board.place(hex, player).unwrap();
        }
        board
    }

    fn perfect(depth: u32) -> Difficulty {
        Difficulty::new(depth, 0.0).unwrap()
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    /// Plain minimax without pruning, same terminal rules
    fn exhaustive(
        board: &Board,
        player: Player,
        depth: u32,
        maximizing: bool,
        last_move: Option<Hex>,
    ) -> i32 {
        if let Some(mv) = last_move {
            if let Some(owner) = board.get(mv) {
                if board.completes_line(mv, owner) {
                    return if owner == player { WIN_SCORE } else { -WIN_SCORE };
                }
            }
        }
        if board.is_full() {
            return 0;
        }
        if depth == 0 {
            return evaluate(board, player, &LineWeights::default());
        }
        let mover = if maximizing { player } else { player.opponent() };
        let scores = board.empty_cells().into_iter().map(|mv| {
            let child = board.with_mark(mv, mover).unwrap();
            exhaustive(&child, player, depth - 1, !maximizing, Some(mv))
        });
        if maximizing {
            scores.max().unwrap()
        } else {
            scores.min().unwrap()
        }
    }

    #[test]
    fn test_takes_immediate_win() {
        let o = Player::O;
        let board = board_with(
            GameConfig::default(),
            &[(Hex::new(-1, 0), o), (Hex::new(0, 0), o), (Hex::new(1, 0), o)],
        );
        let mv = find_best_move(&board, o, &perfect(2), &mut rng()).unwrap();
        assert_eq!(mv, Hex::new(-2, 0));
        assert!(board.completes_line(mv, o));
    }

    #[test]
    fn test_win_beats_block() {
        let (x, o) = (Player::X, Player::O);
        let board = board_with(
            GameConfig::default(),
            &[
                (Hex::new(-2, 2), x),
                (Hex::new(-1, 2), x),
                (Hex::new(0, 2), x),
                (Hex::new(-1, -1), o),
                (Hex::new(0, -1), o),
                (Hex::new(1, -1), o),
            ],
        );
        // (-3, 2) blocks X and sorts first, but O can win outright
        let mv = find_best_move(&board, o, &perfect(3), &mut rng()).unwrap();
        assert_eq!(mv, Hex::new(-2, -1));
    }

    #[test]
    fn test_blocks_opponent_win() {
        let (x, o) = (Player::X, Player::O);
        let board = board_with(
            GameConfig::default(),
            &[
                (Hex::new(-2, 2), x),
                (Hex::new(-1, 2), x),
                (Hex::new(0, 2), x),
                (Hex::new(2, -2), o),
            ],
        );
        let mv = find_best_move(&board, o, &perfect(2), &mut rng()).unwrap();
        assert_eq!(mv, Hex::new(-3, 2));
    }

    #[test]
    fn test_threat_scan_ignores_mistakes() {
        let o = Player::O;
        let board = board_with(
            GameConfig::default(),
            &[(Hex::new(0, -1), o), (Hex::new(0, 0), o), (Hex::new(0, 1), o)],
        );
        let always_wrong = Difficulty::new(1, 1.0).unwrap();
        let mut rng = rng();
        for _ in 0..20 {
            let mv = find_best_move(&board, o, &always_wrong, &mut rng).unwrap();
            assert!(board.completes_line(mv, o));
        }
    }

    #[test]
    fn test_full_board_has_no_move() {
        let (x, o) = (Player::X, Player::O);
        let board = board_with(
            GameConfig::new(1, 3),
            &[
                (Hex::new(1, -1), x),
                (Hex::new(1, 0), o),
                (Hex::new(0, 1), x),
                (Hex::new(-1, 1), o),
                (Hex::new(-1, 0), x),
                (Hex::new(0, -1), o),
                (Hex::new(0, 0), x),
            ],
        );
        assert_eq!(find_best_move(&board, o, &perfect(3), &mut rng()), None);
    }

    #[test]
    fn test_mistakes_are_uniform() {
        let board = Board::new(&GameConfig::new(2, 4)).unwrap();
        let difficulty = Difficulty::new(3, 1.0).unwrap();
        let mut rng = rng();
        let trials = 9_500;

        let mut counts = std::collections::HashMap::new();
        for _ in 0..trials {
            let mv = find_best_move(&board, Player::O, &difficulty, &mut rng).unwrap();
            *counts.entry(mv).or_insert(0usize) += 1;
        }

        // 19 cells, 500 expected each; bounds are > 5 sigma wide
        assert_eq!(counts.len(), board.cell_count());
        for (mv, count) in counts {
            assert!((380..=620).contains(&count), "{} picked {} times", mv, count);
        }
    }

    #[test]
    fn test_depth_one_search_finds_win() {
        let o = Player::O;
        let board = board_with(
            GameConfig::default(),
            &[(Hex::new(-1, 0), o), (Hex::new(0, 0), o), (Hex::new(1, 0), o)],
        );
        let weights = LineWeights::default();
        let mut search = Search::new(o, &weights);
        let (score, mv) = search.minimax(&board, 1, true, NEG_INF, POS_INF, None);
        assert_eq!(score, WIN_SCORE);
        assert_eq!(mv, Some(Hex::new(-2, 0)));
    }

    #[test]
    fn test_pruning_preserves_value() {
        let (x, o) = (Player::X, Player::O);
        let positions = [
            board_with(GameConfig::new(2, 3), &[]),
            board_with(
                GameConfig::new(2, 3),
                &[(Hex::new(0, 0), x), (Hex::new(1, 0), o), (Hex::new(-1, 1), x)],
            ),
            board_with(
                GameConfig::new(2, 4),
                &[
                    (Hex::new(0, 0), x),
                    (Hex::new(0, 1), x),
                    (Hex::new(1, -1), o),
                    (Hex::new(-2, 1), o),
                ],
            ),
        ];
        let weights = LineWeights::default();

        for board in &positions {
            for depth in 1..=3 {
                let mut search = Search::new(o, &weights);
                let (score, mv) = search.minimax(board, depth, true, NEG_INF, POS_INF, None);
                let expected = exhaustive(board, o, depth, true, None);
                assert_eq!(score, expected, "root value at depth {}", depth);

                let mv = mv.unwrap();
                let child = board.with_mark(mv, o).unwrap();
                let chosen = exhaustive(&child, o, depth - 1, false, Some(mv));
                assert_eq!(chosen, expected, "value of chosen move at depth {}", depth);
            }
        }
    }

    #[test]
    fn test_search_does_not_mutate_board() {
        let board = board_with(GameConfig::default(), &[(Hex::new(0, 0), Player::X)]);
        let before: Vec<_> = board.iter().collect();
        let _ = find_best_move(&board, Player::O, &perfect(2), &mut rng());
        let after: Vec<_> = board.iter().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_ai_player_deterministic() {
        let difficulty = Difficulty::new(2, 0.5).unwrap();
        let game = GameState::new(GameConfig::new(2, 3)).unwrap();

        let (_, first) = AiPlayer::with_seed(difficulty, 11).play_game(game.clone()).unwrap();
        let (_, second) = AiPlayer::with_seed(difficulty, 11).play_game(game).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_won_board_has_no_move() {
        // Length 2 on radius 1: X wins with (0,0)-(1,0) while cells remain
        let mut game = GameState::new(GameConfig::new(1, 2)).unwrap();
        for mv in [Hex::new(0, 0), Hex::new(-1, 1), Hex::new(1, 0)] {
            game.place(mv).unwrap();
        }
        assert_eq!(game.winner(), Some(Player::X));
        assert!(!game.board().is_full());
        assert!(game.valid_moves().is_empty());

        assert_eq!(find_best_move(game.board(), Player::O, &perfect(2), &mut rng()), None);
        assert_eq!(find_best_move(game.board(), Player::X, &perfect(2), &mut rng()), None);
    }

    #[test]
    fn test_play_out_uses_each_side() {
        let config = GameConfig::new(2, 3);
        // X searches perfectly; O always blunders unless forced
        let mut x = AiPlayer::with_seed(perfect(3), 1);
        let mut o = AiPlayer::with_seed(Difficulty::new(1, 1.0).unwrap(), 2);
        let (state, history) = play_out(GameState::new(config).unwrap(), &mut x, &mut o).unwrap();

        assert!(state.is_over());
        assert_eq!(history.len() as u32, state.move_count());

        let mut x = AiPlayer::with_seed(perfect(3), 1);
        let mut o = AiPlayer::with_seed(Difficulty::new(1, 1.0).unwrap(), 2);
        let (_, replay) = play_out(GameState::new(config).unwrap(), &mut x, &mut o).unwrap();
        assert_eq!(history, replay);
    }

    #[test]
    fn test_custom_weights_drive_search() {
        // With every tier zeroed the evaluator is flat, so depth-1 search
        // keeps the first empty cell
        let flat = LineWeights {
            full: 0,
            one_short: 0,
            two_short: 0,
            opponent_one_short: 0,
            opponent_two_short: 0,
        };
        let board = board_with(GameConfig::default(), &[(Hex::new(0, 0), Player::X)]);
        let mut ai = AiPlayer::with_seed(perfect(1), 3).with_weights(flat);
        assert_eq!(ai.weights, flat);

        let mv = find_best_move_with(&board, Player::O, &perfect(1), &flat, &mut rng());
        assert_eq!(mv, Some(board.empty_cells()[0]));

        let game = GameState::new(GameConfig::default()).unwrap();
        assert_eq!(ai.choose_move(&game).unwrap(), game.valid_moves()[0]);
    }

    #[test]
    fn test_play_game_terminates() {
        let difficulty = Difficulty::new(2, 0.2).unwrap();
        let game = GameState::new(GameConfig::new(2, 3)).unwrap();
        let (final_state, history) = AiPlayer::new(difficulty).play_game(game).unwrap();

        assert!(final_state.is_over());
        assert_eq!(history.len() as u32, final_state.move_count());
        assert_eq!(
            AiPlayer::new(difficulty).choose_move(&final_state),
            Err(GameError::NoMoveAvailable)
        );
    }
}
