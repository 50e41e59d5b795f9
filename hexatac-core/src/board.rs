//! Hex board geometry with axial coordinates
//!
//! The board is a centered hexagon stored as a flat arena. Cell geometry
//! (coordinates, neighbor table, every line of `winning_length` cells) is
//! computed once and shared between copies, so cloning a board only copies
//! the owner vector.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::error::{GameError, IllegalReason};
use crate::game::Player;

/// Axial hex coordinates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hex {
    pub q: i32,
    pub r: i32,
}

impl Hex {
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Implicit third cube coordinate
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Check if this hex lies inside a centered hexagon of `radius`
    pub fn is_within(&self, radius: i32) -> bool {
        self.q.abs() <= radius && self.r.abs() <= radius && self.s().abs() <= radius
    }

    /// Hex reached after `n` steps along `(dq, dr)`
    pub fn offset(&self, (dq, dr): (i32, i32), n: i32) -> Hex {
        Hex::new(self.q + dq * n, self.r + dr * n)
    }
}

impl fmt::Display for Hex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

/// The three undirected hex axes, given by their forward step.
/// The backward step is the negation.
pub const AXES: [(i32, i32); 3] = [(1, 0), (0, 1), (-1, 1)];

const FORWARD: usize = 0;
const BACKWARD: usize = 1;

/// Geometry shared by every copy of a board
#[derive(Debug)]
struct Layout {
    radius: i32,
    winning_length: usize,
    /// All cells, sorted by (q, r)
    cells: Vec<Hex>,
    index: FxHashMap<Hex, usize>,
    /// neighbors[cell][axis][FORWARD | BACKWARD]
    neighbors: Vec<[[Option<usize>; 2]; 3]>,
    /// Every on-board run of `winning_length` cells, flattened
    lines: Vec<usize>,
}

impl Layout {
    fn build(radius: i32, winning_length: usize) -> Self {
        let mut cells = Vec::new();
        for q in -radius..=radius {
            for r in -radius..=radius {
                let hex = Hex::new(q, r);
                if hex.is_within(radius) {
                    cells.push(hex);
                }
            }
        }

        let index: FxHashMap<Hex, usize> =
            cells.iter().enumerate().map(|(i, &hex)| (hex, i)).collect();

        let neighbors = cells
            .iter()
            .map(|hex| {
                let mut table = [[None; 2]; 3];
                for (axis, &dir) in AXES.iter().enumerate() {
                    table[axis][FORWARD] = index.get(&hex.offset(dir, 1)).copied();
                    table[axis][BACKWARD] = index.get(&hex.offset(dir, -1)).copied();
                }
                table
            })
            .collect();

        // Forward-only directions so each undirected line is counted once
        let mut lines = Vec::new();
        for hex in &cells {
            for &dir in &AXES {
                let run: Option<Vec<usize>> = (0..winning_length as i32)
                    .map(|i| index.get(&hex.offset(dir, i)).copied())
                    .collect();
                if let Some(run) = run {
                    lines.extend(run);
                }
            }
        }

        Self {
            radius,
            winning_length,
            cells,
            index,
            neighbors,
            lines,
        }
    }
}

/// Board: hex -> owner over a fixed hexagonal key set (clone to explore)
#[derive(Clone, Debug)]
pub struct Board {
    layout: Arc<Layout>,
    owners: Vec<Option<Player>>,
    empty: usize,
}

impl Board {
    /// Build an empty board for a validated configuration
    pub fn new(config: &GameConfig) -> Result<Self, GameError> {
        config.validate()?;
        let layout = Layout::build(config.radius as i32, config.winning_length as usize);
        let len = layout.cells.len();
        Ok(Self {
            layout: Arc::new(layout),
            owners: vec![None; len],
            empty: len,
        })
    }

    // ========================================================================
    // GEOMETRY
    // ========================================================================

    pub fn radius(&self) -> i32 {
        self.layout.radius
    }

    pub fn winning_length(&self) -> usize {
        self.layout.winning_length
    }

    /// Number of cells on the board
    pub fn cell_count(&self) -> usize {
        self.layout.cells.len()
    }

    /// All cells in (q, r) order
    pub fn cells(&self) -> &[Hex] {
        &self.layout.cells
    }

    /// Every run of `winning_length` cells that lies fully on the board
    pub fn lines(&self) -> impl Iterator<Item = &[usize]> + '_ {
        self.layout.lines.chunks_exact(self.layout.winning_length)
    }

    pub(crate) fn hex_at(&self, idx: usize) -> Hex {
        self.layout.cells[idx]
    }

    // ========================================================================
    // OWNERSHIP
    // ========================================================================

    /// Owner of a cell (None for empty or off-board cells)
    pub fn get(&self, hex: Hex) -> Option<Player> {
        self.layout
            .index
            .get(&hex)
            .and_then(|&idx| self.owners[idx])
    }

    pub(crate) fn owner_at(&self, idx: usize) -> Option<Player> {
        self.owners[idx]
    }

    /// Iterate (cell, owner) pairs in (q, r) order
    pub fn iter(&self) -> impl Iterator<Item = (Hex, Option<Player>)> + '_ {
        self.layout.cells.iter().copied().zip(self.owners.iter().copied())
    }

    pub fn empty_count(&self) -> usize {
        self.empty
    }

    pub fn is_full(&self) -> bool {
        self.empty == 0
    }

    /// Empty cells in (q, r) order
    pub fn empty_cells(&self) -> Vec<Hex> {
        self.iter()
            .filter(|(_, owner)| owner.is_none())
            .map(|(hex, _)| hex)
            .collect()
    }

    /// Mark an empty on-board cell for `player`
    pub fn place(&mut self, hex: Hex, player: Player) -> Result<(), GameError> {
        let idx = *self.layout.index.get(&hex).ok_or(GameError::IllegalMove {
            hex,
            reason: IllegalReason::OffBoard,
        })?;
        if self.owners[idx].is_some() {
            return Err(GameError::IllegalMove {
                hex,
                reason: IllegalReason::Occupied,
            });
        }
        self.owners[idx] = Some(player);
        self.empty -= 1;
        Ok(())
    }

    /// Copy of this board with `player` marked at `hex`
    pub fn with_mark(&self, hex: Hex, player: Player) -> Result<Board, GameError> {
        let mut next = self.clone();
        next.place(hex, player)?;
        Ok(next)
    }

    /// Arena indices of empty cells, in (q, r) order
    pub(crate) fn empty_indices(&self) -> Vec<usize> {
        (0..self.owners.len())
            .filter(|&idx| self.owners[idx].is_none())
            .collect()
    }

    /// Copy with `player` at arena index `idx`; the cell must be empty
    pub(crate) fn with_mark_at(&self, idx: usize, player: Player) -> Board {
        debug_assert!(self.owners[idx].is_none(), "cell {} already occupied", idx);
        let mut next = self.clone();
        next.owners[idx] = Some(player);
        next.empty -= 1;
        next
    }

    // ========================================================================
    // LINE DETECTION
    // ========================================================================

    /// Count consecutive `player` cells walking away from `idx` (exclusive).
    /// Returns the count and the furthest matching cell reached.
    fn walk(&self, idx: usize, axis: usize, dir: usize, player: Player) -> (usize, usize) {
        let mut count = 0;
        let mut last = idx;
        while let Some(next) = self.layout.neighbors[last][axis][dir] {
            if self.owners[next] != Some(player) {
                break;
            }
            count += 1;
            last = next;
        }
        (count, last)
    }

    /// Whether a `player` mark at `hex` would sit in a line of at least
    /// `winning_length` cells. The cell's current owner is ignored, so this
    /// answers both "did that move win" and "would this move win".
    pub fn completes_line(&self, hex: Hex, player: Player) -> bool {
        let Some(&idx) = self.layout.index.get(&hex) else {
            return false;
        };
        (0..AXES.len()).any(|axis| {
            let (ahead, _) = self.walk(idx, axis, FORWARD, player);
            let (behind, _) = self.walk(idx, axis, BACKWARD, player);
            ahead + behind + 1 >= self.layout.winning_length
        })
    }

    /// The winning line through `hex` for `player`, if any.
    ///
    /// Axes are checked in `AXES` order. The line is the first
    /// `winning_length` cells walking forward from the backward-most cell of
    /// the run.
    pub fn winning_line(&self, hex: Hex, player: Player) -> Option<Vec<Hex>> {
        let &idx = self.layout.index.get(&hex)?;
        let length = self.layout.winning_length;

        for axis in 0..AXES.len() {
            let (ahead, _) = self.walk(idx, axis, FORWARD, player);
            let (behind, start) = self.walk(idx, axis, BACKWARD, player);
            if ahead + behind + 1 < length {
                continue;
            }

            let mut line = Vec::with_capacity(length);
            let mut cursor = Some(start);
            while let Some(cell) = cursor {
                if line.len() == length {
                    break;
                }
                line.push(self.hex_at(cell));
                cursor = self.layout.neighbors[cell][axis][FORWARD];
            }
            return Some(line);
        }
        None
    }

    /// Whether either player already holds a full line anywhere
    pub fn has_completed_line(&self) -> bool {
        self.lines().any(|line| {
            let first = self.owners[line[0]];
            first.is_some() && line.iter().all(|&idx| self.owners[idx] == first)
        })
    }
}

impl fmt::Display for Board {
    /// Text rendering, one row per `r`, indented to form a hexagon
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let radius = self.radius();
        for r in -radius..=radius {
            write!(f, "{}", " ".repeat(r.unsigned_abs() as usize))?;
            let q_min = (-radius).max(-radius - r);
            let q_max = radius.min(radius - r);
            for q in q_min..=q_max {
                let symbol = match self.get(Hex::new(q, r)) {
                    Some(player) => player.symbol(),
                    None => '.',
                };
                write!(f, "{} ", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(radius: u32, winning_length: u32) -> Board {
        Board::new(&GameConfig::new(radius, winning_length)).unwrap()
    }

    #[test]
    fn test_hex_validity() {
        assert!(Hex::new(0, 0).is_within(3));
        assert!(Hex::new(3, 0).is_within(3));
        assert!(Hex::new(-3, 3).is_within(3));
        assert!(!Hex::new(4, 0).is_within(3));
        assert!(!Hex::new(2, 2).is_within(3)); // s = -4
    }

    #[test]
    fn test_cell_count_and_membership() {
        for radius in 1..=6u32 {
            let b = board(radius, 2);
            let r = radius as usize;
            assert_eq!(b.cell_count(), 3 * r * r + 3 * r + 1);
            assert!(b.cells().iter().all(|h| h.is_within(radius as i32)));
        }
    }

    #[test]
    fn test_cells_sorted() {
        let b = board(3, 4);
        assert!(b.cells().windows(2).all(|w| w[0] < w[1]));
        assert_eq!(b.empty_cells(), b.cells().to_vec());
    }

    #[test]
    fn test_line_count() {
        // Radius 1, length 2: one line per adjacent pair
        assert_eq!(board(1, 2).lines().count(), 12);
        // Radius 1, length 3: the three diameters
        assert_eq!(board(1, 3).lines().count(), 3);
    }

    #[test]
    fn test_place_rejects_off_board_and_occupied() {
        let mut b = board(1, 2);
        assert_eq!(
            b.place(Hex::new(2, 0), Player::X),
            Err(GameError::IllegalMove {
                hex: Hex::new(2, 0),
                reason: IllegalReason::OffBoard
            })
        );
        b.place(Hex::new(0, 0), Player::X).unwrap();
        assert!(matches!(
            b.place(Hex::new(0, 0), Player::O),
            Err(GameError::IllegalMove {
                reason: IllegalReason::Occupied,
                ..
            })
        ));
        assert_eq!(b.get(Hex::new(0, 0)), Some(Player::X));
        assert_eq!(b.empty_count(), 6);
    }

    #[test]
    fn test_copies_do_not_alias() {
        let b = board(2, 3);
        let next = b.with_mark(Hex::new(0, 0), Player::O).unwrap();
        assert_eq!(b.get(Hex::new(0, 0)), None);
        assert_eq!(next.get(Hex::new(0, 0)), Some(Player::O));
    }

    #[test]
    fn test_completes_line_fills_gap() {
        let mut b = board(3, 4);
        for hex in [Hex::new(-2, 0), Hex::new(-1, 0), Hex::new(1, 0)] {
            b.place(hex, Player::X).unwrap();
        }
        assert!(b.completes_line(Hex::new(0, 0), Player::X));
        assert!(!b.completes_line(Hex::new(0, 0), Player::O));
        assert!(!b.completes_line(Hex::new(2, 0), Player::X));
    }

    #[test]
    fn test_winning_line_anchored_backward() {
        let mut b = board(3, 4);
        // Five in a row on the (0,1) axis; seed in the middle
        for r in -2..=2 {
            b.place(Hex::new(0, r), Player::O).unwrap();
        }
        let line = b.winning_line(Hex::new(0, 0), Player::O).unwrap();
        assert_eq!(
            line,
            vec![Hex::new(0, -2), Hex::new(0, -1), Hex::new(0, 0), Hex::new(0, 1)]
        );
    }

    #[test]
    fn test_has_completed_line() {
        let mut b = board(2, 3);
        b.place(Hex::new(-1, 0), Player::O).unwrap();
        b.place(Hex::new(0, 0), Player::O).unwrap();
        b.place(Hex::new(1, 0), Player::X).unwrap();
        assert!(!b.has_completed_line());

        b.place(Hex::new(0, -1), Player::O).unwrap();
        b.place(Hex::new(0, 1), Player::O).unwrap();
        assert!(b.has_completed_line());
    }

    #[test]
    fn test_winning_line_diagonal_axis() {
        let mut b = board(2, 3);
        for hex in [Hex::new(1, -1), Hex::new(0, 0), Hex::new(-1, 1)] {
            b.place(hex, Player::X).unwrap();
        }
        let line = b.winning_line(Hex::new(1, -1), Player::X).unwrap();
        assert_eq!(line, vec![Hex::new(1, -1), Hex::new(0, 0), Hex::new(-1, 1)]);
    }

    #[test]
    fn test_display_shape() {
        let mut b = board(1, 2);
        b.place(Hex::new(0, 0), Player::X).unwrap();
        let text = b.to_string();
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].trim(), ". X .");
    }
}
