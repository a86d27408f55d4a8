//! The board contract consumed by the search.
//!
//! The search, the move policy and the prior model only ever talk to a
//! position through the [`Board`] trait. [`crate::position::Position`] is the
//! concrete implementation used by the engine.

use std::fmt;

use crate::position::{MoveError, Point};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    /// The other player.
    #[inline]
    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Parse a GTP color argument (`b`, `black`, `w`, `white`).
    pub fn parse(s: &str) -> Option<Color> {
        match s.to_ascii_lowercase().as_str() {
            "b" | "black" => Some(Color::Black),
            "w" | "white" => Some(Color::White),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => write!(f, "black"),
            Color::White => write!(f, "white"),
        }
    }
}

/// Board mechanics needed by the search.
///
/// `Clone` is the position copy: clones must be fully independent, the search
/// mutates only positions it exclusively owns.
///
/// Points are board indices; [`crate::constants::PASS_MOVE`] is the pass move
/// and is never returned by the point-enumerating methods.
pub trait Board: Clone {
    /// All empty points, in a fixed scan order.
    fn empty_points(&self) -> Vec<Point>;

    /// Whether `color` may play at `pt`. Passing is always legal.
    fn is_legal(&self, pt: Point, color: Color) -> bool;

    /// Play a stone (or pass) for `color`.
    fn play(&mut self, pt: Point, color: Color) -> Result<(), MoveError>;

    /// Whether `pt` is an eye of `color`.
    fn is_eye(&self, pt: Point, color: Color) -> bool;

    /// The stone at `pt`, if any.
    fn stone_at(&self, pt: Point) -> Option<Color>;

    /// Whether `pt` is an empty on-board point.
    fn is_empty(&self, pt: Point) -> bool;

    /// Orthogonal on-board neighbors.
    fn neighbors(&self, pt: Point) -> Vec<Point>;

    /// Orthogonal and diagonal on-board neighbors.
    fn neighbors8(&self, pt: Point) -> Vec<Point>;

    /// Number of liberties of the `color` block containing `pt`, 0 if `pt`
    /// does not hold a `color` stone.
    fn liberties(&self, pt: Point, color: Color) -> usize;

    /// The sole liberty of the `color` block at `pt`, if it has exactly one.
    fn single_liberty(&self, pt: Point, color: Color) -> Option<Point>;

    /// The 3x3 neighborhood of `pt`, row by row from the top, encoded as
    /// `X` (black), `O` (white), `.` (empty) and `#` (off board).
    fn neighborhood_33(&self, pt: Point) -> [u8; 9];

    /// 1-based (row, column) of `pt`, row 1 at the top.
    fn coord(&self, pt: Point) -> (usize, usize);

    /// Board side length.
    fn size(&self) -> usize;

    /// Last stone played, `None` after a pass or at the start.
    fn last_move(&self) -> Option<Point>;

    /// Stone played before the last move, `None` if that was a pass.
    fn last2_move(&self) -> Option<Point>;

    fn current_player(&self) -> Color;

    /// Winner by area scoring with `komi` added to White.
    fn score(&self, komi: f64) -> Color;
}
