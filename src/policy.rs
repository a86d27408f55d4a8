//! Move policy used during rollouts.
//!
//! Moves are generated by a priority cascade; the first tier that yields a
//! move wins:
//!
//! 1. **Atari capture** - take the last opponent block if it has one liberty
//! 2. **Atari defense** - save an own block put in atari by the last move,
//!    either by extending or by capturing an attacker
//! 3. **Pattern** - 3x3 pattern moves around the last two moves
//! 4. **Random** - a uniformly random legal move that does not fill an own eye
//!
//! Candidates from tiers 2 and 3 go through the self-atari filter when it is
//! enabled, otherwise only through the eye-filling filter.

use std::fmt;

use crate::board::{Board, Color};
use crate::constants::SELFATARI_LIBERTY_LIMIT;
use crate::patterns::pat3_match;
use crate::position::Point;

/// Switches for the rollout policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyOptions {
    /// Use 3x3 pattern moves
    pub use_pattern: bool,
    /// Reject self-atari candidates
    pub check_selfatari: bool,
}

impl Default for PolicyOptions {
    fn default() -> Self {
        Self {
            use_pattern: true,
            check_selfatari: true,
        }
    }
}

/// Which tier of the cascade produced a set of candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    AtariCapture,
    AtariDefense,
    Pattern,
    Random,
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PolicyKind::AtariCapture => "AtariCapture",
            PolicyKind::AtariDefense => "AtariDefense",
            PolicyKind::Pattern => "Pattern",
            PolicyKind::Random => "Random",
        };
        f.write_str(s)
    }
}

/// Choose a single rollout move for `color`, or `None` to pass.
pub fn generate_move<B: Board>(
    board: &B,
    color: Color,
    options: PolicyOptions,
    rng: &mut fastrand::Rng,
) -> Option<Point> {
    if let Some(capture) = atari_capture(board, color) {
        return Some(capture);
    }

    let defense = atari_defense_moves(board, color);
    if let Some(mv) = choose_filtered(board, defense, color, options.check_selfatari, rng) {
        return Some(mv);
    }

    if options.use_pattern {
        let patterns = pattern_moves(board);
        if let Some(mv) = choose_filtered(board, patterns, color, options.check_selfatari, rng) {
            return Some(mv);
        }
    }

    random_move(board, color, rng)
}

/// All candidates of the first non-empty tier, after filtering.
///
/// Unlike [`generate_move`], the capture tier is filtered as well, and the
/// random tier lists every legal non-eye-filling move.
pub fn policy_moves<B: Board>(
    board: &B,
    color: Color,
    options: PolicyOptions,
) -> (PolicyKind, Vec<Point>) {
    let (kind, atari) = match atari_capture(board, color) {
        Some(capture) => (PolicyKind::AtariCapture, vec![capture]),
        None => (PolicyKind::AtariDefense, atari_defense_moves(board, color)),
    };
    let atari = filter_moves(board, &atari, color, options.check_selfatari);
    if !atari.is_empty() {
        return (kind, atari);
    }

    if options.use_pattern {
        let patterns = filter_moves(board, &pattern_moves(board), color, options.check_selfatari);
        if !patterns.is_empty() {
            return (PolicyKind::Pattern, patterns);
        }
    }

    (PolicyKind::Random, random_moves(board, color))
}

/// The capturing move if the opponent's last stone is in atari.
pub fn atari_capture<B: Board>(board: &B, color: Color) -> Option<Point> {
    let last = board.last_move()?;
    let lib = board.single_liberty(last, color.opponent())?;
    board.is_legal(lib, color).then_some(lib)
}

/// Moves that rescue own blocks next to the last move from atari.
pub fn atari_defense_moves<B: Board>(board: &B, color: Color) -> Vec<Point> {
    let Some(last) = board.last_move() else {
        return Vec::new();
    };
    let mut moves = Vec::new();
    for n in board.neighbors(last) {
        if board.stone_at(n) != Some(color) {
            continue;
        }
        let Some(lib) = board.single_liberty(n, color) else {
            continue;
        };
        if let Some(mv) = runaway(board, lib, color) {
            push_unique(&mut moves, mv);
        }
        for mv in counterattack(board, n, color) {
            push_unique(&mut moves, mv);
        }
    }
    moves
}

/// Extend at the last liberty, if that leaves the block more than one liberty.
pub fn runaway<B: Board>(board: &B, lib: Point, color: Color) -> Option<Point> {
    let mut cboard = board.clone();
    if cboard.play(lib, color).is_err() {
        return None;
    }
    (cboard.liberties(lib, color) > 1).then_some(lib)
}

/// Capture opponent stones in atari next to `point`, keeping only captures
/// after which the block at `point` has more than one liberty.
pub fn counterattack<B: Board>(board: &B, point: Point, color: Color) -> Vec<Point> {
    let opp = color.opponent();
    let mut moves = Vec::new();
    for n in board.neighbors(point) {
        if board.stone_at(n) != Some(opp) {
            continue;
        }
        let Some(opp_lib) = board.single_liberty(n, opp) else {
            continue;
        };
        let mut cboard = board.clone();
        if cboard.play(opp_lib, color).is_ok() && cboard.liberties(point, color) > 1 {
            push_unique(&mut moves, opp_lib);
        }
    }
    moves
}

/// Empty points around the last two moves that match a 3x3 pattern.
pub fn pattern_moves<B: Board>(board: &B) -> Vec<Point> {
    let mut moves = Vec::new();
    for last in [board.last_move(), board.last2_move()].into_iter().flatten() {
        for n in board.neighbors8(last) {
            if board.is_empty(n) && !moves.contains(&n) && pat3_match(board, n) {
                moves.push(n);
            }
        }
    }
    moves
}

/// Every legal move for `color` that does not fill its own eye.
pub fn random_moves<B: Board>(board: &B, color: Color) -> Vec<Point> {
    board
        .empty_points()
        .into_iter()
        .filter(|&mv| board.is_legal(mv, color) && !board.is_eye(mv, color))
        .collect()
}

/// A uniformly random legal, non-eye-filling move.
///
/// Draws without replacement, dropping rejected points, so the common case of
/// an early hit does not pay for a full shuffle.
pub fn random_move<B: Board>(board: &B, color: Color, rng: &mut fastrand::Rng) -> Option<Point> {
    let mut moves = board.empty_points();
    while !moves.is_empty() {
        let index = rng.usize(..moves.len());
        let mv = moves[index];
        if board.is_legal(mv, color) && !board.is_eye(mv, color) {
            return Some(mv);
        }
        moves.swap_remove(index);
    }
    None
}

/// Pick a random candidate that survives the filter.
pub fn choose_filtered<B: Board>(
    board: &B,
    mut moves: Vec<Point>,
    color: Color,
    check_selfatari: bool,
    rng: &mut fastrand::Rng,
) -> Option<Point> {
    while !moves.is_empty() {
        let index = rng.usize(..moves.len());
        let candidate = moves[index];
        if is_filtered(board, candidate, color, check_selfatari) {
            moves.swap_remove(index);
        } else {
            return Some(candidate);
        }
    }
    None
}

/// Candidates that survive the filter, in their original order.
pub fn filter_moves<B: Board>(
    board: &B,
    moves: &[Point],
    color: Color,
    check_selfatari: bool,
) -> Vec<Point> {
    moves
        .iter()
        .copied()
        .filter(|&mv| !is_filtered(board, mv, color, check_selfatari))
        .collect()
}

/// True if `mv` should not be played by `color`.
pub fn is_filtered<B: Board>(board: &B, mv: Point, color: Color, check_selfatari: bool) -> bool {
    if check_selfatari {
        selfatari_filter(board, mv, color)
    } else {
        filleye_filter(board, mv, color)
    }
}

/// Illegal moves and moves filling an own eye.
pub fn filleye_filter<B: Board>(board: &B, mv: Point, color: Color) -> bool {
    !board.is_legal(mv, color) || board.is_eye(mv, color)
}

pub fn selfatari_filter<B: Board>(board: &B, mv: Point, color: Color) -> bool {
    filleye_filter(board, mv, color) || is_self_atari(board, mv, color)
}

/// Whether playing `mv` leaves the new block with a single liberty.
///
/// Connecting to an adjacent block with more than two liberties can never end
/// in atari, so the simulation is skipped in that case.
pub fn is_self_atari<B: Board>(board: &B, mv: Point, color: Color) -> bool {
    if blocks_max_liberty(board, mv, color, SELFATARI_LIBERTY_LIMIT) > SELFATARI_LIBERTY_LIMIT {
        return false;
    }
    let mut cboard = board.clone();
    cboard.play(mv, color).is_ok() && cboard.liberties(mv, color) == 1
}

/// Largest liberty count among `color` blocks adjacent to `point`.
///
/// Returns early with the first count above `limit`; 0 if no own block is adjacent.
pub fn blocks_max_liberty<B: Board>(board: &B, point: Point, color: Color, limit: usize) -> usize {
    let mut max_lib = 0;
    for n in board.neighbors(point) {
        if board.stone_at(n) == Some(color) {
            let libs = board.liberties(n, color);
            if libs > limit {
                return libs;
            }
            max_lib = max_lib.max(libs);
        }
    }
    max_lib
}

fn push_unique(moves: &mut Vec<Point>, mv: Point) {
    if !moves.contains(&mv) {
        moves.push(mv);
    }
}
