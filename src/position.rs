//! Go position representation and move execution.
//!
//! This module provides the board mechanics behind the [`Board`] trait:
//! - Board state representation using a 1D array with padding
//! - Stone placement and capture detection
//! - Simple ko enforcement
//! - Eye detection for move filtering
//! - Area scoring
//!
//! Stones are stored with their absolute color (`'X'` black, `'O'` white).

use std::fmt;

use thiserror::Error;

use crate::board::{Board, Color};
use crate::constants::*;

/// A point on the board, represented as an index into the 1D board array.
pub type Point = usize;

/// Result of attempting to play a move.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    /// Point is not empty (or not on the board)
    #[error("illegal move: point not empty")]
    Occupied,
    /// Move violates ko rule
    #[error("illegal move: retakes ko")]
    Ko,
    /// Move would be suicide (no liberties after capture resolution)
    #[error("illegal move: suicide")]
    Suicide,
}

/// A Go position (board state).
#[derive(Clone, PartialEq, Eq)]
pub struct Position {
    /// Board state: 'X' = black, 'O' = white, '.' = empty, ' ' = out of bounds
    pub color: [u8; BOARDSIZE],
    /// Move number (0 = start of game)
    pub n: usize,
    /// Ko point (0 if no ko)
    pub ko: Point,
    /// Last move played (`PASS_MOVE` for a pass)
    pub last: Point,
    /// Second-to-last move
    pub last2: Point,
    /// Side to move
    pub to_move: Color,
    /// Stones captured by Black
    pub cap_black: u32,
    /// Stones captured by White
    pub cap_white: u32,
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl Position {
    pub fn new() -> Self {
        let mut p = Position {
            color: [OUT; BOARDSIZE],
            n: 0,
            ko: 0,
            last: PASS_MOVE,
            last2: PASS_MOVE,
            to_move: Color::Black,
            cap_black: 0,
            cap_white: 0,
        };
        p.clear();
        p
    }

    /// Reset to the initial empty board.
    ///
    /// The board is laid out as a 1D array with padding:
    /// - Index 0 to N: top padding (out of bounds)
    /// - Each row: left padding + N playable points
    /// - Bottom padding
    pub fn clear(&mut self) {
        let mut k = 0;
        for _col in 0..=N {
            self.color[k] = OUT;
            k += 1;
        }
        for _row in 1..=N {
            self.color[k] = OUT;
            k += 1;
            for _col in 1..=N {
                self.color[k] = EMPTY;
                k += 1;
            }
        }
        for _col in 0..W {
            self.color[k] = OUT;
            k += 1;
        }
        self.n = 0;
        self.ko = 0;
        self.last = PASS_MOVE;
        self.last2 = PASS_MOVE;
        self.to_move = Color::Black;
        self.cap_black = 0;
        self.cap_white = 0;
    }

    /// Play for the side to move.
    pub fn play_next(&mut self, pt: Point) -> Result<(), MoveError> {
        self.play(pt, self.to_move)
    }

    fn record_move(&mut self, pt: Point, color: Color) {
        self.n += 1;
        self.last2 = self.last;
        self.last = pt;
        self.to_move = color.opponent();
    }

    /// Flood-fill the block at `start`, returning its stones and liberties.
    ///
    /// Stops counting liberties once `max_libs` distinct ones have been seen.
    fn block(&self, start: Point, max_libs: usize) -> (Vec<Point>, Vec<Point>) {
        let color = self.color[start];
        let mut stack = vec![start];
        let mut visited = [false; BOARDSIZE];
        let mut stones = Vec::new();
        let mut libs = Vec::new();
        visited[start] = true;

        while let Some(pt) = stack.pop() {
            stones.push(pt);
            for n in neighbors(pt) {
                if visited[n] {
                    continue;
                }
                match self.color[n] {
                    EMPTY => {
                        visited[n] = true;
                        libs.push(n);
                        if libs.len() >= max_libs {
                            return (stones, libs);
                        }
                    }
                    c if c == color => {
                        visited[n] = true;
                        stack.push(n);
                    }
                    _ => {}
                }
            }
        }
        (stones, libs)
    }

    /// Color of the stones surrounding `pt` orthogonally, if they all agree.
    ///
    /// May report false eyes; see [`Board::is_eye`] for the stricter test.
    pub fn eyeish_color(&self, pt: Point) -> Option<u8> {
        let mut eyecolor = None;
        for n in neighbors(pt) {
            match self.color[n] {
                OUT => continue,
                EMPTY => return None,
                c => match eyecolor {
                    None => eyecolor = Some(c),
                    Some(e) if e != c => return None,
                    Some(_) => {}
                },
            }
        }
        eyecolor
    }

    /// Area score from Black's point of view, before komi.
    pub fn area_score(&self) -> f64 {
        let mut visited = [false; BOARDSIZE];
        let mut s = 0.0;

        for pt in BOARD_IMIN..BOARD_IMAX {
            match self.color[pt] {
                STONE_BLACK => s += 1.0,
                STONE_WHITE => s -= 1.0,
                EMPTY if !visited[pt] => {
                    // Empty region: credited only if bordered by a single color
                    let mut stack = vec![pt];
                    visited[pt] = true;
                    let mut size = 0.0;
                    let (mut black, mut white) = (false, false);
                    while let Some(p) = stack.pop() {
                        size += 1.0;
                        for n in neighbors(p) {
                            match self.color[n] {
                                EMPTY if !visited[n] => {
                                    visited[n] = true;
                                    stack.push(n);
                                }
                                STONE_BLACK => black = true,
                                STONE_WHITE => white = true,
                                _ => {}
                            }
                        }
                    }
                    if black && !white {
                        s += size;
                    } else if white && !black {
                        s -= size;
                    }
                }
                _ => {}
            }
        }
        s
    }
}

#[inline]
fn stone(color: Color) -> u8 {
    match color {
        Color::Black => STONE_BLACK,
        Color::White => STONE_WHITE,
    }
}

#[inline]
fn is_on_board(pt: Point) -> bool {
    pt < BOARDSIZE && pt != PASS_MOVE
}

impl Board for Position {
    fn empty_points(&self) -> Vec<Point> {
        (BOARD_IMIN..BOARD_IMAX)
            .filter(|&pt| self.color[pt] == EMPTY)
            .collect()
    }

    fn is_legal(&self, pt: Point, color: Color) -> bool {
        if pt == PASS_MOVE {
            return true;
        }
        if !is_on_board(pt) || self.color[pt] != EMPTY || pt == self.ko {
            return false;
        }
        let own = stone(color);
        let opp = stone(color.opponent());
        for n in neighbors(pt) {
            match self.color[n] {
                EMPTY => return true,
                // Capturing a neighbor always frees at least one liberty
                c if c == opp && self.block(n, 2).1.len() == 1 => return true,
                // Joining a block that keeps a liberty elsewhere
                c if c == own && self.block(n, 2).1.len() > 1 => return true,
                _ => {}
            }
        }
        false
    }

    fn play(&mut self, pt: Point, color: Color) -> Result<(), MoveError> {
        if pt == PASS_MOVE {
            self.ko = 0; // Ko is cleared on pass
            self.record_move(PASS_MOVE, color);
            return Ok(());
        }
        if !is_on_board(pt) || self.color[pt] != EMPTY {
            return Err(MoveError::Occupied);
        }
        if pt == self.ko {
            return Err(MoveError::Ko);
        }

        let opp = stone(color.opponent());
        // Playing into an opponent's eye is the only way to create a ko
        let in_enemy_eye = self.eyeish_color(pt) == Some(opp);

        self.color[pt] = stone(color);
        let mut to_remove: Vec<Point> = Vec::new();
        let mut capture_point: Point = 0;

        for n in neighbors(pt) {
            if self.color[n] == opp && !to_remove.contains(&n) {
                let (stones, libs) = self.block(n, 1);
                if libs.is_empty() {
                    capture_point = n;
                    to_remove.extend(stones);
                }
            }
        }

        if to_remove.is_empty() && self.block(pt, 1).1.is_empty() {
            self.color[pt] = EMPTY;
            return Err(MoveError::Suicide);
        }

        for &r in &to_remove {
            self.color[r] = EMPTY;
        }
        let captured = to_remove.len() as u32;
        match color {
            Color::Black => self.cap_black += captured,
            Color::White => self.cap_white += captured,
        }

        // Set ko if captured exactly one stone in an eye
        self.ko = if captured == 1 && in_enemy_eye {
            capture_point
        } else {
            0
        };

        self.record_move(pt, color);
        Ok(())
    }

    /// A true eye is eyeish and has at most one "bad" diagonal in the center,
    /// none at the edge. A diagonal is bad if it holds an opponent stone.
    fn is_eye(&self, pt: Point, color: Color) -> bool {
        if !is_on_board(pt) || self.color[pt] != EMPTY {
            return false;
        }
        let own = stone(color);
        if self.eyeish_color(pt) != Some(own) {
            return false;
        }
        let falsecolor = stone(color.opponent());
        let mut at_edge = false;
        let mut false_count = 0;

        for d in diagonal_neighbors(pt) {
            if self.color[d] == OUT {
                at_edge = true;
            } else if self.color[d] == falsecolor {
                false_count += 1;
            }
        }

        // The board edge counts as one bad diagonal
        if at_edge {
            false_count += 1;
        }
        false_count < 2
    }

    fn stone_at(&self, pt: Point) -> Option<Color> {
        if !is_on_board(pt) {
            return None;
        }
        match self.color[pt] {
            STONE_BLACK => Some(Color::Black),
            STONE_WHITE => Some(Color::White),
            _ => None,
        }
    }

    fn is_empty(&self, pt: Point) -> bool {
        is_on_board(pt) && self.color[pt] == EMPTY
    }

    fn neighbors(&self, pt: Point) -> Vec<Point> {
        neighbors(pt)
            .into_iter()
            .filter(|&n| self.color[n] != OUT)
            .collect()
    }

    fn neighbors8(&self, pt: Point) -> Vec<Point> {
        all_neighbors(pt)
            .into_iter()
            .filter(|&n| self.color[n] != OUT)
            .collect()
    }

    fn liberties(&self, pt: Point, color: Color) -> usize {
        if !is_on_board(pt) || self.color[pt] != stone(color) {
            return 0;
        }
        self.block(pt, usize::MAX).1.len()
    }

    fn single_liberty(&self, pt: Point, color: Color) -> Option<Point> {
        if !is_on_board(pt) || self.color[pt] != stone(color) {
            return None;
        }
        let (_, libs) = self.block(pt, 2);
        match libs.as_slice() {
            [lib] => Some(*lib),
            _ => None,
        }
    }

    fn neighborhood_33(&self, pt: Point) -> [u8; 9] {
        // Layout: NW N NE / W . E / SW S SE
        let order = [7, 0, 4, 3, usize::MAX, 1, 6, 2, 5];
        let mut out = [b'.'; 9];
        for (i, &d) in order.iter().enumerate() {
            let c = if d == usize::MAX {
                self.color[pt]
            } else {
                self.color[(pt as isize + DELTA[d]) as usize]
            };
            out[i] = if c == OUT { b'#' } else { c };
        }
        out
    }

    fn coord(&self, pt: Point) -> (usize, usize) {
        (pt / (N + 1), pt % (N + 1))
    }

    fn size(&self) -> usize {
        N
    }

    fn last_move(&self) -> Option<Point> {
        (self.last != PASS_MOVE).then_some(self.last)
    }

    fn last2_move(&self) -> Option<Point> {
        (self.last2 != PASS_MOVE).then_some(self.last2)
    }

    fn current_player(&self) -> Color {
        self.to_move
    }

    fn score(&self, komi: f64) -> Color {
        if self.area_score() - komi > 0.0 {
            Color::Black
        } else {
            Color::White
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 1..=N {
            write!(f, "{:>2} ", N + 1 - row)?;
            for col in 1..=N {
                let pt = row * (N + 1) + col;
                let ch = match self.color[pt] {
                    STONE_BLACK => 'X',
                    STONE_WHITE => 'O',
                    _ => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        write!(f, "   ")?;
        for col in 1..=N {
            write!(f, "{} ", column_letter(col))?;
        }
        Ok(())
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Position(n={}, to_move={})", self.n, self.to_move)?;
        write!(f, "{self}")
    }
}

/// Get the 4 orthogonal neighbors (N, E, S, W) of a point.
#[inline]
fn neighbors(pt: Point) -> [Point; 4] {
    std::array::from_fn(|i| (pt as isize + DELTA[i]) as usize)
}

/// Get the 4 diagonal neighbors (NE, SE, SW, NW) of a point.
#[inline]
fn diagonal_neighbors(pt: Point) -> [Point; 4] {
    std::array::from_fn(|i| (pt as isize + DELTA[i + 4]) as usize)
}

/// Get all 8 neighbors (4 orthogonal + 4 diagonal) of a point.
#[inline]
fn all_neighbors(pt: Point) -> [Point; 8] {
    std::array::from_fn(|i| (pt as isize + DELTA[i]) as usize)
}

/// Column letter for a 1-based column, skipping 'I'.
fn column_letter(col: usize) -> char {
    let c = (b'@' + col as u8) as char;
    if c >= 'I' { (c as u8 + 1) as char } else { c }
}

/// Parse a coordinate string (e.g., "D4", "pass") into a Point.
///
/// Go coordinates use letters A-T (skipping I) for columns and 1-19 for rows.
/// Returns `None` for anything that is not a point on this board.
pub fn parse_coord(s: &str) -> Option<Point> {
    if s.eq_ignore_ascii_case("pass") {
        return Some(PASS_MOVE);
    }

    let bytes = s.as_bytes();
    if bytes.len() < 2 {
        return None;
    }

    let col_char = bytes[0].to_ascii_uppercase();
    if !col_char.is_ascii_uppercase() || col_char == b'I' {
        return None;
    }
    let mut col = (col_char - b'A' + 1) as usize;
    if col_char > b'I' {
        col -= 1;
    }

    let row: usize = s[1..].parse().ok()?;
    if !(1..=N).contains(&col) || !(1..=N).contains(&row) {
        return None;
    }

    Some((N - row + 1) * (N + 1) + col)
}

/// Convert a Point to a coordinate string (e.g., "D4").
///
/// Returns "pass" for `PASS_MOVE`.
pub fn str_coord(pt: Point) -> String {
    if pt == PASS_MOVE {
        return "pass".into();
    }

    let row = pt / (N + 1);
    let col = pt % (N + 1);
    format!("{}{}", column_letter(col), N + 1 - row)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(s: &str) -> Point {
        parse_coord(s).unwrap()
    }

    #[test]
    fn test_empty_position() {
        let pos = Position::new();
        let center = (N / 2 + 1) * (N + 1) + (N / 2 + 1);
        assert_eq!(pos.color[center], EMPTY);
        assert_eq!(pos.n, 0);
        assert_eq!(pos.ko, 0);
        assert_eq!(pos.empty_points().len(), N * N);
    }

    #[test]
    fn test_parse_str_coord_roundtrip() {
        for row in 1..=N {
            for col in 1..=N {
                let p = row * (N + 1) + col;
                let s = str_coord(p);
                assert_eq!(parse_coord(&s), Some(p), "Failed roundtrip for {}", s);
            }
        }
    }

    #[test]
    fn test_parse_coord_rejects_garbage() {
        assert_eq!(parse_coord("I5"), None);
        assert_eq!(parse_coord("Z99"), None);
        assert_eq!(parse_coord("A0"), None);
        assert_eq!(parse_coord("x"), None);
    }

    #[test]
    fn test_play_move_basic() {
        let mut pos = Position::new();
        let d4 = pt("D4");
        pos.play(d4, Color::Black).unwrap();
        assert_eq!(pos.n, 1);
        assert_eq!(pos.last_move(), Some(d4));
        assert_eq!(pos.stone_at(d4), Some(Color::Black));
        assert_eq!(pos.current_player(), Color::White);
    }

    #[test]
    fn test_play_move_suicide() {
        let mut pos = Position::new();
        pos.play(pt("A2"), Color::Black).unwrap();
        pos.play(pt("B1"), Color::Black).unwrap();
        assert!(!pos.is_legal(pt("A1"), Color::White));
        assert_eq!(pos.play(pt("A1"), Color::White), Err(MoveError::Suicide));
        assert!(pos.is_empty(pt("A1")));
    }

    #[test]
    fn test_capture() {
        let mut pos = Position::new();
        pos.play(pt("D4"), Color::White).unwrap();
        for s in ["C4", "E4", "D5"] {
            pos.play(pt(s), Color::Black).unwrap();
        }
        assert_eq!(pos.single_liberty(pt("D4"), Color::White), Some(pt("D3")));
        pos.play(pt("D3"), Color::Black).unwrap();
        assert!(pos.is_empty(pt("D4")));
        assert_eq!(pos.cap_black, 1);
    }

    #[test]
    fn test_ko_rule() {
        let mut pos = Position::new();
        // Black: C4 D5 D3, White: E4 F5? build a standard ko shape around D4/E4
        for s in ["C4", "D5", "D3"] {
            pos.play(pt(s), Color::Black).unwrap();
        }
        for s in ["E5", "E3", "F4"] {
            pos.play(pt(s), Color::White).unwrap();
        }
        pos.play(pt("E4"), Color::Black).unwrap();
        // White captures the lone black stone at E4 by playing D4
        pos.play(pt("D4"), Color::White).unwrap();
        assert!(pos.is_empty(pt("E4")));
        assert_eq!(pos.ko, pt("E4"));
        assert!(!pos.is_legal(pt("E4"), Color::Black));
        assert_eq!(pos.play(pt("E4"), Color::Black), Err(MoveError::Ko));
    }

    #[test]
    fn test_group_liberties() {
        let mut pos = Position::new();
        let d4 = pt("D4");
        pos.play(d4, Color::Black).unwrap();
        assert_eq!(pos.liberties(d4, Color::Black), 4);
        assert_eq!(pos.liberties(d4, Color::White), 0);
        pos.play(pt("D5"), Color::Black).unwrap();
        assert_eq!(pos.liberties(d4, Color::Black), 6);
    }

    #[test]
    fn test_is_eye() {
        let mut pos = Position::new();
        assert!(!pos.is_eye(pt("A1"), Color::Black));
        pos.play(pt("A2"), Color::Black).unwrap();
        pos.play(pt("B1"), Color::Black).unwrap();
        assert!(pos.is_eye(pt("A1"), Color::Black));
        assert!(!pos.is_eye(pt("A1"), Color::White));
        // An opponent stone on the only diagonal spoils a corner eye
        pos.play(pt("B2"), Color::White).unwrap();
        assert!(!pos.is_eye(pt("A1"), Color::Black));
    }

    #[test]
    fn test_score_empty_board() {
        let pos = Position::new();
        assert_eq!(pos.area_score(), 0.0);
        assert_eq!(pos.score(6.5), Color::White);
        assert_eq!(pos.score(-0.5), Color::Black);
    }

    #[test]
    fn test_neighborhood_33_corner() {
        let mut pos = Position::new();
        pos.play(pt("B1"), Color::Black).unwrap();
        pos.play(pt("A2"), Color::White).unwrap();
        let nb = pos.neighborhood_33(pt("A1"));
        assert_eq!(&nb, b"#O.#.X###");
    }
}
