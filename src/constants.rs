//! Constants for board dimensions, special moves and search defaults.
//!
//! The board uses a 1D array representation with padding for boundary detection.
//!
//! # Board Size Configuration
//!
//! The board size is controlled by Cargo features:
//! - `board9x9` (default): 9x9 board
//! - `board13x13`: 13x13 board
//!
//! ```sh
//! cargo build                                              # 9x9 (default)
//! cargo build --no-default-features --features board13x13  # 13x13
//! ```

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size (NxN).
#[cfg(feature = "board9x9")]
pub const N: usize = 9;

#[cfg(feature = "board13x13")]
pub const N: usize = 13;

#[cfg(all(feature = "board9x9", feature = "board13x13"))]
compile_error!("Cannot enable both 'board9x9' and 'board13x13' features at the same time");

#[cfg(not(any(feature = "board9x9", feature = "board13x13")))]
compile_error!("Must enable exactly one board size feature: 'board9x9' or 'board13x13'");

/// Board width including left padding (N + 2 for padding on both sides).
pub const W: usize = N + 2;

/// Total board array size including all padding.
///
/// Each row is one padding cell followed by N points, so the row stride is N + 1.
pub const BOARDSIZE: usize = (N + 1) * W + 1;

/// First board index worth scanning (skips top padding).
pub const BOARD_IMIN: usize = N + 1;

/// Last board index worth scanning (before bottom padding).
pub const BOARD_IMAX: usize = BOARDSIZE - N - 1;

// =============================================================================
// Special Move Values
// =============================================================================

/// Pass move marker (index 0 is padding, so safe to use).
pub const PASS_MOVE: usize = 0;

// =============================================================================
// Search Defaults
// =============================================================================

/// Default number of playouts per move.
pub const DEFAULT_PLAYOUTS: usize = 200;

/// Default maximum number of moves in a single rollout.
pub const DEFAULT_ROLLOUT_LIMIT: usize = 100;

/// Default UCT exploration constant.
pub const DEFAULT_EXPLORATION: f64 = 0.01;

/// Default komi (compensation points for White).
pub const DEFAULT_KOMI: f64 = 6.5;

/// Prior given to a child when the prior model has no opinion.
pub const PRIOR_DEFAULT: f64 = 1.0;

/// Self-atari is only considered when no adjacent own block has more
/// liberties than this before the move.
pub const SELFATARI_LIBERTY_LIMIT: usize = 2;

// =============================================================================
// Neighbor Offsets
// =============================================================================

/// Offsets to neighboring points in the 1D board array.
/// Order: North, East, South, West, NE, SE, SW, NW
pub const DELTA: [isize; 8] = [
    -(N as isize) - 1, // North (up one row)
    1,                 // East (right one column)
    (N as isize) + 1,  // South (down one row)
    -1,                // West (left one column)
    -(N as isize),     // NE (diagonal)
    W as isize,        // SE (diagonal)
    N as isize,        // SW (diagonal)
    -(W as isize),     // NW (diagonal)
];

// =============================================================================
// Cell Contents
// =============================================================================

/// Black stone.
pub const STONE_BLACK: u8 = b'X';

/// White stone.
pub const STONE_WHITE: u8 = b'O';

/// Empty point.
pub const EMPTY: u8 = b'.';

/// Out of bounds (padding).
pub const OUT: u8 = b' ';
