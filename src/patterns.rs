//! 3x3 pattern matching for move generation.
//!
//! The pattern dictionary is stored in an 8192-byte bitfield, where each bit
//! corresponds to a possible 16-bit encoding of the 8 neighbors of a point
//! (env8). Patterns are expanded over all rotations, reflections and color
//! swaps, so a lookup does not depend on which side is to move.

use std::sync::OnceLock;

use crate::board::Board;
use crate::position::Point;

/// The 3x3 pattern source definitions.
/// Each pattern is a 9-character string representing a 3x3 grid:
/// - X: one color
/// - O: the other color
/// - .: empty
/// - x: not X (i.e., O or . or #)
/// - o: not O (i.e., X or . or #)
/// - ?: any (X, O, ., or #)
/// - #: edge of board (out of bounds)
const PAT3_SRC: &[&str] = &[
    // 1- hane pattern - enclosing hane
    "XOX...???",
    // 2- hane pattern - non-cutting hane
    "XO....?.?",
    // 3- hane pattern - magari
    "XO?X..x.?",
    // 4- generic pattern - katatsuke or diagonal attachment
    ".O.X.....",
    // 5- cut1 pattern (kiri) - unprotected cut
    "XO?O.o?o?",
    // 6- cut1 pattern (kiri) - peeped cut
    "XO?O.X???",
    // 7- cut2 pattern (de)
    "?X?O.Oooo",
    // 8- cut keima
    "OX?o.O???",
    // 9- side pattern - chase
    "X.?O.?##?",
    // 10- side pattern - block side cut
    "OX?X.O###",
    // 11- side pattern - block side connection
    "?X?x.O###",
    // 12- side pattern - sagari
    "?XOx.x###",
    // 13- side pattern - cut
    "?OXX.O###",
];

static PAT3SET: OnceLock<[u8; 8192]> = OnceLock::new();

/// Check if the empty point `pt` matches any 3x3 pattern.
#[inline]
pub fn pat3_match<B: Board>(board: &B, pt: Point) -> bool {
    if !board.is_empty(pt) {
        return false;
    }
    pat3_match_env(&board.neighborhood_33(pt))
}

/// Check an already extracted 3x3 neighborhood against the dictionary.
pub fn pat3_match_env(env: &[u8; 9]) -> bool {
    let pat3set = PAT3SET.get_or_init(make_pat3set);
    let env8 = compute_code(env);
    let byte_idx = (env8 >> 3) as usize;
    let bit_idx = (env8 & 7) as u8;
    (pat3set[byte_idx] & (1 << bit_idx)) != 0
}

/// Build the 3x3 pattern lookup table.
fn make_pat3set() -> [u8; 8192] {
    let mut pat3set = [0u8; 8192];
    for pat_src in PAT3_SRC {
        let mut src = [0u8; 9];
        src.copy_from_slice(pat_src.as_bytes());
        pat_enumerate(src, &mut pat3set);
    }
    pat3set
}

/// Add all rotations, reflections and color swaps of a pattern.
fn pat_enumerate(src: [u8; 9], pat3set: &mut [u8; 8192]) {
    let rotated = rot90(src);
    for base in [src, rotated] {
        for flipped_v in [base, vertflip(base)] {
            for flipped in [flipped_v, horizflip(flipped_v)] {
                pat_wildexp(flipped, 0, pat3set);
                pat_wildexp(swapcolor(flipped), 0, pat3set);
            }
        }
    }
}

/// Expand wildcards and add all matching patterns to the set.
fn pat_wildexp(src: [u8; 9], i: usize, pat3set: &mut [u8; 8192]) {
    if i == 9 {
        let env8 = compute_code(&src);
        pat3set[(env8 >> 3) as usize] |= 1 << (env8 & 7);
        return;
    }

    let choices: &[u8] = match src[i] {
        b'?' => b"XO.#",
        b'x' => b"O.#",
        b'o' => b"X.#",
        _ => return pat_wildexp(src, i + 1, pat3set),
    };
    for &c in choices {
        let mut expanded = src;
        expanded[i] = c;
        pat_wildexp(expanded, i + 1, pat3set);
    }
}

/// Compute the 16-bit env8 code of a 3x3 neighborhood.
///
/// The layout is:
/// ```text
/// 0 1 2     bits: 7 0 4
/// 3 4 5  ->       3 . 1
/// 6 7 8           6 2 5
/// ```
///
/// Low 8 bits encode the orthogonal neighbors, high 8 bits the diagonals.
fn compute_code(src: &[u8; 9]) -> u16 {
    code(src[1], 0)
        | code(src[5], 1)
        | code(src[7], 2)
        | code(src[3], 3)
        | code(src[2], 0) << 8
        | code(src[8], 1) << 8
        | code(src[6], 2) << 8
        | code(src[0], 3) << 8
}

/// Encode a single neighbor into its bit positions (p and p + 4).
fn code(color: u8, p: u8) -> u16 {
    let c: u16 = match color {
        b'O' => 0,
        b'X' => 1,
        b'.' => 2,
        _ => 3, // '#'
    };
    let hi = (c >> 1) & 1;
    let lo = c & 1;
    ((hi << 4) | lo) << p
}

fn swapcolor(mut src: [u8; 9]) -> [u8; 9] {
    for c in src.iter_mut() {
        *c = match *c {
            b'X' => b'O',
            b'O' => b'X',
            b'x' => b'o',
            b'o' => b'x',
            other => other,
        };
    }
    src
}

fn horizflip(mut src: [u8; 9]) -> [u8; 9] {
    src.swap(0, 6);
    src.swap(1, 7);
    src.swap(2, 8);
    src
}

fn vertflip(mut src: [u8; 9]) -> [u8; 9] {
    src.swap(0, 2);
    src.swap(3, 5);
    src.swap(6, 8);
    src
}

fn rot90(src: [u8; 9]) -> [u8; 9] {
    [
        src[2], src[5], src[8], //
        src[1], src[4], src[7], //
        src[0], src[3], src[6],
    ]
}
