//! Errors surfaced by the search.

use thiserror::Error;

use crate::board::Color;
use crate::position::{MoveError, Point, str_coord};

/// Where in a playout an illegal move was proposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Tree descent picked a child the board rejects.
    Selection,
    /// The move policy proposed a move the board rejects.
    Rollout,
}

#[derive(Debug, Error)]
pub enum SearchError {
    /// An invariant of the tree or the move policy was broken; the search halts.
    #[error("{stage:?} proposed illegal move {} for {color}: {source}", coord_name(.mv))]
    IllegalMoveAttempted {
        mv: Point,
        color: Color,
        stage: Stage,
        #[source]
        source: MoveError,
    },

    #[error("invalid search configuration: {0}")]
    InvalidConfig(String),
}

fn coord_name(pt: &Point) -> String {
    str_coord(*pt)
}

pub type Result<T> = std::result::Result<T, SearchError>;
