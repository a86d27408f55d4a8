//! Search driver: runs playouts and turns the finished tree into a move.

use std::fmt;

use crate::board::{Board, Color};
use crate::config::SearchConfig;
use crate::constants::PASS_MOVE;
use crate::error::Result;
use crate::features::{NoPrior, PriorModel};
use crate::mcts::SearchTree;
use crate::position::{Point, str_coord};

/// Statistics of one root child.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveStat {
    pub mv: Point,
    /// Win rate for the side to move at the root
    pub win_rate: f64,
    /// Wins for the side to move at the root
    pub wins: f64,
    pub visits: u32,
}

impl fmt::Display for MoveStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>4} {:5.1}% ({:.0}/{})",
            str_coord(self.mv),
            self.win_rate * 100.0,
            self.wins,
            self.visits
        )
    }
}

/// An MCTS player that keeps its tree between moves.
pub struct MctsPlayer<M = NoPrior> {
    tree: SearchTree,
    model: M,
    rng: fastrand::Rng,
    /// Side to move at the current root, once a search has run
    root_color: Option<Color>,
}

impl Default for MctsPlayer<NoPrior> {
    fn default() -> Self {
        Self::new(NoPrior)
    }
}

impl<M> MctsPlayer<M> {
    pub fn new(model: M) -> Self {
        Self::from_rng(model, fastrand::Rng::new())
    }

    /// A player whose searches are reproducible.
    pub fn with_seed(model: M, seed: u64) -> Self {
        Self::from_rng(model, fastrand::Rng::with_seed(seed))
    }

    fn from_rng(model: M, rng: fastrand::Rng) -> Self {
        Self {
            tree: SearchTree::new(),
            model,
            rng,
            root_color: None,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn tree(&self) -> &SearchTree {
        &self.tree
    }

    /// Drop the tree and start over.
    pub fn reset(&mut self) {
        self.tree = SearchTree::new();
        self.root_color = None;
    }

    /// Keep the subtree of `mv`, which was just played on the real board.
    pub fn advance_root(&mut self, mv: Point) {
        self.tree.advance_root(mv);
        self.root_color = self.root_color.map(Color::opponent);
    }

    /// Visit counts of the root children, in expansion order.
    pub fn root_visits(&self) -> Vec<(Point, u32)> {
        self.tree.root_visits()
    }

    /// Root children statistics, most visited first.
    pub fn root_statistics(&self) -> Vec<MoveStat> {
        let chooser = self.root_color.unwrap_or(Color::Black);
        let mut stats: Vec<MoveStat> = self
            .tree
            .root_node()
            .children()
            .iter()
            .map(|&(mv, id)| {
                let node = self.tree.node(id);
                let wins = match chooser {
                    Color::Black => node.black_wins,
                    Color::White => node.visits as f64 - node.black_wins,
                };
                MoveStat {
                    mv,
                    win_rate: node.winrate(chooser),
                    wins,
                    visits: node.visits,
                }
            })
            .collect();
        // Stable sort keeps expansion order among equal visit counts
        stats.sort_by(|a, b| b.visits.cmp(&a.visits));
        stats
    }

    /// Search `board` with `color` to move and return the most visited move.
    ///
    /// `board` is never modified; every playout runs on its own copy.
    pub fn choose_move<B>(&mut self, board: &B, color: Color, config: &SearchConfig) -> Result<Point>
    where
        B: Board,
        M: PriorModel<B>,
    {
        config.validate()?;
        if self.root_color.is_some_and(|c| c != color) {
            log::debug!("root was searched for the other color, resetting tree");
            self.tree = SearchTree::new();
        }
        self.root_color = Some(color);

        for _ in 0..config.playouts {
            let mut copy = board.clone();
            self.tree
                .playout(&mut copy, color, config, &self.model, &mut self.rng)?;
        }

        let Some(mv) = self.tree.best_move() else {
            log::trace!("root has no children, passing");
            return Ok(PASS_MOVE);
        };

        if log::log_enabled!(log::Level::Debug) {
            let root = self.tree.root_node();
            log::debug!(
                "{} playouts for {color}, root visits {}, tree size {}",
                config.playouts,
                root.visits,
                self.tree.len()
            );
            for stat in self.root_statistics().iter().take(5) {
                log::debug!("  {stat}");
            }
        }

        Ok(mv)
    }
}
