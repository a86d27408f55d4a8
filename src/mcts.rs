//! Monte Carlo Tree Search (MCTS) with UCT selection and prior knowledge.
//!
//! This module implements the search tree:
//! - Nodes live in an arena and refer to their parent by index
//! - Expansion creates one child per legal non-eye move plus a pass child,
//!   with priors normalized from a [`PriorModel`]
//! - UCT selection with a prior bonus that fades as a child gets visits
//! - Iterative backpropagation from leaf to root
//! - Root advancement that keeps the subtree of the move actually played
//!
//! All statistics are counted from Black's point of view; when White chooses,
//! the win rate is mirrored.

use crate::board::{Board, Color};
use crate::config::SearchConfig;
use crate::constants::{PASS_MOVE, PRIOR_DEFAULT};
use crate::error::{Result, SearchError, Stage};
use crate::features::PriorModel;
use crate::playout::rollout_value;
use crate::position::Point;

/// Index of a node in the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// A node in the MCTS search tree.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Number of playouts backpropagated through this node
    pub visits: u32,
    /// Sum of Black-perspective outcomes (1 = Black won)
    pub black_wins: f64,
    /// Whether children have been created
    pub expanded: bool,
    /// Normalized prior of the move leading here
    pub prior: f64,
    /// Move leading here from the parent. Meaningless for the root, which
    /// holds `PASS_MOVE` only as a filler and is told apart by `parent`.
    pub mv: Point,
    /// Non-owning back reference, `None` only for the root
    pub parent: Option<NodeId>,
    /// Children in expansion order: empty points in scan order, pass last
    children: Vec<(Point, NodeId)>,
}

impl TreeNode {
    fn new(mv: Point, parent: Option<NodeId>) -> Self {
        Self {
            visits: 0,
            black_wins: 0.0,
            expanded: false,
            prior: PRIOR_DEFAULT,
            mv,
            parent,
            children: Vec::new(),
        }
    }

    /// A node without children is a leaf, expanded or not.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn children(&self) -> &[(Point, NodeId)] {
        &self.children
    }

    /// Win rate for the player choosing at the parent, given who that is.
    #[inline]
    pub fn winrate(&self, chooser: Color) -> f64 {
        if self.visits == 0 {
            return 0.0;
        }
        let black_rate = self.black_wins / self.visits as f64;
        match chooser {
            Color::Black => black_rate,
            Color::White => 1.0 - black_rate,
        }
    }
}

/// UCT value of `child` as seen from `parent`, where `chooser` is to move.
///
/// Unvisited children score infinity so every child is tried once before any
/// is revisited. The prior bonus is the prior of `parent` itself, shrinking as
/// the child collects visits.
pub fn uct_value(parent: &TreeNode, child: &TreeNode, exploration: f64, chooser: Color) -> f64 {
    if child.visits == 0 {
        return f64::INFINITY;
    }
    let visits = child.visits as f64;
    child.winrate(chooser)
        + exploration * ((parent.visits as f64).ln() / visits).sqrt()
        + parent.prior / (1.0 + visits)
}

/// The search tree: an arena of nodes and the current root.
#[derive(Debug, Clone)]
pub struct SearchTree {
    nodes: Vec<TreeNode>,
    root: NodeId,
}

impl Default for SearchTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchTree {
    /// A tree with a single fresh, unexpanded root.
    pub fn new() -> Self {
        Self {
            nodes: vec![TreeNode::new(PASS_MOVE, None)],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }

    pub fn root_node(&self) -> &TreeNode {
        self.node(self.root)
    }

    /// All live nodes, root first.
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Child of `id` reached by `mv`, if it exists.
    pub fn child(&self, id: NodeId, mv: Point) -> Option<NodeId> {
        self.node(id)
            .children
            .iter()
            .find(|(m, _)| *m == mv)
            .map(|&(_, c)| c)
    }

    /// Create the children of `id` for the position `board` with `color` to move.
    ///
    /// Runs at most once per node.
    pub fn expand<B: Board, M: PriorModel<B> + ?Sized>(
        &mut self,
        id: NodeId,
        board: &B,
        color: Color,
        model: &M,
    ) {
        if self.nodes[id.0].expanded {
            return;
        }

        let mut moves: Vec<Point> = board
            .empty_points()
            .into_iter()
            .filter(|&mv| board.is_legal(mv, color) && !board.is_eye(mv, color))
            .collect();
        moves.push(PASS_MOVE);

        let weights = model.weights_for(board, color);
        let mut children = Vec::with_capacity(moves.len());
        let mut gammas_sum = 0.0;
        for mv in moves {
            let mut child = TreeNode::new(mv, Some(id));
            if !weights.is_empty() {
                child.prior = weights.get(&mv).copied().unwrap_or(0.0);
                gammas_sum += child.prior;
            }
            let child_id = NodeId(self.nodes.len());
            self.nodes.push(child);
            children.push((mv, child_id));
        }

        if !weights.is_empty() {
            if gammas_sum > 0.0 {
                for &(_, c) in &children {
                    self.nodes[c.0].prior /= gammas_sum;
                }
            } else {
                log::trace!("prior weights sum to zero, keeping raw priors");
            }
        }

        let node = &mut self.nodes[id.0];
        node.children = children;
        node.expanded = true;
    }

    /// The child of `id` with the highest UCT value, first one on ties.
    pub fn select(&self, id: NodeId, exploration: f64, chooser: Color) -> Option<(Point, NodeId)> {
        let node = self.node(id);
        let mut best: Option<(Point, NodeId)> = None;
        let mut best_value = f64::NEG_INFINITY;
        for &(mv, c) in &node.children {
            let value = uct_value(node, self.node(c), exploration, chooser);
            if best.is_none() || value > best_value {
                best = Some((mv, c));
                best_value = value;
            }
        }
        best
    }

    /// Add one outcome to `leaf` and all its ancestors, root first.
    pub fn backpropagate(&mut self, leaf: NodeId, black_value: f64) {
        let mut path = vec![leaf];
        let mut current = leaf;
        while let Some(parent) = self.nodes[current.0].parent {
            path.push(parent);
            current = parent;
        }
        for id in path.into_iter().rev() {
            let node = &mut self.nodes[id.0];
            node.visits += 1;
            node.black_wins += black_value;
        }
    }

    /// Run one playout on `board`, a private copy of the root position.
    pub fn playout<B: Board, M: PriorModel<B> + ?Sized>(
        &mut self,
        board: &mut B,
        mut color: Color,
        config: &SearchConfig,
        model: &M,
        rng: &mut fastrand::Rng,
    ) -> Result<()> {
        let mut node = self.root;
        if !self.node(node).expanded {
            self.expand(node, board, color, model);
        }

        while !self.node(node).is_leaf() {
            let Some((mv, next)) = self.select(node, config.exploration, color) else {
                break;
            };
            board
                .play(mv, color)
                .map_err(|source| SearchError::IllegalMoveAttempted {
                    mv,
                    color,
                    stage: Stage::Selection,
                    source,
                })?;
            color = color.opponent();
            node = next;
        }

        if !self.node(node).expanded {
            self.expand(node, board, color, model);
        }

        let value = rollout_value(board, color, config, rng)?;
        self.backpropagate(node, value);
        Ok(())
    }

    /// The most visited root child, first one on ties; `None` without children.
    pub fn best_move(&self) -> Option<Point> {
        let mut best: Option<(Point, u32)> = None;
        for &(mv, c) in &self.root_node().children {
            let visits = self.node(c).visits;
            if best.is_none_or(|(_, v)| visits > v) {
                best = Some((mv, visits));
            }
        }
        best.map(|(mv, _)| mv)
    }

    /// Visit counts of the root children, in expansion order.
    pub fn root_visits(&self) -> Vec<(Point, u32)> {
        self.root_node()
            .children
            .iter()
            .map(|&(mv, c)| (mv, self.node(c).visits))
            .collect()
    }

    /// Make the child reached by `mv` the new root and drop everything else.
    ///
    /// Without such a child the tree restarts from a fresh root.
    pub fn advance_root(&mut self, mv: Point) {
        let Some(new_root) = self.child(self.root, mv) else {
            *self = Self::new();
            return;
        };

        // Copy the kept subtree into a new arena, remapping indices
        let mut nodes: Vec<TreeNode> = Vec::new();
        let mut stack = vec![(new_root, None)];
        while let Some((old, parent)) = stack.pop() {
            let new_id = NodeId(nodes.len());
            let mut node = self.nodes[old.0].clone();
            node.parent = parent;
            let old_children = std::mem::take(&mut node.children);
            nodes.push(node);
            if let Some(p) = parent {
                nodes[p.0].children.push((self.nodes[old.0].mv, new_id));
            }
            // Reverse so children are re-linked in their original order
            for &(_, c) in old_children.iter().rev() {
                stack.push((c, Some(new_id)));
            }
        }

        self.nodes = nodes;
        self.root = NodeId(0);
    }
}
