//! Prior knowledge for tree expansion.
//!
//! A [`PriorModel`] maps every candidate move of a position to a non-negative
//! weight ("gamma"). The tree normalizes these weights into child priors.
//!
//! [`GammaModel`] is a product-of-gammas model over a handful of local move
//! features, with weights read from a text file:
//!
//! ```text
//! # feature weight
//! capture      8.0
//! atari_escape 5.0
//! self_atari   0.1
//! pat3         3.0
//! dist_last_1  4.0
//! line_1       0.3
//! pass         0.05
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};

use crate::board::{Board, Color};
use crate::constants::PASS_MOVE;
use crate::patterns::pat3_match;
use crate::policy::is_self_atari;
use crate::position::Point;

/// Source of per-move weights used as priors.
pub trait PriorModel<B: Board> {
    /// Weights for the candidate moves of `color`, `PASS_MOVE` included.
    ///
    /// An empty map means "no opinion": priors keep their default value.
    fn weights_for(&self, board: &B, color: Color) -> HashMap<Point, f64>;
}

impl<B: Board, M: PriorModel<B> + ?Sized> PriorModel<B> for Box<M> {
    fn weights_for(&self, board: &B, color: Color) -> HashMap<Point, f64> {
        (**self).weights_for(board, color)
    }
}

/// The model without knowledge.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrior;

impl<B: Board> PriorModel<B> for NoPrior {
    fn weights_for(&self, _board: &B, _color: Color) -> HashMap<Point, f64> {
        HashMap::new()
    }
}

/// Local features of a candidate move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Pass,
    /// Captures at least one opponent stone
    Capture,
    /// Extends an own block that is in atari
    AtariEscape,
    /// Reduces an opponent block to one liberty
    Atari,
    /// Leaves the played block with one liberty
    SelfAtari,
    /// Matches the 3x3 pattern dictionary
    Pattern3x3,
    /// Manhattan distance to the last move: 1, 2, 3 or 4 (= 4 and more)
    DistanceToLast(u8),
    /// Line counted from the nearest edge: 1, 2 or 3
    Line(u8),
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feature::Pass => f.write_str("pass"),
            Feature::Capture => f.write_str("capture"),
            Feature::AtariEscape => f.write_str("atari_escape"),
            Feature::Atari => f.write_str("atari"),
            Feature::SelfAtari => f.write_str("self_atari"),
            Feature::Pattern3x3 => f.write_str("pat3"),
            Feature::DistanceToLast(d) => write!(f, "dist_last_{d}"),
            Feature::Line(l) => write!(f, "line_{l}"),
        }
    }
}

impl FromStr for Feature {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let feature = match s {
            "pass" => Feature::Pass,
            "capture" => Feature::Capture,
            "atari_escape" => Feature::AtariEscape,
            "atari" => Feature::Atari,
            "self_atari" => Feature::SelfAtari,
            "pat3" => Feature::Pattern3x3,
            _ => {
                if let Some(d) = s.strip_prefix("dist_last_") {
                    match d.parse::<u8>() {
                        Ok(d @ 1..=4) => Feature::DistanceToLast(d),
                        _ => bail!("bad distance feature {s:?}"),
                    }
                } else if let Some(l) = s.strip_prefix("line_") {
                    match l.parse::<u8>() {
                        Ok(l @ 1..=3) => Feature::Line(l),
                        _ => bail!("bad line feature {s:?}"),
                    }
                } else {
                    bail!("unknown feature {s:?}");
                }
            }
        };
        Ok(feature)
    }
}

/// Features of playing `mv` for `color`.
pub fn move_features<B: Board>(board: &B, mv: Point, color: Color) -> Vec<Feature> {
    if mv == PASS_MOVE {
        return vec![Feature::Pass];
    }
    let opp = color.opponent();
    let mut features = Vec::new();

    let mut capture = false;
    let mut escape = false;
    let mut atari = false;
    for n in board.neighbors(mv) {
        match board.stone_at(n) {
            Some(c) if c == opp => {
                let libs = board.liberties(n, opp);
                capture |= libs == 1;
                atari |= libs == 2;
            }
            Some(_) => escape |= board.liberties(n, color) == 1,
            None => {}
        }
    }
    if capture {
        features.push(Feature::Capture);
    }
    if escape {
        features.push(Feature::AtariEscape);
    }
    if atari {
        features.push(Feature::Atari);
    }
    if is_self_atari(board, mv, color) {
        features.push(Feature::SelfAtari);
    }
    if pat3_match(board, mv) {
        features.push(Feature::Pattern3x3);
    }

    let (row, col) = board.coord(mv);
    if let Some(last) = board.last_move() {
        let (lr, lc) = board.coord(last);
        let dist = row.abs_diff(lr) + col.abs_diff(lc);
        features.push(Feature::DistanceToLast(dist.clamp(1, 4) as u8));
    }
    let size = board.size();
    let line = row.min(col).min(size + 1 - row).min(size + 1 - col);
    if line <= 3 {
        features.push(Feature::Line(line as u8));
    }
    features
}

/// Product-of-gammas prior over [`Feature`]s.
#[derive(Debug, Clone, Default)]
pub struct GammaModel {
    weights: HashMap<Feature, f64>,
}

impl GammaModel {
    pub fn new(weights: HashMap<Feature, f64>) -> Self {
        Self { weights }
    }

    /// Load weights from a `<feature> <weight>` text file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading feature weights from {}", path.display()))?;
        text.parse::<Self>()
            .with_context(|| format!("parsing feature weights in {}", path.display()))
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Product of the weights of `features`; unweighted features count as 1.
    pub fn gamma(&self, features: &[Feature]) -> f64 {
        features
            .iter()
            .map(|f| self.weights.get(f).copied().unwrap_or(1.0))
            .product()
    }
}

impl FromStr for GammaModel {
    type Err = anyhow::Error;

    fn from_str(text: &str) -> Result<Self> {
        let mut weights = HashMap::new();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let mut parts = line.split_whitespace();
            let (Some(name), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
                bail!("line {}: expected `<feature> <weight>`", lineno + 1);
            };
            let feature = name.parse::<Feature>().with_context(|| format!("line {}", lineno + 1))?;
            let weight: f64 = value
                .parse()
                .map_err(|e| anyhow!("line {}: bad weight {value:?}: {e}", lineno + 1))?;
            if !weight.is_finite() || weight < 0.0 {
                bail!("line {}: weight must be finite and >= 0", lineno + 1);
            }
            weights.insert(feature, weight);
        }
        Ok(Self { weights })
    }
}

impl<B: Board> PriorModel<B> for GammaModel {
    fn weights_for(&self, board: &B, color: Color) -> HashMap<Point, f64> {
        if self.is_empty() {
            return HashMap::new();
        }
        let mut weights: HashMap<Point, f64> = board
            .empty_points()
            .into_iter()
            .filter(|&mv| board.is_legal(mv, color) && !board.is_eye(mv, color))
            .map(|mv| (mv, self.gamma(&move_features(board, mv, color))))
            .collect();
        weights.insert(PASS_MOVE, self.gamma(&[Feature::Pass]));
        weights
    }
}

/// Normalized prior distribution, most likely move first.
///
/// Empty if the model has no opinion or all weights are zero.
pub fn prior_distribution<B: Board, M: PriorModel<B> + ?Sized>(
    model: &M,
    board: &B,
    color: Color,
) -> Vec<(Point, f64)> {
    let weights = model.weights_for(board, color);
    let total: f64 = weights.values().sum();
    if total <= 0.0 {
        return Vec::new();
    }
    let mut dist: Vec<(Point, f64)> = weights.into_iter().map(|(mv, w)| (mv, w / total)).collect();
    dist.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    dist
}
