//! go-uct: a Go engine built on Monte Carlo Tree Search.
//!
//! The engine picks moves with UCT search over a tree that is reused between
//! moves. Each playout descends the tree, expands a leaf with priors from a
//! [`features::PriorModel`], and finishes the game with a tactical rollout
//! policy (capture, atari defense, 3x3 patterns, random).
//!
//! ## Modules
//!
//! - [`constants`] - Board dimensions and search defaults
//! - [`board`] - Colors and the [`board::Board`] trait the search plays on
//! - [`position`] - Core game logic (board state, moves, captures, scoring)
//! - [`patterns`] - 3x3 pattern matching
//! - [`features`] - Move priors
//! - [`policy`] - Rollout move policy and self-atari filter
//! - [`playout`] - Policy-driven game simulation
//! - [`mcts`] - The search tree
//! - [`search`] - The search driver, [`search::MctsPlayer`]
//! - [`config`] - Search parameters
//! - [`gtp`] - Go Text Protocol front-end
//!
//! ## Example
//!
//! ```
//! use go_uct::board::{Board, Color};
//! use go_uct::config::SearchConfig;
//! use go_uct::features::NoPrior;
//! use go_uct::position::{Position, parse_coord, str_coord};
//! use go_uct::search::MctsPlayer;
//!
//! // Create a new game and play a move
//! let mut pos = Position::new();
//! let d4 = parse_coord("D4").unwrap();
//! pos.play(d4, Color::Black).unwrap();
//!
//! // Search for White's reply
//! let config = SearchConfig::new().with_playouts(50);
//! let mut player = MctsPlayer::with_seed(NoPrior, 1);
//! let best = player.choose_move(&pos, Color::White, &config).unwrap();
//! println!("Best move: {}", str_coord(best));
//! ```

pub mod board;
pub mod config;
pub mod constants;
pub mod error;
pub mod features;
pub mod gtp;
pub mod mcts;
pub mod patterns;
pub mod playout;
pub mod policy;
pub mod position;
pub mod search;
