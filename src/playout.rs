//! Monte Carlo rollouts (policy-driven game simulation).
//!
//! A rollout plays policy moves until two consecutive passes or the move
//! limit, then scores the final position.

use crate::board::{Board, Color};
use crate::config::SearchConfig;
use crate::constants::PASS_MOVE;
use crate::error::{Result, SearchError, Stage};
use crate::policy::generate_move;

/// Play the game out from `board` with `color` to move and return the winner.
pub fn play_game<B: Board>(
    board: &mut B,
    mut color: Color,
    config: &SearchConfig,
    rng: &mut fastrand::Rng,
) -> Result<Color> {
    let options = config.policy_options();
    let mut passes = 0;

    for _ in 0..config.rollout_limit {
        match generate_move(board, color, options, rng) {
            Some(mv) => {
                board
                    .play(mv, color)
                    .map_err(|source| SearchError::IllegalMoveAttempted {
                        mv,
                        color,
                        stage: Stage::Rollout,
                        source,
                    })?;
                passes = 0;
            }
            None => {
                board
                    .play(PASS_MOVE, color)
                    .map_err(|source| SearchError::IllegalMoveAttempted {
                        mv: PASS_MOVE,
                        color,
                        stage: Stage::Rollout,
                        source,
                    })?;
                passes += 1;
                if passes == 2 {
                    break;
                }
            }
        }
        color = color.opponent();
    }

    Ok(board.score(config.komi))
}

/// Rollout outcome from Black's point of view: 1.0 for a Black win, else 0.0.
pub fn rollout_value<B: Board>(
    board: &mut B,
    color: Color,
    config: &SearchConfig,
    rng: &mut fastrand::Rng,
) -> Result<f64> {
    let winner = play_game(board, color, config, rng)?;
    Ok(if winner == Color::Black { 1.0 } else { 0.0 })
}
