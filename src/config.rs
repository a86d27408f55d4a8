//! Search configuration.
//!
//! A [`SearchConfig`] is an immutable value handed to every search call;
//! nothing in the engine keeps process-wide settings.

use crate::constants::{DEFAULT_EXPLORATION, DEFAULT_KOMI, DEFAULT_PLAYOUTS, DEFAULT_ROLLOUT_LIMIT};
use crate::error::{Result, SearchError};
use crate::policy::PolicyOptions;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Playouts per move
    pub playouts: usize,
    /// Maximum number of moves in one rollout
    pub rollout_limit: usize,
    /// UCT exploration constant
    pub exploration: f64,
    /// Use 3x3 pattern moves in rollouts
    pub use_pattern_policy: bool,
    /// Reject self-atari candidates in rollouts
    pub use_self_atari_filter: bool,
    /// Komi used to score finished rollouts
    pub komi: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            playouts: DEFAULT_PLAYOUTS,
            rollout_limit: DEFAULT_ROLLOUT_LIMIT,
            exploration: DEFAULT_EXPLORATION,
            use_pattern_policy: true,
            use_self_atari_filter: true,
            komi: DEFAULT_KOMI,
        }
    }
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_playouts(mut self, n: usize) -> Self {
        self.playouts = n;
        self
    }

    pub fn with_rollout_limit(mut self, limit: usize) -> Self {
        self.rollout_limit = limit;
        self
    }

    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration = c;
        self
    }

    pub fn with_pattern_policy(mut self, enabled: bool) -> Self {
        self.use_pattern_policy = enabled;
        self
    }

    pub fn with_self_atari_filter(mut self, enabled: bool) -> Self {
        self.use_self_atari_filter = enabled;
        self
    }

    pub fn with_komi(mut self, komi: f64) -> Self {
        self.komi = komi;
        self
    }

    /// Check the configuration before a search uses it.
    pub fn validate(&self) -> Result<()> {
        if self.playouts == 0 {
            return Err(SearchError::InvalidConfig("playouts must be > 0".into()));
        }
        if self.rollout_limit == 0 {
            return Err(SearchError::InvalidConfig("rollout limit must be > 0".into()));
        }
        if !self.exploration.is_finite() || self.exploration < 0.0 {
            return Err(SearchError::InvalidConfig(format!(
                "exploration must be finite and >= 0 (got {})",
                self.exploration
            )));
        }
        if !self.komi.is_finite() {
            return Err(SearchError::InvalidConfig(format!("komi must be finite (got {})", self.komi)));
        }
        Ok(())
    }

    /// Options for the rollout move policy.
    pub fn policy_options(&self) -> PolicyOptions {
        PolicyOptions {
            use_pattern: self.use_pattern_policy,
            check_selfatari: self.use_self_atari_filter,
        }
    }
}
