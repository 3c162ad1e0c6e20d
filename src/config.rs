//! Tuned engine constants.
//!
//! Every knob the decision tiers consult lives here so that a bot can be
//! reconfigured from a JSON file without rebuilding. Missing keys keep their
//! defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0} must be positive")]
    NonPositive(&'static str),
    #[error("regret_discount must lie in (0, 1], got {0}")]
    Discount(f32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on combinations examined by one combination search.
    pub combo_budget: usize,
    /// Largest per-unit branching factor.
    pub max_k: usize,
    /// Iterations between wall-clock checks in enumeration loops.
    pub deadline_check_interval: usize,
    /// Maximum candidate pool size for the posture tier.
    pub candidate_count: usize,
    pub rm_iterations: usize,
    pub lookahead_phases: usize,
    pub lookahead_years: u16,
    pub opponent_samples: usize,
    pub regret_discount: f32,
    /// Penalty per rival attacked beyond the first.
    pub cooperation_penalty: f32,
    /// Top-ranked search combinations the tactical tier plays ahead.
    pub tactical_search_candidates: usize,
    pub tactical_heuristic_candidates: usize,
    pub tactical_lookahead_plies: usize,
    pub stochastic_tries: usize,
    pub perturbed_count: usize,
    /// Center count at which the posture tier adds a closing candidate.
    pub closing_sc_threshold: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            combo_budget: 50_000,
            max_k: 5,
            deadline_check_interval: 1_000,
            candidate_count: 16,
            rm_iterations: 64,
            lookahead_phases: 4,
            lookahead_years: 2,
            opponent_samples: 3,
            regret_discount: 0.95,
            cooperation_penalty: 2.0,
            tactical_search_candidates: 3,
            tactical_heuristic_candidates: 4,
            tactical_lookahead_plies: 2,
            stochastic_tries: 48,
            perturbed_count: 4,
            closing_sc_threshold: 14,
        }
    }
}

impl EngineConfig {
    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        let cfg: EngineConfig = serde_json::from_str(s)?;
        cfg.validated()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    fn validated(self) -> Result<Self, ConfigError> {
        let positive = [
            ("combo_budget", self.combo_budget),
            ("max_k", self.max_k),
            ("deadline_check_interval", self.deadline_check_interval),
            ("candidate_count", self.candidate_count),
            ("opponent_samples", self.opponent_samples),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, v)| *v == 0) {
            return Err(ConfigError::NonPositive(name));
        }
        if !(self.regret_discount > 0.0 && self.regret_discount <= 1.0) {
            return Err(ConfigError::Discount(self.regret_discount));
        }
        Ok(self)
    }
}
