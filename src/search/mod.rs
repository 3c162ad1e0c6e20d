//! Search primitives shared by the strategy tiers.
//!
//! Candidate generation, combination search over per-unit candidates,
//! cheap forward simulation, and the regret-matching arbiter.

pub mod candidates;
pub mod combination;
pub mod regret;
pub mod simulate;

pub use candidates::{adaptive_k, score_order, top_k, unit_candidates, ScoredOrder};
pub use combination::{
    sanitize_combo, search_best, search_top_n, RankedCombo, SearchLimits, SearchStats,
};
pub use regret::{
    cooperation_penalty, run_regret_matching, select_candidate, Arbitration, RegretLimits,
    RegretState,
};
pub use simulate::{
    dedup_move_targets, heuristic_policy, predict_opponents, simulate_ahead, simulate_phase,
    BuildPolicy, Horizon, MovePolicy, Rollout,
};
