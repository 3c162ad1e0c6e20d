//! Stratagem: decision engine for Diplomacy bots.
//!
//! Tiers of increasing strength pick orders for one power: hold, random,
//! a greedy heuristic, combination search with lookahead, and posture
//! candidates arbitrated by regret matching. Around them sit the board and
//! rules engine, evaluation, an opening book, diplomacy, the DFEN/DSON
//! notations, and an arena that plays tiers against each other.

pub mod arena;
pub mod board;
pub mod config;
pub mod diplomacy;
pub mod engine;
pub mod eval;
pub mod movegen;
pub mod opening_book;
pub mod protocol;
pub mod resolve;
pub mod search;
pub mod strategy;
