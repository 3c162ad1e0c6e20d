//! Search-plus-lookahead tier.
//!
//! Opening book in the first year. Afterwards one disciplined candidate comes
//! from combination search against predicted opponent orders, a few more
//! from the randomized heuristic, and every candidate is played a couple of
//! plies ahead before the best evaluated one is chosen.

use log::debug;
use rand::rngs::SmallRng;

use crate::board::{
    home_centers, BuildOrder, GameState, Order, Power, Province, RetreatOrder, Terrain, UnitKind,
};
use crate::diplomacy::Intent;
use crate::eval::{evaluate, naval_bias, nearest_unclaimed_any, province_threat, province_threat2};
use crate::opening_book::{BookMatchConfig, OpeningBook};
use crate::resolve::{advance_state, apply_resolution, Resolver};
use crate::search::{
    adaptive_k, dedup_move_targets, heuristic_policy, predict_opponents, search_top_n,
    simulate_ahead, unit_candidates, Horizon, Rollout, SearchLimits,
};

use super::{heuristic, Context, Strategy};

/// Only the first game year is covered by the book.
const BOOK_LAST_YEAR: u16 = 1901;

/// How strongly received intents bend candidate scores.
const COMPLIANCE: f32 = 1.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct TacticalStrategy;

impl Strategy for TacticalStrategy {
    fn name(&self) -> &'static str {
        "tactical"
    }

    fn movement_orders(
        &self,
        state: &GameState,
        power: Power,
        ctx: &Context<'_>,
        rng: &mut SmallRng,
    ) -> Vec<Order> {
        if state.unit_count(power) == 0 {
            return Vec::new();
        }
        if let Some(orders) = book_orders(state, power, ctx.book, ctx.book_match, rng) {
            return orders;
        }
        search_with_lookahead(state, power, ctx, rng)
    }

    fn retreat_orders(
        &self,
        state: &GameState,
        power: Power,
        _ctx: &Context<'_>,
        rng: &mut SmallRng,
    ) -> Vec<RetreatOrder> {
        heuristic::retreat_orders(state, power, rng)
    }

    fn build_orders(
        &self,
        state: &GameState,
        power: Power,
        _ctx: &Context<'_>,
        rng: &mut SmallRng,
    ) -> Vec<BuildOrder> {
        build_orders(state, power, rng)
    }

    fn diplomatic_messages(
        &self,
        state: &GameState,
        power: Power,
        received: &[Intent],
    ) -> Vec<Intent> {
        crate::diplomacy::respond(state, power, received)
    }
}

/// Opening-book orders while the book applies.
pub(crate) fn book_orders(
    state: &GameState,
    power: Power,
    book: Option<&OpeningBook>,
    book_match: BookMatchConfig,
    rng: &mut SmallRng,
) -> Option<Vec<Order>> {
    if state.year > BOOK_LAST_YEAR {
        return None;
    }
    book?.lookup(state, power, &book_match, rng)
}

/// Threat-aware builds, heuristic disbands.
pub fn build_orders(state: &GameState, power: Power, rng: &mut SmallRng) -> Vec<BuildOrder> {
    let delta = state.adjustment_delta(power);
    if delta > 0 {
        threat_aware_builds(state, power, delta as usize)
    } else {
        heuristic::build_orders(state, power, rng)
    }
}

/// The lightweight policy used inside rollouts: book, else heuristic.
pub fn rollout_orders(
    state: &GameState,
    power: Power,
    book: Option<&OpeningBook>,
    book_match: BookMatchConfig,
    rng: &mut SmallRng,
) -> Vec<Order> {
    book_orders(state, power, book, book_match, rng)
        .unwrap_or_else(|| heuristic::movement_orders(state, power, rng))
}

fn search_with_lookahead(
    state: &GameState,
    power: Power,
    ctx: &Context<'_>,
    rng: &mut SmallRng,
) -> Vec<Order> {
    let cfg = ctx.config;
    let opponents = predict_opponents(state, power, rng);

    let units = state.unit_count(power);
    let k = adaptive_k(units, cfg.combo_budget).min(cfg.max_k);
    let lists = unit_candidates(power, state, k, ctx.diplomacy.map(|d| (d, COMPLIANCE)));
    let limits = SearchLimits {
        budget: cfg.combo_budget,
        deadline: ctx.deadline,
        check_interval: cfg.deadline_check_interval,
    };
    let (ranked, stats) =
        search_top_n(state, power, &lists, &opponents, cfg.tactical_search_candidates, limits);
    debug!(
        "{power} tactical search: k={k}, {} combos, timed out: {}",
        stats.combos, stats.timed_out
    );

    let mut candidates: Vec<Vec<Order>> =
        Vec::with_capacity(ranked.len() + cfg.tactical_heuristic_candidates);
    candidates.extend(ranked.into_iter().map(|c| c.orders).filter(|o| !o.is_empty()));
    for _ in 0..cfg.tactical_heuristic_candidates {
        candidates.push(heuristic::movement_orders(state, power, rng));
    }

    let horizon = Horizon {
        phases: cfg.tactical_lookahead_plies.saturating_sub(1),
        last_year: None,
        deadline: ctx.deadline,
    };
    let mut resolver = Resolver::default();
    let mut chosen: Option<(usize, f32)> = None;
    for (i, cand) in candidates.iter().enumerate() {
        let score = lookahead_score(state, power, cand, &opponents, horizon, &mut resolver, rng);
        if chosen.map_or(true, |(_, s)| score > s) {
            chosen = Some((i, score));
        }
    }

    let Some((idx, score)) = chosen else { return Vec::new() };
    debug!("{power} tactical: {} candidates, chose {idx} ({score:.1})", candidates.len());
    let mut orders = candidates.swap_remove(idx);
    dedup_move_targets(&mut orders);
    orders
}

/// Resolves `own` against `opponents`, plays on with heuristics for the
/// rest of the horizon and evaluates the outcome.
fn lookahead_score(
    state: &GameState,
    power: Power,
    own: &[Order],
    opponents: &[Order],
    horizon: Horizon,
    resolver: &mut Resolver,
    rng: &mut SmallRng,
) -> f32 {
    let mut all = Vec::with_capacity(own.len() + opponents.len());
    all.extend_from_slice(own);
    all.extend_from_slice(opponents);
    let (results, dislodged) = resolver.resolve(&all, state);
    let mut next = state.clone();
    apply_resolution(&mut next, &results, &dislodged);
    advance_state(&mut next, !dislodged.is_empty());
    let rollout = Rollout { moves: &heuristic_policy, builds: &build_orders };
    let end = simulate_ahead(&next, power, None, horizon, rollout, resolver, rng);
    evaluate(&end, power)
}

/// Build priority of a free home center: threatened centers first, then
/// those closest to an unclaimed center.
fn build_priority(home: Province, power: Power, state: &GameState) -> f32 {
    let threat = province_threat(home, power, state) as f32;
    let near = province_threat2(home, power, state) as f32;
    let dist = nearest_unclaimed_any(home, power, state).map_or(10.0, |(_, d)| d as f32);
    3.0 * threat + near - dist
}

fn threat_aware_builds(state: &GameState, power: Power, count: usize) -> Vec<BuildOrder> {
    let mut homes: Vec<(Province, f32)> = home_centers(power)
        .filter(|&h| state.owner(h) == Some(power) && state.unit_at(h).is_none())
        .map(|h| (h, build_priority(h, power, state)))
        .collect();
    homes.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut orders = Vec::new();
    for (home, _) in homes {
        if orders.len() >= count {
            break;
        }
        let kind = match home.terrain() {
            Terrain::Coastal if naval_bias(home, power, state) >= 0.5 => UnitKind::Fleet,
            Terrain::Sea => UnitKind::Fleet,
            _ => UnitKind::Army,
        };
        if let Some(order) = heuristic::placed_build(state, power, home, kind) {
            orders.push(order);
        }
    }
    orders
}
