//! Posture-diverse regret-matching tier.
//!
//! Builds a pool of structurally different order sets by rescoring moves
//! under several postures (aggressive, defensive, expansionist, one focused
//! on each rival, an end-game closing attack, perturbations and noisy
//! variants), then lets RM+ pick among them against sampled opponent
//! profiles.

use std::collections::HashSet;

use log::debug;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::board::{
    adjacent_provinces, edges_from, order_set_key, supply_centers, BuildOrder, Coast, GameState,
    Location, Order, Power, Province, RetreatOrder, Season, Unit, UnitKind, ALL_POWERS,
    PROVINCE_COUNT,
};
use crate::config::EngineConfig;
use crate::diplomacy::{DiplomacyState, Intent};
use crate::eval::{
    can_support_move, distance, is_chokepoint, nearest_unclaimed, province_defense, province_threat,
    unit_can_reach, unit_connectivity,
};
use crate::resolve::validate_order;
use crate::search::{
    dedup_move_targets, sanitize_combo, select_candidate, Arbitration, Rollout, ScoredOrder,
};

use super::heuristic::{greedy_assign, pick_coast, MoveCandidate};
use super::tactical::{self, book_orders, rollout_orders, TacticalStrategy};
use super::{Context, Strategy};

/// Moves scored below this are never assigned.
const ASSIGN_FLOOR: f32 = -10.0;

/// Draw only when a rival leads by at least this many centers.
const DRAW_DEFICIT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Posture {
    Balanced,
    Aggressive,
    Defensive,
    Expansionist,
}

const POSTURES: [Posture; 4] =
    [Posture::Balanced, Posture::Aggressive, Posture::Defensive, Posture::Expansionist];

/// Extra weight toward one rival's centers and units.
#[derive(Debug, Clone, Copy)]
struct Focus {
    enemy: Power,
    center_bonus: f32,
    unit_bonus: f32,
    proximity_bonus: f32,
}

impl Focus {
    fn targeted(enemy: Power) -> Self {
        Focus { enemy, center_bonus: 15.0, unit_bonus: 12.0, proximity_bonus: 3.0 }
    }

    fn closing(enemy: Power) -> Self {
        Focus { enemy, center_bonus: 25.0, unit_bonus: 20.0, proximity_bonus: 6.0 }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PostureStrategy;

impl Strategy for PostureStrategy {
    fn name(&self) -> &'static str {
        "posture"
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

        let mut candidates = generate_candidates(state, power, ctx.config, ctx.diplomacy, rng);
        if candidates.is_empty() {
            return TacticalStrategy.movement_orders(state, power, ctx, rng);
        }
        if candidates.len() == 1 {
            return candidates.swap_remove(0);
        }

        let book = ctx.book;
        let book_match = ctx.book_match;
        let policy = move |s: &GameState, p: Power, r: &mut SmallRng| {
            rollout_orders(s, p, book, book_match, r)
        };
        let opponents = sample_opponents(state, power, ctx, rng);

        let arb = Arbitration {
            state,
            power,
            candidates: &candidates,
            opponents: &opponents,
            config: ctx.config,
            rollout: Rollout { moves: &policy, builds: &tactical::build_orders },
            deadline: ctx.deadline,
        };
        let idx = select_candidate(&arb, rng);
        candidates.swap_remove(idx)
    }

    fn retreat_orders(
        &self,
        state: &GameState,
        power: Power,
        ctx: &Context<'_>,
        rng: &mut SmallRng,
    ) -> Vec<RetreatOrder> {
        TacticalStrategy.retreat_orders(state, power, ctx, rng)
    }

    fn build_orders(
        &self,
        state: &GameState,
        power: Power,
        ctx: &Context<'_>,
        rng: &mut SmallRng,
    ) -> Vec<BuildOrder> {
        TacticalStrategy.build_orders(state, power, ctx, rng)
    }

    fn should_vote_draw(&self, state: &GameState, power: Power) -> bool {
        let own = state.supply_center_count(power);
        let strongest = ALL_POWERS
            .iter()
            .filter(|&&p| p != power)
            .map(|&p| state.supply_center_count(p))
            .max()
            .unwrap_or(0);
        strongest >= own + DRAW_DEFICIT
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

/// Opponent profiles from the rollout policy, one order set per sample
/// covering every live rival.
fn sample_opponents(
    state: &GameState,
    power: Power,
    ctx: &Context<'_>,
    rng: &mut SmallRng,
) -> Vec<Vec<Order>> {
    (0..ctx.config.opponent_samples)
        .map(|_| {
            let mut orders = Vec::new();
            for p in ALL_POWERS {
                if p != power && state.is_alive(p) {
                    orders.extend(rollout_orders(state, p, ctx.book, ctx.book_match, rng));
                }
            }
            orders
        })
        .collect()
}

/// Distinct order sets, deduplicated by their canonical key.
struct CandidatePool {
    seen: HashSet<String>,
    sets: Vec<Vec<Order>>,
    cap: usize,
}

impl CandidatePool {
    fn new(cap: usize) -> Self {
        CandidatePool { seen: HashSet::new(), sets: Vec::with_capacity(cap), cap }
    }

    fn add(&mut self, orders: Vec<Order>) {
        if orders.is_empty() || self.is_full() {
            return;
        }
        if self.seen.insert(order_set_key(&orders)) {
            self.sets.push(orders);
        }
    }

    fn is_full(&self) -> bool {
        self.sets.len() >= self.cap
    }

    fn room(&self) -> usize {
        self.cap.saturating_sub(self.sets.len())
    }
}

fn generate_candidates(
    state: &GameState,
    power: Power,
    cfg: &EngineConfig,
    diplomacy: Option<&DiplomacyState>,
    rng: &mut SmallRng,
) -> Vec<Vec<Order>> {
    let units: Vec<(Province, Unit)> = state.units_of(power).collect();
    let mut pool = CandidatePool::new(cfg.candidate_count);
    let candidate = |posture: Posture,
                     focus: Option<Focus>,
                     noise: f32,
                     rng: &mut SmallRng|
     -> Vec<Order> {
        let mut scored = score_moves(state, power, &units, posture, diplomacy, rng);
        if let Some(f) = focus {
            apply_focus(&mut scored, state, f);
        }
        if noise > 0.0 {
            for c in &mut scored {
                c.score += rng.gen_range(-noise..noise);
            }
        }
        assemble(state, power, &units, scored)
    };

    for enemy in ALL_POWERS {
        if enemy != power && state.is_alive(enemy) {
            pool.add(candidate(Posture::Balanced, Some(Focus::targeted(enemy)), 0.0, rng));
        }
    }
    pool.add(candidate(Posture::Aggressive, None, 0.0, rng));
    pool.add(candidate(Posture::Defensive, None, 0.0, rng));
    pool.add(candidate(Posture::Expansionist, None, 0.0, rng));

    if state.supply_center_count(power) >= cfg.closing_sc_threshold {
        let tries = (pool.room() / 2).max(1);
        for _ in 0..tries {
            let closing = match weakest_reachable_enemy(state, power, &units) {
                Some(enemy) => {
                    candidate(Posture::Aggressive, Some(Focus::closing(enemy)), 0.0, rng)
                }
                None => candidate(Posture::Aggressive, None, 0.0, rng),
            };
            pool.add(closing);
        }
    }

    if let Some(base) = pool.sets.first().cloned() {
        for _ in 0..cfg.perturbed_count.min(pool.room()) {
            pool.add(perturb(&base, state, rng));
        }
    }

    for _ in 0..cfg.stochastic_tries {
        if pool.is_full() {
            break;
        }
        let posture = POSTURES.choose(rng).copied().unwrap_or(Posture::Balanced);
        pool.add(candidate(posture, None, 4.0, rng));
    }

    debug!("{power} posture pool: {} candidates", pool.sets.len());
    pool.sets
}

/// Scores every legal (unit, destination) pair under `posture`.
fn score_moves(
    state: &GameState,
    power: Power,
    units: &[(Province, Unit)],
    posture: Posture,
    diplomacy: Option<&DiplomacyState>,
    rng: &mut SmallRng,
) -> Vec<MoveCandidate> {
    let mut own = [false; PROVINCE_COUNT];
    for (p, _) in units {
        own[p.index()] = true;
    }
    let own_centers = state.supply_center_count(power);

    let mut candidates = Vec::new();
    for &(from, unit) in units {
        for target in adjacent_provinces(from, unit.coast, unit.kind) {
            if !unit.kind.can_occupy(target.terrain()) {
                continue;
            }
            let center = target.is_supply_center();
            let owner = state.owner(target);
            let foreign_center = center && owner != Some(power);
            let mut score = 0.0;

            if center {
                score += match owner {
                    None => 10.0,
                    Some(o) if o != power => 7.0 - province_defense(target, o, state).max(0) as f32,
                    _ => 1.0,
                };
            }
            if state.season == Season::Fall
                && from.is_supply_center()
                && state.owner(from) != Some(power)
            {
                score -= 12.0;
            }
            if own[target.index()] {
                score -= 20.0;
            }
            score += 0.3 * unit_connectivity(target, Coast::None, unit.kind) as f32;
            if let Some((_, d)) = nearest_unclaimed(unit.kind, target, power, state) {
                score -= 0.5 * d as f32;
            }
            if state.season == Season::Spring {
                score += unclaimed_neighbors(target, power, state) as f32;
            }
            if unit.kind == UnitKind::Fleet && is_chokepoint(target) {
                score += 3.0;
            }

            match posture {
                Posture::Aggressive => {
                    if foreign_center {
                        score += 5.0;
                    }
                    if own_centers >= 10 {
                        score += 3.0;
                    }
                }
                Posture::Defensive => {
                    if from.is_supply_center() && state.owner(from) == Some(power) {
                        score -= 6.0 * province_threat(from, power, state) as f32;
                    }
                    if center && owner == Some(power) {
                        score += 5.0;
                    }
                }
                Posture::Expansionist => {
                    if center && owner.is_none() {
                        score += 4.0;
                    }
                }
                Posture::Balanced => {}
            }

            // Contested centers we cannot out-muscle.
            let threat = province_threat(target, power, state);
            if threat > 0 && foreign_center {
                let reach = units
                    .iter()
                    .filter(|(p, u)| *p != from && unit_can_reach(*p, u.coast, u.kind, target))
                    .count() as i32;
                if threat > reach {
                    score -= 2.0 * (threat - reach) as f32;
                }
            }

            score += rng.gen::<f32>() * 0.5;

            let Some(coast) = pick_coast(from, unit, target, rng) else { continue };
            let cand = MoveCandidate { from, unit, to: Location::with_coast(target, coast), score };
            if validate_order(&cand.order(), state).is_err() {
                continue;
            }
            candidates.push(cand);
        }
    }

    if let Some(dip) = diplomacy {
        apply_intents(&mut candidates, dip, power);
    }
    candidates
}

fn unclaimed_neighbors(province: Province, power: Power, state: &GameState) -> usize {
    let mut seen = [false; PROVINCE_COUNT];
    let mut count = 0;
    for e in edges_from(province) {
        if seen[e.to.index()] {
            continue;
        }
        seen[e.to.index()] = true;
        if e.to.is_supply_center() && state.owner(e.to) != Some(power) {
            count += 1;
        }
    }
    count
}

/// Bends move scores by the intents received this phase.
fn apply_intents(candidates: &mut [MoveCandidate], dip: &DiplomacyState, power: Power) {
    let mut scored: Vec<ScoredOrder> =
        candidates.iter().map(|c| ScoredOrder { order: c.order(), score: c.score }).collect();
    dip.adjust_scores(&mut scored, power, 1.0);
    for (c, s) in candidates.iter_mut().zip(&scored) {
        c.score = s.score;
    }
}

fn apply_focus(candidates: &mut [MoveCandidate], state: &GameState, focus: Focus) {
    let centers: Vec<Province> =
        supply_centers().filter(|&sc| state.owner(sc) == Some(focus.enemy)).collect();
    for c in candidates.iter_mut() {
        let target = c.to.province;
        if centers.contains(&target) {
            c.score += focus.center_bonus;
        }
        if state.unit_at(target).is_some_and(|u| u.power == focus.enemy) {
            c.score += focus.unit_bonus;
        }
        let nearest = centers.iter().filter_map(|&sc| distance(c.unit.kind, target, sc)).min();
        if let Some(d) = nearest.filter(|&d| d > 0) {
            c.score += focus.proximity_bonus / d as f32;
        }
    }
}

/// The live rival with the fewest centers, nearest first on ties.
fn weakest_reachable_enemy(
    state: &GameState,
    power: Power,
    units: &[(Province, Unit)],
) -> Option<Power> {
    ALL_POWERS
        .iter()
        .copied()
        .filter(|&p| p != power && state.is_alive(p))
        .filter_map(|p| {
            let centers = state.supply_center_count(p);
            if centers == 0 {
                return None;
            }
            let dist = supply_centers()
                .filter(|&sc| state.owner(sc) == Some(p))
                .flat_map(|sc| {
                    units.iter().filter_map(move |(prov, u)| distance(u.kind, *prov, sc))
                })
                .min()
                .unwrap_or(u32::MAX);
            Some((p, centers, dist))
        })
        .min_by_key(|&(_, centers, dist)| (centers, dist))
        .map(|(p, _, _)| p)
}

#[inline]
fn targets_unowned_center(m: &MoveCandidate, power: Power, state: &GameState) -> bool {
    m.to.province.is_supply_center() && state.owner(m.to.province) != Some(power)
}

/// Turns scored moves into a full order set: greedy assignment, supports
/// for captures and dislodgements, then supports or holds for the rest.
fn assemble(
    state: &GameState,
    power: Power,
    units: &[(Province, Unit)],
    scored: Vec<MoveCandidate>,
) -> Vec<Order> {
    let moves = greedy_assign(scored, ASSIGN_FLOOR);
    let mut assigned = [false; PROVINCE_COUNT];
    for m in &moves {
        assigned[m.from.index()] = true;
    }

    let mut captures: Vec<&MoveCandidate> =
        moves.iter().filter(|m| targets_unowned_center(m, power, state)).collect();
    captures.sort_by(|a, b| b.score.total_cmp(&a.score));
    let dislodges = moves.iter().filter(|m| {
        !targets_unowned_center(m, power, state)
            && state.unit_at(m.to.province).is_some_and(|u| u.power != power)
    });
    let priority: Vec<&MoveCandidate> = captures.into_iter().chain(dislodges).collect();

    let mut converted = [false; PROVINCE_COUNT];
    let mut orders = Vec::with_capacity(units.len());
    for mv in priority {
        if converted[mv.from.index()] {
            continue;
        }
        let helper = moves.iter().find(|o| {
            o.from != mv.from
                && !converted[o.from.index()]
                && !targets_unowned_center(o, power, state)
                && can_support_move(o.from, mv.from, mv.to.province, state)
        });
        if let Some(h) = helper {
            converted[h.from.index()] = true;
            orders.push(Order::support_move(
                power,
                h.unit.kind,
                h.at(),
                mv.from,
                mv.to.province,
                mv.unit.kind,
            ));
        }
    }

    let active: Vec<&MoveCandidate> = moves.iter().filter(|m| !converted[m.from.index()]).collect();
    orders.extend(active.iter().map(|m| m.order()));

    for &(prov, unit) in units {
        if assigned[prov.index()] {
            continue;
        }
        let at = Location::with_coast(prov, unit.coast);
        let support = active
            .iter()
            .find(|m| can_support_move(prov, m.from, m.to.province, state))
            .map(|m| Order::support_move(power, unit.kind, at, m.from, m.to.province, m.unit.kind))
            .or_else(|| guard_threatened_center(prov, unit, power, units, state));
        orders.push(support.unwrap_or_else(|| Order::hold(power, unit.kind, at)));
    }
    orders
}

/// Support-hold for a friendly unit sitting on a threatened own center.
fn guard_threatened_center(
    prov: Province,
    unit: Unit,
    power: Power,
    units: &[(Province, Unit)],
    state: &GameState,
) -> Option<Order> {
    let at = Location::with_coast(prov, unit.coast);
    units
        .iter()
        .filter(|(p, _)| *p != prov && p.is_supply_center() && state.owner(*p) == Some(power))
        .filter(|(p, _)| province_threat(*p, power, state) > 0)
        .map(|(p, u)| Order::support_hold(power, unit.kind, at, *p, u.kind))
        .find(|o| validate_order(o, state).is_ok())
}

/// Swaps one or two orders of `base` for random legal moves, then repairs
/// supports and collisions the swap broke.
fn perturb(base: &[Order], state: &GameState, rng: &mut SmallRng) -> Vec<Order> {
    let mut result = base.to_vec();
    if result.is_empty() {
        return result;
    }
    let mut swaps = 1 + rng.gen_range(0..result.len().min(2));
    let mut indices: Vec<usize> = (0..result.len()).collect();
    indices.shuffle(rng);

    for idx in indices {
        if swaps == 0 {
            break;
        }
        let prov = result[idx].province();
        let Some(unit) = state.unit_at(prov) else { continue };
        let mut targets = adjacent_provinces(prov, unit.coast, unit.kind);
        targets.shuffle(rng);
        let replacement = targets.into_iter().find_map(|target| {
            if !unit.kind.can_occupy(target.terrain()) {
                return None;
            }
            let coast = pick_coast(prov, unit, target, rng)?;
            let order = Order::moving(
                unit.power,
                unit.kind,
                Location::with_coast(prov, unit.coast),
                Location::with_coast(target, coast),
            );
            validate_order(&order, state).is_ok().then_some(order)
        });
        if let Some(order) = replacement {
            result[idx] = order;
            swaps -= 1;
        }
    }
    sanitize_combo(&mut result, state);
    dedup_move_targets(&mut result);
    result
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use rand::SeedableRng;

    use super::*;
    use crate::board::{Action, Phase};
    use crate::diplomacy::IntentKind;
    use Province::*;

    fn quick() -> EngineConfig {
        EngineConfig {
            candidate_count: 6,
            rm_iterations: 4,
            lookahead_phases: 1,
            opponent_samples: 1,
            stochastic_tries: 6,
            ..EngineConfig::default()
        }
    }

    fn assert_complete(orders: &[Order], power: Power, state: &GameState) {
        assert_eq!(orders.len(), state.unit_count(power));
        let mut seen = HashSet::new();
        for o in orders {
            assert_eq!(validate_order(o, state), Ok(()), "{o:?}");
            assert!(seen.insert(o.province()));
        }
        let mut targets: Vec<Province> = orders.iter().filter_map(Order::move_target).collect();
        let n = targets.len();
        targets.sort();
        targets.dedup();
        assert_eq!(targets.len(), n);
    }

    fn midgame() -> GameState {
        let mut gs = GameState::initial();
        gs.year = 1903;
        gs
    }

    #[test]
    fn candidates_are_distinct_and_complete() {
        let gs = midgame();
        let cfg = quick();
        let mut rng = SmallRng::seed_from_u64(21);
        let pool = generate_candidates(&gs, Power::Germany, &cfg, None, &mut rng);
        assert!(!pool.is_empty());
        assert!(pool.len() <= cfg.candidate_count);
        let keys: HashSet<String> = pool.iter().map(|c| order_set_key(c)).collect();
        assert_eq!(keys.len(), pool.len());
        for c in &pool {
            assert_complete(c, Power::Germany, &gs);
        }
    }

    #[test]
    fn assemble_supports_a_capture() {
        let mut gs = GameState::empty(1902, Season::Spring, Phase::Movement);
        gs.set_owner(Ser, Some(Power::Turkey));
        gs.place(Ser, Unit::new(Power::Turkey, UnitKind::Army));
        gs.place(Bud, Unit::new(Power::Austria, UnitKind::Army));
        gs.place(Tri, Unit::new(Power::Austria, UnitKind::Army));
        let units: Vec<(Province, Unit)> = gs.units_of(Power::Austria).collect();
        let scored = vec![
            MoveCandidate { from: Bud, unit: units[0].1, to: Location::new(Ser), score: 12.0 },
            MoveCandidate { from: Tri, unit: units[1].1, to: Location::new(Alb), score: 2.0 },
        ];
        let orders = assemble(&gs, Power::Austria, &units, scored);
        assert_eq!(orders.len(), 2);
        assert!(orders.iter().any(|o| o.move_target() == Some(Ser)));
        assert!(orders
            .iter()
            .any(|o| o.action == Action::SupportMove { from: Bud, to: Ser, kind: UnitKind::Army }));
    }

    #[test]
    fn focus_prefers_the_named_rival() {
        let gs = GameState::initial();
        let units: Vec<(Province, Unit)> = gs.units_of(Power::Austria).collect();
        let mut rng = SmallRng::seed_from_u64(3);
        let mut scored =
            score_moves(&gs, Power::Austria, &units, Posture::Balanced, None, &mut rng);
        let tri_ven = |v: &[MoveCandidate]| {
            v.iter().find(|c| c.from == Tri && c.to.province == Ven).map(|c| c.score).unwrap()
        };
        let before = tri_ven(&scored);
        apply_focus(&mut scored, &gs, Focus::targeted(Power::Italy));
        let after = tri_ven(&scored);
        assert_eq!(after - before, 15.0 + 12.0);
    }

    #[test]
    fn weakest_rival_breaks_ties_by_distance() {
        let mut gs = GameState::empty(1905, Season::Spring, Phase::Movement);
        gs.place(Vie, Unit::new(Power::Austria, UnitKind::Army));
        gs.set_owner(Mun, Some(Power::Germany));
        gs.place(Mun, Unit::new(Power::Germany, UnitKind::Army));
        gs.set_owner(Mos, Some(Power::Russia));
        gs.place(Mos, Unit::new(Power::Russia, UnitKind::Army));
        let units: Vec<(Province, Unit)> = gs.units_of(Power::Austria).collect();
        assert_eq!(weakest_reachable_enemy(&gs, Power::Austria, &units), Some(Power::Germany));
    }

    #[test]
    fn perturb_keeps_orders_legal() {
        let gs = midgame();
        let mut rng = SmallRng::seed_from_u64(8);
        let base = crate::strategy::heuristic::all_hold(&gs, Power::Russia);
        for _ in 0..10 {
            let p = perturb(&base, &gs, &mut rng);
            assert_complete(&p, Power::Russia, &gs);
            assert!(p.iter().any(Order::is_move));
        }
    }

    #[test]
    fn non_aggression_steers_moves() {
        let gs = GameState::initial();
        let units: Vec<(Province, Unit)> = gs.units_of(Power::Austria).collect();
        let mut dip = DiplomacyState::new();
        dip.receive(
            Intent::new(IntentKind::ProposeNonAggression)
                .between(Power::Italy, Power::Austria)
                .with_provinces(&[Ven]),
        );
        let mut a = SmallRng::seed_from_u64(5);
        let mut b = SmallRng::seed_from_u64(5);
        let plain = score_moves(&gs, Power::Austria, &units, Posture::Balanced, None, &mut a);
        let steered =
            score_moves(&gs, Power::Austria, &units, Posture::Balanced, Some(&dip), &mut b);
        let ven = |v: &[MoveCandidate]| {
            v.iter().find(|c| c.to.province == Ven).map(|c| c.score).unwrap()
        };
        assert!((ven(&plain) - ven(&steered) - 2.5).abs() < 1e-4);
    }

    #[test]
    fn draw_vote_needs_a_clear_leader() {
        let gs = GameState::initial();
        assert!(!PostureStrategy.should_vote_draw(&gs, Power::Russia));
        let mut gs = GameState::initial();
        for sc in [Ser, Gre, Bul] {
            gs.set_owner(sc, Some(Power::Austria));
        }
        assert!(PostureStrategy.should_vote_draw(&gs, Power::Italy));
        assert!(!PostureStrategy.should_vote_draw(&gs, Power::Austria));
    }

    #[test]
    fn movement_orders_complete_after_book() {
        let gs = midgame();
        let cfg = quick();
        let ctx = Context::new(&cfg, Instant::now() + Duration::from_secs(20));
        let mut rng = SmallRng::seed_from_u64(13);
        let orders = PostureStrategy.movement_orders(&gs, Power::Turkey, &ctx, &mut rng);
        assert_complete(&orders, Power::Turkey, &gs);
    }
}
