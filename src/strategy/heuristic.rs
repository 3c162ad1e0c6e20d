//! Greedy single-ply tier.
//!
//! Scores every (unit, destination) pair, assigns destinations greedily with
//! collision avoidance, then converts spare units into supports for center
//! captures or into one-hop convoys for stranded armies. Randomized on
//! purpose: repeated calls give the tactical tier diverse candidates.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::board::{
    adjacent_provinces, edges_from, fleet_coasts_to, home_centers, Action, Adjustment, BuildOrder,
    Coast, GameState, Location, Order, Power, Province, RetreatOrder, Terrain, Unit, UnitKind,
    PROVINCE_COUNT,
};
use crate::diplomacy::Intent;
use crate::eval::{
    can_support_move, is_island_power, nearest_unclaimed, nearest_unclaimed_any,
    needs_convoy_fleets, province_threat, unit_connectivity,
};
use crate::resolve::{validate_build, validate_order, validate_retreat};
use crate::search::candidates::center_value;

use super::{Context, Strategy};

/// A scored move for one unit.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MoveCandidate {
    pub from: Province,
    pub unit: Unit,
    pub to: Location,
    pub score: f32,
}

impl MoveCandidate {
    pub(crate) fn order(&self) -> Order {
        Order::moving(self.unit.power, self.unit.kind, self.at(), self.to)
    }

    pub(crate) fn at(&self) -> Location {
        Location::with_coast(self.from, self.unit.coast)
    }
}

/// Greedy single-ply policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicStrategy;

impl Strategy for HeuristicStrategy {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn movement_orders(
        &self,
        state: &GameState,
        power: Power,
        _ctx: &Context<'_>,
        rng: &mut SmallRng,
    ) -> Vec<Order> {
        movement_orders(state, power, rng)
    }

    fn retreat_orders(
        &self,
        state: &GameState,
        power: Power,
        _ctx: &Context<'_>,
        rng: &mut SmallRng,
    ) -> Vec<RetreatOrder> {
        retreat_orders(state, power, rng)
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

/// Destination coast for a move of `unit` from `from` into `to`. Fleets into
/// split-coast provinces pick one of the reachable coasts at random.
pub(crate) fn pick_coast(
    from: Province,
    unit: Unit,
    to: Province,
    rng: &mut SmallRng,
) -> Option<Coast> {
    if unit.kind == UnitKind::Army {
        return Some(Coast::None);
    }
    let coasts = fleet_coasts_to(from, unit.coast, to);
    coasts.choose(rng).copied()
}

/// Armies that cannot walk to an unclaimed center within six moves.
pub(crate) fn stranded_armies(
    units: &[(Province, Unit)],
    power: Power,
    state: &GameState,
) -> [bool; PROVINCE_COUNT] {
    let mut stranded = [false; PROVINCE_COUNT];
    for &(prov, unit) in units {
        if unit.kind == UnitKind::Army
            && nearest_unclaimed(UnitKind::Army, prov, power, state).map_or(true, |(_, d)| d > 6)
        {
            stranded[prov.index()] = true;
        }
    }
    stranded
}

fn score_moves(
    state: &GameState,
    power: Power,
    units: &[(Province, Unit)],
    rng: &mut SmallRng,
) -> Vec<MoveCandidate> {
    let mut own = [false; PROVINCE_COUNT];
    for (p, _) in units {
        own[p.index()] = true;
    }

    let stranded = stranded_armies(units, power, state);
    let mut convoy_seas = [false; PROVINCE_COUNT];
    for (p, _) in units.iter().filter(|(p, _)| stranded[p.index()]) {
        for e in edges_from(*p) {
            if e.fleet && e.to.is_sea() {
                convoy_seas[e.to.index()] = true;
            }
        }
    }

    let mut candidates = Vec::new();
    for &(from, unit) in units {
        for target in adjacent_provinces(from, unit.coast, unit.kind) {
            if !unit.kind.can_occupy(target.terrain()) {
                continue;
            }
            let mut score = center_value(target, power, state);

            if state.season == crate::board::Season::Fall
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

            if unit.kind == UnitKind::Fleet && target.is_sea() && convoy_seas[target.index()] {
                score += 6.0;
                let lands_on_center = edges_from(target).iter().any(|e| {
                    !e.to.is_sea() && e.to.is_supply_center() && state.owner(e.to) != Some(power)
                });
                if lands_on_center {
                    score += 3.0;
                }
            }

            score += rng.gen::<f32>() * 1.5;

            let Some(coast) = pick_coast(from, unit, target, rng) else { continue };
            let cand = MoveCandidate { from, unit, to: Location::with_coast(target, coast), score };
            if validate_order(&cand.order(), state).is_err() {
                continue;
            }
            candidates.push(cand);
        }
    }
    candidates
}

/// Assigns at most one destination per unit and one unit per destination,
/// best score first, skipping candidates scored below `floor`.
pub(crate) fn greedy_assign(mut candidates: Vec<MoveCandidate>, floor: f32) -> Vec<MoveCandidate> {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    let mut unit_taken = [false; PROVINCE_COUNT];
    let mut target_taken = [false; PROVINCE_COUNT];
    let mut moves = Vec::new();
    for c in candidates {
        if unit_taken[c.from.index()] || target_taken[c.to.province.index()] || c.score < floor {
            continue;
        }
        unit_taken[c.from.index()] = true;
        target_taken[c.to.province.index()] = true;
        moves.push(c);
    }
    moves
}

#[inline]
fn targets_unowned_center(m: &MoveCandidate, power: Power, state: &GameState) -> bool {
    m.to.province.is_supply_center() && state.owner(m.to.province) != Some(power)
}

/// A one-hop convoy: army through one fleet's sea into `dest`.
struct ConvoyPlan {
    army: (Province, Unit),
    fleet: (Province, Unit),
    dest: Province,
    value: f32,
}

fn find_convoy_plans(
    army: (Province, Unit),
    fleets: &[(Province, Unit)],
    power: Power,
    state: &GameState,
) -> Vec<ConvoyPlan> {
    let mut plans = Vec::new();
    let army_seas: Vec<Province> =
        edges_from(army.0).iter().filter(|e| e.fleet && e.to.is_sea()).map(|e| e.to).collect();

    for &(sea, fleet) in fleets {
        if !sea.is_sea() || !army_seas.contains(&sea) {
            continue;
        }
        for e in edges_from(sea) {
            let dest = e.to;
            if dest.is_sea() || dest == army.0 {
                continue;
            }
            let value = center_value(dest, power, state);
            if value < 5.0 || state.unit_at(dest).is_some_and(|u| u.power == power) {
                continue;
            }
            if plans.iter().any(|p: &ConvoyPlan| p.dest == dest && p.fleet.0 == sea) {
                continue;
            }
            plans.push(ConvoyPlan { army, fleet: (sea, fleet), dest, value });
        }
    }
    plans
}

struct ConvoyOutcome {
    orders: Vec<Order>,
    used: [bool; PROVINCE_COUNT],
}

fn plan_convoys(
    state: &GameState,
    power: Power,
    units: &[(Province, Unit)],
    moves: &[MoveCandidate],
    support_converted: &[bool; PROVINCE_COUNT],
) -> ConvoyOutcome {
    let mut out = ConvoyOutcome { orders: Vec::new(), used: [false; PROVINCE_COUNT] };
    let fleets: Vec<(Province, Unit)> = units
        .iter()
        .copied()
        .filter(|(p, u)| u.kind == UnitKind::Fleet && !support_converted[p.index()])
        .collect();

    let mut plans = Vec::new();
    for &(prov, unit) in units.iter().filter(|(_, u)| u.kind == UnitKind::Army) {
        if support_converted[prov.index()] {
            continue;
        }
        let current = moves.iter().find(|m| m.from == prov);
        if current.is_some_and(|m| targets_unowned_center(m, power, state)) {
            continue;
        }
        let floor = current.map_or(0.0, |m| m.score);
        plans.extend(
            find_convoy_plans((prov, unit), &fleets, power, state)
                .into_iter()
                .filter(|p| p.value > floor),
        );
    }
    plans.sort_by(|a, b| b.value.total_cmp(&a.value));

    let mut claimed = [false; PROVINCE_COUNT];
    for m in moves {
        claimed[m.to.province.index()] = true;
    }

    for plan in plans {
        let (army_prov, army) = plan.army;
        let (sea, _) = plan.fleet;
        if out.used[army_prov.index()] || out.used[sea.index()] || support_converted[sea.index()] {
            continue;
        }
        let own_claim = moves.iter().any(|m| m.from == army_prov && m.to.province == plan.dest);
        if claimed[plan.dest.index()] && !own_claim {
            continue;
        }
        let convoy = Order::convoy(power, Location::new(sea), army_prov, plan.dest);
        let carried =
            Order::moving(power, army.kind, Location::new(army_prov), Location::new(plan.dest));
        if validate_order(&convoy, state).is_err() || validate_order(&carried, state).is_err() {
            continue;
        }
        out.used[army_prov.index()] = true;
        out.used[sea.index()] = true;
        claimed[plan.dest.index()] = true;
        out.orders.push(convoy);
        out.orders.push(carried);
    }
    out
}

/// Movement orders for every unit of `power`.
pub fn movement_orders(state: &GameState, power: Power, rng: &mut SmallRng) -> Vec<Order> {
    let units: Vec<(Province, Unit)> = state.units_of(power).collect();
    if units.is_empty() {
        return Vec::new();
    }

    let moves = greedy_assign(score_moves(state, power, &units, rng), 0.0);
    let mut assigned = [false; PROVINCE_COUNT];
    for m in &moves {
        assigned[m.from.index()] = true;
    }

    // Turn the weakest non-capturing move into support for each capture.
    let mut support_converted = [false; PROVINCE_COUNT];
    let mut supports = Vec::new();
    let mut captures: Vec<&MoveCandidate> =
        moves.iter().filter(|m| targets_unowned_center(m, power, state)).collect();
    captures.sort_by(|a, b| b.score.total_cmp(&a.score));
    for cap in captures {
        let helper = moves
            .iter()
            .filter(|o| o.from != cap.from && !support_converted[o.from.index()])
            .filter(|o| !targets_unowned_center(o, power, state))
            .filter(|o| can_support_move(o.from, cap.from, cap.to.province, state))
            .min_by(|a, b| a.score.total_cmp(&b.score));
        if let Some(h) = helper {
            support_converted[h.from.index()] = true;
            supports.push(Order::support_move(
                power,
                h.unit.kind,
                h.at(),
                cap.from,
                cap.to.province,
                cap.unit.kind,
            ));
        }
    }

    let convoys = plan_convoys(state, power, &units, &moves, &support_converted);

    let active =
        |m: &&MoveCandidate| !support_converted[m.from.index()] && !convoys.used[m.from.index()];
    let mut orders: Vec<Order> = moves.iter().filter(active).map(|m| m.order()).collect();
    orders.extend(supports);
    orders.extend(convoys.orders.iter().copied());

    for &(prov, unit) in &units {
        if assigned[prov.index()] || convoys.used[prov.index()] {
            continue;
        }
        let at = Location::with_coast(prov, unit.coast);
        let support = moves
            .iter()
            .filter(active)
            .find(|m| can_support_move(prov, m.from, m.to.province, state))
            .map(|m| Order::support_move(power, unit.kind, at, m.from, m.to.province, m.unit.kind));
        orders.push(support.unwrap_or_else(|| Order::hold(power, unit.kind, at)));
    }
    orders
}

/// Best-scoring retreat for each dislodged unit, or disband when none is legal.
pub fn retreat_orders(state: &GameState, power: Power, rng: &mut SmallRng) -> Vec<RetreatOrder> {
    let mut orders = Vec::new();
    for (prov, d) in state.dislodged_of(power) {
        let unit = d.unit;
        let at = Location::with_coast(prov, unit.coast);
        let mut best: Option<(RetreatOrder, f32)> = None;

        for target in adjacent_provinces(prov, unit.coast, unit.kind) {
            if target == d.attacker_from
                || state.unit_at(target).is_some()
                || !unit.kind.can_occupy(target.terrain())
            {
                continue;
            }
            let mut score = 0.0;
            if target.is_supply_center() && state.owner(target) == Some(power) {
                score += 5.0;
            }
            score -= 2.0 * province_threat(target, power, state) as f32;
            score += rng.gen::<f32>();

            let coast = match unit.kind {
                UnitKind::Army => Coast::None,
                UnitKind::Fleet => match fleet_coasts_to(prov, unit.coast, target).first() {
                    Some(c) => *c,
                    None => continue,
                },
            };
            let order =
                RetreatOrder::retreat(power, unit.kind, at, Location::with_coast(target, coast));
            if validate_retreat(&order, state).is_err() {
                continue;
            }
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((order, score));
            }
        }
        orders.push(best.map_or(RetreatOrder::disband(power, unit.kind, at), |(o, _)| o));
    }
    orders
}

/// Builds or disbands owed by `power`.
pub fn build_orders(state: &GameState, power: Power, rng: &mut SmallRng) -> Vec<BuildOrder> {
    let delta = state.adjustment_delta(power);
    match delta {
        d if d > 0 => builds(state, power, d as usize, rng),
        d if d < 0 => disbands(state, power, d.unsigned_abs() as usize),
        _ => Vec::new(),
    }
}

fn builds(state: &GameState, power: Power, count: usize, rng: &mut SmallRng) -> Vec<BuildOrder> {
    let mut homes: Vec<(Province, u32)> = home_centers(power)
        .filter(|&h| state.owner(h) == Some(power) && state.unit_at(h).is_none())
        .map(|h| (h, nearest_unclaimed_any(h, power, state).map_or(999, |(_, d)| d)))
        .collect();
    homes.sort_by_key(|&(_, d)| d);

    let mut fleets = state.units_of(power).filter(|(_, u)| u.kind == UnitKind::Fleet).count();
    let mut total = state.unit_count(power);
    let naval = is_island_power(power) || needs_convoy_fleets(power, state);

    let mut orders = Vec::new();
    for (home, _) in homes {
        if orders.len() >= count {
            break;
        }
        let kind = match home.terrain() {
            Terrain::Sea => UnitKind::Fleet,
            Terrain::Inland => UnitKind::Army,
            Terrain::Coastal => {
                let ratio = if total > 0 { fleets as f32 / total as f32 } else { 0.0 };
                let (floor, chance) = if naval { (0.5, 0.4) } else { (0.25, 0.2) };
                if ratio < floor || rng.gen::<f32>() < chance {
                    UnitKind::Fleet
                } else {
                    UnitKind::Army
                }
            }
        };
        if let Some(order) = placed_build(state, power, home, kind) {
            if matches!(order.adjustment, Adjustment::Build { kind: UnitKind::Fleet, .. }) {
                fleets += 1;
            }
            orders.push(order);
            total += 1;
        }
    }
    orders
}

/// A valid build of `kind` at `home`. Fleets try each coast in turn and
/// fall back to an army.
pub(crate) fn placed_build(
    state: &GameState,
    power: Power,
    home: Province,
    kind: UnitKind,
) -> Option<BuildOrder> {
    let coasts: &[Coast] =
        if kind == UnitKind::Fleet && home.has_coasts() { home.coasts() } else { &[Coast::None] };
    let wanted =
        coasts.iter().map(|&c| BuildOrder::build(power, kind, Location::with_coast(home, c)));
    let army = (kind == UnitKind::Fleet)
        .then(|| BuildOrder::build(power, UnitKind::Army, Location::new(home)));
    wanted.chain(army).find(|o| validate_build(o, state).is_ok())
}

/// Disbands the units farthest from any unclaimed center. Coastal and sea
/// fleets count as at most three away; stranded armies as unreachable.
fn disbands(state: &GameState, power: Power, count: usize) -> Vec<BuildOrder> {
    let mut scored: Vec<(Province, Unit, u32)> = state
        .units_of(power)
        .map(|(p, u)| {
            let mut d = nearest_unclaimed(u.kind, p, power, state).map_or(999, |(_, d)| d);
            if u.kind == UnitKind::Fleet && p.terrain() != Terrain::Inland {
                d = d.min(3);
            }
            if u.kind == UnitKind::Army && d > 6 {
                d = 999;
            }
            (p, u, d)
        })
        .collect();
    scored.sort_by(|a, b| b.2.cmp(&a.2));
    scored
        .into_iter()
        .take(count)
        .map(|(p, u, _)| BuildOrder::disband(power, u.kind, Location::with_coast(p, u.coast)))
        .collect()
}

/// Holds for every unit of `power`.
pub(crate) fn all_hold(state: &GameState, power: Power) -> Vec<Order> {
    state
        .units_of(power)
        .map(|(p, u)| Order::hold(power, u.kind, Location::with_coast(p, u.coast)))
        .collect()
}

/// The move targets in `orders`, for collision checks.
pub(crate) fn move_targets(orders: &[Order]) -> Vec<Province> {
    orders
        .iter()
        .filter_map(|o| match o.action {
            Action::Move { to } => Some(to.province),
            _ => None,
        })
        .collect()
}
