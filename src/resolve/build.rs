//! Adjustment-phase resolution.
//!
//! Builds are capped at the number of centers over units, disbands at the
//! number of units over centers. A power that orders too few disbands
//! loses the units farthest from its home centers.

use crate::board::{
    edges_from, home_centers, Adjustment, BuildOrder, GameState, Location, Power, Province, Unit,
    ALL_POWERS, PROVINCE_COUNT,
};

use super::kruijswijk::Outcome;
use super::validate::validate_build;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildResult {
    pub order: BuildOrder,
    pub outcome: Outcome,
}

/// Resolves adjustment orders for all powers at once.
pub fn resolve_builds(orders: &[BuildOrder], state: &GameState) -> Vec<BuildResult> {
    let mut results = Vec::new();

    for power in ALL_POWERS {
        let delta = state.adjustment_delta(power);
        let mut used = [false; PROVINCE_COUNT];
        let mut done = 0i32;

        for order in orders.iter().filter(|o| o.power == power) {
            let fresh = order.province().map_or(true, |p| !used[p.index()]);
            let ok = done < delta.abs() && fresh && validate_build(order, state).is_ok();
            if ok {
                if let Some(p) = order.province() {
                    used[p.index()] = true;
                }
                done += 1;
            }
            let outcome = if ok { Outcome::Succeeded } else { Outcome::Failed };
            results.push(BuildResult { order: *order, outcome });
        }

        if delta < 0 && done < -delta {
            let missing = (-delta - done) as usize;
            for (prov, unit) in civil_disorder(power, missing, state, &used) {
                let at = Location::with_coast(prov, unit.coast);
                results.push(BuildResult {
                    order: BuildOrder::disband(power, unit.kind, at),
                    outcome: Outcome::Succeeded,
                });
            }
        }
    }
    results
}

/// Picks `count` units to remove, farthest from home first; ties go to the
/// higher province index.
fn civil_disorder(
    power: Power,
    count: usize,
    state: &GameState,
    skip: &[bool; PROVINCE_COUNT],
) -> Vec<(Province, Unit)> {
    let mut candidates: Vec<(Province, Unit, u32)> = state
        .units_of(power)
        .filter(|(p, _)| !skip[p.index()])
        .map(|(p, u)| (p, u, distance_to_home(p, power)))
        .collect();
    candidates.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| b.0.cmp(&a.0)));
    candidates.into_iter().take(count).map(|(p, u, _)| (p, u)).collect()
}

/// Hops to the nearest home center over edges of either kind; 999 if cut off.
fn distance_to_home(from: Province, power: Power) -> u32 {
    let mut is_home = [false; PROVINCE_COUNT];
    for p in home_centers(power) {
        is_home[p.index()] = true;
    }
    if is_home[from.index()] {
        return 0;
    }

    let mut dist = [u32::MAX; PROVINCE_COUNT];
    dist[from.index()] = 0;
    let mut queue = vec![from];
    let mut head = 0;
    while head < queue.len() {
        let cur = queue[head];
        head += 1;
        for e in edges_from(cur) {
            if dist[e.to.index()] != u32::MAX {
                continue;
            }
            dist[e.to.index()] = dist[cur.index()] + 1;
            if is_home[e.to.index()] {
                return dist[e.to.index()];
            }
            queue.push(e.to);
        }
    }
    999
}

/// Applies successful builds and disbands.
pub fn apply_builds(state: &mut GameState, results: &[BuildResult]) {
    for r in results.iter().filter(|r| r.outcome == Outcome::Succeeded) {
        match r.order.adjustment {
            Adjustment::Build { kind, at } => {
                state.units[at.province.index()] =
                    Some(Unit { power: r.order.power, kind, coast: at.coast });
            }
            Adjustment::Disband { at, .. } => {
                state.units[at.province.index()] = None;
            }
            Adjustment::Waive => {}
        }
    }
}
