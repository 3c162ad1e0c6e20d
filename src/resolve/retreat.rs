//! Retreat-phase resolution.
//!
//! Dislodged units without an order disband. Two retreats into the same
//! province both fail and those units disband. Invalid retreats disband.

use crate::board::{GameState, Location, Province, RetreatAction, RetreatOrder, PROVINCE_COUNT};

use super::kruijswijk::{arrival_coast, Outcome};
use super::validate::validate_retreat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetreatResult {
    pub order: RetreatOrder,
    pub outcome: Outcome,
}

impl RetreatResult {
    /// Province the unit ends up on, if it survives.
    pub fn destination(&self) -> Option<Location> {
        match (self.order.action, self.outcome) {
            (RetreatAction::Move(to), Outcome::Succeeded) => Some(to),
            _ => None,
        }
    }
}

/// Resolves retreat orders; the result covers every dislodged unit once.
pub fn resolve_retreats(orders: &[RetreatOrder], state: &GameState) -> Vec<RetreatResult> {
    let mut chosen: [Option<(RetreatOrder, bool)>; PROVINCE_COUNT] = [None; PROVINCE_COUNT];
    for order in orders {
        let idx = order.at.province.index();
        if chosen[idx].is_some() || state.dislodged[idx].is_none() {
            continue;
        }
        chosen[idx] = Some((*order, validate_retreat(order, state).is_ok()));
    }

    let mut target_count = [0u8; PROVINCE_COUNT];
    for (order, valid) in chosen.iter().flatten() {
        if let (RetreatAction::Move(to), true) = (order.action, valid) {
            target_count[to.province.index()] += 1;
        }
    }

    let mut results = Vec::new();
    for (prov, d) in state.dislodged_units() {
        let result = match chosen[prov.index()] {
            None => {
                let at = Location::with_coast(prov, d.unit.coast);
                RetreatResult {
                    order: RetreatOrder::disband(d.unit.power, d.unit.kind, at),
                    outcome: Outcome::Succeeded,
                }
            }
            Some((order, false)) => RetreatResult { order, outcome: Outcome::Void },
            Some((order, true)) => {
                let outcome = match order.action {
                    RetreatAction::Disband => Outcome::Succeeded,
                    RetreatAction::Move(to) if target_count[to.province.index()] > 1 => {
                        Outcome::Bounced
                    }
                    RetreatAction::Move(_) => Outcome::Succeeded,
                };
                RetreatResult { order, outcome }
            }
        };
        results.push(result);
    }
    results
}

/// Places surviving retreaters and clears the dislodged set.
pub fn apply_retreats(state: &mut GameState, results: &[RetreatResult]) {
    for r in results {
        let Some(to) = r.destination() else { continue };
        let src: Province = r.order.at.province;
        let Some(d) = state.dislodged[src.index()] else { continue };
        let mut unit = d.unit;
        unit.coast = arrival_coast(unit, src, to.province, to.coast);
        state.units[to.province.index()] = Some(unit);
    }
    state.dislodged = [None; PROVINCE_COUNT];
}
