//! Legal move generation for all three phases, and uniformly random
//! order sets built from it.

pub mod build;
pub mod movement;
pub mod retreat;

pub use build::legal_builds;
pub use movement::{convoy_reach, legal_orders, move_targets};
pub use retreat::legal_retreats;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::board::{
    Action, BuildOrder, GameState, Location, Order, Power, RetreatOrder, PROVINCE_COUNT,
};

/// One order per unit of `power`: hold 30% of the time, otherwise a random
/// legal move, holding when no move is legal.
pub fn random_orders(power: Power, state: &GameState, rng: &mut impl Rng) -> Vec<Order> {
    state
        .units_of(power)
        .map(|(prov, unit)| {
            let hold = Order::hold(power, unit.kind, Location::with_coast(prov, unit.coast));
            if rng.gen_bool(0.3) {
                return hold;
            }
            let moves: Vec<Order> = legal_orders(prov, state)
                .into_iter()
                .filter(|o| matches!(o.action, Action::Move { .. }))
                .collect();
            moves.choose(rng).copied().unwrap_or(hold)
        })
        .collect()
}

/// A random legal retreat for each dislodged unit of `power`, or disband.
pub fn random_retreats(power: Power, state: &GameState, rng: &mut impl Rng) -> Vec<RetreatOrder> {
    state
        .dislodged_of(power)
        .filter_map(|(prov, _)| {
            let options = legal_retreats(prov, state);
            let moves: Vec<&RetreatOrder> = options.iter().skip(1).collect();
            moves.choose(rng).map(|o| **o).or_else(|| options.first().copied())
        })
        .collect()
}

/// Random legal adjustments up to the count owed, one per province.
pub fn random_builds(power: Power, state: &GameState, rng: &mut impl Rng) -> Vec<BuildOrder> {
    let delta = state.adjustment_delta(power);
    let mut options = legal_builds(power, state);
    options.retain(|o| o.province().is_some());
    options.shuffle(rng);

    let mut used = [false; PROVINCE_COUNT];
    let mut out = Vec::new();
    for order in options {
        if out.len() >= delta.unsigned_abs() as usize {
            break;
        }
        let Some(p) = order.province() else { continue };
        if !used[p.index()] {
            used[p.index()] = true;
            out.push(order);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Phase, Province, Season};
    use crate::resolve::{validate_build, validate_order};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn random_movement_is_complete_and_valid() {
        let gs = GameState::initial();
        let mut rng = SmallRng::seed_from_u64(7);
        for power in crate::board::ALL_POWERS {
            let orders = random_orders(power, &gs, &mut rng);
            assert_eq!(orders.len(), gs.unit_count(power));
            assert!(orders.iter().all(|o| validate_order(o, &gs).is_ok()));
        }
    }

    #[test]
    fn random_builds_respect_the_count() {
        let mut gs = GameState::initial();
        gs.season = Season::Fall;
        gs.phase = Phase::Build;
        gs.units[Province::Mos.index()] = None;
        gs.units[Province::War.index()] = None;
        gs.units[Province::Sev.index()] = None;
        let mut rng = SmallRng::seed_from_u64(3);
        let orders = random_builds(Power::Russia, &gs, &mut rng);
        assert_eq!(orders.len(), 3);
        assert!(orders.iter().all(|o| validate_build(o, &gs).is_ok()));
    }
}
