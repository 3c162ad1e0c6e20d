//! Retreat-phase move generation.

use crate::board::{GameState, Location, Province, RetreatOrder};
use crate::resolve::validate_retreat;

use super::movement::move_targets;

/// Disband plus every legal retreat for the dislodged unit at `province`.
///
/// Empty if nothing was dislodged there.
pub fn legal_retreats(province: Province, state: &GameState) -> Vec<RetreatOrder> {
    let Some(d) = state.dislodged[province.index()] else { return Vec::new() };
    let at = Location::with_coast(province, d.unit.coast);
    let mut orders = vec![RetreatOrder::disband(d.unit.power, d.unit.kind, at)];
    for to in move_targets(province, d.unit.coast, d.unit.kind) {
        let order = RetreatOrder::retreat(d.unit.power, d.unit.kind, at, to);
        if validate_retreat(&order, state).is_ok() {
            orders.push(order);
        }
    }
    orders
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Dislodged, Phase, Power, RetreatAction, Season, Unit, UnitKind};
    use Province::*;

    #[test]
    fn excludes_occupied_and_attacker_origin() {
        let mut gs = GameState::empty(1901, Season::Fall, Phase::Retreat);
        gs.dislodged[Vie.index()] =
            Some(Dislodged { unit: Unit::new(Power::Austria, UnitKind::Army), attacker_from: Boh });
        gs.place(Gal, Unit::new(Power::Russia, UnitKind::Army));

        let orders = legal_retreats(Vie, &gs);
        assert_eq!(orders[0].action, RetreatAction::Disband);
        let dests: Vec<Province> = orders
            .iter()
            .filter_map(|o| match o.action {
                RetreatAction::Move(to) => Some(to.province),
                RetreatAction::Disband => None,
            })
            .collect();
        assert!(dests.contains(&Bud));
        assert!(dests.contains(&Tyr));
        assert!(!dests.contains(&Boh));
        assert!(!dests.contains(&Gal));
    }

    #[test]
    fn nothing_dislodged_means_no_orders() {
        let gs = GameState::empty(1901, Season::Fall, Phase::Retreat);
        assert!(legal_retreats(Vie, &gs).is_empty());
    }
}
