//! Adjustment-phase move generation.

use crate::board::{home_centers, BuildOrder, GameState, Location, Power, UnitKind};
use crate::resolve::validate_build;

/// Every legal adjustment order for `power`: waive and builds when
/// centers exceed units, disbands when units exceed centers, nothing when
/// balanced.
pub fn legal_builds(power: Power, state: &GameState) -> Vec<BuildOrder> {
    let delta = state.adjustment_delta(power);
    let mut orders = Vec::new();
    if delta > 0 {
        orders.push(BuildOrder::waive(power));
        for prov in home_centers(power) {
            orders.push(BuildOrder::build(power, UnitKind::Army, Location::new(prov)));
            if prov.has_coasts() {
                for &coast in prov.coasts() {
                    let at = Location::with_coast(prov, coast);
                    orders.push(BuildOrder::build(power, UnitKind::Fleet, at));
                }
            } else {
                orders.push(BuildOrder::build(power, UnitKind::Fleet, Location::new(prov)));
            }
        }
    } else if delta < 0 {
        for (prov, unit) in state.units_of(power) {
            let at = Location::with_coast(prov, unit.coast);
            orders.push(BuildOrder::disband(power, unit.kind, at));
        }
    }
    orders.retain(|o| validate_build(o, state).is_ok());
    orders
}
