//! One-step reach, threat and cohesion helpers shared by the evaluators
//! and the move scorers.

use crate::board::{
    adjacent_provinces, home_centers, is_adjacent, Coast, GameState, Location, Order, Power,
    Province, Terrain, UnitKind, ALL_POWERS,
};
use crate::resolve::validate_order;

use super::distance::{distance, nearest_unclaimed};

/// True if a unit of `kind` at `from`/`coast` can move to `target` in one step.
#[inline]
pub fn unit_can_reach(from: Province, coast: Coast, kind: UnitKind, target: Province) -> bool {
    is_adjacent(from, coast, target, Coast::None, kind)
}

/// Enemy units that can move into `province` this turn.
pub fn province_threat(province: Province, power: Power, state: &GameState) -> i32 {
    state
        .units()
        .filter(|(p, u)| u.power != power && unit_can_reach(*p, u.coast, u.kind, province))
        .count() as i32
}

/// Own units, other than the occupant, that can move into `province`.
pub fn province_defense(province: Province, power: Power, state: &GameState) -> i32 {
    state
        .units()
        .filter(|(p, u)| {
            u.power == power && *p != province && unit_can_reach(*p, u.coast, u.kind, province)
        })
        .count() as i32
}

/// Enemy units exactly two moves from `province`.
pub fn province_threat2(province: Province, power: Power, state: &GameState) -> i32 {
    state
        .units()
        .filter(|(p, u)| {
            u.power != power
                && !unit_can_reach(*p, u.coast, u.kind, province)
                && distance(u.kind, *p, province) == Some(2)
        })
        .count() as i32
}

/// Distinct neighbors a unit of `kind` can step to.
#[inline]
pub fn unit_connectivity(province: Province, coast: Coast, kind: UnitKind) -> usize {
    adjacent_provinces(province, coast, kind).len()
}

/// True if the unit at `supporter` may legally support `from -> to`.
pub fn can_support_move(
    supporter: Province,
    from: Province,
    to: Province,
    state: &GameState,
) -> bool {
    let (Some(unit), Some(supported)) = (state.unit_at(supporter), state.unit_at(from)) else {
        return false;
    };
    let order = Order::support_move(
        unit.power,
        unit.kind,
        Location::with_coast(supporter, unit.coast),
        from,
        to,
        supported.kind,
    );
    validate_order(&order, state).is_ok()
}

/// True if no home center of `power` connects to another power's home by land.
pub fn is_island_power(power: Power) -> bool {
    home_centers(power).all(|home| {
        ALL_POWERS
            .iter()
            .filter(|&&p| p != power)
            .flat_map(|&p| home_centers(p))
            .all(|other| distance(UnitKind::Army, home, other).is_none())
    })
}

/// True if some army of `power` cannot walk to an unclaimed center
/// within six moves.
pub fn needs_convoy_fleets(power: Power, state: &GameState) -> bool {
    state
        .units_of(power)
        .filter(|(_, u)| u.kind == UnitKind::Army)
        .any(|(p, _)| {
            nearest_unclaimed(UnitKind::Army, p, power, state).map_or(true, |(_, d)| d > 6)
        })
}

/// Preference in `[0, 1]` for building a fleet rather than an army at
/// `province`. Zero for inland provinces.
pub fn naval_bias(province: Province, power: Power, state: &GameState) -> f32 {
    if province.terrain() != Terrain::Coastal {
        return 0.0;
    }
    let army = nearest_unclaimed(UnitKind::Army, province, power, state).map(|(_, d)| d);
    let fleet = nearest_unclaimed(UnitKind::Fleet, province, power, state).map(|(_, d)| d);
    let mut bias: f32 = match (army, fleet) {
        (None, Some(_)) => 1.0,
        (Some(_), None) | (None, None) => 0.1,
        (Some(a), Some(f)) => 0.5 + 0.15 * (a as f32 - f as f32),
    };
    if is_island_power(power) {
        bias += 0.3;
    }
    if needs_convoy_fleets(power, state) {
        bias += 0.2;
    }
    bias.clamp(0.0, 1.0)
}
