//! Movement-phase move generation.
//!
//! Enumerates hold, move, support and convoy orders for one unit. Every
//! order returned passes [`validate_order`].

use crate::board::{
    adjacent_provinces, edges_from, fleet_coasts_to, is_adjacent, Coast, GameState, Location, Order,
    Province, Terrain, UnitKind, PROVINCE_COUNT,
};
use crate::resolve::validate_order;

/// Destinations a unit of `kind` at `province`/`coast` can step to,
/// with split-coast destinations expanded per reachable coast.
pub fn move_targets(province: Province, coast: Coast, kind: UnitKind) -> Vec<Location> {
    let mut out = Vec::new();
    for dest in adjacent_provinces(province, coast, kind) {
        if !kind.can_occupy(dest.terrain()) {
            continue;
        }
        if kind == UnitKind::Fleet && dest.has_coasts() {
            let coasts = fleet_coasts_to(province, coast, dest);
            out.extend(coasts.into_iter().map(|c| Location::with_coast(dest, c)));
        } else {
            out.push(Location::new(dest));
        }
    }
    out
}

/// Seas in the fleet chain reachable from `from`, and the coastal
/// provinces an army there could be convoyed to.
pub fn convoy_reach(from: Province, state: &GameState) -> ([bool; PROVINCE_COUNT], Vec<Province>) {
    let mut chain = [false; PROVINCE_COUNT];
    let mut dests = Vec::new();
    if from.terrain() != Terrain::Coastal {
        return (chain, dests);
    }
    let occupied_sea =
        |p: Province| p.is_sea() && state.unit_at(p).is_some_and(|u| u.kind == UnitKind::Fleet);

    let mut queue: Vec<Province> = edges_from(from)
        .iter()
        .filter(|e| e.fleet && occupied_sea(e.to))
        .map(|e| e.to)
        .collect();
    queue.dedup();
    for p in &queue {
        chain[p.index()] = true;
    }
    let mut head = 0;
    while head < queue.len() {
        let sea = queue[head];
        head += 1;
        for e in edges_from(sea) {
            if !e.fleet {
                continue;
            }
            if occupied_sea(e.to) && !chain[e.to.index()] {
                chain[e.to.index()] = true;
                queue.push(e.to);
            } else if e.to.terrain() == Terrain::Coastal && e.to != from && !dests.contains(&e.to) {
                dests.push(e.to);
            }
        }
    }
    (chain, dests)
}

/// All legal movement orders for the unit at `province`; empty if none.
pub fn legal_orders(province: Province, state: &GameState) -> Vec<Order> {
    let Some(unit) = state.unit_at(province) else { return Vec::new() };
    let at = Location::with_coast(province, unit.coast);
    let mut orders = vec![Order::hold(unit.power, unit.kind, at)];

    let targets = move_targets(province, unit.coast, unit.kind);
    for to in &targets {
        orders.push(Order::moving(unit.power, unit.kind, at, *to));
    }
    if unit.kind == UnitKind::Army {
        let (_, dests) = convoy_reach(province, state);
        for dst in dests {
            if !targets.iter().any(|t| t.province == dst) {
                orders.push(Order::moving(unit.power, unit.kind, at, Location::new(dst)));
            }
        }
    }

    let mut reachable: Vec<Province> = targets.iter().map(|l| l.province).collect();
    reachable.dedup();

    for (other_prov, other) in state.units() {
        if other_prov == province {
            continue;
        }
        if reachable.contains(&other_prov) {
            orders.push(Order::support_hold(unit.power, unit.kind, at, other_prov, other.kind));
        }
        for dest in adjacent_provinces(other_prov, other.coast, other.kind) {
            if dest == province
                || !other.kind.can_occupy(dest.terrain())
                || !reachable.contains(&dest)
            {
                continue;
            }
            let order =
                Order::support_move(unit.power, unit.kind, at, other_prov, dest, other.kind);
            orders.push(order);
        }
    }

    if unit.kind == UnitKind::Fleet && province.is_sea() {
        for (army_prov, army) in state.units() {
            if army.kind != UnitKind::Army {
                continue;
            }
            let (chain, dests) = convoy_reach(army_prov, state);
            if !chain[province.index()] {
                continue;
            }
            for dst in dests {
                if !is_adjacent(army_prov, Coast::None, dst, Coast::None, UnitKind::Army) {
                    orders.push(Order::convoy(unit.power, at, army_prov, dst));
                }
            }
        }
    }

    orders.retain(|o| validate_order(o, state).is_ok());
    orders
}
