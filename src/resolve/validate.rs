//! Order legality checks for all three phases.

use thiserror::Error;

use crate::board::{
    edges_from, fleet_coasts_to, is_adjacent, Action, Adjustment, BuildOrder, Coast, GameState,
    Location, Order, Phase, Power, Province, RetreatAction, RetreatOrder, Terrain, UnitKind,
    PROVINCE_COUNT,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("no unit at {0}")]
    NoUnit(Province),
    #[error("unit at {province} belongs to {owner}, not {power}")]
    WrongPower { province: Province, owner: Power, power: Power },
    #[error("unit at {0} is not a {1}")]
    WrongKind(Province, &'static str),
    #[error("a {kind} cannot enter {to}")]
    Terrain { kind: &'static str, to: Province },
    #[error("{to} is not reachable from {from}")]
    NotAdjacent { from: Province, to: Province },
    #[error("a coast of {0} must be named")]
    AmbiguousCoast(Province),
    #[error("coast {coast} of {province} cannot be reached")]
    BadCoast { province: Province, coast: &'static str },
    #[error("unit at {at} cannot support into {to}")]
    BadSupport { at: Province, to: Province },
    #[error("fleet at {at} cannot convoy from {from} to {to}")]
    BadConvoy { at: Province, from: Province, to: Province },
    #[error("no dislodged unit at {0}")]
    NotDislodged(Province),
    #[error("{0} is occupied")]
    Occupied(Province),
    #[error("cannot retreat into {0}, the attacker's origin")]
    AttackerOrigin(Province),
    #[error("{0} is not an owned, vacant home center")]
    NotBuildable(Province),
    #[error("{0} has no adjustment of that kind owed")]
    NoAdjustment(Power),
    #[error("order does not belong to the {0} phase")]
    WrongPhase(&'static str),
}

/// Checks one movement order against the position.
pub fn validate_order(order: &Order, state: &GameState) -> Result<(), OrderError> {
    let at = order.at.province;
    let unit = state.unit_at(at).ok_or(OrderError::NoUnit(at))?;
    if unit.power != order.power {
        return Err(OrderError::WrongPower { province: at, owner: unit.power, power: order.power });
    }
    if unit.kind != order.kind {
        return Err(OrderError::WrongKind(at, order.kind.name()));
    }

    match order.action {
        Action::Hold => Ok(()),
        Action::Move { to } => validate_step(at, unit.coast, unit.kind, to, state, true),
        Action::SupportHold { target, .. } => {
            state.unit_at(target).ok_or(OrderError::NoUnit(target))?;
            if target == at || !is_adjacent(at, unit.coast, target, Coast::None, unit.kind) {
                return Err(OrderError::BadSupport { at, to: target });
            }
            Ok(())
        }
        Action::SupportMove { from, to, .. } => {
            let supported = state.unit_at(from).ok_or(OrderError::NoUnit(from))?;
            if from == at || to == at || from == to {
                return Err(OrderError::BadSupport { at, to });
            }
            if !is_adjacent(at, unit.coast, to, Coast::None, unit.kind) {
                return Err(OrderError::BadSupport { at, to });
            }
            let reachable = is_adjacent(from, supported.coast, to, Coast::None, supported.kind)
                || (supported.kind == UnitKind::Army && can_be_convoyed(from, to, state));
            if !reachable {
                return Err(OrderError::BadSupport { at, to });
            }
            Ok(())
        }
        Action::Convoy { from, to } => {
            let bad = OrderError::BadConvoy { at, from, to };
            if unit.kind != UnitKind::Fleet || !at.is_sea() {
                return Err(bad);
            }
            match state.unit_at(from) {
                Some(u) if u.kind == UnitKind::Army => {}
                _ => return Err(bad),
            }
            if from == to || to.is_sea() || from.is_sea() {
                return Err(bad);
            }
            Ok(())
        }
    }
}

/// Shared move/retreat destination check. `allow_convoy` enables army
/// transit through fleet-held seas.
fn validate_step(
    at: Province,
    coast: Coast,
    kind: UnitKind,
    to: Location,
    state: &GameState,
    allow_convoy: bool,
) -> Result<(), OrderError> {
    let dst = to.province;
    if dst == at {
        return Err(OrderError::NotAdjacent { from: at, to: dst });
    }
    if !kind.can_occupy(dst.terrain()) {
        return Err(OrderError::Terrain { kind: kind.name(), to: dst });
    }
    if is_adjacent(at, coast, dst, to.coast, kind) {
        if kind == UnitKind::Fleet && dst.has_coasts() {
            let coasts = fleet_coasts_to(at, coast, dst);
            if to.coast == Coast::None {
                if coasts.len() > 1 {
                    return Err(OrderError::AmbiguousCoast(dst));
                }
            } else if !coasts.contains(&to.coast) {
                return Err(OrderError::BadCoast { province: dst, coast: to.coast.abbr() });
            }
        }
        return Ok(());
    }
    if allow_convoy && kind == UnitKind::Army && can_be_convoyed(at, dst, state) {
        return Ok(());
    }
    Err(OrderError::NotAdjacent { from: at, to: dst })
}

/// True if fleets currently at sea form a chain from `from` to `to`.
///
/// Only checks the geometry; whether those fleets actually convoy is
/// decided during adjudication.
pub fn can_be_convoyed(from: Province, to: Province, state: &GameState) -> bool {
    if from == to || from.terrain() != Terrain::Coastal || to.terrain() != Terrain::Coastal {
        return false;
    }
    let mut visited = [false; PROVINCE_COUNT];
    let mut queue: Vec<Province> = Vec::new();
    let mut head = 0;

    let mut push_seas = |p: Province, queue: &mut Vec<Province>| {
        for e in edges_from(p) {
            if e.fleet
                && e.to.is_sea()
                && !visited[e.to.index()]
                && state.unit_at(e.to).is_some_and(|u| u.kind == UnitKind::Fleet)
            {
                visited[e.to.index()] = true;
                queue.push(e.to);
            }
        }
    };

    push_seas(from, &mut queue);
    while head < queue.len() {
        let sea = queue[head];
        head += 1;
        if edges_from(sea).iter().any(|e| e.fleet && e.to == to) {
            return true;
        }
        push_seas(sea, &mut queue);
    }
    false
}

/// Replaces every invalid order with a hold and adds holds for unordered
/// units of `power`. Orders for other powers' units are dropped.
pub fn validate_and_default(orders: &[Order], state: &GameState, power: Power) -> Vec<Order> {
    let mut seen = [false; PROVINCE_COUNT];
    let mut out = Vec::with_capacity(orders.len());
    for order in orders {
        let idx = order.at.province.index();
        if order.power != power || seen[idx] {
            continue;
        }
        let Some(unit) = state.unit_at(order.at.province) else { continue };
        if unit.power != power {
            continue;
        }
        seen[idx] = true;
        if validate_order(order, state).is_ok() {
            out.push(*order);
        } else {
            let at = Location::with_coast(order.at.province, unit.coast);
            out.push(Order::hold(power, unit.kind, at));
        }
    }
    for (prov, unit) in state.units_of(power) {
        if !seen[prov.index()] {
            out.push(Order::hold(power, unit.kind, Location::with_coast(prov, unit.coast)));
        }
    }
    out
}

/// Checks one retreat-phase order.
pub fn validate_retreat(order: &RetreatOrder, state: &GameState) -> Result<(), OrderError> {
    if state.phase != Phase::Retreat {
        return Err(OrderError::WrongPhase("retreat"));
    }
    let at = order.at.province;
    let d = state.dislodged[at.index()].ok_or(OrderError::NotDislodged(at))?;
    if d.unit.power != order.power {
        return Err(OrderError::WrongPower {
            province: at,
            owner: d.unit.power,
            power: order.power,
        });
    }
    if d.unit.kind != order.kind {
        return Err(OrderError::WrongKind(at, order.kind.name()));
    }
    match order.action {
        RetreatAction::Disband => Ok(()),
        RetreatAction::Move(to) => {
            if to.province == d.attacker_from {
                return Err(OrderError::AttackerOrigin(to.province));
            }
            if state.unit_at(to.province).is_some() {
                return Err(OrderError::Occupied(to.province));
            }
            validate_step(at, d.unit.coast, d.unit.kind, to, state, false)
        }
    }
}

/// Checks one adjustment-phase order. Counts against the cap are applied
/// during resolution, not here.
pub fn validate_build(order: &BuildOrder, state: &GameState) -> Result<(), OrderError> {
    if state.phase != Phase::Build {
        return Err(OrderError::WrongPhase("build"));
    }
    let power = order.power;
    let delta = state.adjustment_delta(power);
    match order.adjustment {
        Adjustment::Waive => {
            if delta <= 0 {
                return Err(OrderError::NoAdjustment(power));
            }
            Ok(())
        }
        Adjustment::Build { kind, at } => {
            if delta <= 0 {
                return Err(OrderError::NoAdjustment(power));
            }
            let p = at.province;
            if p.home_power() != Some(power)
                || state.owner(p) != Some(power)
                || state.unit_at(p).is_some()
            {
                return Err(OrderError::NotBuildable(p));
            }
            if !kind.can_occupy(p.terrain()) {
                return Err(OrderError::Terrain { kind: kind.name(), to: p });
            }
            match kind {
                UnitKind::Fleet if p.has_coasts() => {
                    if at.coast == Coast::None {
                        return Err(OrderError::AmbiguousCoast(p));
                    }
                    if !p.coasts().contains(&at.coast) {
                        return Err(OrderError::BadCoast { province: p, coast: at.coast.abbr() });
                    }
                }
                _ if at.coast != Coast::None => {
                    return Err(OrderError::BadCoast { province: p, coast: at.coast.abbr() });
                }
                _ => {}
            }
            Ok(())
        }
        Adjustment::Disband { kind, at } => {
            if delta >= 0 {
                return Err(OrderError::NoAdjustment(power));
            }
            let p = at.province;
            match state.unit_at(p) {
                Some(u) if u.power == power && u.kind == kind => Ok(()),
                Some(u) if u.power == power => Err(OrderError::WrongKind(p, kind.name())),
                _ => Err(OrderError::NoUnit(p)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Season, Unit};
    use Province::*;

    fn loc(p: Province) -> Location {
        Location::new(p)
    }

    #[test]
    fn opening_moves_validate() {
        let gs = GameState::initial();
        let ok = [
            Order::moving(Power::Austria, UnitKind::Army, loc(Vie), loc(Gal)),
            Order::moving(Power::England, UnitKind::Fleet, loc(Lon), loc(Nth)),
            Order::moving(
                Power::Russia,
                UnitKind::Fleet,
                Location::with_coast(Stp, Coast::South),
                loc(Bot),
            ),
            Order::support_move(Power::Austria, UnitKind::Army, loc(Vie), Bud, Gal, UnitKind::Army),
            Order::support_hold(Power::Germany, UnitKind::Army, loc(Mun), Ber, UnitKind::Army),
        ];
        for o in &ok {
            assert_eq!(validate_order(o, &gs), Ok(()), "{o:?}");
        }
    }

    #[test]
    fn rejects_illegal_orders() {
        let gs = GameState::initial();
        let vie_ven = Order::moving(Power::Austria, UnitKind::Army, loc(Vie), loc(Ven));
        assert!(matches!(validate_order(&vie_ven, &gs), Err(OrderError::NotAdjacent { .. })));

        let wrong_power = Order::hold(Power::Turkey, UnitKind::Army, loc(Vie));
        assert!(matches!(validate_order(&wrong_power, &gs), Err(OrderError::WrongPower { .. })));

        let army_to_sea = Order::moving(Power::France, UnitKind::Army, loc(Mar), loc(Gol));
        assert!(matches!(validate_order(&army_to_sea, &gs), Err(OrderError::Terrain { .. })));

        let empty = Order::hold(Power::Austria, UnitKind::Army, loc(Gal));
        assert_eq!(validate_order(&empty, &gs), Err(OrderError::NoUnit(Gal)));
    }

    #[test]
    fn split_coast_needs_a_name_when_ambiguous() {
        let mut gs = GameState::empty(1901, Season::Spring, Phase::Movement);
        gs.place(Mao, Unit::new(Power::France, UnitKind::Fleet));
        gs.place(Con, Unit::new(Power::Turkey, UnitKind::Fleet));

        let mao_spa = Order::moving(Power::France, UnitKind::Fleet, loc(Mao), loc(Spa));
        assert_eq!(validate_order(&mao_spa, &gs), Err(OrderError::AmbiguousCoast(Spa)));
        let spa_nc = Location::with_coast(Spa, Coast::North);
        let mao_spa_nc = Order::moving(Power::France, UnitKind::Fleet, loc(Mao), spa_nc);
        assert_eq!(validate_order(&mao_spa_nc, &gs), Ok(()));

        // Constantinople touches both coasts of Bulgaria.
        let con_bul = Order::moving(Power::Turkey, UnitKind::Fleet, loc(Con), loc(Bul));
        assert_eq!(validate_order(&con_bul, &gs), Err(OrderError::AmbiguousCoast(Bul)));
    }

    #[test]
    fn army_move_by_convoy_chain() {
        let mut gs = GameState::empty(1901, Season::Spring, Phase::Movement);
        gs.place(Lon, Unit::new(Power::England, UnitKind::Army));
        gs.place(Eng, Unit::new(Power::England, UnitKind::Fleet));
        gs.place(Mao, Unit::new(Power::England, UnitKind::Fleet));

        assert!(can_be_convoyed(Lon, Bre, &gs));
        assert!(can_be_convoyed(Lon, Por, &gs));
        assert!(!can_be_convoyed(Lon, Nwy, &gs));

        let lon_spa = Order::moving(Power::England, UnitKind::Army, loc(Lon), loc(Spa));
        assert_eq!(validate_order(&lon_spa, &gs), Ok(()));
        let convoy = Order::convoy(Power::England, loc(Mao), Lon, Spa);
        assert_eq!(validate_order(&convoy, &gs), Ok(()));
    }

    #[test]
    fn defaulting_fills_every_unit() {
        let gs = GameState::initial();
        let orders = [
            Order::moving(Power::France, UnitKind::Army, loc(Par), loc(Bur)),
            Order::moving(Power::France, UnitKind::Army, loc(Mar), loc(Ven)),
        ];
        let out = validate_and_default(&orders, &gs, Power::France);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], orders[0]);
        assert_eq!(out[1].action, Action::Hold);
        assert_eq!(out[2].at.province, Bre);
    }

    #[test]
    fn retreat_rules() {
        let mut gs = GameState::empty(1901, Season::Spring, Phase::Retreat);
        gs.dislodged[Ser.index()] = Some(crate::board::Dislodged {
            unit: Unit::new(Power::Austria, UnitKind::Army),
            attacker_from: Bul,
        });
        gs.place(Alb, Unit::new(Power::Italy, UnitKind::Army));

        let to = |p| RetreatOrder::retreat(Power::Austria, UnitKind::Army, loc(Ser), loc(p));
        assert_eq!(validate_retreat(&to(Bud), &gs), Ok(()));
        assert_eq!(validate_retreat(&to(Bul), &gs), Err(OrderError::AttackerOrigin(Bul)));
        assert_eq!(validate_retreat(&to(Alb), &gs), Err(OrderError::Occupied(Alb)));
        assert!(validate_retreat(&to(Vie), &gs).is_err());
        let disband = RetreatOrder::disband(Power::Austria, UnitKind::Army, loc(Ser));
        assert_eq!(validate_retreat(&disband, &gs), Ok(()));
    }

    #[test]
    fn build_rules() {
        let mut gs = GameState::initial();
        gs.phase = Phase::Build;
        gs.season = Season::Fall;
        gs.units[Stp.index()] = None;
        gs.set_owner(Swe, Some(Power::Russia));

        let build = |kind, at| BuildOrder::build(Power::Russia, kind, at);
        let check = |kind, at| validate_build(&build(kind, at), &gs);
        assert_eq!(check(UnitKind::Fleet, Location::with_coast(Stp, Coast::North)), Ok(()));
        assert_eq!(check(UnitKind::Army, loc(Stp)), Ok(()));
        assert_eq!(check(UnitKind::Fleet, loc(Stp)), Err(OrderError::AmbiguousCoast(Stp)));
        assert_eq!(check(UnitKind::Army, loc(Mos)), Err(OrderError::NotBuildable(Mos)));
        assert_eq!(check(UnitKind::Army, loc(Swe)), Err(OrderError::NotBuildable(Swe)));
        assert_eq!(validate_build(&BuildOrder::waive(Power::Russia), &gs), Ok(()));
        assert!(validate_build(&BuildOrder::waive(Power::France), &gs).is_err());
    }
}
