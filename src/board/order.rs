//! Orders for all three phase kinds.
//!
//! Orders are plain values. A movement order set for a power holds exactly
//! one `Order` per unit it owns.

use std::fmt;

use super::province::{Coast, Power, Province};
use super::unit::UnitKind;

/// A province plus an optional coast qualifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
    pub province: Province,
    pub coast: Coast,
}

impl Location {
    pub const fn new(province: Province) -> Self {
        Location { province, coast: Coast::None }
    }

    pub const fn with_coast(province: Province, coast: Coast) -> Self {
        Location { province, coast }
    }
}

impl From<Province> for Location {
    fn from(p: Province) -> Self {
        Location::new(p)
    }
}

/// What a unit does during a movement phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Hold,
    Move { to: Location },
    /// Support the unit at `target` (of kind `kind`) holding in place.
    SupportHold { target: Province, kind: UnitKind },
    /// Support the unit at `from` (of kind `kind`) moving into `to`.
    SupportMove { from: Province, to: Province, kind: UnitKind },
    /// Convoy the army at `from` to `to`.
    Convoy { from: Province, to: Province },
}

/// A movement-phase order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Order {
    pub power: Power,
    pub kind: UnitKind,
    pub at: Location,
    pub action: Action,
}

impl Order {
    pub const fn hold(power: Power, kind: UnitKind, at: Location) -> Self {
        Order { power, kind, at, action: Action::Hold }
    }

    pub const fn moving(power: Power, kind: UnitKind, at: Location, to: Location) -> Self {
        Order { power, kind, at, action: Action::Move { to } }
    }

    pub const fn support_hold(
        power: Power,
        kind: UnitKind,
        at: Location,
        target: Province,
        target_kind: UnitKind,
    ) -> Self {
        Order { power, kind, at, action: Action::SupportHold { target, kind: target_kind } }
    }

    pub const fn support_move(
        power: Power,
        kind: UnitKind,
        at: Location,
        from: Province,
        to: Province,
        supported_kind: UnitKind,
    ) -> Self {
        Order { power, kind, at, action: Action::SupportMove { from, to, kind: supported_kind } }
    }

    pub const fn convoy(power: Power, at: Location, from: Province, to: Province) -> Self {
        Order { power, kind: UnitKind::Fleet, at, action: Action::Convoy { from, to } }
    }

    /// Province of the ordered unit.
    #[inline]
    pub fn province(&self) -> Province {
        self.at.province
    }

    /// Destination province for moves.
    #[inline]
    pub fn move_target(&self) -> Option<Province> {
        match self.action {
            Action::Move { to } => Some(to.province),
            _ => None,
        }
    }

    #[inline]
    pub fn is_move(&self) -> bool {
        matches!(self.action, Action::Move { .. })
    }

    #[inline]
    pub fn is_support(&self) -> bool {
        matches!(self.action, Action::SupportHold { .. } | Action::SupportMove { .. })
    }

    /// The same unit holding instead.
    pub fn as_hold(&self) -> Order {
        Order::hold(self.power, self.kind, self.at)
    }

    /// Compact identity used to deduplicate order sets: `loc:type:target:aux|`.
    pub fn key(&self) -> String {
        let (ty, target, aux) = match self.action {
            Action::Hold => ("h", String::new(), String::new()),
            Action::Move { to } => ("m", location_key(to), String::new()),
            Action::SupportHold { target, .. } => ("s", target.abbr().to_string(), String::new()),
            Action::SupportMove { from, to, .. } => {
                ("s", from.abbr().to_string(), to.abbr().to_string())
            }
            Action::Convoy { from, to } => ("c", from.abbr().to_string(), to.abbr().to_string()),
        };
        format!("{}:{}:{}:{}|", self.at.province.abbr(), ty, target, aux)
    }
}

fn location_key(loc: Location) -> String {
    if loc.coast == Coast::None {
        loc.province.abbr().to_string()
    } else {
        format!("{}/{}", loc.province.abbr(), loc.coast.abbr())
    }
}

/// Deduplication key for a whole order set, independent of order.
pub fn order_set_key(orders: &[Order]) -> String {
    let mut sorted: Vec<&Order> = orders.iter().collect();
    sorted.sort_by_key(|o| o.at.province);
    sorted.iter().map(|o| o.key()).collect()
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::protocol::dson::format_order(self))
    }
}

/// What a dislodged unit does during a retreat phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RetreatAction {
    Move(Location),
    Disband,
}

/// A retreat-phase order for the dislodged unit at `at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RetreatOrder {
    pub power: Power,
    pub kind: UnitKind,
    pub at: Location,
    pub action: RetreatAction,
}

impl RetreatOrder {
    pub const fn disband(power: Power, kind: UnitKind, at: Location) -> Self {
        RetreatOrder { power, kind, at, action: RetreatAction::Disband }
    }

    pub const fn retreat(power: Power, kind: UnitKind, at: Location, to: Location) -> Self {
        RetreatOrder { power, kind, at, action: RetreatAction::Move(to) }
    }
}

impl fmt::Display for RetreatOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::protocol::dson::format_retreat(self))
    }
}

/// An adjustment made during the build phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Adjustment {
    Build { kind: UnitKind, at: Location },
    Disband { kind: UnitKind, at: Location },
    Waive,
}

/// A build-phase order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BuildOrder {
    pub power: Power,
    pub adjustment: Adjustment,
}

impl BuildOrder {
    pub const fn build(power: Power, kind: UnitKind, at: Location) -> Self {
        BuildOrder { power, adjustment: Adjustment::Build { kind, at } }
    }

    pub const fn disband(power: Power, kind: UnitKind, at: Location) -> Self {
        BuildOrder { power, adjustment: Adjustment::Disband { kind, at } }
    }

    pub const fn waive(power: Power) -> Self {
        BuildOrder { power, adjustment: Adjustment::Waive }
    }

    /// Province touched by a build or disband.
    pub fn province(&self) -> Option<Province> {
        match self.adjustment {
            Adjustment::Build { at, .. } | Adjustment::Disband { at, .. } => Some(at.province),
            Adjustment::Waive => None,
        }
    }
}

impl fmt::Display for BuildOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::protocol::dson::format_build(self))
    }
}
