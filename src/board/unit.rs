//! Unit kinds and units on the board.

use serde::{Deserialize, Serialize};

use super::province::{Coast, Power, Terrain};

/// Army or fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Army,
    Fleet,
}

impl UnitKind {
    /// Uppercase letter used in order notation.
    pub const fn letter(self) -> char {
        match self {
            UnitKind::Army => 'A',
            UnitKind::Fleet => 'F',
        }
    }

    pub fn from_letter(c: char) -> Option<UnitKind> {
        match c.to_ascii_uppercase() {
            'A' => Some(UnitKind::Army),
            'F' => Some(UnitKind::Fleet),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            UnitKind::Army => "army",
            UnitKind::Fleet => "fleet",
        }
    }

    pub fn from_name(s: &str) -> Option<UnitKind> {
        match s {
            "army" => Some(UnitKind::Army),
            "fleet" => Some(UnitKind::Fleet),
            _ => None,
        }
    }

    /// Whether this kind may stand on the given terrain.
    pub const fn can_occupy(self, terrain: Terrain) -> bool {
        !matches!(
            (self, terrain),
            (UnitKind::Army, Terrain::Sea) | (UnitKind::Fleet, Terrain::Inland)
        )
    }
}

/// A unit standing on a province. The province is the index it is stored at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Unit {
    pub power: Power,
    pub kind: UnitKind,
    pub coast: Coast,
}

impl Unit {
    pub const fn new(power: Power, kind: UnitKind) -> Self {
        Unit { power, kind, coast: Coast::None }
    }

    pub const fn fleet_on(power: Power, coast: Coast) -> Self {
        Unit { power, kind: UnitKind::Fleet, coast }
    }
}
