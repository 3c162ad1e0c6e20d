//! Neighbor stance classification.
//!
//! Positions carry no order history, so stance is read from proximity: the
//! share of a rival's units standing next to our supply centers.

use serde::{Deserialize, Serialize};

use crate::board::{edges_from, GameState, Power, ALL_PROVINCES, PROVINCE_COUNT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stance {
    /// At least half of its units border our centers.
    Aggressive,
    Neutral,
    /// None of its units border our centers.
    Retreating,
}

impl Stance {
    pub fn from_name(s: &str) -> Option<Stance> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aggressive" => Some(Stance::Aggressive),
            "neutral" => Some(Stance::Neutral),
            "retreating" => Some(Stance::Retreating),
            _ => None,
        }
    }
}

/// Provinces next to a center owned by `power` that are not themselves
/// owned centers of `power`.
pub fn border_zone(state: &GameState, power: Power) -> [bool; PROVINCE_COUNT] {
    let mut ours = [false; PROVINCE_COUNT];
    for p in ALL_PROVINCES {
        ours[p.index()] = p.is_supply_center() && state.owner(p) == Some(power);
    }
    let mut zone = [false; PROVINCE_COUNT];
    for p in ALL_PROVINCES.into_iter().filter(|p| ours[p.index()]) {
        for e in edges_from(p) {
            if !ours[e.to.index()] {
                zone[e.to.index()] = true;
            }
        }
    }
    zone
}

/// Enemy units standing in `power`'s border zone.
pub fn border_pressure(state: &GameState, power: Power) -> usize {
    let zone = border_zone(state, power);
    state.units().filter(|(p, u)| u.power != power && zone[p.index()]).count()
}

/// Stance of every rival with units, indexed by `Power::index()`.
pub fn classify_neighbor_stances(state: &GameState, power: Power) -> [Option<Stance>; 7] {
    let zone = border_zone(state, power);
    let mut adjacent = [0usize; 7];
    let mut total = [0usize; 7];
    for (p, u) in state.units().filter(|(_, u)| u.power != power) {
        total[u.power.index()] += 1;
        if zone[p.index()] {
            adjacent[u.power.index()] += 1;
        }
    }

    let mut out = [None; 7];
    for i in 0..7 {
        if total[i] == 0 {
            continue;
        }
        out[i] = Some(if 2 * adjacent[i] >= total[i] {
            Stance::Aggressive
        } else if adjacent[i] == 0 {
            Stance::Retreating
        } else {
            Stance::Neutral
        });
    }
    out
}
