//! Game state snapshot.
//!
//! Fixed-size arrays indexed by `Province::index()` keep the state free of
//! heap allocations, so search code can reuse a scratch copy through
//! `Clone::clone_from` instead of allocating per node.

use serde::{Deserialize, Serialize};

use super::province::{
    home_centers, Coast, Power, Province, ALL_POWERS, ALL_PROVINCES, PROVINCE_COUNT,
};
use super::unit::{Unit, UnitKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Fall,
}

impl Season {
    pub const fn letter(self) -> char {
        match self {
            Season::Spring => 's',
            Season::Fall => 'f',
        }
    }

    pub fn from_letter(c: char) -> Option<Season> {
        match c {
            's' => Some(Season::Spring),
            'f' => Some(Season::Fall),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Season::Spring => "spring",
            Season::Fall => "fall",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Movement,
    Retreat,
    Build,
}

impl Phase {
    pub const fn letter(self) -> char {
        match self {
            Phase::Movement => 'm',
            Phase::Retreat => 'r',
            Phase::Build => 'b',
        }
    }

    pub fn from_letter(c: char) -> Option<Phase> {
        match c {
            'm' => Some(Phase::Movement),
            'r' => Some(Phase::Retreat),
            'b' => Some(Phase::Build),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Phase::Movement => "movement",
            Phase::Retreat => "retreat",
            Phase::Build => "build",
        }
    }
}

/// A unit knocked out of its province, waiting for a retreat order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dislodged {
    pub unit: Unit,
    pub attacker_from: Province,
}

/// Complete position at one point of the game.
///
/// At most one unit stands on a province, and a dislodged unit is never
/// present in `units` at the same time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub year: u16,
    pub season: Season,
    pub phase: Phase,
    pub units: [Option<Unit>; PROVINCE_COUNT],
    /// Owner of each supply center; `None` for neutral centers and non-centers.
    pub sc_owner: [Option<Power>; PROVINCE_COUNT],
    pub dislodged: [Option<Dislodged>; PROVINCE_COUNT],
}

impl GameState {
    pub fn empty(year: u16, season: Season, phase: Phase) -> Self {
        GameState {
            year,
            season,
            phase,
            units: [None; PROVINCE_COUNT],
            sc_owner: [None; PROVINCE_COUNT],
            dislodged: [None; PROVINCE_COUNT],
        }
    }

    /// The Spring 1901 starting position.
    pub fn initial() -> Self {
        use Province::*;
        use UnitKind::{Army, Fleet};

        let mut gs = GameState::empty(1901, Season::Spring, Phase::Movement);
        let setup: [(Power, UnitKind, Province, Coast); 22] = [
            (Power::Austria, Army, Vie, Coast::None),
            (Power::Austria, Army, Bud, Coast::None),
            (Power::Austria, Fleet, Tri, Coast::None),
            (Power::England, Fleet, Lon, Coast::None),
            (Power::England, Fleet, Edi, Coast::None),
            (Power::England, Army, Lvp, Coast::None),
            (Power::France, Fleet, Bre, Coast::None),
            (Power::France, Army, Par, Coast::None),
            (Power::France, Army, Mar, Coast::None),
            (Power::Germany, Fleet, Kie, Coast::None),
            (Power::Germany, Army, Ber, Coast::None),
            (Power::Germany, Army, Mun, Coast::None),
            (Power::Italy, Fleet, Nap, Coast::None),
            (Power::Italy, Army, Rom, Coast::None),
            (Power::Italy, Army, Ven, Coast::None),
            (Power::Russia, Fleet, Stp, Coast::South),
            (Power::Russia, Army, Mos, Coast::None),
            (Power::Russia, Army, War, Coast::None),
            (Power::Russia, Fleet, Sev, Coast::None),
            (Power::Turkey, Fleet, Ank, Coast::None),
            (Power::Turkey, Army, Con, Coast::None),
            (Power::Turkey, Army, Smy, Coast::None),
        ];
        for (power, kind, prov, coast) in setup {
            gs.units[prov.index()] = Some(Unit { power, kind, coast });
        }
        for power in ALL_POWERS {
            for sc in home_centers(power) {
                gs.sc_owner[sc.index()] = Some(power);
            }
        }
        gs
    }

    /// Places a unit. Returns false if the province is already occupied.
    pub fn place(&mut self, province: Province, unit: Unit) -> bool {
        let slot = &mut self.units[province.index()];
        if slot.is_some() {
            return false;
        }
        *slot = Some(unit);
        true
    }

    #[inline]
    pub fn unit_at(&self, province: Province) -> Option<Unit> {
        self.units[province.index()]
    }

    #[inline]
    pub fn owner(&self, province: Province) -> Option<Power> {
        self.sc_owner[province.index()]
    }

    pub fn set_owner(&mut self, province: Province, owner: Option<Power>) {
        self.sc_owner[province.index()] = owner;
    }

    /// Every unit on the board with its province, in province order.
    pub fn units(&self) -> impl Iterator<Item = (Province, Unit)> + '_ {
        ALL_PROVINCES
            .iter()
            .zip(self.units.iter())
            .filter_map(|(p, u)| u.map(|u| (*p, u)))
    }

    pub fn units_of(&self, power: Power) -> impl Iterator<Item = (Province, Unit)> + '_ {
        self.units().filter(move |(_, u)| u.power == power)
    }

    /// Dislodged units with the province they were driven from.
    pub fn dislodged_units(&self) -> impl Iterator<Item = (Province, Dislodged)> + '_ {
        ALL_PROVINCES
            .iter()
            .zip(self.dislodged.iter())
            .filter_map(|(p, d)| d.map(|d| (*p, d)))
    }

    pub fn dislodged_of(&self, power: Power) -> impl Iterator<Item = (Province, Dislodged)> + '_ {
        self.dislodged_units().filter(move |(_, d)| d.unit.power == power)
    }

    pub fn has_dislodged(&self) -> bool {
        self.dislodged.iter().any(Option::is_some)
    }

    /// Whether `power` owes a retreat order.
    pub fn has_dislodged_unit(&self, power: Power) -> bool {
        self.dislodged.iter().flatten().any(|d| d.unit.power == power)
    }

    pub fn supply_center_count(&self, power: Power) -> usize {
        self.sc_owner.iter().filter(|o| **o == Some(power)).count()
    }

    pub fn unit_count(&self, power: Power) -> usize {
        self.units.iter().flatten().filter(|u| u.power == power).count()
    }

    /// A power is alive while it holds a center or a unit.
    pub fn is_alive(&self, power: Power) -> bool {
        self.supply_center_count(power) > 0 || self.unit_count(power) > 0
    }

    /// Centers minus units: positive means builds are owed, negative disbands.
    pub fn adjustment_delta(&self, power: Power) -> i32 {
        self.supply_center_count(power) as i32 - self.unit_count(power) as i32
    }

    /// Supply-center count per power, indexed by `Power::index()`.
    pub fn center_counts(&self) -> [usize; 7] {
        let mut counts = [0usize; 7];
        for owner in self.sc_owner.iter().flatten() {
            counts[owner.index()] += 1;
        }
        counts
    }
}

impl Default for GameState {
    fn default() -> Self {
        GameState::initial()
    }
}
