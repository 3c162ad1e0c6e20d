//! Strategic regions of the map.

use serde::{Deserialize, Serialize};

use crate::board::{GameState, Power, Province};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theater {
    /// France, Iberia, the Low Countries and the British Isles.
    West,
    /// Scandinavia and the northern seas.
    Scan,
    /// Italy, North Africa and the Mediterranean.
    Med,
    Balkans,
    East,
    /// The German and Austrian cores.
    Center,
}

pub const ALL_THEATERS: [Theater; 6] =
    [Theater::West, Theater::Scan, Theater::Med, Theater::Balkans, Theater::East, Theater::Center];

impl Theater {
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Theater::West => "west",
            Theater::Scan => "scan",
            Theater::Med => "med",
            Theater::Balkans => "balkans",
            Theater::East => "east",
            Theater::Center => "center",
        }
    }

    pub fn from_name(s: &str) -> Option<Theater> {
        let lower = s.trim().to_ascii_lowercase();
        ALL_THEATERS.into_iter().find(|t| t.name() == lower)
    }
}

/// Theater containing `p`.
pub fn province_theater(p: Province) -> Theater {
    use Province::*;
    use Theater::*;
    match p {
        Bre | Par | Mar | Gas | Bur | Pic | Spa | Por | Bel | Mao | Eng | Iri | Naf | Nao | Lon
        | Lvp | Wal | Yor | Edi | Cly => West,
        Nwy | Swe | Den | Ska | Nth | Nrg | Bar | Fin | Stp => Scan,
        Tun | Tys | Wes | Gol | Ion | Aeg | Eas | Rom | Nap | Apu | Tus | Pie | Ven => Med,
        Gre | Ser | Bul | Rum | Alb | Con | Smy | Ank | Arm | Syr | Bla | Adr => Balkans,
        Mos | War | Ukr | Sev | Lvn | Pru | Sil | Gal | Bot => East,
        Mun | Ber | Kie | Ruh | Hol | Tyr | Boh | Vie | Tri | Bud | Hel | Bal => Center,
    }
}

/// Units of `power` per theater, indexed by `Theater::index()`.
pub fn theater_presence(state: &GameState, power: Power) -> [usize; 6] {
    let mut counts = [0; 6];
    for (p, _) in state.units_of(power) {
        counts[province_theater(p).index()] += 1;
    }
    counts
}
