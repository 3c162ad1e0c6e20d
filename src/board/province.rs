//! Provinces, coasts, terrain, and powers of the standard map.
//!
//! The province table is generated by `define_provinces!` so the enum, the
//! index-ordered list, and the metadata table can never drift apart.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of provinces on the standard map.
pub const PROVINCE_COUNT: usize = 75;

/// Number of supply centers on the standard map.
pub const SUPPLY_CENTER_COUNT: usize = 34;

/// Supply centers needed for a solo victory.
pub const SOLO_THRESHOLD: usize = 18;

/// Coast qualifier for fleets on split-coast provinces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum Coast {
    #[default]
    None,
    North,
    South,
    East,
}

impl Coast {
    /// Two-letter abbreviation, empty for `Coast::None`.
    pub const fn abbr(self) -> &'static str {
        match self {
            Coast::None => "",
            Coast::North => "nc",
            Coast::South => "sc",
            Coast::East => "ec",
        }
    }

    pub fn from_abbr(s: &str) -> Option<Coast> {
        match s {
            "" => Some(Coast::None),
            "nc" => Some(Coast::North),
            "sc" => Some(Coast::South),
            "ec" => Some(Coast::East),
            _ => None,
        }
    }
}

/// Terrain class of a province.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Terrain {
    Inland,
    Sea,
    Coastal,
}

/// One of the seven great powers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Power {
    Austria,
    England,
    France,
    Germany,
    Italy,
    Russia,
    Turkey,
}

/// All powers in standard order.
pub const ALL_POWERS: [Power; 7] = [
    Power::Austria,
    Power::England,
    Power::France,
    Power::Germany,
    Power::Italy,
    Power::Russia,
    Power::Turkey,
];

impl Power {
    /// Dense index in `0..7`, usable for per-power arrays.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lowercase name, as used in the opening book and on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            Power::Austria => "austria",
            Power::England => "england",
            Power::France => "france",
            Power::Germany => "germany",
            Power::Italy => "italy",
            Power::Russia => "russia",
            Power::Turkey => "turkey",
        }
    }

    /// Capitalized name for human-facing messages.
    pub const fn label(self) -> &'static str {
        match self {
            Power::Austria => "Austria",
            Power::England => "England",
            Power::France => "France",
            Power::Germany => "Germany",
            Power::Italy => "Italy",
            Power::Russia => "Russia",
            Power::Turkey => "Turkey",
        }
    }

    /// Single uppercase letter used by DFEN.
    pub const fn letter(self) -> char {
        match self {
            Power::Austria => 'A',
            Power::England => 'E',
            Power::France => 'F',
            Power::Germany => 'G',
            Power::Italy => 'I',
            Power::Russia => 'R',
            Power::Turkey => 'T',
        }
    }

    pub fn from_letter(c: char) -> Option<Power> {
        ALL_POWERS.iter().copied().find(|p| p.letter() == c)
    }

    pub fn from_name(name: &str) -> Option<Power> {
        let lower = name.trim().to_ascii_lowercase();
        ALL_POWERS.iter().copied().find(|p| p.name() == lower)
    }
}

impl fmt::Display for Power {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Power {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Power::from_name(s).ok_or_else(|| UnknownName(s.to_string()))
    }
}

/// Returned when a power or province name does not parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown name '{0}'")]
pub struct UnknownName(pub String);

/// Static metadata for one province.
#[derive(Debug)]
pub struct ProvinceInfo {
    pub abbr: &'static str,
    pub name: &'static str,
    pub terrain: Terrain,
    pub supply_center: bool,
    pub home: Option<Power>,
    pub coasts: &'static [Coast],
}

const NC: Coast = Coast::North;
const SC: Coast = Coast::South;
const EC: Coast = Coast::East;

use Terrain::{Coastal, Inland, Sea};

macro_rules! define_provinces {
    ($(
        $variant:ident => $abbr:literal, $name:literal, $terrain:ident,
        $sc:literal, $home:expr, $coasts:expr;
    )*) => {
        /// A province of the standard map, in alphabetical order of abbreviation.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u8)]
        pub enum Province {
            $($variant,)*
        }

        /// Every province in index order.
        pub const ALL_PROVINCES: [Province; PROVINCE_COUNT] = [$(Province::$variant,)*];

        static PROVINCE_INFO: [ProvinceInfo; PROVINCE_COUNT] = [
            $(ProvinceInfo {
                abbr: $abbr,
                name: $name,
                terrain: $terrain,
                supply_center: $sc,
                home: $home,
                coasts: $coasts,
            },)*
        ];
    };
}

define_provinces! {
    Adr => "adr", "Adriatic Sea", Sea, false, None, &[];
    Aeg => "aeg", "Aegean Sea", Sea, false, None, &[];
    Alb => "alb", "Albania", Coastal, false, None, &[];
    Ank => "ank", "Ankara", Coastal, true, Some(Power::Turkey), &[];
    Apu => "apu", "Apulia", Coastal, false, None, &[];
    Arm => "arm", "Armenia", Coastal, false, None, &[];
    Bal => "bal", "Baltic Sea", Sea, false, None, &[];
    Bar => "bar", "Barents Sea", Sea, false, None, &[];
    Bel => "bel", "Belgium", Coastal, true, None, &[];
    Ber => "ber", "Berlin", Coastal, true, Some(Power::Germany), &[];
    Bla => "bla", "Black Sea", Sea, false, None, &[];
    Boh => "boh", "Bohemia", Inland, false, None, &[];
    Bot => "bot", "Gulf of Bothnia", Sea, false, None, &[];
    Bre => "bre", "Brest", Coastal, true, Some(Power::France), &[];
    Bud => "bud", "Budapest", Inland, true, Some(Power::Austria), &[];
    Bul => "bul", "Bulgaria", Coastal, true, None, &[EC, SC];
    Bur => "bur", "Burgundy", Inland, false, None, &[];
    Cly => "cly", "Clyde", Coastal, false, None, &[];
    Con => "con", "Constantinople", Coastal, true, Some(Power::Turkey), &[];
    Den => "den", "Denmark", Coastal, true, None, &[];
    Eas => "eas", "Eastern Mediterranean", Sea, false, None, &[];
    Edi => "edi", "Edinburgh", Coastal, true, Some(Power::England), &[];
    Eng => "eng", "English Channel", Sea, false, None, &[];
    Fin => "fin", "Finland", Coastal, false, None, &[];
    Gal => "gal", "Galicia", Inland, false, None, &[];
    Gas => "gas", "Gascony", Coastal, false, None, &[];
    Gol => "gol", "Gulf of Lyon", Sea, false, None, &[];
    Gre => "gre", "Greece", Coastal, true, None, &[];
    Hel => "hel", "Heligoland Bight", Sea, false, None, &[];
    Hol => "hol", "Holland", Coastal, true, None, &[];
    Ion => "ion", "Ionian Sea", Sea, false, None, &[];
    Iri => "iri", "Irish Sea", Sea, false, None, &[];
    Kie => "kie", "Kiel", Coastal, true, Some(Power::Germany), &[];
    Lon => "lon", "London", Coastal, true, Some(Power::England), &[];
    Lvn => "lvn", "Livonia", Coastal, false, None, &[];
    Lvp => "lvp", "Liverpool", Coastal, true, Some(Power::England), &[];
    Mao => "mao", "Mid-Atlantic Ocean", Sea, false, None, &[];
    Mar => "mar", "Marseilles", Coastal, true, Some(Power::France), &[];
    Mos => "mos", "Moscow", Inland, true, Some(Power::Russia), &[];
    Mun => "mun", "Munich", Inland, true, Some(Power::Germany), &[];
    Naf => "naf", "North Africa", Coastal, false, None, &[];
    Nao => "nao", "North Atlantic Ocean", Sea, false, None, &[];
    Nap => "nap", "Naples", Coastal, true, Some(Power::Italy), &[];
    Nrg => "nrg", "Norwegian Sea", Sea, false, None, &[];
    Nth => "nth", "North Sea", Sea, false, None, &[];
    Nwy => "nwy", "Norway", Coastal, true, None, &[];
    Par => "par", "Paris", Inland, true, Some(Power::France), &[];
    Pic => "pic", "Picardy", Coastal, false, None, &[];
    Pie => "pie", "Piedmont", Coastal, false, None, &[];
    Por => "por", "Portugal", Coastal, true, None, &[];
    Pru => "pru", "Prussia", Coastal, false, None, &[];
    Rom => "rom", "Rome", Coastal, true, Some(Power::Italy), &[];
    Ruh => "ruh", "Ruhr", Inland, false, None, &[];
    Rum => "rum", "Rumania", Coastal, true, None, &[];
    Ser => "ser", "Serbia", Inland, true, None, &[];
    Sev => "sev", "Sevastopol", Coastal, true, Some(Power::Russia), &[];
    Sil => "sil", "Silesia", Inland, false, None, &[];
    Ska => "ska", "Skagerrak", Sea, false, None, &[];
    Smy => "smy", "Smyrna", Coastal, true, Some(Power::Turkey), &[];
    Spa => "spa", "Spain", Coastal, true, None, &[NC, SC];
    Stp => "stp", "St. Petersburg", Coastal, true, Some(Power::Russia), &[NC, SC];
    Swe => "swe", "Sweden", Coastal, true, None, &[];
    Syr => "syr", "Syria", Coastal, false, None, &[];
    Tri => "tri", "Trieste", Coastal, true, Some(Power::Austria), &[];
    Tun => "tun", "Tunisia", Coastal, true, None, &[];
    Tus => "tus", "Tuscany", Coastal, false, None, &[];
    Tyr => "tyr", "Tyrolia", Inland, false, None, &[];
    Tys => "tys", "Tyrrhenian Sea", Sea, false, None, &[];
    Ukr => "ukr", "Ukraine", Inland, false, None, &[];
    Ven => "ven", "Venice", Coastal, true, Some(Power::Italy), &[];
    Vie => "vie", "Vienna", Inland, true, Some(Power::Austria), &[];
    Wal => "wal", "Wales", Coastal, false, None, &[];
    War => "war", "Warsaw", Inland, true, Some(Power::Russia), &[];
    Wes => "wes", "Western Mediterranean", Sea, false, None, &[];
    Yor => "yor", "Yorkshire", Coastal, false, None, &[];
}

impl Province {
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn from_index(idx: usize) -> Option<Province> {
        ALL_PROVINCES.get(idx).copied()
    }

    #[inline]
    pub fn info(self) -> &'static ProvinceInfo {
        &PROVINCE_INFO[self as usize]
    }

    pub fn abbr(self) -> &'static str {
        self.info().abbr
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn terrain(self) -> Terrain {
        self.info().terrain
    }

    pub fn is_supply_center(self) -> bool {
        self.info().supply_center
    }

    /// The power this province is a home center of, if any.
    pub fn home_power(self) -> Option<Power> {
        self.info().home
    }

    pub fn coasts(self) -> &'static [Coast] {
        self.info().coasts
    }

    pub fn has_coasts(self) -> bool {
        !self.info().coasts.is_empty()
    }

    pub fn is_sea(self) -> bool {
        self.terrain() == Terrain::Sea
    }

    pub fn from_abbr(abbr: &str) -> Option<Province> {
        let lower = abbr.trim().to_ascii_lowercase();
        ALL_PROVINCES.iter().copied().find(|p| p.abbr() == lower)
    }
}

impl fmt::Display for Province {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbr())
    }
}

impl FromStr for Province {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Province::from_abbr(s).ok_or_else(|| UnknownName(s.to_string()))
    }
}

/// Every supply center in index order.
pub fn supply_centers() -> impl Iterator<Item = Province> {
    ALL_PROVINCES.iter().copied().filter(|p| p.is_supply_center())
}

/// Home supply centers of a power.
pub fn home_centers(power: Power) -> impl Iterator<Item = Province> {
    supply_centers().filter(move |p| p.home_power() == Some(power))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terrain_counts() {
        let count = |t: Terrain| ALL_PROVINCES.iter().filter(|p| p.terrain() == t).count();
        assert_eq!(count(Terrain::Inland), 14);
        assert_eq!(count(Terrain::Sea), 19);
        assert_eq!(count(Terrain::Coastal), 42);
    }

    #[test]
    fn supply_center_counts() {
        assert_eq!(supply_centers().count(), SUPPLY_CENTER_COUNT);
        assert_eq!(home_centers(Power::Russia).count(), 4);
        for p in ALL_POWERS.iter().filter(|p| **p != Power::Russia) {
            assert_eq!(home_centers(*p).count(), 3, "{p}");
        }
        let neutral = supply_centers().filter(|p| p.home_power().is_none()).count();
        assert_eq!(neutral, 12);
    }

    #[test]
    fn index_matches_table_order() {
        for (i, p) in ALL_PROVINCES.iter().enumerate() {
            assert_eq!(p.index(), i);
            assert_eq!(Province::from_index(i), Some(*p));
        }
        assert_eq!(Province::from_index(PROVINCE_COUNT), None);
        assert_eq!(Province::Yor.index(), 74);
    }

    #[test]
    fn abbreviation_lookup() {
        assert_eq!(Province::from_abbr("stp"), Some(Province::Stp));
        assert_eq!(Province::from_abbr("STP"), Some(Province::Stp));
        assert_eq!("xyz".parse::<Province>(), Err(UnknownName("xyz".into())));
        assert_eq!(Province::Nap.name(), "Naples");
    }

    #[test]
    fn split_coasts() {
        let split: Vec<_> = ALL_PROVINCES.iter().filter(|p| p.has_coasts()).collect();
        assert_eq!(split, vec![&Province::Bul, &Province::Spa, &Province::Stp]);
        assert_eq!(Province::Bul.coasts(), &[Coast::East, Coast::South]);
    }

    #[test]
    fn power_names_and_letters() {
        for p in ALL_POWERS {
            assert_eq!(Power::from_name(p.name()), Some(p));
            assert_eq!(Power::from_letter(p.letter()), Some(p));
        }
        assert_eq!("Turkey".parse::<Power>(), Ok(Power::Turkey));
        assert_eq!(serde_json::to_string(&Power::Italy).unwrap(), "\"italy\"");
    }
}
