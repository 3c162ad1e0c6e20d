//! DFEN: a one-line position notation in the spirit of chess FEN.
//!
//! `<year><season><phase>/<units>/<centers>/<dislodged>`, for example
//! `1901sm/Aavie,...,Rfstp.sc/Abud,...,Nbel/-`. Units are power letter, unit
//! letter and location (`prov` or `prov.coast`); centers are an owner letter
//! (`N` for neutral) and a province; dislodged units add `<attacker`. Empty
//! lists are written `-`.

use std::fmt::Write as _;

use thiserror::Error;

use crate::board::{
    Coast, Dislodged, GameState, Phase, Power, Province, Season, Unit, UnitKind, ALL_POWERS,
    ALL_PROVINCES,
};

/// The standard starting position.
pub const INITIAL_DFEN: &str = concat!(
    "1901sm/Aavie,Aabud,Aftri,Eflon,Efedi,Ealvp,Ffbre,Fapar,Famar,Gfkie,Gaber,Gamun,Ifnap,Iarom,",
    "Iaven,Rfstp.sc,Ramos,Rawar,Rfsev,Tfank,Tacon,Tasmy/Abud,Atri,Avie,Eedi,Elon,Elvp,Fbre,Fmar,",
    "Fpar,Gber,Gkie,Gmun,Inap,Irom,Iven,Rmos,Rsev,Rstp,Rwar,Tank,Tcon,Tsmy,Nbel,Nbul,Nden,Ngre,",
    "Nhol,Nnwy,Npor,Nrum,Nser,Nspa,Nswe,Ntun/-",
);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DfenError {
    #[error("expected 4 sections separated by '/', got {0}")]
    SectionCount(usize),
    #[error("bad phase info '{0}'")]
    PhaseInfo(String),
    #[error("unknown power letter '{0}'")]
    Power(char),
    #[error("unknown unit letter '{0}'")]
    UnitKind(char),
    #[error("unknown province '{0}'")]
    Province(String),
    #[error("bad coast '{0}'")]
    Coast(String),
    #[error("malformed entry '{0}'")]
    Entry(String),
    #[error("'{0}' is not a supply center")]
    NotACenter(String),
    #[error("'{0}' listed twice")]
    Duplicate(String),
}

fn parse_location(s: &str) -> Result<(Province, Coast), DfenError> {
    let (prov, coast) = match s.split_once('.') {
        Some((p, c)) => {
            let coast = Coast::from_abbr(c)
                .filter(|&c| c != Coast::None)
                .ok_or_else(|| DfenError::Coast(c.into()))?;
            (p, coast)
        }
        None => (s, Coast::None),
    };
    let province = Province::from_abbr(prov).ok_or_else(|| DfenError::Province(prov.into()))?;
    if coast != Coast::None && !province.coasts().contains(&coast) {
        return Err(DfenError::Coast(s.into()));
    }
    Ok((province, coast))
}

fn parse_phase_info(s: &str) -> Result<(u16, Season, Phase), DfenError> {
    let bad = || DfenError::PhaseInfo(s.to_string());
    let mut tail = s.chars().rev();
    let (Some(phase), Some(season)) = (tail.next(), tail.next()) else {
        return Err(bad());
    };
    let year_str = s.get(..s.len().saturating_sub(2)).ok_or_else(bad)?;
    let year = year_str.parse().map_err(|_| bad())?;
    let season = Season::from_letter(season).ok_or_else(bad)?;
    let phase = Phase::from_letter(phase).ok_or_else(bad)?;
    Ok((year, season, phase))
}

/// `Aavie`, `Rfstp.sc`: power, kind, location.
fn parse_unit(entry: &str) -> Result<(Province, Unit), DfenError> {
    let mut chars = entry.chars();
    let (Some(p), Some(k)) = (chars.next(), chars.next()) else {
        return Err(DfenError::Entry(entry.into()));
    };
    let power = Power::from_letter(p).ok_or(DfenError::Power(p))?;
    let kind = UnitKind::from_letter(k).ok_or(DfenError::UnitKind(k))?;
    let (province, coast) = parse_location(chars.as_str())?;
    if coast != Coast::None && kind == UnitKind::Army {
        return Err(DfenError::Coast(entry.into()));
    }
    Ok((province, Unit { power, kind, coast }))
}

fn entries(section: &str) -> impl Iterator<Item = &str> {
    section.split(',').filter(|e| !e.is_empty() && *e != "-")
}

/// Parses a DFEN string.
pub fn parse_dfen(s: &str) -> Result<GameState, DfenError> {
    let sections: Vec<&str> = s.trim().split('/').collect();
    let [info, units, centers, dislodged] = sections[..] else {
        return Err(DfenError::SectionCount(sections.len()));
    };

    let (year, season, phase) = parse_phase_info(info)?;
    let mut state = GameState::empty(year, season, phase);

    for entry in entries(units) {
        let (province, unit) = parse_unit(entry)?;
        if !state.place(province, unit) {
            return Err(DfenError::Duplicate(province.abbr().into()));
        }
    }

    let mut listed = [false; crate::board::PROVINCE_COUNT];
    for entry in entries(centers) {
        let mut chars = entry.chars();
        let letter = chars.next().ok_or_else(|| DfenError::Entry(entry.into()))?;
        let owner = match letter {
            'N' => None,
            c => Some(Power::from_letter(c).ok_or(DfenError::Power(c))?),
        };
        let abbr = chars.as_str();
        let province = Province::from_abbr(abbr).ok_or_else(|| DfenError::Province(abbr.into()))?;
        if !province.is_supply_center() {
            return Err(DfenError::NotACenter(abbr.into()));
        }
        if std::mem::replace(&mut listed[province.index()], true) {
            return Err(DfenError::Duplicate(abbr.into()));
        }
        state.set_owner(province, owner);
    }

    for entry in entries(dislodged) {
        let (unit_part, attacker) =
            entry.split_once('<').ok_or_else(|| DfenError::Entry(entry.into()))?;
        let (province, unit) = parse_unit(unit_part)?;
        let attacker_from =
            Province::from_abbr(attacker).ok_or_else(|| DfenError::Province(attacker.into()))?;
        let slot = &mut state.dislodged[province.index()];
        if slot.is_some() {
            return Err(DfenError::Duplicate(province.abbr().into()));
        }
        *slot = Some(Dislodged { unit, attacker_from });
    }

    Ok(state)
}

fn push_location(out: &mut String, province: Province, coast: Coast) {
    out.push_str(province.abbr());
    if coast != Coast::None {
        out.push('.');
        out.push_str(coast.abbr());
    }
}

fn push_list(out: &mut String, items: Vec<String>) {
    if items.is_empty() {
        out.push('-');
    } else {
        out.push_str(&items.join(","));
    }
}

/// Canonical DFEN for `state`: entries grouped by power in standard order,
/// provinces in index order within a group, neutral centers last.
pub fn encode_dfen(state: &GameState) -> String {
    let mut out = String::with_capacity(512);
    let _ = write!(out, "{}{}{}/", state.year, state.season.letter(), state.phase.letter());

    let mut units = Vec::new();
    let mut dislodged = Vec::new();
    for power in ALL_POWERS {
        for &prov in ALL_PROVINCES.iter() {
            if let Some(u) = state.unit_at(prov).filter(|u| u.power == power) {
                let mut e = format!("{}{}", power.letter(), u.kind.letter().to_ascii_lowercase());
                push_location(&mut e, prov, u.coast);
                units.push(e);
            }
            if let Some(d) = state.dislodged[prov.index()].filter(|d| d.unit.power == power) {
                let kind = d.unit.kind.letter().to_ascii_lowercase();
                let mut e = format!("{}{}", power.letter(), kind);
                push_location(&mut e, prov, d.unit.coast);
                let _ = write!(e, "<{}", d.attacker_from.abbr());
                dislodged.push(e);
            }
        }
    }

    let mut centers = Vec::new();
    for owner in ALL_POWERS.map(Some).into_iter().chain([None]) {
        for sc in crate::board::supply_centers().filter(|&sc| state.owner(sc) == owner) {
            let letter = owner.map_or('N', Power::letter);
            centers.push(format!("{letter}{}", sc.abbr()));
        }
    }

    push_list(&mut out, units);
    out.push('/');
    push_list(&mut out, centers);
    out.push('/');
    push_list(&mut out, dislodged);
    out
}
