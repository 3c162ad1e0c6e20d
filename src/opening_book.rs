//! Conditional opening book.
//!
//! Entries are keyed by power, year, season and phase, and carry a
//! condition scored against the position plus weighted order options. The
//! default book covers Spring and Fall 1901 for every power and is embedded
//! in the binary.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::warn;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::{
    Coast, GameState, Location, Order, Phase, Power, Province, Season, UnitKind, PROVINCE_COUNT,
};
use crate::diplomacy::stance::{border_pressure, classify_neighbor_stances, Stance};
use crate::diplomacy::theater::{theater_presence, Theater};
use crate::resolve::validate_order;

const EMBEDDED_BOOK: &str = include_str!("../data/opening_book.json");

#[derive(Debug, Error)]
pub enum BookError {
    #[error("failed to read opening book: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse opening book: {0}")]
    Json(#[from] serde_json::Error),
}

/// The full opening book.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpeningBook {
    pub entries: Vec<BookEntry>,
}

/// A single conditional entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookEntry {
    pub power: Power,
    pub year: u16,
    pub season: Season,
    pub phase: Phase,
    #[serde(default)]
    pub condition: BookCondition,
    pub options: Vec<BookOption>,
}

/// Matching criteria. Fields are AND-ed in exact mode and contribute to a
/// weighted score in hybrid mode. Empty fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BookCondition {
    /// Province abbreviation to the kind of own unit expected there.
    pub positions: HashMap<String, UnitKind>,
    pub owned_scs: Vec<String>,
    pub sc_count_min: u32,
    pub sc_count_max: u32,
    pub neighbor_stance: HashMap<Power, Stance>,
    pub border_pressure: i32,
    /// Minimum own units per theater.
    pub theaters: HashMap<Theater, u32>,
    pub fleet_count: u32,
    pub army_count: u32,
}

/// A named, weighted set of orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookOption {
    pub name: String,
    pub weight: f64,
    pub orders: Vec<OrderInput>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookOrderKind {
    Hold,
    Move,
    Support,
    Convoy,
}

/// One order as written in the book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderInput {
    pub unit_type: UnitKind,
    pub location: String,
    #[serde(default)]
    pub coast: String,
    pub order_type: BookOrderKind,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub target_coast: String,
    #[serde(default)]
    pub aux_loc: String,
    #[serde(default)]
    pub aux_target: String,
    #[serde(default)]
    pub aux_unit_type: Option<UnitKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    Exact,
    Hybrid,
}

/// Weights for condition scoring, passed explicitly to every lookup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookMatchConfig {
    pub mode: MatchMode,
    pub min_score: f64,
    pub position_weight: f64,
    pub owned_sc_weight: f64,
    pub sc_count_weight: f64,
    pub neighbor_weight: f64,
    pub border_press_weight: f64,
    pub theater_weight: f64,
    pub fleet_army_weight: f64,
}

impl Default for BookMatchConfig {
    fn default() -> Self {
        BookMatchConfig {
            mode: MatchMode::Hybrid,
            min_score: 1.0,
            position_weight: 10.0,
            owned_sc_weight: 3.0,
            sc_count_weight: 1.0,
            neighbor_weight: 5.0,
            border_press_weight: 2.0,
            theater_weight: 2.0,
            fleet_army_weight: 1.5,
        }
    }
}

impl OpeningBook {
    pub fn from_json(json: &str) -> Result<Self, BookError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, BookError> {
        let data = fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    /// The book compiled into the crate.
    pub fn embedded() -> Result<Self, BookError> {
        Self::from_json(EMBEDDED_BOOK)
    }

    /// Book orders for `power`, or `None` when nothing matches.
    ///
    /// Matching entries are tried best score first. Within an entry an
    /// option is drawn by weight; it is returned only if every order
    /// validates and the set covers every unit, otherwise the next option
    /// is drawn.
    pub fn lookup(
        &self,
        state: &GameState,
        power: Power,
        cfg: &BookMatchConfig,
        rng: &mut impl Rng,
    ) -> Option<Vec<Order>> {
        let mut matches: Vec<(&BookEntry, f64)> = self
            .entries
            .iter()
            .filter(|e| {
                e.year == state.year
                    && e.season == state.season
                    && e.phase == state.phase
                    && e.power == power
            })
            .filter_map(|e| score_condition(&e.condition, state, power, cfg).map(|s| (e, s)))
            .filter(|(_, s)| *s >= cfg.min_score)
            .collect();
        matches.sort_by(|a, b| b.1.total_cmp(&a.1));

        for (entry, _) in matches {
            let mut remaining: Vec<&BookOption> = entry.options.iter().collect();
            while let Some(idx) = weighted_index(&remaining, rng) {
                let option = remaining.swap_remove(idx);
                match convert_orders(&option.orders, power) {
                    Some(orders) if covers_units(&orders, state, power) => return Some(orders),
                    _ => warn!("{power}: book option '{}' does not fit the position", option.name),
                }
            }
        }
        None
    }
}

fn weighted_index(options: &[&BookOption], rng: &mut impl Rng) -> Option<usize> {
    if options.is_empty() {
        return None;
    }
    let total: f64 = options.iter().map(|o| o.weight.max(0.0)).sum();
    if total <= 0.0 {
        return Some(0);
    }
    let r = rng.gen::<f64>() * total;
    let mut cum = 0.0;
    for (i, opt) in options.iter().enumerate() {
        cum += opt.weight.max(0.0);
        if r < cum {
            return Some(i);
        }
    }
    Some(options.len() - 1)
}

/// Adds `matched * weight` in hybrid mode; in exact mode every field must
/// match and the full weight is added.
fn tally(matched: usize, fields: usize, weight: f64, mode: MatchMode) -> Option<f64> {
    match mode {
        MatchMode::Exact if matched != fields => None,
        MatchMode::Exact => Some(fields as f64 * weight),
        MatchMode::Hybrid => Some(matched as f64 * weight),
    }
}

/// Match score of `cond`; `None` on a hard mismatch in exact mode.
fn score_condition(
    cond: &BookCondition,
    state: &GameState,
    power: Power,
    cfg: &BookMatchConfig,
) -> Option<f64> {
    let mut score = 0.0;

    if !cond.positions.is_empty() {
        let matched = cond
            .positions
            .iter()
            .filter(|(abbr, kind)| {
                Province::from_abbr(abbr)
                    .and_then(|p| state.unit_at(p))
                    .is_some_and(|u| u.power == power && u.kind == **kind)
            })
            .count();
        score += tally(matched, cond.positions.len(), cfg.position_weight, cfg.mode)?;
    }

    if !cond.owned_scs.is_empty() {
        let matched = cond
            .owned_scs
            .iter()
            .filter(|abbr| Province::from_abbr(abbr).is_some_and(|p| state.owner(p) == Some(power)))
            .count();
        score += tally(matched, cond.owned_scs.len(), cfg.owned_sc_weight, cfg.mode)?;
    }

    if cond.sc_count_min > 0 || cond.sc_count_max > 0 {
        let count = state.supply_center_count(power) as u32;
        let in_range = (cond.sc_count_min == 0 || count >= cond.sc_count_min)
            && (cond.sc_count_max == 0 || count <= cond.sc_count_max);
        score += tally(in_range as usize, 1, cfg.sc_count_weight, cfg.mode)?;
    }

    if !cond.neighbor_stance.is_empty() {
        let stances = classify_neighbor_stances(state, power);
        let matched =
            cond.neighbor_stance.iter().filter(|(p, s)| stances[p.index()] == Some(**s)).count();
        score += tally(matched, cond.neighbor_stance.len(), cfg.neighbor_weight, cfg.mode)?;
    }

    if cond.border_pressure > 0 {
        let diff = (border_pressure(state, power) as i32 - cond.border_pressure).abs();
        score += tally((diff <= 1) as usize, 1, cfg.border_press_weight, cfg.mode)?;
    }

    if !cond.theaters.is_empty() {
        let presence = theater_presence(state, power);
        let matched =
            cond.theaters.iter().filter(|(t, n)| presence[t.index()] as u32 >= **n).count();
        score += tally(matched, cond.theaters.len(), cfg.theater_weight, cfg.mode)?;
    }

    let fa_fields = (cond.fleet_count > 0) as usize + (cond.army_count > 0) as usize;
    if fa_fields > 0 {
        let (fleets, armies) = fleet_army_count(state, power);
        let matched = (cond.fleet_count > 0 && fleets == cond.fleet_count) as usize
            + (cond.army_count > 0 && armies == cond.army_count) as usize;
        score += tally(matched, fa_fields, cfg.fleet_army_weight, cfg.mode)?;
    }

    Some(score)
}

fn fleet_army_count(state: &GameState, power: Power) -> (u32, u32) {
    state.units_of(power).fold((0, 0), |(f, a), (_, u)| match u.kind {
        UnitKind::Fleet => (f + 1, a),
        UnitKind::Army => (f, a + 1),
    })
}

/// Exactly one valid order per unit of `power`.
fn covers_units(orders: &[Order], state: &GameState, power: Power) -> bool {
    let mut seen = [false; PROVINCE_COUNT];
    for o in orders {
        if validate_order(o, state).is_err() || seen[o.province().index()] {
            return false;
        }
        seen[o.province().index()] = true;
    }
    orders.len() == state.unit_count(power)
}

fn convert_orders(inputs: &[OrderInput], power: Power) -> Option<Vec<Order>> {
    inputs.iter().map(|i| convert_order(i, power)).collect()
}

fn coast(s: &str) -> Coast {
    Coast::from_abbr(s).unwrap_or(Coast::None)
}

fn convert_order(input: &OrderInput, power: Power) -> Option<Order> {
    let at = Location::with_coast(Province::from_abbr(&input.location)?, coast(&input.coast));
    let kind = input.unit_type;

    match input.order_type {
        BookOrderKind::Hold => Some(Order::hold(power, kind, at)),
        BookOrderKind::Move => {
            let target = Province::from_abbr(&input.target)?;
            let to = Location::with_coast(target, coast(&input.target_coast));
            Some(Order::moving(power, kind, at, to))
        }
        BookOrderKind::Support => {
            let aux_kind = input.aux_unit_type?;
            let from = Province::from_abbr(&input.aux_loc)?;
            if input.aux_target.is_empty() {
                Some(Order::support_hold(power, kind, at, from, aux_kind))
            } else {
                let to = Province::from_abbr(&input.aux_target)?;
                Some(Order::support_move(power, kind, at, from, to, aux_kind))
            }
        }
        BookOrderKind::Convoy => {
            let from = Province::from_abbr(&input.aux_loc)?;
            let to = Province::from_abbr(&input.aux_target)?;
            Some(Order::convoy(power, at, from, to))
        }
    }
}
