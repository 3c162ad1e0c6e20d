//! Position evaluators.
//!
//! [`evaluate`] is the baseline used by search and lookahead.
//! [`evaluate_posture`] is the regret-matching tier's variant, which adds
//! lead, cohesion, chokepoint and solo-threat terms.

use crate::board::{GameState, Power, Province, Season, ALL_POWERS, SOLO_THRESHOLD};

use super::distance::nearest_unclaimed;
use super::threat::{province_defense, province_threat, unit_can_reach};

/// Sea provinces whose control shapes the map.
pub const CHOKEPOINTS: [Province; 10] = [
    Province::Eng,
    Province::Bla,
    Province::Aeg,
    Province::Ion,
    Province::Mao,
    Province::Wes,
    Province::Tys,
    Province::Nao,
    Province::Nth,
    Province::Bal,
];

#[inline]
pub fn is_chokepoint(p: Province) -> bool {
    CHOKEPOINTS.contains(&p)
}

/// Pending-capture and proximity terms summed over `power`'s units,
/// plus the unit count.
fn unit_terms(state: &GameState, power: Power, pending_bonus: f32) -> (f32, i32) {
    let mut score = 0.0;
    let mut units = 0;
    for (prov, unit) in state.units_of(power) {
        units += 1;
        if prov.is_supply_center() && state.owner(prov) != Some(power) {
            score += pending_bonus;
        }
        match nearest_unclaimed(unit.kind, prov, power, state) {
            Some((_, 0)) => score += 5.0,
            Some((_, d)) => score += 3.0 / d as f32,
            None => {}
        }
    }
    (score, units)
}

/// Sum of `threat - defense` over owned centers where threat wins.
fn exposure(state: &GameState, power: Power) -> i32 {
    crate::board::supply_centers()
        .filter(|&sc| state.owner(sc) == Some(power))
        .map(|sc| (province_threat(sc, power, state) - province_defense(sc, power, state)).max(0))
        .sum()
}

/// Scores `state` for `power`; higher is better.
pub fn evaluate(state: &GameState, power: Power) -> f32 {
    let own = state.supply_center_count(power) as i32;
    let mut score = 10.0 * own as f32;
    if own > 10 {
        let excess = (own - 10) as f32;
        score += excess * excess * 2.0;
    }
    if own >= SOLO_THRESHOLD as i32 {
        score += 500.0;
    }

    let pending = if state.season == Season::Fall { 12.0 } else { 8.0 };
    let (unit_score, units) = unit_terms(state, power, pending);
    score += unit_score + 2.0 * units as f32;

    let mut penalty = 2.0 * exposure(state, power) as f32;
    if own >= 16 {
        penalty *= 0.2;
    } else if own >= 14 {
        penalty *= 0.5;
    }
    score -= penalty;

    let mut total_enemy = 0;
    let mut max_enemy = 0;
    let mut alive_enemies = 0;
    for p in ALL_POWERS.into_iter().filter(|&p| p != power) {
        let sc = state.supply_center_count(p) as i32;
        total_enemy += sc;
        max_enemy = max_enemy.max(sc);
        if sc > 0 && state.is_alive(p) {
            alive_enemies += 1;
        }
    }
    score -= total_enemy as f32;
    score -= 0.5 * max_enemy as f32;
    score += (6 - alive_enemies) as f32 * 8.0;
    score
}

/// Scores `state` for `power` the way the posture tier compares futures.
pub fn evaluate_posture(state: &GameState, power: Power) -> f32 {
    let own = state.supply_center_count(power) as i32;
    let mut score = 15.0 * own as f32;
    if own >= 10 {
        score += 3.0 * (own - 9) as f32;
    }
    if own >= 15 {
        score += 10.0 * (own - 14) as f32;
    }

    let max_enemy = ALL_POWERS
        .into_iter()
        .filter(|&p| p != power)
        .map(|p| state.supply_center_count(p) as i32)
        .max()
        .unwrap_or(0);
    if own > max_enemy {
        score += 2.0 * (own - max_enemy) as f32;
    }

    let pending = if state.season == Season::Fall { 15.0 } else { 10.0 };
    let (unit_score, units) = unit_terms(state, power, pending);
    score += unit_score + 2.0 * units as f32;

    let mut penalty = 3.0 * exposure(state, power) as f32;
    if own >= 12 {
        penalty *= 0.5;
    }
    score -= penalty;
    score -= 1.5 * max_enemy as f32;

    let own_units: Vec<_> = state.units_of(power).collect();
    for (i, (prov, _)) in own_units.iter().enumerate() {
        let neighbors = own_units
            .iter()
            .enumerate()
            .filter(|(j, (op, ou))| *j != i && unit_can_reach(*op, ou.coast, ou.kind, *prov))
            .count();
        score += 0.5 * neighbors.min(3) as f32;
        if is_chokepoint(*prov) {
            score += 4.0;
        }
    }

    for p in ALL_POWERS.into_iter().filter(|&p| p != power) {
        score -= match state.supply_center_count(p) {
            16.. => 20.0,
            14..=15 => 10.0,
            12..=13 => 4.0,
            _ => 0.0,
        };
    }
    score
}
