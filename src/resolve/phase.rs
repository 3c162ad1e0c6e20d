//! Phase sequencing.
//!
//! Spring Movement -> (Spring Retreat) -> Fall Movement -> (Fall Retreat)
//! -> Build -> Spring Movement of the next year. The Build phase is
//! skipped when nobody has an adjustment to make.

use crate::board::{GameState, Phase, Power, Season, ALL_POWERS, PROVINCE_COUNT, SOLO_THRESHOLD};

/// The (season, phase) that follows the current one, before the
/// empty-build-phase skip is applied.
pub fn next_phase(state: &GameState, has_dislodgements: bool) -> (Season, Phase) {
    match state.phase {
        Phase::Movement if has_dislodgements => (state.season, Phase::Retreat),
        Phase::Movement | Phase::Retreat => match state.season {
            Season::Spring => (Season::Fall, Phase::Movement),
            Season::Fall => (Season::Fall, Phase::Build),
        },
        Phase::Build => (Season::Spring, Phase::Movement),
    }
}

/// True if some power's unit count differs from its center count.
pub fn needs_build_phase(state: &GameState) -> bool {
    ALL_POWERS.iter().any(|&p| state.adjustment_delta(p) != 0)
}

/// Centers are taken by whoever stands on them; empty centers keep their owner.
pub fn update_sc_ownership(state: &mut GameState) {
    for i in 0..PROVINCE_COUNT {
        if let (Some(unit), Some(prov)) = (state.units[i], crate::board::Province::from_index(i)) {
            if prov.is_supply_center() {
                state.sc_owner[i] = Some(unit.power);
            }
        }
    }
}

/// Moves `state` to the next phase.
///
/// Ownership is updated after Fall movement and Fall retreats, the year
/// advances on entering Spring, and the dislodged set is cleared unless a
/// retreat phase follows.
pub fn advance_state(state: &mut GameState, has_dislodgements: bool) {
    let (mut season, mut phase) = next_phase(state, has_dislodgements);

    if state.season == Season::Fall
        && matches!(state.phase, Phase::Movement | Phase::Retreat)
        && phase != Phase::Retreat
    {
        update_sc_ownership(state);
    }

    if phase == Phase::Build && !needs_build_phase(state) {
        season = Season::Spring;
        phase = Phase::Movement;
    }

    if season == Season::Spring && state.season == Season::Fall {
        state.year += 1;
    }

    state.season = season;
    state.phase = phase;
    if phase != Phase::Retreat {
        state.dislodged = [None; PROVINCE_COUNT];
    }
}

/// The power holding at least 18 centers, if any.
pub fn is_game_over(state: &GameState) -> Option<Power> {
    ALL_POWERS.into_iter().find(|&p| state.supply_center_count(p) >= SOLO_THRESHOLD)
}
