//! Cheap forward simulation.
//!
//! Plays phases forward on clones of the position: the searching power uses
//! supplied movement and build policies (or fixed orders for the first
//! phase), every other live power uses the greedy heuristic, and retreats
//! are heuristic for everyone.

use std::time::Instant;

use rand::rngs::SmallRng;

use crate::board::{Action, BuildOrder, GameState, Order, Phase, Power, ALL_POWERS, PROVINCE_COUNT};
use crate::resolve::{
    advance_state, apply_builds, apply_resolution, apply_retreats, resolve_builds, resolve_retreats,
    Resolver,
};
use crate::strategy::heuristic;

/// Movement policy for the searching power during rollouts.
pub type MovePolicy<'a> = &'a (dyn Fn(&GameState, Power, &mut SmallRng) -> Vec<Order> + Sync);

/// Adjustment policy for the searching power during rollouts.
pub type BuildPolicy<'a> = &'a (dyn Fn(&GameState, Power, &mut SmallRng) -> Vec<BuildOrder> + Sync);

/// How the searching power plays during a rollout.
#[derive(Clone, Copy)]
pub struct Rollout<'a> {
    pub moves: MovePolicy<'a>,
    pub builds: BuildPolicy<'a>,
}

impl Rollout<'static> {
    /// Greedy heuristic for both movement and adjustments.
    pub fn heuristic() -> Self {
        Rollout { moves: &heuristic_policy, builds: &heuristic::build_orders }
    }
}

/// The greedy heuristic as a rollout policy.
pub fn heuristic_policy(state: &GameState, power: Power, rng: &mut SmallRng) -> Vec<Order> {
    heuristic::movement_orders(state, power, rng)
}

/// Heuristic movement orders for every live power except `power`.
pub fn predict_opponents(state: &GameState, power: Power, rng: &mut SmallRng) -> Vec<Order> {
    let mut orders = Vec::new();
    for p in ALL_POWERS {
        if p != power && state.is_alive(p) {
            orders.extend(heuristic::movement_orders(state, p, rng));
        }
    }
    orders
}

/// Plays the current phase of `state` and returns the following position.
///
/// `own` fixes the searching power's movement orders; otherwise `rollout`
/// chooses them.
pub fn simulate_phase(
    state: &GameState,
    power: Power,
    own: Option<&[Order]>,
    rollout: Rollout<'_>,
    resolver: &mut Resolver,
    rng: &mut SmallRng,
) -> GameState {
    let mut next = state.clone();
    match next.phase {
        Phase::Movement => {
            let mut orders = match own {
                Some(o) => o.to_vec(),
                None => (rollout.moves)(&next, power, rng),
            };
            orders.extend(predict_opponents(&next, power, rng));
            let (results, dislodged) = resolver.resolve(&orders, &next);
            apply_resolution(&mut next, &results, &dislodged);
            advance_state(&mut next, !dislodged.is_empty());
        }
        Phase::Retreat => {
            let mut orders = Vec::new();
            for p in ALL_POWERS {
                if next.has_dislodged_unit(p) {
                    orders.extend(heuristic::retreat_orders(&next, p, rng));
                }
            }
            let results = resolve_retreats(&orders, &next);
            apply_retreats(&mut next, &results);
            advance_state(&mut next, false);
        }
        Phase::Build => {
            let mut orders = Vec::new();
            for p in ALL_POWERS {
                if p == power {
                    orders.extend((rollout.builds)(&next, p, rng));
                } else if next.is_alive(p) {
                    orders.extend(heuristic::build_orders(&next, p, rng));
                }
            }
            let results = resolve_builds(&orders, &next);
            apply_builds(&mut next, &results);
            advance_state(&mut next, false);
        }
    }
    next
}

/// Limits on a multi-phase rollout.
#[derive(Debug, Clone, Copy)]
pub struct Horizon {
    pub phases: usize,
    /// Stop once the simulated year passes this one.
    pub last_year: Option<u16>,
    pub deadline: Instant,
}

/// Chains [`simulate_phase`], using `first` only for the first phase.
/// Stops early at the deadline or the year cap.
pub fn simulate_ahead(
    state: &GameState,
    power: Power,
    first: Option<&[Order]>,
    horizon: Horizon,
    rollout: Rollout<'_>,
    resolver: &mut Resolver,
    rng: &mut SmallRng,
) -> GameState {
    let mut current = state.clone();
    for i in 0..horizon.phases {
        if Instant::now() >= horizon.deadline || horizon.last_year.is_some_and(|y| current.year > y)
        {
            break;
        }
        let own = if i == 0 { first } else { None };
        current = simulate_phase(&current, power, own, rollout, resolver, rng);
    }
    current
}

/// Turns every later move into an already claimed destination into a hold.
pub fn dedup_move_targets(orders: &mut [Order]) {
    let mut claimed = [false; PROVINCE_COUNT];
    for o in orders.iter_mut() {
        let Action::Move { to } = o.action else { continue };
        let idx = to.province.index();
        if claimed[idx] {
            *o = o.as_hold();
        } else {
            claimed[idx] = true;
        }
    }
}
