//! Regret-matching arbiter (RM+).
//!
//! Treats a pool of candidate order sets as the actions of a repeated game
//! against sampled opponent profiles. Cumulative regret is discounted every
//! iteration and clipped at zero; the answer is the candidate with the
//! highest time-averaged probability, not the best one-shot score.

use std::time::Instant;

use log::debug;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::board::{GameState, Order, Power};
use crate::config::EngineConfig;
use crate::eval::evaluate_posture;
use crate::resolve::{advance_state, apply_resolution, Resolver};

use super::simulate::{simulate_ahead, Horizon, Rollout};

/// Per-candidate regret bookkeeping for one decision.
#[derive(Debug, Clone)]
pub struct RegretState {
    regret: Vec<f32>,
    strategy: Vec<f32>,
    weight: Vec<f32>,
}

impl RegretState {
    pub fn new(n: usize) -> Self {
        RegretState { regret: vec![0.0; n], strategy: vec![0.0; n], weight: vec![0.0; n] }
    }

    pub fn len(&self) -> usize {
        self.regret.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regret.is_empty()
    }

    /// Seeds cumulative regret from prior values, clipped at zero.
    pub fn warm_start(&mut self, values: &[f32]) {
        for (r, &v) in self.regret.iter_mut().zip(values) {
            *r = v.max(0.0);
        }
    }

    pub fn discount(&mut self, factor: f32) {
        for r in &mut self.regret {
            *r *= factor;
        }
    }

    /// Distribution proportional to regret; uniform when all regret is zero.
    pub fn current_strategy(&mut self) -> &[f32] {
        let total: f32 = self.regret.iter().sum();
        if total > 0.0 {
            for (s, r) in self.strategy.iter_mut().zip(&self.regret) {
                *s = r / total;
            }
        } else {
            let uniform = 1.0 / self.regret.len().max(1) as f32;
            self.strategy.fill(uniform);
        }
        &self.strategy
    }

    /// Draws an index from the last computed strategy.
    pub fn sample(&self, rng: &mut impl Rng) -> usize {
        let r: f32 = rng.gen();
        let mut cum = 0.0;
        for (i, &p) in self.strategy.iter().enumerate() {
            cum += p;
            if r < cum {
                return i;
            }
        }
        self.strategy.len().saturating_sub(1)
    }

    /// Adds `max(0, regret + value - base)` for every counterfactual.
    pub fn update(&mut self, base: f32, counterfactuals: &[(usize, f32)]) {
        for &(i, value) in counterfactuals {
            self.regret[i] = (self.regret[i] + value - base).max(0.0);
        }
    }

    /// Adds the current strategy to the running weights.
    pub fn accumulate(&mut self) {
        for (w, s) in self.weight.iter_mut().zip(&self.strategy) {
            *w += s;
        }
    }

    /// Highest accumulated weight. Before any iteration, highest regret.
    pub fn best(&self) -> usize {
        let source = if self.weight.iter().any(|&w| w > 0.0) { &self.weight } else { &self.regret };
        source
            .iter()
            .enumerate()
            .max_by(|(i, a), (j, b)| a.total_cmp(b).then(j.cmp(i)))
            .map_or(0, |(i, _)| i)
    }

    pub fn regrets(&self) -> &[f32] {
        &self.regret
    }

    pub fn weights(&self) -> &[f32] {
        &self.weight
    }
}

/// Loop limits for [`run_regret_matching`].
#[derive(Debug, Clone, Copy)]
pub struct RegretLimits {
    pub iterations: usize,
    pub discount: f32,
    pub deadline: Instant,
}

/// Runs RM+ over `n` candidates and `samples` opponent profiles.
///
/// `value(candidate, sample, rng)` scores one pairing. The counterfactual
/// sweep runs in parallel, each worker on a child rng seeded from `rng`, so
/// a seeded run is reproducible.
pub fn run_regret_matching<F>(
    n: usize,
    samples: usize,
    warm: &[f32],
    limits: RegretLimits,
    rng: &mut SmallRng,
    value: F,
) -> RegretState
where
    F: Fn(usize, usize, &mut SmallRng) -> f32 + Sync,
{
    let mut rm = RegretState::new(n);
    rm.warm_start(warm);
    if n <= 1 || samples == 0 {
        return rm;
    }

    for iter in 0..limits.iterations {
        if iter > 0 && Instant::now() >= limits.deadline {
            debug!("regret matching stopped at deadline after {iter} iterations");
            break;
        }
        rm.discount(limits.discount);
        rm.current_strategy();
        let sampled = rm.sample(rng);
        let profile = iter % samples;
        let base = value(sampled, profile, rng);

        let seeds: Vec<u64> = (0..n).map(|_| rng.gen()).collect();
        let counterfactuals: Vec<(usize, f32)> = (0..n)
            .into_par_iter()
            .filter(|&j| j != sampled)
            .map(|j| {
                let mut child = SmallRng::seed_from_u64(seeds[j]);
                (j, value(j, profile, &mut child))
            })
            .collect();

        rm.update(base, &counterfactuals);
        rm.accumulate();
    }
    rm
}

/// Penalty for attacking more than one rival in a single order set.
///
/// A move attacks the owner of a targeted center and the owner of any unit
/// standing on the target.
pub fn cooperation_penalty(
    orders: &[Order],
    state: &GameState,
    power: Power,
    per_rival: f32,
) -> f32 {
    let mut attacked = [false; 7];
    for dst in orders.iter().filter_map(Order::move_target) {
        if let Some(owner) = state.owner(dst).filter(|&o| o != power) {
            attacked[owner.index()] = true;
        }
        if let Some(unit) = state.unit_at(dst).filter(|u| u.power != power) {
            attacked[unit.power.index()] = true;
        }
    }
    let count = attacked.iter().filter(|&&a| a).count();
    if count <= 1 {
        0.0
    } else {
        per_rival * (count - 1) as f32
    }
}

/// Inputs to a game-level arbitration.
pub struct Arbitration<'a> {
    pub state: &'a GameState,
    pub power: Power,
    pub candidates: &'a [Vec<Order>],
    /// Sampled opponent order profiles; at least one.
    pub opponents: &'a [Vec<Order>],
    pub config: &'a EngineConfig,
    /// Own play during rollouts.
    pub rollout: Rollout<'a>,
    pub deadline: Instant,
}

fn resolved_next(
    state: &GameState,
    own: &[Order],
    opponents: &[Order],
    resolver: &mut Resolver,
) -> GameState {
    let mut all = Vec::with_capacity(own.len() + opponents.len());
    all.extend_from_slice(own);
    all.extend_from_slice(opponents);
    let (results, dislodged) = resolver.resolve(&all, state);
    let mut next = state.clone();
    apply_resolution(&mut next, &results, &dislodged);
    advance_state(&mut next, !dislodged.is_empty());
    next
}

/// Index of the candidate RM+ settles on.
pub fn select_candidate(arb: &Arbitration<'_>, rng: &mut SmallRng) -> usize {
    let n = arb.candidates.len();
    if n <= 1 || arb.opponents.is_empty() {
        return 0;
    }
    let cfg = arb.config;
    let penalties: Vec<f32> = arb
        .candidates
        .iter()
        .map(|c| cooperation_penalty(c, arb.state, arb.power, cfg.cooperation_penalty))
        .collect();

    let mut resolver = Resolver::default();
    let warm: Vec<f32> = arb
        .candidates
        .iter()
        .zip(&penalties)
        .map(|(c, pen)| {
            let next = resolved_next(arb.state, c, &arb.opponents[0], &mut resolver);
            evaluate_posture(&next, arb.power) - pen
        })
        .collect();

    let horizon = Horizon {
        phases: cfg.lookahead_phases,
        last_year: Some(arb.state.year + cfg.lookahead_years),
        deadline: arb.deadline,
    };
    let limits = RegretLimits {
        iterations: cfg.rm_iterations,
        discount: cfg.regret_discount,
        deadline: arb.deadline,
    };

    let rm = run_regret_matching(n, arb.opponents.len(), &warm, limits, rng, |ci, si, rng| {
        let mut resolver = Resolver::default();
        let next =
            resolved_next(arb.state, &arb.candidates[ci], &arb.opponents[si], &mut resolver);
        let future =
            simulate_ahead(&next, arb.power, None, horizon, arb.rollout, &mut resolver, rng);
        evaluate_posture(&future, arb.power) - penalties[ci]
    });

    let best = rm.best();
    debug!(
        "{} arbitration: {} candidates, chose {} (weight {:.2})",
        arb.power,
        n,
        best,
        rm.weights()[best]
    );
    best
}
