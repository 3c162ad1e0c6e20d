//! Combination search over per-unit candidate lists.
//!
//! Enumerates the Cartesian product of candidates with an odometer index,
//! resolving each combination against a fixed set of opponent orders and
//! scoring the resulting position.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Instant;

use crate::board::{Action, GameState, Order, Power, PROVINCE_COUNT};
use crate::eval::evaluate;
use crate::resolve::{apply_resolution, validate_order, Resolver};

/// An order combination with its evaluated score.
#[derive(Debug, Clone)]
pub struct RankedCombo {
    pub orders: Vec<Order>,
    pub score: f32,
}

impl PartialEq for RankedCombo {
    fn eq(&self, other: &Self) -> bool {
        self.score.total_cmp(&other.score) == Ordering::Equal
    }
}

impl Eq for RankedCombo {}

impl PartialOrd for RankedCombo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RankedCombo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score.total_cmp(&other.score)
    }
}

/// Limits for one enumeration.
#[derive(Debug, Clone, Copy)]
pub struct SearchLimits {
    /// Maximum combinations examined.
    pub budget: usize,
    pub deadline: Instant,
    /// Combinations between clock reads.
    pub check_interval: usize,
}

/// Counters from one enumeration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub combos: usize,
    pub timed_out: bool,
}

/// Repairs own support-move orders whose supported unit does something else
/// in the same combination: redirect to the real destination, else
/// support-hold, else hold.
pub fn sanitize_combo(combo: &mut [Order], state: &GameState) {
    let mut own = [false; PROVINCE_COUNT];
    let mut dest = [None; PROVINCE_COUNT];
    for o in combo.iter() {
        own[o.province().index()] = true;
        if let Action::Move { to } = o.action {
            dest[o.province().index()] = Some(to.province);
        }
    }

    for o in combo.iter_mut() {
        let Action::SupportMove { from, to, kind } = o.action else { continue };
        if !own[from.index()] {
            continue;
        }
        let actual = dest[from.index()];
        if actual == Some(to) {
            continue;
        }
        if let Some(real) = actual {
            let redirected = Order::support_move(o.power, o.kind, o.at, from, real, kind);
            if validate_order(&redirected, state).is_ok() {
                *o = redirected;
                continue;
            }
        }
        let hold_support = Order::support_hold(o.power, o.kind, o.at, from, kind);
        *o = if validate_order(&hold_support, state).is_ok() { hold_support } else { o.as_hold() };
    }
}

/// Steps the odometer; false once every combination has been visited.
fn advance(indices: &mut [usize], lists: &[Vec<Order>]) -> bool {
    for i in (0..indices.len()).rev() {
        indices[i] += 1;
        if indices[i] < lists[i].len() {
            return true;
        }
        indices[i] = 0;
    }
    false
}

/// Drives the enumeration, handing each sanitized combination and its score
/// to `visit`.
fn enumerate(
    state: &GameState,
    power: Power,
    unit_orders: &[Vec<Order>],
    opponent_orders: &[Order],
    limits: SearchLimits,
    mut visit: impl FnMut(&[Order], f32),
) -> SearchStats {
    let n = unit_orders.len();
    let mut stats = SearchStats::default();
    if unit_orders.iter().any(|l| l.is_empty()) {
        return stats;
    }

    let mut indices = vec![0usize; n];
    let mut combo: Vec<Order> = unit_orders.iter().map(|l| l[0]).collect();
    let mut all: Vec<Order> = Vec::with_capacity(n + opponent_orders.len());
    let mut resolver = Resolver::new(n + opponent_orders.len());
    let mut scratch = state.clone();
    let interval = limits.check_interval.max(1);

    loop {
        for (slot, (list, &idx)) in combo.iter_mut().zip(unit_orders.iter().zip(&indices)) {
            *slot = list[idx];
        }
        sanitize_combo(&mut combo, state);

        all.clear();
        all.extend_from_slice(&combo);
        all.extend_from_slice(opponent_orders);

        let (results, dislodged) = resolver.resolve(&all, state);
        scratch.clone_from(state);
        apply_resolution(&mut scratch, &results, &dislodged);
        visit(&combo, evaluate(&scratch, power));

        stats.combos += 1;
        if stats.combos >= limits.budget {
            break;
        }
        if stats.combos % interval == 0 && Instant::now() >= limits.deadline {
            stats.timed_out = true;
            break;
        }
        if !advance(&mut indices, unit_orders) {
            break;
        }
    }
    stats
}

/// Best combination and its score. With no units the score is that of the
/// unchanged position.
pub fn search_best(
    state: &GameState,
    power: Power,
    unit_orders: &[Vec<Order>],
    opponent_orders: &[Order],
    limits: SearchLimits,
) -> (RankedCombo, SearchStats) {
    if unit_orders.is_empty() {
        let empty = RankedCombo { orders: Vec::new(), score: evaluate(state, power) };
        return (empty, SearchStats::default());
    }

    let mut best = RankedCombo { orders: Vec::new(), score: f32::NEG_INFINITY };
    let stats = enumerate(state, power, unit_orders, opponent_orders, limits, |combo, score| {
        if score > best.score {
            best.score = score;
            best.orders.clear();
            best.orders.extend_from_slice(combo);
        }
    });
    (best, stats)
}

/// The `n` best combinations, best first.
pub fn search_top_n(
    state: &GameState,
    power: Power,
    unit_orders: &[Vec<Order>],
    opponent_orders: &[Order],
    n: usize,
    limits: SearchLimits,
) -> (Vec<RankedCombo>, SearchStats) {
    if unit_orders.is_empty() {
        let only = RankedCombo { orders: Vec::new(), score: evaluate(state, power) };
        return (vec![only], SearchStats::default());
    }
    if n == 0 {
        return (Vec::new(), SearchStats::default());
    }

    // Min-heap of the current top N.
    let mut heap: BinaryHeap<Reverse<RankedCombo>> = BinaryHeap::with_capacity(n + 1);
    let stats = enumerate(state, power, unit_orders, opponent_orders, limits, |combo, score| {
        if heap.len() < n {
            heap.push(Reverse(RankedCombo { orders: combo.to_vec(), score }));
        } else if heap.peek().is_some_and(|worst| score > worst.0.score) {
            heap.pop();
            heap.push(Reverse(RankedCombo { orders: combo.to_vec(), score }));
        }
    });

    let mut ranked: Vec<RankedCombo> = heap.into_iter().map(|Reverse(c)| c).collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    (ranked, stats)
}
