//! Per-unit candidate orders for combination search.
//!
//! Every legal order of a unit is scored with a cheap heuristic, and the
//! top K survive. Hold and the best friendly support are always kept so the
//! search can fall back to a defensive shape.

use crate::board::{Action, GameState, Order, Power, Province};
use crate::diplomacy::DiplomacyState;
use crate::movegen::legal_orders;

/// An order paired with its heuristic score.
#[derive(Debug, Clone, Copy)]
pub struct ScoredOrder {
    pub order: Order,
    pub score: f32,
}

/// Supply-center value of `province` to `power`: unclaimed 10, enemy 7, own 1.
/// Non-centers score zero.
pub(crate) fn center_value(province: Province, power: Power, state: &GameState) -> f32 {
    if !province.is_supply_center() {
        return 0.0;
    }
    match state.owner(province) {
        None => 10.0,
        Some(owner) if owner != power => 7.0,
        _ => 1.0,
    }
}

fn is_unowned_center(province: Province, power: Power, state: &GameState) -> bool {
    province.is_supply_center() && state.owner(province) != Some(power)
}

/// Scores a single movement order. Higher is more promising.
pub fn score_order(order: &Order, power: Power, state: &GameState) -> f32 {
    match order.action {
        Action::Hold => 0.5,
        Action::Move { to } => {
            let src = order.province();
            let dst = to.province;
            let mut score = center_value(dst, power, state);

            // Leaving an uncaptured center in Fall forfeits it.
            if state.season == crate::board::Season::Fall && is_unowned_center(src, power, state) {
                score -= 12.0;
            }
            if state.unit_at(dst).is_some_and(|u| u.power == power) {
                score -= 20.0;
            }
            score
        }
        Action::SupportHold { target, .. } => {
            if !is_friendly(target, power, state) {
                return 0.5;
            }
            if target.is_supply_center() && state.owner(target) == Some(power) {
                6.0
            } else {
                2.0
            }
        }
        Action::SupportMove { from, to, .. } => {
            if !is_friendly(from, power, state) {
                return 0.5;
            }
            if is_unowned_center(to, power, state) {
                9.0
            } else {
                5.0
            }
        }
        Action::Convoy { to, .. } => {
            if is_unowned_center(to, power, state) {
                2.0
            } else {
                0.3
            }
        }
    }
}

#[inline]
fn is_friendly(province: Province, power: Power, state: &GameState) -> bool {
    state.unit_at(province).is_some_and(|u| u.power == power)
}

fn is_friendly_support(order: &Order, power: Power, state: &GameState) -> bool {
    match order.action {
        Action::SupportHold { target, .. } => is_friendly(target, power, state),
        Action::SupportMove { from, .. } => is_friendly(from, power, state),
        _ => false,
    }
}

/// Scores every order in `orders`.
pub fn score_orders(orders: Vec<Order>, power: Power, state: &GameState) -> Vec<ScoredOrder> {
    orders
        .into_iter()
        .map(|order| ScoredOrder { score: score_order(&order, power, state), order })
        .collect()
}

/// Keeps the `k` best orders, then re-adds hold and the best friendly
/// support if the cut dropped them.
pub fn top_k(
    mut scored: Vec<ScoredOrder>,
    k: usize,
    power: Power,
    state: &GameState,
) -> Vec<Order> {
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut result: Vec<Order> = scored.iter().take(k).map(|s| s.order).collect();

    if !result.iter().any(|o| o.action == Action::Hold) {
        if let Some(hold) = scored.iter().find(|s| s.order.action == Action::Hold) {
            result.push(hold.order);
        }
    }

    if !result.iter().any(|o| is_friendly_support(o, power, state)) {
        // `scored` is sorted, so the first friendly support is the best one.
        if let Some(best) = scored.iter().find(|s| is_friendly_support(&s.order, power, state)) {
            result.push(best.order);
        }
    }
    result
}

/// Largest branching factor `k` with `k^units <= budget`, never below 2 for
/// multi-unit searches.
pub fn adaptive_k(units: usize, budget: usize) -> usize {
    match units {
        0 => 1,
        1 => budget,
        n => {
            let mut k = ((budget as f64).powf(1.0 / n as f64) as usize).max(2);
            while saturating_pow(k + 1, n) <= budget {
                k += 1;
            }
            k
        }
    }
}

fn saturating_pow(base: usize, exp: usize) -> usize {
    let mut acc: usize = 1;
    for _ in 0..exp {
        acc = acc.saturating_mul(base);
    }
    acc
}

/// Top-K candidate lists for every unit of `power`, in province order.
///
/// When a diplomacy state is supplied, scores are adjusted by the received
/// intents before the cut. A unit with no legal orders gets a lone hold.
pub fn unit_candidates(
    power: Power,
    state: &GameState,
    k: usize,
    diplomacy: Option<(&DiplomacyState, f32)>,
) -> Vec<Vec<Order>> {
    state
        .units_of(power)
        .map(|(prov, unit)| {
            let legal = legal_orders(prov, state);
            if legal.is_empty() {
                let at = crate::board::Location::with_coast(prov, unit.coast);
                return vec![Order::hold(power, unit.kind, at)];
            }
            let mut scored = score_orders(legal, power, state);
            if let Some((dip, compliance)) = diplomacy {
                dip.adjust_scores(&mut scored, power, compliance);
            }
            top_k(scored, k, power, state)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Location, Phase, Season, Unit, UnitKind};
    use Province::*;

    #[test]
    fn move_scores_follow_center_value() {
        let gs = GameState::initial();
        let at = Location::new(Bud);
        let ser = Order::moving(Power::Austria, UnitKind::Army, at, Location::new(Ser));
        let gal = Order::moving(Power::Austria, UnitKind::Army, at, Location::new(Gal));
        let vie = Order::moving(Power::Austria, UnitKind::Army, at, Location::new(Vie));
        assert_eq!(score_order(&ser, Power::Austria, &gs), 10.0);
        assert_eq!(score_order(&gal, Power::Austria, &gs), 0.0);
        // own center, occupied by own unit
        assert_eq!(score_order(&vie, Power::Austria, &gs), 1.0 - 20.0);
    }

    #[test]
    fn fall_departure_penalty() {
        let mut gs = GameState::empty(1901, Season::Fall, Phase::Movement);
        gs.place(Ser, Unit::new(Power::Austria, UnitKind::Army));
        let leave =
            Order::moving(Power::Austria, UnitKind::Army, Location::new(Ser), Location::new(Alb));
        assert_eq!(score_order(&leave, Power::Austria, &gs), -12.0);
    }

    #[test]
    fn friendly_supports_score_higher() {
        let gs = GameState::initial();
        let vie = Location::new(Vie);
        let army = UnitKind::Army;
        let sup = Order::support_move(Power::Austria, army, vie, Bud, Gal, army);
        let foreign = Order::support_hold(Power::Austria, army, vie, Mun, army);
        let hold = Order::support_hold(Power::Austria, army, vie, Bud, army);
        assert_eq!(score_order(&sup, Power::Austria, &gs), 5.0);
        assert_eq!(score_order(&foreign, Power::Austria, &gs), 0.5);
        assert_eq!(score_order(&hold, Power::Austria, &gs), 6.0);
    }

    #[test]
    fn top_k_keeps_hold_and_support() {
        let gs = GameState::initial();
        let scored = score_orders(legal_orders(Bud, &gs), Power::Austria, &gs);
        let picked = top_k(scored, 1, Power::Austria, &gs);
        assert!(picked.iter().any(|o| o.action == Action::Hold));
        assert!(picked.iter().any(|o| is_friendly_support(o, Power::Austria, &gs)));
        assert!(picked.len() <= 3);
    }

    #[test]
    fn adaptive_k_respects_budget() {
        assert_eq!(adaptive_k(0, 1000), 1);
        assert_eq!(adaptive_k(1, 1000), 1000);
        assert_eq!(adaptive_k(3, 1000), 10);
        for n in 2..=17 {
            let k = adaptive_k(n, 50_000);
            assert!(k >= 2);
            if saturating_pow(2, n) <= 50_000 {
                assert!(saturating_pow(k, n) <= 50_000, "n={n} k={k}");
            }
        }
    }

    #[test]
    fn every_unit_gets_candidates() {
        let gs = GameState::initial();
        let lists = unit_candidates(Power::Russia, &gs, 4, None);
        assert_eq!(lists.len(), 4);
        for list in &lists {
            assert!(!list.is_empty());
            assert!(list.iter().any(|o| o.action == Action::Hold));
        }

        let austria = unit_candidates(Power::Austria, &gs, 4, None);
        let bud = austria.iter().find(|l| l[0].province() == Bud).unwrap();
        assert!(bud.iter().any(|o| o.is_move()));
        assert!(bud.iter().any(|o| o.is_support()));
    }
}
