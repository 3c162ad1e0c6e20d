//! Baseline tiers with no lookahead.

use rand::rngs::SmallRng;

use crate::board::{BuildOrder, GameState, Location, Order, Power, RetreatOrder};
use crate::movegen::{random_builds, random_orders, random_retreats};

use super::{heuristic, Context, Strategy};

/// Holds everything, disbands every retreat, never builds.
#[derive(Debug, Clone, Copy, Default)]
pub struct HoldStrategy;

impl Strategy for HoldStrategy {
    fn name(&self) -> &'static str {
        "hold"
    }

    fn movement_orders(
        &self,
        state: &GameState,
        power: Power,
        _ctx: &Context<'_>,
        _rng: &mut SmallRng,
    ) -> Vec<Order> {
        heuristic::all_hold(state, power)
    }

    fn retreat_orders(
        &self,
        state: &GameState,
        power: Power,
        _ctx: &Context<'_>,
        _rng: &mut SmallRng,
    ) -> Vec<RetreatOrder> {
        all_disband(state, power)
    }

    fn build_orders(
        &self,
        _state: &GameState,
        _power: Power,
        _ctx: &Context<'_>,
        _rng: &mut SmallRng,
    ) -> Vec<BuildOrder> {
        Vec::new()
    }
}

/// Disband orders for every dislodged unit of `power`.
pub(crate) fn all_disband(state: &GameState, power: Power) -> Vec<RetreatOrder> {
    state
        .dislodged_of(power)
        .map(|(p, d)| {
            RetreatOrder::disband(power, d.unit.kind, Location::with_coast(p, d.unit.coast))
        })
        .collect()
}

/// Uniformly random legal orders.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomStrategy;

impl Strategy for RandomStrategy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn movement_orders(
        &self,
        state: &GameState,
        power: Power,
        _ctx: &Context<'_>,
        rng: &mut SmallRng,
    ) -> Vec<Order> {
        random_orders(power, state, rng)
    }

    fn retreat_orders(
        &self,
        state: &GameState,
        power: Power,
        _ctx: &Context<'_>,
        rng: &mut SmallRng,
    ) -> Vec<RetreatOrder> {
        random_retreats(power, state, rng)
    }

    fn build_orders(
        &self,
        state: &GameState,
        power: Power,
        _ctx: &Context<'_>,
        rng: &mut SmallRng,
    ) -> Vec<BuildOrder> {
        random_builds(power, state, rng)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use rand::SeedableRng;

    use super::*;
    use crate::board::{Action, Dislodged, Phase, Province, RetreatAction, Season, Unit, UnitKind};
    use crate::config::EngineConfig;
    use Province::*;

    #[test]
    fn hold_tier_holds_and_disbands() {
        let cfg = EngineConfig::default();
        let ctx = Context::new(&cfg, Instant::now());
        let mut rng = SmallRng::seed_from_u64(1);
        let gs = GameState::initial();
        let orders = HoldStrategy.movement_orders(&gs, Power::Germany, &ctx, &mut rng);
        assert_eq!(orders.len(), 3);
        assert!(orders.iter().all(|o| o.action == Action::Hold));

        let mut gs = GameState::empty(1901, Season::Spring, Phase::Retreat);
        gs.dislodged[Kie.index()] = Some(Dislodged {
            unit: Unit::new(Power::Germany, UnitKind::Fleet),
            attacker_from: Ber,
        });
        let retreats = HoldStrategy.retreat_orders(&gs, Power::Germany, &ctx, &mut rng);
        assert_eq!(retreats.len(), 1);
        assert_eq!(retreats[0].action, RetreatAction::Disband);
    }

    #[test]
    fn random_tier_covers_every_unit() {
        let cfg = EngineConfig::default();
        let ctx = Context::new(&cfg, Instant::now());
        let mut rng = SmallRng::seed_from_u64(9);
        let gs = GameState::initial();
        for _ in 0..10 {
            let orders = RandomStrategy.movement_orders(&gs, Power::Russia, &ctx, &mut rng);
            assert_eq!(orders.len(), 4);
            for o in &orders {
                assert_eq!(crate::resolve::validate_order(o, &gs), Ok(()));
            }
        }
    }
}
