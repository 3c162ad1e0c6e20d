//! Decision tiers.
//!
//! Every tier implements [`Strategy`]; [`Tier`] is the closed set of tiers a
//! bot can be configured with and dispatches to them. [`decide`] picks the
//! entry point for the current phase and guarantees the result is complete
//! and legal whatever the tier returned.

pub mod external;
pub mod heuristic;
pub mod posture;
pub mod simple;
pub mod tactical;

use std::fmt;
use std::time::Instant;

use log::warn;
use rand::rngs::SmallRng;

use crate::board::{
    BuildOrder, GameState, Location, Order, Phase, Power, RetreatOrder, PROVINCE_COUNT,
};
use crate::config::EngineConfig;
use crate::diplomacy::{DiplomacyState, Intent};
use crate::opening_book::{BookMatchConfig, OpeningBook};
use crate::resolve::{validate_and_default, validate_build, validate_retreat};
use crate::search::dedup_move_targets;

pub use external::{ExternalEngine, ExternalError, ExternalTier};
pub use heuristic::HeuristicStrategy;
pub use posture::PostureStrategy;
pub use simple::{HoldStrategy, RandomStrategy};
pub use tactical::{rollout_orders, TacticalStrategy};

/// Everything a tier may consult besides the position.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    pub config: &'a EngineConfig,
    pub book: Option<&'a OpeningBook>,
    pub book_match: BookMatchConfig,
    pub diplomacy: Option<&'a DiplomacyState>,
    /// Wall-clock limit for this decision.
    pub deadline: Instant,
}

impl<'a> Context<'a> {
    pub fn new(config: &'a EngineConfig, deadline: Instant) -> Self {
        Context {
            config,
            book: None,
            book_match: BookMatchConfig::default(),
            diplomacy: None,
            deadline,
        }
    }

    pub fn with_book(mut self, book: &'a OpeningBook) -> Self {
        self.book = Some(book);
        self
    }

    pub fn with_book_match(mut self, book_match: BookMatchConfig) -> Self {
        self.book_match = book_match;
        self
    }

    pub fn with_diplomacy(mut self, diplomacy: &'a DiplomacyState) -> Self {
        self.diplomacy = Some(diplomacy);
        self
    }
}

/// A decision policy for one power.
///
/// Implementations may return incomplete or even invalid order sets; callers
/// go through [`decide`], which repairs them.
pub trait Strategy {
    fn name(&self) -> &'static str;

    fn movement_orders(
        &self,
        state: &GameState,
        power: Power,
        ctx: &Context<'_>,
        rng: &mut SmallRng,
    ) -> Vec<Order>;

    fn retreat_orders(
        &self,
        state: &GameState,
        power: Power,
        ctx: &Context<'_>,
        rng: &mut SmallRng,
    ) -> Vec<RetreatOrder>;

    fn build_orders(&self, state: &GameState, power: Power, ctx: &Context<'_>, rng: &mut SmallRng)
        -> Vec<BuildOrder>;

    /// Whether to accept a proposed draw.
    fn should_vote_draw(&self, _state: &GameState, _power: Power) -> bool {
        true
    }

    /// Replies to the intents received this phase.
    fn diplomatic_messages(
        &self,
        _state: &GameState,
        _power: Power,
        _received: &[Intent],
    ) -> Vec<Intent> {
        Vec::new()
    }
}

/// Returned by [`Tier::from_name`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tier '{0}'")]
pub struct UnknownTier(pub String);

/// The configurable tiers, weakest first.
#[derive(Clone)]
pub enum Tier {
    Hold,
    Random,
    Heuristic,
    Tactical,
    PostureRegret,
    External(ExternalTier),
}

impl Tier {
    /// Parses a tier name. The external tier needs an engine handle and
    /// cannot be named.
    pub fn from_name(name: &str) -> Result<Tier, UnknownTier> {
        match name.trim().to_ascii_lowercase().as_str() {
            "hold" => Ok(Tier::Hold),
            "random" => Ok(Tier::Random),
            "heuristic" | "easy" => Ok(Tier::Heuristic),
            "tactical" | "medium" => Ok(Tier::Tactical),
            "posture" | "hard" => Ok(Tier::PostureRegret),
            other => Err(UnknownTier(other.to_string())),
        }
    }

    fn inner(&self) -> &dyn Strategy {
        match self {
            Tier::Hold => &HoldStrategy,
            Tier::Random => &RandomStrategy,
            Tier::Heuristic => &HeuristicStrategy,
            Tier::Tactical => &TacticalStrategy,
            Tier::PostureRegret => &PostureStrategy,
            Tier::External(ext) => ext,
        }
    }
}

impl fmt::Debug for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tier({})", self.name())
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Strategy for Tier {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn movement_orders(
        &self,
        state: &GameState,
        power: Power,
        ctx: &Context<'_>,
        rng: &mut SmallRng,
    ) -> Vec<Order> {
        self.inner().movement_orders(state, power, ctx, rng)
    }

    fn retreat_orders(
        &self,
        state: &GameState,
        power: Power,
        ctx: &Context<'_>,
        rng: &mut SmallRng,
    ) -> Vec<RetreatOrder> {
        self.inner().retreat_orders(state, power, ctx, rng)
    }

    fn build_orders(
        &self,
        state: &GameState,
        power: Power,
        ctx: &Context<'_>,
        rng: &mut SmallRng,
    ) -> Vec<BuildOrder> {
        self.inner().build_orders(state, power, ctx, rng)
    }

    fn should_vote_draw(&self, state: &GameState, power: Power) -> bool {
        self.inner().should_vote_draw(state, power)
    }

    fn diplomatic_messages(
        &self,
        state: &GameState,
        power: Power,
        received: &[Intent],
    ) -> Vec<Intent> {
        self.inner().diplomatic_messages(state, power, received)
    }
}

/// Orders for the phase the position is in.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Movement(Vec<Order>),
    Retreat(Vec<RetreatOrder>),
    Build(Vec<BuildOrder>),
}

impl Decision {
    pub fn len(&self) -> usize {
        match self {
            Decision::Movement(o) => o.len(),
            Decision::Retreat(o) => o.len(),
            Decision::Build(o) => o.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Asks `strategy` for the current phase's orders and repairs the answer.
pub fn decide(
    strategy: &dyn Strategy,
    state: &GameState,
    power: Power,
    ctx: &Context<'_>,
    rng: &mut SmallRng,
) -> Decision {
    match state.phase {
        Phase::Movement => {
            let mut orders = strategy.movement_orders(state, power, ctx, rng);
            if orders.is_empty() && state.unit_count(power) > 0 {
                warn!("{} tier gave no orders for {}, using heuristic", strategy.name(), power);
                orders = heuristic::movement_orders(state, power, rng);
            }
            Decision::Movement(finalize_movement(&orders, state, power))
        }
        Phase::Retreat => {
            let orders = strategy.retreat_orders(state, power, ctx, rng);
            Decision::Retreat(finalize_retreats(&orders, state, power))
        }
        Phase::Build => {
            let orders = strategy.build_orders(state, power, ctx, rng);
            Decision::Build(finalize_builds(&orders, state, power))
        }
    }
}

/// One legal order per unit with no two moves into one province.
pub fn finalize_movement(orders: &[Order], state: &GameState, power: Power) -> Vec<Order> {
    let mut out = validate_and_default(orders, state, power);
    dedup_move_targets(&mut out);
    out
}

/// One legal retreat per dislodged unit; anything missing or invalid
/// disbands.
pub fn finalize_retreats(
    orders: &[RetreatOrder],
    state: &GameState,
    power: Power,
) -> Vec<RetreatOrder> {
    state
        .dislodged_of(power)
        .map(|(prov, d)| {
            let at = Location::with_coast(prov, d.unit.coast);
            orders
                .iter()
                .find(|o| {
                    o.at.province == prov && o.power == power && validate_retreat(o, state).is_ok()
                })
                .copied()
                .unwrap_or_else(|| RetreatOrder::disband(power, d.unit.kind, at))
        })
        .collect()
}

/// Legal adjustments, at most one per province and no more than owed.
pub fn finalize_builds(orders: &[BuildOrder], state: &GameState, power: Power) -> Vec<BuildOrder> {
    let owed = state.adjustment_delta(power).unsigned_abs() as usize;
    let mut used = [false; PROVINCE_COUNT];
    let mut out = Vec::new();
    for order in orders {
        if out.len() >= owed {
            break;
        }
        if order.power != power || validate_build(order, state).is_err() {
            continue;
        }
        if let Some(p) = order.province() {
            if used[p.index()] {
                continue;
            }
            used[p.index()] = true;
        }
        out.push(*order);
    }
    out
}
