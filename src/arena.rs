//! Bot-vs-bot games without a server.
//!
//! Each power is played by its own [`Tier`]. Every phase all live powers
//! exchange press, decide, and the rules engine adjudicates, until someone
//! holds 18 centers or the year limit passes.

use std::time::{Duration, Instant};

use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::board::{BuildOrder, GameState, Order, Phase, Power, RetreatOrder, Season, ALL_POWERS};
use crate::config::EngineConfig;
use crate::diplomacy::DiplomacyState;
use crate::opening_book::{BookMatchConfig, OpeningBook};
use crate::protocol::dfen::encode_dfen;
use crate::resolve::{
    advance_state, apply_builds, apply_resolution, apply_retreats, is_game_over, resolve_builds,
    resolve_retreats, Resolver,
};
use crate::strategy::{decide, Context, Decision, Strategy, Tier};

#[derive(Debug, Clone)]
pub struct ArenaConfig {
    /// Tier per power, indexed by `Power::index()`.
    pub tiers: [Tier; 7],
    /// The game stops after this year's last phase.
    pub max_year: u16,
    pub seed: u64,
    /// Time allowed per decision.
    pub movetime: Duration,
    pub engine: EngineConfig,
    pub use_book: bool,
    pub start: GameState,
}

impl ArenaConfig {
    /// Every power plays `tier` from the standard opening.
    pub fn uniform(tier: Tier, max_year: u16, seed: u64) -> Self {
        ArenaConfig {
            tiers: std::array::from_fn(|_| tier.clone()),
            max_year,
            seed,
            movetime: Duration::from_millis(500),
            engine: EngineConfig::default(),
            use_book: true,
            start: GameState::initial(),
        }
    }

    pub fn with_tier(mut self, power: Power, tier: Tier) -> Self {
        self.tiers[power.index()] = tier;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArenaResult {
    pub winner: Option<Power>,
    pub year: u16,
    pub season: Season,
    /// Phases adjudicated.
    pub phases: usize,
    pub center_counts: [usize; 7],
    pub final_state: GameState,
}

/// Plays one game to completion.
pub fn run_game(config: &ArenaConfig) -> ArenaResult {
    let mut rng = SmallRng::seed_from_u64(config.seed);
    let book = if config.use_book {
        OpeningBook::embedded().map_err(|e| warn!("arena: no opening book: {e}")).ok()
    } else {
        None
    };
    let mut state = config.start.clone();
    let mut resolver = Resolver::default();
    let mut inboxes: [DiplomacyState; 7] = Default::default();
    let mut phases = 0;
    let mut winner = None;

    while state.year <= config.max_year {
        if let Some(w) = is_game_over(&state) {
            winner = Some(w);
            break;
        }
        if state.phase == Phase::Movement {
            exchange_press(&state, &config.tiers, &mut inboxes);
        }
        debug!("arena {}: {}", config.seed, encode_dfen(&state));

        let mut moves: Vec<Order> = Vec::new();
        let mut retreats: Vec<RetreatOrder> = Vec::new();
        let mut builds: Vec<BuildOrder> = Vec::new();
        for power in ALL_POWERS.into_iter().filter(|&p| owes_orders(&state, p)) {
            let deadline = Instant::now() + config.movetime;
            let mut ctx = Context::new(&config.engine, deadline)
                .with_book_match(BookMatchConfig::default())
                .with_diplomacy(&inboxes[power.index()]);
            if let Some(book) = &book {
                ctx = ctx.with_book(book);
            }
            let tier = &config.tiers[power.index()];
            match decide(tier, &state, power, &ctx, &mut rng) {
                Decision::Movement(o) => moves.extend(o),
                Decision::Retreat(o) => retreats.extend(o),
                Decision::Build(o) => builds.extend(o),
            }
        }

        match state.phase {
            Phase::Movement => {
                let (results, dislodged) = resolver.resolve(&moves, &state);
                apply_resolution(&mut state, &results, &dislodged);
                advance_state(&mut state, !dislodged.is_empty());
            }
            Phase::Retreat => {
                let results = resolve_retreats(&retreats, &state);
                apply_retreats(&mut state, &results);
                advance_state(&mut state, false);
            }
            Phase::Build => {
                let results = resolve_builds(&builds, &state);
                apply_builds(&mut state, &results);
                advance_state(&mut state, false);
            }
        }
        phases += 1;
        info!(
            "arena {}: {} {} {} centers {:?}",
            config.seed,
            state.year,
            state.season.name(),
            state.phase.name(),
            state.center_counts()
        );
    }

    if winner.is_none() {
        winner = is_game_over(&state);
    }
    if let Some(w) = winner {
        info!("arena {}: {w} wins in {}", config.seed, state.year);
    }
    ArenaResult {
        winner,
        year: state.year,
        season: state.season,
        phases,
        center_counts: state.center_counts(),
        final_state: state,
    }
}

/// Whether `power` is asked for orders this phase. A power left with only
/// a dislodged unit still retreats it.
fn owes_orders(state: &GameState, power: Power) -> bool {
    match state.phase {
        Phase::Retreat => state.has_dislodged_unit(power),
        Phase::Movement | Phase::Build => state.is_alive(power),
    }
}

/// Plays several games in parallel.
pub fn run_games(configs: &[ArenaConfig]) -> Vec<ArenaResult> {
    configs.par_iter().map(run_game).collect()
}

/// Every live power answers what it received last phase; replies land in
/// the recipients' inboxes and older messages are dropped.
fn exchange_press(state: &GameState, tiers: &[Tier; 7], inboxes: &mut [DiplomacyState; 7]) {
    let mut outgoing = Vec::new();
    for power in ALL_POWERS.into_iter().filter(|&p| state.is_alive(p)) {
        let inbox = &inboxes[power.index()];
        outgoing.extend(tiers[power.index()].diplomatic_messages(state, power, inbox.received()));
    }
    for inbox in inboxes.iter_mut() {
        inbox.clear_messages();
    }
    for intent in outgoing {
        if let Some(to) = intent.to {
            inboxes[to.index()].receive(intent);
        }
    }
}
