//! Engine session state.
//!
//! Holds the current position, active power, options, tuned configuration,
//! opening book and diplomatic memory between commands, and answers `go`
//! with the configured tier.

use std::collections::HashMap;
use std::io::{self, Write};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use thiserror::Error;

use crate::board::{GameState, Power};
use crate::config::{ConfigError, EngineConfig};
use crate::diplomacy::{format_canned, parse_canned, DiplomacyState, IntentError};
use crate::opening_book::{BookError, BookMatchConfig, MatchMode, OpeningBook};
use crate::protocol::dfen::{parse_dfen, DfenError, INITIAL_DFEN};
use crate::protocol::dson::format_orders;
use crate::protocol::parser::GoParams;
use crate::strategy::{decide, Context, Decision, Strategy, Tier, UnknownTier};

/// Default search time in milliseconds.
const DEFAULT_MOVETIME_MS: u64 = 5000;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to parse DFEN: {0}")]
    Dfen(#[from] DfenError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Book(#[from] BookError),
    #[error(transparent)]
    Tier(#[from] UnknownTier),
    #[error(transparent)]
    Press(#[from] IntentError),
    #[error("option {name} needs a value")]
    MissingValue { name: String },
    #[error("bad value '{value}' for option {name}")]
    BadValue { name: String, value: String },
}

pub struct Engine {
    pub position: Option<GameState>,
    pub active_power: Option<Power>,
    pub options: HashMap<String, String>,
    config: EngineConfig,
    book: Option<OpeningBook>,
    book_mode: MatchMode,
    diplomacy: DiplomacyState,
    tier: Tier,
    rng: SmallRng,
}

impl Engine {
    /// A fresh session playing the tactical tier with the embedded book.
    pub fn new() -> Self {
        let book = match OpeningBook::embedded() {
            Ok(book) => Some(book),
            Err(e) => {
                warn!("embedded opening book unusable: {e}");
                None
            }
        };
        Engine {
            position: None,
            active_power: None,
            options: HashMap::new(),
            config: EngineConfig::default(),
            book,
            book_mode: MatchMode::Hybrid,
            diplomacy: DiplomacyState::new(),
            tier: Tier::Tactical,
            rng: SmallRng::from_entropy(),
        }
    }

    /// Forgets the position, power and diplomatic history.
    pub fn new_game(&mut self) {
        self.position = None;
        self.active_power = None;
        self.diplomacy = DiplomacyState::new();
    }

    /// `startpos` or a DFEN string.
    pub fn set_position(&mut self, dfen: &str) -> Result<(), SessionError> {
        let dfen = if dfen == "startpos" { INITIAL_DFEN } else { dfen };
        self.position = Some(parse_dfen(dfen)?);
        Ok(())
    }

    pub fn set_power(&mut self, power: Power) {
        self.active_power = Some(power);
    }

    pub fn tier(&self) -> &Tier {
        &self.tier
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Stores an option and applies the ones the session understands:
    /// `Tier`, `SearchTime`, `Seed`, `Config`, `Book` and `BookMode`.
    pub fn set_option(&mut self, name: String, value: Option<String>) -> Result<(), SessionError> {
        let value = value.unwrap_or_default();
        let need = |v: &str| {
            if v.is_empty() {
                Err(SessionError::MissingValue { name: name.clone() })
            } else {
                Ok(())
            }
        };
        let bad = || SessionError::BadValue { name: name.clone(), value: value.clone() };
        match name.as_str() {
            "Tier" => {
                need(&value)?;
                self.tier = Tier::from_name(&value)?;
            }
            "SearchTime" => {
                value.parse::<u64>().map_err(|_| bad())?;
            }
            "Seed" => {
                let seed = value.parse::<u64>().map_err(|_| bad())?;
                self.rng = SmallRng::seed_from_u64(seed);
            }
            "Config" => {
                need(&value)?;
                self.config = EngineConfig::load(&value)?;
                info!("loaded engine config from {value}");
            }
            "Book" => match value.as_str() {
                "" | "none" => self.book = None,
                "embedded" => self.book = Some(OpeningBook::embedded()?),
                path => self.book = Some(OpeningBook::load(path)?),
            },
            "BookMode" => {
                self.book_mode = match value.as_str() {
                    "exact" => MatchMode::Exact,
                    "hybrid" => MatchMode::Hybrid,
                    _ => return Err(bad()),
                };
            }
            other => debug!("storing unrecognized option {other}"),
        }
        self.options.insert(name, value);
        Ok(())
    }

    /// Remembers a canned message from `from`, addressed to us.
    pub fn receive_press(&mut self, from: Power, text: &str) -> Result<(), SessionError> {
        let mut intent = parse_canned(text)?;
        intent.from = Some(from);
        intent.to = self.active_power;
        debug!("press from {from}: {}", intent.kind);
        self.diplomacy.receive(intent);
        Ok(())
    }

    fn movetime(&self, params: &GoParams) -> Duration {
        let ms = params
            .movetime
            .or_else(|| self.options.get("SearchTime").and_then(|v| v.parse().ok()))
            .unwrap_or(DEFAULT_MOVETIME_MS);
        Duration::from_millis(ms)
    }

    pub fn handle_dui<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "id name stratagem")?;
        writeln!(
            out,
            "option name Tier type combo default tactical \
             var hold var random var heuristic var tactical var posture"
        )?;
        writeln!(
            out,
            "option name SearchTime type spin default {DEFAULT_MOVETIME_MS} min 10 max 60000"
        )?;
        writeln!(out, "option name Seed type spin default 0")?;
        writeln!(out, "option name Config type string default <none>")?;
        writeln!(out, "option name Book type string default embedded")?;
        writeln!(out, "option name BookMode type combo default hybrid var exact var hybrid")?;
        writeln!(out, "duiok")?;
        out.flush()
    }

    pub fn handle_isready<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "readyok")?;
        out.flush()
    }

    /// Decides orders for the current phase and writes them as
    /// `bestorders <dson>`, preceded by any `press_out` replies.
    pub fn handle_go<W: Write>(&mut self, params: &GoParams, out: &mut W) -> io::Result<()> {
        let Some(state) = self.position.as_ref() else {
            warn!("go: no position set");
            return Ok(());
        };
        let Some(power) = params.power.or(self.active_power) else {
            warn!("go: no active power set");
            return Ok(());
        };
        let tier = match params.tier.as_deref().map(Tier::from_name) {
            Some(Ok(t)) => t,
            Some(Err(e)) => {
                warn!("go: {e}, using {}", self.tier);
                self.tier.clone()
            }
            None => self.tier.clone(),
        };

        let started = Instant::now();
        let deadline = started + self.movetime(params);
        let book_match = BookMatchConfig { mode: self.book_mode, ..BookMatchConfig::default() };
        let mut ctx = Context::new(&self.config, deadline)
            .with_book_match(book_match)
            .with_diplomacy(&self.diplomacy);
        if let Some(book) = &self.book {
            ctx = ctx.with_book(book);
        }
        let decision = decide(&tier, state, power, &ctx, &mut self.rng);
        let replies = tier.diplomatic_messages(state, power, self.diplomacy.received());
        let draw = tier.should_vote_draw(state, power);

        writeln!(
            out,
            "info tier {} orders {} time {} drawvote {}",
            tier.name(),
            decision.len(),
            started.elapsed().as_millis(),
            if draw { "yes" } else { "no" }
        )?;
        for reply in &replies {
            if let Some(to) = reply.to {
                writeln!(out, "press_out {to} {}", format_canned(reply))?;
            }
        }
        let dson = match &decision {
            Decision::Movement(o) => format_orders(o),
            Decision::Retreat(o) => format_orders(o),
            Decision::Build(o) => format_orders(o),
        };
        writeln!(out, "bestorders {dson}")?;
        out.flush()?;

        self.diplomacy.clear_messages();
        Ok(())
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
