//! Diplomatic intents and their effect on order scoring.
//!
//! Messages between bots are canned English sentences. They are parsed into
//! structured [`Intent`]s, remembered in a [`DiplomacyState`] with per-power
//! trust, and fed back into candidate scoring.

pub mod stance;
pub mod theater;

use std::fmt;

use thiserror::Error;

use crate::board::{
    adjacent_provinces, Action, GameState, Power, Province, ALL_POWERS, PROVINCE_COUNT,
};
use crate::search::candidates::ScoredOrder;

pub use stance::{classify_neighbor_stances, Stance};
pub use theater::{province_theater, theater_presence, Theater};

/// Starting trust for every power.
pub const DEFAULT_TRUST: f32 = 0.5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntentError {
    #[error("unrecognized canned message: {0}")]
    Unrecognized(String),
    #[error("unknown province '{0}' in message")]
    UnknownProvince(String),
    #[error("unknown power '{0}' in message")]
    UnknownPower(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntentKind {
    RequestSupport,
    ProposeNonAggression,
    ProposeAlliance,
    Threaten,
    OfferDeal,
    Accept,
    Reject,
}

impl IntentKind {
    pub const fn name(self) -> &'static str {
        match self {
            IntentKind::RequestSupport => "request_support",
            IntentKind::ProposeNonAggression => "propose_non_aggression",
            IntentKind::ProposeAlliance => "propose_alliance",
            IntentKind::Threaten => "threaten",
            IntentKind::OfferDeal => "offer_deal",
            IntentKind::Accept => "accept",
            IntentKind::Reject => "reject",
        }
    }
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Structured reading of one diplomatic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intent {
    pub kind: IntentKind,
    pub from: Option<Power>,
    pub to: Option<Power>,
    pub provinces: Vec<Province>,
    /// Third party named by the message, as in "alliance against Turkey".
    pub target_power: Option<Power>,
}

impl Intent {
    pub fn new(kind: IntentKind) -> Self {
        Intent { kind, from: None, to: None, provinces: Vec::new(), target_power: None }
    }

    pub fn between(mut self, from: Power, to: Power) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    pub fn with_provinces(mut self, provinces: &[Province]) -> Self {
        self.provinces = provinces.to_vec();
        self
    }

    pub fn against(mut self, power: Power) -> Self {
        self.target_power = Some(power);
        self
    }
}

/// Renders an intent as the canned sentence other bots understand.
pub fn format_canned(intent: &Intent) -> String {
    let p = &intent.provinces;
    match intent.kind {
        IntentKind::RequestSupport => match p.as_slice() {
            [from, to, ..] => format!("Request support from {from} to {to}"),
            [at] => format!("Request support at {at}"),
            [] => "Request support".to_string(),
        },
        IntentKind::ProposeNonAggression => match p.first() {
            Some(at) => format!("Please don't attack {at}, I won't attack yours"),
            None => "Let's agree not to attack each other".to_string(),
        },
        IntentKind::ProposeAlliance => match intent.target_power {
            Some(target) => format!("Let's work together against {}", target.label()),
            None => "Let's work together".to_string(),
        },
        IntentKind::Threaten => match p.first() {
            Some(at) => format!("I'm coming for {at}, back off"),
            None => "Back off or face consequences".to_string(),
        },
        IntentKind::OfferDeal => match p.as_slice() {
            [mine, yours, ..] => format!("Deal: I take {mine}, you take {yours}"),
            _ => "I'd like to make a deal".to_string(),
        },
        IntentKind::Accept => "Agreed".to_string(),
        IntentKind::Reject => "No deal".to_string(),
    }
}

fn province(s: &str) -> Result<Province, IntentError> {
    let s = s.trim();
    Province::from_abbr(s).ok_or_else(|| IntentError::UnknownProvince(s.to_string()))
}

/// Parses a canned sentence, case-insensitively. Sender and recipient are
/// left unset.
pub fn parse_canned(content: &str) -> Result<Intent, IntentError> {
    let lower = content.trim().to_lowercase();

    match lower.as_str() {
        "agreed" => return Ok(Intent::new(IntentKind::Accept)),
        "no deal" => return Ok(Intent::new(IntentKind::Reject)),
        "let's agree not to attack each other" => {
            return Ok(Intent::new(IntentKind::ProposeNonAggression))
        }
        "let's work together" => return Ok(Intent::new(IntentKind::ProposeAlliance)),
        "request support" => return Ok(Intent::new(IntentKind::RequestSupport)),
        "back off or face consequences" => return Ok(Intent::new(IntentKind::Threaten)),
        "i'd like to make a deal" => return Ok(Intent::new(IntentKind::OfferDeal)),
        _ => {}
    }

    if let Some(rest) = lower.strip_prefix("request support from ") {
        if let Some((from, to)) = rest.split_once(" to ") {
            let provinces = [province(from)?, province(to)?];
            return Ok(Intent::new(IntentKind::RequestSupport).with_provinces(&provinces));
        }
    }
    if let Some(at) = lower.strip_prefix("request support at ") {
        return Ok(Intent::new(IntentKind::RequestSupport).with_provinces(&[province(at)?]));
    }
    if let Some(rest) = lower.strip_prefix("please don't attack ") {
        let at = rest.split(',').next().unwrap_or(rest);
        return Ok(Intent::new(IntentKind::ProposeNonAggression).with_provinces(&[province(at)?]));
    }
    if let Some(name) = lower.strip_prefix("let's work together against ") {
        let name = name.trim();
        let target =
            Power::from_name(name).ok_or_else(|| IntentError::UnknownPower(name.to_string()))?;
        return Ok(Intent::new(IntentKind::ProposeAlliance).against(target));
    }
    if let Some(rest) = lower.strip_prefix("i'm coming for ") {
        let word = rest.split_whitespace().next().unwrap_or(rest);
        let at = word.trim_end_matches([',', '\u{2014}']);
        return Ok(Intent::new(IntentKind::Threaten).with_provinces(&[province(at)?]));
    }
    if let Some(rest) = lower.strip_prefix("deal: i take ") {
        if let Some((mine, yours)) = rest.split_once(", you take ") {
            let provinces = [province(mine)?, province(yours)?];
            return Ok(Intent::new(IntentKind::OfferDeal).with_provinces(&provinces));
        }
    }

    Err(IntentError::Unrecognized(content.to_string()))
}

/// Requests received this phase and per-power trust.
#[derive(Debug, Clone)]
pub struct DiplomacyState {
    received: Vec<Intent>,
    trust: [f32; 7],
}

impl Default for DiplomacyState {
    fn default() -> Self {
        DiplomacyState { received: Vec::new(), trust: [DEFAULT_TRUST; 7] }
    }
}

impl DiplomacyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn receive(&mut self, intent: Intent) {
        self.received.push(intent);
    }

    pub fn received(&self) -> &[Intent] {
        &self.received
    }

    /// Forgets this phase's requests; trust is kept.
    pub fn clear_messages(&mut self) {
        self.received.clear();
    }

    pub fn trust(&self, power: Power) -> f32 {
        self.trust[power.index()]
    }

    pub fn set_trust(&mut self, power: Power, value: f32) {
        self.trust[power.index()] = value.clamp(0.0, 1.0);
    }

    fn sender_trust(&self, intent: &Intent) -> f32 {
        intent.from.map_or(DEFAULT_TRUST, |p| self.trust(p))
    }

    /// Biases `power`'s scored orders toward honoring received requests.
    ///
    /// Non-aggression lowers moves into the named provinces, a support
    /// request raises the matching support-move, and a threat raises holds
    /// in the threatened provinces. `compliance` scales the first two.
    pub fn adjust_scores(&self, scored: &mut [ScoredOrder], power: Power, compliance: f32) {
        for req in &self.received {
            let trust = self.sender_trust(req);
            for s in scored.iter_mut().filter(|s| s.order.power == power) {
                match (req.kind, s.order.action) {
                    (IntentKind::ProposeNonAggression, Action::Move { to })
                        if req.provinces.contains(&to.province) =>
                    {
                        s.score -= 5.0 * compliance * trust;
                    }
                    (IntentKind::RequestSupport, Action::SupportMove { from, to, .. })
                        if req.provinces.len() >= 2
                            && req.provinces[0] == from
                            && req.provinces[1] == to =>
                    {
                        s.score += 6.0 * compliance * trust;
                    }
                    (IntentKind::Threaten, Action::Hold)
                        if req.provinces.contains(&s.order.province()) =>
                    {
                        s.score += 3.0;
                    }
                    _ => {}
                }
            }
        }
    }
}

fn reach(state: &GameState, power: Power) -> [bool; PROVINCE_COUNT] {
    let mut reach = [false; PROVINCE_COUNT];
    for (p, u) in state.units_of(power) {
        for adj in adjacent_provinces(p, u.coast, u.kind) {
            reach[adj.index()] = true;
        }
    }
    reach
}

/// Replies to received intents and proposes non-aggression to neighbors.
///
/// Support requests, non-aggression and alliances are accepted; threats are
/// rejected. Every live power whose units can step into a province ours can
/// also reach gets a non-aggression proposal.
pub fn respond(state: &GameState, power: Power, received: &[Intent]) -> Vec<Intent> {
    let mut out = Vec::new();
    for req in received {
        let Some(sender) = req.from else { continue };
        let reply = match req.kind {
            IntentKind::RequestSupport
            | IntentKind::ProposeNonAggression
            | IntentKind::ProposeAlliance => IntentKind::Accept,
            IntentKind::Threaten => IntentKind::Reject,
            _ => continue,
        };
        out.push(Intent::new(reply).between(power, sender));
    }

    let ours = reach(state, power);
    for other in ALL_POWERS {
        if other == power || !state.is_alive(other) {
            continue;
        }
        let theirs = reach(state, other);
        if ours.iter().zip(&theirs).any(|(a, b)| *a && *b) {
            out.push(Intent::new(IntentKind::ProposeNonAggression).between(power, other));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Location, Order, UnitKind};
    use Province::*;

    #[test]
    fn canned_messages_round_trip() {
        let intents = [
            Intent::new(IntentKind::RequestSupport).with_provinces(&[Bud, Ser]),
            Intent::new(IntentKind::RequestSupport).with_provinces(&[Gal]),
            Intent::new(IntentKind::RequestSupport),
            Intent::new(IntentKind::ProposeNonAggression).with_provinces(&[Tri]),
            Intent::new(IntentKind::ProposeNonAggression),
            Intent::new(IntentKind::ProposeAlliance).against(Power::Turkey),
            Intent::new(IntentKind::ProposeAlliance),
            Intent::new(IntentKind::Threaten).with_provinces(&[Ven]),
            Intent::new(IntentKind::Threaten),
            Intent::new(IntentKind::OfferDeal).with_provinces(&[Rum, Bul]),
            Intent::new(IntentKind::OfferDeal),
            Intent::new(IntentKind::Accept),
            Intent::new(IntentKind::Reject),
        ];
        for intent in intents {
            let text = format_canned(&intent);
            assert_eq!(parse_canned(&text), Ok(intent), "{text}");
        }
    }

    #[test]
    fn parse_accepts_legacy_dash() {
        let intent = parse_canned("I'm coming for ven\u{2014} back off").unwrap();
        assert_eq!(intent.provinces, vec![Ven]);
        assert_eq!(
            format_canned(&Intent::new(IntentKind::ProposeAlliance).against(Power::Italy)),
            "Let's work together against Italy"
        );
    }

    #[test]
    fn parse_rejects_unknown() {
        assert!(matches!(parse_canned("hello there"), Err(IntentError::Unrecognized(_))));
        assert!(matches!(
            parse_canned("Request support at narnia"),
            Err(IntentError::UnknownProvince(_))
        ));
        assert!(matches!(
            parse_canned("Let's work together against rome"),
            Err(IntentError::UnknownPower(_))
        ));
    }

    #[test]
    fn adjust_scores_follows_requests() {
        let mut dip = DiplomacyState::new();
        dip.set_trust(Power::Russia, 1.0);
        let to_austria = |kind: IntentKind, from: Power, provinces: &[Province]| {
            Intent::new(kind).between(from, Power::Austria).with_provinces(provinces)
        };
        dip.receive(to_austria(IntentKind::ProposeNonAggression, Power::Russia, &[Gal]));
        dip.receive(to_austria(IntentKind::RequestSupport, Power::Italy, &[Ven, Tyr]));
        dip.receive(to_austria(IntentKind::Threaten, Power::Turkey, &[Bud]));

        let mut scored = vec![
            ScoredOrder {
                order: Order::moving(
                    Power::Austria,
                    UnitKind::Army,
                    Location::new(Vie),
                    Location::new(Gal),
                ),
                score: 0.0,
            },
            ScoredOrder {
                order: Order::support_move(
                    Power::Austria,
                    UnitKind::Army,
                    Location::new(Vie),
                    Ven,
                    Tyr,
                    UnitKind::Army,
                ),
                score: 0.0,
            },
            ScoredOrder {
                order: Order::hold(Power::Austria, UnitKind::Army, Location::new(Bud)),
                score: 0.0,
            },
            ScoredOrder {
                order: Order::hold(Power::Austria, UnitKind::Army, Location::new(Vie)),
                score: 0.0,
            },
        ];
        dip.adjust_scores(&mut scored, Power::Austria, 1.0);
        assert_eq!(scored[0].score, -5.0);
        assert_eq!(scored[1].score, 3.0);
        assert_eq!(scored[2].score, 3.0);
        assert_eq!(scored[3].score, 0.0);
    }

    #[test]
    fn respond_accepts_and_proposes() {
        let gs = GameState::initial();
        let received = [
            Intent::new(IntentKind::ProposeAlliance)
                .between(Power::Italy, Power::Austria)
                .against(Power::Turkey),
            Intent::new(IntentKind::Threaten).between(Power::Russia, Power::Austria),
            Intent::new(IntentKind::Accept).between(Power::Germany, Power::Austria),
        ];
        let out = respond(&gs, Power::Austria, &received);
        assert_eq!(out[0], Intent::new(IntentKind::Accept).between(Power::Austria, Power::Italy));
        assert_eq!(out[1], Intent::new(IntentKind::Reject).between(Power::Austria, Power::Russia));
        let proposals: Vec<Power> = out[2..]
            .iter()
            .filter(|i| i.kind == IntentKind::ProposeNonAggression)
            .filter_map(|i| i.to)
            .collect();
        // Both reach Galicia or Tyrolia in 1901; England cannot reach anything near Austria.
        assert!(proposals.contains(&Power::Russia));
        assert!(proposals.contains(&Power::Italy));
        assert!(!proposals.contains(&Power::England));
    }
}
