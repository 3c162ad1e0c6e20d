//! Kruijswijk guess-and-check adjudication of movement phases.
//!
//! Every unit on the board receives exactly one effective order: the
//! submitted one if it validates, otherwise a hold. Dependencies between
//! orders are resolved recursively; a cycle is broken by guessing success,
//! checking, and re-resolving with the opposite guess if inconsistent.

use crate::board::{
    fleet_coasts_to, is_adjacent, Action, Coast, GameState, Order, Province, Unit, UnitKind,
    PROVINCE_COUNT,
};

use super::validate::validate_order;

/// Outcome of one effective order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    Bounced,
    Cut,
    Failed,
    Dislodged,
    /// The submitted order was invalid and the unit held instead.
    Void,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedOrder {
    pub order: Order,
    pub outcome: Outcome,
}

/// A unit forced out of `province` by a move from `attacker_from`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dislodgement {
    pub province: Province,
    pub unit: Unit,
    pub attacker_from: Province,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResState {
    Unresolved,
    Guessing,
    Resolved,
}

const NONE: u8 = u8::MAX;

#[derive(Debug, Clone, Copy)]
struct Slot {
    order: Order,
    state: ResState,
    resolution: bool,
    prov: u8,
    /// Move destination.
    target: u8,
    /// Province of the supported or convoyed unit.
    aux_from: u8,
    /// Destination of the supported move or convoy; `NONE` for support-hold.
    aux_to: u8,
    /// Army move that needs a convoy chain.
    convoyed: bool,
    void: bool,
}

impl Slot {
    #[inline]
    fn is_move(&self) -> bool {
        matches!(self.order.action, Action::Move { .. })
    }
}

/// Reusable adjudicator; keeps its lookup table and buffers between calls.
pub struct Resolver {
    lookup: [i16; PROVINCE_COUNT],
    slots: Vec<Slot>,
}

impl Default for Resolver {
    fn default() -> Self {
        Resolver::new(34)
    }
}

impl Resolver {
    pub fn new(capacity: usize) -> Self {
        Resolver { lookup: [-1; PROVINCE_COUNT], slots: Vec::with_capacity(capacity) }
    }

    /// Adjudicates a movement phase.
    ///
    /// `orders` may cover any subset of units and any number of powers.
    /// Units without an order hold. Later orders for an already ordered
    /// unit are ignored.
    pub fn resolve(
        &mut self,
        orders: &[Order],
        state: &GameState) -> (Vec<ResolvedOrder>, Vec<Dislodgement>,
    ) {
        self.init(orders, state);
        for i in 0..self.slots.len() {
            let prov = self.slots[i].prov;
            self.adjudicate(prov, state);
        }
        self.build_results(state)
    }

    fn init(&mut self, orders: &[Order], state: &GameState) {
        self.slots.clear();
        self.lookup.fill(-1);

        for order in orders {
            let idx = order.at.province.index();
            if self.lookup[idx] >= 0 {
                continue;
            }
            let Some(unit) = state.units[idx] else { continue };
            let (effective, void) = match validate_order(order, state) {
                Ok(()) => (*order, false),
                Err(_) => (Order::hold(unit.power, unit.kind, order.at), true),
            };
            self.push(effective, unit, void);
        }
        for (prov, unit) in state.units() {
            if self.lookup[prov.index()] < 0 {
                let at = crate::board::Location::with_coast(prov, unit.coast);
                self.push(Order::hold(unit.power, unit.kind, at), unit, false);
            }
        }
    }

    fn push(&mut self, order: Order, unit: Unit, void: bool) {
        let prov = order.at.province;
        let (target, aux_from, aux_to, convoyed) = match order.action {
            Action::Hold => (NONE, NONE, NONE, false),
            Action::Move { to } => {
                let convoyed = unit.kind == UnitKind::Army
                    && !is_adjacent(prov, Coast::None, to.province, Coast::None, UnitKind::Army);
                (to.province as u8, NONE, NONE, convoyed)
            }
            Action::SupportHold { target, .. } => (NONE, target as u8, NONE, false),
            Action::SupportMove { from, to, .. } => (NONE, from as u8, to as u8, false),
            Action::Convoy { from, to } => (NONE, from as u8, to as u8, false),
        };
        self.lookup[prov.index()] = self.slots.len() as i16;
        self.slots.push(Slot {
            order,
            state: ResState::Unresolved,
            resolution: false,
            prov: prov as u8,
            target,
            aux_from,
            aux_to,
            convoyed,
            void,
        });
    }

    #[inline]
    fn slot_at(&self, prov: u8) -> Option<Slot> {
        if prov == NONE {
            return None;
        }
        let idx = self.lookup[prov as usize];
        (idx >= 0).then(|| self.slots[idx as usize])
    }

    fn adjudicate(&mut self, prov: u8, state: &GameState) -> bool {
        if prov == NONE {
            return false;
        }
        let idx = self.lookup[prov as usize];
        if idx < 0 {
            return false;
        }
        let idx = idx as usize;

        match self.slots[idx].state {
            ResState::Resolved | ResState::Guessing => return self.slots[idx].resolution,
            ResState::Unresolved => {}
        }

        self.slots[idx].state = ResState::Guessing;
        self.slots[idx].resolution = true;

        let result = self.resolve_slot(prov, state);

        if self.slots[idx].state == ResState::Guessing && result != self.slots[idx].resolution {
            self.slots[idx].resolution = result;
            let second = self.resolve_slot(prov, state);
            self.slots[idx].state = ResState::Resolved;
            self.slots[idx].resolution = second;
            return second;
        }

        self.slots[idx].state = ResState::Resolved;
        self.slots[idx].resolution = result;
        result
    }

    fn resolve_slot(&mut self, prov: u8, state: &GameState) -> bool {
        let Some(slot) = self.slot_at(prov) else { return false };
        match slot.order.action {
            Action::Hold => true,
            Action::Move { .. } => self.resolve_move(slot, state),
            Action::SupportHold { .. } | Action::SupportMove { .. } => {
                self.resolve_support(slot, state)
            }
            Action::Convoy { .. } => self.resolve_convoy(slot, state),
        }
    }

    fn resolve_move(&mut self, slot: Slot, state: &GameState) -> bool {
        if slot.convoyed && !self.has_convoy_path(slot, state) {
            return false;
        }

        let attack = self.attack_strength(slot, state);

        // Head-to-head: the defender's own attack replaces its hold strength.
        let head_to_head = self
            .slot_at(slot.target)
            .filter(|d| d.is_move() && d.target == slot.prov && !d.convoyed && !slot.convoyed);
        match head_to_head {
            Some(defender) => {
                if attack <= self.attack_strength(defender, state) {
                    return false;
                }
            }
            None => {
                if attack <= self.hold_strength(slot.target, state) {
                    return false;
                }
            }
        }

        for i in 0..self.slots.len() {
            let other = self.slots[i];
            if other.prov == slot.prov || !other.is_move() || other.target != slot.target {
                continue;
            }
            if attack <= self.prevent_strength(other, state) {
                return false;
            }
        }
        true
    }

    fn resolve_support(&mut self, slot: Slot, state: &GameState) -> bool {
        let power = slot.order.power;
        for i in 0..self.slots.len() {
            let other = self.slots[i];
            if !other.is_move() || other.target != slot.prov || other.order.power == power {
                continue;
            }
            if other.convoyed && !self.has_convoy_path(other, state) {
                continue;
            }
            // An attack from the province the support is aimed at only
            // cuts by dislodging the supporter.
            if slot.aux_to != NONE && other.prov == slot.aux_to {
                if self.adjudicate(other.prov, state) {
                    return false;
                }
                continue;
            }
            return false;
        }
        true
    }

    fn resolve_convoy(&mut self, slot: Slot, state: &GameState) -> bool {
        for i in 0..self.slots.len() {
            let other = self.slots[i];
            if other.is_move() && other.target == slot.prov && self.adjudicate(other.prov, state) {
                return false;
            }
        }
        true
    }

    /// True if the unit at `target` stays there and belongs to `power`.
    fn own_unit_stays(
        &mut self,
        target: u8,
        attacker: u8,
        power: crate::board::Power,
        state: &GameState,
    ) -> bool {
        let Some(occupant) = state.units.get(target as usize).copied().flatten() else {
            return false;
        };
        if occupant.power != power {
            return false;
        }
        match self.slot_at(target) {
            Some(occ) if occ.is_move() => occ.target == attacker || !self.adjudicate(target, state),
            _ => true,
        }
    }

    fn attack_strength(&mut self, slot: Slot, state: &GameState) -> i32 {
        if !slot.is_move() {
            return 0;
        }
        if self.own_unit_stays(slot.target, slot.prov, slot.order.power, state) {
            return 0;
        }

        let defender_power = state
            .units
            .get(slot.target as usize)
            .copied()
            .flatten()
            .map(|u| u.power);

        let mut strength = 1;
        for i in 0..self.slots.len() {
            let other = self.slots[i];
            if !matches!(other.order.action, Action::SupportMove { .. }) {
                continue;
            }
            if other.aux_from != slot.prov || other.aux_to != slot.target {
                continue;
            }
            // A power never helps dislodge its own unit.
            if Some(other.order.power) == defender_power
                && self.own_unit_stays(slot.target, slot.prov, other.order.power, state)
            {
                continue;
            }
            if self.adjudicate(other.prov, state) {
                strength += 1;
            }
        }
        strength
    }

    fn hold_strength(&mut self, prov: u8, state: &GameState) -> i32 {
        let Some(slot) = self.slot_at(prov) else { return 0 };
        if slot.is_move() {
            return if self.adjudicate(prov, state) { 0 } else { 1 };
        }
        let mut strength = 1;
        for i in 0..self.slots.len() {
            let other = self.slots[i];
            if matches!(other.order.action, Action::SupportHold { .. })
                && other.aux_from == prov
                && self.adjudicate(other.prov, state)
            {
                strength += 1;
            }
        }
        strength
    }

    fn prevent_strength(&mut self, slot: Slot, state: &GameState) -> i32 {
        if !slot.is_move() {
            return 0;
        }
        if slot.convoyed && !self.has_convoy_path(slot, state) {
            return 0;
        }
        // A unit that loses a head-to-head battle prevents nothing.
        if let Some(defender) = self.slot_at(slot.target) {
            if defender.is_move()
                && defender.target == slot.prov
                && !defender.convoyed
                && !slot.convoyed
                && !self.adjudicate(slot.prov, state)
            {
                return 0;
            }
        }
        let mut strength = 1;
        for i in 0..self.slots.len() {
            let other = self.slots[i];
            if matches!(other.order.action, Action::SupportMove { .. })
                && other.aux_from == slot.prov
                && other.aux_to == slot.target
                && self.adjudicate(other.prov, state)
            {
                strength += 1;
            }
        }
        strength
    }

    /// Breadth-first search over successful convoy orders for this army.
    fn has_convoy_path(&mut self, slot: Slot, state: &GameState) -> bool {
        let (Some(src), Some(dst)) =
            (Province::from_index(slot.prov as usize), Province::from_index(slot.target as usize))
        else {
            return false;
        };

        let fleets: Vec<Slot> = self
            .slots
            .iter()
            .copied()
            .filter(|c| {
                matches!(c.order.action, Action::Convoy { .. })
                    && c.aux_from == slot.prov
                    && c.aux_to == slot.target
            })
            .collect();

        let mut visited = [false; PROVINCE_COUNT];
        let mut queue: Vec<Province> = Vec::with_capacity(fleets.len());
        let mut head = 0;
        let mut from = src;
        loop {
            if from != src && is_adjacent(from, Coast::None, dst, Coast::None, UnitKind::Fleet) {
                return true;
            }
            for c in &fleets {
                let cp = c.order.at.province;
                if visited[cp.index()]
                    || !is_adjacent(from, Coast::None, cp, Coast::None, UnitKind::Fleet)
                {
                    continue;
                }
                if self.adjudicate(c.prov, state) {
                    visited[cp.index()] = true;
                    queue.push(cp);
                }
            }
            if head >= queue.len() {
                return false;
            }
            from = queue[head];
            head += 1;
        }
    }

    fn build_results(&self, state: &GameState) -> (Vec<ResolvedOrder>, Vec<Dislodgement>) {
        let mut winner_from = [NONE; PROVINCE_COUNT];
        for s in &self.slots {
            if s.is_move() && s.resolution && s.target != NONE {
                winner_from[s.target as usize] = s.prov;
            }
        }

        let mut results = Vec::with_capacity(self.slots.len());
        let mut dislodged = Vec::new();
        for s in &self.slots {
            let mut outcome = match s.order.action {
                _ if s.void => Outcome::Void,
                Action::Move { .. } if s.resolution => Outcome::Succeeded,
                Action::Move { .. } => Outcome::Bounced,
                Action::SupportHold { .. } | Action::SupportMove { .. } if s.resolution => {
                    Outcome::Succeeded
                }
                Action::SupportHold { .. } | Action::SupportMove { .. } => Outcome::Cut,
                Action::Convoy { .. } if s.resolution => Outcome::Succeeded,
                Action::Convoy { .. } => Outcome::Failed,
                Action::Hold => Outcome::Succeeded,
            };

            let attacker = winner_from[s.prov as usize];
            let moved_away = s.is_move() && s.resolution;
            if attacker != NONE && !moved_away {
                outcome = Outcome::Dislodged;
                let province = s.order.at.province;
                if let (Some(unit), Some(attacker_from)) =
                    (state.unit_at(province), Province::from_index(attacker as usize))
                {
                    dislodged.push(Dislodgement { province, unit, attacker_from });
                }
            }
            results.push(ResolvedOrder { order: s.order, outcome });
        }
        (results, dislodged)
    }
}

/// One-shot convenience wrapper around [`Resolver`].
pub fn resolve_orders(
    orders: &[Order],
    state: &GameState) -> (Vec<ResolvedOrder>, Vec<Dislodgement>,
) {
    Resolver::new(orders.len()).resolve(orders, state)
}

/// Applies an adjudicated movement phase to `state`.
///
/// Dislodged units move to the dislodged set first; then every successful
/// mover is lifted off the board and placed at its destination, so
/// rotations and swaps by convoy land correctly.
pub fn apply_resolution(
    state: &mut GameState,
    results: &[ResolvedOrder],
    dislodged: &[Dislodgement],
) {
    for d in dislodged {
        state.units[d.province.index()] = None;
        state.dislodged[d.province.index()] = Some(crate::board::Dislodged {
            unit: d.unit,
            attacker_from: d.attacker_from,
        });
    }

    let mut arrivals: Vec<(Province, Unit)> = Vec::new();
    for r in results {
        if r.outcome != Outcome::Succeeded {
            continue;
        }
        let Action::Move { to } = r.order.action else { continue };
        let src = r.order.at.province;
        let Some(mut unit) = state.units[src.index()].take() else { continue };
        unit.coast = arrival_coast(unit, src, to.province, to.coast);
        arrivals.push((to.province, unit));
    }
    for (dst, unit) in arrivals {
        state.units[dst.index()] = Some(unit);
    }
}

/// Coast a unit ends up on after moving to `dst`.
pub(crate) fn arrival_coast(unit: Unit, src: Province, dst: Province, requested: Coast) -> Coast {
    if unit.kind != UnitKind::Fleet || !dst.has_coasts() {
        return Coast::None;
    }
    if requested != Coast::None {
        return requested;
    }
    fleet_coasts_to(src, unit.coast, dst).first().copied().unwrap_or(Coast::None)
}
