//! Distance oracle.
//!
//! All-pairs shortest hop counts over army-passable and fleet-passable
//! edges, computed once on first use and shared read-only afterwards.
//! Distances are taken at province level; coasts are ignored.

use std::sync::LazyLock;

use crate::board::{
    edges_from, GameState, Power, Province, UnitKind, ALL_PROVINCES, PROVINCE_COUNT,
    SUPPLY_CENTER_COUNT,
};

/// Dense `PROVINCE_COUNT x PROVINCE_COUNT` table; -1 is unreachable.
struct DistanceTable {
    dist: Box<[i16]>,
    sc_indices: [u8; SUPPLY_CENTER_COUNT],
}

static ARMY: LazyLock<DistanceTable> = LazyLock::new(|| DistanceTable::build(UnitKind::Army));
static FLEET: LazyLock<DistanceTable> = LazyLock::new(|| DistanceTable::build(UnitKind::Fleet));

impl DistanceTable {
    fn build(kind: UnitKind) -> Self {
        let mut dist = vec![-1i16; PROVINCE_COUNT * PROVINCE_COUNT].into_boxed_slice();
        let mut queue: Vec<Province> = Vec::with_capacity(PROVINCE_COUNT);

        for src in ALL_PROVINCES {
            let row = src.index() * PROVINCE_COUNT;
            dist[row + src.index()] = 0;
            queue.clear();
            queue.push(src);
            let mut head = 0;
            while head < queue.len() {
                let cur = queue[head];
                head += 1;
                let d = dist[row + cur.index()];
                for e in edges_from(cur) {
                    if !e.passable(kind) || dist[row + e.to.index()] >= 0 {
                        continue;
                    }
                    dist[row + e.to.index()] = d + 1;
                    queue.push(e.to);
                }
            }
        }

        let mut sc_indices = [0u8; SUPPLY_CENTER_COUNT];
        let centers = ALL_PROVINCES.iter().filter(|p| p.is_supply_center());
        for (slot, p) in sc_indices.iter_mut().zip(centers) {
            *slot = p.index() as u8;
        }
        DistanceTable { dist, sc_indices }
    }

    #[inline]
    fn get(&self, from: Province, to: Province) -> i16 {
        self.dist[from.index() * PROVINCE_COUNT + to.index()]
    }
}

#[inline]
fn table(kind: UnitKind) -> &'static DistanceTable {
    match kind {
        UnitKind::Army => &ARMY,
        UnitKind::Fleet => &FLEET,
    }
}

/// Hops for a unit of `kind` from `from` to `to`; `None` if unreachable.
#[inline]
pub fn distance(kind: UnitKind, from: Province, to: Province) -> Option<u32> {
    let d = table(kind).get(from, to);
    (d >= 0).then_some(d as u32)
}

/// Closest supply center not owned by `power`, for a unit of `kind`.
pub fn nearest_unclaimed(
    kind: UnitKind,
    from: Province,
    power: Power,
    state: &GameState,
) -> Option<(Province, u32)> {
    let t = table(kind);
    let mut best: Option<(Province, u32)> = None;
    for &sci in &t.sc_indices {
        if state.sc_owner[sci as usize] == Some(power) {
            continue;
        }
        let Some(sc) = Province::from_index(sci as usize) else { continue };
        let d = t.get(from, sc);
        if d < 0 {
            continue;
        }
        if best.map_or(true, |(_, b)| (d as u32) < b) {
            best = Some((sc, d as u32));
        }
    }
    best
}

/// Shorter of the army and fleet answers from [`nearest_unclaimed`].
pub fn nearest_unclaimed_any(
    from: Province,
    power: Power,
    state: &GameState,
) -> Option<(Province, u32)> {
    let army = nearest_unclaimed(UnitKind::Army, from, power, state);
    let fleet = nearest_unclaimed(UnitKind::Fleet, from, power, state);
    match (army, fleet) {
        (Some(a), Some(f)) => Some(if f.1 < a.1 { f } else { a }),
        (a, f) => a.or(f),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Province::*;

    #[test]
    fn self_distance_is_zero() {
        for p in ALL_PROVINCES {
            assert_eq!(distance(UnitKind::Army, p, p), Some(0));
            assert_eq!(distance(UnitKind::Fleet, p, p), Some(0));
        }
    }

    #[test]
    fn army_hops() {
        assert_eq!(distance(UnitKind::Army, Vie, Boh), Some(1));
        assert_eq!(distance(UnitKind::Army, Vie, Mun), Some(2));
        assert_eq!(distance(UnitKind::Army, Vie, Adr), None);
        assert_eq!(distance(UnitKind::Army, Par, Lon), None);
    }

    #[test]
    fn fleet_hops() {
        assert_eq!(distance(UnitKind::Fleet, Eng, Nth), Some(1));
        assert_eq!(distance(UnitKind::Fleet, Nth, Mun), None);
        assert_eq!(distance(UnitKind::Fleet, Lon, Bre), Some(2));
    }

    #[test]
    fn symmetric_where_edges_are() {
        for a in ALL_PROVINCES {
            for b in ALL_PROVINCES {
                assert_eq!(distance(UnitKind::Army, a, b), distance(UnitKind::Army, b, a));
            }
        }
    }

    #[test]
    fn nearest_unclaimed_from_start() {
        let gs = GameState::initial();
        let (sc, d) = nearest_unclaimed(UnitKind::Army, Bud, Power::Austria, &gs).unwrap();
        assert_eq!(d, 1);
        assert!(sc == Rum || sc == Ser);
        let (_, d) = nearest_unclaimed(UnitKind::Army, Par, Power::France, &gs).unwrap();
        assert_eq!(d, 2);
        let (_, d) = nearest_unclaimed_any(Lon, Power::England, &gs).unwrap();
        assert_eq!(d, 2);
    }
}
