//! Adjacency graph of the standard map.
//!
//! Edges are declared once, undirected, under the alphabetically earlier
//! province and expanded in both directions on first use. Fleet edges that
//! touch a split-coast province name the coast on that side.

use std::sync::LazyLock;

use super::province::{Coast, Province, PROVINCE_COUNT};
use super::unit::UnitKind;

/// One directed edge of the expanded graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub from: Province,
    pub from_coast: Coast,
    pub to: Province,
    pub to_coast: Coast,
    pub army: bool,
    pub fleet: bool,
}

impl Edge {
    #[inline]
    pub fn passable(&self, kind: UnitKind) -> bool {
        match kind {
            UnitKind::Army => self.army,
            UnitKind::Fleet => self.fleet,
        }
    }
}

#[derive(Clone, Copy)]
enum Link {
    /// Army only.
    A(Province),
    /// Fleet only.
    F(Province),
    /// Army and fleet.
    B(Province),
    /// Fleet only, with a coast on either side.
    C(Coast, Province, Coast),
}

const N: Coast = Coast::None;
const NC: Coast = Coast::North;
const SC: Coast = Coast::South;
const EC: Coast = Coast::East;

use Link::{A, B, C, F};
use Province::*;

static LINKS: &[(Province, &[Link])] = &[
    (Adr, &[F(Alb), F(Apu), F(Ion), F(Tri), F(Ven)]),
    (Aeg, &[C(N, Bul, SC), F(Con), F(Eas), F(Gre), F(Ion), F(Smy)]),
    (Alb, &[B(Gre), F(Ion), A(Ser), B(Tri)]),
    (Ank, &[B(Arm), F(Bla), B(Con), A(Smy)]),
    (Apu, &[F(Ion), B(Nap), A(Rom), B(Ven)]),
    (Arm, &[F(Bla), B(Sev), A(Smy), A(Syr)]),
    (Bal, &[F(Ber), F(Bot), F(Den), F(Kie), F(Lvn), F(Pru), F(Swe)]),
    (Bar, &[F(Nrg), F(Nwy), C(N, Stp, NC)]),
    (Bel, &[A(Bur), F(Eng), B(Hol), F(Nth), B(Pic), A(Ruh)]),
    (Ber, &[B(Kie), A(Mun), B(Pru), A(Sil)]),
    (Bla, &[C(N, Bul, EC), F(Con), F(Rum), F(Sev)]),
    (Boh, &[A(Gal), A(Mun), A(Sil), A(Tyr), A(Vie)]),
    (Bot, &[F(Fin), F(Lvn), C(N, Stp, SC), F(Swe)]),
    (Bre, &[F(Eng), B(Gas), F(Mao), A(Par), B(Pic)]),
    (Bud, &[A(Gal), A(Rum), A(Ser), A(Tri), A(Vie)]),
    (
        Bul,
        &[
            C(EC, Con, N),
            A(Con),
            C(SC, Con, N),
            A(Gre),
            C(SC, Gre, N),
            C(EC, Rum, N),
            A(Rum),
            A(Ser),
        ],
    ),
    (Bur, &[A(Gas), A(Mar), A(Mun), A(Par), A(Pic), A(Ruh)]),
    (Cly, &[B(Edi), B(Lvp), F(Nao), F(Nrg)]),
    (Con, &[B(Smy)]),
    (Den, &[F(Hel), B(Kie), F(Nth), F(Ska), B(Swe)]),
    (Eas, &[F(Ion), F(Smy), F(Syr)]),
    (Edi, &[A(Lvp), F(Nrg), F(Nth), B(Yor)]),
    (Eng, &[F(Iri), F(Lon), F(Mao), F(Nth), F(Pic), F(Wal)]),
    (Fin, &[A(Nwy), A(Stp), C(N, Stp, SC), B(Swe)]),
    (Gal, &[A(Rum), A(Sil), A(Ukr), A(Vie), A(War)]),
    (Gas, &[F(Mao), A(Mar), A(Par), A(Spa), C(N, Spa, NC)]),
    (Gol, &[F(Mar), F(Pie), C(N, Spa, SC), F(Tus), F(Tys), F(Wes)]),
    (Gre, &[F(Ion), A(Ser)]),
    (Hel, &[F(Hol), F(Kie), F(Nth)]),
    (Hol, &[F(Nth), A(Ruh)]),
    (Ion, &[F(Nap), F(Tun), F(Tys)]),
    (Iri, &[F(Lvp), F(Mao), F(Nao), F(Wal)]),
    (Kie, &[A(Mun), A(Ruh)]),
    (Lon, &[F(Nth), B(Wal), B(Yor)]),
    (Lvn, &[A(Mos), B(Pru), A(Stp), C(N, Stp, SC), A(War)]),
    (Lvp, &[F(Nao), B(Wal), A(Yor)]),
    (Mao, &[F(Naf), F(Nao), F(Por), C(N, Spa, NC), C(N, Spa, SC), F(Wes)]),
    (Mar, &[B(Pie), A(Spa), C(N, Spa, SC)]),
    (Mos, &[A(Sev), A(Stp), A(Ukr), A(War)]),
    (Mun, &[A(Ruh), A(Sil), A(Tyr)]),
    (Naf, &[B(Tun), F(Wes)]),
    (Nao, &[F(Nrg)]),
    (Nap, &[B(Rom), F(Tys)]),
    (Nrg, &[F(Nth), F(Nwy)]),
    (Nth, &[F(Nwy), F(Ska), F(Yor)]),
    (Nwy, &[F(Ska), A(Stp), C(N, Stp, NC), B(Swe)]),
    (Par, &[A(Pic)]),
    (Pie, &[B(Tus), A(Tyr), A(Ven)]),
    (Por, &[A(Spa), C(N, Spa, NC), C(N, Spa, SC)]),
    (Pru, &[A(Sil), A(War)]),
    (Rom, &[B(Tus), F(Tys), A(Ven)]),
    (Rum, &[A(Ser), B(Sev), A(Ukr)]),
    (Ser, &[A(Tri)]),
    (Sev, &[A(Ukr)]),
    (Sil, &[A(War)]),
    (Ska, &[F(Swe)]),
    (Smy, &[B(Syr)]),
    (Spa, &[C(SC, Wes, N)]),
    (Tri, &[A(Tyr), B(Ven), A(Vie)]),
    (Tun, &[F(Tys), F(Wes)]),
    (Tus, &[F(Tys), A(Ven)]),
    (Tyr, &[A(Ven), A(Vie)]),
    (Tys, &[F(Wes)]),
    (Ukr, &[A(War)]),
    (Wal, &[A(Yor)]),
];

/// Number of directed edges after expansion.
pub const EDGE_COUNT: usize = 434;

struct Graph {
    edges: Vec<Edge>,
    offsets: [(u16, u16); PROVINCE_COUNT],
}

static GRAPH: LazyLock<Graph> = LazyLock::new(|| {
    let mut edges = Vec::with_capacity(EDGE_COUNT);
    for &(from, links) in LINKS {
        for &link in links {
            let (from_coast, to, to_coast, army, fleet) = match link {
                A(to) => (N, to, N, true, false),
                F(to) => (N, to, N, false, true),
                B(to) => (N, to, N, true, true),
                C(fc, to, tc) => (fc, to, tc, false, true),
            };
            edges.push(Edge { from, from_coast, to, to_coast, army, fleet });
            edges.push(Edge {
                from: to,
                from_coast: to_coast,
                to: from,
                to_coast: from_coast,
                army,
                fleet,
            });
        }
    }
    edges.sort_by_key(|e| (e.from, e.to, e.from_coast, e.to_coast));

    let mut offsets = [(0u16, 0u16); PROVINCE_COUNT];
    let mut i = 0;
    for (p, slot) in offsets.iter_mut().enumerate() {
        let start = i;
        while i < edges.len() && edges[i].from.index() == p {
            i += 1;
        }
        *slot = (start as u16, i as u16);
    }
    Graph { edges, offsets }
});

/// All directed edges leaving `from`.
#[inline]
pub fn edges_from(from: Province) -> &'static [Edge] {
    let graph = &*GRAPH;
    let (start, end) = graph.offsets[from.index()];
    &graph.edges[start as usize..end as usize]
}

/// Every directed edge of the map.
pub fn all_edges() -> &'static [Edge] {
    &GRAPH.edges
}

#[inline]
fn coast_ok(have: Coast, edge: Coast) -> bool {
    have == Coast::None || edge == Coast::None || have == edge
}

/// True if a unit of `kind` can move from `src` to `dst` in one step.
///
/// A `Coast::None` on either side matches any coast of that province.
pub fn is_adjacent(
    src: Province,
    src_coast: Coast,
    dst: Province,
    dst_coast: Coast,
    kind: UnitKind,
) -> bool {
    edges_from(src).iter().any(|e| {
        e.to == dst
            && e.passable(kind)
            && coast_ok(src_coast, e.from_coast)
            && coast_ok(dst_coast, e.to_coast)
    })
}

/// Coasts of `dst` a fleet at `src`/`src_coast` can reach. `[Coast::None]`
/// for provinces without split coasts, empty if unreachable.
pub fn fleet_coasts_to(src: Province, src_coast: Coast, dst: Province) -> Vec<Coast> {
    let mut coasts = Vec::new();
    for e in edges_from(src) {
        if e.to == dst
            && e.fleet
            && coast_ok(src_coast, e.from_coast)
            && !coasts.contains(&e.to_coast)
        {
            coasts.push(e.to_coast);
        }
    }
    coasts
}

/// Distinct provinces a unit of `kind` at `prov`/`coast` can move to.
pub fn adjacent_provinces(prov: Province, coast: Coast, kind: UnitKind) -> Vec<Province> {
    let mut out = Vec::with_capacity(8);
    for e in edges_from(prov) {
        if e.passable(kind) && coast_ok(coast, e.from_coast) && !out.contains(&e.to) {
            out.push(e.to);
        }
    }
    out
}

/// True if any edge, of either kind, joins `a` and `b`.
pub fn borders(a: Province, b: Province) -> bool {
    edges_from(a).iter().any(|e| e.to == b)
}
