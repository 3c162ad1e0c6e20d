//! Every tier must hand back a complete, legal order set for each phase.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use rand::rngs::SmallRng;
use rand::SeedableRng;

use stratagem::arena::{run_game, ArenaConfig};
use stratagem::board::{
    supply_centers, Action, Adjustment, Dislodged, GameState, Location, Order, Phase, Power,
    Province, Season, Unit, UnitKind, ALL_POWERS,
};
use stratagem::config::EngineConfig;
use stratagem::eval::evaluate;
use stratagem::opening_book::{BookMatchConfig, OpeningBook};
use stratagem::protocol::dfen::parse_dfen;
use stratagem::resolve::{
    advance_state, apply_resolution, is_game_over, validate_build, validate_order, validate_retreat,
    Resolver,
};
use stratagem::search::{adaptive_k, unit_candidates};
use stratagem::strategy::{decide, Context, Decision, Tier};

/// Fall 1905: split-coast fleets in StP, Spain and Bulgaria, and armies in
/// Yorkshire and Tunis that can only reach most centers by convoy.
const MIDGAME_MOVEMENT: &str = "1905fm/Aavie,Aabud,Aaser,Afgre,Efnth,Eayor,Efnwg,Ffspa.sc,Fagas,\
Ffmao,Fabur,Gamun,Gaber,Gfkie,Gahol,Ifion,Iatun,Iaven,Iftys,Rfstp.nc,Ramos,Rfbot,Rawar,Tfbul.ec,\
Tarum,Tfbla,Tacon/Avie,Abud,Atri,Aser,Agre,Elon,Eedi,Elvp,Enwy,Fbre,Fpar,Fmar,Fspa,Fpor,Gber,Gkie,\
Gmun,Ghol,Gden,Irom,Inap,Iven,Itun,Rmos,Rwar,Rstp,Rsev,Rswe,Tank,Tcon,Tsmy,Tbul,Trum,Nbel/-";

/// The same year after Turkey took Serbia and Austria drove Italy out of
/// the Ionian.
const MIDGAME_RETREAT: &str = "1905fr/Aavie,Aabud,Afion,Efnth,Eayor,Efnwg,Ffspa.sc,Fagas,Ffmao,\
Fabur,Gamun,Gaber,Gfkie,Gahol,Iatun,Iaven,Iftys,Rfstp.nc,Ramos,Rfbot,Rawar,Tfbul.ec,Taser,Tfbla,\
Tacon/Avie,Abud,Atri,Aser,Agre,Elon,Eedi,Elvp,Enwy,Fbre,Fpar,Fmar,Fspa,Fpor,Gber,Gkie,Gmun,Ghol,\
Gden,Irom,Inap,Iven,Itun,Rmos,Rwar,Rstp,Rsev,Rswe,Tank,Tcon,Tsmy,Tbul,Trum,Nbel/Aaser<rum,\
Ifion<gre";

/// Winter 1905: Austria must remove a unit, Russia may build in StP and
/// Sevastopol, Germany has no free home.
const MIDGAME_ADJUSTMENT: &str = "1905fb/Aavie,Aabud,Aaser,Afgre,Efnth,Eayor,Efnwg,Ffspa.sc,Fagas,\
Ffmao,Fabur,Gamun,Gaber,Gfkie,Gahol,Ifion,Iatun,Iaven,Iftys,Ramos,Rfbot,Rawar,Tfbul.ec,Tfbla,\
Tacon/Avie,Abud,Atri,Elon,Eedi,Elvp,Enwy,Fbre,Fpar,Fmar,Fspa,Fpor,Gber,Gkie,Gmun,Ghol,Gden,Irom,\
Inap,Iven,Itun,Rmos,Rwar,Rstp,Rsev,Rswe,Rrum,Tank,Tcon,Tsmy,Tbul,Nser,Ngre,Nbel/-";

fn tiers() -> Vec<Tier> {
    vec![Tier::Hold, Tier::Random, Tier::Heuristic, Tier::Tactical, Tier::PostureRegret]
}

fn decide_for(tier: &Tier, state: &GameState, power: Power, seed: u64) -> Decision {
    let config = EngineConfig::default();
    let ctx = Context::new(&config, Instant::now() + Duration::from_millis(150));
    let mut rng = SmallRng::seed_from_u64(seed);
    decide(tier, state, power, &ctx, &mut rng)
}

fn assert_complete_movement(tier: &Tier, state: &GameState, power: Power, seed: u64) -> Vec<Order> {
    let Decision::Movement(orders) = decide_for(tier, state, power, seed) else {
        panic!("{tier:?}: wrong phase");
    };
    assert_eq!(orders.len(), state.unit_count(power), "{tier:?} {power}");

    let mut units = HashSet::new();
    let mut targets = HashSet::new();
    for order in &orders {
        assert_eq!(order.power, power);
        assert!(validate_order(order, state).is_ok(), "{tier:?}: illegal {order}");
        assert!(units.insert(order.province()), "{tier:?}: two orders for {}", order.province());
        if let Some(to) = order.move_target() {
            assert!(targets.insert(to), "{tier:?}: two moves into {to}");
        }
    }
    orders
}

#[test]
fn movement_orders_are_complete_and_legal() {
    let state = GameState::initial();
    for tier in tiers() {
        for power in ALL_POWERS {
            assert_complete_movement(&tier, &state, power, 5);
        }
    }
}

#[test]
fn midgame_movement_orders_are_complete_and_legal() {
    let state = parse_dfen(MIDGAME_MOVEMENT).expect("valid position");
    for tier in tiers() {
        for power in ALL_POWERS {
            assert_complete_movement(&tier, &state, power, 13);
        }
    }
}

#[test]
fn boxed_in_unit_gets_exactly_one_order() {
    // Bohemia's every neighbor holds an Austrian army.
    use Province::*;
    let mut state = GameState::empty(1904, Season::Spring, Phase::Movement);
    for p in [Boh, Mun, Sil, Gal, Vie, Tyr] {
        state.place(p, Unit::new(Power::Austria, UnitKind::Army));
    }
    for sc in [Vie, Bud, Tri, Mun] {
        state.set_owner(sc, Some(Power::Austria));
    }

    let lists = unit_candidates(Power::Austria, &state, 3, None);
    let boh = lists.iter().find(|l| l[0].province() == Boh).expect("bohemia list");
    assert!(boh.iter().any(|o| o.action == Action::Hold));

    for tier in [Tier::Heuristic, Tier::Tactical, Tier::PostureRegret] {
        let orders = assert_complete_movement(&tier, &state, Power::Austria, 21);
        assert_eq!(orders.iter().filter(|o| o.province() == Boh).count(), 1, "{tier:?}");
    }
}

#[test]
fn retreat_orders_cover_dislodged_units() {
    let mut state = GameState::initial();
    state.season = Season::Fall;
    state.phase = Phase::Retreat;
    state.units[Province::Ser.index()] = Some(Unit::new(Power::Turkey, UnitKind::Army));
    state.dislodged[Province::Ser.index()] =
        Some(Dislodged {
            unit: Unit::new(Power::Austria, UnitKind::Army),
            attacker_from: Province::Bul,
        });

    for tier in tiers() {
        let Decision::Retreat(orders) = decide_for(&tier, &state, Power::Austria, 9) else {
            panic!("{tier:?}: wrong phase");
        };
        assert_eq!(orders.len(), 1, "{tier:?}");
        assert!(validate_retreat(&orders[0], &state).is_ok(), "{tier:?}: {}", orders[0]);

        let Decision::Retreat(none) = decide_for(&tier, &state, Power::France, 9) else {
            panic!("{tier:?}: wrong phase");
        };
        assert!(none.is_empty());
    }
}

#[test]
fn build_orders_respect_the_delta() {
    let mut state = GameState::initial();
    state.season = Season::Fall;
    state.phase = Phase::Build;
    state.units[Province::Vie.index()] = None;
    state.units[Province::Bud.index()] = None;
    state.set_owner(Province::Ser, Some(Power::Austria));
    state.set_owner(Province::Mun, Some(Power::Austria));
    // Austria: 5 centers, 1 unit. Germany: 2 centers, 3 units.

    for tier in tiers() {
        let Decision::Build(builds) = decide_for(&tier, &state, Power::Austria, 2) else {
            panic!("{tier:?}: wrong phase");
        };
        assert!(builds.len() <= 4, "{tier:?}");
        for b in &builds {
            assert!(validate_build(b, &state).is_ok(), "{tier:?}: {b}");
        }

        let Decision::Build(disbands) = decide_for(&tier, &state, Power::Germany, 2) else {
            panic!("{tier:?}: wrong phase");
        };
        // The hold tier leaves disbands to civil disorder.
        let expected = if matches!(tier, Tier::Hold) { 0 } else { 1 };
        assert_eq!(disbands.len(), expected, "{tier:?}");
        for d in &disbands {
            assert!(validate_build(d, &state).is_ok(), "{tier:?}: {d}");
        }
    }
}

#[test]
fn midgame_retreats_cover_every_dislodged_unit() {
    let state = parse_dfen(MIDGAME_RETREAT).expect("valid position");
    for tier in tiers() {
        for power in ALL_POWERS {
            let Decision::Retreat(orders) = decide_for(&tier, &state, power, 4) else {
                panic!("{tier:?}: wrong phase");
            };
            let owed = state.dislodged_of(power).count();
            assert_eq!(orders.len(), owed, "{tier:?} {power}");
            for order in &orders {
                assert!(validate_retreat(order, &state).is_ok(), "{tier:?}: {order}");
            }
        }
    }
}

#[test]
fn midgame_adjustments_match_the_delta() {
    let state = parse_dfen(MIDGAME_ADJUSTMENT).expect("valid position");
    assert_eq!(state.adjustment_delta(Power::Austria), -1);
    assert_eq!(state.adjustment_delta(Power::Russia), 3);

    for tier in tiers() {
        for power in ALL_POWERS {
            let Decision::Build(orders) = decide_for(&tier, &state, power, 6) else {
                panic!("{tier:?}: wrong phase");
            };
            for order in &orders {
                assert_eq!(order.power, power);
                assert!(validate_build(order, &state).is_ok(), "{tier:?}: {order}");
            }
            let delta = state.adjustment_delta(power);
            let builds =
                orders.iter().filter(|o| matches!(o.adjustment, Adjustment::Build { .. })).count();
            assert!(builds <= delta.max(0) as usize, "{tier:?} {power}");
            if delta < 0 && !matches!(tier, Tier::Hold) {
                assert_eq!(orders.len(), delta.unsigned_abs() as usize, "{tier:?} {power}");
            }
        }

        // Only StP and Sevastopol are free, so Russia cannot use its third build.
        let Decision::Build(russia) = decide_for(&tier, &state, Power::Russia, 6) else {
            panic!("{tier:?}: wrong phase");
        };
        let placed: Vec<Province> = russia
            .iter()
            .filter(|o| matches!(o.adjustment, Adjustment::Build { .. }))
            .filter_map(|o| o.province())
            .collect();
        assert!(placed.len() <= 2, "{tier:?}: {placed:?}");
        assert_eq!(placed.iter().collect::<HashSet<_>>().len(), placed.len(), "{tier:?}");
    }
}

#[test]
fn a_resolved_fall_capture_wins_the_game() {
    let mut state = GameState::empty(1910, Season::Fall, Phase::Movement);
    let centers: Vec<Province> =
        supply_centers().filter(|&p| p != Province::Bel).take(17).collect();
    for &sc in &centers {
        state.set_owner(sc, Some(Power::France));
    }
    state.place(Province::Bur, Unit::new(Power::France, UnitKind::Army));
    assert_eq!(is_game_over(&state), None);
    let before = evaluate(&state, Power::France);

    let order = Order::moving(
        Power::France,
        UnitKind::Army,
        Location::new(Province::Bur),
        Location::new(Province::Bel),
    );
    let mut resolver = Resolver::default();
    let (results, dislodged) = resolver.resolve(&[order], &state);
    apply_resolution(&mut state, &results, &dislodged);
    advance_state(&mut state, !dislodged.is_empty());

    assert_eq!(state.owner(Province::Bel), Some(Power::France));
    assert_eq!(state.supply_center_count(Power::France), 18);
    assert_eq!(is_game_over(&state), Some(Power::France));
    assert!(evaluate(&state, Power::France) - before > 500.0);
}

#[test]
fn adaptive_k_stays_within_budget() {
    for units in 2..=17 {
        for budget in [64, 1_000, 50_000] {
            let k = adaptive_k(units, budget);
            assert!(k >= 2);
            if k > 2 {
                assert!(
                    (k as f64).powi(units as i32) <= budget as f64,
                    "k={k} units={units} budget={budget}"
                );
            }
        }
    }
    assert_eq!(adaptive_k(0, 100), 1);
    assert_eq!(adaptive_k(1, 100), 100);
    assert_eq!(adaptive_k(3, 1_000), 10);
}

#[test]
fn book_covers_every_opening() {
    let book = OpeningBook::embedded().expect("embedded book");
    let state = GameState::initial();
    let cfg = BookMatchConfig::default();
    let mut rng = SmallRng::seed_from_u64(17);
    for power in ALL_POWERS {
        let orders = book
            .lookup(&state, power, &cfg, &mut rng)
            .unwrap_or_else(|| panic!("no opening for {power}"));
        assert_eq!(orders.len(), state.unit_count(power));
        for order in &orders {
            assert!(validate_order(order, &state).is_ok(), "{power}: {order}");
        }
    }
}

#[test]
fn mixed_tier_game_keeps_the_board_consistent() {
    let mut config = ArenaConfig::uniform(Tier::Heuristic, 1903, 23)
        .with_tier(Power::France, Tier::Tactical)
        .with_tier(Power::Turkey, Tier::Random)
        .with_tier(Power::England, Tier::Hold);
    config.movetime = Duration::from_millis(100);
    let result = run_game(&config);

    assert!(result.year >= 1904 || result.winner.is_some());
    assert_eq!(
        result.center_counts.iter().sum::<usize>(),
        result.final_state.center_counts().iter().sum::<usize>()
    );
    assert!(result.center_counts.iter().sum::<usize>() <= 34);
    assert!(!result.final_state.has_dislodged());
    for power in ALL_POWERS {
        assert!(result.final_state.unit_count(power) <= 18);
    }
}
