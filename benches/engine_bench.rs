use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::time::{Duration, Instant};

use stratagem::board::{GameState, Location, Order, Power, Province, UnitKind, ALL_POWERS};
use stratagem::config::EngineConfig;
use stratagem::eval::evaluate;
use stratagem::movegen::legal_orders;
use stratagem::protocol::dfen::{encode_dfen, parse_dfen, INITIAL_DFEN};
use stratagem::resolve::Resolver;
use stratagem::strategy::{decide, heuristic, Context, Tier};

fn bench_evaluate(c: &mut Criterion) {
    let state = GameState::initial();
    c.bench_function("evaluate_single_power", |b| {
        b.iter(|| evaluate(black_box(&state), black_box(Power::Austria)))
    });
    c.bench_function("evaluate_7_powers", |b| {
        b.iter(|| ALL_POWERS.map(|p| evaluate(black_box(&state), p)))
    });
}

fn bench_resolve_holds(c: &mut Criterion) {
    let state = GameState::initial();
    let orders: Vec<Order> = state
        .units()
        .map(|(p, u)| Order::hold(u.power, u.kind, Location::with_coast(p, u.coast)))
        .collect();

    c.bench_function("resolve_22_holds", |b| {
        let mut resolver = Resolver::new(32);
        b.iter(|| resolver.resolve(black_box(&orders), black_box(&state)))
    });
}

fn bench_resolve_with_moves(c: &mut Criterion) {
    let state = GameState::initial();
    let mut rng = SmallRng::seed_from_u64(7);
    let orders: Vec<Order> = ALL_POWERS
        .iter()
        .flat_map(|&p| heuristic::movement_orders(&state, p, &mut rng))
        .collect();

    c.bench_function("resolve_heuristic_opening", |b| {
        let mut resolver = Resolver::new(32);
        b.iter(|| resolver.resolve(black_box(&orders), black_box(&state)))
    });

    let bounce = [
        Order::moving(
            Power::Austria,
            UnitKind::Army,
            Location::new(Province::Vie),
            Location::new(Province::Gal),
        ),
        Order::moving(
            Power::Russia,
            UnitKind::Army,
            Location::new(Province::War),
            Location::new(Province::Gal),
        ),
    ];
    c.bench_function("resolve_galicia_bounce", |b| {
        let mut resolver = Resolver::new(32);
        b.iter(|| resolver.resolve(black_box(&bounce), black_box(&state)))
    });
}

fn bench_legal_orders(c: &mut Criterion) {
    let state = GameState::initial();
    c.bench_function("legal_orders_sevastopol", |b| {
        b.iter(|| legal_orders(black_box(Province::Sev), black_box(&state)))
    });
}

fn bench_dfen(c: &mut Criterion) {
    let state = GameState::initial();
    c.bench_function("parse_dfen_initial", |b| b.iter(|| parse_dfen(black_box(INITIAL_DFEN))));
    c.bench_function("encode_dfen_initial", |b| b.iter(|| encode_dfen(black_box(&state))));
}

fn bench_tactical(c: &mut Criterion) {
    let state = GameState::initial();
    let config = EngineConfig::default();
    let mut group = c.benchmark_group("decide");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(10));
    group.bench_function("tactical_austria_spring_1901", |b| {
        let mut rng = SmallRng::seed_from_u64(1);
        b.iter(|| {
            let ctx = Context::new(&config, Instant::now() + Duration::from_millis(100));
            decide(&Tier::Tactical, black_box(&state), Power::Austria, &ctx, &mut rng)
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_evaluate,
    bench_resolve_holds,
    bench_resolve_with_moves,
    bench_legal_orders,
    bench_dfen,
    bench_tactical,
);
criterion_main!(benches);
