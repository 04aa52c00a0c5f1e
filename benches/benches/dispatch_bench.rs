//! # Dispatch Benchmarks
//!
//! Signal-change path: marker resolution, edge detection, trigger and
//! output flush.
//!
//! Run: `cargo bench --bench dispatch_bench`

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use ic_core::prelude::*;
use ic_core::{MemoryWorld, MessageLog};
use ic_orchestration::{Engine, EngineConfig};

fn loaded(chip: &str) -> (Engine, MemoryWorld, Location) {
    let mut engine = Engine::new(EngineConfig::default()).unwrap();
    engine.start().unwrap();
    let mut world = MemoryWorld::new();
    let spot = Location::new(0, 64, 0);
    world.place_marker(spot, Marker::wall(Direction::North, ["", chip, "", ""]));
    let mut lines = world.marker(spot).unwrap().lines.clone();
    engine
        .create_ic(&world, spot, &mut lines, &mut MessageLog::new("bench"))
        .unwrap();
    world.set_lines(spot, lines);
    engine.tick(&mut world).unwrap();
    (engine, world, spot)
}

fn bench_notify(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");

    let (mut engine, mut world, spot) = loaded("inverter");
    let input = spot.relative(Direction::North);
    group.bench_function("edge_siso", |b| {
        b.iter(|| {
            world.set_powered(input, !world.is_powered(input));
            black_box(engine.notify_neighbors(&mut world, spot, &[Direction::North]).unwrap())
        })
    });

    let (mut engine, mut world, spot) = loaded("inverter");
    group.bench_function("no_edge_siso", |b| {
        b.iter(|| black_box(engine.notify_neighbors(&mut world, spot, &[Direction::North]).unwrap()))
    });

    let (mut engine, mut world, spot) = loaded("xor");
    let inputs = [Direction::North, Direction::East, Direction::West];
    group.bench_function("all_faces_3iso", |b| {
        b.iter(|| {
            for direction in inputs {
                let neighbour = spot.relative(direction);
                world.set_powered(neighbour, !world.is_powered(neighbour));
            }
            black_box(engine.notify(&mut world, spot).unwrap())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_notify);
criterion_main!(benches);
