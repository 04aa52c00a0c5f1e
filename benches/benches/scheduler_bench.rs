//! # Scheduler Benchmarks
//!
//! Cost of one self-trigger pass as the number of active clocks grows.
//!
//! Run: `cargo bench --bench scheduler_bench`

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use ic_core::prelude::*;
use ic_core::{MemoryWorld, MessageLog};
use ic_orchestration::{Engine, EngineConfig, SelfTriggerScheduler, ThinkOutcome};

/// Engine with `count` loaded clocks.
fn engine_with_clocks(count: i32) -> (Engine, MemoryWorld) {
    let mut engine = Engine::new(EngineConfig::default()).unwrap();
    engine.start().unwrap();
    let mut world = MemoryWorld::new();
    let mut creator = MessageLog::new("bench");

    for index in 0..count {
        let spot = Location::new(index * 3, 64, 0);
        world.place_marker(spot, Marker::wall(Direction::North, ["", "clock", "5", ""]));
        let mut lines = world.marker(spot).unwrap().lines.clone();
        engine.create_ic(&world, spot, &mut lines, &mut creator).unwrap();
        world.set_lines(spot, lines);
    }
    engine.tick(&mut world).unwrap();
    (engine, world)
}

fn bench_engine_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_tick");

    for count in [10, 100, 1_000, 10_000] {
        let (mut engine, mut world) = engine_with_clocks(count);
        group.bench_with_input(BenchmarkId::new("clocks", count), &count, |b, _| {
            b.iter(|| black_box(engine.tick(&mut world).unwrap()))
        });
    }

    group.finish();
}

fn bench_scheduler_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheduler_pass");

    for count in [100, 10_000] {
        let mut scheduler = SelfTriggerScheduler::new();
        for index in 0..count {
            scheduler.register(Location::new(index, 0, 0)).unwrap();
        }
        group.bench_with_input(BenchmarkId::new("entries", count), &count, |b, _| {
            b.iter(|| black_box(scheduler.tick(|_| ThinkOutcome::Thought)))
        });
    }

    group.bench_function("register_unregister_1000", |b| {
        b.iter(|| {
            let mut scheduler = SelfTriggerScheduler::new();
            for index in 0..1_000 {
                scheduler.register(Location::new(index, 0, 0)).unwrap();
            }
            for index in (0..1_000).step_by(2) {
                scheduler.unregister(Location::new(index, 0, 0));
            }
            black_box(scheduler.tick(|_| ThinkOutcome::Thought))
        })
    });

    group.finish();
}

criterion_group!(benches, bench_engine_tick, bench_scheduler_pass);
criterion_main!(benches);
