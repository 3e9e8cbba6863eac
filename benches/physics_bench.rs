use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use sphere_sweep::*;
use std::hint::black_box;

const DT: f32 = 1.0;

fn prepare_world(body_count: usize, workers: usize) -> SimulationWorld {
    let config = SimulationConfig::builder()
        .stationary_count(body_count / 2)
        .moving_count(body_count - body_count / 2)
        .worker_count(workers)
        .seed(0x5eed)
        .build();
    SimulationWorld::new(config).expect("benchmark world")
}

fn bench_world_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("world_step");
    for &count in &[7_500usize, 30_000, 100_000] {
        for &workers in &[1usize, 2, 4, 8] {
            group.bench_with_input(
                BenchmarkId::new(format!("{workers}_threads"), count),
                &count,
                |b, &count| {
                    let mut world = prepare_world(count, workers);
                    b.iter(|| world.step(black_box(DT)).expect("frame"));
                },
            );
        }
    }
    group.finish();
}

fn bench_sweep_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("sweep_query");
    for &count in &[1_000usize, 10_000, 50_000] {
        let world = prepare_world(count * 2, 1);
        let probes: Vec<Body> = world.moving().to_vec();
        group.bench_with_input(BenchmarkId::new("query", count), &count, |b, _| {
            b.iter(|| {
                for probe in &probes {
                    black_box(world.stationary().query(probe));
                }
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_world_step, bench_sweep_query);
criterion_main!(benches);
