use capsim_core::spatial_hash::SpatialHash;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::DVec3;

const BOUND: DVec3 = DVec3::new(200.0, 100.0, 1.0);

fn lattice() -> Vec<DVec3> {
    (0..1000)
        .map(|i| {
            let x = (i % 50) as f64 * 4.0 + 1.0;
            let y = (i / 50) as f64 * 5.0 + 1.0;
            DVec3::new(x, y, 0.5)
        })
        .collect()
}

fn bench_spatial_hash_build(c: &mut Criterion) {
    let positions = lattice();

    c.bench_function("spatial_hash_build_1000", |b| {
        b.iter(|| {
            let mut grid = SpatialHash::new(9.0, BOUND);
            grid.build_parallel(&positions);
            black_box(grid)
        })
    });
}

fn bench_spatial_hash_query(c: &mut Criterion) {
    let positions = lattice();
    let mut grid = SpatialHash::new(9.0, BOUND);
    grid.build_parallel(&positions);

    c.bench_function("spatial_hash_query_rod_reach", |b| {
        let mut results = Vec::new();
        b.iter(|| {
            grid.query_into(DVec3::new(100.0, 50.0, 0.5), 9.0, &mut results);
            black_box(results.len())
        })
    });
}

fn bench_spatial_hash_count_nearby(c: &mut Criterion) {
    let positions = lattice();
    let mut grid = SpatialHash::new(9.0, BOUND);
    grid.build_parallel(&positions);

    c.bench_function("spatial_hash_count_nearby_rod_reach", |b| {
        b.iter(|| {
            let count = grid.count_nearby(DVec3::new(100.0, 50.0, 0.5), 9.0);
            black_box(count)
        })
    });
}

criterion_group!(
    benches,
    bench_spatial_hash_build,
    bench_spatial_hash_query,
    bench_spatial_hash_count_nearby
);
criterion_main!(benches);
