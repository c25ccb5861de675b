//! Benchmarks for simple kriging

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use geokrige_algorithms::interpolation::{
    simple_kriging, Observation, SemivarianceCovariance, Semivariogram, SimpleKriging,
    SimpleKrigingParams,
};
use geokrige_core::GridSpec;

fn create_observations(n: usize) -> Vec<Observation> {
    // Scattered points with a trend plus a deterministic wobble
    (0..n)
        .map(|i| {
            let x = ((i * 7919) % 1000) as f64 + 0.37 * (i % 11) as f64;
            let y = ((i * 104_729) % 997) as f64 + 0.53 * (i % 13) as f64;
            let value = 0.01 * x + 0.02 * y + ((i * 31) % 17) as f64 / 4.0;
            Observation::new(x, y, value)
        })
        .collect()
}

fn bench_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("simple_kriging_fit");
    let variogram = Semivariogram::spherical(0.1, 10.0, 300.0).unwrap();

    for n in [50, 200, 500].iter() {
        let obs = create_observations(*n);
        let cov = SemivarianceCovariance::new(variogram, 10.0).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, _| {
            b.iter(|| {
                SimpleKriging::fit(black_box(&obs), &cov, &SimpleKrigingParams::default())
                    .unwrap()
                    .condition_estimate()
            })
        });
    }

    group.finish();
}

fn bench_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("simple_kriging_grid");
    let obs = create_observations(200);
    let variogram = Semivariogram::exponential(0.0, 10.0, 250.0).unwrap();
    let cov = SemivarianceCovariance::new(variogram, 10.0).unwrap();

    for size in [64, 128, 256].iter() {
        let grid = GridSpec::new(0.0, 0.0, 1000.0 / *size as f64, *size, *size).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                simple_kriging(black_box(&obs), &cov, &grid, SimpleKrigingParams::default())
                    .unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_fit, bench_grid);
criterion_main!(benches);
