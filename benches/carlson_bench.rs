//! Benchmarks for the Carlson symmetric integrals.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use quintus_ball::BallComplex;
use quintus_carlson::{rf, rj};
use quintus_elliptic::legendre_f;

fn bench_rf(c: &mut Criterion) {
    let mut group = c.benchmark_group("rf");
    for prec in [64u32, 256, 1024, 4096] {
        let x = BallComplex::from_i64(2, prec);
        let y = BallComplex::from_i64(3, prec);
        let z = BallComplex::from_i64(5, prec);
        group.bench_with_input(BenchmarkId::from_parameter(prec), &prec, |b, &prec| {
            b.iter(|| black_box(rf(&x, &y, &z, prec)));
        });
    }
    group.finish();
}

fn bench_rj(c: &mut Criterion) {
    let mut group = c.benchmark_group("rj");
    for prec in [64u32, 256, 1024] {
        let x = BallComplex::from_i64(2, prec);
        let y = BallComplex::from_i64(3, prec);
        let z = BallComplex::from_i64(4, prec);
        let p = BallComplex::from_i64(5, prec);
        group.bench_with_input(BenchmarkId::from_parameter(prec), &prec, |b, &prec| {
            b.iter(|| black_box(rj(&x, &y, &z, &p, prec)));
        });
    }
    group.finish();
}

fn bench_incomplete_f(c: &mut Criterion) {
    let mut group = c.benchmark_group("legendre_f");
    let prec = 256;
    let phi = BallComplex::from_f64_pair(11.3, 0.0, prec);
    let m = BallComplex::from_f64_pair(0.7, 0.0, prec);
    group.bench_function("reduced_multi_period", |b| {
        b.iter(|| black_box(legendre_f(&phi, &m, prec)));
    });
    group.finish();
}

criterion_group!(benches, bench_rf, bench_rj, bench_incomplete_f);
criterion_main!(benches);
