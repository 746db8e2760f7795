//! Benchmarks for theta-series summation.
//!
//! Includes:
//! - Theta constants across precisions (addition-sequence path)
//! - Full four-jet evaluation
//! - Dedekind eta through the modular layer

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use quintus_ball::BallComplex;
use quintus_modular::eta;
use quintus_theta::{theta_const, theta_jet};

fn bench_theta_const(c: &mut Criterion) {
    let mut group = c.benchmark_group("theta_const");
    for prec in [64u32, 256, 1024, 4096] {
        let tau = BallComplex::from_f64_pair(0.125, 1.0, prec);
        group.bench_with_input(BenchmarkId::from_parameter(prec), &prec, |b, &prec| {
            b.iter(|| black_box(theta_const(&tau, prec)));
        });
    }
    group.finish();
}

fn bench_theta_jet(c: &mut Criterion) {
    let mut group = c.benchmark_group("theta_jet");
    let prec = 256;
    let tau = BallComplex::from_f64_pair(0.3, 1.1, prec);
    let z = BallComplex::from_f64_pair(0.21, 0.4, prec);
    for len in [1usize, 2, 4] {
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, &len| {
            b.iter(|| black_box(theta_jet(&z, &tau, len, prec)));
        });
    }
    group.finish();
}

fn bench_eta_reduced(c: &mut Criterion) {
    let mut group = c.benchmark_group("eta");
    // A tau far from the fundamental domain exercises the reducer.
    let prec = 256;
    let tau = BallComplex::from_f64_pair(17.37, 0.004, prec);
    group.bench_function("far_from_domain", |b| {
        b.iter(|| black_box(eta(&tau, prec)));
    });
    group.finish();
}

criterion_group!(benches, bench_theta_const, bench_theta_jet, bench_eta_reduced);
criterion_main!(benches);
