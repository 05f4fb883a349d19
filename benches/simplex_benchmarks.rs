//! Benchmarks for the simplex solvers.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use presburger::prelude::*;

const TILED_NEST: &str = "(x, y)[N] : (x >= 0, 32x <= N - 1, y >= 0, y >= 32x, \
                          y <= 32x + 31, y <= N - 1, N <= 1000)";

/// Benchmark parsing speed.
fn bench_parsing(c: &mut Criterion) {
    c.bench_function("parse_tiled_nest", |b| {
        b.iter(|| presburger::frontend::parse_polyhedron(black_box(TILED_NEST)).unwrap())
    });
}

/// Benchmark redundancy detection on a tiled loop nest.
fn bench_redundancy(c: &mut Criterion) {
    let set = presburger::parse_polyhedron(TILED_NEST).unwrap();

    c.bench_function("detect_redundant_tiled_nest", |b| {
        b.iter(|| {
            let mut simplex = Simplex::from_relation(black_box(&set));
            simplex.detect_redundant();
            simplex
        })
    });
}

/// Benchmark integer sampling, bounded and unbounded.
fn bench_integer_sample(c: &mut Criterion) {
    let bounded = presburger::polyhedral::operations::rectangular(&[50, 50, 50]);
    let strip = presburger::parse_polyhedron("(x, y, z) : (3x - 3y >= 1, 3x - 3y <= 2, z >= 0)")
        .unwrap();

    c.bench_function("integer_sample_box", |b| {
        b.iter(|| black_box(&bounded).find_integer_sample())
    });
    c.bench_function("integer_sample_unbounded_strip", |b| {
        b.iter(|| black_box(&strip).find_integer_sample())
    });
}

/// Benchmark lexicographic minimization with cuts.
fn bench_lexmin(c: &mut Criterion) {
    let set = presburger::parse_polyhedron("(x, y) : (3x >= 1, 5y >= 2x + 1, x + y <= 40)").unwrap();

    c.bench_function("integer_lexmin_triangle", |b| {
        b.iter(|| LexSimplex::from_relation(black_box(&set)).find_integer_lex_min())
    });
}

/// Benchmark snapshot and rollback of incremental additions.
fn bench_rollback(c: &mut Criterion) {
    c.bench_function("add_and_rollback", |b| {
        let mut simplex = Simplex::new(3);
        simplex.add_inequality(&int_vec(&[1, 0, 0, 0]));
        simplex.add_inequality(&int_vec(&[0, 1, 0, 0]));
        simplex.add_inequality(&int_vec(&[0, 0, 1, 0]));
        b.iter(|| {
            let snapshot = simplex.get_snapshot();
            simplex.add_inequality(&int_vec(&[-1, -1, -1, 10]));
            simplex.add_equality(&int_vec(&[1, -2, 0, 0]));
            simplex.rollback(black_box(snapshot));
        })
    });
}

/// Benchmark Hermite normal form on a dense matrix.
fn bench_hermite(c: &mut Criterion) {
    let m = IntMatrix::from_vec(vec![
        vec![12, -7, 3, 9],
        vec![4, 15, -8, 2],
        vec![-6, 5, 11, -13],
        vec![7, -3, 2, 17],
    ]);
    c.bench_function("hermite_normal_form_4x4", |b| {
        b.iter(|| black_box(&m).hermite_normal_form())
    });
}

criterion_group!(
    benches,
    bench_parsing,
    bench_redundancy,
    bench_integer_sample,
    bench_lexmin,
    bench_rollback,
    bench_hermite
);
criterion_main!(benches);
