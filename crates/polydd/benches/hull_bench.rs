//! Criterion benchmarks for hull exactness.
//! Pairs: adjacent hypercubes (exact hull) and random polytopes (mostly not
//! exact), under BHZ09 and BFT00.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use polydd::api::{
    hypercube, random_polytope, Constraint, HullAlgorithm, Polyhedron, RandomPointsCfg,
    ReplayToken, Topology, Variable,
};

/// `[-1, 1]^d` and its translate by 2 along the first axis.
fn adjacent_cubes(d: usize) -> (Polyhedron, Polyhedron) {
    let x = hypercube(Topology::Closed, d, 1).unwrap();
    let mut shifted = Polyhedron::universe(Topology::Closed, d).unwrap();
    shifted
        .add_constraint(&Constraint::greater_or_equal(Variable(0), 1))
        .unwrap();
    shifted
        .add_constraint(&Constraint::less_or_equal(Variable(0), 3))
        .unwrap();
    for i in 1..d {
        shifted
            .add_constraint(&Constraint::greater_or_equal(Variable(i), -1))
            .unwrap();
        shifted
            .add_constraint(&Constraint::less_or_equal(Variable(i), 1))
            .unwrap();
    }
    (x, shifted)
}

fn bench_hull(c: &mut Criterion) {
    let mut group = c.benchmark_group("hull_exactness");
    for algo in [HullAlgorithm::Bhz09, HullAlgorithm::Bft00] {
        for &d in &[2usize, 3, 4, 5] {
            group.bench_with_input(
                BenchmarkId::new(format!("adjacent_cubes/{algo:?}"), d),
                &d,
                |b, &d| {
                    b.iter_batched(
                        || adjacent_cubes(d),
                        |(mut x, mut y)| {
                            let _ = x.poly_hull_assign_if_exact_with(&mut y, algo).unwrap();
                        },
                        BatchSize::SmallInput,
                    )
                },
            );
            group.bench_with_input(
                BenchmarkId::new(format!("random_pairs/{algo:?}"), d),
                &d,
                |b, &d| {
                    let cfg = RandomPointsCfg {
                        dimension: d,
                        num_points: 4 * d,
                        coord_range: 6,
                        ..RandomPointsCfg::default()
                    };
                    let mut tok = ReplayToken { seed: 11, index: 0 };
                    b.iter_batched(
                        || {
                            tok = tok.next();
                            let x = random_polytope(cfg, tok).unwrap();
                            tok = tok.next();
                            (x, random_polytope(cfg, tok).unwrap())
                        },
                        |(mut x, mut y)| {
                            let _ = x.poly_hull_assign_if_exact_with(&mut y, algo).unwrap();
                        },
                        BatchSize::SmallInput,
                    )
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_hull);
criterion_main!(benches);
