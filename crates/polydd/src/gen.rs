//! Deterministic polyhedron generators for tests and benchmarks.
//!
//! Purpose
//! - Standard shapes (hypercube, simplex, cross-polytope) with known vertex
//!   and facet counts.
//! - Reproducible random integer polytopes, described either by vertices or
//!   by half-spaces.
//!
//! Model
//! - Random draws take a replay token `(seed, index)` mixed into a single
//!   `StdRng`, so the `k`-th sample of a stream can be regenerated alone.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::Result;
use crate::linear::{Constraint, Generator, LinearExpression, Topology, Variable};
use crate::polyhedron::Polyhedron;
use crate::system::{ConstraintSystem, GeneratorSystem};

/// Replay token making draws reproducible and indexable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}

impl ReplayToken {
    #[inline]
    fn to_std_rng(self) -> StdRng {
        // SplitMix64 finalizer.
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        StdRng::seed_from_u64(mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15))))
    }

    /// Token of the next sample in the same stream.
    pub fn next(self) -> Self {
        Self {
            seed: self.seed,
            index: self.index.wrapping_add(1),
        }
    }
}

/// Parameters of [`random_polytope`].
#[derive(Clone, Copy, Debug)]
pub struct RandomPointsCfg {
    pub dimension: usize,
    pub num_points: usize,
    /// Coordinates are drawn uniformly from `[-coord_range, coord_range]`.
    pub coord_range: i64,
    pub topology: Topology,
}

impl Default for RandomPointsCfg {
    fn default() -> Self {
        Self {
            dimension: 3,
            num_points: 12,
            coord_range: 10,
            topology: Topology::Closed,
        }
    }
}

/// Parameters of [`random_halfspaces`].
#[derive(Clone, Copy, Debug)]
pub struct RandomHalfspacesCfg {
    pub dimension: usize,
    pub num_halfspaces: usize,
    /// Normal coefficients are drawn from `[-coeff_range, coeff_range]`.
    pub coeff_range: i64,
    /// Right-hand sides are drawn from `[1, rhs_range]`, so the origin is
    /// always strictly inside.
    pub rhs_range: i64,
    /// Fraction of the half-spaces made strict (NNC topology only).
    pub strict_frac: f64,
    pub topology: Topology,
}

impl Default for RandomHalfspacesCfg {
    fn default() -> Self {
        Self {
            dimension: 3,
            num_halfspaces: 10,
            coeff_range: 5,
            rhs_range: 20,
            strict_frac: 0.0,
            topology: Topology::Closed,
        }
    }
}

/// `[-half_width, half_width]^dim`, from constraints.
pub fn hypercube(topology: Topology, dim: usize, half_width: i64) -> Result<Polyhedron> {
    let mut cs = ConstraintSystem::with_topology(topology, dim);
    for i in 0..dim {
        cs.insert(Constraint::greater_or_equal(Variable(i), -half_width));
        cs.insert(Constraint::less_or_equal(Variable(i), half_width));
    }
    Polyhedron::from_recycled_constraints(topology, cs)
}

/// Convex hull of the origin and `scale · e_i`, from generators.
pub fn simplex(topology: Topology, dim: usize, scale: i64) -> Result<Polyhedron> {
    let mut gs = GeneratorSystem::with_topology(topology, dim);
    gs.insert(Generator::point(LinearExpression::new(), 1)?);
    for i in 0..dim {
        gs.insert(Generator::point(scale * Variable(i), 1)?);
    }
    Polyhedron::from_recycled_generators(topology, gs)
}

/// Convex hull of `±radius · e_i`, from generators.
pub fn cross_polytope(topology: Topology, dim: usize, radius: i64) -> Result<Polyhedron> {
    let mut gs = GeneratorSystem::with_topology(topology, dim);
    for i in 0..dim {
        gs.insert(Generator::point(radius * Variable(i), 1)?);
        gs.insert(Generator::point(-radius * Variable(i), 1)?);
    }
    Polyhedron::from_recycled_generators(topology, gs)
}

/// Convex hull of `num_points` random integer points.
pub fn random_polytope(cfg: RandomPointsCfg, tok: ReplayToken) -> Result<Polyhedron> {
    let mut rng = tok.to_std_rng();
    let r = cfg.coord_range.max(1);
    let mut gs = GeneratorSystem::with_topology(cfg.topology, cfg.dimension);
    for _ in 0..cfg.num_points.max(1) {
        let coords: Vec<i64> = (0..cfg.dimension).map(|_| rng.gen_range(-r..=r)).collect();
        gs.insert(Generator::point(LinearExpression::from_coefficients(coords, 0), 1)?);
    }
    Polyhedron::from_recycled_generators(cfg.topology, gs)
}

/// Intersection of random half-spaces `a · x ≤ b` (or `<`) around the
/// origin, clipped to the box `[-rhs_range, rhs_range]^dim` so the result is
/// bounded.
pub fn random_halfspaces(cfg: RandomHalfspacesCfg, tok: ReplayToken) -> Result<Polyhedron> {
    let mut rng = tok.to_std_rng();
    let k = cfg.coeff_range.max(1);
    let rhs = cfg.rhs_range.max(1);
    let strict_frac = match cfg.topology {
        Topology::Closed => 0.0,
        Topology::NotNecessarilyClosed => cfg.strict_frac.clamp(0.0, 1.0),
    };
    let mut cs = ConstraintSystem::with_topology(cfg.topology, cfg.dimension);
    for _ in 0..cfg.num_halfspaces {
        let a: Vec<i64> = (0..cfg.dimension).map(|_| rng.gen_range(-k..=k)).collect();
        let b = rng.gen_range(1..=rhs);
        let lhs = LinearExpression::from_coefficients(a, 0);
        let c = if rng.gen::<f64>() < strict_frac {
            Constraint::less_than(lhs, b)
        } else {
            Constraint::less_or_equal(lhs, b)
        };
        cs.insert(c);
    }
    for i in 0..cfg.dimension {
        cs.insert(Constraint::greater_or_equal(Variable(i), -rhs));
        cs.insert(Constraint::less_or_equal(Variable(i), rhs));
    }
    Polyhedron::from_recycled_constraints(cfg.topology, cs)
}
