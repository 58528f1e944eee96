//! Curated API surface.
//!
//! Important
//! - Prefer these re-exports over reaching into submodules; internal module
//!   paths may change between versions.

// Rows and systems
pub use crate::linear::{
    Constraint, ConstraintKind, Generator, GeneratorKind, LinearExpression, Topology, Variable,
};
pub use crate::system::{ConstraintSystem, GeneratorSystem};
// Polyhedra
pub use crate::cfg::{HullAlgorithm, MAX_SPACE_DIMENSION};
pub use crate::error::{PolyhedronError, Result};
pub use crate::polyhedron::{DegenerateElement, Extremum, Polyhedron};
pub use crate::relation::{PolyConRelation, PolyGenRelation, ThreeValued};
// Generators for experiments
pub use crate::gen::{
    cross_polytope, hypercube, random_halfspaces, random_polytope, simplex, RandomHalfspacesCfg,
    RandomPointsCfg, ReplayToken,
};
