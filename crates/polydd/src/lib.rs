//! Exact convex polyhedra in double description.
//!
//! A polyhedron is kept both as a system of linear constraints and as a
//! system of generators (lines, rays, points and, for not necessarily closed
//! polyhedra, closure points). Either side is derived from the other on
//! demand by the double-description conversion, with arbitrary precision
//! integer coefficients throughout.
//!
//! Layout
//! - `linear`, `system`: rows and systems of rows.
//! - `sat`, `status`: saturation matrices and the flags saying what is valid.
//! - `conversion`, `simplify`, `minimize`: the conversion and its drivers.
//! - `polyhedron`: the lazy engine, queries, hull exactness and mutation.
//! - `gen`: deterministic shapes for tests and benchmarks.
//!
//! API Policy
//! - `api` is the curated surface; everything else may move.

pub mod api;
pub mod cfg;
pub mod coefficient;
mod conversion;
pub mod error;
pub mod gen;
pub mod linear;
mod minimize;
pub mod polyhedron;
pub mod relation;
pub mod sat;
mod simplify;
pub mod status;
pub mod system;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{PolyhedronError, Result};
pub use polyhedron::Polyhedron;

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::cfg::HullAlgorithm;
    pub use crate::coefficient::Coefficient;
    pub use crate::error::{PolyhedronError, Result};
    pub use crate::linear::{
        Constraint, ConstraintKind, Generator, GeneratorKind, LinearExpression, Topology, Variable,
    };
    pub use crate::polyhedron::{DegenerateElement, Extremum, Polyhedron};
    pub use crate::relation::{PolyConRelation, PolyGenRelation, ThreeValued};
    pub use crate::system::{ConstraintSystem, GeneratorSystem};
}
