//! Limits and algorithm selection.
//!
//! Policy
//! - Limits are fixed constants. Every operation that creates dimensions
//!   checks them before allocating anything.

/// Largest space dimension a polyhedron may have. Rows carry the space
/// dimension plus one or two extra columns, and the bound keeps every column
/// count representable.
pub const MAX_SPACE_DIMENSION: usize = (usize::MAX >> 2) - 2;

/// Procedure used to decide whether a convex hull is exact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HullAlgorithm {
    /// Saturation-based test of Bagnara, Hill and Zaffanella (2009).
    /// Handles both topologies.
    Bhz09,
    /// Pairwise mid-generator test of Bemporad, Fukuda and Torrisi (2000).
    /// Closed polyhedra only.
    Bft00,
    /// BFT00 for closed polyhedra, BHZ09 for NNC ones.
    #[default]
    Auto,
}
