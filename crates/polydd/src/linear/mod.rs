//! Rows of the two representations.
//!
//! Purpose
//! - `Row` is the dense coefficient vector shared by both kinds of rows.
//! - `Constraint` and `Generator` are typed views over a `Row` that know how
//!   to classify themselves and how to change topology.
//!
//! Assumptions and conventions
//! - Column 0 is the inhomogeneous term / divisor, the epsilon column (NNC
//!   only) is the last one.
//! - Constructors normalize rows (gcd 1; lines and equalities also have a
//!   positive leading coefficient) so that syntactic comparison is meaningful.

mod constraint;
mod expr;
mod generator;
mod row;

use std::fmt::Debug;
use std::ops::Deref;

pub use constraint::{Constraint, ConstraintKind};
pub use expr::{LinearExpression, Variable};
pub use generator::{Generator, GeneratorKind};
pub use row::{
    compare, homogeneous_scalar_product, homogeneous_scalar_product_sign,
    reduced_scalar_product, reduced_scalar_product_sign, scalar_product, scalar_product_sign, Row,
    RowKind, Topology,
};
pub(crate) use row::topology_adjusted_sign;

/// Common interface of the row types stored in a `LinearSystem`.
pub trait LinearRow: Clone + Debug + Deref<Target = Row> {
    #[doc(hidden)]
    fn row_mut(&mut self) -> &mut Row;
    #[doc(hidden)]
    fn from_row(row: Row) -> Self;
    #[doc(hidden)]
    fn into_row(self) -> Row;
    /// Append the epsilon column with the value this row kind needs.
    #[doc(hidden)]
    fn to_nnc(&mut self);
    /// Drop the epsilon column; `false` when the row has no closed
    /// counterpart (strict inequalities, closure points).
    #[doc(hidden)]
    fn to_closed(&mut self) -> bool;
}
