//! Constraints `a·x + b = 0`, `a·x + b ≥ 0` and `a·x + b > 0`.

use std::ops::Deref;

use num_traits::{Signed, Zero};

use super::expr::{LinearExpression, Variable};
use super::row::{Row, RowKind, Topology};
use super::LinearRow;
use crate::coefficient::Coefficient;

/// Relation of a constraint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    Equality,
    NonStrictInequality,
    StrictInequality,
}

/// A linear constraint stored in row form `[b, a_1 .. a_n, (e)]`.
///
/// Strict inequalities live in NNC rows and read `a·x + b - ε ≥ 0` with a
/// negative epsilon coefficient; every other constraint is built closed and
/// gains a zero epsilon column when inserted into an NNC system.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Constraint {
    row: Row,
}

impl Constraint {
    /// `expr (=|≥|>) 0`.
    pub fn new(expr: LinearExpression, kind: ConstraintKind) -> Self {
        let dim = expr.space_dimension();
        match kind {
            ConstraintKind::Equality => {
                let mut row = Row::from_coeffs(
                    expr.to_columns(dim + 1),
                    RowKind::LineOrEquality,
                    Topology::Closed,
                );
                row.strong_normalize();
                Self { row }
            }
            ConstraintKind::NonStrictInequality => {
                let mut row = Row::from_coeffs(
                    expr.to_columns(dim + 1),
                    RowKind::RayOrPointOrInequality,
                    Topology::Closed,
                );
                row.normalize();
                Self { row }
            }
            ConstraintKind::StrictInequality => {
                let mut coeffs = expr.to_columns(dim + 1);
                coeffs.push(Coefficient::from(-1));
                let row = Row::from_coeffs(
                    coeffs,
                    RowKind::RayOrPointOrInequality,
                    Topology::NotNecessarilyClosed,
                );
                Self { row }
            }
        }
    }

    /// `lhs = rhs`.
    pub fn equal(lhs: impl Into<LinearExpression>, rhs: impl Into<LinearExpression>) -> Self {
        Self::new(lhs.into() - rhs.into(), ConstraintKind::Equality)
    }

    /// `lhs ≥ rhs`.
    pub fn greater_or_equal(
        lhs: impl Into<LinearExpression>,
        rhs: impl Into<LinearExpression>,
    ) -> Self {
        Self::new(lhs.into() - rhs.into(), ConstraintKind::NonStrictInequality)
    }

    /// `lhs ≤ rhs`.
    pub fn less_or_equal(lhs: impl Into<LinearExpression>, rhs: impl Into<LinearExpression>) -> Self {
        Self::greater_or_equal(rhs, lhs)
    }

    /// `lhs > rhs`.
    pub fn greater_than(lhs: impl Into<LinearExpression>, rhs: impl Into<LinearExpression>) -> Self {
        Self::new(lhs.into() - rhs.into(), ConstraintKind::StrictInequality)
    }

    /// `lhs < rhs`.
    pub fn less_than(lhs: impl Into<LinearExpression>, rhs: impl Into<LinearExpression>) -> Self {
        Self::greater_than(rhs, lhs)
    }

    /// The constraint `1 ≥ 0` of a zero-dimensional space.
    pub fn zero_dim_positivity() -> Self {
        Self::new(LinearExpression::from(1), ConstraintKind::NonStrictInequality)
    }

    /// The unsatisfiable `0 ≥ 1` (zero-dimensional, closed).
    pub fn zero_dim_false() -> Self {
        Self::new(LinearExpression::from(-1), ConstraintKind::NonStrictInequality)
    }

    /// `ε ≥ 0` in a zero-dimensional NNC space.
    pub(crate) fn epsilon_geq_zero() -> Self {
        let coeffs = vec![Coefficient::zero(), Coefficient::from(1)];
        Self {
            row: Row::from_coeffs(
                coeffs,
                RowKind::RayOrPointOrInequality,
                Topology::NotNecessarilyClosed,
            ),
        }
    }

    /// `ε ≤ 1` in a zero-dimensional NNC space.
    pub(crate) fn epsilon_leq_one() -> Self {
        let coeffs = vec![Coefficient::from(1), Coefficient::from(-1)];
        Self {
            row: Row::from_coeffs(
                coeffs,
                RowKind::RayOrPointOrInequality,
                Topology::NotNecessarilyClosed,
            ),
        }
    }

    pub fn kind(&self) -> ConstraintKind {
        if self.row.is_line_or_equality() {
            ConstraintKind::Equality
        } else if !self.row.is_necessarily_closed() && self.row[self.row.eps_index()].is_negative()
        {
            ConstraintKind::StrictInequality
        } else {
            ConstraintKind::NonStrictInequality
        }
    }

    #[inline]
    pub fn is_equality(&self) -> bool {
        self.row.is_line_or_equality()
    }

    #[inline]
    pub fn is_inequality(&self) -> bool {
        self.row.is_ray_or_point_or_inequality()
    }

    pub fn is_strict_inequality(&self) -> bool {
        self.kind() == ConstraintKind::StrictInequality
    }

    pub fn is_nonstrict_inequality(&self) -> bool {
        self.kind() == ConstraintKind::NonStrictInequality
    }

    /// Coefficient of `v`.
    pub fn coefficient(&self, v: Variable) -> Coefficient {
        if v.id() < self.row.space_dimension() {
            self.row[v.id() + 1].clone()
        } else {
            Coefficient::zero()
        }
    }

    #[inline]
    pub fn inhomogeneous_term(&self) -> &Coefficient {
        &self.row[0]
    }

    /// The constraint as `expr (=|≥|>) 0`, epsilon dropped.
    pub fn expression(&self) -> LinearExpression {
        let dim = self.row.space_dimension();
        LinearExpression::from_coefficients(
            self.row.coeffs()[1..=dim].iter().cloned(),
            self.row[0].clone(),
        )
    }

    /// Satisfied by every point of the space.
    pub fn is_tautological(&self) -> bool {
        let x = &self.row;
        if x.all_homogeneous_terms_are_zero() {
            return if self.is_equality() {
                x[0].is_zero()
            } else {
                !x[0].is_negative()
            };
        }
        if x.is_necessarily_closed() {
            return false;
        }
        let eps = x.eps_index();
        if x[eps].is_positive() {
            // `ε ≥ 0`.
            return true;
        }
        if x[eps].is_zero() || !x[0].is_positive() {
            return false;
        }
        // `k > 0` with `k` positive.
        x.coeffs()[1..eps].iter().all(Zero::is_zero)
    }

    /// Satisfied by no point.
    pub fn is_inconsistent(&self) -> bool {
        let x = &self.row;
        if x.all_homogeneous_terms_are_zero() {
            return if self.is_equality() {
                !x[0].is_zero()
            } else {
                x[0].is_negative()
            };
        }
        if x.is_necessarily_closed() {
            return false;
        }
        let eps = x.eps_index();
        if !x[eps].is_negative() || x[0].is_positive() {
            return false;
        }
        // `k > 0` with `k ≤ 0`.
        x.coeffs()[1..eps].iter().all(Zero::is_zero)
    }

    /// Whether this is the NNC row `ε ≤ 1` (up to scaling).
    pub(crate) fn is_epsilon_leq_one(&self) -> bool {
        let x = &self.row;
        if x.is_necessarily_closed() || self.is_equality() {
            return false;
        }
        let eps = x.eps_index();
        x.coeffs()[1..eps].iter().all(Zero::is_zero)
            && x[eps].is_negative()
            && (&x[0] + &x[eps]).is_zero()
    }
}

impl Deref for Constraint {
    type Target = Row;

    #[inline]
    fn deref(&self) -> &Row {
        &self.row
    }
}

impl LinearRow for Constraint {
    #[inline]
    fn row_mut(&mut self) -> &mut Row {
        &mut self.row
    }

    #[inline]
    fn from_row(row: Row) -> Self {
        Self { row }
    }

    #[inline]
    fn into_row(self) -> Row {
        self.row
    }

    fn to_nnc(&mut self) {
        if self.row.is_necessarily_closed() {
            self.row.add_zero_columns(1);
            self.row.set_topology(Topology::NotNecessarilyClosed);
        }
    }

    fn to_closed(&mut self) -> bool {
        if self.row.is_necessarily_closed() {
            return true;
        }
        let eps = self.row.eps_index();
        if !self.row[eps].is_zero() {
            return false;
        }
        self.row.remove_trailing_columns(1);
        self.row.set_topology(Topology::Closed);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_and_trivial_constraints() {
        let x = Variable(0);
        let c = Constraint::greater_than(x, 1);
        assert_eq!(c.kind(), ConstraintKind::StrictInequality);
        assert_eq!(c.topology(), Topology::NotNecessarilyClosed);
        assert!(!c.is_tautological() && !c.is_inconsistent());

        let e = Constraint::equal(2i64 * x, 4);
        assert_eq!(e.kind(), ConstraintKind::Equality);
        // Strongly normalized: x - 2 = 0.
        assert_eq!(e.coefficient(x), Coefficient::from(1));
        assert_eq!(e.inhomogeneous_term(), &Coefficient::from(-2));

        assert!(Constraint::zero_dim_positivity().is_tautological());
        assert!(Constraint::zero_dim_false().is_inconsistent());
        assert!(Constraint::epsilon_geq_zero().is_tautological());
        assert!(Constraint::epsilon_leq_one().is_tautological());
        assert!(Constraint::epsilon_leq_one().is_epsilon_leq_one());
        assert!(Constraint::greater_than(LinearExpression::from(0), 1).is_inconsistent());
    }

    #[test]
    fn less_or_equal_flips_orientation() {
        let x = Variable(0);
        let c = Constraint::less_or_equal(x, 3);
        assert_eq!(c.coefficient(x), Coefficient::from(-1));
        assert_eq!(c.inhomogeneous_term(), &Coefficient::from(3));
        assert_eq!(c.kind(), ConstraintKind::NonStrictInequality);
    }
}
