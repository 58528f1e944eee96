//! Generators: lines, rays, points and closure points.

use std::ops::Deref;

use num_traits::{Signed, Zero};

use super::expr::{LinearExpression, Variable};
use super::row::{Row, RowKind, Topology};
use super::LinearRow;
use crate::coefficient::Coefficient;
use crate::error::{PolyhedronError, Result};

/// Kind of a generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeneratorKind {
    Line,
    Ray,
    Point,
    ClosurePoint,
}

/// A generator stored in row form `[d, x_1 .. x_n, (e)]`.
///
/// Invariants:
/// - Lines and rays have `d == 0`; points and closure points have `d > 0`.
/// - In NNC rows a point has `e == d` (up to the normalization of the whole
///   row) and a closure point has `e == 0`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Generator {
    row: Row,
}

impl Generator {
    /// Point `expr / divisor` (the inhomogeneous term of `expr` is ignored).
    pub fn point(expr: LinearExpression, divisor: impl Into<Coefficient>) -> Result<Self> {
        let d = divisor.into();
        if d.is_zero() {
            return Err(PolyhedronError::InvalidGenerator {
                method: "point(e, d)",
                reason: "d == 0".into(),
            });
        }
        let dim = expr.space_dimension();
        let mut coeffs = expr.to_columns(dim + 1);
        coeffs[0] = d;
        let mut row = Row::from_coeffs(coeffs, RowKind::RayOrPointOrInequality, Topology::Closed);
        if row[0].is_negative() {
            for c in row.coeffs_mut().iter_mut() {
                *c = -std::mem::take(c);
            }
        }
        row.normalize();
        Ok(Self { row })
    }

    /// Closure point `expr / divisor`.
    pub fn closure_point(expr: LinearExpression, divisor: impl Into<Coefficient>) -> Result<Self> {
        let d = divisor.into();
        if d.is_zero() {
            return Err(PolyhedronError::InvalidGenerator {
                method: "closure_point(e, d)",
                reason: "d == 0".into(),
            });
        }
        let mut g = Self::point(expr, d)?;
        g.row.add_zero_columns(1);
        g.row.set_topology(Topology::NotNecessarilyClosed);
        g.row.normalize();
        Ok(g)
    }

    /// Ray with direction `expr`.
    pub fn ray(expr: LinearExpression) -> Result<Self> {
        if expr.all_homogeneous_terms_are_zero() {
            return Err(PolyhedronError::InvalidGenerator {
                method: "ray(e)",
                reason: "e == 0, but the origin cannot be a ray".into(),
            });
        }
        let dim = expr.space_dimension();
        let mut coeffs = expr.to_columns(dim + 1);
        coeffs[0] = Coefficient::zero();
        let mut row = Row::from_coeffs(coeffs, RowKind::RayOrPointOrInequality, Topology::Closed);
        row.normalize();
        Ok(Self { row })
    }

    /// Line with direction `expr`.
    pub fn line(expr: LinearExpression) -> Result<Self> {
        if expr.all_homogeneous_terms_are_zero() {
            return Err(PolyhedronError::InvalidGenerator {
                method: "line(e)",
                reason: "e == 0, but the origin cannot be a line".into(),
            });
        }
        let dim = expr.space_dimension();
        let mut coeffs = expr.to_columns(dim + 1);
        coeffs[0] = Coefficient::zero();
        let mut row = Row::from_coeffs(coeffs, RowKind::LineOrEquality, Topology::Closed);
        row.strong_normalize();
        Ok(Self { row })
    }

    /// The origin of the zero-dimensional space.
    pub fn zero_dim_point() -> Self {
        Self {
            row: Row::from_coeffs(
                vec![Coefficient::from(1)],
                RowKind::RayOrPointOrInequality,
                Topology::Closed,
            ),
        }
    }

    /// The closure point of the zero-dimensional space.
    pub fn zero_dim_closure_point() -> Self {
        Self {
            row: Row::from_coeffs(
                vec![Coefficient::from(1), Coefficient::zero()],
                RowKind::RayOrPointOrInequality,
                Topology::NotNecessarilyClosed,
            ),
        }
    }

    pub fn kind(&self) -> GeneratorKind {
        if self.row.is_line_or_equality() {
            GeneratorKind::Line
        } else if self.row[0].is_zero() {
            GeneratorKind::Ray
        } else if self.row.is_necessarily_closed() || !self.row[self.row.eps_index()].is_zero() {
            GeneratorKind::Point
        } else {
            GeneratorKind::ClosurePoint
        }
    }

    #[inline]
    pub fn is_line(&self) -> bool {
        self.row.is_line_or_equality()
    }

    #[inline]
    pub fn is_ray(&self) -> bool {
        self.kind() == GeneratorKind::Ray
    }

    #[inline]
    pub fn is_line_or_ray(&self) -> bool {
        self.row[0].is_zero()
    }

    #[inline]
    pub fn is_point(&self) -> bool {
        self.kind() == GeneratorKind::Point
    }

    #[inline]
    pub fn is_closure_point(&self) -> bool {
        self.kind() == GeneratorKind::ClosurePoint
    }

    /// Divisor of a point or closure point.
    #[inline]
    pub fn divisor(&self) -> &Coefficient {
        &self.row[0]
    }

    /// Coefficient of `v` (numerator, for points).
    pub fn coefficient(&self, v: Variable) -> Coefficient {
        if v.id() < self.row.space_dimension() {
            self.row[v.id() + 1].clone()
        } else {
            Coefficient::zero()
        }
    }

    /// The homogeneous part as an expression (zero inhomogeneous term).
    pub fn expression(&self) -> LinearExpression {
        let dim = self.row.space_dimension();
        LinearExpression::from_coefficients(self.row.coeffs()[1..=dim].iter().cloned(), 0)
    }

    /// Whether `self` is a closure point located where point `p` is.
    pub fn is_matching_closure_point(&self, p: &Generator) -> bool {
        debug_assert!(self.is_closure_point() && p.is_point());
        debug_assert_eq!(self.row.size(), p.row.size());
        let dim = self.row.space_dimension();
        let (cd, pd) = (&self.row[0], &p.row[0]);
        (1..=dim).all(|i| &self.row[i] * pd == &p.row[i] * cd)
    }
}

impl Deref for Generator {
    type Target = Row;

    #[inline]
    fn deref(&self) -> &Row {
        &self.row
    }
}

impl LinearRow for Generator {
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
            let d = self.row[0].clone();
            self.row.coeffs_mut().push(d);
            self.row.set_topology(Topology::NotNecessarilyClosed);
        }
    }

    fn to_closed(&mut self) -> bool {
        if self.row.is_necessarily_closed() {
            return true;
        }
        if self.is_closure_point() {
            return false;
        }
        self.row.remove_trailing_columns(1);
        self.row.set_topology(Topology::Closed);
        self.row.normalize();
        true
    }
}
