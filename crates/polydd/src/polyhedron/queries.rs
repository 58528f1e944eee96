//! Queries: emptiness, boundedness, optimization, inclusion and relations.
//!
//! Every query works on the generators when it asks "where are the points"
//! and on the constraints when it asks "which half-spaces hold". Queries
//! memoize the conversions they trigger, hence `&mut self`.

use std::cmp::Ordering;

use num_traits::Zero;

use super::{padded, Polyhedron};
use crate::coefficient::{normalize2, Coefficient};
use crate::error::Result;
use crate::linear::{
    homogeneous_scalar_product, homogeneous_scalar_product_sign, reduced_scalar_product_sign,
    scalar_product_sign, topology_adjusted_sign, Constraint, ConstraintKind, Generator,
    GeneratorKind, LinearExpression, Row, RowKind, Topology,
};
use crate::relation::{PolyConRelation, PolyGenRelation, ThreeValued};
use crate::system::{ConstraintSystem, GeneratorSystem};

/// Supremum or infimum of a linear expression over a polyhedron.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Extremum {
    /// Numerator of the value, coprime with the denominator.
    pub numerator: Coefficient,
    /// Positive denominator of the value.
    pub denominator: Coefficient,
    /// Whether the value is attained (always, for closed polyhedra).
    pub included: bool,
    /// A point, or a closure point when not `included`, where the value is
    /// reached.
    pub point: Generator,
}

impl Polyhedron {
    /// Whether the polyhedron has no point.
    pub fn is_empty(&mut self) -> bool {
        if self.marked_empty() {
            return true;
        }
        // An up-to-date generator system always has a point.
        if self.status.test_g_up_to_date() && !self.status.test_c_pending() {
            return false;
        }
        !self.minimize()
    }

    /// Whether the polyhedron is the whole space.
    pub fn is_universe(&mut self) -> bool {
        if self.marked_empty() {
            return false;
        }
        if self.space_dim == 0 {
            return true;
        }
        if !self.status.test_g_pending() && self.status.test_c_up_to_date() {
            return self.con_sys.iter().all(Constraint::is_tautological);
        }
        if self.status.test_g_minimized() && !self.status.test_g_pending() {
            return self.gen_sys.num_lines_or_equalities() == self.space_dim;
        }
        self.minimize() && self.con_sys.iter().all(Constraint::is_tautological)
    }

    /// Whether no line or ray is needed to generate the polyhedron.
    pub fn is_bounded(&mut self) -> bool {
        if self.space_dim == 0
            || self.marked_empty()
            || (self.status.test_c_pending() && !self.process_pending_constraints())
            || (!self.status.test_g_up_to_date() && !self.update_generators())
        {
            return true;
        }
        !self.gen_sys.iter().any(|g| g.is_line_or_ray())
    }

    /// Dimension of the affine hull; 0 for the empty polyhedron.
    pub fn affine_dimension(&mut self) -> usize {
        if self.is_empty() {
            return 0;
        }
        self.minimize();
        self.space_dim - self.con_sys.num_equalities()
    }

    /// Whether `expr` is bounded from above.
    pub fn bounds_from_above(&mut self, expr: &LinearExpression) -> Result<bool> {
        self.check_row_dimension("bounds_from_above(e)", "e", expr.space_dimension())?;
        Ok(self.bounds(expr, true))
    }

    /// Whether `expr` is bounded from below.
    pub fn bounds_from_below(&mut self, expr: &LinearExpression) -> Result<bool> {
        self.check_row_dimension("bounds_from_below(e)", "e", expr.space_dimension())?;
        Ok(self.bounds(expr, false))
    }

    /// Core of the boundedness tests; `expr` must fit the space dimension.
    pub(crate) fn bounds(&mut self, expr: &LinearExpression, from_above: bool) -> bool {
        debug_assert!(expr.space_dimension() <= self.space_dim);
        if self.space_dim == 0
            || self.marked_empty()
            || (self.status.test_c_pending() && !self.process_pending_constraints())
            || (!self.status.test_g_up_to_date() && !self.update_generators())
        {
            return true;
        }
        let e = expression_row(expr);
        for g in self.gen_sys.iter().filter(|g| g.is_line_or_ray()) {
            let sign = homogeneous_scalar_product_sign(&e, g);
            if sign.is_ne() && (g.is_line() || (from_above == sign.is_gt())) {
                return false;
            }
        }
        true
    }

    /// Supremum of `expr`; `None` if the polyhedron is empty or `expr` is
    /// unbounded from above.
    pub fn maximize(&mut self, expr: &LinearExpression) -> Result<Option<Extremum>> {
        self.check_row_dimension("maximize(e, ...)", "e", expr.space_dimension())?;
        Ok(self.max_min(expr, true))
    }

    /// Infimum of `expr`; `None` if the polyhedron is empty or `expr` is
    /// unbounded from below.
    pub fn minimize_expr(&mut self, expr: &LinearExpression) -> Result<Option<Extremum>> {
        self.check_row_dimension("minimize(e, ...)", "e", expr.space_dimension())?;
        Ok(self.max_min(expr, false))
    }

    fn max_min(&mut self, expr: &LinearExpression, maximize: bool) -> Option<Extremum> {
        if self.space_dim == 0 {
            if self.marked_empty() {
                return None;
            }
            return Some(Extremum {
                numerator: expr.inhomogeneous_term().clone(),
                denominator: Coefficient::from(1),
                included: true,
                point: Generator::zero_dim_point(),
            });
        }
        if self.marked_empty()
            || (self.status.test_c_pending() && !self.process_pending_constraints())
            || (!self.status.test_g_up_to_date() && !self.update_generators())
        {
            return None;
        }

        let e = expression_row(expr);
        let better = if maximize {
            Ordering::Greater
        } else {
            Ordering::Less
        };
        // (homogeneous value, divisor, row index, is a point)
        let mut best: Option<(Coefficient, Coefficient, usize, bool)> = None;
        for (i, g) in self.gen_sys.iter().enumerate() {
            if g.is_line_or_ray() {
                let sign = homogeneous_scalar_product_sign(&e, g);
                if sign.is_ne() && (g.is_line() || (maximize == sign.is_gt())) {
                    return None;
                }
                continue;
            }
            let sp = homogeneous_scalar_product(&e, g);
            let d = g.divisor().clone();
            let is_point = g.is_point();
            let replace = match &best {
                None => true,
                Some((best_sp, best_d, _, best_included)) => {
                    // Divisors are positive: compare sp / d by cross-multiplying.
                    let ord = (&sp * best_d).cmp(&(best_sp * &d));
                    ord == better || (ord.is_eq() && is_point && !best_included)
                }
            };
            if replace {
                best = Some((sp, d, i, is_point));
            }
        }
        let (sp, d, i, included) = best?;
        let num = sp + expr.inhomogeneous_term() * &d;
        let (numerator, denominator) = normalize2(&num, &d);
        Some(Extremum {
            numerator,
            denominator,
            included,
            point: self.gen_sys[i].clone(),
        })
    }

    /// Whether `self ⊇ y`.
    pub fn contains(&mut self, y: &mut Polyhedron) -> Result<bool> {
        self.check_same_shape(y, "contains(y)")?;
        if y.marked_empty() {
            return Ok(true);
        }
        if self.marked_empty() {
            return Ok(y.is_empty());
        }
        if y.space_dim == 0 {
            return Ok(true);
        }
        if self.quick_equivalence_test(y) == ThreeValued::True {
            return Ok(true);
        }
        Ok(y.included_in(self))
    }

    /// Whether `self ⊆ y`.
    pub fn is_included_in(&mut self, y: &mut Polyhedron) -> Result<bool> {
        self.check_same_shape(y, "is_included_in(y)")?;
        y.contains(self)
    }

    /// Whether `self ⊋ y`.
    pub fn strictly_contains(&mut self, y: &mut Polyhedron) -> Result<bool> {
        Ok(self.contains(y)? && !y.contains(self)?)
    }

    /// Whether `self` and `y` are the same set.
    pub fn equals(&mut self, y: &mut Polyhedron) -> Result<bool> {
        self.check_same_shape(y, "equals(y)")?;
        if self.marked_empty() {
            return Ok(y.is_empty());
        }
        if y.marked_empty() {
            return Ok(self.is_empty());
        }
        if self.space_dim == 0 {
            return Ok(true);
        }
        Ok(match self.quick_equivalence_test(y) {
            ThreeValued::True => true,
            ThreeValued::False => false,
            ThreeValued::DontKnow => {
                if !self.included_in(y) {
                    false
                } else if self.marked_empty() {
                    y.is_empty()
                } else {
                    y.included_in(self)
                }
            }
        })
    }

    /// Syntactic comparison of minimized closed polyhedra. Gives up on NNC
    /// polyhedra and whenever something is pending or not minimized.
    pub fn quick_equivalence_test(&mut self, y: &mut Polyhedron) -> ThreeValued {
        debug_assert_eq!(self.topology, y.topology);
        debug_assert_eq!(self.space_dim, y.space_dim);
        debug_assert!(!self.marked_empty() && !y.marked_empty() && self.space_dim > 0);
        if !self.is_necessarily_closed()
            || self.status.has_something_pending()
            || y.status.has_something_pending()
        {
            return ThreeValued::DontKnow;
        }
        let mut css_normalized = false;
        if self.status.test_c_minimized() && y.status.test_c_minimized() {
            if self.con_sys.num_rows() != y.con_sys.num_rows() {
                return ThreeValued::False;
            }
            let num_equalities = self.con_sys.num_equalities();
            if num_equalities != y.con_sys.num_equalities() {
                return ThreeValued::False;
            }
            // Without equalities minimized constraint systems are unique;
            // the generators are tried first, the comparison is cheaper.
            css_normalized = num_equalities == 0;
        }
        if self.status.test_g_minimized() && y.status.test_g_minimized() {
            if self.gen_sys.num_rows() != y.gen_sys.num_rows() {
                return ThreeValued::False;
            }
            let num_lines = self.gen_sys.num_lines_or_equalities();
            if num_lines != y.gen_sys.num_lines_or_equalities() {
                return ThreeValued::False;
            }
            if num_lines == 0 {
                self.obtain_sorted_generators();
                y.obtain_sorted_generators();
                return three_valued(self.gen_sys.rows() == y.gen_sys.rows());
            }
        }
        if css_normalized {
            self.obtain_sorted_constraints();
            y.obtain_sorted_constraints();
            return three_valued(self.con_sys.rows() == y.con_sys.rows());
        }
        ThreeValued::DontKnow
    }

    /// Whether every point of `self` satisfies every constraint of `y`.
    /// Both must be non-empty with the same shape; `self` may turn out
    /// empty, which counts as inclusion.
    pub(crate) fn included_in(&mut self, y: &mut Polyhedron) -> bool {
        debug_assert!(!self.marked_empty() && !y.marked_empty() && self.space_dim > 0);
        if self.status.test_c_pending() && !self.process_pending_constraints() {
            return true;
        }
        if y.status.test_g_pending() {
            y.process_pending_generators();
        }
        if !self.status.test_g_up_to_date() && !self.update_generators() {
            return true;
        }
        if !y.status.test_c_up_to_date() {
            y.update_constraints();
        }
        generators_satisfy_constraints(&self.gen_sys, &y.con_sys)
    }

    /// How the polyhedron relates to the half-space or hyperplane of `c`.
    pub fn relation_with_constraint(&mut self, c: &Constraint) -> Result<PolyConRelation> {
        self.check_row_dimension("relation_with(c)", "c", c.space_dimension())?;
        let empty_relation =
            PolyConRelation::saturates() | PolyConRelation::is_included() | PolyConRelation::is_disjoint();
        if self.marked_empty() {
            return Ok(empty_relation);
        }
        if self.space_dim == 0 {
            return Ok(zero_dim_relation(c));
        }
        if (self.status.test_c_pending() && !self.process_pending_constraints())
            || (!self.status.test_g_up_to_date() && !self.update_generators())
        {
            return Ok(empty_relation);
        }
        Ok(generators_relation(&self.gen_sys, &padded(c, self.space_dim)))
    }

    /// Whether adding `g` would leave the polyhedron unchanged.
    pub fn relation_with_generator(&mut self, g: &Generator) -> Result<PolyGenRelation> {
        self.check_row_dimension("relation_with(g)", "g", g.space_dimension())?;
        if self.marked_empty() {
            return Ok(PolyGenRelation::Nothing);
        }
        if self.space_dim == 0 {
            return Ok(PolyGenRelation::Subsumes);
        }
        if self.status.test_g_pending() {
            self.process_pending_generators();
        } else if !self.status.test_c_up_to_date() {
            self.update_constraints();
        }
        Ok(if satisfies_all_constraints(&self.con_sys, &padded(g, self.space_dim)) {
            PolyGenRelation::Subsumes
        } else {
            PolyGenRelation::Nothing
        })
    }
}

fn three_valued(b: bool) -> ThreeValued {
    if b {
        ThreeValued::True
    } else {
        ThreeValued::False
    }
}

/// `expr` as a closed row, for homogeneous products with generators.
fn expression_row(expr: &LinearExpression) -> Row {
    Row::from_coeffs(
        expr.to_columns(expr.space_dimension() + 1),
        RowKind::RayOrPointOrInequality,
        Topology::Closed,
    )
}

/// Relation of the zero-dimensional universe with `c`.
fn zero_dim_relation(c: &Constraint) -> PolyConRelation {
    if c.is_inconsistent() {
        // `0 > 0` still defines the hyperplane `0 = 0`.
        if c.is_strict_inequality() && c.inhomogeneous_term().is_zero() {
            PolyConRelation::saturates() | PolyConRelation::is_disjoint()
        } else {
            PolyConRelation::is_disjoint()
        }
    } else if c.is_equality() || c.inhomogeneous_term().is_zero() {
        PolyConRelation::saturates() | PolyConRelation::is_included()
    } else {
        PolyConRelation::is_included()
    }
}

/// Every generator of `gs` lies in the polyhedron of `cs`; same topology
/// and dimension.
pub(super) fn generators_satisfy_constraints(gs: &GeneratorSystem, cs: &ConstraintSystem) -> bool {
    let nnc = !cs.is_necessarily_closed();
    let sign = |c: &Constraint, g: &Generator| {
        if nnc {
            reduced_scalar_product_sign(c, g)
        } else {
            scalar_product_sign(c, g)
        }
    };
    cs.iter().all(|c| {
        gs.iter().all(|g| {
            let sp = sign(c, g);
            match (c.kind(), g.kind()) {
                (_, GeneratorKind::Line) | (ConstraintKind::Equality, _) => sp.is_eq(),
                (ConstraintKind::StrictInequality, GeneratorKind::Point) => sp.is_gt(),
                _ => sp.is_ge(),
            }
        })
    })
}

/// Whether `g` satisfies every constraint of `cs`. `g` must already have
/// the space dimension of `cs` but may have the other topology.
pub(super) fn satisfies_all_constraints(cs: &ConstraintSystem, g: &Generator) -> bool {
    let both_nnc = !cs.is_necessarily_closed() && !g.is_necessarily_closed();
    let sign = |c: &Constraint| {
        if both_nnc {
            reduced_scalar_product_sign(c, g)
        } else {
            topology_adjusted_sign(c, g)
        }
    };
    let kind = g.kind();
    cs.iter().all(|c| {
        let sp = sign(c);
        match (kind, c.kind()) {
            (GeneratorKind::Line, _) | (_, ConstraintKind::Equality) => sp.is_eq(),
            (GeneratorKind::Point, ConstraintKind::StrictInequality) if !cs.is_necessarily_closed() => {
                sp.is_gt()
            }
            _ => sp.is_ge(),
        }
    })
}

/// Relation between the polyhedron generated by `gs` and `c`, which must
/// already have the space dimension of `gs`.
pub(super) fn generators_relation(gs: &GeneratorSystem, c: &Constraint) -> PolyConRelation {
    let included = PolyConRelation::is_included();
    let disjoint = PolyConRelation::is_disjoint();
    let strictly_intersects = PolyConRelation::strictly_intersects();
    match c.kind() {
        ConstraintKind::Equality => {
            let mut result = PolyConRelation::saturates() | included;
            // Sign of the first point or non-saturating ray met.
            let mut first_sign: Option<Ordering> = None;
            for g in gs.iter().rev() {
                let sp = topology_adjusted_sign(c, g);
                if sp.is_eq() {
                    if g.is_point() {
                        match first_sign {
                            None => first_sign = Some(Ordering::Equal),
                            Some(s) if s.is_ne() => return strictly_intersects,
                            Some(_) => {}
                        }
                    }
                    continue;
                }
                if g.is_line() {
                    return strictly_intersects;
                }
                match first_sign {
                    None => {
                        first_sign = Some(sp);
                        result = disjoint;
                    }
                    Some(s) if s != sp => return strictly_intersects,
                    Some(_) => {}
                }
            }
            result
        }
        ConstraintKind::NonStrictInequality => {
            let mut result = PolyConRelation::saturates() | included;
            let mut first = true;
            for g in gs.iter().rev() {
                let sp = topology_adjusted_sign(c, g);
                if sp.is_eq() {
                    if g.is_point() {
                        if first {
                            first = false;
                        } else if result == disjoint {
                            return strictly_intersects;
                        }
                    }
                    continue;
                }
                if g.is_line() {
                    return strictly_intersects;
                }
                if first {
                    first = false;
                    result = if sp.is_gt() { included } else { disjoint };
                    continue;
                }
                if (sp.is_gt() && result == disjoint) || (sp.is_lt() && result.implies(included)) {
                    return strictly_intersects;
                }
                if sp.is_gt() {
                    result = included;
                }
            }
            result
        }
        ConstraintKind::StrictInequality => {
            let mut result = PolyConRelation::saturates() | disjoint;
            let mut first = true;
            for g in gs.iter().rev() {
                let sp = reduced_scalar_product_sign(c, g);
                if sp.is_eq() {
                    if g.is_point() {
                        if first {
                            first = false;
                        } else if result == included {
                            return strictly_intersects;
                        }
                    }
                    continue;
                }
                if g.is_line() {
                    return strictly_intersects;
                }
                if first {
                    first = false;
                    result = if sp.is_gt() { included } else { disjoint };
                    continue;
                }
                if (sp.is_gt() && result.implies(disjoint)) || (sp.is_le() && result == included) {
                    return strictly_intersects;
                }
                if sp.is_lt() {
                    result = disjoint;
                }
            }
            result
        }
    }
}
