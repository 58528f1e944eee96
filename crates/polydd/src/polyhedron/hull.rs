//! Convex hull, intersection and exactness of the convex hull.
//!
//! Purpose
//! - `poly_hull_assign` and `intersection_assign` are the lattice
//!   operations; they only append rows and leave the minimization to the
//!   scheduler. The `*_and_minimize` variants fold the rows of `y` in
//!   incrementally right away.
//! - The `*_poly_hull_assign_if_exact` family decides whether the convex
//!   hull of `x` and `y` equals their set union and, if so, assigns it to
//!   `x` by adding the generators of `y` not redundant in `x`. Nothing is
//!   changed when the hull is not exact.
//!
//! Why this design (short)
//! - Both inputs are minimized first: the tests read redundancy and
//!   saturation facts off minimal systems, and every later step is then
//!   free of conversions.
//!
//! References
//! - R. Bagnara, P. M. Hill, E. Zaffanella, "Exact join detection for
//!   convex polyhedra and other numerical abstractions", 2009 (BHZ09).
//! - A. Bemporad, K. Fukuda, F. D. Torrisi, "Convexity recognition of the
//!   union of polyhedra", 2000 (BFT00).

use num_traits::Zero;
use tracing::debug;

use super::queries::{generators_relation, satisfies_all_constraints};
use super::Polyhedron;
use crate::cfg::HullAlgorithm;
use crate::error::{PolyhedronError, Result};
use crate::linear::{reduced_scalar_product_sign, Generator, LinearRow};
use crate::minimize::add_and_minimize_with;
use crate::relation::PolyConRelation;
use crate::sat::BitRow;

impl Polyhedron {
    /// `self := convex hull of self ∪ y`.
    pub fn poly_hull_assign(&mut self, y: &mut Polyhedron) -> Result<()> {
        self.check_same_shape(y, "poly_hull_assign(y)")?;
        self.poly_hull_assign_unchecked(y);
        Ok(())
    }

    fn poly_hull_assign_unchecked(&mut self, y: &mut Polyhedron) {
        if y.marked_empty() {
            return;
        }
        if self.marked_empty() {
            *self = y.clone();
            return;
        }
        if self.space_dim == 0 {
            return;
        }
        if (self.status.test_c_pending() && !self.process_pending_constraints())
            || (!self.status.test_g_up_to_date() && !self.update_generators())
        {
            *self = y.clone();
            return;
        }
        if (y.status.test_c_pending() && !y.process_pending_constraints())
            || (!y.status.test_g_up_to_date() && !y.update_generators())
        {
            return;
        }
        if self.status.can_have_something_pending() {
            self.gen_sys.add_pending_rows(&y.gen_sys);
            self.status.set_g_pending();
        } else {
            self.gen_sys.add_pending_rows(&y.gen_sys);
            self.gen_sys.unset_pending_rows();
            self.gen_sys.set_sorted(false);
            self.status.clear_generators_minimized();
            self.status.clear_constraints_up_to_date();
        }
        debug_assert!(self.check_invariants());
    }

    /// `self := self ∩ y`.
    pub fn intersection_assign(&mut self, y: &mut Polyhedron) -> Result<()> {
        self.check_same_shape(y, "intersection_assign(y)")?;
        if self.marked_empty() {
            return Ok(());
        }
        if y.marked_empty() {
            self.set_empty();
            return Ok(());
        }
        if self.space_dim == 0 {
            return Ok(());
        }
        if self.status.test_g_pending() {
            self.process_pending_generators();
        } else if !self.status.test_c_up_to_date() {
            self.update_constraints();
        }
        if y.status.test_g_pending() {
            y.process_pending_generators();
        } else if !y.status.test_c_up_to_date() {
            y.update_constraints();
        }
        if self.status.can_have_something_pending() {
            self.con_sys.add_pending_rows(&y.con_sys);
            self.status.set_c_pending();
        } else {
            self.con_sys.add_pending_rows(&y.con_sys);
            self.con_sys.unset_pending_rows();
            self.con_sys.set_sorted(false);
            self.status.clear_constraints_minimized();
            self.status.clear_generators_up_to_date();
        }
        debug_assert!(self.check_invariants());
        Ok(())
    }

    /// As [`Polyhedron::poly_hull_assign`], then minimize eagerly. Returns
    /// `false` iff the result is empty.
    pub fn poly_hull_assign_and_minimize(&mut self, y: &mut Polyhedron) -> Result<bool> {
        self.check_same_shape(y, "poly_hull_assign_and_minimize(y)")?;
        if y.marked_empty() || !y.minimize() {
            return Ok(self.minimize());
        }
        if self.marked_empty() || !self.minimize() {
            *self = y.clone();
            return Ok(true);
        }
        if self.space_dim == 0 {
            return Ok(true);
        }
        self.obtain_sorted_generators_with_sat();
        add_and_minimize_with(false, &mut self.gen_sys, &mut self.con_sys, &mut self.sat_c, &y.gen_sys);
        self.status.reset_sat_g_up_to_date();
        self.status.set_sat_c_up_to_date();
        debug_assert!(self.check_invariants());
        Ok(true)
    }

    /// As [`Polyhedron::intersection_assign`], then minimize eagerly.
    /// Returns `false` iff the result is empty.
    pub fn intersection_assign_and_minimize(&mut self, y: &mut Polyhedron) -> Result<bool> {
        self.check_same_shape(y, "intersection_assign_and_minimize(y)")?;
        if self.marked_empty() || !self.minimize() {
            return Ok(false);
        }
        if y.marked_empty() || !y.minimize() {
            self.set_empty();
            return Ok(false);
        }
        if self.space_dim == 0 {
            return Ok(true);
        }
        self.obtain_sorted_constraints_with_sat();
        let empty =
            add_and_minimize_with(true, &mut self.con_sys, &mut self.gen_sys, &mut self.sat_g, &y.con_sys);
        if empty {
            debug!(dim = self.space_dim, "intersection is empty");
            self.set_empty();
            return Ok(false);
        }
        self.status.reset_sat_c_up_to_date();
        self.status.set_sat_g_up_to_date();
        debug_assert!(self.check_invariants());
        Ok(true)
    }

    /// Assign the convex hull if it is exact: BFT00 for closed polyhedra,
    /// BHZ09 for NNC ones. Returns whether it was.
    pub fn poly_hull_assign_if_exact(&mut self, y: &mut Polyhedron) -> Result<bool> {
        self.poly_hull_assign_if_exact_with(y, HullAlgorithm::Auto)
    }

    /// As [`Polyhedron::poly_hull_assign_if_exact`] with an explicit choice
    /// of procedure. BFT00 only handles closed polyhedra.
    pub fn poly_hull_assign_if_exact_with(
        &mut self,
        y: &mut Polyhedron,
        algorithm: HullAlgorithm,
    ) -> Result<bool> {
        match algorithm {
            HullAlgorithm::Bhz09 => self.bhz09_poly_hull_assign_if_exact(y),
            HullAlgorithm::Bft00 => self.bft00_poly_hull_assign_if_exact(y),
            HullAlgorithm::Auto if self.is_necessarily_closed() => {
                self.bft00_poly_hull_assign_if_exact(y)
            }
            HullAlgorithm::Auto => self.bhz09_poly_hull_assign_if_exact(y),
        }
    }

    /// BHZ09 exactness test, closed or NNC according to the topology.
    pub fn bhz09_poly_hull_assign_if_exact(&mut self, y: &mut Polyhedron) -> Result<bool> {
        self.check_same_shape(y, "bhz09_poly_hull_assign_if_exact(y)")?;
        if let Some(exact) = self.trivial_hull(y) {
            return Ok(exact);
        }
        let exact = if self.is_necessarily_closed() {
            self.bhz09_c_poly_hull_assign_if_exact(y)?
        } else {
            self.bhz09_nnc_poly_hull_assign_if_exact(y)?
        };
        debug!(algorithm = "bhz09", dim = self.space_dim, exact, "hull exactness");
        Ok(exact)
    }

    /// BFT00 exactness test; closed polyhedra only.
    pub fn bft00_poly_hull_assign_if_exact(&mut self, y: &mut Polyhedron) -> Result<bool> {
        const METHOD: &str = "bft00_poly_hull_assign_if_exact(y)";
        if !self.is_necessarily_closed() {
            return Err(PolyhedronError::topology_incompatible(
                self.topology,
                METHOD,
                "BFT00 requires necessarily closed polyhedra",
            ));
        }
        self.check_same_shape(y, METHOD)?;
        if let Some(exact) = self.trivial_hull(y) {
            return Ok(exact);
        }
        let exact = self.bft00(y)?;
        debug!(algorithm = "bft00", dim = self.space_dim, exact, "hull exactness");
        Ok(exact)
    }

    /// The zero-dimensional and empty cases, where the hull is always
    /// exact. `None` when both are non-empty with positive dimension.
    fn trivial_hull(&mut self, y: &mut Polyhedron) -> Option<bool> {
        if self.space_dim == 0 {
            self.poly_hull_assign_unchecked(y);
            return Some(true);
        }
        if self.marked_empty() {
            *self = y.clone();
            return Some(true);
        }
        if y.is_empty() {
            return Some(true);
        }
        if self.is_empty() {
            *self = y.clone();
            return Some(true);
        }
        None
    }

    /// Minimize both sides and make `sat_c` valid on each.
    fn prepare_for_hull(&mut self, y: &mut Polyhedron) {
        self.minimize();
        y.minimize();
        if !self.status.test_sat_c_up_to_date() {
            self.update_sat_c();
        }
        if !y.status.test_sat_c_up_to_date() {
            y.update_sat_c();
        }
    }

    fn bhz09_c_poly_hull_assign_if_exact(&mut self, y: &mut Polyhedron) -> Result<bool> {
        debug_assert!(self.is_necessarily_closed() && self.space_dim > 0);
        self.prepare_for_hull(y);

        // For closed polyhedra of different affine dimension the hull is
        // exact iff the larger one contains the smaller one.
        let x_affine_dim = self.affine_dimension();
        let y_affine_dim = y.affine_dimension();
        if x_affine_dim > y_affine_dim {
            return Ok(y.included_in(self));
        }
        if x_affine_dim < y_affine_dim {
            if self.included_in(y) {
                *self = y.clone();
                return Ok(true);
            }
            return Ok(false);
        }
        // The affine dimensions come from the minimized systems: nothing
        // has been touched since `prepare_for_hull`.
        let x = &*self;
        let x_gs_red_in_y = redundant_generators(&x.gen_sys, y);
        let y_gs_red_in_x = redundant_generators(&y.gen_sys, x);
        let num_x_gs = x.gen_sys.num_rows();
        let num_y_gs = y.gen_sys.num_rows();

        if y_gs_red_in_x.count_ones() == num_y_gs {
            return Ok(true);
        }
        if x_gs_red_in_y.count_ones() == num_x_gs {
            *self = y.clone();
            return Ok(true);
        }
        // Some constraint of `x` is not redundant for `y`: without a
        // generator of `x` redundant in `y` (or vice versa) the union is not
        // convex.
        if x_gs_red_in_y.is_empty() || y_gs_red_in_x.is_empty() {
            return Ok(false);
        }

        // A constraint of `x` violated by `y` must not be saturated by a
        // generator of `x` that is not redundant in `y`.
        let mut all_ones = BitRow::new();
        all_ones.set_until(num_x_gs);
        for (i, c) in x.con_sys.iter().enumerate() {
            if generators_relation(&y.gen_sys, c).implies(PolyConRelation::is_included()) {
                continue;
            }
            if BitRow::union_of(&x_gs_red_in_y, &x.sat_c[i]) != all_ones {
                return Ok(false);
            }
        }

        self.add_nonredundant_generators(y, &y_gs_red_in_x, false)?;
        Ok(true)
    }

    fn bhz09_nnc_poly_hull_assign_if_exact(&mut self, y: &mut Polyhedron) -> Result<bool> {
        debug_assert!(!self.is_necessarily_closed() && self.space_dim > 0);
        self.prepare_for_hull(y);

        let x = &*self;
        let x_gs_nonred_in_y = nonredundant_generators(&x.gen_sys, y);
        if x_gs_nonred_in_y.is_empty() {
            *self = y.clone();
            return Ok(true);
        }
        let y_gs_nonred_in_x = nonredundant_generators(&y.gen_sys, x);
        if y_gs_nonred_in_x.is_empty() {
            return Ok(true);
        }

        let mut x_side = NncSide::new(x, &x_gs_nonred_in_y, y);
        if !x_side.check_conditions_1_and_2(x, y) {
            return Ok(false);
        }
        let mut y_side = NncSide::new(y, &y_gs_nonred_in_x, x);
        if !y_side.check_conditions_1_and_2(y, x) {
            return Ok(false);
        }

        // Condition 3: closure points saturating a strict inequality violated
        // by the other polyhedron must not turn into points of the hull.
        // Those that are points of the other polyhedron are harmless.
        let x_cond3_not_in_y = closure_points_violating_strict(x, &x_side.condition_3, y);
        let y_cond3_not_in_x = closure_points_violating_strict(y, &y_side.condition_3, x);
        x_side.condition_3 = x_cond3_not_in_y;
        y_side.condition_3 = y_cond3_not_in_x;
        if x_side.condition_3.is_empty() && y_side.condition_3.is_empty() {
            self.add_nonredundant_generators(y, &y_gs_nonred_in_x, true)?;
            return Ok(true);
        }

        let mut ub = self.clone();
        ub.add_nonredundant_generators(y, &y_gs_nonred_in_x, true)?;
        ub.minimize();
        debug_assert!(!ub.marked_empty());
        let x = &*self;
        let ub_cs = ub.constraints();
        let still_in_hull = |gs_owner: &Polyhedron, candidates: &BitRow| {
            candidates.iter().any(|j| {
                let cp = &gs_owner.gen_sys[j];
                debug_assert!(cp.is_closure_point());
                !ub_cs
                    .iter()
                    .filter(|c| c.is_strict_inequality())
                    .any(|c| reduced_scalar_product_sign(c, cp).is_eq())
            })
        };
        if still_in_hull(x, &x_side.condition_3) || still_in_hull(y, &y_side.condition_3) {
            return Ok(false);
        }
        *self = ub;
        Ok(true)
    }

    fn bft00(&mut self, y: &mut Polyhedron) -> Result<bool> {
        debug_assert!(self.is_necessarily_closed() && self.space_dim > 0);
        self.minimize();
        y.minimize();

        let x = &*self;
        let x_gs_red_in_y = redundant_generators(&x.gen_sys, y);
        let y_gs_red_in_x = redundant_generators(&y.gen_sys, x);
        let num_x_red = x_gs_red_in_y.count_ones();
        let num_y_red = y_gs_red_in_x.count_ones();
        if num_x_red == 0 && num_y_red == 0 {
            return Ok(false);
        }
        if num_y_red == y.gen_sys.num_rows() {
            return Ok(true);
        }
        if num_x_red == x.gen_sys.num_rows() {
            *self = y.clone();
            return Ok(true);
        }

        // Neither contains the other: an equality of one side violated by
        // the other side rules out convexity.
        for c in x.con_sys.iter() {
            if c.is_equality()
                && !generators_relation(&y.gen_sys, c).implies(PolyConRelation::is_included())
            {
                return Ok(false);
            }
        }
        for c in y.con_sys.iter() {
            if c.is_equality()
                && !generators_relation(&x.gen_sys, c).implies(PolyConRelation::is_included())
            {
                return Ok(false);
            }
        }

        // Every positive combination of two non-redundant generators must
        // lie in `x` or in `y`.
        let in_union = |g: &Generator| {
            satisfies_all_constraints(&x.con_sys, g) || satisfies_all_constraints(&y.con_sys, g)
        };
        for (i, xg) in x.gen_sys.iter().enumerate() {
            if x_gs_red_in_y.get(i) {
                continue;
            }
            for (j, yg) in y.gen_sys.iter().enumerate() {
                if y_gs_red_in_x.get(j) {
                    continue;
                }
                let Some(mid) = mid_generator(xg, yg) else {
                    continue;
                };
                if !in_union(&mid) {
                    return Ok(false);
                }
                // With exactly one line, the combination using its opposite
                // direction is tested too.
                let other = match (xg.is_line(), yg.is_line()) {
                    (false, true) => Some(difference_generator(xg, yg)),
                    (true, false) => Some(difference_generator(yg, xg)),
                    _ => None,
                };
                if let Some(other) = other {
                    if !in_union(&other) {
                        return Ok(false);
                    }
                }
            }
        }

        self.add_nonredundant_generators(y, &y_gs_red_in_x, false)?;
        Ok(true)
    }

    /// Add the generators of `y` whose bit in `marks` equals `marked`.
    fn add_nonredundant_generators(
        &mut self,
        y: &Polyhedron,
        marks: &BitRow,
        marked: bool,
    ) -> Result<()> {
        for (j, g) in y.gen_sys.iter().enumerate() {
            if marks.get(j) == marked {
                self.add_generator(g)?;
            }
        }
        Ok(())
    }
}

/// Rows of `gs` subsumed by the minimized polyhedron `p`.
fn redundant_generators(gs: &crate::system::GeneratorSystem, p: &Polyhedron) -> BitRow {
    let mut red = BitRow::new();
    for (i, g) in gs.iter().enumerate() {
        if satisfies_all_constraints(&p.con_sys, g) {
            red.set(i);
        }
    }
    red
}

/// Rows of `gs` not subsumed by the minimized polyhedron `p`.
fn nonredundant_generators(gs: &crate::system::GeneratorSystem, p: &Polyhedron) -> BitRow {
    let mut nonred = BitRow::new();
    for (i, g) in gs.iter().enumerate() {
        if !satisfies_all_constraints(&p.con_sys, g) {
            nonred.set(i);
        }
    }
    nonred
}

/// Closure points among `candidates` (generators of `owner`) that, taken as
/// points, violate some strict inequality of `other`.
fn closure_points_violating_strict(owner: &Polyhedron, candidates: &BitRow, other: &Polyhedron) -> BitRow {
    let mut out = BitRow::new();
    for j in candidates.iter() {
        let cp = &owner.gen_sys[j];
        debug_assert!(cp.is_closure_point());
        if other
            .con_sys
            .iter()
            .filter(|c| c.is_strict_inequality())
            .any(|c| reduced_scalar_product_sign(c, cp).is_eq())
        {
            out.set(j);
        }
    }
    out
}

/// Per-side bookkeeping of the NNC test.
struct NncSide {
    nonpoints_nonred: BitRow,
    closure_points: BitRow,
    /// Non-redundant points that stay non-redundant in the closure of the
    /// other polyhedron.
    points_nonred_in_closure: BitRow,
    /// Closure points postponed to condition 3.
    condition_3: BitRow,
}

impl NncSide {
    fn new(p: &Polyhedron, nonred: &BitRow, other: &Polyhedron) -> Self {
        let mut points_nonred = BitRow::new();
        let mut closure_points = BitRow::new();
        for (i, g) in p.gen_sys.iter().enumerate() {
            if g.is_closure_point() {
                closure_points.set(i);
            } else if g.is_point() && nonred.get(i) {
                points_nonred.set(i);
            }
        }
        let mut points_nonred_in_closure = BitRow::new();
        for i in points_nonred.iter() {
            let point = &p.gen_sys[i];
            // Strict inequalities count as non-strict here.
            let outside_closure = other.con_sys.iter().any(|c| {
                let sp = reduced_scalar_product_sign(c, point);
                sp.is_lt() || (c.is_equality() && sp.is_gt())
            });
            if outside_closure {
                points_nonred_in_closure.set(i);
            }
        }
        Self {
            nonpoints_nonred: BitRow::difference_of(nonred, &points_nonred),
            closure_points,
            points_nonred_in_closure,
            condition_3: BitRow::new(),
        }
    }

    /// Conditions 1 and 2 on the constraints of `p` violated by `other`,
    /// collecting the closure points condition 3 must look at.
    fn check_conditions_1_and_2(&mut self, p: &Polyhedron, other: &Polyhedron) -> bool {
        let mut all_ones = BitRow::new();
        all_ones.set_until(p.gen_sys.num_rows());
        for (i, c) in p.con_sys.iter().enumerate() {
            if generators_relation(&other.gen_sys, c).implies(PolyConRelation::is_included()) {
                continue;
            }
            let saturators = BitRow::difference_of(&all_ones, &p.sat_c[i]);
            if !BitRow::intersection_of(&self.nonpoints_nonred, &saturators).is_empty() {
                return false;
            }
            if c.is_strict_inequality() {
                self.condition_3
                    .union_assign(&BitRow::intersection_of(&self.closure_points, &saturators));
            } else if !BitRow::intersection_of(&self.points_nonred_in_closure, &saturators).is_empty() {
                return false;
            }
        }
        true
    }
}

/// `x + y` as a generator, or `None` when it is the zero vector. A sum of
/// two lines is a line; a line plus anything else takes the other kind.
fn mid_generator(x: &Generator, y: &Generator) -> Option<Generator> {
    let mut mid = x.clone();
    {
        let row = mid.row_mut();
        for k in 0..row.size() {
            row[k] += &y[k];
        }
        if row[0].is_zero() && row.all_homogeneous_terms_are_zero() {
            debug_assert!(!x.is_line() && !y.is_line());
            return None;
        }
        if x.is_line() {
            row.normalize();
            if y.is_line() {
                row.sign_normalize();
            } else {
                row.set_is_ray_or_point_or_inequality();
            }
        }
    }
    Some(mid)
}

/// `x - line` where `x` is not a line: the other combination with `line`.
fn difference_generator(x: &Generator, line: &Generator) -> Generator {
    debug_assert!(!x.is_line() && line.is_line());
    let mut diff = x.clone();
    let row = diff.row_mut();
    for k in 0..row.size() {
        row[k] -= &line[k];
    }
    row.normalize();
    diff
}
