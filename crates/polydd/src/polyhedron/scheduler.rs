//! Minimization scheduler: decides which conversion to run and keeps the
//! status flags and saturation matrices in step with the systems.
//!
//! Policy
//! - Pending constraints and pending generators never coexist.
//! - A conversion always leaves both sides minimized and exactly one
//!   saturation matrix valid: `sat_g` after constraints → generators (it is
//!   the orientation `add_and_minimize` works with), `sat_c` after
//!   generators → constraints.

use tracing::debug;

use super::Polyhedron;
use crate::linear::{scalar_product_sign, Constraint, GeneratorKind, LinearExpression, Topology, Variable};
use crate::minimize::{add_and_minimize, minimize};
use crate::sat::{swap_rows_with_sat, BitMatrix, BitRow};
use crate::status::Status;
use crate::system::{ConstraintSystem, GeneratorSystem};

impl Polyhedron {
    /// Fold pending rows of either kind. Returns `false` iff the polyhedron
    /// turned out to be empty.
    pub fn process_pending(&mut self) -> bool {
        if self.status.test_c_pending() {
            self.process_pending_constraints()
        } else if self.status.test_g_pending() {
            self.process_pending_generators();
            true
        } else {
            !self.marked_empty()
        }
    }

    /// Fold the pending constraints into the generators. Returns `false` iff
    /// the polyhedron is empty.
    pub(crate) fn process_pending_constraints(&mut self) -> bool {
        debug_assert!(self.space_dim > 0 && !self.marked_empty());
        debug_assert!(self.status.test_c_pending());
        if !self.status.test_sat_g_up_to_date() {
            self.sat_g.transpose_assign(&self.sat_c);
            self.status.set_sat_g_up_to_date();
        }
        if !self.con_sys.is_sorted() {
            self.obtain_sorted_constraints_with_sat();
        }
        self.con_sys.sort_pending_and_remove_duplicates();
        if self.con_sys.num_pending_rows() == 0 {
            self.status.reset_c_pending();
            return true;
        }
        let empty = add_and_minimize(true, &mut self.con_sys, &mut self.gen_sys, &mut self.sat_g);
        debug_assert_eq!(self.con_sys.num_pending_rows(), 0);
        if empty {
            debug!(dim = self.space_dim, "pending constraints emptied the polyhedron");
            self.set_empty();
        } else {
            self.status.reset_c_pending();
            self.status.reset_sat_c_up_to_date();
            self.status.set_sat_g_up_to_date();
        }
        !empty
    }

    /// Fold the pending generators into the constraints.
    pub(crate) fn process_pending_generators(&mut self) {
        debug_assert!(self.space_dim > 0 && !self.marked_empty());
        debug_assert!(self.status.test_g_pending());
        if !self.status.test_sat_c_up_to_date() {
            self.sat_c.transpose_assign(&self.sat_g);
            self.status.set_sat_c_up_to_date();
        }
        if !self.gen_sys.is_sorted() {
            self.obtain_sorted_generators_with_sat();
        }
        self.gen_sys.sort_pending_and_remove_duplicates();
        if self.gen_sys.num_pending_rows() == 0 {
            self.status.reset_g_pending();
            return;
        }
        add_and_minimize(false, &mut self.gen_sys, &mut self.con_sys, &mut self.sat_c);
        debug_assert_eq!(self.gen_sys.num_pending_rows(), 0);
        self.status.reset_g_pending();
        self.status.reset_sat_g_up_to_date();
        self.status.set_sat_c_up_to_date();
    }

    /// Make the pending constraints ordinary rows, giving up minimization,
    /// or process pending generators.
    pub(crate) fn remove_pending_to_obtain_constraints(&mut self) {
        debug_assert!(self.status.has_something_pending());
        if self.status.test_c_pending() {
            self.con_sys.unset_pending_rows();
            self.con_sys.set_sorted(false);
            self.status.reset_c_pending();
            self.status.clear_constraints_minimized();
            self.status.clear_generators_up_to_date();
        } else {
            self.process_pending_generators();
        }
    }

    /// Symmetric to [`Polyhedron::remove_pending_to_obtain_constraints`].
    /// Returns `false` iff the polyhedron is empty.
    pub(crate) fn remove_pending_to_obtain_generators(&mut self) -> bool {
        debug_assert!(self.status.has_something_pending());
        if self.status.test_g_pending() {
            self.gen_sys.unset_pending_rows();
            self.gen_sys.set_sorted(false);
            self.status.reset_g_pending();
            self.status.clear_generators_minimized();
            self.status.clear_constraints_up_to_date();
            true
        } else {
            self.process_pending_constraints()
        }
    }

    /// Derive the constraints from the generators.
    pub(crate) fn update_constraints(&mut self) {
        debug_assert!(self.space_dim > 0 && !self.marked_empty());
        debug_assert!(self.status.test_g_up_to_date());
        debug_assert!(!self.status.has_something_pending());
        minimize(false, &mut self.gen_sys, &mut self.con_sys, &mut self.sat_g);
        self.set_constraints_minimized();
        self.set_generators_minimized();
        self.status.set_sat_g_up_to_date();
        self.status.reset_sat_c_up_to_date();
    }

    /// Derive the generators from the constraints. Returns `false` iff the
    /// constraints are unsatisfiable, in which case the polyhedron is set
    /// empty.
    pub(crate) fn update_generators(&mut self) -> bool {
        debug_assert!(self.space_dim > 0 && !self.marked_empty());
        debug_assert!(self.status.test_c_up_to_date());
        debug_assert!(!self.status.has_something_pending());
        let empty = minimize(true, &mut self.con_sys, &mut self.gen_sys, &mut self.sat_c);
        if empty {
            self.set_empty();
        } else {
            self.set_constraints_minimized();
            self.set_generators_minimized();
            self.status.set_sat_c_up_to_date();
            self.status.reset_sat_g_up_to_date();
        }
        !empty
    }

    /// Recompute `sat_c` from the scalar products of the non-pending rows.
    pub(crate) fn update_sat_c(&mut self) {
        debug_assert!(self.status.test_c_minimized() && self.status.test_g_minimized());
        let nc = self.con_sys.first_pending_row();
        let ng = self.gen_sys.first_pending_row();
        let mut sat = BitMatrix::new(nc, ng);
        for i in 0..nc {
            for j in 0..ng {
                let sp = scalar_product_sign(&self.con_sys[i], &self.gen_sys[j]);
                debug_assert!(sp.is_ge());
                if sp.is_gt() {
                    sat[i].set(j);
                }
            }
        }
        self.sat_c = sat;
        self.status.set_sat_c_up_to_date();
    }

    /// Recompute `sat_g` from the scalar products of the non-pending rows.
    pub(crate) fn update_sat_g(&mut self) {
        debug_assert!(self.status.test_c_minimized() && self.status.test_g_minimized());
        let nc = self.con_sys.first_pending_row();
        let ng = self.gen_sys.first_pending_row();
        let mut sat = BitMatrix::new(ng, nc);
        for j in 0..ng {
            for i in 0..nc {
                let sp = scalar_product_sign(&self.con_sys[i], &self.gen_sys[j]);
                debug_assert!(sp.is_ge());
                if sp.is_gt() {
                    sat[j].set(i);
                }
            }
        }
        self.sat_g = sat;
        self.status.set_sat_g_up_to_date();
    }

    /// Sort the non-pending constraints, permuting whichever saturation
    /// matrix is valid along with them.
    pub(crate) fn obtain_sorted_constraints(&mut self) {
        debug_assert!(self.status.test_c_up_to_date());
        if self.con_sys.is_sorted() {
            return;
        }
        if self.status.test_sat_c_up_to_date() {
            self.con_sys.sort_and_remove_with_sat(&mut self.sat_c);
            self.status.reset_sat_g_up_to_date();
        } else if self.status.test_sat_g_up_to_date() {
            self.sat_c.transpose_assign(&self.sat_g);
            self.con_sys.sort_and_remove_with_sat(&mut self.sat_c);
            self.status.set_sat_c_up_to_date();
            self.status.reset_sat_g_up_to_date();
        } else {
            self.con_sys.sort_rows();
        }
    }

    /// Sort the non-pending generators, permuting whichever saturation
    /// matrix is valid along with them.
    pub(crate) fn obtain_sorted_generators(&mut self) {
        debug_assert!(self.status.test_g_up_to_date());
        if self.gen_sys.is_sorted() {
            return;
        }
        if self.status.test_sat_g_up_to_date() {
            self.gen_sys.sort_and_remove_with_sat(&mut self.sat_g);
            self.status.reset_sat_c_up_to_date();
        } else if self.status.test_sat_c_up_to_date() {
            self.sat_g.transpose_assign(&self.sat_c);
            self.gen_sys.sort_and_remove_with_sat(&mut self.sat_g);
            self.status.set_sat_g_up_to_date();
            self.status.reset_sat_c_up_to_date();
        } else {
            self.gen_sys.sort_rows();
        }
    }

    /// Sort the constraints and leave `sat_g` valid and consistent with
    /// the new order.
    pub(crate) fn obtain_sorted_constraints_with_sat(&mut self) {
        debug_assert!(self.status.test_c_up_to_date() && self.status.test_g_up_to_date());
        if !self.status.test_sat_c_up_to_date() && !self.status.test_sat_g_up_to_date() {
            self.update_sat_g();
        }
        if self.con_sys.is_sorted() {
            if self.status.test_sat_g_up_to_date() {
                return;
            }
        } else {
            if !self.status.test_sat_c_up_to_date() {
                self.sat_c.transpose_assign(&self.sat_g);
                self.status.set_sat_c_up_to_date();
            }
            self.con_sys.sort_and_remove_with_sat(&mut self.sat_c);
        }
        self.sat_g.transpose_assign(&self.sat_c);
        self.status.set_sat_g_up_to_date();
        self.con_sys.set_sorted(true);
    }

    /// Sort the generators and leave `sat_c` valid and consistent with the
    /// new order.
    pub(crate) fn obtain_sorted_generators_with_sat(&mut self) {
        debug_assert!(self.status.test_c_up_to_date() && self.status.test_g_up_to_date());
        if !self.status.test_sat_c_up_to_date() && !self.status.test_sat_g_up_to_date() {
            self.update_sat_c();
        }
        if self.gen_sys.is_sorted() {
            if self.status.test_sat_c_up_to_date() {
                return;
            }
        } else {
            if !self.status.test_sat_g_up_to_date() {
                self.sat_g.transpose_assign(&self.sat_c);
                self.status.set_sat_g_up_to_date();
            }
            self.gen_sys.sort_and_remove_with_sat(&mut self.sat_g);
        }
        self.sat_c.transpose_assign(&self.sat_g);
        self.status.set_sat_c_up_to_date();
        self.gen_sys.set_sorted(true);
    }

    /// Bring both representations to minimal form. Returns `false` iff the
    /// polyhedron is empty.
    pub fn minimize(&mut self) -> bool {
        if self.marked_empty() {
            return false;
        }
        if self.space_dim == 0 {
            return true;
        }
        if self.status.has_something_pending() {
            let not_empty = self.process_pending();
            debug_assert!(self.check_invariants());
            return not_empty;
        }
        if self.status.test_c_minimized() && self.status.test_g_minimized() {
            return true;
        }
        let not_empty = if self.status.test_c_up_to_date() {
            self.update_generators()
        } else {
            self.update_constraints();
            true
        };
        debug_assert!(self.check_invariants());
        not_empty
    }

    /// Drop strict inequalities of an NNC polyhedron that are redundant once
    /// epsilon is taken into account. Returns `false` iff the polyhedron is
    /// empty. On a closed polyhedron this is plain minimization.
    pub fn strongly_minimize_constraints(&mut self) -> bool {
        if self.is_necessarily_closed() {
            return self.minimize();
        }
        if !self.minimize() {
            return false;
        }
        if self.space_dim == 0 {
            return true;
        }
        if !self.status.test_sat_c_up_to_date() {
            if self.status.test_sat_g_up_to_date() {
                self.sat_c.transpose_assign(&self.sat_g);
                self.status.set_sat_c_up_to_date();
            } else {
                self.update_sat_c();
            }
        }

        // Masks over the generator indices, restricted to one kind each.
        let mut sat_all_but_rays = BitRow::new();
        let mut sat_all_but_points = BitRow::new();
        let mut sat_all_but_closure_points = BitRow::new();
        let n_lines = self.gen_sys.num_lines_or_equalities();
        for i in n_lines..self.gen_sys.num_rows() {
            match self.gen_sys[i].kind() {
                GeneratorKind::Ray => sat_all_but_rays.set(i),
                GeneratorKind::Point => sat_all_but_points.set(i),
                GeneratorKind::ClosurePoint => sat_all_but_closure_points.set(i),
                GeneratorKind::Line => panic!("line found past the lines of a minimized system"),
            }
        }
        let sat_lines_and_rays = BitRow::union_of(&sat_all_but_points, &sat_all_but_closure_points);
        let sat_lines_and_closure_points = BitRow::union_of(&sat_all_but_rays, &sat_all_but_points);
        let sat_lines = BitRow::union_of(&sat_lines_and_rays, &sat_lines_and_closure_points);

        let mut changed = false;
        let mut found_eps_leq_one = false;
        let mut cs_rows = self.con_sys.num_rows();
        let mut i = 0;
        while i < cs_rows {
            if !self.con_sys[i].is_strict_inequality() {
                i += 1;
                continue;
            }
            let sat_ci = BitRow::union_of(&self.sat_c[i], &sat_lines_and_closure_points);
            if sat_ci == sat_lines {
                // Saturated by no closure point.
                if !found_eps_leq_one && self.con_sys[i].is_epsilon_leq_one() {
                    found_eps_leq_one = true;
                    i += 1;
                    continue;
                }
                cs_rows -= 1;
                swap_rows_with_sat(&mut self.con_sys, &mut self.sat_c, i, cs_rows);
                changed = true;
                continue;
            }
            let sat_ci = BitRow::union_of(&self.sat_c[i], &sat_all_but_points);
            let eps_redundant = (0..cs_rows).any(|j| {
                j != i
                    && self.con_sys[j].is_strict_inequality()
                    && BitRow::subset_eq(&self.sat_c[j], &sat_ci)
            });
            if eps_redundant {
                cs_rows -= 1;
                swap_rows_with_sat(&mut self.con_sys, &mut self.sat_c, i, cs_rows);
                changed = true;
            } else {
                i += 1;
            }
        }

        if changed {
            debug!(
                removed = self.con_sys.num_rows() - cs_rows,
                found_eps_leq_one, "dropped eps-redundant strict inequalities"
            );
            self.con_sys.truncate(cs_rows);
            self.con_sys.unset_pending_rows();
            self.con_sys.set_sorted(false);
            self.status.clear_generators_up_to_date();
            if !found_eps_leq_one && !epsilon_is_bounded(&self.con_sys, self.space_dim) {
                self.con_sys.insert(Constraint::epsilon_leq_one());
            }
        }
        debug_assert!(self.check_invariants());
        true
    }

    /// Drop points of an NNC polyhedron that are redundant once epsilon is
    /// taken into account, and give every remaining point epsilon equal to
    /// its divisor. Returns `false` iff the polyhedron is empty. On a closed
    /// polyhedron this is plain minimization.
    pub fn strongly_minimize_generators(&mut self) -> bool {
        if self.is_necessarily_closed() {
            return self.minimize();
        }
        if !self.minimize() {
            return false;
        }
        if self.space_dim == 0 {
            return true;
        }
        if !self.status.test_sat_g_up_to_date() {
            if self.status.test_sat_c_up_to_date() {
                self.sat_g.transpose_assign(&self.sat_c);
                self.status.set_sat_g_up_to_date();
            } else {
                self.update_sat_g();
            }
        }

        let mut sat_all_but_strict_ineq = BitRow::new();
        let n_equals = self.con_sys.num_equalities();
        for i in n_equals..self.con_sys.num_rows() {
            if self.con_sys[i].is_strict_inequality() {
                sat_all_but_strict_ineq.set(i);
            }
        }

        let mut changed = false;
        let mut gs_rows = self.gen_sys.num_rows();
        let n_lines = self.gen_sys.num_lines_or_equalities();
        let eps = self.gen_sys.num_columns() - 1;
        let mut i = n_lines;
        while i < gs_rows {
            if !self.gen_sys[i].is_point() {
                i += 1;
                continue;
            }
            let sat_gi = BitRow::union_of(&self.sat_g[i], &sat_all_but_strict_ineq);
            let eps_redundant = (n_lines..gs_rows).any(|j| {
                j != i
                    && self.gen_sys[j].is_point()
                    && BitRow::subset_eq(&self.sat_g[j], &sat_gi)
            });
            if eps_redundant {
                gs_rows -= 1;
                swap_rows_with_sat(&mut self.gen_sys, &mut self.sat_g, i, gs_rows);
                changed = true;
                continue;
            }
            let g = self.gen_sys.row_mut(i);
            if g[eps] != g[0] {
                g[eps] = g[0].clone();
                g.normalize();
                changed = true;
            }
            i += 1;
        }

        if gs_rows < self.gen_sys.num_rows() {
            self.gen_sys.truncate(gs_rows);
            self.gen_sys.unset_pending_rows();
        }
        if changed {
            debug!(rows = gs_rows, "strongly minimized generators");
            self.gen_sys.set_sorted(false);
            self.status.clear_constraints_up_to_date();
        }
        debug_assert!(self.check_invariants());
        true
    }
}

/// Whether the rows of the NNC system `cs` bound epsilon from above, with
/// epsilon read as the ordinary coordinate `space_dim` of a closed
/// polyhedron.
fn epsilon_is_bounded(cs: &ConstraintSystem, space_dim: usize) -> bool {
    debug_assert!(!cs.is_necessarily_closed());
    let mut lp_cs = cs.clone();
    lp_cs.set_topology_flag(Topology::Closed);
    lp_cs.insert(Constraint::zero_dim_positivity());
    let mut status = Status::new();
    status.set_c_up_to_date();
    let mut lp = Polyhedron {
        con_sys: lp_cs,
        gen_sys: GeneratorSystem::with_topology(Topology::Closed, space_dim + 1),
        sat_c: BitMatrix::default(),
        sat_g: BitMatrix::default(),
        status,
        space_dim: space_dim + 1,
        topology: Topology::Closed,
    };
    let objective = LinearExpression::from(Variable(space_dim));
    let bounded = lp.bounds(&objective, true);
    debug!(bounded, "maximized epsilon");
    bounded
}
