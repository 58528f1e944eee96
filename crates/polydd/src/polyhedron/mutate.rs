//! Adding constraints and generators.
//!
//! Policy
//! - When both sides are minimized and a saturation matrix is valid, new
//!   rows become pending rows and are folded in incrementally later.
//! - Otherwise the rows go straight into the up-to-date side and the other
//!   side is invalidated.
//! - Rows of a lower space dimension are padded with zero coefficients.

use super::{padded, Polyhedron};
use crate::error::{PolyhedronError, Result};
use crate::linear::{Constraint, ConstraintKind, Generator, GeneratorKind, LinearRow, Topology};
use crate::system::{ConstraintSystem, GeneratorSystem};
use num_traits::Signed;

impl Polyhedron {
    /// Intersect with the half-space or hyperplane of `c`.
    ///
    /// A closed polyhedron accepts a strict inequality only when it is
    /// trivially true or trivially false.
    pub fn add_constraint(&mut self, c: &Constraint) -> Result<()> {
        const METHOD: &str = "add_constraint(c)";
        if c.is_strict_inequality() && self.is_necessarily_closed() {
            if c.is_tautological() {
                return Ok(());
            }
            if c.is_inconsistent() {
                self.set_empty();
                return Ok(());
            }
            return Err(PolyhedronError::topology_incompatible(
                self.topology,
                METHOD,
                "c is a strict inequality",
            ));
        }
        self.check_row_dimension(METHOD, "c", c.space_dimension())?;
        if !self.marked_empty() {
            self.refine_no_check(c);
        }
        Ok(())
    }

    /// As [`Polyhedron::add_constraint`], except that a closed polyhedron
    /// refines with the closure of a strict inequality instead of failing.
    pub fn refine_with_constraint(&mut self, c: &Constraint) -> Result<()> {
        self.check_row_dimension("refine_with_constraint(c)", "c", c.space_dimension())?;
        if !self.marked_empty() {
            self.refine_no_check(c);
        }
        Ok(())
    }

    fn refine_no_check(&mut self, c: &Constraint) {
        debug_assert!(!self.marked_empty());
        if self.space_dim == 0 {
            if c.is_inconsistent() {
                self.set_empty();
            }
            return;
        }
        if self.status.test_g_pending() {
            self.process_pending_generators();
        } else if !self.status.test_c_up_to_date() {
            self.update_constraints();
        }
        let c = if self.is_necessarily_closed() {
            closure_of(c)
        } else {
            c.clone()
        };
        let c = padded(&c, self.space_dim);
        if self.status.can_have_something_pending() {
            self.con_sys.insert_pending(c);
            self.status.set_c_pending();
        } else {
            self.con_sys.insert(c);
            self.status.clear_constraints_minimized();
            self.status.clear_generators_up_to_date();
        }
        debug_assert!(self.check_invariants());
    }

    /// Intersect with every constraint of `cs`.
    pub fn add_constraints(&mut self, cs: &ConstraintSystem) -> Result<()> {
        self.add_constraints_impl(cs.clone(), "add_constraints(cs)")
    }

    /// As [`Polyhedron::add_constraints`], taking ownership of `cs`.
    pub fn add_recycled_constraints(&mut self, cs: ConstraintSystem) -> Result<()> {
        self.add_constraints_impl(cs, "add_recycled_constraints(cs)")
    }

    fn add_constraints_impl(&mut self, mut cs: ConstraintSystem, method: &'static str) -> Result<()> {
        if self.is_necessarily_closed() && cs.has_strict_inequalities() {
            return Err(PolyhedronError::topology_incompatible(
                self.topology,
                method,
                "cs contains strict inequalities",
            ));
        }
        self.check_row_dimension(method, "cs", cs.space_dimension())?;
        if cs.has_no_rows() {
            return Ok(());
        }
        if self.space_dim == 0 {
            if cs.iter().any(|c| c.is_inconsistent()) {
                self.set_empty();
            }
            return Ok(());
        }
        if self.marked_empty() {
            return Ok(());
        }
        if self.status.test_g_pending() {
            self.process_pending_generators();
        } else if !self.status.test_c_up_to_date() {
            self.update_constraints();
        }
        let adjusted = cs.adjust_topology_and_space_dimension(self.topology, self.space_dim);
        debug_assert!(adjusted);
        self.con_sys.append_pending_rows(cs);
        if self.status.can_have_something_pending() {
            self.status.set_c_pending();
        } else {
            self.con_sys.unset_pending_rows();
            self.con_sys.set_sorted(false);
            self.status.clear_constraints_minimized();
            self.status.clear_generators_up_to_date();
        }
        debug_assert!(self.check_invariants());
        Ok(())
    }

    /// Replace an NNC polyhedron with its topological closure by making
    /// every strict inequality non-strict. Closed polyhedra are unchanged.
    pub fn topological_closure_assign(&mut self) {
        if self.is_necessarily_closed() || self.marked_empty() || self.space_dim == 0 {
            return;
        }
        if self.status.has_something_pending() {
            self.remove_pending_to_obtain_constraints();
        }
        if !self.status.test_c_up_to_date() {
            self.update_constraints();
        }
        let eps = self.con_sys.num_columns() - 1;
        let mut changed = false;
        for c in self.con_sys.rows_mut() {
            if c[eps].is_negative() && !c.is_tautological() {
                let row = c.row_mut();
                row[eps] = 0.into();
                row.normalize();
                changed = true;
            }
        }
        if changed {
            self.con_sys
                .insert(padded(&Constraint::epsilon_leq_one(), self.space_dim));
            self.con_sys.set_sorted(false);
            self.status.clear_constraints_minimized();
            self.status.clear_generators_up_to_date();
        }
        debug_assert!(self.check_invariants());
    }

    /// Join with the single generator `g`.
    ///
    /// An empty polyhedron only accepts a point; a closed one never accepts
    /// a closure point.
    pub fn add_generator(&mut self, g: &Generator) -> Result<()> {
        const METHOD: &str = "add_generator(g)";
        if g.is_closure_point() && self.is_necessarily_closed() {
            return Err(PolyhedronError::topology_incompatible(
                self.topology,
                METHOD,
                "g is a closure point",
            ));
        }
        self.check_row_dimension(METHOD, "g", g.space_dimension())?;

        if self.space_dim == 0 {
            if self.marked_empty() {
                if !g.is_point() {
                    return Err(invalid_generator(METHOD));
                }
                self.set_zero_dim_univ();
            }
            return Ok(());
        }

        let g = padded(&in_topology(g, self.topology), self.space_dim);
        let nnc = !self.is_necessarily_closed();
        if self.marked_empty()
            || (self.status.test_c_pending() && !self.process_pending_constraints())
            || (!self.status.test_g_up_to_date() && !self.minimize())
        {
            if g.kind() != GeneratorKind::Point {
                return Err(invalid_generator(METHOD));
            }
            let mut gs = GeneratorSystem::with_topology(self.topology, self.space_dim);
            if nnc {
                gs.insert(closure_point_of(&g));
            }
            gs.insert(g);
            self.gen_sys = gs;
            self.status.reset_empty();
            self.set_generators_minimized();
            debug_assert!(self.check_invariants());
            return Ok(());
        }

        let pending = self.status.can_have_something_pending();
        let mut rows = Vec::with_capacity(2);
        if nnc && g.is_point() {
            rows.push(closure_point_of(&g));
        }
        rows.push(g);
        for r in rows {
            if pending {
                self.gen_sys.insert_pending(r);
            } else {
                self.gen_sys.insert(r);
            }
        }
        if pending {
            self.status.set_g_pending();
        } else {
            self.status.clear_generators_minimized();
            self.status.clear_constraints_up_to_date();
        }
        debug_assert!(self.check_invariants());
        Ok(())
    }

    /// Join with the polyhedron generated by `gs`.
    pub fn add_generators(&mut self, gs: &GeneratorSystem) -> Result<()> {
        self.add_generators_impl(gs.clone(), "add_generators(gs)")
    }

    /// As [`Polyhedron::add_generators`], taking ownership of `gs`.
    pub fn add_recycled_generators(&mut self, gs: GeneratorSystem) -> Result<()> {
        self.add_generators_impl(gs, "add_recycled_generators(gs)")
    }

    fn add_generators_impl(&mut self, mut gs: GeneratorSystem, method: &'static str) -> Result<()> {
        if self.is_necessarily_closed() && gs.has_closure_points() {
            return Err(PolyhedronError::topology_incompatible(
                self.topology,
                method,
                "gs contains closure points",
            ));
        }
        self.check_row_dimension(method, "gs", gs.space_dimension())?;
        if gs.has_no_rows() {
            return Ok(());
        }
        if self.space_dim == 0 {
            if self.marked_empty() && !gs.has_points() {
                return Err(PolyhedronError::invalid_generators(self.topology, method, "gs"));
            }
            self.set_zero_dim_univ();
            return Ok(());
        }

        let adjusted = gs.adjust_topology_and_space_dimension(self.topology, self.space_dim);
        debug_assert!(adjusted);
        if !self.is_necessarily_closed() {
            gs.add_corresponding_closure_points();
        }

        if self.marked_empty()
            || (self.status.test_c_pending() && !self.process_pending_constraints())
            || (!self.status.test_g_up_to_date() && !self.minimize())
        {
            if !gs.has_points() {
                return Err(PolyhedronError::invalid_generators(self.topology, method, "gs"));
            }
            if gs.num_pending_rows() > 0 {
                gs.unset_pending_rows();
                gs.set_sorted(false);
            }
            self.gen_sys = gs;
            self.status.reset_empty();
            self.status.set_g_up_to_date();
            debug_assert!(self.check_invariants());
            return Ok(());
        }

        self.gen_sys.append_pending_rows(gs);
        if self.status.can_have_something_pending() {
            self.status.set_g_pending();
        } else {
            self.gen_sys.unset_pending_rows();
            self.gen_sys.set_sorted(false);
            self.status.clear_generators_minimized();
            self.status.clear_constraints_up_to_date();
        }
        debug_assert!(self.check_invariants());
        Ok(())
    }
}

fn invalid_generator(method: &'static str) -> PolyhedronError {
    PolyhedronError::InvalidGenerator {
        method,
        reason: "*this is an empty polyhedron and g is not a point".into(),
    }
}

/// `c` with strictness dropped, as a closed row.
fn closure_of(c: &Constraint) -> Constraint {
    if c.is_necessarily_closed() {
        return c.clone();
    }
    let kind = if c.is_equality() {
        ConstraintKind::Equality
    } else {
        ConstraintKind::NonStrictInequality
    };
    Constraint::new(c.expression(), kind)
}

/// `g` converted to `topology`; closure points must not be converted to
/// the closed topology.
fn in_topology(g: &Generator, topology: Topology) -> Generator {
    let mut g = g.clone();
    match topology {
        Topology::Closed => {
            let converted = g.to_closed();
            debug_assert!(converted);
        }
        Topology::NotNecessarilyClosed => g.to_nnc(),
    }
    g
}

/// Closure point at the location of the NNC point `p`.
fn closure_point_of(p: &Generator) -> Generator {
    debug_assert!(!p.is_necessarily_closed() && p.is_point());
    let mut cp = p.clone();
    let row = cp.row_mut();
    let eps = row.eps_index();
    row[eps] = 0.into();
    row.normalize();
    cp
}
