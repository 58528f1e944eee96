//! Adding and removing space dimensions.

use super::{check_space_dimension, Polyhedron};
use crate::cfg::MAX_SPACE_DIMENSION;
use crate::error::{PolyhedronError, Result};
use crate::linear::Generator;
use crate::system::{ConstraintSystem, GeneratorSystem};

impl Polyhedron {
    /// Add `m` unconstrained dimensions: the result is the cylinder
    /// `self × R^m`.
    pub fn add_space_dimensions_and_embed(&mut self, m: usize) -> Result<()> {
        self.check_added_dimensions("add_space_dimensions_and_embed(m)", m)?;
        if m == 0 {
            return Ok(());
        }
        if self.marked_empty() {
            self.space_dim += m;
            self.con_sys = ConstraintSystem::with_topology(self.topology, 0);
            return Ok(());
        }
        if self.space_dim == 0 {
            *self = Polyhedron::universe(self.topology, m)?;
            return Ok(());
        }
        match (self.status.test_c_up_to_date(), self.status.test_g_up_to_date()) {
            (true, true) => {
                if !self.status.test_sat_g_up_to_date() {
                    self.update_sat_g();
                }
                // Constraints are blind to the new coordinates; generators
                // gain one line per new coordinate, saturating everything.
                self.con_sys.grow_columns(m);
                self.gen_sys.add_rows_and_columns(m);
                self.sat_g.prepend_zero_rows(m);
                self.sat_c.transpose_assign(&self.sat_g);
                self.status.set_sat_c_up_to_date();
            }
            (true, false) => self.con_sys.grow_columns(m),
            (false, _) => {
                self.gen_sys.add_rows_and_columns(m);
                self.gen_sys.unset_pending_rows();
            }
        }
        self.space_dim += m;
        debug_assert!(self.check_invariants());
        Ok(())
    }

    /// Add `m` dimensions fixed to zero: the result is `self × {0}^m`.
    pub fn add_space_dimensions_and_project(&mut self, m: usize) -> Result<()> {
        self.check_added_dimensions("add_space_dimensions_and_project(m)", m)?;
        if m == 0 {
            return Ok(());
        }
        if self.marked_empty() {
            self.space_dim += m;
            self.con_sys = ConstraintSystem::with_topology(self.topology, 0);
            return Ok(());
        }
        if self.space_dim == 0 {
            let mut gs = GeneratorSystem::with_topology(self.topology, m);
            if !self.is_necessarily_closed() {
                gs.insert(Generator::zero_dim_closure_point());
            }
            gs.insert(Generator::zero_dim_point());
            self.gen_sys = gs;
            self.set_generators_minimized();
            self.space_dim = m;
            debug_assert!(self.check_invariants());
            return Ok(());
        }
        match (self.status.test_c_up_to_date(), self.status.test_g_up_to_date()) {
            (true, true) => {
                if !self.status.test_sat_c_up_to_date() {
                    self.update_sat_c();
                }
                // Each new coordinate gets the equality `x_k = 0`, saturated
                // by every generator.
                self.gen_sys.grow_columns(m);
                self.con_sys.add_rows_and_columns(m);
                self.sat_c.prepend_zero_rows(m);
                self.sat_g.transpose_assign(&self.sat_c);
                self.status.set_sat_g_up_to_date();
            }
            (true, false) => {
                self.con_sys.add_rows_and_columns(m);
                self.con_sys.unset_pending_rows();
            }
            (false, _) => self.gen_sys.grow_columns(m),
        }
        self.space_dim += m;
        debug_assert!(self.check_invariants());
        Ok(())
    }

    /// Project onto the first `new_dimension` coordinates.
    pub fn remove_higher_space_dimensions(&mut self, new_dimension: usize) -> Result<()> {
        if new_dimension > self.space_dim {
            return Err(PolyhedronError::dimension_incompatible(
                self.topology,
                "remove_higher_space_dimensions(nd)",
                "nd",
                self.space_dim,
                new_dimension,
            ));
        }
        if new_dimension == self.space_dim {
            return Ok(());
        }
        // Pending generators would be kept for nothing: the constraints are
        // dropped anyway.
        if self.marked_empty()
            || (self.status.has_something_pending() && !self.remove_pending_to_obtain_generators())
            || (!self.status.test_g_up_to_date() && !self.update_generators())
        {
            self.space_dim = new_dimension;
            self.con_sys = ConstraintSystem::with_topology(self.topology, 0);
            return Ok(());
        }
        if new_dimension == 0 {
            self.set_zero_dim_univ();
            return Ok(());
        }

        let removed = self.space_dim - new_dimension;
        if !self.is_necessarily_closed() {
            let eps = self.gen_sys.num_columns() - 1;
            self.gen_sys.swap_columns(eps, new_dimension + 1);
        }
        self.gen_sys.remove_trailing_columns(removed);
        // Lines and rays along the removed coordinates vanish.
        self.gen_sys
            .retain(|g| !(g.is_line_or_ray() && g.all_homogeneous_terms_are_zero()));
        self.gen_sys.set_sorted(false);
        self.status.clear_constraints_up_to_date();
        self.status.clear_generators_minimized();
        self.space_dim = new_dimension;
        debug_assert!(self.check_invariants());
        Ok(())
    }

    fn check_added_dimensions(&self, method: &'static str, m: usize) -> Result<()> {
        if m > MAX_SPACE_DIMENSION - self.space_dim {
            return Err(PolyhedronError::space_dimension_overflow(
                self.topology,
                method,
                "adding m new space dimensions exceeds the maximum allowed space dimension",
            ));
        }
        check_space_dimension(self.topology, method, self.space_dim + m)
    }
}
