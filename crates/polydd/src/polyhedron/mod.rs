//! Convex polyhedra in double description.
//!
//! Purpose
//! - `Polyhedron` keeps a constraint system and a generator system describing
//!   the same set, together with the saturation matrices relating them and
//!   the status flags telling which of these are valid.
//!
//! Why this design (short)
//! - Both representations are computed lazily: an operation that only needs
//!   constraints never pays for a conversion to generators.
//! - Rows added to a fully minimized pair are kept as pending rows and folded
//!   in incrementally, which is much cheaper than a conversion from scratch.
//! - Memoizing operations take `&mut self`; there is no interior mutability.
//!
//! Assumptions and conventions
//! - `sat_c[i][j]` is set iff constraint `i` is not saturated by generator
//!   `j`; `sat_g` is its transpose. Both only cover non-pending rows.
//! - Closed systems carry the positivity constraint `1 ≥ 0`; NNC systems
//!   carry `ε ≥ 0` and `ε ≤ 1`. They never show up in `visible()` rows.
//! - An empty polyhedron clears both systems; a non-empty zero-dimensional
//!   one is the universe and has the zero-dimensional-universe status.
//!
//! Submodules
//! - `scheduler`: pending rows, conversions and saturation bookkeeping.
//! - `queries`: emptiness, bounds, optimization, inclusion and relations.
//! - `hull`: convex hull, intersection and exact convex union (BHZ09, BFT00).
//! - `mutate`: adding constraints and generators.
//! - `chdims`: adding and removing space dimensions.

mod chdims;
mod hull;
mod mutate;
mod queries;
mod scheduler;

#[cfg(test)]
mod tests;

use crate::cfg::MAX_SPACE_DIMENSION;
use crate::error::{PolyhedronError, Result};
use crate::linear::{scalar_product_sign, Constraint, Generator, LinearRow, Topology};
use crate::sat::BitMatrix;
use crate::status::Status;
use crate::system::{ConstraintSystem, GeneratorSystem};

pub use queries::Extremum;

/// Kind of a polyhedron built from a bare space dimension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DegenerateElement {
    Universe,
    Empty,
}

/// A closed or NNC convex polyhedron.
#[derive(Clone, Debug)]
pub struct Polyhedron {
    con_sys: ConstraintSystem,
    gen_sys: GeneratorSystem,
    /// `[constraint][generator]`.
    sat_c: BitMatrix,
    /// `[generator][constraint]`.
    sat_g: BitMatrix,
    status: Status,
    space_dim: usize,
    topology: Topology,
}

impl Polyhedron {
    /// Universe or empty polyhedron of dimension `dim`.
    pub fn new(topology: Topology, dim: usize, kind: DegenerateElement) -> Result<Self> {
        check_space_dimension(topology, "Polyhedron(n, k)", dim)?;
        let mut ph = Self::bare(topology, dim);
        match kind {
            DegenerateElement::Empty => ph.status.set_empty(),
            DegenerateElement::Universe if dim > 0 => {
                add_low_level_constraints(&mut ph.con_sys);
                ph.con_sys.adjust_topology_and_space_dimension(topology, dim);
                ph.set_constraints_minimized();
            }
            DegenerateElement::Universe => {}
        }
        debug_assert!(ph.check_invariants());
        Ok(ph)
    }

    /// Universe of dimension `dim`.
    pub fn universe(topology: Topology, dim: usize) -> Result<Self> {
        Self::new(topology, dim, DegenerateElement::Universe)
    }

    /// Empty polyhedron of dimension `dim`.
    pub fn empty(topology: Topology, dim: usize) -> Result<Self> {
        Self::new(topology, dim, DegenerateElement::Empty)
    }

    /// Polyhedron of the points satisfying every row of `cs`.
    pub fn from_constraints(topology: Topology, cs: &ConstraintSystem) -> Result<Self> {
        Self::build_from_constraints(topology, cs.clone(), "Polyhedron(cs)")
    }

    /// As [`Polyhedron::from_constraints`], taking ownership of `cs`.
    pub fn from_recycled_constraints(topology: Topology, cs: ConstraintSystem) -> Result<Self> {
        Self::build_from_constraints(topology, cs, "Polyhedron(cs, recycle)")
    }

    /// Polyhedron generated by `gs`. A system without rows gives the empty
    /// polyhedron of its dimension; otherwise `gs` must contain a point.
    pub fn from_generators(topology: Topology, gs: &GeneratorSystem) -> Result<Self> {
        Self::build_from_generators(topology, gs.clone(), "Polyhedron(gs)")
    }

    /// As [`Polyhedron::from_generators`], taking ownership of `gs`.
    pub fn from_recycled_generators(topology: Topology, gs: GeneratorSystem) -> Result<Self> {
        Self::build_from_generators(topology, gs, "Polyhedron(gs, recycle)")
    }

    fn bare(topology: Topology, dim: usize) -> Self {
        Self {
            con_sys: ConstraintSystem::with_topology(topology, 0),
            gen_sys: GeneratorSystem::with_topology(topology, 0),
            sat_c: BitMatrix::default(),
            sat_g: BitMatrix::default(),
            status: Status::new(),
            space_dim: dim,
            topology,
        }
    }

    fn build_from_constraints(
        topology: Topology,
        mut cs: ConstraintSystem,
        method: &'static str,
    ) -> Result<Self> {
        let dim = cs.space_dimension();
        check_space_dimension(topology, method, dim)?;
        if !cs.adjust_topology_and_space_dimension(topology, dim) {
            return Err(PolyhedronError::topology_incompatible(
                topology,
                method,
                "cs contains strict inequalities",
            ));
        }
        let mut ph = Self::bare(topology, dim);
        if dim > 0 {
            if cs.num_pending_rows() > 0 {
                cs.unset_pending_rows();
                cs.set_sorted(false);
            }
            ph.con_sys = cs;
            add_low_level_constraints(&mut ph.con_sys);
            ph.status.set_c_up_to_date();
        } else if cs.iter().any(|c| c.is_inconsistent()) {
            ph.status.set_empty();
        }
        debug_assert!(ph.check_invariants());
        Ok(ph)
    }

    fn build_from_generators(
        topology: Topology,
        mut gs: GeneratorSystem,
        method: &'static str,
    ) -> Result<Self> {
        let dim = gs.space_dimension();
        check_space_dimension(topology, method, dim)?;
        if gs.has_no_rows() {
            let mut ph = Self::bare(topology, dim);
            ph.status.set_empty();
            return Ok(ph);
        }
        if !gs.has_points() {
            return Err(PolyhedronError::invalid_generators(topology, method, "gs"));
        }
        if !gs.adjust_topology_and_space_dimension(topology, dim) {
            return Err(PolyhedronError::topology_incompatible(
                topology,
                method,
                "gs contains closure points",
            ));
        }
        let mut ph = Self::bare(topology, dim);
        if dim > 0 {
            if !topology.is_necessarily_closed() {
                gs.add_corresponding_closure_points();
            }
            if gs.num_pending_rows() > 0 {
                gs.unset_pending_rows();
                gs.set_sorted(false);
            }
            ph.gen_sys = gs;
            ph.status.set_g_up_to_date();
        }
        debug_assert!(ph.check_invariants());
        Ok(ph)
    }

    #[inline]
    pub fn space_dimension(&self) -> usize {
        self.space_dim
    }

    #[inline]
    pub fn topology(&self) -> Topology {
        self.topology
    }

    #[inline]
    pub fn is_necessarily_closed(&self) -> bool {
        self.topology.is_necessarily_closed()
    }

    /// Current status flags.
    #[inline]
    pub fn status(&self) -> Status {
        self.status
    }

    /// The constraints, pending rows included. An empty polyhedron yields an
    /// unsatisfiable system.
    pub fn constraints(&mut self) -> &ConstraintSystem {
        if self.marked_empty() {
            if self.con_sys.has_no_rows() {
                let mut unsat = ConstraintSystem::zero_dim_empty();
                unsat.adjust_topology_and_space_dimension(self.topology, self.space_dim);
                self.con_sys = unsat;
            }
            return &self.con_sys;
        }
        if self.space_dim == 0 {
            return &self.con_sys;
        }
        if self.status.test_g_pending() {
            self.process_pending_generators();
        } else if !self.status.test_c_up_to_date() {
            self.update_constraints();
        }
        self.obtain_sorted_constraints();
        &self.con_sys
    }

    /// The generators, pending rows included. Empty for an empty polyhedron.
    pub fn generators(&mut self) -> &GeneratorSystem {
        if self.marked_empty() {
            if self.gen_sys.space_dimension() != self.space_dim {
                self.gen_sys = GeneratorSystem::with_topology(self.topology, self.space_dim);
            }
            return &self.gen_sys;
        }
        if self.space_dim == 0 {
            self.gen_sys = std::iter::once(Generator::zero_dim_point()).collect();
            return &self.gen_sys;
        }
        if (self.status.test_c_pending() && !self.process_pending_constraints())
            || (!self.status.test_g_up_to_date() && !self.update_generators())
        {
            return &self.gen_sys;
        }
        self.obtain_sorted_generators();
        &self.gen_sys
    }

    /// The constraints after (strong, for NNC) minimization.
    pub fn minimized_constraints(&mut self) -> &ConstraintSystem {
        self.strongly_minimize_constraints();
        self.constraints()
    }

    /// The generators after (strong, for NNC) minimization.
    pub fn minimized_generators(&mut self) -> &GeneratorSystem {
        self.strongly_minimize_generators();
        self.generators()
    }

    #[inline]
    pub(crate) fn marked_empty(&self) -> bool {
        self.status.test_empty()
    }

    #[inline]
    fn set_constraints_minimized(&mut self) {
        self.status.set_c_up_to_date();
        self.status.set_c_minimized();
    }

    #[inline]
    fn set_generators_minimized(&mut self) {
        self.status.set_g_up_to_date();
        self.status.set_g_minimized();
    }

    pub(crate) fn set_empty(&mut self) {
        self.status.set_empty();
        self.con_sys = ConstraintSystem::with_topology(self.topology, 0);
        self.gen_sys = GeneratorSystem::with_topology(self.topology, 0);
        self.sat_c.clear();
        self.sat_g.clear();
    }

    pub(crate) fn set_zero_dim_univ(&mut self) {
        self.status.set_zero_dim_univ();
        self.space_dim = 0;
        self.con_sys = ConstraintSystem::with_topology(self.topology, 0);
        self.gen_sys = GeneratorSystem::with_topology(self.topology, 0);
        self.sat_c.clear();
        self.sat_g.clear();
    }

    fn check_same_shape(&self, y: &Polyhedron, method: &'static str) -> Result<()> {
        if self.topology != y.topology {
            let detail = format!("y is a {}", y.topology.class_name());
            return Err(PolyhedronError::topology_incompatible(self.topology, method, detail));
        }
        if self.space_dim != y.space_dim {
            return Err(PolyhedronError::dimension_incompatible(
                self.topology,
                method,
                "y",
                self.space_dim,
                y.space_dim,
            ));
        }
        Ok(())
    }

    fn check_row_dimension(&self, method: &'static str, name: &'static str, dim: usize) -> Result<()> {
        if dim > self.space_dim {
            return Err(PolyhedronError::dimension_incompatible(
                self.topology,
                method,
                name,
                self.space_dim,
                dim,
            ));
        }
        Ok(())
    }

    /// Whether the representation satisfies every structural invariant.
    /// Saturation matrices are checked against the scalar products.
    pub fn check_invariants(&self) -> bool {
        if !self.status.check_consistency() {
            return false;
        }
        if self.marked_empty() {
            return self.gen_sys.has_no_rows();
        }
        if self.space_dim == 0 {
            return self.status.test_zero_dim_univ();
        }
        if self.status.test_zero_dim_univ() {
            return false;
        }
        let num_columns = self.space_dim + self.topology.extra_columns();
        if self.status.test_c_up_to_date()
            && (self.con_sys.topology() != self.topology
                || self.con_sys.num_columns() != num_columns
                || !self.con_sys.check()
                || self.con_sys.has_no_rows())
        {
            return false;
        }
        if self.status.test_g_up_to_date()
            && (self.gen_sys.topology() != self.topology
                || self.gen_sys.num_columns() != num_columns
                || !self.gen_sys.check()
                || !self.gen_sys.has_points())
        {
            return false;
        }
        if !self.status.test_c_up_to_date() && !self.status.test_g_up_to_date() {
            return false;
        }
        let nc = self.con_sys.first_pending_row();
        let ng = self.gen_sys.first_pending_row();
        if self.status.test_sat_c_up_to_date() {
            if self.sat_c.num_rows() != nc || self.sat_c.num_columns() != ng {
                return false;
            }
            for i in 0..nc {
                for j in 0..ng {
                    let sp = scalar_product_sign(&self.con_sys[i], &self.gen_sys[j]);
                    if sp.is_lt() || self.sat_c[i].get(j) != sp.is_gt() {
                        return false;
                    }
                }
            }
        }
        if self.status.test_sat_g_up_to_date() {
            if self.sat_g.num_rows() != ng || self.sat_g.num_columns() != nc {
                return false;
            }
            for j in 0..ng {
                for i in 0..nc {
                    let sp = scalar_product_sign(&self.con_sys[i], &self.gen_sys[j]);
                    if self.sat_g[j].get(i) != sp.is_gt() {
                        return false;
                    }
                }
            }
        }
        true
    }
}

/// Add the rows every non-trivial system of the given topology carries.
fn add_low_level_constraints(cs: &mut ConstraintSystem) {
    if cs.is_necessarily_closed() {
        cs.insert(Constraint::zero_dim_positivity());
    } else {
        cs.insert(Constraint::epsilon_leq_one());
        cs.insert(Constraint::epsilon_geq_zero());
    }
}

fn check_space_dimension(topology: Topology, method: &'static str, dim: usize) -> Result<()> {
    if dim > MAX_SPACE_DIMENSION {
        return Err(PolyhedronError::space_dimension_overflow(
            topology,
            method,
            "the space dimension exceeds the maximum allowed space dimension",
        ));
    }
    Ok(())
}

/// `r` with zero coefficients for the space dimensions it lacks up to `dim`.
fn padded<R: LinearRow>(r: &R, dim: usize) -> R {
    let mut r = r.clone();
    let missing = dim - r.space_dimension();
    if missing > 0 {
        r.row_mut().grow_space_dimension(missing);
    }
    r
}
