//! Systems of rows: the constraint system and the generator system.
//!
//! Purpose
//! - Hold the rows of one representation together with the bookkeeping the
//!   lazy engine needs: topology, column count, first pending row and a
//!   sortedness flag.
//! - Provide the row algorithms shared by both representations: sorting
//!   (optionally in lock-step with a saturation matrix), Gaussian
//!   elimination of lines/equalities and back substitution.
//!
//! Assumptions and conventions
//! - All rows have exactly `num_columns` coefficients and the system's
//!   topology; `insert` adapts incoming rows (or the system) to keep it so.
//! - Rows at index `>= first_pending_row` are pending: appended but not yet
//!   folded into the minimized part.

use std::cmp::Ordering;
use std::ops::Index;

use num_traits::{Signed, Zero};

use crate::coefficient::Coefficient;
use crate::linear::{compare, Constraint, Generator, LinearRow, Row, RowKind, Topology};
use crate::sat::BitMatrix;

/// A sequence of rows of one kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinearSystem<R> {
    rows: Vec<R>,
    topology: Topology,
    num_columns: usize,
    first_pending: usize,
    sorted: bool,
}

pub type ConstraintSystem = LinearSystem<Constraint>;
pub type GeneratorSystem = LinearSystem<Generator>;

impl<R: LinearRow> Default for LinearSystem<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: LinearRow> LinearSystem<R> {
    /// Empty closed system of space dimension zero.
    pub fn new() -> Self {
        Self::with_topology(Topology::Closed, 0)
    }

    /// Empty system of the given topology and space dimension.
    pub fn with_topology(topology: Topology, space_dim: usize) -> Self {
        Self {
            rows: Vec::new(),
            topology,
            num_columns: space_dim + topology.extra_columns(),
            first_pending: 0,
            sorted: true,
        }
    }

    #[inline]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn has_no_rows(&self) -> bool {
        self.rows.is_empty()
    }

    #[inline]
    pub fn num_columns(&self) -> usize {
        self.num_columns
    }

    #[inline]
    pub fn topology(&self) -> Topology {
        self.topology
    }

    #[inline]
    pub fn is_necessarily_closed(&self) -> bool {
        self.topology.is_necessarily_closed()
    }

    #[inline]
    pub fn space_dimension(&self) -> usize {
        self.num_columns - self.topology.extra_columns()
    }

    #[inline]
    pub fn first_pending_row(&self) -> usize {
        self.first_pending
    }

    #[inline]
    pub fn num_pending_rows(&self) -> usize {
        self.rows.len() - self.first_pending
    }

    /// Make every row non-pending.
    #[inline]
    pub(crate) fn unset_pending_rows(&mut self) {
        self.first_pending = self.rows.len();
    }

    #[inline]
    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    #[inline]
    pub(crate) fn set_sorted(&mut self, sorted: bool) {
        self.sorted = sorted;
    }

    /// All rows, pending ones included.
    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.rows.iter()
    }

    pub(crate) fn rows(&self) -> &[R] {
        &self.rows
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [R] {
        &mut self.rows
    }

    #[inline]
    pub(crate) fn row_mut(&mut self, i: usize) -> &mut Row {
        self.rows[i].row_mut()
    }

    #[inline]
    pub(crate) fn swap_rows(&mut self, i: usize, j: usize) {
        self.rows.swap(i, j);
    }

    pub(crate) fn truncate(&mut self, n: usize) {
        self.rows.truncate(n);
        self.first_pending = self.first_pending.min(n);
    }

    pub(crate) fn clear(&mut self) {
        self.rows.clear();
        self.first_pending = 0;
        self.sorted = true;
    }

    /// Keep only the rows satisfying `keep`, preserving their order.
    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&R) -> bool) {
        let first_pending = self.first_pending;
        let mut new_first_pending = 0;
        let mut kept = Vec::with_capacity(self.rows.len());
        for (i, r) in std::mem::take(&mut self.rows).into_iter().enumerate() {
            if keep(&r) {
                if i < first_pending {
                    new_first_pending += 1;
                }
                kept.push(r);
            }
        }
        self.rows = kept;
        self.first_pending = new_first_pending;
    }

    /// Remove row `i` shifting the following rows up.
    pub(crate) fn remove_row(&mut self, i: usize) -> R {
        if i < self.first_pending {
            self.first_pending -= 1;
        }
        self.rows.remove(i)
    }

    /// Number of lines/equalities (pending rows excluded).
    pub fn num_lines_or_equalities(&self) -> usize {
        self.rows[..self.first_pending]
            .iter()
            .filter(|r| r.is_line_or_equality())
            .count()
    }

    /// Append a non-pending row of the right shape, keeping the sortedness
    /// flag exact.
    pub(crate) fn add_row(&mut self, r: R) {
        debug_assert_eq!(r.size(), self.num_columns);
        debug_assert_eq!(self.num_pending_rows(), 0);
        let was_sorted = self.sorted;
        self.rows.push(r);
        self.first_pending = self.rows.len();
        if was_sorted {
            let n = self.rows.len();
            self.sorted = n < 2 || compare(&self.rows[n - 2], &self.rows[n - 1]) != Ordering::Greater;
        }
    }

    /// Append a pending row of the right shape.
    pub(crate) fn add_pending_row(&mut self, r: R) {
        debug_assert_eq!(r.size(), self.num_columns);
        self.rows.push(r);
    }

    /// Bring `r` to the topology and column count of the system, growing
    /// the system when `r` is larger.
    fn adapt_row(&mut self, mut r: R) -> R {
        if r.topology() != self.topology {
            if self.is_necessarily_closed() {
                self.set_topology_nnc();
            } else {
                r.to_nnc();
            }
        }
        let size = r.size();
        if size > self.num_columns {
            self.grow_columns(size - self.num_columns);
        } else if size < self.num_columns {
            r.row_mut().grow_space_dimension(self.num_columns - size);
        }
        r
    }

    /// Insert a row, converting the system to NNC if `r` is NNC and padding
    /// dimensions as needed.
    pub fn insert(&mut self, r: R) {
        debug_assert_eq!(self.num_pending_rows(), 0);
        let r = self.adapt_row(r);
        self.add_row(r);
    }

    /// Insert a pending row.
    pub fn insert_pending(&mut self, r: R) {
        let r = self.adapt_row(r);
        self.add_pending_row(r);
    }

    /// Add `n` zero columns before the epsilon column (space dimensions).
    pub(crate) fn grow_columns(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        for r in self.rows.iter_mut() {
            r.row_mut().grow_space_dimension(n);
        }
        self.num_columns += n;
    }

    /// Append `n` zero columns at the very end.
    pub(crate) fn add_zero_columns(&mut self, n: usize) {
        for r in self.rows.iter_mut() {
            r.row_mut().add_zero_columns(n);
        }
        self.num_columns += n;
    }

    /// Drop the last `n` columns.
    pub(crate) fn remove_trailing_columns(&mut self, n: usize) {
        for r in self.rows.iter_mut() {
            r.row_mut().remove_trailing_columns(n);
        }
        self.num_columns -= n;
    }

    pub(crate) fn swap_columns(&mut self, i: usize, j: usize) {
        for r in self.rows.iter_mut() {
            r.row_mut().swap_columns(i, j);
        }
        self.sorted = false;
    }

    /// Turn a closed system into an NNC one (every row gains epsilon).
    fn set_topology_nnc(&mut self) {
        for r in self.rows.iter_mut() {
            r.to_nnc();
        }
        self.num_columns += 1;
        self.topology = Topology::NotNecessarilyClosed;
        self.sorted = self.check_sorted();
    }

    /// Mark the system and its rows with `topology` without touching
    /// columns.
    pub(crate) fn set_topology_flag(&mut self, topology: Topology) {
        self.topology = topology;
        for r in self.rows.iter_mut() {
            r.row_mut().set_topology(topology);
        }
    }

    /// Normalize every row (pending ones included).
    pub(crate) fn normalize(&mut self) {
        for r in self.rows.iter_mut() {
            r.row_mut().normalize();
        }
        self.sorted = self.rows.len() <= 1;
    }

    /// Strongly normalize every row.
    pub(crate) fn strong_normalize(&mut self) {
        for r in self.rows.iter_mut() {
            r.row_mut().strong_normalize();
        }
        self.sorted = self.rows.len() <= 1;
    }

    /// Sort rows `[first, last)` and drop duplicates among them.
    fn sort_range(&mut self, first: usize, last: usize) {
        let tail = self.rows.split_off(last);
        let mut mid = self.rows.split_off(first);
        mid.sort_by(|a, b| compare(a, b));
        mid.dedup_by(|a, b| compare(a, b) == Ordering::Equal);
        self.rows.extend(mid);
        self.rows.extend(tail);
    }

    /// Sort the non-pending rows removing duplicates.
    pub(crate) fn sort_rows(&mut self) {
        let num_pending = self.num_pending_rows();
        self.sort_range(0, self.first_pending);
        self.first_pending = self.rows.len() - num_pending;
        self.sorted = true;
    }

    /// Sort the non-pending rows together with the rows of `sat` (one per
    /// non-pending row), removing duplicates from both.
    pub(crate) fn sort_and_remove_with_sat(&mut self, sat: &mut BitMatrix) {
        debug_assert_eq!(self.first_pending, sat.num_rows());
        if self.first_pending <= 1 {
            self.sorted = true;
            return;
        }
        let pending = self.rows.split_off(self.first_pending);
        let rows = std::mem::take(&mut self.rows);
        let mut pairs: Vec<_> = rows.into_iter().zip(sat.take_rows()).collect();
        pairs.sort_by(|a, b| compare(&a.0, &b.0));
        pairs.dedup_by(|a, b| compare(&a.0, &b.0) == Ordering::Equal);
        let (rows, sat_rows): (Vec<R>, Vec<_>) = pairs.into_iter().unzip();
        self.rows = rows;
        self.first_pending = self.rows.len();
        self.rows.extend(pending);
        sat.set_rows(sat_rows);
        self.sorted = true;
    }

    /// Sort the pending rows and drop those that are duplicates of each other
    /// or of a non-pending row. The non-pending part must be sorted.
    pub(crate) fn sort_pending_and_remove_duplicates(&mut self) {
        debug_assert!(self.num_pending_rows() > 0);
        debug_assert!(self.sorted);
        let first_pending = self.first_pending;
        self.sort_range(first_pending, self.rows.len());
        let pending = self.rows.split_off(first_pending);
        let mut k1 = 0;
        for r in pending {
            while k1 < first_pending && compare(&self.rows[k1], &r) == Ordering::Less {
                k1 += 1;
            }
            if k1 < first_pending && compare(&self.rows[k1], &r) == Ordering::Equal {
                continue;
            }
            self.rows.push(r);
        }
    }

    /// Append the rows of `y` as pending rows.
    pub(crate) fn add_pending_rows(&mut self, y: &LinearSystem<R>) {
        debug_assert_eq!(self.num_columns, y.num_columns);
        self.rows.extend(y.rows.iter().cloned());
    }

    /// Move the rows of `y` in as pending rows.
    pub(crate) fn append_pending_rows(&mut self, y: LinearSystem<R>) {
        debug_assert_eq!(self.num_columns, y.num_columns);
        self.rows.extend(y.rows);
    }

    /// Whether the non-pending rows are in increasing order.
    pub(crate) fn check_sorted(&self) -> bool {
        self.rows[..self.first_pending]
            .windows(2)
            .all(|w| compare(&w[0], &w[1]) != Ordering::Greater)
    }

    /// Gaussian elimination on the first `n_lines_or_equalities` rows, which
    /// must be exactly the lines/equalities. Returns the rank.
    pub(crate) fn gauss(&mut self, n_lines_or_equalities: usize) -> usize {
        debug_assert_eq!(self.num_pending_rows(), 0);
        debug_assert!(self.rows[..n_lines_or_equalities]
            .iter()
            .all(|r| r.is_line_or_equality()));
        let mut rank = 0;
        let mut changed = false;
        for j in (0..self.num_columns).rev() {
            let Some(i) = (rank..n_lines_or_equalities).find(|&i| !self.rows[i][j].is_zero())
            else {
                continue;
            };
            if i > rank {
                self.rows.swap(i, rank);
                changed = true;
            }
            let pivot: Row = (*self.rows[rank]).clone();
            for k in (rank + 1)..n_lines_or_equalities {
                if !self.rows[k][j].is_zero() {
                    self.rows[k].row_mut().linear_combine(&pivot, j);
                    changed = true;
                }
            }
            rank += 1;
        }
        if changed {
            self.sorted = false;
        }
        rank
    }

    /// Use each of the first `n_lines_or_equalities` rows to zero its last
    /// non-zero column in every other row.
    pub(crate) fn back_substitute(&mut self, n_lines_or_equalities: usize) {
        debug_assert_eq!(self.num_pending_rows(), 0);
        let nrows = self.rows.len();
        let ncols = self.num_columns;
        let mut still_sorted = self.sorted;
        let mut recheck = vec![false; nrows];
        for k in (0..n_lines_or_equalities).rev() {
            let mut j = ncols - 1;
            while j != 0 && self.rows[k][j].is_zero() {
                j -= 1;
            }
            let pivot: Row = (*self.rows[k]).clone();
            for i in (0..k).rev() {
                if !self.rows[i][j].is_zero() {
                    self.rows[i].row_mut().linear_combine(&pivot, j);
                    if still_sorted {
                        if i > 0 {
                            recheck[i - 1] = true;
                        }
                        recheck[i] = true;
                    }
                }
            }
            // Rows past the equalities cannot be scaled by a negative factor.
            let mut pivot = pivot;
            if pivot[j].is_negative() {
                for c in pivot.coeffs_mut().iter_mut() {
                    *c = -std::mem::take(c);
                }
            }
            for i in n_lines_or_equalities..nrows {
                if !self.rows[i][j].is_zero() {
                    self.rows[i].row_mut().linear_combine(&pivot, j);
                    if still_sorted {
                        if i > n_lines_or_equalities {
                            recheck[i - 1] = true;
                        }
                        recheck[i] = true;
                    }
                }
            }
        }
        let mut i = 0;
        while still_sorted && i + 1 < nrows {
            if recheck[i] {
                still_sorted = compare(&self.rows[i], &self.rows[i + 1]) != Ordering::Greater;
            }
            i += 1;
        }
        self.sorted = still_sorted;
    }

    /// Remove redundant lines/equalities and back-substitute.
    pub(crate) fn simplify(&mut self) {
        debug_assert_eq!(self.num_pending_rows(), 0);
        let mut nrows = self.rows.len();
        let mut n_eq = 0;
        for i in 0..nrows {
            if self.rows[i].is_line_or_equality() {
                if n_eq < i {
                    self.rows.swap(i, n_eq);
                    self.sorted = false;
                }
                n_eq += 1;
            }
        }
        let rank = self.gauss(n_eq);
        if rank < n_eq {
            let n_ineq = nrows - n_eq;
            let num_swaps = (n_eq - rank).min(n_ineq);
            for i in (0..num_swaps).rev() {
                nrows -= 1;
                self.rows.swap(nrows, rank + i);
            }
            self.rows.truncate(nrows);
            self.unset_pending_rows();
            if n_ineq > num_swaps {
                self.sorted = false;
            }
            n_eq = rank;
        }
        self.back_substitute(n_eq);
    }

    /// Prepend `n` lines/equalities forming the reversed identity on `n` new
    /// trailing columns (before epsilon for NNC systems). Used to embed or
    /// project into a larger space.
    pub(crate) fn add_rows_and_columns(&mut self, n: usize) {
        debug_assert!(n > 0);
        let was_sorted = self.sorted;
        let old_cols = self.num_columns;
        self.grow_columns(n);
        let first_new = if self.is_necessarily_closed() {
            old_cols
        } else {
            old_cols - 1
        };
        let mut new_rows = Vec::with_capacity(n);
        for i in 0..n {
            let mut row = Row::zero(self.num_columns, RowKind::LineOrEquality, self.topology);
            row[first_new + n - 1 - i] = 1.into();
            new_rows.push(R::from_row(row));
        }
        let old = std::mem::replace(&mut self.rows, new_rows);
        self.rows.extend(old);
        self.first_pending += n;
        self.sorted = was_sorted && (self.rows.len() == n || compare(&self.rows[n - 1], &self.rows[n]) != Ordering::Greater);
    }

    /// Replace the rows with the `num_columns` lines of the canonical basis,
    /// the starting point of a full conversion.
    pub(crate) fn set_identity_lines(&mut self, num_columns: usize) {
        self.rows.clear();
        for i in 0..num_columns {
            let mut row = Row::zero(num_columns, RowKind::LineOrEquality, self.topology);
            row[i] = 1.into();
            self.rows.push(R::from_row(row));
        }
        self.num_columns = num_columns;
        self.first_pending = num_columns;
        self.sorted = false;
    }

    /// Consistency of shapes, topologies and the sortedness flag.
    pub fn check(&self) -> bool {
        self.first_pending <= self.rows.len()
            && self.rows.iter().all(|r| {
                r.size() == self.num_columns && r.topology() == self.topology
            })
            && (!self.sorted || self.check_sorted())
    }
}

impl<R> Index<usize> for LinearSystem<R> {
    type Output = R;

    #[inline]
    fn index(&self, i: usize) -> &R {
        &self.rows[i]
    }
}

impl<R: LinearRow> FromIterator<R> for LinearSystem<R> {
    /// Collect rows with `insert`, so topology and dimension follow the
    /// largest row.
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        let mut sys = Self::new();
        for r in iter {
            sys.insert(r);
        }
        sys
    }
}

impl<'a, R> IntoIterator for &'a LinearSystem<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl LinearSystem<Constraint> {
    /// Constraint system `{ 0 ≥ 1 }` (or its NNC counterpart) of dimension
    /// zero.
    pub fn zero_dim_empty() -> Self {
        let mut cs = ConstraintSystem::new();
        cs.insert(Constraint::zero_dim_false());
        cs
    }

    /// Whether some row is a strict inequality (the `ε ≤ 1` row excluded).
    pub fn has_strict_inequalities(&self) -> bool {
        if self.is_necessarily_closed() {
            return false;
        }
        let eps = self.num_columns - 1;
        self.rows
            .iter()
            .any(|c| c[eps].is_negative() && !c.is_tautological())
    }

    /// Constraints a user would write: tautologies such as the positivity
    /// or epsilon rows are skipped.
    pub fn visible(&self) -> impl Iterator<Item = &Constraint> + '_ {
        self.rows.iter().filter(|c| !c.is_tautological())
    }

    pub fn num_equalities(&self) -> usize {
        self.num_lines_or_equalities()
    }

    pub fn num_inequalities(&self) -> usize {
        self.first_pending - self.num_lines_or_equalities()
    }

    /// Set topology and space dimension, returning `false` when a strict
    /// inequality prevents going closed.
    pub fn adjust_topology_and_space_dimension(
        &mut self,
        topology: Topology,
        space_dim: usize,
    ) -> bool {
        debug_assert!(self.space_dimension() <= space_dim);
        if self.topology != topology {
            match topology {
                Topology::Closed => {
                    if self.has_strict_inequalities() {
                        return false;
                    }
                    // Only the epsilon rows can still mention epsilon.
                    let eps = self.num_columns - 1;
                    self.retain(|c| c[eps].is_zero());
                    self.remove_trailing_columns(1);
                    self.set_topology_flag(Topology::Closed);
                    self.sorted = self.check_sorted();
                }
                Topology::NotNecessarilyClosed => self.set_topology_nnc(),
            }
        }
        let dim = self.space_dimension();
        self.grow_columns(space_dim - dim);
        true
    }
}

impl LinearSystem<Generator> {
    /// Whether some closure point has no matching point (the only case in
    /// which closure points are visible to users).
    pub fn has_closure_points(&self) -> bool {
        !self.is_necessarily_closed() && self.visible().any(|g| g.is_closure_point())
    }

    /// Whether some row is a point.
    pub fn has_points(&self) -> bool {
        if self.is_necessarily_closed() {
            self.rows.iter().any(|g| !g.is_line_or_ray())
        } else {
            let eps = self.num_columns - 1;
            self.rows.iter().any(|g| !g[eps].is_zero())
        }
    }

    /// Generators a user would write: a closure point immediately followed
    /// by its matching point is skipped.
    pub fn visible(&self) -> impl Iterator<Item = &Generator> + '_ {
        self.rows.iter().enumerate().filter_map(move |(i, g)| {
            let hidden = g.is_closure_point()
                && self
                    .rows
                    .get(i + 1)
                    .is_some_and(|p| p.is_point() && g.is_matching_closure_point(p));
            (!hidden).then_some(g)
        })
    }

    /// Add the closure point of every NNC point, as pending rows.
    pub(crate) fn add_corresponding_closure_points(&mut self) {
        debug_assert!(!self.is_necessarily_closed());
        let eps = self.num_columns - 1;
        let mut extra = Vec::new();
        for g in self.rows.iter() {
            if g[eps].is_positive() {
                let mut cp = g.clone();
                cp.row_mut()[eps] = Coefficient::zero();
                cp.row_mut().normalize();
                extra.push(cp);
            }
        }
        self.rows.extend(extra);
    }

    /// Set topology and space dimension, returning `false` when a closure
    /// point prevents going closed.
    pub fn adjust_topology_and_space_dimension(
        &mut self,
        topology: Topology,
        space_dim: usize,
    ) -> bool {
        debug_assert!(self.space_dimension() <= space_dim);
        if self.topology != topology {
            match topology {
                Topology::Closed => {
                    if self.has_closure_points() {
                        return false;
                    }
                    self.retain(|g| !g.is_closure_point());
                    self.remove_trailing_columns(1);
                    self.set_topology_flag(Topology::Closed);
                    self.normalize();
                }
                Topology::NotNecessarilyClosed => self.set_topology_nnc(),
            }
        }
        let dim = self.space_dimension();
        self.grow_columns(space_dim - dim);
        true
    }
}
