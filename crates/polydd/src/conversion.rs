//! The double-description conversion step.
//!
//! Purpose
//! - Given a (pointed-cone) description `dest` of the polyhedron defined by
//!   the source rows `0..start`, fold in the source rows `start..` one at a
//!   time, so that on return `dest` generates the polyhedron defined by the
//!   whole of `source`. The same code converts constraints to generators and
//!   generators to constraints: only the row types change.
//!
//! Why this design (short)
//! - Adjacency of two rays is decided combinatorially from saturation rows
//!   (no rank computation): a candidate combination is kept iff it saturates
//!   enough source rows and no third ray saturates everything both of them
//!   saturate.
//! - Source rows found redundant are moved to the end and dropped, so the
//!   caller also gets a smaller `source`.
//!
//! Assumptions and conventions
//! - `sat` is indexed `[dest row][source row]`; a set bit means "does not
//!   saturate".
//! - The first `num_lines_or_equalities` rows of `dest` are its
//!   lines/equalities.
//!
//! References
//! - N. V. Chernikova, "Algorithm for finding a general formula for the
//!   non-negative solutions of a system of linear inequalities" (1965).
//! - H. Le Verge, "A note on Chernikova's algorithm" (1992).

use num_traits::{Signed, Zero};
use tracing::trace;

use crate::coefficient::{normalize2, Coefficient};
use crate::linear::{compare, scalar_product, LinearRow, Row, RowKind};
use crate::sat::{BitMatrix, BitRow};
use crate::system::LinearSystem;

/// `target := n_p·target − n_t·pivot` where `(n_t, n_p)` are the scalar
/// products of `target` and `pivot` divided by their gcd, so that the result
/// is orthogonal to the current source row.
fn eliminate(target: &mut Row, pivot: &Row, sp_target: &Coefficient, sp_pivot: &Coefficient) {
    let (n_t, n_p) = normalize2(sp_target, sp_pivot);
    for (t, p) in target.coeffs_mut().iter_mut().zip(pivot.coeffs()) {
        *t *= &n_p;
        *t -= &n_t * p;
    }
    target.strong_normalize();
}

/// Fold the source rows `start..` into `dest`. Returns the number of
/// lines/equalities of the new `dest`.
pub(crate) fn conversion<S: LinearRow, D: LinearRow>(
    source: &mut LinearSystem<S>,
    start: usize,
    dest: &mut LinearSystem<D>,
    sat: &mut BitMatrix,
    mut num_lines_or_equalities: usize,
) -> usize {
    let mut source_num_rows = source.num_rows();
    let mut dest_num_rows = dest.num_rows();
    let num_columns = source.num_columns();
    debug_assert_eq!(num_columns, dest.num_columns());
    debug_assert_eq!(source_num_rows, sat.num_columns());
    debug_assert_eq!(dest_num_rows, sat.num_rows());
    debug_assert!(start == 0 || start == source.first_pending_row());

    let mut source_num_redundant = 0;
    let mut scalar_prod: Vec<Coefficient> = Vec::with_capacity(dest_num_rows);

    let mut k = start;
    while k < source_num_rows {
        if source_num_redundant > 0 {
            source.swap_rows(k, k + source_num_redundant);
        }
        let source_k: Row = (*source[k]).clone();

        scalar_prod.clear();
        scalar_prod.extend(
            dest.rows()[..dest_num_rows]
                .iter()
                .map(|d| scalar_product(&source_k, d)),
        );
        let index_non_zero = scalar_prod
            .iter()
            .position(|sp| !sp.is_zero())
            .unwrap_or(dest_num_rows);

        if index_non_zero < num_lines_or_equalities {
            // A line does not saturate `source_k`: it becomes a ray pointing
            // into the satisfying half-space and is used as pivot.
            {
                let row = dest.row_mut(index_non_zero);
                row.set_is_ray_or_point_or_inequality();
                if scalar_prod[index_non_zero].is_negative() {
                    for c in row.coeffs_mut().iter_mut() {
                        *c = -std::mem::take(c);
                    }
                    let sp = std::mem::take(&mut scalar_prod[index_non_zero]);
                    scalar_prod[index_non_zero] = -sp;
                }
            }
            dest.set_sorted(false);
            num_lines_or_equalities -= 1;
            let nle = num_lines_or_equalities;
            if index_non_zero != nle {
                dest.swap_rows(index_non_zero, nle);
                scalar_prod.swap(index_non_zero, nle);
            }
            let pivot: Row = (*dest[nle]).clone();
            let sp_pivot = scalar_prod[nle].clone();
            for i in (index_non_zero..nle).chain((nle + 1)..dest_num_rows) {
                if !scalar_prod[i].is_zero() {
                    eliminate(dest.row_mut(i), &pivot, &scalar_prod[i], &sp_pivot);
                    scalar_prod[i] = Coefficient::zero();
                }
            }
            if source_k.is_ray_or_point_or_inequality() {
                sat[nle].set(k);
            } else {
                // An equality: the pivot ray violates it and goes away.
                dest_num_rows -= 1;
                dest.swap_rows(nle, dest_num_rows);
                scalar_prod.swap(nle, dest_num_rows);
                sat.swap_rows(nle, dest_num_rows);
            }
            k += 1;
            continue;
        }

        // Every line saturates `source_k`: partition the rays into
        // Q= (saturating), Q+ (satisfying) and Q- (violating).
        let mut lines_or_equal_bound = num_lines_or_equalities;
        let mut inf_bound = dest_num_rows;
        while inf_bound > lines_or_equal_bound && scalar_prod[lines_or_equal_bound].is_zero() {
            lines_or_equal_bound += 1;
        }
        let mut sup_bound = lines_or_equal_bound;
        while inf_bound > sup_bound {
            let sp = &scalar_prod[sup_bound];
            if sp.is_zero() {
                dest.swap_rows(sup_bound, lines_or_equal_bound);
                scalar_prod.swap(sup_bound, lines_or_equal_bound);
                sat.swap_rows(sup_bound, lines_or_equal_bound);
                lines_or_equal_bound += 1;
                sup_bound += 1;
                dest.set_sorted(false);
            } else if sp.is_negative() {
                inf_bound -= 1;
                dest.swap_rows(sup_bound, inf_bound);
                scalar_prod.swap(sup_bound, inf_bound);
                sat.swap_rows(sup_bound, inf_bound);
                dest.set_sorted(false);
            } else {
                sup_bound += 1;
            }
        }

        if sup_bound == dest_num_rows {
            // Q- is empty.
            if source_k.is_ray_or_point_or_inequality() {
                // Redundant: park it past the rows still to examine.
                source_num_redundant += 1;
                source_num_rows -= 1;
            } else {
                dest_num_rows = lines_or_equal_bound;
                k += 1;
            }
            continue;
        }

        if sup_bound == num_lines_or_equalities {
            // Q+ is empty: only the saturating rays survive.
            dest_num_rows = sup_bound;
        } else {
            let bound = dest_num_rows;
            let min_saturators = (num_columns - num_lines_or_equalities).saturating_sub(2);
            for i in lines_or_equal_bound..sup_bound {
                for j in sup_bound..bound {
                    let new_satrow = BitRow::union_of(&sat[i], &sat[j]);
                    let num_common_satur = k - new_satrow.count_ones();
                    if num_common_satur < min_saturators {
                        continue;
                    }
                    let redundant = (num_lines_or_equalities..bound).any(|l| {
                        l != i && l != j && BitRow::subset_eq(&sat[l], &new_satrow)
                    });
                    if redundant {
                        continue;
                    }
                    let (n_i, n_j) = normalize2(&scalar_prod[i], &scalar_prod[j]);
                    let coeffs: Vec<Coefficient> = dest[j]
                        .coeffs()
                        .iter()
                        .zip(dest[i].coeffs())
                        .map(|(dj, di)| &n_i * dj - &n_j * di)
                        .collect();
                    let mut new_row =
                        Row::from_coeffs(coeffs, RowKind::RayOrPointOrInequality, dest.topology());
                    new_row.strong_normalize();
                    if dest_num_rows == dest.num_rows() {
                        dest.add_pending_row(D::from_row(new_row));
                        sat.add_row(new_satrow);
                    } else {
                        dest.rows_mut()[dest_num_rows] = D::from_row(new_row);
                        sat[dest_num_rows] = new_satrow;
                    }
                    if scalar_prod.len() <= dest_num_rows {
                        scalar_prod.push(Coefficient::zero());
                    } else {
                        scalar_prod[dest_num_rows] = Coefficient::zero();
                    }
                    dest_num_rows += 1;
                }
            }
            // Replace the violating rays with the new ones.
            let mut j = if source_k.is_ray_or_point_or_inequality() {
                for l in lines_or_equal_bound..sup_bound {
                    sat[l].set(k);
                }
                sup_bound
            } else {
                lines_or_equal_bound
            };
            let mut i = dest_num_rows;
            while j < bound && i > bound {
                i -= 1;
                dest.swap_rows(i, j);
                scalar_prod.swap(i, j);
                sat.swap_rows(i, j);
                j += 1;
                dest.set_sorted(false);
            }
            dest_num_rows = if j == bound { i } else { j };
        }
        k += 1;
    }

    if source_num_redundant > 0 {
        debug_assert_eq!(source_num_redundant, source.num_rows() - source_num_rows);
        source.truncate(source_num_rows);
        let n = sat.num_rows();
        sat.resize(n, source_num_rows);
    }
    if start > 0 && start < source_num_rows {
        let keeps_order = compare(&source[start - 1], &source[start]) != std::cmp::Ordering::Greater;
        source.set_sorted(source.is_sorted() && keeps_order);
    }
    source.unset_pending_rows();

    if dest_num_rows < dest.num_rows() {
        dest.truncate(dest_num_rows);
        sat.truncate_rows(dest_num_rows);
    }
    if dest.is_sorted() {
        let first = dest.first_pending_row().max(1);
        let still_sorted = (first..dest_num_rows)
            .all(|i| compare(&dest[i - 1], &dest[i]) != std::cmp::Ordering::Greater);
        dest.set_sorted(still_sorted);
    }
    dest.unset_pending_rows();

    trace!(
        source_rows = source.num_rows(),
        dest_rows = dest.num_rows(),
        num_lines_or_equalities,
        "conversion done"
    );
    num_lines_or_equalities
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linear::{Constraint, Generator, LinearExpression, Topology, Variable};
    use crate::system::{ConstraintSystem, GeneratorSystem};

    fn identity_lines(num_columns: usize) -> GeneratorSystem {
        let mut gs = GeneratorSystem::with_topology(Topology::Closed, num_columns - 1);
        gs.set_identity_lines(num_columns);
        gs
    }

    #[test]
    fn unit_square_has_four_vertices() {
        let x = Variable(0);
        let y = Variable(1);
        let mut cs = ConstraintSystem::new();
        cs.insert(Constraint::zero_dim_positivity());
        cs.insert(Constraint::greater_or_equal(x, 0));
        cs.insert(Constraint::less_or_equal(x, 1));
        cs.insert(Constraint::greater_or_equal(y, 0));
        cs.insert(Constraint::less_or_equal(y, 1));
        cs.sort_rows();
        let mut gs = identity_lines(3);
        let mut sat = BitMatrix::new(3, cs.num_rows());
        let lines = conversion(&mut cs, 0, &mut gs, &mut sat, 3);
        assert_eq!(lines, 0);
        // Rows folded in through a line pivot are never found redundant here.
        assert_eq!(cs.num_rows(), 5);
        assert_eq!(gs.num_rows(), 4);
        assert!(gs.iter().all(|g| g.is_point()));
        // Every vertex misses two sides and the positivity constraint.
        for i in 0..gs.num_rows() {
            assert_eq!(sat[i].count_ones(), 3);
        }
    }

    #[test]
    fn half_plane_keeps_a_line() {
        let x = Variable(0);
        let mut cs = ConstraintSystem::new();
        cs.insert(Constraint::zero_dim_positivity());
        cs.insert(Constraint::greater_or_equal(x, LinearExpression::from(0)));
        cs.grow_columns(1);
        cs.sort_rows();
        let mut gs = identity_lines(3);
        let mut sat = BitMatrix::new(3, cs.num_rows());
        let lines = conversion(&mut cs, 0, &mut gs, &mut sat, 3);
        assert_eq!(lines, 1);
        assert!(gs[0].is_line());
        assert_eq!(gs.iter().filter(|g| g.is_point()).count(), 1);
        assert_eq!(gs.iter().filter(|g| g.is_ray()).count(), 1);
    }
}
