//! Removal of redundant rows using saturation information.
//!
//! After a conversion, the saturation matrix tells for every source row
//! which destination rows it is saturated by. That is enough to minimize the
//! source without any arithmetic beyond Gaussian elimination:
//! - an inequality saturated by every generator is an equality;
//! - an inequality saturated by fewer than `num_columns - num_equalities - 1`
//!   rows cannot define a facet;
//! - an inequality whose saturators are a strict subset of another's is
//!   implied by it, and of two inequalities with identical saturators one is
//!   dropped.

use crate::linear::LinearRow;
use crate::sat::{swap_rows_with_sat, BitMatrix, BitRow};
use crate::system::LinearSystem;

fn swap3<R: LinearRow>(
    sys: &mut LinearSystem<R>,
    sat: &mut BitMatrix,
    num_saturators: &mut [usize],
    i: usize,
    j: usize,
) {
    swap_rows_with_sat(sys, sat, i, j);
    num_saturators.swap(i, j);
}

/// Minimize `sys` given `sat`, indexed `[sys row][other row]`. Returns the
/// number of lines/equalities, which end up first.
pub(crate) fn simplify<R: LinearRow>(sys: &mut LinearSystem<R>, sat: &mut BitMatrix) -> usize {
    let mut num_rows = sys.num_rows();
    let num_columns = sys.num_columns();
    let num_cols_sat = sat.num_columns();
    debug_assert_eq!(num_rows, sat.num_rows());

    let mut num_lines_or_equalities = sys
        .iter()
        .take_while(|r| r.is_line_or_equality())
        .count();

    let mut num_saturators = vec![0usize; num_rows];
    for i in num_lines_or_equalities..num_rows {
        if sat[i].is_empty() {
            let row = sys.row_mut(i);
            row.set_is_line_or_equality();
            row.sign_normalize();
            if i != num_lines_or_equalities {
                swap3(sys, sat, &mut num_saturators, i, num_lines_or_equalities);
            }
            num_lines_or_equalities += 1;
            sys.set_sorted(false);
        } else {
            num_saturators[i] = num_cols_sat - sat[i].count_ones();
        }
    }

    let rank = sys.gauss(num_lines_or_equalities);
    if rank < num_lines_or_equalities {
        // Move the dependent equalities (now zero rows) past the end.
        let mut redundant = rank;
        let mut erasing = num_rows;
        while redundant < num_lines_or_equalities && erasing > num_lines_or_equalities {
            erasing -= 1;
            swap3(sys, sat, &mut num_saturators, redundant, erasing);
            sys.set_sorted(false);
            redundant += 1;
        }
        num_rows -= num_lines_or_equalities - rank;
        num_lines_or_equalities = rank;
    }

    let min_saturators = num_columns - num_lines_or_equalities - 1;
    let mut i = num_lines_or_equalities;
    while i < num_rows {
        if num_saturators[i] < min_saturators {
            num_rows -= 1;
            swap3(sys, sat, &mut num_saturators, i, num_rows);
            sys.set_sorted(false);
        } else {
            i += 1;
        }
    }

    let mut i = num_lines_or_equalities;
    while i < num_rows {
        let mut redundant = false;
        let mut j = num_lines_or_equalities;
        while j < num_rows {
            if i == j {
                j += 1;
            } else if BitRow::subset_eq(&sat[j], &sat[i]) {
                if sat[j] != sat[i] {
                    redundant = true;
                    break;
                }
                num_rows -= 1;
                swap3(sys, sat, &mut num_saturators, j, num_rows);
                sys.set_sorted(false);
            } else {
                j += 1;
            }
        }
        if redundant {
            num_rows -= 1;
            swap3(sys, sat, &mut num_saturators, i, num_rows);
            sys.set_sorted(false);
        } else {
            i += 1;
        }
    }

    sys.truncate(num_rows);
    sys.unset_pending_rows();
    sat.truncate_rows(num_rows);
    debug_assert!(sys.rows()[num_lines_or_equalities..]
        .iter()
        .all(|r| r.is_ray_or_point_or_inequality()));

    sys.back_substitute(num_lines_or_equalities);
    num_lines_or_equalities
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linear::{Constraint, Topology, Variable};
    use crate::system::ConstraintSystem;

    #[test]
    fn drops_implied_inequality_and_promotes_equality() {
        // 0 <= x, x <= 0, x <= 5 against the generators of `x = 0`.
        let x = Variable(0);
        let mut cs = ConstraintSystem::with_topology(Topology::Closed, 2);
        cs.insert(Constraint::greater_or_equal(x, 0));
        cs.insert(Constraint::less_or_equal(x, 0));
        cs.insert(Constraint::less_or_equal(x, 5));
        cs.insert(Constraint::zero_dim_positivity());
        // Column 0 is the y-line, column 1 the origin.
        let mut sat = BitMatrix::new(4, 2);
        sat[2].set(1);
        sat[3].set(1);
        let n_eq = simplify(&mut cs, &mut sat);
        assert_eq!(n_eq, 1);
        assert_eq!(cs.num_rows(), 2);
        assert_eq!(sat.num_rows(), 2);
        assert!(cs[0].is_equality());
        assert_eq!(cs[0].coefficient(x), 1.into());
        // Of the two inequalities with the same saturators one survives.
        assert!(cs[1].is_tautological());
    }
}
