//! Full and incremental minimization of a representation pair.
//!
//! `minimize` derives `dest` from scratch out of `source`; `add_and_minimize`
//! folds the pending rows of an already minimized `source` into the matching
//! `dest`. Both leave `source` minimized as well (via [`simplify`]) and both
//! report emptiness, which can only be discovered when converting
//! constraints to generators.

use num_traits::Signed;
use tracing::debug;

use crate::conversion::conversion;
use crate::linear::LinearRow;
use crate::sat::BitMatrix;
use crate::simplify::simplify;
use crate::system::LinearSystem;

/// Index of the first point of `dest` past its lines, or `dest.num_rows()`.
///
/// Points are recognized by their divisor when closed and by their epsilon
/// coordinate when NNC (closure points alone cannot support a polyhedron).
fn first_point<D: LinearRow>(dest: &LinearSystem<D>, num_lines: usize) -> usize {
    let checking_index = if dest.is_necessarily_closed() {
        0
    } else {
        dest.num_columns() - 1
    };
    (num_lines..dest.num_rows())
        .find(|&i| dest[i][checking_index].is_positive())
        .unwrap_or(dest.num_rows())
}

/// Compute `dest` from `source` and minimize both. On return `sat` is
/// indexed `[source row][dest row]`.
///
/// Returns `true` iff `con_to_gen` and the constraints are unsatisfiable.
pub(crate) fn minimize<S: LinearRow, D: LinearRow>(
    con_to_gen: bool,
    source: &mut LinearSystem<S>,
    dest: &mut LinearSystem<D>,
    sat: &mut BitMatrix,
) -> bool {
    debug_assert_eq!(source.topology(), dest.topology());
    debug_assert!(source.num_rows() > 0);
    debug_assert_eq!(source.num_pending_rows(), 0);

    if !source.is_sorted() {
        source.sort_rows();
    }
    let num_columns = source.num_columns();
    dest.set_identity_lines(num_columns);
    let mut tmp_sat = BitMatrix::new(num_columns, source.num_rows());
    let num_lines = conversion(source, 0, dest, &mut tmp_sat, num_columns);

    let first = if con_to_gen {
        first_point(dest, num_lines)
    } else {
        num_lines
    };
    if first == dest.num_rows() {
        if con_to_gen {
            debug!(rows = source.num_rows(), "constraints are unsatisfiable");
            return true;
        }
        // Generators with a point always yield a positivity-like inequality.
        panic!("conversion of a generator system produced only equalities");
    }
    sat.transpose_assign(&tmp_sat);
    simplify(source, sat);
    debug!(
        con_to_gen,
        source_rows = source.num_rows(),
        dest_rows = dest.num_rows(),
        "minimized"
    );
    false
}

/// Fold the pending rows of `source` into `dest`. Both systems must be
/// minimized, the non-pending part of `source` sorted, and `sat` indexed
/// `[dest row][source row]` over the non-pending rows; it keeps that
/// orientation on return.
///
/// Returns `true` iff `con_to_gen` and the result is empty.
pub(crate) fn add_and_minimize<S: LinearRow, D: LinearRow>(
    con_to_gen: bool,
    source: &mut LinearSystem<S>,
    dest: &mut LinearSystem<D>,
    sat: &mut BitMatrix,
) -> bool {
    debug_assert!(source.num_pending_rows() > 0);
    debug_assert_eq!(source.num_columns(), dest.num_columns());
    debug_assert!(source.is_sorted());

    sat.resize(dest.num_rows(), source.num_rows());
    let start = source.first_pending_row();
    let num_lines = dest.num_lines_or_equalities();
    let num_lines = conversion(source, start, dest, sat, num_lines);

    let first = if con_to_gen {
        first_point(dest, num_lines)
    } else {
        num_lines
    };
    if first == dest.num_rows() {
        if con_to_gen {
            debug!(added = source.num_rows() - start, "pending constraints made it empty");
            return true;
        }
        panic!("adding generators produced a constraint system of equalities only");
    }
    sat.transpose();
    simplify(source, sat);
    sat.transpose();
    false
}

/// Add the rows of `source2` not already in `source1` as pending rows of
/// `source1`, then fold them in as [`add_and_minimize`] does. A `source2`
/// adding nothing new leaves everything untouched.
pub(crate) fn add_and_minimize_with<S: LinearRow, D: LinearRow>(
    con_to_gen: bool,
    source1: &mut LinearSystem<S>,
    dest: &mut LinearSystem<D>,
    sat: &mut BitMatrix,
    source2: &LinearSystem<S>,
) -> bool {
    debug_assert_eq!(source1.num_pending_rows(), 0);
    debug_assert!(source1.is_sorted());
    source1.add_pending_rows(source2);
    if source1.num_pending_rows() == 0 {
        return false;
    }
    source1.sort_pending_and_remove_duplicates();
    if source1.num_pending_rows() == 0 {
        return false;
    }
    add_and_minimize(con_to_gen, source1, dest, sat)
}
