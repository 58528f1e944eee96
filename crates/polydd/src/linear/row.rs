//! Dense rows shared by constraints and generators.
//!
//! Layout
//! - Column 0 is the inhomogeneous term (constraints) or the divisor
//!   (generators); columns `1..=n` are the coefficients of the space
//!   dimensions; NNC rows carry one more trailing column for epsilon.
//! - The kind flag distinguishes lines/equalities from the other rows. The
//!   finer classification (ray vs point, strict vs non-strict) is read off the
//!   coefficients by the typed views in `constraint` and `generator`.

use std::cmp::Ordering;
use std::ops::{Index, IndexMut};

use num_traits::{Signed, Zero};

use crate::coefficient::{exact_div_assign, gcd_of, normalize2, Coefficient};

/// Topology of a row, a system or a polyhedron.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topology {
    /// Only non-strict inequalities; no epsilon column.
    Closed,
    /// Strict inequalities allowed; rows carry an epsilon column.
    NotNecessarilyClosed,
}

impl Topology {
    /// Number of extra columns on top of the space dimension.
    #[inline]
    pub fn extra_columns(self) -> usize {
        match self {
            Topology::Closed => 1,
            Topology::NotNecessarilyClosed => 2,
        }
    }

    #[inline]
    pub fn is_necessarily_closed(self) -> bool {
        self == Topology::Closed
    }

    /// Class name used in error messages.
    pub fn class_name(self) -> &'static str {
        match self {
            Topology::Closed => "C_Polyhedron",
            Topology::NotNecessarilyClosed => "NNC_Polyhedron",
        }
    }
}

/// Line/equality vs every other row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RowKind {
    LineOrEquality,
    RayOrPointOrInequality,
}

/// A dense row of coefficients with its kind and topology.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Row {
    coeffs: Vec<Coefficient>,
    kind: RowKind,
    topology: Topology,
}

impl Row {
    /// Zero row with `size` columns.
    pub(crate) fn zero(size: usize, kind: RowKind, topology: Topology) -> Self {
        Self {
            coeffs: vec![Coefficient::zero(); size],
            kind,
            topology,
        }
    }

    pub(crate) fn from_coeffs(coeffs: Vec<Coefficient>, kind: RowKind, topology: Topology) -> Self {
        Self {
            coeffs,
            kind,
            topology,
        }
    }

    /// Number of columns.
    #[inline]
    pub fn size(&self) -> usize {
        self.coeffs.len()
    }

    #[inline]
    pub fn coeffs(&self) -> &[Coefficient] {
        &self.coeffs
    }

    #[inline]
    pub fn kind(&self) -> RowKind {
        self.kind
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
    pub fn is_line_or_equality(&self) -> bool {
        self.kind == RowKind::LineOrEquality
    }

    #[inline]
    pub fn is_ray_or_point_or_inequality(&self) -> bool {
        self.kind == RowKind::RayOrPointOrInequality
    }

    /// Space dimension implied by the number of columns and the topology.
    #[inline]
    pub fn space_dimension(&self) -> usize {
        self.size().saturating_sub(self.topology.extra_columns())
    }

    /// Index of the epsilon column (NNC rows only).
    #[inline]
    pub(crate) fn eps_index(&self) -> usize {
        debug_assert!(!self.is_necessarily_closed());
        self.size() - 1
    }

    #[inline]
    pub(crate) fn set_is_line_or_equality(&mut self) {
        self.kind = RowKind::LineOrEquality;
    }

    #[inline]
    pub(crate) fn set_is_ray_or_point_or_inequality(&mut self) {
        self.kind = RowKind::RayOrPointOrInequality;
    }

    #[inline]
    pub(crate) fn set_topology(&mut self, topology: Topology) {
        self.topology = topology;
    }

    pub(crate) fn coeffs_mut(&mut self) -> &mut Vec<Coefficient> {
        &mut self.coeffs
    }

    /// Append `n` zero columns.
    pub(crate) fn add_zero_columns(&mut self, n: usize) {
        self.coeffs
            .extend(std::iter::repeat_with(Coefficient::zero).take(n));
    }

    /// Add `n` space dimensions: zero columns before epsilon, if any.
    pub(crate) fn grow_space_dimension(&mut self, n: usize) {
        let old = self.size();
        self.add_zero_columns(n);
        if n > 0 && !self.is_necessarily_closed() {
            self.coeffs.swap(old - 1, old - 1 + n);
        }
    }

    /// Drop the last `n` columns.
    pub(crate) fn remove_trailing_columns(&mut self, n: usize) {
        let len = self.coeffs.len() - n;
        self.coeffs.truncate(len);
    }

    #[inline]
    pub(crate) fn swap_columns(&mut self, i: usize, j: usize) {
        self.coeffs.swap(i, j);
    }

    /// Whether every coefficient but the first is zero.
    pub fn all_homogeneous_terms_are_zero(&self) -> bool {
        self.coeffs[1..].iter().all(Zero::is_zero)
    }

    /// Divide the whole row by the gcd of its coefficients.
    pub(crate) fn normalize(&mut self) {
        let g = gcd_of(&self.coeffs);
        if g.is_zero() || g == Coefficient::from(1) {
            return;
        }
        for c in self.coeffs.iter_mut() {
            exact_div_assign(c, &g);
        }
    }

    /// Make the first non-zero coefficient (from column 1 on) of a line or an
    /// equality positive, negating the whole row if needed.
    pub(crate) fn sign_normalize(&mut self) {
        if !self.is_line_or_equality() {
            return;
        }
        let first = self.coeffs[1..].iter().position(|c| !c.is_zero());
        if let Some(pos) = first {
            if self.coeffs[pos + 1].is_negative() {
                for c in self.coeffs.iter_mut() {
                    *c = -std::mem::take(c);
                }
            }
        }
    }

    pub(crate) fn strong_normalize(&mut self) {
        self.normalize();
        self.sign_normalize();
    }

    pub(crate) fn is_strong_normalized(&self) -> bool {
        let mut tmp = self.clone();
        tmp.strong_normalize();
        tmp.coeffs == self.coeffs
    }

    /// Replace `self` with the combination of `self` and `y` that zeroes
    /// column `k`, then strongly normalize.
    ///
    /// Both `self[k]` and `y[k]` must be non-zero.
    pub(crate) fn linear_combine(&mut self, y: &Row, k: usize) {
        debug_assert_eq!(self.size(), y.size());
        debug_assert!(!self.coeffs[k].is_zero() && !y.coeffs[k].is_zero());
        let (nx_k, ny_k) = normalize2(&self.coeffs[k], &y.coeffs[k]);
        for (i, (x_i, y_i)) in self.coeffs.iter_mut().zip(&y.coeffs).enumerate() {
            if i != k {
                *x_i *= &ny_k;
                *x_i -= y_i * &nx_k;
            }
        }
        self.coeffs[k] = Coefficient::zero();
        self.strong_normalize();
    }
}

impl Index<usize> for Row {
    type Output = Coefficient;

    #[inline]
    fn index(&self, i: usize) -> &Coefficient {
        &self.coeffs[i]
    }
}

impl IndexMut<usize> for Row {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut Coefficient {
        &mut self.coeffs[i]
    }
}

/// Total order used to sort systems.
///
/// Lines/equalities come first; then rows compare lexicographically from
/// column 1 on (shorter rows are padded with zeros); column 0 breaks ties.
pub fn compare(x: &Row, y: &Row) -> Ordering {
    match (x.is_line_or_equality(), y.is_line_or_equality()) {
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        _ => {}
    }
    let zero = Coefficient::zero();
    let len = x.size().max(y.size());
    for i in 1..len {
        let xi = x.coeffs.get(i).unwrap_or(&zero);
        let yi = y.coeffs.get(i).unwrap_or(&zero);
        match xi.cmp(yi) {
            Ordering::Equal => {}
            ord => return ord,
        }
    }
    x.coeffs[0].cmp(&y.coeffs[0])
}

/// `x · y` over the columns of `x`; `x` must not be longer than `y`.
pub fn scalar_product(x: &Row, y: &Row) -> Coefficient {
    debug_assert!(x.size() <= y.size());
    x.coeffs.iter().zip(&y.coeffs).map(|(a, b)| a * b).sum()
}

/// Sign of the scalar product.
#[inline]
pub fn scalar_product_sign(x: &Row, y: &Row) -> Ordering {
    scalar_product(x, y).cmp(&Coefficient::zero())
}

/// Scalar product ignoring the epsilon column of the NNC row `x`.
pub fn reduced_scalar_product(x: &Row, y: &Row) -> Coefficient {
    debug_assert!(!x.is_necessarily_closed());
    debug_assert!(x.size() - 1 <= y.size());
    let n = x.size() - 1;
    x.coeffs[..n]
        .iter()
        .zip(&y.coeffs[..n])
        .map(|(a, b)| a * b)
        .sum()
}

#[inline]
pub fn reduced_scalar_product_sign(x: &Row, y: &Row) -> Ordering {
    reduced_scalar_product(x, y).cmp(&Coefficient::zero())
}

/// Scalar product ignoring column 0.
pub fn homogeneous_scalar_product(x: &Row, y: &Row) -> Coefficient {
    debug_assert!(x.size() <= y.size());
    x.coeffs
        .iter()
        .zip(&y.coeffs)
        .skip(1)
        .map(|(a, b)| a * b)
        .sum()
}

#[inline]
pub fn homogeneous_scalar_product_sign(x: &Row, y: &Row) -> Ordering {
    homogeneous_scalar_product(x, y).cmp(&Coefficient::zero())
}

/// Sign of `x · y` where the two rows may disagree on topology: the epsilon
/// column only takes part when both rows carry it.
pub(crate) fn topology_adjusted_sign(c: &Row, g: &Row) -> Ordering {
    if c.is_necessarily_closed() == g.is_necessarily_closed() {
        scalar_product_sign(c, g)
    } else if !c.is_necessarily_closed() {
        reduced_scalar_product_sign(c, g)
    } else {
        let n = c.size().min(g.size());
        c.coeffs[..n]
            .iter()
            .zip(&g.coeffs[..n])
            .map(|(a, b)| a * b)
            .sum::<Coefficient>()
            .cmp(&Coefficient::zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(vals: &[i64], kind: RowKind) -> Row {
        Row::from_coeffs(
            vals.iter().map(|&v| Coefficient::from(v)).collect(),
            kind,
            Topology::Closed,
        )
    }

    #[test]
    fn strong_normalize_divides_and_fixes_sign() {
        let mut r = row(&[4, -2, 6], RowKind::LineOrEquality);
        r.strong_normalize();
        assert_eq!(r, row(&[-2, 1, -3], RowKind::LineOrEquality));
        // Inequalities keep their orientation.
        let mut r = row(&[4, -2, 6], RowKind::RayOrPointOrInequality);
        r.strong_normalize();
        assert_eq!(r, row(&[2, -1, 3], RowKind::RayOrPointOrInequality));
        assert!(r.is_strong_normalized());
    }

    #[test]
    fn compare_puts_equalities_first_then_lexicographic() {
        let eq = row(&[5, 0, 1], RowKind::LineOrEquality);
        let a = row(&[0, 1, 0], RowKind::RayOrPointOrInequality);
        let b = row(&[3, 1, 0], RowKind::RayOrPointOrInequality);
        let c = row(&[0, 1, 2], RowKind::RayOrPointOrInequality);
        assert_eq!(compare(&eq, &a), Ordering::Less);
        assert_eq!(compare(&a, &b), Ordering::Less);
        assert_eq!(compare(&b, &c), Ordering::Less);
        assert_eq!(compare(&c, &c.clone()), Ordering::Equal);
    }

    #[test]
    fn linear_combine_zeroes_pivot_column() {
        let mut x = row(&[1, 2, 3], RowKind::RayOrPointOrInequality);
        let y = row(&[0, 4, 1], RowKind::RayOrPointOrInequality);
        x.linear_combine(&y, 1);
        // x*2 - y*1 = [2, 0, 5]
        assert_eq!(x, row(&[2, 0, 5], RowKind::RayOrPointOrInequality));
    }

    #[test]
    fn scalar_product_variants() {
        let c = Row::from_coeffs(
            [1, 2, -1].iter().map(|&v| Coefficient::from(v)).collect(),
            RowKind::RayOrPointOrInequality,
            Topology::NotNecessarilyClosed,
        );
        let g = Row::from_coeffs(
            [2, 3, 2].iter().map(|&v| Coefficient::from(v)).collect(),
            RowKind::RayOrPointOrInequality,
            Topology::NotNecessarilyClosed,
        );
        assert_eq!(scalar_product(&c, &g), Coefficient::from(6));
        assert_eq!(reduced_scalar_product(&c, &g), Coefficient::from(8));
        assert_eq!(homogeneous_scalar_product(&c, &g), Coefficient::from(4));
    }
}
