//! Saturation bit rows and matrices.
//!
//! Purpose
//! - `sat_g[i][j]` is set iff generator `i` does not saturate constraint `j`;
//!   `sat_c` is its transpose. The same types hold the scratch matrices of
//!   the conversion, where rows follow the destination system.
//!
//! Why this design (short)
//! - Rows are word vectors trimmed of trailing zero words, so equality and
//!   subset tests are plain word loops and a row never needs to know the
//!   number of columns of its matrix.
//! - Rows of a saturation matrix track the rows of a system; every paired
//!   permutation goes through [`swap_rows_with_sat`].

use std::fmt;
use std::ops::{Index, IndexMut};

use crate::linear::LinearRow;
use crate::system::LinearSystem;

const WORD_BITS: usize = usize::BITS as usize;

/// A set of column indices.
#[derive(Clone, Default, Eq, PartialEq, Hash)]
pub struct BitRow {
    words: Vec<usize>,
}

impl BitRow {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn trim(&mut self) {
        while self.words.last().is_some_and(|w| *w == 0) {
            self.words.pop();
        }
    }

    /// No bit set.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    #[inline]
    pub fn get(&self, k: usize) -> bool {
        self.words
            .get(k / WORD_BITS)
            .is_some_and(|w| (*w >> (k % WORD_BITS)) & 1 == 1)
    }

    #[inline]
    pub fn set(&mut self, k: usize) {
        let word = k / WORD_BITS;
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1usize << (k % WORD_BITS);
    }

    #[inline]
    pub fn clear(&mut self, k: usize) {
        let word = k / WORD_BITS;
        if let Some(w) = self.words.get_mut(word) {
            *w &= !(1usize << (k % WORD_BITS));
            self.trim();
        }
    }

    pub fn clear_all(&mut self) {
        self.words.clear();
    }

    /// Clear every bit with index `>= k`.
    pub fn clear_from(&mut self, k: usize) {
        let word = k / WORD_BITS;
        if word >= self.words.len() {
            return;
        }
        self.words.truncate(word + 1);
        let bit = k % WORD_BITS;
        self.words[word] &= (1usize << bit).wrapping_sub(1);
        self.trim();
    }

    /// Set every bit in `0..n`.
    pub fn set_until(&mut self, n: usize) {
        for k in 0..n {
            self.set(k);
        }
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Smallest set index.
    pub fn first(&self) -> Option<usize> {
        self.iter().next()
    }

    /// Largest set index.
    pub fn last(&self) -> Option<usize> {
        let (i, w) = self.words.iter().enumerate().rev().find(|(_, w)| **w != 0)?;
        Some(i * WORD_BITS + (WORD_BITS - 1 - w.leading_zeros() as usize))
    }

    /// Iterate the set indices in increasing order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &w)| {
            let mut rest = w;
            std::iter::from_fn(move || {
                if rest == 0 {
                    return None;
                }
                let tz = rest.trailing_zeros() as usize;
                rest &= rest - 1;
                Some(i * WORD_BITS + tz)
            })
        })
    }

    /// `x ∪ y`.
    pub fn union_of(x: &BitRow, y: &BitRow) -> BitRow {
        let (long, short) = if x.words.len() >= y.words.len() {
            (x, y)
        } else {
            (y, x)
        };
        let mut words = long.words.clone();
        for (w, s) in words.iter_mut().zip(&short.words) {
            *w |= *s;
        }
        BitRow { words }
    }

    pub fn union_assign(&mut self, y: &BitRow) {
        if self.words.len() < y.words.len() {
            self.words.resize(y.words.len(), 0);
        }
        for (w, s) in self.words.iter_mut().zip(&y.words) {
            *w |= *s;
        }
    }

    /// `x ∩ y`.
    pub fn intersection_of(x: &BitRow, y: &BitRow) -> BitRow {
        let mut r = BitRow {
            words: x.words.iter().zip(&y.words).map(|(a, b)| a & b).collect(),
        };
        r.trim();
        r
    }

    /// `x \ y`.
    pub fn difference_of(x: &BitRow, y: &BitRow) -> BitRow {
        let mut words = x.words.clone();
        for (w, s) in words.iter_mut().zip(&y.words) {
            *w &= !*s;
        }
        let mut r = BitRow { words };
        r.trim();
        r
    }

    /// `x ⊆ y`.
    pub fn subset_eq(x: &BitRow, y: &BitRow) -> bool {
        if x.words.len() > y.words.len() {
            return false;
        }
        x.words.iter().zip(&y.words).all(|(a, b)| a & !b == 0)
    }

    /// `x ⊊ y`.
    pub fn strict_subset(x: &BitRow, y: &BitRow) -> bool {
        BitRow::subset_eq(x, y) && x != y
    }
}

impl fmt::Debug for BitRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// A matrix of bits stored by rows.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BitMatrix {
    rows: Vec<BitRow>,
    num_columns: usize,
}

impl BitMatrix {
    /// All-zero matrix.
    pub fn new(num_rows: usize, num_columns: usize) -> Self {
        Self {
            rows: vec![BitRow::new(); num_rows],
            num_columns,
        }
    }

    #[inline]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn num_columns(&self) -> usize {
        self.num_columns
    }

    pub fn rows(&self) -> &[BitRow] {
        &self.rows
    }

    pub(crate) fn take_rows(&mut self) -> Vec<BitRow> {
        std::mem::take(&mut self.rows)
    }

    pub(crate) fn set_rows(&mut self, rows: Vec<BitRow>) {
        self.rows = rows;
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.num_columns = 0;
    }

    pub fn add_row(&mut self, row: BitRow) {
        debug_assert!(row.last().map_or(true, |k| k < self.num_columns));
        self.rows.push(row);
    }

    /// Resize, clearing bits of dropped columns.
    pub fn resize(&mut self, num_rows: usize, num_columns: usize) {
        self.rows.resize(num_rows, BitRow::new());
        if num_columns < self.num_columns {
            for r in self.rows.iter_mut() {
                r.clear_from(num_columns);
            }
        }
        self.num_columns = num_columns;
    }

    /// Insert `n` all-zero rows in front.
    pub(crate) fn prepend_zero_rows(&mut self, n: usize) {
        self.rows
            .splice(0..0, std::iter::repeat_with(BitRow::new).take(n));
    }

    /// Drop every row from `n` on.
    pub fn truncate_rows(&mut self, n: usize) {
        self.rows.truncate(n);
    }

    #[inline]
    pub fn swap_rows(&mut self, i: usize, j: usize) {
        self.rows.swap(i, j);
    }

    /// Remove row `i`, shifting the following rows up.
    pub fn remove_row(&mut self, i: usize) -> BitRow {
        self.rows.remove(i)
    }

    /// Transpose of `self`.
    pub fn transposed(&self) -> BitMatrix {
        let mut t = BitMatrix::new(self.num_columns, self.rows.len());
        for (i, row) in self.rows.iter().enumerate() {
            for j in row.iter() {
                t.rows[j].set(i);
            }
        }
        t
    }

    /// Replace `self` with the transpose of `y`.
    pub fn transpose_assign(&mut self, y: &BitMatrix) {
        *self = y.transposed();
    }

    /// Transpose in place.
    pub fn transpose(&mut self) {
        *self = self.transposed();
    }

    /// Whether no row has a bit beyond the last column.
    pub fn check_columns(&self) -> bool {
        self.rows
            .iter()
            .all(|r| r.last().map_or(true, |k| k < self.num_columns))
    }
}

impl Index<usize> for BitMatrix {
    type Output = BitRow;

    #[inline]
    fn index(&self, i: usize) -> &BitRow {
        &self.rows[i]
    }
}

impl IndexMut<usize> for BitMatrix {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut BitRow {
        &mut self.rows[i]
    }
}

/// Swap rows `i` and `j` of a system together with its saturation rows.
#[inline]
pub(crate) fn swap_rows_with_sat<R: LinearRow>(
    sys: &mut LinearSystem<R>,
    sat: &mut BitMatrix,
    i: usize,
    j: usize,
) {
    sys.swap_rows(i, j);
    sat.swap_rows(i, j);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(idx: &[usize]) -> BitRow {
        let mut r = BitRow::new();
        for &k in idx {
            r.set(k);
        }
        r
    }

    #[test]
    fn set_clear_and_iterate_across_words() {
        let mut r = bits(&[0, 3, 64, 130]);
        assert_eq!(r.count_ones(), 4);
        assert_eq!(r.iter().collect::<Vec<_>>(), vec![0, 3, 64, 130]);
        assert_eq!(r.first(), Some(0));
        assert_eq!(r.last(), Some(130));
        r.clear(130);
        assert_eq!(r.last(), Some(64));
        r.clear_from(4);
        assert_eq!(r, bits(&[0, 3]));
        r.clear_all();
        assert!(r.is_empty());
        assert_eq!(r.first(), None);
    }

    #[test]
    fn subset_tests_and_union() {
        let a = bits(&[1, 2]);
        let b = bits(&[1, 2, 70]);
        assert!(BitRow::subset_eq(&a, &b));
        assert!(BitRow::strict_subset(&a, &b));
        assert!(!BitRow::strict_subset(&b, &b));
        assert!(!BitRow::subset_eq(&b, &a));
        assert_eq!(BitRow::union_of(&a, &bits(&[5])), bits(&[1, 2, 5]));
        assert_eq!(BitRow::intersection_of(&b, &bits(&[2, 70])), bits(&[2, 70]));
        assert_eq!(BitRow::difference_of(&b, &bits(&[70])), a);
        assert!(BitRow::intersection_of(&a, &bits(&[70])).is_empty());
    }

    #[test]
    fn transpose_round_trip() {
        let mut m = BitMatrix::new(2, 3);
        m[0].set(2);
        m[1].set(0);
        m[1].set(1);
        let t = m.transposed();
        assert_eq!(t.num_rows(), 3);
        assert_eq!(t.num_columns(), 2);
        assert!(t[2].get(0) && t[0].get(1) && t[1].get(1));
        assert!(!t[0].get(0));
        assert_eq!(t.transposed(), m);
    }

    #[test]
    fn prepended_rows_are_empty() {
        let mut m = BitMatrix::new(1, 2);
        m[0].set(1);
        m.prepend_zero_rows(2);
        assert_eq!(m.num_rows(), 3);
        assert!(m[0].is_empty() && m[1].is_empty());
        assert!(m[2].get(1));
    }
}
