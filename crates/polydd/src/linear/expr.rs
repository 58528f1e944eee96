//! Variables and linear expressions `a_0 x_0 + … + a_{n-1} x_{n-1} + b`.

use std::ops::{Add, Mul, Neg, Sub};

use num_traits::Zero;

use crate::coefficient::Coefficient;

/// A space dimension, by index (`Variable(0)` is the first coordinate).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable(pub usize);

impl Variable {
    #[inline]
    pub fn id(self) -> usize {
        self.0
    }

    /// Smallest space dimension containing this variable.
    #[inline]
    pub fn space_dimension(self) -> usize {
        self.0 + 1
    }
}

/// Linear expression with exact coefficients.
///
/// The space dimension is the length of the homogeneous part; it only grows
/// when a variable with a larger index is mentioned.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct LinearExpression {
    coeffs: Vec<Coefficient>,
    inhomogeneous: Coefficient,
}

impl LinearExpression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from homogeneous coefficients and the inhomogeneous term.
    pub fn from_coefficients<I, C>(coeffs: I, inhomogeneous: impl Into<Coefficient>) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Coefficient>,
    {
        Self {
            coeffs: coeffs.into_iter().map(Into::into).collect(),
            inhomogeneous: inhomogeneous.into(),
        }
    }

    #[inline]
    pub fn space_dimension(&self) -> usize {
        self.coeffs.len()
    }

    /// Coefficient of `v` (zero beyond the space dimension).
    pub fn coefficient(&self, v: Variable) -> Coefficient {
        self.coeffs
            .get(v.id())
            .cloned()
            .unwrap_or_else(Coefficient::zero)
    }

    #[inline]
    pub fn inhomogeneous_term(&self) -> &Coefficient {
        &self.inhomogeneous
    }

    #[inline]
    pub fn homogeneous_coefficients(&self) -> &[Coefficient] {
        &self.coeffs
    }

    pub fn all_homogeneous_terms_are_zero(&self) -> bool {
        self.coeffs.iter().all(Zero::is_zero)
    }

    fn ensure_dimension(&mut self, dim: usize) {
        if self.coeffs.len() < dim {
            self.coeffs.resize(dim, Coefficient::zero());
        }
    }

    /// Add `k * v` in place.
    pub fn add_mul_assign(&mut self, k: impl Into<Coefficient>, v: Variable) {
        self.ensure_dimension(v.space_dimension());
        self.coeffs[v.id()] += k.into();
    }

    /// Row layout `[b, a_0 .. a_{n-1}]` padded with zeros to `size` columns.
    pub(crate) fn to_columns(&self, size: usize) -> Vec<Coefficient> {
        let mut out = Vec::with_capacity(size.max(self.coeffs.len() + 1));
        out.push(self.inhomogeneous.clone());
        out.extend(self.coeffs.iter().cloned());
        if out.len() < size {
            out.resize(size, Coefficient::zero());
        }
        out
    }
}

impl From<Variable> for LinearExpression {
    fn from(v: Variable) -> Self {
        let mut e = LinearExpression::new();
        e.add_mul_assign(1, v);
        e
    }
}

impl From<i64> for LinearExpression {
    fn from(b: i64) -> Self {
        Self {
            coeffs: Vec::new(),
            inhomogeneous: b.into(),
        }
    }
}

impl From<i32> for LinearExpression {
    fn from(b: i32) -> Self {
        LinearExpression::from(i64::from(b))
    }
}

impl From<Coefficient> for LinearExpression {
    fn from(b: Coefficient) -> Self {
        Self {
            coeffs: Vec::new(),
            inhomogeneous: b,
        }
    }
}

impl Neg for LinearExpression {
    type Output = LinearExpression;

    fn neg(mut self) -> LinearExpression {
        for c in self.coeffs.iter_mut() {
            *c = -std::mem::take(c);
        }
        self.inhomogeneous = -self.inhomogeneous;
        self
    }
}

impl<T: Into<LinearExpression>> Add<T> for LinearExpression {
    type Output = LinearExpression;

    fn add(mut self, rhs: T) -> LinearExpression {
        let rhs = rhs.into();
        self.ensure_dimension(rhs.space_dimension());
        for (a, b) in self.coeffs.iter_mut().zip(rhs.coeffs) {
            *a += b;
        }
        self.inhomogeneous += rhs.inhomogeneous;
        self
    }
}

impl<T: Into<LinearExpression>> Sub<T> for LinearExpression {
    type Output = LinearExpression;

    fn sub(self, rhs: T) -> LinearExpression {
        self + (-rhs.into())
    }
}

impl Mul<i64> for LinearExpression {
    type Output = LinearExpression;

    fn mul(mut self, k: i64) -> LinearExpression {
        let k = Coefficient::from(k);
        for c in self.coeffs.iter_mut() {
            *c *= &k;
        }
        self.inhomogeneous *= &k;
        self
    }
}

impl Mul<i32> for LinearExpression {
    type Output = LinearExpression;

    fn mul(self, k: i32) -> LinearExpression {
        self * i64::from(k)
    }
}

impl Neg for Variable {
    type Output = LinearExpression;

    fn neg(self) -> LinearExpression {
        -LinearExpression::from(self)
    }
}

impl<T: Into<LinearExpression>> Add<T> for Variable {
    type Output = LinearExpression;

    fn add(self, rhs: T) -> LinearExpression {
        LinearExpression::from(self) + rhs
    }
}

impl<T: Into<LinearExpression>> Sub<T> for Variable {
    type Output = LinearExpression;

    fn sub(self, rhs: T) -> LinearExpression {
        LinearExpression::from(self) - rhs
    }
}

macro_rules! impl_scalar_mul {
    ($($t:ty),*) => {$(
        impl Mul<Variable> for $t {
            type Output = LinearExpression;

            fn mul(self, v: Variable) -> LinearExpression {
                let mut e = LinearExpression::new();
                e.add_mul_assign(self, v);
                e
            }
        }

        impl Mul<LinearExpression> for $t {
            type Output = LinearExpression;

            fn mul(self, e: LinearExpression) -> LinearExpression {
                e * i64::from(self)
            }
        }
    )*};
}

impl_scalar_mul!(i32, i64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operators_build_expected_coefficients() {
        let a = Variable(0);
        let b = Variable(2);
        let e = 3i64 * a - b + 4;
        assert_eq!(e.space_dimension(), 3);
        assert_eq!(e.coefficient(a), Coefficient::from(3));
        assert_eq!(e.coefficient(Variable(1)), Coefficient::from(0));
        assert_eq!(e.coefficient(b), Coefficient::from(-1));
        assert_eq!(e.inhomogeneous_term(), &Coefficient::from(4));
        let cols = (-e).to_columns(5);
        let expect: Vec<Coefficient> = [-4, -3, 0, 1, 0].iter().map(|&v| v.into()).collect();
        assert_eq!(cols, expect);
    }
}
