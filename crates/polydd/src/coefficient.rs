//! Exact coefficients.
//!
//! Every matrix entry of the engine is an arbitrary precision integer. The
//! helpers below are the handful of ring operations the row algorithms need
//! on top of what `num-bigint` provides: gcd of a row, exact division and the
//! "divide both by their gcd" step used by linear combinations.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Zero};

/// Arbitrary precision signed integer used for every coefficient.
pub type Coefficient = BigInt;

/// Non-negative gcd of all entries; zero iff every entry is zero.
pub(crate) fn gcd_of(coeffs: &[Coefficient]) -> Coefficient {
    let mut g = Coefficient::zero();
    for c in coeffs {
        if c.is_zero() {
            continue;
        }
        g = g.gcd(c);
        if g.is_one() {
            break;
        }
    }
    g
}

/// Divide `a` by `d` in place; `d` must divide `a`.
#[inline]
pub(crate) fn exact_div_assign(a: &mut Coefficient, d: &Coefficient) {
    debug_assert!((&*a % d).is_zero(), "inexact division");
    *a /= d;
}

/// Returns `(x / g, y / g)` where `g = gcd(x, y)`.
///
/// `y` must be non-zero.
pub(crate) fn normalize2(x: &Coefficient, y: &Coefficient) -> (Coefficient, Coefficient) {
    let g = x.gcd(y);
    (x / &g, y / &g)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gcd_of_row_ignores_zeros_and_sign() {
        let row: Vec<Coefficient> = [0, -6, 9, 0, 15].iter().map(|&v| v.into()).collect();
        assert_eq!(gcd_of(&row), Coefficient::from(3));
        let zeros: Vec<Coefficient> = vec![Coefficient::zero(); 3];
        assert!(gcd_of(&zeros).is_zero());
    }

    #[test]
    fn normalize2_divides_by_common_factor() {
        let (a, b) = normalize2(&Coefficient::from(-12), &Coefficient::from(18));
        assert_eq!(a, Coefficient::from(-2));
        assert_eq!(b, Coefficient::from(3));
    }
}
