//! Relations between a polyhedron and a constraint or a generator.
//!
//! A relation is a conjunction of assertions stored as bits: combining two
//! relations with `|` asserts both. `implies` checks that every assertion
//! of the argument is present.

use std::fmt;
use std::ops::BitOr;

/// What is known of a polyhedron `P` with respect to a constraint `c`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PolyConRelation {
    flags: u8,
}

const NOTHING: u8 = 0;
const IS_DISJOINT: u8 = 1 << 0;
const STRICTLY_INTERSECTS: u8 = 1 << 1;
const IS_INCLUDED: u8 = 1 << 2;
const SATURATES: u8 = 1 << 3;

impl PolyConRelation {
    /// No assertion.
    pub const fn nothing() -> Self {
        Self { flags: NOTHING }
    }

    /// `P` and the points satisfying `c` are disjoint.
    pub const fn is_disjoint() -> Self {
        Self { flags: IS_DISJOINT }
    }

    /// `P` intersects both `c` and its complement.
    pub const fn strictly_intersects() -> Self {
        Self {
            flags: STRICTLY_INTERSECTS,
        }
    }

    /// Every point of `P` satisfies `c`.
    pub const fn is_included() -> Self {
        Self { flags: IS_INCLUDED }
    }

    /// `P` lies on the hyperplane of `c`.
    pub const fn saturates() -> Self {
        Self { flags: SATURATES }
    }

    #[inline]
    pub fn implies(self, y: Self) -> bool {
        self.flags & y.flags == y.flags
    }
}

impl BitOr for PolyConRelation {
    type Output = Self;

    fn bitor(self, y: Self) -> Self {
        Self {
            flags: self.flags | y.flags,
        }
    }
}

impl fmt::Debug for PolyConRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(u8, &str); 4] = [
            (IS_DISJOINT, "IS_DISJOINT"),
            (STRICTLY_INTERSECTS, "STRICTLY_INTERSECTS"),
            (IS_INCLUDED, "IS_INCLUDED"),
            (SATURATES, "SATURATES"),
        ];
        if self.flags == NOTHING {
            return f.write_str("NOTHING");
        }
        let names: Vec<&str> = NAMES
            .iter()
            .filter(|(bit, _)| self.flags & bit != 0)
            .map(|(_, name)| *name)
            .collect();
        f.write_str(&names.join(" & "))
    }
}

/// What is known of a polyhedron `P` with respect to a generator `g`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PolyGenRelation {
    #[default]
    Nothing,
    /// Adding `g` to `P` leaves `P` unchanged.
    Subsumes,
}

impl PolyGenRelation {
    #[inline]
    pub fn implies(self, y: Self) -> bool {
        y == PolyGenRelation::Nothing || self == y
    }
}

/// Answer of a test that may give up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ThreeValued {
    True,
    False,
    DontKnow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conjunction_and_implication() {
        let r = PolyConRelation::saturates() | PolyConRelation::is_included();
        assert!(r.implies(PolyConRelation::is_included()));
        assert!(r.implies(PolyConRelation::saturates()));
        assert!(!r.implies(PolyConRelation::is_disjoint()));
        assert!(r.implies(PolyConRelation::nothing()));
        assert_eq!(format!("{r:?}"), "IS_INCLUDED & SATURATES");
        assert!(PolyGenRelation::Subsumes.implies(PolyGenRelation::Nothing));
        assert!(!PolyGenRelation::Nothing.implies(PolyGenRelation::Subsumes));
    }
}
