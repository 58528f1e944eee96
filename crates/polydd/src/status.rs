//! Status flags of a polyhedron.
//!
//! The flags record which representation is up to date, which is minimized,
//! which saturation matrix is valid and which system has pending rows. The
//! zero-dimensional universe is the state with no flag set, so a fresh
//! `Status` describes it.

use std::fmt;

const EMPTY: u32 = 1 << 0;
const C_UP_TO_DATE: u32 = 1 << 1;
const G_UP_TO_DATE: u32 = 1 << 2;
const C_MINIMIZED: u32 = 1 << 3;
const G_MINIMIZED: u32 = 1 << 4;
const SAT_C_UP_TO_DATE: u32 = 1 << 5;
const SAT_G_UP_TO_DATE: u32 = 1 << 6;
const C_PENDING: u32 = 1 << 7;
const G_PENDING: u32 = 1 << 8;

const NAMES: [(u32, &str); 9] = [
    (EMPTY, "EM"),
    (C_UP_TO_DATE, "CS"),
    (G_UP_TO_DATE, "GS"),
    (C_MINIMIZED, "CM"),
    (G_MINIMIZED, "GM"),
    (SAT_C_UP_TO_DATE, "SC"),
    (SAT_G_UP_TO_DATE, "SG"),
    (C_PENDING, "CP"),
    (G_PENDING, "GP"),
];

/// Bitset of polyhedron states.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Status {
    flags: u32,
}

macro_rules! flag_accessors {
    ($($flag:ident => $test:ident, $set:ident, $reset:ident;)*) => {
        $(
            #[inline]
            pub fn $test(&self) -> bool {
                self.flags & $flag != 0
            }

            #[inline]
            pub fn $set(&mut self) {
                self.flags |= $flag;
            }

            #[inline]
            pub fn $reset(&mut self) {
                self.flags &= !$flag;
            }
        )*
    };
}

impl Status {
    pub fn new() -> Self {
        Self::default()
    }

    flag_accessors! {
        C_UP_TO_DATE => test_c_up_to_date, set_c_up_to_date, reset_c_up_to_date;
        G_UP_TO_DATE => test_g_up_to_date, set_g_up_to_date, reset_g_up_to_date;
        C_MINIMIZED => test_c_minimized, set_c_minimized, reset_c_minimized;
        G_MINIMIZED => test_g_minimized, set_g_minimized, reset_g_minimized;
        SAT_C_UP_TO_DATE => test_sat_c_up_to_date, set_sat_c_up_to_date, reset_sat_c_up_to_date;
        SAT_G_UP_TO_DATE => test_sat_g_up_to_date, set_sat_g_up_to_date, reset_sat_g_up_to_date;
        C_PENDING => test_c_pending, set_c_pending, reset_c_pending;
        G_PENDING => test_g_pending, set_g_pending, reset_g_pending;
    }

    #[inline]
    pub fn test_zero_dim_univ(&self) -> bool {
        self.flags == 0
    }

    /// Become the zero-dimensional universe (every other flag cleared).
    #[inline]
    pub fn set_zero_dim_univ(&mut self) {
        self.flags = 0;
    }

    #[inline]
    pub fn test_empty(&self) -> bool {
        self.flags & EMPTY != 0
    }

    /// Become empty (every other flag cleared).
    #[inline]
    pub fn set_empty(&mut self) {
        self.flags = EMPTY;
    }

    #[inline]
    pub fn reset_empty(&mut self) {
        self.flags &= !EMPTY;
    }

    /// Both sides minimized and at least one saturation matrix valid: the
    /// only states in which rows may be added as pending.
    pub fn can_have_something_pending(&self) -> bool {
        self.test_c_minimized()
            && self.test_g_minimized()
            && (self.test_sat_c_up_to_date() || self.test_sat_g_up_to_date())
    }

    #[inline]
    pub fn has_something_pending(&self) -> bool {
        self.test_c_pending() || self.test_g_pending()
    }

    /// Constraints stale: they can be neither minimized nor pending, and no
    /// saturation matrix describes them.
    pub fn clear_constraints_up_to_date(&mut self) {
        self.reset_c_pending();
        self.reset_sat_c_up_to_date();
        self.reset_sat_g_up_to_date();
        self.reset_c_minimized();
        self.reset_c_up_to_date();
    }

    /// Symmetric to [`Status::clear_constraints_up_to_date`].
    pub fn clear_generators_up_to_date(&mut self) {
        self.reset_g_pending();
        self.reset_sat_c_up_to_date();
        self.reset_sat_g_up_to_date();
        self.reset_g_minimized();
        self.reset_g_up_to_date();
    }

    pub fn clear_constraints_minimized(&mut self) {
        self.reset_c_minimized();
    }

    pub fn clear_generators_minimized(&mut self) {
        self.reset_g_minimized();
    }

    /// Whether the combination of flags is coherent.
    pub fn check_consistency(&self) -> bool {
        if self.test_zero_dim_univ() {
            return true;
        }
        if self.test_empty() {
            return self.flags == EMPTY;
        }
        if (self.test_sat_c_up_to_date() || self.test_sat_g_up_to_date())
            && !(self.test_c_minimized() && self.test_g_minimized())
        {
            return false;
        }
        if self.test_c_minimized() && !self.test_c_up_to_date() {
            return false;
        }
        if self.test_g_minimized() && !self.test_g_up_to_date() {
            return false;
        }
        if self.test_c_pending() && self.test_g_pending() {
            return false;
        }
        if self.has_something_pending() && !self.can_have_something_pending() {
            return false;
        }
        true
    }
}

impl fmt::Debug for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.test_zero_dim_univ() {
            return f.write_str("Status(ZE)");
        }
        let names: Vec<&str> = NAMES
            .iter()
            .filter(|(bit, _)| self.flags & bit != 0)
            .map(|(_, name)| *name)
            .collect();
        write!(f, "Status({})", names.join(" "))
    }
}
