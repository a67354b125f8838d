//! Literals are atoms paired with a (boolean) polarity.
//!
//! Or, rather, anything which has methods for returning an atom and a polarity (and a few other useful things).
//!
//! The 'canonical' implementation of the literal trait is the [CLiteral] structure, an atom and a sign packed into a u32.
//! The atom occupies the high bits, and the low bit is set when the literal is negative.
//! So, the packed value of a literal doubles as an index, and the indicies of a literal and its negation are adjacent.
//!
//! An example:
//!
//! ```rust
//! # use shoal_sat::structures::literal::{CLiteral, Literal};
//! let atom = 79;
//! let polarity = true;
//! let literal = CLiteral::new(atom, polarity);
//!
//! assert!(literal.polarity());
//!
//! assert_eq!(literal.atom(), 79);
//! assert!(!literal.negate().polarity());
//! assert_eq!(-literal, literal.negate());
//!
//! assert_eq!(literal.as_int(), 79);
//! assert_eq!((-literal).as_int(), -79);
//! assert_eq!(literal.index() ^ 1, (-literal).index());
//! ```
//!
//! Literals are ordered by atom and then by polarity, with the positive literal before the negative literal.

use crate::structures::atom::Atom;

/// Something which has methods for returning an atom and a polarity, etc.
pub trait Literal: std::cmp::Ord + std::hash::Hash {
    /// A fresh literal, specified by pairing an atom with a boolean.
    fn new(atom: Atom, polarity: bool) -> Self;

    /// The negation of the literal.
    fn negate(&self) -> Self;

    /// The atom of the literal.
    fn atom(&self) -> Atom;

    /// The polarity of the literal.
    fn polarity(&self) -> bool;

    /// The literal in it's 'canonical' form.
    fn canonical(&self) -> CLiteral;

    /// The literal in it's integer form, with sign indicating polarity.
    fn as_int(&self) -> isize;
}

/// The canonical representation of a literal, as an atom and a sign packed into a u32.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct CLiteral(u32);

impl CLiteral {
    /// The literal of the atom `0`, which is always true.
    pub const TRUE: CLiteral = CLiteral(0);

    /// The negation of [CLiteral::TRUE], which is always false.
    pub const FALSE: CLiteral = CLiteral(1);

    /// The packed representation of the literal, for use as an index.
    #[inline(always)]
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    /// The literal with the given packed representation.
    #[inline(always)]
    pub fn from_index(index: u32) -> Self {
        CLiteral(index)
    }

    /// The literal of the given integer, with sign indicating polarity.
    pub fn from_int(int: isize) -> Self {
        CLiteral::new(int.unsigned_abs() as Atom, int.is_positive())
    }
}

impl Literal for CLiteral {
    #[inline(always)]
    fn new(atom: Atom, polarity: bool) -> Self {
        CLiteral((atom << 1) | (!polarity as u32))
    }

    #[inline(always)]
    fn negate(&self) -> Self {
        CLiteral(self.0 ^ 1)
    }

    #[inline(always)]
    fn atom(&self) -> Atom {
        self.0 >> 1
    }

    #[inline(always)]
    fn polarity(&self) -> bool {
        self.0 & 1 == 0
    }

    fn canonical(&self) -> CLiteral {
        *self
    }

    fn as_int(&self) -> isize {
        match self.polarity() {
            true => self.atom() as isize,
            false => -(self.atom() as isize),
        }
    }
}

impl std::ops::Neg for CLiteral {
    type Output = CLiteral;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}

impl std::ops::Not for CLiteral {
    type Output = CLiteral;

    fn not(self) -> Self::Output {
        self.negate()
    }
}

impl std::fmt::Display for CLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_int())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packing() {
        let p = CLiteral::new(5, true);
        let q = CLiteral::new(5, false);

        assert_eq!(p.index(), 10);
        assert_eq!(q.index(), 11);
        assert_eq!(-p, q);
        assert!(p < q);
        assert_eq!(CLiteral::from_int(-5), q);
    }

    #[test]
    fn constants() {
        assert_eq!(CLiteral::TRUE.atom(), 0);
        assert!(CLiteral::TRUE.polarity());
        assert_eq!(-CLiteral::TRUE, CLiteral::FALSE);
    }
}
