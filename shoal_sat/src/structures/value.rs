//! The value of an atom on an assignment.

use crate::structures::literal::{CLiteral, Literal};

/// The value of an atom, or of a literal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Value {
    /// The atom has no value.
    #[default]
    Free,

    /// The atom is true.
    True,

    /// The atom is false.
    False,
}

impl Value {
    /// The value which makes `literal` true.
    pub fn of_literal(literal: CLiteral) -> Self {
        match literal.polarity() {
            true => Value::True,
            false => Value::False,
        }
    }

    /// The value as an optional boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Free => None,
            Value::True => Some(true),
            Value::False => Some(false),
        }
    }
}
