//! Structures of satisfiability, independent of a solver.
//!
//! - [Atoms](atom) and [literals](literal), and [clauses](clause) of literals.
//! - The [value](value) of an atom, and the [reason](antecedent) an atom has a value.

pub mod antecedent;
pub mod atom;
pub mod clause;
pub mod literal;
pub mod value;
