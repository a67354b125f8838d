//! The reason an atom was assigned a value.
//!
//! Short reasons are stored inline, while a reason given by a long clause is stored as the key of the clause.
//! Reason literals are those literals which are true, and whose conjunction implied the literal assigned.
//! That is, if `q` was implied by the clause `q ∨ -p ∨ -r`, then the antecedent of `q` is `Ternary(p, r)`.

use crate::{db::ClauseKey, structures::literal::CLiteral};

/// The reason an atom was assigned a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Antecedent {
    /// A decision (or assumption), or an assignment without a reason at level zero.
    #[default]
    None,

    /// Implied by a single (true) literal.
    Binary(CLiteral),

    /// Implied by two (true) literals.
    Ternary(CLiteral, CLiteral),

    /// Implied by a long clause.
    Clause(ClauseKey),
}

impl Antecedent {
    pub fn is_none(&self) -> bool {
        matches!(self, Antecedent::None)
    }
}
