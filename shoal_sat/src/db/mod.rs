//! Databases for holding information relevant to a solve.
//!
//! - [The assignment](crate::db::assignment)
//!   + The value, level, and reason of each atom, together with the trail of assigned literals and the propagation queue.
//! - [Decision levels](crate::db::level)
//!   + The start of each level on the trail, and the clauses to notify when a level is undone.
//! - [The clause database](crate::db::clause)
//!   + A collection of long clauses, each indexed by a clause key. \
//!     From an external perspective there are two important kinds of clause:
//!     * Original clauses \
//!       Original clauses are added to a solver from some external source, and together are the formula 𝐅 whose satisfiability may be determined.
//!     * Added clauses \
//!       Clauses added to a solver by some procedure (e.g. via analysis, or received from another solver).
//!       Every added clause is a consequence of the collection of original clauses.
//! - [Watch lists](crate::db::watches)
//!   + For each literal, the long clauses to visit when the literal becomes true.
//! - [The short implication graph](crate::db::implications)
//!   + Binary and ternary clauses, stored as implications and shared between solvers.

pub mod assignment;
pub mod clause;
pub mod implications;
mod keys;
pub use keys::*;
pub mod level;
pub mod watches;

/// The index of a [decision level](crate::db::level).
pub type LevelIndex = u32;
