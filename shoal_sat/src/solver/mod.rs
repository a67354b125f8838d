/*!
The solver --- to which formulas are added and within which solves take place.

Strictly, a [GenericSolver] and a [Solver].

The generic solver is generic over the source of randomness, while [from_config](Solver::from_config) is implemented for a solver using [MinimalPCG32](crate::generic::random::MinimalPCG32) to avoid requiring a source of randomness to be supplied alongside a config.

A solver owns every structure used during a solve, with the exception of the [short implication graph](crate::db::implications), which is held behind an [Arc](std::sync::Arc) in order to be shared with other solvers attached to a [shared context](crate::shared::SharedContext).

# Example
```rust
# use shoal_sat::solver::Solver;
# use shoal_sat::config::Config;
# use shoal_sat::reports::Report;
let mut solver = Solver::from_config(Config::default());

let [p, q] = *solver.fresh_or_max_literals(2).as_slice() else {
    panic!("Insufficient literals");
};

assert!(solver.add_clause(vec![p, q]).is_ok());
assert!(solver.add_clause(-p).is_ok());

assert_eq!(solver.solve(), Ok(Report::Satisfiable));
assert_eq!(solver.value_of(1), Some(false));
assert_eq!(solver.value_of(2), Some(true));
```
*/

mod counters;
pub use counters::Counters;
mod generic;
pub use generic::{GenericSolver, ImpliedLiteral};
mod specific;
pub use specific::Solver;

/// The state of a solver.
///
/// States are ordered, and a [configuration option](crate::config::ConfigOption) may only be changed at or before some state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum SolverState {
    /// The solver allows for configuration.
    Configuration,

    /// The solver allows input.
    Input,

    /// A solve is in progress.
    Solving,

    /// The formula is known to be satisfiable, with a model on the assignment.
    Satisfiable,

    /// The formula is known to be unsatisfiable.
    Unsatisfiable,
}

impl std::fmt::Display for SolverState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::Input => write!(f, "Input"),
            Self::Solving => write!(f, "Solving"),
            Self::Satisfiable => write!(f, "Satisfiable"),
            Self::Unsatisfiable => write!(f, "Unsatisfiable"),
        }
    }
}

/// Reasons a post-propagator stops propagation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PostStop {
    /// A conflict, whose (true) literals have been [set](GenericSolver::set_conflict) on the solver.
    Conflict,

    /// The search should stop, without a conflict.
    Stop,
}

/// A propagator which runs after the core propagation of a solver reaches a fixpoint.
///
/// A post-propagator may assign further literals (e.g. through [force](GenericSolver::force)), in which case core propagation resumes before the next post-propagator is called.
///
/// Post-propagators owned by a solver are called in order of [priority](PostPropagator::priority), lowest first.
/// In addition, some post-propagator may be lent to a solver for a search (see [search_with](GenericSolver::search_with)), and is called after every owned post-propagator.
pub trait PostPropagator<R: rand::Rng + std::default::Default>: Send {
    /// The priority of the propagator.
    fn priority(&self) -> u32;

    /// Propagates to a fixpoint.
    fn propagate_fixpoint(&mut self, solver: &mut GenericSolver<R>) -> Result<(), PostStop>;
}
