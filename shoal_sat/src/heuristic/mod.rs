/*!
Decision heuristics.

A decision heuristic chooses the atom of the next decision, and is told of events which may inform the choice:
- A clause is added, or learnt.
- A clause is used as a reason during analysis.
- Atoms are bumped after a conflict, and activity decays.
- An atom becomes free on backjumping.

The polarity of a decision is chosen by the [solver](crate::procedures::decision), through phase saving or at random.

A solver holds its heuristic as a boxed trait object, built by the [factory](HeuristicFactory) of the configuration given to the solver.
So, each solver of a portfolio may use a distinct heuristic, e.g.

```rust
# use std::sync::Arc;
# use shoal_sat::config::Config;
# use shoal_sat::heuristic::{static_order::StaticOrder, DecisionHeuristic};
let mut config = Config::default();
config.heuristic = Arc::new(|_: &Config| -> Box<dyn DecisionHeuristic> {
    Box::new(StaticOrder::default())
});
```
*/

pub mod static_order;
pub mod vsids;

use std::sync::Arc;

use crate::{
    config::Config,
    db::{assignment::Assignment, clause::ClauseKind},
    structures::{atom::Atom, literal::CLiteral},
};

/// A constructor of decision heuristics.
pub type HeuristicFactory = Arc<dyn Fn(&Config) -> Box<dyn DecisionHeuristic> + Send + Sync>;

/// The interface between a solver and a decision heuristic.
///
/// Every method other than [select](DecisionHeuristic::select) has a default (empty) implementation.
pub trait DecisionHeuristic: Send {
    /// Ensures the heuristic considers every atom below `atom_count`.
    fn grow_to(&mut self, atom_count: usize);

    /// A clause of the given kind was added.
    fn new_constraint(&mut self, _literals: &[CLiteral], _kind: ClauseKind) {}

    /// The reason for `resolved`, given by the true literals `reason`, was used during analysis.
    fn update_reason(&mut self, _reason: &[CLiteral], _resolved: CLiteral) {}

    /// Bumps the given atoms, after a conflict.
    fn bump(&mut self, _atoms: &[Atom]) {}

    /// Decays the activity of every atom, after a conflict.
    fn decay(&mut self) {}

    /// The atom has become free.
    fn undo(&mut self, _atom: Atom) {}

    /// Some atom without a value on the assignment, if any.
    fn select(&mut self, assignment: &Assignment) -> Option<Atom>;
}
