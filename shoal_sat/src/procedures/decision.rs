/*!
Methods for choosing the value of an atom.

# Overview

A decision is made when propagation reaches a fixpoint without a conflict and some atom remains free.
The atom is chosen by the [decision heuristic](crate::heuristic::DecisionHeuristic) of the solver, or at random with some probability.

# Decisions as literals

Strictly a decision is to value some atom *a* with value *v*.
Still, it is convenient to represent such a decision as a literal with atom *a* and polarity *v*.
For example, a decision to value *p* with value *false* can be represented with the literal *-p*.

The polarity of a decision is the saved phase of the atom, if phase saving is enabled and the atom has been valued.
Otherwise, the polarity is positive with probability [polarity_lean](crate::config::Config::polarity_lean).

# Assumption

A decision is made by [assume](GenericSolver::assume), which opens a fresh level for the decision.
*/

use crate::{
    db::assignment::MAX_LEVEL,
    misc::log::targets::{self},
    solver::GenericSolver,
    structures::{
        antecedent::Antecedent,
        atom::Atom,
        literal::{CLiteral, Literal},
        value::Value,
    },
};

impl<R: rand::Rng + std::default::Default> GenericSolver<R> {
    /// Makes a decision, choosing a random atom with probability `random_prob`.
    ///
    /// Returns false if every atom is assigned, and so no decision can be made.
    pub fn decide(&mut self, random_prob: f64) -> bool {
        let random = match random_prob > 0.0 {
            true => self.rng.random_bool(random_prob.min(1.0)),
            false => false,
        };

        let chosen = match random {
            true => self.random_free_atom(),
            false => None,
        };

        let atom = match chosen
            .or_else(|| self.heuristic.select(&self.assignment))
            .or_else(|| self.first_free_atom())
        {
            Some(atom) => atom,
            None => return false,
        };

        let polarity = match self.assignment.saved_phase(atom) {
            Value::True if self.config.phase_saving.value => true,
            Value::False if self.config.phase_saving.value => false,
            _ => self.rng.random_bool(self.config.polarity_lean.value),
        };

        self.counters.total_decisions += 1;
        let decision = CLiteral::new(atom, polarity);
        log::trace!(target: targets::VALUATION, "Decision {decision}");
        self.assume(decision)
    }

    /// Assigns `literal` true on a fresh level, if free.
    ///
    /// Returns false if `literal` is false.
    /// If `literal` is already true no level is opened.
    pub fn assume(&mut self, literal: CLiteral) -> bool {
        match self.assignment.literal_value(literal) {
            Value::True => true,
            Value::False => false,
            Value::Free => {
                if self.levels.decision_level() >= MAX_LEVEL {
                    log::error!(target: targets::VALUATION, "Maximum decision level reached");
                    return false;
                }
                self.levels.push(self.assignment.trail().len());
                let dl = self.levels.decision_level();
                self.assignment.assign(literal, dl, Antecedent::None)
            }
        }
    }

    /// The decision of `level`, for a level above zero.
    pub fn decision(&self, level: crate::db::LevelIndex) -> CLiteral {
        self.assignment.trail()[self.levels.trail_start(level)]
    }

    fn random_free_atom(&mut self) -> Option<Atom> {
        let count = self.assignment.atom_count();
        if count <= 1 {
            return None;
        }
        let start = self.rng.random_range(1..count);
        (start..count)
            .chain(1..start)
            .map(|atom| atom as Atom)
            .find(|atom| self.assignment.value_of(*atom) == Value::Free)
    }

    fn first_free_atom(&self) -> Option<Atom> {
        (1..self.assignment.atom_count())
            .map(|atom| atom as Atom)
            .find(|atom| self.assignment.value_of(*atom) == Value::Free)
    }
}
