//! Simplification at level zero.
//!
//! Literals assigned at level zero hold regardless of any decision, and so:
//! - Any clause containing a literal true at level zero is satisfied, and may be removed.
//! - Any literal false at level zero may be removed from a clause.
//!
//! Simplification applies each of these observations to the clauses of a solver, for each literal assigned at level zero since the last simplification.
//! Long clauses reduced to at most three literals are moved to the implication graph, if the graph is not shared.
//!
//! Simplification is only made at level zero, as otherwise the assignment contains literals which may be undone.

use std::sync::Arc;

use crate::{
    db::{clause::Simplified, ClauseKey},
    misc::log::targets::{self},
    solver::GenericSolver,
};

impl<R: rand::Rng + std::default::Default> GenericSolver<R> {
    /// Simplifies the clauses of the solver against the assignment at level zero.
    ///
    /// Returns false if the formula is found to be unsatisfiable.
    pub fn simplify(&mut self) -> bool {
        if self.levels.decision_level() != 0 {
            return true;
        }
        if self.propagate().is_err() {
            return false;
        }
        if self.last_simplify == self.assignment.trail().len() {
            return true;
        }

        if let Some(graph) = Arc::get_mut(&mut self.graph) {
            for p in &self.assignment.trail()[self.last_simplify..] {
                graph.remove_true(*p, &self.assignment);
            }
        }

        let mut removed = 0;
        let mut shortened = 0;
        let keys: Vec<ClauseKey> = self
            .clause_db
            .original_keys()
            .into_iter()
            .chain(self.clause_db.addition_keys())
            .collect();

        for key in keys {
            let Ok(clause) = self.clause_db.get_mut(key) else {
                continue;
            };
            match clause.simplify(&self.assignment) {
                Simplified::Keep => {}

                Simplified::Remove => {
                    if self.clause_db.remove(key).is_ok() {
                        removed += 1;
                    }
                }

                Simplified::Short => {
                    let learnt = clause.info.learnt();
                    let mut literals = Vec::with_capacity(3);
                    clause.literals(&mut literals);
                    let moved = match literals.len() {
                        2 | 3 => match Arc::get_mut(&mut self.graph) {
                            Some(graph) => {
                                match literals.len() {
                                    2 => graph.add_binary(literals[0], literals[1], learnt),
                                    _ => graph.add_ternary(literals[0], literals[1], literals[2], learnt),
                                }
                                true
                            }
                            None => false,
                        },
                        _ => false,
                    };
                    if moved && self.clause_db.remove(key).is_ok() {
                        shortened += 1;
                    }
                }
            }
        }

        self.clause_db.recount_bytes();
        self.last_simplify = self.assignment.trail().len();
        log::debug!(target: targets::CLAUSE_DB, "Simplified: {removed} removed, {shortened} moved to the graph");

        true
    }
}
