/*!
Propagation of assigned literals.

# Overview

Propagation takes each literal from the propagation queue of the [assignment](crate::db::assignment) and visits each clause which may become unit or conflicting as the literal is true.

For a true literal `p`:
- Binary and ternary clauses containing `-p` are visited through the [short implication graph](crate::db::implications).
- Long clauses watching `-p` are visited through the [watch lists](crate::db::watches).
  For each such clause, either some other literal is found to watch, the other watch is true, the other watch is implied, or the clause is conflicting.

Once the queue is empty, each [post-propagator](crate::solver::PostPropagator) is called in order of priority.
If some post-propagator assigns a literal, core propagation resumes before any further post-propagator is called.

On a conflict, the (true) literals of the conflict are [recorded](crate::solver::GenericSolver::conflict) on the solver and the queue is cleared.

# Forcing

A literal may be forced true with some reason, either at the current level through [force](GenericSolver::force), or at some lower level through [force_at](GenericSolver::force_at).
When forced at some lower level, the solver backjumps to the level if possible.
Otherwise, the level is below the root level and the literal is noted as [implied](crate::solver::ImpliedLiteral), to be re-asserted as levels are undone.
*/

use crate::{
    db::{clause::WatchResult, LevelIndex},
    misc::log::targets::{self},
    solver::{GenericSolver, ImpliedLiteral, PostPropagator, PostStop},
    structures::{
        antecedent::Antecedent,
        literal::{CLiteral, Literal},
    },
};

impl<R: rand::Rng + std::default::Default> GenericSolver<R> {
    /// Propagates to a fixpoint, with every post-propagator of the solver.
    ///
    /// For documentation, see [procedures::propagate](crate::procedures::propagate).
    pub fn propagate(&mut self) -> Result<(), PostStop> {
        self.propagate_with(None)
    }

    /// Propagates to a fixpoint, with every post-propagator of the solver and then `external`, if given.
    pub fn propagate_with<'p>(
        &mut self,
        mut external: Option<&mut (dyn PostPropagator<R> + 'p)>,
    ) -> Result<(), PostStop> {
        'fixpoint: loop {
            if !self.propagate_core() {
                return Err(PostStop::Conflict);
            }

            let mut posts = std::mem::take(&mut self.posts);
            for post in posts.iter_mut() {
                let result = post.propagate_fixpoint(self);
                if result.is_err() || !self.assignment.q_empty() {
                    self.posts = posts;
                    result?;
                    continue 'fixpoint;
                }
            }
            self.posts = posts;

            if let Some(post) = external.as_deref_mut() {
                post.propagate_fixpoint(self)?;
                if !self.assignment.q_empty() {
                    continue 'fixpoint;
                }
            }

            return Ok(());
        }
    }

    /// Propagates every queued literal through the short implication graph and the watch lists of long clauses.
    ///
    /// Returns false on a conflict.
    pub fn propagate_core(&mut self) -> bool {
        if self.has_conflict() {
            return false;
        }

        let dl = self.levels.decision_level();

        while let Some(p) = self.assignment.q_pop() {
            if !self.graph.propagate(p, dl, &mut self.assignment, &mut self.conflict) {
                log::trace!(target: targets::PROPAGATION, "Short conflict on {p}");
                self.assignment.q_reset();
                return false;
            }

            if !self.propagate_long(p, dl) {
                log::trace!(target: targets::PROPAGATION, "Long conflict on {p}");
                self.assignment.q_reset();
                return false;
            }
        }

        true
    }

    /// Visits every long clause watching `-p`.
    fn propagate_long(&mut self, p: CLiteral, dl: LevelIndex) -> bool {
        let mut list = self.watches.take(p);
        let mut kept = 0;

        let mut index = 0;
        while index < list.len() {
            let key = list[index];
            index += 1;

            let clause = match self.clause_db.get_mut(key) {
                Ok(clause) => clause,
                // The clause was removed, and the stale key is dropped.
                Err(_) => continue,
            };

            match clause.propagate(p, &self.assignment) {
                WatchResult::Keep => {
                    list[kept] = key;
                    kept += 1;
                }

                WatchResult::Moved(w) => self.watches.watch(w, key),

                WatchResult::Unit(q) => {
                    list[kept] = key;
                    kept += 1;
                    self.assignment.assign(q, dl, Antecedent::Clause(key));
                }

                WatchResult::Conflict => {
                    list[kept] = key;
                    kept += 1;

                    self.conflict.clear();
                    let mut literals = Vec::default();
                    clause.literals(&mut literals);
                    self.conflict.extend(literals.iter().map(|l| l.negate()));

                    while index < list.len() {
                        list[kept] = list[index];
                        kept += 1;
                        index += 1;
                    }
                    list.truncate(kept);
                    self.watches.restore(p, list);
                    return false;
                }
            }
        }

        list.truncate(kept);
        self.watches.restore(p, list);
        true
    }

    /// Forces `literal` true at the current level, with the given reason.
    ///
    /// Returns false on a conflict, which is set on the solver.
    pub fn force(&mut self, literal: CLiteral, antecedent: Antecedent) -> bool {
        self.force_with_data(literal, antecedent, crate::db::assignment::NO_DATA)
    }

    /// As [force](GenericSolver::force), noting some data with the assignment.
    pub fn force_with_data(&mut self, literal: CLiteral, antecedent: Antecedent, data: u32) -> bool {
        let dl = self.levels.decision_level();
        if self.assignment.assign_with_data(literal, dl, antecedent, data) {
            return true;
        }

        log::trace!(target: targets::PROPAGATION, "Forcing false literal {literal}");
        self.conflict.clear();
        self.conflict.push(literal.negate());
        let mut reason = Vec::default();
        if self.reason_literals_of(literal, antecedent, &mut reason) {
            self.conflict.extend(reason);
        }
        false
    }

    /// The literals of `antecedent` as the reason for `literal`.
    fn reason_literals_of(&self, literal: CLiteral, antecedent: Antecedent, out: &mut Vec<CLiteral>) -> bool {
        match antecedent {
            Antecedent::None => false,
            Antecedent::Binary(q) => {
                out.push(q);
                true
            }
            Antecedent::Ternary(q, r) => {
                out.extend([q, r]);
                true
            }
            Antecedent::Clause(key) => match self.clause_db.get(key) {
                Ok(clause) => {
                    clause.reason(literal, out);
                    true
                }
                Err(_) => false,
            },
        }
    }

    /// Forces `literal` true as implied at `level`, with the given reason.
    ///
    /// If `level` is below the current level, the solver backjumps to `level` or, if `level` is below the root level, to the root level and notes the literal as implied.
    ///
    /// Returns false on a conflict, which is set on the solver.
    pub fn force_at(&mut self, literal: CLiteral, level: LevelIndex, antecedent: Antecedent) -> bool {
        if level >= self.levels.decision_level() {
            return self.force(literal, antecedent);
        }

        let atom = literal.atom();
        if self.assignment.is_true(literal) {
            if self.assignment.level(atom) <= level {
                return true;
            }

            if let Some(x) = self.implied.iter_mut().find(|x| x.literal == literal) {
                if x.level > level {
                    x.level = level;
                    x.antecedent = antecedent;
                    self.assignment.set_reason(atom, antecedent);
                }
                return true;
            }
        }

        if !self.undo_until(level) {
            return false;
        }
        if self.levels.decision_level() == level {
            return self.force(literal, antecedent);
        }

        log::trace!(target: targets::BACKJUMP, "{literal} implied at {level}, below the root");
        self.implied.push(ImpliedLiteral {
            literal,
            level,
            antecedent,
        });

        match self.assignment.is_true(literal) {
            true => {
                self.assignment.set_reason(atom, antecedent);
                true
            }
            false => self.force_with_data(literal, antecedent, level),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        db::assignment::Assignment,
        procedures::stepped::{self, Step},
    };

    /// Panics if the clause is false, or unit, on the assignment.
    fn assert_open_or_satisfied(clause: &[CLiteral], assignment: &Assignment) {
        if clause.iter().any(|l| assignment.is_true(*l)) {
            return;
        }
        let free = clause.iter().filter(|l| assignment.is_free(**l)).count();
        assert!(free > 1, "clause {clause:?} with {free} free literals at a fixpoint");
    }

    #[test]
    fn fixpoint_leaves_no_unit_clause() {
        for seed in 0..60 {
            let formula = stepped::random_formula(seed, 12, 50);
            let Some(mut solver) = stepped::solver_with(&formula, 12, Config::default()) else {
                continue;
            };

            let mut learnt: Vec<Vec<CLiteral>> = Vec::default();
            stepped::search(&mut solver, |solver, step| match step {
                Step::Learnt(_) => learnt.push(solver.analysis.learnt.clone()),

                Step::Fixpoint => {
                    assert!(!solver.has_conflict());
                    assert!(solver.assignment.q_empty());
                    for clause in formula.iter().chain(learnt.iter()) {
                        assert_open_or_satisfied(clause, &solver.assignment);
                    }

                    let mut literals = Vec::default();
                    for clause in solver.clause_db.all_addition_clauses() {
                        literals.clear();
                        clause.literals(&mut literals);
                        assert_open_or_satisfied(&literals, &solver.assignment);
                    }
                }
            });
        }
    }

    #[test]
    fn force_at_lower_level_backjumps() {
        let formula = stepped::random_formula(0, 4, 0);
        let mut solver = stepped::solver_with(&formula, 4, Config::default()).expect("empty formula");
        let lits: Vec<CLiteral> = (1..=4).map(|atom| CLiteral::new(atom, true)).collect();

        assert!(solver.assume(lits[0]));
        assert!(solver.assume(lits[1]));
        assert!(solver.force_at(lits[2], 1, Antecedent::Binary(lits[0])));

        assert_eq!(solver.decision_level(), 1);
        assert!(solver.assignment.is_free(lits[1]));
        assert_eq!(solver.assignment.level(lits[2].atom()), 1);
        assert!(solver.implied().is_empty());
    }
}
