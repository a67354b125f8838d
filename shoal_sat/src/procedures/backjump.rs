//! Recovery from a conflict.
//!
//! # Overview
//!
//! A backjump is a 'jump' from some (higher) decision level to some previous (lower) decision level.
//!
//! Typically, a backjump is made from level *l* to level *l - i* because a conflict was found at level *l* and analysis produced a clause which asserts some literal at level *l - i*.
//! In this case, all decisions and all consequences of those decisions from level *l* down to level *l - i* are undone.
//!
//! A backjump never undoes the root level.
//! So, a backjump to a level below the root level is a backjump to the root level.
//!
//! # Methods
//!
//! # [undo_until](GenericSolver::undo_until) --- Undo levels
//!
//! Undoes each level above the target, and then re-asserts any [implied literal](crate::solver::ImpliedLiteral) whose implying level remains.
//! Each clause noted in the undo list of an undone level is notified, which allows [contracted](crate::db::clause::ClauseBody::Contracted) clauses to re-extend.
//!
//! # [backjump_level](GenericSolver::backjump_level) --- The backjump level of a learnt clause
//!
//! The backjump level of an asserting clause is the second highest level of the literals of the clause, or the root level if higher.
//!
//! # Example
//!
//! ```rust,ignore
//! let level = self.backjump_level(&learnt);
//! self.backjump(level);
//! ```
//!
//! # Literature
//!
//! See [Chronological Backtracking](https://doi.org/10.1007/978-3-319-94144-8_7) for a discussion of chronological and non-chronological backjumping --- and a follow-up: [Backing Backtracking](https://www.doi.org/10.1007/978-3-030-24258-9_18).

use std::cmp;

use crate::{
    db::LevelIndex,
    misc::log::targets::{self},
    solver::GenericSolver,
    structures::literal::{CLiteral, Literal},
};

impl<R: rand::Rng + std::default::Default> GenericSolver<R> {
    /// Backjumps to the given target level, or the root level if higher.
    ///
    /// For documentation, see [procedures::backjump](crate::procedures::backjump).
    ///
    /// Returns false if a conflict was found when re-asserting implied literals.
    pub fn backjump(&mut self, target: LevelIndex) -> bool {
        log::trace!(target: targets::BACKJUMP, "Backjump from {} to {target}", self.levels.decision_level());
        self.undo_until(target)
    }

    /// Undoes every level above `level`, or above the root level if higher.
    ///
    /// Returns false if a conflict was found when re-asserting implied literals.
    pub fn undo_until(&mut self, level: LevelIndex) -> bool {
        let target = cmp::max(level, self.levels.root());
        if target >= self.levels.decision_level() {
            return true;
        }

        let save_phase = self.config.phase_saving.value;

        while self.levels.decision_level() > target {
            let Some(top) = self.levels.pop() else {
                break;
            };

            for literal in &self.assignment.trail()[top.trail_start..] {
                self.heuristic.undo(literal.atom());
            }
            self.assignment.undo_trail(top.trail_start, save_phase);

            for key in &top.undo {
                if let Ok(clause) = self.clause_db.get_mut(*key) {
                    if let Some(next) = clause.undo_level(&self.assignment) {
                        self.levels.add_undo(next, *key);
                    }
                }
            }
            self.levels.recycle(top.undo);
        }

        self.conflict.clear();
        self.reassert_implied()
    }

    /// Re-asserts each implied literal whose implying level remains, and drops every other implied literal.
    fn reassert_implied(&mut self) -> bool {
        if self.implied.is_empty() {
            return true;
        }

        let dl = self.levels.decision_level();
        let mut ok = true;

        let mut implied = std::mem::take(&mut self.implied);
        implied.retain(|x| {
            if x.level > dl {
                return false;
            }
            if ok {
                ok = match x.level < dl {
                    true => self.force_with_data(x.literal, x.antecedent, x.level),
                    false => self.force(x.literal, x.antecedent),
                };
            }
            x.level < dl || x.antecedent.is_none()
        });
        self.implied = implied;

        log::trace!(target: targets::BACKJUMP, "{} implied literals kept", self.implied.len());
        ok
    }

    /// The level to backjump to after learning `clause`, whose first literal is asserting.
    ///
    /// Moves some literal of the level to the second position of the clause.
    pub fn backjump_level(&self, clause: &mut [CLiteral]) -> LevelIndex {
        let mut level = 0;
        let mut position = 1;
        for (index, literal) in clause.iter().enumerate().skip(1) {
            let literal_level = self.assignment.level(literal.atom());
            if literal_level > level {
                level = literal_level;
                position = index;
            }
        }
        if clause.len() > 1 {
            clause.swap(1, position);
        }
        cmp::max(level, self.levels.root())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        procedures::stepped::{self, Step},
        structures::antecedent::Antecedent,
    };

    #[test]
    fn learnt_clause_asserts_after_backjump() {
        for seed in 0..60 {
            let formula = stepped::random_formula(seed, 12, 52);
            let Some(mut solver) = stepped::solver_with(&formula, 12, Config::default()) else {
                continue;
            };

            stepped::search(&mut solver, |solver, step| {
                let Step::Learnt(conflict_level) = step else {
                    return;
                };
                let learnt = &solver.analysis.learnt;
                let level = solver.decision_level();
                assert!(level < conflict_level, "seed {seed}");

                let expected = learnt[1..]
                    .iter()
                    .map(|l| solver.assignment.level(l.atom()))
                    .max()
                    .unwrap_or(0);
                assert_eq!(level, expected, "seed {seed}");

                assert!(solver.assignment.is_true(learnt[0]));
                assert_eq!(solver.assignment.level(learnt[0].atom()), level);
                assert!(learnt[1..].iter().all(|l| solver.assignment.is_false(*l)));
            });
        }
    }

    #[test]
    fn trail_levels_are_ordered() {
        for seed in 0..60 {
            let formula = stepped::random_formula(seed, 12, 52);
            let Some(mut solver) = stepped::solver_with(&formula, 12, Config::default()) else {
                continue;
            };

            stepped::search(&mut solver, |solver, _| {
                let trail = solver.assignment.trail();
                assert!(trail
                    .windows(2)
                    .all(|pair| solver.assignment.level(pair[0].atom()) <= solver.assignment.level(pair[1].atom())));

                for level in 1..=solver.decision_level() {
                    let start = solver.levels.trail_start(level);
                    let decision = trail[start];
                    assert_eq!(solver.assignment.level(decision.atom()), level);
                    assert_eq!(solver.assignment.reason(decision.atom()), Antecedent::None);
                    if start > 0 {
                        assert!(solver.assignment.level(trail[start - 1].atom()) < level);
                    }
                }
            });
        }
    }

    #[test]
    fn backjump_level_moves_highest_literal() {
        let formula = stepped::random_formula(0, 6, 0);
        let mut solver = stepped::solver_with(&formula, 6, Config::default()).expect("empty formula");
        let lits: Vec<CLiteral> = (1..=6).map(|atom| CLiteral::new(atom, true)).collect();

        for literal in &lits[..4] {
            assert!(solver.assume(-*literal));
        }
        let mut clause = vec![lits[4], lits[0], lits[2], lits[1]];
        assert_eq!(solver.backjump_level(&mut clause), 3);
        assert_eq!(clause[1], lits[2]);

        let mut unit = vec![lits[5]];
        assert_eq!(solver.backjump_level(&mut unit), 0);

        assert!(solver.backjump(1));
        assert_eq!(solver.decision_level(), 1);
        assert!(solver.assignment.is_free(lits[1]));
        assert!(solver.assignment.is_false(lits[0]));
    }
}
