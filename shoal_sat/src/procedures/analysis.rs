/*!
Analysis of a conflict.

Takes the (true) literals of a conflict on the current assignment and derives an asserting clause by resolution.

In other words, conflict analysis repeatedly resolves the conflict with the reason of the most recently assigned literal of the conflict level, until a single literal of the conflict level remains: the first unique implication point (UIP).
The clause learnt is the negation of the UIP together with the negation of each literal from a lower level.

Literals assigned at level zero are never part of a learnt clause, as the literals hold regardless of any decision.

After resolution, the clause is [minimized](MinimizationCriteria) by removing literals implied by other literals of the clause, and the LBD of the clause is the count of distinct levels of the literals of the clause.

As each reason is used, the reason is passed to the [heuristic](crate::heuristic::DecisionHeuristic::update_reason), and the activity of a learnt clause used as a reason is bumped.

For the methods, see: [resolve_conflict](GenericSolver::resolve_conflict) and [analyze_conflict](GenericSolver::analyze_conflict).

# Example

```rust, ignore
match self.resolve_conflict()? {
    true => {} // Backjumped, with the learnt clause asserting.
    false => return Ok(SearchResult::Unsatisfiable),
}
```
*/

use crate::{
    config::{minimization_criteria::MinimizationCriteria, vsids::VSIDS},
    db::{
        assignment::{marks, Assignment},
        clause::{creator::flags, ClauseInfo, ClauseKind},
        LevelIndex,
    },
    misc::log::targets::{self},
    solver::GenericSolver,
    structures::{
        antecedent::Antecedent,
        atom::Atom,
        literal::{CLiteral, Literal},
    },
    types::err::{self},
};

/// Counts the distinct levels of the assigned literals of `literals`.
///
/// Each level is stamped on first sight, so no clearing is required between counts.
pub(crate) fn count_levels(
    assignment: &Assignment,
    stamps: &mut Vec<u32>,
    stamp: &mut u32,
    literals: &[CLiteral],
) -> u32 {
    if *stamp == u32::MAX {
        stamps.iter_mut().for_each(|s| *s = 0);
        *stamp = 0;
    }
    *stamp += 1;

    let mut count = 0;
    for literal in literals {
        if assignment.is_free(*literal) {
            continue;
        }
        let level = assignment.level(literal.atom()) as usize;
        if stamps.len() <= level {
            stamps.resize(level + 1, 0);
        }
        if stamps[level] != *stamp {
            stamps[level] = *stamp;
            count += 1;
        }
    }
    count
}

impl<R: rand::Rng + std::default::Default> GenericSolver<R> {
    /// Resolves the current conflict.
    ///
    /// Returns Ok(true) if a clause was learnt and the solver has backjumped to the level at which the clause asserts some literal.
    /// Returns Ok(false) if the conflict is at or below the root level, and so cannot be resolved.
    pub fn resolve_conflict(&mut self) -> Result<bool, err::ErrorKind> {
        if !self.has_conflict() {
            return Err(err::AnalysisError::NoConflict.into());
        }

        self.counters.total_conflicts += 1;
        self.counters.fresh_conflicts += 1;

        loop {
            let conflict_level = self
                .conflict
                .iter()
                .map(|l| self.assignment.level(l.atom()))
                .max()
                .unwrap_or(0);

            if conflict_level <= self.levels.root() {
                log::debug!(target: targets::ANALYSIS, "Conflict at level {conflict_level}, at or below the root");
                return Ok(false);
            }

            // A conflict may be found below the current level, e.g. on integration of a clause.
            if conflict_level < self.levels.decision_level() {
                let conflict = std::mem::take(&mut self.conflict);
                match self.undo_until(conflict_level) {
                    true => self.conflict = conflict,
                    false => continue,
                }
            }

            let lbd = self.analyze_conflict()?;

            if let Some(dynamic) = self.config.dynamic_restart {
                let measure = match dynamic.measure {
                    crate::config::restart::RestartMeasure::Lbd => lbd,
                    crate::config::restart::RestartMeasure::ConflictLevel => conflict_level,
                };
                self.counters.restart_measure.record(measure, dynamic.window);
            }

            let mut learnt = std::mem::take(&mut self.analysis.learnt);
            let level = self.backjump_level(&mut learnt);
            log::trace!(target: targets::ANALYSIS, "Learnt {} literals, lbd {lbd}, asserting at {level}", learnt.len());

            if !self.backjump(level) {
                self.analysis.learnt = learnt;
                continue;
            }

            let mut info = ClauseInfo::new(ClauseKind::Conflict);
            info.set_lbd(lbd);
            let result = self.create(&learnt, info, flags::KNOWN_ORDER | flags::NOT_SAT | flags::NOT_CONFLICT);
            self.analysis.learnt = learnt;
            result?;

            self.heuristic.decay();
            return Ok(true);
        }
    }

    /// Derives an asserting clause from the current conflict, which must be at the current decision level.
    ///
    /// The clause is left in the analysis buffer of the solver, with the asserting literal first, and the LBD of the clause is returned.
    pub fn analyze_conflict(&mut self) -> Result<u32, err::AnalysisError> {
        if !self.has_conflict() {
            return Err(err::AnalysisError::NoConflict);
        }

        let dl = self.levels.decision_level();
        let mut buffers = std::mem::take(&mut self.analysis);
        buffers.learnt.clear();
        buffers.learnt.push(CLiteral::FALSE);
        buffers.marked.clear();
        buffers.bump.clear();

        buffers.reason.clear();
        buffers.reason.extend_from_slice(&self.conflict);
        self.heuristic.update_reason(&buffers.reason, CLiteral::TRUE);

        let mut path = 0;
        let mut trail_index = self.assignment.trail().len();

        let uip = loop {
            for q in &buffers.reason {
                let atom = q.atom();
                let level = self.assignment.level(atom);
                if level == 0 || self.assignment.marked(atom, marks::SEEN) {
                    continue;
                }

                self.assignment.mark(atom, marks::SEEN);
                buffers.marked.push(atom);
                if self.config.vsids_variant.value == VSIDS::MiniSAT {
                    buffers.bump.push(atom);
                }

                match level == dl {
                    true => path += 1,
                    false => buffers.learnt.push(q.negate()),
                }
            }

            if path == 0 {
                self.analysis = buffers;
                self.clear_analysis_marks();
                return Err(err::AnalysisError::NoAssertion);
            }

            let p = loop {
                if trail_index == 0 {
                    self.analysis = buffers;
                    self.clear_analysis_marks();
                    return Err(err::AnalysisError::NoAssertion);
                }
                trail_index -= 1;
                let p = self.assignment.trail()[trail_index];
                if self.assignment.marked(p.atom(), marks::SEEN) {
                    break p;
                }
            };

            if path <= 1 {
                break p;
            }
            path -= 1;
            self.assignment.clear_marks(p.atom());

            buffers.reason.clear();
            if !self.reason_literals(p, &mut buffers.reason) {
                self.analysis = buffers;
                self.clear_analysis_marks();
                return Err(err::AnalysisError::NoAssertion);
            }
            self.heuristic.update_reason(&buffers.reason, p);
            self.update_learnt_reason(p, &buffers.reason);
        };

        buffers.learnt[0] = uip.negate();
        self.analysis = buffers;

        match self.config.minimization.value {
            MinimizationCriteria::None => {}
            MinimizationCriteria::Local => self.minimize(false),
            MinimizationCriteria::Recursive => self.minimize(true),
        }

        let mut buffers = std::mem::take(&mut self.analysis);
        if self.config.vsids_variant.value == VSIDS::Chaff {
            buffers.bump.extend(buffers.learnt.iter().map(|l| l.atom()));
        }
        self.heuristic.bump(&buffers.bump);

        let lbd = count_levels(
            &self.assignment,
            &mut buffers.level_stamps,
            &mut buffers.stamp,
            &buffers.learnt,
        );
        self.analysis = buffers;
        self.clear_analysis_marks();

        Ok(lbd)
    }

    /// Bumps the activity of a learnt clause used as the reason for `p`, and revises the LBD of the clause if lower.
    fn update_learnt_reason(&mut self, p: CLiteral, reason: &[CLiteral]) {
        let Antecedent::Clause(key) = self.assignment.reason(p.atom()) else {
            return;
        };
        if !key.is_addition() {
            return;
        }

        let bump = self.clause_db.config.bump.value;
        let update_lbd = self.clause_db.config.update_lbd.value;
        let lbd = match update_lbd {
            true => {
                let mut stamps = std::mem::take(&mut self.analysis.level_stamps);
                let mut stamp = self.analysis.stamp;
                let mut literals = Vec::with_capacity(reason.len() + 1);
                literals.push(p);
                literals.extend_from_slice(reason);
                let lbd = count_levels(&self.assignment, &mut stamps, &mut stamp, &literals);
                self.analysis.level_stamps = stamps;
                self.analysis.stamp = stamp;
                Some(lbd)
            }
            false => None,
        };

        if let Ok(clause) = self.clause_db.get_mut(key) {
            clause.info.bump_activity(bump);
            if let Some(lbd) = lbd {
                if lbd < clause.info.lbd() as u32 {
                    clause.info.set_lbd(lbd);
                }
            }
        }
    }

    /// Removes literals implied by other literals from the learnt clause in the analysis buffer.
    ///
    /// If `recursive`, a literal is removed if implied through any chain of reasons ending in literals of the clause (or level zero).
    /// Otherwise, a literal is removed only if each literal of the reason is in the clause (or at level zero).
    fn minimize(&mut self, recursive: bool) {
        let mut learnt = std::mem::take(&mut self.analysis.learnt);
        let before = learnt.len();

        let mut kept = 1;
        for index in 1..learnt.len() {
            let q = learnt[index];
            let removable = match recursive {
                true => self.removable(q.atom()),
                false => self.locally_removable(q.atom()),
            };
            if !removable {
                learnt[kept] = q;
                kept += 1;
            }
        }
        learnt.truncate(kept);

        log::trace!(target: targets::ANALYSIS, "Minimized {} literals", before - learnt.len());
        self.analysis.learnt = learnt;
    }

    /// True if the reason of `atom` consists of literals of the learnt clause (or level zero).
    fn locally_removable(&mut self, atom: Atom) -> bool {
        let mut reason = Vec::default();
        let literal = CLiteral::new(atom, self.assignment.value_of(atom).as_bool().unwrap_or(true));
        if !self.reason_literals(literal, &mut reason) {
            return false;
        }
        reason.iter().all(|r| {
            self.assignment.level(r.atom()) == 0 || self.assignment.marked(r.atom(), marks::SEEN)
        })
    }

    /// True if `atom` is implied by literals of the learnt clause (or level zero), through some chain of reasons.
    ///
    /// Atoms found to be removable, or not, are marked to avoid repeated work.
    fn removable(&mut self, atom: Atom) -> bool {
        let Some(reason) = self.reason_of_atom(atom) else {
            return false;
        };

        let mut frames: Vec<(Atom, Vec<CLiteral>, usize)> = vec![(atom, reason, 0)];

        while let Some((frame_atom, reason, index)) = frames.last_mut() {
            if *index == reason.len() {
                let done = *frame_atom;
                frames.pop();
                if done != atom {
                    self.assignment.mark(done, marks::REMOVABLE);
                    self.analysis.marked.push(done);
                }
                continue;
            }

            let r = reason[*index];
            *index += 1;

            let r_atom = r.atom();
            if self.assignment.level(r_atom) == 0
                || self.assignment.marked(r_atom, marks::SEEN | marks::REMOVABLE)
            {
                continue;
            }

            let next = match self.assignment.marked(r_atom, marks::POISON) {
                true => None,
                false => self.reason_of_atom(r_atom),
            };

            match next {
                Some(next) => frames.push((r_atom, next, 0)),
                None => {
                    for (poisoned, _, _) in frames.iter().skip(1) {
                        self.assignment.mark(*poisoned, marks::POISON);
                        self.analysis.marked.push(*poisoned);
                    }
                    self.assignment.mark(r_atom, marks::POISON);
                    self.analysis.marked.push(r_atom);
                    return false;
                }
            }
        }

        true
    }

    /// The reason for the value of `atom`, as (true) literals, if any.
    fn reason_of_atom(&self, atom: Atom) -> Option<Vec<CLiteral>> {
        let literal = CLiteral::new(atom, self.assignment.value_of(atom).as_bool()?);
        let mut reason = Vec::default();
        match self.reason_literals(literal, &mut reason) {
            true => Some(reason),
            false => None,
        }
    }

    /// Clears each mark made during analysis.
    fn clear_analysis_marks(&mut self) {
        for atom in &self.analysis.marked {
            self.assignment.clear_marks(*atom);
        }
        self.analysis.marked.clear();
    }

    /// The level of the highest literal of the current conflict.
    pub fn conflict_level(&self) -> LevelIndex {
        self.conflict
            .iter()
            .map(|l| self.assignment.level(l.atom()))
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        procedures::stepped::{self, Step},
    };

    #[test]
    fn learnt_clauses_hold_in_every_model() {
        for criteria in [
            MinimizationCriteria::None,
            MinimizationCriteria::Local,
            MinimizationCriteria::Recursive,
        ] {
            for seed in 0..40 {
                let formula = stepped::random_formula(seed, 10, 44);
                let models = stepped::models(&formula, 10);

                let mut config = Config::default();
                config.minimization.value = criteria;
                let Some(mut solver) = stepped::solver_with(&formula, 10, config) else {
                    assert!(models.is_empty());
                    continue;
                };

                let satisfiable = stepped::search(&mut solver, |solver, step| {
                    if let Step::Learnt(_) = step {
                        let learnt = &solver.analysis.learnt;
                        for model in &models {
                            assert!(
                                stepped::satisfied(learnt, model),
                                "learnt {learnt:?} excludes a model, seed {seed}"
                            );
                        }
                    }
                });

                assert_eq!(satisfiable, !models.is_empty(), "seed {seed}");
            }
        }
    }

    #[test]
    fn no_conflict_no_analysis() {
        let formula = stepped::random_formula(3, 6, 4);
        let mut solver = stepped::solver_with(&formula, 6, Config::default()).expect("satisfiable");
        assert!(matches!(
            solver.analyze_conflict(),
            Err(err::AnalysisError::NoConflict)
        ));
    }
}
