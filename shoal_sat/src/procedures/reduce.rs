/*!
Reduction of the learnt clauses of a solver.

# Overview

Learnt clauses accumulate during a search, and each clause slows propagation.
So, from time to time some fraction of learnt clauses are removed.

A learnt clause is a candidate for removal unless:
- The clause is locked, as the reason for some literal on the trail.
- The clause is glue, with an LBD at or below the glue bound of the [strategy](ReduceStrategy).
- The clause is held, e.g. as a recently integrated clause in a portfolio.
- The clause is the reason for some [implied literal](crate::solver::ImpliedLiteral).

Candidates are scored by the [score](ReduceScore) of the strategy, and the lowest scoring are removed, either by sorting the candidates or by a linear scan against the average score.

After a reduction the activity of every learnt clause is decayed.
*/

use crate::{
    config::reduce::{ReduceAlgorithm, ReduceScore, ReduceStrategy},
    db::{clause::ClauseHead, ClauseKey},
    misc::log::targets::{self},
    solver::GenericSolver,
    structures::antecedent::Antecedent,
};

/// The score of a clause, with lower scores removed first.
fn score(clause: &ClauseHead, score: ReduceScore) -> u32 {
    let lbd_score = 128 - std::cmp::min(clause.info.lbd() as u32, 127);
    match score {
        ReduceScore::Activity => clause.info.activity(),
        ReduceScore::Lbd => lbd_score,
        ReduceScore::Mixed => (lbd_score << 22) | clause.info.activity(),
    }
}

impl<R: rand::Rng + std::default::Default> GenericSolver<R> {
    /// The reduction strategy given by the configuration of the solver.
    pub fn reduce_strategy(&self) -> ReduceStrategy {
        ReduceStrategy {
            score: self.clause_db.config.reduce_score.value,
            algorithm: self.clause_db.config.reduce_algorithm.value,
            glue: self.clause_db.config.lbd_bound.value,
        }
    }

    /// Removes the addition clause of `key`, along with any note to restore the clause on backjumping.
    ///
    /// Returns false, without removing the clause, if the clause is locked or is the reason for some implied literal.
    pub fn remove_addition(&mut self, key: ClauseKey) -> bool {
        let contraction_level = match self.clause_db.get(key) {
            Ok(clause) if clause.locked(&self.assignment) => return false,
            Ok(clause) => clause.contraction_level(&self.assignment),
            Err(_) => return false,
        };
        if self.implied.iter().any(|x| x.antecedent == Antecedent::Clause(key)) {
            return false;
        }

        if let Some(level) = contraction_level {
            self.levels.remove_undo(level, key);
        }
        self.clause_db.remove(key).is_ok()
    }

    /// Removes (up to) `fraction` of the candidate learnt clauses, by the given strategy.
    ///
    /// Returns the count of clauses removed.
    pub fn reduce_learnts(&mut self, fraction: f64, strategy: ReduceStrategy) -> usize {
        let implied_reasons: Vec<ClauseKey> = self
            .implied
            .iter()
            .filter_map(|x| match x.antecedent {
                Antecedent::Clause(key) => Some(key),
                _ => None,
            })
            .collect();

        let mut candidates: Vec<(u32, ClauseKey)> = Vec::default();
        for key in self.clause_db.learnt_keys() {
            let Ok(clause) = self.clause_db.get(key) else {
                continue;
            };
            if clause.locked(&self.assignment)
                || (clause.info.has_lbd() && clause.info.lbd() <= strategy.glue)
                || implied_reasons.contains(&key)
            {
                continue;
            }
            candidates.push((score(clause, strategy.score), key));
        }

        let target = (candidates.len() as f64 * fraction.clamp(0.0, 1.0)) as usize;
        let doomed: Vec<ClauseKey> = match strategy.algorithm {
            ReduceAlgorithm::Sort => {
                candidates.sort_by_key(|(score, _)| *score);
                candidates.iter().take(target).map(|(_, key)| *key).collect()
            }

            ReduceAlgorithm::Linear => {
                let total: u64 = candidates.iter().map(|(score, _)| *score as u64).sum();
                let average = total / std::cmp::max(candidates.len(), 1) as u64;
                candidates
                    .iter()
                    .filter(|(score, _)| (*score as u64) < average)
                    .take(target)
                    .map(|(_, key)| *key)
                    .collect()
            }
        };

        let mut removed = 0;
        for key in doomed {
            if self.remove_addition(key) {
                removed += 1;
            }
        }

        let decay = self.clause_db.config.decay.value;
        for key in self.clause_db.addition_keys() {
            if let Ok(clause) = self.clause_db.get_mut(key) {
                clause.info.decay_activity(decay);
            }
        }

        self.counters.reductions += 1;
        log::debug!(target: targets::REDUCTION, "Reduction {}: removed {removed} of {} candidates", self.counters.reductions, candidates.len());

        removed
    }

    /// True if the learnt clauses of the solver exceed the soft limit on bytes, if any.
    pub fn learnt_bytes_exceeded(&self) -> bool {
        let limit = self.clause_db.config.max_learnt_bytes.value;
        limit > 0 && self.clause_db.learnt_bytes() > limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Config, procedures::stepped, reports::Report};

    #[test]
    fn second_reduction_removes_nothing() {
        let mut removed_total = 0;

        for seed in 0..30 {
            let formula = stepped::random_formula(seed, 16, 70);
            let Some(mut solver) = stepped::solver_with(&formula, 16, Config::default()) else {
                continue;
            };
            let satisfiable = stepped::search(&mut solver, |_, _| {});

            let strategy = ReduceStrategy {
                algorithm: ReduceAlgorithm::Sort,
                ..solver.reduce_strategy()
            };
            removed_total += solver.reduce_learnts(1.0, strategy);
            assert_eq!(solver.reduce_learnts(1.0, strategy), 0, "seed {seed}");

            for key in solver.clause_db.learnt_keys() {
                let clause = solver.clause_db.get(key).expect("learnt clause");
                assert!(clause.locked(&solver.assignment) || clause.info.lbd() <= strategy.glue);
            }

            let expected = match satisfiable {
                true => Report::Satisfiable,
                false => Report::Unsatisfiable,
            };
            assert_eq!(solver.solve().expect("solve"), expected, "seed {seed}");
        }

        assert!(removed_total > 0);
    }

    #[test]
    fn nothing_to_reduce() {
        let formula = stepped::random_formula(1, 8, 10);
        let mut solver = stepped::solver_with(&formula, 8, Config::default()).expect("satisfiable");
        let strategy = solver.reduce_strategy();
        assert_eq!(solver.reduce_learnts(1.0, strategy), 0);
        assert_eq!(solver.counters.reductions, 1);
    }
}
