//! Various procedures for mutating a solver.
//!
//! For the most part these are methods accessed via a solver, and primarily placed here for documentation.
//!
//! Roughly, from the bottom up:
//! - [propagate] and [backjump] maintain the assignment.
//! - [analysis] learns a clause from a conflict, and [integrate] adds clauses (given, learnt, or received) to a solver.
//! - [decision] and [assumptions] extend the assignment, and manage the root level.
//! - [simplify] and [reduce] keep the clause database small.
//! - [search] and [solve] tie the above together.

pub mod analysis;
pub mod assumptions;
pub mod backjump;
pub mod decision;
pub mod integrate;
pub mod propagate;
pub mod reduce;
pub mod search;
pub mod simplify;
pub mod solve;

/// Small formulas, and a search driven one step at a time, for checks on the state of a solver between steps.
#[cfg(test)]
pub(crate) mod stepped {
    use rand::{Rng, SeedableRng};

    use crate::{
        config::Config,
        db::LevelIndex,
        generic::random::MinimalPCG32,
        solver::{PostStop, Solver},
        structures::literal::{CLiteral, Literal},
    };

    pub type Formula = Vec<Vec<CLiteral>>;

    /// What the search has just done.
    pub enum Step {
        /// Propagation reached a fixpoint without a conflict.
        Fixpoint,

        /// A conflict at the given level was resolved, with the learnt clause in the analysis buffer.
        Learnt(LevelIndex),
    }

    /// A random 3-SAT formula over the atoms `1..=atoms`.
    pub fn random_formula(seed: u64, atoms: usize, clauses: usize) -> Formula {
        let mut rng = MinimalPCG32::from_seed(seed.to_le_bytes());
        (0..clauses)
            .map(|_| {
                let mut clause: Vec<CLiteral> = Vec::with_capacity(3);
                while clause.len() < 3 {
                    let atom = rng.random_range(1..=atoms) as u32;
                    if clause.iter().any(|l| l.atom() == atom) {
                        continue;
                    }
                    clause.push(CLiteral::new(atom, rng.random_bool(0.5)));
                }
                clause
            })
            .collect()
    }

    /// Every model of the formula, each indexed by atom.
    pub fn models(formula: &Formula, atoms: usize) -> Vec<Vec<bool>> {
        (0_u32..(1 << atoms))
            .map(|bits| {
                let mut model = vec![true];
                model.extend((0..atoms).map(|atom| bits & (1 << atom) != 0));
                model
            })
            .filter(|model| formula.iter().all(|clause| satisfied(clause, model)))
            .collect()
    }

    pub fn satisfied(clause: &[CLiteral], model: &[bool]) -> bool {
        clause.iter().any(|l| model[l.atom() as usize] == l.polarity())
    }

    /// A solver with the formula added, or None if the formula was found unsatisfiable as clauses were added.
    pub fn solver_with(formula: &Formula, atoms: usize, config: Config) -> Option<Solver> {
        let mut solver = Solver::from_config(config);
        solver.fresh_or_max_literals(atoms);
        for clause in formula {
            if solver.add_clause(clause.clone()).is_err() {
                return None;
            }
        }
        Some(solver)
    }

    /// Searches without restarts or reductions, calling `check` after each step.
    ///
    /// Returns true if the formula is satisfiable.
    pub fn search(solver: &mut Solver, mut check: impl FnMut(&Solver, Step)) -> bool {
        loop {
            match solver.propagate() {
                Ok(()) => {
                    check(solver, Step::Fixpoint);
                    if !solver.decide(0.0) {
                        return true;
                    }
                }

                Err(PostStop::Conflict) => {
                    let conflict_level = solver.conflict_level();
                    match solver.resolve_conflict() {
                        Ok(true) => check(solver, Step::Learnt(conflict_level)),
                        Ok(false) => return false,
                        Err(e) => panic!("{e:?}"),
                    }
                }

                Err(PostStop::Stop) => panic!("stopped without a stop request"),
            }
        }
    }
}
