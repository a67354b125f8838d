//! Assumptions and root levels.
//!
//! # Overview
//!
//! The root level of a solver is the highest level which search never undoes.
//! Levels at or below the root level hold assumptions, e.g. given to a solve, or the [guiding path](crate::parallel::guiding_path) of a solver in a portfolio.
//!
//! Assumptions are made through [assume](GenericSolver::assume) and propagated, after which the levels of the assumptions are made part of the root through [push_root_level](GenericSolver::push_root_level).
//!
//! A conflict at or below the root level shows the formula is unsatisfiable under the assumptions, and so a solve under assumptions may be unsatisfiable without the formula being unsatisfiable.
//!
//! # Example
//!
//! ```rust
//! # use shoal_sat::solver::Solver;
//! # use shoal_sat::config::Config;
//! # use shoal_sat::reports::Report;
//! let mut solver = Solver::from_config(Config::default());
//! let [p, q] = *solver.fresh_or_max_literals(2).as_slice() else {
//!     panic!("Insufficient literals");
//! };
//! assert!(solver.add_clause(vec![-p, q]).is_ok());
//!
//! assert_eq!(solver.solve_given(&[p, -q]), Ok(Report::Unsatisfiable));
//! assert_eq!(solver.solve_given(&[p]), Ok(Report::Satisfiable));
//! assert_eq!(solver.value_of(2), Some(true));
//! ```

use crate::{
    db::LevelIndex,
    misc::log::targets::{self},
    reports::Report,
    solver::{GenericSolver, SolverState},
    structures::literal::{CLiteral, Literal},
    types::err::{self},
};

impl<R: rand::Rng + std::default::Default> GenericSolver<R> {
    /// Raises the root level by `count` levels, bounded by the current decision level.
    pub fn push_root_level(&mut self, count: LevelIndex) {
        let root = std::cmp::min(
            self.levels.decision_level(),
            self.levels.root().saturating_add(count),
        );
        self.levels.set_root(root);
        log::trace!(target: targets::BACKJUMP, "Root level raised to {root}");
    }

    /// Lowers the root level by `count` levels, bounded by zero.
    ///
    /// No level is undone, though levels above the new root may be undone by a backjump.
    pub fn pop_root_level(&mut self, count: LevelIndex) {
        let root = self.levels.root() - std::cmp::min(count, self.levels.root());
        self.levels.set_root(root);
        log::trace!(target: targets::BACKJUMP, "Root level lowered to {root}");
    }

    /// Removes every assumption, returning to level zero.
    ///
    /// Returns false if the formula is found to be unsatisfiable at level zero.
    pub fn clear_assumptions(&mut self) -> bool {
        self.pop_root_level(self.levels.root());
        self.undo_until(0) && self.propagate().is_ok() && self.simplify()
    }

    /// Assumes each of `assumptions` and propagates, making each assumption part of the root.
    ///
    /// Returns false if some assumption is false, or propagation of the assumptions leads to a conflict.
    pub fn assume_all(&mut self, assumptions: &[CLiteral]) -> bool {
        for assumption in assumptions {
            if !self.assume(*assumption) || self.propagate().is_err() {
                log::debug!(target: targets::SEARCH, "Assumption {assumption} conflicts");
                return false;
            }
            self.push_root_level(self.levels.decision_level());
        }
        true
    }

    /// Solves under the given assumptions.
    ///
    /// Any previous assumptions are cleared first.
    /// If the formula is unsatisfiable under the assumptions, the formula itself may be satisfiable, and the state of the solver remains as before.
    pub fn solve_given(&mut self, assumptions: &[CLiteral]) -> Result<Report, err::ErrorKind> {
        if self.state == SolverState::Unsatisfiable {
            return Ok(Report::Unsatisfiable);
        }
        if !self.clear_assumptions() {
            self.state = SolverState::Unsatisfiable;
            return Ok(Report::Unsatisfiable);
        }

        if !self.assume_all(assumptions) {
            self.conflict.clear();
            return Ok(Report::Unsatisfiable);
        }

        self.solve()
    }

    /// True if the solver has some decision above the root level, and so some part of the search space may be given to some other solver.
    pub fn splittable(&self) -> bool {
        self.levels.decision_level() > self.levels.root()
    }

    /// Extends `path` with the literals of the root region of the trail from `start`, and updates `start` to the end of the root region.
    ///
    /// The literals added are the decisions of levels up to the root level, and each literal implied below the level of the literal.
    /// `implied` is increased by the count of implied literals added.
    ///
    /// Returns true if some literal was added.
    pub fn update_guiding_path(&self, path: &mut Vec<CLiteral>, start: &mut usize, implied: &mut u32) -> bool {
        let root = self.levels.root();
        let end = match root < self.levels.decision_level() {
            true => self.levels.trail_start(root + 1),
            false => self.assignment.trail().len(),
        };
        if *start > end {
            *start = 0;
        }

        let before = path.len();
        for (position, literal) in self.assignment.trail()[*start..end].iter().enumerate() {
            let atom = literal.atom();
            let level = self.assignment.level(atom);
            if level == 0 {
                continue;
            }

            if self.levels.trail_start(level) == *start + position {
                path.push(*literal);
            } else if self.assignment.data(atom).is_some_and(|implied_at| implied_at < level) {
                path.push(*literal);
                *implied += 1;
            }
        }
        *start = end;

        path.len() > before
    }
}
