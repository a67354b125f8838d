//! Determines the satisfiability of the formula of a solver.
//!
//! # Overview
//!
//! [solve](crate::procedures::solve) is a sequence of [searches](crate::procedures::search), each bounded by some count of conflicts, with a restart between each search.
//!
//! - The count of conflicts of each search follows the [luby](crate::generic::luby) sequence, scaled by [luby_u](crate::config::Config::luby_u).
//! - The limit on learnt clauses begins at the larger of [learnt_init](crate::config::dbs::ClauseDBConfig::learnt_init) and a [ratio](crate::config::dbs::ClauseDBConfig::learnt_ratio) of the problem clauses, and grows on each restart.
//! - A reduction is made when the limit on learnt clauses is reached, when a soft limit on the bytes of learnt clauses is exceeded (removing every candidate), and as [scheduled](crate::config::Scheduler).
//!
//! Roughly, the loop is as diagrammed:
//!
//! ```none
//!         +--------+  unknown, reduction due   +--------+
//! --+---->| search |-------------------------->| reduce |
//!   ⌃     +--------+                           +--------+
//!   |         |    ⌃                                |
//!   |         |    +--------------------------------+
//!   |         |
//!   |         +-----> satisfiable or unsatisfiable
//!   |         |
//!   |         | unknown, restart due
//!   |         ⌄
//!   |     +---------+
//!   +-----| restart |
//!         +---------+
//! ```
//!
//! A solve ends early if the solver is [stopped](crate::solver::GenericSolver::set_stop), or the [time limit](crate::config::Config::time_limit) is reached.
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
//!
//! assert!(solver.add_clause(vec![p, q]).is_ok());
//! assert!(solver.add_clause(vec![p, -q]).is_ok());
//! assert!(solver.add_clause(vec![-p, q]).is_ok());
//!
//! assert_eq!(solver.solve(), Ok(Report::Satisfiable));
//! // The clause may be found to conflict with level zero as it is added.
//! let _ = solver.add_clause(vec![-p, -q]);
//! assert_eq!(solver.solve(), Ok(Report::Unsatisfiable));
//! ```

use std::time::{Duration, Instant};

use crate::{
    misc::log::targets::{self},
    procedures::search::{SearchLimits, SearchResult},
    reports::Report,
    solver::{GenericSolver, PostPropagator, SolverState},
    types::err::{self},
};

impl<R: rand::Rng + std::default::Default> GenericSolver<R> {
    /// Determines the satisfiability of the formula of the solver, under any root levels.
    ///
    /// For documentation, see [procedures::solve](crate::procedures::solve).
    pub fn solve(&mut self) -> Result<Report, err::ErrorKind> {
        self.solve_with(None)
    }

    /// As [solve](GenericSolver::solve), with `external` called after each post-propagator of the solver.
    pub fn solve_with<'p>(
        &mut self,
        external: Option<&mut (dyn PostPropagator<R> + 'p)>,
    ) -> Result<Report, err::ErrorKind> {
        match self.state {
            SolverState::Unsatisfiable => return Ok(Report::Unsatisfiable),
            SolverState::Solving => return Err(err::StateError::SolveInProgress.into()),
            _ => {}
        }
        self.state = SolverState::Solving;

        let start = Instant::now();
        let deadline = match self.config.time_limit.value {
            limit if limit == Duration::ZERO => None,
            limit => start.checked_add(limit),
        };

        self.undo_until(self.levels.root());
        let result = self.restart_loop(deadline, external);
        self.counters.time += start.elapsed();

        let report = match result {
            Err(e) => {
                self.state = SolverState::Input;
                return Err(e);
            }

            Ok(SearchResult::Satisfiable) => {
                self.state = SolverState::Satisfiable;
                Report::Satisfiable
            }

            Ok(SearchResult::Unsatisfiable) => {
                match self.levels.root() == 0 || self.conflict_level() == 0 {
                    true => self.state = SolverState::Unsatisfiable,
                    false => self.state = SolverState::Input,
                }
                self.conflict.clear();
                Report::Unsatisfiable
            }

            Ok(SearchResult::Unknown | SearchResult::Stopped) => {
                self.state = SolverState::Input;
                Report::Unknown
            }
        };

        log::info!(target: targets::SEARCH, "Solve: {report} after {} conflicts, {} restarts", self.counters.total_conflicts, self.counters.restarts);
        Ok(report)
    }

    fn restart_loop<'p>(
        &mut self,
        deadline: Option<Instant>,
        mut external: Option<&mut (dyn PostPropagator<R> + 'p)>,
    ) -> Result<SearchResult, err::ErrorKind> {
        let db_config = self.clause_db.config.clone();
        let problem_size = self.clause_db.original_count()
            + self.graph.binary_count(false) as usize
            + self.graph.ternary_count(false) as usize;
        let mut learnt_limit = std::cmp::max(
            db_config.learnt_init.value,
            (problem_size as f64 * db_config.learnt_ratio.value) as usize,
        );
        let random_prob = self.config.random_decision_bias.value;
        let luby_u = self.config.luby_u.value as u64;

        loop {
            let conflicts = match self.config.restart.value {
                true => match self.counters.luby.next() {
                    Some(term) => (term as u64).saturating_mul(luby_u),
                    None => u64::MAX,
                },
                false => u64::MAX,
            };

            let mut limits = SearchLimits {
                conflicts,
                learnt: learnt_limit,
                dynamic: self.config.dynamic_restart,
                deadline,
                check_bytes: true,
                reduce: false,
            };

            loop {
                match self.search_with(&mut limits, random_prob, external.as_deref_mut())? {
                    SearchResult::Unknown => {}
                    done => return Ok(done),
                }

                if self.stopped() {
                    return Ok(SearchResult::Stopped);
                }
                if limits.expired() {
                    return Ok(SearchResult::Unknown);
                }

                if !limits.reduce {
                    break;
                }
                limits.reduce = false;

                let fraction = match self.learnt_bytes_exceeded() {
                    true => 1.0,
                    false => db_config.reduce_fraction.value,
                };
                self.reduce_learnts(fraction, self.reduce_strategy());

                if self.learnt_bytes_exceeded() {
                    log::info!(target: targets::REDUCTION, "Learnt clauses exceed the soft limit after a reduction");
                    limits.check_bytes = false;
                }
                if self.clause_db.learnt_count() > limits.learnt {
                    limits.learnt = (self.clause_db.learnt_count() as f64 * db_config.learnt_growth.value) as usize;
                }
            }

            self.counters.restarts += 1;
            self.counters.fresh_conflicts = 0;
            self.counters.restart_measure.reset_window();
            self.undo_until(self.levels.root());
            learnt_limit = std::cmp::max(
                learnt_limit,
                (learnt_limit as f64 * db_config.learnt_growth.value) as usize,
            );
            log::debug!(target: targets::SEARCH, "Restart {}", self.counters.restarts);

            if let Some(interval) = self.config.scheduler.luby {
                if interval > 0 && self.counters.restarts % interval as usize == 0 {
                    self.reduce_learnts(db_config.reduce_fraction.value, self.reduce_strategy());
                }
            }
        }
    }
}
