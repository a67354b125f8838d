//! A conflict-driven clause-learning satisfiability engine, with a parallel portfolio of cooperating solvers.
//!
//! shoal_sat determines the satisfiability of boolean formulas written in conjunctive normal form.
//! A single [solver](crate::solver) implements the usual conflict-driven clause-learning loop, and a [portfolio](crate::parallel) runs many solvers in parallel over one [shared context](crate::shared), splitting the search space between solvers and exchanging learnt clauses.
//!
//! # Orientation
//!
//! The library is organised around a handful of structures:
//!
//! - A [solver](crate::solver::GenericSolver), which owns an [assignment](crate::db::assignment), a [clause database](crate::db::clause), watch lists, and a (shared) [short implication graph](crate::db::implications).
//! - A [shared context](crate::shared::SharedContext), to which a formula is added once, and to which any number of solvers may be attached.
//! - A [parallel solve](crate::parallel::ParallelSolve), which runs attached solvers on OS threads.
//!
//! The algorithm for determining satisfiability is factored into a collection of [procedures] on a solver, e.g. [propagation](crate::procedures::propagate), [analysis](crate::procedures::analysis), and [search](crate::procedures::search).
//!
//! Useful starting points, then, may be:
//! - The [search procedure](crate::procedures::search) to inspect the dynamics of a solve.
//! - The [database module](crate::db) to inspect the data considered during a solve.
//! - The [parallel module](crate::parallel) to see how solvers cooperate.
//! - The [configuration](crate::config) to see what features are supported.
//!
//! # Examples
//!
//! + Solve a formula with a single solver.
//!
//! ```rust
//! # use shoal_sat::config::Config;
//! # use shoal_sat::solver::Solver;
//! # use shoal_sat::reports::Report;
//! let mut solver = Solver::from_config(Config::default());
//!
//! let [p, q] = *solver.fresh_or_max_literals(2).as_slice() else {
//!     panic!("Insufficient literals");
//! };
//!
//! assert!(solver.add_clause(vec![p, q]).is_ok());
//! assert!(solver.add_clause(vec![-p, q]).is_ok());
//! assert!(solver.add_clause(vec![p, -q]).is_ok());
//!
//! assert_eq!(solver.solve(), Ok(Report::Satisfiable));
//! assert_eq!(solver.value_of(1), Some(true));
//! assert_eq!(solver.value_of(2), Some(true));
//! ```
//!
//! + Solve a formula with a portfolio of two solvers.
//!
//! ```rust
//! # use shoal_sat::config::Config;
//! # use shoal_sat::shared::SharedContext;
//! # use shoal_sat::parallel::ParallelSolve;
//! # use shoal_sat::reports::Report;
//! let mut config = Config::default();
//! config.parallel.threads.value = 2;
//!
//! let mut ctx = SharedContext::from_config(config);
//! let [p, q] = *ctx.fresh_or_max_literals(2).as_slice() else {
//!     panic!("Insufficient literals");
//! };
//!
//! assert!(ctx.add_clause(vec![p, q]).is_ok());
//! assert!(ctx.add_clause(vec![-p, q]).is_ok());
//! assert!(ctx.add_clause(vec![p, -q]).is_ok());
//! assert!(ctx.add_clause(vec![-p, -q]).is_ok());
//! assert!(ctx.end_init().is_ok());
//!
//! let report = ParallelSolve::new(&mut ctx).solve().expect("portfolio failure");
//! assert_eq!(report.report, Report::Unsatisfiable);
//! ```
//!
//! # Memory and sharing
//!
//! The hot structures are laid out with some care:
//! - Literals are packed into a `u32`, and the head of every clause holds two watched literals and a cache literal.
//! - Binary and ternary clauses are never allocated as clauses, and live as implications in a graph shared by all solvers.
//!   Learnt short clauses are appended to the graph through lock-free blocks, see [db::implications].
//! - Long clauses may be shared physically between solvers through [reference counted literals](crate::db::clause::SharedLiterals).
//!
//! Use of unsafe is limited to the shared literal handle and the learnt blocks of the implication graph, and some reason is given for why safety is maintained.
//!
//! # Logs
//!
//! To help diagnose issues (somewhat) detailed calls to [log!](log) are made, and a variety of targets are defined in order to help narrow output to relevant parts of the library.
//! As logging is only built on request, and further can be requested by level, logs are verbose.
//!
//! The targets are lists in [misc::log].
//!
//! For example, when used with [env_logger](https://docs.rs/env_logger/latest/env_logger/):
//! - Logs related to [the clause database](crate::db::clause) can be filtered with `RUST_LOG=clause_db …` or,
//! - Logs of splits and synchronisation of a portfolio can be found with `RUST_LOG=parallel=info …`

#![allow(mixed_script_confusables)]
#![allow(unused_must_use)]
#![allow(clippy::single_match)]
#![allow(clippy::collapsible_else_if)]
#![allow(clippy::derivable_impls)]

pub mod procedures;

pub mod config;
pub mod solver;
pub mod structures;
pub mod types;

pub mod generic;

pub mod db;

pub mod heuristic;

pub mod misc;

pub mod parallel;
pub mod shared;

pub mod reports;
