/*!
A portfolio of solvers, run in parallel over a [shared context](crate::shared::SharedContext).

# Overview

The master solver of the context and `threads - 1` further solvers are each run on an OS thread.
Every solver takes work, in the form of a [guiding path](guiding_path), from a shared queue and solves the formula under the path.

In [Split](crate::config::parallel::SplitMode::Split) mode the queue initially holds the single initial path.
A thread without work requests a split, and some thread with a disjoint path gives away the complement of its first decision above the root, so the threads partition the search space.
In [Compete](crate::config::parallel::SplitMode::Compete) mode every thread takes its own copy of the initial path, and threads race.

Threads communicate through the [control word](message) of the portfolio.
Each thread checks the control word whenever propagation reaches a fixpoint, through a [handler](handler) lent to the solver of the thread as a post-propagator.

Learnt clauses are exchanged through the [distributor](crate::shared::Distributor) of the context, if there is more than one thread.

# Termination

The portfolio terminates when:
- Some thread finds a model.
- Some thread finds the formula unsatisfiable at level zero.
- The search space is exhausted, i.e. every thread is without work and there is nothing to split.
- Some thread stops on a limit, e.g. a time limit, in which case the result is unknown.

# Failures

An error or panic on a thread other than the master loses the solver of the thread.
The portfolio continues without the solver, and the path of the solver is returned to the queue if no other thread holds the path.
A failure on the master terminates the portfolio, and is returned as an error.

# Example

```rust
# use shoal_sat::config::Config;
# use shoal_sat::shared::SharedContext;
# use shoal_sat::parallel::ParallelSolve;
# use shoal_sat::reports::Report;
let mut config = Config::default();
config.parallel.threads.value = 4;

let mut ctx = SharedContext::from_config(config);
let [a, b, c] = *ctx.fresh_or_max_literals(3).as_slice() else {
    panic!("Insufficient literals");
};
assert!(ctx.add_clause(vec![a, b]).is_ok());
assert!(ctx.add_clause(vec![-a, b]).is_ok());
assert!(ctx.add_clause(vec![-b, c]).is_ok());

let report = ParallelSolve::new(&mut ctx).solve().expect("portfolio failure");
assert_eq!(report.report, Report::Satisfiable);
assert!(report.errors.is_empty());

let model = report.model.expect("missing model");
assert!(model.contains(&b) && model.contains(&c));
```
*/

pub mod barrier;
pub mod guiding_path;
pub mod handler;
pub mod message;

use std::{panic::AssertUnwindSafe, sync::Arc};

use crate::{
    config::Config,
    misc::log::targets::{self},
    reports::Report,
    shared::{GlobalQueue, SharedContext},
    solver::Solver,
    structures::literal::CLiteral,
    types::err::{self, ParallelError},
};

use handler::ParallelHandler;
use message::{Message, SharedData};

/// The result of a portfolio.
#[derive(Debug, Default)]
pub struct ParallelReport {
    pub report: Report,

    /// A model, if some thread found one.
    pub model: Option<Vec<CLiteral>>,

    /// The id of the thread which terminated the portfolio, if any.
    ///
    /// A formula refuted before any thread starts is credited to the master, with id `0`.
    pub winner: Option<usize>,

    /// Failures of threads, in no particular order.
    pub errors: Vec<ParallelError>,

    /// The count of splits made across every thread.
    pub splits: usize,
}

impl ParallelReport {
    /// The report of a formula refuted by the master before any thread starts.
    fn refuted() -> Self {
        ParallelReport {
            report: Report::Unsatisfiable,
            winner: Some(0),
            ..Default::default()
        }
    }
}

/// What a thread leaves behind.
struct Outcome {
    id: usize,
    error: Option<ParallelError>,
    winner: bool,
    model: Option<Vec<CLiteral>>,
    splits: usize,
}

type WorkerSetup<'c> = Box<dyn Fn(usize, &mut Solver) + 'c>;

/// A portfolio over a shared context.
pub struct ParallelSolve<'c> {
    ctx: &'c mut SharedContext,
    initial: Vec<CLiteral>,
    worker_setup: Option<WorkerSetup<'c>>,
}

impl<'c> ParallelSolve<'c> {
    pub fn new(ctx: &'c mut SharedContext) -> Self {
        ParallelSolve {
            ctx,
            initial: Vec::default(),
            worker_setup: None,
        }
    }

    /// Solves under the given assumptions, which form the initial path of the portfolio.
    pub fn with_assumptions(mut self, assumptions: &[CLiteral]) -> Self {
        self.initial = assumptions.to_vec();
        self
    }

    /// Calls `setup` on each solver other than the master, after the solver is attached and before any thread starts.
    ///
    /// For example, to vary the heuristic of each solver, or to add a post-propagator.
    pub fn with_worker_setup(mut self, setup: impl Fn(usize, &mut Solver) + 'c) -> Self {
        self.worker_setup = Some(Box::new(setup));
        self
    }

    /// Runs the portfolio to termination.
    pub fn solve(self) -> Result<ParallelReport, err::ErrorKind> {
        let ParallelSolve {
            ctx,
            initial,
            worker_setup,
        } = self;

        let threads = ctx.config.parallel.threads.value;
        if threads == 0 {
            return Err(ParallelError::NoThreads.into());
        }

        if ctx.end_init().is_err() || ctx.unsatisfiable() {
            return Ok(ParallelReport::refuted());
        }

        if threads > 1 {
            let topology = ctx.config.parallel.topology.value;
            ctx.set_distributor(Some(Arc::new(GlobalQueue::new(threads, topology))));
        }

        let mut workers = Vec::with_capacity(threads - 1);
        for id in 1..threads {
            let mut config = ctx.config.clone();
            config.seed.value = config.seed.value.wrapping_add(id as u64);
            let mut worker = Solver::from_config(config);

            match ctx.attach(&mut worker, id) {
                Ok(()) => {}
                Err(err::ErrorKind::Build(err::BuildError::Unsatisfiable)) => {
                    ctx.forget(worker);
                    Self::release(ctx, &mut workers, &[]);
                    return Ok(ParallelReport::refuted());
                }
                Err(e) => {
                    Self::release(ctx, &mut workers, &[]);
                    return Err(e);
                }
            }

            if let Some(setup) = &worker_setup {
                setup(id, &mut worker);
            }
            workers.push(worker);
        }

        log::info!(target: targets::PARALLEL, "Starting a portfolio of {threads} threads");

        let shared = SharedData::new(threads, &ctx.config.parallel, initial);
        let master_config = ctx.config.clone();
        let master = ctx.master_mut();

        let outcomes: Vec<Outcome> = std::thread::scope(|scope| {
            let shared = &shared;
            let handles = workers
                .iter_mut()
                .map(|worker| {
                    let config = worker.config.clone();
                    scope.spawn(move || run_thread(shared, worker, &config))
                })
                .collect::<Vec<_>>();

            let mut outcomes = vec![run_thread(shared, master, &master_config)];
            for handle in handles {
                match handle.join() {
                    Ok(outcome) => outcomes.push(outcome),
                    // Unreachable, as panics are caught on the thread.
                    Err(_) => log::error!(target: targets::PARALLEL, "A thread was lost"),
                }
            }
            outcomes
        });

        let mut report = ParallelReport::default();
        let mut master_failed = false;
        let mut lost = Vec::default();
        for outcome in outcomes {
            report.splits += outcome.splits;
            if outcome.winner {
                debug_assert!(report.winner.is_none(), "the portfolio was terminated twice");
                report.winner = Some(outcome.id);
            }
            if outcome.model.is_some() {
                report.model = outcome.model;
            }
            if let Some(error) = outcome.error {
                master_failed |= outcome.id == 0;
                lost.push(outcome.id);
                report.errors.push(error);
            }
        }

        report.report = match (&report.model, shared.complete(), shared.interrupt()) {
            (Some(_), _, _) => Report::Satisfiable,
            (None, true, false) => Report::Unsatisfiable,
            _ => Report::Unknown,
        };

        Self::release(ctx, &mut workers, &lost);
        ctx.set_distributor(None);
        if !master_failed {
            ctx.master_mut().clear_assumptions();
        }

        log::info!(target: targets::PARALLEL, "Portfolio finished: {} with {} splits", report.report, report.splits);

        match master_failed {
            true => Err(ParallelError::MasterFailed.into()),
            false => Ok(report),
        }
    }

    /// Detaches each worker from the context, forgetting any worker which was lost.
    fn release(ctx: &mut SharedContext, workers: &mut Vec<Solver>, lost: &[usize]) {
        for mut worker in workers.drain(..) {
            match lost.contains(&worker.id()) {
                true => ctx.forget(worker),
                false => ctx.detach(&mut worker),
            }
        }
    }
}

/// Runs `solver` as a thread of the portfolio until the portfolio terminates, or the thread fails.
fn run_thread(shared: &SharedData, solver: &mut Solver, config: &Config) -> Outcome {
    let id = solver.id();
    let mut handler = ParallelHandler::new(shared, id, config);

    let result = std::panic::catch_unwind(AssertUnwindSafe(|| handler.run(solver)));
    let error = match result {
        Ok(Ok(())) => None,

        Ok(Err(e)) => {
            log::warn!(target: targets::PARALLEL, "Solver {id} failed: {e:?}");
            Some(ParallelError::WorkerFailed(id))
        }

        Err(_) => {
            log::warn!(target: targets::PARALLEL, "Solver {id} panicked");
            Some(ParallelError::WorkerPanicked(id))
        }
    };

    if error.is_some() {
        if id == 0 || shared.work_sem.parties() <= 1 {
            shared.post_message(Message::Interrupt, true);
        } else if let Some(work) = handler.orphaned_work() {
            shared.return_work(work);
        }
    }

    shared.work_sem.remove_party(shared.terminate());

    if error.is_none() {
        handler.clear_db(solver);
    }

    Outcome {
        id,
        error: error.map(|e| match id {
            0 => ParallelError::MasterFailed,
            _ => e,
        }),
        winner: handler.winner,
        model: handler.model.take(),
        splits: handler.splits,
    }
}
