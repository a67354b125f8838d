/*!
The handler of a solver in a portfolio.

A [ParallelHandler] is lent to its solver as a [post-propagator](crate::solver::PostPropagator) on each search, and so is called whenever propagation reaches a fixpoint.
On each call the handler:
1. Reacts to any message: stopping on termination, waiting on synchronisation, and splitting the path of the solver on a request for work.
2. Integrates clauses received from other solvers.
3. Requests a global restart, if due.

Between searches, the handler takes work for the solver from the shared queue, see [run](ParallelHandler::run).

# Integrated clauses

Clauses integrated from other solvers are held in a ring of [grace](crate::config::parallel::ParallelConfig::integrate_grace) clauses, exempt from reduction.
When a clause leaves the ring, the clause is kept as an ordinary learnt clause if the clause has been of use (i.e. is locked, or has some activity), and is otherwise removed.
*/

use crate::{
    config::{parallel::IntegrateFilter, Config},
    db::{
        clause::{creator::flags as create_flags, shared::SharedLiterals},
        ClauseKey,
    },
    generic::random::MinimalPCG32,
    misc::log::targets::{self},
    reports::Report,
    solver::{PostPropagator, PostStop, Solver, SolverState},
    structures::literal::CLiteral,
    types::err::{self},
};

use super::{
    guiding_path::{GuidingPath, PathKind, Work},
    message::{flags, Message, SharedData},
};

/// The priority of the handler, after any propagator of a solver.
pub const PRIORITY: u32 = 1024;

/// The handler of a solver in a portfolio.
pub struct ParallelHandler<'s> {
    shared: &'s SharedData,
    id: usize,

    /// The guiding path of the solver.
    pub gp: GuidingPath,

    /// The work taken from the queue, if any.
    pub work: Option<Work>,

    /// Integrated clauses held outside of the learnt clauses of the solver.
    integrated: Vec<ClauseKey>,
    int_tail: usize,
    grace: usize,

    /// Flags to integrate received clauses with.
    int_flags: u32,
    receive_batch: usize,
    batch: Vec<SharedLiterals>,

    /// An error noted during propagation.
    error: Option<err::ErrorKind>,

    /// True if the solver terminated the portfolio.
    pub winner: bool,

    /// The model found by the solver, if the winner.
    pub model: Option<Vec<CLiteral>>,

    /// A count of splits made.
    pub splits: usize,
}

impl<'s> ParallelHandler<'s> {
    /// A handler for the solver of `id` in the portfolio of `shared`.
    pub fn new(shared: &'s SharedData, id: usize, config: &Config) -> Self {
        let mut int_flags = create_flags::NO_ADD;
        match config.parallel.integrate_filter.value {
            IntegrateFilter::No => {}
            IntegrateFilter::Gp => int_flags |= create_flags::NOT_ROOT_SAT,
            IntegrateFilter::Sat => int_flags |= create_flags::NOT_ROOT_SAT | create_flags::NOT_SAT,
        }
        if config.clause_db.update_lbd.value || config.clause_db.lbd_bound.value != 0 {
            int_flags |= create_flags::INT_LBD;
        }

        ParallelHandler {
            shared,
            id,
            gp: GuidingPath::default(),
            work: None,
            integrated: Vec::default(),
            int_tail: 0,
            grace: std::cmp::max(1, config.parallel.integrate_grace.value),
            int_flags,
            receive_batch: config.parallel.receive_batch.value,
            batch: Vec::default(),
            error: None,
            winner: false,
            model: None,
            splits: 0,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Takes work from the queue and solves each path, until the portfolio terminates.
    pub fn run(&mut self, solver: &mut Solver) -> Result<(), err::ErrorKind> {
        while let Some(work) = self.request_work(solver) {
            let kind = match !work.initial || self.shared.allow_split() {
                true => PathKind::Split,
                false => PathKind::Fixed,
            };
            self.gp.reset(
                self.shared.max_conflict(),
                Some(kind),
                solver.counters.total_conflicts,
            );
            log::debug!(target: targets::PARALLEL, "Solver {} took a path of {} literals", self.id, work.literals.len());

            if !solver.assume_all(&work.literals) {
                // The path is refuted, and any conflict at level zero is found on the next request.
                solver.conflict.clear();
                self.work = Some(work);
                continue;
            }
            self.work = Some(work);

            let report = solver.solve_with(Some(&mut *self))?;
            if let Some(error) = self.error.take() {
                return Err(error);
            }

            match report {
                Report::Satisfiable => {
                    if self.terminate_with(true) {
                        self.model = solver.model();
                        log::info!(target: targets::PARALLEL, "Solver {} found a model", self.id);
                    }
                }

                Report::Unsatisfiable => {
                    if solver.state == SolverState::Unsatisfiable {
                        self.terminate_with(true);
                    }
                }

                // A search stopped by a message leaves the stop flag of the solver set.
                Report::Unknown => match solver.stopped() {
                    true => solver.clear_stop(),
                    false => {
                        self.terminate_with(false);
                    }
                },
            }
        }
        Ok(())
    }

    /// Some work, if any remains.
    fn request_work(&mut self, solver: &mut Solver) -> Option<Work> {
        self.work = None;
        while !self.shared.terminate() {
            if solver.state == SolverState::Unsatisfiable || !solver.clear_assumptions() {
                log::info!(target: targets::PARALLEL, "Solver {} found a conflict at level zero", self.id);
                self.terminate_with(true);
            } else if let Some(work) = self.shared.take_work() {
                return Some(work);
            } else if self.shared.synchronize() {
                self.shared.wait_on_sync(false);
            } else if self.shared.allow_split() {
                self.shared.post_message(Message::Split, false);
                if !self.shared.work_sem.down() && !self.shared.synchronize() {
                    // Every other thread is also without work.
                    self.terminate_with(true);
                }
            } else {
                self.terminate_with(true);
            }
        }
        None
    }

    /// Terminates the portfolio, noting the search space is exhausted if `complete`.
    ///
    /// Returns true if this call terminated the portfolio.
    fn terminate_with(&mut self, complete: bool) -> bool {
        if self.shared.terminate() || !self.shared.post_message(Message::Terminate, true) {
            return false;
        }
        self.winner = true;
        if complete {
            self.shared.set_control(flags::COMPLETE);
        }
        true
    }

    fn handle_messages(&mut self, solver: &mut Solver) -> Result<(), PostStop> {
        if !self.shared.has_message() {
            return Ok(());
        }

        if self.shared.terminate() {
            log::trace!(target: targets::PARALLEL, "Solver {} received terminate", self.id);
            solver.set_stop();
            return Err(PostStop::Stop);
        }

        if self.shared.synchronize() {
            if self.shared.wait_on_sync(self.gp.has_path()) {
                solver.set_stop();
                return Err(PostStop::Stop);
            }
            return Ok(());
        }

        if self.gp.disjoint() && solver.splittable() && self.shared.work_requests() > 0 {
            // Noted before the split, to lower the chance of one request being met by many splits.
            self.shared.about_to_split();
            let split = self.gp.split(solver);
            self.splits += 1;
            log::debug!(target: targets::PARALLEL, "Solver {} split off {} literals", self.id, split.len());
            self.shared.push_work(split);
        }
        Ok(())
    }

    /// Integrates clauses received from other solvers.
    ///
    /// Returns false on a conflict, which is set on the solver.
    fn integrate_clauses(&mut self, solver: &mut Solver) -> Result<bool, err::ErrorKind> {
        let received = match &solver.distributor {
            Some(distributor) => distributor.receive(self.id, self.receive_batch, &mut self.batch),
            None => 0,
        };
        if received == 0 {
            return Ok(true);
        }

        let mut batch = std::mem::take(&mut self.batch);
        let mut ok = true;
        for shared in batch.drain(..) {
            // Any clauses after a conflict are released as the batch drains.
            if !ok {
                continue;
            }
            let result = solver.integrate(shared, self.int_flags)?;
            if let Some(key) = result.key {
                self.add(solver, key)?;
            }
            ok = result.ok();
        }
        self.batch = batch;

        Ok(ok)
    }

    /// Adds an integrated clause to the ring of held clauses.
    fn add(&mut self, solver: &mut Solver, key: ClauseKey) -> Result<(), err::ErrorKind> {
        solver.clause_db.hold(key)?;

        if self.integrated.len() < self.grace {
            self.integrated.push(key);
        } else {
            let old = std::mem::replace(&mut self.integrated[self.int_tail], key);
            self.release(solver, old, true);
        }

        self.int_tail += 1;
        if self.int_tail >= self.grace {
            self.int_tail = 0;
        }
        Ok(())
    }

    /// Releases a held clause, keeping the clause as learnt if locked, or if `useful` and active.
    fn release(&self, solver: &mut Solver, key: ClauseKey, useful: bool) {
        let active = match solver.clause_db.get(key) {
            Ok(clause) => useful && clause.info.activity() > 0,
            Err(_) => return,
        };

        if active || !solver.remove_addition(key) {
            if let Err(e) = solver.clause_db.retire(key) {
                log::error!(target: targets::PARALLEL, "Solver {} failed to retire {key}: {e:?}", self.id);
            }
        }
    }

    /// Releases every held clause, e.g. before the solver leaves the portfolio.
    pub fn clear_db(&mut self, solver: &mut Solver) {
        let integrated = std::mem::take(&mut self.integrated);
        for key in integrated {
            self.release(solver, key, false);
        }
        self.int_tail = 0;
    }

    /// The work of a thread which has been lost, to be returned to the queue if no other thread holds the work.
    pub fn orphaned_work(&mut self) -> Option<Work> {
        match self.gp.disjoint() {
            true => self.work.take(),
            false => None,
        }
    }
}

impl PostPropagator<MinimalPCG32> for ParallelHandler<'_> {
    fn priority(&self) -> u32 {
        PRIORITY
    }

    fn propagate_fixpoint(&mut self, solver: &mut Solver) -> Result<(), PostStop> {
        self.handle_messages(solver)?;

        match self.integrate_clauses(solver) {
            Ok(true) => {}
            Ok(false) => return Err(PostStop::Conflict),
            Err(e) => {
                log::error!(target: targets::PARALLEL, "Solver {} failed to integrate: {e:?}", self.id);
                self.error = Some(e);
                return Err(PostStop::Stop);
            }
        }

        if self.gp.restart_due(solver.counters.total_conflicts) {
            self.shared.request_restart();
            self.gp.restart = self.gp.restart.saturating_mul(2);
        }

        Ok(())
    }
}
