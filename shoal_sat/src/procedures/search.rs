/*!
A search, bounded by some limits.

A search repeatedly propagates, resolves any conflict, and otherwise makes a decision, until:
- Every atom is assigned without conflict, and the formula is [satisfiable](SearchResult::Satisfiable).
- Some conflict is found at or below the root level, and the formula is [unsatisfiable](SearchResult::Unsatisfiable) (under the root levels).
- Some [limit](SearchLimits) is reached, and the result is [unknown](SearchResult::Unknown).
- The search is [stopped](SearchResult::Stopped), either through the [stop flag](crate::solver::GenericSolver::set_stop) of the solver or by a post-propagator.

Limits bound the count of conflicts (after which a restart is due), the count of learnt clauses and the bytes used by learnt clauses (after which a reduction is due), and the time of the search.
In addition, a dynamic restart may end the search when the recent quality of conflicts drops.

A search which ends due to a limit leaves the assignment as is, so the caller may choose to restart, reduce, or continue.
*/

use std::time::Instant;

use crate::{
    config::restart::DynamicRestart,
    misc::log::targets::{self},
    solver::{GenericSolver, PostPropagator, PostStop},
    types::err::{self},
};

/// The result of a search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchResult {
    /// Every atom is assigned, without conflict.
    Satisfiable,

    /// A conflict at or below the root level.
    Unsatisfiable,

    /// Some limit was reached.
    Unknown,

    /// The search was stopped, and the solve should end without a restart.
    Stopped,
}

/// Limits on a search.
#[derive(Clone, Debug)]
pub struct SearchLimits {
    /// The count of conflicts remaining before a restart.
    pub conflicts: u64,

    /// The count of learnt clauses at which a reduction is due.
    pub learnt: usize,

    /// A dynamic restart, if any.
    pub dynamic: Option<DynamicRestart>,

    /// The time at which the search should stop, if any.
    pub deadline: Option<Instant>,

    /// Whether to check the soft limit on bytes used by learnt clauses.
    pub check_bytes: bool,

    /// Set when the search ended as a reduction is due.
    pub reduce: bool,
}

impl Default for SearchLimits {
    fn default() -> Self {
        SearchLimits {
            conflicts: u64::MAX,
            learnt: usize::MAX,
            dynamic: None,
            deadline: None,
            check_bytes: true,
            reduce: false,
        }
    }
}

impl SearchLimits {
    /// True if the deadline, if any, has passed.
    pub fn expired(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

impl<R: rand::Rng + std::default::Default> GenericSolver<R> {
    /// Searches within the given limits, making a random decision with probability `random_prob`.
    ///
    /// For documentation, see [procedures::search](crate::procedures::search).
    pub fn search(&mut self, limits: &mut SearchLimits, random_prob: f64) -> Result<SearchResult, err::ErrorKind> {
        self.search_with(limits, random_prob, None)
    }

    /// As [search](GenericSolver::search), with `external` called after each post-propagator of the solver.
    pub fn search_with<'p>(
        &mut self,
        limits: &mut SearchLimits,
        random_prob: f64,
        mut external: Option<&mut (dyn PostPropagator<R> + 'p)>,
    ) -> Result<SearchResult, err::ErrorKind> {
        loop {
            self.counters.total_iterations += 1;

            match self.propagate_with(external.as_deref_mut()) {
                Err(PostStop::Stop) => {
                    log::debug!(target: targets::SEARCH, "Search stopped");
                    return Ok(SearchResult::Stopped);
                }

                Err(PostStop::Conflict) => {
                    if !self.resolve_conflict()? {
                        return Ok(SearchResult::Unsatisfiable);
                    }

                    limits.conflicts = limits.conflicts.saturating_sub(1);
                    if limits.conflicts == 0 {
                        return Ok(SearchResult::Unknown);
                    }

                    if let Some(dynamic) = limits.dynamic {
                        if self.counters.restart_measure.exceeded(dynamic.window, dynamic.k) {
                            log::debug!(target: targets::SEARCH, "Dynamic restart");
                            return Ok(SearchResult::Unknown);
                        }
                    }

                    if let Some(interval) = self.config.scheduler.conflict {
                        if interval > 0 && self.counters.total_conflicts % interval as usize == 0 {
                            limits.reduce = true;
                            return Ok(SearchResult::Unknown);
                        }
                    }

                    if limits.expired() {
                        return Ok(SearchResult::Unknown);
                    }
                }

                Ok(()) => {
                    if self.stopped() {
                        return Ok(SearchResult::Stopped);
                    }

                    if self.levels.decision_level() == 0
                        && self.last_simplify != self.assignment.trail().len()
                        && !self.simplify()
                    {
                        return Ok(SearchResult::Unsatisfiable);
                    }

                    if self.clause_db.learnt_count() > limits.learnt
                        || (limits.check_bytes && self.learnt_bytes_exceeded())
                    {
                        limits.reduce = true;
                        return Ok(SearchResult::Unknown);
                    }

                    if !self.decide(random_prob) {
                        return Ok(SearchResult::Satisfiable);
                    }

                    if self.counters.total_decisions % 256 == 0 && limits.expired() {
                        return Ok(SearchResult::Unknown);
                    }
                }
            }
        }
    }
}
