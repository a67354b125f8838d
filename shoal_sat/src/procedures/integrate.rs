/*!
The creation and integration of clauses.

# Creation

[create](GenericSolver::create) adds a clause to a solver, whether a problem clause or a clause learnt by the solver:
- The status of the clause is determined by the [level abstraction](crate::db::clause::creator) of the preferred watches.
- Subsumed clauses are ignored, as are conflicting clauses when requested by [flags].
- Clauses of at most three literals are added to the [short implication graph](crate::db::implications), unless the clause is tagged or [explicit](flags::EXPLICIT).
- Learnt clauses are [distributed](crate::shared::Distributor) before being stored, and a long distributed clause may share the literals given to other solvers.
- A learnt clause whose second literal is false may be stored [contracted](crate::db::clause::ClauseBody::Contracted), if long enough.
- If the clause is unit, the first literal is forced at the level of the second literal.

# Integration

[integrate](GenericSolver::integrate) adds a clause received from some other solver, in the form of [SharedLiterals].

The clause is always treated as learnt, and short clauses are assumed to have been added to the (shared) implication graph by the sender.
So, a short clause is only checked for being unit or conflicting.

# Input

[add_clause](GenericSolver::add_clause) adds a problem clause from some external source.
The clause is first simplified against the assignment at level zero.
*/

use std::sync::Arc;

use crate::{
    db::{
        clause::{
            creator::{self, flags, ClauseStatus, WatchSelection},
            ClauseHead, ClauseInfo, ClauseKind, SharedLiterals, MAX_SHORT_LEN,
        },
        ClauseKey,
    },
    misc::log::targets::{self},
    solver::{GenericSolver, SolverState},
    structures::{
        antecedent::Antecedent,
        clause::Clause,
        literal::{CLiteral, Literal},
    },
    types::err::{self},
};

use super::analysis::count_levels;

/// The result of creating or integrating a clause.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClauseResult {
    /// The status of the clause on creation.
    ///
    /// A unit clause whose first literal could not be forced is conflicting.
    pub status: ClauseStatus,

    /// The key of the clause in the clause database, if stored.
    pub key: Option<ClauseKey>,
}

impl ClauseResult {
    /// True unless the clause was found to be conflicting or empty.
    pub fn ok(&self) -> bool {
        !matches!(self.status, ClauseStatus::Conflicting | ClauseStatus::Empty)
    }
}

impl<R: rand::Rng + std::default::Default> GenericSolver<R> {
    /// Adds a problem clause.
    ///
    /// The clause is simplified against the assignment at level zero: tautologies and satisfied clauses are ignored, and false literals are removed.
    /// Any assumptions are cleared.
    ///
    /// Returns an error if the clause is empty after simplification, or if adding the clause leads to a conflict at level zero.
    pub fn add_clause(&mut self, clause: impl Clause) -> Result<(), err::ErrorKind> {
        match self.state {
            SolverState::Solving => return Err(err::StateError::SolveInProgress.into()),
            SolverState::Unsatisfiable => return Err(err::BuildError::Unsatisfiable.into()),
            _ => {}
        }

        if self.levels.decision_level() > 0 {
            self.clear_assumptions();
        }
        self.state = SolverState::Input;

        let mut literals = clause.canonical();
        if literals
            .iter()
            .any(|l| l.atom() as usize >= self.assignment.atom_count())
        {
            return Err(err::AtomError::Unknown.into());
        }

        literals.sort_unstable();
        literals.dedup();
        if literals.windows(2).any(|pair| pair[0].atom() == pair[1].atom()) {
            log::trace!(target: targets::CLAUSE_DB, "Tautology ignored");
            return Ok(());
        }
        if literals.iter().any(|l| self.assignment.is_true(*l)) {
            return Ok(());
        }
        literals.retain(|l| !self.assignment.is_false(*l));

        if literals.is_empty() {
            self.state = SolverState::Unsatisfiable;
            return Err(err::BuildError::Unsatisfiable.into());
        }

        let result = self.create(&literals, ClauseInfo::new(ClauseKind::Static), 0)?;
        if !result.ok() || self.propagate().is_err() {
            self.state = SolverState::Unsatisfiable;
            return Err(err::BuildError::Unsatisfiable.into());
        }

        Ok(())
    }

    /// Ends the input of problem clauses, propagating and simplifying at level zero.
    ///
    /// Returns an error if the formula is unsatisfiable at level zero.
    pub fn end_init(&mut self) -> Result<(), err::ErrorKind> {
        if self.state == SolverState::Unsatisfiable {
            return Err(err::BuildError::Unsatisfiable.into());
        }
        if self.propagate().is_err() || !self.simplify() {
            self.state = SolverState::Unsatisfiable;
            return Err(err::BuildError::Unsatisfiable.into());
        }
        if self.state == SolverState::Configuration {
            self.state = SolverState::Input;
        }
        Ok(())
    }

    /// Adds a problem clause copied from some other solver, sharing the literals of the clause if given as [SharedLiterals].
    ///
    /// The clause is simplified against the assignment at level zero, and shared literals are only used as given if no literal is assigned.
    pub(crate) fn add_copied(
        &mut self,
        literals: &[CLiteral],
        shared: Option<SharedLiterals>,
    ) -> Result<(), err::ErrorKind> {
        if literals.iter().any(|l| self.assignment.is_true(*l)) {
            return Ok(());
        }

        let free: Vec<CLiteral> = literals
            .iter()
            .filter(|l| !self.assignment.is_false(**l))
            .copied()
            .collect();

        match shared {
            Some(shared) if free.len() == literals.len() && free.len() > MAX_SHORT_LEN => {
                self.heuristic.new_constraint(&free, ClauseKind::Static);
                let info = ClauseInfo::new(ClauseKind::Static);
                let head = [free[0], free[1], free[2]];
                let key = self
                    .clause_db
                    .store(false, |key| ClauseHead::shared(key, shared, head, info))?;
                self.watches.watch(free[0], key);
                self.watches.watch(free[1], key);
                Ok(())
            }

            _ => match self.create(&free, ClauseInfo::new(ClauseKind::Static), 0)?.ok() {
                true => Ok(()),
                false => Err(err::BuildError::Unsatisfiable.into()),
            },
        }
    }

    /// Creates a clause from `literals` with the given info.
    ///
    /// For documentation, see [procedures::integrate](crate::procedures::integrate).
    pub fn create(
        &mut self,
        literals: &[CLiteral],
        mut info: ClauseInfo,
        flags: u32,
    ) -> Result<ClauseResult, err::ErrorKind> {
        let dl = self.levels.decision_level();
        let root = self.levels.root();

        let mut lits = literals.to_vec();
        let known_order = flags & flags::KNOWN_ORDER != 0;
        let selection = match lits.len() {
            0 => {
                return Ok(ClauseResult {
                    status: ClauseStatus::Empty,
                    key: None,
                })
            }
            1 => WatchSelection::of_slice(&self.assignment, dl, &lits, known_order),
            _ => WatchSelection::order(&self.assignment, dl, &mut lits, known_order),
        };

        let mut status = creator::status_with_flags(&self.assignment, dl, root, &selection, flags);
        match status {
            ClauseStatus::Subsumed | ClauseStatus::Conflicting | ClauseStatus::Empty => {
                return Ok(ClauseResult { status, key: None })
            }
            _ => {}
        }

        self.heuristic.new_constraint(&lits, info.kind());

        let tagged = self.tag.is_some_and(|tag| lits.contains(&tag.negate()));
        info.set_tagged(tagged);

        let size = lits.len();
        let mut key = None;
        if (flags & flags::NO_ADD == 0 || size > 3) && size > 1 {
            let long = size > 3 || flags & flags::EXPLICIT != 0 || tagged;
            match long {
                true => key = Some(self.create_long(&mut lits, info, status)?),
                false => match self.create_short(&lits, info)? {
                    true => {}
                    false => key = Some(self.create_long(&mut lits, info, status)?),
                },
            }
        } else if size == 1 && info.learnt() {
            self.distribute(&lits, info)?;
        }

        if status.is_unit() {
            let antecedent = match (key, size) {
                (Some(key), _) => Antecedent::Clause(key),
                (None, 1) => Antecedent::None,
                (None, 2) => Antecedent::Binary(lits[1].negate()),
                (None, _) => Antecedent::Ternary(lits[1].negate(), lits[2].negate()),
            };
            let level = match size {
                1 => 0,
                _ => self.assignment.level(lits[1].atom()),
            };
            if !self.force_at(lits[0], level, antecedent) {
                status = ClauseStatus::Conflicting;
            }
        }

        Ok(ClauseResult { status, key })
    }

    /// Stores a long clause, watching the first two literals.
    fn create_long(
        &mut self,
        lits: &mut [CLiteral],
        info: ClauseInfo,
        status: ClauseStatus,
    ) -> Result<ClauseKey, err::ErrorKind> {
        let size = lits.len();
        let mut undo_level = None;

        let key = match info.learnt() {
            true => {
                let shared = self.distribute(lits, info)?;
                let compress = self.clause_db.config.compress.value;

                if let Some(shared) = shared {
                    let head = [lits[0], lits[1], lits[2]];
                    self.clause_db
                        .store(true, |key| ClauseHead::shared(key, shared, head, info))?
                } else if compress > 0 && size >= compress && self.assignment.is_false(lits[1]) {
                    let dl = self.levels.decision_level();
                    let assignment = &self.assignment;
                    lits[2..].sort_by_key(|l| {
                        std::cmp::Reverse(creator::level_abstraction(assignment, dl, *l))
                    });
                    let watch_level = self.assignment.level(lits[1].atom());
                    let hide_from = lits
                        .iter()
                        .enumerate()
                        .skip(3)
                        .find(|(_, l)| {
                            self.assignment.is_false(**l)
                                && self.assignment.level(l.atom()) < watch_level
                        })
                        .map_or(size, |(index, _)| index);

                    let assignment = &self.assignment;
                    let lits = &*lits;
                    self.clause_db.store(true, |key| {
                        let (clause, level) = ClauseHead::contracted(key, lits, info, hide_from, assignment);
                        undo_level = level;
                        clause
                    })?
                } else {
                    self.clause_db
                        .store(true, |key| ClauseHead::local(key, lits, info))?
                }
            }

            false => {
                if status == ClauseStatus::Open
                    && lits.iter().all(|l| self.assignment.is_free(*l))
                {
                    let watches = &self.watches;
                    let graph = &self.graph;
                    creator::init_watches(
                        lits,
                        self.clause_db.config.watch_init.value,
                        &mut self.rng,
                        |l| watches.count(l) + graph.implication_count(l.negate()),
                    );
                }

                match self.config.physical_share_problem.value && size > MAX_SHORT_LEN {
                    true => {
                        let shared = SharedLiterals::new_shareable(lits, ClauseKind::Static, 1)?
                            .pop()
                            .ok_or(err::ClauseDBError::StorageExhausted)?;
                        let head = [lits[0], lits[1], lits[2]];
                        self.clause_db
                            .store(false, |key| ClauseHead::shared(key, shared, head, info))?
                    }
                    false => self
                        .clause_db
                        .store(false, |key| ClauseHead::local(key, lits, info))?,
                }
            }
        };

        if let Some(level) = undo_level {
            self.levels.add_undo(level, key);
        }
        self.watches.watch(lits[0], key);
        self.watches.watch(lits[1], key);

        Ok(key)
    }

    /// Adds a binary or ternary clause to the implication graph.
    ///
    /// Returns false if the clause is a problem clause and the graph is shared, in which case nothing is added.
    fn create_short(&mut self, lits: &[CLiteral], info: ClauseInfo) -> Result<bool, err::ErrorKind> {
        match info.learnt() {
            true => {
                self.distribute(lits, info)?;
                match lits.len() {
                    2 => self.graph.add_learnt_binary(lits[0], lits[1]),
                    _ => self.graph.add_learnt_ternary(lits[0], lits[1], lits[2]),
                };
                Ok(true)
            }

            false => match Arc::get_mut(&mut self.graph) {
                Some(graph) => {
                    match lits.len() {
                        2 => graph.add_binary(lits[0], lits[1], false),
                        _ => graph.add_ternary(lits[0], lits[1], lits[2], false),
                    }
                    Ok(true)
                }
                None => Ok(false),
            },
        }
    }

    /// Publishes a learnt clause to the distributor of the solver, if any.
    ///
    /// Returns a handle to the published literals, if the literals are to be shared by the clause of the solver.
    fn distribute(
        &self,
        lits: &[CLiteral],
        info: ClauseInfo,
    ) -> Result<Option<SharedLiterals>, err::ErrorKind> {
        let Some(distributor) = &self.distributor else {
            return Ok(None);
        };
        if info.tagged() {
            return Ok(None);
        }

        let size = lits.len();
        if size > 3 && !self.config.distribution.accepts(size, info.lbd(), info.kind()) {
            return Ok(None);
        }

        let keep = size > MAX_SHORT_LEN && self.config.physical_share_learnt.value;
        log::trace!(target: targets::SHARING, "Solver {} publishes {size} literals", self.id);
        Ok(distributor.publish(self.id, lits, info.kind(), keep)?)
    }

    /// Integrates a clause received from some other solver.
    ///
    /// For documentation, see [procedures::integrate](crate::procedures::integrate).
    pub fn integrate(&mut self, shared: SharedLiterals, flags: u32) -> Result<ClauseResult, err::ErrorKind> {
        let dl = self.levels.decision_level();
        let root = self.levels.root();

        let selection = WatchSelection::of_slice(&self.assignment, dl, shared.literals(), false);
        let mut status = creator::status_with_flags(&self.assignment, dl, root, &selection, flags);

        match status {
            ClauseStatus::Subsumed => return Ok(ClauseResult { status, key: None }),

            ClauseStatus::Conflicting if flags & flags::NOT_CONFLICT != 0 => {
                return Ok(ClauseResult { status, key: None })
            }

            ClauseStatus::Empty => {
                log::debug!(target: targets::SHARING, "Solver {} received a clause false at level zero", self.id);
                let conflict: Vec<CLiteral> = shared.literals().iter().map(|l| l.negate()).collect();
                self.set_conflict(&conflict);
                return Ok(ClauseResult {
                    status: ClauseStatus::Conflicting,
                    key: None,
                });
            }

            _ => {}
        }

        self.counters.integrated += 1;
        self.heuristic.new_constraint(shared.literals(), shared.kind());

        let simp_size = selection.simp_size;
        let lits = selection.lits;

        let mut info = ClauseInfo::new(shared.kind());
        match flags & flags::INT_LBD != 0 && status.is_unit() {
            true => {
                let mut stamps = std::mem::take(&mut self.analysis.level_stamps);
                let mut stamp = self.analysis.stamp;
                let count = std::cmp::min(simp_size, MAX_SHORT_LEN);
                let lbd = count_levels(&self.assignment, &mut stamps, &mut stamp, &lits[..count]);
                self.analysis.level_stamps = stamps;
                self.analysis.stamp = stamp;
                info.set_lbd(lbd);
            }
            false => info.set_lbd(simp_size as u32),
        }

        let implicit_size = match flags & flags::EXPLICIT {
            0 => 3,
            _ => 1,
        };

        let mut key = None;
        if flags & flags::NO_ADD == 0 || simp_size > 3 {
            if simp_size > MAX_SHORT_LEN && self.config.physical_share_learnt.value {
                let head = [lits[0], lits[1], lits[2]];
                key = Some(
                    self.clause_db
                        .store(true, |key| ClauseHead::shared(key, shared, head, info))?,
                );
            } else if simp_size > implicit_size {
                let local = match simp_size <= MAX_SHORT_LEN {
                    true => lits[..simp_size].to_vec(),
                    false => {
                        let mut local = vec![lits[0], lits[1]];
                        local.extend(shared.literals().iter().filter(|l| {
                            !lits[..2].contains(l)
                                && creator::level_abstraction(&self.assignment, dl, **l) != 0
                        }));
                        local
                    }
                };
                key = Some(
                    self.clause_db
                        .store(true, |key| ClauseHead::local(key, &local, info))?,
                );
            } else if simp_size > 1 && shared.size() > simp_size {
                // Shortened at level zero, and so not known to the graph.
                match simp_size {
                    2 => self.graph.add_learnt_binary(lits[0], lits[1]),
                    _ => self.graph.add_learnt_ternary(lits[0], lits[1], lits[2]),
                };
            }

            if let Some(key) = key {
                self.watches.watch(lits[0], key);
                self.watches.watch(lits[1], key);
            }
        }

        if status.is_unit() {
            let antecedent = match (key, simp_size) {
                (Some(key), _) => Antecedent::Clause(key),
                (None, 1) => Antecedent::None,
                (None, 2) => Antecedent::Binary(lits[1].negate()),
                (None, _) => Antecedent::Ternary(lits[1].negate(), lits[2].negate()),
            };
            let level = match simp_size {
                1 => 0,
                _ => self.assignment.level(lits[1].atom()),
            };
            if !self.force_at(lits[0], level, antecedent) {
                status = ClauseStatus::Conflicting;
            }
        }

        Ok(ClauseResult { status, key })
    }
}
