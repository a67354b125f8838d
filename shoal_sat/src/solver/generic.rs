use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::{
    config::Config,
    db::{
        assignment::Assignment, clause::ClauseDB, implications::ShortImplicationsGraph,
        level::Levels, watches::Watches, LevelIndex,
    },
    heuristic::DecisionHeuristic,
    misc::log::targets::{self},
    reports::Report,
    shared::Distributor,
    structures::{
        antecedent::Antecedent,
        atom::{Atom, ATOM_MAX},
        literal::{CLiteral, Literal},
        value::Value,
    },
    types::err::{self},
};

use super::{Counters, PostPropagator, SolverState};

/// A literal implied at some level below the level at which the literal was assigned.
///
/// Each such literal is re-asserted when the level of the assignment is undone, so long as the implying level remains.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImpliedLiteral {
    /// The literal.
    pub literal: CLiteral,

    /// The (lowest known) level at which the literal is implied.
    pub level: LevelIndex,

    /// The reason for the literal.
    pub antecedent: Antecedent,
}

/// Buffers used during conflict analysis, kept to avoid repeated allocation.
#[derive(Default)]
pub(crate) struct AnalysisBuffers {
    /// The learnt clause, with the asserting literal first.
    pub learnt: Vec<CLiteral>,

    /// Reasons, as (true) literals.
    pub reason: Vec<CLiteral>,

    /// Atoms marked during analysis, to be cleared.
    pub marked: Vec<Atom>,

    /// Atoms whose activity is to be bumped.
    pub bump: Vec<Atom>,

    /// A stamp for each decision level, used to count distinct levels.
    pub level_stamps: Vec<u32>,

    /// The current stamp.
    pub stamp: u32,
}

/// A generic solver, parameratised to a source of randomness.
///
/// Requires a source of [rng](rand::Rng) which (also) implements [Default].
///
/// # Example
///
/// ```rust
/// # use shoal_sat::solver::GenericSolver;
/// # use shoal_sat::generic::random::MinimalPCG32;
/// # use shoal_sat::config::Config;
/// let solver = GenericSolver::<MinimalPCG32>::with_rng(Config::default(), MinimalPCG32::default());
/// ```
pub struct GenericSolver<R: rand::Rng + std::default::Default> {
    /// The configuration of a solver.
    pub config: Config,

    /// Counters related to a solver/solve.
    pub counters: Counters,

    /// The assignment.
    /// See [db::assignment](crate::db::assignment) for details.
    pub assignment: Assignment,

    /// Decision levels.
    pub levels: Levels,

    /// Watch lists for each literal.
    pub watches: Watches,

    /// The clause database.
    /// See [db::clause](crate::db::clause) for details.
    pub clause_db: ClauseDB,

    /// Binary and ternary clauses, possibly shared with other solvers.
    pub graph: Arc<ShortImplicationsGraph>,

    /// The decision heuristic.
    pub heuristic: Box<dyn DecisionHeuristic>,

    /// Post-propagators, ordered by priority.
    pub(crate) posts: Vec<Box<dyn PostPropagator<R>>>,

    /// The status of the solver.
    pub state: SolverState,

    /// The source of rng.
    pub rng: R,

    /// The (true) literals of the current conflict, if any.
    pub(crate) conflict: Vec<CLiteral>,

    /// Literals implied below the level of their assignment.
    pub(crate) implied: Vec<ImpliedLiteral>,

    /// Stops a solve, if set.
    stop: Arc<AtomicBool>,

    /// The distributor of learnt clauses, if attached to a shared context with distribution.
    pub(crate) distributor: Option<Arc<dyn Distributor>>,

    /// The id of the solver, within a shared context.
    pub(crate) id: usize,

    /// The tag literal of a shared context, if required.
    pub(crate) tag: Option<CLiteral>,

    pub(crate) analysis: AnalysisBuffers,

    /// The length of the trail at the last simplification.
    pub(crate) last_simplify: usize,
}

impl<R: rand::Rng + std::default::Default> GenericSolver<R> {
    /// A solver with the given configuration and source of randomness.
    pub fn with_rng(config: Config, rng: R) -> Self {
        let heuristic = (config.heuristic)(&config);

        let mut solver = GenericSolver {
            clause_db: ClauseDB::new(&config),
            heuristic,

            config,

            counters: Counters::default(),
            assignment: Assignment::default(),
            levels: Levels::default(),
            watches: Watches::default(),
            graph: Arc::new(ShortImplicationsGraph::default()),

            posts: Vec::default(),

            state: SolverState::Configuration,
            rng,

            conflict: Vec::default(),
            implied: Vec::default(),

            stop: Arc::new(AtomicBool::new(false)),
            distributor: None,
            id: 0,
            tag: None,

            analysis: AnalysisBuffers::default(),
            last_simplify: 0,
        };

        let atom_count = solver.assignment.atom_count();
        solver.watches.grow_to(atom_count);
        if let Some(graph) = Arc::get_mut(&mut solver.graph) {
            graph.grow_to(atom_count);
        }
        solver.heuristic.grow_to(atom_count);

        solver
    }

    /// A report on the state of the solver.
    pub fn report(&self) -> Report {
        Report::from(self.state)
    }

    /// The id of the solver, within a shared context.
    pub fn id(&self) -> usize {
        self.id
    }

    /// A fresh atom.
    ///
    /// Fails if atoms are exhausted, or if the implication graph of the solver is shared and too small for the atom.
    pub fn fresh_atom(&mut self) -> Result<Atom, err::AtomError> {
        let count = self.assignment.atom_count();
        if count > ATOM_MAX as usize {
            return Err(err::AtomError::AtomsExhausted);
        }

        if self.graph.atom_capacity() < count + 1 {
            match Arc::get_mut(&mut self.graph) {
                Some(graph) => graph.grow_to(count + 1),
                None => return Err(err::AtomError::SharedGraph),
            }
        }

        let atom = self.assignment.add_atom();
        self.watches.grow_to(count + 1);
        self.heuristic.grow_to(count + 1);

        if self.state == SolverState::Configuration {
            self.state = SolverState::Input;
        }
        Ok(atom)
    }

    /// A fresh atom, or [ATOM_MAX] if fresh atoms are exhausted.
    pub fn fresh_or_max_atom(&mut self) -> Atom {
        match self.fresh_atom() {
            Ok(atom) => atom,
            Err(_) => ATOM_MAX,
        }
    }

    /// A positive literal of `count` fresh atoms, or of [ATOM_MAX] if fresh atoms are exhausted.
    pub fn fresh_or_max_literals(&mut self, count: usize) -> Vec<CLiteral> {
        (0..count)
            .map(|_| CLiteral::new(self.fresh_or_max_atom(), true))
            .collect()
    }

    /// Ensures the solver has at least `count` atoms (including the top atom).
    pub fn ensure_atoms(&mut self, count: usize) -> Result<(), err::AtomError> {
        while self.assignment.atom_count() < count {
            self.fresh_atom()?;
        }
        Ok(())
    }

    /// The count of atoms, excluding the top atom.
    pub fn atom_count(&self) -> usize {
        self.assignment.atom_count() - 1
    }

    /// The value of `atom` on the current assignment, if any.
    ///
    /// After a satisfiable solve, the assignment is a model.
    pub fn value_of(&self, atom: Atom) -> Option<bool> {
        if atom as usize >= self.assignment.atom_count() {
            return None;
        }
        self.assignment.value_of(atom).as_bool()
    }

    /// The (true) literals of the model of the last solve, if the solver is satisfiable.
    pub fn model(&self) -> Option<Vec<CLiteral>> {
        match self.state {
            SolverState::Satisfiable => Some(self.assignment.true_literals()),
            _ => None,
        }
    }

    /// The current decision level.
    pub fn decision_level(&self) -> LevelIndex {
        self.levels.decision_level()
    }

    /// The root level.
    pub fn root_level(&self) -> LevelIndex {
        self.levels.root()
    }

    /// The current conflict, as a collection of (true) literals.
    pub fn conflict(&self) -> &[CLiteral] {
        &self.conflict
    }

    /// True if the solver has a conflict.
    pub fn has_conflict(&self) -> bool {
        !self.conflict.is_empty()
    }

    /// Sets the conflict of the solver to the given (true) literals.
    pub fn set_conflict(&mut self, literals: &[CLiteral]) {
        self.conflict.clear();
        self.conflict.extend_from_slice(literals);
    }

    /// Literals implied below the level of their assignment.
    pub fn implied(&self) -> &[ImpliedLiteral] {
        &self.implied
    }

    /// A handle to stop any solve of the solver.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    /// Requests any solve of the solver stops.
    pub fn set_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn clear_stop(&self) {
        self.stop.store(false, Ordering::Relaxed);
    }

    /// True if a stop has been requested.
    pub fn stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Adds a post-propagator, kept in order of priority.
    pub fn add_post(&mut self, post: Box<dyn PostPropagator<R>>) {
        let position = self
            .posts
            .iter()
            .position(|p| p.priority() > post.priority())
            .unwrap_or(self.posts.len());
        self.posts.insert(position, post);
    }

    /// Sets the distributor of learnt clauses, and the id of the solver with respect to the distributor.
    pub fn set_distributor(&mut self, id: usize, distributor: Option<Arc<dyn Distributor>>) {
        self.id = id;
        self.distributor = distributor;
    }

    /// Sets the tag literal, with learnt clauses containing the negation of the tag being tagged.
    pub fn set_tag(&mut self, tag: Option<CLiteral>) {
        self.tag = tag;
    }

    /// The reason for the value of `literal`, as a collection of (true) literals, appended to `out`.
    ///
    /// Returns false if the literal has no reason.
    pub fn reason_literals(&self, literal: CLiteral, out: &mut Vec<CLiteral>) -> bool {
        match self.assignment.reason(literal.atom()) {
            Antecedent::None => false,
            Antecedent::Binary(q) => {
                out.push(q);
                true
            }
            Antecedent::Ternary(q, r) => {
                out.extend([q, r]);
                true
            }
            Antecedent::Clause(key) => match self.clause_db.get(key) {
                Ok(clause) => {
                    clause.reason(literal, out);
                    true
                }
                Err(e) => {
                    log::error!(target: targets::ANALYSIS, "Reason {key} of {literal} missing: {e:?}");
                    false
                }
            },
        }
    }

    /// True if the assignment of the solver is complete.
    pub fn assignment_complete(&self) -> bool {
        self.assignment.free_count() == 0
    }

    /// The value of `literal`.
    pub fn literal_value(&self, literal: CLiteral) -> Value {
        self.assignment.literal_value(literal)
    }
}
