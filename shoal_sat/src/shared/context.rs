/*!
A shared context, to which a formula is added once and to which solvers are attached.

The lifecycle of a context is:
1. Construction, [from_config](SharedContext::from_config).
2. Input of atoms and clauses, through the master solver.
3. [end_init](SharedContext::end_init), after which the formula is fixed.
4. Any number of [attach](SharedContext::attach) and [detach](SharedContext::detach) calls, typically made by a [parallel solve](crate::parallel::ParallelSolve).

On attach, a solver takes:
- Every atom of the master.
- Each literal assigned at level zero by the master.
- The short implication graph of the master, through a shared [Arc](std::sync::Arc).
- Every long problem clause of the master, with the literals shared if [configured](crate::config::Config::physical_share_problem).
- The distributor and tag literal of the context.

# Example

```rust
# use shoal_sat::config::Config;
# use shoal_sat::shared::SharedContext;
# use shoal_sat::solver::Solver;
# use shoal_sat::reports::Report;
let mut ctx = SharedContext::from_config(Config::default());
let [p, q, r] = *ctx.fresh_or_max_literals(3).as_slice() else {
    panic!("Insufficient literals");
};

assert!(ctx.add_clause(vec![p, q, r]).is_ok());
assert!(ctx.add_clause(-p).is_ok());
assert!(ctx.end_init().is_ok());

let mut solver = Solver::from_config(Config::default());
assert!(ctx.attach(&mut solver, 1).is_ok());
assert_eq!(solver.value_of(1), Some(false));

assert!(solver.add_clause(vec![-q]).is_ok());
assert_eq!(solver.solve(), Ok(Report::Satisfiable));
assert_eq!(solver.value_of(3), Some(true));
```
*/

use std::sync::Arc;

use crate::{
    config::Config,
    db::clause::ClauseBody,
    misc::log::targets::{self},
    solver::{Solver, SolverState},
    structures::{
        antecedent::Antecedent,
        atom::Atom,
        clause::Clause,
        literal::{CLiteral, Literal},
    },
    types::err::{self},
};

use super::Distributor;

/// Static flags on atoms, of interest to collaborators such as a preprocessor or an enumerator.
pub mod atom_flags {
    /// The atom must not be eliminated.
    pub const FROZEN: u8 = 1;

    /// The atom has been eliminated from the formula.
    pub const ELIMINATED: u8 = 2;

    /// The atom is part of a projection.
    pub const PROJECTED: u8 = 4;
}

/// A shared context.
pub struct SharedContext {
    /// The configuration given to the context, from which configurations of attached solvers derive.
    pub config: Config,

    /// The master solver, holding the formula.
    master: Solver,

    /// Flags for each atom, indexed by atom.
    flags: Vec<u8>,

    /// The distributor of learnt clauses, if any.
    distributor: Option<Arc<dyn Distributor>>,

    /// A literal whose negation tags clauses conditional on the current input.
    tag: Option<CLiteral>,

    /// Whether initialisation has ended.
    init_ended: bool,

    /// The count of attached solvers, other than the master.
    attached: usize,
}

impl SharedContext {
    /// A context with the given configuration.
    pub fn from_config(config: Config) -> Self {
        SharedContext {
            master: Solver::from_config(config.clone()),
            config,
            flags: vec![atom_flags::FROZEN],
            distributor: None,
            tag: None,
            init_ended: false,
            attached: 0,
        }
    }

    fn check_input(&self) -> Result<(), err::ErrorKind> {
        match self.init_ended {
            true => Err(err::StateError::Frozen.into()),
            false => Ok(()),
        }
    }

    /// A fresh atom, on the master solver.
    pub fn fresh_atom(&mut self) -> Result<Atom, err::ErrorKind> {
        self.check_input()?;
        let atom = self.master.fresh_atom()?;
        self.flags.push(0);
        Ok(atom)
    }

    /// A positive literal of `count` fresh atoms, or of [ATOM_MAX](crate::structures::atom::ATOM_MAX) if fresh atoms are exhausted.
    pub fn fresh_or_max_literals(&mut self, count: usize) -> Vec<CLiteral> {
        let literals = match self.init_ended {
            true => Vec::default(),
            false => self.master.fresh_or_max_literals(count),
        };
        self.flags.resize(self.master.assignment.atom_count(), 0);
        literals
    }

    /// The count of atoms, excluding the top atom.
    pub fn atom_count(&self) -> usize {
        self.master.atom_count()
    }

    /// Adds a problem clause.
    pub fn add_clause(&mut self, clause: impl Clause) -> Result<(), err::ErrorKind> {
        self.check_input()?;
        self.master.add_clause(clause)
    }

    /// Ends initialisation, after which no further atoms or clauses may be added to the context.
    ///
    /// Returns an error if the formula is unsatisfiable at level zero, though the context is fixed regardless.
    pub fn end_init(&mut self) -> Result<(), err::ErrorKind> {
        if self.init_ended {
            return Ok(());
        }
        self.init_ended = true;
        log::info!(target: targets::PARALLEL, "Context initialised with {} atoms and {} long clauses", self.atom_count(), self.master.clause_db.original_count());
        self.master.end_init()
    }

    /// True if initialisation has ended.
    pub fn init_ended(&self) -> bool {
        self.init_ended
    }

    /// The master solver.
    pub fn master(&self) -> &Solver {
        &self.master
    }

    /// The master solver, mutably.
    ///
    /// Changes to the formula of the master after initialisation are not seen by attached solvers.
    pub fn master_mut(&mut self) -> &mut Solver {
        &mut self.master
    }

    /// True if the formula of the context is known to be unsatisfiable.
    pub fn unsatisfiable(&self) -> bool {
        self.master.state == SolverState::Unsatisfiable
    }

    /// Sets `flag` on `atom`.
    pub fn set_flag(&mut self, atom: Atom, flag: u8) {
        if let Some(flags) = self.flags.get_mut(atom as usize) {
            *flags |= flag;
        }
    }

    /// Clears `flag` on `atom`.
    pub fn clear_flag(&mut self, atom: Atom, flag: u8) {
        if let Some(flags) = self.flags.get_mut(atom as usize) {
            *flags &= !flag;
        }
    }

    /// True if `flag` is set on `atom`.
    pub fn has_flag(&self, atom: Atom, flag: u8) -> bool {
        self.flags
            .get(atom as usize)
            .is_some_and(|flags| flags & flag != 0)
    }

    pub fn frozen(&self, atom: Atom) -> bool {
        self.has_flag(atom, atom_flags::FROZEN)
    }

    pub fn eliminated(&self, atom: Atom) -> bool {
        self.has_flag(atom, atom_flags::ELIMINATED)
    }

    pub fn projected(&self, atom: Atom) -> bool {
        self.has_flag(atom, atom_flags::PROJECTED)
    }

    /// The tag literal of the context, created on first request.
    ///
    /// Learnt clauses containing the negation of the tag are tagged, and are never distributed.
    pub fn require_tag(&mut self) -> Result<CLiteral, err::ErrorKind> {
        if let Some(tag) = self.tag {
            return Ok(tag);
        }
        let atom = self.fresh_atom()?;
        self.set_flag(atom, atom_flags::FROZEN);
        let tag = CLiteral::new(atom, true);
        self.tag = Some(tag);
        self.master.set_tag(Some(tag));
        Ok(tag)
    }

    /// The tag literal of the context, if any.
    pub fn tag(&self) -> Option<CLiteral> {
        self.tag
    }

    /// Sets the distributor of the context, used by the master and by solvers attached after the call.
    pub fn set_distributor(&mut self, distributor: Option<Arc<dyn Distributor>>) {
        self.master.set_distributor(0, distributor.clone());
        self.distributor = distributor;
    }

    /// The distributor of the context, if any.
    pub fn distributor(&self) -> Option<Arc<dyn Distributor>> {
        self.distributor.clone()
    }

    /// The count of attached solvers, other than the master.
    pub fn attached(&self) -> usize {
        self.attached
    }

    /// Attaches a fresh `solver` to the context, with the given id.
    ///
    /// For documentation, see [shared::context](crate::shared::context).
    pub fn attach(&mut self, solver: &mut Solver, id: usize) -> Result<(), err::ErrorKind> {
        if !self.init_ended {
            return Err(err::StateError::NotFrozen.into());
        }
        if solver.atom_count() != 0 || solver.state > SolverState::Input {
            return Err(err::ErrorKind::InvalidState);
        }

        solver.graph = self.master.graph.clone();
        solver.ensure_atoms(self.master.assignment.atom_count())?;
        solver.set_distributor(id, self.distributor.clone());
        solver.set_tag(self.tag);
        self.attached += 1;

        if self.unsatisfiable() {
            solver.state = SolverState::Unsatisfiable;
            return Err(err::BuildError::Unsatisfiable.into());
        }

        for literal in self.master.assignment.trail() {
            if self.master.assignment.level(literal.atom()) != 0 {
                break;
            }
            if !solver.force(*literal, Antecedent::None) {
                solver.state = SolverState::Unsatisfiable;
                return Err(err::BuildError::Unsatisfiable.into());
            }
        }

        let share = self.config.physical_share_problem.value;
        let mut literals = Vec::default();
        for clause in self.master.clause_db.all_original_clauses() {
            literals.clear();
            clause.literals(&mut literals);
            let shared = match clause.body() {
                ClauseBody::Shared(shared) if share => Some(shared.share()),
                _ => None,
            };
            solver.add_copied(&literals, shared)?;
        }

        log::debug!(target: targets::PARALLEL, "Solver {id} attached");
        solver.end_init()
    }

    /// Detaches `solver` from the context, clearing any assumptions and disconnecting distribution.
    pub fn detach(&mut self, solver: &mut Solver) {
        solver.set_distributor(solver.id(), None);
        solver.clear_assumptions();
        solver.clear_stop();
        self.attached = self.attached.saturating_sub(1);
        log::debug!(target: targets::PARALLEL, "Solver {} detached", solver.id());
    }

    /// Drops `solver` from the count of attached solvers, without touching the state of the solver.
    ///
    /// For use with a solver whose state may be inconsistent, e.g. after a panic.
    pub fn forget(&mut self, solver: Solver) {
        self.attached = self.attached.saturating_sub(1);
        log::debug!(target: targets::PARALLEL, "Solver {} forgotten", solver.id());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::Report;

    fn pigeons(ctx: &mut SharedContext, holes: usize) {
        let pigeons = holes + 1;
        let atoms: Vec<Vec<CLiteral>> = (0..pigeons)
            .map(|_| ctx.fresh_or_max_literals(holes))
            .collect();

        for pigeon in &atoms {
            assert!(ctx.add_clause(pigeon.clone()).is_ok());
        }
        for hole in 0..holes {
            for a in 0..pigeons {
                for b in (a + 1)..pigeons {
                    assert!(ctx.add_clause(vec![-atoms[a][hole], -atoms[b][hole]]).is_ok());
                }
            }
        }
    }

    #[test]
    fn input_after_init() {
        let mut ctx = SharedContext::from_config(Config::default());
        let [p] = *ctx.fresh_or_max_literals(1).as_slice() else {
            panic!("Insufficient literals");
        };
        assert!(ctx.end_init().is_ok());

        assert_eq!(ctx.add_clause(vec![p]), Err(err::StateError::Frozen.into()));
        assert!(ctx.fresh_atom().is_err());
    }

    #[test]
    fn attach_before_init() {
        let mut ctx = SharedContext::from_config(Config::default());
        let mut solver = Solver::from_config(Config::default());
        assert_eq!(
            ctx.attach(&mut solver, 1),
            Err(err::StateError::NotFrozen.into())
        );
    }

    #[test]
    fn attached_solver_shares_graph() {
        let mut ctx = SharedContext::from_config(Config::default());
        pigeons(&mut ctx, 3);
        assert!(ctx.end_init().is_ok());

        let mut solver = Solver::from_config(Config::default());
        assert!(ctx.attach(&mut solver, 1).is_ok());

        assert!(Arc::ptr_eq(&solver.graph, &ctx.master().graph));
        assert_eq!(solver.atom_count(), ctx.atom_count());
        assert_eq!(solver.solve(), Ok(Report::Unsatisfiable));
    }

    #[test]
    fn long_clauses_shared() {
        let mut ctx = SharedContext::from_config(Config::default());
        let literals = ctx.fresh_or_max_literals(8);
        assert!(ctx.add_clause(literals.clone()).is_ok());
        assert!(ctx.end_init().is_ok());

        let mut solver = Solver::from_config(Config::default());
        assert!(ctx.attach(&mut solver, 1).is_ok());

        let keys = solver.clause_db.original_keys();
        assert_eq!(keys.len(), 1);
        let clause = solver.clause_db.get(keys[0]).unwrap();
        assert!(clause.is_shared());
        match clause.body() {
            ClauseBody::Shared(shared) => assert_eq!(shared.ref_count(), 2),
            _ => panic!("Unshared clause"),
        }
    }

    #[test]
    fn flags() {
        let mut ctx = SharedContext::from_config(Config::default());
        let atom = ctx.fresh_atom().unwrap();
        assert!(!ctx.frozen(atom));

        ctx.set_flag(atom, atom_flags::FROZEN | atom_flags::PROJECTED);
        assert!(ctx.frozen(atom));
        assert!(ctx.projected(atom));

        ctx.clear_flag(atom, atom_flags::FROZEN);
        assert!(!ctx.frozen(atom));
        assert!(!ctx.eliminated(atom));

        let tag = ctx.require_tag().unwrap();
        assert!(ctx.frozen(tag.atom()));
        assert_eq!(ctx.require_tag(), Ok(tag));
    }
}
