//! Helpers shared by the integration tests.
//!
//! Formulas are written as lists of clauses, each clause a list of nonzero integers in the style of DIMACS.

pub mod general {
    use shoal_sat::{
        config::Config,
        parallel::{ParallelReport, ParallelSolve},
        reports::Report,
        shared::SharedContext,
        solver::Solver,
        structures::literal::{CLiteral, Literal},
        types::err,
    };

    pub type Formula = Vec<Vec<isize>>;

    /// The largest atom of the formula.
    pub fn atom_count(formula: &Formula) -> usize {
        formula
            .iter()
            .flatten()
            .map(|l| l.unsigned_abs())
            .max()
            .unwrap_or(0)
    }

    pub fn literals(clause: &[isize]) -> Vec<CLiteral> {
        clause.iter().map(|l| CLiteral::from_int(*l)).collect()
    }

    /// A solver with the formula added.
    ///
    /// Returns the solver, and false if the formula was found unsatisfiable while adding clauses.
    pub fn solver_with(formula: &Formula, config: &Config) -> (Solver, bool) {
        let mut solver = Solver::from_config(config.clone());
        solver.fresh_or_max_literals(atom_count(formula));

        for clause in formula {
            match solver.add_clause(literals(clause)) {
                Ok(()) => {}
                Err(err::ErrorKind::Build(err::BuildError::Unsatisfiable)) => return (solver, false),
                Err(e) => panic!("{e:?}"),
            }
        }
        (solver, true)
    }

    /// A shared context with the formula added, and false if the formula was found unsatisfiable while adding clauses.
    pub fn context_with(formula: &Formula, config: &Config) -> (SharedContext, bool) {
        let mut ctx = SharedContext::from_config(config.clone());
        ctx.fresh_or_max_literals(atom_count(formula));

        for clause in formula {
            match ctx.add_clause(literals(clause)) {
                Ok(()) => {}
                Err(err::ErrorKind::Build(err::BuildError::Unsatisfiable)) => return (ctx, false),
                Err(e) => panic!("{e:?}"),
            }
        }
        (ctx, true)
    }

    /// Solves the formula with a single solver, checking any model found.
    pub fn silent_formula_report(formula: &Formula, config: &Config) -> Report {
        let (mut solver, ok) = solver_with(formula, config);
        if !ok {
            return Report::Unsatisfiable;
        }

        let report = match solver.solve() {
            Ok(report) => report,
            Err(e) => panic!("{e:?}"),
        };

        if report == Report::Satisfiable {
            let model = solver.model().expect("missing model");
            assert!(satisfies(&model, formula), "model does not satisfy the formula");
        }
        report
    }

    /// Solves the formula with a portfolio, checking any model found.
    pub fn silent_portfolio_report(formula: &Formula, config: &Config) -> ParallelReport {
        let (mut ctx, ok) = context_with(formula, config);
        if !ok {
            return ParallelReport {
                report: Report::Unsatisfiable,
                ..Default::default()
            };
        }

        let report = match ParallelSolve::new(&mut ctx).solve() {
            Ok(report) => report,
            Err(e) => panic!("{e:?}"),
        };

        if let Some(model) = &report.model {
            assert!(satisfies(model, formula), "model does not satisfy the formula");
        }
        report
    }

    /// True if every clause of the formula has some literal in the model.
    pub fn satisfies(model: &[CLiteral], formula: &Formula) -> bool {
        formula
            .iter()
            .all(|clause| literals(clause).iter().any(|l| model.contains(l)))
    }

    /// Satisfiability by enumeration, for small formulas.
    pub fn brute_force(formula: &Formula) -> Report {
        let atoms = atom_count(formula);
        assert!(atoms <= 20, "formula too large to enumerate");

        for assignment in 0_u32..(1 << atoms) {
            let satisfied = formula.iter().all(|clause| {
                clause.iter().any(|l| {
                    let bit = assignment & (1 << (l.unsigned_abs() - 1)) != 0;
                    bit == l.is_positive()
                })
            });
            if satisfied {
                return Report::Satisfiable;
            }
        }
        Report::Unsatisfiable
    }

    /// A model of the assignment, as literals.
    pub fn model_literals(model: &[CLiteral]) -> Vec<isize> {
        model.iter().map(|l| l.as_int()).collect()
    }

}

pub mod generate {
    use rand::{Rng, SeedableRng};
    use shoal_sat::generic::random::MinimalPCG32;

    use crate::general::Formula;

    /// A uniform random k-SAT formula, with distinct atoms in each clause.
    pub fn uniform_random(seed: u64, atoms: usize, clauses: usize, k: usize) -> Formula {
        let mut rng = MinimalPCG32::from_seed(seed.to_le_bytes());

        (0..clauses)
            .map(|_| {
                let mut clause: Vec<isize> = Vec::with_capacity(k);
                while clause.len() < k {
                    let atom = rng.random_range(1..=atoms) as isize;
                    if clause.iter().any(|l| l.abs() == atom) {
                        continue;
                    }
                    match rng.random_bool(0.5) {
                        true => clause.push(atom),
                        false => clause.push(-atom),
                    }
                }
                clause
            })
            .collect()
    }

    /// The pigeonhole formula of `holes + 1` pigeons in `holes` holes, which is unsatisfiable.
    pub fn pigeonhole(holes: usize) -> Formula {
        let pigeons = holes + 1;
        let atom = |pigeon: usize, hole: usize| (pigeon * holes + hole + 1) as isize;

        let mut formula = Formula::default();
        for pigeon in 0..pigeons {
            formula.push((0..holes).map(|hole| atom(pigeon, hole)).collect());
        }
        for hole in 0..holes {
            for a in 0..pigeons {
                for b in (a + 1)..pigeons {
                    formula.push(vec![-atom(a, hole), -atom(b, hole)]);
                }
            }
        }
        formula
    }

    /// A chain of implications from `1` to `length`, with the negation of `length` asserted.
    pub fn implication_chain(length: usize) -> Formula {
        let mut formula: Formula = (1..length)
            .map(|i| vec![-(i as isize), (i + 1) as isize])
            .collect();
        formula.push(vec![-(length as isize)]);
        formula
    }

    /// Parity constraints over `atoms`, with xor of all atoms required to be `odd`.
    ///
    /// Encoded by a chain of auxiliary atoms, each the xor of the previous auxiliary and the next atom.
    pub fn parity(atoms: usize, odd: bool) -> Formula {
        let mut formula = Formula::default();
        let mut previous = 1_isize;
        let mut fresh = atoms as isize;

        for atom in 2..=atoms as isize {
            fresh += 1;
            let (a, b, x) = (previous, atom, fresh);
            formula.push(vec![-a, -b, -x]);
            formula.push(vec![a, b, -x]);
            formula.push(vec![a, -b, x]);
            formula.push(vec![-a, b, x]);
            previous = x;
        }

        match odd {
            true => formula.push(vec![previous]),
            false => formula.push(vec![-previous]),
        }
        formula
    }
}
