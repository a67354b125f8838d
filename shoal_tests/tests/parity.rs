mod parity {
    use shoal_sat::{
        config::Config,
        reports::Report,
        structures::literal::{CLiteral, Literal},
    };
    use shoal_tests::{
        general::{satisfies, silent_formula_report, solver_with},
        generate::parity,
    };

    #[test]
    fn chains() {
        for atoms in [8, 16, 32] {
            for odd in [true, false] {
                assert_eq!(
                    Report::Satisfiable,
                    silent_formula_report(&parity(atoms, odd), &Config::default())
                );
            }
        }
    }

    #[test]
    fn parity_of_model() {
        let atoms = 16;
        let formula = parity(atoms, true);
        let (mut solver, ok) = solver_with(&formula, &Config::default());
        assert!(ok);
        assert_eq!(solver.solve(), Ok(Report::Satisfiable));

        let model = solver.model().expect("missing model");
        assert!(satisfies(&model, &formula));
        let true_count = (1..=atoms as u32)
            .filter(|atom| model.contains(&CLiteral::new(*atom, true)))
            .count();
        assert_eq!(true_count % 2, 1);
    }

    #[test]
    fn fixed_wrong_parity() {
        let atoms = 12;
        let mut formula = parity(atoms, true);
        for atom in 1..=atoms as isize {
            formula.push(vec![-atom]);
        }
        assert_eq!(
            Report::Unsatisfiable,
            silent_formula_report(&formula, &Config::default())
        );
    }

    #[test]
    fn under_assumptions() {
        let atoms = 10;
        let formula = parity(atoms, false);
        let (mut solver, ok) = solver_with(&formula, &Config::default());
        assert!(ok);

        let mut assumptions: Vec<CLiteral> = (1..atoms as u32).map(|atom| CLiteral::new(atom, false)).collect();
        assumptions.push(CLiteral::new(atoms as u32, true));
        assert_eq!(solver.solve_given(&assumptions), Ok(Report::Unsatisfiable));

        assumptions.pop();
        assert_eq!(solver.solve_given(&assumptions), Ok(Report::Satisfiable));
        assert_eq!(solver.value_of(atoms as u32), Some(false));
    }
}
