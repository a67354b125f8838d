mod decision_levels {
    use shoal_sat::{config::Config, reports::Report, solver::Solver, structures::literal::Literal};

    #[test]
    fn two_stacked() {
        let mut solver = Solver::from_config(Config::default());

        let [p, q, r, s] = *solver.fresh_or_max_literals(4).as_slice() else {
            panic!("Insufficient literals");
        };

        let _ = solver.add_clause(vec![-p, q]);
        let _ = solver.add_clause(vec![-r, -s]);

        assert!(solver.assume_all(&[p, r]));

        assert_eq!(solver.root_level(), 2);
        assert_eq!(solver.decision_level(), 2);

        assert_eq!(solver.value_of(q.atom()), Some(true));
        assert_eq!(solver.value_of(s.atom()), Some(false));
    }

    #[test]
    fn implied_assumption() {
        let mut solver = Solver::from_config(Config::default());

        let [p, q, r] = *solver.fresh_or_max_literals(3).as_slice() else {
            panic!("Insufficient literals");
        };

        let _ = solver.add_clause(vec![-p, q]);

        assert!(solver.assume_all(&[p, q, r]));
        assert_eq!(solver.root_level(), 2);
        assert_eq!(solver.decision(1), p);
        assert_eq!(solver.decision(2), r);
    }

    #[test]
    fn guiding_path_of_root() {
        let mut solver = Solver::from_config(Config::default());

        let [p, q, r, s] = *solver.fresh_or_max_literals(4).as_slice() else {
            panic!("Insufficient literals");
        };
        let _ = solver.add_clause(vec![-p, q]);

        assert!(solver.assume_all(&[p, r]));
        assert!(solver.assume(s));

        let mut path = Vec::default();
        let mut start = 0;
        let mut implied = 0;
        assert!(solver.update_guiding_path(&mut path, &mut start, &mut implied));

        // Decisions of the root only, and q is implied on its own level.
        assert_eq!(path, vec![p, r]);
        assert_eq!(implied, 0);

        assert!(!solver.update_guiding_path(&mut path, &mut start, &mut implied));
    }

    #[test]
    fn failed_stack() {
        let mut solver = Solver::from_config(Config::default());

        let [p, q, r] = *solver.fresh_or_max_literals(3).as_slice() else {
            panic!("Insufficient literals");
        };
        let _ = solver.add_clause(vec![-p, -q, r]);
        let _ = solver.add_clause(vec![-p, -r]);

        assert_eq!(solver.solve_given(&[p, q]), Ok(Report::Unsatisfiable));

        assert_eq!(solver.solve_given(&[p]), Ok(Report::Satisfiable));
        assert_eq!(solver.value_of(q.atom()), Some(false));
    }
}
