use shoal_sat::{
    config::Config,
    reports::Report,
    solver::Solver,
    structures::literal::{CLiteral, Literal},
};

mod basic {
    use shoal_tests::general::{brute_force, silent_formula_report};

    use super::*;

    #[test]
    fn one_literal() {
        let mut solver = Solver::from_config(Config::default());
        let p = CLiteral::new(solver.fresh_or_max_atom(), true);
        assert!(solver.add_clause(vec![p]).is_ok());
        assert_eq!(solver.solve(), Ok(Report::Satisfiable));
        assert_eq!(solver.value_of(p.atom()), Some(true));
    }

    #[test]
    fn conflict() {
        let mut solver = Solver::from_config(Config::default());
        let [p, q] = *solver.fresh_or_max_literals(2).as_slice() else {
            panic!("Insufficient literals");
        };

        assert!(solver.add_clause(vec![p, q]).is_ok());
        assert!(solver.add_clause(vec![-p, -q]).is_ok());
        assert!(solver.add_clause(vec![p, -q]).is_ok());
        assert!(solver.add_clause(vec![-p, q]).is_ok());

        assert_eq!(solver.solve(), Ok(Report::Unsatisfiable));
        assert_eq!(solver.report(), Report::Unsatisfiable);
        // The formula is settled, so a further solve is immediate.
        assert_eq!(solver.solve(), Ok(Report::Unsatisfiable));
    }

    #[test]
    fn short_clauses_are_implications() {
        let formula = vec![vec![1, 2], vec![-2, 3], vec![-1, 3], vec![-3]];
        assert_eq!(brute_force(&formula), Report::Unsatisfiable);

        let mut solver = Solver::from_config(Config::default());
        let [a, b, c] = *solver.fresh_or_max_literals(3).as_slice() else {
            panic!("Insufficient literals");
        };
        assert!(solver.add_clause(vec![a, b]).is_ok());
        assert!(solver.add_clause(vec![-b, c]).is_ok());
        assert!(solver.add_clause(vec![-a, c]).is_ok());
        assert_eq!(solver.clause_db.original_count(), 0);

        // -c forces -a and -b through the implication graph, falsifying (a b).
        assert!(solver.add_clause(vec![-c]).is_err());
        assert_eq!(solver.solve(), Ok(Report::Unsatisfiable));

        assert_eq!(silent_formula_report(&formula, &Config::default()), Report::Unsatisfiable);
    }

    #[test]
    fn without_the_unit() {
        let mut solver = Solver::from_config(Config::default());
        let [a, b, c] = *solver.fresh_or_max_literals(3).as_slice() else {
            panic!("Insufficient literals");
        };
        assert!(solver.add_clause(vec![a, b]).is_ok());
        assert!(solver.add_clause(vec![-b, c]).is_ok());
        assert!(solver.add_clause(vec![-a, c]).is_ok());

        assert_eq!(solver.solve(), Ok(Report::Satisfiable));
        assert_eq!(solver.value_of(c.atom()), Some(true));
    }

    #[test]
    fn clauses_after_a_solve() {
        let mut solver = Solver::from_config(Config::default());
        let [p, q] = *solver.fresh_or_max_literals(2).as_slice() else {
            panic!("Insufficient literals");
        };

        assert!(solver.add_clause(vec![p, q]).is_ok());
        assert_eq!(solver.solve(), Ok(Report::Satisfiable));

        assert!(solver.add_clause(vec![-p]).is_ok());
        assert_eq!(solver.value_of(q.atom()), Some(true));
        assert!(solver.add_clause(vec![-q]).is_err());
        assert_eq!(solver.solve(), Ok(Report::Unsatisfiable));
    }

    #[test]
    fn tautology_skip() {
        let mut solver = Solver::from_config(Config::default());
        let [p, q, r] = *solver.fresh_or_max_literals(3).as_slice() else {
            panic!("Insufficient literals");
        };
        assert!(solver.add_clause(vec![p, q, r, -p]).is_ok());
        assert_eq!(solver.clause_db.original_count(), 0);
        assert_eq!(solver.graph.ternary_count(false), 0);
    }

    #[test]
    fn duplicates() {
        let mut solver = Solver::from_config(Config::default());
        let [p, q, r, s] = *solver.fresh_or_max_literals(4).as_slice() else {
            panic!("Insufficient literals");
        };

        assert!(solver.add_clause(vec![p, q, q]).is_ok());
        assert_eq!(solver.graph.binary_count(false), 1);

        assert!(solver.add_clause(vec![p, q, r, s, s, r]).is_ok());
        assert_eq!(solver.clause_db.original_count(), 1);
        let key = solver.clause_db.original_keys()[0];
        assert_eq!(solver.clause_db.get(key).map(|clause| clause.size()), Ok(4));
    }

    #[test]
    fn unknown_atom() {
        let mut solver = Solver::from_config(Config::default());
        let p = CLiteral::new(solver.fresh_or_max_atom(), true);
        let q = CLiteral::new(7, true);
        assert!(solver.add_clause(vec![p, q]).is_err());
    }

    #[test]
    fn model_is_total() {
        let mut solver = Solver::from_config(Config::default());
        let literals = solver.fresh_or_max_literals(12);
        for pair in literals.windows(2) {
            assert!(solver.add_clause(vec![-pair[0], pair[1]]).is_ok());
        }

        assert_eq!(solver.solve(), Ok(Report::Satisfiable));
        let model = solver.model().expect("missing model");
        assert_eq!(model.len(), 12);
        assert!(solver.assignment_complete());
    }
}
