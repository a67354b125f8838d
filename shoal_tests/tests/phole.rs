mod phole {
    use shoal_sat::{config::Config, reports::Report};
    use shoal_tests::{
        general::{silent_formula_report, silent_portfolio_report},
        generate::pigeonhole,
    };

    #[test]
    fn normal() {
        let mut ok_count = 0;
        for holes in 2..7 {
            assert_eq!(
                Report::Unsatisfiable,
                silent_formula_report(&pigeonhole(holes), &Config::default())
            );
            ok_count += 1;
        }
        assert_eq!(ok_count, 5);
    }

    #[test]
    fn tough_seven() {
        assert_eq!(
            Report::Unsatisfiable,
            silent_formula_report(&pigeonhole(7), &Config::default())
        );
    }

    #[test]
    fn portfolio() {
        let mut config = Config::default();
        config.parallel.threads.value = 4;

        let report = silent_portfolio_report(&pigeonhole(6), &config);
        assert_eq!(report.report, Report::Unsatisfiable);
        assert!(report.model.is_none());
        assert!(report.errors.is_empty());
    }

    #[test]
    #[ignore = "expensive"]
    fn tough_nine() {
        assert_eq!(
            Report::Unsatisfiable,
            silent_formula_report(&pigeonhole(9), &Config::default())
        );
    }
}
