use std::sync::Arc;

use shoal_sat::{
    config::Config,
    heuristic::{static_order::StaticOrder, DecisionHeuristic},
    reports::Report,
};

use shoal_tests::{
    general::{brute_force, silent_formula_report},
    generate::uniform_random,
};

#[cfg(test)]
mod three_sat {

    use super::*;

    /// Formulas near the threshold, so roughly half are satisfiable.
    #[test]
    fn against_enumeration() {
        let mut reports = [0, 0];
        for seed in 0..60 {
            let formula = uniform_random(seed, 14, 60, 3);
            let expected = brute_force(&formula);
            assert_eq!(
                expected,
                silent_formula_report(&formula, &Config::default()),
                "seed {seed}"
            );
            reports[(expected == Report::Satisfiable) as usize] += 1;
        }
        assert!(reports[0] > 0 && reports[1] > 0);
    }

    #[test]
    fn without_restarts() {
        let mut config = Config::default();
        config.restart.value = false;
        for seed in 100..130 {
            let formula = uniform_random(seed, 12, 51, 3);
            assert_eq!(
                brute_force(&formula),
                silent_formula_report(&formula, &config),
                "seed {seed}"
            );
        }
    }

    #[test]
    fn small_reductions() {
        let mut config = Config::default();
        config.clause_db.learnt_init.value = 4;
        config.clause_db.learnt_ratio.value = 0.0;
        config.clause_db.reduce_fraction.value = 0.75;
        for seed in 200..230 {
            let formula = uniform_random(seed, 16, 70, 3);
            assert_eq!(
                brute_force(&formula),
                silent_formula_report(&formula, &config),
                "seed {seed}"
            );
        }
    }

    #[test]
    fn static_order() {
        let mut config = Config::default();
        config.heuristic = Arc::new(|_: &Config| -> Box<dyn DecisionHeuristic> {
            Box::new(StaticOrder::default())
        });
        for seed in 300..330 {
            let formula = uniform_random(seed, 14, 60, 3);
            assert_eq!(
                brute_force(&formula),
                silent_formula_report(&formula, &config),
                "seed {seed}"
            );
        }
    }

    mod group_50_218 {
        use super::*;

        #[test]
        fn checked_models() {
            #[cfg(feature = "log")]
            env_logger::init();

            // Any model is checked against the formula.
            for seed in 0..20 {
                let formula = uniform_random(1000 + seed, 50, 218, 3);
                let report = silent_formula_report(&formula, &Config::default());
                assert_ne!(report, Report::Unknown);
            }
        }
    }
}

#[cfg(test)]
mod five_sat {

    use super::*;

    #[test]
    fn long_clauses() {
        for seed in 0..20 {
            let formula = uniform_random(seed, 14, 280, 5);
            assert_eq!(
                brute_force(&formula),
                silent_formula_report(&formula, &Config::default()),
                "seed {seed}"
            );
        }
    }
}
