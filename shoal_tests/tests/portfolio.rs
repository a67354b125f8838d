use std::time::Duration;

use shoal_sat::{
    config::{
        parallel::{IntegrateFilter, SplitMode, Topology},
        Config,
    },
    parallel::{
        guiding_path::{GuidingPath, PathKind},
        ParallelSolve,
    },
    reports::Report,
    shared::SharedContext,
    structures::literal::{CLiteral, Literal},
    types::err::{ErrorKind, ParallelError},
};

use shoal_tests::{
    general::{brute_force, context_with, satisfies, silent_portfolio_report, solver_with},
    generate::{pigeonhole, uniform_random},
};

fn config_with(threads: usize) -> Config {
    let mut config = Config::default();
    config.parallel.threads.value = threads;
    config
}

mod split {
    use super::*;

    #[test]
    fn refuted_path() {
        let mut ctx = SharedContext::from_config(config_with(2));
        let [a, b] = *ctx.fresh_or_max_literals(2).as_slice() else {
            panic!("Insufficient literals");
        };
        assert!(ctx.add_clause(vec![a, b]).is_ok());
        assert!(ctx.add_clause(vec![-a, b]).is_ok());

        let report = ParallelSolve::new(&mut ctx)
            .with_assumptions(&[-b])
            .solve()
            .expect("portfolio failure");

        assert_eq!(report.report, Report::Unsatisfiable);
        assert!(report.winner.is_some());
        assert!(report.errors.is_empty());

        // The formula itself is satisfiable.
        let report = ParallelSolve::new(&mut ctx).solve().expect("portfolio failure");
        assert_eq!(report.report, Report::Satisfiable);
        let model = report.model.expect("missing model");
        assert!(model.contains(&b));
    }

    #[test]
    fn refuted_formula() {
        let formula = vec![vec![1, 2], vec![-1, 2], vec![-2]];
        let (mut ctx, ok) = context_with(&formula, &config_with(2));
        assert!(!ok);
        assert!(ctx.unsatisfiable());

        let report = ParallelSolve::new(&mut ctx).solve().expect("portfolio failure");
        assert_eq!(report.report, Report::Unsatisfiable);
    }

    #[test]
    fn against_enumeration() {
        for seed in 0..24 {
            let formula = uniform_random(seed, 14, 60, 3);
            let report = silent_portfolio_report(&formula, &config_with(4));
            assert_eq!(brute_force(&formula), report.report, "seed {seed}");
            assert!(report.errors.is_empty());
        }
    }

    #[test]
    fn paths_are_split() {
        let report = silent_portfolio_report(&pigeonhole(7), &config_with(4));
        assert_eq!(report.report, Report::Unsatisfiable);
        assert!(report.splits > 0);
    }

    #[test]
    fn single_thread() {
        let report = silent_portfolio_report(&pigeonhole(5), &config_with(1));
        assert_eq!(report.report, Report::Unsatisfiable);
        assert_eq!(report.winner, Some(0));
        assert_eq!(report.splits, 0);
    }

    #[test]
    fn global_restarts() {
        let mut config = config_with(3);
        config.parallel.global_restarts.max = 4;
        config.parallel.global_restarts.base = 50;

        let report = silent_portfolio_report(&pigeonhole(6), &config);
        assert_eq!(report.report, Report::Unsatisfiable);

        let formula = uniform_random(7, 40, 160, 3);
        let report = silent_portfolio_report(&formula, &config);
        assert_ne!(report.report, Report::Unknown);
    }

    #[test]
    fn assumptions_respected() {
        let formula = uniform_random(3, 30, 90, 3);
        let (mut ctx, ok) = context_with(&formula, &config_with(3));
        assert!(ok);

        let report = ParallelSolve::new(&mut ctx).solve().expect("portfolio failure");
        if report.report == Report::Satisfiable {
            let model = report.model.expect("missing model");
            assert!(satisfies(&model, &formula));

            let forced = model[0].negate();
            let report = ParallelSolve::new(&mut ctx)
                .with_assumptions(&[forced])
                .solve()
                .expect("portfolio failure");
            if let Some(model) = report.model {
                assert!(model.contains(&forced));
                assert!(satisfies(&model, &formula));
            }
        }
    }
}

mod compete {
    use super::*;

    #[test]
    fn no_splits() {
        let mut config = config_with(3);
        config.parallel.mode.value = SplitMode::Compete;

        let report = silent_portfolio_report(&pigeonhole(6), &config);
        assert_eq!(report.report, Report::Unsatisfiable);
        assert_eq!(report.splits, 0);

        for seed in 40..52 {
            let formula = uniform_random(seed, 14, 60, 3);
            let report = silent_portfolio_report(&formula, &config);
            assert_eq!(brute_force(&formula), report.report, "seed {seed}");
        }
    }

    #[test]
    fn losers_stop() {
        for seed in 0..8 {
            let mut config = config_with(2);
            config.parallel.mode.value = SplitMode::Compete;
            config.seed.value = seed;

            let (tx, rx) = crossbeam::channel::bounded(1);
            std::thread::spawn(move || {
                let report = silent_portfolio_report(&pigeonhole(6), &config);
                let _ = tx.send(report.report);
            });

            match rx.recv_timeout(Duration::from_secs(60)) {
                Ok(report) => assert_eq!(report, Report::Unsatisfiable, "seed {seed}"),
                Err(_) => panic!("the portfolio did not finish, seed {seed}"),
            }
        }
    }
}

mod two_paths {
    use super::*;

    // (a ∨ b) ∧ (¬a ∨ b) ∧ (¬b ∨ c) ∧ (¬b ∨ ¬c), with no unit clause.
    fn formula() -> Vec<Vec<isize>> {
        vec![vec![1, 2], vec![-1, 2], vec![-2, 3], vec![-2, -3]]
    }

    #[test]
    fn refuted_on_input() {
        let formula = vec![vec![1, 2], vec![-1, 2], vec![-2]];
        let (mut ctx, _) = context_with(&formula, &config_with(2));

        let report = ParallelSolve::new(&mut ctx).solve().expect("portfolio failure");
        assert_eq!(report.report, Report::Unsatisfiable);
        assert_eq!(report.winner, Some(0));
        assert_eq!(report.splits, 0);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn split_on_a() {
        let config = config_with(2);
        let (mut first, ok) = solver_with(&formula(), &config);
        assert!(ok);
        let (mut second, ok) = solver_with(&formula(), &config);
        assert!(ok);
        let a = CLiteral::from_int(1);

        let mut gp = GuidingPath::default();
        gp.reset(u64::MAX, Some(PathKind::Split), 0);
        assert!(first.assume(a));
        let given = gp.split(&mut first);
        assert_eq!(given, vec![-a]);
        assert_eq!(first.root_level(), 1);

        assert_eq!(first.solve().expect("solve failure"), Report::Unsatisfiable);
        assert_eq!(second.solve_given(&given).expect("solve failure"), Report::Unsatisfiable);
    }

    #[test]
    fn refuted_once() {
        for seed in 0..16 {
            let mut config = config_with(2);
            config.seed.value = seed;

            let report = silent_portfolio_report(&formula(), &config);
            assert_eq!(report.report, Report::Unsatisfiable, "seed {seed}");
            assert!(report.winner.is_some(), "seed {seed}");
            assert!(report.model.is_none());
            assert!(report.errors.is_empty());
        }
    }
}

mod distribution {
    use super::*;

    #[test]
    fn topologies() {
        for topology in [Topology::All, Topology::Ring, Topology::Cube, Topology::CubeX] {
            let mut config = config_with(5);
            config.parallel.topology.value = topology;

            let report = silent_portfolio_report(&pigeonhole(6), &config);
            assert_eq!(report.report, Report::Unsatisfiable, "{topology:?}");

            let formula = uniform_random(11, 14, 58, 3);
            let report = silent_portfolio_report(&formula, &config);
            assert_eq!(brute_force(&formula), report.report, "{topology:?}");
        }
    }

    #[test]
    fn integration_filters() {
        for filter in [IntegrateFilter::No, IntegrateFilter::Gp, IntegrateFilter::Sat] {
            let mut config = config_with(4);
            config.parallel.integrate_filter.value = filter;
            config.parallel.integrate_grace.value = 8;

            let report = silent_portfolio_report(&pigeonhole(6), &config);
            assert_eq!(report.report, Report::Unsatisfiable, "{filter:?}");
        }
    }
}

mod failures {
    use std::cell::Cell;

    use shoal_sat::{
        generic::random::MinimalPCG32,
        solver::{PostPropagator, PostStop, Solver},
    };

    use super::*;

    struct Faulty;

    impl PostPropagator<MinimalPCG32> for Faulty {
        fn priority(&self) -> u32 {
            0
        }

        fn propagate_fixpoint(&mut self, _: &mut Solver) -> Result<(), PostStop> {
            panic!("faulty propagator");
        }
    }

    #[test]
    fn no_threads() {
        let mut ctx = SharedContext::from_config(config_with(0));
        assert!(matches!(
            ParallelSolve::new(&mut ctx).solve(),
            Err(ErrorKind::Parallel(ParallelError::NoThreads))
        ));
    }

    #[test]
    fn worker_setup() {
        let formula = pigeonhole(4);
        let (mut ctx, ok) = context_with(&formula, &config_with(4));
        assert!(ok);

        let seen = Cell::new(0);
        let report = ParallelSolve::new(&mut ctx)
            .with_worker_setup(|id, solver| {
                assert_eq!(solver.id(), id);
                seen.set(seen.get() + 1);
            })
            .solve()
            .expect("portfolio failure");

        assert_eq!(seen.get(), 3);
        assert_eq!(report.report, Report::Unsatisfiable);
        assert_eq!(ctx.attached(), 0);
    }

    #[test]
    fn lost_worker() {
        let (mut ctx, ok) = context_with(&pigeonhole(5), &config_with(3));
        assert!(ok);

        let report = ParallelSolve::new(&mut ctx)
            .with_worker_setup(|id, solver| {
                if id == 1 {
                    solver.add_post(Box::new(Faulty));
                }
            })
            .solve()
            .expect("portfolio failure");

        assert_eq!(report.report, Report::Unsatisfiable);
        assert_eq!(report.errors, vec![ParallelError::WorkerPanicked(1)]);
        assert_eq!(ctx.attached(), 0);
    }

    #[test]
    fn lost_master() {
        let (mut ctx, ok) = context_with(&pigeonhole(5), &config_with(2));
        assert!(ok);
        assert!(ctx.end_init().is_ok());
        ctx.master_mut().add_post(Box::new(Faulty));

        assert!(matches!(
            ParallelSolve::new(&mut ctx).solve(),
            Err(ErrorKind::Parallel(ParallelError::MasterFailed))
        ));
    }

    #[test]
    fn time_limit() {
        let mut config = config_with(2);
        config.time_limit.value = std::time::Duration::from_millis(20);

        let report = silent_portfolio_report(&pigeonhole(11), &config);
        assert_eq!(report.report, Report::Unknown);
        assert!(report.model.is_none());
    }
}
