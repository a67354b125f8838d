/*!
Configuration of a solver, and of a portfolio of solvers.

All configuration for a solver is contained within [Config].
Some structures clone parts of the configuration, and a [shared context](crate::shared::SharedContext) clones the whole of the configuration for each attached solver, varying the seed.

For the most part, the value of an option is a [ConfigOption], which records the bounds on the value.
*/
use std::sync::Arc;

use dbs::{AtomDBConfig, ClauseDBConfig};
use distribution::DistributionConfig;
use minimization_criteria::MinimizationCriteria;
use parallel::ParallelConfig;
use restart::DynamicRestart;
use vsids::VSIDS;

mod config_option;
pub use config_option::ConfigOption;

pub mod dbs;
pub mod distribution;
pub mod minimization_criteria;
pub mod parallel;
pub mod reduce;
pub mod restart;

pub mod vsids;

mod activity;
pub use activity::Activity;

mod lbd;
pub use lbd::LBD;

mod rng;
pub use rng::{PolarityLean, RandomDecisionBias};

mod scheduler;
pub use scheduler::Scheduler;

use crate::{
    generic::{self},
    heuristic::{vsids::VSIDSHeuristic, DecisionHeuristic, HeuristicFactory},
    solver::SolverState,
};

/// The primary configuration structure.
#[derive(Clone)]
pub struct Config {
    /// Configuration of the atom database.
    pub atom_db: AtomDBConfig,

    /// Configuration of the clause database.
    pub clause_db: ClauseDBConfig,

    /// Configuration of the distribution of learnt clauses.
    pub distribution: DistributionConfig,

    /// Configuration of a portfolio.
    pub parallel: ParallelConfig,

    /// A factory for the decision heuristic of a solver.
    pub heuristic: HeuristicFactory,

    /// The `u` value to multiply the luby sequence by when determining whether to perform a restart.
    pub luby_u: ConfigOption<generic::luby::LubyRepresentation>,

    /// Which minimization to apply to learnt clauses.
    pub minimization: ConfigOption<MinimizationCriteria>,

    /// The probability of assigning positive polarity to a atom when freely choosing a atom.
    pub polarity_lean: ConfigOption<PolarityLean>,

    /// The probability of making a random decision.
    pub random_decision_bias: ConfigOption<RandomDecisionBias>,

    /// A scheduler for things such as restarts and reductions.
    pub scheduler: Scheduler,

    /// Default to the last set value of an atom when choosing a value for the atom, otherwise decision with specified probability.
    pub phase_saving: ConfigOption<bool>,

    /// Permit (scheduled) restarts.
    pub restart: ConfigOption<bool>,

    /// Restart when the recent quality of conflicts drops, in addition to scheduled restarts.
    pub dynamic_restart: Option<DynamicRestart>,

    /// The seed of the source of randomness of a solver.
    pub seed: ConfigOption<u64>,

    /// Physically share the literals of long problem clauses between attached solvers.
    pub physical_share_problem: ConfigOption<bool>,

    /// Physically share the literals of long distributed learnt clauses between solvers.
    pub physical_share_learnt: ConfigOption<bool>,

    /// The time limit for a solve, with zero for no limit.
    pub time_limit: ConfigOption<std::time::Duration>,

    /// Which VSIDS variant to use during resolution based analysis
    pub vsids_variant: ConfigOption<VSIDS>,
}

impl Default for Config {
    /// The default solver is (roughly) configured to provide quick, deterministic, results on a library of tests.
    fn default() -> Self {
        Config {
            atom_db: AtomDBConfig::default(),
            clause_db: ClauseDBConfig::default(),
            distribution: DistributionConfig::default(),
            parallel: ParallelConfig::default(),

            heuristic: Arc::new(|config: &Config| -> Box<dyn DecisionHeuristic> {
                Box::new(VSIDSHeuristic::from_config(config))
            }),

            luby_u: ConfigOption {
                name: "luby",
                min: generic::luby::LubyRepresentation::MIN,
                max: generic::luby::LubyRepresentation::MAX,
                max_state: SolverState::Configuration,
                value: 128,
            },

            minimization: ConfigOption {
                name: "minimization",
                min: MinimizationCriteria::MIN,
                max: MinimizationCriteria::MAX,
                max_state: SolverState::Configuration,
                value: MinimizationCriteria::Recursive,
            },

            polarity_lean: ConfigOption {
                name: "polarity_lean",
                min: PolarityLean::MIN,
                max: PolarityLean::MAX,
                max_state: SolverState::Configuration,
                value: 0.0,
            },

            random_decision_bias: ConfigOption {
                name: "random_decision_bias",
                min: 0.0,
                max: 1.0,
                max_state: SolverState::Configuration,
                value: 0.0,
            },

            scheduler: Scheduler {
                luby: Some(2),
                conflict: Some(50_000),
            },

            phase_saving: ConfigOption {
                name: "phase_saving",
                min: false,
                max: true,
                max_state: SolverState::Configuration,
                value: true,
            },

            restart: ConfigOption {
                name: "restart",
                min: false,
                max: true,
                max_state: SolverState::Configuration,
                value: true,
            },

            dynamic_restart: None,

            seed: ConfigOption {
                name: "seed",
                min: u64::MIN,
                max: u64::MAX,
                max_state: SolverState::Configuration,
                value: 0,
            },

            physical_share_problem: ConfigOption {
                name: "share_problem",
                min: false,
                max: true,
                max_state: SolverState::Configuration,
                value: true,
            },

            physical_share_learnt: ConfigOption {
                name: "share_learnt",
                min: false,
                max: true,
                max_state: SolverState::Configuration,
                value: true,
            },

            time_limit: ConfigOption {
                name: "time_limit",
                min: std::time::Duration::from_secs(0),
                max: std::time::Duration::MAX,
                max_state: SolverState::Configuration,
                value: std::time::Duration::from_secs(0),
            },

            vsids_variant: ConfigOption {
                name: "vsids",
                min: VSIDS::MIN,
                max: VSIDS::MAX,
                max_state: SolverState::Configuration,
                value: VSIDS::MiniSAT,
            },
        }
    }
}
