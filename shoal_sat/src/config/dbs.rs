//! Configuration of databases, typically derived from the configuration of a solver.

use crate::solver::SolverState;

use super::{
    reduce::{ReduceAlgorithm, ReduceScore},
    Activity, ConfigOption, LBD,
};

/// How watches are chosen for a (long) problem clause.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum WatchInit {
    /// Watch the first two literals of the clause.
    First,

    /// Watch two literals chosen at random.
    Random,

    /// Watch the two literals which are currently watched by the fewest clauses.
    Least,
}

/// Configuration for the atom database.
#[derive(Clone)]
pub struct AtomDBConfig {
    /// The activity with which the next atom bumped will be bumped by, dynamically adjusted.
    pub bump: ConfigOption<Activity>,

    /// The decay to the activity of a atom each conflict.
    pub decay: ConfigOption<Activity>,
}

impl Default for AtomDBConfig {
    fn default() -> Self {
        AtomDBConfig {
            bump: ConfigOption {
                name: "atom_bump",
                min: Activity::MIN,
                max: Activity::MAX,
                max_state: SolverState::Configuration,
                value: 1.0,
            },

            decay: ConfigOption {
                name: "atom_decay",
                min: Activity::MIN,
                max: Activity::MAX,
                max_state: SolverState::Configuration,
                value: 50.0 * 1e-3,
            },
        }
    }
}

/// Configuration for the clause database.
#[derive(Clone)]
pub struct ClauseDBConfig {
    /// The increment to the activity of a learnt clause each time the clause takes part in analysis.
    pub bump: ConfigOption<u32>,

    /// The right shift applied to the activity of every learnt clause on each reduction.
    pub decay: ConfigOption<u32>,

    /// Any clauses with lbd within the lbd bound (lbd ≤ bound) will not be removed from the clause database.
    pub lbd_bound: ConfigOption<LBD>,

    /// The fraction of (removable) learnt clauses to remove on a reduction.
    pub reduce_fraction: ConfigOption<f64>,

    /// The score to order clauses by during a reduction.
    pub reduce_score: ConfigOption<ReduceScore>,

    /// How candidates for removal are identified.
    pub reduce_algorithm: ConfigOption<ReduceAlgorithm>,

    /// The minimum number of learnt clauses before a reduction takes place.
    pub learnt_init: ConfigOption<usize>,

    /// The ratio of learnt clauses to problem clauses before a reduction takes place.
    pub learnt_ratio: ConfigOption<f64>,

    /// The factor by which the limit on learnt clauses grows on each restart.
    pub learnt_growth: ConfigOption<f64>,

    /// A soft limit on the bytes used by learnt clauses, with zero for no limit.
    ///
    /// If exceeded, reductions remove as many clauses as possible.
    pub max_learnt_bytes: ConfigOption<usize>,

    /// Learnt clauses of at least this size which are asserting at a level below the conflict level hide the (false) tail of the clause until backtracking.
    pub compress: ConfigOption<usize>,

    /// Update the LBD of a learnt clause when the clause is used as a reason during analysis.
    pub update_lbd: ConfigOption<bool>,

    /// How watches of problem clauses are chosen.
    pub watch_init: ConfigOption<WatchInit>,
}

impl Default for ClauseDBConfig {
    fn default() -> Self {
        ClauseDBConfig {
            bump: ConfigOption {
                name: "clause_bump",
                min: 0,
                max: crate::db::clause::info::ACTIVITY_MAX,
                max_state: SolverState::Configuration,
                value: 1,
            },

            decay: ConfigOption {
                name: "clause_decay",
                min: 0,
                max: 31,
                max_state: SolverState::Configuration,
                value: 1,
            },

            lbd_bound: ConfigOption {
                name: "lbd_bound",
                min: LBD::MIN,
                max: LBD::MAX,
                max_state: SolverState::Configuration,
                value: 2,
            },

            reduce_fraction: ConfigOption {
                name: "reduce_fraction",
                min: 0.0,
                max: 1.0,
                max_state: SolverState::Solving,
                value: 0.5,
            },

            reduce_score: ConfigOption {
                name: "reduce_score",
                min: ReduceScore::MIN,
                max: ReduceScore::MAX,
                max_state: SolverState::Solving,
                value: ReduceScore::Mixed,
            },

            reduce_algorithm: ConfigOption {
                name: "reduce_algorithm",
                min: ReduceAlgorithm::MIN,
                max: ReduceAlgorithm::MAX,
                max_state: SolverState::Solving,
                value: ReduceAlgorithm::Sort,
            },

            learnt_init: ConfigOption {
                name: "learnt_init",
                min: 1,
                max: usize::MAX,
                max_state: SolverState::Configuration,
                value: 2_000,
            },

            learnt_ratio: ConfigOption {
                name: "learnt_ratio",
                min: 0.0,
                max: f64::MAX,
                max_state: SolverState::Configuration,
                value: 1.0 / 3.0,
            },

            learnt_growth: ConfigOption {
                name: "learnt_growth",
                min: 1.0,
                max: f64::MAX,
                max_state: SolverState::Configuration,
                value: 1.1,
            },

            max_learnt_bytes: ConfigOption {
                name: "max_learnt_bytes",
                min: 0,
                max: usize::MAX,
                max_state: SolverState::Configuration,
                value: 0,
            },

            compress: ConfigOption {
                name: "compress",
                min: 0,
                max: usize::MAX,
                max_state: SolverState::Configuration,
                value: 250,
            },

            update_lbd: ConfigOption {
                name: "update_lbd",
                min: false,
                max: true,
                max_state: SolverState::Configuration,
                value: true,
            },

            watch_init: ConfigOption {
                name: "watch_init",
                min: WatchInit::First,
                max: WatchInit::Least,
                max_state: SolverState::Configuration,
                value: WatchInit::First,
            },
        }
    }
}
