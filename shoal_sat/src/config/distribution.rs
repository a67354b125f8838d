//! Configuration of the distribution of learnt clauses between solvers.

use crate::{db::clause::ClauseKind, solver::SolverState};

use super::{ConfigOption, LBD};

/// Which learnt clauses are distributed to other solvers.
///
/// Clauses with at most three literals are always distributed, as these are few and cheap to integrate.
#[derive(Clone)]
pub struct DistributionConfig {
    /// Clauses longer than this are not distributed.
    pub max_size: ConfigOption<usize>,

    /// Clauses with an LBD greater than this are not distributed.
    pub max_lbd: ConfigOption<LBD>,

    /// A mask of the [kinds](ClauseKind) of clauses to distribute.
    pub kinds: u8,
}

impl DistributionConfig {
    /// Whether a learnt clause with the given size, LBD, and kind should be distributed.
    pub fn accepts(&self, size: usize, lbd: LBD, kind: ClauseKind) -> bool {
        size <= self.max_size.value && lbd <= self.max_lbd.value && (self.kinds & kind.mask()) != 0
    }
}

impl Default for DistributionConfig {
    fn default() -> Self {
        DistributionConfig {
            max_size: ConfigOption {
                name: "distribute_size",
                min: 0,
                max: usize::MAX,
                max_state: SolverState::Configuration,
                value: usize::MAX,
            },

            max_lbd: ConfigOption {
                name: "distribute_lbd",
                min: 0,
                max: LBD::MAX,
                max_state: SolverState::Configuration,
                value: 4,
            },

            kinds: ClauseKind::Conflict.mask() | ClauseKind::Loop.mask(),
        }
    }
}
