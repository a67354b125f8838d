use rand::SeedableRng;

use crate::{config::Config, generic::random::MinimalPCG32};

use super::GenericSolver;

/// A solver which uses [MinimalPCG32] as a source of randomness.
pub type Solver = GenericSolver<MinimalPCG32>;

impl Solver {
    /// Creates a solver from some given configuration, with randomness seeded by the configuration.
    pub fn from_config(config: Config) -> Self {
        let rng = MinimalPCG32::from_seed(config.seed.value.to_le_bytes());
        Self::with_rng(config, rng)
    }
}
