/*!
Configuration of a portfolio of solvers.

A portfolio runs some number of solvers in parallel.
Solvers either split the search space between themselves through guiding paths, or compete on the whole of the search space.
*/

use crate::solver::SolverState;

use super::ConfigOption;

/// How solvers of a portfolio divide work.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum SplitMode {
    /// A single initial path is given to one solver, and idle solvers request a split of the path of some other solver.
    Split,

    /// Each solver is given the whole of the search space, and no splits take place.
    Compete,
}

/// Which solvers exchange clauses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Topology {
    /// Every solver receives clauses from every other solver.
    All,

    /// Each solver receives clauses from its predecessor and successor.
    Ring,

    /// Solvers are arranged on a (partial) hypercube, and receive clauses from solvers whose id differs on a single bit.
    Cube,

    /// As with [Topology::Cube], but in addition clauses are received from solvers whose id differs on two bits.
    CubeX,
}

/// Which received clauses are integrated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum IntegrateFilter {
    /// Every received clause is integrated.
    No,

    /// Received clauses which are satisfied at or below the root level are ignored.
    Gp,

    /// Received clauses which are satisfied are ignored.
    Sat,
}

/// A schedule of global restarts, on which every solver abandons its path and search restarts from the initial path.
///
/// Global restarts only take place in [SplitMode::Split], as competing solvers never give up the initial path.
/// Each solver requests a restart after some number of conflicts on its path, and a restart takes place once every solver has made a request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlobalRestarts {
    /// The maximum number of global restarts, with zero to disable global restarts.
    pub max: u32,

    /// The number of conflicts before the first request.
    pub base: u64,

    /// The factor by which requests are delayed after each global restart.
    pub grow: f64,
}

/// The primary configuration of a portfolio.
#[derive(Clone)]
pub struct ParallelConfig {
    /// The number of solvers.
    pub threads: ConfigOption<usize>,

    /// How the solvers divide work.
    pub mode: ConfigOption<SplitMode>,

    /// Which solvers exchange clauses.
    pub topology: ConfigOption<Topology>,

    /// The number of integrated clauses which are exempt from reduction.
    pub integrate_grace: ConfigOption<usize>,

    /// Which received clauses are integrated.
    pub integrate_filter: ConfigOption<IntegrateFilter>,

    /// The maximum number of clauses received on each call to integrate.
    pub receive_batch: ConfigOption<usize>,

    /// The schedule of global restarts.
    pub global_restarts: GlobalRestarts,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        ParallelConfig {
            threads: ConfigOption {
                name: "threads",
                min: 1,
                max: 64,
                max_state: SolverState::Configuration,
                value: 1,
            },

            mode: ConfigOption {
                name: "solve_mode",
                min: SplitMode::Split,
                max: SplitMode::Compete,
                max_state: SolverState::Configuration,
                value: SplitMode::Split,
            },

            topology: ConfigOption {
                name: "topology",
                min: Topology::All,
                max: Topology::CubeX,
                max_state: SolverState::Configuration,
                value: Topology::All,
            },

            integrate_grace: ConfigOption {
                name: "integrate_grace",
                min: 1,
                max: usize::MAX,
                max_state: SolverState::Configuration,
                value: 1024,
            },

            integrate_filter: ConfigOption {
                name: "integrate_filter",
                min: IntegrateFilter::No,
                max: IntegrateFilter::Sat,
                max_state: SolverState::Configuration,
                value: IntegrateFilter::Gp,
            },

            receive_batch: ConfigOption {
                name: "receive_batch",
                min: 1,
                max: usize::MAX,
                max_state: SolverState::Configuration,
                value: 30,
            },

            global_restarts: GlobalRestarts {
                max: 0,
                base: 100,
                grow: 1.5,
            },
        }
    }
}
