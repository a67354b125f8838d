/*!
Reports for a solver, or portfolio of solvers.
*/

use crate::solver::SolverState;

/// High-level reports regarding a solve.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub enum Report {
    /// The formula is satisfiable.
    Satisfiable,

    /// The formula is unsatisfiable.
    Unsatisfiable,

    /// Satisfiability of the formula is unknown, for some reason.
    #[default]
    Unknown,
}

impl From<SolverState> for Report {
    fn from(value: SolverState) -> Self {
        match value {
            SolverState::Configuration | SolverState::Input | SolverState::Solving => Self::Unknown,
            SolverState::Satisfiable => Self::Satisfiable,
            SolverState::Unsatisfiable => Self::Unsatisfiable,
        }
    }
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Satisfiable => write!(f, "Satisfiable"),
            Self::Unsatisfiable => write!(f, "Unsatisfiable"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}
