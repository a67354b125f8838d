/*!
Configuration of the reduction of learnt clauses.

A reduction removes some fraction of the learnt clauses in the clause database.
Which clauses are removed is determined by a score, and candidates for removal are identified either by sorting or by a linear scan against some threshold.
*/

use std::str::FromStr;

use super::LBD;

/// The score used to order learnt clauses during a reduction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReduceScore {
    /// Clauses with lower activity are removed first.
    Activity = 0,

    /// Clauses with higher LBD are removed first.
    Lbd,

    /// Clauses are ordered by LBD, with activity breaking ties.
    Mixed,
}

impl ReduceScore {
    /// The minimum ReduceScore type.
    pub const MIN: ReduceScore = ReduceScore::Activity;

    /// The maximum ReduceScore type.
    pub const MAX: ReduceScore = ReduceScore::Mixed;
}

impl std::fmt::Display for ReduceScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Activity => write!(f, "Activity"),
            Self::Lbd => write!(f, "Lbd"),
            Self::Mixed => write!(f, "Mixed"),
        }
    }
}

impl FromStr for ReduceScore {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Activity" => Ok(Self::Activity),
            "Lbd" => Ok(Self::Lbd),
            "Mixed" => Ok(Self::Mixed),
            _ => Err(()),
        }
    }
}

/// How candidates for removal are identified.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReduceAlgorithm {
    /// Sort all candidates by score and remove the worst.
    Sort = 0,

    /// Scan the candidates once, removing those with a score below the average score.
    Linear,
}

impl ReduceAlgorithm {
    /// The minimum ReduceAlgorithm type.
    pub const MIN: ReduceAlgorithm = ReduceAlgorithm::Sort;

    /// The maximum ReduceAlgorithm type.
    pub const MAX: ReduceAlgorithm = ReduceAlgorithm::Linear;
}

impl std::fmt::Display for ReduceAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sort => write!(f, "Sort"),
            Self::Linear => write!(f, "Linear"),
        }
    }
}

/// A complete strategy for a reduction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReduceStrategy {
    /// The score of clauses.
    pub score: ReduceScore,

    /// How candidates are identified.
    pub algorithm: ReduceAlgorithm,

    /// Clauses with an LBD at most `glue` are never removed.
    pub glue: LBD,
}
