use std::str::FromStr;

/// Variant minimization criterias to apply to a clause learnt during analysis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum MinimizationCriteria {
    /// No clause minimization.
    None = 0,

    /// Omit each literal whose reason has every literal at level zero or in the learnt clause.
    Local,

    /// Recursively examine the reasons of each literal to determine whether the literal follows from the other literals of the learnt clause.
    Recursive,
}

impl std::fmt::Display for MinimizationCriteria {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Local => write!(f, "Local"),
            Self::Recursive => write!(f, "Recursive"),
        }
    }
}

impl MinimizationCriteria {
    /// The minimum MinimizationCriteria type.
    pub const MIN: MinimizationCriteria = MinimizationCriteria::None;

    /// The maximum MinimizationCriteria type.
    pub const MAX: MinimizationCriteria = MinimizationCriteria::Recursive;
}

impl FromStr for MinimizationCriteria {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "None" => Ok(Self::None),
            "Local" => Ok(Self::Local),
            "Recursive" => Ok(Self::Recursive),
            _ => Err(()),
        }
    }
}
