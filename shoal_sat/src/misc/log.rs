/*!
Miscelanous items related to [logging](log).

Calls to the log macro are made throughout the library.
These are intended to provide useful information for extending the library and/or fixing issues.

Note, no log implementation is provided.
For more details, see [log].
*/

/// Targets to be used within a [log]! macro.
pub mod targets {
    /// Logs related to [propagation](crate::procedures::propagate)
    pub const PROPAGATION: &str = "propagation";

    /// Logs related to [analysis](crate::procedures::analysis)
    pub const ANALYSIS: &str = "analysis";

    /// Logs related to clause deletion
    pub const REDUCTION: &str = "reduction";

    /// Logs related to the [clause database](crate::db::clause)
    pub const CLAUSE_DB: &str = "clause_db";

    /// Logs related to a valuation
    pub const VALUATION: &str = "valuation";

    /// Logs related to [backjumping](crate::procedures::backjump)
    pub const BACKJUMP: &str = "backjump";

    /// Logs related to the [short implication graph](crate::db::implications)
    pub const IMPLICATIONS: &str = "implications";

    /// Logs related to [search](crate::procedures::search) and restarts
    pub const SEARCH: &str = "search";

    /// Logs related to the [distribution](crate::shared::distributor) of clauses
    pub const SHARING: &str = "sharing";

    /// Logs related to a [portfolio](crate::parallel)
    pub const PARALLEL: &str = "parallel";
}
