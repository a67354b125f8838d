/*!
Dynamic restarts.

In addition to restarts scheduled by the luby sequence, a search may be interrupted when the recent quality of learnt clauses drops below the overall quality.
The quality of a clause is measured either by LBD, or by the level at which the conflict which gave the clause was found.
*/

/// The measure to track for a dynamic restart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestartMeasure {
    /// The LBD of learnt clauses.
    Lbd,

    /// The decision level of conflicts.
    ConflictLevel,
}

/// Configuration of a dynamic restart.
///
/// A restart is triggered once `window` conflicts have been seen since the last restart and the average measure of the most recent `window` conflicts, scaled by `k`, exceeds the average measure across all conflicts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DynamicRestart {
    pub window: usize,
    pub k: f64,
    pub measure: RestartMeasure,
}

impl Default for DynamicRestart {
    fn default() -> Self {
        DynamicRestart {
            window: 50,
            k: 0.8,
            measure: RestartMeasure::Lbd,
        }
    }
}
