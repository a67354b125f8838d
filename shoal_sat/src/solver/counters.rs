use std::time::Duration;

/// Counts for various things which count, roughly.
pub struct Counters {
    /// A count of every conflict seen during a solve.
    pub total_conflicts: usize,

    /// A count of conflicts seen since the last restart.
    ///
    /// As u32 rather than a usize for easier interaction with scheduling variables.
    pub fresh_conflicts: u32,

    /// A count of all decisions made.
    pub total_decisions: usize,

    /// The total number of iterations through a search.
    pub total_iterations: usize,

    /// The number of restarts through a solve.
    pub restarts: usize,

    /// The number of reductions of the clause database.
    pub reductions: usize,

    /// The number of clauses integrated from other solvers.
    pub integrated: usize,

    /// The time taken during a solve.
    pub time: Duration,

    /// The current element in the luby sequence.
    pub luby: crate::generic::luby::Luby,

    /// Running measures for dynamic restarts.
    pub restart_measure: RestartWindow,
}

impl Default for Counters {
    fn default() -> Self {
        Counters {
            fresh_conflicts: 0,

            total_decisions: 0,
            total_iterations: 0,
            total_conflicts: 0,

            restarts: 0,
            reductions: 0,
            integrated: 0,
            time: Duration::from_secs(0),

            luby: crate::generic::luby::Luby::default(),

            restart_measure: RestartWindow::default(),
        }
    }
}

/// A running average over every conflict, and over a window of the most recent conflicts.
#[derive(Default)]
pub struct RestartWindow {
    total: u64,
    count: u64,

    window: std::collections::VecDeque<u32>,
    window_total: u64,
}

impl RestartWindow {
    /// Records the measure of a conflict, keeping a window of at most `size` measures.
    pub fn record(&mut self, measure: u32, size: usize) {
        self.total += measure as u64;
        self.count += 1;

        self.window.push_back(measure);
        self.window_total += measure as u64;
        while self.window.len() > size {
            if let Some(old) = self.window.pop_front() {
                self.window_total -= old as u64;
            }
        }
    }

    /// True if the window is full and the window average, scaled by `k`, exceeds the overall average.
    pub fn exceeded(&self, size: usize, k: f64) -> bool {
        if self.window.len() < size || self.count == 0 {
            return false;
        }
        let window_avg = self.window_total as f64 / self.window.len() as f64;
        let avg = self.total as f64 / self.count as f64;
        window_avg * k > avg
    }

    /// Empties the window, e.g. after a restart.
    pub fn reset_window(&mut self) {
        self.window.clear();
        self.window_total = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_exceeds_average() {
        let mut measure = RestartWindow::default();
        for _ in 0..20 {
            measure.record(2, 4);
        }
        assert!(!measure.exceeded(4, 0.8));

        for _ in 0..4 {
            measure.record(10, 4);
        }
        assert!(measure.exceeded(4, 0.8));

        measure.reset_window();
        assert!(!measure.exceeded(4, 0.8));
    }
}
