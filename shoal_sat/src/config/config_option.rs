use crate::solver::SolverState;

/// A configurable value, along with the bounds on the value and the latest state of a solver at which the value may be changed.
#[derive(Clone)]
pub struct ConfigOption<T> {
    pub name: &'static str,
    pub min: T,
    pub max: T,
    pub max_state: SolverState,
    pub value: T,
}

impl<T: Clone> ConfigOption<T> {
    pub fn min_max(&self) -> (T, T) {
        (self.min.clone(), self.max.clone())
    }
}

impl<T: Clone + PartialOrd> ConfigOption<T> {
    /// Sets the value of the option, if the value is within bounds and the state permits a change.
    ///
    /// Returns true if the value was set, and false otherwise.
    pub fn set(&mut self, value: T, state: SolverState) -> bool {
        if state > self.max_state || value < self.min || value > self.max {
            return false;
        }
        self.value = value;
        true
    }
}
