/*!
Guiding paths.

A guiding path is a sequence of literals a solver assumes before a search, restricting the search to some part of the search space.

When a solver with a path is asked to split, the solver:
1. Extends its path with the decisions (and any literals implied below the root) of its root levels.
2. Raises its root level by one, so the current top decision becomes part of the path of the solver.
3. Gives away the path extended with the negation of the top decision.

As the solver never undoes a root level while on the path, the two paths cover disjoint parts of the search space.
Updates to the path are lazy, and only made on a split.
*/

use crate::{
    solver::Solver,
    structures::literal::{CLiteral, Literal},
};

/// Some work for a solver of a portfolio.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Work {
    /// The literals to assume.
    pub literals: Vec<CLiteral>,

    /// True if the work is the initial path of the portfolio, rather than a split of some path.
    pub initial: bool,
}

/// How a path may be used.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathKind {
    /// The path is disjoint from the path of any other solver, and may be split.
    Split,

    /// The path is (possibly) shared with other solvers, and must not be split.
    Fixed,
}

/// The guiding path of a solver.
#[derive(Debug)]
pub struct GuidingPath {
    /// The path, as known at the last split.
    pub path: Vec<CLiteral>,

    /// The position on the trail to which the path has been updated.
    pub position: usize,

    /// A count of the literals of the path implied below the level of their assignment.
    pub implied: u32,

    /// The number of conflicts on the path after which a global restart is requested.
    pub restart: u64,

    /// The count of conflicts of the solver when the path was taken.
    pub conflicts_at_start: usize,

    kind: Option<PathKind>,
}

impl Default for GuidingPath {
    fn default() -> Self {
        GuidingPath {
            path: Vec::default(),
            position: 0,
            implied: 0,
            restart: u64::MAX,
            conflicts_at_start: 0,
            kind: None,
        }
    }
}

impl GuidingPath {
    /// Resets the path for some fresh work of the given kind.
    pub fn reset(&mut self, restart: u64, kind: Option<PathKind>, conflicts: usize) {
        self.path.clear();
        self.position = 0;
        self.implied = 0;
        self.restart = restart;
        self.conflicts_at_start = conflicts;
        self.kind = kind;
    }

    /// True if the solver has a path.
    pub fn has_path(&self) -> bool {
        self.kind.is_some()
    }

    /// True if the path is disjoint from the path of any other solver.
    pub fn disjoint(&self) -> bool {
        self.kind == Some(PathKind::Split)
    }

    pub fn kind(&self) -> Option<PathKind> {
        self.kind
    }

    /// Splits the path of `solver`, returning the path given away.
    ///
    /// Requires the solver to be [splittable](crate::solver::GenericSolver::splittable).
    pub fn split(&mut self, solver: &mut Solver) -> Vec<CLiteral> {
        solver.update_guiding_path(&mut self.path, &mut self.position, &mut self.implied);

        let mut split = self.path.clone();
        solver.push_root_level(1);
        split.push(solver.decision(solver.root_level()).negate());
        split
    }

    /// True if the solver has made at least `restart` conflicts on the path.
    pub fn restart_due(&self, conflicts: usize) -> bool {
        conflicts.saturating_sub(self.conflicts_at_start) as u64 >= self.restart
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn split_gives_complement() {
        let mut solver = Solver::from_config(Config::default());
        let [a, b, _c] = *solver.fresh_or_max_literals(3).as_slice() else {
            panic!("Insufficient literals");
        };
        let mut gp = GuidingPath::default();
        gp.reset(u64::MAX, Some(PathKind::Split), 0);

        assert!(solver.assume(a));
        assert!(solver.splittable());
        assert_eq!(gp.split(&mut solver), vec![-a]);
        assert_eq!(solver.root_level(), 1);
        assert!(!solver.splittable());

        assert!(solver.assume(b));
        assert_eq!(gp.split(&mut solver), vec![a, -b]);
        assert_eq!(gp.path, vec![a]);
        assert_eq!(solver.root_level(), 2);
    }

    #[test]
    fn restart_counts_from_start() {
        let mut gp = GuidingPath::default();
        assert!(!gp.has_path());

        gp.reset(10, Some(PathKind::Fixed), 5);
        assert!(gp.has_path());
        assert!(!gp.disjoint());
        assert!(!gp.restart_due(14));
        assert!(gp.restart_due(15));
    }
}
