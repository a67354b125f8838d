//! A heuristic which selects the free atom with the lowest index.
//!
//! Useful for tests, and for solvers of a portfolio which should differ from a VSIDS solver.

use crate::{
    db::assignment::Assignment,
    structures::{
        atom::Atom,
        literal::{CLiteral, Literal},
    },
};

use super::DecisionHeuristic;

#[derive(Default)]
pub struct StaticOrder {
    atom_count: usize,

    /// Every atom below the cursor has a value.
    cursor: usize,
}

impl DecisionHeuristic for StaticOrder {
    fn grow_to(&mut self, atom_count: usize) {
        self.atom_count = std::cmp::max(self.atom_count, atom_count);
    }

    fn undo(&mut self, atom: Atom) {
        self.cursor = std::cmp::min(self.cursor, atom as usize);
    }

    fn select(&mut self, assignment: &Assignment) -> Option<Atom> {
        self.cursor = std::cmp::max(self.cursor, 1);
        while self.cursor < self.atom_count {
            if assignment.is_free(CLiteral::new(self.cursor as Atom, true)) {
                return Some(self.cursor as Atom);
            }
            self.cursor += 1;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structures::antecedent::Antecedent;

    #[test]
    fn lowest_free() {
        let mut assignment = Assignment::default();
        for _ in 0..3 {
            assignment.add_atom();
        }
        let mut heuristic = StaticOrder::default();
        heuristic.grow_to(assignment.atom_count());

        assert_eq!(heuristic.select(&assignment), Some(1));
        assignment.assign(CLiteral::new(1, false), 1, Antecedent::None);
        assignment.assign(CLiteral::new(2, true), 1, Antecedent::None);
        assert_eq!(heuristic.select(&assignment), Some(3));

        assignment.undo_trail(1, false);
        heuristic.undo(2);
        assert_eq!(heuristic.select(&assignment), Some(2));
    }
}
