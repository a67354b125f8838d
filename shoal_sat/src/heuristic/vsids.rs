/*!
A heuristic which selects the most active atom.

The activity of an atom is bumped whenever the atom takes part in analysis, with the bump growing after each conflict.
Growth of the bump is equivalent to the decay of every activity, and when an activity would exceed [ACTIVITY_LIMIT] every activity (and the bump) is rescaled.

See [VSIDS](crate::config::vsids) for the atoms which are bumped.
*/

use crate::{
    config::{Activity, Config},
    db::assignment::Assignment,
    generic::index_heap::IndexHeap,
    structures::{
        atom::Atom,
        literal::{CLiteral, Literal},
    },
};

use super::DecisionHeuristic;

/// The largest activity before a rescale.
pub const ACTIVITY_LIMIT: Activity = 1e100;

pub struct VSIDSHeuristic {
    /// Atoms without a value (and possibly others), ordered by activity.
    heap: IndexHeap<Activity>,

    /// The next bump.
    bump: Activity,

    /// The decay to apply to activity, expressed as growth of the bump.
    decay: Activity,
}

impl VSIDSHeuristic {
    pub fn from_config(config: &Config) -> Self {
        VSIDSHeuristic {
            heap: IndexHeap::default(),
            bump: config.atom_db.bump.value,
            decay: config.atom_db.decay.value,
        }
    }

    pub fn activity_of(&self, atom: Atom) -> Activity {
        *self.heap.value_at(atom as usize)
    }

    /// Rescores the activity of all atoms and the activity bump.
    fn rescore_activity(&mut self) {
        let factor = 1.0 / ACTIVITY_LIMIT;
        self.heap.scale_all(|v| v * factor);
        self.bump *= factor;
    }
}

impl DecisionHeuristic for VSIDSHeuristic {
    fn grow_to(&mut self, atom_count: usize) {
        let known = self.heap.capacity();
        self.heap.grow_to(atom_count);
        for atom in std::cmp::max(known, 1)..atom_count {
            self.heap.insert(atom);
        }
    }

    fn bump(&mut self, atoms: &[Atom]) {
        for atom in atoms {
            if self.activity_of(*atom) + self.bump > ACTIVITY_LIMIT {
                self.rescore_activity();
            }
            self.heap.set_value(*atom as usize, self.activity_of(*atom) + self.bump);
        }
    }

    fn decay(&mut self) {
        self.bump *= 1.0 / (1.0 - self.decay);
    }

    fn undo(&mut self, atom: Atom) {
        self.heap.insert(atom as usize);
    }

    fn select(&mut self, assignment: &Assignment) -> Option<Atom> {
        while let Some(atom) = self.heap.pop_max() {
            if assignment.is_free(CLiteral::new(atom as Atom, true)) {
                return Some(atom as Atom);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structures::{antecedent::Antecedent, literal::Literal};

    #[test]
    fn selects_most_active_free() {
        let mut assignment = Assignment::default();
        let atoms = (0..4).map(|_| assignment.add_atom()).collect::<Vec<_>>();

        let mut heuristic = VSIDSHeuristic::from_config(&Config::default());
        heuristic.grow_to(assignment.atom_count());

        heuristic.bump(&[atoms[2], atoms[3]]);
        heuristic.decay();
        heuristic.bump(&[atoms[3]]);

        assignment.assign(CLiteral::new(atoms[3], true), 1, Antecedent::None);
        assert_eq!(heuristic.select(&assignment), Some(atoms[2]));

        assignment.undo_trail(0, true);
        heuristic.undo(atoms[3]);
        assert_eq!(heuristic.select(&assignment), Some(atoms[3]));
    }

    #[test]
    fn rescale_keeps_order() {
        let mut heuristic = VSIDSHeuristic::from_config(&Config::default());
        heuristic.grow_to(3);
        heuristic.bump = ACTIVITY_LIMIT * 0.6;

        heuristic.bump(&[1]);
        heuristic.bump(&[1, 2]);

        assert!(heuristic.activity_of(1) <= ACTIVITY_LIMIT);
        assert!(heuristic.activity_of(1) > heuristic.activity_of(2));
    }
}
