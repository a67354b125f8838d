/*!
Watch lists for long clauses.

Each long clause watches two of its literals, and is visited when either watched literal becomes false.
As propagation visits literals when the literals become true, the clauses watching a literal `w` are listed under the negation of `w`.

So, `lists[p.index()]` is the list of clauses to visit when `p` becomes true.

Watch lists are cleaned lazily: when a clause is removed from the clause database the key of the clause may remain, and is dropped when next visited.
*/

use crate::{
    db::ClauseKey,
    structures::literal::{CLiteral, Literal},
};

/// Watch lists for each literal.
#[derive(Default)]
pub struct Watches {
    lists: Vec<Vec<ClauseKey>>,
}

impl Watches {
    /// Ensures there are lists for every literal of atoms below `atom_count`.
    pub fn grow_to(&mut self, atom_count: usize) {
        if self.lists.len() < atom_count * 2 {
            self.lists.resize_with(atom_count * 2, Vec::default);
        }
    }

    /// Notes that the clause of `key` watches `literal`.
    pub fn watch(&mut self, literal: CLiteral, key: ClauseKey) {
        self.lists[literal.negate().index()].push(key);
    }

    /// Removes the note that the clause of `key` watches `literal`.
    pub fn unwatch(&mut self, literal: CLiteral, key: ClauseKey) {
        let list = &mut self.lists[literal.negate().index()];
        if let Some(position) = list.iter().position(|k| *k == key) {
            list.swap_remove(position);
        }
    }

    /// The count of clauses which watch `literal`.
    pub fn count(&self, literal: CLiteral) -> usize {
        self.lists[literal.negate().index()].len()
    }

    /// Takes the list of clauses to visit when `literal` becomes true.
    ///
    /// The list should be [restored](Watches::restore) after use.
    pub fn take(&mut self, literal: CLiteral) -> Vec<ClauseKey> {
        std::mem::take(&mut self.lists[literal.index()])
    }

    /// Restores a list taken for `literal`, keeping any entries added while the list was taken.
    pub fn restore(&mut self, literal: CLiteral, mut list: Vec<ClauseKey>) {
        let slot = &mut self.lists[literal.index()];
        if !slot.is_empty() {
            list.append(slot);
        }
        *slot = list;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_on_negation() {
        let mut watches = Watches::default();
        watches.grow_to(3);

        let p = CLiteral::new(2, true);
        let key = ClauseKey::Original(0);
        watches.watch(p, key);

        assert_eq!(watches.count(p), 1);
        assert_eq!(watches.take(-p), vec![key]);
        assert!(watches.take(p).is_empty());
    }

    #[test]
    fn restore_keeps_additions() {
        let mut watches = Watches::default();
        watches.grow_to(3);

        let p = CLiteral::new(1, false);
        watches.watch(-p, ClauseKey::Original(0));

        let list = watches.take(p);
        watches.watch(-p, ClauseKey::Original(1));
        watches.restore(p, list);

        assert_eq!(watches.count(-p), 2);
        watches.unwatch(-p, ClauseKey::Original(0));
        assert_eq!(watches.take(p), vec![ClauseKey::Original(1)]);
    }
}
