/*!
The short implication graph, which holds every binary and ternary clause.

Binary and ternary clauses are not stored as clauses.
Instead, for each literal `p` the graph lists the implications of `p` becoming true:
- The binary clause `p ∨ q` is listed under `-p` as `q`, and under `-q` as `p`.
- The ternary clause `p ∨ q ∨ r` is listed under `-p` as `(q, r)`, under `-q` as `(p, r)`, and under `-r` as `(p, q)`.

Propagation of `p` then visits the implications listed under `p`:
- For a binary implication `q`, if `q` is not true then `q` is forced with reason `p`.
- For a ternary implication `(q, r)`, if one of `q` or `r` is false and the other is not true, the other is forced with reason `p` and the negation of the false literal.

# Sharing

The graph is shared between every solver attached to a [shared context](crate::shared::SharedContext), behind an [Arc](std::sync::Arc).
While unique, clauses are added to plain lists (see [add_binary](ShortImplicationsGraph::add_binary)), and the graph may be [simplified](ShortImplicationsGraph::remove_true).
Once shared, the plain lists are immutable, and learnt clauses are appended to per-literal lists of [blocks](block) without locks on the list (see [add_learnt_binary](ShortImplicationsGraph::add_learnt_binary)).
So, a clause learnt by one solver is immediately visible to every other solver.

A learnt clause need not be propagated by a solver which did not learn the clause, as every learnt clause is a consequence of the formula.
*/

pub mod block;

use std::sync::atomic::{AtomicPtr, AtomicU32, Ordering};

use block::{Block, BLOCK_CAP, UNARY};
use crossbeam::utils::Backoff;

use crate::{
    db::{assignment::Assignment, LevelIndex},
    misc::log::targets::{self},
    structures::{
        antecedent::Antecedent,
        literal::{CLiteral, Literal},
        value::Value,
    },
};

/// The implications of some literal.
#[derive(Default)]
struct ImplicationList {
    /// Binary implications, with a flag for learnt clauses.
    binary: Vec<(CLiteral, bool)>,

    /// Ternary implications, with a flag for learnt clauses.
    ternary: Vec<(CLiteral, CLiteral, bool)>,

    /// The newest block of learnt implications added while shared.
    learnt: AtomicPtr<Block>,
}

impl ImplicationList {
    /// Calls `f` on each learnt implication, with the second literal of a binary implication as None.
    fn for_each_learnt(&self, mut f: impl FnMut(CLiteral, Option<CLiteral>) -> bool) -> bool {
        let mut block_ptr = self.learnt.load(Ordering::Acquire);
        while !block_ptr.is_null() {
            // SAFETY: Published blocks are fully initialised and only freed on drop of the list, which requires exclusive access.
            let block = unsafe { &*block_ptr };
            let size = block.size();
            let mut index = 0;
            while index < size {
                let slot = block.slot(index);
                let keep_going = match slot & UNARY {
                    0 => {
                        let r = CLiteral::from_index(block.slot(index + 1));
                        index += 2;
                        f(CLiteral::from_index(slot), Some(r))
                    }
                    _ => {
                        index += 1;
                        f(CLiteral::from_index(slot & !UNARY), None)
                    }
                };
                if !keep_going {
                    return false;
                }
            }
            block_ptr = block.next;
        }
        true
    }

    /// True if a learnt implication subsumes the implication of `q` (and `r`).
    fn has_learnt(&self, q: CLiteral, r: Option<CLiteral>) -> bool {
        let mut found = false;
        self.for_each_learnt(|a, b| {
            if a == q || Some(a) == r {
                match b {
                    None => found = true,
                    Some(b) => found = r.is_some() && (b == q || Some(b) == r),
                }
            }
            !found
        });
        found
    }

    /// Appends a learnt implication.
    fn add_learnt(&self, q: CLiteral, r: Option<CLiteral>) {
        let entries: &[u32] = match r {
            None => &[q.index() as u32 | UNARY],
            Some(r) => &[q.index() as u32, r.index() as u32],
        };
        let backoff = Backoff::new();
        loop {
            let head = self.learnt.load(Ordering::Acquire);
            if head.is_null() {
                let fresh = Box::into_raw(Box::<Block>::default());
                if self
                    .learnt
                    .compare_exchange(head, fresh, Ordering::AcqRel, Ordering::Acquire)
                    .is_err()
                {
                    // SAFETY: The block was never published.
                    drop(unsafe { Box::from_raw(fresh) });
                }
                continue;
            }

            // SAFETY: As with reads, published blocks are live.
            let block = unsafe { &*head };
            if let Some(size) = block.try_lock() {
                if size + entries.len() <= BLOCK_CAP {
                    block.add_unlock(size, entries);
                } else {
                    // The full block stays locked.
                    let mut fresh = Box::<Block>::default();
                    fresh.add_unlock(0, entries);
                    fresh.next = head;
                    self.learnt.store(Box::into_raw(fresh), Ordering::Release);
                }
                return;
            }
            backoff.snooze();
        }
    }

    /// Frees every learnt block.
    fn clear_learnt(&mut self) {
        let mut block_ptr = std::mem::replace(self.learnt.get_mut(), std::ptr::null_mut());
        while !block_ptr.is_null() {
            // SAFETY: Exclusive access, and each block was allocated by a box.
            let block = unsafe { Box::from_raw(block_ptr) };
            block_ptr = block.next;
        }
    }
}

impl Drop for ImplicationList {
    fn drop(&mut self) {
        self.clear_learnt();
    }
}

/// The short implication graph.
#[derive(Default)]
pub struct ShortImplicationsGraph {
    lists: Vec<ImplicationList>,

    /// Counts of problem and learnt binary clauses.
    binary: [AtomicU32; 2],

    /// Counts of problem and learnt ternary clauses.
    ternary: [AtomicU32; 2],
}

impl ShortImplicationsGraph {
    /// Ensures there are lists for every literal of atoms below `atom_count`.
    pub fn grow_to(&mut self, atom_count: usize) {
        if self.lists.len() < atom_count * 2 {
            self.lists.resize_with(atom_count * 2, ImplicationList::default);
        }
    }

    /// The count of atoms the graph has lists for.
    pub fn atom_capacity(&self) -> usize {
        self.lists.len() / 2
    }

    /// The count of binary clauses, either problem or learnt.
    pub fn binary_count(&self, learnt: bool) -> u32 {
        self.binary[learnt as usize].load(Ordering::Relaxed)
    }

    /// The count of ternary clauses, either problem or learnt.
    pub fn ternary_count(&self, learnt: bool) -> u32 {
        self.ternary[learnt as usize].load(Ordering::Relaxed)
    }

    /// The count of implications listed under `p`.
    pub fn implication_count(&self, p: CLiteral) -> usize {
        let list = &self.lists[p.index()];
        let mut count = list.binary.len() + list.ternary.len();
        list.for_each_learnt(|_, _| {
            count += 1;
            true
        });
        count
    }

    /// Adds the binary clause `p ∨ q` to the (unshared) graph.
    pub fn add_binary(&mut self, p: CLiteral, q: CLiteral, learnt: bool) {
        log::trace!(target: targets::IMPLICATIONS, "Binary: {p} {q}");
        self.lists[p.negate().index()].binary.push((q, learnt));
        self.lists[q.negate().index()].binary.push((p, learnt));
        self.binary[learnt as usize].fetch_add(1, Ordering::Relaxed);
    }

    /// Adds the ternary clause `p ∨ q ∨ r` to the (unshared) graph.
    pub fn add_ternary(&mut self, p: CLiteral, q: CLiteral, r: CLiteral, learnt: bool) {
        log::trace!(target: targets::IMPLICATIONS, "Ternary: {p} {q} {r}");
        self.lists[p.negate().index()].ternary.push((q, r, learnt));
        self.lists[q.negate().index()].ternary.push((p, r, learnt));
        self.lists[r.negate().index()].ternary.push((p, q, learnt));
        self.ternary[learnt as usize].fetch_add(1, Ordering::Relaxed);
    }

    /// Adds the learnt binary clause `p ∨ q` to a (possibly) shared graph.
    ///
    /// Returns false if some learnt clause already subsumes the clause.
    pub fn add_learnt_binary(&self, p: CLiteral, q: CLiteral) -> bool {
        if self.lists[p.negate().index()].has_learnt(q, None) {
            return false;
        }
        log::trace!(target: targets::IMPLICATIONS, "Learnt binary: {p} {q}");
        self.lists[p.negate().index()].add_learnt(q, None);
        self.lists[q.negate().index()].add_learnt(p, None);
        self.binary[1].fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Adds the learnt ternary clause `p ∨ q ∨ r` to a (possibly) shared graph.
    ///
    /// Returns false if some learnt clause already subsumes the clause.
    pub fn add_learnt_ternary(&self, p: CLiteral, q: CLiteral, r: CLiteral) -> bool {
        if self.lists[p.negate().index()].has_learnt(q, Some(r)) {
            return false;
        }
        log::trace!(target: targets::IMPLICATIONS, "Learnt ternary: {p} {q} {r}");
        self.lists[p.negate().index()].add_learnt(q, Some(r));
        self.lists[q.negate().index()].add_learnt(p, Some(r));
        self.lists[r.negate().index()].add_learnt(p, Some(q));
        self.ternary[1].fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Propagates the (true) literal `p`, forcing implied literals at `level`.
    ///
    /// Returns false on a conflict, in which case `conflict` holds true literals whose conjunction is contradictory.
    pub fn propagate(
        &self,
        p: CLiteral,
        level: LevelIndex,
        assignment: &mut Assignment,
        conflict: &mut Vec<CLiteral>,
    ) -> bool {
        let list = &self.lists[p.index()];

        for (q, _) in &list.binary {
            if !Self::imply_unary(p, *q, level, assignment, conflict) {
                return false;
            }
        }

        for (q, r, _) in &list.ternary {
            if !Self::imply_binary(p, *q, *r, level, assignment, conflict) {
                return false;
            }
        }

        list.for_each_learnt(|q, r| match r {
            None => Self::imply_unary(p, q, level, assignment, conflict),
            Some(r) => Self::imply_binary(p, q, r, level, assignment, conflict),
        })
    }

    fn imply_unary(
        p: CLiteral,
        q: CLiteral,
        level: LevelIndex,
        assignment: &mut Assignment,
        conflict: &mut Vec<CLiteral>,
    ) -> bool {
        match assignment.literal_value(q) {
            Value::True => true,
            Value::Free => assignment.assign(q, level, Antecedent::Binary(p)),
            Value::False => {
                conflict.clear();
                conflict.extend([p, q.negate()]);
                false
            }
        }
    }

    fn imply_binary(
        p: CLiteral,
        q: CLiteral,
        r: CLiteral,
        level: LevelIndex,
        assignment: &mut Assignment,
        conflict: &mut Vec<CLiteral>,
    ) -> bool {
        match (assignment.literal_value(q), assignment.literal_value(r)) {
            (Value::True, _) | (_, Value::True) | (Value::Free, Value::Free) => true,
            (Value::False, Value::False) => {
                conflict.clear();
                conflict.extend([p, q.negate(), r.negate()]);
                false
            }
            (Value::False, Value::Free) => {
                assignment.assign(r, level, Antecedent::Ternary(p, q.negate()))
            }
            (Value::Free, Value::False) => {
                assignment.assign(q, level, Antecedent::Ternary(p, r.negate()))
            }
        }
    }

    /// Removes every clause satisfied by `p`, and shortens every ternary clause containing `-p` to a binary clause, where the remaining literals are free.
    ///
    /// Requires `p` to be true at level zero, and the graph to be unshared.
    pub fn remove_true(&mut self, p: CLiteral, assignment: &Assignment) {
        let satisfied = std::mem::take(&mut self.lists[p.negate().index()]);
        for (q, learnt) in &satisfied.binary {
            self.binary[*learnt as usize].fetch_sub(1, Ordering::Relaxed);
            self.lists[q.negate().index()].binary.retain(|(x, _)| *x != p);
        }
        for (q, r, learnt) in &satisfied.ternary {
            self.ternary[*learnt as usize].fetch_sub(1, Ordering::Relaxed);
            self.remove_ternary_with(q.negate(), p);
            self.remove_ternary_with(r.negate(), p);
        }

        let shortened = std::mem::take(&mut self.lists[p.index()]);
        for (q, r, learnt) in &shortened.ternary {
            self.ternary[*learnt as usize].fetch_sub(1, Ordering::Relaxed);
            self.remove_ternary_with(q.negate(), p.negate());
            self.remove_ternary_with(r.negate(), p.negate());
            if assignment.is_free(*q) && assignment.is_free(*r) {
                self.add_binary(*q, *r, *learnt);
            }
        }
    }

    fn remove_ternary_with(&mut self, list: CLiteral, x: CLiteral) {
        let ternary = &mut self.lists[list.index()].ternary;
        if let Some(position) = ternary.iter().position(|(a, b, _)| *a == x || *b == x) {
            ternary.swap_remove(position);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn setup(atoms: usize) -> (ShortImplicationsGraph, Assignment, Vec<CLiteral>) {
        let mut graph = ShortImplicationsGraph::default();
        let mut assignment = Assignment::default();
        let literals = (0..atoms)
            .map(|_| CLiteral::new(assignment.add_atom(), true))
            .collect::<Vec<_>>();
        graph.grow_to(assignment.atom_count());
        (graph, assignment, literals)
    }

    #[test]
    fn binary_propagation() {
        let (mut graph, mut assignment, lits) = setup(2);
        let (p, q) = (lits[0], lits[1]);
        graph.add_binary(p, q, false);

        let mut conflict = Vec::default();
        assignment.assign(-p, 1, Antecedent::None);
        assert!(graph.propagate(-p, 1, &mut assignment, &mut conflict));
        assert!(assignment.is_true(q));
        assert_eq!(assignment.reason(q.atom()), Antecedent::Binary(-p));
    }

    #[test]
    fn ternary_propagation_and_conflict() {
        let (mut graph, mut assignment, lits) = setup(3);
        let (p, q, r) = (lits[0], lits[1], lits[2]);
        graph.add_ternary(p, q, r, false);

        let mut conflict = Vec::default();
        assignment.assign(-p, 1, Antecedent::None);
        assert!(graph.propagate(-p, 1, &mut assignment, &mut conflict));
        assert!(assignment.is_free(q) && assignment.is_free(r));

        assignment.assign(-q, 1, Antecedent::None);
        assert!(graph.propagate(-q, 1, &mut assignment, &mut conflict));
        assert_eq!(assignment.reason(r.atom()), Antecedent::Ternary(-q, -p));

        assignment.undo_last(false);
        assignment.assign(-r, 1, Antecedent::None);
        assert!(!graph.propagate(-p, 1, &mut assignment, &mut conflict));
        assert_eq!(conflict, vec![-p, -q, -r]);
    }

    #[test]
    fn learnt_subsumption() {
        let (graph, _, lits) = setup(3);
        let (p, q, r) = (lits[0], lits[1], lits[2]);

        assert!(graph.add_learnt_binary(p, q));
        assert!(!graph.add_learnt_binary(p, q));
        assert!(!graph.add_learnt_ternary(p, q, r));
        assert!(graph.add_learnt_ternary(-p, q, r));
        assert!(!graph.add_learnt_ternary(-p, r, q));

        assert_eq!(graph.binary_count(true), 1);
        assert_eq!(graph.ternary_count(true), 1);
    }

    #[test]
    fn learnt_blocks_overflow() {
        let (graph, mut assignment, lits) = setup(40);
        let p = lits[0];
        for q in &lits[1..] {
            graph.add_learnt_binary(p, *q);
        }
        assert_eq!(graph.implication_count(-p), 39);

        let mut conflict = Vec::default();
        assignment.assign(-p, 1, Antecedent::None);
        assert!(graph.propagate(-p, 1, &mut assignment, &mut conflict));
        assert!(lits[1..].iter().all(|q| assignment.is_true(*q)));
    }

    #[test]
    fn concurrent_learnt_additions() {
        let (graph, _, lits) = setup(401);
        let graph = Arc::new(graph);
        let p = lits[0];

        std::thread::scope(|scope| {
            for chunk in lits[1..].chunks(100) {
                let graph = graph.clone();
                scope.spawn(move || {
                    for q in chunk {
                        assert!(graph.add_learnt_binary(p, *q));
                    }
                });
            }
        });

        assert_eq!(graph.implication_count(-p), 400);
        assert_eq!(graph.binary_count(true), 400);
        for q in &lits[1..] {
            assert_eq!(graph.implication_count(-*q), 1);
        }
    }

    #[test]
    fn remove_true_shortens() {
        let (mut graph, mut assignment, lits) = setup(4);
        let (p, q, r, s) = (lits[0], lits[1], lits[2], lits[3]);
        graph.add_binary(p, s, false);
        graph.add_ternary(-p, q, r, false);

        assignment.assign(p, 0, Antecedent::None);
        graph.remove_true(p, &assignment);

        assert_eq!(graph.binary_count(false), 1);
        assert_eq!(graph.ternary_count(false), 0);
        assert_eq!(graph.implication_count(-s), 0);
        assert_eq!(graph.implication_count(-q), 1);
    }
}
