/*!
The assignment of values to atoms, and the trail of assigned literals.

For each atom, the assignment records:
- The [value](Value) of the atom.
- The decision level at which the atom was assigned.
- The [antecedent](Antecedent) of the assignment, i.e. the reason the atom has the value.
- Some optional data, with `u32::MAX` standing for 'no data'.
- The saved phase of the atom, i.e. the value the atom had before the value was last undone.
- Some marks used during analysis.

And, the trail lists every assigned literal in order of assignment, with the propagation queue given by a cursor into the trail.
Literals on the trail from the cursor on are assigned, but have not been propagated.

```rust
# use shoal_sat::db::assignment::Assignment;
# use shoal_sat::structures::antecedent::Antecedent;
# use shoal_sat::structures::literal::{CLiteral, Literal};
# use shoal_sat::structures::value::Value;
let mut assignment = Assignment::default();
let p = CLiteral::new(assignment.add_atom(), true);
let q = CLiteral::new(assignment.add_atom(), false);

assert!(assignment.assign(p, 1, Antecedent::None));
assert!(assignment.assign(q, 1, Antecedent::Binary(p)));
assert!(!assignment.assign(-q, 1, Antecedent::None));

assert_eq!(assignment.q_pop(), Some(p));
assert_eq!(assignment.literal_value(-q), Value::False);

assignment.undo_trail(1, true);
assert_eq!(assignment.trail(), &[p]);
assert_eq!(assignment.saved_phase(q.atom()), Value::False);
```

# Notes
- The atom `0` is assigned true at level zero on construction, and is never on the trail.
- Undoing the trail never touches the atom `0`.
*/

use crate::{
    db::LevelIndex,
    structures::{
        antecedent::Antecedent,
        atom::Atom,
        literal::{CLiteral, Literal},
        value::Value,
    },
};

/// Marks on atoms, used during analysis.
pub mod marks {
    /// The atom has been seen during resolution.
    pub const SEEN: u8 = 1;

    /// The atom has been shown to be redundant during minimization.
    pub const REMOVABLE: u8 = 2;

    /// The atom has been shown to not be redundant during minimization.
    pub const POISON: u8 = 4;
}

/// The maximum decision level.
pub const MAX_LEVEL: LevelIndex = (1 << 28) - 1;

/// The representation of 'no data'.
pub const NO_DATA: u32 = u32::MAX;

/// The assignment, and trail.
pub struct Assignment {
    values: Vec<Value>,
    levels: Vec<LevelIndex>,
    reasons: Vec<Antecedent>,
    data: Vec<u32>,
    phases: Vec<Value>,
    marks: Vec<u8>,

    /// The assigned literals, in order of assignment.
    trail: Vec<CLiteral>,

    /// The index of the next literal on the trail to propagate.
    q_head: usize,
}

impl Default for Assignment {
    fn default() -> Self {
        Assignment {
            values: vec![Value::True],
            levels: vec![0],
            reasons: vec![Antecedent::None],
            data: vec![NO_DATA],
            phases: vec![Value::True],
            marks: vec![0],
            trail: Vec::default(),
            q_head: 0,
        }
    }
}

impl Assignment {
    /// Adds a fresh (free) atom to the assignment and returns the atom.
    pub fn add_atom(&mut self) -> Atom {
        let atom = self.values.len() as Atom;
        self.values.push(Value::Free);
        self.levels.push(0);
        self.reasons.push(Antecedent::None);
        self.data.push(NO_DATA);
        self.phases.push(Value::Free);
        self.marks.push(0);
        atom
    }

    /// The count of atoms, including the atom `0`.
    pub fn atom_count(&self) -> usize {
        self.values.len()
    }

    /// The count of atoms without a value.
    pub fn free_count(&self) -> usize {
        (self.values.len() - 1) - self.trail.len()
    }

    pub fn value_of(&self, atom: Atom) -> Value {
        self.values[atom as usize]
    }

    /// The value of `literal`, i.e. true if the atom of the literal has the polarity of the literal.
    pub fn literal_value(&self, literal: CLiteral) -> Value {
        match (self.values[literal.atom() as usize], literal.polarity()) {
            (Value::Free, _) => Value::Free,
            (Value::True, true) | (Value::False, false) => Value::True,
            _ => Value::False,
        }
    }

    #[inline(always)]
    pub fn is_true(&self, literal: CLiteral) -> bool {
        self.values[literal.atom() as usize] == Value::of_literal(literal)
    }

    #[inline(always)]
    pub fn is_false(&self, literal: CLiteral) -> bool {
        self.values[literal.atom() as usize] == Value::of_literal(literal.negate())
    }

    #[inline(always)]
    pub fn is_free(&self, literal: CLiteral) -> bool {
        self.values[literal.atom() as usize] == Value::Free
    }

    /// The level at which `atom` was assigned.
    /// The level of a free atom is not meaningful.
    pub fn level(&self, atom: Atom) -> LevelIndex {
        self.levels[atom as usize]
    }

    pub fn reason(&self, atom: Atom) -> Antecedent {
        self.reasons[atom as usize]
    }

    /// Revises the reason for the value of an (assigned) atom.
    pub fn set_reason(&mut self, atom: Atom, antecedent: Antecedent) {
        self.reasons[atom as usize] = antecedent;
    }

    /// The data of `atom`, if any.
    pub fn data(&self, atom: Atom) -> Option<u32> {
        match self.data[atom as usize] {
            NO_DATA => None,
            data => Some(data),
        }
    }

    /// The value `atom` had before the value was last undone.
    pub fn saved_phase(&self, atom: Atom) -> Value {
        self.phases[atom as usize]
    }

    /// Assigns `literal` true, if free.
    ///
    /// Returns true if `literal` is true after the call, and false otherwise.
    #[inline(always)]
    pub fn assign(&mut self, literal: CLiteral, level: LevelIndex, antecedent: Antecedent) -> bool {
        self.assign_with_data(literal, level, antecedent, NO_DATA)
    }

    /// As [assign](Assignment::assign), with some data.
    pub fn assign_with_data(
        &mut self,
        literal: CLiteral,
        level: LevelIndex,
        antecedent: Antecedent,
        data: u32,
    ) -> bool {
        let atom = literal.atom() as usize;
        match self.values[atom] {
            Value::Free => {
                self.values[atom] = Value::of_literal(literal);
                self.levels[atom] = level;
                self.reasons[atom] = antecedent;
                self.data[atom] = data;
                self.trail.push(literal);
                true
            }
            value => value == Value::of_literal(literal),
        }
    }

    /// Undoes every assignment on the trail from `first` on, optionally saving the phase of undone atoms.
    pub fn undo_trail(&mut self, first: usize, save_phase: bool) {
        while self.trail.len() > first {
            self.undo_last(save_phase);
        }
        self.q_head = std::cmp::min(self.q_head, first);
    }

    /// Undoes the last assignment on the trail, and returns the literal undone.
    pub fn undo_last(&mut self, save_phase: bool) -> Option<CLiteral> {
        let literal = self.trail.pop()?;
        let atom = literal.atom() as usize;
        if save_phase {
            self.phases[atom] = self.values[atom];
        }
        self.values[atom] = Value::Free;
        self.reasons[atom] = Antecedent::None;
        self.data[atom] = NO_DATA;
        self.q_head = std::cmp::min(self.q_head, self.trail.len());
        Some(literal)
    }

    /// The next literal to propagate, if any.
    #[inline(always)]
    pub fn q_pop(&mut self) -> Option<CLiteral> {
        let literal = self.trail.get(self.q_head).copied();
        if literal.is_some() {
            self.q_head += 1;
        }
        literal
    }

    pub fn q_empty(&self) -> bool {
        self.q_head == self.trail.len()
    }

    /// Marks every literal on the trail as propagated.
    pub fn q_reset(&mut self) {
        self.q_head = self.trail.len();
    }

    pub fn trail(&self) -> &[CLiteral] {
        &self.trail
    }

    pub fn mark(&mut self, atom: Atom, mark: u8) {
        self.marks[atom as usize] |= mark;
    }

    pub fn marked(&self, atom: Atom, mark: u8) -> bool {
        self.marks[atom as usize] & mark != 0
    }

    pub fn clear_marks(&mut self, atom: Atom) {
        self.marks[atom as usize] = 0;
    }

    /// The true literals of every assigned atom other than `0`, ordered by atom.
    pub fn true_literals(&self) -> Vec<CLiteral> {
        self.values
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(atom, value)| match value {
                Value::Free => None,
                Value::True => Some(CLiteral::new(atom as Atom, true)),
                Value::False => Some(CLiteral::new(atom as Atom, false)),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_atom() {
        let assignment = Assignment::default();
        assert!(assignment.is_true(CLiteral::TRUE));
        assert!(assignment.is_false(CLiteral::FALSE));
        assert_eq!(assignment.free_count(), 0);
        assert!(assignment.trail().is_empty());
    }

    #[test]
    fn queue() {
        let mut assignment = Assignment::default();
        let p = CLiteral::new(assignment.add_atom(), true);
        let q = CLiteral::new(assignment.add_atom(), true);

        assignment.assign(p, 0, Antecedent::None);
        assignment.assign(q, 0, Antecedent::Binary(p));

        assert_eq!(assignment.q_pop(), Some(p));
        assignment.q_reset();
        assert!(assignment.q_empty());
        assert_eq!(assignment.q_pop(), None);
        assert_eq!(assignment.reason(q.atom()), Antecedent::Binary(p));
    }

    #[test]
    fn undo_resets_queue() {
        let mut assignment = Assignment::default();
        let atoms = (0..4).map(|_| assignment.add_atom()).collect::<Vec<_>>();
        for atom in &atoms {
            assignment.assign_with_data(CLiteral::new(*atom, false), 1, Antecedent::None, 7);
        }
        assignment.q_reset();

        assignment.undo_trail(2, false);

        assert_eq!(assignment.free_count(), 2);
        assert_eq!(assignment.q_pop(), None);
        assert_eq!(assignment.data(atoms[0]), Some(7));
        assert_eq!(assignment.data(atoms[3]), None);
        assert_eq!(assignment.saved_phase(atoms[3]), Value::Free);
    }

    #[test]
    fn marks() {
        let mut assignment = Assignment::default();
        let atom = assignment.add_atom();

        assignment.mark(atom, marks::SEEN);
        assignment.mark(atom, marks::POISON);
        assert!(assignment.marked(atom, marks::SEEN));
        assert!(!assignment.marked(atom, marks::REMOVABLE));

        assignment.clear_marks(atom);
        assert!(!assignment.marked(atom, marks::SEEN));
    }
}
