/*!
The representation of a (long) clause.

Every clause exposes exactly three head literals:
- Two watched literals, at positions `0` and `1`.
- A cache literal, at position `2`, which is tried first when a watched literal becomes false.

Remaining literals are held in the [body](ClauseBody) of the clause:
- [Inline](ClauseBody::Inline) for clauses of at most [MAX_SHORT_LEN] literals, padded with [CLiteral::FALSE].
- [Tail](ClauseBody::Tail) for longer clauses.
- [Contracted](ClauseBody::Contracted) for longer clauses whose tail ends with some hidden false literals, ordered by decreasing level.
  Hidden literals are ignored by propagation until the level of the first hidden literal is undone, at which point the clause is [re-extended](ClauseHead::undo_level).
- [Shared](ClauseBody::Shared) for clauses whose literals are [shared](SharedLiterals) between solvers.
  The head of a shared clause is a copy of three of the shared literals.

# Propagation

Propagation of a true literal `p` visits each clause watching `-p`.
If the other watch or the cache literal is true, the clause is satisfied.
Otherwise, the cache literal (if not false) or some non-false literal from the body replaces `-p` as a watch.
If there is no replacement, the other watch is forced, or the clause is conflicting.
*/

use crate::{
    db::{assignment::Assignment, clause::info::ClauseInfo, ClauseKey, LevelIndex},
    structures::{
        antecedent::Antecedent,
        literal::{CLiteral, Literal},
        value::Value,
    },
    types::err::{self},
};

use super::shared::SharedLiterals;

/// The longest clause whose literals are stored inline.
pub const MAX_SHORT_LEN: usize = 5;

/// The result of propagating a clause.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WatchResult {
    /// The clause continues to watch the literal.
    Keep,

    /// The clause now watches the given literal in place of the false literal.
    Moved(CLiteral),

    /// Every literal other than the given literal is false.
    Unit(CLiteral),

    /// Every literal is false.
    Conflict,
}

/// The result of simplifying a clause at level zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Simplified {
    /// The clause remains, possibly with fewer literals.
    Keep,

    /// The clause is satisfied, and may be removed.
    Remove,

    /// The clause remains, though has at most three literals.
    Short,
}

/// Literals of a clause beyond the head.
pub enum ClauseBody {
    /// Up to two literals, padded with [CLiteral::FALSE].
    Inline([CLiteral; 2]),

    /// A tail of literals, with a cursor from which to resume a search for a watch.
    Tail { tail: Vec<CLiteral>, cursor: usize },

    /// A tail of literals of which only the first `active` are visible.
    Contracted {
        tail: Vec<CLiteral>,
        active: usize,
        cursor: usize,
    },

    /// Literals shared with other solvers.
    Shared(SharedLiterals),
}

/// A long clause.
pub struct ClauseHead {
    key: ClauseKey,

    /// The watched literals, followed by the cache literal.
    head: [CLiteral; 3],

    pub info: ClauseInfo,

    body: ClauseBody,

    /// A clause held outside of the count of learnt clauses, and so exempt from reduction.
    pub(crate) held: bool,
}

impl ClauseHead {
    /// A local clause of the given literals, watching the first two literals.
    ///
    /// Requires at least two literals.
    pub fn local(key: ClauseKey, literals: &[CLiteral], info: ClauseInfo) -> Self {
        let mut head = [CLiteral::FALSE; 3];
        for (slot, literal) in head.iter_mut().zip(literals) {
            *slot = *literal;
        }

        let rest = literals.get(3..).unwrap_or_default();
        let body = match literals.len() <= MAX_SHORT_LEN {
            true => {
                let mut inline = [CLiteral::FALSE; 2];
                for (slot, literal) in inline.iter_mut().zip(rest) {
                    *slot = *literal;
                }
                ClauseBody::Inline(inline)
            }
            false => ClauseBody::Tail {
                tail: rest.to_vec(),
                cursor: 0,
            },
        };

        ClauseHead {
            key,
            head,
            info,
            body,
            held: false,
        }
    }

    /// A local clause of the given literals, watching the first two literals, and hiding every literal from `hide_from` on.
    ///
    /// Requires literals from `hide_from` on to be false and ordered by decreasing level.
    /// Returns the clause, and the level whose undo should be notified to the clause, if any.
    pub fn contracted(
        key: ClauseKey,
        literals: &[CLiteral],
        info: ClauseInfo,
        hide_from: usize,
        assignment: &Assignment,
    ) -> (Self, Option<LevelIndex>) {
        let mut clause = ClauseHead::local(key, literals, info);
        let hide_from = std::cmp::max(hide_from, 3);
        if let ClauseBody::Tail { tail, .. } = &mut clause.body {
            if hide_from < literals.len() {
                let level = assignment.level(literals[hide_from].atom());
                if level > 0 {
                    clause.body = ClauseBody::Contracted {
                        tail: std::mem::take(tail),
                        active: hide_from - 3,
                        cursor: 0,
                    };
                    return (clause, Some(level));
                }
                tail.truncate(hide_from - 3);
            }
        }
        (clause, None)
    }

    /// A clause of shared literals, with the given head.
    pub fn shared(key: ClauseKey, literals: SharedLiterals, head: [CLiteral; 3], info: ClauseInfo) -> Self {
        ClauseHead {
            key,
            head,
            info,
            body: ClauseBody::Shared(literals),
            held: false,
        }
    }

    pub fn key(&self) -> ClauseKey {
        self.key
    }

    pub fn body(&self) -> &ClauseBody {
        &self.body
    }

    /// The watched literals of the clause.
    pub fn watches(&self) -> [CLiteral; 2] {
        [self.head[0], self.head[1]]
    }

    pub fn cache(&self) -> CLiteral {
        self.head[2]
    }

    pub fn is_shared(&self) -> bool {
        matches!(self.body, ClauseBody::Shared(_))
    }

    pub fn is_contracted(&self) -> bool {
        matches!(self.body, ClauseBody::Contracted { .. })
    }

    /// The count of literals in the clause, including hidden literals.
    pub fn size(&self) -> usize {
        match &self.body {
            ClauseBody::Inline(inline) => {
                3 - (self.head[2] == CLiteral::FALSE) as usize
                    + inline.iter().filter(|l| **l != CLiteral::FALSE).count()
            }
            ClauseBody::Tail { tail, .. } | ClauseBody::Contracted { tail, .. } => 3 + tail.len(),
            ClauseBody::Shared(shared) => shared.size(),
        }
    }

    /// An estimate of the bytes used by the clause.
    pub fn bytes(&self) -> usize {
        let base = std::mem::size_of::<ClauseHead>();
        match &self.body {
            ClauseBody::Inline(_) | ClauseBody::Shared(_) => base,
            ClauseBody::Tail { tail, .. } | ClauseBody::Contracted { tail, .. } => {
                base + tail.capacity() * std::mem::size_of::<CLiteral>()
            }
        }
    }

    /// Extends `out` with the literals of the clause, including hidden literals.
    pub fn literals(&self, out: &mut Vec<CLiteral>) {
        match &self.body {
            ClauseBody::Shared(shared) => out.extend_from_slice(shared.literals()),
            ClauseBody::Inline(inline) => out.extend(
                self.head
                    .iter()
                    .chain(inline.iter())
                    .filter(|l| **l != CLiteral::FALSE),
            ),
            ClauseBody::Tail { tail, .. } | ClauseBody::Contracted { tail, .. } => {
                out.extend_from_slice(&self.head);
                out.extend_from_slice(tail);
            }
        }
    }

    /// Extends `out` with the negation of every literal of the clause other than `p`.
    ///
    /// If the clause is the reason for `p`, the literals added to `out` are true.
    pub fn reason(&self, p: CLiteral, out: &mut Vec<CLiteral>) {
        match &self.body {
            ClauseBody::Shared(shared) => {
                out.extend(shared.literals().iter().filter(|l| **l != p).map(|l| l.negate()))
            }
            ClauseBody::Inline(inline) => out.extend(
                self.head
                    .iter()
                    .chain(inline.iter())
                    .filter(|l| **l != p && **l != CLiteral::FALSE)
                    .map(|l| l.negate()),
            ),
            ClauseBody::Tail { tail, .. } | ClauseBody::Contracted { tail, .. } => out.extend(
                self.head
                    .iter()
                    .chain(tail.iter())
                    .filter(|l| **l != p)
                    .map(|l| l.negate()),
            ),
        }
    }

    /// True if some literal of the clause is true.
    pub fn satisfied(&self, assignment: &Assignment) -> bool {
        if self.head.iter().any(|l| assignment.is_true(*l)) {
            return true;
        }
        match &self.body {
            ClauseBody::Inline(inline) => inline.iter().any(|l| assignment.is_true(*l)),
            ClauseBody::Tail { tail, .. } | ClauseBody::Contracted { tail, .. } => {
                tail.iter().any(|l| assignment.is_true(*l))
            }
            ClauseBody::Shared(shared) => shared.literals().iter().any(|l| assignment.is_true(*l)),
        }
    }

    /// True if the clause is the reason for the value of one of its watched literals.
    pub fn locked(&self, assignment: &Assignment) -> bool {
        self.head[..2].iter().any(|w| {
            assignment.is_true(*w) && assignment.reason(w.atom()) == Antecedent::Clause(self.key)
        })
    }

    /// Propagates the clause, given `p` is true and the clause watches `-p`.
    ///
    /// On [WatchResult::Moved] the head has been revised, and the clause should be watched on the new literal.
    pub fn propagate(&mut self, p: CLiteral, assignment: &Assignment) -> WatchResult {
        let false_watch = (self.head[1] == p.negate()) as usize;
        let other = self.head[1 - false_watch];

        if assignment.is_true(other) || assignment.is_true(self.head[2]) {
            return WatchResult::Keep;
        }

        if !assignment.is_false(self.head[2]) {
            self.head.swap(false_watch, 2);
            return WatchResult::Moved(self.head[false_watch]);
        }

        if self.update_watch(false_watch, assignment) {
            return WatchResult::Moved(self.head[false_watch]);
        }

        match assignment.literal_value(other) {
            Value::False => WatchResult::Conflict,
            _ => WatchResult::Unit(other),
        }
    }

    /// Replaces the watch at `position` with some non-false literal from the body, if possible.
    ///
    /// Requires the cache literal to be false.
    pub fn update_watch(&mut self, position: usize, assignment: &Assignment) -> bool {
        match &mut self.body {
            ClauseBody::Inline(inline) => {
                for slot in inline.iter_mut() {
                    if !assignment.is_false(*slot) {
                        std::mem::swap(slot, &mut self.head[position]);
                        return true;
                    }
                }
                false
            }

            ClauseBody::Tail { tail, cursor } => {
                let visible = tail.len();
                Self::search_tail(&mut tail[..visible], cursor, &mut self.head[position], assignment)
            }

            ClauseBody::Contracted { tail, active, cursor } => {
                Self::search_tail(&mut tail[..*active], cursor, &mut self.head[position], assignment)
            }

            ClauseBody::Shared(shared) => {
                let other = self.head[1 - position];
                let literals = shared.literals();
                let Some(found) = literals
                    .iter()
                    .position(|l| *l != other && !assignment.is_false(*l))
                else {
                    return false;
                };
                self.head[position] = literals[found];

                // A fresh cache, from a few following literals.
                if let Some(cache) = literals[found + 1..]
                    .iter()
                    .take(7)
                    .find(|l| **l != other && !assignment.is_false(**l))
                {
                    self.head[2] = *cache;
                }
                true
            }
        }
    }

    fn search_tail(
        tail: &mut [CLiteral],
        cursor: &mut usize,
        watch: &mut CLiteral,
        assignment: &Assignment,
    ) -> bool {
        let start = std::cmp::min(*cursor, tail.len());
        let found = (start..tail.len())
            .chain(0..start)
            .find(|index| !assignment.is_false(tail[*index]));
        match found {
            Some(index) => {
                std::mem::swap(&mut tail[index], watch);
                *cursor = index + 1;
                true
            }
            None => false,
        }
    }

    /// The level at which the first hidden literal of a contracted clause was assigned.
    pub fn contraction_level(&self, assignment: &Assignment) -> Option<LevelIndex> {
        match &self.body {
            ClauseBody::Contracted { tail, active, .. } => {
                tail.get(*active).map(|l| assignment.level(l.atom()))
            }
            _ => None,
        }
    }

    /// Re-extends a contracted clause after a level has been undone.
    ///
    /// Hidden literals which are now free become visible.
    /// If the first remaining hidden literal was assigned at some level above zero, the level is returned and should notify the clause when undone.
    /// Otherwise, every remaining hidden literal is false at level zero, and these are dropped.
    pub fn undo_level(&mut self, assignment: &Assignment) -> Option<LevelIndex> {
        let ClauseBody::Contracted { tail, active, .. } = &mut self.body else {
            return None;
        };

        while *active < tail.len() && assignment.is_free(tail[*active]) {
            *active += 1;
        }

        if *active < tail.len() {
            let level = assignment.level(tail[*active].atom());
            if level > 0 && assignment.is_false(tail[*active]) {
                return Some(level);
            }
        }

        let mut tail = std::mem::take(tail);
        let active = *active;
        tail.truncate(active);
        self.body = ClauseBody::Tail { tail, cursor: 0 };
        None
    }

    /// Removes `p` from the clause.
    ///
    /// Returns true if `p` was removed, and false if `p` was not a literal of the clause.
    /// Watched literals and shared clauses are not strengthened, and an error is returned instead.
    pub fn strengthen(&mut self, p: CLiteral) -> Result<bool, err::ClauseDBError> {
        if self.head[..2].contains(&p) {
            return Err(err::ClauseDBError::StrengthenWatch);
        }

        match &mut self.body {
            ClauseBody::Shared(_) => Err(err::ClauseDBError::StrengthenShared),

            ClauseBody::Inline(inline) => {
                if self.head[2] == p {
                    self.head[2] = inline[0];
                    inline[0] = inline[1];
                    inline[1] = CLiteral::FALSE;
                    return Ok(true);
                }
                match inline.iter().position(|l| *l == p) {
                    Some(0) => {
                        inline[0] = inline[1];
                        inline[1] = CLiteral::FALSE;
                        Ok(true)
                    }
                    Some(_) => {
                        inline[1] = CLiteral::FALSE;
                        Ok(true)
                    }
                    None => Ok(false),
                }
            }

            ClauseBody::Tail { tail, cursor } => {
                if self.head[2] == p {
                    self.head[2] = match tail.is_empty() {
                        true => CLiteral::FALSE,
                        false => tail.swap_remove(0),
                    };
                    *cursor = 0;
                    return Ok(true);
                }
                match tail.iter().position(|l| *l == p) {
                    Some(index) => {
                        tail.swap_remove(index);
                        *cursor = 0;
                        Ok(true)
                    }
                    None => Ok(false),
                }
            }

            ClauseBody::Contracted { tail, active, cursor } => {
                let index = match self.head[2] == p {
                    true => match tail.is_empty() {
                        true => {
                            self.head[2] = CLiteral::FALSE;
                            return Ok(true);
                        }
                        false => {
                            self.head[2] = tail[0];
                            0
                        }
                    },
                    false => match tail.iter().position(|l| *l == p) {
                        Some(index) => index,
                        None => return Ok(false),
                    },
                };
                // Order is kept, as hidden literals are ordered by level.
                tail.remove(index);
                if index < *active {
                    *active -= 1;
                }
                *cursor = 0;
                Ok(true)
            }
        }
    }

    /// Simplifies the clause against the assignment at level zero.
    ///
    /// Requires every watched literal to be free, if the clause is not satisfied.
    pub fn simplify(&mut self, assignment: &Assignment) -> Simplified {
        if self.satisfied(assignment) {
            return Simplified::Remove;
        }

        match &mut self.body {
            ClauseBody::Shared(shared) => {
                let free = shared.simplify(assignment);
                if free == 0 {
                    return Simplified::Remove;
                }
                if free <= MAX_SHORT_LEN {
                    let mut literals = vec![self.head[0], self.head[1]];
                    literals.extend(
                        shared
                            .literals()
                            .iter()
                            .filter(|l| assignment.is_free(**l) && !self.head[..2].contains(l)),
                    );
                    let held = self.held;
                    *self = ClauseHead::local(self.key, &literals, self.info);
                    self.held = held;
                } else if assignment.is_false(self.head[2]) {
                    if let Some(cache) = shared
                        .literals()
                        .iter()
                        .find(|l| !assignment.is_false(**l) && !self.head[..2].contains(l))
                    {
                        self.head[2] = *cache;
                    }
                }
            }

            ClauseBody::Inline(_) | ClauseBody::Tail { .. } | ClauseBody::Contracted { .. } => {
                let mut literals = Vec::with_capacity(self.size());
                self.literals(&mut literals);
                if literals.iter().any(|l| assignment.is_false(*l)) {
                    literals.retain(|l| !assignment.is_false(*l));
                    let held = self.held;
                    *self = ClauseHead::local(self.key, &literals, self.info);
                    self.held = held;
                }
            }
        }

        match self.size() <= 3 {
            true => Simplified::Short,
            false => Simplified::Keep,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::clause::info::ClauseKind;

    fn setup(atoms: usize) -> (Assignment, Vec<CLiteral>) {
        let mut assignment = Assignment::default();
        let literals = (0..atoms)
            .map(|_| CLiteral::new(assignment.add_atom(), true))
            .collect();
        (assignment, literals)
    }

    fn info() -> ClauseInfo {
        ClauseInfo::new(ClauseKind::Conflict)
    }

    #[test]
    fn inline_propagation() {
        let (mut assignment, lits) = setup(4);
        let mut clause = ClauseHead::local(ClauseKey::Addition(0, 0), &lits, info());
        assert_eq!(clause.size(), 4);

        assignment.assign(-lits[0], 1, Antecedent::None);
        assert_eq!(clause.propagate(-lits[0], &assignment), WatchResult::Moved(lits[2]));
        assert_eq!(clause.watches(), [lits[2], lits[1]]);

        assignment.assign(-lits[2], 1, Antecedent::None);
        assert_eq!(clause.propagate(-lits[2], &assignment), WatchResult::Moved(lits[3]));

        assignment.assign(-lits[3], 1, Antecedent::None);
        assert_eq!(clause.propagate(-lits[3], &assignment), WatchResult::Unit(lits[1]));

        assignment.assign(-lits[1], 1, Antecedent::None);
        assert_eq!(clause.propagate(-lits[3], &assignment), WatchResult::Conflict);
    }

    #[test]
    fn tail_propagation_and_reason() {
        let (mut assignment, lits) = setup(8);
        let mut clause = ClauseHead::local(ClauseKey::Original(0), &lits, info());
        assert!(matches!(clause.body(), ClauseBody::Tail { .. }));

        for literal in &lits[2..7] {
            assignment.assign(-*literal, 1, Antecedent::None);
        }
        assignment.assign(-lits[0], 1, Antecedent::None);

        assert_eq!(clause.propagate(-lits[0], &assignment), WatchResult::Moved(lits[7]));
        assignment.assign(-lits[7], 1, Antecedent::None);
        assert_eq!(clause.propagate(-lits[7], &assignment), WatchResult::Unit(lits[1]));

        let mut reason = Vec::default();
        clause.reason(lits[1], &mut reason);
        reason.sort();
        let mut expected = lits.iter().filter(|l| **l != lits[1]).map(|l| -*l).collect::<Vec<_>>();
        expected.sort();
        assert_eq!(reason, expected);
    }

    #[test]
    fn contraction() {
        let (mut assignment, lits) = setup(8);
        for (level, literal) in lits[4..].iter().rev().enumerate() {
            assignment.assign(-*literal, level as LevelIndex + 1, Antecedent::None);
        }

        let key = ClauseKey::Addition(1, 0);
        let (mut clause, level) = ClauseHead::contracted(key, &lits, info(), 4, &assignment);
        assert_eq!(level, Some(4));
        assert_eq!(clause.contraction_level(&assignment), Some(4));
        assert_eq!(clause.size(), 8);

        assignment.undo_trail(2, false);
        assert_eq!(clause.undo_level(&assignment), Some(2));
        assert!(clause.is_contracted());

        assignment.undo_trail(0, false);
        assert_eq!(clause.undo_level(&assignment), None);
        assert!(!clause.is_contracted());
        assert_eq!(clause.size(), 8);
    }

    #[test]
    fn contraction_drops_level_zero() {
        let (mut assignment, lits) = setup(6);
        assignment.assign(-lits[4], 0, Antecedent::None);
        assignment.assign(-lits[5], 0, Antecedent::None);

        let (clause, level) = ClauseHead::contracted(ClauseKey::Addition(0, 0), &lits, info(), 4, &assignment);
        assert_eq!(level, None);
        assert_eq!(clause.size(), 4);
    }

    #[test]
    fn strengthen() {
        let (_, lits) = setup(7);
        let mut clause = ClauseHead::local(ClauseKey::Original(0), &lits, info());

        assert_eq!(clause.strengthen(lits[0]), Err(err::ClauseDBError::StrengthenWatch));
        assert_eq!(clause.strengthen(lits[2]), Ok(true));
        assert_eq!(clause.strengthen(lits[5]), Ok(true));
        assert_eq!(clause.strengthen(lits[5]), Ok(false));
        assert_eq!(clause.size(), 5);

        let mut remaining = Vec::default();
        clause.literals(&mut remaining);
        assert!(!remaining.contains(&lits[2]) && !remaining.contains(&lits[5]));
    }

    #[test]
    fn shared_watch_update() {
        let (mut assignment, lits) = setup(8);
        let shared = SharedLiterals::new_shareable(&lits, ClauseKind::Conflict, 1)
            .unwrap()
            .pop()
            .unwrap();
        let mut clause = ClauseHead::shared(
            ClauseKey::Addition(0, 0),
            shared,
            [lits[0], lits[1], lits[2]],
            info(),
        );

        for literal in &lits[2..5] {
            assignment.assign(-*literal, 1, Antecedent::None);
        }
        assignment.assign(-lits[0], 1, Antecedent::None);

        assert_eq!(clause.propagate(-lits[0], &assignment), WatchResult::Moved(lits[5]));
        assert_eq!(clause.cache(), lits[6]);
        assert_eq!(clause.strengthen(lits[7]), Err(err::ClauseDBError::StrengthenShared));
    }

    #[test]
    fn simplify_at_level_zero() {
        let (mut assignment, lits) = setup(7);
        let mut clause = ClauseHead::local(ClauseKey::Original(0), &lits, info());

        assignment.assign(-lits[3], 0, Antecedent::None);
        assignment.assign(-lits[6], 0, Antecedent::None);
        assert_eq!(clause.simplify(&assignment), Simplified::Keep);
        assert_eq!(clause.size(), 5);

        assignment.assign(-lits[2], 0, Antecedent::None);
        assignment.assign(-lits[4], 0, Antecedent::None);
        assert_eq!(clause.simplify(&assignment), Simplified::Short);

        assignment.assign(lits[5], 0, Antecedent::None);
        assert_eq!(clause.simplify(&assignment), Simplified::Remove);
    }
}
