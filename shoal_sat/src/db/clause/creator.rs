/*!
Tools for the creation of clauses.

Before a clause is created, the state of the clause with respect to the current assignment is determined from the *level abstraction* of each literal:

| Literal        | Abstraction              |
|----------------|--------------------------|
| free           | decision level + 1       |
| false at `l`   | `l`                      |
| true at `l`    | `u32::MAX - l`           |

So, a literal false at level zero has abstraction zero, and is dropped.
Otherwise, higher abstractions are preferred as watches: true literals over free literals over false literals, and recent false literals over older false literals.

The [status](status) of a clause is then determined by the abstractions of the two preferred literals.

The procedures which create clauses, [create](crate::procedures::integrate) and [integrate](crate::procedures::integrate), take a collection of [flags] to tune how the status is determined, and what is done with the clause.
*/

use rand::Rng;

use crate::{
    config::dbs::WatchInit,
    db::{assignment::Assignment, assignment::MAX_LEVEL, LevelIndex},
    structures::literal::{CLiteral, Literal},
};

use super::head::MAX_SHORT_LEN;

/// Flags which tune the creation of a clause.
pub mod flags {
    /// Determine the status of the clause, and force the clause if unit, without adding the clause.
    ///
    /// Only applies to clauses of at most three literals, as the reason for a forced literal is then implicit.
    pub const NO_ADD: u32 = 1;

    /// Always create a clause, rather than adding short clauses to the implication graph.
    pub const EXPLICIT: u32 = 2;

    /// Ignore clauses which are satisfied by the current assignment.
    pub const NOT_SAT: u32 = 4;

    /// Ignore clauses which are satisfied at or below the root level.
    pub const NOT_ROOT_SAT: u32 = 8;

    /// Do not force a conflicting clause, and instead report the conflict.
    pub const NOT_CONFLICT: u32 = 16;

    /// Recompute the LBD of an integrated clause which is unit.
    pub const INT_LBD: u32 = 32;

    /// The literals are ordered: the first two are the preferred watches, and literals false at level zero are at the end.
    pub const KNOWN_ORDER: u32 = 64;
}

/// The state of a clause with respect to an assignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClauseStatus {
    /// At least two literals are free, or some literal is true and some other is free.
    Open,

    /// Some literal is true, and some other literal is not false below the level of the true literal.
    Sat,

    /// Every literal other than the first is false, and the first is free.
    Unit,

    /// Every literal other than the first is false, and the first was (or would be) implied below the current level.
    Asserting,

    /// Every literal is false.
    Conflicting,

    /// There are no literals.
    Empty,

    /// Some literal is true at level zero, or the clause is satisfied and ignored due to some [flag](flags).
    Subsumed,
}

impl ClauseStatus {
    /// True if the first literal of the clause is (to be) forced.
    pub fn is_unit(&self) -> bool {
        matches!(self, Self::Unit | Self::Asserting)
    }
}

/// The level abstraction of `literal` at decision level `dl`.
pub fn level_abstraction(assignment: &Assignment, dl: LevelIndex, literal: CLiteral) -> u32 {
    match (assignment.is_free(literal), assignment.is_true(literal)) {
        (true, _) => dl + 1,
        (false, false) => assignment.level(literal.atom()),
        (false, true) => u32::MAX - assignment.level(literal.atom()),
    }
}

/// The status of a clause at decision level `dl`, from the abstraction of the first and second watch.
pub fn status(dl: LevelIndex, first: u32, second: u32) -> ClauseStatus {
    if first > MAX_LEVEL + 1 {
        if first == u32::MAX {
            return ClauseStatus::Subsumed;
        }
        if (first ^ u32::MAX) >= second {
            return ClauseStatus::Asserting;
        }
        return ClauseStatus::Sat;
    }
    if second <= dl {
        if first > dl {
            return ClauseStatus::Unit;
        }
        if first > second {
            return ClauseStatus::Asserting;
        }
        return ClauseStatus::Conflicting;
    }
    ClauseStatus::Open
}

/// The preferred watches of a clause, together with a copy of the first few literals of the clause.
///
/// The copy omits literals false at level zero, and the first two literals copied are the preferred watches.
/// Unused positions are padded with [CLiteral::FALSE].
#[derive(Clone, Debug)]
pub struct WatchSelection {
    pub lits: [CLiteral; MAX_SHORT_LEN],
    pub abstr_f: u32,
    pub abstr_s: u32,

    /// The count of literals not false at level zero.
    pub simp_size: usize,
}

impl WatchSelection {
    /// A selection from `literals`, which are left as they are.
    pub fn of_slice(assignment: &Assignment, dl: LevelIndex, literals: &[CLiteral], known_order: bool) -> Self {
        let mut selection = WatchSelection {
            lits: [CLiteral::FALSE; MAX_SHORT_LEN],
            abstr_f: 0,
            abstr_s: 0,
            simp_size: literals.len(),
        };

        if known_order {
            while selection.simp_size > 0
                && level_abstraction(assignment, dl, literals[selection.simp_size - 1]) == 0
            {
                selection.simp_size -= 1;
            }
            let copy = std::cmp::min(selection.simp_size, MAX_SHORT_LEN);
            selection.lits[..copy].copy_from_slice(&literals[..copy]);
            selection.abstr_f = level_abstraction(assignment, dl, selection.lits[0]);
            selection.abstr_s = level_abstraction(assignment, dl, selection.lits[1]);
            return selection;
        }

        let (first, second, simp_size) = Self::preferred(assignment, dl, literals);
        selection.simp_size = simp_size;
        if let Some((index, abstraction)) = first {
            selection.lits[0] = literals[index];
            selection.abstr_f = abstraction;
        }
        if let Some((index, abstraction)) = second {
            selection.lits[1] = literals[index];
            selection.abstr_s = abstraction;
        }

        let skip = [first.map(|(i, _)| i), second.map(|(i, _)| i)];
        let rest = literals
            .iter()
            .enumerate()
            .filter(|(i, l)| !skip.contains(&Some(*i)) && level_abstraction(assignment, dl, **l) != 0)
            .map(|(_, l)| *l);
        for (slot, literal) in selection.lits[2..].iter_mut().zip(rest) {
            *slot = literal;
        }

        selection
    }

    /// A selection from `literals`, moving the preferred watches to the front of `literals` unless the order is known.
    ///
    /// Literals false at level zero are not removed, though are not counted in the simplified size.
    pub fn order(
        assignment: &Assignment,
        dl: LevelIndex,
        literals: &mut [CLiteral],
        known_order: bool,
    ) -> Self {
        if !known_order {
            let (first, second, _) = Self::preferred(assignment, dl, literals);
            let first = first.map_or(0, |(i, _)| i);
            let second = second.map_or(1, |(i, _)| i);
            place_watches(literals, first, second);
        }

        let mut selection = WatchSelection {
            lits: [CLiteral::FALSE; MAX_SHORT_LEN],
            abstr_f: level_abstraction(assignment, dl, literals[0]),
            abstr_s: level_abstraction(assignment, dl, literals[1]),
            simp_size: literals
                .iter()
                .filter(|l| level_abstraction(assignment, dl, **l) != 0)
                .count(),
        };
        selection.lits[0] = literals[0];
        selection.lits[1] = literals[1];
        selection
    }

    /// The positions of the literals with the highest and second highest abstraction, and the count of literals with a non-zero abstraction.
    #[allow(clippy::type_complexity)]
    fn preferred(
        assignment: &Assignment,
        dl: LevelIndex,
        literals: &[CLiteral],
    ) -> (Option<(usize, u32)>, Option<(usize, u32)>, usize) {
        let mut first: Option<(usize, u32)> = None;
        let mut second: Option<(usize, u32)> = None;
        let mut simp_size = 0;

        for (index, literal) in literals.iter().enumerate() {
            let abstraction = level_abstraction(assignment, dl, *literal);
            if abstraction == 0 {
                continue;
            }
            simp_size += 1;
            if first.is_none_or(|(_, f)| abstraction > f) {
                second = first;
                first = Some((index, abstraction));
            } else if second.is_none_or(|(_, s)| abstraction > s) {
                second = Some((index, abstraction));
            }
        }

        (first, second, simp_size)
    }
}

/// Moves the literals at `first` and `second` to the front of `literals`.
pub fn place_watches(literals: &mut [CLiteral], first: usize, second: usize) {
    literals.swap(0, first);
    // The literal at zero may have moved to `first`.
    let second = if second == 0 { first } else { second };
    literals.swap(1, second);
}

/// Chooses the watches of a problem clause whose literals are free, and moves them to the front of `literals`.
///
/// `count` gives the number of clauses which watch a literal.
pub fn init_watches(
    literals: &mut [CLiteral],
    strategy: WatchInit,
    rng: &mut impl Rng,
    count: impl Fn(CLiteral) -> usize,
) {
    let size = literals.len();
    if size < 2 {
        return;
    }

    match strategy {
        WatchInit::First => {}

        WatchInit::Random => {
            let first = rng.random_range(0..size);
            let mut second = rng.random_range(0..size - 1);
            if second >= first {
                second += 1;
            }
            place_watches(literals, first, second);
        }

        WatchInit::Least => {
            let mut least = [(0, usize::MAX), (1, usize::MAX)];
            for (index, literal) in literals.iter().enumerate() {
                let watched = count(*literal);
                if watched < least[0].1 {
                    least[1] = least[0];
                    least[0] = (index, watched);
                } else if watched < least[1].1 {
                    least[1] = (index, watched);
                }
            }
            place_watches(literals, least[0].0, least[1].0);
        }
    }
}

/// Adjusts the status of a clause given by a selection to the given flags.
pub fn status_with_flags(
    assignment: &Assignment,
    dl: LevelIndex,
    root: LevelIndex,
    selection: &WatchSelection,
    flags: u32,
) -> ClauseStatus {
    if selection.simp_size == 0 {
        return match assignment.is_true(selection.lits[0]) {
            true => ClauseStatus::Subsumed,
            false => ClauseStatus::Empty,
        };
    }

    match status(dl, selection.abstr_f, selection.abstr_s) {
        ClauseStatus::Conflicting => match flags & flags::NOT_CONFLICT {
            0 => ClauseStatus::Unit,
            _ => ClauseStatus::Conflicting,
        },

        ClauseStatus::Asserting if assignment.is_false(selection.lits[0]) => match flags & flags::NOT_CONFLICT {
            0 => ClauseStatus::Unit,
            _ => ClauseStatus::Conflicting,
        },

        ClauseStatus::Sat
            if (flags & flags::NOT_SAT) != 0
                || ((flags & flags::NOT_ROOT_SAT) != 0
                    && assignment.level(selection.lits[0].atom()) <= root) =>
        {
            ClauseStatus::Subsumed
        }

        status => status,
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::{generic::random::MinimalPCG32, structures::antecedent::Antecedent};

    fn setup(atoms: usize) -> (Assignment, Vec<CLiteral>) {
        let mut assignment = Assignment::default();
        let literals = (0..atoms)
            .map(|_| CLiteral::new(assignment.add_atom(), true))
            .collect();
        (assignment, literals)
    }

    #[test]
    fn abstraction_order() {
        let (mut assignment, lits) = setup(4);
        assignment.assign(-lits[0], 0, Antecedent::None);
        assignment.assign(-lits[1], 1, Antecedent::None);
        assignment.assign(lits[2], 2, Antecedent::None);

        assert_eq!(level_abstraction(&assignment, 2, lits[0]), 0);
        assert_eq!(level_abstraction(&assignment, 2, lits[1]), 1);
        assert_eq!(level_abstraction(&assignment, 2, lits[2]), u32::MAX - 2);
        assert_eq!(level_abstraction(&assignment, 2, lits[3]), 3);
    }

    #[test]
    fn statuses() {
        // Free, free.
        assert_eq!(status(2, 3, 3), ClauseStatus::Open);
        // Free, false at 1.
        assert_eq!(status(2, 3, 1), ClauseStatus::Unit);
        // False at 2, false at 1.
        assert_eq!(status(2, 2, 1), ClauseStatus::Asserting);
        // False at 2, false at 2.
        assert_eq!(status(2, 2, 2), ClauseStatus::Conflicting);
        // True at 0.
        assert_eq!(status(2, u32::MAX, 3), ClauseStatus::Subsumed);
        // True at 1, false at 1.
        assert_eq!(status(2, u32::MAX - 1, 1), ClauseStatus::Asserting);
        // True at 1, free.
        assert_eq!(status(2, u32::MAX - 1, 3), ClauseStatus::Sat);
    }

    #[test]
    fn selection_prefers_true_then_free() {
        let (mut assignment, lits) = setup(6);
        assignment.assign(-lits[0], 0, Antecedent::None);
        assignment.assign(-lits[1], 1, Antecedent::None);
        assignment.assign(lits[4], 1, Antecedent::None);

        let selection = WatchSelection::of_slice(&assignment, 1, &lits, false);
        assert_eq!(selection.simp_size, 5);
        assert_eq!(selection.lits[0], lits[4]);
        assert_eq!(selection.lits[1], lits[2]);
        assert_eq!(&selection.lits[2..], &[lits[1], lits[3], lits[5]]);

        let mut ordered = lits.clone();
        let selection = WatchSelection::order(&assignment, 1, &mut ordered, false);
        assert_eq!(&ordered[..2], &[lits[4], lits[2]]);
        assert_eq!(selection.simp_size, 5);
        assert_eq!(
            status_with_flags(&assignment, 1, 0, &selection, flags::NOT_SAT),
            ClauseStatus::Subsumed
        );
        assert_eq!(status_with_flags(&assignment, 1, 0, &selection, 0), ClauseStatus::Sat);
    }

    #[test]
    fn conflicting_flags() {
        let (mut assignment, lits) = setup(3);
        for literal in &lits {
            assignment.assign(-*literal, 1, Antecedent::None);
        }
        let selection = WatchSelection::of_slice(&assignment, 1, &lits, false);

        assert_eq!(status_with_flags(&assignment, 1, 0, &selection, 0), ClauseStatus::Unit);
        assert_eq!(
            status_with_flags(&assignment, 1, 0, &selection, flags::NOT_CONFLICT),
            ClauseStatus::Conflicting
        );
    }

    #[test]
    fn watch_strategies() {
        let (_, lits) = setup(6);
        let mut rng = MinimalPCG32::from_seed(7_u64.to_le_bytes());

        let mut random = lits.clone();
        init_watches(&mut random, WatchInit::Random, &mut rng, |_| 0);
        assert_ne!(random[0], random[1]);
        random.sort();
        assert_eq!(random, lits);

        let mut least = lits.clone();
        init_watches(&mut least, WatchInit::Least, &mut rng, |l| match l == lits[3] || l == lits[5] {
            true => 0,
            false => 4,
        });
        assert_eq!(&least[..2], &[lits[3], lits[5]]);
    }
}
