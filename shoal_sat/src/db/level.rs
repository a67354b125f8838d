/*!
Decision levels.

A decision level is the collection of literals assigned after some decision (or assumption) and before the next decision.
Level zero holds those literals which hold regardless of any decision, and has no entry.

Each level records:
- The position on the trail of the first literal of the level, which is the decision of the level.
- A list of clauses to notify when the level is undone.
  Notification is used by [contracted](crate::db::clause::ClauseBody::Contracted) clauses, which hide false literals until the level at which the literals were assigned is undone.

The root level is the highest level which search should never undo, e.g. as the level holds assumptions or the guiding path of a solver in a portfolio.

```rust
# use shoal_sat::db::level::Levels;
# use shoal_sat::db::ClauseKey;
let mut levels = Levels::default();
levels.push(0);
levels.push(3);
levels.add_undo(1, ClauseKey::Addition(0, 0));

assert_eq!(levels.decision_level(), 2);
assert_eq!(levels.trail_start(2), 3);

let top = levels.pop().expect("level");
assert!(top.undo.is_empty());

let bottom = levels.pop().expect("level");
assert_eq!(bottom.undo, vec![ClauseKey::Addition(0, 0)]);
```
*/

use crate::db::{ClauseKey, LevelIndex};

/// A decision level.
pub struct DecisionLevel {
    /// The position of the decision of the level on the trail.
    pub trail_start: usize,

    /// Clauses to notify when the level is undone.
    pub undo: Vec<ClauseKey>,
}

/// The decision levels of a solver.
#[derive(Default)]
pub struct Levels {
    levels: Vec<DecisionLevel>,
    root: LevelIndex,

    /// Undo lists of popped levels, kept for reuse.
    pool: Vec<Vec<ClauseKey>>,
}

impl Levels {
    /// The current decision level.
    #[inline(always)]
    pub fn decision_level(&self) -> LevelIndex {
        self.levels.len() as LevelIndex
    }

    pub fn root(&self) -> LevelIndex {
        self.root
    }

    pub fn set_root(&mut self, root: LevelIndex) {
        self.root = root;
    }

    /// Opens a fresh level whose decision is at `trail_start` on the trail.
    pub fn push(&mut self, trail_start: usize) {
        let undo = self.pool.pop().unwrap_or_default();
        self.levels.push(DecisionLevel { trail_start, undo });
    }

    /// Closes the current level, if any.
    ///
    /// The undo list of the level should be [recycled](Levels::recycle) once used.
    pub fn pop(&mut self) -> Option<DecisionLevel> {
        self.levels.pop()
    }

    /// Keeps the (used) undo list of a popped level for reuse.
    pub fn recycle(&mut self, mut undo: Vec<ClauseKey>) {
        undo.clear();
        self.pool.push(undo);
    }

    /// Requests a notification for `key` when `level` is undone.
    ///
    /// Requests for level zero are ignored, as level zero is never undone.
    pub fn add_undo(&mut self, level: LevelIndex, key: ClauseKey) {
        if let Some(decision_level) = level.checked_sub(1).and_then(|l| self.levels.get_mut(l as usize)) {
            decision_level.undo.push(key);
        }
    }

    /// Removes a request for notification, returning true if some request was removed.
    pub fn remove_undo(&mut self, level: LevelIndex, key: ClauseKey) -> bool {
        match level.checked_sub(1).and_then(|l| self.levels.get_mut(l as usize)) {
            Some(decision_level) => match decision_level.undo.iter().position(|k| *k == key) {
                Some(position) => {
                    decision_level.undo.swap_remove(position);
                    true
                }
                None => false,
            },
            None => false,
        }
    }

    /// The position of the decision of `level` on the trail, for a level above zero.
    pub fn trail_start(&self, level: LevelIndex) -> usize {
        self.levels[level as usize - 1].trail_start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undo_requests() {
        let mut levels = Levels::default();
        levels.push(0);
        levels.push(1);

        let key = ClauseKey::Addition(4, 1);
        levels.add_undo(0, key);
        levels.add_undo(2, key);

        assert!(!levels.remove_undo(1, key));
        assert!(levels.remove_undo(2, key));
        assert!(!levels.remove_undo(2, key));
    }

    #[test]
    fn recycle() {
        let mut levels = Levels::default();
        levels.push(0);
        levels.add_undo(1, ClauseKey::Original(0));

        let level = levels.pop().expect("level");
        levels.recycle(level.undo);
        assert_eq!(levels.decision_level(), 0);

        levels.push(5);
        assert_eq!(levels.trail_start(1), 5);
        assert!(levels.pop().is_some_and(|level| level.undo.is_empty()));
    }
}
