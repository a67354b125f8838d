/*!
Bit-packed information about a clause.

A [ClauseInfo] packs, into a single u32:
- The activity of the clause, bumped each time the clause takes part in analysis and decayed on each reduction (22 bits, saturating).
- The LBD of the clause (7 bits, capped at [LBD_MAX]).
- The [kind](ClauseKind) of the clause (2 bits).
- A tag, set for clauses conditional on the tag literal of a [shared context](crate::shared::SharedContext) (1 bit).

```rust
# use shoal_sat::db::clause::info::{ClauseInfo, ClauseKind};
let mut info = ClauseInfo::new(ClauseKind::Conflict);
info.set_lbd(200);
info.bump_activity(3);

assert_eq!(info.lbd(), 127);
assert_eq!(info.activity(), 3);
assert_eq!(info.kind(), ClauseKind::Conflict);
assert!(info.learnt());
assert!(!info.tagged());
```
*/

use crate::config::LBD;

/// The largest activity of a clause.
pub const ACTIVITY_MAX: u32 = (1 << 22) - 1;

/// The largest LBD recorded for a clause.
pub const LBD_MAX: u32 = (1 << 7) - 1;

const LBD_SHIFT: u32 = 22;
const KIND_SHIFT: u32 = 29;
const TAG_BIT: u32 = 1 << 31;

/// The kind of a clause.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ClauseKind {
    /// A problem clause.
    Static = 0,

    /// A clause learnt from a conflict.
    Conflict = 1,

    /// A clause learnt from a loop (of some external propagator).
    Loop = 2,

    /// Any other learnt clause.
    Other = 3,
}

impl ClauseKind {
    fn from_bits(bits: u32) -> Self {
        match bits & 3 {
            0 => ClauseKind::Static,
            1 => ClauseKind::Conflict,
            2 => ClauseKind::Loop,
            _ => ClauseKind::Other,
        }
    }

    /// The kind as a bit, for use in a mask of kinds.
    pub fn mask(&self) -> u8 {
        1 << (*self as u8)
    }

    /// True if the kind is of some learnt clause.
    pub fn learnt(&self) -> bool {
        !matches!(self, ClauseKind::Static)
    }
}

/// Bit-packed information about a clause.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ClauseInfo(u32);

impl ClauseInfo {
    /// Fresh information, with zero activity and LBD.
    pub fn new(kind: ClauseKind) -> Self {
        ClauseInfo((kind as u32) << KIND_SHIFT)
    }

    pub fn kind(&self) -> ClauseKind {
        ClauseKind::from_bits(self.0 >> KIND_SHIFT)
    }

    pub fn learnt(&self) -> bool {
        self.kind().learnt()
    }

    pub fn activity(&self) -> u32 {
        self.0 & ACTIVITY_MAX
    }

    /// Increases the activity of the clause by `bump`, saturating at [ACTIVITY_MAX].
    pub fn bump_activity(&mut self, bump: u32) {
        let activity = self.activity().saturating_add(bump).min(ACTIVITY_MAX);
        self.0 = (self.0 & !ACTIVITY_MAX) | activity;
    }

    /// Decays the activity of the clause by a right shift.
    pub fn decay_activity(&mut self, shift: u32) {
        let activity = self.activity().checked_shr(shift).unwrap_or(0);
        self.0 = (self.0 & !ACTIVITY_MAX) | activity;
    }

    pub fn lbd(&self) -> LBD {
        ((self.0 >> LBD_SHIFT) & LBD_MAX) as LBD
    }

    /// Sets the LBD of the clause, capped at [LBD_MAX].
    pub fn set_lbd(&mut self, lbd: u32) {
        let lbd = lbd.min(LBD_MAX);
        self.0 = (self.0 & !(LBD_MAX << LBD_SHIFT)) | (lbd << LBD_SHIFT);
    }

    /// True if some LBD has been recorded.
    pub fn has_lbd(&self) -> bool {
        self.lbd() != 0
    }

    pub fn tagged(&self) -> bool {
        self.0 & TAG_BIT != 0
    }

    pub fn set_tagged(&mut self, tagged: bool) {
        match tagged {
            true => self.0 |= TAG_BIT,
            false => self.0 &= !TAG_BIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_are_independent() {
        let mut info = ClauseInfo::new(ClauseKind::Other);
        info.set_tagged(true);
        info.set_lbd(5);
        info.bump_activity(ACTIVITY_MAX);
        info.bump_activity(1);

        assert_eq!(info.kind(), ClauseKind::Other);
        assert!(info.tagged());
        assert_eq!(info.lbd(), 5);
        assert_eq!(info.activity(), ACTIVITY_MAX);

        info.decay_activity(21);
        assert_eq!(info.activity(), 1);
        info.decay_activity(40);
        assert_eq!(info.activity(), 0);

        info.set_tagged(false);
        assert!(!info.tagged());
        assert_eq!(info.lbd(), 5);
    }

    #[test]
    fn kind_masks() {
        assert_eq!(ClauseKind::Static.mask(), 1);
        assert_eq!(ClauseKind::Loop.mask(), 4);
        assert!(!ClauseKind::Static.learnt());
        assert!(ClauseInfo::new(ClauseKind::Conflict).learnt());
    }
}
