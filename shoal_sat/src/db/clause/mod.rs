/*!
A database of long clauses.

Clauses with at most three literals are (typically) stored in the [short implication graph](crate::db::implications), and every other clause is stored here as a [ClauseHead].

Clauses are distinguished by [key](ClauseKey):
- [Original](ClauseKey::Original) keys index problem clauses, in order of addition.
- [Addition](ClauseKey::Addition) keys index learnt or integrated clauses.
  As addition clauses are removed during a reduction, the index of a removed clause is reused, with a fresh token to distinguish the clauses.

Watch lists and undo lists are not updated on removal of a clause.
Instead, any attempt to get a removed clause returns an error, and the stale key is dropped by the caller.

Fields of the database are private to ensure the use of methods which may be needed to uphold invariants, e.g. counts of learnt clauses.
*/

pub mod creator;
mod get;
pub mod head;
pub mod info;
pub mod shared;
mod store;

pub use head::{ClauseBody, ClauseHead, Simplified, WatchResult, MAX_SHORT_LEN};
pub use info::{ClauseInfo, ClauseKind};
pub use shared::SharedLiterals;

use crate::{
    config::{dbs::ClauseDBConfig, Config},
    db::ClauseKey,
    misc::log::targets::{self},
    types::err::{self},
};

/// A database of long clauses.
pub struct ClauseDB {
    /// Clause database specific configuration parameters.
    pub(crate) config: ClauseDBConfig,

    /// Problem clauses, with None for a removed clause.
    original: Vec<Option<ClauseHead>>,

    /// Addition clauses, with None for a removed clause.
    addition: Vec<Option<ClauseHead>>,

    /// Keys to addition clauses whose index is empty.
    empty_keys: Vec<ClauseKey>,

    /// A count of problem clauses.
    original_count: usize,

    /// A count of addition clauses.
    // This can't be inferred from the addition vec, as indices may be reused.
    addition_count: usize,

    /// A count of addition clauses which are not held, and so are candidates for reduction.
    learnt_count: usize,

    /// An estimate of the bytes used by addition clauses.
    learnt_bytes: usize,
}

impl ClauseDB {
    /// A new [ClauseDB] with local configuration options derived from `config`.
    pub fn new(config: &Config) -> Self {
        ClauseDB {
            config: config.clause_db.clone(),

            original: Vec::default(),
            addition: Vec::default(),
            empty_keys: Vec::default(),

            original_count: 0,
            addition_count: 0,
            learnt_count: 0,
            learnt_bytes: 0,
        }
    }

    /// The count of problem clauses.
    pub fn original_count(&self) -> usize {
        self.original_count
    }

    /// The count of addition clauses, whether or not held.
    pub fn addition_count(&self) -> usize {
        self.addition_count
    }

    /// The count of addition clauses which are candidates for reduction.
    pub fn learnt_count(&self) -> usize {
        self.learnt_count
    }

    /// An estimate of the bytes used by addition clauses.
    pub fn learnt_bytes(&self) -> usize {
        self.learnt_bytes
    }

    /// Removes the clause of `key`, returning the clause.
    ///
    /// The caller is responsible for notes of the key elsewhere (e.g. undo lists).
    /// Watches are cleaned lazily.
    pub fn remove(&mut self, key: ClauseKey) -> Result<ClauseHead, err::ClauseDBError> {
        self.get(key)?;

        let removed = match key {
            ClauseKey::Original(index) => self.original.get_mut(index as usize).and_then(Option::take),
            ClauseKey::Addition(index, _) => self.addition.get_mut(index as usize).and_then(Option::take),
        };

        let Some(clause) = removed else {
            log::error!(target: targets::CLAUSE_DB, "Remove called on a missing clause {key}");
            return Err(err::ClauseDBError::Missing);
        };

        match key {
            ClauseKey::Original(_) => self.original_count -= 1,
            ClauseKey::Addition(_, _) => {
                self.addition_count -= 1;
                if !clause.held {
                    self.learnt_count -= 1;
                }
                self.learnt_bytes = self.learnt_bytes.saturating_sub(clause.bytes());
                self.empty_keys.push(key);
            }
        }

        log::trace!(target: targets::CLAUSE_DB, "Removed {key}");
        Ok(clause)
    }

    /// Holds an addition clause outside of the count of learnt clauses, exempting the clause from reduction.
    pub fn hold(&mut self, key: ClauseKey) -> Result<(), err::ClauseDBError> {
        let clause = self.get_mut(key)?;
        if !clause.held {
            clause.held = true;
            self.learnt_count -= 1;
        }
        Ok(())
    }

    /// Releases a held addition clause to the count of learnt clauses.
    pub fn retire(&mut self, key: ClauseKey) -> Result<(), err::ClauseDBError> {
        let clause = self.get_mut(key)?;
        if clause.held {
            clause.held = false;
            self.learnt_count += 1;
        }
        Ok(())
    }

    /// Recomputes the estimate of bytes used by addition clauses, e.g. after clauses have been simplified.
    pub fn recount_bytes(&mut self) {
        self.learnt_bytes = self.addition.iter().flatten().map(|clause| clause.bytes()).sum();
    }
}
