use crate::{
    db::{ClauseIndex, ClauseKey},
    misc::log::targets,
    types::err,
};

use super::{ClauseDB, ClauseHead};

/// Methods for storing clauses.
///
/// As keys use an [index](ClauseIndex) which may be smaller than [usize] a check is made to ensure it will be possible to generate the key.
impl ClauseDB {
    /// Stores the clause made by `make` from a fresh key.
    ///
    /// ```rust, ignore
    /// let key = self.clause_db.store(info.learnt(), |key| ClauseHead::local(key, &literals, info))?;
    /// ```
    ///
    /// Learnt clauses are stored as additions, and every other clause is stored as an original.
    pub fn store(
        &mut self,
        learnt: bool,
        make: impl FnOnce(ClauseKey) -> ClauseHead,
    ) -> Result<ClauseKey, err::ClauseDBError> {
        match learnt {
            false => {
                let key = self.fresh_original_key()?;
                let clause = make(key);
                log::trace!(target: targets::CLAUSE_DB, "{key}: {} literals", clause.size());

                self.original.push(Some(clause));
                self.original_count += 1;
                Ok(key)
            }

            true => {
                // An index whose tokens are exhausted is not reused.
                let key = match self.empty_keys.pop().map(|key| key.retoken()) {
                    Some(Ok(key)) => key,
                    _ => self.fresh_addition_key()?,
                };
                let clause = make(key);
                log::trace!(target: targets::CLAUSE_DB, "{key}: {} literals", clause.size());

                self.addition_count += 1;
                if !clause.held {
                    self.learnt_count += 1;
                }
                self.learnt_bytes += clause.bytes();

                match key {
                    ClauseKey::Addition(index, _) if (index as usize) < self.addition.len() => {
                        self.addition[index as usize] = Some(clause)
                    }
                    _ => self.addition.push(Some(clause)),
                }
                Ok(key)
            }
        }
    }

    fn fresh_original_key(&self) -> Result<ClauseKey, err::ClauseDBError> {
        match ClauseIndex::try_from(self.original.len()) {
            Ok(index) => Ok(ClauseKey::Original(index)),
            Err(_) => Err(err::ClauseDBError::StorageExhausted),
        }
    }

    fn fresh_addition_key(&self) -> Result<ClauseKey, err::ClauseDBError> {
        match ClauseIndex::try_from(self.addition.len()) {
            Ok(index) => Ok(ClauseKey::Addition(index, 0)),
            Err(_) => Err(err::ClauseDBError::StorageExhausted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        db::clause::{ClauseInfo, ClauseKind},
        structures::literal::{CLiteral, Literal},
    };

    fn literals(count: u32) -> Vec<CLiteral> {
        (1..=count).map(|atom| CLiteral::new(atom, true)).collect()
    }

    #[test]
    fn keys_are_retokened() {
        let mut db = ClauseDB::new(&Config::default());
        let lits = literals(5);
        let info = ClauseInfo::new(ClauseKind::Conflict);

        let a = db.store(true, |key| ClauseHead::local(key, &lits, info)).unwrap();
        let b = db.store(true, |key| ClauseHead::local(key, &lits, info)).unwrap();
        assert_eq!(a, ClauseKey::Addition(0, 0));
        assert_eq!(db.learnt_count(), 2);

        assert!(db.remove(a).is_ok());
        assert_eq!(db.get(a).err(), Some(err::ClauseDBError::Missing));
        assert_eq!(db.remove(a).err(), Some(err::ClauseDBError::Missing));

        let c = db.store(true, |key| ClauseHead::local(key, &lits, info)).unwrap();
        assert_eq!(c, ClauseKey::Addition(0, 1));
        assert_eq!(db.get(a).err(), Some(err::ClauseDBError::InvalidKeyToken));
        assert!(db.get(b).is_ok() && db.get(c).is_ok());
        assert_eq!(db.learnt_keys().len(), 2);
    }

    #[test]
    fn held_clauses() {
        let mut db = ClauseDB::new(&Config::default());
        let lits = literals(4);
        let info = ClauseInfo::new(ClauseKind::Other);

        let key = db.store(true, |key| ClauseHead::local(key, &lits, info)).unwrap();
        assert!(db.hold(key).is_ok());
        assert_eq!(db.learnt_count(), 0);
        assert_eq!(db.addition_count(), 1);
        assert!(db.learnt_keys().is_empty());

        assert!(db.retire(key).is_ok());
        assert_eq!(db.learnt_count(), 1);

        let original = db.store(false, |key| ClauseHead::local(key, &lits, ClauseInfo::default())).unwrap();
        assert_eq!(original, ClauseKey::Original(0));
        assert_eq!(db.original_count(), 1);
        assert_eq!(db.original_keys(), vec![original]);
    }
}
