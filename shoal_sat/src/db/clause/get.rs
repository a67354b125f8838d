use crate::{db::ClauseKey, types::err};

use super::{ClauseDB, ClauseHead};

/// Methods to get clauses stored in the database.
impl ClauseDB {
    /// Returns Ok(clause) corresponding to the given key, or an Err(issue) otherwise.
    pub fn get(&self, key: ClauseKey) -> Result<&ClauseHead, err::ClauseDBError> {
        match key {
            ClauseKey::Original(index) => match self.original.get(index as usize) {
                Some(Some(clause)) => Ok(clause),
                Some(None) => Err(err::ClauseDBError::Missing),
                None => Err(err::ClauseDBError::InvalidKeyIndex),
            },

            ClauseKey::Addition(index, token) => match self.addition.get(index as usize) {
                Some(Some(clause)) => match clause.key() {
                    ClauseKey::Addition(_, clause_token) if clause_token == token => Ok(clause),
                    _ => Err(err::ClauseDBError::InvalidKeyToken),
                },
                Some(None) => Err(err::ClauseDBError::Missing),
                None => Err(err::ClauseDBError::InvalidKeyIndex),
            },
        }
    }

    /// Returns Ok(mutable clause) corresponding to the given key, or an Err(issue) otherwise.
    pub fn get_mut(&mut self, key: ClauseKey) -> Result<&mut ClauseHead, err::ClauseDBError> {
        match key {
            ClauseKey::Original(index) => match self.original.get_mut(index as usize) {
                Some(Some(clause)) => Ok(clause),
                Some(None) => Err(err::ClauseDBError::Missing),
                None => Err(err::ClauseDBError::InvalidKeyIndex),
            },

            ClauseKey::Addition(index, token) => match self.addition.get_mut(index as usize) {
                Some(Some(clause)) => match clause.key() {
                    ClauseKey::Addition(_, clause_token) if clause_token == token => Ok(clause),
                    _ => Err(err::ClauseDBError::InvalidKeyToken),
                },
                Some(None) => Err(err::ClauseDBError::Missing),
                None => Err(err::ClauseDBError::InvalidKeyIndex),
            },
        }
    }

    /// The keys of every problem clause.
    pub fn original_keys(&self) -> Vec<ClauseKey> {
        self.original.iter().flatten().map(|clause| clause.key()).collect()
    }

    /// The keys of every addition clause.
    pub fn addition_keys(&self) -> Vec<ClauseKey> {
        self.addition.iter().flatten().map(|clause| clause.key()).collect()
    }

    /// The keys of every addition clause which is a candidate for reduction.
    pub fn learnt_keys(&self) -> Vec<ClauseKey> {
        self.addition
            .iter()
            .flatten()
            .filter(|clause| !clause.held)
            .map(|clause| clause.key())
            .collect()
    }

    /// An iterator over every problem clause.
    pub fn all_original_clauses(&self) -> impl Iterator<Item = &ClauseHead> {
        self.original.iter().flatten()
    }

    /// An iterator over every addition clause.
    pub fn all_addition_clauses(&self) -> impl Iterator<Item = &ClauseHead> {
        self.addition.iter().flatten()
    }
}
