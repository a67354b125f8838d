use crate::{
    misc::log::targets::{self},
    types::err::{self},
};

/// The index to a clause in the clause database.
pub type ClauseIndex = u32;

/// The token of a clause index, used to distinguish re-use of the same [ClauseIndex].
pub type ClauseToken = u16;

/// A key to access a (long) clause stored in the clause database.
///
/// Within the clause database clauses are stored in some indexed structure (e.g. a vector) an keys contain the index to the clause together with a token to distinguish reuse of the same index, where relevant.
///
/// Binary and ternary clauses are not stored in the clause database, and so have no key.
/// Instead, these are stored in the [short implication graph](crate::db::implications).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ClauseKey {
    /// The key to a problem clause.
    Original(ClauseIndex),

    /// The key to an addition, e.g. a learnt or integrated clause.
    Addition(ClauseIndex, ClauseToken),
}

impl ClauseKey {
    /// Extracts the index from a key.
    pub fn index(&self) -> usize {
        match self {
            Self::Original(i) => *i as usize,
            Self::Addition(i, _) => *i as usize,
        }
    }

    /// Retokens an addition key to distnguish multiple uses of the same index.
    ///
    /// Returns an error if used on any other key, or if the token limit has been reached.
    pub fn retoken(&self) -> Result<Self, err::ClauseDBError> {
        match self {
            Self::Original(_) => {
                log::error!(target: targets::CLAUSE_DB, "Problem keys have a unique token");
                Err(err::ClauseDBError::InvalidKeyToken)
            }

            Self::Addition(index, token) => {
                if *token == ClauseToken::MAX {
                    return Err(err::ClauseDBError::StorageExhausted);
                }
                Ok(ClauseKey::Addition(*index, token + 1))
            }
        }
    }

    /// True if the key is to an addition.
    pub fn is_addition(&self) -> bool {
        matches!(self, Self::Addition(_, _))
    }
}

impl std::fmt::Display for ClauseKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Original(key) => write!(f, "Original({key})"),
            Self::Addition(key, token) => write!(f, "Addition({key}, {token})"),
        }
    }
}
