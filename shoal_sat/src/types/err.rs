//! Error types used in the library.
//!
//! - Most of these are very unlikely to occur during use.
//! - Some of these are external --- e.g. a shared context returns a `State` error if a clause is added after initialisation has ended.
//! - Some are internal to a portfolio --- e.g. a worker which panics is recorded as a `Parallel` error, and the remaining workers continue.
//!
//! Names of the error enums --- for the most part --- overlap with corresponding structs.
//  As such, throughout the library err::{self} is often used to prefix use of the types with `err::`.

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Analysis(AnalysisError),
    Atom(AtomError),
    Build(BuildError),
    ClauseDB(ClauseDBError),
    Parallel(ParallelError),
    State(StateError),

    InvalidState,
}

/// Noted errors during conflict analysis.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AnalysisError {
    /// Analysis was called without a conflict.
    NoConflict,

    /// Resolution failed to terminate with an asserting clause.
    NoAssertion,
}

impl From<AnalysisError> for ErrorKind {
    fn from(e: AnalysisError) -> Self {
        ErrorKind::Analysis(e)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AtomError {
    /// There are no more fresh atoms.
    AtomsExhausted,

    /// A literal was given whose atom is unknown.
    Unknown,

    /// An attempt to add atoms to a solver whose implication graph is shared.
    SharedGraph,
}

impl From<AtomError> for ErrorKind {
    fn from(e: AtomError) -> Self {
        ErrorKind::Atom(e)
    }
}

/// Noted errors when building a solver or shared context.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildError {
    /// A clause is unsatisfiable at level zero.
    Unsatisfiable,
}

impl From<BuildError> for ErrorKind {
    fn from(e: BuildError) -> Self {
        ErrorKind::Build(e)
    }
}

/// Errors in the clause database.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClauseDBError {
    /// A clause is missing.
    Missing,

    /// An invalid key token.
    InvalidKeyToken,

    /// An invalid key index.
    InvalidKeyIndex,

    /// All possible keys have been used for some clause type.
    StorageExhausted,

    /// An attempt to strengthen a clause by removing a watched literal.
    StrengthenWatch,

    /// An attempt to strengthen a clause whose literals are shared.
    StrengthenShared,
}

impl From<ClauseDBError> for ErrorKind {
    fn from(e: ClauseDBError) -> Self {
        ErrorKind::ClauseDB(e)
    }
}

/// Errors of a portfolio.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParallelError {
    /// The worker with the given id panicked, and was lost.
    WorkerPanicked(usize),

    /// The worker with the given id returned an error, and was lost.
    WorkerFailed(usize),

    /// The master solver was lost, and so the portfolio was terminated.
    MasterFailed,

    /// A portfolio requires at least one thread.
    NoThreads,
}

impl From<ParallelError> for ErrorKind {
    fn from(e: ParallelError) -> Self {
        ErrorKind::Parallel(e)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateError {
    /// A solve is in progress.
    SolveInProgress,

    /// A clause or atom was added to a shared context after initialisation ended.
    Frozen,

    /// A solver was attached to a shared context whose initialisation has not ended.
    NotFrozen,
}

impl From<StateError> for ErrorKind {
    fn from(e: StateError) -> Self {
        ErrorKind::State(e)
    }
}
