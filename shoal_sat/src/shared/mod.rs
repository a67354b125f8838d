/*!
State shared between solvers.

A [SharedContext] holds a formula, through a master solver, and any number of further solvers may be [attached](SharedContext::attach) to the context.
Attached solvers share the [short implication graph](crate::db::implications) of the master, and may share the literals of long problem clauses.

Learnt clauses are exchanged through a [Distributor], typically a [GlobalQueue].
*/

mod context;
pub use context::{atom_flags, SharedContext};

mod distributor;
pub use distributor::{in_set, mask, peer_mask, Distributor, GlobalQueue, PeerMask, MAX_SOLVERS};
