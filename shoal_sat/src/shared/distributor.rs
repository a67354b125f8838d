/*!
Distribution of learnt clauses between solvers.

A [Distributor] takes clauses published by one solver and hands the clauses to other solvers on request.
Clauses are handed over as [SharedLiterals], so a single allocation of literals serves every receiver.

[GlobalQueue] keeps an inbox for each solver, and a mask of the peers from which a solver receives clauses.
The mask is determined by a [Topology]:

| Topology | Peers of solver `i` |
|----------|---------------------|
| All      | Every other solver |
| Ring     | `i - 1` and `i + 1`, wrapping |
| Cube     | Solvers whose id differs from `i` on a single bit |
| CubeX    | As Cube, with ids beyond the thread count folded back into range |

Units are received by every solver, regardless of topology.

```rust
# use shoal_sat::shared::{Distributor, GlobalQueue};
# use shoal_sat::config::parallel::Topology;
# use shoal_sat::db::clause::ClauseKind;
# use shoal_sat::structures::literal::{CLiteral, Literal};
let queue = GlobalQueue::new(3, Topology::Ring);
let clause = [CLiteral::new(1, true), CLiteral::new(2, false)];

queue.publish(0, &clause, ClauseKind::Conflict, false).unwrap();

let mut received = Vec::default();
queue.receive(1, 30, &mut received);
assert_eq!(received.len(), 1);
assert_eq!(received[0].literals(), &clause);
```
*/

use crossbeam::queue::SegQueue;

use crate::{
    config::parallel::Topology,
    db::clause::{ClauseKind, SharedLiterals},
    misc::log::targets::{self},
    structures::literal::CLiteral,
    types::err::{self},
};

/// A bitset of solver ids.
pub type PeerMask = u64;

/// The maximum number of solvers supported by a distributor.
pub const MAX_SOLVERS: usize = PeerMask::BITS as usize;

/// A distributor of learnt clauses.
pub trait Distributor: Send + Sync {
    /// Publishes `literals` from `sender` to every solver which receives from `sender`.
    ///
    /// If `keep` is set, and some solver receives the clause, a further handle to the literals is returned for use by the sender.
    fn publish(
        &self,
        sender: usize,
        literals: &[CLiteral],
        kind: ClauseKind,
        keep: bool,
    ) -> Result<Option<SharedLiterals>, err::ClauseDBError>;

    /// Moves at most `max` clauses published for `receiver` to `out`.
    ///
    /// Returns the number of clauses moved.
    fn receive(&self, receiver: usize, max: usize, out: &mut Vec<SharedLiterals>) -> usize;
}

/// The bit of `id` in a peer mask.
pub fn mask(id: usize) -> PeerMask {
    1 << id
}

/// True if `id` is in `set`.
pub fn in_set(set: PeerMask, id: usize) -> bool {
    set & mask(id) != 0
}

/// The peers of `id` on a (partial) hypercube of `threads` solvers.
///
/// With `extended`, ids beyond `threads` are folded back into range, so every solver has close to the same number of peers.
fn peers_from_cube(threads: usize, id: usize, extended: bool) -> PeerMask {
    let mut k = 1;
    let mut i = threads / 2;
    while i > 0 {
        k *= 2;
        i /= 2;
    }

    let mut peers = 0;
    let mut m = 1;
    while m <= k {
        let peer = m ^ id;
        if peer < threads {
            peers |= mask(peer);
        } else if extended && k != m && (peer ^ k) < threads {
            peers |= mask(peer ^ k);
        }
        m *= 2;
    }

    if extended {
        let s = k ^ id;
        let mut m = 1;
        while m < k && s >= threads {
            let peer = m ^ s;
            if peer < threads {
                peers |= mask(peer);
            }
            m *= 2;
        }
    }

    peers & !mask(id)
}

/// The peers of `id` among `threads` solvers, on the given topology.
pub fn peer_mask(topology: Topology, threads: usize, id: usize) -> PeerMask {
    match topology {
        Topology::All => {
            let all = match threads >= MAX_SOLVERS {
                true => PeerMask::MAX,
                false => mask(threads) - 1,
            };
            all ^ mask(id)
        }

        Topology::Ring => {
            let previous = match id {
                0 => threads - 1,
                _ => id - 1,
            };
            let next = (id + 1) % threads;
            (mask(previous) | mask(next)) & !mask(id)
        }

        Topology::Cube => peers_from_cube(threads, id, false),

        Topology::CubeX => peers_from_cube(threads, id, true),
    }
}

/// A distributor with an inbox for each solver, and a mask of peers for each solver.
pub struct GlobalQueue {
    inboxes: Vec<SegQueue<SharedLiterals>>,
    peers: Vec<PeerMask>,
}

impl GlobalQueue {
    /// A queue for `threads` solvers on the given topology.
    ///
    /// At most [MAX_SOLVERS] solvers are supported, and any further solver neither sends nor receives.
    pub fn new(threads: usize, topology: Topology) -> Self {
        let threads = threads.clamp(1, MAX_SOLVERS);
        GlobalQueue {
            inboxes: (0..threads).map(|_| SegQueue::new()).collect(),
            peers: (0..threads)
                .map(|id| peer_mask(topology, threads, id))
                .collect(),
        }
    }

    /// The peers from which `id` receives clauses.
    pub fn peers(&self, id: usize) -> PeerMask {
        self.peers.get(id).copied().unwrap_or(0)
    }

    /// The count of clauses waiting for `id`.
    pub fn pending(&self, id: usize) -> usize {
        self.inboxes.get(id).map_or(0, |inbox| inbox.len())
    }
}

impl Distributor for GlobalQueue {
    fn publish(
        &self,
        sender: usize,
        literals: &[CLiteral],
        kind: ClauseKind,
        keep: bool,
    ) -> Result<Option<SharedLiterals>, err::ClauseDBError> {
        if sender >= self.inboxes.len() {
            return Ok(None);
        }

        let unit = literals.len() == 1;
        let receivers: Vec<usize> = (0..self.inboxes.len())
            .filter(|id| *id != sender && (unit || in_set(self.peers[*id], sender)))
            .collect();

        if receivers.is_empty() {
            return Ok(None);
        }

        let refs = receivers.len() + keep as usize;
        let mut handles = SharedLiterals::new_shareable(literals, kind, refs as u32)?;
        for id in receivers {
            if let Some(handle) = handles.pop() {
                self.inboxes[id].push(handle);
            }
        }
        log::trace!(target: targets::SHARING, "{sender} published {} literals", literals.len());

        Ok(handles.pop())
    }

    fn receive(&self, receiver: usize, max: usize, out: &mut Vec<SharedLiterals>) -> usize {
        let Some(inbox) = self.inboxes.get(receiver) else {
            return 0;
        };

        let mut count = 0;
        while count < max {
            match inbox.pop() {
                Some(clause) => {
                    out.push(clause);
                    count += 1;
                }
                None => break,
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structures::literal::Literal;

    fn lits(atoms: &[u32]) -> Vec<CLiteral> {
        atoms.iter().map(|a| CLiteral::new(*a, true)).collect()
    }

    #[test]
    fn all_excludes_self() {
        for id in 0..5 {
            let peers = peer_mask(Topology::All, 5, id);
            assert_eq!(peers.count_ones(), 4);
            assert!(!in_set(peers, id));
        }
    }

    #[test]
    fn ring() {
        assert_eq!(peer_mask(Topology::Ring, 4, 0), mask(1) | mask(3));
        assert_eq!(peer_mask(Topology::Ring, 4, 2), mask(1) | mask(3));
        assert_eq!(peer_mask(Topology::Ring, 2, 1), mask(0));
        assert_eq!(peer_mask(Topology::Ring, 1, 0), 0);
    }

    #[test]
    fn cube() {
        assert_eq!(peer_mask(Topology::Cube, 4, 0), mask(1) | mask(2));
        assert_eq!(peer_mask(Topology::Cube, 4, 3), mask(2) | mask(1));
        assert_eq!(peer_mask(Topology::Cube, 8, 5), mask(4) | mask(7) | mask(1));

        // Solver 4 of 5 has no neighbour on a single bit within range, other than 0.
        assert_eq!(peer_mask(Topology::Cube, 5, 4), mask(0));
    }

    #[test]
    fn cubex_extends_partial_cubes() {
        let cube = peer_mask(Topology::Cube, 5, 4);
        let cubex = peer_mask(Topology::CubeX, 5, 4);
        assert_eq!(cube & cubex, cube);
        assert!(cubex.count_ones() > cube.count_ones());
        for id in 0..5 {
            assert!(!in_set(peer_mask(Topology::CubeX, 5, id), id));
        }
    }

    #[test]
    fn publish_respects_peers() {
        let queue = GlobalQueue::new(4, Topology::Ring);
        queue
            .publish(0, &lits(&[1, 2, 3, 4]), ClauseKind::Conflict, false)
            .unwrap();

        assert_eq!(queue.pending(0), 0);
        assert_eq!(queue.pending(1), 1);
        assert_eq!(queue.pending(2), 0);
        assert_eq!(queue.pending(3), 1);
    }

    #[test]
    fn units_reach_everyone() {
        let queue = GlobalQueue::new(4, Topology::Ring);
        queue.publish(0, &lits(&[7]), ClauseKind::Conflict, false).unwrap();
        for id in 1..4 {
            assert_eq!(queue.pending(id), 1);
        }
    }

    #[test]
    fn kept_handle_counts() {
        let queue = GlobalQueue::new(3, Topology::All);
        let kept = queue
            .publish(1, &lits(&[1, 2, 3, 4, 5, 6, 7]), ClauseKind::Conflict, true)
            .unwrap()
            .unwrap();
        assert_eq!(kept.ref_count(), 3);

        let mut out = Vec::default();
        assert_eq!(queue.receive(0, 30, &mut out), 1);
        assert_eq!(queue.receive(2, 30, &mut out), 1);
        drop(out);
        assert!(kept.unique());
    }

    #[test]
    fn receive_is_bounded() {
        let queue = GlobalQueue::new(2, Topology::All);
        for atom in 1..=5 {
            queue
                .publish(0, &lits(&[atom, atom + 10]), ClauseKind::Conflict, false)
                .unwrap();
        }
        let mut out = Vec::default();
        assert_eq!(queue.receive(1, 3, &mut out), 3);
        assert_eq!(queue.receive(1, 3, &mut out), 2);
        assert_eq!(out.len(), 5);
    }
}
