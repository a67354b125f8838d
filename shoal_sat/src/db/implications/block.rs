/*!
Blocks of learnt implications, appended to without locks on the list.

A block holds up to [BLOCK_CAP] slots, together with a pointer to the next (older) block and a word packing the count of used slots with a lock bit.
A binary implication uses a single slot, with [UNARY] set, and a ternary implication uses two slots.

# Protocol

- A writer [locks](Block::try_lock) a block by setting the lock bit of the size word, writes entries after the current size, and [publishes](Block::add_unlock) the new size (and clears the lock) with release ordering.
- A reader loads the size word with acquire ordering, and so reads only entries written before the size was published.
- A block without room for some entry is never unlocked, and the writer holding the lock publishes a fresh block as the head of the list.
  So, a full block is immutable from the moment the lock is taken.
- Blocks are never freed while the list is reachable from more than one solver.
*/

use std::sync::atomic::{AtomicU32, Ordering};

/// The count of slots in a block.
pub const BLOCK_CAP: usize = 13;

/// Marks a slot holding a binary implication.
pub const UNARY: u32 = 1 << 31;

const LOCK: u32 = 1;

/// A block of learnt implications.
#[repr(C, align(64))]
pub struct Block {
    /// The next (older) block, fixed before the block is published.
    pub(super) next: *mut Block,

    /// The count of used slots, shifted left by one, with the lock as the lowest bit.
    size_lock: AtomicU32,

    data: [AtomicU32; BLOCK_CAP],
}

impl Default for Block {
    fn default() -> Self {
        Block {
            next: std::ptr::null_mut(),
            size_lock: AtomicU32::new(0),
            data: std::array::from_fn(|_| AtomicU32::new(0)),
        }
    }
}

impl Block {
    /// The count of published slots.
    pub fn size(&self) -> usize {
        (self.size_lock.load(Ordering::Acquire) >> 1) as usize
    }

    /// The value of a (published) slot.
    pub fn slot(&self, index: usize) -> u32 {
        self.data[index].load(Ordering::Relaxed)
    }

    /// Attempts to lock the block, returning the count of used slots on success.
    pub fn try_lock(&self) -> Option<usize> {
        let size_lock = self.size_lock.load(Ordering::Acquire);
        if size_lock & LOCK != 0 {
            return None;
        }
        match self.size_lock.compare_exchange(
            size_lock,
            size_lock | LOCK,
            Ordering::AcqRel,
            Ordering::Relaxed,
        ) {
            Ok(_) => Some((size_lock >> 1) as usize),
            Err(_) => None,
        }
    }

    /// Writes `entries` after the first `locked_size` slots, and publishes the new size, releasing the lock.
    ///
    /// Requires the lock to be held, or the block to be unpublished, and room for the entries.
    pub fn add_unlock(&self, locked_size: usize, entries: &[u32]) {
        for (offset, entry) in entries.iter().enumerate() {
            self.data[locked_size + offset].store(*entry, Ordering::Relaxed);
        }
        self.size_lock
            .store(((locked_size + entries.len()) as u32) << 1, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_is_a_cache_line() {
        assert_eq!(std::mem::size_of::<Block>(), 64);
    }

    #[test]
    fn lock_protocol() {
        let block = Block::default();

        assert_eq!(block.try_lock(), Some(0));
        assert_eq!(block.try_lock(), None);

        block.add_unlock(0, &[UNARY | 4, 6, 8]);
        assert_eq!(block.size(), 3);
        assert_eq!(block.slot(0), UNARY | 4);

        assert_eq!(block.try_lock(), Some(3));
    }
}
