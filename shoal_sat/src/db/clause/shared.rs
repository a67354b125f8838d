/*!
Reference counted literal arrays, which allow a single physical clause to be used by many solvers.

A [SharedLiterals] is a handle to a single allocation holding a header followed by a contiguous array of literals.
The header packs the size of the array together with the [kind](ClauseKind) of the clause, and holds an atomic count of references.

- [new_shareable](SharedLiterals::new_shareable) makes one allocation owned by some number of handles, so that the allocation may be handed to a number of solvers without further synchronisation.
- [share](SharedLiterals::share) (or [Clone]) makes a further handle, incrementing the count.
- Dropping a handle decrements the count, and the handle which takes the count to zero frees the allocation.

The literals are immutable while shared.
Only a unique handle may [simplify](SharedLiterals::simplify) the literals in place.

```rust
# use shoal_sat::db::clause::{ClauseKind, shared::SharedLiterals};
# use shoal_sat::structures::literal::{CLiteral, Literal};
let literals = (1..=6).map(|atom| CLiteral::new(atom, true)).collect::<Vec<_>>();
let mut handles = SharedLiterals::new_shareable(&literals, ClauseKind::Conflict, 3).unwrap();

assert_eq!(handles.len(), 3);
assert_eq!(handles[0].ref_count(), 3);

let extra = handles[0].share();
assert_eq!(extra.ref_count(), 4);

handles.truncate(1);
drop(extra);
assert!(handles[0].unique());
assert_eq!(handles[0].literals(), literals.as_slice());
```
*/

use std::{
    alloc::Layout,
    ptr::NonNull,
    sync::atomic::{fence, AtomicU32, Ordering},
};

use crate::{
    db::{assignment::Assignment, clause::ClauseKind},
    structures::{literal::CLiteral, value::Value},
    types::err::{self},
};

/// The header of a shared allocation.
#[repr(C)]
struct Header {
    refs: AtomicU32,

    /// The size of the array shifted left by two, with the kind of the clause in the low bits.
    size_kind: u32,

    /// The count of literals the allocation was made for.
    capacity: u32,
}

/// A handle to a reference counted array of literals.
pub struct SharedLiterals {
    header: NonNull<Header>,
}

// The header is only mutated through the atomic count, or through a unique handle.
unsafe impl Send for SharedLiterals {}
unsafe impl Sync for SharedLiterals {}

/// The layout of an allocation for `capacity` literals, and the offset of the literals.
fn layout_for(capacity: usize) -> Result<(Layout, usize), err::ClauseDBError> {
    let literals = Layout::array::<CLiteral>(capacity).map_err(|_| err::ClauseDBError::StorageExhausted)?;
    let (layout, offset) = Layout::new::<Header>()
        .extend(literals)
        .map_err(|_| err::ClauseDBError::StorageExhausted)?;
    Ok((layout.pad_to_align(), offset))
}

fn kind_bits(kind: ClauseKind) -> u32 {
    kind as u32
}

impl SharedLiterals {
    /// Creates a single array of `literals` owned by `refs` handles (or one handle, if `refs` is zero).
    pub fn new_shareable(
        literals: &[CLiteral],
        kind: ClauseKind,
        refs: u32,
    ) -> Result<Vec<SharedLiterals>, err::ClauseDBError> {
        if literals.len() >= (1 << 30) {
            return Err(err::ClauseDBError::StorageExhausted);
        }
        let refs = std::cmp::max(1, refs);
        let (layout, offset) = layout_for(literals.len())?;

        // SAFETY: The layout has a non-zero size, as the header is non-empty.
        let memory = unsafe { std::alloc::alloc(layout) };
        let Some(header) = NonNull::new(memory as *mut Header) else {
            std::alloc::handle_alloc_error(layout);
        };

        // SAFETY: The allocation fits the header followed by the literals, at the computed offset.
        unsafe {
            header.as_ptr().write(Header {
                refs: AtomicU32::new(refs),
                size_kind: ((literals.len() as u32) << 2) | kind_bits(kind),
                capacity: literals.len() as u32,
            });
            let base = memory.add(offset) as *mut CLiteral;
            std::ptr::copy_nonoverlapping(literals.as_ptr(), base, literals.len());
        }

        Ok((0..refs).map(|_| SharedLiterals { header }).collect())
    }

    fn header(&self) -> &Header {
        // SAFETY: The header lives while any handle lives.
        unsafe { self.header.as_ref() }
    }

    fn literals_ptr(&self) -> *mut CLiteral {
        let offset = std::mem::size_of::<Header>().next_multiple_of(std::mem::align_of::<CLiteral>());
        // SAFETY: The literals follow the header at the offset used on allocation.
        unsafe { (self.header.as_ptr() as *mut u8).add(offset) as *mut CLiteral }
    }

    /// A further handle to the array.
    pub fn share(&self) -> SharedLiterals {
        self.header().refs.fetch_add(1, Ordering::Relaxed);
        SharedLiterals { header: self.header }
    }

    /// The count of handles to the array.
    pub fn ref_count(&self) -> u32 {
        self.header().refs.load(Ordering::Acquire)
    }

    /// True if this is the only handle to the array.
    pub fn unique(&self) -> bool {
        self.ref_count() == 1
    }

    /// The count of literals in the array.
    pub fn size(&self) -> usize {
        (self.header().size_kind >> 2) as usize
    }

    pub fn kind(&self) -> ClauseKind {
        match self.header().size_kind & 3 {
            0 => ClauseKind::Static,
            1 => ClauseKind::Conflict,
            2 => ClauseKind::Loop,
            _ => ClauseKind::Other,
        }
    }

    pub fn literals(&self) -> &[CLiteral] {
        // SAFETY: The first `size` literals are initialised, and are only mutated through a unique handle.
        unsafe { std::slice::from_raw_parts(self.literals_ptr(), self.size()) }
    }

    /// Counts the free literals of the array, or returns zero if some literal is true.
    ///
    /// If the handle is unique, false literals are removed from the array.
    pub fn simplify(&mut self, assignment: &Assignment) -> usize {
        let remove_false = self.unique();
        let size = self.size();
        let base = self.literals_ptr();

        let mut free = 0;
        let mut kept = 0;
        for index in 0..size {
            // SAFETY: The index is within the initialised literals.
            let literal = unsafe { *base.add(index) };
            match assignment.literal_value(literal) {
                Value::True => return 0,
                Value::Free => {
                    if remove_false {
                        // SAFETY: The handle is unique, and kept ≤ index.
                        unsafe { *base.add(kept) = literal };
                    }
                    kept += 1;
                    free += 1;
                }
                Value::False => {
                    if !remove_false {
                        kept += 1;
                    }
                }
            }
        }

        if remove_false && kept != size {
            let kind = self.header().size_kind & 3;
            // SAFETY: The handle is unique, so no other reference to the header exists.
            unsafe { (*self.header.as_ptr()).size_kind = ((kept as u32) << 2) | kind };
        }
        free
    }
}

impl Clone for SharedLiterals {
    fn clone(&self) -> Self {
        self.share()
    }
}

impl Drop for SharedLiterals {
    fn drop(&mut self) {
        if self.header().refs.fetch_sub(1, Ordering::Release) != 1 {
            return;
        }
        fence(Ordering::Acquire);
        let capacity = self.header().capacity as usize;
        // The layout was computed on allocation with the same capacity.
        if let Ok((layout, _)) = layout_for(capacity) {
            // SAFETY: This was the last handle, and the allocation was made with this layout.
            unsafe { std::alloc::dealloc(self.header.as_ptr() as *mut u8, layout) };
        }
    }
}

impl std::fmt::Debug for SharedLiterals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedLiterals")
            .field("refs", &self.ref_count())
            .field("literals", &self.literals())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structures::{antecedent::Antecedent, literal::Literal};

    fn literals(count: u32) -> Vec<CLiteral> {
        (1..=count).map(|atom| CLiteral::new(atom, atom % 2 == 0)).collect()
    }

    #[test]
    fn header_and_literals() {
        let lits = literals(9);
        let handles = SharedLiterals::new_shareable(&lits, ClauseKind::Loop, 0).unwrap();

        assert_eq!(handles.len(), 1);
        assert!(handles[0].unique());
        assert_eq!(handles[0].size(), 9);
        assert_eq!(handles[0].kind(), ClauseKind::Loop);
        assert_eq!(handles[0].literals(), lits.as_slice());
    }

    #[test]
    fn simplify_only_when_unique() {
        let mut assignment = Assignment::default();
        for _ in 0..6 {
            assignment.add_atom();
        }
        let lits = literals(6);
        assignment.assign(-lits[1], 0, Antecedent::None);
        assignment.assign(-lits[4], 0, Antecedent::None);

        let mut handles = SharedLiterals::new_shareable(&lits, ClauseKind::Static, 2).unwrap();
        assert_eq!(handles[0].simplify(&assignment), 4);
        assert_eq!(handles[0].size(), 6);

        let mut last = handles.pop().unwrap();
        drop(handles);
        assert_eq!(last.simplify(&assignment), 4);
        assert_eq!(last.literals(), &[lits[0], lits[2], lits[3], lits[5]]);

        assignment.assign(lits[3], 0, Antecedent::None);
        assert_eq!(last.simplify(&assignment), 0);
    }

    #[test]
    fn concurrent_release() {
        let lits = literals(12);
        let threads = 8;
        let rounds = 1_000;

        let mut handles = SharedLiterals::new_shareable(&lits, ClauseKind::Conflict, threads + 1).unwrap();
        let keep = handles.pop().unwrap();

        std::thread::scope(|scope| {
            for handle in handles.drain(..) {
                scope.spawn(move || {
                    for _ in 0..rounds {
                        let extra = handle.share();
                        assert!(extra.ref_count() >= 2);
                        assert_eq!(extra.size(), 12);
                    }
                });
            }
        });

        assert!(keep.unique());
        assert_eq!(keep.literals(), lits.as_slice());
    }
}
