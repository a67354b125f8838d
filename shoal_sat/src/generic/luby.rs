/*!
An iterator over the luby sequence, used to schedule restarts.

See <https://oeis.org/A182105> for details on the luby sequence.

Terms are computed following the method of MiniSAT: the sequence is split into subsequences of size 2^k - 1, each of which ends with the term 2^(k-1), and the term at a position is found by repeatedly stepping into the subsequence containing the position.
*/

/// Representation used for numbers in a luby sequence.
pub type LubyRepresentation = u32;

/// The luby term at (zero-indexed) `position`.
pub fn luby_term(mut position: u64) -> LubyRepresentation {
    let mut size: u64 = 1;
    let mut seq: u32 = 0;
    while size < position + 1 {
        seq += 1;
        size = 2 * size + 1;
    }
    while size - 1 != position {
        size = (size - 1) >> 1;
        seq -= 1;
        position %= size;
    }
    1 << seq
}

/// An iterator over the luby sequence.
#[derive(Default)]
pub struct Luby {
    position: u64,
}

impl Iterator for Luby {
    type Item = LubyRepresentation;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= (1_u64 << 31) {
            return None;
        }
        let term = luby_term(self.position);
        self.position += 1;
        Some(term)
    }
}

impl Luby {
    /// The count of terms returned.
    pub fn current(&self) -> u64 {
        self.position
    }

    /// Restarts the sequence from the first term.
    pub fn reset(&mut self) {
        self.position = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // https://oeis.org/A182105
    const LUBY_SLICE: &[LubyRepresentation] = &[
        1, 1, 2, 1, 1, 2, 4, 1, 1, 2, 1, 1, 2, 4, 8, 1, 1, 2, 1, 1, 2, 4, 1, 1, 2, 1, 1, 2, 4, 8,
        16, 1, 1, 2, 1, 1, 2, 4, 1, 1, 2, 1, 1, 2, 4, 8, 1, 1, 2, 1, 1, 2, 4, 1, 1, 2, 1, 1, 2, 4,
        8, 16, 32, 1, 1, 2, 1, 1, 2, 4, 1, 1, 2, 1, 1, 2, 4, 8, 1, 1, 2, 1, 1, 2, 4, 1, 1, 2, 1, 1,
        2, 4, 8, 16, 1, 1, 2, 1, 1, 2, 4, 1, 1, 2, 1, 1, 2, 4, 8,
    ];

    #[test]
    fn luby() {
        let mut l = Luby::default();
        for known_value in LUBY_SLICE {
            assert_eq!(l.next(), Some(*known_value))
        }
    }

    #[test]
    fn reset() {
        let mut l = Luby::default();
        l.nth(5);
        l.reset();
        assert_eq!(l.current(), 0);
        assert_eq!(l.next(), Some(1));
    }
}
