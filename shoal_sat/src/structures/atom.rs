/*!
(The internal representation of) an atom (aka. a 'variable').

Each atom is a u32 *u* such that either:
- *u* is 0, or:
- *u - 1* is an atom.

```rust
# use shoal_sat::structures::atom::Atom;
let m = 97;
let atoms = (0..m).collect::<Vec<Atom>>();
```

That the atoms are [0..*m*) for some *m*.

This representation allows atoms to be used as the indicies of a structure, e.g. `levels[a]` without taking too much space.

# Notes
- The atom `0` is fixed with a value of true, at level zero, and is never placed on a trail.
- As a literal packs an atom with a sign bit, and some structures pack a literal with flags, atoms are bounded by [ATOM_MAX].
- In the SAT literature these are often called 'variables' while in the logic literature these are often called 'atoms'.
*/

/// An atom, aka. a 'variable'.
pub type Atom = u32;

/// The atom `0` is fixed internally with a value of true.
pub const TOP_ATOM: Atom = 0;

/// The maximum instance of an atom.
pub const ATOM_MAX: Atom = (1 << 30) - 1;
