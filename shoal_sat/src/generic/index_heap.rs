/*!
A max-heap on a subset of a fixed range of indicies, ordered by a value kept for every index.

The values are stored for each index, whether or not the index is on the heap.
So, an index may be removed from the heap and later reinserted with the value it had, or a revised value.

For example, [IndexHeap] is used to order [atoms](crate::structures::atom) by activity, as an atom is removed from the heap when given a value and reinserted when the value is undone, while the activity of the atom persists.

```rust
# use shoal_sat::generic::index_heap::IndexHeap;
let mut heap = IndexHeap::default();

heap.grow_to(601);
heap.set_value(600, 10);
heap.set_value(0, 70);

heap.insert(600);
heap.insert(0);

assert_eq!(heap.capacity(), 601);
assert_eq!(heap.value_at(5), &i32::default());

assert_eq!(heap.pop_max(), Some(0));
assert_eq!(heap.pop_max(), Some(600));

assert!(heap.pop_max().is_none());
```
*/

/// Marks an index which is not on the heap.
const ABSENT: u32 = u32::MAX;

/// The index heap struct.
pub struct IndexHeap<V: PartialOrd + Default + Copy> {
    /// The value of each index.
    values: Vec<V>,

    /// The position of each index on the heap, or [ABSENT].
    position: Vec<u32>,

    /// The heap, as a list of indicies.
    heap: Vec<u32>,
}

impl<V: PartialOrd + Default + Copy> Default for IndexHeap<V> {
    fn default() -> Self {
        IndexHeap {
            values: Vec::default(),
            position: Vec::default(),
            heap: Vec::default(),
        }
    }
}

impl<V: PartialOrd + Default + Copy> IndexHeap<V> {
    /// Ensures every index below `count` has a (default) value.
    pub fn grow_to(&mut self, count: usize) {
        if self.values.len() < count {
            self.values.resize(count, V::default());
            self.position.resize(count, ABSENT);
        }
    }

    /// The count of indicies with a value.
    pub fn capacity(&self) -> usize {
        self.values.len()
    }

    /// The count of indicies on the heap.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// True if no index is on the heap, false otherwise.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// True if `index` is on the heap.
    pub fn contains(&self, index: usize) -> bool {
        self.position.get(index).is_some_and(|p| *p != ABSENT)
    }

    /// The value of `index`.
    pub fn value_at(&self, index: usize) -> &V {
        &self.values[index]
    }

    /// Sets the value of `index`, and restores the heap if `index` is on the heap.
    pub fn set_value(&mut self, index: usize, value: V) {
        self.grow_to(index + 1);
        self.values[index] = value;
        if let Some(&p) = self.position.get(index).filter(|p| **p != ABSENT) {
            self.sift_up(p as usize);
            self.sift_down(self.position[index] as usize);
        }
    }

    /// Places `index` on the heap.
    /// Returns true if `index` was not already on the heap, false otherwise.
    pub fn insert(&mut self, index: usize) -> bool {
        self.grow_to(index + 1);
        if self.position[index] != ABSENT {
            return false;
        }
        self.position[index] = self.heap.len() as u32;
        self.heap.push(index as u32);
        self.sift_up(self.heap.len() - 1);
        true
    }

    /// Removes `index` from the heap.
    /// Returns true if `index` was on the heap, false otherwise.
    pub fn remove(&mut self, index: usize) -> bool {
        if !self.contains(index) {
            return false;
        }
        let at = self.position[index] as usize;
        let last = self.heap.len() - 1;
        self.swap(at, last);
        self.heap.pop();
        self.position[index] = ABSENT;
        if at < self.heap.len() {
            self.sift_up(at);
            self.sift_down(at);
        }
        true
    }

    /// The index with the maximum value, if any.
    pub fn peek_max(&self) -> Option<usize> {
        self.heap.first().map(|i| *i as usize)
    }

    /// Removes and returns the index with the maximum value, if any.
    pub fn pop_max(&mut self) -> Option<usize> {
        let max = self.peek_max()?;
        self.remove(max);
        Some(max)
    }

    /// Applies `f` to every value, which must preserve the order of values.
    pub fn scale_all(&mut self, f: impl Fn(V) -> V) {
        for value in self.values.iter_mut() {
            *value = f(*value);
        }
    }

    /// Rebuilds the heap, for use after arbitrary revisions to values.
    pub fn rebuild(&mut self) {
        for at in (0..self.heap.len() / 2).rev() {
            self.sift_down(at);
        }
    }

    fn value_on_heap(&self, at: usize) -> V {
        self.values[self.heap[at] as usize]
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.position[self.heap[a] as usize] = a as u32;
        self.position[self.heap[b] as usize] = b as u32;
    }

    fn sift_up(&mut self, mut at: usize) {
        while at > 0 {
            let parent = (at - 1) / 2;
            if self.value_on_heap(parent) >= self.value_on_heap(at) {
                break;
            }
            self.swap(at, parent);
            at = parent;
        }
    }

    fn sift_down(&mut self, mut at: usize) {
        loop {
            let left = 2 * at + 1;
            if left >= self.heap.len() {
                break;
            }
            let right = left + 1;
            let child = if right < self.heap.len() && self.value_on_heap(right) > self.value_on_heap(left) {
                right
            } else {
                left
            };
            if self.value_on_heap(child) <= self.value_on_heap(at) {
                break;
            }
            self.swap(at, child);
            at = child;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heap_of(values: &[(usize, i32)]) -> IndexHeap<i32> {
        let mut heap = IndexHeap::default();
        for (index, value) in values {
            heap.set_value(*index, *value);
            heap.insert(*index);
        }
        heap
    }

    #[test]
    fn heap_simple() {
        let mut heap = heap_of(&[(6, 10), (5, 20), (4, 30), (1, 60), (0, 70)]);

        assert_eq!(heap.pop_max(), Some(0));
        assert_eq!(heap.pop_max(), Some(1));
        assert_eq!(heap.pop_max(), Some(4));
        assert_eq!(heap.pop_max(), Some(5));
        assert_eq!(heap.pop_max(), Some(6));
        assert!(heap.is_empty());
    }

    #[test]
    fn heap_update() {
        let mut heap = heap_of(&[(6, 10), (4, 30), (1, 60), (0, 70)]);

        heap.set_value(0, 0);
        heap.set_value(1, 1);
        heap.set_value(4, 4);
        heap.set_value(6, 6);

        assert_eq!(heap.pop_max(), Some(6));
        assert_eq!(heap.pop_max(), Some(4));
        assert_eq!(heap.pop_max(), Some(1));
        assert_eq!(heap.pop_max(), Some(0));
        assert!(heap.pop_max().is_none());
    }

    #[test]
    fn heap_remove_and_reinsert() {
        let mut heap = heap_of(&[(6, 6), (5, 5), (4, 4), (1, 1), (0, 0)]);

        assert!(heap.remove(4));
        assert!(!heap.remove(4));
        assert!(heap.remove(6));
        assert!(!heap.insert(5));

        heap.set_value(4, 2);
        assert!(heap.insert(4));

        assert_eq!(heap.pop_max(), Some(5));
        assert_eq!(heap.pop_max(), Some(4));
        assert_eq!(heap.pop_max(), Some(1));
        assert_eq!(heap.pop_max(), Some(0));
    }

    #[test]
    fn heap_scale() {
        let mut heap = heap_of(&[(2, 8), (3, 4)]);
        heap.scale_all(|v| v / 4);

        assert_eq!(heap.value_at(2), &2);
        assert_eq!(heap.value_at(3), &1);
        assert_eq!(heap.pop_max(), Some(2));
    }
}
