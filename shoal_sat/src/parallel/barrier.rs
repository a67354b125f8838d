/*!
A combination of a barrier and a semaphore, on which the threads of a portfolio wait.

As a semaphore, a thread without work calls [down](BarrierSemaphore::down) and is woken by a thread which has made some work available through [up](BarrierSemaphore::up).
As a barrier, every thread calls [wait](BarrierSemaphore::wait), and the last thread to arrive is the leader.
The leader does whatever is needed and then [resets](BarrierSemaphore::reset) the barrier, waking every other thread.

The two uses overlap: a thread blocked in `down` counts as waiting at the barrier.
So, if every thread is blocked (on either use), the last thread to arrive is told so, rather than blocking forever.

```rust
# use shoal_sat::parallel::barrier::BarrierSemaphore;
let sem = BarrierSemaphore::new(0, 1);
// The only party is the last thread standing.
assert!(!sem.down());
sem.reset(0);
assert!(sem.wait());
```
*/

use std::sync::{Condvar, Mutex, MutexGuard};

struct State {
    /// The semaphore count, with negative values counting waiting threads.
    counter: i32,

    /// The number of parties required to trip the barrier.
    active: i32,

    /// Incremented on each reset, so waiting threads can tell a reset from a spurious wakeup.
    generation: u64,

    /// Wakeups given by `up` or `remove_party`, and not yet taken.
    signals: u32,
}

impl State {
    fn tripped(&self) -> bool {
        -self.counter >= self.active
    }

    fn reset(&mut self, count: i32) -> bool {
        let waiting = self.counter < 0;
        self.counter = count;
        self.generation += 1;
        self.signals = 0;
        waiting
    }
}

/// A barrier and semaphore.
pub struct BarrierSemaphore {
    state: Mutex<State>,
    condvar: Condvar,
}

impl BarrierSemaphore {
    /// A semaphore with the given count, and barrier for `parties` threads.
    pub fn new(counter: i32, parties: i32) -> Self {
        BarrierSemaphore {
            state: Mutex::new(State {
                counter,
                active: parties,
                generation: 0,
                signals: 0,
            }),
            condvar: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panic on some other thread does not invalidate the counts.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The current count of the semaphore.
    pub fn counter(&self) -> i32 {
        self.lock().counter
    }

    /// The number of parties required to trip the barrier.
    pub fn parties(&self) -> i32 {
        self.lock().active
    }

    /// Decreases the number of parties required to trip the barrier, resetting the barrier if `reset` is set.
    ///
    /// The calling thread must not itself be waiting.
    pub fn remove_party(&self, reset: bool) {
        let mut state = self.lock();
        state.active -= 1;
        if reset {
            if state.reset(0) {
                self.condvar.notify_all();
            }
        } else if state.tripped() {
            // Every remaining party waits, so one is woken to lead.
            state.counter = -state.active;
            state.signals += 1;
            drop(state);
            self.condvar.notify_one();
        }
    }

    /// Waits until every party has arrived.
    ///
    /// Exactly one party receives true, and should eventually [reset](BarrierSemaphore::reset) the barrier.
    pub fn wait(&self) -> bool {
        let mut state = self.lock();
        state.counter -= 1;
        if state.counter >= 0 {
            state.counter = -1;
        }
        self.block(state)
    }

    /// Resets the barrier to the given count, waking every waiting thread.
    pub fn reset(&self, count: i32) {
        let mut state = self.lock();
        if state.reset(count) {
            self.condvar.notify_all();
        }
    }

    /// Decrements the count of the semaphore, blocking if the count was not positive.
    ///
    /// Returns false if every other party is blocked, in which case the calling thread does not block.
    pub fn down(&self) -> bool {
        let mut state = self.lock();
        state.counter -= 1;
        if state.counter >= 0 {
            return true;
        }
        !self.block(state)
    }

    /// Increments the count of the semaphore, waking a blocked thread if any.
    pub fn up(&self) {
        let mut state = self.lock();
        state.counter += 1;
        if state.counter < 1 {
            state.signals += 1;
            drop(state);
            self.condvar.notify_one();
        }
    }

    /// Blocks unless the barrier is tripped, returning true if tripped on wakeup.
    fn block(&self, mut state: MutexGuard<'_, State>) -> bool {
        if state.tripped() {
            return true;
        }

        let generation = state.generation;
        loop {
            state = self
                .condvar
                .wait(state)
                .unwrap_or_else(|poisoned| poisoned.into_inner());

            if state.generation != generation {
                break;
            }
            if state.signals > 0 {
                state.signals -= 1;
                break;
            }
        }
        state.tripped()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn single_leader() {
        let threads = 6;
        let sem = BarrierSemaphore::new(0, threads);
        let leaders = AtomicUsize::new(0);

        std::thread::scope(|scope| {
            for _ in 0..threads {
                scope.spawn(|| {
                    if sem.wait() {
                        leaders.fetch_add(1, Ordering::Relaxed);
                        sem.reset(0);
                    }
                });
            }
        });

        assert_eq!(leaders.load(Ordering::Relaxed), 1);
        assert_eq!(sem.counter(), 0);
    }

    #[test]
    fn up_wakes_down() {
        let sem = BarrierSemaphore::new(0, 2);

        std::thread::scope(|scope| {
            let waiter = scope.spawn(|| sem.down());
            while sem.counter() >= 0 {
                std::thread::yield_now();
            }
            sem.up();
            assert!(waiter.join().unwrap());
        });

        assert_eq!(sem.counter(), 0);
    }

    #[test]
    fn last_standing() {
        let sem = BarrierSemaphore::new(0, 2);

        std::thread::scope(|scope| {
            let first = scope.spawn(|| sem.down());
            while sem.counter() >= 0 {
                std::thread::yield_now();
            }

            // Both parties are now without work.
            assert!(!sem.down());
            sem.reset(0);
            assert!(first.join().unwrap());
        });
    }

    #[test]
    fn remove_party_trips() {
        let sem = BarrierSemaphore::new(0, 2);

        std::thread::scope(|scope| {
            let waiter = scope.spawn(|| sem.wait());
            while sem.counter() >= 0 {
                std::thread::yield_now();
            }
            sem.remove_party(false);
            assert!(waiter.join().unwrap());
        });
        assert_eq!(sem.parties(), 1);
    }

    #[test]
    fn positive_count() {
        let sem = BarrierSemaphore::new(2, 3);
        assert!(sem.down());
        assert!(sem.down());
        sem.up();
        assert!(sem.down());
        assert_eq!(sem.counter(), 0);
    }
}
