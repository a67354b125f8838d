/*!
Control of a portfolio, shared by every thread.

Threads communicate through a single atomic control word, together with a queue of work and a [BarrierSemaphore].

The low three bits of the control word are messages, to which threads react whenever a check is made:
- [TERMINATE](flags::TERMINATE): stop, as the portfolio is done.
- [SYNC](flags::SYNC): wait at the barrier until every thread has arrived.
- [SPLIT](flags::SPLIT): some thread is without work, and a thread with a disjoint path should split the path.

The remaining bits qualify messages or record the mode of the portfolio.

Requests for work are counted, and the split flag is kept in step with the count, so any number of threads may request work without the flag flickering.
*/

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, AtomicU64, Ordering};

use crossbeam::queue::SegQueue;

use crate::{
    config::parallel::{GlobalRestarts, ParallelConfig, SplitMode},
    misc::log::targets::{self},
    structures::literal::CLiteral,
};

use super::{barrier::BarrierSemaphore, guiding_path::Work};

/// Flags of the control word.
pub mod flags {
    pub const TERMINATE: u32 = 1;
    pub const SYNC: u32 = 2;
    pub const SPLIT: u32 = 4;
    pub const RESTART: u32 = 8;

    /// The search space was exhausted, or some thread found a model.
    pub const COMPLETE: u32 = 16;

    /// Termination was requested from outside the portfolio.
    pub const INTERRUPT: u32 = 32;

    /// Paths may be split.
    pub const ALLOW_GP: u32 = 64;

    /// Global restarts are no longer made.
    pub const FORBID_RESTART: u32 = 128;

    /// The messages of the control word.
    pub const MESSAGES: u32 = TERMINATE | SYNC | SPLIT;
}

/// Messages which may be posted to every thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Message {
    Terminate,
    Interrupt,
    SyncRestart,
    Split,
}

impl Message {
    pub fn bits(self) -> u32 {
        match self {
            Self::Terminate => flags::TERMINATE,
            Self::Interrupt => flags::TERMINATE | flags::INTERRUPT,
            Self::SyncRestart => flags::SYNC | flags::RESTART,
            Self::Split => flags::SPLIT,
        }
    }
}

/// Data shared by every thread of a portfolio.
pub struct SharedData {
    control: AtomicU32,

    /// A count of outstanding requests for work.
    work_req: AtomicI32,

    /// A count of threads requesting a global restart.
    restart_req: AtomicU32,

    /// The work semaphore, also used as the barrier on synchronisation.
    pub work_sem: BarrierSemaphore,

    work_q: SegQueue<Work>,

    /// The path given to the portfolio, typically empty.
    initial: Vec<CLiteral>,

    restarts: GlobalRestarts,

    /// The index of the current global restart.
    restart_index: AtomicU32,

    /// The number of conflicts after which a thread requests a global restart.
    max_conflict: AtomicU64,

    /// Set by the leader of a synchronisation if the queue was refilled.
    refilled: AtomicBool,
}

impl SharedData {
    /// Shared data for a portfolio of `threads` threads, given the `initial` path.
    ///
    /// A synchronisation is requested, so every thread waits for the others before taking work from the queue.
    pub fn new(threads: usize, config: &ParallelConfig, initial: Vec<CLiteral>) -> Self {
        let restarts = config.global_restarts;
        let data = SharedData {
            control: AtomicU32::new(0),
            work_req: AtomicI32::new(0),
            restart_req: AtomicU32::new(0),
            work_sem: BarrierSemaphore::new(0, threads as i32),
            work_q: SegQueue::new(),
            initial,
            restarts,
            restart_index: AtomicU32::new(0),
            max_conflict: AtomicU64::new(match restarts.max {
                0 => u64::MAX,
                _ => restarts.base,
            }),
            refilled: AtomicBool::new(false),
        };

        match config.mode.value {
            SplitMode::Split => data.set_control(flags::ALLOW_GP),
            SplitMode::Compete => data.set_control(flags::FORBID_RESTART),
        };
        data.set_control(flags::SYNC);
        data
    }

    #[inline]
    fn control(&self) -> u32 {
        self.control.load(Ordering::Acquire)
    }

    /// True if some message is active.
    pub fn has_message(&self) -> bool {
        self.control() & flags::MESSAGES != 0
    }

    pub fn synchronize(&self) -> bool {
        self.has_control(flags::SYNC)
    }

    pub fn terminate(&self) -> bool {
        self.has_control(flags::TERMINATE)
    }

    pub fn split(&self) -> bool {
        self.has_control(flags::SPLIT)
    }

    pub fn has_control(&self, flags: u32) -> bool {
        self.control() & flags != 0
    }

    pub fn interrupt(&self) -> bool {
        self.has_control(flags::INTERRUPT)
    }

    pub fn complete(&self) -> bool {
        self.has_control(flags::COMPLETE)
    }

    pub fn allow_split(&self) -> bool {
        self.has_control(flags::ALLOW_GP)
    }

    pub fn allow_restart(&self) -> bool {
        !self.has_control(flags::FORBID_RESTART)
    }

    /// Sets `flags`, returning true if some flag was not already set.
    pub fn set_control(&self, flags: u32) -> bool {
        self.control.fetch_or(flags, Ordering::AcqRel) & flags != flags
    }

    /// Clears `flags`, returning true if every flag was set.
    pub fn clear_control(&self, flags: u32) -> bool {
        self.control.fetch_and(!flags, Ordering::AcqRel) & flags == flags
    }

    /// The count of outstanding requests for work.
    pub fn work_requests(&self) -> i32 {
        self.work_req.load(Ordering::Acquire)
    }

    /// Posts `message` to every thread, waking any blocked thread if `notify` is set.
    ///
    /// Returns true if the message was posted, and false if the message was already active.
    pub fn post_message(&self, message: Message, notify: bool) -> bool {
        if message == Message::Split {
            if self.work_req.fetch_add(1, Ordering::AcqRel) + 1 == 1 {
                self.update_split_flag();
            }
            return true;
        }

        match self.set_control(message.bits()) {
            true => {
                log::debug!(target: targets::PARALLEL, "Posted {message:?}");
                if notify {
                    self.work_sem.reset(0);
                }
                true
            }
            false => false,
        }
    }

    /// Notes a request for work is about to be met by a split.
    pub fn about_to_split(&self) {
        if self.work_req.fetch_sub(1, Ordering::AcqRel) - 1 == 0 {
            self.update_split_flag();
        }
    }

    /// Keeps the split flag in step with the count of requests for work.
    fn update_split_flag(&self) {
        loop {
            let requested = self.work_requests() > 0;
            if self.split() == requested {
                return;
            }
            match requested {
                true => self.control.fetch_or(flags::SPLIT, Ordering::AcqRel),
                false => self.control.fetch_and(!flags::SPLIT, Ordering::AcqRel),
            };
        }
    }

    /// Takes some work from the queue, if any.
    pub fn take_work(&self) -> Option<Work> {
        self.work_q.pop()
    }

    /// Adds some work to the queue, waking a thread waiting for work.
    pub fn push_work(&self, literals: Vec<CLiteral>) {
        self.work_q.push(Work {
            literals,
            initial: false,
        });
        self.work_sem.up();
    }

    /// Returns a path taken by a lost thread to the queue.
    pub fn return_work(&self, work: Work) {
        self.work_q.push(work);
        self.work_sem.up();
    }

    /// Refills the queue with the initial path: once, if paths may be split, and otherwise once for each thread.
    pub fn init_queue(&self) {
        while self.work_q.pop().is_some() {}

        let count = match self.allow_split() {
            true => 1,
            false => self.work_sem.parties().max(1) as usize,
        };
        for _ in 0..count {
            self.work_q.push(Work {
                literals: self.initial.clone(),
                initial: true,
            });
        }
    }

    /// The number of conflicts on a path after which a thread requests a global restart.
    pub fn max_conflict(&self) -> u64 {
        self.max_conflict.load(Ordering::Acquire)
    }

    /// Requests a global restart, posting a synchronisation once every thread has made a request.
    pub fn request_restart(&self) {
        if self.allow_restart()
            && self.restart_req.fetch_add(1, Ordering::AcqRel) + 1 >= self.work_sem.parties() as u32
        {
            self.post_message(Message::SyncRestart, true);
        }
    }

    /// Waits at the barrier until every thread has arrived.
    ///
    /// The last thread to arrive completes the synchronisation:
    /// - On a restart, the global restart schedule is advanced.
    /// - The queue is refilled with the initial path, unless global restarts have been forbidden since the request.
    ///
    /// Returns true if a thread with a path should give up the path.
    pub fn wait_on_sync(&self, has_path: bool) -> bool {
        if self.work_sem.wait() {
            self.work_req.store(0, Ordering::Release);
            self.restart_req.store(0, Ordering::Release);

            let mut init = true;
            if self.has_control(flags::RESTART) {
                init = self.allow_restart();
                if init {
                    let index = self.restart_index.fetch_add(1, Ordering::AcqRel) + 1;
                    log::info!(target: targets::PARALLEL, "Global restart {index}");
                }
                let index = self.restart_index.load(Ordering::Acquire);
                let next = match self.allow_restart() && index < self.restarts.max {
                    true => (self.restarts.base as f64 * self.restarts.grow.powi(index as i32)) as u64,
                    false => u64::MAX,
                };
                self.max_conflict.store(next, Ordering::Release);
            } else if self.max_conflict() != u64::MAX && !self.allow_restart() {
                self.max_conflict.store(u64::MAX, Ordering::Release);
            }

            if init {
                self.init_queue();
            }
            self.refilled.store(init, Ordering::Release);

            self.clear_control(flags::SPLIT | flags::SYNC | flags::RESTART);
            log::debug!(target: targets::PARALLEL, "Synchronised, queue refilled: {init}");
            self.work_sem.reset(0);
        }

        self.terminate() || (has_path && self.refilled.load(Ordering::Acquire))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared(threads: usize, mode: SplitMode) -> SharedData {
        let mut config = ParallelConfig::default();
        config.mode.value = mode;
        SharedData::new(threads, &config, Vec::default())
    }

    #[test]
    fn initial_sync() {
        let data = shared(2, SplitMode::Split);
        assert!(data.synchronize());
        assert!(data.has_message());
        assert!(data.allow_split());
        assert!(!data.terminate());
    }

    #[test]
    fn split_tracks_requests() {
        let data = shared(3, SplitMode::Split);
        data.post_message(Message::Split, false);
        data.post_message(Message::Split, false);
        assert!(data.split());

        data.about_to_split();
        assert!(data.split());
        data.about_to_split();
        assert!(!data.split());
    }

    #[test]
    fn terminate_once() {
        let data = shared(2, SplitMode::Compete);
        assert!(data.post_message(Message::Terminate, false));
        assert!(!data.post_message(Message::Terminate, false));
        assert!(data.terminate());
        assert!(!data.interrupt());
        assert!(data.post_message(Message::Interrupt, false));
        assert!(data.interrupt());
    }

    #[test]
    fn queue_by_mode() {
        let data = shared(3, SplitMode::Split);
        data.init_queue();
        assert!(data.take_work().is_some_and(|work| work.initial));
        assert!(data.take_work().is_none());

        let data = shared(3, SplitMode::Compete);
        data.init_queue();
        assert_eq!(std::iter::from_fn(|| data.take_work()).count(), 3);
    }

    #[test]
    fn sync_leader_refills() {
        let data = shared(1, SplitMode::Split);
        assert!(!data.wait_on_sync(false));
        assert!(!data.synchronize());
        assert!(data.take_work().is_some());
    }

    #[test]
    fn global_restart_schedule() {
        let mut config = ParallelConfig::default();
        config.global_restarts = GlobalRestarts {
            max: 2,
            base: 100,
            grow: 2.0,
        };
        let data = SharedData::new(1, &config, Vec::default());
        assert!(data.allow_restart());
        assert_eq!(data.max_conflict(), 100);
        data.wait_on_sync(false);

        data.request_restart();
        assert!(data.synchronize());
        assert!(data.wait_on_sync(true));
        assert_eq!(data.max_conflict(), 200);

        data.request_restart();
        data.wait_on_sync(true);
        assert_eq!(data.max_conflict(), u64::MAX);
    }
}
