//! The single UI scheduling context.
//!
//! Every piece of shared navigation state in Arbor is mutated from one
//! logical context: the main thread draining this queue. Background work
//! may produce values on any thread, but the values hop through
//! [`MainScheduler::post`] before they touch a router, a coordinator, or
//! a view binding. That hop is the only mutual-exclusion mechanism in the
//! system; there are no locks guarding navigation state itself.
//!
//! The scheduler is pumped by the host (`run_until_idle`), which keeps
//! delivery deterministic under test: advance the clock, then pump and
//! observe.

use std::collections::{BinaryHeap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::Mutex;

use crate::clock::{Clock, SystemClock};
use crate::precondition::precondition_failure;

type Task = Box<dyn FnOnce() + Send>;

struct TimedTask {
    due_ms: u64,
    seq: u64,
    task: Task,
}

impl PartialEq for TimedTask {
    fn eq(&self, other: &Self) -> bool {
        self.due_ms == other.due_ms && self.seq == other.seq
    }
}

impl Eq for TimedTask {}

impl PartialOrd for TimedTask {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimedTask {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Inverted so the BinaryHeap pops the earliest deadline first,
        // FIFO within a deadline.
        other
            .due_ms
            .cmp(&self.due_ms)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

struct SchedulerInner {
    clock: Arc<dyn Clock>,
    main_thread: ThreadId,
    queue: Mutex<VecDeque<Task>>,
    timers: Mutex<BinaryHeap<TimedTask>>,
    timer_seq: AtomicU64,
}

/// Handle to the main delivery queue. Cheap to clone; all clones share
/// the same queue and the same pinned main thread.
#[derive(Clone)]
pub struct MainScheduler {
    inner: Arc<SchedulerInner>,
}

impl MainScheduler {
    /// Create a scheduler pinned to the calling thread, on wall-clock
    /// time. Construct it once, at startup, on the main thread.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock::new()))
    }

    /// Create a scheduler pinned to the calling thread, on the given
    /// clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                clock,
                main_thread: thread::current().id(),
                queue: Mutex::new(VecDeque::new()),
                timers: Mutex::new(BinaryHeap::new()),
                timer_seq: AtomicU64::new(0),
            }),
        }
    }

    /// The clock driving delayed work.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.inner.clock
    }

    /// Whether the calling thread is the main scheduling context.
    pub fn is_main_context(&self) -> bool {
        thread::current().id() == self.inner.main_thread
    }

    /// Fail fast unless called from the main scheduling context.
    #[track_caller]
    pub fn assert_main_context(&self, operation: &str) {
        if !self.is_main_context() {
            precondition_failure(&format!("{operation} called off the main context"));
        }
    }

    /// Enqueue a task for the next pump. Callable from any thread.
    pub fn post(&self, task: impl FnOnce() + Send + 'static) {
        self.inner.queue.lock().push_back(Box::new(task));
    }

    /// Enqueue a task to run once the clock has advanced by at least
    /// `delay_ms`. Callable from any thread.
    pub fn post_delayed(&self, delay_ms: u64, task: impl FnOnce() + Send + 'static) {
        let due_ms = self.inner.clock.now_ms().saturating_add(delay_ms);
        let seq = self.inner.timer_seq.fetch_add(1, Ordering::Relaxed);
        self.inner.timers.lock().push(TimedTask {
            due_ms,
            seq,
            task: Box::new(task),
        });
    }

    /// Whether any task is queued or waiting on a timer.
    pub fn has_pending_work(&self) -> bool {
        // One lock at a time; promote_due_timers takes them in the
        // other order.
        let queued = !self.inner.queue.lock().is_empty();
        if queued {
            return true;
        }
        !self.inner.timers.lock().is_empty()
    }

    /// Drain the queue on the main context, promoting due timers as it
    /// goes. Tasks enqueued re-entrantly run in the same pump. Returns
    /// the number of tasks executed.
    pub fn run_until_idle(&self) -> usize {
        self.assert_main_context("run_until_idle");
        let mut ran = 0;
        loop {
            self.promote_due_timers();
            let task = self.inner.queue.lock().pop_front();
            let Some(task) = task else { break };
            task();
            ran += 1;
        }
        ran
    }

    fn promote_due_timers(&self) {
        let now = self.inner.clock.now_ms();
        let mut timers = self.inner.timers.lock();
        let mut queue = self.inner.queue.lock();
        loop {
            match timers.peek() {
                Some(timed) if timed.due_ms <= now => {}
                _ => break,
            }
            if let Some(timed) = timers.pop() {
                queue.push_back(timed.task);
            }
        }
    }
}

impl Default for MainScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MainScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let queued = self.inner.queue.lock().len();
        let timers = self.inner.timers.lock().len();
        f.debug_struct("MainScheduler")
            .field("main_thread", &self.inner.main_thread)
            .field("queued", &queued)
            .field("timers", &timers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn tasks_run_in_post_order() {
        let scheduler = MainScheduler::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for i in 0..3 {
            let log = log.clone();
            scheduler.post(move || log.lock().push(i));
        }
        assert_eq!(scheduler.run_until_idle(), 3);
        assert_eq!(*log.lock(), vec![0, 1, 2]);
    }

    #[test]
    fn reentrant_posts_run_in_same_pump() {
        let scheduler = MainScheduler::new();
        let count = Arc::new(AtomicUsize::new(0));
        {
            let scheduler2 = scheduler.clone();
            let count = count.clone();
            scheduler.post(move || {
                let count = count.clone();
                scheduler2.post(move || {
                    count.fetch_add(1, Ordering::SeqCst);
                });
            });
        }
        scheduler.run_until_idle();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn delayed_tasks_wait_for_the_clock() {
        let clock = Arc::new(ManualClock::new(0));
        let scheduler = MainScheduler::with_clock(clock.clone());
        let count = Arc::new(AtomicUsize::new(0));
        {
            let count = count.clone();
            scheduler.post_delayed(100, move || {
                count.fetch_add(1, Ordering::SeqCst);
            });
        }

        scheduler.run_until_idle();
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(scheduler.has_pending_work());

        clock.advance(99);
        scheduler.run_until_idle();
        assert_eq!(count.load(Ordering::SeqCst), 0);

        clock.advance(1);
        scheduler.run_until_idle();
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!scheduler.has_pending_work());
    }

    #[test]
    fn delayed_tasks_with_equal_deadline_keep_fifo_order() {
        let clock = Arc::new(ManualClock::new(0));
        let scheduler = MainScheduler::with_clock(clock.clone());
        let log = Arc::new(Mutex::new(Vec::new()));
        for i in 0..3 {
            let log = log.clone();
            scheduler.post_delayed(10, move || log.lock().push(i));
        }
        clock.advance(10);
        scheduler.run_until_idle();
        assert_eq!(*log.lock(), vec![0, 1, 2]);
    }

    #[test]
    fn posts_from_other_threads_are_delivered() {
        let scheduler = MainScheduler::new();
        let count = Arc::new(AtomicUsize::new(0));
        let handle = {
            let scheduler = scheduler.clone();
            let count = count.clone();
            thread::spawn(move || {
                assert!(!scheduler.is_main_context());
                scheduler.post(move || {
                    count.fetch_add(1, Ordering::SeqCst);
                });
            })
        };
        handle.join().unwrap();
        scheduler.run_until_idle();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    #[should_panic(expected = "off the main context")]
    fn pumping_off_thread_fails_fast() {
        let scheduler = MainScheduler::new();
        let handle = {
            let scheduler = scheduler.clone();
            thread::spawn(move || {
                scheduler.run_until_idle();
            })
        };
        if let Err(panic) = handle.join() {
            std::panic::resume_unwind(panic);
        }
    }
}
