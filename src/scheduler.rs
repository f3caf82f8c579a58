//! Execution contexts for delivering settled results.
//!
//! The core always delivers synchronously on the thread that triggers a
//! handler. A host that needs delivery somewhere else, such as a UI loop,
//! supplies a [`Scheduler`] and derives a future with
//! [`Future::dispatch_on`](crate::Future::dispatch_on).
use std::{
    collections::VecDeque,
    fmt,
    sync::{Arc, Mutex, PoisonError},
};
use tracing::trace;

/// A unit of work handed to a [`Scheduler`].
pub type Task = Box<dyn FnOnce() + Send>;

pub trait Scheduler: Send + Sync {
    /// Arrange for `task` to run exactly once.
    fn schedule(&self, task: Task);
}

impl<S: Scheduler + ?Sized> Scheduler for Arc<S> {
    fn schedule(&self, task: Task) {
        (**self).schedule(task)
    }
}

/// Runs every task immediately on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inline;

impl Scheduler for Inline {
    fn schedule(&self, task: Task) {
        task()
    }
}

/// A FIFO queue of tasks that only run when the owner pumps it.
///
/// Clones share one queue. Nothing runs until [`run_one`](Self::run_one) or
/// [`run_pending`](Self::run_pending) is called, which makes delivery order
/// deterministic.
///
/// # Examples
///
/// ```
/// use promise_future::{Outcome, Promise, QueueScheduler};
///
/// let queue = QueueScheduler::new();
/// let promise = Promise::<u8, ()>::new();
/// let delivered = promise.dispatch_on(queue.clone());
///
/// promise.resolve(1);
/// assert!(delivered.is_pending());
/// assert_eq!(queue.run_pending(), 1);
/// assert_eq!(delivered.outcome(), Outcome::Success(1));
/// ```
#[derive(Clone, Default)]
pub struct QueueScheduler {
    queue: Arc<Mutex<VecDeque<Task>>>,
}

impl fmt::Debug for QueueScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueScheduler")
            .field("queued", &self.len())
            .finish()
    }
}

impl QueueScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run the oldest queued task. Returns `false` if the queue was empty.
    pub fn run_one(&self) -> bool {
        // Pop under the lock, run without it: a task may schedule more work.
        let task = self
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        match task {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }

    /// Run tasks until the queue is empty, including any scheduled by the
    /// tasks themselves. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while self.run_one() {
            ran += 1;
        }
        trace!(ran, "queue drained");
        ran
    }
}

impl Scheduler for QueueScheduler {
    fn schedule(&self, task: Task) {
        let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        queue.push_back(task);
        trace!(queued = queue.len(), "task scheduled");
    }
}
