//! Bridges a callback [`Future`] into `std::future::Future`, so it can be
//! `.await`ed or driven by an executor such as `futures::executor::block_on`.
//!
use crate::Future;
use std::{
    pin::Pin,
    sync::{Arc, Mutex, PoisonError},
    task::{Context, Poll, Waker},
};

/// The `.await`able form of a [`Future`], yielding `Result<T, E>`.
///
/// Created by [`Future::wait`] or implicitly by `.await` on a `Future`. Each
/// waiter subscribes to its future once, on first poll, and keeps only the
/// most recent waker.
///
/// # Examples
///
/// ```
/// use promise_future::Promise;
/// use futures::executor::block_on;
/// use std::thread;
///
/// let op = Promise::<(), String>::new();
/// let op_a = op.future();
/// let task1 = thread::spawn(move || block_on(op_a.wait()));
/// let task2 = thread::spawn(move || op.reject(String::from("💥")));
/// task2.join().expect("The task2 thread has panicked");
/// assert_eq!(task1.join().unwrap(), Err(String::from("💥")));
/// ```
#[must_use = "waiters do nothing unless polled"]
pub struct Waiter<T, E> {
    future: Future<T, E>,
    slot: Arc<Mutex<Slot<T, E>>>,
    subscribed: bool,
}

struct Slot<T, E> {
    value: Option<Result<T, E>>,
    waker: Option<Waker>,
}

impl<T, E> Waiter<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    pub(crate) fn new(future: Future<T, E>) -> Self {
        Self {
            future,
            slot: Arc::new(Mutex::new(Slot {
                value: None,
                waker: None,
            })),
            subscribed: false,
        }
    }
}

impl<T, E> std::future::Future for Waiter<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    type Output = Result<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if !this.subscribed {
            this.subscribed = true;
            let slot = this.slot.clone();
            this.future.on_complete(move |result| {
                let waker = {
                    let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
                    slot.value = Some(result);
                    slot.waker.take()
                };
                if let Some(waker) = waker {
                    waker.wake()
                }
            });
        }

        let mut slot = this.slot.lock().unwrap_or_else(PoisonError::into_inner);
        match slot.value.take() {
            Some(value) => Poll::Ready(value),
            None => {
                slot.waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}
