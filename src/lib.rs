//! A single-shot future/promise pair driven by callbacks.
//!
//! A [`Promise`] is the producer side: it settles exactly once, either by
//! [`resolve`](Promise::resolve) or [`reject`](Promise::reject). A
//! [`Future`] is the read-only view handed to consumers, who register
//! [`on_success`](Future::on_success) / [`on_failure`](Future::on_failure)
//! handlers or derive new futures with [`map`](Future::map) and
//! [`flat_map`](Future::flat_map).
//!
//! Handlers fire synchronously on whichever thread triggers them: the one
//! that settles the promise, or the one that registers after it settled.
//! Use [`Future::dispatch_on`] with a [`Scheduler`] to move delivery
//! elsewhere, or `.await` a future through [`Waiter`].
//!
//! # Examples
//!
//! ```
//! use promise_future::Promise;
//! use std::sync::mpsc::channel;
//! use std::thread;
//!
//! let promise = Promise::<String, String>::new();
//! let (tx, rx) = channel();
//! promise
//!     .map(|name| name.len())
//!     .on_success(move |len| tx.send(len).unwrap());
//!
//! let producer = promise.clone();
//! thread::spawn(move || producer.resolve("🍓🍓".into()))
//!     .join()
//!     .expect("The producer thread has panicked");
//! assert_eq!(rx.recv().unwrap(), 8);
//! ```
mod delivery;
pub mod future;
pub mod outcome;
pub mod promise;
pub mod scheduler;
pub mod waiter;

pub use future::Future;
pub use outcome::Outcome;
pub use promise::Promise;
pub use scheduler::{Inline, QueueScheduler, Scheduler, Task};
pub use waiter::Waiter;

/// Errors reported by the fallible settlement calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("the promise was already settled")]
    AlreadySettled,
}
