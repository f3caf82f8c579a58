use crate::{Error, Future};
use std::{fmt, ops::Deref};
use tracing::debug;

/// The producer side: settles its [`Future`] exactly once.
///
/// A `Promise` derefs to its `Future`, so it can be subscribed to and
/// chained directly. Clones share the same state; any of them may settle it
/// from any thread, and the first settlement wins. Later `resolve`/`reject`
/// calls are silently ignored (use the `try_` variants to be told).
///
/// # Examples
///
/// ```
/// use promise_future::Promise;
/// use futures::executor::block_on;
/// use std::thread;
///
/// let promise = Promise::<String, String>::new();
/// let consumer = promise.future();
/// let task1 = thread::spawn(move || block_on(async {
///     consumer.await
/// }));
/// promise.resolve("Hi".into());
/// let received = task1.join().expect("The task1 thread has panicked.");
/// assert_eq!(received, Ok("Hi".to_string()));
/// ```
pub struct Promise<T, E> {
    future: Future<T, E>,
}

impl<T, E> Clone for Promise<T, E> {
    fn clone(&self) -> Self {
        Self {
            future: self.future.clone(),
        }
    }
}

impl<T, E> fmt::Debug for Promise<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Promise").field(&self.future).finish()
    }
}

impl<T, E> Deref for Promise<T, E> {
    type Target = Future<T, E>;

    fn deref(&self) -> &Self::Target {
        &self.future
    }
}

impl<T, E> Default for Promise<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Promise<T, E> {
    /// A pending promise.
    pub fn new() -> Self {
        Self {
            future: Future::pending(),
        }
    }

    /// A promise that has already succeeded, for handing out a result that
    /// is known up front.
    pub fn resolved(value: T) -> Self {
        Self {
            future: Future::resolved(value),
        }
    }

    /// A promise that has already failed.
    pub fn rejected(error: E) -> Self {
        Self {
            future: Future::rejected(error),
        }
    }

    /// The read-only view to hand to consumers.
    pub fn future(&self) -> Future<T, E> {
        self.future.clone()
    }
}

impl<T, E> Promise<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    ///promise.resolve
    ///
    /// # Examples
    ///
    /// ```
    /// use promise_future::{Outcome, Promise};
    ///
    /// let promise = Promise::<&str, ()>::new();
    /// promise.resolve("🍓");
    /// promise.resolve("🍌");
    /// assert_eq!(promise.outcome(), Outcome::Success("🍓"));
    /// ```
    pub fn resolve(&self, value: T) {
        self.settle(Ok(value))
    }

    ///promise.reject
    ///
    /// # Examples
    ///
    /// ```
    /// use promise_future::{Outcome, Promise};
    ///
    /// let promise = Promise::<(), &str>::new();
    /// promise.reject("💥");
    /// promise.resolve(());
    /// assert_eq!(promise.outcome(), Outcome::Failure("💥"));
    /// ```
    pub fn reject(&self, error: E) {
        self.settle(Err(error))
    }

    /// Resolve or reject from a `Result`. Ignored if already settled.
    pub fn settle(&self, result: Result<T, E>) {
        if self.try_settle(result).is_err() {
            debug!("ignoring settlement of an already settled promise");
        }
    }

    /// Resolve, reporting [`Error::AlreadySettled`] instead of ignoring a
    /// second settlement. The rejected value is dropped.
    pub fn try_resolve(&self, value: T) -> Result<(), Error> {
        self.try_settle(Ok(value))
    }

    /// Reject, reporting [`Error::AlreadySettled`] instead of ignoring a
    /// second settlement.
    pub fn try_reject(&self, error: E) -> Result<(), Error> {
        self.try_settle(Err(error))
    }

    /// Resolve or reject from a `Result`, reporting
    /// [`Error::AlreadySettled`] if the promise was already settled.
    pub fn try_settle(&self, result: Result<T, E>) -> Result<(), Error> {
        self.future.transition(result)
    }
}

impl<T, E> From<Result<T, E>> for Promise<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::resolved(value),
            Err(error) => Self::rejected(error),
        }
    }
}

impl<T, E> From<Promise<T, E>> for Future<T, E> {
    fn from(promise: Promise<T, E>) -> Self {
        promise.future
    }
}
