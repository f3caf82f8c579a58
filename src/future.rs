//! The consumer side of a promise.
//!
//! A [`Future`] is a cheap, cloneable handle to state shared with its
//! [`Promise`]. The state holds the [`Outcome`] and an ordered list of
//! handlers still waiting for it, both behind one `Mutex` per instance.
//! Settlement is check-and-set under that lock, so concurrent producers
//! never both win, and a handler is either queued before the transition or
//! sees the settled outcome after it. Handlers always run with the lock
//! released.
use crate::{
    delivery::{self, Job, Link},
    waiter::Waiter,
    Error, Outcome, Promise, Scheduler,
};
use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tracing::trace;

pub struct Future<T, E> {
    state: Arc<Mutex<Inner<T, E>>>,
}

struct Inner<T, E> {
    outcome: Outcome<T, E>,
    handlers: Vec<Handler<T, E>>,
}

/// A registered callback, tagged with the branch it listens to.
enum Handler<T, E> {
    Success(Box<dyn FnOnce(T) + Send>),
    Failure(Box<dyn FnOnce(E) + Send>),
    Complete(Box<dyn FnOnce(Result<T, E>) + Send>),
}

impl<T: Clone, E: Clone> Handler<T, E> {
    fn call(self, result: &Result<T, E>) {
        match (self, result) {
            (Handler::Success(handler), Ok(value)) => handler(value.clone()),
            (Handler::Failure(handler), Err(error)) => handler(error.clone()),
            (Handler::Complete(handler), result) => handler(result.clone()),
            _ => {}
        }
    }
}

impl<T, E> Clone for Future<T, E> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<T, E> fmt::Debug for Future<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        let state = match inner.outcome {
            Outcome::Pending => "Pending",
            Outcome::Success(_) => "Success",
            Outcome::Failure(_) => "Failure",
        };
        f.debug_struct("Future")
            .field("outcome", &state)
            .field("handlers", &inner.handlers.len())
            .finish()
    }
}

impl<T, E> Future<T, E> {
    fn with_outcome(outcome: Outcome<T, E>) -> Self {
        Self {
            state: Arc::new(Mutex::new(Inner {
                outcome,
                handlers: Vec::new(),
            })),
        }
    }

    pub(crate) fn pending() -> Self {
        Self::with_outcome(Outcome::Pending)
    }

    /// A future that has already succeeded with `value`.
    pub fn resolved(value: T) -> Self {
        Self::with_outcome(Outcome::Success(value))
    }

    /// A future that has already failed with `error`.
    pub fn rejected(error: E) -> Self {
        Self::with_outcome(Outcome::Failure(error))
    }

    // Handlers never run under the lock. Only a user `Clone` or `Drop` impl
    // can panic while it is held, and the outcome is consistent either way.
    fn lock(&self) -> MutexGuard<'_, Inner<T, E>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_pending(&self) -> bool {
        self.lock().outcome.is_pending()
    }

    pub fn is_settled(&self) -> bool {
        !self.is_pending()
    }

    /// `true` when both handles share the same underlying state.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl<T, E> Future<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// A snapshot of the current outcome.
    pub fn outcome(&self) -> Outcome<T, E> {
        self.lock().outcome.clone()
    }

    /// Perform the single Pending -> settled transition and deliver the
    /// result to every queued handler, in registration order.
    ///
    /// Delivery goes through the thread's trampoline: a settlement made from
    /// inside a handler is delivered once the handlers already queued have
    /// run, and a panicking handler does not keep the others from running.
    /// The first panic is resumed after delivery finishes.
    pub(crate) fn transition(&self, result: Result<T, E>) -> Result<(), Error> {
        let mut inner = self.lock();
        if inner.outcome.is_settled() {
            return Err(Error::AlreadySettled);
        }
        inner.outcome = Outcome::from(result.clone());
        let handlers = std::mem::take(&mut inner.handlers);
        drop(inner);

        trace!(
            success = result.is_ok(),
            handlers = handlers.len(),
            "future settled"
        );
        let result = Arc::new(result);
        delivery::run(handlers.into_iter().map(|handler| {
            let result = result.clone();
            Box::new(move || handler.call(&result)) as Job
        }));
        Ok(())
    }

    fn subscribe(&self, handler: Handler<T, E>) {
        let mut inner = self.lock();
        let settled = inner.outcome.to_result();
        match settled {
            None => {
                inner.handlers.push(handler);
                trace!(queued = inner.handlers.len(), "handler queued");
            }
            Some(result) => {
                drop(inner);
                trace!(success = result.is_ok(), "handler registered late");
                handler.call(&result);
            }
        }
    }

    /// Register a handler for the success value.
    ///
    /// Runs right away if the future already succeeded, otherwise on the
    /// thread that resolves it. Never runs if the future fails. Every
    /// registered handler runs; handlers fire in registration order.
    ///
    /// # Examples
    ///
    /// ```
    /// use promise_future::Future;
    /// use std::sync::{Arc, Mutex};
    ///
    /// let seen = Arc::new(Mutex::new(None));
    /// let sink = seen.clone();
    /// Future::<_, ()>::resolved("🍓").on_success(move |value| {
    ///     *sink.lock().unwrap() = Some(value);
    /// });
    /// assert_eq!(*seen.lock().unwrap(), Some("🍓"));
    /// ```
    pub fn on_success<F>(&self, handler: F) -> &Self
    where
        F: FnOnce(T) + Send + 'static,
    {
        self.subscribe(Handler::Success(Box::new(handler)));
        self
    }

    /// Register a handler for the failure error. The mirror of
    /// [`on_success`](Self::on_success).
    pub fn on_failure<F>(&self, handler: F) -> &Self
    where
        F: FnOnce(E) + Send + 'static,
    {
        self.subscribe(Handler::Failure(Box::new(handler)));
        self
    }

    /// Register one handler that receives whichever branch settles.
    pub fn on_complete<F>(&self, handler: F) -> &Self
    where
        F: FnOnce(Result<T, E>) + Send + 'static,
    {
        self.subscribe(Handler::Complete(Box::new(handler)));
        self
    }

    /// Derive a future whose success value is `transform(value)`.
    ///
    /// A failure is forwarded unchanged and `transform` is never called.
    /// A panic inside `transform` unwinds on the settling thread and leaves
    /// the derived future pending; use [`try_map`](Self::try_map) for
    /// transforms that can fail.
    ///
    /// # Examples
    ///
    /// ```
    /// use promise_future::{Future, Outcome};
    ///
    /// let doubled = Future::<i32, String>::resolved(5).map(|x| x * 2);
    /// assert_eq!(doubled.outcome(), Outcome::Success(10));
    ///
    /// let failed = Future::<i32, String>::rejected("💥".into()).map(|x| x * 2);
    /// assert_eq!(failed.outcome(), Outcome::Failure("💥".to_string()));
    /// ```
    pub fn map<U, F>(&self, transform: F) -> Future<U, E>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        let derived = Promise::new();
        let producer = Link::new(derived.clone());
        self.on_complete(move |result| producer.settle(result.map(transform)));
        derived.future()
    }

    /// Like [`map`](Self::map), but an `Err` from `transform` rejects the
    /// derived future.
    pub fn try_map<U, F>(&self, transform: F) -> Future<U, E>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> Result<U, E> + Send + 'static,
    {
        let derived = Promise::new();
        let producer = Link::new(derived.clone());
        self.on_complete(move |result| producer.settle(result.and_then(transform)));
        derived.future()
    }

    /// Derive a future whose failure is `transform(error)`. Successes pass
    /// through unchanged.
    pub fn map_err<E2, F>(&self, transform: F) -> Future<T, E2>
    where
        E2: Clone + Send + 'static,
        F: FnOnce(E) -> E2 + Send + 'static,
    {
        let derived = Promise::new();
        let producer = Link::new(derived.clone());
        self.on_complete(move |result| producer.settle(result.map_err(transform)));
        derived.future()
    }

    /// Chain a dependent asynchronous step off the success value.
    ///
    /// On success, `transform` builds the next future and its outcome is
    /// forwarded verbatim. On failure the error is forwarded and `transform`
    /// is never called.
    ///
    /// # Examples
    ///
    /// ```
    /// use promise_future::{Future, Outcome, Promise};
    ///
    /// let inner = Promise::<String, ()>::new();
    /// let step = inner.future();
    /// let chained = Future::<String, ()>::resolved("a".into())
    ///     .flat_map(move |first| step.map(move |second| first + &second));
    ///
    /// assert!(chained.is_pending());
    /// inner.resolve("a".into());
    /// assert_eq!(chained.outcome(), Outcome::Success("aa".to_string()));
    /// ```
    pub fn flat_map<U, F>(&self, transform: F) -> Future<U, E>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> Future<U, E> + Send + 'static,
    {
        let derived = Promise::new();
        let producer = Link::new(derived.clone());
        self.on_complete(move |result| match result {
            Ok(value) => {
                transform(value).on_complete(move |next| producer.settle(next));
            }
            Err(error) => producer.reject(error),
        });
        derived.future()
    }

    /// Derive a future that is settled from a task run by `scheduler`
    /// instead of on the thread that settles `self`.
    pub fn dispatch_on<S>(&self, scheduler: S) -> Future<T, E>
    where
        S: Scheduler + 'static,
    {
        let derived = Promise::new();
        let producer = Link::new(derived.clone());
        self.on_complete(move |result| {
            scheduler.schedule(Box::new(move || producer.settle(result)));
        });
        derived.future()
    }

    /// Adapt this future into a `std::future::Future` of its result.
    pub fn wait(&self) -> Waiter<T, E> {
        Waiter::new(self.clone())
    }
}

impl<T, E> std::future::IntoFuture for Future<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    type Output = Result<T, E>;
    type IntoFuture = Waiter<T, E>;

    fn into_future(self) -> Self::IntoFuture {
        Waiter::new(self)
    }
}
