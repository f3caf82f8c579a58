//! Per-thread trampoline for handler delivery and chain teardown.
//!
//! Settling one stage of a `map`/`flat_map` chain settles the next from
//! inside a handler, and dropping one stage drops the producer of the next.
//! Both would nest one stack frame per stage. Instead, work produced while
//! the trampoline is already running on this thread is queued and run by
//! the outermost call, so chain depth never turns into stack depth.
use std::{
    cell::RefCell,
    collections::VecDeque,
    ops::Deref,
    panic::{self, AssertUnwindSafe},
};

pub(crate) type Job = Box<dyn FnOnce()>;

#[derive(Default)]
struct Trampoline {
    running: bool,
    jobs: VecDeque<Job>,
}

thread_local! {
    static TRAMPOLINE: RefCell<Trampoline> = RefCell::new(Trampoline::default());
}

/// Run `jobs` in order on this thread.
///
/// If the trampoline is already running further up the stack, the jobs are
/// queued behind the ones already waiting and this returns immediately.
/// Otherwise they are run here, together with everything they queue.
///
/// A panicking job does not stop the rest: the first panic is resumed once
/// the queue is empty.
pub(crate) fn run<I>(jobs: I)
where
    I: IntoIterator<Item = Job>,
{
    let mut pending = Some(jobs);
    let claimed = TRAMPOLINE.try_with(|trampoline| {
        let mut trampoline = trampoline.borrow_mut();
        trampoline.jobs.extend(pending.take().into_iter().flatten());
        !std::mem::replace(&mut trampoline.running, true)
    });
    match claimed {
        Ok(true) => drive(),
        Ok(false) => {}
        // The thread is tearing down its locals; nothing left to nest under.
        Err(_) => pending.into_iter().flatten().for_each(|job| job()),
    }
}

fn drive() {
    let mut panicked = None;
    while let Some(job) = next_job() {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
            panicked.get_or_insert(payload);
        }
    }
    if let Some(payload) = panicked {
        panic::resume_unwind(payload)
    }
}

// Releases the trampoline in the same borrow that finds the queue empty.
fn next_job() -> Option<Job> {
    TRAMPOLINE
        .try_with(|trampoline| {
            let mut trampoline = trampoline.borrow_mut();
            let job = trampoline.jobs.pop_front();
            if job.is_none() {
                trampoline.running = false;
            }
            job
        })
        .ok()
        .flatten()
}

/// A producer captured by a combinator handler. Dropping it hands the
/// producer to the trampoline, so tearing down a long unsettled chain
/// releases one stage per job instead of recursing.
pub(crate) struct Link<P: 'static>(Option<P>);

impl<P: 'static> Link<P> {
    pub(crate) fn new(producer: P) -> Self {
        Self(Some(producer))
    }
}

impl<P: 'static> Deref for Link<P> {
    type Target = P;

    fn deref(&self) -> &P {
        self.0.as_ref().expect("a link is only emptied by drop")
    }
}

impl<P: 'static> Drop for Link<P> {
    fn drop(&mut self) {
        if let Some(producer) = self.0.take() {
            run([Box::new(move || drop(producer)) as Job]);
        }
    }
}
