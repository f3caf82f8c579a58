use std::{
    sync::{
        mpsc::{channel, Receiver, RecvTimeoutError, Sender},
        Once,
    },
    time::Duration,
};

static INIT_LOGGING: Once = Once::new();

pub const EXPECTATION_TIMEOUT: Duration = Duration::from_secs(5);
pub const INVERTED_TIMEOUT: Duration = Duration::from_millis(100);

/// Route `tracing` output through the test writer. Safe to call repeatedly.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .with_thread_ids(true)
            .with_ansi(false)
            .try_init();
    });
}

/// Something a handler fulfils, awaited by the test thread.
pub struct Expectation<T> {
    description: &'static str,
    tx: Sender<T>,
    rx: Receiver<T>,
}

impl<T: Send + 'static> Expectation<T> {
    pub fn new(description: &'static str) -> Self {
        let (tx, rx) = channel();
        Self { description, tx, rx }
    }

    pub fn fulfiller(&self) -> impl FnOnce(T) + Send + 'static {
        let tx = self.tx.clone();
        move |value| {
            let _ = tx.send(value);
        }
    }

    /// Block until fulfilled, failing the test on timeout.
    pub fn wait(&self) -> T {
        match self.rx.recv_timeout(EXPECTATION_TIMEOUT) {
            Ok(value) => value,
            Err(err) => panic!("expectation `{}` not fulfilled: {err:?}", self.description),
        }
    }

    /// Fail the test if this is ever fulfilled.
    pub fn wait_inverted(&self) {
        match self.rx.recv_timeout(INVERTED_TIMEOUT) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(_) => panic!("inverted expectation `{}` was fulfilled", self.description),
            Err(RecvTimeoutError::Disconnected) => unreachable!("expectation keeps a sender"),
        }
    }
}
