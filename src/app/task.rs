//! Cancelable operation handles and serialized result delivery
//!
//! This module provides the [`Disposable`] handle representing one in-flight
//! asynchronous operation, and the [`Dispatcher`], a single-consumer delivery
//! queue standing in for the platform main thread. Every result that reaches
//! a rendered cell travels through one dispatcher, so two results can never
//! be observed out of order relative to their origination order.
//!
//! Cancellation is cooperative: disposing a handle sets a shared flag
//! synchronously and aborts the backing task. Delivery jobs check the flag at
//! execution time, which gives the at-most-once guarantee: no callback fires
//! after disposal, even for a result that was already queued.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, oneshot};
use tracing::trace;

/// Shared cancellation flag checked by delivery jobs
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Create a new, unset flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag. Irreversible.
    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Check whether the flag has been set
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A cancelable handle to one outstanding asynchronous operation
///
/// Disposing sets the cancellation flag and runs the teardown exactly once
/// (aborting a task, removing a subscriber). A handle is owned by exactly one
/// [`DisposableRegistry`](crate::app::lifecycle::DisposableRegistry) at a
/// time; dropping a handle without disposing it leaves the operation running.
pub struct Disposable {
    flag: CancelFlag,
    teardown: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl Disposable {
    /// Create a handle with a fresh flag and the given teardown
    pub fn new(teardown: impl FnOnce() + Send + 'static) -> Self {
        Self::with_flag(CancelFlag::new(), teardown)
    }

    /// Create a handle around an existing cancellation flag
    pub fn with_flag(flag: CancelFlag, teardown: impl FnOnce() + Send + 'static) -> Self {
        Self {
            flag,
            teardown: Mutex::new(Some(Box::new(teardown))),
        }
    }

    /// Create a handle with no teardown, useful as a placeholder
    pub fn empty() -> Self {
        Self::with_flag(CancelFlag::new(), || {})
    }

    /// Cancel the operation. Idempotent; the flag is set before the teardown
    /// runs so a competing delivery that begins afterwards is suppressed.
    pub fn dispose(&self) {
        self.flag.set();
        let teardown = self
            .teardown
            .lock()
            .expect("disposable teardown lock poisoned")
            .take();
        if let Some(teardown) = teardown {
            trace!("disposing operation handle");
            teardown();
        }
    }

    /// Check whether the handle has been disposed
    pub fn is_disposed(&self) -> bool {
        self.flag.is_set()
    }

    /// Get a clone of the cancellation flag for guarded delivery
    pub fn cancel_flag(&self) -> CancelFlag {
        self.flag.clone()
    }
}

impl fmt::Debug for Disposable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disposable")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

type Job = Box<dyn FnOnce() + Send>;

/// Handle for posting jobs onto the single-consumer delivery queue
#[derive(Clone)]
pub struct Dispatcher {
    tx: mpsc::UnboundedSender<Job>,
}

/// Consumer half of the delivery queue. Run it on one task only.
pub struct DispatchLoop {
    rx: mpsc::UnboundedReceiver<Job>,
}

impl Dispatcher {
    /// Create a dispatcher and its consumer loop
    pub fn new() -> (Self, DispatchLoop) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, DispatchLoop { rx })
    }

    /// Create a dispatcher and spawn its consumer loop on the runtime
    pub fn spawn() -> Self {
        let (dispatcher, dispatch_loop) = Self::new();
        tokio::spawn(dispatch_loop.run());
        dispatcher
    }

    /// Queue a job for serialized execution. Jobs run in post order.
    pub fn post(&self, job: impl FnOnce() + Send + 'static) {
        // Send fails only when the consumer is gone, i.e. during shutdown.
        let _ = self.tx.send(Box::new(job));
    }

    /// Queue a job that is skipped if the flag is set by the time it runs
    pub fn post_guarded(&self, flag: &CancelFlag, job: impl FnOnce() + Send + 'static) {
        let flag = flag.clone();
        self.post(move || {
            if !flag.is_set() {
                job();
            }
        });
    }

    /// Wait until every job queued before this call has executed
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        self.post(move || {
            let _ = tx.send(());
        });
        let _ = rx.await;
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}

impl DispatchLoop {
    /// Drain the queue until every dispatcher handle is dropped
    pub async fn run(mut self) {
        while let Some(job) = self.rx.recv().await {
            job();
        }
    }
}

/// Run a future on the worker pool and deliver its output through the
/// dispatcher under a cancel guard.
///
/// The returned handle aborts the task and suppresses delivery when disposed.
/// If the handle is disposed after the output was queued but before it ran,
/// the delivery job sees the flag and is dropped.
pub fn spawn_op<T, Fut, F>(dispatcher: &Dispatcher, fut: Fut, deliver: F) -> Disposable
where
    T: Send + 'static,
    Fut: Future<Output = T> + Send + 'static,
    F: FnOnce(T) + Send + 'static,
{
    let flag = CancelFlag::new();
    let guard = flag.clone();
    let dispatcher = dispatcher.clone();

    let handle = tokio::spawn(async move {
        let output = fut.await;
        dispatcher.post_guarded(&guard, move || deliver(output));
    });

    Disposable::with_flag(flag, move || handle.abort())
}
