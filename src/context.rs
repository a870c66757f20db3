//! Cancellation and deadline handling for API calls.
//!
//! Every request made through [`crate::Client`] takes a [`RequestContext`].
//! Clones share the same cancellation flag, so a handle kept by the caller
//! (or a Ctrl+C handler) can abort rate-gate waits, token refreshes and
//! in-flight network calls alike.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

/// Why a context stopped accepting work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Cancellation {
    /// [`RequestContext::cancel`] was called
    #[error("context cancelled")]
    Cancelled,

    /// The context deadline passed
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

#[derive(Debug, Default)]
struct Signal {
    is_cancelled: AtomicBool,
    notify: Notify,
}

/// Cancellation signal with an optional deadline.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    signal: Arc<Signal>,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// Create a context without a deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context that expires at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            signal: Arc::default(),
            deadline: Some(deadline),
        }
    }

    /// Create a context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// Deadline of this context, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Request cancellation. Wakes every waiter exactly once.
    pub fn cancel(&self) {
        if !self.signal.is_cancelled.swap(true, Ordering::SeqCst) {
            self.signal.notify.notify_waiters();
        }
    }

    /// Whether [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.signal.is_cancelled.load(Ordering::SeqCst)
    }

    /// Current cancellation state, `None` while the context is live.
    pub fn err(&self) -> Option<Cancellation> {
        if self.is_cancelled() {
            return Some(Cancellation::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(Cancellation::DeadlineExceeded),
            _ => None,
        }
    }

    /// Fail fast if the context is no longer live.
    pub fn check(&self) -> Result<(), Cancellation> {
        match self.err() {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }

    /// Resolve once the context is cancelled or its deadline passes.
    pub async fn done(&self) -> Cancellation {
        let notified = self.signal.notify.notified();
        tokio::pin!(notified);
        // Register before re-checking the flag so a concurrent cancel() is not lost.
        notified.as_mut().enable();

        if self.is_cancelled() {
            return Cancellation::Cancelled;
        }

        match self.deadline {
            Some(deadline) => tokio::select! {
                biased;
                _ = &mut notified => Cancellation::Cancelled,
                _ = tokio::time::sleep_until(deadline) => Cancellation::DeadlineExceeded,
            },
            None => {
                notified.await;
                Cancellation::Cancelled
            }
        }
    }

    /// Drive `fut` to completion unless the context ends first.
    ///
    /// Cancellation wins when both become ready in the same poll.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output, Cancellation>
    where
        F: Future,
    {
        self.check()?;

        tokio::select! {
            biased;
            reason = self.done() => Err(reason),
            output = fut => Ok(output),
        }
    }
}
