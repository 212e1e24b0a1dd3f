//! Shutdown sources for the server.
//!
//! Both OS termination signals and caller-owned cancellation produce the same
//! [`ShutdownSignal`]; the server does not care which one fired.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tokio::sync::watch;

use crate::lifecycle::signals;

/// Why shutdown began.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// An OS signal, by name.
    Signal(&'static str),
    /// A caller-held [`ShutdownTrigger`] fired or was dropped.
    Cancelled,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownReason::Signal(name) => write!(f, "signal {name}"),
            ShutdownReason::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// A one-shot "begin graceful shutdown" event. Consumed by value, so it is
/// observed at most once.
#[must_use = "a shutdown signal does nothing unless awaited"]
pub struct ShutdownSignal {
    inner: BoxFuture<'static, ShutdownReason>,
}

impl ShutdownSignal {
    /// Fire on SIGINT or SIGTERM.
    pub fn os() -> Self {
        Self::from_future(signals::terminate())
    }

    /// Fire when `future` completes.
    pub fn from_future<F>(future: F) -> Self
    where
        F: Future<Output = ShutdownReason> + Send + 'static,
    {
        Self {
            inner: future.boxed(),
        }
    }

    /// Never fire.
    pub fn never() -> Self {
        Self::from_future(std::future::pending())
    }
}

impl Future for ShutdownSignal {
    type Output = ShutdownReason;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

impl fmt::Debug for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShutdownSignal").finish_non_exhaustive()
    }
}

/// Caller-owned cancellation for the server.
///
/// Triggering is sticky: a signal created after `trigger` still fires.
#[derive(Debug, Clone)]
pub struct ShutdownTrigger {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownTrigger {
    /// Create a new trigger.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// A signal that fires once [`trigger`](Self::trigger) is called or every
    /// trigger handle is dropped.
    pub fn signal(&self) -> ShutdownSignal {
        let mut rx = self.tx.subscribe();
        ShutdownSignal::from_future(async move {
            let _ = rx.wait_for(|fired| *fired).await;
            ShutdownReason::Cancelled
        })
    }

    /// Fire every signal created from this trigger.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Get the number of signals still waiting.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ShutdownTrigger {
    fn default() -> Self {
        Self::new()
    }
}
