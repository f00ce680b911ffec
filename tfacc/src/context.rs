//! Context implementation for request-scoped deadlines and cancellation
//!
//! The scenario runner derives a Context per provider call; blocks that carry
//! a `timeouts.create` duration get a Context whose deadline enforces it.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time;

/// Context carries a deadline and a cancellation signal across async
/// boundaries. Pass this as first parameter to all provider trait methods.
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    deadline: Option<Instant>,
    done: watch::Receiver<bool>,
    _done_tx: watch::Sender<bool>,
}

impl Context {
    pub fn new() -> Self {
        let (done_tx, done_rx) = watch::channel(false);

        Self {
            inner: Arc::new(ContextInner {
                deadline: None,
                done: done_rx,
                _done_tx: done_tx,
            }),
        }
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;

        let (done_tx, done_rx) = watch::channel(false);

        let done_tx_clone = done_tx.clone();
        tokio::spawn(async move {
            time::sleep_until(deadline.into()).await;
            let _ = done_tx_clone.send(true);
        });

        Self {
            inner: Arc::new(ContextInner {
                deadline: Some(deadline),
                done: done_rx,
                _done_tx: done_tx,
            }),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.done.borrow()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Returns a channel that's closed when work done on behalf of this
    /// context should be cancelled
    pub fn done(&self) -> watch::Receiver<bool> {
        self.inner.done.clone()
    }

    pub fn cancel(&self) {
        let _ = self.inner._done_tx.send(true);
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
