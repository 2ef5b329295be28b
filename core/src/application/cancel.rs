//! Cooperative cancellation for groups of mapping loops.

use tokio::sync::watch;

/// Owner side of a cancellation scope.
///
/// Dropping the source also counts as cancellation for every signal.
#[derive(Debug)]
pub struct CancelSource {
    tx: watch::Sender<bool>,
}

/// Observer side of a cancellation scope, cloned into each task.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSource {
    /// Creates a scope that is not cancelled yet.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Returns a signal observing this scope.
    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Cancels the scope. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Returns true once [`CancelSource::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for CancelSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelSignal {
    /// Returns true if the scope has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }

    /// Completes once the scope is cancelled. Cancel-safe.
    pub async fn cancelled(&mut self) {
        // An error means the source is gone, which is cancellation too.
        let _ = self.rx.wait_for(|cancelled| *cancelled).await;
    }
}
