//! Cancellation of in-flight claims.
//!
//! A [`CancelHandle`] is held by the enclosing workflow; the engine watches
//! the matching [`CancelSignal`] before every attempt and during every
//! backoff wait.

use tokio::sync::watch;

/// Create a linked handle and signal.
pub fn cancellation() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelSignal { rx })
}

/// Owner side: requests cancellation.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Cancel every claim watching this handle's signals.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Another signal linked to this handle.
    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            rx: self.tx.subscribe(),
        }
    }
}

/// Watcher side: observed by the engine.
///
/// Dropping the handle without cancelling leaves the signal permanently
/// un-cancelled.
#[derive(Clone, Debug)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        let (_, signal) = cancellation();
        signal
    }

    /// Check if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once cancellation is requested.
    ///
    /// Pends forever if the handle is dropped first.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
