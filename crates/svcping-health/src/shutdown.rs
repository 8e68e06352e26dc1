//! Process-wide shutdown signal.

use tokio::sync::watch;

/// Cooperative cancellation handle observed by every suspension point.
///
/// Wraps the receiving side of a `watch::channel(false)`. Sending `true`
/// (or dropping the sender) triggers every clone at once.
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    /// Create a new untriggered signal and the sender that fires it.
    pub fn channel() -> (watch::Sender<bool>, Shutdown) {
        let (tx, rx) = watch::channel(false);
        (tx, Shutdown { rx })
    }

    /// Whether shutdown has already been requested.
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }

    /// Resolve once shutdown is requested.
    pub async fn triggered(&self) {
        let mut rx = self.rx.clone();
        // A closed channel means the sender is gone; treat it as shutdown.
        let _ = rx.wait_for(|stop| *stop).await;
    }
}
