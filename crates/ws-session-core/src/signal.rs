//! One-shot lifecycle and cancellation signals.

use std::sync::Arc;

use tokio::sync::watch;

/// Set-once, level-triggered signal.
///
/// Safe to observe from any number of concurrent waiters; once raised it is
/// never un-raised. Used for the started/ended session signals and for
/// cooperative cancellation.
#[derive(Debug, Clone)]
pub struct Signal {
    tx: Arc<watch::Sender<bool>>,
}

impl Signal {
    /// Create an unraised signal.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Raise the signal. Idempotent.
    pub fn raise(&self) {
        self.tx.send_replace(true);
    }

    /// Whether the signal has been raised.
    #[must_use]
    pub fn is_raised(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait until the signal is raised. Returns immediately if it already
    /// has been.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in self, so wait_for cannot fail.
        let _ = rx.wait_for(|raised| *raised).await;
    }
}

impl Default for Signal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unraised() {
        let signal = Signal::new();
        assert!(!signal.is_raised());
    }

    #[test]
    fn raise_is_idempotent() {
        let signal = Signal::new();
        signal.raise();
        signal.raise();
        assert!(signal.is_raised());
    }

    #[tokio::test]
    async fn wait_returns_immediately_when_already_raised() {
        let signal = Signal::new();
        signal.raise();
        signal.wait().await;
    }

    #[tokio::test]
    async fn multiple_waiters_observe_one_raise() {
        let signal = Signal::new();

        let mut tasks = Vec::new();
        for _ in 0..4 {
            let observer = signal.clone();
            tasks.push(tokio::spawn(async move {
                observer.wait().await;
            }));
        }

        signal.raise();
        for task in tasks {
            task.await.unwrap();
        }
    }

    #[tokio::test]
    async fn clones_share_state() {
        let signal = Signal::new();
        let clone = signal.clone();
        clone.raise();
        assert!(signal.is_raised());
        signal.wait().await;
    }
}
