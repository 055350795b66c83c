//! Readiness signal fired by a surface renderer once layout has settled.

use std::time::Duration;
use tokio::sync::watch;

/// Receiving side of a readiness signal. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ReadySignal {
    rx: watch::Receiver<bool>,
}

/// Sending side held by the renderer.
#[derive(Debug)]
pub struct ReadyHandle {
    tx: watch::Sender<bool>,
}

impl ReadySignal {
    /// A signal that is already fired.
    pub fn settled() -> Self {
        let (_tx, rx) = watch::channel(true);
        Self { rx }
    }

    /// A pending signal and the handle that fires it.
    pub fn pair() -> (ReadyHandle, ReadySignal) {
        let (tx, rx) = watch::channel(false);
        (ReadyHandle { tx }, ReadySignal { rx })
    }

    /// Whether the signal has fired.
    pub fn is_ready(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait for the signal, at most `timeout`.
    ///
    /// Returns `false` on timeout, or when the handle was dropped without
    /// ever firing.
    pub async fn wait(&self, timeout: Duration) -> bool {
        let mut rx = self.rx.clone();
        // The borrow held by `wait_for` must end before `rx` is read again.
        let outcome = tokio::time::timeout(timeout, rx.wait_for(|ready| *ready))
            .await
            .map(|fired| fired.is_ok());
        match outcome {
            Ok(true) => true,
            Ok(false) => *rx.borrow(),
            Err(_) => false,
        }
    }
}

impl Default for ReadySignal {
    fn default() -> Self {
        Self::settled()
    }
}

impl ReadyHandle {
    /// Fire the signal. Idempotent.
    pub fn mark_ready(&self) {
        self.tx.send_replace(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_settled_signal_returns_immediately() {
        let signal = ReadySignal::settled();
        assert!(signal.is_ready());
        assert!(signal.wait(Duration::from_millis(1)).await);
    }

    #[tokio::test]
    async fn test_pending_signal_times_out() {
        let (_handle, signal) = ReadySignal::pair();
        assert!(!signal.wait(Duration::from_millis(10)).await);
    }

    #[tokio::test]
    async fn test_signal_fired_from_another_task() {
        let (handle, signal) = ReadySignal::pair();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            handle.mark_ready();
        });
        assert!(signal.wait(Duration::from_secs(5)).await);
        assert!(signal.is_ready());
    }

    #[tokio::test]
    async fn test_dropped_handle_is_not_ready() {
        let (handle, signal) = ReadySignal::pair();
        drop(handle);
        assert!(!signal.wait(Duration::from_secs(5)).await);
    }

    #[tokio::test]
    async fn test_handle_fired_then_dropped_is_ready() {
        let (handle, signal) = ReadySignal::pair();
        handle.mark_ready();
        drop(handle);
        assert!(signal.wait(Duration::from_millis(50)).await);
    }

    #[tokio::test]
    async fn test_wait_can_be_repeated_on_clones() {
        let (handle, signal) = ReadySignal::pair();
        let copy = signal.clone();
        assert!(!copy.wait(Duration::from_millis(5)).await);
        handle.mark_ready();
        assert!(signal.wait(Duration::from_millis(50)).await);
        assert!(copy.wait(Duration::from_millis(50)).await);
    }
}
