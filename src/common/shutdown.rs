//! Shutdown latch for background loops.
//!
//! Every long-lived task (gateway connect loop, snapshot-push observer) selects
//! on `wait()` so a single `shutdown()` call tears the whole set down.

use tokio::sync::watch;

/// One-shot, multi-observer shutdown signal.
pub struct Shutdown {
    state: watch::Sender<bool>,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdown {
    /// create a new shutdown latch
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self {
            state: tx,
        }
    }

    /// trip the latch; all current and future `wait()` calls resolve
    pub fn shutdown(&self) {
        self.state.send_replace(true);
    }

    /// whether the latch has been tripped
    pub fn is_terminated(&self) -> bool {
        *self.state.borrow()
    }

    /// resolve once the latch is tripped
    pub async fn wait(&self) {
        let mut rx = self.state.subscribe();
        while !*rx.borrow() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_shutdown_wakes_waiters() {
        let shutdown = std::sync::Arc::new(Shutdown::new());
        assert!(!shutdown.is_terminated());

        let waiter = shutdown.clone();
        tokio_test::block_on(async {
            let handle = tokio::spawn(async move { waiter.wait().await });
            shutdown.shutdown();
            handle.await.unwrap();
        });
        assert!(shutdown.is_terminated());
    }
}
