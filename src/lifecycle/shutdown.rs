//! Shutdown coordination.

use tokio::sync::broadcast;

/// Coordinator for graceful shutdown.
///
/// Servers subscribe and stop accepting once the signal fires.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve on Ctrl+C or when the coordinator fires, whichever comes first.
pub async fn wait_for_shutdown(mut rx: broadcast::Receiver<()>) {
    tokio::select! {
        res = tokio::signal::ctrl_c() => {
            if let Err(e) = res {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                // Fall back to the coordinator alone.
                let _ = rx.recv().await;
            }
        }
        _ = rx.recv() => {}
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_trigger_wakes_waiter() {
        let shutdown = Shutdown::new();
        let waiter = tokio::spawn(wait_for_shutdown(shutdown.subscribe()));
        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(2), waiter)
            .await
            .expect("waiter did not finish")
            .unwrap();
    }
}
