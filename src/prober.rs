use std::{sync::Arc, time::Duration};

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::storage::Storage;

/// Periodically pings the store and logs the outcome. Failures are only
/// logged; reconnecting is left to the store client.
pub struct LivenessProber {
    storage: Arc<dyn Storage + Send + Sync>,
    interval: Duration,
}

impl LivenessProber {
    pub fn new(storage: Arc<dyn Storage + Send + Sync>, interval: Duration) -> Self {
        Self { storage, interval }
    }

    /// Runs until `shutdown` is cancelled. The first probe fires one full
    /// interval after start.
    pub async fn run(self, shutdown: CancellationToken) {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    log::info!("🛑 Liveness prober stopped");
                    return;
                }
                _ = ticker.tick() => self.probe().await,
            }
        }
    }

    async fn probe(&self) {
        let storage = self.storage.clone();
        match tokio::task::spawn_blocking(move || storage.ping()).await {
            Ok(Ok(())) => log::info!("Health check successful"),
            Ok(Err(e)) => log::warn!("Health check failed: {:#}", e),
            Err(e) => log::error!("Health check task panicked: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStorage;

    fn spawn_prober(
        storage: MemoryStorage,
        interval: Duration,
    ) -> (tokio::task::JoinHandle<()>, CancellationToken) {
        let token = CancellationToken::new();
        let prober = LivenessProber::new(Arc::new(storage), interval);
        let handle = tokio::spawn(prober.run(token.clone()));
        (handle, token)
    }

    #[tokio::test]
    async fn prober_pings_storage_on_every_tick() {
        let storage = MemoryStorage::default();
        let (handle, token) = spawn_prober(storage.clone(), Duration::from_millis(10));

        tokio::time::sleep(Duration::from_millis(100)).await;
        token.cancel();
        handle.await.unwrap();

        assert!(storage.ping_count() >= 2, "pings: {}", storage.ping_count());
    }

    #[tokio::test]
    async fn prober_keeps_running_when_ping_fails() {
        let storage = MemoryStorage::default().failing();
        let (handle, token) = spawn_prober(storage.clone(), Duration::from_millis(10));

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(!handle.is_finished());
        assert!(storage.ping_count() >= 2);

        storage.set_failing(false);
        token.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn prober_stops_promptly_before_first_tick() {
        let storage = MemoryStorage::default();
        let (handle, token) = spawn_prober(storage.clone(), Duration::from_secs(3600));

        token.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("prober should stop when cancelled")
            .unwrap();

        assert_eq!(storage.ping_count(), 0);
    }
}
