use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::features::files::services::Registry;

/// Background worker removing expired files on a fixed interval
pub struct ExpirySweeper {
    registry: Arc<Registry>,
    interval: Duration,
}

impl ExpirySweeper {
    pub fn new(registry: Arc<Registry>, interval: Duration) -> Self {
        Self { registry, interval }
    }

    /// Spawn the sweeper; it stops once `true` is sent on `shutdown`
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(shutdown).await })
    }

    /// Run the sweeper loop until shutdown is signalled
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            "Starting expiry sweeper (interval: {}s)",
            self.interval.as_secs()
        );

        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.sweep_once().await,
                changed = shutdown.changed() => {
                    // A dropped sender also means shutdown
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Expiry sweeper stopped");
    }

    async fn sweep_once(&self) {
        match self.registry.sweep_expired(Utc::now()).await {
            Ok(0) => tracing::debug!("Expiry sweep found nothing to remove"),
            Ok(removed) => tracing::debug!("Expiry sweep removed {} file(s)", removed),
            Err(e) => tracing::error!("Error during expiry sweep: {:?}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::files::models::FileRecord;
    use crate::shared::test_helpers::TestContext;
    use bytes::Bytes;
    use chrono::Duration as ChronoDuration;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_sweeper_removes_expired_and_stops_on_shutdown() {
        let ctx = TestContext::new().await;

        let expired = FileRecord::new(
            Uuid::new_v4(),
            "old.txt".into(),
            "FV-0000000E".into(),
            1,
            Utc::now() - ChronoDuration::days(8),
        );
        ctx.blobs
            .put(&expired.storage_key, Bytes::from_static(b"x"))
            .await
            .unwrap();
        assert!(ctx.registry.put(expired.clone()).await.unwrap());

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = ExpirySweeper::new(Arc::clone(&ctx.registry), Duration::from_millis(20))
            .spawn(shutdown_rx);

        let mut removed = false;
        for _ in 0..50 {
            let gone = !ctx.registry.contains(&expired.code).await.unwrap()
                && !ctx.blobs.exists(&expired.storage_key).await.unwrap();
            if gone {
                removed = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(removed, "sweeper did not remove the expired record");

        shutdown_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("sweeper did not stop")
            .unwrap();
    }
}
