//! Scheduled background price refresh
//!
//! Runs one fetch cycle up front, then re-runs on a fixed interval until shut
//! down. Manual out-of-band `fetch_all` calls race safely with the scheduled
//! ones through the cache's cycle lock.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::spot::{PriceSnapshot, SpotPriceCache};

pub struct Refresher {
    stop: watch::Sender<bool>,
    snapshots: watch::Receiver<PriceSnapshot>,
    task: JoinHandle<()>,
}

impl Refresher {
    pub fn spawn(cache: Arc<SpotPriceCache>, every: Duration) -> Self {
        let (stop, mut stopped) = watch::channel(false);
        let (snapshot_tx, snapshots) = watch::channel(PriceSnapshot {
            prices: BTreeMap::new(),
            last_updated: None,
        });

        let task = tokio::spawn(async move {
            let snapshot = cache.fetch_all().await;
            let _ = snapshot_tx.send(snapshot);

            let mut ticker = tokio::time::interval(every);
            // The first tick completes immediately; the initial cycle above
            // already covered it.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        debug!("Scheduled price refresh");
                        let snapshot = cache.fetch_all().await;
                        let _ = snapshot_tx.send(snapshot);
                    }
                    _ = stopped.changed() => break,
                }
            }
        });

        Refresher {
            stop,
            snapshots,
            task,
        }
    }

    /// Receiver that observes the snapshot produced by each completed cycle.
    pub fn snapshots(&self) -> watch::Receiver<PriceSnapshot> {
        self.snapshots.clone()
    }

    /// Cancels the schedule and waits for the worker to exit.
    pub async fn shutdown(self) {
        let _ = self.stop.send(true);
        let _ = self.task.await;
        info!("Price refresher stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MetalConfig;
    use crate::quote::{QuoteError, QuoteSource};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl QuoteSource for CountingSource {
        async fn latest_price(&self, _symbol: &str) -> Result<f64, QuoteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(2100.0)
        }
    }

    fn single_metal_cache(source: Arc<CountingSource>) -> Arc<SpotPriceCache> {
        Arc::new(SpotPriceCache::new(
            vec![MetalConfig {
                name: "gold".to_string(),
                symbol: "GC=F".to_string(),
                fallback_price: 2050.0,
            }],
            source as Arc<dyn QuoteSource>,
        ))
    }

    #[tokio::test]
    async fn test_initial_cycle_runs_before_interval() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
        });
        let cache = single_metal_cache(Arc::clone(&source));

        let refresher = Refresher::spawn(Arc::clone(&cache), Duration::from_secs(3600));
        let mut snapshots = refresher.snapshots();
        snapshots.changed().await.unwrap();

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        let snapshot = snapshots.borrow().clone();
        assert_eq!(snapshot.price("gold"), Some(2100.0));
        assert!(snapshot.last_updated.is_some());

        refresher.shutdown().await;
        // No further cycles after shutdown
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_interval_refreshes_repeat() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
        });
        let cache = single_metal_cache(Arc::clone(&source));

        let refresher = Refresher::spawn(cache, Duration::from_millis(40));
        let mut snapshots = refresher.snapshots();
        // Initial cycle plus at least two scheduled ones
        for _ in 0..3 {
            snapshots.changed().await.unwrap();
        }
        refresher.shutdown().await;

        assert!(source.calls.load(Ordering::SeqCst) >= 3);
    }
}
