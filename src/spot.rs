//! Spot price cache and fetch cycle
//!
//! Owns the last-known-good price per configured metal. The cache is seeded
//! with fallback prices at construction, so a configured metal always has a
//! price — before the first fetch, and through any upstream outage.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info};

use crate::config::MetalConfig;
use crate::quote::{QuoteError, QuoteSource};

/// Snapshot key the Goldback valuation reads.
pub const GOLD: &str = "gold";

// Pause between upstream requests within a cycle. This is a deliberate
// throttle to stay under the quote source's rate limit; do not parallelize
// the cycle without re-deriving that budget.
const PACING_DELAY: Duration = Duration::from_millis(500);

/// Terminal per-metal outcome of a fetch. Never an error: every failure mode
/// degrades to keeping the cached value.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Fresh price obtained from upstream, rounded to cents.
    Updated(f64),
    /// Upstream unavailable; the cached price stays in place.
    Retained(QuoteError),
}

/// Externally visible cache state: `{prices, last_updated}`.
#[derive(Debug, Clone, Serialize)]
pub struct PriceSnapshot {
    pub prices: BTreeMap<String, f64>,
    #[serde(serialize_with = "serialize_last_updated")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl PriceSnapshot {
    pub fn price(&self, metal: &str) -> Option<f64> {
        self.prices.get(metal).copied()
    }
}

fn serialize_last_updated<S>(
    timestamp: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match timestamp {
        Some(ts) => serializer.serialize_str(&ts.format("%Y-%m-%d %H:%M:%S").to_string()),
        None => serializer.serialize_none(),
    }
}

struct CacheState {
    prices: BTreeMap<String, f64>,
    last_updated: Option<DateTime<Utc>>,
}

pub struct SpotPriceCache {
    metals: Vec<MetalConfig>,
    source: Arc<dyn QuoteSource>,
    state: RwLock<CacheState>,
    // Serializes whole fetch cycles so the scheduler and a manual refresh
    // cannot interleave per-metal writes.
    cycle: Mutex<()>,
}

impl SpotPriceCache {
    pub fn new(metals: Vec<MetalConfig>, source: Arc<dyn QuoteSource>) -> Self {
        let prices = metals
            .iter()
            .map(|m| (m.name.clone(), m.fallback_price))
            .collect();
        SpotPriceCache {
            metals,
            source,
            state: RwLock::new(CacheState {
                prices,
                last_updated: None,
            }),
            cycle: Mutex::new(()),
        }
    }

    /// Cached price for `metal`. `None` only for an unconfigured metal; a
    /// configured one always has at least its fallback.
    pub async fn price_of(&self, metal: &str) -> Option<f64> {
        self.state.read().await.prices.get(metal).copied()
    }

    pub async fn snapshot(&self) -> PriceSnapshot {
        let state = self.state.read().await;
        PriceSnapshot {
            prices: state.prices.clone(),
            last_updated: state.last_updated,
        }
    }

    /// One bounded-time quote request. Does not touch the cache; `fetch_all`
    /// folds the outcome into state.
    pub async fn fetch_one(&self, metal: &MetalConfig) -> FetchOutcome {
        match self.source.latest_price(&metal.symbol).await {
            Ok(price) => FetchOutcome::Updated((price * 100.0).round() / 100.0),
            Err(QuoteError::RateLimited) => {
                info!("{}: rate limited, using cached price", metal.name);
                FetchOutcome::Retained(QuoteError::RateLimited)
            }
            Err(err) => {
                error!("{}: quote fetch failed ({}), using cached price", metal.name, err);
                FetchOutcome::Retained(err)
            }
        }
    }

    /// One full sequential pass over the configured metals. Stamps
    /// `last_updated` even when some (or all) metals were retained: freshness
    /// records that a cycle ran, not that every price is new.
    pub async fn fetch_all(&self) -> PriceSnapshot {
        let _cycle = self.cycle.lock().await;
        info!("Fetching spot prices");

        for (i, metal) in self.metals.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(PACING_DELAY).await;
            }
            match self.fetch_one(metal).await {
                FetchOutcome::Updated(price) => {
                    let mut state = self.state.write().await;
                    state.prices.insert(metal.name.clone(), price);
                    info!("{}: {:.2}", metal.name, price);
                }
                FetchOutcome::Retained(_) => {
                    let state = self.state.read().await;
                    if let Some(price) = state.prices.get(&metal.name) {
                        info!("{}: {:.2} (cached)", metal.name, price);
                    }
                }
            }
        }

        let mut state = self.state.write().await;
        state.last_updated = Some(Utc::now());
        PriceSnapshot {
            prices: state.prices.clone(),
            last_updated: state.last_updated,
        }
    }
}
