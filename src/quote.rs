//! Quote source abstraction and failure taxonomy

use async_trait::async_trait;
use thiserror::Error;

/// Why a quote could not be obtained from the upstream source.
///
/// A rate limit is an expected, recoverable condition; callers log it at
/// informational level instead of treating it as a failure.
#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("upstream rate limited the request")]
    RateLimited,
    #[error("upstream returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed quote payload: {0}")]
    Malformed(String),
}

impl QuoteError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, QuoteError::RateLimited)
    }
}

#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Latest regular-market price for `symbol`, in currency units per troy ounce.
    async fn latest_price(&self, symbol: &str) -> Result<f64, QuoteError>;
}
