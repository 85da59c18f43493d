use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::quote::{QuoteError, QuoteSource};

// Per-request budget. A hung upstream must never block a fetch cycle for
// longer than this.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

const USER_AGENT: &str = "bullion/1.0";

// YahooChartSource implementation for QuoteSource
pub struct YahooChartSource {
    base_url: String,
}

impl YahooChartSource {
    pub fn new(base_url: &str) -> Self {
        YahooChartSource {
            base_url: base_url.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartItem>>,
}

#[derive(Debug, Deserialize)]
struct ChartItem {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(alias = "regularMarketPrice")]
    regular_market_price: f64,
}

#[async_trait]
impl QuoteSource for YahooChartSource {
    async fn latest_price(&self, symbol: &str) -> Result<f64, QuoteError> {
        let url = format!(
            "{}/v8/finance/chart/{}?interval=1d&range=1d",
            self.base_url, symbol
        );
        debug!("Requesting quote from {}", url);

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let response = client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(QuoteError::RateLimited);
        }
        if !response.status().is_success() {
            return Err(QuoteError::Status(response.status()));
        }

        let text = response.text().await?;
        let data: YahooChartResponse = serde_json::from_str(&text)
            .map_err(|e| QuoteError::Malformed(format!("{symbol}: {e}")))?;

        let item = data
            .chart
            .result
            .into_iter()
            .flatten()
            .next()
            .ok_or_else(|| QuoteError::Malformed(format!("no chart data for {symbol}")))?;

        Ok(item.meta.regular_market_price)
    }
}
