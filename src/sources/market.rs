//! Market-data quote adapter
//!
//! Fetches the UUP last price (dollar-index proxy) and the last trading
//! volume of SPY and QQQ, summed into one aggregated US-volume indicator.
//! The quote payload is a flat JSON object whose key casing drifts between
//! provider versions, so field lookup tries an ordered list of candidate
//! spellings instead of one exact key.

use chrono::Utc;
use reqwest::Client;
use serde_json::{Map, Value};

use super::REQUEST_TIMEOUT;
use crate::error::{FetchError, FetchResult};
use crate::types::{Indicator, MarketIndices};

/// Dollar-index proxy instrument
const PRICE_SYMBOL: &str = "UUP";
/// Instruments whose volumes are aggregated
const VOLUME_SYMBOLS: [&str; 2] = ["SPY", "QQQ"];

pub struct MarketDataClient {
    client: Client,
    base_url: String,
}

impl MarketDataClient {
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch UUP price and SPY+QQQ aggregated volume.
    ///
    /// All three lookups must yield a value; any missing field fails the
    /// whole operation. Both indicators share one fetch timestamp.
    pub async fn market_indices(&self) -> FetchResult<MarketIndices> {
        let uup = self.fast_quote(PRICE_SYMBOL).await?;
        let spy = self.fast_quote(VOLUME_SYMBOLS[0]).await?;
        let qqq = self.fast_quote(VOLUME_SYMBOLS[1]).await?;

        let price = quote_field(&uup, "last_price")
            .ok_or_else(|| FetchError::Upstream("UUP quote is missing last_price".to_string()))?;
        let vol_spy = quote_field(&spy, "last_volume")
            .ok_or_else(|| FetchError::Upstream("SPY quote is missing last_volume".to_string()))?;
        let vol_qqq = quote_field(&qqq, "last_volume")
            .ok_or_else(|| FetchError::Upstream("QQQ quote is missing last_volume".to_string()))?;

        let now = Utc::now();
        Ok(MarketIndices {
            dxy_proxy_uup: Indicator {
                symbol: PRICE_SYMBOL.to_string(),
                value: price,
                unit: "USD".to_string(),
                last_updated_utc: now,
            },
            volume_aggregated: Indicator {
                symbol: "US_VOLUME".to_string(),
                value: vol_spy + vol_qqq,
                unit: "shares".to_string(),
                last_updated_utc: now,
            },
        })
    }

    /// Fetch the flat quote object for one symbol.
    async fn fast_quote(&self, symbol: &str) -> FetchResult<Map<String, Value>> {
        let url = format!("{}/v7/finance/quote/{}", self.base_url, symbol);

        tracing::debug!(symbol = %symbol, "Fetching quote");

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Upstream(format!(
                "quote provider returned {} for {}",
                response.status(),
                symbol
            )));
        }

        let quote: Map<String, Value> = response.json().await.map_err(|e| {
            FetchError::Parse(format!("quote payload for {} is not an object: {}", symbol, e))
        })?;

        Ok(quote)
    }
}

/// Look up a numeric quote field, tolerating provider casing drift.
///
/// Candidate spellings are tried in order: the exact key, the key with the
/// first letter capitalized, and the compact capitalized form with
/// underscores removed ("last_price", "Last_price", "Lastprice").
fn quote_field(quote: &Map<String, Value>, key_base: &str) -> Option<f64> {
    for key in candidate_keys(key_base) {
        if let Some(value) = quote.get(&key) {
            if let Some(number) = numeric(value) {
                return Some(number);
            }
        }
    }
    None
}

fn candidate_keys(key_base: &str) -> [String; 3] {
    [
        key_base.to_string(),
        capitalize(key_base),
        capitalize(&key_base.replace('_', "")),
    ]
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Providers send numbers both bare and quoted.
fn numeric(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}
