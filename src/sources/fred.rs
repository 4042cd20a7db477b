//! Rates-database adapter (federal funds rate, VIX close)
//!
//! Both series share one lookup: request a single observation sorted
//! descending by date and take the first. An API key is mandatory.

use reqwest::Client;
use serde::Deserialize;

use super::REQUEST_TIMEOUT;
use crate::error::{FetchError, FetchResult};
use crate::types::RateObservation;

/// Effective federal funds rate, daily
const FED_FUNDS_SERIES: &str = "DFF";
/// CBOE volatility index close, daily
const VIX_SERIES: &str = "VIXCLS";

const SOURCE: &str = "FRED";

#[derive(Debug, Deserialize)]
struct FredResponse {
    observations: Vec<FredObservation>,
}

#[derive(Debug, Deserialize)]
struct FredObservation {
    date: String,
    value: String,
}

pub struct FredClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl FredClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub async fn fed_rate(&self) -> FetchResult<RateObservation> {
        self.latest_observation(FED_FUNDS_SERIES).await
    }

    pub async fn vix(&self) -> FetchResult<RateObservation> {
        self.latest_observation(VIX_SERIES).await
    }

    /// Fetch the most recent observation of one series.
    async fn latest_observation(&self, series_id: &str) -> FetchResult<RateObservation> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(FetchError::Configuration("GOLDAPP_FRED_API_KEY"))?;

        let url = format!("{}/fred/series/observations", self.base_url);
        let query = [
            ("series_id", series_id),
            ("api_key", key),
            ("file_type", "json"),
            ("sort_order", "desc"),
            ("limit", "1"),
        ];

        tracing::debug!(series = %series_id, "Fetching FRED observation");

        let response = self.client.get(&url).query(&query).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Upstream(format!(
                "FRED returned {} for series {}",
                response.status(),
                series_id
            )));
        }

        let body = response.text().await?;
        let payload: FredResponse = serde_json::from_str(&body)?;

        let observation = payload.observations.first().ok_or_else(|| {
            FetchError::Parse(format!("FRED series {} has no observations", series_id))
        })?;

        let value: f64 = observation.value.parse().map_err(|_| {
            FetchError::Parse(format!(
                "FRED value {:?} is not numeric",
                observation.value
            ))
        })?;

        Ok(RateObservation {
            value,
            date: observation.date.clone(),
            source: SOURCE.to_string(),
        })
    }
}
