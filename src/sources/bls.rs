//! Labor-statistics adapter (CPI and NFP series)
//!
//! One time-series lookup per call, requesting only the most recent data
//! point. The registration key raises rate limits but the public endpoint
//! works without one, so it is appended only when configured.

use reqwest::Client;
use serde::Deserialize;

use super::REQUEST_TIMEOUT;
use crate::error::{FetchError, FetchResult};
use crate::types::MacroStat;

/// Consumer price index, all urban consumers
const CPI_SERIES: &str = "CUUR0000SA0";
/// Total non-farm payrolls, seasonally adjusted
const NFP_SERIES: &str = "CES0000000001";

const SOURCE: &str = "BLS";

#[derive(Debug, Deserialize)]
struct BlsResponse {
    #[serde(rename = "Results")]
    results: BlsResults,
}

#[derive(Debug, Deserialize)]
struct BlsResults {
    series: Vec<BlsSeries>,
}

#[derive(Debug, Deserialize)]
struct BlsSeries {
    data: Vec<BlsDataPoint>,
}

#[derive(Debug, Deserialize)]
struct BlsDataPoint {
    year: String,
    /// Month encoded as "M01".."M12"
    period: String,
    value: String,
}

pub struct BlsClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl BlsClient {
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

    pub async fn cpi(&self) -> FetchResult<MacroStat> {
        self.series(CPI_SERIES, "CPI", "index").await
    }

    pub async fn nfp(&self) -> FetchResult<MacroStat> {
        self.series(NFP_SERIES, "NFP", "k jobs").await
    }

    /// Fetch the most recent data point of one series.
    async fn series(&self, series_id: &str, name: &str, unit: &str) -> FetchResult<MacroStat> {
        let url = format!(
            "{}/publicAPI/v2/timeseries/data/{}",
            self.base_url, series_id
        );

        let mut query: Vec<(&str, &str)> = vec![("latest", "true")];
        if let Some(key) = self.api_key.as_deref() {
            query.push(("registrationKey", key));
        }

        tracing::debug!(series = %series_id, "Fetching BLS series");

        let response = self.client.get(&url).query(&query).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Upstream(format!(
                "BLS returned {} for series {}",
                response.status(),
                series_id
            )));
        }

        let body = response.text().await?;
        let payload: BlsResponse = serde_json::from_str(&body)?;

        let point = payload
            .results
            .series
            .first()
            .and_then(|series| series.data.first())
            .ok_or_else(|| {
                FetchError::Parse(format!("BLS series {} has no data points", series_id))
            })?;

        let value: f64 = point.value.parse().map_err(|_| {
            FetchError::Parse(format!("BLS value {:?} is not numeric", point.value))
        })?;

        // "M05" -> "05"
        let month = point.period.trim_start_matches('M');

        Ok(MacroStat {
            name: name.to_string(),
            value,
            unit: unit.to_string(),
            date: format!("{}-{}", point.year, month),
            source: SOURCE.to_string(),
        })
    }
}
