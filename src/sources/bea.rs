//! National-accounts adapter (PCE)
//!
//! Unlike the labor-statistics API, this provider nests its observations in
//! a results array and requires an API key for every call, so a missing key
//! fails before any network traffic.

use reqwest::Client;
use serde::Deserialize;

use super::REQUEST_TIMEOUT;
use crate::error::{FetchError, FetchResult};
use crate::types::PceStat;

const SOURCE: &str = "BEA";

#[derive(Debug, Deserialize)]
struct BeaResponse {
    #[serde(rename = "BEAAPI")]
    bea_api: BeaApi,
}

#[derive(Debug, Deserialize)]
struct BeaApi {
    #[serde(rename = "Results")]
    results: BeaResults,
}

#[derive(Debug, Deserialize)]
struct BeaResults {
    #[serde(rename = "Data")]
    data: Vec<BeaDataPoint>,
}

#[derive(Debug, Deserialize)]
struct BeaDataPoint {
    /// Period encoded as "2024M05" or "2024-05" depending on the dataset
    #[serde(rename = "TimePeriod")]
    time_period: String,
    #[serde(rename = "DataValue")]
    data_value: String,
}

pub struct BeaClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl BeaClient {
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

    /// Fetch the most recent monthly PCE change.
    pub async fn pce(&self) -> FetchResult<PceStat> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(FetchError::Configuration("GOLDAPP_BEA_API_KEY"))?;

        let url = format!("{}/api/data", self.base_url);
        let query = [
            ("UserID", key),
            ("method", "GetData"),
            ("DataSetName", "NIPA"),
            ("TableName", "T20806"),
            ("Frequency", "M"),
            ("Year", "X"),
            ("ResultFormat", "json"),
        ];

        tracing::debug!("Fetching BEA PCE data");

        let response = self.client.get(&url).query(&query).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Upstream(format!(
                "BEA returned {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        let payload: BeaResponse = serde_json::from_str(&body)?;

        // Periods within one payload are zero-padded to the same width,
        // so the lexicographically greatest string is the latest period.
        let latest = payload
            .bea_api
            .results
            .data
            .iter()
            .max_by(|a, b| a.time_period.cmp(&b.time_period))
            .ok_or_else(|| FetchError::Parse("BEA payload has no observations".to_string()))?;

        let value: f64 = latest.data_value.parse().map_err(|_| {
            FetchError::Parse(format!("BEA value {:?} is not numeric", latest.data_value))
        })?;

        Ok(PceStat {
            name: "PCE".to_string(),
            value,
            unit: "%".to_string(),
            date: normalize_period(&latest.time_period)?,
            source: SOURCE.to_string(),
        })
    }
}

/// Convert a BEA period string to "YYYY-MM".
///
/// Handles both encodings the datasets use: "2024M05" and "2024-05". The
/// delimiter present decides how to split.
fn normalize_period(period: &str) -> FetchResult<String> {
    let (year, month) = if let Some((year, month)) = period.split_once('M') {
        (year, month)
    } else if let Some((year, month)) = period.split_once('-') {
        (year, month)
    } else {
        return Err(FetchError::Parse(format!(
            "unrecognized BEA period {:?}",
            period
        )));
    };

    if year.is_empty() || month.is_empty() {
        return Err(FetchError::Parse(format!(
            "unrecognized BEA period {:?}",
            period
        )));
    }

    Ok(format!("{}-{}", year, month))
}
