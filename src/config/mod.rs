//! Configuration management for Goldapp
//!
//! Loads defaults, then overrides from environment variables (GOLDAPP_*)
//! with .env support. Provider base URLs are configurable so tests and
//! staging can point the adapters at a local server.

use anyhow::{Context, Result};
use config::{Config, Environment};
use serde::Deserialize;

/// Main application settings, loaded once at process start.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Cache time-to-live in seconds for the per-source caches
    pub ttl: u64,
    /// Socket address the HTTP server binds to
    pub bind_addr: String,
    /// Market-data (quote) provider base URL
    pub market_data_url: String,
    /// Labor-statistics provider base URL
    pub bls_url: String,
    /// National-accounts provider base URL
    pub bea_url: String,
    /// Rates-database provider base URL
    pub fred_url: String,
    /// Meeting-calendar XML feed URL
    pub fomc_feed_url: String,
    /// Speech RSS feed URL
    pub speech_feed_url: String,
    /// Labor-statistics registration key (optional, raises rate limits)
    pub bls_api_key: Option<String>,
    /// National-accounts API key (required for the PCE endpoint)
    pub bea_api_key: Option<String>,
    /// Rates-database API key (required for fed_rate and vix)
    pub fred_api_key: Option<String>,
}

impl Settings {
    /// Load configuration from defaults and environment
    pub fn load() -> Result<Self> {
        // Load .env file first
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .set_default("ttl", 300)?
            .set_default("bind_addr", "0.0.0.0:8000")?
            .set_default("market_data_url", "https://query1.finance.yahoo.com")?
            .set_default("bls_url", "https://api.bls.gov")?
            .set_default("bea_url", "https://apps.bea.gov")?
            .set_default("fred_url", "https://api.stlouisfed.org")?
            .set_default(
                "fomc_feed_url",
                "https://www.federalreserve.gov/feeds/fomc_calendar.xml",
            )?
            .set_default(
                "speech_feed_url",
                "https://www.federalreserve.gov/feeds/speeches.xml",
            )?
            // Override with environment variables (GOLDAPP_*)
            .add_source(Environment::with_prefix("GOLDAPP").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let settings: Settings = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        Ok(settings)
    }

    /// Generate a digest of the settings (without secrets) for logging
    pub fn digest(&self) -> String {
        format!(
            "ttl={}s bind={} bls_key={} bea_key={} fred_key={}",
            self.ttl,
            self.bind_addr,
            self.bls_api_key.is_some(),
            self.bea_api_key.is_some(),
            self.fred_api_key.is_some(),
        )
    }
}

impl std::fmt::Display for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.digest())
    }
}
