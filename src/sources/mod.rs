//! Provider adapters (market data, BLS, BEA, FRED, event feeds)
//!
//! One client per upstream source. Each adapter performs a single network
//! call (or a small fixed number), parses the provider-specific response
//! shape, and normalizes it into one of the canonical records in
//! [`crate::types`]. Adapters hold no state beyond configuration.

mod bea;
mod bls;
mod feeds;
mod fred;
mod market;

pub use bea::BeaClient;
pub use bls::BlsClient;
pub use feeds::FeedClient;
pub use fred::FredClient;
pub use market::MarketDataClient;

use async_trait::async_trait;
use std::time::Duration;

use crate::config::Settings;
use crate::error::FetchResult;
use crate::types::{MacroStat, MarketIndices, NextEvent, PceStat, RateObservation};

/// Timeout applied to every upstream request.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Trait over every upstream operation the service can invoke.
///
/// The service layer only sees this trait; the concrete clients below are
/// wired up once at startup via [`LiveProviders`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Providers: Send + Sync {
    /// UUP last price plus SPY+QQQ aggregated volume
    async fn market_indices(&self) -> FetchResult<MarketIndices>;

    /// Consumer price index, most recent period
    async fn cpi(&self) -> FetchResult<MacroStat>;

    /// Non-farm payrolls, most recent period
    async fn nfp(&self) -> FetchResult<MacroStat>;

    /// Personal consumption expenditures, most recent period
    async fn pce(&self) -> FetchResult<PceStat>;

    /// Effective federal funds rate, most recent observation
    async fn fed_rate(&self) -> FetchResult<RateObservation>;

    /// VIX close, most recent observation
    async fn vix(&self) -> FetchResult<RateObservation>;

    /// Next upcoming FOMC meeting, `None` when the calendar has no
    /// future-dated item
    async fn fomc_next(&self) -> FetchResult<Option<NextEvent>>;

    /// Next upcoming speech, `None` when the feed has no future-dated item
    async fn powell_speech(&self) -> FetchResult<Option<NextEvent>>;
}

/// Production wiring of the concrete provider clients.
pub struct LiveProviders {
    market: MarketDataClient,
    bls: BlsClient,
    bea: BeaClient,
    fred: FredClient,
    feeds: FeedClient,
}

impl LiveProviders {
    pub fn new(settings: &Settings) -> Self {
        Self {
            market: MarketDataClient::new(&settings.market_data_url),
            bls: BlsClient::new(&settings.bls_url, settings.bls_api_key.clone()),
            bea: BeaClient::new(&settings.bea_url, settings.bea_api_key.clone()),
            fred: FredClient::new(&settings.fred_url, settings.fred_api_key.clone()),
            feeds: FeedClient::new(&settings.fomc_feed_url, &settings.speech_feed_url),
        }
    }
}

#[async_trait]
impl Providers for LiveProviders {
    async fn market_indices(&self) -> FetchResult<MarketIndices> {
        self.market.market_indices().await
    }

    async fn cpi(&self) -> FetchResult<MacroStat> {
        self.bls.cpi().await
    }

    async fn nfp(&self) -> FetchResult<MacroStat> {
        self.bls.nfp().await
    }

    async fn pce(&self) -> FetchResult<PceStat> {
        self.bea.pce().await
    }

    async fn fed_rate(&self) -> FetchResult<RateObservation> {
        self.fred.fed_rate().await
    }

    async fn vix(&self) -> FetchResult<RateObservation> {
        self.fred.vix().await
    }

    async fn fomc_next(&self) -> FetchResult<Option<NextEvent>> {
        self.feeds.fomc_next().await
    }

    async fn powell_speech(&self) -> FetchResult<Option<NextEvent>> {
        self.feeds.powell_speech().await
    }
}
