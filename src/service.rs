//! Cached-fetch orchestrator
//!
//! Pairs every upstream operation with its own time-bounded cache and
//! enforces the shared policy: serve a fresh hit, otherwise invoke the
//! adapter; on success populate the cache, on failure clear it and
//! propagate. A failed refresh never leaves a previous value reachable —
//! correctness favors unavailability over staleness.

use std::future::Future;
use std::time::Duration;

use crate::cache::TtlCache;
use crate::config::Settings;
use crate::error::FetchResult;
use crate::sources::{LiveProviders, Providers};
use crate::types::{LatestMacro, MarketIndices, NextEvent, PceStat, RateObservation};

/// CPI and NFP publish monthly, so their composite cache holds for a day
/// instead of the general ttl.
pub const MACRO_CACHE_TTL_SECS: u64 = 86_400;

const CACHE_CAPACITY: usize = 4;

const MARKET_KEY: &str = "market_indices";
const LATEST_MACRO_KEY: &str = "latest_macro";
const PCE_KEY: &str = "pce";
const FED_RATE_KEY: &str = "fed_rate";
const VIX_KEY: &str = "vix";
const FOMC_KEY: &str = "fomc_next";
const SPEECH_KEY: &str = "powell_speech";

/// Owns the provider set and one cache per operation.
///
/// Constructed once at process start and handed to the HTTP layer behind
/// an `Arc`; there is no global state.
pub struct Service {
    providers: Box<dyn Providers>,
    market: TtlCache<&'static str, MarketIndices>,
    latest_macro: TtlCache<&'static str, LatestMacro>,
    pce: TtlCache<&'static str, PceStat>,
    fed_rate: TtlCache<&'static str, RateObservation>,
    vix: TtlCache<&'static str, RateObservation>,
    fomc_next: TtlCache<&'static str, Option<NextEvent>>,
    powell_speech: TtlCache<&'static str, Option<NextEvent>>,
}

impl Service {
    /// Wire the live provider clients from settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            Box::new(LiveProviders::new(settings)),
            Duration::from_secs(settings.ttl),
        )
    }

    /// Build a service over an arbitrary provider set (tests inject stubs
    /// here). `ttl` applies to every cache except the latest-macro one.
    pub fn new(providers: Box<dyn Providers>, ttl: Duration) -> Self {
        let macro_ttl = Duration::from_secs(MACRO_CACHE_TTL_SECS);

        Self {
            providers,
            market: TtlCache::new(CACHE_CAPACITY, ttl),
            latest_macro: TtlCache::new(CACHE_CAPACITY, macro_ttl),
            pce: TtlCache::new(CACHE_CAPACITY, ttl),
            fed_rate: TtlCache::new(CACHE_CAPACITY, ttl),
            vix: TtlCache::new(CACHE_CAPACITY, ttl),
            fomc_next: TtlCache::new(CACHE_CAPACITY, ttl),
            powell_speech: TtlCache::new(CACHE_CAPACITY, ttl),
        }
    }

    pub async fn market_indices(&self) -> FetchResult<MarketIndices> {
        serve_or_refresh(&self.market, MARKET_KEY, || self.providers.market_indices()).await
    }

    /// The most recently published statistic between CPI and NFP.
    ///
    /// Both series must resolve; there is no partial result. The periods
    /// are zero-padded "YYYY-MM" strings, so string comparison is period
    /// comparison, and the non-strict `>=` makes CPI win a tie.
    pub async fn latest_macro(&self) -> FetchResult<LatestMacro> {
        serve_or_refresh(&self.latest_macro, LATEST_MACRO_KEY, || async {
            let cpi = self.providers.cpi().await?;
            let nfp = self.providers.nfp().await?;
            let latest = if cpi.date >= nfp.date { cpi } else { nfp };
            Ok(LatestMacro {
                latest_macro: latest,
            })
        })
        .await
    }

    pub async fn pce(&self) -> FetchResult<PceStat> {
        serve_or_refresh(&self.pce, PCE_KEY, || self.providers.pce()).await
    }

    pub async fn fed_rate(&self) -> FetchResult<RateObservation> {
        serve_or_refresh(&self.fed_rate, FED_RATE_KEY, || self.providers.fed_rate()).await
    }

    pub async fn vix(&self) -> FetchResult<RateObservation> {
        serve_or_refresh(&self.vix, VIX_KEY, || self.providers.vix()).await
    }

    /// `Ok(None)` (no upcoming meeting) is a cacheable success, not a
    /// failure.
    pub async fn fomc_next(&self) -> FetchResult<Option<NextEvent>> {
        serve_or_refresh(&self.fomc_next, FOMC_KEY, || self.providers.fomc_next()).await
    }

    pub async fn powell_speech(&self) -> FetchResult<Option<NextEvent>> {
        serve_or_refresh(&self.powell_speech, SPEECH_KEY, || {
            self.providers.powell_speech()
        })
        .await
    }
}

/// The shared cache policy.
///
/// Per key: EMPTY or EXPIRED reads invoke the adapter, FRESH reads are
/// served from the cache, and any adapter failure empties the cache before
/// propagating so the next caller retries instead of seeing outdated data.
/// The adapter is only invoked on a miss.
async fn serve_or_refresh<T, F, Fut>(
    cache: &TtlCache<&'static str, T>,
    key: &'static str,
    refresh: F,
) -> FetchResult<T>
where
    T: Clone,
    F: FnOnce() -> Fut,
    Fut: Future<Output = FetchResult<T>>,
{
    if let Some(value) = cache.get(&key).await {
        tracing::debug!(key = %key, "Serving cached value");
        return Ok(value);
    }

    match refresh().await {
        Ok(value) => {
            cache.put(key, value.clone()).await;
            Ok(value)
        }
        Err(err) => {
            cache.clear().await;
            tracing::warn!(key = %key, error = %err, "Refresh failed, cache cleared");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::sources::MockProviders;
    use crate::types::{Indicator, MacroStat};
    use chrono::Utc;

    fn sample_indices() -> MarketIndices {
        let now = Utc::now();
        MarketIndices {
            dxy_proxy_uup: Indicator {
                symbol: "UUP".to_string(),
                value: 100.0,
                unit: "USD".to_string(),
                last_updated_utc: now,
            },
            volume_aggregated: Indicator {
                symbol: "US_VOLUME".to_string(),
                value: 2_000_000.0,
                unit: "shares".to_string(),
                last_updated_utc: now,
            },
        }
    }

    fn macro_stat(name: &str, date: &str) -> MacroStat {
        MacroStat {
            name: name.to_string(),
            value: 1.0,
            unit: "index".to_string(),
            date: date.to_string(),
            source: "BLS".to_string(),
        }
    }

    fn service(mock: MockProviders, ttl: Duration) -> Service {
        Service::new(Box::new(mock), ttl)
    }

    #[tokio::test]
    async fn fresh_cache_serves_without_a_second_adapter_call() {
        let mut mock = MockProviders::new();
        mock.expect_market_indices()
            .times(1)
            .returning(|| Ok(sample_indices()));

        let service = service(mock, Duration::from_secs(60));
        let first = service.market_indices().await.unwrap();
        let second = service.market_indices().await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn expired_cache_triggers_exactly_one_more_call() {
        let mut mock = MockProviders::new();
        mock.expect_market_indices()
            .times(2)
            .returning(|| Ok(sample_indices()));

        let service = service(mock, Duration::from_millis(50));
        service.market_indices().await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        service.market_indices().await.unwrap();
    }

    #[tokio::test]
    async fn failure_clears_cache_and_propagates() {
        let mut mock = MockProviders::new();
        mock.expect_fed_rate()
            .times(1)
            .returning(|| Err(FetchError::Upstream("boom".to_string())));
        mock.expect_fed_rate().times(1).returning(|| {
            Ok(RateObservation {
                value: 5.0,
                date: "2024-06-13".to_string(),
                source: "FRED".to_string(),
            })
        });

        let service = service(mock, Duration::from_secs(60));

        let err = service.fed_rate().await.unwrap_err();
        assert!(matches!(err, FetchError::Upstream(_)));

        // The failure emptied the cache, so this read goes back upstream.
        let observation = service.fed_rate().await.unwrap();
        assert_eq!(observation.value, 5.0);
    }

    #[tokio::test]
    async fn no_stale_value_is_served_after_a_failed_refresh() {
        let mut mock = MockProviders::new();
        mock.expect_fed_rate().times(1).returning(|| {
            Ok(RateObservation {
                value: 5.0,
                date: "2024-06-13".to_string(),
                source: "FRED".to_string(),
            })
        });
        mock.expect_fed_rate()
            .times(1)
            .returning(|| Err(FetchError::Upstream("boom".to_string())));

        let service = service(mock, Duration::from_millis(50));

        service.fed_rate().await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        // The refresh fails; the previously cached value must not leak out.
        let err = service.fed_rate().await.unwrap_err();
        assert!(matches!(err, FetchError::Upstream(_)));
    }

    #[tokio::test]
    async fn latest_macro_prefers_the_newer_period() {
        let mut mock = MockProviders::new();
        mock.expect_cpi()
            .times(1)
            .returning(|| Ok(macro_stat("CPI", "2024-05")));
        mock.expect_nfp()
            .times(1)
            .returning(|| Ok(macro_stat("NFP", "2024-06")));

        let service = service(mock, Duration::from_secs(60));
        let latest = service.latest_macro().await.unwrap();

        assert_eq!(latest.latest_macro.name, "NFP");
        assert_eq!(latest.latest_macro.date, "2024-06");
    }

    #[tokio::test]
    async fn latest_macro_prefers_cpi_when_it_is_newer() {
        let mut mock = MockProviders::new();
        mock.expect_cpi()
            .times(1)
            .returning(|| Ok(macro_stat("CPI", "2024-06")));
        mock.expect_nfp()
            .times(1)
            .returning(|| Ok(macro_stat("NFP", "2024-05")));

        let service = service(mock, Duration::from_secs(60));
        let latest = service.latest_macro().await.unwrap();

        assert_eq!(latest.latest_macro.name, "CPI");
    }

    #[tokio::test]
    async fn latest_macro_tie_resolves_to_cpi() {
        let mut mock = MockProviders::new();
        mock.expect_cpi()
            .times(1)
            .returning(|| Ok(macro_stat("CPI", "2024-06")));
        mock.expect_nfp()
            .times(1)
            .returning(|| Ok(macro_stat("NFP", "2024-06")));

        let service = service(mock, Duration::from_secs(60));
        let latest = service.latest_macro().await.unwrap();

        assert_eq!(latest.latest_macro.name, "CPI");
    }

    #[tokio::test]
    async fn latest_macro_fails_when_either_series_fails() {
        let mut mock = MockProviders::new();
        mock.expect_cpi()
            .times(1)
            .returning(|| Ok(macro_stat("CPI", "2024-06")));
        mock.expect_nfp()
            .times(1)
            .returning(|| Err(FetchError::Upstream("bls down".to_string())));

        let service = service(mock, Duration::from_secs(60));
        let err = service.latest_macro().await.unwrap_err();

        assert!(matches!(err, FetchError::Upstream(_)));
    }

    #[tokio::test]
    async fn empty_feed_result_is_cached_as_a_success() {
        let mut mock = MockProviders::new();
        mock.expect_fomc_next().times(1).returning(|| Ok(None));

        let service = service(mock, Duration::from_secs(60));

        assert!(service.fomc_next().await.unwrap().is_none());
        // Served from cache; the single expectation above would fail on a
        // second upstream call.
        assert!(service.fomc_next().await.unwrap().is_none());
    }
}
