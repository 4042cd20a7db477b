//! Core types used throughout Goldapp
//!
//! Canonical records produced by the provider adapters. All of these are
//! immutable value types: each successful fetch builds a fresh record, and
//! the caches replace entries wholesale rather than mutating them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single market indicator (price or volume) with its fetch timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    /// Instrument or synthetic symbol (e.g. "UUP", "US_VOLUME")
    pub symbol: String,
    pub value: f64,
    /// Unit of the value (e.g. "USD", "shares")
    pub unit: String,
    /// When we fetched the value, not the exchange timestamp
    pub last_updated_utc: DateTime<Utc>,
}

/// Dollar-proxy price plus aggregated US equity volume.
///
/// Both indicators carry the same `last_updated_utc` since they are built
/// from one composite fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketIndices {
    pub dxy_proxy_uup: Indicator,
    pub volume_aggregated: Indicator,
}

/// One macroeconomic statistic (CPI or NFP) for a single period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroStat {
    pub name: String,
    pub value: f64,
    pub unit: String,
    /// Period as "YYYY-MM"; zero-padded, so string order is period order
    pub date: String,
    /// Provider tag (e.g. "BLS")
    pub source: String,
}

/// The most recently published statistic between CPI and NFP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestMacro {
    pub latest_macro: MacroStat,
}

/// Personal consumption expenditures, latest period.
///
/// Same shape as [`MacroStat`] but kept as its own type: the BEA payload
/// parses differently and the endpoint returns it bare.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PceStat {
    pub name: String,
    pub value: f64,
    pub unit: String,
    /// Period as "YYYY-MM"
    pub date: String,
    pub source: String,
}

/// Most recent observation of a rates-database series (fed funds, VIX).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateObservation {
    pub value: f64,
    /// Observation date as "YYYY-MM-DD"
    pub date: String,
    pub source: String,
}

/// The next upcoming dated event from a feed (FOMC meeting, speech).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextEvent {
    /// "YYYY-MM-DD"
    pub date: String,
    /// "HH:MM" (UTC)
    pub time: String,
    pub title: String,
    pub url: String,
}
