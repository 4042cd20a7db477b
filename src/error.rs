//! Fetch error taxonomy
//!
//! Every provider adapter raises one of these; the service layer clears the
//! affected cache and propagates, and the HTTP facade collapses all of them
//! into a uniform 503. "No upcoming event" is not an error — feed fetches
//! return `Ok(None)` for that case.

use thiserror::Error;

/// Error raised by a provider adapter or the cached-fetch layer.
#[derive(Debug, Error)]
pub enum FetchError {
    /// A required credential is not configured. Raised before any network
    /// call is attempted; never retried.
    #[error("missing credential: {0}")]
    Configuration(&'static str),

    /// Network failure, non-success status, or missing data point.
    #[error("upstream request failed: {0}")]
    Upstream(String),

    /// Structurally unexpected payload. Propagates exactly like
    /// `Upstream`; kept distinct so logs say what actually broke.
    #[error("unexpected upstream payload: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Upstream(err.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Parse(err.to_string())
    }
}

/// Convenience alias used across the sources and service modules.
pub type FetchResult<T> = std::result::Result<T, FetchError>;
