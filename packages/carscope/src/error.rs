//! Typed errors for the aggregation pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. Most failure classes are
//! recovered locally (per page, per platform, per oracle call) and never
//! reach the caller; `SearchError` covers the few that do.

use thiserror::Error;

/// Errors that can surface from a whole search request.
///
/// Per-platform and per-page failures are absorbed inside the collectors
/// and never appear here. An empty result set is a valid outcome, not an
/// error.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Request rejected before the pipeline ran.
    #[error("invalid filters: {reason}")]
    InvalidFilters { reason: String },

    /// A background collection task could not be joined.
    #[error("collection task failed: {0}")]
    Join(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Errors from the page fetcher collaborator.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Invalid URL format
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Fetch exceeded its time budget
    #[error("timeout fetching: {url}")]
    Timeout { url: String },

    /// Non-success status from the marketplace
    #[error("status {status} fetching: {url}")]
    Status { status: u16, url: String },
}

/// Errors from the query/price oracle collaborator.
///
/// Every oracle failure has a deterministic local fallback; these errors
/// are logged and absorbed, surfaced only as lower confidence downstream.
#[derive(Debug, Error)]
pub enum OracleError {
    /// Oracle disabled or credentials missing
    #[error("oracle unavailable: {0}")]
    Unavailable(String),

    /// Transport-level failure
    #[error("oracle request failed: {0}")]
    Request(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Response was not the expected JSON contract
    #[error("malformed oracle response: {0}")]
    MalformedResponse(String),

    /// Call exceeded its time budget
    #[error("oracle call timed out")]
    Timeout,
}

impl From<serde_json::Error> for OracleError {
    fn from(e: serde_json::Error) -> Self {
        OracleError::MalformedResponse(e.to_string())
    }
}

/// Result alias for search operations.
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Result alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result alias for oracle operations.
pub type OracleResult<T> = std::result::Result<T, OracleError>;
