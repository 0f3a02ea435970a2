//! Page fetcher trait for pluggable content retrieval.
//!
//! The fetcher is an opaque capability: collectors hand it a URL and a
//! time budget and get back a materialized [`PageSnapshot`] (or an
//! error). Extraction never touches the fetch mechanism, so the whole
//! downstream pipeline runs against fixtures in tests.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::FetchResult;
use crate::page::PageSnapshot;

/// Options for one fetch operation.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Bound on the whole fetch, including redirects.
    pub timeout: Duration,

    /// Pagination index recorded on the snapshot.
    pub page_number: u32,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            page_number: 1,
        }
    }
}

impl FetchOptions {
    /// Options for a given pagination index.
    pub fn for_page(page_number: u32) -> Self {
        Self {
            page_number,
            ..Default::default()
        }
    }

    /// Set the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Fetches page content from marketplace URLs.
///
/// Implementations own their sessions; no fetcher is shared for
/// mutation across platform tasks.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch one URL into a snapshot within the given time budget.
    async fn fetch(&self, url: &str, options: &FetchOptions) -> FetchResult<PageSnapshot>;

    /// Fetcher name for logging.
    fn name(&self) -> &str {
        "unknown"
    }
}
