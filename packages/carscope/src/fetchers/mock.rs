//! Mock page fetcher for testing.
//!
//! Canned HTML responses indexed by URL, with call tracking so tests
//! can assert pagination behavior.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{FetchError, FetchResult};
use crate::page::PageSnapshot;
use crate::traits::fetcher::{FetchOptions, PageFetcher};

/// Mock fetcher returning pre-configured HTML per URL.
///
/// URLs without a canned page return a fetch error, which is how tests
/// exercise per-page failure tolerance.
#[derive(Default)]
pub struct MockFetcher {
    pages: Arc<RwLock<HashMap<String, String>>>,
    requests: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    /// Create an empty mock fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register HTML content for a URL.
    pub fn add_page(&self, url: &str, html: &str) {
        self.pages
            .write()
            .unwrap()
            .insert(url.to_string(), html.to_string());
    }

    /// Builder form of [`add_page`](Self::add_page).
    pub fn with_page(self, url: &str, html: &str) -> Self {
        self.add_page(url, html);
        self
    }

    /// Number of fetch calls made.
    pub fn fetch_count(&self) -> usize {
        self.requests.read().unwrap().len()
    }

    /// URLs requested, in order.
    pub fn requested_urls(&self) -> Vec<String> {
        self.requests.read().unwrap().clone()
    }
}

impl Clone for MockFetcher {
    fn clone(&self) -> Self {
        Self {
            pages: Arc::clone(&self.pages),
            requests: Arc::clone(&self.requests),
        }
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> FetchResult<PageSnapshot> {
        self.requests.write().unwrap().push(url.to_string());

        let pages = self.pages.read().unwrap();
        match pages.get(url) {
            Some(html) => Ok(PageSnapshot {
                url: url.to_string(),
                html: html.clone(),
                page_number: options.page_number,
                fetched_at: Utc::now(),
            }),
            None => Err(FetchError::Status {
                status: 404,
                url: url.to_string(),
            }),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_returns_canned_pages() {
        let mock = MockFetcher::new().with_page("https://example.com/a", "<html>A</html>");

        let page = mock
            .fetch("https://example.com/a", &FetchOptions::for_page(2))
            .await
            .unwrap();
        assert_eq!(page.html, "<html>A</html>");
        assert_eq!(page.page_number, 2);

        let missing = mock
            .fetch("https://example.com/missing", &FetchOptions::default())
            .await;
        assert!(missing.is_err());

        assert_eq!(mock.fetch_count(), 2);
    }
}
