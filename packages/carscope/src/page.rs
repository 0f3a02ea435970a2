//! Materialized page snapshots.
//!
//! Extraction operates on a serializable snapshot of a fetched page,
//! never on a live browser session. This keeps the strategy chain a pure
//! function that can be unit-tested against HTML fixtures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A fetched page, frozen for extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSnapshot {
    /// URL the content was fetched from.
    pub url: String,

    /// Raw HTML of the page.
    pub html: String,

    /// 1-based pagination index within the platform's result pages.
    pub page_number: u32,

    /// When the content was fetched.
    pub fetched_at: DateTime<Utc>,
}

impl PageSnapshot {
    /// Create a snapshot for page 1.
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
            page_number: 1,
            fetched_at: Utc::now(),
        }
    }

    /// Set the pagination index.
    pub fn with_page_number(mut self, page_number: u32) -> Self {
        self.page_number = page_number;
        self
    }

    /// Check if the snapshot holds any content.
    pub fn has_content(&self) -> bool {
        !self.html.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_builder() {
        let snap = PageSnapshot::new("https://bikroy.com/en/ads", "<html></html>")
            .with_page_number(3);
        assert_eq!(snap.page_number, 3);
        assert!(snap.has_content());

        let empty = PageSnapshot::new("https://bikroy.com", "   ");
        assert!(!empty.has_content());
    }
}
