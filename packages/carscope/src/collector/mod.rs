//! Per-platform collection: pagination, extraction, dedup, fallback.
//!
//! A collector walks a platform's result pages sequentially, runs the
//! extraction strategy chain on each snapshot, and degrades gracefully:
//! fetch errors skip the page, an empty page stops pagination, and an
//! empty final set falls back to synthetic sample data. `collect` never
//! returns an error.

pub mod platforms;
pub mod sample;

use std::collections::HashSet;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::extract::extract_listings;
use crate::traits::fetcher::{FetchOptions, PageFetcher};
use crate::types::{RawListing, SearchFilters};

pub use platforms::{default_platforms, PlatformConfig};
pub use sample::generate_sample_listings;

/// Tunables shared by all collectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Time budget per page fetch.
    pub fetch_timeout: Duration,

    /// Randomized inter-page delay bounds, milliseconds. Required
    /// throttling against anti-scraping defenses, not optional sleep.
    pub page_delay_ms: (u64, u64),

    /// Generate synthetic sample data when a platform yields nothing.
    pub sample_fallback: bool,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(30),
            page_delay_ms: (2_000, 5_000),
            sample_fallback: true,
        }
    }
}

impl CollectorConfig {
    /// Config without throttling or sample fallback, for tests.
    pub fn fast() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(5),
            page_delay_ms: (0, 0),
            sample_fallback: false,
        }
    }

    /// Set the inter-page delay bounds.
    pub fn with_page_delay_ms(mut self, min: u64, max: u64) -> Self {
        self.page_delay_ms = (min, max);
        self
    }

    /// Enable or disable the sample fallback.
    pub fn with_sample_fallback(mut self, enabled: bool) -> Self {
        self.sample_fallback = enabled;
        self
    }
}

/// Collects listings from one marketplace.
pub struct PlatformCollector {
    platform: PlatformConfig,
    config: CollectorConfig,
}

impl PlatformCollector {
    pub fn new(platform: PlatformConfig, config: CollectorConfig) -> Self {
        Self { platform, config }
    }

    /// Platform display name.
    pub fn platform_name(&self) -> &str {
        &self.platform.name
    }

    /// Collect listings for the given filters.
    ///
    /// Walks pages 1..=max_pages sequentially: page N+1 is not fetched
    /// until page N's extraction completes, so an empty page can stop
    /// pagination and the inter-page delay is respected.
    pub async fn collect(
        &self,
        fetcher: &dyn PageFetcher,
        filters: &SearchFilters,
    ) -> Vec<RawListing> {
        let platform = &self.platform.name;
        let mut all: Vec<RawListing> = Vec::new();

        info!(
            platform,
            brand = filters.brand.as_deref().unwrap_or(""),
            model = %filters.model,
            max_pages = self.platform.max_pages,
            "starting multi-page collection"
        );

        for page in 1..=self.platform.max_pages {
            let url = self.platform.build_search_url(filters, page);
            let options = FetchOptions::for_page(page).with_timeout(self.config.fetch_timeout);

            let snapshot = match fetcher.fetch(&url, &options).await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    warn!(platform, page, error = %e, "page fetch failed, continuing");
                    continue;
                }
            };

            let page_listings = extract_listings(platform, &snapshot, &self.platform.strategies);
            if page_listings.is_empty() {
                info!(platform, page, "empty page, stopping pagination");
                break;
            }

            info!(
                platform,
                page,
                found = page_listings.len(),
                total = all.len() + page_listings.len(),
                "page collected"
            );
            all.extend(page_listings);

            if page < self.platform.max_pages {
                self.inter_page_delay().await;
            }
        }

        let unique = dedup_within_platform(all);

        if unique.is_empty() && self.config.sample_fallback {
            warn!(platform, "no scraped results, generating sample data");
            return generate_sample_listings(platform, filters);
        }

        log_collection_summary(platform, &unique);
        unique
    }

    /// Randomized delay between result pages.
    async fn inter_page_delay(&self) {
        let (min, max) = self.config.page_delay_ms;
        if max == 0 {
            return;
        }
        let delay = rand::rng().random_range(min..=max);
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
}

/// Within-platform dedup by normalized (title, digits-only price) key,
/// keeping the first occurrence.
pub fn dedup_within_platform(listings: Vec<RawListing>) -> Vec<RawListing> {
    let mut seen = HashSet::new();
    listings
        .into_iter()
        .filter(|listing| seen.insert(listing.dedup_key()))
        .collect()
}

fn log_collection_summary(platform: &str, listings: &[RawListing]) {
    let prices: Vec<f64> = listings
        .iter()
        .map(|l| l.numeric_price())
        .filter(|p| *p > 0.0)
        .collect();

    if prices.is_empty() {
        info!(platform, unique = listings.len(), "collection complete");
        return;
    }

    let min = prices.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = prices.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let avg = prices.iter().sum::<f64>() / prices.len() as f64;

    info!(
        platform,
        unique = listings.len(),
        price_min = min,
        price_max = max,
        price_avg = avg,
        "collection complete"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetchers::MockFetcher;
    use crate::types::ExtractionMeta;

    fn listing(title: &str, price: &str) -> RawListing {
        RawListing::new(
            "Bikroy",
            title,
            price,
            "https://bikroy.com/ad/x",
            ExtractionMeta::new("modern", 1),
        )
    }

    #[test]
    fn test_dedup_within_platform_keeps_first() {
        let listings = vec![
            listing("Toyota Corolla X 2004", "৳ 1,190,000"),
            listing("Honda Civic 2020", "৳ 2,800,000"),
            listing("Toyota Corolla X 2004!", "Tk 1190000"),
        ];
        let unique = dedup_within_platform(listings);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].title, "Toyota Corolla X 2004");
    }

    const PAGE_ONE: &str = r#"
        <div data-testid="ad-card">
          <h2><a href="/ad/1">Toyota Corolla X 2004 fresh</a></h2>
          <div data-testid="ad-price">৳ 1,190,000</div>
        </div>
    "#;

    #[tokio::test]
    async fn test_collect_stops_on_empty_page() {
        let fetcher = MockFetcher::new();
        let filters = SearchFilters::for_model("Corolla").with_brand("Toyota");
        let platform = platforms::bikroy();

        // Only page 1 has content; page 2 is empty markup
        fetcher.add_page(&platform.build_search_url(&filters, 1), PAGE_ONE);
        fetcher.add_page(&platform.build_search_url(&filters, 2), "<html></html>");

        let collector = PlatformCollector::new(platform, CollectorConfig::fast());
        let listings = collector.collect(&fetcher, &filters).await;

        assert_eq!(listings.len(), 1);
        // Pages 3 and 4 were never requested
        assert_eq!(fetcher.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_collect_survives_fetch_errors() {
        let fetcher = MockFetcher::new();
        let filters = SearchFilters::for_model("Corolla").with_brand("Toyota");
        let platform = platforms::bikroy();

        // Page 1 missing entirely (fetch error), page 2 has content
        fetcher.add_page(&platform.build_search_url(&filters, 2), PAGE_ONE);

        let collector = PlatformCollector::new(platform, CollectorConfig::fast());
        let listings = collector.collect(&fetcher, &filters).await;

        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].extraction.page_number, 2);
    }

    #[tokio::test]
    async fn test_sample_fallback_when_nothing_scraped() {
        let fetcher = MockFetcher::new();
        let filters = SearchFilters::for_model("Corolla").with_brand("Toyota");

        let config = CollectorConfig::fast().with_sample_fallback(true);
        let collector = PlatformCollector::new(platforms::bikroy(), config);
        let listings = collector.collect(&fetcher, &filters).await;

        assert!(listings.len() >= 3);
        assert!(listings.iter().all(|l| l.synthetic));
    }
}
