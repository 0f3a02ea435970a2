//! Whole-request orchestration.
//!
//! Runs one collection task per registered platform concurrently, joins
//! them all (a join, not a race), flattens the results in platform
//! registration order, and hands the merged set to the matching and
//! ranking engine. Dependencies flow one way: orchestrator to
//! collectors, orchestrator to oracle, orchestrator to engine; nothing
//! calls back up.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{info, warn};

use crate::collector::{default_platforms, CollectorConfig, PlatformCollector, PlatformConfig};
use crate::engine::MatchingEngine;
use crate::oracle::{with_fallback, FallbackOracle, DEFAULT_ORACLE_TIMEOUT};
use crate::traits::fetcher::PageFetcher;
use crate::traits::oracle::SearchOracle;
use crate::types::{
    QueryEnhancement, RawListing, SearchAnalysis, SearchContext, SearchFilters, SearchReport,
};
use crate::error::SearchResult;

/// Coordinates collectors, the oracle, and the engine for one search.
pub struct SearchOrchestrator {
    fetcher: Arc<dyn PageFetcher>,
    oracle: Arc<dyn SearchOracle>,
    platforms: Vec<PlatformConfig>,
    collector_config: CollectorConfig,
    engine: MatchingEngine,
    oracle_timeout: Duration,
}

impl SearchOrchestrator {
    /// Orchestrator over the default platform set.
    pub fn new(fetcher: Arc<dyn PageFetcher>, oracle: Arc<dyn SearchOracle>) -> Self {
        Self {
            fetcher,
            oracle,
            platforms: default_platforms(),
            collector_config: CollectorConfig::default(),
            engine: MatchingEngine::new(),
            oracle_timeout: DEFAULT_ORACLE_TIMEOUT,
        }
    }

    /// Replace the registered platforms. Registration order defines the
    /// stable tiebreak for ranking.
    pub fn with_platforms(mut self, platforms: Vec<PlatformConfig>) -> Self {
        self.platforms = platforms;
        self
    }

    /// Replace the collector tunables.
    pub fn with_collector_config(mut self, config: CollectorConfig) -> Self {
        self.collector_config = config;
        self
    }

    /// Replace the engine.
    pub fn with_engine(mut self, engine: MatchingEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Time budget for the orchestrator's own oracle calls.
    pub fn with_oracle_timeout(mut self, timeout: Duration) -> Self {
        self.oracle_timeout = timeout;
        self
    }

    /// Run one aggregated search end to end.
    ///
    /// The only user-visible error is filter validation; everything past
    /// that degrades internally. An empty result set is a valid outcome.
    pub async fn search(&self, filters: &SearchFilters) -> SearchResult<SearchReport> {
        filters.validate()?;

        let enhancement = self.enhance(filters).await;
        let enhanced_filters = filters.enhanced_with(&enhancement.standardized);

        let price_prediction = with_fallback(
            "predict_price",
            self.oracle_timeout,
            self.oracle.predict_price(&enhanced_filters),
            || None,
        )
        .await;

        let context = SearchContext {
            enhancement: enhancement.clone(),
            price_prediction: price_prediction.clone(),
        };

        let raw = self.collect_all(&enhanced_filters).await;
        let total_found = raw.len();

        let output = self
            .engine
            .process(self.oracle.as_ref(), raw, &enhanced_filters, &context)
            .await;

        info!(
            model = %enhanced_filters.model,
            total_found,
            after_filtering = output.results.len(),
            "search complete"
        );

        Ok(SearchReport {
            analysis: SearchAnalysis {
                total_found,
                after_filtering: output.results.len(),
                price_prediction,
                search_enhancement: enhancement,
            },
            results: output.results,
            recommendations: output.recommendations,
        })
    }

    /// Query enhancement with a bounded timeout; any failure falls back
    /// to the deterministic local enhancement.
    async fn enhance(&self, filters: &SearchFilters) -> QueryEnhancement {
        let query = match &filters.brand {
            Some(brand) => format!("{brand} {}", filters.model),
            None => filters.model.clone(),
        };

        match tokio::time::timeout(self.oracle_timeout, self.oracle.enhance_query(&query)).await {
            Ok(Ok(enhancement)) => enhancement,
            Ok(Err(e)) => {
                warn!(error = %e, "query enhancement failed, using local fallback");
                local_enhancement(&query).await
            }
            Err(_) => {
                warn!("query enhancement timed out, using local fallback");
                local_enhancement(&query).await
            }
        }
    }

    /// Run every platform collector concurrently and flatten the
    /// results in registration order.
    ///
    /// A panicking task contributes zero results and never aborts its
    /// siblings.
    async fn collect_all(&self, filters: &SearchFilters) -> Vec<RawListing> {
        let mut names = Vec::with_capacity(self.platforms.len());
        let mut handles = Vec::with_capacity(self.platforms.len());

        for platform in &self.platforms {
            let collector = PlatformCollector::new(platform.clone(), self.collector_config.clone());
            let fetcher = Arc::clone(&self.fetcher);
            let filters = filters.clone();
            names.push(platform.name.clone());
            handles.push(tokio::spawn(async move {
                collector.collect(fetcher.as_ref(), &filters).await
            }));
        }

        let mut all: Vec<RawListing> = Vec::new();
        let mut distribution: BTreeMap<String, usize> = BTreeMap::new();
        for (name, joined) in names.into_iter().zip(join_all(handles).await) {
            match joined {
                Ok(listings) => {
                    distribution.insert(name, listings.len());
                    all.extend(listings);
                }
                Err(e) => {
                    warn!(platform = %name, error = %e, "collection task failed");
                    distribution.insert(name, 0);
                }
            }
        }

        info!(total = all.len(), distribution = ?distribution, "all platforms collected");
        all
    }
}

async fn local_enhancement(query: &str) -> QueryEnhancement {
    FallbackOracle::new()
        .enhance_query(query)
        .await
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::platforms;
    use crate::fetchers::MockFetcher;

    const PAGE: &str = r#"
        <div data-testid="ad-card">
          <h2><a href="/ad/1">Toyota Corolla X 2004 fresh condition</a></h2>
          <div data-testid="ad-price">৳ 1,190,000</div>
        </div>
    "#;

    fn orchestrator(fetcher: MockFetcher) -> SearchOrchestrator {
        SearchOrchestrator::new(Arc::new(fetcher), Arc::new(FallbackOracle::new()))
            .with_collector_config(CollectorConfig::fast())
            .with_platforms(vec![platforms::bikroy(), platforms::olx()])
    }

    #[tokio::test]
    async fn test_validation_rejects_before_pipeline() {
        let fetcher = MockFetcher::new();
        let orchestrator = orchestrator(fetcher.clone());

        let result = orchestrator.search(&SearchFilters::default()).await;
        assert!(result.is_err());
        assert_eq!(fetcher.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_partial_failure_returns_union() {
        let fetcher = MockFetcher::new();
        let filters = SearchFilters::for_model("Corolla").with_brand("Toyota");

        // Only Bikroy serves content; OLX fails every fetch
        let bikroy = platforms::bikroy();
        fetcher.add_page(&bikroy.build_search_url(&filters, 1), PAGE);

        let report = orchestrator(fetcher).search(&filters).await.unwrap();
        assert_eq!(report.analysis.total_found, 1);
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].listing.platform, "Bikroy");
    }

    #[tokio::test]
    async fn test_empty_collection_is_not_an_error() {
        let fetcher = MockFetcher::new();
        let filters = SearchFilters::for_model("Corolla").with_brand("Toyota");

        let report = orchestrator(fetcher).search(&filters).await.unwrap();
        assert_eq!(report.analysis.total_found, 0);
        assert!(report.results.is_empty());
        assert!(report.recommendations.is_empty());
    }

    #[tokio::test]
    async fn test_enhancement_recorded_in_analysis() {
        let fetcher = MockFetcher::new();
        let filters = SearchFilters::for_model("Corolla").with_brand("Toyota");

        let report = orchestrator(fetcher).search(&filters).await.unwrap();
        let std = &report.analysis.search_enhancement.standardized;
        assert_eq!(std.brand.as_deref(), Some("Toyota"));
        assert_eq!(std.model.as_deref(), Some("Corolla"));
        assert!(report.analysis.price_prediction.is_none());
    }
}
