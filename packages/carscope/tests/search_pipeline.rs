//! End-to-end pipeline tests against fixture pages and scripted oracles.

use std::sync::Arc;
use std::time::Duration;

use carscope::collector::{platforms, CollectorConfig};
use carscope::fetchers::MockFetcher;
use carscope::oracle::FallbackOracle;
use carscope::orchestrator::SearchOrchestrator;
use carscope::testing::MockOracle;
use carscope::traits::oracle::AnomalyReport;
use carscope::types::SearchFilters;

fn ad_card(title: &str, price: &str) -> String {
    format!(
        r#"<div data-testid="ad-card">
             <h2><a href="/ad/1">{title}</a></h2>
             <div data-testid="ad-price">{price}</div>
           </div>"#
    )
}

fn corolla_filters() -> SearchFilters {
    SearchFilters::for_model("Corolla")
        .with_brand("Toyota")
        .with_price_range(800_000.0, 2_000_000.0)
}

#[tokio::test]
async fn cross_source_fusion_yields_single_corolla() {
    let fetcher = MockFetcher::new();
    let filters = corolla_filters();

    let bikroy = platforms::bikroy();
    let olx = platforms::olx();
    let bikroy_page = format!(
        "{}{}",
        ad_card("Toyota Corolla X 2004", "Tk 1,190,000"),
        ad_card("Honda Civic 2020", "Tk 2,800,000"),
    );
    // Same car posted again on the other platform
    let olx_page = ad_card("Toyota Corolla X 2004", "Tk 1,190,000");
    fetcher.add_page(&bikroy.build_search_url(&filters, 1), &bikroy_page);
    fetcher.add_page(&olx.build_search_url(&filters, 1), &olx_page);

    let orchestrator = SearchOrchestrator::new(Arc::new(fetcher), Arc::new(FallbackOracle::new()))
        .with_platforms(vec![bikroy, olx])
        .with_collector_config(CollectorConfig::fast());

    let report = orchestrator.search(&filters).await.unwrap();

    assert_eq!(report.analysis.total_found, 3);
    assert_eq!(report.results.len(), 1);
    let winner = &report.results[0];
    assert_eq!(winner.listing.title, "Toyota Corolla X 2004");
    assert_eq!(winner.listing.platform, "Bikroy");
    assert!(winner.match_score.is_some());
    assert!(winner.semantic_score.is_some());
}

#[tokio::test]
async fn failing_platforms_do_not_poison_the_union() {
    let fetcher = MockFetcher::new();
    let filters = corolla_filters();

    // Carmudi serves one page; Bikroy and OLX fail every fetch
    let carmudi = platforms::carmudi();
    fetcher.add_page(
        &carmudi.build_search_url(&filters, 1),
        &ad_card("Toyota Corolla G 2014", "Tk 1,350,000"),
    );

    let orchestrator = SearchOrchestrator::new(Arc::new(fetcher), Arc::new(FallbackOracle::new()))
        .with_platforms(vec![platforms::bikroy(), carmudi, platforms::olx()])
        .with_collector_config(CollectorConfig::fast());

    let report = orchestrator.search(&filters).await.unwrap();
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].listing.platform, "Carmudi");
}

#[tokio::test]
async fn oracle_failure_degrades_without_annotations() {
    let fetcher = MockFetcher::new();
    let filters = corolla_filters();

    let bikroy = platforms::bikroy();
    fetcher.add_page(
        &bikroy.build_search_url(&filters, 1),
        &ad_card("Toyota Corolla X 2004", "Tk 1,190,000"),
    );

    let oracle = MockOracle::failing();
    let orchestrator = SearchOrchestrator::new(Arc::new(fetcher), Arc::new(oracle.clone()))
        .with_platforms(vec![bikroy])
        .with_collector_config(CollectorConfig::fast());

    let report = orchestrator.search(&filters).await.unwrap();

    // Local fallback enhancement still standardized the query
    let std = &report.analysis.search_enhancement.standardized;
    assert_eq!(std.model.as_deref(), Some("Corolla"));

    assert_eq!(report.results.len(), 1);
    assert!(report.analysis.price_prediction.is_none());
    assert!(report.results[0].price_flag.is_none());
    assert!(!report.results[0].ai_insights.suspicious);
    assert!(report.recommendations.is_empty());

    // Every oracle stage was attempted before degrading
    assert!(oracle.calls().contains(&"enhance_query".to_string()));
    assert!(oracle.calls().contains(&"analyze_anomalies".to_string()));
}

#[tokio::test]
async fn slow_oracle_times_out_into_fallback() {
    let fetcher = MockFetcher::new();
    let filters = corolla_filters();

    let bikroy = platforms::bikroy();
    fetcher.add_page(
        &bikroy.build_search_url(&filters, 1),
        &ad_card("Toyota Corolla X 2004", "Tk 1,190,000"),
    );

    let oracle = MockOracle::new().with_delay(Duration::from_secs(60));
    let engine = carscope::engine::MatchingEngine::with_config(
        carscope::engine::EngineConfig::default()
            .with_oracle_timeout(Duration::from_millis(50)),
    );
    let orchestrator = SearchOrchestrator::new(Arc::new(fetcher), Arc::new(oracle))
        .with_platforms(vec![bikroy])
        .with_collector_config(CollectorConfig::fast())
        .with_oracle_timeout(Duration::from_millis(50))
        .with_engine(engine);

    let report = tokio::time::timeout(Duration::from_secs(30), orchestrator.search(&filters))
        .await
        .expect("search must not hang on a slow oracle")
        .unwrap();
    assert_eq!(report.results.len(), 1);
    assert!(report.recommendations.is_empty());
}

#[tokio::test]
async fn anomaly_report_annotates_leading_results() {
    let fetcher = MockFetcher::new();
    let filters = corolla_filters();

    let bikroy = platforms::bikroy();
    let page = format!(
        "{}{}",
        ad_card("Toyota Corolla X 2004", "Tk 1,190,000"),
        ad_card("Toyota Corolla G 2014", "Tk 850,000"),
    );
    fetcher.add_page(&bikroy.build_search_url(&filters, 1), &page);

    let oracle = MockOracle::new().with_anomaly_report(AnomalyReport {
        average_price: Some(1_020_000.0),
        suspicious_listings: vec![1],
        recommended_listings: vec![0],
        market_insights: Some("Prices trending down".to_string()),
    });
    let orchestrator = SearchOrchestrator::new(Arc::new(fetcher), Arc::new(oracle))
        .with_platforms(vec![bikroy])
        .with_collector_config(CollectorConfig::fast());

    let report = orchestrator.search(&filters).await.unwrap();
    assert_eq!(report.results.len(), 2);

    let recommended = report
        .results
        .iter()
        .find(|l| l.ai_insights.recommended)
        .expect("one listing flagged recommended");
    let suspicious = report
        .results
        .iter()
        .find(|l| l.ai_insights.suspicious)
        .expect("one listing flagged suspicious");
    assert_ne!(recommended.listing.title, suspicious.listing.title);
    assert!(report
        .results
        .iter()
        .any(|l| l.ai_insights.market_analysis.is_some()));
}

#[tokio::test]
async fn empty_scrape_falls_back_to_synthetic_listings() {
    let fetcher = MockFetcher::new();
    let filters = SearchFilters::for_model("Corolla").with_brand("Toyota");

    let config = CollectorConfig::default()
        .with_page_delay_ms(0, 0)
        .with_sample_fallback(true);
    let orchestrator =
        SearchOrchestrator::new(Arc::new(fetcher), Arc::new(FallbackOracle::new()))
            .with_platforms(vec![platforms::bikroy()])
            .with_collector_config(config);

    let report = orchestrator.search(&filters).await.unwrap();

    assert!(report.analysis.total_found >= 3);
    assert!(!report.results.is_empty());
    for listing in &report.results {
        assert!(listing.listing.synthetic);
        assert!(listing.numeric_price() > 0.0);
        let year = listing.listing.specs.year.expect("sample listings carry a year");
        assert!((1990..=2030).contains(&year));
    }
}

#[tokio::test]
async fn insights_summarize_final_results() {
    let fetcher = MockFetcher::new();
    let filters = corolla_filters();

    let bikroy = platforms::bikroy();
    let page = format!(
        "{}{}",
        ad_card("Toyota Corolla X 2004", "Tk 1,000,000"),
        ad_card("Toyota Corolla G 2014", "Tk 2,000,000"),
    );
    fetcher.add_page(&bikroy.build_search_url(&filters, 1), &page);

    let orchestrator = SearchOrchestrator::new(Arc::new(fetcher), Arc::new(FallbackOracle::new()))
        .with_platforms(vec![bikroy])
        .with_collector_config(CollectorConfig::fast());

    let report = orchestrator.search(&filters).await.unwrap();
    let insights = carscope::insights::summarize(&report.results, &report.recommendations)
        .expect("non-empty results summarize");

    assert_eq!(insights.market_size, 2);
    let range = insights.price_range.unwrap();
    assert_eq!(range.min, 1_000_000.0);
    assert_eq!(range.max, 2_000_000.0);
    assert_eq!(range.average, 1_500_000.0);
    assert_eq!(insights.platform_distribution["Bikroy"], 2);
}
