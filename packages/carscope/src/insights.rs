//! Aggregate insights over a final result set.

use std::collections::BTreeMap;

use crate::types::{AggregateInsights, EnrichedListing, PriceRange, Recommendation};

/// Summarize a final result set for reporting.
///
/// Returns `None` for an empty set so callers never divide by zero.
/// Listings with unparsable prices still count toward market size and
/// platform distribution but are excluded from the price statistics.
pub fn summarize(
    results: &[EnrichedListing],
    recommendations: &[Recommendation],
) -> Option<AggregateInsights> {
    if results.is_empty() {
        return None;
    }

    let prices: Vec<f64> = results
        .iter()
        .map(|l| l.numeric_price())
        .filter(|p| *p > 0.0)
        .collect();

    let price_range = if prices.is_empty() {
        None
    } else {
        let min = prices.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = prices.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let average = prices.iter().sum::<f64>() / prices.len() as f64;
        Some(PriceRange { min, max, average })
    };

    let mut platform_distribution: BTreeMap<String, usize> = BTreeMap::new();
    for listing in results {
        *platform_distribution
            .entry(listing.listing.platform.clone())
            .or_default() += 1;
    }

    Some(AggregateInsights {
        market_size: results.len(),
        price_range,
        platform_distribution,
        recommendations: recommendations.iter().take(3).map(|r| r.reason.clone()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ExtractionMeta, RawListing};

    fn enriched(platform: &str, price: &str) -> EnrichedListing {
        EnrichedListing::from_raw(RawListing::new(
            platform,
            "Toyota Corolla 2015",
            price,
            "https://example.com/ad",
            ExtractionMeta::new("test", 1),
        ))
    }

    #[test]
    fn test_empty_set_yields_none() {
        assert!(summarize(&[], &[]).is_none());
    }

    #[test]
    fn test_price_statistics_and_distribution() {
        let results = vec![
            enriched("Bikroy", "৳ 1,000,000"),
            enriched("Bikroy", "৳ 2,000,000"),
            enriched("OLX", "৳ 1,500,000"),
        ];

        let insights = summarize(&results, &[]).unwrap();
        assert_eq!(insights.market_size, 3);

        let range = insights.price_range.unwrap();
        assert_eq!(range.min, 1_000_000.0);
        assert_eq!(range.max, 2_000_000.0);
        assert_eq!(range.average, 1_500_000.0);

        assert_eq!(insights.platform_distribution["Bikroy"], 2);
        assert_eq!(insights.platform_distribution["OLX"], 1);
    }

    #[test]
    fn test_unparsable_prices_excluded_from_statistics() {
        let results = vec![enriched("Bikroy", "negotiable")];
        let insights = summarize(&results, &[]).unwrap();
        assert_eq!(insights.market_size, 1);
        assert!(insights.price_range.is_none());
    }

    #[test]
    fn test_recommendations_capped_at_three() {
        let results = vec![enriched("Bikroy", "৳ 1,000,000")];
        let recommendations: Vec<Recommendation> = (0..5)
            .map(|i| Recommendation {
                car_index: 0,
                reason: format!("pick {i}"),
                pros: vec![],
                cons: vec![],
                score: 8,
            })
            .collect();

        let insights = summarize(&results, &recommendations).unwrap();
        assert_eq!(insights.recommendations.len(), 3);
    }
}
