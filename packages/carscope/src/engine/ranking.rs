//! Multi-factor listing scoring.

use crate::types::EnrichedListing;

use super::EngineConfig;

/// Score one listing against the candidate set's average price.
///
/// Higher wins. The price component peaks near 0.9x the average price
/// of the set (slightly-below-market is the sweet spot) and decays
/// linearly with relative deviation.
pub fn score_listing(listing: &EnrichedListing, average_price: f64, config: &EngineConfig) -> f64 {
    let mut score = 0.0;

    score += price_component(listing.numeric_price(), average_price, config);
    if let Some(match_score) = listing.match_score {
        score += (1.0 - match_score) * config.weight_match;
    }
    if let Some(semantic) = listing.semantic_score {
        score += semantic * config.weight_semantic;
    }
    score += config.platform_trust(&listing.listing.platform);

    if listing.ai_insights.recommended {
        score += config.bonus_recommended;
    }
    if listing.ai_insights.suspicious {
        score -= config.penalty_suspicious;
    }
    if listing.listing.synthetic {
        score -= config.weight_synthetic_penalty;
    }

    score += completeness_bonus(listing);
    score
}

pub fn price_component(price: f64, average_price: f64, config: &EngineConfig) -> f64 {
    if price <= 0.0 || average_price <= 0.0 {
        return 0.0;
    }
    let optimal = average_price * 0.9;
    let deviation = (price - optimal).abs() / optimal;
    (config.weight_price * (1.0 - deviation)).max(0.0)
}

fn completeness_bonus(listing: &EnrichedListing) -> f64 {
    let specs = &listing.listing.specs;
    let mut bonus = 0.0;
    if listing.listing.image_url.is_some() {
        bonus += 5.0;
    }
    if specs.year.is_some() {
        bonus += 3.0;
    }
    if specs.color.is_some() {
        bonus += 2.0;
    }
    if specs.location.is_some() {
        bonus += 2.0;
    }
    if specs.mileage_km.is_some() {
        bonus += 3.0;
    }
    bonus
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EnrichedListing, ExtractionMeta, ListingSpecs, RawListing};

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
    fn test_price_component_peaks_below_average() {
        let config = EngineConfig::default();
        let at_sweet_spot = price_component(900_000.0, 1_000_000.0, &config);
        let at_average = price_component(1_000_000.0, 1_000_000.0, &config);
        let far_above = price_component(3_000_000.0, 1_000_000.0, &config);

        assert!(at_sweet_spot > at_average);
        assert_eq!(at_sweet_spot, config.weight_price);
        assert_eq!(far_above, 0.0);
    }

    #[test]
    fn test_platform_trust_ordering() {
        let config = EngineConfig::default();
        let avg = 1_000_000.0;
        let bikroy = score_listing(&enriched("Bikroy", "৳ 900,000"), avg, &config);
        let olx = score_listing(&enriched("OLX", "৳ 900,000"), avg, &config);
        let unknown = score_listing(&enriched("Nowhere", "৳ 900,000"), avg, &config);
        assert!(bikroy > olx);
        assert!(olx > unknown);
    }

    #[test]
    fn test_insight_flags_move_score() {
        let config = EngineConfig::default();
        let avg = 1_000_000.0;

        let plain = enriched("Bikroy", "৳ 900,000");
        let mut recommended = plain.clone();
        recommended.ai_insights.recommended = true;
        let mut suspicious = plain.clone();
        suspicious.ai_insights.suspicious = true;

        let base = score_listing(&plain, avg, &config);
        assert_eq!(score_listing(&recommended, avg, &config), base + config.bonus_recommended);
        assert_eq!(score_listing(&suspicious, avg, &config), base - config.penalty_suspicious);
    }

    #[test]
    fn test_completeness_bonus() {
        let avg = 1_000_000.0;
        let config = EngineConfig::default();

        let bare = enriched("Bikroy", "৳ 900,000");
        let mut full = bare.clone();
        full.listing.image_url = Some("https://example.com/img.jpg".to_string());
        full.listing.specs = ListingSpecs {
            year: Some(2015),
            color: Some("White".to_string()),
            location: Some("Dhaka".to_string()),
            mileage_km: Some(45_000),
            transmission: None,
            fuel_type: None,
        };

        let diff = score_listing(&full, avg, &config) - score_listing(&bare, avg, &config);
        assert_eq!(diff, 15.0);
    }
}
