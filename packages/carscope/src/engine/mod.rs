//! Matching and ranking engine.
//!
//! Turns the orchestrator's flattened raw listings into a ranked,
//! deduplicated result set. Stages run in a fixed order and each
//! operates on the previous stage's output:
//!
//! 1. basic validity filter (title/price present)
//! 2. fuzzy query match, with a lenient keyword fallback
//! 3. semantic token-overlap scoring
//! 4. price filtering and prediction-range flagging
//! 5. cross-source duplicate removal
//! 6. oracle anomaly annotation (advisory, never drops)
//! 7. multi-factor ranking
//! 8. oracle recommendations over the leading results
//!
//! A dropped listing is terminal; no stage reinstates records.

pub mod ranking;
pub mod text;

use std::time::Duration;

use tracing::{debug, info};

use crate::oracle::{with_fallback, DEFAULT_ORACLE_TIMEOUT};
use crate::traits::oracle::{AnomalyReport, SearchOracle};
use crate::types::{
    EnrichedListing, RawListing, Recommendation, SearchContext, SearchFilters,
};

/// Thresholds and weights for the engine stages.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Fuzzy distances at or above this are dropped (0 best, 1 worst).
    pub fuzzy_keep_threshold: f64,

    /// Semantic similarity at or below this is dropped.
    pub semantic_floor: f64,

    /// Title similarity above this marks a cross-source duplicate.
    pub duplicate_threshold: f64,

    /// Relative buffer around the predicted price range before a
    /// listing is flagged.
    pub prediction_buffer: f64,

    /// Leading listings sent to anomaly analysis.
    pub anomaly_sample: usize,

    /// Leading listings that receive market commentary.
    pub market_analysis_count: usize,

    /// Leading ranked listings sent to recommendation generation.
    pub recommendation_sample: usize,

    /// Cap on returned recommendations.
    pub max_recommendations: usize,

    pub weight_price: f64,
    pub weight_match: f64,
    pub weight_semantic: f64,
    pub bonus_recommended: f64,
    pub penalty_suspicious: f64,

    /// Score subtracted from synthetic sample listings so real scraped
    /// data outranks generated fallback data. Zero disables it.
    pub weight_synthetic_penalty: f64,

    /// Static source-reliability table, checked case-insensitively.
    pub platform_trust: Vec<(String, f64)>,

    /// Trust score for platforms absent from the table.
    pub default_trust: f64,

    /// Time budget per oracle call.
    pub oracle_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fuzzy_keep_threshold: 0.95,
            semantic_floor: 0.1,
            duplicate_threshold: 0.9,
            prediction_buffer: 0.5,
            anomaly_sample: 10,
            market_analysis_count: 3,
            recommendation_sample: 5,
            max_recommendations: 3,
            weight_price: 20.0,
            weight_match: 30.0,
            weight_semantic: 20.0,
            bonus_recommended: 15.0,
            penalty_suspicious: 10.0,
            weight_synthetic_penalty: 0.0,
            platform_trust: vec![
                ("Bikroy".to_string(), 25.0),
                ("Carmudi".to_string(), 20.0),
                ("OLX".to_string(), 15.0),
                ("CarDekho".to_string(), 10.0),
            ],
            default_trust: 5.0,
            oracle_timeout: DEFAULT_ORACLE_TIMEOUT,
        }
    }
}

impl EngineConfig {
    /// Set the synthetic-listing ranking penalty.
    pub fn with_synthetic_penalty(mut self, penalty: f64) -> Self {
        self.weight_synthetic_penalty = penalty;
        self
    }

    /// Set the fuzzy drop threshold.
    pub fn with_fuzzy_threshold(mut self, threshold: f64) -> Self {
        self.fuzzy_keep_threshold = threshold;
        self
    }

    /// Set the per-call oracle time budget.
    pub fn with_oracle_timeout(mut self, timeout: Duration) -> Self {
        self.oracle_timeout = timeout;
        self
    }

    /// Trust score for a platform name.
    pub fn platform_trust(&self, platform: &str) -> f64 {
        self.platform_trust
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(platform))
            .map_or(self.default_trust, |(_, trust)| *trust)
    }
}

/// Final engine output: ranked results plus narrative recommendations.
#[derive(Debug, Default)]
pub struct EngineOutput {
    pub results: Vec<EnrichedListing>,
    pub recommendations: Vec<Recommendation>,
}

/// The matching and ranking engine.
#[derive(Debug, Clone, Default)]
pub struct MatchingEngine {
    config: EngineConfig,
}

impl MatchingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Run all stages over the flattened raw listings.
    pub async fn process(
        &self,
        oracle: &dyn SearchOracle,
        raw: Vec<RawListing>,
        filters: &SearchFilters,
        context: &SearchContext,
    ) -> EngineOutput {
        let total = raw.len();

        let valid = self.basic_filter(raw);
        debug!(total, valid = valid.len(), "basic filter applied");

        let matched = self.fuzzy_match(valid, filters, context);
        if matched.is_empty() {
            info!(total, "no listings survived matching");
            return EngineOutput::default();
        }

        let scored = self.semantic_filter(matched, filters);
        let priced = self.price_filter(scored, filters, context);
        let mut unique = self.dedup_cross_source(priced);

        self.annotate_anomalies(oracle, &mut unique).await;
        self.rank(&mut unique);

        let recommendations = self.recommend(oracle, filters, &unique).await;

        info!(
            total,
            results = unique.len(),
            recommendations = recommendations.len(),
            "engine finished"
        );
        EngineOutput {
            results: unique,
            recommendations,
        }
    }

    /// Drop placeholder titles and empty or zero prices. Color and
    /// location are deliberately not filtered here.
    fn basic_filter(&self, raw: Vec<RawListing>) -> Vec<EnrichedListing> {
        raw.into_iter()
            .filter(|l| l.title.trim().len() >= 3)
            .filter(|l| !l.price_text.trim().is_empty() && l.numeric_price() != 0.0)
            .map(EnrichedListing::from_raw)
            .collect()
    }

    /// Keep candidates whose best fuzzy distance against any search
    /// term beats the threshold, tagged with the winning term. Falls
    /// back to plain keyword containment when nothing matches.
    fn fuzzy_match(
        &self,
        candidates: Vec<EnrichedListing>,
        filters: &SearchFilters,
        context: &SearchContext,
    ) -> Vec<EnrichedListing> {
        let mut terms = vec![filters.model.clone()];
        if let Some(brand) = &filters.brand {
            terms.push(brand.clone());
        }
        for term in context.all_search_terms() {
            if !terms.iter().any(|t| t.eq_ignore_ascii_case(&term)) {
                terms.push(term);
            }
        }

        let mut matched: Vec<EnrichedListing> = Vec::new();
        let mut rest: Vec<EnrichedListing> = Vec::new();
        for mut listing in candidates {
            let best = terms
                .iter()
                .map(|term| (text::match_distance(&listing.listing.title, term), term))
                .min_by(|a, b| a.0.total_cmp(&b.0));

            match best {
                Some((distance, term)) if distance < self.config.fuzzy_keep_threshold => {
                    listing.match_score = Some(distance);
                    listing.matched_term = Some(term.clone());
                    matched.push(listing);
                }
                _ => rest.push(listing),
            }
        }

        if !matched.is_empty() {
            matched.sort_by(|a, b| {
                a.match_score
                    .unwrap_or(1.0)
                    .total_cmp(&b.match_score.unwrap_or(1.0))
            });
            return matched;
        }

        debug!("fuzzy match empty, applying lenient keyword filter");
        self.lenient_filter(rest, filters)
    }

    /// Keep any listing whose title contains a keyword from the model
    /// or brand terms.
    fn lenient_filter(
        &self,
        candidates: Vec<EnrichedListing>,
        filters: &SearchFilters,
    ) -> Vec<EnrichedListing> {
        let mut keywords: Vec<String> = filters
            .model
            .split_whitespace()
            .map(|w| w.to_lowercase())
            .collect();
        if let Some(brand) = &filters.brand {
            keywords.extend(brand.split_whitespace().map(|w| w.to_lowercase()));
        }
        keywords.retain(|k| k.len() > 2);

        candidates
            .into_iter()
            .filter_map(|mut listing| {
                let title = listing.listing.title.to_lowercase();
                let hit = keywords.iter().find(|k| title.contains(k.as_str()))?;
                listing.match_score = Some(0.5);
                listing.matched_term = Some(hit.clone());
                Some(listing)
            })
            .collect()
    }

    /// Tag token-overlap similarity against the query and drop weak
    /// candidates. If that would drop everything, the scored set passes
    /// through unfiltered.
    fn semantic_filter(
        &self,
        candidates: Vec<EnrichedListing>,
        filters: &SearchFilters,
    ) -> Vec<EnrichedListing> {
        let query = match &filters.brand {
            Some(brand) => format!("{brand} {}", filters.model),
            None => filters.model.clone(),
        };

        let scored: Vec<EnrichedListing> = candidates
            .into_iter()
            .map(|mut listing| {
                listing.semantic_score =
                    Some(text::token_overlap_similarity(&listing.listing.title, &query));
                listing
            })
            .collect();

        let kept: Vec<EnrichedListing> = scored
            .iter()
            .filter(|l| l.semantic_score.unwrap_or(0.0) > self.config.semantic_floor)
            .cloned()
            .collect();

        if kept.is_empty() && !scored.is_empty() {
            debug!("semantic filter would drop all candidates, keeping scored set");
            return scored;
        }
        kept
    }

    /// Drop non-positive prices and apply user bounds as hard cutoffs.
    /// An oracle prediction only flags, never drops.
    fn price_filter(
        &self,
        candidates: Vec<EnrichedListing>,
        filters: &SearchFilters,
        context: &SearchContext,
    ) -> Vec<EnrichedListing> {
        if filters.price_range_selects_none() {
            return Vec::new();
        }

        let buffer = self.config.prediction_buffer;
        candidates
            .into_iter()
            .filter_map(|mut listing| {
                let price = listing.numeric_price();
                if price <= 0.0 {
                    return None;
                }
                if let Some(min) = filters.min_price {
                    if price < min {
                        return None;
                    }
                }
                if let Some(max) = filters.max_price {
                    if price > max {
                        return None;
                    }
                }
                if let Some(prediction) = &context.price_prediction {
                    let low = prediction.min_price * (1.0 - buffer);
                    let high = prediction.max_price * (1.0 + buffer);
                    if price < low || price > high {
                        listing.price_flag = Some("outside_predicted_range".to_string());
                    }
                }
                Some(listing)
            })
            .collect()
    }

    /// Remove near-identical titles across sources, keeping the first
    /// occurrence. Idempotent: survivors are pairwise dissimilar.
    fn dedup_cross_source(&self, candidates: Vec<EnrichedListing>) -> Vec<EnrichedListing> {
        let mut unique: Vec<EnrichedListing> = Vec::new();
        let mut accepted_titles: Vec<String> = Vec::new();

        for listing in candidates {
            let title = listing.listing.title.to_lowercase();
            let duplicate = accepted_titles
                .iter()
                .any(|seen| strsim::sorensen_dice(seen, &title) > self.config.duplicate_threshold);
            if !duplicate {
                accepted_titles.push(title);
                unique.push(listing);
            }
        }
        unique
    }

    /// Advisory anomaly annotation over the leading listings. Oracle
    /// failure leaves everything unannotated.
    async fn annotate_anomalies(&self, oracle: &dyn SearchOracle, results: &mut [EnrichedListing]) {
        if results.is_empty() {
            return;
        }
        let sample_len = results.len().min(self.config.anomaly_sample);
        let sample = results[..sample_len].to_vec();

        let report = with_fallback(
            "analyze_anomalies",
            self.config.oracle_timeout,
            oracle.analyze_anomalies(&sample),
            AnomalyReport::default,
        )
        .await;

        for &idx in &report.suspicious_listings {
            if let Some(listing) = results.get_mut(idx) {
                listing.ai_insights.suspicious = true;
            }
        }
        for &idx in &report.recommended_listings {
            if let Some(listing) = results.get_mut(idx) {
                listing.ai_insights.recommended = true;
            }
        }
        if let Some(insights) = &report.market_insights {
            for listing in results.iter_mut().take(self.config.market_analysis_count) {
                listing.ai_insights.market_analysis = Some(insights.clone());
            }
        }
    }

    /// Score and stable-sort descending. Ties keep the platform
    /// flattening order.
    fn rank(&self, results: &mut Vec<EnrichedListing>) {
        let priced: Vec<f64> = results
            .iter()
            .map(|l| l.numeric_price())
            .filter(|p| *p > 0.0)
            .collect();
        let average = if priced.is_empty() {
            0.0
        } else {
            priced.iter().sum::<f64>() / priced.len() as f64
        };

        for listing in results.iter_mut() {
            let price_component =
                ranking::price_component(listing.numeric_price(), average, &self.config);
            let normalized = (price_component / self.config.weight_price * 100.0).round();
            listing.ai_insights.price_score = Some(normalized.clamp(0.0, 100.0) as u8);
        }

        let mut indexed: Vec<(f64, EnrichedListing)> = results
            .drain(..)
            .map(|l| (ranking::score_listing(&l, average, &self.config), l))
            .collect();
        indexed.sort_by(|a, b| b.0.total_cmp(&a.0));
        results.extend(indexed.into_iter().map(|(_, l)| l));
    }

    /// Narrative recommendations over the leading ranked results.
    /// Empty on oracle failure, never an error.
    async fn recommend(
        &self,
        oracle: &dyn SearchOracle,
        filters: &SearchFilters,
        results: &[EnrichedListing],
    ) -> Vec<Recommendation> {
        if results.is_empty() {
            return Vec::new();
        }
        let sample_len = results.len().min(self.config.recommendation_sample);
        let sample = &results[..sample_len];

        let mut recommendations = with_fallback(
            "recommend",
            self.config.oracle_timeout,
            oracle.recommend(filters, sample),
            Vec::new,
        )
        .await;
        recommendations.truncate(self.config.max_recommendations);
        recommendations
    }
}
