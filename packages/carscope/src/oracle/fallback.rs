//! Deterministic local oracle fallback.
//!
//! Brand/model extraction via fixed keyword tables, year via a 4-digit
//! pattern, and alternatives via a static synonym table. Price
//! prediction has no local equivalent and returns `None`, which makes
//! the engine skip prediction-based price narrowing.

use async_trait::async_trait;

use crate::error::OracleResult;
use crate::extract::heuristics::extract_year;
use crate::traits::oracle::{AnomalyReport, SearchOracle};
use crate::types::{
    EnrichedListing, PricePrediction, QueryEnhancement, Recommendation, SearchFilters,
    StandardizedQuery,
};

const KNOWN_BRANDS: &[&str] = &[
    "toyota", "honda", "suzuki", "nissan", "mitsubishi", "hyundai", "bmw", "mercedes", "audi",
    "ford", "mazda",
];

const KNOWN_MODELS: &[&str] = &[
    "corolla", "civic", "swift", "vitz", "axio", "allion", "premio", "fit", "vezel", "x-trail",
    "cr-v", "rav4",
];

/// Common misspellings and near-synonyms seen in marketplace titles.
const SYNONYMS: &[(&str, &[&str])] = &[
    ("corolla", &["corolla", "carolla", "corola"]),
    ("civic", &["civic", "civick"]),
    ("swift", &["swift", "suzuki swift"]),
    ("vitz", &["vitz", "toyota vitz", "yaris"]),
    ("axio", &["axio", "toyota axio", "corolla axio"]),
    ("allion", &["allion", "toyota allion"]),
    ("premio", &["premio", "toyota premio"]),
];

/// The deterministic, always-available oracle.
#[derive(Debug, Clone, Default)]
pub struct FallbackOracle;

impl FallbackOracle {
    pub fn new() -> Self {
        Self
    }

    fn extract_brand(query: &str) -> Option<String> {
        let lower = query.to_lowercase();
        KNOWN_BRANDS
            .iter()
            .find(|b| lower.contains(*b))
            .map(|b| capitalize(b))
    }

    fn extract_model(query: &str) -> Option<String> {
        let lower = query.to_lowercase();
        KNOWN_MODELS
            .iter()
            .find(|m| lower.contains(*m))
            .map(|m| capitalize(m))
    }

    fn alternatives_for(query: &str) -> Vec<String> {
        let lower = query.to_lowercase();
        SYNONYMS
            .iter()
            .find(|(key, _)| lower.contains(key))
            .map(|(_, alts)| alts.iter().map(|s| s.to_string()).collect())
            .unwrap_or_default()
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[async_trait]
impl SearchOracle for FallbackOracle {
    async fn enhance_query(&self, query: &str) -> OracleResult<QueryEnhancement> {
        let alternatives = Self::alternatives_for(query);

        let mut search_terms = vec![query.to_string()];
        for alt in &alternatives {
            if !search_terms.iter().any(|t| t.eq_ignore_ascii_case(alt)) {
                search_terms.push(alt.clone());
            }
        }

        Ok(QueryEnhancement {
            standardized: StandardizedQuery {
                brand: Self::extract_brand(query),
                model: Self::extract_model(query),
                year: extract_year(query),
                original: query.to_string(),
            },
            alternatives,
            search_terms,
        })
    }

    async fn predict_price(
        &self,
        _filters: &SearchFilters,
    ) -> OracleResult<Option<PricePrediction>> {
        Ok(None)
    }

    async fn analyze_anomalies(
        &self,
        _listings: &[EnrichedListing],
    ) -> OracleResult<AnomalyReport> {
        Ok(AnomalyReport::default())
    }

    async fn recommend(
        &self,
        _filters: &SearchFilters,
        _listings: &[EnrichedListing],
    ) -> OracleResult<Vec<Recommendation>> {
        Ok(Vec::new())
    }

    fn name(&self) -> &str {
        "fallback"
    }
}
