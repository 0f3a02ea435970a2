//! Oracle-produced search context.
//!
//! Produced once per request (by the oracle or its deterministic
//! fallback) and read-only afterward.

use serde::{Deserialize, Serialize};

/// Brand/model/year pulled out of the user's free-text query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardizedQuery {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    /// The query as the user typed it.
    pub original: String,
}

/// Result of query enhancement: standardized fields plus expansion terms.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryEnhancement {
    pub standardized: StandardizedQuery,

    /// Alternative spellings / near models, e.g. "carolla" for "corolla".
    #[serde(default)]
    pub alternatives: Vec<String>,

    /// Terms worth matching titles against.
    #[serde(default)]
    pub search_terms: Vec<String>,
}

/// Predicted market price range for the requested car.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricePrediction {
    pub min_price: f64,
    pub max_price: f64,
    pub average_price: f64,
    /// "high" / "medium" / "low".
    pub confidence: String,
    #[serde(default)]
    pub factors: Vec<String>,
    pub recommendation: Option<String>,
}

/// Everything the oracle contributed for one request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchContext {
    pub enhancement: QueryEnhancement,

    /// Absent when the oracle is unavailable; callers must skip
    /// prediction-based price narrowing in that case.
    pub price_prediction: Option<PricePrediction>,
}

impl SearchContext {
    /// All terms worth fuzzy-matching titles against, deduplicated,
    /// shortest-first ordering preserved from insertion.
    pub fn all_search_terms(&self) -> Vec<String> {
        let mut terms: Vec<String> = Vec::new();
        let mut push = |t: &str| {
            let t = t.trim();
            if t.len() >= 2 && !terms.iter().any(|s| s.eq_ignore_ascii_case(t)) {
                terms.push(t.to_string());
            }
        };
        for t in &self.enhancement.search_terms {
            push(t);
        }
        for t in &self.enhancement.alternatives {
            push(t);
        }
        terms
    }
}
