//! The aggregated response handed to the API layer.

use serde::{Deserialize, Serialize};

use super::context::{PricePrediction, QueryEnhancement};
use super::listing::EnrichedListing;

/// One narrative recommendation produced by the oracle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    /// Index into the result list this recommendation refers to.
    pub car_index: usize,
    pub reason: String,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
    /// 1-10 score.
    pub score: u8,
}

/// How the raw collection was narrowed down.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchAnalysis {
    /// Raw listings collected across all platforms.
    pub total_found: usize,

    /// Listings that survived the matching/ranking engine.
    pub after_filtering: usize,

    /// Oracle price prediction, when one was available.
    pub price_prediction: Option<PricePrediction>,

    /// How the query was standardized and expanded.
    pub search_enhancement: QueryEnhancement,
}

/// Final output of one aggregated search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchReport {
    pub results: Vec<EnrichedListing>,
    pub analysis: SearchAnalysis,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
}
