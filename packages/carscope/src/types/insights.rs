//! Aggregate market insights derived from a final result set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Price statistics over parsed numeric prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
    pub average: f64,
}

/// Summary statistics for one search's final results. Derived, never
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateInsights {
    /// Number of listings in the final set.
    pub market_size: usize,

    /// Min/max/mean of parsed prices (listings with unparsable prices
    /// are excluded from the statistics).
    pub price_range: Option<PriceRange>,

    /// Listing count per platform. BTreeMap for deterministic ordering.
    pub platform_distribution: BTreeMap<String, usize>,

    /// Top recommendations passed through from the engine (at most 3).
    pub recommendations: Vec<String>,
}
