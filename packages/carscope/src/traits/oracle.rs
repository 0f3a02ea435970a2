//! Query/price oracle trait.
//!
//! The oracle is an external advisory service (LLM-backed in
//! production). Every call is optional: callers wrap invocations in a
//! timeout and degrade to the deterministic [`FallbackOracle`] behavior
//! on any failure, surfacing it only as lower confidence.
//!
//! [`FallbackOracle`]: crate::oracle::FallbackOracle

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::OracleResult;
use crate::types::{
    EnrichedListing, PricePrediction, QueryEnhancement, Recommendation, SearchFilters,
};

/// Output of anomaly analysis over a leading subset of listings.
///
/// Indices refer to positions in the slice that was analyzed;
/// out-of-range indices are treated as oracle failure by callers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub average_price: Option<f64>,
    pub suspicious_listings: Vec<usize>,
    pub recommended_listings: Vec<usize>,
    pub market_insights: Option<String>,
}

/// Advisory oracle for query standardization, price prediction,
/// anomaly flags, and recommendations.
#[async_trait]
pub trait SearchOracle: Send + Sync {
    /// Standardize and expand the user's free-text query.
    async fn enhance_query(&self, query: &str) -> OracleResult<QueryEnhancement>;

    /// Predict a plausible market price range for the filtered car.
    ///
    /// `Ok(None)` means "no prediction available" and callers must skip
    /// prediction-based price narrowing.
    async fn predict_price(&self, filters: &SearchFilters)
        -> OracleResult<Option<PricePrediction>>;

    /// Flag suspicious / recommended listings among the first ten.
    async fn analyze_anomalies(&self, listings: &[EnrichedListing])
        -> OracleResult<AnomalyReport>;

    /// Up to three narrative recommendations over the first five results.
    async fn recommend(
        &self,
        filters: &SearchFilters,
        listings: &[EnrichedListing],
    ) -> OracleResult<Vec<Recommendation>>;

    /// Oracle name for logging.
    fn name(&self) -> &str {
        "unknown"
    }
}
