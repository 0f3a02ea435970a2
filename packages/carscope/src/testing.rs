//! Mock oracle for testing.
//!
//! Canned responses plus call tracking, so tests can script oracle
//! behavior (including failures and slow calls) and assert which
//! advisory stages actually ran.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{OracleError, OracleResult};
use crate::traits::oracle::{AnomalyReport, SearchOracle};
use crate::types::{
    EnrichedListing, PricePrediction, QueryEnhancement, Recommendation, SearchFilters,
};

/// Scriptable oracle returning pre-configured responses.
///
/// All methods default to benign empty responses. `failing()` makes
/// every call error, `with_delay` makes every call sleep first so
/// timeout handling can be exercised.
#[derive(Clone, Default)]
pub struct MockOracle {
    enhancement: Option<QueryEnhancement>,
    prediction: Option<PricePrediction>,
    anomaly_report: Option<AnomalyReport>,
    recommendations: Vec<Recommendation>,
    fail_all: bool,
    delay: Option<Duration>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// An oracle whose every call errors.
    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Default::default()
        }
    }

    /// Canned query enhancement.
    pub fn with_enhancement(mut self, enhancement: QueryEnhancement) -> Self {
        self.enhancement = Some(enhancement);
        self
    }

    /// Canned price prediction.
    pub fn with_prediction(mut self, prediction: PricePrediction) -> Self {
        self.prediction = Some(prediction);
        self
    }

    /// Canned anomaly report.
    pub fn with_anomaly_report(mut self, report: AnomalyReport) -> Self {
        self.anomaly_report = Some(report);
        self
    }

    /// Canned recommendations.
    pub fn with_recommendations(mut self, recommendations: Vec<Recommendation>) -> Self {
        self.recommendations = recommendations;
        self
    }

    /// Sleep before answering every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Names of the oracle methods invoked, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    async fn record(&self, method: &str) -> OracleResult<()> {
        self.calls.write().unwrap().push(method.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_all {
            return Err(OracleError::Unavailable("scripted failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SearchOracle for MockOracle {
    async fn enhance_query(&self, query: &str) -> OracleResult<QueryEnhancement> {
        self.record("enhance_query").await?;
        Ok(self.enhancement.clone().unwrap_or_else(|| QueryEnhancement {
            standardized: crate::types::StandardizedQuery {
                original: query.to_string(),
                ..Default::default()
            },
            alternatives: vec![],
            search_terms: vec![query.to_string()],
        }))
    }

    async fn predict_price(
        &self,
        _filters: &SearchFilters,
    ) -> OracleResult<Option<PricePrediction>> {
        self.record("predict_price").await?;
        Ok(self.prediction.clone())
    }

    async fn analyze_anomalies(
        &self,
        _listings: &[EnrichedListing],
    ) -> OracleResult<AnomalyReport> {
        self.record("analyze_anomalies").await?;
        Ok(self.anomaly_report.clone().unwrap_or_default())
    }

    async fn recommend(
        &self,
        _filters: &SearchFilters,
        _listings: &[EnrichedListing],
    ) -> OracleResult<Vec<Recommendation>> {
        self.record("recommend").await?;
        Ok(self.recommendations.clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_records_calls() {
        let oracle = MockOracle::new();
        let filters = SearchFilters::for_model("Corolla");

        oracle.enhance_query("corolla").await.unwrap();
        oracle.predict_price(&filters).await.unwrap();
        assert_eq!(oracle.calls(), vec!["enhance_query", "predict_price"]);
    }

    #[tokio::test]
    async fn test_failing_mock_errors_every_call() {
        let oracle = MockOracle::failing();
        assert!(oracle.enhance_query("corolla").await.is_err());
        assert_eq!(oracle.calls().len(), 1);
    }
}
