//! OpenAI-backed oracle implementation.
//!
//! Uses the chat-completions API with JSON-shaped prompts. Any response
//! that is not the expected JSON contract (including out-of-range
//! listing indices) is an oracle failure; callers fall back locally.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{OracleError, OracleResult};
use crate::traits::oracle::{AnomalyReport, SearchOracle};
use crate::types::{
    EnrichedListing, PricePrediction, QueryEnhancement, Recommendation, SearchFilters,
};

/// Chat-completions oracle client.
#[derive(Clone)]
pub struct OpenAiOracle {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiOracle {
    /// Create a new oracle client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    /// Create from the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> OracleResult<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| OracleError::Unavailable("OPENAI_API_KEY not set".to_string()))?;
        Ok(Self::new(api_key))
    }

    /// Set the chat model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL (for proxies, compatible providers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// One chat call returning the assistant message content.
    async fn chat(&self, prompt: &str, temperature: f32) -> OracleResult<String> {
        #[derive(Serialize)]
        struct Message<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Request<'a> {
            model: &'a str,
            messages: Vec<Message<'a>>,
            temperature: f32,
            response_format: serde_json::Value,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMessage,
        }
        #[derive(Deserialize)]
        struct ChoiceMessage {
            content: String,
        }
        #[derive(Deserialize)]
        struct Response {
            choices: Vec<Choice>,
        }

        let request = Request {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            temperature,
            response_format: serde_json::json!({"type": "json_object"}),
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| OracleError::Request(Box::new(e)))?;

        if !response.status().is_success() {
            return Err(OracleError::Request(
                format!("status {}", response.status()).into(),
            ));
        }

        let parsed: Response = response
            .json()
            .await
            .map_err(|e| OracleError::MalformedResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| OracleError::MalformedResponse("empty choices".to_string()))
    }
}

#[async_trait]
impl SearchOracle for OpenAiOracle {
    async fn enhance_query(&self, query: &str) -> OracleResult<QueryEnhancement> {
        let prompt = format!(
            "You are a car search expert for the Bangladesh market. The user is \
             searching for: \"{query}\". Extract and standardize brand, model and \
             year, and suggest alternative spellings or similar models. Return JSON: \
             {{\"standardized\": {{\"brand\": string|null, \"model\": string|null, \
             \"year\": number|null, \"original\": \"{query}\"}}, \
             \"alternatives\": [string], \"search_terms\": [string]}}"
        );

        let content = self.chat(&prompt, 0.3).await?;
        let enhancement: QueryEnhancement = serde_json::from_str(&content)?;
        debug!(query, terms = enhancement.search_terms.len(), "query enhanced");
        Ok(enhancement)
    }

    async fn predict_price(
        &self,
        filters: &SearchFilters,
    ) -> OracleResult<Option<PricePrediction>> {
        let prompt = format!(
            "Predict a reasonable price range in BDT for this car on the Bangladesh \
             market. Brand: {}. Model: {}. Year: {}. Location: {}. Consider current \
             market conditions, depreciation, and import duties. Return JSON: \
             {{\"min_price\": number, \"max_price\": number, \"average_price\": number, \
             \"confidence\": \"high\"|\"medium\"|\"low\", \"factors\": [string], \
             \"recommendation\": string}}",
            filters.brand.as_deref().unwrap_or("Unknown"),
            filters.model,
            filters.year.map_or_else(|| "Unknown".to_string(), |y| y.to_string()),
            filters.location.as_deref().unwrap_or("Dhaka"),
        );

        let content = self.chat(&prompt, 0.3).await?;
        let prediction: PricePrediction = serde_json::from_str(&content)?;
        Ok(Some(prediction))
    }

    async fn analyze_anomalies(
        &self,
        listings: &[EnrichedListing],
    ) -> OracleResult<AnomalyReport> {
        let sample: Vec<serde_json::Value> = listings
            .iter()
            .take(10)
            .map(|l| {
                serde_json::json!({
                    "platform": l.listing.platform,
                    "title": l.listing.title.chars().take(50).collect::<String>(),
                    "price": l.numeric_price(),
                })
            })
            .collect();

        let prompt = format!(
            "Analyze these car prices for anomalies in the Bangladesh market: {}. \
             Identify suspiciously low prices (possible scams) and the best-value \
             listings. Return JSON: {{\"average_price\": number, \
             \"suspicious_listings\": [index], \"recommended_listings\": [index], \
             \"market_insights\": string}}",
            serde_json::to_string(&sample)?,
        );

        let content = self.chat(&prompt, 0.2).await?;
        let report: AnomalyReport = serde_json::from_str(&content)?;

        // Out-of-range indices mean the model ignored the contract
        let limit = sample.len();
        if report
            .suspicious_listings
            .iter()
            .chain(report.recommended_listings.iter())
            .any(|&i| i >= limit)
        {
            return Err(OracleError::MalformedResponse(
                "listing index out of range".to_string(),
            ));
        }

        Ok(report)
    }

    async fn recommend(
        &self,
        filters: &SearchFilters,
        listings: &[EnrichedListing],
    ) -> OracleResult<Vec<Recommendation>> {
        #[derive(Deserialize)]
        struct RecommendationResponse {
            #[serde(default)]
            recommendations: Vec<Recommendation>,
        }

        let sample: Vec<serde_json::Value> = listings
            .iter()
            .take(5)
            .map(|l| {
                serde_json::json!({
                    "title": l.listing.title,
                    "price": l.listing.price_text,
                    "platform": l.listing.platform,
                    "specs": l.listing.specs,
                })
            })
            .collect();

        let prompt = format!(
            "Based on these user preferences: {} and available cars: {}, generate up \
             to 3 personalized recommendations. Return JSON: {{\"recommendations\": \
             [{{\"car_index\": number, \"reason\": string, \"pros\": [string], \
             \"cons\": [string], \"score\": number}}]}}",
            serde_json::to_string(filters)?,
            serde_json::to_string(&sample)?,
        );

        let content = self.chat(&prompt, 0.4).await?;
        let response: RecommendationResponse = serde_json::from_str(&content)?;

        let limit = sample.len();
        if response.recommendations.iter().any(|r| r.car_index >= limit) {
            return Err(OracleError::MalformedResponse(
                "car index out of range".to_string(),
            ));
        }

        Ok(response.recommendations.into_iter().take(3).collect())
    }

    fn name(&self) -> &str {
        "openai"
    }
}
