//! Scraped listing records and their enriched form.

use serde::{Deserialize, Serialize};

use crate::price::parse_price;

/// Confidence tag attached to each extracted field or record.
///
/// `High` means a direct selector hit, `Medium` a fallback heuristic,
/// `Low` a weak last-resort fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
    None,
}

/// Gearbox type parsed from listing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transmission {
    Automatic,
    Manual,
}

/// Structured specs pulled out of a listing's text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingSpecs {
    pub year: Option<i32>,
    pub color: Option<String>,
    pub location: Option<String>,
    pub mileage_km: Option<u32>,
    pub transmission: Option<Transmission>,
    pub fuel_type: Option<String>,
}

/// How a listing was extracted from its page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionMeta {
    /// Name of the selector strategy (or heuristic) that produced it.
    pub strategy: String,

    /// Title extraction confidence.
    pub confidence: Confidence,

    /// Price extraction confidence.
    pub price_confidence: Confidence,

    /// 1-based page the listing came from.
    pub page_number: u32,
}

impl ExtractionMeta {
    pub fn new(strategy: impl Into<String>, page_number: u32) -> Self {
        Self {
            strategy: strategy.into(),
            confidence: Confidence::High,
            price_confidence: Confidence::High,
            page_number,
        }
    }
}

/// One scraped car advertisement, immutable once produced.
///
/// Downstream stages never mutate a `RawListing` in place; enrichment
/// produces a new [`EnrichedListing`] value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawListing {
    /// Marketplace the listing came from.
    pub platform: String,

    /// Advertisement title.
    pub title: String,

    /// Price in marketplace-native text form, e.g. "৳ 1,275,000" or "12 lakh".
    pub price_text: String,

    /// Link to the advertisement.
    pub link: String,

    /// Primary image, when one was found.
    pub image_url: Option<String>,

    /// Structured specs parsed from the listing text.
    #[serde(default)]
    pub specs: ListingSpecs,

    /// How this record was extracted.
    pub extraction: ExtractionMeta,

    /// True when the record was generated as sample fallback data rather
    /// than scraped. Downstream ranking can discount these.
    #[serde(default)]
    pub synthetic: bool,
}

impl RawListing {
    /// Create a listing with the mandatory fields.
    pub fn new(
        platform: impl Into<String>,
        title: impl Into<String>,
        price_text: impl Into<String>,
        link: impl Into<String>,
        extraction: ExtractionMeta,
    ) -> Self {
        Self {
            platform: platform.into(),
            title: title.into(),
            price_text: price_text.into(),
            link: link.into(),
            image_url: None,
            specs: ListingSpecs::default(),
            extraction,
            synthetic: false,
        }
    }

    /// Set the image URL.
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Set the specs.
    pub fn with_specs(mut self, specs: ListingSpecs) -> Self {
        self.specs = specs;
        self
    }

    /// Mark as synthetic sample data.
    pub fn synthetic(mut self) -> Self {
        self.synthetic = true;
        self
    }

    /// Numeric price parsed from the native text, 0.0 when unparsable.
    pub fn numeric_price(&self) -> f64 {
        parse_price(&self.price_text)
    }

    /// Normalized dedup key: lowercased, whitespace-collapsed,
    /// punctuation-stripped title plus digits-only price.
    pub fn dedup_key(&self) -> String {
        let title: String = self
            .title
            .to_lowercase()
            .chars()
            .map(|c| if c.is_whitespace() { ' ' } else { c })
            .filter(|c| c.is_alphanumeric() || *c == ' ')
            .collect();
        let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
        let price: String = self.price_text.chars().filter(|c| c.is_ascii_digit()).collect();
        format!("{title}-{price}")
    }
}

/// Advisory annotations attached by the oracle stages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiInsights {
    /// Flagged as a good pick by anomaly analysis.
    pub recommended: bool,

    /// Flagged as a possible scam / outlier.
    pub suspicious: bool,

    /// Short market commentary (leading listings only).
    pub market_analysis: Option<String>,

    /// 0-100 price attractiveness score.
    pub price_score: Option<u8>,
}

/// A listing annotated by the matching and ranking engine.
///
/// Owned exclusively by one pipeline invocation; never shared across
/// concurrent requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedListing {
    #[serde(flatten)]
    pub listing: RawListing,

    /// Winning fuzzy distance, 0 = best .. 1 = worst.
    pub match_score: Option<f64>,

    /// Search term that produced the best fuzzy match.
    pub matched_term: Option<String>,

    /// Token-overlap similarity, 0..1, higher = better.
    pub semantic_score: Option<f64>,

    /// Set when the price falls outside the oracle-predicted range.
    pub price_flag: Option<String>,

    /// Oracle advisory annotations.
    #[serde(default)]
    pub ai_insights: AiInsights,
}

impl EnrichedListing {
    /// Wrap a raw listing with no annotations yet.
    pub fn from_raw(listing: RawListing) -> Self {
        Self {
            listing,
            match_score: None,
            matched_term: None,
            semantic_score: None,
            price_flag: None,
            ai_insights: AiInsights::default(),
        }
    }

    /// Numeric price of the underlying listing.
    pub fn numeric_price(&self) -> f64 {
        self.listing.numeric_price()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(title: &str, price: &str) -> RawListing {
        RawListing::new(
            "Bikroy",
            title,
            price,
            "https://bikroy.com/ad/1",
            ExtractionMeta::new("test", 1),
        )
    }

    #[test]
    fn test_dedup_key_normalizes() {
        let a = listing("Toyota  Corolla X, 2004!", "৳ 1,190,000");
        let b = listing("toyota corolla x 2004", "Tk 1190000");
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn test_dedup_key_differs_on_price() {
        let a = listing("Toyota Corolla", "৳ 1,190,000");
        let b = listing("Toyota Corolla", "৳ 1,200,000");
        assert_ne!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn test_numeric_price() {
        assert_eq!(listing("t", "৳ 1,275,000").numeric_price(), 1_275_000.0);
    }
}
