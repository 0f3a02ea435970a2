//! User-supplied search filters.

use serde::{Deserialize, Serialize};

use crate::error::{SearchError, SearchResult};

/// Filters describing what the user is looking for.
///
/// `model` is the only required field. If both price bounds are set and
/// `min_price > max_price`, the engine's price stage selects nothing
/// rather than erroring.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Car model, e.g. "Corolla". Required, non-empty.
    pub model: String,

    /// Brand, e.g. "Toyota".
    pub brand: Option<String>,

    /// Manufacturing year.
    pub year: Option<i32>,

    /// Preferred color.
    pub color: Option<String>,

    /// Preferred location/city.
    pub location: Option<String>,

    /// Hard lower price bound (numeric, marketplace currency).
    pub min_price: Option<f64>,

    /// Hard upper price bound.
    pub max_price: Option<f64>,
}

impl SearchFilters {
    /// Create filters for a model.
    pub fn for_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Set the brand.
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    /// Set the year.
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// Set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the price range.
    pub fn with_price_range(mut self, min: f64, max: f64) -> Self {
        self.min_price = Some(min);
        self.max_price = Some(max);
        self
    }

    /// Validate the request before the pipeline runs.
    ///
    /// This is the only error class visible to the end user under normal
    /// operation.
    pub fn validate(&self) -> SearchResult<()> {
        if self.model.trim().is_empty() {
            return Err(SearchError::InvalidFilters {
                reason: "model is required".to_string(),
            });
        }
        Ok(())
    }

    /// Whether the user-specified bounds can match anything at all.
    pub fn price_range_selects_none(&self) -> bool {
        matches!((self.min_price, self.max_price), (Some(min), Some(max)) if min > max)
    }

    /// Fill missing brand/model/year from an oracle-standardized query.
    pub fn enhanced_with(&self, std: &super::StandardizedQuery) -> Self {
        let mut enhanced = self.clone();
        if enhanced.brand.is_none() {
            enhanced.brand = std.brand.clone();
        }
        if enhanced.model.trim().is_empty() {
            if let Some(model) = &std.model {
                enhanced.model = model.clone();
            }
        }
        if enhanced.year.is_none() {
            enhanced.year = std.year;
        }
        enhanced
    }
}
