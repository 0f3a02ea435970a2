//! Data-driven platform configuration.
//!
//! Each marketplace is described by configuration rather than a
//! subclass: base URL, URL-building shape, pagination depth, and its
//! selector strategy table.

use serde::{Deserialize, Serialize};

use crate::extract::{default_strategies, SelectorStrategy};
use crate::types::SearchFilters;

/// Configuration for one marketplace source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Display name, also used as the listing `platform` field.
    pub name: String,

    /// Scheme + host, no trailing slash.
    pub base_url: String,

    /// Path of the car search page, e.g. "/en/ads/bangladesh/cars".
    pub search_path: String,

    /// Append "/brand-slug/model-slug" path segments when known.
    pub brand_model_in_path: bool,

    /// Query parameter carrying the 1-based page number.
    pub page_param: String,

    /// Query parameter names for price and year bounds.
    pub min_price_param: String,
    pub max_price_param: String,
    pub year_min_param: String,
    pub year_max_param: String,

    /// Fixed query parameters always appended (sorting etc.).
    #[serde(default)]
    pub extra_params: Vec<(String, String)>,

    /// Pages to walk before stopping, 1–4 in practice.
    pub max_pages: u32,

    /// Selector strategy table for this platform's layouts.
    pub strategies: Vec<SelectorStrategy>,
}

impl PlatformConfig {
    /// Build the search URL for a page of results.
    pub fn build_search_url(&self, filters: &SearchFilters, page: u32) -> String {
        let mut url = format!("{}{}", self.base_url, self.search_path);

        if self.brand_model_in_path {
            if let Some(brand) = &filters.brand {
                url.push('/');
                url.push_str(&slug(brand));
                if !filters.model.trim().is_empty() {
                    url.push('/');
                    url.push_str(&slug(&filters.model));
                }
            }
        }

        let mut params: Vec<(String, String)> = self.extra_params.clone();
        if page > 1 {
            params.push((self.page_param.clone(), page.to_string()));
        }
        if let Some(min) = filters.min_price {
            params.push((self.min_price_param.clone(), format!("{}", min as i64)));
        }
        if let Some(max) = filters.max_price {
            params.push((self.max_price_param.clone(), format!("{}", max as i64)));
        }
        if let Some(year) = filters.year {
            params.push((self.year_min_param.clone(), year.to_string()));
            params.push((self.year_max_param.clone(), year.to_string()));
        }
        if let Some(location) = &filters.location {
            if !location.eq_ignore_ascii_case("dhaka") {
                params.push(("location".to_string(), slug(location)));
            }
        }

        if !params.is_empty() {
            let query: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
            url.push('?');
            url.push_str(&query.join("&"));
        }

        url
    }
}

fn slug(text: &str) -> String {
    text.trim().to_lowercase().split_whitespace().collect::<Vec<_>>().join("-")
}

/// Bikroy: highest-trust source, brand/model in the URL path.
pub fn bikroy() -> PlatformConfig {
    PlatformConfig {
        name: "Bikroy".to_string(),
        base_url: "https://bikroy.com".to_string(),
        search_path: "/en/ads/bangladesh/cars".to_string(),
        brand_model_in_path: true,
        page_param: "page".to_string(),
        min_price_param: "min_price".to_string(),
        max_price_param: "max_price".to_string(),
        year_min_param: "year_min".to_string(),
        year_max_param: "year_max".to_string(),
        extra_params: vec![
            ("sort".to_string(), "date".to_string()),
            ("order".to_string(), "desc".to_string()),
        ],
        max_pages: 4,
        strategies: default_strategies(),
    }
}

/// Carmudi: query-driven search, two pages.
pub fn carmudi() -> PlatformConfig {
    PlatformConfig {
        name: "Carmudi".to_string(),
        base_url: "https://www.carmudi.com.bd".to_string(),
        search_path: "/cars".to_string(),
        brand_model_in_path: true,
        page_param: "page".to_string(),
        min_price_param: "price_min".to_string(),
        max_price_param: "price_max".to_string(),
        year_min_param: "year_from".to_string(),
        year_max_param: "year_to".to_string(),
        extra_params: vec![],
        max_pages: 2,
        strategies: default_strategies(),
    }
}

/// OLX-style classifieds.
pub fn olx() -> PlatformConfig {
    PlatformConfig {
        name: "OLX".to_string(),
        base_url: "https://www.olx.com.bd".to_string(),
        search_path: "/vehicles/cars".to_string(),
        brand_model_in_path: false,
        page_param: "page".to_string(),
        min_price_param: "price_from".to_string(),
        max_price_param: "price_to".to_string(),
        year_min_param: "year_from".to_string(),
        year_max_param: "year_to".to_string(),
        extra_params: vec![],
        max_pages: 2,
        strategies: default_strategies(),
    }
}

/// CarDekho-style portal.
pub fn cardekho() -> PlatformConfig {
    PlatformConfig {
        name: "CarDekho".to_string(),
        base_url: "https://www.cardekho.com".to_string(),
        search_path: "/used-cars".to_string(),
        brand_model_in_path: true,
        page_param: "page".to_string(),
        min_price_param: "min_price".to_string(),
        max_price_param: "max_price".to_string(),
        year_min_param: "min_year".to_string(),
        year_max_param: "max_year".to_string(),
        extra_params: vec![],
        max_pages: 1,
        strategies: default_strategies(),
    }
}

/// All built-in platforms, in trust order. The flattening order of this
/// list is the stable ranking tiebreak.
pub fn default_platforms() -> Vec<PlatformConfig> {
    vec![bikroy(), carmudi(), olx(), cardekho()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_with_brand_model_path() {
        let filters = SearchFilters::for_model("Corolla").with_brand("Toyota");
        let url = bikroy().build_search_url(&filters, 1);
        assert!(url.starts_with("https://bikroy.com/en/ads/bangladesh/cars/toyota/corolla"));
        // Page 1 carries no page param
        assert!(!url.contains("page="));
    }

    #[test]
    fn test_url_with_pagination_and_bounds() {
        let filters = SearchFilters::for_model("Corolla")
            .with_brand("Toyota")
            .with_year(2015)
            .with_price_range(800_000.0, 2_000_000.0);
        let url = bikroy().build_search_url(&filters, 3);
        assert!(url.contains("page=3"));
        assert!(url.contains("min_price=800000"));
        assert!(url.contains("max_price=2000000"));
        assert!(url.contains("year_min=2015"));
        assert!(url.contains("year_max=2015"));
    }

    #[test]
    fn test_multiword_slugs() {
        let filters = SearchFilters::for_model("Land Cruiser").with_brand("Toyota");
        let url = cardekho().build_search_url(&filters, 1);
        assert!(url.contains("/toyota/land-cruiser"));
    }
}
