//! Selector strategy tables.
//!
//! Each strategy names the CSS selectors used to locate listing
//! containers and their fields. Strategies are tried in priority order;
//! the last entry should always be a broad generic fallback so the
//! heuristic scan has field selectors to work with.

use serde::{Deserialize, Serialize};

/// One selector strategy for a marketplace layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorStrategy {
    /// Strategy name recorded on extraction metadata.
    pub name: String,

    /// Container selectors, any match selects the strategy.
    pub container: Vec<String>,

    /// Title selectors, tried in order.
    pub title: Vec<String>,

    /// Price selectors, tried in order.
    pub price: Vec<String>,

    /// Link selector.
    pub link: String,

    /// Image selector.
    pub image: String,

    /// Location selector.
    pub location: String,
}

impl SelectorStrategy {
    /// Create a strategy with the given name and containers; field
    /// selectors start from generic defaults.
    pub fn new(name: impl Into<String>, container: Vec<String>) -> Self {
        Self {
            name: name.into(),
            container,
            title: strs(&["a[title]", "h1 a", "h2 a", "h3 a", "h4 a", ".title a"]),
            price: strs(&["[class*=\"price\"]", "[class*=\"tk\"]", "[class*=\"amount\"]"]),
            link: "a[href]".to_string(),
            image: "img".to_string(),
            location: "[class*=\"location\"], [class*=\"area\"], [class*=\"city\"]".to_string(),
        }
    }

    /// Replace the title selectors.
    pub fn with_title(mut self, selectors: &[&str]) -> Self {
        self.title = strs(selectors);
        self
    }

    /// Replace the price selectors.
    pub fn with_price(mut self, selectors: &[&str]) -> Self {
        self.price = strs(selectors);
        self
    }

    /// Replace the link selector.
    pub fn with_link(mut self, selector: &str) -> Self {
        self.link = selector.to_string();
        self
    }

    /// Replace the location selector.
    pub fn with_location(mut self, selector: &str) -> Self {
        self.location = selector.to_string();
        self
    }
}

fn strs(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The shared three-tier strategy table: modern marketplace markup,
/// an alternative card layout, and a broad generic fallback.
pub fn default_strategies() -> Vec<SelectorStrategy> {
    vec![
        SelectorStrategy::new(
            "modern",
            strs(&[
                "[data-testid=\"ad-card\"]",
                ".gtm-ad-item",
                ".normal-ad",
                ".list-item",
            ]),
        )
        .with_title(&[
            "[data-testid=\"ad-title\"] a",
            ".add-title a",
            "h2 a",
            ".ad-title a",
        ])
        .with_price(&["[data-testid=\"ad-price\"]", ".price", ".ad-price"])
        .with_link("a[href*=\"/ad/\"]")
        .with_location("[data-testid=\"ad-location\"], .location, .ad-location"),
        SelectorStrategy::new(
            "alternative",
            strs(&[".ad-card", ".listing-card", ".card", ".item-card"]),
        )
        .with_title(&[".ad-title a", ".title a", "h3 a", "h2 a", ".item-title a"])
        .with_price(&[".price", ".amount", ".tk", ".cost", ".ad-price"]),
        SelectorStrategy::new(
            "generic",
            strs(&[
                "div[class*=\"ad\"]",
                "div[class*=\"card\"]",
                "div[class*=\"listing\"]",
                "div[class*=\"item\"]",
            ]),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_ends_with_generic() {
        let strategies = default_strategies();
        assert_eq!(strategies.len(), 3);
        assert_eq!(strategies.last().unwrap().name, "generic");
    }
}
