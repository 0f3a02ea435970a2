//! Extraction strategy chain.
//!
//! A pure function of page content: given a [`PageSnapshot`] and an
//! ordered list of selector strategies, produce raw listing records.
//! The first strategy whose container selector matches at least one
//! element is used for the entire page; when none match, a heuristic
//! text scan over generic block elements takes over.

pub mod heuristics;
pub mod strategy;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::page::PageSnapshot;
use crate::types::{Confidence, ExtractionMeta, ListingSpecs, RawListing};

pub use heuristics::{extract_price_from_text, is_car_listing};
pub use strategy::{default_strategies, SelectorStrategy};

/// Upper bound on listings taken from one page.
pub const MAX_RESULTS_PER_PAGE: usize = 30;

/// Minimum title length accepted from any extraction path.
const MIN_TITLE_LEN: usize = 5;

/// Extract listings from one page snapshot.
///
/// Never errors: a malformed element is skipped and extraction
/// continues with the rest of the page.
pub fn extract_listings(
    platform: &str,
    snapshot: &PageSnapshot,
    strategies: &[SelectorStrategy],
) -> Vec<RawListing> {
    let document = Html::parse_document(&snapshot.html);

    let (elements, strategy) = match select_containers(&document, strategies) {
        Some((els, strat)) => (els, strat),
        None => {
            debug!(
                platform,
                page = snapshot.page_number,
                "no container selectors matched, falling back to heuristic scan"
            );
            let els = heuristics::heuristic_candidates(&document);
            let Some(generic) = strategies.last() else {
                return Vec::new();
            };
            (els, generic)
        }
    };

    let mut listings = Vec::new();
    for element in elements {
        if listings.len() >= MAX_RESULTS_PER_PAGE {
            break;
        }
        match extract_one(platform, snapshot, element, strategy) {
            Some(listing) => listings.push(listing),
            None => continue,
        }
    }

    debug!(
        platform,
        page = snapshot.page_number,
        strategy = %strategy.name,
        count = listings.len(),
        "page extraction complete"
    );

    listings
}

/// Try strategies in priority order; first with a matching container wins.
fn select_containers<'a>(
    document: &'a Html,
    strategies: &'a [SelectorStrategy],
) -> Option<(Vec<ElementRef<'a>>, &'a SelectorStrategy)> {
    for strategy in strategies {
        let mut matched = Vec::new();
        for sel in &strategy.container {
            let Ok(selector) = Selector::parse(sel) else {
                warn!(selector = %sel, "invalid container selector");
                continue;
            };
            matched.extend(document.select(&selector));
        }
        if !matched.is_empty() {
            return Some((matched, strategy));
        }
    }
    None
}

/// Extract a single candidate element into a listing, or reject it.
fn extract_one(
    platform: &str,
    snapshot: &PageSnapshot,
    element: ElementRef<'_>,
    strategy: &SelectorStrategy,
) -> Option<RawListing> {
    let full_text = element.text().collect::<Vec<_>>().join(" ");

    let (title, title_confidence) = extract_title(element, strategy)?;
    let (price_text, price_confidence) = extract_price(element, strategy, &full_text)?;

    if !is_car_listing(&title, &full_text) {
        return None;
    }

    let link = extract_link(element, strategy, &snapshot.url)
        .unwrap_or_else(|| snapshot.url.clone());
    let image_url = extract_image(element, strategy);
    let location = extract_location(element, strategy);

    let specs = ListingSpecs {
        year: heuristics::extract_year(&title),
        color: heuristics::extract_color(&title),
        location,
        mileage_km: heuristics::extract_mileage(&full_text),
        transmission: heuristics::extract_transmission(&full_text),
        fuel_type: heuristics::extract_fuel_type(&full_text),
    };

    let mut meta = ExtractionMeta::new(&strategy.name, snapshot.page_number);
    meta.confidence = title_confidence;
    meta.price_confidence = price_confidence;

    Some(
        RawListing::new(platform, title, price_text, link, meta)
            .with_specs(specs)
            .maybe_image(image_url),
    )
}

trait MaybeImage {
    fn maybe_image(self, url: Option<String>) -> Self;
}

impl MaybeImage for RawListing {
    fn maybe_image(mut self, url: Option<String>) -> Self {
        self.image_url = url;
        self
    }
}

/// Title: ordered selector chain, then heading fallback, then anchor text.
fn extract_title(
    element: ElementRef<'_>,
    strategy: &SelectorStrategy,
) -> Option<(String, Confidence)> {
    for sel in &strategy.title {
        let Ok(selector) = Selector::parse(sel) else { continue };
        if let Some(hit) = element.select(&selector).next() {
            let text = collect_text(hit);
            if text.len() >= MIN_TITLE_LEN {
                return Some((text, Confidence::High));
            }
        }
    }

    // Heading fallback
    let headings = Selector::parse("h1, h2, h3, h4, h5, h6, .title, .ad-title").ok()?;
    for heading in element.select(&headings) {
        let text = collect_text(heading);
        if text.len() > 10 && text.len() < 150 {
            return Some((text, Confidence::Medium));
        }
    }

    // Anchor-text fallback: links whose text looks like a car title
    let anchors = Selector::parse("a").ok()?;
    for anchor in element.select(&anchors) {
        let text = collect_text(anchor);
        if text.len() > 15 && text.len() < 100 && heuristics::has_car_keyword(&text) {
            return Some((text, Confidence::Low));
        }
    }

    None
}

/// Price: ordered selector chain, then currency/number regex patterns.
fn extract_price(
    element: ElementRef<'_>,
    strategy: &SelectorStrategy,
    full_text: &str,
) -> Option<(String, Confidence)> {
    for sel in &strategy.price {
        let Ok(selector) = Selector::parse(sel) else { continue };
        if let Some(hit) = element.select(&selector).next() {
            let text = collect_text(hit);
            if text.chars().any(|c| c.is_ascii_digit()) {
                return Some((text, Confidence::High));
            }
        }
    }

    extract_price_from_text(full_text).map(|price| (price, Confidence::Medium))
}

fn extract_link(
    element: ElementRef<'_>,
    strategy: &SelectorStrategy,
    base_url: &str,
) -> Option<String> {
    let selector = Selector::parse(&strategy.link)
        .or_else(|_| Selector::parse("a[href]"))
        .ok()?;
    let href = element
        .select(&selector)
        .find_map(|a| a.value().attr("href"))?;

    if href.starts_with("http") {
        return Some(href.to_string());
    }
    let base = Url::parse(base_url).ok()?;
    base.join(href).ok().map(|u| u.to_string())
}

fn extract_image(element: ElementRef<'_>, strategy: &SelectorStrategy) -> Option<String> {
    let selector = Selector::parse(&strategy.image).ok()?;
    for img in element.select(&selector) {
        for attr in ["src", "data-src", "data-lazy-src", "data-original"] {
            if let Some(src) = img.value().attr(attr) {
                if src.starts_with("//") {
                    return Some(format!("https:{src}"));
                }
                if src.starts_with("http") {
                    return Some(src.to_string());
                }
            }
        }
    }
    None
}

fn extract_location(element: ElementRef<'_>, strategy: &SelectorStrategy) -> Option<String> {
    let selector = Selector::parse(&strategy.location).ok()?;
    element
        .select(&selector)
        .next()
        .map(collect_text)
        .filter(|t| !t.is_empty())
}

fn collect_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(html: &str) -> PageSnapshot {
        PageSnapshot::new("https://bikroy.com/en/ads/bangladesh/cars", html)
    }

    const LISTING_PAGE: &str = r#"
        <html><body>
          <div data-testid="ad-card">
            <h2><a href="/ad/toyota-corolla-x-2004">Toyota Corolla X 2004</a></h2>
            <div data-testid="ad-price">৳ 1,190,000</div>
            <div data-testid="ad-location">Dhaka</div>
            <img src="https://i.bikroy-st.com/corolla.jpg" />
          </div>
          <div data-testid="ad-card">
            <h2><a href="/ad/honda-civic-2020">Honda Civic 2020 Automatic</a></h2>
            <div data-testid="ad-price">৳ 2,800,000</div>
          </div>
        </body></html>
    "#;

    #[test]
    fn test_primary_strategy_extracts_listings() {
        let listings = extract_listings("Bikroy", &snapshot(LISTING_PAGE), &default_strategies());

        assert_eq!(listings.len(), 2);
        let corolla = &listings[0];
        assert_eq!(corolla.title, "Toyota Corolla X 2004");
        assert_eq!(corolla.price_text, "৳ 1,190,000");
        assert_eq!(corolla.specs.year, Some(2004));
        assert_eq!(corolla.extraction.confidence, Confidence::High);
        assert!(corolla.link.starts_with("https://bikroy.com/"));
        assert!(corolla.image_url.is_some());
    }

    #[test]
    fn test_no_strategy_mixing_within_page() {
        let listings = extract_listings("Bikroy", &snapshot(LISTING_PAGE), &default_strategies());
        let strategies: std::collections::HashSet<_> =
            listings.iter().map(|l| l.extraction.strategy.clone()).collect();
        assert_eq!(strategies.len(), 1);
    }

    #[test]
    fn test_heuristic_fallback_on_unknown_layout() {
        let html = r#"
            <html><body>
              <div class="posting">
                <span>Excellent condition, single owner, registration current,
                price Tk 1,450,000 negotiable, located in Dhaka near Banani,
                automatic transmission, low mileage vehicle.</span>
                <a href="/posting/991">Toyota Corolla 2015 model for sale</a>
              </div>
            </body></html>
        "#;
        let listings = extract_listings("OLX", &snapshot(html), &default_strategies());
        assert_eq!(listings.len(), 1);
        assert!(listings[0].title.to_lowercase().contains("corolla"));
    }

    #[test]
    fn test_non_car_content_rejected() {
        let html = r#"
            <html><body>
              <div data-testid="ad-card">
                <h2><a href="/ad/flat">3 bedroom flat for rent in Gulshan area now</a></h2>
                <div data-testid="ad-price">৳ 45,000</div>
              </div>
            </body></html>
        "#;
        let listings = extract_listings("Bikroy", &snapshot(html), &default_strategies());
        assert!(listings.is_empty());
    }

    #[test]
    fn test_missing_price_rejected() {
        let html = r#"
            <html><body>
              <div data-testid="ad-card">
                <h2><a href="/ad/1">Toyota Corolla 2010 fresh condition</a></h2>
              </div>
            </body></html>
        "#;
        let listings = extract_listings("Bikroy", &snapshot(html), &default_strategies());
        assert!(listings.is_empty());
    }

    #[test]
    fn test_per_page_cap() {
        let mut html = String::from("<html><body>");
        for i in 0..40 {
            html.push_str(&format!(
                r#"<div data-testid="ad-card">
                     <h2><a href="/ad/{i}">Toyota Corolla 20{:02} special</a></h2>
                     <div data-testid="ad-price">৳ 1,{i:03},000</div>
                   </div>"#,
                i % 24,
            ));
        }
        html.push_str("</body></html>");

        let listings = extract_listings("Bikroy", &snapshot(&html), &default_strategies());
        assert_eq!(listings.len(), MAX_RESULTS_PER_PAGE);
    }
}
