//! Heuristic fallbacks for pages that defeat the selector strategies.
//!
//! Pattern scanning over element text: car-listing classification,
//! price tokens, and spec fields (year, color, mileage, transmission).

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::price::has_currency_token;
use crate::types::Transmission;

/// Keywords that identify car-related content (brands, models, body
/// types). Shared by the classifier and the anchor-text title fallback.
pub const CAR_KEYWORDS: &[&str] = &[
    "toyota", "honda", "suzuki", "nissan", "mitsubishi", "hyundai", "bmw", "mercedes", "audi",
    "ford", "mazda", "corolla", "civic", "swift", "vitz", "axio", "allion", "premio", "car",
    "vehicle", "sedan", "hatchback", "suv", "jeep", "auto", "manual",
];

const COLOR_KEYWORDS: &[&str] = &[
    "white", "black", "silver", "red", "blue", "gray", "grey", "green", "brown", "yellow", "gold",
];

/// Text-length window for heuristic candidates; shorter is usually a
/// menu fragment, longer a page section.
const HEURISTIC_TEXT_RANGE: std::ops::Range<usize> = 50..1000;

/// Minimum numeric value for a token to count as a real price. Real
/// prices dominate noise numbers (years, mileage fragments) above this.
const MIN_PLAUSIBLE_PRICE: f64 = 10_000.0;

/// Whether text contains any known brand/model/body-type keyword.
pub fn has_car_keyword(text: &str) -> bool {
    let lower = text.to_lowercase();
    CAR_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Car-listing classifier.
///
/// True iff a car keyword is present (title or full text) AND at least
/// one of: a 4-digit year in the title, a currency token, or a
/// model/edition/version word in the full text.
pub fn is_car_listing(title: &str, full_text: &str) -> bool {
    if !has_car_keyword(title) && !has_car_keyword(full_text) {
        return false;
    }

    let has_year = extract_year(title).is_some();
    let has_price = has_currency_token(full_text);
    let has_model_word = Regex::new(r"(?i)\b(model|edition|version)\b")
        .unwrap()
        .is_match(full_text);

    has_year || has_price || has_model_word
}

/// Collect generic block elements that look like car listings: car
/// keyword + price-like token, with text length inside the heuristic
/// window.
pub fn heuristic_candidates(document: &Html) -> Vec<ElementRef<'_>> {
    let divs = Selector::parse("div").expect("static selector");
    document
        .select(&divs)
        .filter(|div| {
            let text = div.text().collect::<Vec<_>>().join(" ");
            HEURISTIC_TEXT_RANGE.contains(&text.len())
                && has_car_keyword(&text)
                && has_currency_token(&text)
        })
        .collect()
}

/// Scan free text for a price token, preferring the largest numeric
/// value above the plausibility floor.
pub fn extract_price_from_text(text: &str) -> Option<String> {
    let patterns = [
        r"৳\s*[\d,]+(?:\s*(?:lakh|lac|crore))?",
        r"(?i)Tk\s*[\d,]+(?:\s*(?:lakh|lac|crore))?",
        r"(?i)[\d.]+\s*(?:lakh|lac|crore)",
        r"[\d,]+\s*৳",
        r"(?i)BDT\s*[\d,]+",
        r"\b\d{5,}\b",
    ];

    for pattern in patterns {
        let re = Regex::new(pattern).unwrap();
        let best = re
            .find_iter(text)
            .map(|m| {
                let token = m.as_str();
                (token, crate::price::parse_price(token))
            })
            .filter(|(_, value)| *value > MIN_PLAUSIBLE_PRICE)
            .max_by(|a, b| a.1.total_cmp(&b.1));

        if let Some((token, _)) = best {
            return Some(token.trim().to_string());
        }
    }
    None
}

/// 4-digit year (1900–2099) from text.
pub fn extract_year(text: &str) -> Option<i32> {
    Regex::new(r"\b(19|20)\d{2}\b")
        .unwrap()
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
}

/// Color keyword from a title, capitalized.
pub fn extract_color(title: &str) -> Option<String> {
    let lower = title.to_lowercase();
    COLOR_KEYWORDS.iter().find(|c| lower.contains(*c)).map(|c| {
        let mut chars = c.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => String::new(),
        }
    })
}

/// Mileage in km from free text, e.g. "65,000 km".
pub fn extract_mileage(text: &str) -> Option<u32> {
    Regex::new(r"(?i)(\d+(?:,\d+)*)\s*(?:km|kilometer|mile|kilo)")
        .unwrap()
        .captures(text)
        .and_then(|cap| cap.get(1))
        .and_then(|m| m.as_str().replace(',', "").parse().ok())
}

/// Transmission from free text.
pub fn extract_transmission(text: &str) -> Option<Transmission> {
    let lower = text.to_lowercase();
    if lower.contains("automatic") || lower.contains("auto ") {
        Some(Transmission::Automatic)
    } else if lower.contains("manual") {
        Some(Transmission::Manual)
    } else {
        None
    }
}

/// Fuel type from free text.
pub fn extract_fuel_type(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    ["octane", "petrol", "diesel", "cng", "hybrid", "electric"]
        .iter()
        .find(|f| lower.contains(*f))
        .map(|f| f.to_string())
}
