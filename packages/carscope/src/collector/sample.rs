//! Synthetic sample-data generation.
//!
//! When a platform yields nothing, the collector falls back to
//! plausible generated listings derived from the filters. Records are
//! explicitly marked `synthetic: true` with low-trust extraction
//! metadata so downstream ranking can tell them apart from scraped
//! data. All pipeline randomness is confined to this module and the
//! inter-page jitter.

use chrono::Datelike;
use rand::Rng;

use crate::types::{Confidence, ExtractionMeta, ListingSpecs, RawListing, Transmission};
use crate::SearchFilters;

const COLORS: &[&str] = &["White", "Black", "Silver", "Red", "Blue", "Gray"];
const LOCATIONS: &[&str] = &["Dhaka", "Chittagong", "Sylhet", "Rajshahi"];

/// Typical asking prices per model; the fallback for unknown models is
/// a mid-market figure.
const BASE_PRICES: &[(&str, f64)] = &[
    ("corolla", 1_500_000.0),
    ("civic", 1_800_000.0),
    ("swift", 1_200_000.0),
    ("vitz", 800_000.0),
    ("axio", 1_300_000.0),
    ("allion", 1_600_000.0),
    ("premio", 1_700_000.0),
    ("fit", 900_000.0),
    ("vezel", 2_200_000.0),
    ("x-trail", 2_500_000.0),
    ("cr-v", 2_800_000.0),
    ("rav4", 3_000_000.0),
    ("camry", 3_500_000.0),
    ("land cruiser", 8_000_000.0),
];

const DEFAULT_BASE_PRICE: f64 = 1_500_000.0;

/// Base asking price for a model, from the fixed table.
pub fn base_price_for_model(model: &str) -> f64 {
    let key = model.trim().to_lowercase();
    BASE_PRICES
        .iter()
        .find(|(m, _)| *m == key)
        .map(|(_, p)| *p)
        .unwrap_or(DEFAULT_BASE_PRICE)
}

/// Generate 3–20 plausible listings for a platform that scraped nothing.
///
/// Year, color, and price vary randomly (price within ±15% of the model
/// base price); everything else is deterministic from the filters.
pub fn generate_sample_listings(platform: &str, filters: &SearchFilters) -> Vec<RawListing> {
    let mut rng = rand::rng();

    let brand = filters.brand.clone().unwrap_or_else(|| "Toyota".to_string());
    let model = if filters.model.trim().is_empty() {
        "Corolla".to_string()
    } else {
        filters.model.clone()
    };
    let base_price = base_price_for_model(&model);
    let current_year = chrono::Utc::now().year();

    let count = rng.random_range(3..=20);
    let mut listings = Vec::with_capacity(count);

    for i in 0..count {
        let year = filters
            .year
            .unwrap_or_else(|| current_year - rng.random_range(1..=8));
        // ±15% price variance around the model base
        let variation = rng.random_range(-0.15..=0.15);
        let price = (base_price * (1.0 + variation)).floor() as i64;
        let color = COLORS[rng.random_range(0..COLORS.len())];
        let location = LOCATIONS[rng.random_range(0..LOCATIONS.len())];
        let transmission = if rng.random_bool(0.5) {
            Transmission::Automatic
        } else {
            Transmission::Manual
        };
        let page_number = (i / 5) as u32 + 1;

        let mut meta = ExtractionMeta::new("sample", page_number);
        meta.confidence = Confidence::Low;
        meta.price_confidence = Confidence::Low;

        let listing = RawListing::new(
            platform,
            format!("{brand} {model} {year} - {color}"),
            format_price(price),
            format!(
                "https://{}.example/ad/{}-{}-{}-{}",
                platform.to_lowercase(),
                slugify(&brand),
                slugify(&model),
                year,
                i
            ),
            meta,
        )
        .with_specs(ListingSpecs {
            year: Some(year),
            color: Some(color.to_string()),
            location: Some(location.to_string()),
            mileage_km: Some(rng.random_range(20_000..=120_000)),
            transmission: Some(transmission),
            fuel_type: None,
        })
        .synthetic();

        listings.push(listing);
    }

    listings
}

fn slugify(text: &str) -> String {
    text.to_lowercase().split_whitespace().collect::<Vec<_>>().join("-")
}

fn format_price(price: i64) -> String {
    // Thousands-grouped taka notation, e.g. "৳ 1,450,000"
    let digits = price.to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("৳ {grouped}")
}
