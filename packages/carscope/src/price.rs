//! Marketplace price-text normalization.
//!
//! Listings carry prices in whatever notation the source page used:
//! "৳ 1,275,000", "Tk1275000", "12.75 lakh", "1.2 crore", "BDT 950,000".
//! All of these must normalize to the same numeric value for equal
//! amounts. Lakh = 100,000 and crore = 10,000,000.

const LAKH: f64 = 100_000.0;
const CRORE: f64 = 10_000_000.0;

/// Parse a marketplace-native price string into a numeric amount.
///
/// Returns 0.0 when no digits are present. Multiplier words ("lakh",
/// "lac", "crore") apply to the bare numeric part.
pub fn parse_price(price_text: &str) -> f64 {
    let lower = price_text.to_lowercase();

    let numeric: String = lower
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let value: f64 = numeric.parse().unwrap_or(0.0);

    if lower.contains("lakh") || lower.contains("lac") {
        value * LAKH
    } else if lower.contains("crore") {
        value * CRORE
    } else {
        value
    }
}

/// Whether the text contains a price-currency token for this market.
pub fn has_currency_token(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains('৳')
        || lower.contains("tk")
        || lower.contains("bdt")
        || lower.contains("lakh")
        || lower.contains("lac")
        || lower.contains("crore")
}
