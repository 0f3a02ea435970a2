//! Text matching primitives for the engine.
//!
//! Fuzzy title matching is bigram-based (Sorensen-Dice), token
//! equivalence is Jaro-Winkler. Both tolerate the misspellings common
//! in marketplace titles ("carolla", "civick").

use strsim::{jaro_winkler, sorensen_dice};

/// Jaro-Winkler floor above which two tokens count as equivalent.
pub const TOKEN_EQUIVALENCE_THRESHOLD: f64 = 0.7;

/// Fuzzy distance between a listing title and a search term.
///
/// 0 = best, 1 = worst. A term appearing verbatim inside the title is
/// capped at 0.5 even when the bigram overlap is diluted by a long
/// title.
pub fn match_distance(title: &str, term: &str) -> f64 {
    let title = title.to_lowercase();
    let term = term.to_lowercase();

    let distance = 1.0 - sorensen_dice(&title, &term);
    if title.contains(&term) {
        distance.min(0.5)
    } else {
        distance
    }
}

/// Lowercase alphanumeric tokens of at least two characters, lightly
/// stemmed (trailing plural "s" removed).
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 1)
        .map(stem)
        .collect()
}

fn stem(token: &str) -> String {
    if token.len() > 3 && token.ends_with('s') && !token.ends_with("ss") {
        token[..token.len() - 1].to_string()
    } else {
        token.to_string()
    }
}

/// Whether two tokens are the same word for matching purposes.
pub fn tokens_match(a: &str, b: &str) -> bool {
    a == b || jaro_winkler(a, b) > TOKEN_EQUIVALENCE_THRESHOLD
}

/// Token-overlap similarity between two texts, 0..1.
///
/// Each query token may be claimed by at most one title token; the
/// overlap is normalized by the larger token count so padding a title
/// with noise words lowers the score.
pub fn token_overlap_similarity(title: &str, query: &str) -> f64 {
    let title_tokens = tokenize(title);
    let query_tokens = tokenize(query);

    if title_tokens.is_empty() || query_tokens.is_empty() {
        return 0.0;
    }

    let mut claimed = vec![false; title_tokens.len()];
    let mut matches = 0usize;
    for q in &query_tokens {
        if let Some(i) = title_tokens
            .iter()
            .enumerate()
            .position(|(i, t)| !claimed[i] && tokens_match(t, q))
        {
            claimed[i] = true;
            matches += 1;
        }
    }

    matches as f64 / title_tokens.len().max(query_tokens.len()) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_distance_prefers_contained_terms() {
        let exact = match_distance("Toyota Corolla X 2004", "corolla");
        assert!(exact <= 0.5, "contained term capped at 0.5, got {exact}");

        let unrelated = match_distance("Honda Civic 2020", "corolla");
        assert!(unrelated > 0.95, "unrelated title should score near 1, got {unrelated}");
    }

    #[test]
    fn test_match_distance_tolerates_misspelling() {
        let misspelled = match_distance("Toyota Carolla fresh condition", "carolla");
        assert!(misspelled <= 0.5);
    }

    #[test]
    fn test_tokenize_stems_plurals() {
        assert_eq!(tokenize("Toyota cars, 2 owners!"), vec!["toyota", "car", "owner"]);
    }

    #[test]
    fn test_tokens_match_near_spellings() {
        assert!(tokens_match("corolla", "corolla"));
        assert!(tokens_match("corolla", "carolla"));
        assert!(!tokens_match("civic", "corolla"));
    }

    #[test]
    fn test_token_overlap_similarity() {
        let strong = token_overlap_similarity("Toyota Corolla X 2004", "Toyota Corolla");
        assert!(strong > 0.4, "got {strong}");

        let none = token_overlap_similarity("Honda Civic 2020", "Toyota Corolla");
        assert!(none <= 0.1, "got {none}");
    }
}
