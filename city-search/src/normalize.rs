//! Query normalisation.
//!
//! Produces the canonical query string that is sent to the transliterator,
//! the embedder, and the search engine.

use std::collections::HashSet;

use crate::error::SearchError;

/// Separator placed between surviving words.
const WORD_DELIMITER: &str = ", ";

/// Normalise a raw query.
///
/// Every run of characters that are neither letters nor digits becomes a
/// word boundary. Each word is capitalised (first character upper-case,
/// the rest lower-case), repeated words are dropped keeping the first
/// occurrence, and the survivors are joined with `", "`.
///
/// # Errors
///
/// Returns [`SearchError::EmptyQuery`] if no word survives.
///
/// # Examples
///
/// ```
/// let q = city_search::normalize("  new   york, NY!! ").unwrap();
/// assert_eq!(q, "New, York, Ny");
/// ```
pub fn normalize(raw: &str) -> Result<String, SearchError> {
    let mut seen = HashSet::new();
    let words: Vec<String> = raw
        .trim()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(capitalize)
        .filter(|w| seen.insert(w.clone()))
        .collect();

    if words.is_empty() {
        return Err(SearchError::EmptyQuery);
    }
    Ok(words.join(WORD_DELIMITER))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
