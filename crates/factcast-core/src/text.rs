//! Text utilities: sentence segmentation, entity extraction, word bounds.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Entity patterns used to sharpen retrieval queries
    static ref ENTITY_PATTERNS: Vec<Regex> = vec![
        // Years
        Regex::new(r"\b\d{4}\b").unwrap(),
        // Percentages
        Regex::new(r"\b\d+(?:\.\d+)?%").unwrap(),
        // Proper names
        Regex::new(r"\b[A-Z][a-z]+ [A-Z][a-z]+\b").unwrap(),
        // Monetary amounts
        Regex::new(r"\$[\d,]+(?:\.\d+)?").unwrap(),
    ];
}

/// Split text into trimmed sentences, in order.
///
/// A sentence ends at `.`, `!` or `?` followed by whitespace or end of
/// text, or at a line break. Decimal points such as `3.5` do not split.
pub fn segment_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\n' || c == '\r' {
            push_sentence(&mut sentences, &mut current);
            continue;
        }

        current.push(c);

        if matches!(c, '.' | '!' | '?') {
            match chars.peek() {
                None => push_sentence(&mut sentences, &mut current),
                Some(next) if next.is_whitespace() => push_sentence(&mut sentences, &mut current),
                _ => {}
            }
        }
    }
    push_sentence(&mut sentences, &mut current);

    sentences
}

fn push_sentence(sentences: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
    current.clear();
}

/// Extract years, percentages, proper names and monetary amounts.
///
/// Entities are returned in pattern order, without duplicates.
pub fn extract_entities(claim: &str) -> Vec<String> {
    let mut entities: Vec<String> = Vec::new();
    for pattern in ENTITY_PATTERNS.iter() {
        for m in pattern.find_iter(claim) {
            let entity = m.as_str().to_string();
            if !entities.contains(&entity) {
                entities.push(entity);
            }
        }
    }
    entities
}

/// Combine a claim with its entities into a retrieval query.
pub fn build_search_query(claim: &str, entities: &[String]) -> String {
    let claim = claim.trim();
    if entities.is_empty() {
        claim.to_string()
    } else {
        format!("{} {}", claim, entities.join(" "))
    }
}

/// Lowercased claim with collapsed whitespace, used as a cache key.
pub fn normalize_claim(text: &str) -> String {
    text.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Fit generated text into `[min_words, max_words]`.
///
/// Text over the maximum is cut to `max_words` words and ends with `...`.
/// Text under the minimum gets `padding` appended once; the result may
/// still fall short, since the lower bound is soft.
pub fn fit_word_bounds(text: &str, min_words: usize, max_words: usize, padding: &str) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();

    if words.len() > max_words {
        let mut truncated = words[..max_words].join(" ");
        let trimmed_len = truncated
            .trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | '!' | '?'))
            .len();
        truncated.truncate(trimmed_len);
        truncated.push_str("...");
        return truncated;
    }

    let joined = words.join(" ");
    if words.len() < min_words && !padding.trim().is_empty() {
        let padded = if joined.is_empty() {
            padding.trim().to_string()
        } else {
            format!("{} {}", joined, padding.trim())
        };
        return fit_word_bounds(&padded, 0, max_words, "");
    }

    joined
}
