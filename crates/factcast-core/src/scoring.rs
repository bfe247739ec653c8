//! Relevance and stance heuristics for retrieved excerpts.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;

use crate::types::Stance;

lazy_static! {
    static ref WORD_PATTERN: Regex = Regex::new(r"[\p{L}\p{N}%$]+").unwrap();

    static ref SUPPORT_PATTERN: Regex = Regex::new(
        r"(?i)\b(confirm(s|ed)?|show(s|ed|n)?|prove(s|d|n)?|demonstrate(s|d)?|validate(s|d)?|corroborate(s|d)?|verif(y|ies|ied))\b"
    ).unwrap();

    static ref CONTRADICT_PATTERN: Regex = Regex::new(
        r"(?i)\b(contradict(s|ed)?|dispute(s|d)?|refute(s|d)?|debunk(s|ed)?|challenge(s|d)?|disprove(s|d|n)?|no evidence|false|misleading)\b"
    ).unwrap();
}

fn words(text: &str) -> BTreeSet<String> {
    WORD_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// Share of the claim's distinct words that also appear in the excerpt.
///
/// Returns a value in `[0, 1]`; 0 when the claim has no words.
pub fn relevance(claim: &str, excerpt: &str) -> f64 {
    let claim_words = words(claim);
    if claim_words.is_empty() {
        return 0.0;
    }

    let excerpt_words = words(excerpt);
    let overlap = claim_words.intersection(&excerpt_words).count();
    overlap as f64 / claim_words.len() as f64
}

/// Guess a source's stance from cue words in its excerpt.
///
/// The side with more cue matches wins; ties and excerpts with no cues are neutral.
pub fn infer_stance(excerpt: &str) -> Stance {
    let support = SUPPORT_PATTERN.find_iter(excerpt).count();
    let contradict = CONTRADICT_PATTERN.find_iter(excerpt).count();

    match support.cmp(&contradict) {
        std::cmp::Ordering::Greater => Stance::Support,
        std::cmp::Ordering::Less => Stance::Contradict,
        std::cmp::Ordering::Equal => Stance::Neutral,
    }
}
