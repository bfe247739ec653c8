//! Deterministic summary templates.
//!
//! Used whenever generated text is unavailable, and to pad generated
//! summaries that come back too short.

use crate::types::{Claim, Verdict, VerdictLabel};

fn sources_phrase(count: usize) -> String {
    if count == 1 {
        "1 source".to_string()
    } else {
        format!("{} sources", count)
    }
}

/// Templated summary: `Claim '<text>' is <label> with <pct>% confidence based on <n> sources.`
///
/// With no sources the template states outright that the claim could not be verified.
pub fn fallback_summary(claim: &Claim, verdict: &Verdict, source_count: usize) -> String {
    let base = format!(
        "Claim '{}' is {} with {}% confidence based on {}.",
        claim.text.trim(),
        verdict.label,
        verdict.confidence_percent(),
        sources_phrase(source_count)
    );

    if source_count == 0 {
        format!("{} No sources were available, so it could not be verified.", base)
    } else {
        base
    }
}

/// Sentence appended to generated summaries under the minimum length.
pub fn padding_sentence(verdict: &Verdict, source_count: usize) -> String {
    match verdict.label {
        VerdictLabel::Unverifiable => format!(
            "Overall the claim remains unverifiable after reviewing {}.",
            sources_phrase(source_count)
        ),
        label => format!(
            "Overall verdict: {} at {}% confidence across {}.",
            label,
            verdict.confidence_percent(),
            sources_phrase(source_count)
        ),
    }
}

/// Append a failure note to a summary.
pub fn annotate_summary(summary: &str, note: &str) -> String {
    format!("{} Note: {}.", summary.trim_end(), note.trim_end_matches('.'))
}
