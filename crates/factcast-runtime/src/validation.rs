//! Validation of capability responses.
//!
//! Capabilities produce raw data, not trusted values. Anything that fails
//! these checks is reported as a malformed response, never best-effort parsed.

use factcast_core::{infer_stance, Source, SourceError};
use thiserror::Error;

use crate::capabilities::{CandidateSource, Classification};

/// Errors from response validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResponseValidationError {
    #[error("Classifier returned no labels")]
    EmptyClassification,

    #[error("Classification label is empty")]
    EmptyLabel,

    #[error("Classification score for '{label}' out of range: {score}")]
    ScoreOutOfRange { label: String, score: f64 },

    #[error("Invalid source '{url}': {reason}")]
    InvalidSource { url: String, reason: SourceError },

    #[error("Generated text is empty")]
    EmptyGeneration,
}

/// Check every label is named and scored within `[0, 1]`.
pub fn validate_classifications(
    classifications: &[Classification],
) -> Result<(), ResponseValidationError> {
    if classifications.is_empty() {
        return Err(ResponseValidationError::EmptyClassification);
    }

    for c in classifications {
        if c.label.trim().is_empty() {
            return Err(ResponseValidationError::EmptyLabel);
        }
        if !(0.0..=1.0).contains(&c.score) {
            return Err(ResponseValidationError::ScoreOutOfRange {
                label: c.label.clone(),
                score: c.score,
            });
        }
    }

    Ok(())
}

/// Turn a candidate into a validated [`Source`].
///
/// Missing credibility falls back to the kind's default; missing stance is
/// inferred from the excerpt.
pub fn validate_candidate(candidate: CandidateSource) -> Result<Source, ResponseValidationError> {
    let credibility = candidate
        .credibility
        .unwrap_or_else(|| candidate.kind.default_credibility());
    let stance = candidate
        .stance
        .unwrap_or_else(|| infer_stance(&candidate.excerpt));

    Source::new(candidate.url.clone(), credibility, stance, candidate.excerpt)
        .map(|source| source.with_kind(candidate.kind))
        .map_err(|reason| ResponseValidationError::InvalidSource {
            url: candidate.url,
            reason,
        })
}

/// Check generated text has content.
pub fn validate_generation(text: &str) -> Result<&str, ResponseValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(ResponseValidationError::EmptyGeneration)
    } else {
        Ok(trimmed)
    }
}
