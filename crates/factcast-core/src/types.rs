//! Core data model: claims, sources, verdicts and fact-check results.
//!
//! Every type here is immutable once built. Sources validate their
//! invariants on construction so downstream code never sees an empty url
//! or a credibility outside `[0, 1]`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised when building a [`Source`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error("Source url must not be empty")]
    EmptyUrl,

    #[error("Source credibility must be within [0, 1], got {0}")]
    CredibilityOutOfRange(f64),
}

/// A factual assertion extracted from text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claim {
    /// The sentence that was classified as a claim
    pub text: String,

    /// Classifier confidence (0.0 - 1.0)
    pub confidence: f64,
}

impl Claim {
    pub fn new(text: impl Into<String>, confidence: f64) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// Whether a source supports, contradicts, or is neutral toward a claim.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Stance {
    Support,
    Contradict,
    Neutral,
}

impl fmt::Display for Stance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stance::Support => write!(f, "support"),
            Stance::Contradict => write!(f, "contradict"),
            Stance::Neutral => write!(f, "neutral"),
        }
    }
}

/// Broad category of a source, used for default credibility.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Government,
    Academic,
    News,
    #[default]
    Other,
}

impl SourceKind {
    /// Credibility assigned when a retrieval backend does not score a source.
    pub fn default_credibility(&self) -> f64 {
        match self {
            SourceKind::Government => 0.95,
            SourceKind::Academic => 0.90,
            SourceKind::News => 0.80,
            SourceKind::Other => 0.70,
        }
    }
}

/// A retrieved document with a credibility score and a stance toward a claim.
///
/// Deserialization goes through [`Source::new`], so a decoded source obeys
/// the same url and credibility checks as a constructed one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "SourceFields")]
pub struct Source {
    /// Location of the document (never empty)
    pub url: String,

    /// Credibility of the publisher (0.0 - 1.0)
    pub credibility: f64,

    /// Stance toward the claim
    pub stance: Stance,

    /// Relevant passage from the document
    pub excerpt: String,

    /// Category of the source
    #[serde(default)]
    pub kind: SourceKind,
}

impl Source {
    /// Create a validated source of kind [`SourceKind::Other`].
    pub fn new(
        url: impl Into<String>,
        credibility: f64,
        stance: Stance,
        excerpt: impl Into<String>,
    ) -> Result<Self, SourceError> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(SourceError::EmptyUrl);
        }
        if !(0.0..=1.0).contains(&credibility) {
            return Err(SourceError::CredibilityOutOfRange(credibility));
        }

        Ok(Self {
            url,
            credibility,
            stance,
            excerpt: excerpt.into(),
            kind: SourceKind::Other,
        })
    }

    /// Set the source kind.
    pub fn with_kind(mut self, kind: SourceKind) -> Self {
        self.kind = kind;
        self
    }
}

#[derive(Deserialize)]
struct SourceFields {
    url: String,
    credibility: f64,
    stance: Stance,
    excerpt: String,
    #[serde(default)]
    kind: SourceKind,
}

impl TryFrom<SourceFields> for Source {
    type Error = SourceError;

    fn try_from(fields: SourceFields) -> Result<Self, Self::Error> {
        Source::new(fields.url, fields.credibility, fields.stance, fields.excerpt)
            .map(|source| source.with_kind(fields.kind))
    }
}

/// Aggregated truth determination for a claim.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum VerdictLabel {
    True,
    False,
    Mixed,
    Unverifiable,
}

impl fmt::Display for VerdictLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerdictLabel::True => write!(f, "true"),
            VerdictLabel::False => write!(f, "false"),
            VerdictLabel::Mixed => write!(f, "mixed"),
            VerdictLabel::Unverifiable => write!(f, "unverifiable"),
        }
    }
}

/// A verdict and its confidence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Verdict {
    pub label: VerdictLabel,

    /// Confidence in the label (0.0 - 1.0)
    pub confidence: f64,
}

impl Verdict {
    pub fn new(label: VerdictLabel, confidence: f64) -> Self {
        Self {
            label,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// The verdict for a claim with no usable evidence.
    pub fn unverifiable() -> Self {
        Self {
            label: VerdictLabel::Unverifiable,
            confidence: 0.0,
        }
    }

    /// Confidence as a whole percentage, as shown in summaries.
    pub fn confidence_percent(&self) -> u32 {
        (self.confidence * 100.0).round() as u32
    }
}

/// The outcome of checking one claim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FactCheckResult {
    pub claim: Claim,

    /// Sources in ranked order, highest composite score first
    pub sources: Vec<Source>,

    pub verdict: Verdict,

    /// Natural-language explanation (never empty)
    pub summary: String,

    /// Set when confidence is low or the result is degraded
    pub flagged: bool,

    /// Failure note for degraded results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// When the result was produced
    pub checked_at: DateTime<Utc>,
}

impl FactCheckResult {
    /// Build a result, flagging it when confidence falls below `flag_below`.
    pub fn new(
        claim: Claim,
        sources: Vec<Source>,
        verdict: Verdict,
        summary: impl Into<String>,
        flag_below: f64,
    ) -> Self {
        Self {
            claim,
            sources,
            verdict,
            summary: summary.into(),
            flagged: verdict.confidence < flag_below,
            error: None,
            checked_at: Utc::now(),
        }
    }

    /// Attach a failure note. Degraded results are always flagged.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self.flagged = true;
        self
    }

    /// Whether a pipeline stage failed while producing this result.
    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}
