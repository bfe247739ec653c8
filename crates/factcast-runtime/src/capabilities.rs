//! Capability interfaces for claim classification and source retrieval.
//!
//! These are the narrow seams to the external ML and search services.
//! Components receive them as `Arc<dyn ...>`, so tests can substitute
//! deterministic fakes. The generative-text capability is
//! [`crate::providers::LlmProvider`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use factcast_core::{SourceKind, Stance};

use crate::providers::ProviderError;

/// One label/score pair emitted by a text classifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Classification {
    pub label: String,
    pub score: f64,
}

impl Classification {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// A text-classification capability.
#[async_trait]
pub trait ClassificationCapability: Send + Sync {
    /// Classify a piece of text.
    async fn classify(&self, text: &str) -> Result<Vec<Classification>, ProviderError>;

    /// Capability name for logs.
    fn name(&self) -> &str;
}

/// A source as reported by a retrieval backend, before validation.
///
/// Backends may omit credibility and stance; the retriever fills them in
/// from the source kind and the excerpt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateSource {
    pub url: String,

    #[serde(default)]
    pub credibility: Option<f64>,

    #[serde(default)]
    pub stance: Option<Stance>,

    #[serde(default)]
    pub excerpt: String,

    #[serde(default)]
    pub kind: SourceKind,
}

impl CandidateSource {
    pub fn new(url: impl Into<String>, excerpt: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            credibility: None,
            stance: None,
            excerpt: excerpt.into(),
            kind: SourceKind::Other,
        }
    }

    pub fn with_credibility(mut self, credibility: f64) -> Self {
        self.credibility = Some(credibility);
        self
    }

    pub fn with_stance(mut self, stance: Stance) -> Self {
        self.stance = Some(stance);
        self
    }

    pub fn with_kind(mut self, kind: SourceKind) -> Self {
        self.kind = kind;
        self
    }
}

/// A search/retrieval backend.
#[async_trait]
pub trait RetrievalCapability: Send + Sync {
    /// Search for sources about `query`, returning at most roughly `max_results`.
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<CandidateSource>, ProviderError>;

    /// Backend name for logs.
    fn name(&self) -> &str;
}
