//! Pipeline error taxonomy.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// A pipeline stage that calls an external capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Detection,
    Retrieval,
    Summarization,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Detection => write!(f, "detection"),
            Stage::Retrieval => write!(f, "retrieval"),
            Stage::Summarization => write!(f, "summarization"),
        }
    }
}

/// Errors from the fact-checking pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FactCheckError {
    #[error("Claim classification model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Source retrieval timed out after {0:?}")]
    RetrievalTimeout(Duration),

    #[error("Source retrieval unavailable: {0}")]
    RetrievalUnavailable(String),

    #[error("No sources found")]
    NoSourcesFound,

    #[error("Summarization unavailable: {0}")]
    SummarizationUnavailable(String),

    #[error("Malformed {stage} response: {detail}")]
    MalformedCapabilityResponse { stage: Stage, detail: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl FactCheckError {
    /// The stage this error belongs to, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            FactCheckError::ModelUnavailable(_) => Some(Stage::Detection),
            FactCheckError::RetrievalTimeout(_)
            | FactCheckError::RetrievalUnavailable(_)
            | FactCheckError::NoSourcesFound => Some(Stage::Retrieval),
            FactCheckError::SummarizationUnavailable(_) => Some(Stage::Summarization),
            FactCheckError::MalformedCapabilityResponse { stage, .. } => Some(*stage),
            FactCheckError::InvalidInput(_) => None,
        }
    }

    pub(crate) fn malformed(stage: Stage, detail: impl Into<String>) -> Self {
        FactCheckError::MalformedCapabilityResponse {
            stage,
            detail: detail.into(),
        }
    }
}
