//! Provider implementations for the external capabilities.
//!
//! Summaries are generated through [`LlmProvider`]. Classification and
//! retrieval traits live in [`crate::capabilities`]; the HTTP-backed
//! implementations of all three sit here, each behind its own feature.
//! Credentials go through [`secrets`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

mod factory;
pub mod secrets;

#[cfg(any(
    feature = "anthropic",
    feature = "huggingface",
    feature = "http-retrieval"
))]
mod http;

#[cfg(feature = "anthropic")]
mod anthropic;

#[cfg(feature = "huggingface")]
mod huggingface;

#[cfg(feature = "http-retrieval")]
mod http_search;

pub use factory::{ProviderFactory, ProviderRegistry};
pub use secrets::{ApiCredential, CredentialSource};

#[cfg(feature = "anthropic")]
pub use anthropic::{AnthropicProvider, AnthropicProviderFactory, ANTHROPIC_API_KEY_ENV};

#[cfg(feature = "huggingface")]
pub use huggingface::{HuggingFaceClassifier, HF_TOKEN_ENV};

#[cfg(feature = "http-retrieval")]
pub use http_search::HttpSearchBackend;

/// Failures reported by a capability provider.
///
/// Components map these onto [`crate::FactCheckError`]; `ParseError` is the
/// only variant treated as a malformed response rather than an outage.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("Rate limit exceeded, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    ParseError(String),

    #[error("Authentication failed")]
    AuthError,

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// Settings for one summary request.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub model: String,

    /// Upper bound on generated tokens; also the output share of a budget estimate
    pub max_tokens: u32,

    pub temperature: f32,

    pub timeout: Duration,

    pub prompt_caching: bool,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-5-20250514".to_string(),
            max_tokens: 200,
            temperature: 0.0,
            timeout: Duration::from_secs(15),
            prompt_caching: true,
        }
    }
}

/// Who a prompt message speaks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
    pub usage: TokenUsage,
}

/// Tokens billed for one completion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenUsage {
    pub prompt_tokens: u32,

    pub completion_tokens: u32,

    /// Prompt tokens served from the provider's prompt cache
    pub cache_read_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.prompt_tokens.saturating_add(self.completion_tokens)
    }
}

/// The generative-text capability behind the summarizer.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError>;

    fn name(&self) -> &str;

    /// Rough token count for `text`, used to reserve budget before a call.
    fn estimate_tokens(&self, text: &str) -> u32 {
        u32::try_from(text.len() / 4).unwrap_or(u32::MAX)
    }
}
