//! # factcast-runtime
//!
//! Async claim-verification pipeline for FactCast.
//!
//! This crate wires the deterministic model in `factcast-core` to the three
//! external capabilities a fact check needs:
//! - a text classifier that spots claims ([`ClassificationCapability`])
//! - one or more search backends that find sources ([`RetrievalCapability`])
//! - a generative model that writes the summary ([`LlmProvider`])
//!
//! Verdicts are never delegated to a model. They are computed by
//! [`factcast_core::VerdictAggregator`] from source credibility and stance.
//!
//! ## Example
//!
//! ```rust,ignore
//! use factcast_runtime::{FactCheckOrchestrator, RuntimeConfig};
//!
//! let orchestrator = FactCheckOrchestrator::builder()
//!     .config(RuntimeConfig::from_yaml_file("factcast.yaml")?)
//!     .classifier(classifier)
//!     .retrieval_backend(news)
//!     .retrieval_backend(academic)
//!     .generator(llm)
//!     .build()?;
//!
//! for result in orchestrator.process(transcript).await? {
//!     println!("{}: {}", result.verdict.label, result.summary);
//! }
//! ```

pub mod cache;
pub mod capabilities;
pub mod config;
pub mod detector;
pub mod error;
pub mod orchestrator;
pub mod prompts;
pub mod providers;
pub mod resilience;
pub mod retriever;
pub mod summarizer;
pub mod validation;

pub use cache::ResultCache;
pub use capabilities::{
    CandidateSource, Classification, ClassificationCapability, RetrievalCapability,
};
pub use config::{CacheConfig, CompletionSettings, RuntimeConfig, TimeoutConfig};
pub use detector::{ClaimDetector, Claims};
pub use error::{FactCheckError, Stage};
pub use orchestrator::{
    BuildError, FactCheckOrchestrator, FactCheckOrchestratorBuilder, ProcessOutcome,
};
pub use providers::{
    ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, ProviderError,
    ProviderFactory, ProviderRegistry, Role, TokenUsage,
};
pub use resilience::{BudgetReservation, BudgetTracker, LlmUsage};
pub use retriever::SourceRetriever;
pub use summarizer::{GeneratedSummary, Summarizer};

pub use tokio_util::sync::CancellationToken;
