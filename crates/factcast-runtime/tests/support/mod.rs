//! Deterministic fake capabilities for pipeline tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use factcast_core::Stance;
use factcast_runtime::{
    CandidateSource, ChatMessage, Classification, ClassificationCapability, CompletionConfig,
    CompletionResponse, FactCheckOrchestrator, LlmProvider, ProviderError, RetrievalCapability,
    RuntimeConfig, TokenUsage,
};

/// Treats any sentence containing a digit as a claim.
pub struct DigitClassifier;

#[async_trait]
impl ClassificationCapability for DigitClassifier {
    async fn classify(&self, text: &str) -> Result<Vec<Classification>, ProviderError> {
        let score = if text.chars().any(|c| c.is_ascii_digit()) {
            0.93
        } else {
            0.12
        };
        Ok(vec![
            Classification::new("CLAIM", score),
            Classification::new("NOT_CLAIM", 1.0 - score),
        ])
    }

    fn name(&self) -> &str {
        "digit-classifier"
    }
}

pub struct DownClassifier;

#[async_trait]
impl ClassificationCapability for DownClassifier {
    async fn classify(&self, _text: &str) -> Result<Vec<Classification>, ProviderError> {
        Err(ProviderError::HttpError("connection refused".to_string()))
    }

    fn name(&self) -> &str {
        "down-classifier"
    }
}

/// Returns canned candidates for queries containing a keyword.
#[derive(Default)]
pub struct KeywordRetriever {
    canned: BTreeMap<String, Vec<CandidateSource>>,
    delays: BTreeMap<String, Duration>,
    failing: Vec<String>,
    pub calls: AtomicUsize,
}

impl KeywordRetriever {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, keyword: &str, candidates: Vec<CandidateSource>) -> Self {
        self.canned.insert(keyword.to_string(), candidates);
        self
    }

    pub fn delay(mut self, keyword: &str, delay: Duration) -> Self {
        self.delays.insert(keyword.to_string(), delay);
        self
    }

    /// Fail every query containing `keyword`.
    pub fn failing(mut self, keyword: &str) -> Self {
        self.failing.push(keyword.to_string());
        self
    }
}

#[async_trait]
impl RetrievalCapability for KeywordRetriever {
    async fn search(
        &self,
        query: &str,
        _max_results: usize,
    ) -> Result<Vec<CandidateSource>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some((_, delay)) = self.delays.iter().find(|(k, _)| query.contains(k.as_str())) {
            tokio::time::sleep(*delay).await;
        }

        if self.failing.iter().any(|k| query.contains(k.as_str())) {
            return Err(ProviderError::ApiError {
                status: 503,
                message: "search index unavailable".to_string(),
            });
        }

        Ok(self
            .canned
            .iter()
            .find(|(k, _)| query.contains(k.as_str()))
            .map(|(_, candidates)| candidates.clone())
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "keyword-retriever"
    }
}

/// Generative fake: fixed reply, or failure. Bills 245 tokens per reply.
pub struct FakeLlm {
    reply: Option<String>,
    delay: Option<Duration>,
    pub calls: AtomicUsize,
}

impl FakeLlm {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            reply: None,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl LlmProvider for FakeLlm {
    async fn complete(
        &self,
        _messages: Vec<ChatMessage>,
        _config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.reply {
            Some(reply) => Ok(CompletionResponse {
                content: reply.clone(),
                usage: TokenUsage {
                    prompt_tokens: 200,
                    completion_tokens: 45,
                    ..Default::default()
                },
            }),
            None => Err(ProviderError::HttpError("dns error: no such host".to_string())),
        }
    }

    fn name(&self) -> &str {
        "fake-llm"
    }
}

pub const GENERATED: &str = "Two credible sources support the claim that coffee consumption rose sharply, while one low credibility source disputes the size of the increase. On balance the claim is true, with about seventy percent confidence for listeners.";

pub fn source(url: &str, credibility: f64, stance: Stance, excerpt: &str) -> CandidateSource {
    CandidateSource::new(url, excerpt)
        .with_credibility(credibility)
        .with_stance(stance)
}

pub fn coffee_sources() -> Vec<CandidateSource> {
    vec![
        source(
            "https://stats.example.gov/coffee",
            0.9,
            Stance::Support,
            "Coffee consumption increased sharply since 2010",
        ),
        source(
            "https://journal.example.edu/beverages",
            0.8,
            Stance::Support,
            "Survey shows coffee consumption up 400%",
        ),
        source(
            "https://blog.example.com/coffee-myth",
            0.3,
            Stance::Contradict,
            "Refutes the 400% figure",
        ),
    ]
}

/// Default config. The result cache is off, so every run reaches the fakes.
pub fn test_config() -> RuntimeConfig {
    RuntimeConfig::default()
}

pub fn orchestrator(
    classifier: Arc<dyn ClassificationCapability>,
    retriever: Arc<dyn RetrievalCapability>,
    llm: Arc<dyn LlmProvider>,
) -> FactCheckOrchestrator {
    orchestrator_with(test_config(), classifier, retriever, llm)
}

pub fn orchestrator_with(
    config: RuntimeConfig,
    classifier: Arc<dyn ClassificationCapability>,
    retriever: Arc<dyn RetrievalCapability>,
    llm: Arc<dyn LlmProvider>,
) -> FactCheckOrchestrator {
    FactCheckOrchestrator::builder()
        .config(config)
        .classifier(classifier)
        .retrieval_backend(retriever)
        .generator(llm)
        .build()
        .expect("valid test orchestrator")
}
