//! Runtime orchestrator for the fact-checking pipeline.
//!
//! The orchestrator turns text into fact-check results:
//! - Claim detection over the whole text (failure aborts the call)
//! - Per-claim fan-out: retrieval, aggregation, summarization
//! - Failure isolation: a failing claim yields a degraded result, not an error
//! - Token budget and result cache around the summarizer
//!
//! With the result cache off (the default) each claim always gets its own
//! retrieval call, whatever happened to other claims. The token budget can
//! swap a generated summary for the template but never touches sources or
//! verdicts.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use factcast_core::{
    annotate_summary, fallback_summary, Claim, ConfigError, FactCheckResult, Source, Verdict,
    VerdictAggregator,
};

use crate::cache::ResultCache;
use crate::capabilities::{ClassificationCapability, RetrievalCapability};
use crate::config::RuntimeConfig;
use crate::detector::ClaimDetector;
use crate::error::FactCheckError;
use crate::providers::LlmProvider;
use crate::resilience::{BudgetTracker, LlmUsage};
use crate::retriever::SourceRetriever;
use crate::summarizer::Summarizer;

/// Errors from building an orchestrator.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Missing capability: {0}")]
    MissingCapability(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// Results of a cancellable run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOutcome {
    /// Completed results in claim order. Claims still in flight when
    /// cancellation arrived are omitted.
    pub results: Vec<FactCheckResult>,

    pub cancelled: bool,
}

/// Composes detection, retrieval, aggregation and summarization.
///
/// Configuration is fixed at construction. Concurrent claims share only the
/// token budget, which decides between a generated and a templated summary,
/// and the result cache, which holds complete results of earlier checks.
pub struct FactCheckOrchestrator {
    config: RuntimeConfig,
    detector: ClaimDetector,
    retriever: SourceRetriever,
    aggregator: VerdictAggregator,
    summarizer: Summarizer,
    budget_tracker: BudgetTracker,
    cache: Option<ResultCache>,
}

impl FactCheckOrchestrator {
    pub fn builder() -> FactCheckOrchestratorBuilder {
        FactCheckOrchestratorBuilder::default()
    }

    /// Check every claim detected in `text`.
    ///
    /// Results are returned in detection order. Detection failure aborts the
    /// call; any later failure is confined to its claim's result.
    pub async fn process(&self, text: &str) -> Result<Vec<FactCheckResult>, FactCheckError> {
        let claims = self
            .detector
            .detect(text, self.config.pipeline.detection_threshold)
            .await?;

        let results = stream::iter(claims.map(|claim| self.check_claim(claim)))
            .buffered(self.config.max_concurrent_claims)
            .collect::<Vec<_>>()
            .await;

        tracing::info!(claims = results.len(), "Processed text");
        Ok(results)
    }

    /// Like [`FactCheckOrchestrator::process`], stopping when `token` is cancelled.
    ///
    /// On cancellation, in-flight claims are abandoned and only completed
    /// results are returned.
    pub async fn process_with_cancellation(
        &self,
        text: &str,
        token: &CancellationToken,
    ) -> Result<ProcessOutcome, FactCheckError> {
        let claims = tokio::select! {
            biased;
            _ = token.cancelled() => {
                tracing::info!("Cancelled during claim detection");
                return Ok(ProcessOutcome { results: Vec::new(), cancelled: true });
            }
            detected = self.detector.detect(text, self.config.pipeline.detection_threshold) => detected?,
        };

        let mut pending = std::pin::pin!(stream::iter(claims.enumerate().map(
            |(index, claim)| async move { (index, self.check_claim(claim).await) }
        ))
        .buffer_unordered(self.config.max_concurrent_claims));

        let mut completed = Vec::new();
        let cancelled = loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break true,
                next = pending.next() => match next {
                    Some(item) => completed.push(item),
                    None => break false,
                },
            }
        };

        if cancelled {
            tracing::info!(completed = completed.len(), "Cancelled, returning completed claims");
        }

        completed.sort_by_key(|(index, _)| *index);
        Ok(ProcessOutcome {
            results: completed.into_iter().map(|(_, result)| result).collect(),
            cancelled,
        })
    }

    /// Check a single claim. Never fails; failures produce a degraded result.
    pub async fn check_claim(&self, claim: Claim) -> FactCheckResult {
        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get(&claim).await {
                tracing::debug!(claim = %claim.text, "Result cache hit");
                return cached;
            }
        }

        let sources = match self
            .retriever
            .retrieve(&claim.text, self.config.pipeline.max_sources)
            .await
        {
            Ok(sources) => sources,
            Err(e) => return self.degraded(claim, Vec::new(), &e),
        };

        let verdict = self.aggregator.aggregate(&sources);

        let summary = match self.summarize(&claim, &sources, &verdict).await {
            Ok(summary) => summary,
            Err(e) => return self.degraded(claim, sources, &e),
        };

        let result = FactCheckResult::new(
            claim,
            sources,
            verdict,
            summary,
            self.config.pipeline.flag_below,
        );

        if let Some(cache) = &self.cache {
            cache.insert(&result).await;
        }
        result
    }

    /// Generative-capability usage so far.
    pub fn usage(&self) -> LlmUsage {
        self.budget_tracker.usage()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    async fn summarize(
        &self,
        claim: &Claim,
        sources: &[Source],
        verdict: &Verdict,
    ) -> Result<String, FactCheckError> {
        // No sources means the template and no generation call.
        if sources.is_empty() {
            return self.summarizer.summarize(claim, sources, verdict).await;
        }

        let estimate = self.summarizer.estimate_tokens(claim, sources, verdict);
        let Some(reservation) = self.budget_tracker.try_reserve(estimate) else {
            tracing::warn!(
                claim = %claim.text,
                estimate,
                remaining = self.budget_tracker.remaining(),
                "Token budget exhausted, using template summary"
            );
            return Ok(fallback_summary(claim, verdict, sources.len()));
        };

        // On error or cancellation the reservation drops and is released.
        let summary = self
            .summarizer
            .summarize_with_usage(claim, sources, verdict)
            .await?;
        if let Some(usage) = &summary.usage {
            reservation.settle(usage);
        }
        Ok(summary.text)
    }

    fn degraded(&self, claim: Claim, sources: Vec<Source>, error: &FactCheckError) -> FactCheckResult {
        tracing::warn!(
            claim = %claim.text,
            stage = ?error.stage(),
            error = %error,
            "Claim degraded to unverifiable"
        );

        let verdict = Verdict::unverifiable();
        let summary = annotate_summary(
            &fallback_summary(&claim, &verdict, sources.len()),
            &error.to_string(),
        );

        FactCheckResult::new(
            claim,
            sources,
            verdict,
            summary,
            self.config.pipeline.flag_below,
        )
        .with_error(error.to_string())
    }
}

/// Builder for [`FactCheckOrchestrator`].
#[derive(Default)]
pub struct FactCheckOrchestratorBuilder {
    config: RuntimeConfig,
    classifier: Option<Arc<dyn ClassificationCapability>>,
    backends: Vec<Arc<dyn RetrievalCapability>>,
    generator: Option<Arc<dyn LlmProvider>>,
}

impl FactCheckOrchestratorBuilder {
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn classifier(mut self, classifier: Arc<dyn ClassificationCapability>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Add a retrieval backend. Backends are queried concurrently.
    pub fn retrieval_backend(mut self, backend: Arc<dyn RetrievalCapability>) -> Self {
        self.backends.push(backend);
        self
    }

    pub fn generator(mut self, generator: Arc<dyn LlmProvider>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn build(self) -> Result<FactCheckOrchestrator, BuildError> {
        self.config.validate()?;

        let classifier = self
            .classifier
            .ok_or(BuildError::MissingCapability("classifier"))?;
        let generator = self
            .generator
            .ok_or(BuildError::MissingCapability("generator"))?;
        if self.backends.is_empty() {
            return Err(BuildError::MissingCapability("retrieval backend"));
        }

        let config = self.config;
        let timeouts = &config.timeouts;

        let detector = ClaimDetector::new(
            classifier,
            config.pipeline.claim_label.clone(),
            timeouts.detection,
        )
        .with_concurrency(config.max_concurrent_detections);
        let retriever = SourceRetriever::new(
            self.backends,
            config.pipeline.ranking.clone(),
            timeouts.retrieval,
        );
        let summarizer = Summarizer::new(
            generator,
            config
                .completion
                .to_completion_config(timeouts.summarization),
            config.pipeline.summary.clone(),
        );

        tracing::debug!(
            backends = retriever.backend_count(),
            generator = summarizer.provider_name(),
            "Built fact-check orchestrator"
        );

        Ok(FactCheckOrchestrator {
            aggregator: VerdictAggregator::new(config.pipeline.aggregation.clone()),
            budget_tracker: BudgetTracker::new(config.summary_token_budget),
            cache: config
                .cache
                .enabled
                .then(|| ResultCache::from_config(&config.cache)),
            detector,
            retriever,
            summarizer,
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{CandidateSource, Classification};
    use crate::providers::{
        ChatMessage, CompletionConfig, CompletionResponse, ProviderError, TokenUsage,
    };
    use async_trait::async_trait;
    use factcast_core::{Stance, VerdictLabel};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct AllClaims;

    #[async_trait]
    impl ClassificationCapability for AllClaims {
        async fn classify(&self, _text: &str) -> Result<Vec<Classification>, ProviderError> {
            Ok(vec![Classification::new("CLAIM", 0.9)])
        }

        fn name(&self) -> &str {
            "all-claims"
        }
    }

    struct CountingBackend {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl RetrievalCapability for CountingBackend {
        async fn search(&self, _: &str, _: usize) -> Result<Vec<CandidateSource>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ProviderError::HttpError("down".into()));
            }
            Ok(vec![
                CandidateSource::new("https://a.example", "confirms")
                    .with_credibility(0.9)
                    .with_stance(Stance::Support),
                CandidateSource::new("https://b.example", "shows")
                    .with_credibility(0.8)
                    .with_stance(Stance::Support),
            ])
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    struct FixedLlm {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LlmProvider for FixedLlm {
        async fn complete(
            &self,
            _messages: Vec<ChatMessage>,
            _config: &CompletionConfig,
        ) -> Result<CompletionResponse, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(CompletionResponse {
                content: "The claim is supported by two credible sources with no contradictions found, giving a true verdict at full confidence for listeners who want the short version of this check today.".to_string(),
                usage: TokenUsage {
                    prompt_tokens: 300,
                    completion_tokens: 50,
                    ..Default::default()
                },
            })
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn orchestrator(
        config: RuntimeConfig,
        backend: Arc<CountingBackend>,
        llm: Arc<FixedLlm>,
    ) -> FactCheckOrchestrator {
        FactCheckOrchestrator::builder()
            .config(config)
            .classifier(Arc::new(AllClaims))
            .retrieval_backend(backend)
            .generator(llm)
            .build()
            .unwrap()
    }

    fn backend(fail: bool) -> Arc<CountingBackend> {
        Arc::new(CountingBackend {
            calls: AtomicUsize::new(0),
            fail,
        })
    }

    fn llm() -> Arc<FixedLlm> {
        Arc::new(FixedLlm {
            calls: AtomicUsize::new(0),
        })
    }

    #[test]
    fn test_build_requires_capabilities() {
        let result = FactCheckOrchestrator::builder()
            .classifier(Arc::new(AllClaims))
            .generator(llm())
            .build();
        assert!(matches!(result, Err(BuildError::MissingCapability("retrieval backend"))));

        let result = FactCheckOrchestrator::builder()
            .retrieval_backend(backend(false))
            .generator(llm())
            .build();
        assert!(matches!(result, Err(BuildError::MissingCapability("classifier"))));
    }

    #[test]
    fn test_build_validates_config() {
        let mut config = RuntimeConfig::default();
        config.max_concurrent_claims = 0;
        let result = FactCheckOrchestrator::builder()
            .config(config)
            .classifier(Arc::new(AllClaims))
            .retrieval_backend(backend(false))
            .generator(llm())
            .build();
        assert!(matches!(result, Err(BuildError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_happy_path_records_usage() {
        let llm = llm();
        let orchestrator = orchestrator(RuntimeConfig::default(), backend(false), llm.clone());

        let results = orchestrator.process("Sales rose 5% in 2023.").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].verdict, Verdict::new(VerdictLabel::True, 1.0));
        assert!(!results[0].flagged);
        assert!(results[0].error.is_none());

        let usage = orchestrator.usage();
        assert_eq!(usage.llm_calls, 1);
        assert_eq!(usage.total_tokens, 350);
    }

    #[tokio::test]
    async fn test_cache_skips_repeat_work() {
        let mut config = RuntimeConfig::default();
        config.cache.enabled = true;
        let backend = backend(false);
        let llm = llm();
        let orchestrator = orchestrator(config, backend.clone(), llm.clone());

        orchestrator.process("Sales rose 5% in 2023.").await.unwrap();
        let again = orchestrator.process("sales  rose 5% in 2023.").await.unwrap();

        assert_eq!(again[0].claim.text, "sales  rose 5% in 2023.");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_budget_exhaustion_uses_template() {
        let mut config = RuntimeConfig::default();
        config.summary_token_budget = 10;
        let llm = llm();
        let orchestrator = orchestrator(config, backend(false), llm.clone());

        let results = orchestrator.process("Sales rose 5% in 2023.").await.unwrap();
        assert_eq!(results[0].verdict.label, VerdictLabel::True);
        assert!(results[0].summary.starts_with("Claim 'Sales rose 5% in 2023.' is true"));
        assert!(results[0].error.is_none());
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
        assert_eq!(orchestrator.usage().budget_skips, 1);
    }

    #[tokio::test]
    async fn test_repeated_failures_still_call_backend() {
        let backend = backend(true);
        let orchestrator = orchestrator(RuntimeConfig::default(), backend.clone(), llm());

        for _ in 0..5 {
            let results = orchestrator.process("Sales rose 5% in 2023.").await.unwrap();
            assert_eq!(results[0].verdict, Verdict::unverifiable());
            assert!(results[0].flagged);
        }

        assert_eq!(backend.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_degraded_summary_mentions_error() {
        let orchestrator = orchestrator(RuntimeConfig::default(), backend(true), llm());
        let result = orchestrator
            .check_claim(Claim::new("Tea sales fell 5%", 0.9))
            .await;

        assert!(result.is_degraded());
        assert!(result.summary.contains("Note: Source retrieval unavailable"));
        assert!(result.sources.is_empty());
    }
}
