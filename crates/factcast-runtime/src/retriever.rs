//! Source retrieval across one or more search backends.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use factcast_core::{build_search_query, extract_entities, rank_sources, RankingConfig, Source};

use crate::capabilities::{CandidateSource, RetrievalCapability};
use crate::error::{FactCheckError, Stage};
use crate::providers::ProviderError;
use crate::validation::validate_candidate;

/// Each backend is asked for this many times `max_sources` so ranking has
/// something to choose from.
const OVERFETCH_FACTOR: usize = 2;

enum BackendOutcome {
    Responded(Vec<CandidateSource>),
    TimedOut,
    Failed(String),
}

/// Retrieves, validates and ranks sources for a claim.
pub struct SourceRetriever {
    backends: Vec<Arc<dyn RetrievalCapability>>,
    ranking: RankingConfig,
    timeout: Duration,
}

impl SourceRetriever {
    pub fn new(
        backends: Vec<Arc<dyn RetrievalCapability>>,
        ranking: RankingConfig,
        timeout: Duration,
    ) -> Self {
        Self {
            backends,
            ranking,
            timeout,
        }
    }

    pub fn backend_count(&self) -> usize {
        self.backends.len()
    }

    /// Retrieve up to `max_sources` sources for `claim`, best first.
    ///
    /// Backends are queried concurrently. A backend that fails or times out
    /// is skipped as long as another one responded.
    pub async fn retrieve(
        &self,
        claim: &str,
        max_sources: usize,
    ) -> Result<Vec<Source>, FactCheckError> {
        if claim.trim().is_empty() {
            return Err(FactCheckError::InvalidInput("claim text is empty".to_string()));
        }
        if max_sources == 0 {
            return Err(FactCheckError::InvalidInput(
                "max_sources must be at least 1".to_string(),
            ));
        }
        if self.backends.is_empty() {
            return Err(FactCheckError::RetrievalUnavailable(
                "no retrieval backends configured".to_string(),
            ));
        }

        let query = build_search_query(claim, &extract_entities(claim));
        let per_backend = max_sources.saturating_mul(OVERFETCH_FACTOR);

        let outcomes = join_all(
            self.backends
                .iter()
                .map(|backend| self.query_backend(backend.as_ref(), &query, per_backend)),
        )
        .await;

        let mut responded = false;
        let mut timeouts = 0usize;
        let mut failures = Vec::new();
        let mut invalid = 0usize;
        let mut sources = Vec::new();

        for (backend, outcome) in self.backends.iter().zip(outcomes) {
            match outcome {
                BackendOutcome::Responded(candidates) => {
                    responded = true;
                    for candidate in candidates {
                        match validate_candidate(candidate) {
                            Ok(source) => sources.push(source),
                            Err(e) => {
                                invalid += 1;
                                tracing::error!(
                                    stage = %Stage::Retrieval,
                                    backend = backend.name(),
                                    claim = %claim,
                                    error = %e,
                                    "Malformed source from retrieval backend"
                                );
                            }
                        }
                    }
                }
                BackendOutcome::TimedOut => {
                    timeouts += 1;
                    tracing::warn!(
                        backend = backend.name(),
                        timeout = ?self.timeout,
                        "Retrieval backend timed out"
                    );
                }
                BackendOutcome::Failed(reason) => {
                    tracing::warn!(backend = backend.name(), error = %reason, "Retrieval backend failed");
                    failures.push(format!("{}: {}", backend.name(), reason));
                }
            }
        }

        if !responded {
            return Err(if failures.is_empty() && timeouts > 0 {
                FactCheckError::RetrievalTimeout(self.timeout)
            } else {
                FactCheckError::RetrievalUnavailable(failures.join("; "))
            });
        }

        if sources.is_empty() {
            return Err(if invalid > 0 {
                FactCheckError::malformed(
                    Stage::Retrieval,
                    format!("all {} candidate sources were invalid", invalid),
                )
            } else {
                FactCheckError::NoSourcesFound
            });
        }

        let ranked = rank_sources(claim, sources, max_sources, &self.ranking);
        tracing::debug!(claim = %claim, kept = ranked.len(), "Ranked sources");
        Ok(ranked)
    }

    async fn query_backend(
        &self,
        backend: &dyn RetrievalCapability,
        query: &str,
        max_results: usize,
    ) -> BackendOutcome {
        match tokio::time::timeout(self.timeout, backend.search(query, max_results)).await {
            Ok(Ok(candidates)) => BackendOutcome::Responded(candidates),
            Ok(Err(ProviderError::Timeout(_))) | Err(_) => BackendOutcome::TimedOut,
            Ok(Err(e)) => BackendOutcome::Failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use factcast_core::{SourceKind, Stance};
    use parking_lot::Mutex;

    struct ScriptedBackend {
        name: String,
        result: Result<Vec<CandidateSource>, fn() -> ProviderError>,
        queries: Mutex<Vec<(String, usize)>>,
    }

    impl ScriptedBackend {
        fn ok(name: &str, candidates: Vec<CandidateSource>) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                result: Ok(candidates),
                queries: Mutex::new(Vec::new()),
            })
        }

        fn failing(name: &str, make: fn() -> ProviderError) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                result: Err(make),
                queries: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl RetrievalCapability for ScriptedBackend {
        async fn search(
            &self,
            query: &str,
            max_results: usize,
        ) -> Result<Vec<CandidateSource>, ProviderError> {
            self.queries.lock().push((query.to_string(), max_results));
            match &self.result {
                Ok(candidates) => Ok(candidates.clone()),
                Err(make) => Err(make()),
            }
        }

        fn name(&self) -> &str {
            &self.name
        }
    }

    struct HangingBackend;

    #[async_trait]
    impl RetrievalCapability for HangingBackend {
        async fn search(&self, _: &str, _: usize) -> Result<Vec<CandidateSource>, ProviderError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Vec::new())
        }

        fn name(&self) -> &str {
            "hanging"
        }
    }

    fn credibility_only() -> RankingConfig {
        RankingConfig {
            relevance_weight: 0.0,
        }
    }

    fn candidate(url: &str, credibility: f64) -> CandidateSource {
        CandidateSource::new(url, "coverage of the claim")
            .with_credibility(credibility)
            .with_stance(Stance::Support)
    }

    const CLAIM: &str = "Coffee consumption increased by 400% since 2010";

    #[tokio::test]
    async fn test_keeps_top_max_sources() {
        let backend = ScriptedBackend::ok(
            "news",
            vec![
                candidate("https://a.example", 0.5),
                candidate("https://b.example", 0.9),
                candidate("https://c.example", 0.7),
                candidate("https://d.example", 0.8),
                candidate("https://e.example", 0.6),
            ],
        );
        let retriever = SourceRetriever::new(vec![backend.clone()], credibility_only(), Duration::from_secs(1));

        let sources = retriever.retrieve(CLAIM, 3).await.unwrap();
        let urls: Vec<&str> = sources.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(urls, vec!["https://b.example", "https://d.example", "https://c.example"]);

        let queries = backend.queries.lock();
        assert_eq!(queries.len(), 1);
        assert!(queries[0].0.starts_with(CLAIM));
        assert!(queries[0].0.contains("400%"));
        assert_eq!(queries[0].1, 6);
    }

    #[tokio::test]
    async fn test_ties_break_by_url() {
        let backend = ScriptedBackend::ok(
            "news",
            vec![
                candidate("https://z.example", 0.8),
                candidate("https://m.example", 0.8),
                candidate("https://a.example", 0.8),
            ],
        );
        let retriever = SourceRetriever::new(vec![backend], credibility_only(), Duration::from_secs(1));

        let sources = retriever.retrieve(CLAIM, 2).await.unwrap();
        assert_eq!(sources[0].url, "https://a.example");
        assert_eq!(sources[1].url, "https://m.example");
    }

    #[tokio::test]
    async fn test_partial_backend_failure() {
        let good = ScriptedBackend::ok("academic", vec![candidate("https://doi.org/1", 0.9)]);
        let bad = ScriptedBackend::failing("news", || ProviderError::HttpError("503".into()));
        let retriever = SourceRetriever::new(vec![bad, good], credibility_only(), Duration::from_secs(1));

        let sources = retriever.retrieve(CLAIM, 3).await.unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].url, "https://doi.org/1");
    }

    #[tokio::test]
    async fn test_dedupes_across_backends() {
        let news = ScriptedBackend::ok("news", vec![candidate("https://shared.example", 0.6)]);
        let gov = ScriptedBackend::ok("gov", vec![candidate("https://shared.example", 0.9)]);
        let retriever = SourceRetriever::new(vec![news, gov], credibility_only(), Duration::from_secs(1));

        let sources = retriever.retrieve(CLAIM, 3).await.unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].credibility, 0.9);
    }

    #[tokio::test]
    async fn test_fills_defaults_from_kind_and_excerpt() {
        let backend = ScriptedBackend::ok(
            "gov",
            vec![CandidateSource::new("https://stats.example.gov", "Official data confirms the increase")
                .with_kind(SourceKind::Government)],
        );
        let retriever = SourceRetriever::new(vec![backend], RankingConfig::default(), Duration::from_secs(1));

        let sources = retriever.retrieve(CLAIM, 3).await.unwrap();
        assert_eq!(sources[0].credibility, 0.95);
        assert_eq!(sources[0].stance, Stance::Support);
    }

    #[tokio::test]
    async fn test_no_sources_found() {
        let backend = ScriptedBackend::ok("news", Vec::new());
        let retriever = SourceRetriever::new(vec![backend], RankingConfig::default(), Duration::from_secs(1));
        assert_eq!(
            retriever.retrieve(CLAIM, 3).await,
            Err(FactCheckError::NoSourcesFound)
        );
    }

    #[tokio::test]
    async fn test_all_candidates_invalid_is_malformed() {
        let backend = ScriptedBackend::ok(
            "news",
            vec![candidate("", 0.5), candidate("https://a.example", 1.7)],
        );
        let retriever = SourceRetriever::new(vec![backend], RankingConfig::default(), Duration::from_secs(1));

        let result = retriever.retrieve(CLAIM, 3).await;
        assert!(matches!(
            result,
            Err(FactCheckError::MalformedCapabilityResponse {
                stage: Stage::Retrieval,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_invalid_candidates_dropped() {
        let backend = ScriptedBackend::ok(
            "news",
            vec![candidate("", 0.5), candidate("https://ok.example", 0.7)],
        );
        let retriever = SourceRetriever::new(vec![backend], RankingConfig::default(), Duration::from_secs(1));

        let sources = retriever.retrieve(CLAIM, 3).await.unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].url, "https://ok.example");
    }

    #[tokio::test]
    async fn test_all_backends_unavailable() {
        let a = ScriptedBackend::failing("news", || ProviderError::AuthError);
        let b = ScriptedBackend::failing("gov", || ProviderError::HttpError("refused".into()));
        let retriever = SourceRetriever::new(vec![a, b], RankingConfig::default(), Duration::from_secs(1));

        match retriever.retrieve(CLAIM, 3).await {
            Err(FactCheckError::RetrievalUnavailable(msg)) => {
                assert!(msg.contains("news"));
                assert!(msg.contains("gov"));
            }
            other => panic!("expected RetrievalUnavailable, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_backends_time_out() {
        let retriever = SourceRetriever::new(
            vec![Arc::new(HangingBackend)],
            RankingConfig::default(),
            Duration::from_millis(100),
        );
        assert_eq!(
            retriever.retrieve(CLAIM, 3).await,
            Err(FactCheckError::RetrievalTimeout(Duration::from_millis(100)))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_backend_skipped() {
        let good = ScriptedBackend::ok("news", vec![candidate("https://a.example", 0.8)]);
        let retriever = SourceRetriever::new(
            vec![Arc::new(HangingBackend), good],
            RankingConfig::default(),
            Duration::from_millis(100),
        );
        assert_eq!(retriever.retrieve(CLAIM, 3).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_input() {
        let retriever = SourceRetriever::new(
            vec![ScriptedBackend::ok("news", Vec::new())],
            RankingConfig::default(),
            Duration::from_secs(1),
        );
        assert!(matches!(retriever.retrieve("  ", 3).await, Err(FactCheckError::InvalidInput(_))));
        assert!(matches!(retriever.retrieve(CLAIM, 0).await, Err(FactCheckError::InvalidInput(_))));

        let empty = SourceRetriever::new(Vec::new(), RankingConfig::default(), Duration::from_secs(1));
        assert!(matches!(
            empty.retrieve(CLAIM, 3).await,
            Err(FactCheckError::RetrievalUnavailable(_))
        ));
    }
}
