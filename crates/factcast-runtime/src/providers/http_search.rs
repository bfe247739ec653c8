//! Generic JSON search backend.
//!
//! Speaks a small contract: `GET {endpoint}?q=<query>&limit=<n>` returning
//! `{"results": [{"url": ..., "excerpt": ..., "credibility": ..., "stance": ...}]}`.
//! One instance per search service (news, academic, government); each tags
//! its results with a [`SourceKind`] so unscored results get a default
//! credibility.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::time::Duration;

use factcast_core::{SourceKind, Stance};

use super::{
    http,
    secrets::{ApiCredential, CredentialSource},
    ProviderError,
};
use crate::capabilities::{CandidateSource, RetrievalCapability};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A search service reachable over HTTP.
pub struct HttpSearchBackend {
    name: String,
    endpoint: String,
    kind: SourceKind,
    credential: Option<ApiCredential>,
    timeout: Duration,
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpSearchBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSearchBackend")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("kind", &self.kind)
            .field("credential", &self.credential)
            .finish()
    }
}

impl HttpSearchBackend {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>, kind: SourceKind) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            kind,
            credential: None,
            timeout: DEFAULT_TIMEOUT,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.credential = Some(ApiCredential::new(
            api_key,
            CredentialSource::Programmatic,
            "Search API key",
        ));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Create from JSON configuration.
    ///
    /// ```json
    /// { "name": "news", "endpoint": "https://...", "kind": "news",
    ///   "api_key": "...", "api_key_env": "NEWS_API_KEY" }
    /// ```
    ///
    /// The key is optional; when `api_key_env` is given and the variable is
    /// set, it is used.
    pub fn from_config(config: &JsonValue) -> Result<Self, ProviderError> {
        let name = config["name"].as_str().ok_or_else(|| {
            ProviderError::NotConfigured("search backend 'name' is required".to_string())
        })?;
        let endpoint = config["endpoint"].as_str().ok_or_else(|| {
            ProviderError::NotConfigured(format!("search backend '{}' needs an 'endpoint'", name))
        })?;
        http::validate_base_url(endpoint)?;

        let kind = match config.get("kind") {
            Some(value) => serde_json::from_value(value.clone()).map_err(|e| {
                ProviderError::NotConfigured(format!("invalid kind for '{}': {}", name, e))
            })?,
            None => SourceKind::Other,
        };

        let mut backend = Self::new(name, endpoint, kind);
        backend.credential = match config["api_key_env"].as_str() {
            Some(env_var) if ApiCredential::is_available(config, "api_key", env_var) => Some(
                ApiCredential::from_config_or_env(config, "api_key", env_var, "Search API key")?,
            ),
            _ => config["api_key"]
                .as_str()
                .map(|key| ApiCredential::new(key, CredentialSource::Config, "Search API key")),
        };
        Ok(backend)
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    url: String,
    #[serde(default, alias = "description", alias = "content", alias = "snippet")]
    excerpt: String,
    #[serde(default)]
    credibility: Option<f64>,
    #[serde(default)]
    stance: Option<Stance>,
}

impl HttpSearchBackend {
    fn to_candidates(&self, response: SearchResponse, max_results: usize) -> Vec<CandidateSource> {
        response
            .results
            .into_iter()
            .take(max_results)
            .map(|hit| CandidateSource {
                url: hit.url,
                credibility: hit.credibility,
                stance: hit.stance,
                excerpt: hit.excerpt,
                kind: self.kind,
            })
            .collect()
    }
}

#[async_trait]
impl RetrievalCapability for HttpSearchBackend {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<CandidateSource>, ProviderError> {
        let limit = max_results.to_string();
        let mut request = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query), ("limit", limit.as_str())])
            .timeout(self.timeout);

        if let Some(credential) = &self.credential {
            request = request.header("X-Api-Key", credential.expose());
        }

        let response = request
            .send()
            .await
            .map_err(|e| http::transport_error(e, self.timeout))?;
        let response = http::check_status(response).await?;
        let body: SearchResponse = http::decode_json(response).await?;

        Ok(self.to_candidates(body, max_results))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
