//! Builds capabilities and the orchestrator from a providers file.
//!
//! ```json
//! {
//!   "classifier": { "model": "acme/claim-detector" },
//!   "generator": { "type": "anthropic" },
//!   "search": [
//!     { "name": "news", "endpoint": "https://news.example/search", "kind": "news",
//!       "api_key_env": "NEWS_API_KEY" }
//!   ]
//! }
//! ```
//!
//! Credentials may be inlined but are normally read from the environment
//! (`HF_API_TOKEN`, `ANTHROPIC_API_KEY`, or the variable each search backend names).

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use factcast_runtime::providers::{HttpSearchBackend, HuggingFaceClassifier};
use factcast_runtime::{FactCheckOrchestrator, ProviderRegistry, RuntimeConfig};

const DEFAULT_GENERATOR: &str = "anthropic";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProvidersFile {
    pub classifier: JsonValue,

    #[serde(default)]
    pub generator: JsonValue,

    pub search: Vec<JsonValue>,
}

impl ProvidersFile {
    pub fn from_json(json: &str) -> Result<Self> {
        let file: Self = serde_json::from_str(json).context("invalid providers file")?;
        if file.search.is_empty() {
            bail!("providers file must list at least one search backend");
        }
        Ok(file)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read providers file {}", path.display()))?;
        Self::from_json(&json)
    }

    pub fn generator_type(&self) -> &str {
        self.generator["type"].as_str().unwrap_or(DEFAULT_GENERATOR)
    }
}

pub fn build_orchestrator(
    config: RuntimeConfig,
    providers: &ProvidersFile,
) -> Result<FactCheckOrchestrator> {
    let classifier = HuggingFaceClassifier::from_config(&providers.classifier)
        .context("failed to configure classifier")?
        .with_timeout(config.timeouts.detection);

    let registry = ProviderRegistry::with_defaults();
    let generator_type = providers.generator_type();
    registry
        .validate(generator_type, &providers.generator)
        .with_context(|| format!("invalid '{}' generator config", generator_type))?;
    let generator = registry.create(generator_type, &providers.generator)?;

    let mut builder = FactCheckOrchestrator::builder()
        .classifier(Arc::new(classifier))
        .generator(generator);

    for search in &providers.search {
        let backend = HttpSearchBackend::from_config(search)
            .context("failed to configure search backend")?
            .with_timeout(config.timeouts.retrieval);
        tracing::debug!(backend = ?backend, "Configured search backend");
        builder = builder.retrieval_backend(Arc::new(backend));
    }

    Ok(builder.config(config).build()?)
}
