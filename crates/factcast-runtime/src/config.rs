//! Runtime configuration: pipeline thresholds plus timeouts, resilience and caching.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use factcast_core::{ConfigError, PipelineConfig};

use crate::error::Stage;
use crate::providers::CompletionConfig;

/// Serialize durations as humantime strings ("10s", "1m 30s").
pub(crate) mod humantime_duration {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}

/// Per-call timeouts for each external capability.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TimeoutConfig {
    #[serde(with = "humantime_duration")]
    pub detection: Duration,

    #[serde(with = "humantime_duration")]
    pub retrieval: Duration,

    #[serde(with = "humantime_duration")]
    pub summarization: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            detection: Duration::from_secs(5),
            retrieval: Duration::from_secs(10),
            summarization: Duration::from_secs(15),
        }
    }
}

impl TimeoutConfig {
    pub fn for_stage(&self, stage: Stage) -> Duration {
        match stage {
            Stage::Detection => self.detection,
            Stage::Retrieval => self.retrieval,
            Stage::Summarization => self.summarization,
        }
    }
}

/// Result cache settings. Off unless enabled, since a cache carries
/// results from one `process` call into later ones.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    pub enabled: bool,

    pub max_entries: u64,

    #[serde(with = "humantime_duration")]
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_entries: 10_000,
            ttl: Duration::from_secs(3600),
        }
    }
}

/// Generation settings for the summarizer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CompletionSettings {
    pub model: String,

    pub max_tokens: u32,

    pub temperature: f32,

    pub prompt_caching: bool,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        let defaults = CompletionConfig::default();
        Self {
            model: defaults.model,
            max_tokens: defaults.max_tokens,
            temperature: defaults.temperature,
            prompt_caching: defaults.prompt_caching,
        }
    }
}

impl CompletionSettings {
    /// Build the per-request completion config with the given timeout.
    pub fn to_completion_config(&self, timeout: Duration) -> CompletionConfig {
        CompletionConfig {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            timeout,
            prompt_caching: self.prompt_caching,
        }
    }
}

/// Full runtime configuration. Read-only once the orchestrator is built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    pub pipeline: PipelineConfig,

    pub timeouts: TimeoutConfig,

    pub cache: CacheConfig,

    pub completion: CompletionSettings,

    /// Claims checked concurrently within one `process` call
    pub max_concurrent_claims: usize,

    /// Classifier requests in flight during claim detection
    pub max_concurrent_detections: usize,

    /// Token budget for summarization across the orchestrator's lifetime
    pub summary_token_budget: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            pipeline: PipelineConfig::default(),
            timeouts: TimeoutConfig::default(),
            cache: CacheConfig::default(),
            completion: CompletionSettings::default(),
            max_concurrent_claims: 4,
            max_concurrent_detections: 8,
            summary_token_budget: 200_000,
        }
    }
}

impl RuntimeConfig {
    /// Parse and validate configuration from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pipeline.validate()?;

        for stage in [Stage::Detection, Stage::Retrieval, Stage::Summarization] {
            if self.timeouts.for_stage(stage).is_zero() {
                return Err(ConfigError::ValidationError(format!(
                    "timeouts.{} must be greater than zero",
                    stage
                )));
            }
        }
        if self.max_concurrent_claims == 0 || self.max_concurrent_detections == 0 {
            return Err(ConfigError::ValidationError(
                "max_concurrent_claims and max_concurrent_detections must be at least 1"
                    .to_string(),
            ));
        }
        if self.completion.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "completion.model must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
