//! Static pipeline configuration.
//!
//! Built once at startup and shared read-only by every component.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Thresholds for the verdict aggregator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AggregationConfig {
    /// Share of total weight one stance must lead by to decide the verdict
    pub verdict_margin: f64,

    /// Minimum credibility for a lone source to decide the verdict
    pub single_source_floor: f64,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            verdict_margin: 0.6,
            single_source_floor: 0.3,
        }
    }
}

/// Weights for ranking retrieved sources.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RankingConfig {
    /// Weight of topical relevance in the composite score; credibility gets the rest
    pub relevance_weight: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            relevance_weight: 0.3,
        }
    }
}

/// Word-count bounds for summaries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SummaryBounds {
    pub min_words: usize,
    pub max_words: usize,
}

impl Default for SummaryBounds {
    fn default() -> Self {
        Self {
            min_words: 30,
            max_words: 60,
        }
    }
}

/// Configuration for the deterministic parts of the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Classifier score a sentence must exceed to count as a claim
    pub detection_threshold: f64,

    /// Classifier label that marks a claim (compared case-insensitively)
    pub claim_label: String,

    /// Maximum sources kept per claim
    pub max_sources: usize,

    /// Results with verdict confidence below this are flagged
    pub flag_below: f64,

    pub aggregation: AggregationConfig,

    pub ranking: RankingConfig,

    pub summary: SummaryBounds,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            detection_threshold: 0.80,
            claim_label: "CLAIM".to_string(),
            max_sources: 3,
            flag_below: 0.5,
            aggregation: AggregationConfig::default(),
            ranking: RankingConfig::default(),
            summary: SummaryBounds::default(),
        }
    }
}

impl PipelineConfig {
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

    /// Check every value is within its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.detection_threshold > 0.0 && self.detection_threshold < 1.0) {
            return Err(ConfigError::ValidationError(format!(
                "detection_threshold must be within (0, 1), got {}",
                self.detection_threshold
            )));
        }
        if self.claim_label.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "claim_label must not be empty".to_string(),
            ));
        }
        if self.max_sources == 0 {
            return Err(ConfigError::ValidationError(
                "max_sources must be at least 1".to_string(),
            ));
        }
        check_unit("flag_below", self.flag_below)?;

        let margin = self.aggregation.verdict_margin;
        if !(margin > 0.0 && margin <= 1.0) {
            return Err(ConfigError::ValidationError(format!(
                "aggregation.verdict_margin must be within (0, 1], got {}",
                margin
            )));
        }
        check_unit(
            "aggregation.single_source_floor",
            self.aggregation.single_source_floor,
        )?;
        check_unit("ranking.relevance_weight", self.ranking.relevance_weight)?;

        if self.summary.min_words > self.summary.max_words || self.summary.max_words == 0 {
            return Err(ConfigError::ValidationError(format!(
                "summary bounds invalid: min_words {} max_words {}",
                self.summary.min_words, self.summary.max_words
            )));
        }

        Ok(())
    }
}

fn check_unit(name: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )))
    }
}
