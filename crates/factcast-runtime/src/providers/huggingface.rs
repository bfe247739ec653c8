//! Hugging Face Inference API text classifier used for claim detection.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::time::Duration;

use super::{
    http,
    secrets::{ApiCredential, CredentialSource},
    ProviderError,
};
use crate::capabilities::{Classification, ClassificationCapability};

/// Environment variable name for the Hugging Face access token.
pub const HF_TOKEN_ENV: &str = "HF_API_TOKEN";

const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co/models";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Classifier backed by a hosted text-classification model.
pub struct HuggingFaceClassifier {
    credential: ApiCredential,
    model: String,
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl std::fmt::Debug for HuggingFaceClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HuggingFaceClassifier")
            .field("credential", &self.credential)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl HuggingFaceClassifier {
    pub fn new(api_token: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_credential(
            ApiCredential::new(api_token, CredentialSource::Programmatic, "Hugging Face token"),
            model.into(),
        )
    }

    /// Create from JSON configuration.
    ///
    /// `model` is required; `api_token` falls back to `HF_API_TOKEN`.
    pub fn from_config(config: &JsonValue) -> Result<Self, ProviderError> {
        let model = config["model"]
            .as_str()
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| {
                ProviderError::NotConfigured("Hugging Face 'model' is required".to_string())
            })?;

        let credential = ApiCredential::from_config_or_env(
            config,
            "api_token",
            HF_TOKEN_ENV,
            "Hugging Face token",
        )?;

        let mut classifier = Self::with_credential(credential, model.to_string());
        if let Some(url) = config["base_url"].as_str() {
            http::validate_base_url(url)?;
            classifier.base_url = url.trim_end_matches('/').to_string();
        }
        Ok(classifier)
    }

    fn with_credential(credential: ApiCredential, model: String) -> Self {
        Self {
            credential,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

/// The API nests results one level deeper for batched inputs.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Nested(Vec<Vec<Classification>>),
    Flat(Vec<Classification>),
}

impl InferenceResponse {
    fn into_classifications(self) -> Vec<Classification> {
        match self {
            InferenceResponse::Nested(batches) => batches.into_iter().flatten().collect(),
            InferenceResponse::Flat(labels) => labels,
        }
    }
}

#[async_trait]
impl ClassificationCapability for HuggingFaceClassifier {
    async fn classify(&self, text: &str) -> Result<Vec<Classification>, ProviderError> {
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, self.model))
            .bearer_auth(self.credential.expose())
            .timeout(self.timeout)
            .json(&InferenceRequest { inputs: text })
            .send()
            .await
            .map_err(|e| http::transport_error(e, self.timeout))?;

        let response = http::check_status(response).await?;
        let body: InferenceResponse = http::decode_json(response).await?;
        Ok(body.into_classifications())
    }

    fn name(&self) -> &str {
        "huggingface"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_response() {
        let body: InferenceResponse = serde_json::from_str(
            r#"[[{"label": "CLAIM", "score": 0.93}, {"label": "OTHER", "score": 0.07}]]"#,
        )
        .unwrap();
        let labels = body.into_classifications();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0], Classification::new("CLAIM", 0.93));
    }

    #[test]
    fn test_flat_response() {
        let body: InferenceResponse =
            serde_json::from_str(r#"[{"label": "CLAIM", "score": 0.5}]"#).unwrap();
        assert_eq!(body.into_classifications(), vec![Classification::new("CLAIM", 0.5)]);
    }

    #[test]
    fn test_from_config_requires_model() {
        let config = serde_json::json!({ "api_token": "hf_x" });
        assert!(matches!(
            HuggingFaceClassifier::from_config(&config),
            Err(ProviderError::NotConfigured(_))
        ));

        let config = serde_json::json!({
            "api_token": "hf_x",
            "model": "acme/claim-detector",
            "base_url": "http://localhost:9000/models/"
        });
        let classifier = HuggingFaceClassifier::from_config(&config).unwrap();
        assert_eq!(classifier.model(), "acme/claim-detector");
        assert_eq!(classifier.base_url, "http://localhost:9000/models");
    }

    #[test]
    fn test_token_redacted() {
        let classifier = HuggingFaceClassifier::new("hf_secret_token", "acme/claims");
        let debug = format!("{:?}", classifier);
        assert!(!debug.contains("hf_secret_token"));
        assert!(debug.contains("acme/claims"));
    }
}
