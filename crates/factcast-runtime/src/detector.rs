//! Claim detection over a classification capability.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt, TryStreamExt};

use factcast_core::{segment_sentences, Claim};

use crate::capabilities::{Classification, ClassificationCapability};
use crate::error::{FactCheckError, Stage};
use crate::providers::ProviderError;
use crate::validation::validate_classifications;

/// Detects check-worthy claims in free text.
///
/// Text is split into sentences and each sentence is classified on its own;
/// a sentence becomes a [`Claim`] when the classifier assigns the claim label
/// a score strictly above the threshold. At most `concurrency` sentences
/// are with the classifier at any time.
pub struct ClaimDetector {
    classifier: Arc<dyn ClassificationCapability>,
    claim_label: String,
    timeout: Duration,
    concurrency: usize,
}

const DEFAULT_CONCURRENCY: usize = 8;

impl ClaimDetector {
    pub fn new(
        classifier: Arc<dyn ClassificationCapability>,
        claim_label: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            classifier,
            claim_label: claim_label.into(),
            timeout,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Cap classifier requests in flight. Zero is treated as one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Classify `text` and return the claims scoring above `threshold`.
    ///
    /// All sentences must classify successfully; the first unreachable or
    /// malformed response fails the whole call and abandons the rest. Empty text yields no claims without
    /// calling the classifier.
    pub async fn detect(&self, text: &str, threshold: f64) -> Result<Claims, FactCheckError> {
        if !(threshold > 0.0 && threshold < 1.0) {
            return Err(FactCheckError::InvalidInput(format!(
                "detection threshold must be within (0, 1), got {}",
                threshold
            )));
        }

        let sentences = segment_sentences(text);
        tracing::debug!(
            classifier = self.classifier.name(),
            sentences = sentences.len(),
            concurrency = self.concurrency,
            "Classifying sentences"
        );

        // `buffered` yields in input order, so sentence order survives.
        let labelled: Vec<_> = stream::iter(
            sentences
                .into_iter()
                .map(|sentence| self.classify_sentence(sentence)),
        )
        .buffered(self.concurrency)
        .try_collect()
        .await?;

        Ok(Claims {
            inner: labelled.into_iter(),
            claim_label: self.claim_label.clone(),
            threshold,
        })
    }

    async fn classify_sentence(
        &self,
        sentence: String,
    ) -> Result<(String, Vec<Classification>), FactCheckError> {
        let labels = match tokio::time::timeout(self.timeout, self.classifier.classify(&sentence))
            .await
        {
            Ok(Ok(labels)) => labels,
            Ok(Err(ProviderError::ParseError(detail))) => {
                tracing::error!(
                    stage = %Stage::Detection,
                    claim = %sentence,
                    error = %detail,
                    "Malformed classifier response"
                );
                return Err(FactCheckError::malformed(Stage::Detection, detail));
            }
            Ok(Err(e)) => return Err(FactCheckError::ModelUnavailable(e.to_string())),
            Err(_) => {
                return Err(FactCheckError::ModelUnavailable(format!(
                    "classifier timed out after {:?}",
                    self.timeout
                )))
            }
        };

        if let Err(e) = validate_classifications(&labels) {
            tracing::error!(
                stage = %Stage::Detection,
                claim = %sentence,
                error = %e,
                "Malformed classifier response"
            );
            return Err(FactCheckError::malformed(Stage::Detection, e.to_string()));
        }

        Ok((sentence, labels))
    }
}

/// Lazily filtered claims, in sentence order.
#[derive(Debug)]
pub struct Claims {
    inner: std::vec::IntoIter<(String, Vec<Classification>)>,
    claim_label: String,
    threshold: f64,
}

impl Claims {
    fn claim_score(&self, labels: &[Classification]) -> Option<f64> {
        labels
            .iter()
            .find(|c| c.label.eq_ignore_ascii_case(&self.claim_label))
            .map(|c| c.score)
            .filter(|score| *score > self.threshold)
    }
}

impl Iterator for Claims {
    type Item = Claim;

    fn next(&mut self) -> Option<Claim> {
        loop {
            let (sentence, labels) = self.inner.next()?;
            if let Some(score) = self.claim_score(&labels) {
                return Some(Claim::new(sentence, score));
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.inner.size_hint().1)
    }
}
