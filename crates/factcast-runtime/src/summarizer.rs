//! Bounded-length summaries over a generative-text capability.

use std::sync::Arc;

use factcast_core::{
    fallback_summary, fit_word_bounds, padding_sentence, Claim, Source, SummaryBounds, Verdict,
};

use crate::error::{FactCheckError, Stage};
use crate::prompts::{build_summary_prompt, SUMMARY_SYSTEM_PROMPT};
use crate::providers::{ChatMessage, CompletionConfig, LlmProvider, ProviderError, TokenUsage};
use crate::validation::validate_generation;

/// A summary and the tokens spent producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedSummary {
    pub text: String,

    /// `None` when no generation call was made
    pub usage: Option<TokenUsage>,
}

/// Produces the natural-language explanation for a verdict.
pub struct Summarizer {
    provider: Arc<dyn LlmProvider>,
    completion: CompletionConfig,
    bounds: SummaryBounds,
}

impl Summarizer {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        completion: CompletionConfig,
        bounds: SummaryBounds,
    ) -> Self {
        Self {
            provider,
            completion,
            bounds,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Summarize a verdict in `[min_words, max_words]` words.
    pub async fn summarize(
        &self,
        claim: &Claim,
        sources: &[Source],
        verdict: &Verdict,
    ) -> Result<String, FactCheckError> {
        self.summarize_with_usage(claim, sources, verdict)
            .await
            .map(|summary| summary.text)
    }

    /// Like [`Summarizer::summarize`], also reporting token usage.
    ///
    /// With no sources the template is returned without calling the
    /// capability, since there is nothing to explain beyond unverifiability.
    pub async fn summarize_with_usage(
        &self,
        claim: &Claim,
        sources: &[Source],
        verdict: &Verdict,
    ) -> Result<GeneratedSummary, FactCheckError> {
        if sources.is_empty() {
            return Ok(GeneratedSummary {
                text: fallback_summary(claim, verdict, 0),
                usage: None,
            });
        }

        let messages = self.messages(claim, sources, verdict);
        let timeout = self.completion.timeout;

        let response = match tokio::time::timeout(
            timeout,
            self.provider.complete(messages, &self.completion),
        )
        .await
        {
            Ok(Ok(response)) => response,
            Ok(Err(ProviderError::ParseError(detail))) => {
                return Err(self.malformed(claim, detail));
            }
            Ok(Err(e)) => return Err(FactCheckError::SummarizationUnavailable(e.to_string())),
            Err(_) => {
                return Err(FactCheckError::SummarizationUnavailable(format!(
                    "generation timed out after {:?}",
                    timeout
                )))
            }
        };

        let text = validate_generation(&response.content)
            .map_err(|e| self.malformed(claim, e.to_string()))?;

        let fitted = fit_word_bounds(
            text,
            self.bounds.min_words,
            self.bounds.max_words,
            &padding_sentence(verdict, sources.len()),
        );

        Ok(GeneratedSummary {
            text: fitted,
            usage: Some(response.usage),
        })
    }

    /// Tokens a summary request is expected to cost, output included.
    pub fn estimate_tokens(&self, claim: &Claim, sources: &[Source], verdict: &Verdict) -> u32 {
        let prompt = build_summary_prompt(claim, sources, verdict, &self.bounds);
        self.provider
            .estimate_tokens(SUMMARY_SYSTEM_PROMPT)
            .saturating_add(self.provider.estimate_tokens(&prompt))
            .saturating_add(self.completion.max_tokens)
    }

    fn messages(&self, claim: &Claim, sources: &[Source], verdict: &Verdict) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(SUMMARY_SYSTEM_PROMPT.trim()),
            ChatMessage::user(build_summary_prompt(claim, sources, verdict, &self.bounds)),
        ]
    }

    fn malformed(&self, claim: &Claim, detail: String) -> FactCheckError {
        tracing::error!(
            stage = %Stage::Summarization,
            provider = self.provider.name(),
            claim = %claim.text,
            error = %detail,
            "Malformed generation response"
        );
        FactCheckError::malformed(Stage::Summarization, detail)
    }
}
