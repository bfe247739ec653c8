//! Prompts for summary generation.
//!
//! The system prompt is static so providers with prompt caching can reuse
//! it across claims; only the user message varies.

use factcast_core::{Claim, Source, SummaryBounds, Verdict};

/// System prompt shared by every summary request.
pub const SUMMARY_SYSTEM_PROMPT: &str = r#"
You write short fact-check summaries for podcast listeners.

You are given a claim, the sources retrieved for it, and a verdict that has
already been computed from those sources. Do not change the verdict and do
not introduce sources you were not given.

Your summary must:
1. State whether the claim is true, false, mixed or unverifiable
2. Mention any contradictions between sources
3. State the confidence as a percentage

Write plain prose in one paragraph. No lists, no markdown, no preamble.
"#;

/// Build the per-claim user message.
pub fn build_summary_prompt(
    claim: &Claim,
    sources: &[Source],
    verdict: &Verdict,
    bounds: &SummaryBounds,
) -> String {
    let mut prompt = format!("Claim: {}\n", claim.text.trim());

    if sources.is_empty() {
        prompt.push_str("Sources: none\n");
    } else {
        let urls: Vec<&str> = sources.iter().map(|s| s.url.as_str()).collect();
        prompt.push_str(&format!("Sources: {}\n", urls.join(", ")));
        for source in sources {
            prompt.push_str(&format!(
                "- {} ({}, credibility {:.2}): {}\n",
                source.url,
                source.stance,
                source.credibility,
                source.excerpt.trim()
            ));
        }
    }

    prompt.push_str(&format!(
        "Verdict: {} ({}% confidence)\n",
        verdict.label,
        verdict.confidence_percent()
    ));
    prompt.push_str(&format!(
        "Summarize the truth, contradictions, and confidence in {}-{} words, for podcast listeners.",
        bounds.min_words, bounds.max_words
    ));

    prompt
}
