//! Token budget and usage accounting for the generative capability.
//!
//! A summary call first reserves its estimated cost. The reservation is
//! settled to the tokens actually billed, or released if the call never
//! produces usage (failure, timeout, cancellation).

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};

use crate::providers::TokenUsage;

/// A token budget that can be drawn down concurrently.
pub struct TokenBudget {
    pub max_tokens: u32,

    /// Tokens spent plus tokens held by open reservations
    committed: AtomicU32,
}

impl TokenBudget {
    pub fn new(max_tokens: u32) -> Self {
        Self {
            max_tokens,
            committed: AtomicU32::new(0),
        }
    }

    /// Atomically claim `tokens` if they fit under the budget.
    pub fn try_claim(&self, tokens: u32) -> bool {
        self.committed
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |committed| {
                committed
                    .checked_add(tokens)
                    .filter(|total| *total <= self.max_tokens)
            })
            .is_ok()
    }

    /// Return `tokens` previously claimed.
    pub fn release(&self, tokens: u32) {
        // fetch_update with an always-Some closure cannot fail
        let _ = self
            .committed
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |committed| {
                Some(committed.saturating_sub(tokens))
            });
    }

    /// Charge `tokens` regardless of what is left.
    pub fn charge(&self, tokens: u32) {
        let _ = self
            .committed
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |committed| {
                Some(committed.saturating_add(tokens))
            });
    }

    pub fn remaining(&self) -> u32 {
        self.max_tokens
            .saturating_sub(self.committed.load(Ordering::SeqCst))
    }

    pub fn committed(&self) -> u32 {
        self.committed.load(Ordering::SeqCst)
    }
}

/// Accumulated generative-capability usage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmUsage {
    pub total_tokens: u32,

    pub prompt_tokens: u32,

    pub completion_tokens: u32,

    /// Successful generation calls
    pub llm_calls: u32,

    /// Calls served partly from the provider's prompt cache
    pub cache_hits: u32,

    /// Summaries replaced by the template because the budget ran out
    pub budget_skips: u32,
}

impl LlmUsage {
    pub fn add(&mut self, usage: &TokenUsage) {
        self.prompt_tokens = self.prompt_tokens.saturating_add(usage.prompt_tokens);
        self.completion_tokens = self.completion_tokens.saturating_add(usage.completion_tokens);
        self.total_tokens = self.total_tokens.saturating_add(usage.total());
        self.llm_calls = self.llm_calls.saturating_add(1);
        if usage.cache_read_tokens > 0 {
            self.cache_hits = self.cache_hits.saturating_add(1);
        }
    }
}

/// Budget and usage for summarization calls, shared by all claims of one
/// orchestrator.
pub struct BudgetTracker {
    budget: TokenBudget,
    usage: RwLock<LlmUsage>,
}

impl BudgetTracker {
    pub fn new(max_tokens: u32) -> Self {
        Self {
            budget: TokenBudget::new(max_tokens),
            usage: RwLock::new(LlmUsage::default()),
        }
    }

    /// Reserve `estimated_tokens` before a call.
    ///
    /// Returns `None`, counted as a skip, when the estimate does not fit
    /// alongside what is already spent or reserved.
    pub fn try_reserve(&self, estimated_tokens: u32) -> Option<BudgetReservation<'_>> {
        if self.budget.try_claim(estimated_tokens) {
            Some(BudgetReservation {
                tracker: self,
                tokens: estimated_tokens,
                settled: false,
            })
        } else {
            let mut usage = self.usage.write();
            usage.budget_skips = usage.budget_skips.saturating_add(1);
            None
        }
    }

    pub fn usage(&self) -> LlmUsage {
        self.usage.read().clone()
    }

    pub fn remaining(&self) -> u32 {
        self.budget.remaining()
    }
}

/// Tokens held against the budget for one in-flight call.
///
/// Dropping an unsettled reservation releases its tokens.
#[must_use = "an unsettled reservation is released on drop"]
pub struct BudgetReservation<'a> {
    tracker: &'a BudgetTracker,
    tokens: u32,
    settled: bool,
}

impl BudgetReservation<'_> {
    pub fn tokens(&self) -> u32 {
        self.tokens
    }

    /// Replace the reserved estimate with the tokens actually billed.
    pub fn settle(mut self, usage: &TokenUsage) {
        let actual = usage.total();
        if actual > self.tokens {
            self.tracker.budget.charge(actual - self.tokens);
        } else {
            self.tracker.budget.release(self.tokens - actual);
        }
        self.tracker.usage.write().add(usage);
        self.settled = true;
    }
}

impl Drop for BudgetReservation<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.tracker.budget.release(self.tokens);
        }
    }
}
