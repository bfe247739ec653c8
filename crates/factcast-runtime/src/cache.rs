//! Cache of completed fact-check results.
//!
//! Keys are normalised claim text, so "Coffee  rose" and "coffee rose" share
//! an entry. Only complete results are stored; degraded ones are refused.

use moka::future::Cache;
use std::time::Duration;

use factcast_core::{normalize_claim, Claim, FactCheckResult};

use crate::config::CacheConfig;

/// Result cache using moka.
pub struct ResultCache {
    cache: Cache<String, FactCheckResult>,
}

impl ResultCache {
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();

        Self { cache }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.max_entries, config.ttl)
    }

    /// Look up a result for `claim`.
    ///
    /// The stored result is returned with the caller's claim in place, so
    /// the claim text and detection confidence always reflect this request.
    /// Sources, verdict, summary and `checked_at` are those of the check that
    /// filled the entry; `checked_at` is never refreshed on a hit.
    pub async fn get(&self, claim: &Claim) -> Option<FactCheckResult> {
        self.cache
            .get(&normalize_claim(&claim.text))
            .await
            .map(|mut result| {
                result.claim = claim.clone();
                result
            })
    }

    /// Store a result. Returns false if it was degraded and not stored.
    pub async fn insert(&self, result: &FactCheckResult) -> bool {
        if result.is_degraded() {
            return false;
        }
        self.cache
            .insert(normalize_claim(&result.claim.text), result.clone())
            .await;
        true
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}
