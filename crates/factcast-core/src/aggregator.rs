//! Verdict aggregation: turns ranked sources into a verdict.
//!
//! Each source votes with its stance, weighted by its credibility:
//! 1. No sources, or no supporting/contradicting weight → UNVERIFIABLE
//! 2. A lone source decides directly if it clears the credibility floor
//! 3. Support leads contradiction by at least `verdict_margin` of total weight → TRUE
//! 4. Contradiction leads symmetrically → FALSE
//! 5. Otherwise → MIXED
//!
//! Confidence is `|support - contradict| / total`, with neutral sources
//! counted in the total. Aggregation is a pure function of the ordered
//! input, so repeated calls always agree.

use serde::{Deserialize, Serialize};

use crate::config::AggregationConfig;
use crate::types::{Source, Stance, Verdict, VerdictLabel};

/// Credibility-weighted stance totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StanceWeights {
    pub support: f64,
    pub contradict: f64,
    pub neutral: f64,
}

impl StanceWeights {
    /// Sum credibility per stance, in input order.
    pub fn from_sources(sources: &[Source]) -> Self {
        sources.iter().fold(Self::default(), |mut acc, source| {
            let weight = weight_of(source);
            match source.stance {
                Stance::Support => acc.support += weight,
                Stance::Contradict => acc.contradict += weight,
                Stance::Neutral => acc.neutral += weight,
            }
            acc
        })
    }

    pub fn total(&self) -> f64 {
        self.support + self.contradict + self.neutral
    }

    /// Signed lead of support over contradiction as a share of total weight.
    pub fn balance(&self) -> f64 {
        let total = self.total();
        if total > 0.0 {
            (self.support - self.contradict) / total
        } else {
            0.0
        }
    }

    /// `|support - contradict| / total`, clamped to `[0, 1]`; 0 for no weight.
    pub fn confidence(&self) -> f64 {
        self.balance().abs().clamp(0.0, 1.0)
    }
}

fn weight_of(source: &Source) -> f64 {
    if source.credibility.is_nan() {
        0.0
    } else {
        source.credibility.clamp(0.0, 1.0)
    }
}

/// The verdict aggregator. Makes no external calls.
#[derive(Debug, Clone, Default)]
pub struct VerdictAggregator {
    config: AggregationConfig,
}

impl VerdictAggregator {
    pub fn new(config: AggregationConfig) -> Self {
        Self { config }
    }

    /// Aggregate sources into a verdict.
    pub fn aggregate(&self, sources: &[Source]) -> Verdict {
        if sources.is_empty() {
            return Verdict::unverifiable();
        }

        let weights = StanceWeights::from_sources(sources);

        if let [only] = sources {
            return self.single_source_verdict(only, &weights);
        }

        if weights.total() <= 0.0 || (weights.support <= 0.0 && weights.contradict <= 0.0) {
            return Verdict::unverifiable();
        }

        let balance = weights.balance();
        let label = if balance >= self.config.verdict_margin {
            VerdictLabel::True
        } else if -balance >= self.config.verdict_margin {
            VerdictLabel::False
        } else {
            VerdictLabel::Mixed
        };

        tracing::trace!(
            support = weights.support,
            contradict = weights.contradict,
            neutral = weights.neutral,
            label = %label,
            "Aggregated verdict"
        );
        Verdict::new(label, weights.confidence())
    }

    /// A lone source decides directly, provided it is credible enough.
    fn single_source_verdict(&self, source: &Source, weights: &StanceWeights) -> Verdict {
        if weight_of(source) < self.config.single_source_floor {
            return Verdict::unverifiable();
        }

        match source.stance {
            Stance::Support => Verdict::new(VerdictLabel::True, weights.confidence()),
            Stance::Contradict => Verdict::new(VerdictLabel::False, weights.confidence()),
            Stance::Neutral => Verdict::unverifiable(),
        }
    }

    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }
}
