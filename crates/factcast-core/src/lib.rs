//! # factcast-core
//!
//! Deterministic claim-verification model for FactCast.
//!
//! This crate holds everything in the fact-checking pipeline that does not
//! touch the network:
//! - The data model: claims, sources, verdicts, results
//! - The verdict aggregator (weighted stance agreement)
//! - Source ranking and relevance scoring
//! - Sentence segmentation, entity extraction, summary templating
//! - Static pipeline configuration
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: The same ordered sources always produce the same verdict
//! 2. **No I/O**: External capabilities live in `factcast-runtime`
//! 3. **Bounded**: Every score and confidence stays in `[0, 1]`
//!
//! ## Example
//!
//! ```rust
//! use factcast_core::{AggregationConfig, Source, Stance, VerdictAggregator, VerdictLabel};
//!
//! let sources = vec![
//!     Source::new("https://a.example/report", 0.9, Stance::Support, "Data confirms the rise").unwrap(),
//!     Source::new("https://b.example/study", 0.8, Stance::Support, "Survey shows growth").unwrap(),
//!     Source::new("https://c.example/blog", 0.3, Stance::Contradict, "Refutes the figure").unwrap(),
//! ];
//!
//! let verdict = VerdictAggregator::new(AggregationConfig::default()).aggregate(&sources);
//! assert_eq!(verdict.label, VerdictLabel::True);
//! assert!((verdict.confidence - 0.70).abs() < 1e-9);
//! ```

pub mod aggregator;
pub mod config;
pub mod ranking;
pub mod scoring;
pub mod summary;
pub mod text;
pub mod types;

// Re-export main types at crate root
pub use aggregator::{StanceWeights, VerdictAggregator};
pub use config::{
    AggregationConfig, ConfigError, PipelineConfig, RankingConfig, SummaryBounds,
};
pub use ranking::{composite_score, rank_sources};
pub use scoring::{infer_stance, relevance};
pub use summary::{annotate_summary, fallback_summary, padding_sentence};
pub use text::{
    build_search_query, extract_entities, fit_word_bounds, normalize_claim, segment_sentences,
    word_count,
};
pub use types::{Claim, FactCheckResult, Source, SourceError, SourceKind, Stance, Verdict, VerdictLabel};
