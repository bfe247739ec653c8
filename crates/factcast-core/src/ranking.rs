//! Source ranking by composite credibility/relevance score.

use std::collections::BTreeMap;

use crate::config::RankingConfig;
use crate::scoring::relevance;
use crate::types::Source;

/// `(1 - w) * credibility + w * relevance`, where `w` is the relevance weight.
pub fn composite_score(source: &Source, claim: &str, config: &RankingConfig) -> f64 {
    let weight = config.relevance_weight.clamp(0.0, 1.0);
    (1.0 - weight) * source.credibility + weight * relevance(claim, &source.excerpt)
}

/// Rank candidates for a claim and keep the best `max_sources`.
///
/// Candidates sharing a url collapse to the highest-scoring one. Ordering is
/// by composite score, highest first, with ties broken by ascending url.
pub fn rank_sources(
    claim: &str,
    candidates: Vec<Source>,
    max_sources: usize,
    config: &RankingConfig,
) -> Vec<Source> {
    let mut by_url: BTreeMap<String, (f64, Source)> = BTreeMap::new();

    for source in candidates {
        let score = composite_score(&source, claim, config);
        match by_url.get(&source.url) {
            Some((existing, _)) if *existing >= score => {}
            _ => {
                by_url.insert(source.url.clone(), (score, source));
            }
        }
    }

    let mut ranked: Vec<(f64, Source)> = by_url.into_values().collect();
    ranked.sort_by(|(score_a, a), (score_b, b)| {
        score_b.total_cmp(score_a).then_with(|| a.url.cmp(&b.url))
    });

    ranked
        .into_iter()
        .take(max_sources)
        .map(|(_, source)| source)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Stance;
    use proptest::prelude::*;

    fn source(url: &str, credibility: f64, excerpt: &str) -> Source {
        Source::new(url, credibility, Stance::Neutral, excerpt).unwrap()
    }

    fn credibility_only() -> RankingConfig {
        RankingConfig {
            relevance_weight: 0.0,
        }
    }

    #[test]
    fn test_keeps_max_sources_highest_first() {
        let candidates = vec![
            source("https://d.example", 0.4, ""),
            source("https://a.example", 0.9, ""),
            source("https://c.example", 0.6, ""),
            source("https://b.example", 0.8, ""),
        ];

        let ranked = rank_sources("claim", candidates, 3, &credibility_only());
        let urls: Vec<&str> = ranked.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.example", "https://b.example", "https://c.example"]);
    }

    #[test]
    fn test_ties_broken_by_url() {
        let candidates = vec![
            source("https://z.example", 0.7, ""),
            source("https://m.example", 0.7, ""),
            source("https://a.example", 0.7, ""),
        ];

        let ranked = rank_sources("claim", candidates, 3, &credibility_only());
        let urls: Vec<&str> = ranked.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.example", "https://m.example", "https://z.example"]);
    }

    #[test]
    fn test_relevance_lifts_on_topic_source() {
        let config = RankingConfig {
            relevance_weight: 0.5,
        };
        let candidates = vec![
            source("https://a.example", 0.8, "sports results"),
            source("https://b.example", 0.7, "coffee consumption increased sharply"),
        ];

        let ranked = rank_sources("coffee consumption increased", candidates, 1, &config);
        assert_eq!(ranked[0].url, "https://b.example");
    }

    #[test]
    fn test_duplicate_urls_collapse() {
        let candidates = vec![
            source("https://a.example", 0.5, ""),
            source("https://a.example", 0.9, ""),
            source("https://b.example", 0.6, ""),
        ];

        let ranked = rank_sources("claim", candidates, 5, &credibility_only());
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].url, "https://a.example");
        assert_eq!(ranked[0].credibility, 0.9);
    }

    proptest! {
        #[test]
        fn prop_truncates_and_orders(
            credibilities in prop::collection::vec(0.0f64..=1.0, 0..20),
            max_sources in 1usize..6,
        ) {
            let candidates: Vec<Source> = credibilities
                .iter()
                .enumerate()
                .map(|(i, c)| source(&format!("https://s{:02}.example", i), *c, ""))
                .collect();
            let available = candidates.len();

            let ranked = rank_sources("claim", candidates, max_sources, &credibility_only());
            prop_assert_eq!(ranked.len(), max_sources.min(available));
            for pair in ranked.windows(2) {
                prop_assert!(pair[0].credibility >= pair[1].credibility);
            }
        }
    }
}
