//! Trend strength scoring
//!
//! A weighted sum of independently capped terms. The default weights
//! (0.2 / 0.6 / 0.2) favor velocity over raw volume: a sudden spike should
//! outrank a persistently popular topic with no recent growth. The recency
//! boost is added directly on top, and the final score is clamped to [0, 1].

use crate::config::ScoringConfig;
use crate::engine::Topic;
use crate::models::ConfidenceLevel;

/// Compute the bounded strength score for a topic
pub fn strength_score(topic: &Topic, config: &ScoringConfig) -> f64 {
    let mention_term = (topic.mention_count as f64 / config.mention_norm).min(1.0);
    let velocity_term = (topic.velocity / config.velocity_norm).clamp(0.0, 1.0);
    let source_term = (topic.source_count() as f64 / config.source_norm).min(1.0);
    let boost = topic.recency_boost.clamp(0.0, config.max_recency_boost);

    let score = mention_term * config.mention_weight
        + velocity_term * config.velocity_weight
        + source_term * config.source_weight
        + boost;

    score.clamp(0.0, 1.0)
}

/// Score a topic and bucket it into a confidence level
pub fn score_with_confidence(topic: &Topic, config: &ScoringConfig) -> (f64, ConfidenceLevel) {
    let score = strength_score(topic, config);
    (score, ConfidenceLevel::from_score(score))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn topic(mentions: u64, velocity: f64, sources: usize, boost: f64) -> Topic {
        Topic {
            name: "t".to_string(),
            keywords: vec!["kw".to_string()],
            members: vec![],
            mention_count: mentions,
            velocity,
            sources: (0..sources)
                .map(|i| format!("source{i}"))
                .collect::<BTreeSet<_>>(),
            recency_boost: boost,
        }
    }

    #[test]
    fn test_saturated_example_scores_one() {
        // mentions 20 -> 1.0 * 0.2; velocity 100 -> 1.0 * 0.6;
        // sources 4 -> 1.0 * 0.2; no boost => 1.0, high confidence
        let (score, confidence) =
            score_with_confidence(&topic(20, 100.0, 4, 0.0), &ScoringConfig::default());
        assert!((score - 1.0).abs() < 1e-9);
        assert_eq!(confidence, ConfidenceLevel::High);
    }

    #[test]
    fn test_terms_capped_before_weighting() {
        // runaway inputs cannot push any term past its weight
        let score = strength_score(&topic(1000, 900.0, 40, 0.0), &ScoringConfig::default());
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_velocity_contributes_zero() {
        let with_negative = strength_score(&topic(10, -50.0, 2, 0.0), &ScoringConfig::default());
        let with_zero = strength_score(&topic(10, 0.0, 2, 0.0), &ScoringConfig::default());
        assert!((with_negative - with_zero).abs() < 1e-9);
    }

    #[test]
    fn test_partial_score() {
        // mentions 10/20 = 0.5 * 0.2 = 0.1; velocity 50/100 = 0.5 * 0.6 = 0.3;
        // sources 2/4 = 0.5 * 0.2 = 0.1 => 0.5, medium
        let (score, confidence) =
            score_with_confidence(&topic(10, 50.0, 2, 0.0), &ScoringConfig::default());
        assert!((score - 0.5).abs() < 1e-9);
        assert_eq!(confidence, ConfidenceLevel::Medium);
    }

    #[test]
    fn test_recency_boost_added_and_clamped() {
        let base = strength_score(&topic(10, 50.0, 2, 0.0), &ScoringConfig::default());
        let boosted = strength_score(&topic(10, 50.0, 2, 0.25), &ScoringConfig::default());
        assert!((boosted - (base + 0.25)).abs() < 1e-9);

        // score never leaves [0, 1] even with the boost
        let maxed = strength_score(&topic(20, 100.0, 4, 0.3), &ScoringConfig::default());
        assert!((maxed - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_velocity_outweighs_volume() {
        let spiking = strength_score(&topic(5, 100.0, 2, 0.0), &ScoringConfig::default());
        let popular = strength_score(&topic(20, 0.0, 2, 0.0), &ScoringConfig::default());
        assert!(spiking > popular);
    }
}
