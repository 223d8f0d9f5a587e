//! Mention velocity: current window vs. a historical baseline
//!
//! A record counts as a mention of a topic when any topic keyword matches
//! its title case-insensitively. Velocity is the percentage change between
//! the two windows; a topic with no baseline presence is treated as new
//! (velocity 100). Values above 100 are possible and deliberate; capping
//! happens in the scorer, not here.

use tracing::debug;

use crate::engine::Topic;
use crate::models::ContentRecord;

/// Percentage change between a current and historical mention count
///
/// - historical == 0, current > 0: 100.0 (new topic)
/// - historical == 0, current == 0: 0.0
/// - otherwise: `(current - historical) / historical * 100`
pub fn percent_change(current: u64, historical: u64) -> f64 {
    if historical == 0 {
        if current > 0 {
            100.0
        } else {
            0.0
        }
    } else {
        (current as f64 - historical as f64) / historical as f64 * 100.0
    }
}

/// Count records whose title contains any of the keywords, case-insensitive
pub fn count_mentions(records: &[ContentRecord], keywords: &[String]) -> u64 {
    let keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
    records
        .iter()
        .filter(|record| {
            let title = record.title.to_lowercase();
            keywords.iter().any(|k| title.contains(k.as_str()))
        })
        .count() as u64
}

/// Recompute mention counts and velocities for all topics
///
/// Produces new `Topic` values; the inputs are not mutated in place.
pub fn apply_velocities(
    topics: Vec<Topic>,
    current: &[ContentRecord],
    baseline: &[ContentRecord],
) -> Vec<Topic> {
    topics
        .into_iter()
        .map(|topic| {
            let current_mentions = count_mentions(current, &topic.keywords);
            let baseline_mentions = count_mentions(baseline, &topic.keywords);
            let velocity = percent_change(current_mentions, baseline_mentions);
            debug!(
                topic = %topic.name,
                current_mentions,
                baseline_mentions,
                velocity,
                "Computed topic velocity"
            );
            Topic {
                mention_count: current_mentions,
                velocity,
                ..topic
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(title: &str) -> ContentRecord {
        ContentRecord {
            id: title.to_string(),
            title: title.to_string(),
            summary: None,
            source: "reddit".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_new_topic_is_one_hundred() {
        assert_eq!(percent_change(6, 0), 100.0);
    }

    #[test]
    fn test_doubling_is_one_hundred() {
        assert_eq!(percent_change(20, 10), 100.0);
    }

    #[test]
    fn test_halving_is_minus_fifty() {
        assert_eq!(percent_change(5, 10), -50.0);
    }

    #[test]
    fn test_both_zero_is_zero() {
        assert_eq!(percent_change(0, 0), 0.0);
    }

    #[test]
    fn test_more_than_doubling_exceeds_cap() {
        assert_eq!(percent_change(30, 10), 200.0);
    }

    #[test]
    fn test_count_mentions_case_insensitive() {
        let records = vec![
            record("ChatGPT Atlas launches today"),
            record("First look at CHATGPT ATLAS"),
            record("Unrelated quantum news"),
        ];
        let count = count_mentions(&records, &["chatgpt".to_string()]);
        assert_eq!(count, 2);
    }

    #[test]
    fn test_any_keyword_counts_once() {
        let records = vec![record("ChatGPT Atlas browser")];
        let count = count_mentions(
            &records,
            &["chatgpt".to_string(), "atlas".to_string(), "browser".to_string()],
        );
        assert_eq!(count, 1);
    }

    #[test]
    fn test_apply_velocities_updates_counts() {
        let topic = Topic {
            name: "ChatGPT Atlas".to_string(),
            keywords: vec!["chatgpt".to_string(), "atlas".to_string()],
            members: vec![],
            mention_count: 0,
            velocity: 0.0,
            sources: Default::default(),
            recency_boost: 0.0,
        };
        let current: Vec<ContentRecord> = (0..6)
            .map(|i| record(&format!("chatgpt atlas update {i}")))
            .collect();
        let baseline: Vec<ContentRecord> = (0..3)
            .map(|i| record(&format!("chatgpt atlas preview {i}")))
            .collect();

        let topics = apply_velocities(vec![topic], &current, &baseline);
        assert_eq!(topics[0].mention_count, 6);
        assert_eq!(topics[0].velocity, 100.0);
    }
}
