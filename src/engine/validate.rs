//! Cross-source validation
//!
//! A hard gate, not a score penalty: topics whose members span fewer than
//! two distinct source tags are discarded entirely, so a single outlet's
//! idiosyncratic framing cannot be mistaken for a cross-platform trend.

use tracing::debug;

use crate::engine::Topic;

/// Minimum distinct sources for a topic to survive
pub const MIN_DISTINCT_SOURCES: usize = 2;

/// Drop topics supported by fewer than [`MIN_DISTINCT_SOURCES`] sources
pub fn retain_cross_source(topics: Vec<Topic>) -> Vec<Topic> {
    topics
        .into_iter()
        .filter(|topic| {
            let kept = topic.source_count() >= MIN_DISTINCT_SOURCES;
            if !kept {
                debug!(
                    topic = %topic.name,
                    sources = topic.source_count(),
                    "Discarding single-source topic"
                );
            }
            kept
        })
        .collect()
}
