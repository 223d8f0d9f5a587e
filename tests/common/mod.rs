//! Common test utilities

use chrono::{Duration, Utc};
use windrose::models::ContentRecord;

/// Content records titled around one topic, cycling through the given
/// sources, created `age_hours_start..` hours ago one hour apart
pub fn topic_records(
    prefix: &str,
    topic_phrase: &str,
    count: usize,
    sources: &[&str],
    age_hours_start: i64,
) -> Vec<ContentRecord> {
    let now = Utc::now();
    (0..count)
        .map(|i| ContentRecord {
            id: format!("{prefix}-{i}"),
            title: format!("{topic_phrase} update {i}"),
            summary: Some(format!("more coverage of {topic_phrase}, item {i}")),
            source: sources[i % sources.len()].to_string(),
            created_at: now - Duration::hours(age_hours_start + i as i64),
        })
        .collect()
}

/// A single record with full control over title, source, and age in days
#[allow(dead_code)]
pub fn record(id: &str, title: &str, source: &str, age_days: i64) -> ContentRecord {
    ContentRecord {
        id: id.to_string(),
        title: title.to_string(),
        summary: None,
        source: source.to_string(),
        created_at: Utc::now() - Duration::days(age_days),
    }
}
