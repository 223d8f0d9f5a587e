// Core data structures for windrose trend detection

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single piece of ingested content (article, post, video)
///
/// Immutable from the engine's perspective; produced by an external
/// acquisition layer and read back through [`crate::storage::ContentStore`].
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ContentRecord {
    pub id: String,
    pub title: String,
    pub summary: Option<String>,
    pub source: String, // source tag, e.g. "reddit", "rss", "techcrunch"
    pub created_at: DateTime<Utc>,
}

impl ContentRecord {
    /// Document text used for vectorization: title plus optional summary
    pub fn doc_text(&self) -> String {
        match &self.summary {
            Some(summary) if !summary.trim().is_empty() => {
                format!("{} {}", self.title, summary)
            }
            _ => self.title.clone(),
        }
    }

    /// Whether the record was created within `window` of `now`
    pub fn is_recent(&self, now: DateTime<Utc>, window: Duration) -> bool {
        now - self.created_at <= window
    }
}

/// Lifecycle status of a trend, relative to its peer set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendStatus {
    /// Newly surfaced, no strong signal yet
    Emerging,
    /// Velocity above the population's rising threshold
    Rising,
    /// Strength above the population's hot threshold
    Hot,
    /// High strength but growth has stalled
    Peak,
    /// Strength below the population's declining threshold
    Declining,
}

impl TrendStatus {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Emerging => "emerging",
            Self::Rising => "rising",
            Self::Hot => "hot",
            Self::Peak => "peak",
            Self::Declining => "declining",
        }
    }

    /// Create from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "emerging" => Some(Self::Emerging),
            "rising" => Some(Self::Rising),
            "hot" => Some(Self::Hot),
            "peak" => Some(Self::Peak),
            "declining" => Some(Self::Declining),
            _ => None,
        }
    }

    /// Get all statuses
    pub fn all() -> Vec<Self> {
        vec![
            Self::Emerging,
            Self::Rising,
            Self::Hot,
            Self::Peak,
            Self::Declining,
        ]
    }
}

impl std::fmt::Display for TrendStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coarse confidence bucket derived from the strength score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    /// Bucket a strength score: high >= 0.75, medium >= 0.5, else low
    pub fn from_score(score: f64) -> Self {
        if score >= 0.75 {
            Self::High
        } else if score >= 0.5 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Create from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A detected trend, the engine's persisted output
///
/// `(workspace_id, topic)` is the natural key: repeated detection runs over
/// overlapping windows update the existing row instead of inserting a
/// duplicate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trend {
    pub workspace_id: Uuid,
    pub topic: String,
    pub keywords: Vec<String>,
    /// Bounded strength in [0, 1]
    pub strength_score: f64,
    pub mention_count: u64,
    /// Percentage change vs. the historical baseline window
    pub velocity: f64,
    pub sources: Vec<String>,
    pub source_count: usize,
    /// Evidence sample, at most 5 content record ids
    pub key_content_ids: Vec<String>,
    pub first_seen: DateTime<Utc>,
    pub peak_time: DateTime<Utc>,
    pub explanation: String,
    /// Reserved; not populated by the detection engine
    pub related_topics: Vec<String>,
    pub confidence: ConfidenceLevel,
    pub is_active: bool,
    pub status: TrendStatus,
    pub detected_at: DateTime<Utc>,
}

/// Diagnostic summary returned alongside the trend list of every run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionSummary {
    pub content_items_analyzed: usize,
    pub topics_found: usize,
    pub trends_detected: usize,
    pub confidence_threshold: f64,
    pub time_range_days: u32,
    /// Present when the run short-circuited, explaining why
    pub message: Option<String>,
}

impl DetectionSummary {
    /// Summary for a run that produced nothing, with an explanatory message
    pub fn empty(days_back: u32, min_confidence: f64, message: impl Into<String>) -> Self {
        Self {
            content_items_analyzed: 0,
            topics_found: 0,
            trends_detected: 0,
            confidence_threshold: min_confidence,
            time_range_days: days_back,
            message: Some(message.into()),
        }
    }
}

/// Result pair returned by every detection run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionOutcome {
    pub trends: Vec<Trend>,
    pub summary: DetectionSummary,
}

impl DetectionOutcome {
    /// Outcome with no trends and an explanatory summary
    pub fn empty(days_back: u32, min_confidence: f64, message: impl Into<String>) -> Self {
        Self {
            trends: Vec::new(),
            summary: DetectionSummary::empty(days_back, min_confidence, message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_text_with_summary() {
        let record = ContentRecord {
            title: "ChatGPT Atlas launches".to_string(),
            summary: Some("OpenAI ships a browser".to_string()),
            ..Default::default()
        };
        assert_eq!(
            record.doc_text(),
            "ChatGPT Atlas launches OpenAI ships a browser"
        );
    }

    #[test]
    fn test_doc_text_blank_summary_falls_back_to_title() {
        let record = ContentRecord {
            title: "Title only".to_string(),
            summary: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(record.doc_text(), "Title only");
    }

    #[test]
    fn test_status_string_roundtrip() {
        for status in TrendStatus::all() {
            assert_eq!(TrendStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TrendStatus::parse("unknown"), None);
    }

    #[test]
    fn test_confidence_buckets() {
        assert_eq!(ConfidenceLevel::from_score(1.0), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_score(0.75), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_score(0.74), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_score(0.5), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_score(0.49), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::from_score(0.0), ConfidenceLevel::Low);
    }

    #[test]
    fn test_is_recent() {
        let now = Utc::now();
        let record = ContentRecord {
            created_at: now - Duration::hours(12),
            ..Default::default()
        };
        assert!(record.is_recent(now, Duration::hours(24)));
        assert!(!record.is_recent(now, Duration::hours(6)));
    }

    #[test]
    fn test_empty_outcome_carries_message() {
        let outcome = DetectionOutcome::empty(7, 0.3, "nothing to do");
        assert!(outcome.trends.is_empty());
        assert_eq!(outcome.summary.message.as_deref(), Some("nothing to do"));
        assert_eq!(outcome.summary.time_range_days, 7);
    }
}
