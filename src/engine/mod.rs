//! Trend detection engine
//!
//! The pipeline stages, each consuming the previous stage's output:
//!
//! 1. content fetch (external, [`crate::storage::ContentStore`])
//! 2. [`extract`] - vectorize, cluster, name topics
//! 3. [`velocity`] - mention change vs. a historical baseline
//! 4. [`validate`] - cross-source gate
//! 5. [`merge`] - collapse near-duplicate topics
//! 6. [`score`] - bounded strength score and confidence
//! 7. [`status`] - population-relative lifecycle classification
//! 8. [`explain`] + persistence via [`crate::storage::TrendStore`]
//!
//! A single run is a synchronous, CPU-bound batch computation. The only
//! thrown errors are request validation failures; every internal failure
//! degrades to "fewer trends than expected" plus a diagnostic summary.

pub mod cluster;
pub mod entities;
pub mod explain;
pub mod extract;
pub mod merge;
pub mod score;
pub mod status;
pub mod validate;
pub mod vectorize;
pub mod velocity;

use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::DetectionConfig;
use crate::models::{ContentRecord, DetectionOutcome, DetectionSummary, Trend};
use crate::storage::{ContentStore, TrendStore};
use entities::EntityRecognizer;
use extract::TopicExtractor;

/// Errors surfaced to callers of [`TrendDetector::detect_trends`]
#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("Invalid request: {field} = {value} ({reason})")]
    InvalidRequest {
        field: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// A transient topical cluster flowing through the pipeline
#[derive(Debug, Clone)]
pub struct Topic {
    /// Derived display label
    pub name: String,

    /// Up to five representative terms, strongest first
    pub keywords: Vec<String>,

    /// Content records assigned to this cluster
    pub members: Vec<ContentRecord>,

    /// Current-window mentions (keyword-in-title matches)
    pub mention_count: u64,

    /// Percentage change vs. the historical baseline
    pub velocity: f64,

    /// Distinct source tags across members
    pub sources: BTreeSet<String>,

    /// Additive scoring boost in [0, 0.3]
    pub recency_boost: f64,
}

impl Topic {
    /// Number of distinct sources; always equals `|sources|` by construction
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }
}

/// Parameters of a single detection run
#[derive(Debug, Clone)]
pub struct DetectionRequest {
    pub workspace_id: Uuid,
    pub days_back: u32,
    pub max_trends: usize,
    pub min_confidence: f64,
    pub sources: Option<Vec<String>>,
}

impl DetectionRequest {
    /// Validate ranges before any I/O happens
    pub fn validate(&self) -> Result<(), DetectionError> {
        if self.days_back == 0 || self.days_back > 365 {
            return Err(DetectionError::InvalidRequest {
                field: "days_back",
                value: self.days_back.to_string(),
                reason: "must be between 1 and 365",
            });
        }
        if self.max_trends == 0 {
            return Err(DetectionError::InvalidRequest {
                field: "max_trends",
                value: self.max_trends.to_string(),
                reason: "must be positive",
            });
        }
        if !(0.0..=1.0).contains(&self.min_confidence) || !self.min_confidence.is_finite() {
            return Err(DetectionError::InvalidRequest {
                field: "min_confidence",
                value: self.min_confidence.to_string(),
                reason: "must be in [0, 1]",
            });
        }
        Ok(())
    }
}

/// Trend detection engine, wired to its storage collaborators
///
/// Holds no mutable state: concurrent runs share only the persisted trend
/// set, whose per-key upsert atomicity is the store's responsibility.
pub struct TrendDetector {
    config: DetectionConfig,
    content: Arc<dyn ContentStore>,
    trends: Arc<dyn TrendStore>,
    recognizer: Option<Arc<dyn EntityRecognizer>>,
}

impl TrendDetector {
    pub fn new(
        config: DetectionConfig,
        content: Arc<dyn ContentStore>,
        trends: Arc<dyn TrendStore>,
    ) -> Self {
        Self {
            config,
            content,
            trends,
            recognizer: None,
        }
    }

    /// Attach an entity recognizer for topic naming
    ///
    /// Optional: without one, names fall back to keyword phrases.
    pub fn with_recognizer(mut self, recognizer: Arc<dyn EntityRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    /// Run the full detection pipeline for one workspace
    pub fn detect_trends(
        &self,
        request: &DetectionRequest,
    ) -> Result<DetectionOutcome, DetectionError> {
        request.validate()?;
        let now = Utc::now();
        let window_start = now - Duration::days(i64::from(request.days_back));

        let mut records = match self.content.fetch_content(
            request.workspace_id,
            window_start,
            None,
            request.sources.as_deref(),
        ) {
            Ok(records) => records,
            Err(err) => {
                error!(workspace = %request.workspace_id, %err, "Content fetch failed");
                return Ok(DetectionOutcome::empty(
                    request.days_back,
                    request.min_confidence,
                    "Content fetch failed; no trends detected",
                ));
            }
        };

        // Bound the clustering cost: keep the most recent records.
        if records.len() > self.config.max_analyzed_records {
            records.sort_by_key(|r| std::cmp::Reverse(r.created_at));
            records.truncate(self.config.max_analyzed_records);
            records.sort_by_key(|r| r.created_at);
        }

        if records.len() < self.config.min_content_items {
            info!(
                workspace = %request.workspace_id,
                records = records.len(),
                "Insufficient content for trend detection"
            );
            let mut outcome = DetectionOutcome::empty(
                request.days_back,
                request.min_confidence,
                format!(
                    "Insufficient content for trend detection (minimum {} items required)",
                    self.config.min_content_items
                ),
            );
            outcome.summary.content_items_analyzed = records.len();
            return Ok(outcome);
        }

        let extractor = TopicExtractor::new(self.config.clone(), self.recognizer.clone());
        let topics = match extractor.extract(&records, now) {
            Ok(topics) => topics,
            Err(err) => {
                warn!(workspace = %request.workspace_id, %err, "Topic extraction failed");
                let mut outcome = DetectionOutcome::empty(
                    request.days_back,
                    request.min_confidence,
                    "Topic extraction produced no usable topics",
                );
                outcome.summary.content_items_analyzed = records.len();
                return Ok(outcome);
            }
        };
        let topics_found = topics.len();
        if topics.is_empty() {
            let mut outcome = DetectionOutcome::empty(
                request.days_back,
                request.min_confidence,
                "No coherent topics found in the analyzed content",
            );
            outcome.summary.content_items_analyzed = records.len();
            return Ok(outcome);
        }

        // Historical baseline for velocity: a separate window preceding the
        // current one.
        let baseline_start = window_start - Duration::days(self.config.baseline_days);
        let baseline = match self.content.fetch_content(
            request.workspace_id,
            baseline_start,
            Some(window_start),
            request.sources.as_deref(),
        ) {
            Ok(baseline) => baseline,
            Err(err) => {
                warn!(workspace = %request.workspace_id, %err, "Baseline fetch failed; treating topics as new");
                Vec::new()
            }
        };

        let topics = velocity::apply_velocities(topics, &records, &baseline);
        let topics = validate::retain_cross_source(topics);
        let topics = merge::merge_topics(
            topics,
            &self.config.merge,
            self.config.keywords_per_topic,
        );

        let mut trends: Vec<Trend> = topics
            .into_iter()
            .map(|topic| self.build_trend(request.workspace_id, topic, now))
            .filter(|trend| trend.strength_score >= request.min_confidence)
            .collect();

        trends.sort_by(|a, b| {
            b.strength_score
                .partial_cmp(&a.strength_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.topic.cmp(&b.topic))
        });
        trends.truncate(request.max_trends);

        status::assign_statuses(&mut trends);
        for trend in trends.iter_mut() {
            trend.explanation = explain::build_explanation(trend, request.days_back);
        }

        // Persist per trend: one bad record must not void the whole run.
        for trend in &trends {
            if let Err(err) = self.trends.upsert_trend(trend) {
                error!(
                    workspace = %request.workspace_id,
                    topic = %trend.topic,
                    %err,
                    "Failed to persist trend; skipping"
                );
            }
        }

        info!(
            workspace = %request.workspace_id,
            records = records.len(),
            topics_found,
            trends = trends.len(),
            "Trend detection complete"
        );

        let summary = DetectionSummary {
            content_items_analyzed: records.len(),
            topics_found,
            trends_detected: trends.len(),
            confidence_threshold: request.min_confidence,
            time_range_days: request.days_back,
            message: None,
        };
        Ok(DetectionOutcome { trends, summary })
    }

    /// Assemble a persisted-entity `Trend` from a pipeline `Topic`
    fn build_trend(&self, workspace_id: Uuid, topic: Topic, now: DateTime<Utc>) -> Trend {
        let (strength_score, confidence) =
            score::score_with_confidence(&topic, &self.config.scoring);

        let first_seen = topic
            .members
            .iter()
            .map(|r| r.created_at)
            .min()
            .unwrap_or(now);
        let peak_time = peak_time(&topic.members).unwrap_or(now);

        let mut by_recency = topic.members.clone();
        by_recency.sort_by_key(|r| std::cmp::Reverse(r.created_at));
        let key_content_ids: Vec<String> =
            by_recency.iter().take(5).map(|r| r.id.clone()).collect();

        let sources: Vec<String> = topic.sources.iter().cloned().collect();
        let source_count = sources.len();

        debug!(
            topic = %topic.name,
            strength_score,
            mentions = topic.mention_count,
            velocity = topic.velocity,
            sources = source_count,
            "Scored topic"
        );

        Trend {
            workspace_id,
            topic: topic.name,
            keywords: topic.keywords,
            strength_score,
            mention_count: topic.mention_count,
            velocity: topic.velocity,
            sources,
            source_count,
            key_content_ids,
            first_seen,
            peak_time,
            explanation: String::new(),
            related_topics: Vec::new(),
            confidence,
            is_active: true,
            status: crate::models::TrendStatus::Emerging,
            detected_at: now,
        }
    }
}

/// The latest timestamp within the busiest day among the member records
fn peak_time(members: &[ContentRecord]) -> Option<DateTime<Utc>> {
    use std::collections::HashMap;

    if members.is_empty() {
        return None;
    }
    let mut by_day: HashMap<chrono::NaiveDate, Vec<DateTime<Utc>>> = HashMap::new();
    for record in members {
        by_day
            .entry(record.created_at.date_naive())
            .or_default()
            .push(record.created_at);
    }
    by_day
        .into_iter()
        .max_by_key(|(day, stamps)| (stamps.len(), *day))
        .and_then(|(_, stamps)| stamps.into_iter().max())
}
