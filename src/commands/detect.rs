//! Run the detection pipeline and print a run report

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::Config;
use crate::engine::entities::PatternRecognizer;
use crate::engine::{DetectionRequest, TrendDetector};
use crate::models::DetectionOutcome;
use crate::storage::SqliteStore;

/// Detect trends for a workspace and print the result
#[allow(clippy::too_many_arguments)]
pub fn detect(
    config: &Config,
    db_path: &Path,
    workspace_id: Uuid,
    days_back: u32,
    max_trends: usize,
    min_confidence: f64,
    sources: Option<Vec<String>>,
    json: bool,
) -> Result<DetectionOutcome> {
    let store = Arc::new(
        SqliteStore::open(db_path)
            .with_context(|| format!("Failed to open database: {}", db_path.display()))?,
    );
    let detector = TrendDetector::new(config.detection.clone(), store.clone(), store)
        .with_recognizer(Arc::new(PatternRecognizer::new()));

    let request = DetectionRequest {
        workspace_id,
        days_back,
        max_trends,
        min_confidence,
        sources,
    };
    let outcome = detector.detect_trends(&request)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_report(&outcome);
    }
    Ok(outcome)
}

fn print_report(outcome: &DetectionOutcome) {
    let summary = &outcome.summary;
    println!("Trend detection summary");
    println!("  Content analyzed:  {}", summary.content_items_analyzed);
    println!("  Topics found:      {}", summary.topics_found);
    println!("  Trends detected:   {}", summary.trends_detected);
    println!("  Time range:        {} days", summary.time_range_days);
    println!("  Min confidence:    {}", summary.confidence_threshold);
    if let Some(message) = &summary.message {
        println!("  Note:              {message}");
    }

    if outcome.trends.is_empty() {
        return;
    }
    println!();
    println!(
        "{:<30} {:>8} {:>9} {:>8} {:>8}  {:<10}",
        "topic", "score", "velocity", "mentions", "sources", "status"
    );
    for trend in &outcome.trends {
        println!(
            "{:<30} {:>8.2} {:>8.0}% {:>8} {:>8}  {:<10}",
            truncate(&trend.topic, 30),
            trend.strength_score,
            trend.velocity,
            trend.mention_count,
            trend.source_count,
            trend.status
        );
    }
}

fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_len.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}
