//! End-to-end test over the SQLite backend: ingest, detect, list, sweep

mod common;

use std::sync::Arc;
use uuid::Uuid;

use windrose::config::DetectionConfig;
use windrose::engine::entities::PatternRecognizer;
use windrose::engine::{DetectionRequest, TrendDetector};
use windrose::storage::{ContentStore, SqliteStore, TrendStore};

#[test]
fn full_run_persists_and_updates_trends() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("pipeline.db");
    let workspace = Uuid::new_v4();

    let store = Arc::new(SqliteStore::open(&db_path).unwrap());
    store
        .store_content(
            workspace,
            &common::topic_records("cur", "ChatGPT Atlas browser", 6, &["reddit", "rss"], 1),
        )
        .unwrap();
    store
        .store_content(
            workspace,
            &common::topic_records(
                "base",
                "ChatGPT Atlas browser",
                3,
                &["reddit", "rss"],
                24 * 10,
            ),
        )
        .unwrap();

    let detector = TrendDetector::new(DetectionConfig::default(), store.clone(), store.clone())
        .with_recognizer(Arc::new(PatternRecognizer::new()));
    let request = DetectionRequest {
        workspace_id: workspace,
        days_back: 7,
        max_trends: 10,
        min_confidence: 0.0,
        sources: None,
    };

    let first = detector.detect_trends(&request).unwrap();
    assert_eq!(first.trends.len(), 1);

    let active = store.get_active_trends(workspace, 10).unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].velocity, 100.0);
    assert!(!active[0].explanation.is_empty());

    // A second overlapping run updates the same row.
    detector.detect_trends(&request).unwrap();
    let active = store.get_active_trends(workspace, 10).unwrap();
    assert_eq!(active.len(), 1);

    // Nothing is old enough for the sweep to deactivate.
    let swept = store
        .deactivate_old_trends(workspace, chrono::Utc::now() - chrono::Duration::days(7))
        .unwrap();
    assert_eq!(swept, 0);
}

#[test]
fn source_filter_restricts_the_analysis() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("filtered.db");
    let workspace = Uuid::new_v4();

    let store = Arc::new(SqliteStore::open(&db_path).unwrap());
    store
        .store_content(
            workspace,
            &common::topic_records("cur", "ChatGPT Atlas browser", 8, &["reddit", "rss"], 1),
        )
        .unwrap();

    let detector = TrendDetector::new(DetectionConfig::default(), store.clone(), store)
        .with_recognizer(Arc::new(PatternRecognizer::new()));

    // Restricting to one source leaves a single-source corpus: everything
    // the extractor finds is gated out by cross-source validation.
    let outcome = detector
        .detect_trends(&DetectionRequest {
            workspace_id: workspace,
            days_back: 7,
            max_trends: 10,
            min_confidence: 0.0,
            sources: Some(vec!["reddit".to_string()]),
        })
        .unwrap();
    assert!(outcome.trends.is_empty());
}
