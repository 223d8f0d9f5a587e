//! Repository traits decoupling the engine from storage backends
//!
//! The detection pipeline is a synchronous batch computation; both
//! collaborator calls (the initial content fetch and the final trend
//! persistence) are treated as blocking. Implementations must be
//! `Send + Sync` so one store can serve concurrent runs; upsert atomicity
//! per `(workspace_id, topic)` is the backend's responsibility.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use super::StorageResult;
use crate::models::{ContentRecord, Trend};

/// Read access to the ingested content stream
pub trait ContentStore: Send + Sync {
    /// Fetch content records for a workspace within `[start, end)`,
    /// optionally restricted to the given source tags
    ///
    /// Used for both the current detection window and the historical
    /// baseline window (with a separate date range).
    fn fetch_content(
        &self,
        workspace_id: Uuid,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
        sources: Option<&[String]>,
    ) -> StorageResult<Vec<ContentRecord>>;

    /// Store content records for a workspace (ingest path, not used by the
    /// detection pipeline itself)
    fn store_content(&self, workspace_id: Uuid, records: &[ContentRecord]) -> StorageResult<usize>;
}

/// Read/write access to persisted trends
pub trait TrendStore: Send + Sync {
    /// Insert or update a trend keyed by `(workspace_id, topic)`
    ///
    /// Returns the persisted trend. Must not create a second row for an
    /// existing key.
    fn upsert_trend(&self, trend: &Trend) -> StorageResult<Trend>;

    /// Fetch active trends for a workspace, strongest first
    fn get_active_trends(&self, workspace_id: Uuid, limit: usize) -> StorageResult<Vec<Trend>>;

    /// Mark trends last detected before `cutoff` as inactive
    ///
    /// Returns the number of trends deactivated. This sweep runs outside a
    /// single detection run.
    fn deactivate_old_trends(&self, workspace_id: Uuid, cutoff: DateTime<Utc>)
        -> StorageResult<usize>;
}

/// In-memory store for tests and ephemeral runs
#[derive(Default)]
pub struct MemoryStore {
    content: Mutex<HashMap<Uuid, Vec<ContentRecord>>>,
    trends: Mutex<HashMap<(Uuid, String), Trend>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted trends across all workspaces
    pub fn trend_count(&self) -> usize {
        self.trends.lock().expect("trend store lock poisoned").len()
    }
}

impl ContentStore for MemoryStore {
    fn fetch_content(
        &self,
        workspace_id: Uuid,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
        sources: Option<&[String]>,
    ) -> StorageResult<Vec<ContentRecord>> {
        let content = self.content.lock().expect("content store lock poisoned");
        let records = content
            .get(&workspace_id)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| r.created_at >= start)
                    .filter(|r| end.map_or(true, |end| r.created_at < end))
                    .filter(|r| sources.map_or(true, |s| s.iter().any(|tag| *tag == r.source)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(records)
    }

    fn store_content(&self, workspace_id: Uuid, records: &[ContentRecord]) -> StorageResult<usize> {
        let mut content = self.content.lock().expect("content store lock poisoned");
        let entry = content.entry(workspace_id).or_default();
        entry.extend_from_slice(records);
        Ok(records.len())
    }
}

impl TrendStore for MemoryStore {
    fn upsert_trend(&self, trend: &Trend) -> StorageResult<Trend> {
        let mut trends = self.trends.lock().expect("trend store lock poisoned");
        let key = (trend.workspace_id, trend.topic.clone());
        trends.insert(key, trend.clone());
        Ok(trend.clone())
    }

    fn get_active_trends(&self, workspace_id: Uuid, limit: usize) -> StorageResult<Vec<Trend>> {
        let trends = self.trends.lock().expect("trend store lock poisoned");
        let mut active: Vec<Trend> = trends
            .values()
            .filter(|t| t.workspace_id == workspace_id && t.is_active)
            .cloned()
            .collect();
        active.sort_by(|a, b| {
            b.strength_score
                .partial_cmp(&a.strength_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        active.truncate(limit);
        Ok(active)
    }

    fn deactivate_old_trends(
        &self,
        workspace_id: Uuid,
        cutoff: DateTime<Utc>,
    ) -> StorageResult<usize> {
        let mut trends = self.trends.lock().expect("trend store lock poisoned");
        let mut deactivated = 0;
        for trend in trends.values_mut() {
            if trend.workspace_id == workspace_id && trend.is_active && trend.detected_at < cutoff {
                trend.is_active = false;
                deactivated += 1;
            }
        }
        Ok(deactivated)
    }
}
