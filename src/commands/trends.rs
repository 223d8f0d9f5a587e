//! List active trends and sweep stale ones

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use std::path::Path;
use uuid::Uuid;

use crate::storage::{SqliteStore, TrendStore};

/// Print active trends for a workspace, strongest first
pub fn trends(db_path: &Path, workspace_id: Uuid, limit: usize, json: bool) -> Result<()> {
    let store = SqliteStore::open(db_path)
        .with_context(|| format!("Failed to open database: {}", db_path.display()))?;
    let active = store
        .get_active_trends(workspace_id, limit)
        .context("Failed to load active trends")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&active)?);
        return Ok(());
    }

    if active.is_empty() {
        println!("No active trends for workspace {workspace_id}");
        return Ok(());
    }
    for trend in &active {
        println!(
            "[{}] {} (score {:.2}, {} mentions, {} sources, {})",
            trend.status,
            trend.topic,
            trend.strength_score,
            trend.mention_count,
            trend.source_count,
            trend.confidence
        );
        println!("    {}", trend.explanation);
    }
    Ok(())
}

/// Deactivate trends last detected more than `max_age_days` ago
pub fn sweep(db_path: &Path, workspace_id: Uuid, max_age_days: u32) -> Result<usize> {
    let store = SqliteStore::open(db_path)
        .with_context(|| format!("Failed to open database: {}", db_path.display()))?;
    let cutoff = Utc::now() - Duration::days(i64::from(max_age_days));
    let swept = store
        .deactivate_old_trends(workspace_id, cutoff)
        .context("Failed to deactivate old trends")?;

    tracing::info!(workspace = %workspace_id, swept, "Trend sweep complete");
    println!("Deactivated {swept} stale trends for workspace {workspace_id}");
    Ok(swept)
}
