//! Load content records from a JSON file into the content store
//!
//! This is the offline ingest path for content produced by an external
//! acquisition layer; the detection pipeline itself never writes content.

use anyhow::{Context, Result};
use std::path::Path;
use uuid::Uuid;

use crate::models::ContentRecord;
use crate::storage::{ContentStore, SqliteStore};

/// Ingest a JSON array of content records for a workspace
pub fn ingest(db_path: &Path, workspace_id: Uuid, input: &Path) -> Result<usize> {
    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))?;
    let records: Vec<ContentRecord> =
        serde_json::from_str(&raw).context("Input must be a JSON array of content records")?;

    let store = SqliteStore::open(db_path)
        .with_context(|| format!("Failed to open database: {}", db_path.display()))?;
    let stored = store
        .store_content(workspace_id, &records)
        .context("Failed to store content records")?;

    tracing::info!(
        workspace = %workspace_id,
        records = stored,
        "Content ingest complete"
    );
    println!("Ingested {stored} content records for workspace {workspace_id}");
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::io::Write;

    #[test]
    fn test_ingest_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let input_path = dir.path().join("content.json");

        let records = vec![ContentRecord {
            id: "a".to_string(),
            title: "ChatGPT Atlas launch".to_string(),
            summary: None,
            source: "reddit".to_string(),
            created_at: Utc::now(),
        }];
        let mut file = std::fs::File::create(&input_path).unwrap();
        file.write_all(serde_json::to_string(&records).unwrap().as_bytes())
            .unwrap();

        let workspace = Uuid::new_v4();
        let stored = ingest(&db_path, workspace, &input_path).unwrap();
        assert_eq!(stored, 1);
    }

    #[test]
    fn test_ingest_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let input_path = dir.path().join("bad.json");
        std::fs::write(&input_path, "{ not json ]").unwrap();

        let result = ingest(&db_path, Uuid::new_v4(), &input_path);
        assert!(result.is_err());
    }
}
