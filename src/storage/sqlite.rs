//! SQLite-backed content and trend storage
//!
//! Timestamps are stored as RFC 3339 text. Trend upsert relies on the
//! `UNIQUE(workspace_id, topic)` constraint with `ON CONFLICT DO UPDATE`,
//! which is atomic per key under SQLite's single-writer model.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::Mutex;
use uuid::Uuid;

use super::repository::{ContentStore, TrendStore};
use super::{StorageError, StorageResult};
use crate::models::{ConfidenceLevel, ContentRecord, Trend, TrendStatus};

/// SQLite storage for content records and trends
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database at `path` and ensure the schema exists
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// In-memory database, mostly for tests
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StorageResult<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS content (
                id TEXT NOT NULL,
                workspace_id TEXT NOT NULL,
                title TEXT NOT NULL,
                summary TEXT,
                source TEXT NOT NULL,
                created_at TEXT NOT NULL,
                PRIMARY KEY (workspace_id, id)
            );
            CREATE INDEX IF NOT EXISTS idx_content_window
                ON content (workspace_id, created_at);

            CREATE TABLE IF NOT EXISTS trends (
                workspace_id TEXT NOT NULL,
                topic TEXT NOT NULL,
                keywords TEXT NOT NULL,
                strength_score REAL NOT NULL,
                mention_count INTEGER NOT NULL,
                velocity REAL NOT NULL,
                sources TEXT NOT NULL,
                source_count INTEGER NOT NULL,
                key_content_ids TEXT NOT NULL,
                first_seen TEXT NOT NULL,
                peak_time TEXT NOT NULL,
                explanation TEXT NOT NULL,
                related_topics TEXT NOT NULL,
                confidence TEXT NOT NULL,
                is_active INTEGER NOT NULL,
                status TEXT NOT NULL,
                detected_at TEXT NOT NULL,
                PRIMARY KEY (workspace_id, topic)
            );
            CREATE INDEX IF NOT EXISTS idx_trends_active
                ON trends (workspace_id, is_active, strength_score);
            "#,
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn parse_timestamp(column: &'static str, value: &str) -> StorageResult<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| StorageError::MalformedTimestamp {
                column,
                value: value.to_string(),
            })
    }

    fn trend_from_row(row: &Row<'_>) -> rusqlite::Result<(Trend, String)> {
        // Second element carries any JSON/timestamp parse problem out of the
        // rusqlite closure, where only rusqlite::Error can be returned.
        let workspace_id: String = row.get(0)?;
        let topic: String = row.get(1)?;
        let keywords: String = row.get(2)?;
        let strength_score: f64 = row.get(3)?;
        let mention_count: i64 = row.get(4)?;
        let velocity: f64 = row.get(5)?;
        let sources: String = row.get(6)?;
        let source_count: i64 = row.get(7)?;
        let key_content_ids: String = row.get(8)?;
        let first_seen: String = row.get(9)?;
        let peak_time: String = row.get(10)?;
        let explanation: String = row.get(11)?;
        let related_topics: String = row.get(12)?;
        let confidence: String = row.get(13)?;
        let is_active: i64 = row.get(14)?;
        let status: String = row.get(15)?;
        let detected_at: String = row.get(16)?;

        let mut problem = String::new();
        let trend = Trend {
            workspace_id: Uuid::parse_str(&workspace_id).unwrap_or_else(|_| {
                problem = format!("bad workspace_id: {workspace_id}");
                Uuid::nil()
            }),
            topic,
            keywords: serde_json::from_str(&keywords).unwrap_or_else(|e| {
                problem = format!("bad keywords json: {e}");
                Vec::new()
            }),
            strength_score,
            mention_count: mention_count.max(0) as u64,
            velocity,
            sources: serde_json::from_str(&sources).unwrap_or_else(|e| {
                problem = format!("bad sources json: {e}");
                Vec::new()
            }),
            source_count: source_count.max(0) as usize,
            key_content_ids: serde_json::from_str(&key_content_ids).unwrap_or_default(),
            first_seen: Self::parse_timestamp("first_seen", &first_seen).unwrap_or_else(|_| {
                problem = format!("bad first_seen: {first_seen}");
                Utc::now()
            }),
            peak_time: Self::parse_timestamp("peak_time", &peak_time).unwrap_or_else(|_| {
                problem = format!("bad peak_time: {peak_time}");
                Utc::now()
            }),
            explanation,
            related_topics: serde_json::from_str(&related_topics).unwrap_or_default(),
            confidence: ConfidenceLevel::parse(&confidence).unwrap_or(ConfidenceLevel::Low),
            is_active: is_active != 0,
            status: TrendStatus::parse(&status).unwrap_or(TrendStatus::Emerging),
            detected_at: Self::parse_timestamp("detected_at", &detected_at).unwrap_or_else(|_| {
                problem = format!("bad detected_at: {detected_at}");
                Utc::now()
            }),
        };
        Ok((trend, problem))
    }
}

impl ContentStore for SqliteStore {
    fn fetch_content(
        &self,
        workspace_id: Uuid,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
        sources: Option<&[String]>,
    ) -> StorageResult<Vec<ContentRecord>> {
        let conn = self.conn.lock().expect("sqlite lock poisoned");

        let end = end.map(|dt| dt.to_rfc3339());
        let mut sql = String::from(
            "SELECT id, title, summary, source, created_at FROM content \
             WHERE workspace_id = ?1 AND created_at >= ?2",
        );
        if end.is_some() {
            sql.push_str(" AND created_at < ?3");
        }
        sql.push_str(" ORDER BY created_at ASC");

        let mut stmt = conn.prepare(&sql)?;
        let map_row = |row: &Row<'_>| -> rusqlite::Result<(ContentRecord, String)> {
            let created_at: String = row.get(4)?;
            let record = ContentRecord {
                id: row.get(0)?,
                title: row.get(1)?,
                summary: row.get(2)?,
                source: row.get(3)?,
                created_at: DateTime::parse_from_rfc3339(&created_at)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_default(),
            };
            Ok((record, created_at))
        };

        let rows: Vec<(ContentRecord, String)> = if let Some(end) = &end {
            stmt.query_map(
                params![workspace_id.to_string(), start.to_rfc3339(), end],
                map_row,
            )?
            .collect::<rusqlite::Result<_>>()?
        } else {
            stmt.query_map(params![workspace_id.to_string(), start.to_rfc3339()], map_row)?
                .collect::<rusqlite::Result<_>>()?
        };

        let mut records = Vec::with_capacity(rows.len());
        for (record, raw_created_at) in rows {
            // Malformed timestamps are a stage-internal failure: skip and log
            // rather than aborting the fetch.
            if record.created_at == DateTime::<Utc>::default()
                && DateTime::parse_from_rfc3339(&raw_created_at).is_err()
            {
                tracing::warn!(
                    record_id = %record.id,
                    created_at = %raw_created_at,
                    "Skipping content record with malformed timestamp"
                );
                continue;
            }
            if let Some(filter) = sources {
                if !filter.iter().any(|tag| *tag == record.source) {
                    continue;
                }
            }
            records.push(record);
        }
        Ok(records)
    }

    fn store_content(&self, workspace_id: Uuid, records: &[ContentRecord]) -> StorageResult<usize> {
        let mut conn = self.conn.lock().expect("sqlite lock poisoned");
        let tx = conn.transaction()?;
        let mut stored = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO content (id, workspace_id, title, summary, source, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
                 ON CONFLICT(workspace_id, id) DO UPDATE SET \
                     title = excluded.title, \
                     summary = excluded.summary, \
                     source = excluded.source, \
                     created_at = excluded.created_at",
            )?;
            for record in records {
                stmt.execute(params![
                    record.id,
                    workspace_id.to_string(),
                    record.title,
                    record.summary,
                    record.source,
                    record.created_at.to_rfc3339(),
                ])?;
                stored += 1;
            }
        }
        tx.commit()?;
        Ok(stored)
    }
}

impl TrendStore for SqliteStore {
    fn upsert_trend(&self, trend: &Trend) -> StorageResult<Trend> {
        let conn = self.conn.lock().expect("sqlite lock poisoned");
        conn.execute(
            "INSERT INTO trends (
                workspace_id, topic, keywords, strength_score, mention_count,
                velocity, sources, source_count, key_content_ids, first_seen,
                peak_time, explanation, related_topics, confidence, is_active,
                status, detected_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
             ON CONFLICT(workspace_id, topic) DO UPDATE SET
                 keywords = excluded.keywords,
                 strength_score = excluded.strength_score,
                 mention_count = excluded.mention_count,
                 velocity = excluded.velocity,
                 sources = excluded.sources,
                 source_count = excluded.source_count,
                 key_content_ids = excluded.key_content_ids,
                 peak_time = excluded.peak_time,
                 explanation = excluded.explanation,
                 related_topics = excluded.related_topics,
                 confidence = excluded.confidence,
                 is_active = excluded.is_active,
                 status = excluded.status,
                 detected_at = excluded.detected_at",
            params![
                trend.workspace_id.to_string(),
                trend.topic,
                serde_json::to_string(&trend.keywords)?,
                trend.strength_score,
                trend.mention_count as i64,
                trend.velocity,
                serde_json::to_string(&trend.sources)?,
                trend.source_count as i64,
                serde_json::to_string(&trend.key_content_ids)?,
                trend.first_seen.to_rfc3339(),
                trend.peak_time.to_rfc3339(),
                trend.explanation,
                serde_json::to_string(&trend.related_topics)?,
                trend.confidence.as_str(),
                trend.is_active as i64,
                trend.status.as_str(),
                trend.detected_at.to_rfc3339(),
            ],
        )?;

        // first_seen is write-once: the conflict clause above deliberately
        // leaves it untouched, so read the row back for the caller.
        let persisted = conn
            .query_row(
                "SELECT workspace_id, topic, keywords, strength_score, mention_count,
                        velocity, sources, source_count, key_content_ids, first_seen,
                        peak_time, explanation, related_topics, confidence, is_active,
                        status, detected_at
                 FROM trends WHERE workspace_id = ?1 AND topic = ?2",
                params![trend.workspace_id.to_string(), trend.topic],
                Self::trend_from_row,
            )
            .optional()?;

        match persisted {
            Some((trend, problem)) => {
                if !problem.is_empty() {
                    tracing::warn!(topic = %trend.topic, %problem, "Trend row partially unreadable");
                }
                Ok(trend)
            }
            None => Ok(trend.clone()),
        }
    }

    fn get_active_trends(&self, workspace_id: Uuid, limit: usize) -> StorageResult<Vec<Trend>> {
        let conn = self.conn.lock().expect("sqlite lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT workspace_id, topic, keywords, strength_score, mention_count,
                    velocity, sources, source_count, key_content_ids, first_seen,
                    peak_time, explanation, related_topics, confidence, is_active,
                    status, detected_at
             FROM trends
             WHERE workspace_id = ?1 AND is_active = 1
             ORDER BY strength_score DESC
             LIMIT ?2",
        )?;
        let rows: Vec<(Trend, String)> = stmt
            .query_map(
                params![workspace_id.to_string(), limit as i64],
                Self::trend_from_row,
            )?
            .collect::<rusqlite::Result<_>>()?;

        let mut trends = Vec::with_capacity(rows.len());
        for (trend, problem) in rows {
            if !problem.is_empty() {
                tracing::warn!(topic = %trend.topic, %problem, "Trend row partially unreadable");
            }
            trends.push(trend);
        }
        Ok(trends)
    }

    fn deactivate_old_trends(
        &self,
        workspace_id: Uuid,
        cutoff: DateTime<Utc>,
    ) -> StorageResult<usize> {
        let conn = self.conn.lock().expect("sqlite lock poisoned");
        let changed = conn.execute(
            "UPDATE trends SET is_active = 0 \
             WHERE workspace_id = ?1 AND is_active = 1 AND detected_at < ?2",
            params![workspace_id.to_string(), cutoff.to_rfc3339()],
        )?;
        Ok(changed)
    }
}
