//! Storage contracts and backends for content records and trends
//!
//! The engine never talks to a database directly; it consumes the
//! [`ContentStore`] and [`TrendStore`] traits, which have a SQLite
//! implementation for production and in-memory implementations for tests.

pub mod repository;
pub mod sqlite;

pub use repository::{ContentStore, MemoryStore, TrendStore};
pub use sqlite::SqliteStore;

use thiserror::Error;

/// Errors that can occur in storage backends
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Malformed timestamp in column {column}: {value}")]
    MalformedTimestamp { column: &'static str, value: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
