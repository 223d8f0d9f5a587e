//! windrose - Workspace Trend Detection Engine
//!
//! Ingests a stream of timestamped, source-tagged content records belonging
//! to a workspace and produces a ranked, classified set of trends: topical
//! clusters gaining attention across multiple independent sources.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and tunables
//! - [`models`] - Core data structures and types
//! - [`engine`] - The detection pipeline (extraction, velocity, validation,
//!   merging, scoring, classification)
//! - [`storage`] - Repository traits with SQLite and in-memory backends
//! - [`error`] - Unified error handling
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use uuid::Uuid;
//! use windrose::config::Config;
//! use windrose::engine::entities::PatternRecognizer;
//! use windrose::engine::{DetectionRequest, TrendDetector};
//! use windrose::storage::MemoryStore;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let store = Arc::new(MemoryStore::new());
//!     let detector = TrendDetector::new(config.detection, store.clone(), store)
//!         .with_recognizer(Arc::new(PatternRecognizer::new()));
//!     let outcome = detector.detect_trends(&DetectionRequest {
//!         workspace_id: Uuid::new_v4(),
//!         days_back: 7,
//!         max_trends: 10,
//!         min_confidence: 0.3,
//!         sources: None,
//!     })?;
//!     println!("{} trends detected", outcome.summary.trends_detected);
//!     Ok(())
//! }
//! ```

pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod storage;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::engine::entities::{EntityRecognizer, PatternRecognizer};
    pub use crate::engine::{DetectionError, DetectionRequest, Topic, TrendDetector};
    pub use crate::error::{Error, ErrorCategory, Result};
    pub use crate::models::{
        ConfidenceLevel, ContentRecord, DetectionOutcome, DetectionSummary, Trend, TrendStatus,
    };
    pub use crate::storage::{ContentStore, MemoryStore, SqliteStore, TrendStore};
}

// Direct re-exports for convenience
pub use models::{ContentRecord, DetectionOutcome, DetectionSummary, Trend, TrendStatus};
