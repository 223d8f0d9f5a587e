//! Unified error handling for the windrose crate
//!
//! Domain-specific errors live next to their modules
//! ([`crate::engine::DetectionError`], [`crate::engine::extract::ExtractionError`],
//! [`crate::storage::StorageError`]); this module consolidates them into a
//! single [`Error`] enum for use across module boundaries, with an
//! [`ErrorCategory`] classification for handling strategies.

use std::io;
use thiserror::Error;

pub use crate::engine::extract::ExtractionError;
pub use crate::engine::DetectionError;
pub use crate::storage::StorageError;

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Request validation failures, rejected before any I/O
    Validation,
    /// Vectorization and clustering failures
    Extraction,
    /// Storage and I/O errors
    Storage,
    /// Configuration errors
    Config,
    /// Other/unknown errors
    Other,
}

/// Unified error type for the windrose crate
#[derive(Error, Debug)]
pub enum Error {
    /// Detection pipeline errors
    #[error("Detection error: {0}")]
    Detection(#[from] DetectionError),

    /// Topic extraction errors
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Get the error category for handling strategies
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Detection(DetectionError::InvalidRequest { .. }) => ErrorCategory::Validation,
            Self::Extraction(_) => ErrorCategory::Extraction,
            Self::Storage(_) | Self::Io(_) => ErrorCategory::Storage,
            Self::Json(_) => ErrorCategory::Other,
            Self::Config(_) => ErrorCategory::Config,
        }
    }

    /// Check if this error is recoverable by degrading to a partial result
    ///
    /// Validation and configuration errors must surface to the caller;
    /// extraction and storage failures degrade to "fewer trends than
    /// expected" at the orchestration level.
    pub fn is_recoverable(&self) -> bool {
        match self.category() {
            ErrorCategory::Validation | ErrorCategory::Config => false,
            ErrorCategory::Extraction | ErrorCategory::Storage => true,
            ErrorCategory::Other => false,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
