//! Configuration management for the windrose engine
//!
//! This module handles loading and validating configuration from environment
//! variables, TOML files, and command-line arguments.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Detection pipeline configuration
    #[serde(default)]
    pub detection: DetectionConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Detection pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Minimum content records required before the pipeline runs
    pub min_content_items: usize,

    /// Cap on analyzed records per run, keeping clustering cost predictable.
    /// The most recent records are kept when the cap applies.
    pub max_analyzed_records: usize,

    /// Length of the historical baseline window in days
    pub baseline_days: i64,

    /// Fixed seed for k-means initialization; identical input must produce
    /// identical cluster assignments
    pub random_seed: u64,

    /// Keywords retained per topic
    pub keywords_per_topic: usize,

    /// TF-IDF vectorizer settings
    pub vectorizer: VectorizerConfig,

    /// K-means clustering settings
    pub clustering: ClusteringConfig,

    /// Topic merge settings
    pub merge: MergeConfig,

    /// Strength scoring settings
    pub scoring: ScoringConfig,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_content_items: 5,
            max_analyzed_records: 1000,
            baseline_days: 30,
            random_seed: 42,
            keywords_per_topic: 5,
            vectorizer: VectorizerConfig::default(),
            clustering: ClusteringConfig::default(),
            merge: MergeConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

/// TF-IDF vectorizer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    /// Maximum vocabulary size
    pub max_features: usize,

    /// Minimum document frequency; terms seen in fewer documents are dropped
    pub min_doc_freq: usize,

    /// Maximum n-gram length (1 = unigrams only)
    pub max_ngram: usize,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: 1000,
            min_doc_freq: 2,
            max_ngram: 3,
        }
    }
}

/// K-means clustering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Lower bound on cluster count
    pub min_clusters: usize,

    /// Upper bound on cluster count
    pub max_clusters: usize,

    /// Roughly one cluster per this many documents
    pub docs_per_cluster: usize,

    /// Clusters with fewer members are discarded
    pub min_cluster_size: usize,

    /// Number of random restarts; best inertia wins
    pub n_init: usize,

    /// Iteration cap per restart
    pub max_iterations: usize,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            min_clusters: 3,
            max_clusters: 10,
            docs_per_cluster: 10,
            min_cluster_size: 2,
            n_init: 5,
            max_iterations: 100,
        }
    }
}

/// Topic merge settings
///
/// The Jaccard threshold and minimum overlap count are deliberate tunables;
/// the defaults below (0.5 / 2) are documented in DESIGN.md.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Minimum Jaccard similarity between keyword sets
    pub jaccard_threshold: f64,

    /// Minimum shared keyword count
    pub min_keyword_overlap: usize,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            jaccard_threshold: 0.5,
            min_keyword_overlap: 2,
        }
    }
}

/// Strength scoring settings
///
/// Each term is capped to [0, 1] before weighting; velocity is intentionally
/// weighted above raw volume so a sudden spike outranks a persistently
/// popular topic with no recent growth.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub mention_weight: f64,
    pub velocity_weight: f64,
    pub source_weight: f64,

    /// Mention count that saturates the mention term
    pub mention_norm: f64,

    /// Velocity (percent) that saturates the velocity term
    pub velocity_norm: f64,

    /// Distinct source count that saturates the diversity term
    pub source_norm: f64,

    /// Cap on the additive recency boost
    pub max_recency_boost: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            mention_weight: 0.2,
            velocity_weight: 0.6,
            source_weight: 0.2,
            mention_norm: 20.0,
            velocity_norm: 100.0,
            source_norm: 4.0,
            max_recency_boost: 0.3,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database path
    pub sqlite_path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            sqlite_path: PathBuf::from("data/windrose.db"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Some(v) = env_parse::<usize>("WINDROSE_MAX_ANALYZED_RECORDS") {
            config.detection.max_analyzed_records = v;
        }
        if let Some(v) = env_parse::<i64>("WINDROSE_BASELINE_DAYS") {
            config.detection.baseline_days = v;
        }
        if let Some(v) = env_parse::<u64>("WINDROSE_RANDOM_SEED") {
            config.detection.random_seed = v;
        }
        if let Some(v) = env_parse::<f64>("WINDROSE_MERGE_JACCARD_THRESHOLD") {
            config.detection.merge.jaccard_threshold = v;
        }
        if let Some(v) = env_parse::<usize>("WINDROSE_MERGE_MIN_KEYWORD_OVERLAP") {
            config.detection.merge.min_keyword_overlap = v;
        }
        if let Ok(path) = std::env::var("WINDROSE_SQLITE_PATH") {
            config.database.sqlite_path = path.into();
        }
        if let Ok(level) = std::env::var("WINDROSE_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(format) = std::env::var("WINDROSE_LOG_FORMAT") {
            config.logging.format = format;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).context("Failed to parse config file as TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field constraints
    pub fn validate(&self) -> Result<()> {
        let d = &self.detection;
        if d.min_content_items == 0 {
            anyhow::bail!("detection.min_content_items must be at least 1");
        }
        if d.max_analyzed_records < d.min_content_items {
            anyhow::bail!(
                "detection.max_analyzed_records ({}) must be >= min_content_items ({})",
                d.max_analyzed_records,
                d.min_content_items
            );
        }
        if d.baseline_days <= 0 {
            anyhow::bail!("detection.baseline_days must be positive");
        }
        if d.keywords_per_topic == 0 {
            anyhow::bail!("detection.keywords_per_topic must be at least 1");
        }
        if d.vectorizer.max_ngram == 0 {
            anyhow::bail!("detection.vectorizer.max_ngram must be at least 1");
        }
        if d.vectorizer.max_features == 0 {
            anyhow::bail!("detection.vectorizer.max_features must be at least 1");
        }
        if d.clustering.min_clusters == 0 || d.clustering.min_clusters > d.clustering.max_clusters {
            anyhow::bail!(
                "detection.clustering cluster bounds invalid: min {} max {}",
                d.clustering.min_clusters,
                d.clustering.max_clusters
            );
        }
        if !(0.0..=1.0).contains(&d.merge.jaccard_threshold) {
            anyhow::bail!(
                "detection.merge.jaccard_threshold must be in [0, 1], got {}",
                d.merge.jaccard_threshold
            );
        }
        let s = &d.scoring;
        for (name, w) in [
            ("mention_weight", s.mention_weight),
            ("velocity_weight", s.velocity_weight),
            ("source_weight", s.source_weight),
        ] {
            if !(0.0..=1.0).contains(&w) {
                anyhow::bail!("detection.scoring.{name} must be in [0, 1], got {w}");
            }
        }
        if s.mention_norm <= 0.0 || s.velocity_norm <= 0.0 || s.source_norm <= 0.0 {
            anyhow::bail!("detection.scoring norms must be positive");
        }
        if !(0.0..=1.0).contains(&s.max_recency_boost) {
            anyhow::bail!(
                "detection.scoring.max_recency_boost must be in [0, 1], got {}",
                s.max_recency_boost
            );
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}
