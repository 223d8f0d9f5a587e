//! Topic extraction: vectorize, cluster, keyword and name derivation
//!
//! Consumes a window of content records and produces transient [`Topic`]s.
//! Any internal failure is returned as an [`ExtractionError`] for the
//! orchestrator to log and degrade on; this stage never panics on bad input.

use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::DetectionConfig;
use crate::engine::cluster::{kmeans, KMeansParams};
use crate::engine::entities::{EntityRecognizer, NamedEntity};
use crate::engine::vectorize::TfIdfMatrix;
use crate::engine::Topic;
use crate::models::ContentRecord;

/// Errors that can occur during topic extraction
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Too few documents: need at least {needed}, got {got}")]
    TooFewDocuments { needed: usize, got: usize },

    #[error("No vocabulary term appears in at least two documents")]
    EmptyVocabulary,

    #[error("Clustering failed: {0}")]
    Clustering(String),
}

/// Relevance boosts for entities matching the cluster's top keywords
const KEYWORD_RANK_BOOSTS: [f64; 3] = [3.0, 2.0, 1.5];

/// Generic single-word entities rejected as topic names
const GENERIC_NAMES: &[&str] = &[
    "ai", "tech", "new", "latest", "best", "top", "guide", "review", "news",
];

/// Month abbreviations used by the date-contamination guard
const MONTH_ABBREVS: &[&str] = &[
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Fixed casing normalization for common brand names
const CANONICAL_CASINGS: &[(&str, &str)] = &[
    ("chatgpt", "ChatGPT"),
    ("openai", "OpenAI"),
    ("iphone", "iPhone"),
    ("ipad", "iPad"),
    ("macbook", "MacBook"),
    ("youtube", "YouTube"),
    ("tiktok", "TikTok"),
    ("linkedin", "LinkedIn"),
    ("github", "GitHub"),
    ("javascript", "JavaScript"),
    ("typescript", "TypeScript"),
    ("nvidia", "NVIDIA"),
];

/// Extracts topical clusters from a content window
pub struct TopicExtractor {
    config: DetectionConfig,
    recognizer: Option<Arc<dyn EntityRecognizer>>,
}

impl TopicExtractor {
    pub fn new(config: DetectionConfig, recognizer: Option<Arc<dyn EntityRecognizer>>) -> Self {
        Self { config, recognizer }
    }

    /// Extract topics from `records`; `now` anchors the recency boost window
    pub fn extract(
        &self,
        records: &[ContentRecord],
        now: DateTime<Utc>,
    ) -> Result<Vec<Topic>, ExtractionError> {
        if records.len() < self.config.min_content_items {
            return Err(ExtractionError::TooFewDocuments {
                needed: self.config.min_content_items,
                got: records.len(),
            });
        }

        let docs: Vec<String> = records.iter().map(ContentRecord::doc_text).collect();
        let matrix = TfIdfMatrix::fit_transform(&docs, &self.config.vectorizer)?;

        let clustering = &self.config.clustering;
        let k = (records.len() / clustering.docs_per_cluster.max(1))
            .clamp(clustering.min_clusters, clustering.max_clusters);
        let result = kmeans(
            &matrix.rows,
            &KMeansParams {
                k,
                max_iterations: clustering.max_iterations,
                n_init: clustering.n_init,
                seed: self.config.random_seed,
            },
        )?;

        let mut members_by_cluster: HashMap<usize, Vec<usize>> = HashMap::new();
        for (row, &cluster) in result.assignments.iter().enumerate() {
            members_by_cluster.entry(cluster).or_default().push(row);
        }

        let mut topics = Vec::new();
        let mut cluster_ids: Vec<usize> = members_by_cluster.keys().copied().collect();
        cluster_ids.sort_unstable();
        for cluster in cluster_ids {
            let member_rows = &members_by_cluster[&cluster];
            if member_rows.len() < clustering.min_cluster_size {
                debug!(
                    cluster,
                    size = member_rows.len(),
                    "Discarding undersized cluster"
                );
                continue;
            }

            let centroid = &result.centroids[cluster];
            let top_terms = matrix.top_terms(centroid, 10);
            let keywords: Vec<String> = top_terms
                .into_iter()
                .take(self.config.keywords_per_topic)
                .collect();

            let members: Vec<ContentRecord> =
                member_rows.iter().map(|&row| records[row].clone()).collect();
            let member_texts: Vec<String> = member_rows.iter().map(|&row| docs[row].clone()).collect();

            let name = self.derive_name(&member_texts, &keywords);
            let sources: BTreeSet<String> =
                members.iter().map(|r| r.source.clone()).collect();
            let recency_boost = recency_boost(&members, now, self.config.scoring.max_recency_boost);

            topics.push(Topic {
                name,
                keywords,
                mention_count: members.len() as u64,
                velocity: 0.0,
                sources,
                recency_boost,
                members,
            });
        }

        debug!(
            clusters = k,
            topics = topics.len(),
            "Topic extraction complete"
        );
        Ok(topics)
    }

    /// Derive a display name for a cluster
    ///
    /// Prefers a recognized entity re-ranked by topical relevance to the
    /// cluster keywords; falls back to the longest multi-word keyword
    /// phrase, then the top keyword, then a logged "Unknown Topic".
    fn derive_name(&self, member_texts: &[String], keywords: &[String]) -> String {
        if let Some(recognizer) = &self.recognizer {
            if let Some(name) = best_entity_name(recognizer.as_ref(), member_texts, keywords) {
                return name;
            }
        }

        if let Some(phrase) = keywords
            .iter()
            .filter(|k| k.contains(' '))
            .max_by_key(|k| k.len())
        {
            return title_case(phrase);
        }

        match keywords.first() {
            Some(keyword) => title_case(keyword),
            None => {
                warn!("Cluster produced no keywords; naming it Unknown Topic");
                "Unknown Topic".to_string()
            }
        }
    }
}

/// Pick the most relevant entity across the member documents, or None
fn best_entity_name(
    recognizer: &dyn EntityRecognizer,
    member_texts: &[String],
    keywords: &[String],
) -> Option<String> {
    // Count by lowercase key, remembering the first surface form.
    let mut counts: HashMap<String, (f64, String)> = HashMap::new();
    for text in member_texts {
        for entity in recognizer.entities(text) {
            if !usable_entity(&entity) {
                continue;
            }
            let key = entity.text.to_lowercase();
            let slot = counts.entry(key).or_insert((0.0, entity.text.clone()));
            slot.0 += 1.0;
        }
    }

    // Re-rank by topical relevance, not just raw frequency: an entity
    // matching the cluster's strongest keywords outweighs a merely common
    // one.
    for (key, slot) in counts.iter_mut() {
        for (rank, keyword) in keywords.iter().take(3).enumerate() {
            let keyword = keyword.to_lowercase();
            if *key == keyword || key.contains(&keyword) || keyword.contains(key.as_str()) {
                slot.0 *= KEYWORD_RANK_BOOSTS[rank];
                break;
            }
        }
    }

    let mut ranked: Vec<(&String, &(f64, String))> = counts.iter().collect();
    ranked.sort_by(|a, b| {
        b.1 .0
            .partial_cmp(&a.1 .0)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });

    for (key, slot) in ranked {
        if !key.contains(' ') && GENERIC_NAMES.contains(&key.as_str()) {
            continue;
        }
        return Some(canonical_casing(&slot.1));
    }
    None
}

/// Entity filters: minimum length, acronym guard, date-contamination guard
fn usable_entity(entity: &NamedEntity) -> bool {
    if !entity.kind.is_nameable() {
        return false;
    }
    let text = entity.text.trim();
    if text.len() < 3 {
        return false;
    }
    if text.len() <= 4 && !text.contains(' ') && text.chars().all(|c| c.is_ascii_uppercase()) {
        return false;
    }
    let last_word = text
        .split_whitespace()
        .last()
        .unwrap_or("")
        .to_lowercase();
    if MONTH_ABBREVS
        .iter()
        .any(|m| last_word == *m || (last_word.len() <= 4 && last_word.starts_with(m)))
    {
        return false;
    }
    true
}

/// Apply the fixed brand-casing table word by word
fn canonical_casing(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            CANONICAL_CASINGS
                .iter()
                .find(|(from, _)| *from == lower)
                .map(|(_, to)| to.to_string())
                .unwrap_or_else(|| word.to_string())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Title-case a keyword phrase, honoring the brand-casing table
fn title_case(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            if let Some((_, canonical)) = CANONICAL_CASINGS.iter().find(|(from, _)| *from == lower)
            {
                return canonical.to_string();
            }
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fraction of members created in the last 24 hours, scaled to [0, cap]
fn recency_boost(members: &[ContentRecord], now: DateTime<Utc>, cap: f64) -> f64 {
    if members.is_empty() {
        return 0.0;
    }
    let recent = members
        .iter()
        .filter(|r| r.is_recent(now, Duration::hours(24)))
        .count();
    (recent as f64 / members.len() as f64) * cap
}
