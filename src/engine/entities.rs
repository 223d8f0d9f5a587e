//! Named-entity recognition for topic naming
//!
//! The recognizer is an injected dependency of the topic extractor rather
//! than a process-wide singleton: its absence (no model configured) is a
//! recoverable state, and tests can supply a stub. The default
//! implementation is pattern-based, extracting capitalized spans and
//! classifying them with suffix/keyword cues.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Entity kind classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Product or brand
    Product,

    /// Organization
    Organization,

    /// Event
    Event,

    /// Creative work (book, film, show)
    Work,

    /// Anything else; excluded from topic naming
    Other,
}

impl EntityKind {
    /// Kinds usable as topic names
    pub fn is_nameable(&self) -> bool {
        !matches!(self, Self::Other)
    }
}

/// A recognized entity span
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedEntity {
    pub text: String,
    pub kind: EntityKind,
}

/// Entity extraction interface consumed by the topic extractor
pub trait EntityRecognizer: Send + Sync {
    /// Extract entities from a document text
    fn entities(&self, text: &str) -> Vec<NamedEntity>;
}

/// Pattern-based recognizer: capitalized spans classified by cues
///
/// Not a statistical NER model; good enough to pull product and
/// organization names out of headline-style text.
#[derive(Debug, Default)]
pub struct PatternRecognizer;

const ORG_SUFFIXES: &[&str] = &[
    "inc", "corp", "ltd", "llc", "labs", "foundation", "institute", "university", "group",
    "ventures", "studios",
];

const EVENT_CUES: &[&str] = &[
    "conference", "summit", "expo", "keynote", "hackathon", "festival", "championship", "cup",
    "olympics",
];

const WORK_CUES: &[&str] = &["season", "trailer", "album", "movie", "film", "series"];

impl PatternRecognizer {
    pub fn new() -> Self {
        Self
    }

    fn classify(span: &str) -> EntityKind {
        let lower = span.to_lowercase();
        let last = lower.split_whitespace().last().unwrap_or("");
        if ORG_SUFFIXES.contains(&last) {
            return EntityKind::Organization;
        }
        if EVENT_CUES.iter().any(|cue| lower.contains(cue)) {
            return EntityKind::Event;
        }
        if WORK_CUES.iter().any(|cue| lower.contains(cue)) {
            return EntityKind::Work;
        }
        // Capitalized span in headline-style content defaults to a
        // product/brand reading.
        EntityKind::Product
    }
}

fn span_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // A capitalized word optionally followed by up to four more
        // capitalized or digit-led words.
        Regex::new(r"\b[A-Z][A-Za-z0-9]*(?:[ \t][A-Z0-9][A-Za-z0-9'&.-]*){0,4}")
            .expect("invalid entity span pattern")
    })
}

impl EntityRecognizer for PatternRecognizer {
    fn entities(&self, text: &str) -> Vec<NamedEntity> {
        span_pattern()
            .find_iter(text)
            .map(|m| m.as_str().trim().trim_end_matches(['.', ',']))
            .filter(|span| !span.is_empty())
            .map(|span| NamedEntity {
                text: span.to_string(),
                kind: Self::classify(span),
            })
            .collect()
    }
}
