//! Topic merging: collapse near-duplicate topics into one
//!
//! A single order-sensitive pass. Each topic can act as an anchor that
//! absorbs later duplicates; a topic consumed by an earlier merge is never
//! considered again. Merges produce new `Topic` values via union operations
//! instead of mutating shared collections.

use std::collections::BTreeSet;
use tracing::debug;

use crate::config::MergeConfig;
use crate::engine::Topic;

/// Jaccard similarity (intersection over union) between two keyword sets,
/// case-insensitive
pub fn jaccard_similarity(a: &[String], b: &[String]) -> f64 {
    let a: BTreeSet<String> = a.iter().map(|k| k.to_lowercase()).collect();
    let b: BTreeSet<String> = b.iter().map(|k| k.to_lowercase()).collect();
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(&b).count();
    intersection as f64 / union as f64
}

fn keyword_overlap(a: &[String], b: &[String]) -> usize {
    let a: BTreeSet<String> = a.iter().map(|k| k.to_lowercase()).collect();
    let b: BTreeSet<String> = b.iter().map(|k| k.to_lowercase()).collect();
    a.intersection(&b).count()
}

fn same_name(a: &Topic, b: &Topic) -> bool {
    a.name.trim().to_lowercase() == b.name.trim().to_lowercase()
}

/// Union two topics into a new one
///
/// Keywords keep the anchor's ordering, then append unseen keywords from
/// the absorbed topic, capped at `max_keywords`. The surviving name comes
/// from whichever topic has higher velocity; the merged velocity is the
/// mention-weighted average of the two (see DESIGN.md).
fn merge_pair(anchor: &Topic, absorbed: &Topic, max_keywords: usize) -> Topic {
    let name = if absorbed.velocity > anchor.velocity {
        absorbed.name.clone()
    } else {
        anchor.name.clone()
    };

    let mut keywords = anchor.keywords.clone();
    let seen: BTreeSet<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
    for keyword in &absorbed.keywords {
        if !seen.contains(&keyword.to_lowercase()) {
            keywords.push(keyword.clone());
        }
    }
    keywords.truncate(max_keywords);

    let mut members = anchor.members.clone();
    members.extend(absorbed.members.iter().cloned());

    let sources: BTreeSet<String> = anchor.sources.union(&absorbed.sources).cloned().collect();
    let mention_count = anchor.mention_count + absorbed.mention_count;

    let velocity = if mention_count > 0 {
        (anchor.velocity * anchor.mention_count as f64
            + absorbed.velocity * absorbed.mention_count as f64)
            / mention_count as f64
    } else {
        anchor.velocity.max(absorbed.velocity)
    };

    Topic {
        name,
        keywords,
        members,
        mention_count,
        velocity,
        sources,
        recency_boost: anchor.recency_boost.max(absorbed.recency_boost),
    }
}

/// Merge near-duplicate topics
///
/// Two rules, in order: identical names (case-insensitive, trimmed) merge
/// unconditionally; otherwise keyword sets with Jaccard similarity at or
/// above the configured threshold AND at least the configured number of
/// shared keywords merge. Within a pass each topic merges at most once into
/// an earlier anchor; passes repeat until stable, since an anchor's keyword
/// union can open a merge that was not possible before. The result is
/// idempotent: merging the output again changes nothing.
pub fn merge_topics(mut topics: Vec<Topic>, config: &MergeConfig, max_keywords: usize) -> Vec<Topic> {
    loop {
        let before = topics.len();
        topics = merge_pass(topics, config, max_keywords);
        if topics.len() == before {
            return topics;
        }
    }
}

fn merge_pass(topics: Vec<Topic>, config: &MergeConfig, max_keywords: usize) -> Vec<Topic> {
    let mut consumed = vec![false; topics.len()];
    let mut merged = Vec::with_capacity(topics.len());

    for i in 0..topics.len() {
        if consumed[i] {
            continue;
        }
        let mut anchor = topics[i].clone();
        for j in (i + 1)..topics.len() {
            if consumed[j] {
                continue;
            }
            let candidate = &topics[j];
            let by_name = same_name(&anchor, candidate);
            let by_overlap = !by_name && {
                let similarity = jaccard_similarity(&anchor.keywords, &candidate.keywords);
                similarity >= config.jaccard_threshold
                    && keyword_overlap(&anchor.keywords, &candidate.keywords)
                        >= config.min_keyword_overlap
            };
            if by_name || by_overlap {
                debug!(
                    anchor = %anchor.name,
                    absorbed = %candidate.name,
                    rule = if by_name { "name" } else { "keywords" },
                    "Merging duplicate topics"
                );
                anchor = merge_pair(&anchor, candidate, max_keywords);
                consumed[j] = true;
            }
        }
        merged.push(anchor);
    }

    merged
}
