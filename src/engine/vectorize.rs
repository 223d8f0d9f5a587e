//! TF-IDF vectorization over unigrams through trigrams
//!
//! Builds a dense document-term matrix suitable for k-means. The vocabulary
//! requires a minimum document frequency to suppress noise and is capped at
//! a configurable maximum size, keeping the highest-document-frequency terms
//! (ties broken alphabetically for determinism).

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::config::VectorizerConfig;
use crate::engine::extract::ExtractionError;

/// English stopwords excluded from the vocabulary
const STOPWORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be", "been",
    "but", "by", "can", "could", "did", "do", "does", "for", "from", "had", "has", "have", "he",
    "her", "his", "how", "if", "in", "into", "is", "it", "its", "just", "like", "may", "more",
    "most", "my", "no", "not", "of", "on", "one", "or", "other", "our", "out", "over", "said",
    "she", "should", "so", "some", "than", "that", "the", "their", "them", "then", "there",
    "these", "they", "this", "to", "up", "was", "we", "were", "what", "when", "which", "who",
    "will", "with", "would", "you", "your",
];

/// Fitted TF-IDF model plus the transformed document matrix
#[derive(Debug, Clone)]
pub struct TfIdfMatrix {
    /// Vocabulary terms, column order of the matrix
    pub vocab: Vec<String>,

    /// Inverse document frequency per vocabulary term
    pub idf: Vec<f64>,

    /// L2-normalized document rows, one per input document
    pub rows: Vec<Vec<f64>>,
}

impl TfIdfMatrix {
    /// Vectorize a document set
    ///
    /// Returns an error when no term survives the document-frequency filter,
    /// which the extractor treats as "this stage produced nothing usable".
    pub fn fit_transform(docs: &[String], config: &VectorizerConfig) -> Result<Self, ExtractionError> {
        let tokenized: Vec<Vec<String>> = docs.iter().map(|d| ngrams(d, config.max_ngram)).collect();

        // Document frequency over a deterministic ordering
        let mut doc_freq: BTreeMap<&str, usize> = BTreeMap::new();
        for tokens in &tokenized {
            let unique: HashSet<&str> = tokens.iter().map(String::as_str).collect();
            for term in unique {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        let mut candidates: Vec<(&str, usize)> = doc_freq
            .into_iter()
            .filter(|(_, df)| *df >= config.min_doc_freq)
            .collect();
        if candidates.is_empty() {
            return Err(ExtractionError::EmptyVocabulary);
        }

        // Highest document frequency first; BTreeMap input keeps ties
        // alphabetical, so the cap is reproducible.
        candidates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        candidates.truncate(config.max_features);

        let vocab: Vec<String> = candidates.iter().map(|(t, _)| t.to_string()).collect();
        let n_docs = docs.len() as f64;
        let idf: Vec<f64> = candidates
            .iter()
            .map(|(_, df)| ((1.0 + n_docs) / (1.0 + *df as f64)).ln() + 1.0)
            .collect();

        let index: HashMap<&str, usize> = vocab
            .iter()
            .enumerate()
            .map(|(i, t)| (t.as_str(), i))
            .collect();

        let rows = tokenized
            .iter()
            .map(|tokens| {
                let mut row = vec![0.0; vocab.len()];
                for token in tokens {
                    if let Some(&col) = index.get(token.as_str()) {
                        row[col] += 1.0;
                    }
                }
                for (col, value) in row.iter_mut().enumerate() {
                    *value *= idf[col];
                }
                l2_normalize(&mut row);
                row
            })
            .collect();

        Ok(Self { vocab, idf, rows })
    }

    /// Number of vocabulary terms
    pub fn n_features(&self) -> usize {
        self.vocab.len()
    }

    /// Top `n` vocabulary terms of a centroid vector by weight, strongest
    /// first, zero-weight terms excluded
    pub fn top_terms(&self, centroid: &[f64], n: usize) -> Vec<String> {
        let mut weighted: Vec<(usize, f64)> = centroid
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, w)| *w > 0.0)
            .collect();
        weighted.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        weighted
            .into_iter()
            .take(n)
            .map(|(col, _)| self.vocab[col].clone())
            .collect()
    }
}

/// Lowercased word tokens with stopwords and single characters removed
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() >= 2)
        .filter(|w| !STOPWORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// All n-grams of length 1..=max_n, joined with single spaces
fn ngrams(text: &str, max_n: usize) -> Vec<String> {
    let words = tokenize(text);
    let mut grams = Vec::with_capacity(words.len() * max_n);
    for n in 1..=max_n {
        if n > words.len() {
            break;
        }
        for window in words.windows(n) {
            grams.push(window.join(" "));
        }
    }
    grams
}

fn l2_normalize(row: &mut [f64]) {
    let norm: f64 = row.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > 1e-12 {
        for x in row.iter_mut() {
            *x /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_tokenize_drops_stopwords_and_short_words() {
        let tokens = tokenize("The new AI model is a breakthrough");
        assert_eq!(tokens, vec!["new", "ai", "model", "breakthrough"]);
    }

    #[test]
    fn test_ngrams_include_bigrams_and_trigrams() {
        let grams = ngrams("chatgpt atlas browser", 3);
        assert!(grams.contains(&"chatgpt".to_string()));
        assert!(grams.contains(&"chatgpt atlas".to_string()));
        assert!(grams.contains(&"chatgpt atlas browser".to_string()));
    }

    #[test]
    fn test_min_doc_freq_filters_singletons() {
        let matrix = TfIdfMatrix::fit_transform(
            &docs(&[
                "chatgpt atlas launch",
                "chatgpt atlas review",
                "quantum computing milestone",
            ]),
            &VectorizerConfig::default(),
        )
        .unwrap();
        assert!(matrix.vocab.contains(&"chatgpt".to_string()));
        assert!(matrix.vocab.contains(&"chatgpt atlas".to_string()));
        // appears in one document only
        assert!(!matrix.vocab.contains(&"quantum".to_string()));
    }

    #[test]
    fn test_no_shared_terms_is_an_error() {
        let result = TfIdfMatrix::fit_transform(
            &docs(&["alpha beta", "gamma delta", "epsilon zeta"]),
            &VectorizerConfig::default(),
        );
        assert!(matches!(result, Err(ExtractionError::EmptyVocabulary)));
    }

    #[test]
    fn test_rows_are_l2_normalized() {
        let matrix = TfIdfMatrix::fit_transform(
            &docs(&["rust memory safety", "rust memory model"]),
            &VectorizerConfig::default(),
        )
        .unwrap();
        for row in &matrix.rows {
            let norm: f64 = row.iter().map(|x| x * x).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-9, "row norm was {norm}");
        }
    }

    #[test]
    fn test_vocab_cap_keeps_most_frequent() {
        let config = VectorizerConfig {
            max_features: 2,
            min_doc_freq: 2,
            max_ngram: 1,
        };
        let matrix = TfIdfMatrix::fit_transform(
            &docs(&[
                "apple banana cherry",
                "apple banana",
                "apple cherry",
            ]),
            &config,
        )
        .unwrap();
        assert_eq!(matrix.n_features(), 2);
        // apple (df 3) always kept; banana/cherry tie at df 2, alphabetical wins
        assert_eq!(matrix.vocab, vec!["apple".to_string(), "banana".to_string()]);
    }

    #[test]
    fn test_top_terms_ordering() {
        let matrix = TfIdfMatrix::fit_transform(
            &docs(&["alpha alpha beta", "alpha beta beta"]),
            &VectorizerConfig {
                max_features: 10,
                min_doc_freq: 2,
                max_ngram: 1,
            },
        )
        .unwrap();
        let centroid = vec![0.9, 0.1];
        let terms = matrix.top_terms(&centroid, 2);
        assert_eq!(terms[0], matrix.vocab[0]);
    }

    #[test]
    fn test_deterministic_output() {
        let corpus = docs(&[
            "chatgpt atlas launch day",
            "chatgpt atlas first impressions",
            "atlas browser from openai",
            "openai launch event recap",
        ]);
        let a = TfIdfMatrix::fit_transform(&corpus, &VectorizerConfig::default()).unwrap();
        let b = TfIdfMatrix::fit_transform(&corpus, &VectorizerConfig::default()).unwrap();
        assert_eq!(a.vocab, b.vocab);
        assert_eq!(a.rows, b.rows);
    }
}
