//! TF-IDF vectorization
//!
//! Tokens are runs of two or more word characters, lowercased. Stop words
//! are removed before n-grams are formed, so a bigram never spans a stop
//! word's position as a term of its own. Weights use smoothed inverse
//! document frequency, `ln((1 + n) / (1 + df)) + 1`, and every row is
//! L2-normalized.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use regex::Regex;

use crate::stopwords::is_stop_word;
use crate::TopicsError;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("valid regex"));

/// Dense document-term matrix with its vocabulary
#[derive(Debug, Clone, PartialEq)]
pub struct TfIdfMatrix {
    /// Terms in column order (sorted)
    pub vocabulary: Vec<String>,

    /// One L2-normalized row per input document
    pub rows: Vec<Vec<f64>>,
}

impl TfIdfMatrix {
    /// Number of columns
    pub fn n_features(&self) -> usize {
        self.vocabulary.len()
    }
}

/// Fits a bounded unigram + bigram vocabulary and weights documents by it
#[derive(Debug, Clone)]
pub struct TfIdfVectorizer {
    max_features: usize,
    max_ngram: usize,
    remove_stop_words: bool,
}

impl Default for TfIdfVectorizer {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl TfIdfVectorizer {
    /// English stop words removed, unigrams and bigrams
    pub fn new(max_features: usize) -> Self {
        Self {
            max_features,
            max_ngram: 2,
            remove_stop_words: true,
        }
    }

    /// Keep stop words
    pub fn keep_stop_words(mut self) -> Self {
        self.remove_stop_words = false;
        self
    }

    /// Longest n-gram to emit (1 for unigrams only)
    pub fn with_max_ngram(mut self, n: usize) -> Self {
        self.max_ngram = n.max(1);
        self
    }

    /// Terms of one document, in order, with repeats
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = TOKEN
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|t| !self.remove_stop_words || !is_stop_word(t))
            .collect();

        let mut terms: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
        for n in 2..=self.max_ngram {
            terms.extend(tokens.windows(n).map(|w| w.join(" ")));
        }
        terms
    }

    /// Learn the vocabulary from `docs` and return their weighted rows
    pub fn fit_transform<S: AsRef<str>>(&self, docs: &[S]) -> Result<TfIdfMatrix, TopicsError> {
        let analyzed: Vec<Vec<String>> = docs.iter().map(|d| self.analyze(d.as_ref())).collect();

        // corpus count and document frequency per term
        let mut stats: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for terms in &analyzed {
            let mut seen: Vec<&str> = Vec::new();
            for term in terms {
                let entry = stats.entry(term.as_str()).or_default();
                entry.0 += 1;
                if !seen.contains(&term.as_str()) {
                    seen.push(term.as_str());
                    entry.1 += 1;
                }
            }
        }

        if stats.is_empty() {
            return Err(TopicsError::Vectorization(
                "empty vocabulary; the documents contain only stop words or no words at all"
                    .to_string(),
            ));
        }

        let mut ranked: Vec<(&str, usize, usize)> =
            stats.into_iter().map(|(t, (count, df))| (t, count, df)).collect();
        if ranked.len() > self.max_features {
            // BTreeMap order makes the tie-break alphabetical
            ranked.sort_by(|a, b| b.1.cmp(&a.1));
            ranked.truncate(self.max_features);
            ranked.sort_by(|a, b| a.0.cmp(b.0));
        }

        let n_docs = docs.len() as f64;
        let columns: HashMap<&str, usize> =
            ranked.iter().enumerate().map(|(i, (t, _, _))| (*t, i)).collect();
        let idf: Vec<f64> = ranked
            .iter()
            .map(|(_, _, df)| ((1.0 + n_docs) / (1.0 + *df as f64)).ln() + 1.0)
            .collect();

        let rows = analyzed
            .iter()
            .map(|terms| {
                let mut row = vec![0.0; ranked.len()];
                for term in terms {
                    if let Some(&col) = columns.get(term.as_str()) {
                        row[col] += 1.0;
                    }
                }
                for (value, weight) in row.iter_mut().zip(&idf) {
                    *value *= weight;
                }
                let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
                if norm > 0.0 {
                    row.iter_mut().for_each(|v| *v /= norm);
                }
                row
            })
            .collect();

        Ok(TfIdfMatrix {
            vocabulary: ranked.iter().map(|(t, _, _)| t.to_string()).collect(),
            rows,
        })
    }
}
