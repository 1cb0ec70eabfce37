//! TF-IDF vectorizer for converting email text to feature vectors.
//!
//! - lowercases, then keeps tokens of two or more word characters
//! - drops English stop words
//! - keeps the `max_features` most frequent terms, indexed alphabetically
//! - smoothed IDF, raw counts, L2 normalization

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::encoder::{FeatureVector, TextEncoder};
use crate::{AiError, stop_words};

/// Default vocabulary cap.
pub const MAX_FEATURES: usize = 5000;

fn token_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Infallible: the pattern is a constant.
    RE.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("valid token pattern"))
}

/// Split text into lowercase, non-stop-word tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let stop = stop_words::english();
    token_pattern()
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|t| !stop.contains(*t))
        .map(str::to_string)
        .collect()
}

/// Fitted TF-IDF vectorizer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TfidfVectorizer {
    /// Term to feature index.
    vocabulary: BTreeMap<String, usize>,
    /// Inverse document frequency per feature index.
    idf: Vec<f64>,
    max_features: usize,
}

impl TfidfVectorizer {
    /// Build the vocabulary and IDF weights from training documents.
    pub fn fit(documents: &[String], max_features: usize) -> Result<Self, AiError> {
        if documents.is_empty() {
            return Err(AiError::EmptyCorpus("no documents"));
        }

        let mut term_freq: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let tokens = tokenize(doc);
            let mut seen = HashSet::new();
            for token in tokens {
                if seen.insert(token.clone()) {
                    *doc_freq.entry(token.clone()).or_insert(0) += 1;
                }
                *term_freq.entry(token).or_insert(0) += 1;
            }
        }

        if term_freq.is_empty() {
            return Err(AiError::EmptyCorpus(
                "documents contain only stop words or short tokens",
            ));
        }

        // Most frequent first, ties alphabetical.
        let mut ranked: Vec<(String, usize)> = term_freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(max_features);

        let mut terms: Vec<String> = ranked.into_iter().map(|(t, _)| t).collect();
        terms.sort();

        let n_docs = documents.len() as f64;
        let idf = terms
            .iter()
            .map(|t| {
                let df = doc_freq.get(t).copied().unwrap_or(0) as f64;
                ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let vocabulary = terms.into_iter().enumerate().map(|(i, t)| (t, i)).collect();

        let vectorizer = Self {
            vocabulary,
            idf,
            max_features,
        };
        debug!(
            documents = documents.len(),
            vocabulary = vectorizer.vocabulary.len(),
            "fitted tf-idf vectorizer"
        );
        Ok(vectorizer)
    }

    /// Transform one document into a normalized TF-IDF vector.
    pub fn transform(&self, document: &str) -> FeatureVector {
        let mut weights = vec![0.0f64; self.vocabulary.len()];
        for token in tokenize(document) {
            if let Some(&idx) = self.vocabulary.get(&token) {
                weights[idx] += 1.0;
            }
        }

        for (w, idf) in weights.iter_mut().zip(&self.idf) {
            *w *= idf;
        }

        let norm = weights.iter().map(|w| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for w in &mut weights {
                *w /= norm;
            }
        }

        weights.into_iter().map(|w| w as f32).collect()
    }

    pub fn transform_batch(&self, documents: &[String]) -> Vec<FeatureVector> {
        documents.iter().map(|d| self.transform(d)).collect()
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn max_features(&self) -> usize {
        self.max_features
    }

    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// Check that every vocabulary index addresses exactly one IDF weight.
    pub fn validate(&self) -> Result<(), String> {
        if self.vocabulary.is_empty() {
            return Err("vocabulary is empty".to_string());
        }
        if self.idf.len() != self.vocabulary.len() {
            return Err(format!(
                "{} idf weights for {} vocabulary terms",
                self.idf.len(),
                self.vocabulary.len()
            ));
        }
        let mut used = vec![false; self.idf.len()];
        for (term, &idx) in &self.vocabulary {
            match used.get_mut(idx) {
                None => {
                    return Err(format!(
                        "term {term:?} has index {idx}, idf holds {}",
                        self.idf.len()
                    ));
                }
                Some(true) => return Err(format!("index {idx} assigned twice (at {term:?})")),
                Some(slot) => *slot = true,
            }
        }
        Ok(())
    }
}

impl TextEncoder for TfidfVectorizer {
    fn dim(&self) -> usize {
        self.vocabulary.len()
    }

    fn encode(&self, text: &str) -> FeatureVector {
        self.transform(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn tokenize_drops_stop_words_and_short_tokens() {
        let tokens = tokenize("Please respond to the Server outage, a B now!");
        assert_eq!(tokens, vec!["respond", "server", "outage"]);
    }

    #[test]
    fn vocabulary_is_alphabetical() {
        let v = TfidfVectorizer::fit(&docs(&["zebra apple", "mango apple"]), 10).unwrap();
        assert_eq!(v.index_of("apple"), Some(0));
        assert_eq!(v.index_of("mango"), Some(1));
        assert_eq!(v.index_of("zebra"), Some(2));
    }

    #[test]
    fn max_features_keeps_most_frequent() {
        let corpus = docs(&["alpha alpha alpha beta beta gamma", "alpha beta delta"]);
        let v = TfidfVectorizer::fit(&corpus, 2).unwrap();
        assert_eq!(v.vocabulary_len(), 2);
        assert!(v.index_of("alpha").is_some());
        assert!(v.index_of("beta").is_some());
        assert!(v.index_of("gamma").is_none());
    }

    #[test]
    fn smoothed_idf_values() {
        // n = 2; "shared" in both docs, "solo" in one.
        let v = TfidfVectorizer::fit(&docs(&["shared solo", "shared"]), 10).unwrap();
        let shared = v.idf[v.index_of("shared").unwrap()];
        let solo = v.idf[v.index_of("solo").unwrap()];
        assert!((shared - 1.0).abs() < 1e-12);
        assert!((solo - ((3.0f64 / 2.0).ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn transform_is_unit_norm() {
        let v = TfidfVectorizer::fit(&docs(&["server down urgent", "lunch menu friday"]), 10)
            .unwrap();
        let vec = v.transform("urgent server outage");
        assert_eq!(vec.len(), v.dim());
        let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn out_of_vocabulary_text_is_zero() {
        let v = TfidfVectorizer::fit(&docs(&["server down urgent"]), 10).unwrap();
        let vec = v.transform("completely unrelated words");
        assert!(vec.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn fit_rejects_empty_corpus() {
        assert!(matches!(
            TfidfVectorizer::fit(&[], 10),
            Err(AiError::EmptyCorpus(_))
        ));
        assert!(matches!(
            TfidfVectorizer::fit(&docs(&["the a of", "  "]), 10),
            Err(AiError::EmptyCorpus(_))
        ));
    }

    #[test]
    fn validate_accepts_fitted_vectorizer() {
        let v = TfidfVectorizer::fit(&docs(&["server down urgent", "team lunch"]), 10).unwrap();
        assert_eq!(v.validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_index_past_idf() {
        let v: TfidfVectorizer =
            serde_json::from_str(r#"{"vocabulary":{"server":7},"idf":[1.0],"max_features":10}"#)
                .unwrap();
        let reason = v.validate().unwrap_err();
        assert!(reason.contains("index 7"), "{reason}");
    }

    #[test]
    fn validate_rejects_idf_length_and_duplicate_indices() {
        let short: TfidfVectorizer = serde_json::from_str(
            r#"{"vocabulary":{"alpha":0,"beta":1},"idf":[1.0],"max_features":10}"#,
        )
        .unwrap();
        assert!(short.validate().unwrap_err().contains("1 idf weights for 2"));

        let dup: TfidfVectorizer = serde_json::from_str(
            r#"{"vocabulary":{"alpha":0,"beta":0},"idf":[1.0,1.0],"max_features":10}"#,
        )
        .unwrap();
        assert!(dup.validate().unwrap_err().contains("assigned twice"));
    }

    #[test]
    fn transform_is_deterministic() {
        let v = TfidfVectorizer::fit(&docs(&["budget review meeting", "team lunch"]), 10).unwrap();
        assert_eq!(v.transform("budget meeting"), v.transform("budget meeting"));
    }
}
