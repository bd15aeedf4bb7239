use std::collections::{BTreeMap, BTreeSet, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::sparse::{SparseVector, TfidfMatrix};
use crate::error::DataError;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").unwrap());

/// Vocabulary and idf weights learned from a corpus.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    /// term -> column; columns follow sorted term order.
    pub vocabulary: BTreeMap<String, usize>,
    pub idf: Vec<f64>,
    pub n_documents: usize,
    pub fingerprint: String,
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    TOKEN_RE.find_iter(text).map(|m| m.as_str().to_lowercase())
}

fn vocabulary_fingerprint(vocabulary: &BTreeMap<String, usize>, n_documents: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(n_documents.to_le_bytes());
    for term in vocabulary.keys() {
        hasher.update(term.as_bytes());
        hasher.update(b"\n");
    }
    let mut hex: String = hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect();
    hex.truncate(16);
    hex
}

impl TfidfVectorizer {
    pub fn fit<S: AsRef<str>>(documents: &[S]) -> Self {
        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();
        for doc in documents {
            let terms: BTreeSet<String> = tokenize(doc.as_ref()).collect();
            for term in terms {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let n_documents = documents.len();
        let n = n_documents as f64;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(document_frequency.len());
        for (column, (term, df)) in document_frequency.into_iter().enumerate() {
            idf.push(((n + 1.0) / (df as f64 + 1.0)).ln() + 1.0);
            vocabulary.insert(term, column);
        }

        let fingerprint = vocabulary_fingerprint(&vocabulary, n_documents);
        Self {
            vocabulary,
            idf,
            n_documents,
            fingerprint,
        }
    }

    /// Fits on `documents` and returns their rows, in input order.
    pub fn fit_transform<S: AsRef<str>>(documents: &[S]) -> (Self, TfidfMatrix) {
        let vectorizer = Self::fit(documents);
        let matrix = vectorizer.transform_many(documents);
        (vectorizer, matrix)
    }

    /// L2-normalized TF-IDF row; out-of-vocabulary terms are ignored.
    pub fn transform(&self, document: &str) -> SparseVector {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for term in tokenize(document) {
            if let Some(&column) = self.vocabulary.get(&term) {
                *counts.entry(column).or_insert(0.0) += 1.0;
            }
        }

        let pairs = counts
            .into_iter()
            .map(|(column, tf)| (column, tf * self.idf[column]))
            .collect();
        SparseVector::from_pairs(pairs).l2_normalized()
    }

    pub fn transform_many<S: AsRef<str>>(&self, documents: &[S]) -> TfidfMatrix {
        TfidfMatrix {
            fingerprint: self.fingerprint.clone(),
            rows: documents.iter().map(|d| self.transform(d.as_ref())).collect(),
        }
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    /// Checks a deserialized vectorizer: one finite idf weight per vocabulary column.
    pub fn validate(&self) -> Result<(), DataError> {
        let corrupt = |reason: String| DataError::CorruptArtifact {
            artifact: "tf-idf vectorizer",
            reason,
        };

        if self.idf.len() != self.vocabulary.len() {
            return Err(corrupt(format!(
                "{} idf weights for {} vocabulary terms",
                self.idf.len(),
                self.vocabulary.len()
            )));
        }
        let out_of_range = self
            .vocabulary
            .iter()
            .find(|(_, column)| **column >= self.idf.len());
        if let Some((term, column)) = out_of_range {
            return Err(corrupt(format!("term `{term}` maps to out-of-range column {column}")));
        }
        if let Some(column) = self.idf.iter().position(|w| !w.is_finite()) {
            return Err(corrupt(format!("idf weight for column {column} is not finite")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tfidf::cosine_similarity;

    fn corpus() -> Vec<&'static str> {
        vec![
            "desenvolvedor python django docker",
            "analista sap fi",
            "desenvolvedor java spring",
        ]
    }

    #[test]
    fn vocabulary_is_sorted_and_skips_single_characters() {
        let v = TfidfVectorizer::fit(&["b a zz aa"]);
        let terms: Vec<_> = v.vocabulary.keys().cloned().collect();
        assert_eq!(terms, vec!["aa", "zz"]);
        assert_eq!(v.vocabulary["aa"], 0);
        assert_eq!(v.vocabulary["zz"], 1);
    }

    #[test]
    fn idf_is_smoothed() {
        let v = TfidfVectorizer::fit(&corpus());
        let n = 3.0_f64;
        let shared = v.idf[v.vocabulary["desenvolvedor"]];
        let rare = v.idf[v.vocabulary["python"]];
        assert!((shared - (((n + 1.0) / 3.0).ln() + 1.0)).abs() < 1e-12);
        assert!((rare - (((n + 1.0) / 2.0).ln() + 1.0)).abs() < 1e-12);
        assert!(rare > shared);
    }

    #[test]
    fn rows_are_unit_length() {
        let (_, matrix) = TfidfVectorizer::fit_transform(&corpus());
        for row in &matrix.rows {
            assert!((row.norm() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn related_text_scores_higher() {
        let (v, matrix) = TfidfVectorizer::fit_transform(&corpus());
        let query = v.transform("vaga python com django");
        let sims = matrix.cosine_similarity_many(&query);
        assert!(sims[0] > sims[1]);
        assert!(sims[0] > sims[2]);
        assert_eq!(sims[1], 0.0);
    }

    #[test]
    fn out_of_vocabulary_query_is_zero_vector() {
        let v = TfidfVectorizer::fit(&corpus());
        let query = v.transform("cobol mainframe");
        assert!(query.is_empty());
        assert_eq!(cosine_similarity(&query, &v.transform("python")), 0.0);
    }

    #[test]
    fn fingerprint_tracks_vocabulary() {
        let a = TfidfVectorizer::fit(&corpus());
        let b = TfidfVectorizer::fit(&corpus());
        let c = TfidfVectorizer::fit(&["outra coisa"]);
        assert_eq!(a.fingerprint, b.fingerprint);
        assert_ne!(a.fingerprint, c.fingerprint);
        assert_eq!(a.fingerprint.len(), 16);
    }
}
