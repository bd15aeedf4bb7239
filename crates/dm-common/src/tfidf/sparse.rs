use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Sparse row with strictly increasing column indices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    pub indices: Vec<usize>,
    pub values: Vec<f64>,
}

impl SparseVector {
    /// Builds from `(column, value)` pairs; zero values are dropped.
    pub fn from_pairs(mut pairs: Vec<(usize, f64)>) -> Self {
        pairs.retain(|(_, v)| *v != 0.0);
        pairs.sort_by_key(|(i, _)| *i);
        let (indices, values) = pairs.into_iter().unzip();
        Self { indices, values }
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j, mut acc) = (0, 0, 0.0);
        while i < self.indices.len() && j < other.indices.len() {
            match self.indices[i].cmp(&other.indices[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    acc += self.values[i] * other.values[j];
                    i += 1;
                    j += 1;
                }
            }
        }
        acc
    }

    fn check(&self, width: usize) -> Result<(), String> {
        if self.indices.len() != self.values.len() {
            return Err(format!(
                "{} indices but {} values",
                self.indices.len(),
                self.values.len()
            ));
        }
        if self.indices.windows(2).any(|w| w[0] >= w[1]) {
            return Err("column indices are not strictly increasing".into());
        }
        if let Some(column) = self.indices.iter().find(|&&c| c >= width) {
            return Err(format!("column {column} is outside a vocabulary of {width}"));
        }
        if self.values.iter().any(|v| !v.is_finite()) {
            return Err("non-finite weight".into());
        }
        Ok(())
    }

    /// Scales to unit length; the zero vector stays zero.
    pub fn l2_normalized(mut self) -> Self {
        let norm = self.norm();
        if norm > 0.0 {
            self.values.iter_mut().for_each(|v| *v /= norm);
        }
        self
    }
}

/// Cosine of the angle between two rows, 0.0 when either is the zero vector.
///
/// TF-IDF weights are non-negative, so the result lies in [0, 1].
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f64 {
    let (na, nb) = (a.norm(), b.norm());
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    (a.dot(b) / (na * nb)).clamp(0.0, 1.0)
}

/// One TF-IDF row per precomputed candidate, in candidate-table order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TfidfMatrix {
    /// Vocabulary fingerprint of the vectorizer that produced the rows.
    pub fingerprint: String,
    pub rows: Vec<SparseVector>,
}

impl TfidfMatrix {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Every row must be well formed for a vocabulary of `width` columns.
    pub fn validate(&self, width: usize) -> Result<(), DataError> {
        self.rows
            .iter()
            .enumerate()
            .try_for_each(|(row, vector)| {
                vector.check(width).map_err(|reason| DataError::CorruptArtifact {
                    artifact: "tf-idf matrix",
                    reason: format!("row {row}: {reason}"),
                })
            })
    }

    /// Similarity of `query` against every row, same order as `rows`.
    pub fn cosine_similarity_many(&self, query: &SparseVector) -> Vec<f64> {
        self.rows.iter().map(|row| cosine_similarity(query, row)).collect()
    }
}
