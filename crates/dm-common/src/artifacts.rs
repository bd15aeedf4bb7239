use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::candidates::CandidateTable;
use crate::config::ScoringConfig;
use crate::error::DataError;
use crate::skill_catalog::SkillMatchMode;
use crate::tfidf::{TfidfMatrix, TfidfVectorizer};
use crate::Candidate;

pub const MANIFEST_FILE: &str = "manifest.json";
pub const CANDIDATES_FILE: &str = "candidates.json";
pub const VECTORIZER_FILE: &str = "tfidf_vectorizer.json";
pub const MATRIX_FILE: &str = "tfidf_matrix.json";

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("cannot access artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("artifact {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Data(#[from] DataError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub built_at: DateTime<Utc>,
    pub skill_match_mode: SkillMatchMode,
    pub candidate_count: usize,
    pub fingerprint: String,
}

/// Precomputed candidate table with its fitted vectorizer and matrix.
/// Read-only once built; share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringResources {
    pub candidates: CandidateTable,
    pub vectorizer: TfidfVectorizer,
    pub matrix: TfidfMatrix,
    pub built_at: DateTime<Utc>,
}

/// The matrix must have one row per candidate and come from `vectorizer`, and both must
/// be structurally sound.
pub fn check_alignment(
    candidates: &CandidateTable,
    vectorizer: &TfidfVectorizer,
    matrix: &TfidfMatrix,
) -> Result<(), DataError> {
    if matrix.len() != candidates.len() {
        return Err(DataError::RowCountMismatch {
            matrix_rows: matrix.len(),
            table_rows: candidates.len(),
        });
    }
    if matrix.fingerprint != vectorizer.fingerprint {
        return Err(DataError::FingerprintMismatch {
            matrix: matrix.fingerprint.clone(),
            vectorizer: vectorizer.fingerprint.clone(),
        });
    }
    vectorizer.validate()?;
    matrix.validate(vectorizer.vocabulary_len())
}

impl ScoringResources {
    pub fn new(
        candidates: CandidateTable,
        vectorizer: TfidfVectorizer,
        matrix: TfidfMatrix,
        built_at: DateTime<Utc>,
    ) -> Result<Self, DataError> {
        check_alignment(&candidates, &vectorizer, &matrix)?;
        Ok(Self {
            candidates,
            vectorizer,
            matrix,
            built_at,
        })
    }

    /// Precomputes candidates and fits the vectorizer on their texts.
    pub fn build(candidates: &[Candidate], config: &ScoringConfig) -> Self {
        let table = CandidateTable::precompute(candidates, config);
        let (vectorizer, matrix) = TfidfVectorizer::fit_transform(&table.texts());

        tracing::info!(
            candidates = table.len(),
            vocabulary = vectorizer.vocabulary_len(),
            fingerprint = %vectorizer.fingerprint,
            "built scoring resources"
        );

        Self {
            candidates: table,
            vectorizer,
            matrix,
            built_at: Utc::now(),
        }
    }

    pub fn manifest(&self) -> ArtifactManifest {
        ArtifactManifest {
            built_at: self.built_at,
            skill_match_mode: self.candidates.skill_match_mode,
            candidate_count: self.candidates.len(),
            fingerprint: self.vectorizer.fingerprint.clone(),
        }
    }

    pub fn save_to_dir(&self, dir: impl AsRef<Path>) -> Result<(), ArtifactError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|source| ArtifactError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        write_json(&dir.join(MANIFEST_FILE), &self.manifest())?;
        write_json(&dir.join(CANDIDATES_FILE), self.candidates.rows())?;
        write_json(&dir.join(VECTORIZER_FILE), &self.vectorizer)?;
        write_json(&dir.join(MATRIX_FILE), &self.matrix)?;

        tracing::info!(dir = %dir.display(), "saved scoring artifacts");
        Ok(())
    }

    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let dir = dir.as_ref();
        let manifest: ArtifactManifest = read_json(&dir.join(MANIFEST_FILE))?;
        let rows: Vec<Value> = read_json(&dir.join(CANDIDATES_FILE))?;
        let vectorizer: TfidfVectorizer = read_json(&dir.join(VECTORIZER_FILE))?;
        let matrix: TfidfMatrix = read_json(&dir.join(MATRIX_FILE))?;

        let candidates = CandidateTable::from_json_rows(&rows, manifest.skill_match_mode)?;
        let resources = Self::new(candidates, vectorizer, matrix, manifest.built_at)?;

        tracing::info!(
            dir = %dir.display(),
            candidates = resources.candidates.len(),
            built_at = %resources.built_at,
            "loaded scoring artifacts"
        );
        Ok(resources)
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ArtifactError> {
    let raw = serde_json::to_vec(value).map_err(|source| ArtifactError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, raw).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let raw = std::fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&raw).map_err(|source| ArtifactError::Json {
        path: path.to_path_buf(),
        source,
    })
}
