use thiserror::Error;

/// Input that the pipeline cannot work with.
///
/// Absent free text or levels on a single record are not errors (they default to
/// empty / level 0). These variants cover structural problems the caller has to fix.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DataError {
    #[error("candidate table row {row} is missing required column `{column}`")]
    MissingColumn { column: &'static str, row: usize },
    #[error("candidate table row {row} has an invalid value: {reason}")]
    InvalidRow { row: usize, reason: String },
    #[error("tf-idf matrix has {matrix_rows} rows but the candidate table has {table_rows}")]
    RowCountMismatch {
        matrix_rows: usize,
        table_rows: usize,
    },
    #[error("tf-idf matrix fingerprint {matrix} does not match vectorizer fingerprint {vectorizer}")]
    FingerprintMismatch { matrix: String, vectorizer: String },
    #[error("corrupt {artifact}: {reason}")]
    CorruptArtifact { artifact: &'static str, reason: String },
    #[error("malformed record `{id}`: {reason}")]
    MalformedRecord { id: String, reason: String },
}

/// The feature columns handed to a classifier differ from the ones it was trained on.
/// Never recovered by reindexing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("classifier expects features {expected:?} but received {actual:?}")]
pub struct SchemaError {
    pub expected: Vec<String>,
    pub actual: Vec<String>,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ClassifierError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("invalid model: {0}")]
    InvalidModel(String),
    #[error("classifier returned {returned} probabilities for {rows} rows")]
    OutputLength { returned: usize, rows: usize },
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RankError {
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("classifier failure: {0}")]
    Classifier(String),
}

impl From<ClassifierError> for RankError {
    fn from(value: ClassifierError) -> Self {
        match value {
            ClassifierError::Schema(err) => RankError::Schema(err),
            other => RankError::Classifier(other.to_string()),
        }
    }
}
