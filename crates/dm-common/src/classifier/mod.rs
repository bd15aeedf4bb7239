//! Binary "good match" classifiers scored over [`FeatureTable`]s.

mod logistic;

pub use logistic::LogisticRegressionModel;

use crate::error::{ClassifierError, SchemaError};
use crate::matching::features::FeatureTable;

/// A trained model that maps feature rows to P(match).
pub trait Classifier: Send + Sync {
    fn name(&self) -> &str;

    /// Column names, in order, the model was trained on.
    fn feature_names(&self) -> &[String];

    /// One probability per row, in row order.
    fn predict_proba(&self, features: &FeatureTable) -> Result<Vec<f64>, ClassifierError>;
}

/// Fails unless `table` carries exactly the expected columns in the expected order.
pub fn ensure_schema(expected: &[String], columns: &[String]) -> Result<(), SchemaError> {
    if expected == columns {
        Ok(())
    } else {
        Err(SchemaError {
            expected: expected.to_vec(),
            actual: columns.to_vec(),
        })
    }
}
