use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{ensure_schema, Classifier};
use crate::error::ClassifierError;
use crate::matching::features::FeatureTable;

/// Logistic regression exported as plain JSON:
/// `{"feature_names": [...], "coefficients": [...], "intercept": f}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegressionModel {
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LogisticRegressionModel {
    pub fn new(
        feature_names: Vec<String>,
        coefficients: Vec<f64>,
        intercept: f64,
    ) -> Result<Self, ClassifierError> {
        let model = Self {
            feature_names,
            coefficients,
            intercept,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ClassifierError> {
        let model: Self = serde_json::from_str(raw)
            .map_err(|err| ClassifierError::InvalidModel(err.to_string()))?;
        model.validate()?;
        Ok(model)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| {
            ClassifierError::InvalidModel(format!("cannot read {}: {err}", path.display()))
        })?;
        let model = Self::from_json_str(&raw)?;
        tracing::info!(path = %path.display(), features = model.feature_names.len(), "loaded classifier");
        Ok(model)
    }

    fn validate(&self) -> Result<(), ClassifierError> {
        if self.feature_names.len() != self.coefficients.len() {
            return Err(ClassifierError::InvalidModel(format!(
                "{} feature names but {} coefficients",
                self.feature_names.len(),
                self.coefficients.len()
            )));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ClassifierError::InvalidModel("non-finite weight".into()));
        }
        Ok(())
    }

    fn probability(&self, row: &[f64]) -> f64 {
        let logit = self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(w, x)| w * x)
                .sum::<f64>();
        1.0 / (1.0 + (-logit).exp())
    }
}

impl Classifier for LogisticRegressionModel {
    fn name(&self) -> &str {
        "logistic_regression"
    }

    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict_proba(&self, features: &FeatureTable) -> Result<Vec<f64>, ClassifierError> {
        ensure_schema(&self.feature_names, &features.columns)?;
        Ok(features.rows.iter().map(|row| self.probability(row)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaError;
    use crate::matching::features::{FeatureVector, FEATURE_COLUMNS};

    fn model() -> LogisticRegressionModel {
        LogisticRegressionModel::new(
            FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            vec![2.0, 0.5, 0.1, 0.3, 0.4, 1.5, 0.2],
            -2.0,
        )
        .unwrap()
    }

    #[test]
    fn better_features_score_higher() {
        let weak = FeatureVector::default();
        let strong = FeatureVector {
            text_similarity: 0.8,
            english_match: 1,
            spanish_match: 1,
            sap_match: 1,
            experience_match: 1,
            skills_match_score: 1.0,
            seniority_match: 1,
        };

        let probs = model()
            .predict_proba(&FeatureTable::from_vectors(&[weak, strong]))
            .unwrap();
        assert_eq!(probs.len(), 2);
        assert!(probs[1] > probs[0]);
        assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn reordered_columns_are_a_schema_error() {
        let mut table = FeatureTable::from_vectors(&[FeatureVector::default()]);
        table.columns.swap(0, 1);

        let err = model().predict_proba(&table).unwrap_err();
        assert!(matches!(err, ClassifierError::Schema(SchemaError { .. })));
    }

    #[test]
    fn parses_json_export() {
        let raw = r#"{"feature_names": ["a", "b"], "coefficients": [1.0, -1.0], "intercept": 0.0}"#;
        let model = LogisticRegressionModel::from_json_str(raw).unwrap();
        assert_eq!(model.feature_names(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn rejects_mismatched_weights() {
        let raw = r#"{"feature_names": ["a", "b"], "coefficients": [1.0], "intercept": 0.0}"#;
        assert!(matches!(
            LogisticRegressionModel::from_json_str(raw),
            Err(ClassifierError::InvalidModel(_))
        ));
    }
}
