//! Logistic regression backend.

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use super::{label_for, Classifier};
use crate::error::ModelError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub weights: Vec<f64>,
    pub intercept: f64,
}

impl LogisticRegression {
    fn decision(&self, features: ArrayView1<'_, f64>) -> Result<f64, ModelError> {
        if features.len() != self.weights.len() {
            return Err(ModelError::ShapeMismatch {
                expected: self.weights.len(),
                got: features.len(),
            });
        }
        let weights = ArrayView1::from(self.weights.as_slice());
        Ok(weights.dot(&features) + self.intercept)
    }
}

impl Classifier for LogisticRegression {
    fn n_features(&self) -> usize {
        self.weights.len()
    }

    fn predict(&self, features: ArrayView1<'_, f64>) -> Result<u8, ModelError> {
        self.predict_proba(features).map(|p| label_for(&p))
    }

    fn predict_proba(&self, features: ArrayView1<'_, f64>) -> Result<[f64; 2], ModelError> {
        let z = self.decision(features)?;
        if !z.is_finite() {
            return Err(ModelError::NonFinite(format!("decision value {z}")));
        }
        let p1 = 1.0 / (1.0 + (-z).exp());
        Ok([1.0 - p1, p1])
    }

    fn backend_type(&self) -> &str {
        "logistic"
    }
}
