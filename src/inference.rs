//! Inference Engine
//!
//! Runs the loaded model's label and probability operations on the same
//! assembled input. The label is taken from the model as-is; the engine only
//! checks that the outputs are well-formed.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::artifacts::Artifacts;
use crate::error::{ModelError, PredictError};
use crate::features::Features;
use crate::models::{Classifier, RecordClassifier};

const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// 0 = no disease, 1 = disease.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionOutcome {
    pub label: u8,
    pub probability: [f64; 2],
}

#[derive(Clone)]
enum Model {
    Vector(Arc<dyn Classifier>),
    Record(Arc<dyn RecordClassifier>),
}

#[derive(Clone)]
pub struct InferenceEngine {
    model: Model,
}

impl InferenceEngine {
    pub fn for_artifacts(artifacts: &Artifacts) -> Self {
        let model = match artifacts {
            Artifacts::Pipeline(p) => Model::Record(p.clone()),
            Artifacts::Split { classifier, .. } => Model::Vector(classifier.clone()),
        };
        Self { model }
    }

    pub fn infer(&self, features: &Features) -> Result<PredictionOutcome, PredictError> {
        let (label, probability) = match (&self.model, features) {
            (Model::Vector(m), Features::Vector(x)) => {
                let label = m.predict(x.view()).map_err(translate)?;
                let proba = m.predict_proba(x.view()).map_err(translate)?;
                (label, proba)
            }
            (Model::Record(m), Features::Record(r)) => {
                let label = m.predict(r).map_err(translate)?;
                let proba = m.predict_proba(r).map_err(translate)?;
                (label, proba)
            }
            _ => {
                return Err(PredictError::InferenceFailed(
                    "assembled features do not match the loaded model's input kind".to_string(),
                ))
            }
        };

        check_outcome(label, &probability)?;
        debug!(label, p0 = probability[0], p1 = probability[1], "inference complete");
        Ok(PredictionOutcome { label, probability })
    }
}

fn translate(err: ModelError) -> PredictError {
    match err {
        ModelError::UnseenCategory { .. } => PredictError::UnseenCategory(err.to_string()),
        other => PredictError::InferenceFailed(other.to_string()),
    }
}

fn check_outcome(label: u8, probability: &[f64; 2]) -> Result<(), PredictError> {
    if label > 1 {
        return Err(PredictError::InferenceFailed(format!("model returned label {label}")));
    }
    let in_range = probability.iter().all(|p| p.is_finite() && (0.0..=1.0).contains(p));
    let total = probability[0] + probability[1];
    if !in_range || (total - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(PredictError::InferenceFailed(format!(
            "model returned an invalid probability distribution {probability:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::PatientRecord;
    use ndarray::{array, ArrayView1};

    struct Fixed {
        label: u8,
        proba: [f64; 2],
    }

    impl Classifier for Fixed {
        fn n_features(&self) -> usize {
            1
        }

        fn predict(&self, _x: ArrayView1<'_, f64>) -> Result<u8, ModelError> {
            Ok(self.label)
        }

        fn predict_proba(&self, _x: ArrayView1<'_, f64>) -> Result<[f64; 2], ModelError> {
            Ok(self.proba)
        }

        fn backend_type(&self) -> &str {
            "fixed"
        }
    }

    struct Broken;

    impl RecordClassifier for Broken {
        fn predict(&self, _r: &PatientRecord) -> Result<u8, ModelError> {
            Err(ModelError::ShapeMismatch { expected: 20, got: 13 })
        }

        fn predict_proba(&self, _r: &PatientRecord) -> Result<[f64; 2], ModelError> {
            Err(ModelError::ShapeMismatch { expected: 20, got: 13 })
        }

        fn backend_type(&self) -> &str {
            "broken"
        }
    }

    fn engine(label: u8, proba: [f64; 2]) -> InferenceEngine {
        InferenceEngine { model: Model::Vector(Arc::new(Fixed { label, proba })) }
    }

    #[test]
    fn test_trusts_model_outputs() {
        let out = engine(1, [0.25, 0.75]).infer(&Features::Vector(array![1.0])).unwrap();
        assert_eq!(out, PredictionOutcome { label: 1, probability: [0.25, 0.75] });
    }

    #[test]
    fn test_rejects_invalid_distributions() {
        let x = Features::Vector(array![1.0]);
        assert!(engine(0, [0.7, 0.7]).infer(&x).is_err());
        assert!(engine(0, [f64::NAN, 0.5]).infer(&x).is_err());
        assert!(engine(2, [0.5, 0.5]).infer(&x).is_err());
    }

    #[test]
    fn test_model_errors_become_inference_failed() {
        let engine = InferenceEngine { model: Model::Record(Arc::new(Broken)) };
        let record = PatientRecord {
            age: 40, sex: 0, cp: 1, trestbps: 110, chol: 180, fbs: 0, restecg: 0,
            thalach: 170, exang: 0, oldpeak: 0.0, slope: 2, ca: 0, thal: 2,
        };
        let err = engine.infer(&Features::Record(record)).unwrap_err();
        assert!(matches!(err, PredictError::InferenceFailed(ref m) if m.contains("expected 20")));
    }

    #[test]
    fn test_mismatched_feature_kind() {
        let err = engine(0, [1.0, 0.0])
            .infer(&Features::Record(PatientRecord {
                age: 40, sex: 0, cp: 1, trestbps: 110, chol: 180, fbs: 0, restecg: 0,
                thalach: 170, exang: 0, oldpeak: 0.0, slope: 2, ca: 0, thal: 2,
            }))
            .unwrap_err();
        assert!(matches!(err, PredictError::InferenceFailed(_)));
    }
}
