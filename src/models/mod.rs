//! Model Backends
//!
//! The classifier and encoder are opaque, pre-fitted artifacts. The pipeline
//! only talks to them through the traits below, so the concrete model
//! technology can be swapped without touching assembly or inference.

pub mod encoder;
pub mod forest;
pub mod linear;
pub mod pipeline;

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::record::PatientRecord;

pub use encoder::{EncoderArtifact, OneHotEncoder, OrdinalEncoder};
pub use forest::RandomForest;
pub use linear::LogisticRegression;
pub use pipeline::PipelineArtifact;

/// A fitted binary classifier over a numeric feature vector.
pub trait Classifier: Send + Sync {
    /// Width of the feature vector the model was fitted on.
    fn n_features(&self) -> usize;

    fn predict(&self, features: ArrayView1<'_, f64>) -> Result<u8, ModelError>;

    /// `[P(class=0), P(class=1)]`
    fn predict_proba(&self, features: ArrayView1<'_, f64>) -> Result<[f64; 2], ModelError>;

    fn backend_type(&self) -> &str;
}

/// A fitted transform from raw categorical values to numeric columns.
pub trait CategoricalEncoder: Send + Sync {
    /// Number of categorical input columns seen during fitting.
    fn n_columns(&self) -> usize;

    /// Width of the encoded output.
    fn output_width(&self) -> usize;

    fn transform(&self, values: &[i64]) -> Result<Array1<f64>, ModelError>;
}

/// A combined artifact that encodes and classifies a labelled record itself.
pub trait RecordClassifier: Send + Sync {
    fn predict(&self, record: &PatientRecord) -> Result<u8, ModelError>;

    fn predict_proba(&self, record: &PatientRecord) -> Result<[f64; 2], ModelError>;

    fn backend_type(&self) -> &str;
}

/// Label rule shared by every backend: class 1 wins ties.
pub(crate) fn label_for(proba: &[f64; 2]) -> u8 {
    if proba[1] >= proba[0] {
        1
    } else {
        0
    }
}

/// On-disk classifier, tagged by `"type"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    Logistic(LogisticRegression),
    Forest(RandomForest),
}

impl Classifier for ClassifierArtifact {
    fn n_features(&self) -> usize {
        match self {
            Self::Logistic(m) => m.n_features(),
            Self::Forest(m) => m.n_features(),
        }
    }

    fn predict(&self, features: ArrayView1<'_, f64>) -> Result<u8, ModelError> {
        match self {
            Self::Logistic(m) => m.predict(features),
            Self::Forest(m) => m.predict(features),
        }
    }

    fn predict_proba(&self, features: ArrayView1<'_, f64>) -> Result<[f64; 2], ModelError> {
        match self {
            Self::Logistic(m) => m.predict_proba(features),
            Self::Forest(m) => m.predict_proba(features),
        }
    }

    fn backend_type(&self) -> &str {
        match self {
            Self::Logistic(m) => m.backend_type(),
            Self::Forest(m) => m.backend_type(),
        }
    }
}
