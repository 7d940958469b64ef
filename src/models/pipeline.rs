//! Combined encode-then-classify artifact.

use ndarray::{concatenate, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

use super::{CategoricalEncoder, Classifier, ClassifierArtifact, EncoderArtifact, RecordClassifier};
use crate::error::ModelError;
use crate::record::PatientRecord;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineArtifact {
    pub encoder: EncoderArtifact,
    pub classifier: ClassifierArtifact,
}

impl PipelineArtifact {
    fn features(&self, record: &PatientRecord) -> Result<ndarray::Array1<f64>, ModelError> {
        let numeric = record.numeric();
        let encoded = self.encoder.transform(&record.categorical())?;
        concatenate(Axis(0), &[ArrayView1::from(&numeric[..]), encoded.view()])
            .map_err(|e| ModelError::Malformed(e.to_string()))
    }
}

impl RecordClassifier for PipelineArtifact {
    fn predict(&self, record: &PatientRecord) -> Result<u8, ModelError> {
        let x = self.features(record)?;
        self.classifier.predict(x.view())
    }

    fn predict_proba(&self, record: &PatientRecord) -> Result<[f64; 2], ModelError> {
        let x = self.features(record)?;
        self.classifier.predict_proba(x.view())
    }

    fn backend_type(&self) -> &str {
        self.classifier.backend_type()
    }
}
