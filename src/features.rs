//! Feature Assembler
//!
//! Turns a validated `PatientRecord` into what the loaded model consumes.
//! With a separate encoder that is the numeric partition followed by the
//! encoded categorical partition; with a combined pipeline the record is
//! passed through untouched.

use ndarray::{concatenate, Array1, ArrayView1, Axis};
use std::sync::Arc;

use crate::artifacts::Artifacts;
use crate::error::{ModelError, PredictError};
use crate::models::CategoricalEncoder;
use crate::record::{PatientRecord, CATEGORICAL_COLUMNS, NUMERIC_COLUMNS};

/// Model input produced by the assembler.
#[derive(Debug, Clone, PartialEq)]
pub enum Features {
    Vector(Array1<f64>),
    Record(PatientRecord),
}

#[derive(Clone)]
pub struct FeatureAssembler {
    encoder: Option<Arc<dyn CategoricalEncoder>>,
}

impl FeatureAssembler {
    pub fn passthrough() -> Self {
        Self { encoder: None }
    }

    pub fn with_encoder(encoder: Arc<dyn CategoricalEncoder>) -> Self {
        Self { encoder: Some(encoder) }
    }

    pub fn for_artifacts(artifacts: &Artifacts) -> Self {
        match artifacts {
            Artifacts::Pipeline(_) => Self::passthrough(),
            Artifacts::Split { encoder, .. } => Self::with_encoder(encoder.clone()),
        }
    }

    pub fn assemble(&self, record: &PatientRecord) -> Result<Features, PredictError> {
        match &self.encoder {
            None => Ok(Features::Record(*record)),
            Some(encoder) => self.encode(encoder.as_ref(), record).map(Features::Vector),
        }
    }

    fn encode(
        &self,
        encoder: &dyn CategoricalEncoder,
        record: &PatientRecord,
    ) -> Result<Array1<f64>, PredictError> {
        if encoder.n_columns() != CATEGORICAL_COLUMNS.len() {
            return Err(PredictError::UnseenCategory(format!(
                "encoder was fitted on {} categorical columns but the record supplies {} ({})",
                encoder.n_columns(),
                CATEGORICAL_COLUMNS.len(),
                CATEGORICAL_COLUMNS.join(", ")
            )));
        }

        let encoded = encoder.transform(&record.categorical()).map_err(translate)?;
        if encoded.len() != encoder.output_width() {
            return Err(PredictError::UnseenCategory(format!(
                "encoder produced {} columns, expected {}",
                encoded.len(),
                encoder.output_width()
            )));
        }

        let numeric = record.numeric();
        debug_assert_eq!(numeric.len(), NUMERIC_COLUMNS.len());
        concatenate(Axis(0), &[ArrayView1::from(&numeric[..]), encoded.view()])
            .map_err(|e| PredictError::InferenceFailed(e.to_string()))
    }
}

fn translate(err: ModelError) -> PredictError {
    match err {
        ModelError::UnseenCategory { .. } | ModelError::ShapeMismatch { .. } => {
            PredictError::UnseenCategory(err.to_string())
        }
        other => PredictError::InferenceFailed(other.to_string()),
    }
}
