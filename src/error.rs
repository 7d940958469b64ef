//! Error taxonomy for the prediction pipeline.
//!
//! `PredictError` is what the service boundary sees. Model backends speak
//! `ModelError`, which the inference engine translates.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a failed prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ArtifactNotFound,
    InvalidRecord,
    UnseenCategory,
    InferenceFailed,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ArtifactNotFound => "artifact_not_found",
            ErrorKind::InvalidRecord => "invalid_record",
            ErrorKind::UnseenCategory => "unseen_category",
            ErrorKind::InferenceFailed => "inference_failed",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PredictError {
    #[error("Artifact not found at {path:?}: {reason}")]
    ArtifactNotFound { path: PathBuf, reason: String },

    #[error("Invalid record: {message}")]
    InvalidRecord { fields: Vec<String>, message: String },

    #[error("Unseen category: {0}")]
    UnseenCategory(String),

    #[error("Inference failed: {0}")]
    InferenceFailed(String),
}

impl PredictError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PredictError::ArtifactNotFound { .. } => ErrorKind::ArtifactNotFound,
            PredictError::InvalidRecord { .. } => ErrorKind::InvalidRecord,
            PredictError::UnseenCategory(_) => ErrorKind::UnseenCategory,
            PredictError::InferenceFailed(_) => ErrorKind::InferenceFailed,
        }
    }

    pub fn invalid(fields: Vec<String>, message: impl Into<String>) -> Self {
        PredictError::InvalidRecord { fields, message: message.into() }
    }
}

/// Errors raised by a model or encoder while it runs.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelError {
    #[error("column '{column}' has value {value} which was not seen during fitting")]
    UnseenCategory { column: String, value: i64 },

    #[error("expected {expected} input columns, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("malformed model: {0}")]
    Malformed(String),

    #[error("non-finite model output: {0}")]
    NonFinite(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        let err = PredictError::UnseenCategory("cp=9".into());
        assert_eq!(err.kind(), ErrorKind::UnseenCategory);
        assert_eq!(err.kind().as_str(), "unseen_category");

        let err = PredictError::invalid(vec!["age".into()], "missing field 'age'");
        assert_eq!(err.kind(), ErrorKind::InvalidRecord);
        assert_eq!(err.to_string(), "Invalid record: missing field 'age'");
    }
}
