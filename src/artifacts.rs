//! Artifact Loader
//!
//! Reads the fitted model (and, in the split variant, the categorical
//! encoder) once at startup and hands back an immutable handle. Contents are
//! only deserialized here; incompatible artifacts fail later, at inference.

use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::PredictError;
use crate::models::{
    CategoricalEncoder, Classifier, ClassifierArtifact, EncoderArtifact, PipelineArtifact,
    RecordClassifier,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactVariant {
    /// One combined encode-and-classify artifact.
    Pipeline,
    /// A classifier plus a separate categorical encoder.
    Split,
}

impl ArtifactVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactVariant::Pipeline => "pipeline",
            ArtifactVariant::Split => "split",
        }
    }
}

impl FromStr for ArtifactVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pipeline" | "combined" => Ok(ArtifactVariant::Pipeline),
            "split" | "separate" => Ok(ArtifactVariant::Split),
            other => Err(format!("unknown artifact variant '{other}' (expected 'pipeline' or 'split')")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactPaths {
    Pipeline(PathBuf),
    Split { classifier: PathBuf, encoder: PathBuf },
}

impl ArtifactPaths {
    pub fn variant(&self) -> ArtifactVariant {
        match self {
            ArtifactPaths::Pipeline(_) => ArtifactVariant::Pipeline,
            ArtifactPaths::Split { .. } => ArtifactVariant::Split,
        }
    }
}

/// Loaded, read-only model state shared by every request.
#[derive(Clone)]
pub enum Artifacts {
    Pipeline(Arc<dyn RecordClassifier>),
    Split {
        classifier: Arc<dyn Classifier>,
        encoder: Arc<dyn CategoricalEncoder>,
    },
}

impl std::fmt::Debug for Artifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Artifacts({})", self.describe())
    }
}

impl Artifacts {
    pub fn load(paths: &ArtifactPaths) -> Result<Self, PredictError> {
        info!("Loading {} artifacts: {:?}", paths.variant().as_str(), paths);

        let artifacts = match paths {
            ArtifactPaths::Pipeline(path) => {
                let pipeline: PipelineArtifact = read_json(path)?;
                Artifacts::Pipeline(Arc::new(pipeline))
            }
            ArtifactPaths::Split { classifier, encoder } => {
                let classifier: ClassifierArtifact = read_json(classifier)?;
                let encoder: EncoderArtifact = read_json(encoder)?;
                Artifacts::Split { classifier: Arc::new(classifier), encoder: Arc::new(encoder) }
            }
        };

        info!("Artifacts ready: {}", artifacts.describe());
        Ok(artifacts)
    }

    pub fn variant(&self) -> ArtifactVariant {
        match self {
            Artifacts::Pipeline(_) => ArtifactVariant::Pipeline,
            Artifacts::Split { .. } => ArtifactVariant::Split,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Artifacts::Pipeline(p) => format!("pipeline[{}]", p.backend_type()),
            Artifacts::Split { classifier, encoder } => format!(
                "split[{} x{} + encoder {}->{}]",
                classifier.backend_type(),
                classifier.n_features(),
                encoder.n_columns(),
                encoder.output_width()
            ),
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, PredictError> {
    let not_found = |reason: String| PredictError::ArtifactNotFound { path: path.to_path_buf(), reason };

    if !path.exists() {
        return Err(not_found("file does not exist".to_string()));
    }
    debug!("Reading artifact {:?}", path);

    // The handle is dropped when this function returns, on either path.
    let file = File::open(path).map_err(|e| not_found(format!("unreadable: {e}")))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| not_found(format!("could not decode: {e}")))
}
