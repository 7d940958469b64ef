//! Prediction Service
//!
//! Orchestrates parse -> assemble -> infer behind one request/response
//! contract. Every request-time failure is turned into the uniform error
//! response; the service itself never leaves the state it started in.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, info_span, warn};

use crate::artifacts::{ArtifactPaths, ArtifactVariant, Artifacts};
use crate::config::ArtifactPolicy;
use crate::error::{ErrorKind, PredictError};
use crate::features::FeatureAssembler;
use crate::inference::{InferenceEngine, PredictionOutcome};
use crate::record::PatientRecord;

/// Wire shape of `/predict`.
///
/// Success: `{"prediction": 0|1, "probability": [p0, p1]}`.
/// Failure: `{"prediction": null, "probability": null, "error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction: Option<u8>,
    pub probability: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Not part of the wire format.
    #[serde(skip)]
    pub error_kind: Option<ErrorKind>,
}

impl PredictionResponse {
    pub fn success(outcome: PredictionOutcome) -> Self {
        Self {
            prediction: Some(outcome.label),
            probability: Some(outcome.probability),
            error: None,
            error_kind: None,
        }
    }

    pub fn failure(err: &PredictError) -> Self {
        Self {
            prediction: None,
            probability: None,
            error: Some(err.to_string()),
            error_kind: Some(err.kind()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.probability.is_some()
    }
}

enum State {
    Ready {
        variant: ArtifactVariant,
        assembler: FeatureAssembler,
        engine: InferenceEngine,
    },
    NotReady {
        error: PredictError,
    },
}

pub struct PredictionService {
    state: State,
}

impl PredictionService {
    pub fn new(artifacts: Artifacts) -> Self {
        Self {
            state: State::Ready {
                variant: artifacts.variant(),
                assembler: FeatureAssembler::for_artifacts(&artifacts),
                engine: InferenceEngine::for_artifacts(&artifacts),
            },
        }
    }

    /// A service that answers every request with `error`.
    pub fn not_ready(error: PredictError) -> Self {
        Self { state: State::NotReady { error } }
    }

    /// Load artifacts and apply the startup policy. Under
    /// `ArtifactPolicy::Required` a load failure is returned to the caller;
    /// under `Optional` it produces a NotReady service.
    pub fn bootstrap(paths: &ArtifactPaths, policy: ArtifactPolicy) -> Result<Self, PredictError> {
        match Artifacts::load(paths) {
            Ok(artifacts) => Ok(Self::new(artifacts)),
            Err(err) => match policy {
                ArtifactPolicy::Required => Err(err),
                ArtifactPolicy::Optional => {
                    warn!("Starting without artifacts, every prediction will fail: {}", err);
                    Ok(Self::not_ready(err))
                }
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, State::Ready { .. })
    }

    pub fn variant(&self) -> Option<ArtifactVariant> {
        match &self.state {
            State::Ready { variant, .. } => Some(*variant),
            State::NotReady { .. } => None,
        }
    }

    /// The startup error when NotReady.
    pub fn readiness_error(&self) -> Option<&PredictError> {
        match &self.state {
            State::Ready { .. } => None,
            State::NotReady { error } => Some(error),
        }
    }

    /// Predict from a raw JSON body in either accepted shape.
    pub fn predict(&self, body: &Value) -> PredictionResponse {
        self.respond(|| {
            let stages = self.stages()?;
            let record = PatientRecord::from_json(body)?;
            Self::run(stages, &record)
        })
    }

    /// Predict from undecoded request bytes. A NotReady service reports its
    /// readiness error before the body is looked at.
    pub fn predict_bytes(&self, body: &[u8]) -> PredictionResponse {
        self.respond(|| {
            let stages = self.stages()?;
            let value: Value = serde_json::from_slice(body).map_err(|e| {
                PredictError::invalid(Vec::new(), format!("request body is not valid JSON: {e}"))
            })?;
            let record = PatientRecord::from_json(&value)?;
            Self::run(stages, &record)
        })
    }

    /// Predict from an already-typed record.
    pub fn predict_record(&self, record: &PatientRecord) -> PredictionResponse {
        self.respond(|| Self::run(self.stages()?, record))
    }

    fn respond<F>(&self, attempt: F) -> PredictionResponse
    where
        F: FnOnce() -> Result<PredictionOutcome, PredictError>,
    {
        let request_id = uuid::Uuid::new_v4();
        let _span = info_span!("predict", %request_id).entered();

        match attempt() {
            Ok(outcome) => {
                info!(label = outcome.label, p1 = outcome.probability[1], "prediction served");
                PredictionResponse::success(outcome)
            }
            Err(err) => {
                warn!(kind = %err.kind(), "prediction failed: {}", err);
                PredictionResponse::failure(&err)
            }
        }
    }

    fn stages(&self) -> Result<(&FeatureAssembler, &InferenceEngine), PredictError> {
        match &self.state {
            State::NotReady { error } => Err(error.clone()),
            State::Ready { assembler, engine, .. } => Ok((assembler, engine)),
        }
    }

    fn run(
        (assembler, engine): (&FeatureAssembler, &InferenceEngine),
        record: &PatientRecord,
    ) -> Result<PredictionOutcome, PredictError> {
        let features = assembler.assemble(record)?;
        engine.infer(&features)
    }
}
