//! Heart Disease Risk Inference
//!
//! Serves a pre-fitted binary classifier over HTTP:
//! - Typed 13-field patient record with a validating JSON parse
//! - Combined pipeline or classifier + separate categorical encoder
//! - Exact numeric-then-encoded feature ordering
//! - Uniform in-band error responses, soft or hard artifact dependency

pub mod artifacts;
pub mod assessment;
pub mod client;
pub mod config;
pub mod error;
pub mod features;
pub mod inference;
pub mod models;
pub mod record;
pub mod server;
pub mod service;
pub mod utils;

// Re-exports for convenience
pub use artifacts::{ArtifactPaths, ArtifactVariant, Artifacts};
pub use config::{ArtifactPolicy, ServiceConfig};
pub use error::{ErrorKind, PredictError};
pub use record::PatientRecord;
pub use service::{PredictionResponse, PredictionService};
