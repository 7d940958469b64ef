//! Service configuration, read from the environment (and `.env` when the
//! binary loads one).

use anyhow::{anyhow, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::artifacts::{ArtifactPaths, ArtifactVariant};

/// What to do when artifacts cannot be loaded at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactPolicy {
    /// Refuse to start.
    Required,
    /// Start NotReady and report the load error on every request.
    Optional,
}

impl FromStr for ArtifactPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "required" | "hard" => Ok(ArtifactPolicy::Required),
            "optional" | "soft" => Ok(ArtifactPolicy::Optional),
            other => Err(format!("unknown artifact policy '{other}' (expected 'required' or 'optional')")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub artifacts: ArtifactPaths,
    pub policy: ArtifactPolicy,
    pub host: String,
    pub port: u16,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            artifacts: ArtifactPaths::Pipeline(PathBuf::from("artifacts/pipeline.json")),
            policy: ArtifactPolicy::Required,
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let variant: ArtifactVariant = get("HEART_ARTIFACT_VARIANT", "pipeline")
            .parse()
            .map_err(|e: String| anyhow!(e))?;
        let artifacts = match variant {
            ArtifactVariant::Pipeline => {
                ArtifactPaths::Pipeline(get("HEART_PIPELINE_PATH", "artifacts/pipeline.json").into())
            }
            ArtifactVariant::Split => ArtifactPaths::Split {
                classifier: get("HEART_MODEL_PATH", "artifacts/classifier.json").into(),
                encoder: get("HEART_ENCODER_PATH", "artifacts/encoder.json").into(),
            },
        };

        let policy = get("HEART_ARTIFACT_POLICY", "required")
            .parse()
            .map_err(|e: String| anyhow!(e))?;

        let port_raw = get("HEART_PORT", "8000");
        let port = port_raw
            .parse()
            .map_err(|_| anyhow!("HEART_PORT must be a port number, got '{}'", port_raw))?;

        Ok(Self { artifacts, policy, host: get("HEART_HOST", "127.0.0.1"), port })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
