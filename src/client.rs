//! Prediction clients.
//!
//! The dashboard side of the contract: something that takes a request body
//! and returns a `PredictionResponse`, either over HTTP or in-process.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::service::{PredictionResponse, PredictionService};

#[async_trait]
pub trait Predictor: Send + Sync {
    async fn predict(&self, body: &Value) -> Result<PredictionResponse>;
}

#[async_trait]
impl Predictor for PredictionService {
    async fn predict(&self, body: &Value) -> Result<PredictionResponse> {
        Ok(PredictionService::predict(self, body))
    }
}

pub struct RemotePredictor {
    client: Client,
    base_url: String,
}

impl RemotePredictor {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/predict", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl Predictor for RemotePredictor {
    async fn predict(&self, body: &Value) -> Result<PredictionResponse> {
        let url = self.endpoint();
        debug!("POST {}", url);

        let res = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Error connecting to API at {url}"))?
            .error_for_status()?;

        res.json::<PredictionResponse>()
            .await
            .context("Failed to parse prediction response")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_cleanly() {
        assert_eq!(RemotePredictor::new("http://127.0.0.1:8000/").endpoint(), "http://127.0.0.1:8000/predict");
        assert_eq!(RemotePredictor::new("http://api").endpoint(), "http://api/predict");
    }
}
