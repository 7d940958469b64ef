//! Command-line dashboard.
//!
//! Reads a patient record (named fields or `{"values": [...]}`) from the file
//! given as the first argument, or from stdin, and prints the risk assessment.
//! Predicts against `HEART_API_URL` when set, in-process otherwise.

use anyhow::{Context, Result};
use serde_json::Value;
use std::io::Read;
use std::sync::Arc;

use heart_risk::assessment::RiskAssessment;
use heart_risk::client::{Predictor, RemotePredictor};
use heart_risk::utils::{init_tracing, telemetry::DEFAULT_FILTER};
use heart_risk::{PatientRecord, PredictionService, ServiceConfig};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing(DEFAULT_FILTER)?;

    let raw = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let input: Value = serde_json::from_str(&raw).context("input is not valid JSON")?;

    // Send the ordered-list shape when the input parses, as the dashboard did.
    let body = match PatientRecord::from_json(&input) {
        Ok(record) => record.to_values_body(),
        Err(_) => input,
    };

    let predictor: Arc<dyn Predictor> = match std::env::var("HEART_API_URL") {
        Ok(url) => Arc::new(RemotePredictor::new(url)),
        Err(_) => {
            let config = ServiceConfig::from_env()?;
            Arc::new(PredictionService::bootstrap(&config.artifacts, config.policy)?)
        }
    };

    let response = predictor.predict(&body).await?;
    println!("{}", RiskAssessment::from_response(&response));

    Ok(())
}
