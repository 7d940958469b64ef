//! Heart Disease Risk API
//!
//! Loads the model artifacts once, then serves `POST /predict` and
//! `GET /health` until the process is stopped.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use heart_risk::server::run_server;
use heart_risk::utils::{init_tracing, telemetry::DEFAULT_FILTER};
use heart_risk::{PredictionService, ServiceConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    init_tracing(DEFAULT_FILTER)?;

    let config = ServiceConfig::from_env().context("Invalid configuration")?;
    info!(
        "Starting with {} artifacts ({:?} policy)",
        config.artifacts.variant().as_str(),
        config.policy
    );

    // Startup barrier: nothing is served until artifacts are resolved.
    let service = PredictionService::bootstrap(&config.artifacts, config.policy)
        .context("Failed to load model artifacts")?;

    if service.is_ready() {
        info!("Model ready");
    }

    run_server(&config, Arc::new(service)).await
}
