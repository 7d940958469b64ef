use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::config::ServiceConfig;
use crate::service::{PredictionResponse, PredictionService};

pub type AppState = Arc<PredictionService>;

pub fn router(service: AppState) -> Router {
    Router::new()
        .route("/predict", post(predict_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

pub async fn run_server(config: &ServiceConfig, service: AppState) -> Result<()> {
    let addr = config.bind_addr();
    let app = router(service);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("🚀 Heart risk API listening at http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Errors are reported in-band with status 200, including bodies that are not JSON.
async fn predict_handler(State(service): State<AppState>, body: Bytes) -> Json<PredictionResponse> {
    debug!(bytes = body.len(), "predict request");
    Json(service.predict_bytes(&body))
}

async fn health_handler(State(service): State<AppState>) -> impl IntoResponse {
    match service.readiness_error() {
        None => (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "variant": service.variant().map(|v| v.as_str()),
            })),
        ),
        Some(err) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "not_ready", "error": err.to_string() })),
        ),
    }
}
