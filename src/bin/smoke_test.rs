//! Artifact Smoke Test
//!
//! Loads the configured artifacts and runs the reference patient through the
//! full pipeline, checking the response contract before a deployment.

use anyhow::{bail, Result};
use serde_json::json;
use tracing::error;

use heart_risk::assessment::RiskAssessment;
use heart_risk::utils::{init_tracing, telemetry::DEFAULT_FILTER};
use heart_risk::{PredictionService, ServiceConfig};

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing(DEFAULT_FILTER)?;

    println!("\n{}", "═".repeat(60));
    println!("🧪 HEART RISK SMOKE TEST");
    println!("{}", "═".repeat(60));

    // 1. Artifacts
    println!("\n[1/3] Loading artifacts...");
    let config = ServiceConfig::from_env()?;
    let service = PredictionService::bootstrap(&config.artifacts, config.policy)?;
    if !service.is_ready() {
        bail!("service is not ready: {:?}", service.readiness_error());
    }
    println!("✅ Artifacts: {} variant loaded.", config.artifacts.variant().as_str());

    // 2. Reference patient
    println!("\n[2/3] Predicting reference patient...");
    let body = json!({
        "age": 63, "sex": 1, "cp": 3, "trestbps": 145, "chol": 233, "fbs": 1,
        "restecg": 0, "thalach": 150, "exang": 0, "oldpeak": 2.3, "slope": 0,
        "ca": 0, "thal": 1
    });
    let first = service.predict(&body);
    let second = service.predict(&body);
    let Some(p) = first.probability else {
        error!("Prediction failed: {:?}", first.error);
        bail!("reference patient was not scored");
    };
    if (p[0] + p[1] - 1.0).abs() > 1e-6 || first != second {
        bail!("response contract violated: {:?} / {:?}", first, second);
    }
    println!("{}", RiskAssessment::from_response(&first));

    // 3. Error path
    println!("\n[3/3] Checking error isolation...");
    let bad = service.predict(&json!({ "values": [1, 2, 3] }));
    if bad.error.is_none() || !service.predict(&body).is_success() {
        bail!("malformed request was not isolated");
    }
    println!("✅ Errors: reported in-band, service still ready.");

    println!("\n{}", "═".repeat(60));
    println!("🚀 SMOKE TEST COMPLETED SUCCESSFULLY");
    println!("{}\n", "═".repeat(60));

    Ok(())
}
