//! Risk Assessment
//!
//! How a client reads a `PredictionResponse`. A missing `probability` is the
//! only failure signal; the error string is shown in its place.

use std::fmt;

use crate::service::PredictionResponse;

/// Disease probability at or above which a positive prediction is shown as
/// high risk rather than moderate.
pub const HIGH_RISK_THRESHOLD: f64 = 0.6;

const MISSING_PROBABILITY: &str = "API did not return probability.";

#[derive(Debug, Clone, PartialEq)]
pub enum RiskBand {
    NoDisease,
    ModerateRisk,
    Disease,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RiskAssessment {
    Failed(String),
    Scored { band: RiskBand, probability: [f64; 2] },
}

impl RiskAssessment {
    pub fn from_response(response: &PredictionResponse) -> Self {
        let Some(probability) = response.probability else {
            let msg = response.error.clone().unwrap_or_else(|| MISSING_PROBABILITY.to_string());
            return RiskAssessment::Failed(msg);
        };

        let band = if response.prediction == Some(0) {
            RiskBand::NoDisease
        } else if probability[1] >= HIGH_RISK_THRESHOLD {
            RiskBand::Disease
        } else {
            RiskBand::ModerateRisk
        };
        RiskAssessment::Scored { band, probability }
    }
}

/// `0.8123` -> `"81.23%"`
pub fn format_percent(p: f64) -> String {
    format!("{:.2}%", p * 100.0)
}

impl fmt::Display for RiskAssessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskAssessment::Failed(msg) => write!(f, "❌ {msg}"),
            RiskAssessment::Scored { band, probability } => {
                let headline = match band {
                    RiskBand::NoDisease => "✅ This patient is predicted NOT to have Heart Disease.",
                    RiskBand::Disease => "⚠️ This patient is predicted to have Heart Disease.",
                    RiskBand::ModerateRisk => "⚠️ This patient has moderate risk of Heart Disease.",
                };
                writeln!(f, "{headline}")?;
                writeln!(f, "   No Disease Probability: {}", format_percent(probability[0]))?;
                write!(f, "   Disease Probability:    {}", format_percent(probability[1]))
            }
        }
    }
}
