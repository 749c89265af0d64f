//! Reading Ingestion Route

use axum::{body::Bytes, extract::rejection::BytesRejection, extract::State, Json};
use fusion_engine::{Assessment, FusionVerdict, RiskTier};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::error::ApiError;
use crate::AppState;

/// Signals that contributed to the decision
#[derive(Debug, Serialize)]
pub struct Signals {
    pub z_score: f64,
    pub baseline_elevated: bool,
    pub is_anomaly: bool,
    pub risk_tier: RiskTier,
    pub critical_probability: f64,
}

/// Success body
#[derive(Debug, Serialize)]
pub struct DecisionResponse {
    pub status: String,
    pub decision: FusionVerdict,
    pub advice: String,
    pub signals: Signals,
}

impl From<Assessment> for DecisionResponse {
    fn from(assessment: Assessment) -> Self {
        Self {
            status: "success".to_string(),
            decision: assessment.decision,
            advice: assessment.decision.advice().to_string(),
            signals: Signals {
                z_score: assessment.baseline.z_score,
                baseline_elevated: assessment.baseline.elevated,
                is_anomaly: assessment.anomaly.is_anomaly,
                risk_tier: assessment.risk.tier,
                critical_probability: assessment.risk.critical_probability,
            },
        }
    }
}

/// Assess one reading posted by a device.
///
/// The body is taken raw so malformed JSON, oversized bodies and missing or
/// non-numeric fields all get the same structured error shape.
pub async fn post_reading(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<DecisionResponse>, ApiError> {
    let reading = state.validator.parse_body(&body?)?;

    let start = Instant::now();
    let assessment = state.evaluator.evaluate(&reading)?;
    metrics::histogram!("fusion_evaluation_seconds").record(start.elapsed().as_secs_f64());
    metrics::counter!("fusion_verdicts_total", "verdict" => assessment.decision.as_str())
        .increment(1);

    Ok(Json(DecisionResponse::from(assessment)))
}
