//! Health-Status Fusion Engine
//!
//! Combines three independent signals computed for every reading:
//! - Baseline deviation (personal heart-rate z-score)
//! - Anomaly flag (unsupervised outlier detector)
//! - Risk tier (supervised deterioration probability)
//!
//! into a single [`FusionVerdict`].

mod checks;
mod evaluator;
mod verdict;

pub use checks::{
    anomaly_check, baseline_check, risk_check, AnomalyVerdict, BaselineVerdict, RiskVerdict,
    Z_SCORE_THRESHOLD,
};
pub use evaluator::{Assessment, HealthEvaluator};
pub use verdict::{fuse, FusionVerdict, RiskTier};

use inference_engine::InferenceError;
use thiserror::Error;

/// Fusion error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FusionError {
    /// A computation precondition does not hold for this reading
    #[error("Domain error: {0}")]
    Domain(String),

    /// A model query failed or returned something unusable
    #[error("Model error: {0}")]
    Collaborator(String),
}

impl From<InferenceError> for FusionError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::SchemaMismatch { .. } => {
                FusionError::Domain("feature schema mismatch".to_string())
            }
            InferenceError::UnknownSubject(subject) => {
                FusionError::Domain(format!("no baseline profile for subject {}", subject))
            }
            other => FusionError::Collaborator(other.to_string()),
        }
    }
}
