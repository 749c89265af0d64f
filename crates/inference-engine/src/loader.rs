//! Startup loading of the three model artifacts

use crate::{
    AnomalyDetector, BaselineProfileSource, EnvelopeDetector, InferenceError, LabelEncoding,
    LogisticRiskModel, OnnxAnomalyDetector, OnnxRiskClassifier, ProfileStore, RiskClassifier,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Artifact locations and decoding options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelPaths {
    /// Baseline profiles (JSON)
    pub baseline_path: PathBuf,
    /// Anomaly detector (`.json` envelope or `.onnx`)
    pub anomaly_path: PathBuf,
    /// Risk classifier (`.json` logistic or `.onnx`)
    pub risk_path: PathBuf,
    /// Label codes of an ONNX anomaly detector
    pub anomaly_labels: LabelEncoding,
    /// Fitted feature order of an ONNX anomaly detector
    pub anomaly_features: Option<Vec<String>>,
    /// Fitted feature order of an ONNX risk classifier
    pub risk_features: Option<Vec<String>>,
    /// Output index holding class probabilities in an ONNX risk classifier
    pub risk_probability_output: usize,
}

impl Default for ModelPaths {
    fn default() -> Self {
        Self {
            baseline_path: PathBuf::from("models/baseline.json"),
            anomaly_path: PathBuf::from("models/anomaly.json"),
            risk_path: PathBuf::from("models/risk.json"),
            anomaly_labels: LabelEncoding::default(),
            anomaly_features: None,
            risk_features: None,
            risk_probability_output: 1,
        }
    }
}

/// The three loaded collaborators, shared read-only for the process lifetime
#[derive(Clone)]
pub struct ModelSet {
    pub baseline: Arc<dyn BaselineProfileSource>,
    pub anomaly: Arc<dyn AnomalyDetector>,
    pub risk: Arc<dyn RiskClassifier>,
}

impl ModelSet {
    pub fn new(
        baseline: Arc<dyn BaselineProfileSource>,
        anomaly: Arc<dyn AnomalyDetector>,
        risk: Arc<dyn RiskClassifier>,
    ) -> Self {
        Self {
            baseline,
            anomaly,
            risk,
        }
    }

    /// Load every artifact named in `paths`
    pub fn load(paths: &ModelPaths) -> Result<Self, InferenceError> {
        info!("Loading model artifacts...");

        let baseline: Arc<dyn BaselineProfileSource> =
            Arc::new(ProfileStore::load(&paths.baseline_path)?);

        let anomaly: Arc<dyn AnomalyDetector> = if is_onnx(&paths.anomaly_path) {
            Arc::new(OnnxAnomalyDetector::load(
                &paths.anomaly_path,
                paths.anomaly_features.clone(),
                paths.anomaly_labels,
            )?)
        } else {
            Arc::new(EnvelopeDetector::load(&paths.anomaly_path)?)
        };

        let risk: Arc<dyn RiskClassifier> = if is_onnx(&paths.risk_path) {
            Arc::new(OnnxRiskClassifier::load(
                &paths.risk_path,
                paths.risk_features.clone(),
                paths.risk_probability_output,
            )?)
        } else {
            Arc::new(LogisticRiskModel::load(&paths.risk_path)?)
        };

        info!(
            baseline = baseline.kind(),
            anomaly = anomaly.kind(),
            risk = risk.kind(),
            "Models loaded successfully"
        );

        Ok(Self::new(baseline, anomaly, risk))
    }
}

fn is_onnx(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("onnx"))
        .unwrap_or(false)
}
