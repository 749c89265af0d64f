//! Risk Classifiers

use crate::features::{schema, RISK_FEATURES};
use crate::onnx::{output_f64, OnnxGraph};
use crate::{FeatureRow, InferenceError, RiskClassifier};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Logistic regression over named features
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRiskModel {
    pub feature_names: Vec<String>,
    pub weights: Vec<f64>,
    pub intercept: f64,
}

impl LogisticRiskModel {
    /// Parse and validate a model from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, InferenceError> {
        let model: Self = serde_json::from_str(json)
            .map_err(|e| InferenceError::ModelLoadError(format!("risk classifier: {}", e)))?;
        if model.feature_names.is_empty() || model.weights.len() != model.feature_names.len() {
            return Err(InferenceError::ModelLoadError(format!(
                "risk classifier: {} features but {} weights",
                model.feature_names.len(),
                model.weights.len()
            )));
        }
        Ok(model)
    }

    /// Load a model from a JSON file
    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            InferenceError::ModelLoadError(format!("{}: {}", path.display(), e))
        })?;
        let model = Self::from_json_str(&text)?;
        info!(path = %path.display(), features = ?model.feature_names, "Logistic risk model loaded");
        Ok(model)
    }
}

impl RiskClassifier for LogisticRiskModel {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict_probability(&self, row: &FeatureRow) -> Result<f64, InferenceError> {
        row.check_schema(&self.feature_names)?;
        let logit: f64 = row
            .values()
            .iter()
            .zip(&self.weights)
            .map(|(x, w)| x * w)
            .sum::<f64>()
            + self.intercept;
        Ok(1.0 / (1.0 + (-logit).exp()))
    }

    fn kind(&self) -> &'static str {
        "logistic"
    }
}

/// Probabilistic classifier exported to ONNX.
///
/// Output `probability_output` must hold `[p(stable), p(deteriorating)]`.
pub struct OnnxRiskClassifier {
    graph: OnnxGraph,
    feature_names: Vec<String>,
    probability_output: usize,
}

impl OnnxRiskClassifier {
    pub fn load(
        path: &Path,
        feature_names: Option<Vec<String>>,
        probability_output: usize,
    ) -> Result<Self, InferenceError> {
        let feature_names = feature_names.unwrap_or_else(|| schema(&RISK_FEATURES));
        let graph = OnnxGraph::load(path, feature_names.len())?;
        Ok(Self {
            graph,
            feature_names,
            probability_output,
        })
    }
}

impl RiskClassifier for OnnxRiskClassifier {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict_probability(&self, row: &FeatureRow) -> Result<f64, InferenceError> {
        row.check_schema(&self.feature_names)?;
        let outputs = self.graph.run(&row.values())?;
        let probabilities = output_f64(&outputs, self.probability_output)?;
        probabilities.get(1).copied().ok_or_else(|| {
            InferenceError::InvalidOutput(format!(
                "expected two class probabilities, got {}",
                probabilities.len()
            ))
        })
    }

    fn kind(&self) -> &'static str {
        "onnx"
    }
}
