//! Model Inference Collaborators
//!
//! The three models consulted for every reading sit behind narrow traits so
//! the fusion core never depends on how they were trained or stored:
//!
//! - [`BaselineProfileSource`]: per-subject heart-rate mean and deviation
//! - [`AnomalyDetector`]: unsupervised inlier/outlier classification
//! - [`RiskClassifier`]: probability that a reading indicates deterioration
//!
//! Artifacts are JSON-native models or ONNX graphs executed with tract.

mod anomaly;
mod baseline;
mod features;
mod loader;
mod onnx;
mod risk;
pub mod stub;

pub use anomaly::{AnomalyClass, EnvelopeDetector, LabelEncoding, OnnxAnomalyDetector};
pub use baseline::{BaselineProfile, ProfileStore};
pub use features::{FeatureRow, ANOMALY_FEATURES, RISK_FEATURES};
pub use loader::{ModelPaths, ModelSet};
pub use risk::{LogisticRiskModel, OnnxRiskClassifier};

use thiserror::Error;

/// Errors during model loading or inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Feature schema mismatch: model expects [{expected}], got [{actual}]")]
    SchemaMismatch { expected: String, actual: String },
    #[error("No baseline profile for subject {0}")]
    UnknownSubject(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Model emitted unknown class label {0}")]
    UnknownLabel(i64),
    #[error("Model emitted invalid output: {0}")]
    InvalidOutput(String),
}

/// Source of personal heart-rate baselines
pub trait BaselineProfileSource: Send + Sync {
    /// Look up the profile for `subject_id`, or the default subject when `None`
    fn profile(&self, subject_id: Option<&str>) -> Result<BaselineProfile, InferenceError>;

    /// Short description of the backing store, for health reporting
    fn kind(&self) -> &'static str;
}

/// Binary outlier classifier over named features
pub trait AnomalyDetector: Send + Sync {
    /// Feature names and order the detector was fitted on
    fn feature_names(&self) -> &[String];

    /// Classify one row; rows whose schema differs are rejected
    fn classify(&self, row: &FeatureRow) -> Result<AnomalyClass, InferenceError>;

    fn kind(&self) -> &'static str;
}

/// Probabilistic binary classifier; positive class is "deteriorating"
pub trait RiskClassifier: Send + Sync {
    /// Feature names and order the classifier was fitted on
    fn feature_names(&self) -> &[String];

    /// Probability of the positive class, in `[0, 1]`
    fn predict_probability(&self, row: &FeatureRow) -> Result<f64, InferenceError>;

    fn kind(&self) -> &'static str;
}
