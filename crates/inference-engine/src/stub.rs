//! Fixed-output collaborators for tests and local wiring

use crate::features::{schema, ANOMALY_FEATURES, RISK_FEATURES};
use crate::{
    AnomalyClass, AnomalyDetector, BaselineProfile, BaselineProfileSource, FeatureRow,
    InferenceError, RiskClassifier,
};

/// Baseline source returning one profile for every subject
#[derive(Debug, Clone)]
pub struct FixedBaseline(pub BaselineProfile);

impl FixedBaseline {
    pub fn new(mean: f64, std: f64) -> Self {
        Self(BaselineProfile::new(mean, std))
    }
}

impl BaselineProfileSource for FixedBaseline {
    fn profile(&self, _subject_id: Option<&str>) -> Result<BaselineProfile, InferenceError> {
        Ok(self.0)
    }

    fn kind(&self) -> &'static str {
        "fixed"
    }
}

/// Detector returning a fixed class after checking the row schema
#[derive(Debug, Clone)]
pub struct FixedAnomaly {
    class: AnomalyClass,
    feature_names: Vec<String>,
}

impl FixedAnomaly {
    pub fn new(class: AnomalyClass) -> Self {
        Self {
            class,
            feature_names: schema(&ANOMALY_FEATURES),
        }
    }

    /// Pretend the detector was fitted on a different schema
    pub fn with_schema(mut self, names: &[&str]) -> Self {
        self.feature_names = schema(names);
        self
    }
}

impl AnomalyDetector for FixedAnomaly {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn classify(&self, row: &FeatureRow) -> Result<AnomalyClass, InferenceError> {
        row.check_schema(&self.feature_names)?;
        Ok(self.class)
    }

    fn kind(&self) -> &'static str {
        "fixed"
    }
}

/// Classifier returning a fixed probability, or a fixed failure
#[derive(Debug, Clone)]
pub struct FixedRisk {
    outcome: Result<f64, String>,
    feature_names: Vec<String>,
}

impl FixedRisk {
    pub fn new(probability: f64) -> Self {
        Self {
            outcome: Ok(probability),
            feature_names: schema(&RISK_FEATURES),
        }
    }

    /// Classifier whose every query fails
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(message.into()),
            feature_names: schema(&RISK_FEATURES),
        }
    }

    pub fn with_schema(mut self, names: &[&str]) -> Self {
        self.feature_names = schema(names);
        self
    }
}

impl RiskClassifier for FixedRisk {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict_probability(&self, row: &FeatureRow) -> Result<f64, InferenceError> {
        row.check_schema(&self.feature_names)?;
        self.outcome
            .clone()
            .map_err(InferenceError::InferenceFailed)
    }

    fn kind(&self) -> &'static str {
        "fixed"
    }
}
