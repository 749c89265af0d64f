//! Named Feature Rows

use crate::InferenceError;

/// Feature schema of the anomaly detector, in fitted order
pub const ANOMALY_FEATURES: [&str; 2] = ["pulse_intensity", "motion_magnitude"];

/// Feature schema of the risk classifier, in fitted order
pub const RISK_FEATURES: [&str; 3] = ["HR", "O2Sat", "Temp"];

/// A single row of named features handed to a model
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    columns: Vec<(String, f64)>,
}

impl FeatureRow {
    /// Build a row from `(name, value)` pairs, keeping their order
    pub fn new<N: Into<String>>(columns: impl IntoIterator<Item = (N, f64)>) -> Self {
        Self {
            columns: columns.into_iter().map(|(n, v)| (n.into(), v)).collect(),
        }
    }

    /// Column names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    /// Column values in order
    pub fn values(&self) -> Vec<f64> {
        self.columns.iter().map(|(_, v)| *v).collect()
    }

    /// Ensure the row's names and order match what a model was fitted on
    pub fn check_schema(&self, expected: &[String]) -> Result<(), InferenceError> {
        if self.names().eq(expected.iter().map(String::as_str)) {
            return Ok(());
        }
        Err(InferenceError::SchemaMismatch {
            expected: expected.join(", "),
            actual: self.names().collect::<Vec<_>>().join(", "),
        })
    }
}

/// Owned copy of a static schema
pub(crate) fn schema(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}
