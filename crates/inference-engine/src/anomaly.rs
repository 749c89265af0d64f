//! Anomaly Detectors

use crate::features::{schema, ANOMALY_FEATURES};
use crate::onnx::{output_i64, OnnxGraph};
use crate::{AnomalyDetector, FeatureRow, InferenceError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Named output class of an anomaly detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyClass {
    Inlier,
    Outlier,
}

impl AnomalyClass {
    pub fn is_outlier(&self) -> bool {
        matches!(self, AnomalyClass::Outlier)
    }
}

/// Numeric label codes emitted by an exported detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoding {
    pub inlier: i64,
    pub outlier: i64,
}

impl Default for LabelEncoding {
    fn default() -> Self {
        Self {
            inlier: 1,
            outlier: -1,
        }
    }
}

impl LabelEncoding {
    /// Decode a raw label; codes outside the encoding are errors
    pub fn decode(&self, label: i64) -> Result<AnomalyClass, InferenceError> {
        if label == self.outlier {
            Ok(AnomalyClass::Outlier)
        } else if label == self.inlier {
            Ok(AnomalyClass::Inlier)
        } else {
            Err(InferenceError::UnknownLabel(label))
        }
    }
}

/// Standardized-distance envelope around the training centroid.
///
/// A row is an outlier when the root-mean-square of its per-feature
/// standardized offsets exceeds `threshold`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeDetector {
    pub feature_names: Vec<String>,
    pub center: Vec<f64>,
    pub scale: Vec<f64>,
    pub threshold: f64,
}

impl EnvelopeDetector {
    /// Parse and validate a detector from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, InferenceError> {
        let detector: Self = serde_json::from_str(json)
            .map_err(|e| InferenceError::ModelLoadError(format!("anomaly detector: {}", e)))?;
        detector.validate()?;
        Ok(detector)
    }

    /// Load a detector from a JSON file
    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            InferenceError::ModelLoadError(format!("{}: {}", path.display(), e))
        })?;
        let detector = Self::from_json_str(&text)?;
        info!(
            path = %path.display(),
            features = ?detector.feature_names,
            threshold = detector.threshold,
            "Envelope anomaly detector loaded"
        );
        Ok(detector)
    }

    fn validate(&self) -> Result<(), InferenceError> {
        let n = self.feature_names.len();
        if n == 0 || self.center.len() != n || self.scale.len() != n {
            return Err(InferenceError::ModelLoadError(format!(
                "anomaly detector: {} features but {} centers and {} scales",
                n,
                self.center.len(),
                self.scale.len()
            )));
        }
        if self.scale.iter().any(|s| !(s.is_finite() && *s > 0.0)) {
            return Err(InferenceError::ModelLoadError(
                "anomaly detector: scales must be finite and positive".to_string(),
            ));
        }
        if !(self.threshold.is_finite() && self.threshold > 0.0) {
            return Err(InferenceError::ModelLoadError(
                "anomaly detector: threshold must be finite and positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Root-mean-square standardized distance from the centroid
    pub fn distance(&self, values: &[f64]) -> f64 {
        let sum_sq: f64 = values
            .iter()
            .zip(self.center.iter().zip(&self.scale))
            .map(|(x, (c, s))| {
                let d = (x - c) / s;
                d * d
            })
            .sum();
        (sum_sq / values.len() as f64).sqrt()
    }
}

impl AnomalyDetector for EnvelopeDetector {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn classify(&self, row: &FeatureRow) -> Result<AnomalyClass, InferenceError> {
        row.check_schema(&self.feature_names)?;
        let distance = self.distance(&row.values());
        debug!(distance, threshold = self.threshold, "Envelope distance");
        Ok(if distance > self.threshold {
            AnomalyClass::Outlier
        } else {
            AnomalyClass::Inlier
        })
    }

    fn kind(&self) -> &'static str {
        "envelope"
    }
}

/// Outlier detector exported to ONNX whose first output is the class label
pub struct OnnxAnomalyDetector {
    graph: OnnxGraph,
    feature_names: Vec<String>,
    labels: LabelEncoding,
}

impl OnnxAnomalyDetector {
    /// Load a detector fitted on `feature_names` (the canonical schema when `None`)
    pub fn load(
        path: &Path,
        feature_names: Option<Vec<String>>,
        labels: LabelEncoding,
    ) -> Result<Self, InferenceError> {
        let feature_names = feature_names.unwrap_or_else(|| schema(&ANOMALY_FEATURES));
        let graph = OnnxGraph::load(path, feature_names.len())?;
        Ok(Self {
            graph,
            feature_names,
            labels,
        })
    }
}

impl AnomalyDetector for OnnxAnomalyDetector {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn classify(&self, row: &FeatureRow) -> Result<AnomalyClass, InferenceError> {
        row.check_schema(&self.feature_names)?;
        let outputs = self.graph.run(&row.values())?;
        let label = output_i64(&outputs, 0)?
            .first()
            .copied()
            .ok_or_else(|| InferenceError::InvalidOutput("empty label output".to_string()))?;
        self.labels.decode(label)
    }

    fn kind(&self) -> &'static str {
        "onnx"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn detector() -> EnvelopeDetector {
        EnvelopeDetector::from_json_str(
            r#"{
                "feature_names": ["pulse_intensity", "motion_magnitude"],
                "center": [75.0, 1.0],
                "scale": [10.0, 0.5],
                "threshold": 2.5
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_inlier_near_center() {
        let row = FeatureRow::new([("pulse_intensity", 78.0), ("motion_magnitude", 1.2)]);
        assert_eq!(detector().classify(&row).unwrap(), AnomalyClass::Inlier);
    }

    #[test]
    fn test_outlier_far_from_center() {
        // High pulse while motionless
        let row = FeatureRow::new([("pulse_intensity", 140.0), ("motion_magnitude", 0.0)]);
        assert_eq!(detector().classify(&row).unwrap(), AnomalyClass::Outlier);
    }

    #[test]
    fn test_schema_mismatch_rejected() {
        let row = FeatureRow::new([("heart_rate", 78.0), ("motion_magnitude", 1.2)]);
        assert!(matches!(
            detector().classify(&row),
            Err(InferenceError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_invalid_artifacts_rejected() {
        let mismatched = r#"{"feature_names": ["a", "b"], "center": [1.0], "scale": [1.0, 1.0], "threshold": 1.0}"#;
        assert!(EnvelopeDetector::from_json_str(mismatched).is_err());

        let zero_scale = r#"{"feature_names": ["a"], "center": [1.0], "scale": [0.0], "threshold": 1.0}"#;
        assert!(EnvelopeDetector::from_json_str(zero_scale).is_err());
    }

    #[test]
    fn test_label_decoding_by_name() {
        let labels = LabelEncoding::default();
        assert_eq!(labels.decode(-1).unwrap(), AnomalyClass::Outlier);
        assert_eq!(labels.decode(1).unwrap(), AnomalyClass::Inlier);
        assert!(matches!(labels.decode(0), Err(InferenceError::UnknownLabel(0))));

        let flipped = LabelEncoding { inlier: 0, outlier: 1 };
        assert_eq!(flipped.decode(1).unwrap(), AnomalyClass::Outlier);
        assert!(flipped.decode(-1).is_err());
    }

    #[test]
    fn test_shipped_artifact_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../models/anomaly.json");
        let detector = EnvelopeDetector::load(&path).unwrap();
        assert_eq!(detector.feature_names, schema(&ANOMALY_FEATURES));
    }

    // Fixture labels `sign(150 - pulse_intensity)` as int64
    fn onnx_detector() -> OnnxAnomalyDetector {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../models/fixtures/anomaly_sign.onnx");
        OnnxAnomalyDetector::load(&path, None, LabelEncoding::default()).unwrap()
    }

    #[test]
    fn test_onnx_labels_decoded() {
        let detector = onnx_detector();
        let calm = FeatureRow::new([("pulse_intensity", 80.0), ("motion_magnitude", 0.5)]);
        let racing = FeatureRow::new([("pulse_intensity", 200.0), ("motion_magnitude", 0.5)]);
        assert_eq!(detector.classify(&calm).unwrap(), AnomalyClass::Inlier);
        assert_eq!(detector.classify(&racing).unwrap(), AnomalyClass::Outlier);
        assert_eq!(detector.kind(), "onnx");
    }

    #[test]
    fn test_onnx_unknown_label_is_error() {
        let row = FeatureRow::new([("pulse_intensity", 150.0), ("motion_magnitude", 0.5)]);
        assert!(matches!(
            onnx_detector().classify(&row),
            Err(InferenceError::UnknownLabel(0))
        ));
    }

    #[test]
    fn test_onnx_schema_checked_before_inference() {
        let row = FeatureRow::new([("motion_magnitude", 0.5), ("pulse_intensity", 80.0)]);
        assert!(matches!(
            onnx_detector().classify(&row),
            Err(InferenceError::SchemaMismatch { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_distance_non_negative(
            pulse in -1.0e4f64..1.0e4,
            motion in -1.0e3f64..1.0e3,
        ) {
            let detector = detector();
            let distance = detector.distance(&[pulse, motion]);
            prop_assert!(distance.is_finite());
            prop_assert!(distance >= 0.0);
            let row = FeatureRow::new([("pulse_intensity", pulse), ("motion_magnitude", motion)]);
            let class = detector.classify(&row).unwrap();
            prop_assert_eq!(class.is_outlier(), distance > detector.threshold);
        }
    }
}
