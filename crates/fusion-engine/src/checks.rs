//! The three per-reading checks feeding the fusion table

use crate::verdict::RiskTier;
use crate::FusionError;
use inference_engine::{
    AnomalyDetector, BaselineProfile, FeatureRow, RiskClassifier, ANOMALY_FEATURES, RISK_FEATURES,
};
use reading_validator::Reading;
use serde::{Deserialize, Serialize};

/// z-scores strictly above this are elevated
pub const Z_SCORE_THRESHOLD: f64 = 2.0;

/// Personal baseline deviation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaselineVerdict {
    /// Absolute z-score, never negative
    pub z_score: f64,
    pub elevated: bool,
}

/// Outlier flag from the anomaly detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyVerdict {
    pub is_anomaly: bool,
}

/// Deterioration risk as a percentage and its tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskVerdict {
    /// Probability of deterioration in `[0, 100]`
    pub critical_probability: f64,
    pub tier: RiskTier,
}

impl RiskVerdict {
    /// Scale a model probability to a percentage and bucket it
    pub fn from_probability(probability: f64) -> Result<Self, FusionError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(FusionError::Collaborator(format!(
                "risk probability {} outside [0, 1]",
                probability
            )));
        }
        let critical_probability = probability * 100.0;
        Ok(Self {
            critical_probability,
            tier: RiskTier::from_percentage(critical_probability),
        })
    }
}

/// `z = |hr - mean| / std`, elevated when `z > 2.0`.
///
/// A zero, negative, or non-finite `std` (or a non-finite mean) has no
/// meaningful z-score and is rejected instead of yielding infinity.
pub fn baseline_check(
    heart_rate: f64,
    profile: &BaselineProfile,
) -> Result<BaselineVerdict, FusionError> {
    if !(profile.std.is_finite() && profile.std > 0.0 && profile.mean.is_finite()) {
        return Err(FusionError::Domain("undefined baseline".to_string()));
    }

    let z_score = (heart_rate - profile.mean).abs() / profile.std;
    if !z_score.is_finite() {
        return Err(FusionError::Domain("undefined baseline".to_string()));
    }

    Ok(BaselineVerdict {
        z_score,
        elevated: z_score > Z_SCORE_THRESHOLD,
    })
}

/// Classify `(pulse_intensity, motion_magnitude)`; outliers are anomalies
pub fn anomaly_check(
    detector: &dyn AnomalyDetector,
    reading: &Reading,
) -> Result<AnomalyVerdict, FusionError> {
    let [pulse, motion] = ANOMALY_FEATURES;
    let row = FeatureRow::new([(pulse, reading.heart_rate), (motion, reading.motion_magnitude)]);
    let class = detector.classify(&row)?;
    Ok(AnomalyVerdict {
        is_anomaly: class.is_outlier(),
    })
}

/// Query the deterioration probability for `(HR, O2Sat, Temp)` and tier it
pub fn risk_check(
    classifier: &dyn RiskClassifier,
    reading: &Reading,
) -> Result<RiskVerdict, FusionError> {
    let [hr, spo2, temp] = RISK_FEATURES;
    let row = FeatureRow::new([
        (hr, reading.heart_rate),
        (spo2, reading.spo2),
        (temp, reading.temperature),
    ]);
    let probability = classifier.predict_probability(&row)?;
    RiskVerdict::from_probability(probability)
}
