//! Reading evaluation against the loaded models

use crate::checks::{anomaly_check, baseline_check, risk_check};
use crate::verdict::fuse;
use crate::{AnomalyVerdict, BaselineVerdict, FusionError, FusionVerdict, RiskVerdict};
use inference_engine::ModelSet;
use reading_validator::Reading;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};

/// Final verdict together with the signals that produced it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub decision: FusionVerdict,
    pub baseline: BaselineVerdict,
    pub anomaly: AnomalyVerdict,
    pub risk: RiskVerdict,
}

/// Runs a reading through the three models and the fusion table.
///
/// Holds no mutable state; one instance serves concurrent requests.
#[derive(Clone)]
pub struct HealthEvaluator {
    models: ModelSet,
}

impl HealthEvaluator {
    /// Create an evaluator over models loaded once at startup
    pub fn new(models: ModelSet) -> Self {
        Self { models }
    }

    pub fn models(&self) -> &ModelSet {
        &self.models
    }

    /// Assess one reading
    pub fn evaluate(&self, reading: &Reading) -> Result<Assessment, FusionError> {
        // `None` means the baseline source's own default subject
        let span = info_span!("fusion", subject = ?reading.subject_id);
        let _enter = span.enter();

        info!(
            heart_rate = reading.heart_rate,
            spo2 = reading.spo2,
            temperature = reading.temperature,
            motion = reading.motion_magnitude,
            "New reading received"
        );

        let result = self.run_checks(reading);
        match &result {
            Ok(assessment) => info!(decision = %assessment.decision, "Fusion engine final decision"),
            Err(e) => warn!(error = %e, "Reading could not be assessed"),
        }
        result
    }

    fn run_checks(&self, reading: &Reading) -> Result<Assessment, FusionError> {
        let profile = self.models.baseline.profile(reading.subject_id.as_deref())?;
        let baseline = baseline_check(reading.heart_rate, &profile)?;
        debug!(z_score = baseline.z_score, elevated = baseline.elevated, "Baseline check");

        let anomaly = anomaly_check(self.models.anomaly.as_ref(), reading)?;
        debug!(is_anomaly = anomaly.is_anomaly, "Anomaly check");

        let risk = risk_check(self.models.risk.as_ref(), reading)?;
        debug!(
            tier = %risk.tier,
            critical_probability = risk.critical_probability,
            "Risk check"
        );

        Ok(Assessment {
            decision: fuse(baseline.elevated, anomaly.is_anomaly, risk.tier),
            baseline,
            anomaly,
            risk,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RiskTier;
    use inference_engine::stub::{FixedAnomaly, FixedBaseline, FixedRisk};
    use inference_engine::{
        AnomalyClass, BaselineProfile, LabelEncoding, OnnxAnomalyDetector, ProfileStore,
    };
    use std::path::Path;
    use std::sync::Arc;

    fn evaluator(baseline: FixedBaseline, anomaly: AnomalyClass, risk: FixedRisk) -> HealthEvaluator {
        HealthEvaluator::new(ModelSet::new(
            Arc::new(baseline),
            Arc::new(FixedAnomaly::new(anomaly)),
            Arc::new(risk),
        ))
    }

    #[test]
    fn test_stable_reading() {
        let eval = evaluator(FixedBaseline::new(80.0, 10.0), AnomalyClass::Inlier, FixedRisk::new(0.1));
        let assessment = eval.evaluate(&Reading::new(82.0, 98.0, 36.7, 1.0)).unwrap();
        assert_eq!(assessment.decision, FusionVerdict::Stable);
        assert_eq!(assessment.risk.tier, RiskTier::Low);
        assert!(!assessment.baseline.elevated);
    }

    #[test]
    fn test_high_risk_alone_is_critical() {
        let eval = evaluator(FixedBaseline::new(80.0, 10.0), AnomalyClass::Inlier, FixedRisk::new(0.9));
        let assessment = eval.evaluate(&Reading::new(82.0, 98.0, 36.7, 1.0)).unwrap();
        assert_eq!(assessment.decision, FusionVerdict::Critical);
    }

    #[test]
    fn test_anomaly_with_elevated_baseline_is_critical() {
        let eval = evaluator(FixedBaseline::new(80.0, 10.0), AnomalyClass::Outlier, FixedRisk::new(0.1));
        let assessment = eval.evaluate(&Reading::new(125.0, 98.0, 36.7, 0.0)).unwrap();
        assert!(assessment.baseline.elevated);
        assert!(assessment.anomaly.is_anomaly);
        assert_eq!(assessment.decision, FusionVerdict::Critical);
    }

    #[test]
    fn test_anomaly_alone_is_warning() {
        let eval = evaluator(FixedBaseline::new(80.0, 10.0), AnomalyClass::Outlier, FixedRisk::new(0.1));
        let assessment = eval.evaluate(&Reading::new(85.0, 98.0, 36.7, 0.0)).unwrap();
        assert_eq!(assessment.decision, FusionVerdict::Warning);
    }

    #[test]
    fn test_zero_std_baseline_fails_request() {
        let eval = evaluator(FixedBaseline::new(80.0, 0.0), AnomalyClass::Inlier, FixedRisk::new(0.1));
        assert_eq!(
            eval.evaluate(&Reading::new(80.0, 98.0, 36.7, 1.0)).unwrap_err(),
            FusionError::Domain("undefined baseline".to_string())
        );
    }

    #[test]
    fn test_unknown_subject_is_domain_error() {
        let store = ProfileStore::single("default", BaselineProfile::new(75.0, 8.0));
        let eval = HealthEvaluator::new(ModelSet::new(
            Arc::new(store),
            Arc::new(FixedAnomaly::new(AnomalyClass::Inlier)),
            Arc::new(FixedRisk::new(0.1)),
        ));
        let reading = Reading::new(80.0, 98.0, 36.7, 1.0).with_subject("ghost");
        assert!(matches!(
            eval.evaluate(&reading),
            Err(FusionError::Domain(msg)) if msg.contains("ghost")
        ));
        assert!(eval.evaluate(&Reading::new(80.0, 98.0, 36.7, 1.0)).is_ok());
    }

    #[test]
    fn test_absent_subject_uses_store_default() {
        let store = ProfileStore::single("ward-3", BaselineProfile::new(60.0, 5.0));
        let eval = HealthEvaluator::new(ModelSet::new(
            Arc::new(store),
            Arc::new(FixedAnomaly::new(AnomalyClass::Inlier)),
            Arc::new(FixedRisk::new(0.1)),
        ));
        let assessment = eval.evaluate(&Reading::new(75.0, 98.0, 36.7, 1.0)).unwrap();
        assert_eq!(assessment.baseline.z_score, 3.0);
        assert!(assessment.baseline.elevated);
    }

    #[test]
    fn test_onnx_unknown_label_is_collaborator_error() {
        // Fixture emits sign(150 - pulse), so a pulse of exactly 150 yields label 0
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../models/fixtures/anomaly_sign.onnx");
        let detector = OnnxAnomalyDetector::load(&path, None, LabelEncoding::default()).unwrap();
        let eval = HealthEvaluator::new(ModelSet::new(
            Arc::new(FixedBaseline::new(80.0, 10.0)),
            Arc::new(detector),
            Arc::new(FixedRisk::new(0.1)),
        ));

        let assessment = eval.evaluate(&Reading::new(200.0, 98.0, 36.7, 0.0)).unwrap();
        assert!(assessment.anomaly.is_anomaly);
        assert_eq!(assessment.decision, FusionVerdict::Critical);

        assert!(matches!(
            eval.evaluate(&Reading::new(150.0, 98.0, 36.7, 0.0)),
            Err(FusionError::Collaborator(msg)) if msg.contains("label 0")
        ));
    }

    #[test]
    fn test_collaborator_failure_surfaces() {
        let eval = evaluator(
            FixedBaseline::new(80.0, 10.0),
            AnomalyClass::Inlier,
            FixedRisk::failing("model state corrupted"),
        );
        assert!(matches!(
            eval.evaluate(&Reading::new(80.0, 98.0, 36.7, 1.0)),
            Err(FusionError::Collaborator(_))
        ));
    }

    #[test]
    fn test_evaluator_is_repeatable() {
        let eval = evaluator(FixedBaseline::new(70.0, 5.0), AnomalyClass::Outlier, FixedRisk::new(0.4));
        let reading = Reading::new(90.0, 95.0, 37.4, 0.3);
        let first = eval.evaluate(&reading).unwrap();
        for _ in 0..10 {
            assert_eq!(eval.evaluate(&reading).unwrap(), first);
        }
    }
}
