//! Vital-Sign Reading

use serde::{Deserialize, Serialize};

/// One validated sample from the wearable device.
///
/// Every numeric field is finite once it leaves [`crate::Validator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Heart rate (bpm); also used as pulse intensity by the anomaly model
    pub heart_rate: f64,
    /// Blood oxygen saturation (%)
    pub spo2: f64,
    /// Body temperature (°C)
    pub temperature: f64,
    /// Accelerometer magnitude
    pub motion_magnitude: f64,
    /// Subject whose personal baseline applies; `None` selects the default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
}

impl Reading {
    /// Build a reading for the default subject
    pub fn new(heart_rate: f64, spo2: f64, temperature: f64, motion_magnitude: f64) -> Self {
        Self {
            heart_rate,
            spo2,
            temperature,
            motion_magnitude,
            subject_id: None,
        }
    }

    /// Attach a subject id
    pub fn with_subject(mut self, subject_id: impl Into<String>) -> Self {
        self.subject_id = Some(subject_id.into());
        self
    }
}
