//! Reading Validator

use crate::error::ValidationError;
use crate::reading::Reading;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Reject physiologically implausible values
    pub enforce_ranges: bool,
    /// Heart rate valid range (bpm)
    pub heart_rate_range: (f64, f64),
    /// SpO2 valid range (%)
    pub spo2_range: (f64, f64),
    /// Temperature valid range (°C)
    pub temperature_range: (f64, f64),
    /// Motion magnitude valid range
    pub motion_range: (f64, f64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            enforce_ranges: false,
            heart_rate_range: (20.0, 300.0),
            spo2_range: (0.0, 100.0),
            temperature_range: (25.0, 45.0),
            motion_range: (0.0, 64.0),
        }
    }
}

/// Validator for inbound reading records
#[derive(Debug, Clone)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Parse a raw request body into a [`Reading`]
    pub fn parse_body(&self, body: &[u8]) -> Result<Reading, ValidationError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| ValidationError::InvalidFormat(e.to_string()))?;
        self.parse_value(&value)
    }

    /// Validate a decoded JSON document into a [`Reading`]
    pub fn parse_value(&self, value: &Value) -> Result<Reading, ValidationError> {
        let record = value.as_object().ok_or_else(|| {
            ValidationError::InvalidFormat("expected a JSON object".to_string())
        })?;

        let heart_rate = self.required_number(record, "heart_rate")?;
        let spo2 = self.required_number(record, "spo2")?;
        let temperature = self.required_number(record, "temperature")?;
        let motion_magnitude = self.required_number(record, "motion_magnitude")?;

        if self.config.enforce_ranges {
            self.validate_range("heart_rate", heart_rate, self.config.heart_rate_range)?;
            self.validate_range("spo2", spo2, self.config.spo2_range)?;
            self.validate_range("temperature", temperature, self.config.temperature_range)?;
            self.validate_range("motion_magnitude", motion_magnitude, self.config.motion_range)?;
        }

        let subject_id = match record.get("subject_id") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Some(other) => {
                return Err(ValidationError::InvalidFormat(format!(
                    "subject_id must be a non-empty string, got {}",
                    other
                )))
            }
        };

        debug!(
            heart_rate,
            spo2,
            temperature,
            motion_magnitude,
            subject = ?subject_id,
            "Reading validated"
        );

        Ok(Reading {
            heart_rate,
            spo2,
            temperature,
            motion_magnitude,
            subject_id,
        })
    }

    /// Extract a field and coerce it to a finite number.
    ///
    /// JSON numbers and numeric strings are both accepted, since device
    /// firmware commonly sends sensor values as formatted text.
    fn required_number(
        &self,
        record: &Map<String, Value>,
        field: &'static str,
    ) -> Result<f64, ValidationError> {
        let value = match record.get(field) {
            None | Some(Value::Null) => return Err(ValidationError::MissingField(field)),
            Some(Value::Number(n)) => n.as_f64().ok_or_else(|| ValidationError::NotNumeric {
                field,
                raw: n.to_string(),
            })?,
            Some(Value::String(s)) => {
                s.trim()
                    .parse::<f64>()
                    .map_err(|_| ValidationError::NotNumeric {
                        field,
                        raw: s.clone(),
                    })?
            }
            Some(other) => {
                return Err(ValidationError::NotNumeric {
                    field,
                    raw: other.to_string(),
                })
            }
        };

        if !value.is_finite() {
            return Err(ValidationError::NotFinite { field, value });
        }
        Ok(value)
    }

    /// Validate a single value against a range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        if value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_valid_reading() {
        let validator = Validator::default();
        let reading = validator
            .parse_value(&json!({
                "heart_rate": 72.0,
                "spo2": 98,
                "temperature": 36.6,
                "motion_magnitude": 0.4
            }))
            .unwrap();
        assert_eq!(reading, Reading::new(72.0, 98.0, 36.6, 0.4));
    }

    #[test]
    fn test_missing_heart_rate() {
        let validator = Validator::default();
        let err = validator
            .parse_value(&json!({"spo2": 98, "temperature": 36.6, "motion_magnitude": 0.4}))
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingField("heart_rate"));
        assert!(err.to_string().contains("heart_rate"));
    }

    #[test]
    fn test_null_counts_as_missing() {
        let validator = Validator::default();
        let err = validator
            .parse_value(&json!({
                "heart_rate": 72, "spo2": null, "temperature": 36.6, "motion_magnitude": 0.4
            }))
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingField("spo2"));
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let validator = Validator::default();
        let reading = validator
            .parse_value(&json!({
                "heart_rate": "81.5", "spo2": " 97 ", "temperature": "37", "motion_magnitude": "1.25"
            }))
            .unwrap();
        assert_eq!(reading.heart_rate, 81.5);
        assert_eq!(reading.spo2, 97.0);
    }

    #[test]
    fn test_non_numeric_rejected() {
        let validator = Validator::default();
        let err = validator
            .parse_value(&json!({
                "heart_rate": 72, "spo2": 98, "temperature": "warm", "motion_magnitude": 0.4
            }))
            .unwrap_err();
        assert!(matches!(err, ValidationError::NotNumeric { field: "temperature", .. }));

        let err = validator
            .parse_value(&json!({
                "heart_rate": [72], "spo2": 98, "temperature": 36.6, "motion_magnitude": 0.4
            }))
            .unwrap_err();
        assert!(matches!(err, ValidationError::NotNumeric { field: "heart_rate", .. }));
    }

    #[test]
    fn test_non_finite_string_rejected() {
        let validator = Validator::default();
        for raw in ["NaN", "inf", "-infinity"] {
            let err = validator
                .parse_value(&json!({
                    "heart_rate": raw, "spo2": 98, "temperature": 36.6, "motion_magnitude": 0.4
                }))
                .unwrap_err();
            assert!(matches!(err, ValidationError::NotFinite { field: "heart_rate", .. }));
        }
    }

    #[test]
    fn test_not_an_object() {
        let validator = Validator::default();
        assert!(matches!(
            validator.parse_value(&json!([1, 2, 3])),
            Err(ValidationError::InvalidFormat(_))
        ));
        assert!(matches!(
            validator.parse_body(b"{not json"),
            Err(ValidationError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_subject_id() {
        let validator = Validator::default();
        let reading = validator
            .parse_body(
                br#"{"heart_rate": 72, "spo2": 98, "temperature": 36.6,
                     "motion_magnitude": 0.4, "subject_id": "patient-7"}"#,
            )
            .unwrap();
        assert_eq!(reading.subject_id.as_deref(), Some("patient-7"));

        let err = validator
            .parse_value(&json!({
                "heart_rate": 72, "spo2": 98, "temperature": 36.6,
                "motion_magnitude": 0.4, "subject_id": 7
            }))
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat(_)));
    }

    #[test]
    fn test_ranges_off_by_default() {
        let validator = Validator::default();
        assert!(validator
            .parse_value(&json!({
                "heart_rate": 900, "spo2": 98, "temperature": 36.6, "motion_magnitude": 0.4
            }))
            .is_ok());
    }

    #[test]
    fn test_ranges_enforced() {
        let validator = Validator::new(ValidationConfig {
            enforce_ranges: true,
            ..Default::default()
        });
        let err = validator
            .parse_value(&json!({
                "heart_rate": 72, "spo2": 120, "temperature": 36.6, "motion_magnitude": 0.4
            }))
            .unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { field: "spo2", .. }));
    }

    proptest! {
        #[test]
        fn prop_finite_numbers_round_trip(
            hr in -1.0e6f64..1.0e6,
            spo2 in -1.0e6f64..1.0e6,
            temp in -1.0e6f64..1.0e6,
            motion in -1.0e6f64..1.0e6,
        ) {
            let validator = Validator::default();
            let reading = validator
                .parse_value(&json!({
                    "heart_rate": hr, "spo2": spo2, "temperature": temp, "motion_magnitude": motion
                }))
                .unwrap();
            prop_assert_eq!(reading.heart_rate, hr);
            prop_assert_eq!(reading.motion_magnitude, motion);
        }
    }
}
