//! Validation Error Types

use thiserror::Error;

/// Errors during reading validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Field present but not coercible to a number
    #[error("Field {field} is not numeric: {raw}")]
    NotNumeric { field: &'static str, raw: String },

    /// Field parsed to NaN or infinity
    #[error("Field {field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}
