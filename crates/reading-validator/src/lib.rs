//! Reading Validation
//!
//! Turns an inbound JSON record from a wearable device into a [`Reading`],
//! rejecting absent, non-numeric, and non-finite fields.

mod error;
mod reading;
mod validator;

pub use error::ValidationError;
pub use reading::Reading;
pub use validator::{ValidationConfig, Validator};
