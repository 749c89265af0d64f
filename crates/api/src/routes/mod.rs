//! HTTP Routes

pub mod metrics;
pub mod readings;
