//! Service Configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional TOML
//! file (`VITALS_CONFIG`, default `vitals.toml`), then `VITALS__*` environment
//! variables (`VITALS__MODELS__RISK_PATH=...`).

use config::{Config, ConfigError, Environment, File};
use inference_engine::ModelPaths;
use reading_validator::ValidationConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Top-level service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listen address
    pub bind_addr: String,
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
    pub log_format: LogFormat,
    /// Per-request timeout
    pub request_timeout_ms: u64,
    /// Largest accepted request body
    pub max_body_bytes: usize,
    /// Serve Prometheus metrics on `/metrics`
    pub metrics_enabled: bool,
    pub models: ModelPaths,
    pub validation: ValidationConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".to_string(),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            request_timeout_ms: 5_000,
            max_body_bytes: 64 * 1024,
            metrics_enabled: true,
            models: ModelPaths::default(),
            validation: ValidationConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Load from the file named by `VITALS_CONFIG` (or `vitals.toml`) and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("VITALS_CONFIG").unwrap_or_else(|_| "vitals.toml".to_string());
        Self::load_from(&path)
    }

    /// Load from `path` (optional) and the environment
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("VITALS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
