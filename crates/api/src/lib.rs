//! Vital Signs Fusion API Server
//!
//! Accepts readings from wearable devices and answers each one with a fused
//! health-status verdict.

use axum::{
    error_handling::HandleErrorLayer,
    extract::{DefaultBodyLimit, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use fusion_engine::HealthEvaluator;
use inference_engine::ModelSet;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use reading_validator::Validator;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tower::{timeout::TimeoutLayer, ServiceBuilder};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod routes;

pub use config::{LogFormat, ServiceConfig};
pub use error::{ApiError, ErrorResponse, ServerError};
pub use routes::readings::{DecisionResponse, Signals};

/// Application state shared across handlers; read-only after startup
pub struct AppState {
    /// Fusion evaluator over the loaded models
    pub evaluator: HealthEvaluator,
    /// Inbound record validator
    pub validator: Validator,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
    /// Prometheus handle when metrics are enabled
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new application state
    pub fn new(evaluator: HealthEvaluator, validator: Validator) -> Self {
        Self {
            evaluator,
            validator,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub models: ModelKinds,
}

/// Backends serving each model and the feature order they were fitted on
#[derive(Debug, Serialize)]
pub struct ModelKinds {
    pub baseline: &'static str,
    pub anomaly: &'static str,
    pub risk: &'static str,
    pub anomaly_features: Vec<String>,
    pub risk_features: Vec<String>,
}

/// Transport limits applied around every route
#[derive(Debug, Clone, Copy)]
pub struct RouterOptions {
    pub request_timeout: Duration,
    pub max_body_bytes: usize,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(5),
            max_body_bytes: 64 * 1024,
        }
    }
}

impl From<&ServiceConfig> for RouterOptions {
    fn from(config: &ServiceConfig) -> Self {
        Self {
            request_timeout: config.request_timeout(),
            max_body_bytes: config.max_body_bytes,
        }
    }
}

/// Create the application router.
///
/// Every failure, including oversized bodies, timeouts and routing misses,
/// is answered with the structured error body.
pub fn create_router(state: Arc<AppState>, options: RouterOptions) -> Router {
    let router = Router::new()
        .route("/sensor_data", post(routes::readings::post_reading))
        .route("/api/v1/readings", post(routes::readings::post_reading))
        .route("/api/v1/health", get(health_handler))
        .route("/metrics", get(routes::metrics::get_metrics))
        .method_not_allowed_fallback(error::method_not_allowed)
        .fallback(error::not_found)
        .layer(DefaultBodyLimit::max(options.max_body_bytes))
        .with_state(state);

    with_transport_layers(router, options.request_timeout)
}

/// Request tracing and the per-request timeout
fn with_transport_layers(router: Router, request_timeout: Duration) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(HandleErrorLayer::new(error::handle_middleware_error))
            .layer(TimeoutLayer::new(request_timeout)),
    )
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let models = state.evaluator.models();

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        models: ModelKinds {
            baseline: models.baseline.kind(),
            anomaly: models.anomaly.kind(),
            risk: models.risk.kind(),
            anomaly_features: models.anomaly.feature_names().to_vec(),
            risk_features: models.risk.feature_names().to_vec(),
        },
    })
}

/// Initialize logging. `RUST_LOG` wins over `level` when set.
pub fn init_logging(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };
    if let Err(e) = result {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load models, build state, and serve until Ctrl-C
pub async fn run_server(config: ServiceConfig) -> Result<(), ServerError> {
    let models = ModelSet::load(&config.models)?;
    let evaluator = HealthEvaluator::new(models);
    let mut state = AppState::new(evaluator, Validator::new(config.validation.clone()));

    if config.metrics_enabled {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| ServerError::Metrics(e.to_string()))?;
        state = state.with_metrics(handle);
    }

    let app = create_router(Arc::new(state), RouterOptions::from(&config));

    info!("Starting API server on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
