//! Prometheus Metrics Route

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

use crate::AppState;

/// Render the Prometheus exposition, or 404 when metrics are disabled
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics disabled".to_string()),
    }
}
