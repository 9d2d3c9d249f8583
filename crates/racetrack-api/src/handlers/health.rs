//! Health check handler for orchestration probes.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::debug;

use crate::AppState;

/// Health check response structure.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `OK` once the listener is bound, `UNAVAILABLE` before.
    pub status: &'static str,
    /// Explanation when not ready.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

/// Reports whether the service is ready to take traffic.
///
/// Reads only the readiness flag. The store is never consulted.
pub async fn healthz(State(state): State<AppState>) -> Response {
    if state.readiness.is_ready() {
        return (StatusCode::OK, Json(HealthResponse { status: "OK", message: None }))
            .into_response();
    }

    debug!("Health check before listener is ready");
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(HealthResponse { status: "UNAVAILABLE", message: Some("service is not ready") }),
    )
        .into_response()
}
