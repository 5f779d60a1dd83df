//! Health Routes
//!
//! Health check endpoints for monitoring.
//!
//! - GET / - Plain "server is running" message
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (store answers queries)
//! - GET /health - Full health status, integrations included

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::{HealthResponse, IntegrationHealth, MessageResponse};
use crate::api::state::AppState;

/// GET /
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Server is running!".to_string(),
    })
}

/// GET /health/live
///
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Returns 200 if the reflection store can be queried.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    match state.store.count() {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Store not ready");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// GET /health
///
/// Full health status with component details. An unreachable integration
/// is reported but does not make the server unhealthy.
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let reflections = state.store.count().ok();
    let storage_ok = reflections.is_some();

    let mut integrations = Vec::new();
    for integration in state.integrations.all() {
        let outcome = integration.check().await;
        if let Err(e) = &outcome {
            tracing::warn!(integration = integration.name(), error = %e, "Integration check failed");
        }
        integrations.push(IntegrationHealth {
            name: integration.name().to_string(),
            description: integration.description().to_string(),
            status: if outcome.is_ok() { "ok" } else { "error" }.to_string(),
            error: outcome.err().map(|e| e.to_string()),
        });
    }

    Json(HealthResponse {
        status: if storage_ok { "healthy" } else { "unhealthy" }.to_string(),
        storage: if storage_ok { "ok" } else { "error" }.to_string(),
        reflections,
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        integrations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_liveness() {
        let status = liveness().await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_root_message() {
        let Json(body) = root().await;
        assert_eq!(body.message, "Server is running!");
    }
}
