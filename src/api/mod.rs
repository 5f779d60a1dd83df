//! Daybook REST API
//!
//! HTTP API layer for Daybook, built with Axum.
//!
//! # Endpoints
//!
//! ## Reflections
//! - `POST /api/reflection` - Save a reflection
//! - `GET /api/reflection/:date/:type` - Reflection for a day (YYYY-MM-DD) and mode
//! - `GET /api/reflection/weekly` - Reflections from the last 7 days
//!
//! ## Questions
//! - `GET /api/questions/:type` - Question set for a mode
//!
//! ## Daily context
//! - `GET /api/tasks/today` - Things 3 Today list
//! - `GET /api/tasks/yesterday/completed` - Things 3 tasks completed yesterday
//! - `GET /api/tasks/completed/recent` - Things 3 tasks completed since yesterday
//! - `GET /api/weather` - Forecast for the configured location
//!
//! ## Health
//! - `GET /` - Server is running
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use daybook::api::{serve, AppState};
//! use daybook::config::ApiConfig;
//! use daybook::store::SqliteStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(SqliteStore::open(std::path::Path::new("daybook_data"))?);
//!     let config = ApiConfig::default();
//!
//!     serve(AppState::new(store, config.clone()), &config).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ApiConfig;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let config = Arc::clone(&state.config);

    let api_routes = Router::new()
        // Reflection routes
        .route("/reflection", post(routes::reflections::create_reflection))
        .route("/reflection/weekly", get(routes::reflections::weekly_summary))
        .route("/reflection/:date/:type", get(routes::reflections::get_reflection))
        // Question routes
        .route("/questions/:type", get(routes::questions::get_questions))
        // Daily context
        .route("/tasks/today", get(routes::tasks::today))
        .route("/tasks/yesterday/completed", get(routes::tasks::yesterday_completed))
        .route("/tasks/completed/recent", get(routes::tasks::recent_completed))
        .route("/weather", get(routes::weather::forecast))
        // Image uploads arrive base64-encoded inside the JSON body
        .layer(DefaultBodyLimit::max(config.max_body_bytes));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .route("/", get(routes::health::root))
        .nest("/api", api_routes)
        .nest("/health", health_routes)
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors_origins))
        .with_state(shared_state)
}

/// CORS for the dashboard origins; permissive when none are configured
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Daybook API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Daybook API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use chrono::Utc;
    use tempfile::tempdir;
    use tower::util::ServiceExt;

    fn create_test_app() -> (Router, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = Arc::new(SqliteStore::open(dir.path()).unwrap());
        let router = build_router(AppState::new(store, ApiConfig::default()));
        (router, dir)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn today() -> String {
        Utc::now().format("%Y-%m-%d").to_string()
    }

    #[tokio::test]
    async fn test_root() {
        let (app, _dir) = create_test_app();
        let response = app.oneshot(get("/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["message"], "Server is running!");
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        for uri in ["/health/live", "/health/ready", "/health"] {
            let (app, _dir) = create_test_app();
            let response = app.oneshot(get(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_get_questions() {
        let (app, _dir) = create_test_app();
        let response = app.oneshot(get("/api/questions/morning")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["type"], "morning");
        assert_eq!(body["questions"][0]["id"], "priorities");
        assert_eq!(body["questions"][1]["id"], "intention");
    }

    #[tokio::test]
    async fn test_get_questions_unknown_mode() {
        let (app, _dir) = create_test_app();
        let response = app.oneshot(get("/api/questions/noon")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_and_fetch_morning() {
        let (app, _dir) = create_test_app();

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/reflection",
                r#"{"type":"morning","answers":{"priorities":"Finish design doc","intention":"Deep work block","tomorrow":"stray"}}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let id = json_body(response).await["id"].as_i64().unwrap();

        let uri = format!("/api/reflection/{}/morning", today());
        let response = app.oneshot(get(&uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["id"], id);
        assert_eq!(body["type"], "morning");
        assert_eq!(body["priorities"], "Finish design doc");
        assert_eq!(body["intention"], "Deep work block");
        assert!(body["tomorrow"].is_null());
        assert_eq!(body["images"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_create_filters_images() {
        let (app, _dir) = create_test_app();

        // "aGVsbG8=" is base64 for "hello"
        let body = r#"{
            "type": "evening",
            "images": [
                {"filename": "sunset.png", "content_type": "image/png", "data": "aGVsbG8="},
                {"filename": "notes.txt", "content_type": "text/plain", "data": "aGVsbG8="}
            ]
        }"#;
        let response = app
            .clone()
            .oneshot(post_json("/api/reflection", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let uri = format!("/api/reflection/{}/evening", today());
        let body = json_body(app.oneshot(get(&uri)).await.unwrap()).await;

        let images = body["images"].as_array().unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0]["filename"], "sunset.png");
        assert_eq!(body["reflection"], "");
        assert_eq!(body["challenges"], "");
        assert_eq!(body["tomorrow"], "");
    }

    #[tokio::test]
    async fn test_create_invalid_mode() {
        let (app, _dir) = create_test_app();
        let response = app
            .oneshot(post_json("/api/reflection", r#"{"type":"weekly"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "INVALID_MODE");
    }

    #[tokio::test]
    async fn test_create_invalid_json() {
        let (app, _dir) = create_test_app();
        let response = app
            .oneshot(post_json("/api/reflection", "not json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_reflection_not_found() {
        let (app, _dir) = create_test_app();
        let response = app
            .oneshot(get("/api/reflection/2020-01-01/evening"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_reflection_bad_date() {
        let (app, _dir) = create_test_app();
        let response = app
            .oneshot(get("/api/reflection/yesterday/evening"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["error"]["message"],
            "Validation error: Invalid date format"
        );
    }

    #[tokio::test]
    async fn test_weekly_summary() {
        let (app, _dir) = create_test_app();

        for body in [
            r#"{"type":"morning","answers":{"priorities":"Plan"}}"#,
            r#"{"type":"evening","answers":{"reflection":"Good"}}"#,
        ] {
            let response = app
                .clone()
                .oneshot(post_json("/api/reflection", body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = app.oneshot(get("/api/reflection/weekly")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        let entries = body.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["type"], "morning");
        assert_eq!(entries[0]["priorities"], "Plan");
        assert_eq!(entries[1]["reflection"], "Good");
        assert_eq!(entries[1]["date"], today());
    }

    #[tokio::test]
    async fn test_integrations_unavailable() {
        for uri in ["/api/tasks/today", "/api/tasks/completed/recent", "/api/weather"] {
            let (app, _dir) = create_test_app();
            let response = app.oneshot(get(uri)).await.unwrap();

            assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE, "{}", uri);
            assert_eq!(
                json_body(response).await["error"]["code"],
                "INTEGRATION_UNAVAILABLE"
            );
        }
    }

    #[tokio::test]
    async fn test_things_tasks_route() {
        let dir = tempdir().unwrap();
        let things_db = dir.path().join("main.sqlite");
        let conn = rusqlite::Connection::open(&things_db).unwrap();
        conn.execute_batch(
            "CREATE TABLE TMArea (uuid TEXT PRIMARY KEY, title TEXT);
             CREATE TABLE TMTag (uuid TEXT PRIMARY KEY, title TEXT);
             CREATE TABLE TMTaskTag (tasks TEXT, tags TEXT);
             CREATE TABLE TMTask (
                 uuid TEXT PRIMARY KEY, title TEXT, notes TEXT,
                 type INTEGER, status INTEGER, trashed INTEGER, start INTEGER,
                 startDate INTEGER, todayIndex INTEGER, stopDate REAL, deadline INTEGER,
                 area TEXT, project TEXT, heading TEXT
             );",
        )
        .unwrap();
        drop(conn);

        let store = Arc::new(SqliteStore::open(dir.path()).unwrap());
        let integrations = crate::integrations::Integrations {
            things: Some(Arc::new(crate::integrations::ThingsIntegration::new(things_db))),
            weather: None,
        };
        let app = build_router(
            AppState::new(store, ApiConfig::default()).with_integrations(integrations),
        );

        let response = app.clone().oneshot(get("/api/tasks/today")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["total"], 0);
        assert_eq!(body["date"], today());

        let response = app.oneshot(get("/health")).await.unwrap();
        let body = json_body(response).await;
        assert_eq!(body["integrations"][0]["name"], "things");
        assert_eq!(body["integrations"][0]["status"], "ok");
    }
}
