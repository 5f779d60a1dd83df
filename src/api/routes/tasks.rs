//! Task Routes (Things 3)
//!
//! - GET /api/tasks/today - Open to-dos in the Today list, grouped by area
//! - GET /api/tasks/yesterday/completed - Yesterday's logbook
//! - GET /api/tasks/completed/recent - Logbook since the start of yesterday

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::integrations::{
    IntegrationError, RecentCompleted, ThingsIntegration, TodayTasks, YesterdayCompleted,
};

fn things(state: &AppState) -> Result<&ThingsIntegration, IntegrationError> {
    state
        .integrations
        .things
        .as_deref()
        .ok_or(IntegrationError::NotConfigured("Things 3 integration"))
}

/// GET /api/tasks/today
pub async fn today(State(state): State<Arc<AppState>>) -> ApiResult<Json<TodayTasks>> {
    Ok(Json(things(&state)?.today_tasks().await?))
}

/// GET /api/tasks/yesterday/completed
pub async fn yesterday_completed(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<YesterdayCompleted>> {
    Ok(Json(things(&state)?.yesterday_completed().await?))
}

/// GET /api/tasks/completed/recent
pub async fn recent_completed(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<RecentCompleted>> {
    Ok(Json(things(&state)?.recent_completed().await?))
}
