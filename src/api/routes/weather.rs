//! Weather Routes
//!
//! - GET /api/weather - Forecast for the configured location

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::integrations::{IntegrationError, WeatherReport};

/// GET /api/weather
pub async fn forecast(State(state): State<Arc<AppState>>) -> ApiResult<Json<WeatherReport>> {
    let weather = state
        .integrations
        .weather
        .as_deref()
        .ok_or(IntegrationError::NotConfigured("Weather integration"))?;

    Ok(Json(weather.forecast().await?))
}
