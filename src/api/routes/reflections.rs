//! Reflection Routes
//!
//! - POST /api/reflection - Save a reflection
//! - GET /api/reflection/:date/:type - Reflection for a day and mode
//! - GET /api/reflection/weekly - Reflections from the last 7 days

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use std::sync::Arc;

use crate::api::dto::{
    CreateReflectionRequest, CreateReflectionResponse, ReflectionResponse, WeeklyEntry,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::journal::{find_question, ReflectionRecord, ReportMode, SelectedFile};
use crate::store::ReflectionStore;

/// POST /api/reflection
///
/// Answers outside the mode's question set are ignored. Images that are
/// not .jpeg/.jpg/.png are skipped, matching the dashboard picker.
pub async fn create_reflection(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateReflectionRequest>,
) -> ApiResult<(StatusCode, Json<CreateReflectionResponse>)> {
    let mode: ReportMode = req.mode.parse()?;

    let files = decode_images(&req)?;
    let received = files.len();
    let attachments = state.picker.on_drop(files);

    let mut record = ReflectionRecord::new();
    for (question_id, text) in req.answers {
        if find_question(mode, &question_id).is_none() {
            tracing::debug!(%mode, question_id = %question_id, "Ignoring answer outside question set");
            continue;
        }
        record.set_field(question_id, text);
    }
    record.set_images(attachments);

    let submission = record.snapshot(mode);
    let id = state.store.save_reflection(&submission).await?;

    tracing::info!(
        reflection_id = id,
        %mode,
        images = submission.images.len(),
        skipped_images = received - submission.images.len(),
        "Reflection created"
    );

    Ok((StatusCode::CREATED, Json(CreateReflectionResponse { id })))
}

/// GET /api/reflection/:date/:type
pub async fn get_reflection(
    State(state): State<Arc<AppState>>,
    Path((date, mode)): Path<(String, String)>,
) -> ApiResult<Json<ReflectionResponse>> {
    let date = parse_date(&date)?;
    let mode: ReportMode = mode.parse()?;

    let stored = state
        .store
        .find_by_date(date, mode)?
        .ok_or_else(|| ApiError::NotFound("Reflection not found".to_string()))?;

    Ok(Json(ReflectionResponse::from(stored)))
}

/// GET /api/reflection/weekly
pub async fn weekly_summary(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<WeeklyEntry>>> {
    let reflections = state.store.weekly()?;
    Ok(Json(reflections.iter().map(WeeklyEntry::from).collect()))
}

fn decode_images(req: &CreateReflectionRequest) -> ApiResult<Vec<SelectedFile>> {
    req.images
        .iter()
        .enumerate()
        .map(|(index, image)| {
            image.decode().map_err(|e| {
                ApiError::Validation(format!(
                    "Image {} ({}) is not valid base64: {}",
                    index, image.filename, e
                ))
            })
        })
        .collect()
}

fn parse_date(raw: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ApiError::Validation("Invalid date format".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2026-10-18").unwrap(),
            NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
        );
        assert!(parse_date("18/10/2026").is_err());
        assert!(parse_date("2026-02-30").is_err());
    }

    #[test]
    fn test_decode_images_reports_index() {
        let req: CreateReflectionRequest = serde_json::from_str(
            r#"{"type":"evening","images":[{"filename":"a.png","content_type":"image/png","data":"!!"}]}"#,
        )
        .unwrap();

        let err = decode_images(&req).unwrap_err();
        assert!(err.to_string().contains("Image 0 (a.png)"));
    }
}
