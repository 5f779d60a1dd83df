//! Question Routes
//!
//! - GET /api/questions/:type - Ordered question set for a mode

use axum::{extract::Path, Json};

use crate::api::dto::{QuestionDto, QuestionSetResponse};
use crate::api::error::ApiResult;
use crate::journal::{questions_for, ReportMode};

/// GET /api/questions/:type
pub async fn get_questions(Path(mode): Path<String>) -> ApiResult<Json<QuestionSetResponse>> {
    let mode: ReportMode = mode.parse()?;

    Ok(Json(QuestionSetResponse {
        mode,
        title: mode.title().to_string(),
        questions: questions_for(mode).iter().map(QuestionDto::from).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;

    #[tokio::test]
    async fn test_evening_questions() {
        let Json(set) = get_questions(Path("evening".to_string())).await.unwrap();
        assert_eq!(set.title, "Evening Report");
        let ids: Vec<_> = set.questions.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["reflection", "challenges", "tomorrow"]);
    }

    #[tokio::test]
    async fn test_unknown_mode() {
        let err = get_questions(Path("lunch".to_string())).await.unwrap_err();
        assert!(matches!(err, ApiError::Journal(_)));
    }
}
