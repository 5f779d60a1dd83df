//! Remote Reflection Store
//!
//! HTTP client for the Daybook API. Implements [`ReflectionStore`] by
//! posting to `POST /api/reflection`, and exposes the read endpoints the
//! CLI needs.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::error::{StoreError, StoreResult};
use super::types::ReflectionId;
use super::ReflectionStore;
use crate::api::dto::{
    CreateReflectionRequest, CreateReflectionResponse, HealthResponse, QuestionSetResponse,
    ReflectionResponse, WeeklyEntry,
};
use crate::journal::{ReportMode, Submission};

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Daybook API client
pub struct HttpStore {
    client: Client,
    base_url: String,
}

impl HttpStore {
    /// Create a client for an API root such as `http://localhost:5003`
    pub fn new(base_url: impl Into<String>) -> StoreResult<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> StoreResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET /api/reflection/:date/:type. `None` on 404.
    pub async fn fetch(
        &self,
        date: NaiveDate,
        mode: ReportMode,
    ) -> StoreResult<Option<ReflectionResponse>> {
        let url = format!(
            "{}/api/reflection/{}/{}",
            self.base_url,
            date.format("%Y-%m-%d"),
            mode
        );
        let response = self.client.get(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        read_json(response).await.map(Some)
    }

    /// GET /api/reflection/weekly
    pub async fn weekly(&self) -> StoreResult<Vec<WeeklyEntry>> {
        let url = format!("{}/api/reflection/weekly", self.base_url);
        read_json(self.client.get(url).send().await?).await
    }

    /// GET /api/questions/:type
    pub async fn questions(&self, mode: ReportMode) -> StoreResult<QuestionSetResponse> {
        let url = format!("{}/api/questions/{}", self.base_url, mode);
        read_json(self.client.get(url).send().await?).await
    }

    /// GET /health
    pub async fn health(&self) -> StoreResult<HealthResponse> {
        let url = format!("{}/health", self.base_url);
        read_json(self.client.get(url).send().await?).await
    }
}

#[async_trait]
impl ReflectionStore for HttpStore {
    async fn save_reflection(&self, submission: &Submission) -> StoreResult<ReflectionId> {
        let body = CreateReflectionRequest::from_submission(submission);
        let url = format!("{}/api/reflection", self.base_url);

        let response = self.client.post(url).json(&body).send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                StoreError::Unavailable(e.to_string())
            } else {
                StoreError::Http(e)
            }
        })?;

        let created: CreateReflectionResponse = read_json(response).await?;
        Ok(created.id)
    }
}

/// Decode a success body, or turn an error body into `StoreError::Rejected`
async fn read_json<T: DeserializeOwned>(response: Response) -> StoreResult<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let text = response.text().await.unwrap_or_default();
    Err(StoreError::Rejected {
        status: status.as_u16(),
        message: error_message(&text),
    })
}

/// Pull `error.message` out of an API error body, falling back to the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .or_else(|| v.get("error"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let store = HttpStore::new("http://localhost:5003/").unwrap();
        assert_eq!(store.base_url(), "http://localhost:5003");
    }

    #[test]
    fn test_error_message_from_api_body() {
        let body = r#"{"error":{"code":"NOT_FOUND","message":"Not found: Reflection not found"},"request_id":"x"}"#;
        assert_eq!(error_message(body), "Not found: Reflection not found");
    }

    #[test]
    fn test_error_message_flat_and_raw() {
        assert_eq!(error_message(r#"{"error":"Invalid date format"}"#), "Invalid date format");
        assert_eq!(error_message("gateway timeout"), "gateway timeout");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_unavailable() {
        let store = HttpStore::with_timeout("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let submission = crate::journal::ReflectionRecord::new().snapshot(ReportMode::Morning);

        let err = store.save_reflection(&submission).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
