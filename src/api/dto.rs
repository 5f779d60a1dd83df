//! Data Transfer Objects
//!
//! Request and response types for the API endpoints. Shared by the server
//! handlers and the [`HttpStore`](crate::store::HttpStore) client.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::journal::{Question, ReportMode, SelectedFile, Submission};
use crate::store::{StoredImage, StoredReflection};

// ============================================
// REFLECTION DTOs
// ============================================

/// Create reflection request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReflectionRequest {
    /// Report mode: "morning" or "evening"
    #[serde(rename = "type")]
    pub mode: String,
    /// Text answers keyed by question id
    #[serde(default)]
    pub answers: BTreeMap<String, String>,
    /// Attached images
    #[serde(default)]
    pub images: Vec<ImagePayload>,
}

impl CreateReflectionRequest {
    /// Build the wire form of a submission
    pub fn from_submission(submission: &Submission) -> Self {
        Self {
            mode: submission.mode.to_string(),
            answers: submission
                .answers
                .iter()
                .map(|a| (a.question_id.clone(), a.text.clone()))
                .collect(),
            images: submission
                .images
                .iter()
                .map(|image| ImagePayload::encode(image.file()))
                .collect(),
        }
    }
}

/// One image in a create request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagePayload {
    /// Original file name
    pub filename: String,
    /// MIME type, e.g. "image/png"
    pub content_type: String,
    /// Base64-encoded file content
    pub data: String,
}

impl ImagePayload {
    pub fn encode(file: &SelectedFile) -> Self {
        Self {
            filename: file.name().to_string(),
            content_type: file.content_type().to_string(),
            data: STANDARD.encode(file.data()),
        }
    }

    pub fn decode(&self) -> Result<SelectedFile, base64::DecodeError> {
        let bytes = STANDARD.decode(self.data.as_bytes())?;
        Ok(SelectedFile::new(
            self.filename.clone(),
            self.content_type.clone(),
            bytes,
        ))
    }
}

/// Create reflection response
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateReflectionResponse {
    /// ID of the stored reflection
    pub id: i64,
}

/// A stored reflection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReflectionResponse {
    pub id: i64,
    #[serde(rename = "type")]
    pub mode: ReportMode,
    /// RFC 3339 timestamp of when it was saved
    pub date: String,
    pub priorities: Option<String>,
    pub intention: Option<String>,
    pub reflection: Option<String>,
    pub challenges: Option<String>,
    pub tomorrow: Option<String>,
    #[serde(default)]
    pub images: Vec<ImageDto>,
}

impl From<StoredReflection> for ReflectionResponse {
    fn from(stored: StoredReflection) -> Self {
        let answer = |id: &str| stored.answer(id).map(str::to_string);
        Self {
            id: stored.id,
            mode: stored.mode,
            date: stored.created_at.to_rfc3339(),
            priorities: answer("priorities"),
            intention: answer("intention"),
            reflection: answer("reflection"),
            challenges: answer("challenges"),
            tomorrow: answer("tomorrow"),
            images: stored.images.into_iter().map(ImageDto::from).collect(),
        }
    }
}

/// Stored image reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageDto {
    pub id: i64,
    pub filename: String,
    pub path: String,
}

impl From<StoredImage> for ImageDto {
    fn from(image: StoredImage) -> Self {
        Self {
            id: image.id,
            filename: image.filename,
            path: image.path,
        }
    }
}

/// One row of the weekly summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyEntry {
    pub id: i64,
    /// Calendar day, YYYY-MM-DD
    pub date: String,
    #[serde(rename = "type")]
    pub mode: ReportMode,
    pub priorities: Option<String>,
    pub reflection: Option<String>,
}

impl From<&StoredReflection> for WeeklyEntry {
    fn from(stored: &StoredReflection) -> Self {
        Self {
            id: stored.id,
            date: stored.created_at.format("%Y-%m-%d").to_string(),
            mode: stored.mode,
            priorities: stored.answer("priorities").map(str::to_string),
            reflection: stored.answer("reflection").map(str::to_string),
        }
    }
}

// ============================================
// QUESTION DTOs
// ============================================

/// A single question
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionDto {
    pub id: String,
    pub label: String,
}

impl From<&Question> for QuestionDto {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id.to_string(),
            label: q.label.to_string(),
        }
    }
}

/// Question set for a mode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSetResponse {
    #[serde(rename = "type")]
    pub mode: ReportMode,
    pub title: String,
    pub questions: Vec<QuestionDto>,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Root endpoint response
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Full health status
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "healthy" or "unhealthy"
    pub status: String,
    /// Store status: "ok" or "error"
    pub storage: String,
    /// Number of stored reflections, if the store answered
    #[serde(default)]
    pub reflections: Option<u64>,
    pub uptime_seconds: u64,
    pub version: String,
    /// Enabled daily context sources
    #[serde(default)]
    pub integrations: Vec<IntegrationHealth>,
}

/// Reachability of one integration
#[derive(Debug, Serialize, Deserialize)]
pub struct IntegrationHealth {
    pub name: String,
    pub description: String,
    /// "ok" or "error"
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
