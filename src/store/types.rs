//! Stored reflection types
//!
//! What a store hands back after a reflection has been saved.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::journal::ReportMode;

/// Identifier assigned by a store on save
pub type ReflectionId = i64;

/// A persisted reflection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredReflection {
    pub id: ReflectionId,
    pub mode: ReportMode,
    /// When the reflection was saved (UTC)
    pub created_at: DateTime<Utc>,
    /// Non-null answers keyed by question id
    pub answers: BTreeMap<String, String>,
    pub images: Vec<StoredImage>,
}

impl StoredReflection {
    pub fn answer(&self, question_id: &str) -> Option<&str> {
        self.answers.get(question_id).map(String::as_str)
    }
}

/// An image saved alongside a reflection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredImage {
    pub id: i64,
    /// Original file name
    pub filename: String,
    /// Where the bytes live on disk
    pub path: String,
    pub uploaded_at: DateTime<Utc>,
}
