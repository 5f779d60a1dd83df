//! In-memory reflection store
//!
//! Keeps submissions in a Vec. Used for dry runs and as a test double.

use async_trait::async_trait;
use std::sync::Mutex;

use super::error::{StoreError, StoreResult};
use super::types::ReflectionId;
use super::ReflectionStore;
use crate::journal::Submission;

#[derive(Debug, Default)]
pub struct MemoryStore {
    saved: Mutex<Vec<Submission>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything saved so far, oldest first
    pub fn saved(&self) -> Vec<Submission> {
        self.saved
            .lock()
            .map(|saved| saved.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ReflectionStore for MemoryStore {
    async fn save_reflection(&self, submission: &Submission) -> StoreResult<ReflectionId> {
        let mut saved = self
            .saved
            .lock()
            .map_err(|e| StoreError::Lock(format!("Failed to acquire memory store lock: {}", e)))?;
        saved.push(submission.clone());
        Ok(saved.len() as ReflectionId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::{ReflectionRecord, ReportMode};

    #[tokio::test]
    async fn test_ids_are_sequential() {
        let store = MemoryStore::new();
        let submission = ReflectionRecord::new().snapshot(ReportMode::Morning);

        assert_eq!(store.save_reflection(&submission).await.unwrap(), 1);
        assert_eq!(store.save_reflection(&submission).await.unwrap(), 2);
        assert_eq!(store.saved().len(), 2);
    }
}
