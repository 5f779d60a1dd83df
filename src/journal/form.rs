//! Reflection Form
//!
//! Owns one draft per [`ReportMode`] and drives the submit lifecycle
//! against a [`ReflectionStore`].
//!
//! # Submit lifecycle
//!
//! ```text
//!            begin_submit            store Ok(id)
//!   Idle ───────────────▶ InFlight ───────────────▶ Saved   (draft cleared)
//!     ▲                      │   │
//!     │     cancel / drop    │   │ store Err
//!     └──────────────────────┘   └────────────────▶ Failed  (draft kept)
//! ```
//!
//! Only one submission may be in flight at a time. A draft is removed only
//! after the store confirms the save, and the in-flight mode's draft is
//! frozen until then so the store always receives what gets cleared.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::attachment::AttachmentRecord;
use super::error::{ReflectionError, ReflectionResult};
use super::mode::ReportMode;
use super::question::{questions_for, Question};
use super::record::{FieldView, ReflectionRecord, Submission};
use crate::store::{ReflectionId, ReflectionStore, StoreResult};

/// Where the form is in the submit lifecycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SubmitStatus {
    #[default]
    Idle,
    InFlight { mode: ReportMode },
    Saved { mode: ReportMode, id: ReflectionId },
    Failed { mode: ReportMode, message: String },
}

impl SubmitStatus {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, SubmitStatus::InFlight { .. })
    }
}

/// Confirmation returned by a successful submit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubmissionReceipt {
    pub mode: ReportMode,
    pub id: ReflectionId,
}

/// Result of a submit attempt
pub type SubmissionResult = ReflectionResult<SubmissionReceipt>;

/// Per-mode drafts plus submit state
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ReflectionForm {
    #[serde(default)]
    drafts: BTreeMap<ReportMode, ReflectionRecord>,
    #[serde(skip)]
    status: SubmitStatus,
}

impl ReflectionForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn questions(&self, mode: ReportMode) -> &'static [Question] {
        questions_for(mode)
    }

    /// Draft for a mode, if one has been started
    pub fn draft(&self, mode: ReportMode) -> Option<&ReflectionRecord> {
        self.drafts.get(&mode)
    }

    /// Fields to render for a mode (empty values if no draft exists)
    pub fn fields(&self, mode: ReportMode) -> Vec<FieldView> {
        match self.drafts.get(&mode) {
            Some(record) => record.fields(mode),
            None => ReflectionRecord::new().fields(mode),
        }
    }

    pub fn images(&self, mode: ReportMode) -> &[AttachmentRecord] {
        self.drafts
            .get(&mode)
            .map(ReflectionRecord::images)
            .unwrap_or_default()
    }

    pub fn status(&self) -> &SubmitStatus {
        &self.status
    }

    /// Modes with unsaved, non-blank input
    pub fn pending_drafts(&self) -> Vec<ReportMode> {
        self.drafts
            .iter()
            .filter(|(_, record)| !record.is_blank())
            .map(|(mode, _)| *mode)
            .collect()
    }

    pub fn update_field(
        &mut self,
        mode: ReportMode,
        question_id: impl Into<String>,
        value: impl Into<String>,
    ) -> ReflectionResult<()> {
        self.ensure_editable(mode)?;
        self.drafts.entry(mode).or_default().set_field(question_id, value);
        Ok(())
    }

    pub fn update_images(
        &mut self,
        mode: ReportMode,
        images: Vec<AttachmentRecord>,
    ) -> ReflectionResult<()> {
        self.ensure_editable(mode)?;
        tracing::debug!(%mode, count = images.len(), "Replacing attachments");
        self.drafts.entry(mode).or_default().set_images(images);
        Ok(())
    }

    /// A draft being saved is read-only until the store answers
    fn ensure_editable(&self, mode: ReportMode) -> ReflectionResult<()> {
        match self.status {
            SubmitStatus::InFlight { mode: pending } if pending == mode => {
                Err(ReflectionError::SubmissionInFlight(mode))
            }
            _ => Ok(()),
        }
    }

    /// Throw away a mode's draft. Returns whether there was one.
    ///
    /// A draft that is being submitted is left alone.
    pub fn discard(&mut self, mode: ReportMode) -> bool {
        if self.ensure_editable(mode).is_err() {
            return false;
        }
        self.drafts.remove(&mode).is_some()
    }

    /// Snapshot a mode's draft and mark it in flight
    ///
    /// Event-driven frontends call this, send the snapshot, then report
    /// back through [`complete_submit`](Self::complete_submit) or
    /// [`cancel_submit`](Self::cancel_submit).
    pub fn begin_submit(&mut self, mode: ReportMode) -> ReflectionResult<Submission> {
        if let SubmitStatus::InFlight { mode: pending } = self.status {
            return Err(ReflectionError::SubmissionInFlight(pending));
        }

        let submission = match self.drafts.get(&mode) {
            Some(record) => record.snapshot(mode),
            None => ReflectionRecord::new().snapshot(mode),
        };

        self.status = SubmitStatus::InFlight { mode };
        tracing::debug!(%mode, images = submission.images.len(), "Submission started");
        Ok(submission)
    }

    /// Apply the store's answer to a pending submission
    pub fn complete_submit(
        &mut self,
        mode: ReportMode,
        outcome: StoreResult<ReflectionId>,
    ) -> SubmissionResult {
        if self.status != (SubmitStatus::InFlight { mode }) {
            return Err(ReflectionError::NotSubmitting(mode));
        }

        match outcome {
            Ok(id) => {
                self.drafts.remove(&mode);
                self.status = SubmitStatus::Saved { mode, id };
                tracing::info!(%mode, reflection_id = id, "Reflection saved");
                Ok(SubmissionReceipt { mode, id })
            }
            Err(source) => {
                self.status = SubmitStatus::Failed {
                    mode,
                    message: source.to_string(),
                };
                tracing::warn!(%mode, error = %source, "Reflection not saved, draft kept");
                Err(ReflectionError::Submission { mode, source })
            }
        }
    }

    /// Abandon a pending submission, keeping the draft
    pub fn cancel_submit(&mut self) {
        if let SubmitStatus::InFlight { mode } = self.status {
            tracing::debug!(%mode, "Submission cancelled");
            self.status = SubmitStatus::Idle;
        }
    }

    /// Send a mode's draft to the store
    ///
    /// Dropping the returned future before it completes cancels the
    /// submission and leaves the draft in place.
    pub async fn submit<S>(&mut self, mode: ReportMode, store: &S) -> SubmissionResult
    where
        S: ReflectionStore + ?Sized,
    {
        let submission = self.begin_submit(mode)?;
        let mut pending = PendingSubmit {
            form: self,
            armed: true,
        };

        let outcome = store.save_reflection(&submission).await;

        pending.armed = false;
        pending.form.complete_submit(mode, outcome)
    }
}

/// Resets an in-flight status if the submit future is dropped early
struct PendingSubmit<'a> {
    form: &'a mut ReflectionForm,
    armed: bool,
}

impl Drop for PendingSubmit<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.form.cancel_submit();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::{ImagePicker, SelectedFile};
    use crate::store::{MemoryStore, StoreError};
    use async_trait::async_trait;
    use std::time::Duration;

    struct FailingStore;

    #[async_trait]
    impl ReflectionStore for FailingStore {
        async fn save_reflection(&self, _submission: &Submission) -> StoreResult<ReflectionId> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
    }

    struct SlowStore;

    #[async_trait]
    impl ReflectionStore for SlowStore {
        async fn save_reflection(&self, _submission: &Submission) -> StoreResult<ReflectionId> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(1)
        }
    }

    #[tokio::test]
    async fn test_submit_morning() {
        let store = MemoryStore::new();
        let mut form = ReflectionForm::new();
        form.update_field(ReportMode::Morning, "priorities", "Finish design doc").unwrap();
        form.update_field(ReportMode::Morning, "intention", "Deep work block").unwrap();

        let receipt = form.submit(ReportMode::Morning, &store).await.unwrap();
        assert_eq!(receipt.mode, ReportMode::Morning);

        let saved = store.saved();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].answer("priorities"), Some("Finish design doc"));
        assert_eq!(saved[0].answer("intention"), Some("Deep work block"));
        assert!(saved[0].images.is_empty());

        // Draft cleared only after success
        assert!(form.draft(ReportMode::Morning).is_none());
        assert_eq!(
            form.status(),
            &SubmitStatus::Saved {
                mode: ReportMode::Morning,
                id: receipt.id
            }
        );
    }

    #[tokio::test]
    async fn test_empty_evening_submit() {
        let store = MemoryStore::new();
        let mut form = ReflectionForm::new();

        form.submit(ReportMode::Evening, &store).await.unwrap();

        let saved = store.saved();
        assert_eq!(saved[0].answers.len(), 3);
        assert!(saved[0].answers.iter().all(|a| a.text.is_empty()));
        assert!(saved[0].images.is_empty());
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_draft() {
        let mut form = ReflectionForm::new();
        form.update_field(ReportMode::Evening, "reflection", "Long day").unwrap();

        let err = form.submit(ReportMode::Evening, &FailingStore).await.unwrap_err();
        assert!(matches!(err, ReflectionError::Submission { mode: ReportMode::Evening, .. }));

        assert_eq!(
            form.draft(ReportMode::Evening).and_then(|d| d.field("reflection")),
            Some("Long day")
        );
        assert!(matches!(form.status(), SubmitStatus::Failed { .. }));
    }

    #[tokio::test]
    async fn test_submit_carries_images() {
        let store = MemoryStore::new();
        let picker = ImagePicker::default();
        let mut form = ReflectionForm::new();

        let images = picker.on_drop(vec![
            SelectedFile::new("sunset.png", "image/png", vec![1, 2, 3]),
            SelectedFile::new("notes.txt", "text/plain", vec![4]),
        ]);
        form.update_images(ReportMode::Evening, images).unwrap();

        form.submit(ReportMode::Evening, &store).await.unwrap();

        let saved = store.saved();
        assert_eq!(saved[0].images.len(), 1);
        assert_eq!(saved[0].images[0].name(), "sunset.png");
    }

    #[tokio::test]
    async fn test_dropped_submit_is_cancelled() {
        let mut form = ReflectionForm::new();
        form.update_field(ReportMode::Morning, "priorities", "Inbox zero").unwrap();

        let attempt = tokio::time::timeout(
            Duration::from_millis(10),
            form.submit(ReportMode::Morning, &SlowStore),
        )
        .await;
        assert!(attempt.is_err());

        assert_eq!(form.status(), &SubmitStatus::Idle);
        assert_eq!(
            form.draft(ReportMode::Morning).and_then(|d| d.field("priorities")),
            Some("Inbox zero")
        );
    }

    #[test]
    fn test_duplicate_submit_rejected() {
        let mut form = ReflectionForm::new();
        form.begin_submit(ReportMode::Morning).unwrap();

        let err = form.begin_submit(ReportMode::Evening).unwrap_err();
        assert!(matches!(err, ReflectionError::SubmissionInFlight(ReportMode::Morning)));

        form.cancel_submit();
        assert!(form.begin_submit(ReportMode::Evening).is_ok());
    }

    #[test]
    fn test_in_flight_draft_is_frozen() {
        let mut form = ReflectionForm::new();
        form.update_field(ReportMode::Morning, "priorities", "Ship it").unwrap();
        let submission = form.begin_submit(ReportMode::Morning).unwrap();

        let err = form
            .update_field(ReportMode::Morning, "intention", "typed while saving")
            .unwrap_err();
        assert!(matches!(err, ReflectionError::SubmissionInFlight(ReportMode::Morning)));
        assert!(form.update_images(ReportMode::Morning, Vec::new()).is_err());
        assert!(!form.discard(ReportMode::Morning));

        // The other mode stays editable
        form.update_field(ReportMode::Evening, "reflection", "Quiet day").unwrap();

        form.complete_submit(ReportMode::Morning, Ok(1)).unwrap();
        assert_eq!(submission.answer("intention"), Some(""));
        assert!(form.draft(ReportMode::Morning).is_none());
        assert_eq!(
            form.draft(ReportMode::Evening).and_then(|d| d.field("reflection")),
            Some("Quiet day")
        );

        // Editable again once the store has answered
        form.update_field(ReportMode::Morning, "intention", "typed after saving").unwrap();
        assert_eq!(
            form.draft(ReportMode::Morning).and_then(|d| d.field("intention")),
            Some("typed after saving")
        );
    }

    #[test]
    fn test_failed_submit_unfreezes_draft() {
        let mut form = ReflectionForm::new();
        form.begin_submit(ReportMode::Evening).unwrap();
        form.complete_submit(
            ReportMode::Evening,
            Err(StoreError::Unavailable("offline".to_string())),
        )
        .unwrap_err();

        form.update_field(ReportMode::Evening, "tomorrow", "Retry").unwrap();
        assert_eq!(form.pending_drafts(), vec![ReportMode::Evening]);
    }

    #[test]
    fn test_complete_without_begin() {
        let mut form = ReflectionForm::new();
        let err = form.complete_submit(ReportMode::Morning, Ok(7)).unwrap_err();
        assert!(matches!(err, ReflectionError::NotSubmitting(ReportMode::Morning)));
    }

    #[test]
    fn test_drafts_are_per_mode() {
        let mut form = ReflectionForm::new();
        form.update_field(ReportMode::Morning, "priorities", "Write tests").unwrap();

        assert!(form.fields(ReportMode::Evening).iter().all(|f| f.value.is_empty()));
        assert_eq!(form.fields(ReportMode::Morning)[0].value, "Write tests");
        assert_eq!(form.pending_drafts(), vec![ReportMode::Morning]);

        assert!(form.discard(ReportMode::Morning));
        assert!(form.pending_drafts().is_empty());
    }
}
