//! Journal Session
//!
//! Single state container for one user session: the active
//! [`ReportMode`] plus the [`ReflectionForm`] holding every mode's draft.
//! Views (overview + form) are derived from it on demand.
//!
//! Switching modes never destroys input. Each mode keeps its own draft
//! until it is saved or explicitly discarded with
//! [`discard_draft`](JournalSession::discard_draft).

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::attachment::AttachmentRecord;
use super::error::ReflectionResult;
use super::form::{ReflectionForm, SubmissionResult, SubmitStatus};
use super::mode::ReportMode;
use super::record::FieldView;
use crate::store::ReflectionStore;

/// Mode selection plus per-mode drafts
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct JournalSession {
    #[serde(default)]
    mode: ReportMode,
    #[serde(default)]
    form: ReflectionForm,
}

/// Header shown above the form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub mode: ReportMode,
    pub title: &'static str,
    pub date: NaiveDate,
    pub answered: usize,
    pub total: usize,
}

/// Everything the dashboard renders for the active mode
#[derive(Debug, Serialize)]
pub struct DashboardView<'a> {
    pub overview: Overview,
    pub fields: Vec<FieldView>,
    #[serde(skip)]
    pub images: &'a [AttachmentRecord],
    pub status: &'a SubmitStatus,
}

impl JournalSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start in a specific mode
    pub fn with_mode(mode: ReportMode) -> Self {
        Self {
            mode,
            form: ReflectionForm::new(),
        }
    }

    pub fn mode(&self) -> ReportMode {
        self.mode
    }

    /// Make `mode` active. Returns true if it changed.
    pub fn select_mode(&mut self, mode: ReportMode) -> bool {
        if self.mode == mode {
            return false;
        }
        tracing::debug!(from = %self.mode, to = %mode, "Switching report mode");
        self.mode = mode;
        true
    }

    pub fn form(&self) -> &ReflectionForm {
        &self.form
    }

    /// Set an answer in the active mode's draft
    pub fn edit(
        &mut self,
        question_id: impl Into<String>,
        value: impl Into<String>,
    ) -> ReflectionResult<()> {
        self.form.update_field(self.mode, question_id, value)
    }

    /// Replace the active mode's attachments
    pub fn attach(&mut self, images: Vec<AttachmentRecord>) -> ReflectionResult<()> {
        self.form.update_images(self.mode, images)
    }

    /// Drop a mode's draft with the user's consent
    pub fn discard_draft(&mut self, mode: ReportMode) -> bool {
        self.form.discard(mode)
    }

    /// Submit the active mode's draft
    pub async fn submit<S>(&mut self, store: &S) -> SubmissionResult
    where
        S: ReflectionStore + ?Sized,
    {
        let mode = self.mode;
        self.form.submit(mode, store).await
    }

    pub fn overview(&self, date: NaiveDate) -> Overview {
        let fields = self.form.fields(self.mode);
        Overview {
            mode: self.mode,
            title: self.mode.title(),
            date,
            answered: fields.iter().filter(|f| !f.value.trim().is_empty()).count(),
            total: fields.len(),
        }
    }

    /// Views bound to the active mode, dated today (UTC)
    pub fn view(&self) -> DashboardView<'_> {
        DashboardView {
            overview: self.overview(Utc::now().date_naive()),
            fields: self.form.fields(self.mode),
            images: self.form.images(self.mode),
            status: self.form.status(),
        }
    }

    /// Load a saved session. Attachments are not persisted.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Persist drafts so they survive a failed submit or a restart
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}
