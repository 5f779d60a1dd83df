//! Reflection Records
//!
//! - `ReflectionRecord`: the mutable draft for one mode (answers + images)
//! - `Submission`: the read-only snapshot handed to a store
//!
//! A record may carry keys that are not part of the mode it is snapshotted
//! for (left over from editing under another mode). Those keys are never
//! rendered or submitted: [`ReflectionRecord::snapshot`] and
//! [`ReflectionRecord::fields`] only look at the mode's question set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::attachment::AttachmentRecord;
use super::mode::ReportMode;
use super::question::{questions_for, Question};

/// In-progress answers for one report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReflectionRecord {
    /// Text answers keyed by question id
    #[serde(default)]
    answers: BTreeMap<String, String>,
    /// Attached images, in selection order. Preview handles do not survive
    /// serialization.
    #[serde(skip)]
    images: Vec<AttachmentRecord>,
}

impl ReflectionRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set one answer
    pub fn with_field(mut self, question_id: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_field(question_id, value);
        self
    }

    /// Builder method: replace the images
    pub fn with_images(mut self, images: Vec<AttachmentRecord>) -> Self {
        self.set_images(images);
        self
    }

    /// Set one answer, leaving every other field untouched
    pub fn set_field(&mut self, question_id: impl Into<String>, value: impl Into<String>) {
        self.answers.insert(question_id.into(), value.into());
    }

    /// Replace the image list wholesale
    ///
    /// Previous attachments are dropped, which releases their previews.
    pub fn set_images(&mut self, images: Vec<AttachmentRecord>) {
        self.images = images;
    }

    /// Raw answer, including keys outside the current mode
    pub fn field(&self, question_id: &str) -> Option<&str> {
        self.answers.get(question_id).map(String::as_str)
    }

    pub fn images(&self) -> &[AttachmentRecord] {
        &self.images
    }

    /// True when no text has been typed and no image attached
    pub fn is_blank(&self) -> bool {
        self.answers.values().all(|v| v.is_empty()) && self.images.is_empty()
    }

    /// Editable fields for a mode, in question order
    pub fn fields(&self, mode: ReportMode) -> Vec<FieldView> {
        questions_for(mode)
            .iter()
            .map(|question| FieldView {
                question: *question,
                value: self.field(question.id).unwrap_or_default().to_string(),
            })
            .collect()
    }

    /// Read-only snapshot for submission
    ///
    /// Every question of `mode` is present (empty string if untouched);
    /// keys outside the mode are left out.
    pub fn snapshot(&self, mode: ReportMode) -> Submission {
        let answers = questions_for(mode)
            .iter()
            .map(|question| Answer {
                question_id: question.id.to_string(),
                text: self.field(question.id).unwrap_or_default().to_string(),
            })
            .collect();

        Submission {
            mode,
            answers,
            images: self.images.clone(),
        }
    }
}

/// A question paired with its current answer, ready to render
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldView {
    pub question: Question,
    pub value: String,
}

/// A single text answer in a submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: String,
    pub text: String,
}

/// Complete reflection handed to a store as a single unit
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub mode: ReportMode,
    /// One entry per question of `mode`, in question order
    pub answers: Vec<Answer>,
    pub images: Vec<AttachmentRecord>,
}

impl Submission {
    /// Answer text for a question id
    pub fn answer(&self, question_id: &str) -> Option<&str> {
        self.answers
            .iter()
            .find(|a| a.question_id == question_id)
            .map(|a| a.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::{ImagePicker, SelectedFile};

    fn images(picker: &ImagePicker, names: &[&str]) -> Vec<AttachmentRecord> {
        picker.on_drop(
            names
                .iter()
                .map(|n| SelectedFile::new(*n, "image/png", n.as_bytes().to_vec())),
        )
    }

    #[test]
    fn test_with_field_is_idempotent() {
        let r = ReflectionRecord::new().with_field("reflection", "good");
        let once = r.clone().with_field("priorities", "ship it");
        let twice = once.clone().with_field("priorities", "ship it");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_with_field_touches_only_target() {
        let r = ReflectionRecord::new()
            .with_field("priorities", "a")
            .with_field("intention", "b");
        let updated = r.clone().with_field("priorities", "c");

        assert_eq!(updated.field("priorities"), Some("c"));
        assert_eq!(updated.field("intention"), r.field("intention"));
        assert_eq!(updated.images(), r.images());
    }

    #[test]
    fn test_empty_value_is_kept() {
        let r = ReflectionRecord::new().with_field("tomorrow", "");
        assert_eq!(r.field("tomorrow"), Some(""));
    }

    #[test]
    fn test_images_replace_not_merge() {
        let picker = ImagePicker::default();
        let r = ReflectionRecord::new().with_images(images(&picker, &["a.png", "b.png"]));
        let c = images(&picker, &["c.png"]);
        let r = r.with_images(c.clone());

        assert_eq!(r.images(), c.as_slice());
        // a and b were released with the old list
        assert_eq!(picker.registry().live_count(), 1);
    }

    #[test]
    fn test_morning_snapshot() {
        let r = ReflectionRecord::new()
            .with_field("priorities", "Finish design doc")
            .with_field("intention", "Deep work block");
        let s = r.snapshot(ReportMode::Morning);

        assert_eq!(s.mode, ReportMode::Morning);
        assert_eq!(s.answers.len(), 2);
        assert_eq!(s.answer("priorities"), Some("Finish design doc"));
        assert_eq!(s.answer("intention"), Some("Deep work block"));
        assert!(s.images.is_empty());
    }

    #[test]
    fn test_empty_evening_snapshot() {
        let s = ReflectionRecord::new().snapshot(ReportMode::Evening);
        let ids: Vec<_> = s.answers.iter().map(|a| a.question_id.as_str()).collect();

        assert_eq!(ids, vec!["reflection", "challenges", "tomorrow"]);
        assert!(s.answers.iter().all(|a| a.text.is_empty()));
        assert!(s.images.is_empty());
    }

    #[test]
    fn test_stale_keys_not_submitted_or_rendered() {
        let r = ReflectionRecord::new()
            .with_field("priorities", "left over")
            .with_field("reflection", "fine");
        let s = r.snapshot(ReportMode::Evening);

        assert_eq!(s.answer("priorities"), None);
        assert!(r
            .fields(ReportMode::Evening)
            .iter()
            .all(|f| f.question.id != "priorities"));
    }

    #[test]
    fn test_serde_skips_images() {
        let picker = ImagePicker::default();
        let r = ReflectionRecord::new()
            .with_field("priorities", "x")
            .with_images(images(&picker, &["a.png"]));

        let json = serde_json::to_string(&r).unwrap();
        let back: ReflectionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.field("priorities"), Some("x"));
        assert!(back.images().is_empty());
    }
}
