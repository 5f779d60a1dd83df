//! Journal Model
//!
//! Report modes, per-mode drafts and the image acceptance filter used by
//! the dashboard.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which report the dashboard is showing
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportMode {
    #[default]
    Morning,
    Evening,
}

impl ReportMode {
    pub const ALL: [ReportMode; 2] = [ReportMode::Morning, ReportMode::Evening];

    pub fn as_str(self) -> &'static str {
        match self {
            ReportMode::Morning => "morning",
            ReportMode::Evening => "evening",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ReportMode::Morning => "Morning Report",
            ReportMode::Evening => "Evening Report",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReportMode::Morning => "Morning",
            ReportMode::Evening => "Evening",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            ReportMode::Morning => "🌅",
            ReportMode::Evening => "🌙",
        }
    }
}

/// Unsaved input for one mode
#[derive(Clone, Debug, Default)]
pub struct Draft {
    /// Answers keyed by question id
    pub answers: BTreeMap<String, String>,
    /// Accepted images from the latest drop or selection
    pub images: Vec<web_sys::File>,
}

impl Draft {
    pub fn answer(&self, question_id: &str) -> String {
        self.answers.get(question_id).cloned().unwrap_or_default()
    }

    pub fn is_blank(&self) -> bool {
        self.images.is_empty() && self.answers.values().all(|v| v.trim().is_empty())
    }

    /// Answers for exactly the given questions, blank where unanswered
    pub fn answers_for<'a, I>(&self, question_ids: I) -> BTreeMap<String, String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        question_ids
            .into_iter()
            .map(|id| (id.to_string(), self.answer(id)))
            .collect()
    }

    /// Number of questions with a non-blank answer
    pub fn answered<'a, I>(&self, question_ids: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        question_ids
            .into_iter()
            .filter(|id| !self.answer(id).trim().is_empty())
            .count()
    }
}

/// A mode's draft is read-only while its own submission is pending
pub fn is_editable(submitting: Option<ReportMode>, mode: ReportMode) -> bool {
    submitting != Some(mode)
}

/// Image types the picker accepts
const ACCEPTED_EXTENSIONS: [&str; 3] = ["jpeg", "jpg", "png"];

/// `accept` attribute for the file input
pub const ACCEPT_ATTR: &str = "image/jpeg,image/png,.jpeg,.jpg,.png";

/// True for image/* files ending in .jpeg, .jpg or .png
pub fn accepts_image(name: &str, mime: &str) -> bool {
    if !mime.starts_with("image/") {
        return false;
    }
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_serde() {
        assert_eq!(serde_json::to_string(&ReportMode::Evening).unwrap(), "\"evening\"");
        assert_eq!(ReportMode::default(), ReportMode::Morning);
        assert_eq!(ReportMode::Morning.title(), "Morning Report");
    }

    #[test]
    fn test_answers_for_fills_blanks() {
        let mut draft = Draft::default();
        draft.answers.insert("reflection".to_string(), "Calm day".to_string());
        draft.answers.insert("priorities".to_string(), "stale".to_string());

        let answers = draft.answers_for(["reflection", "challenges", "tomorrow"]);
        assert_eq!(answers.len(), 3);
        assert_eq!(answers["reflection"], "Calm day");
        assert_eq!(answers["challenges"], "");
        assert!(!answers.contains_key("priorities"));
    }

    #[test]
    fn test_answered_and_blank() {
        let mut draft = Draft::default();
        assert!(draft.is_blank());

        draft.answers.insert("priorities".to_string(), "  ".to_string());
        assert!(draft.is_blank());
        assert_eq!(draft.answered(["priorities", "intention"]), 0);

        draft.answers.insert("intention".to_string(), "Focus".to_string());
        assert!(!draft.is_blank());
        assert_eq!(draft.answered(["priorities", "intention"]), 1);
    }

    #[test]
    fn test_only_pending_mode_is_frozen() {
        assert!(is_editable(None, ReportMode::Morning));
        assert!(!is_editable(Some(ReportMode::Morning), ReportMode::Morning));
        assert!(is_editable(Some(ReportMode::Morning), ReportMode::Evening));
    }

    #[test]
    fn test_accepts_image() {
        assert!(accepts_image("sunset.png", "image/png"));
        assert!(accepts_image("IMG_01.JPG", "image/jpeg"));
        assert!(!accepts_image("anim.gif", "image/gif"));
        assert!(!accepts_image("photo.png", "text/plain"));
        assert!(!accepts_image("png", "image/png"));
    }
}
