//! Global Application State
//!
//! Reactive state management using Leptos signals.

use leptos::*;
use std::collections::BTreeMap;

use super::journal::{is_editable, Draft, ReportMode};

/// Global application state provided to all components
#[derive(Clone, Copy)]
pub struct GlobalState {
    /// Active report mode
    pub mode: RwSignal<ReportMode>,
    /// Unsaved drafts, one per mode
    pub drafts: RwSignal<BTreeMap<ReportMode, Draft>>,
    /// Mode whose submission is in flight
    pub submitting: RwSignal<Option<ReportMode>>,
    /// Bumped after every successful save so views refetch
    pub saved_version: RwSignal<u32>,
    /// Error message to display
    pub error: RwSignal<Option<String>>,
    /// Success message (for toasts)
    pub success: RwSignal<Option<String>>,
}

/// Provide global state to the component tree
pub fn provide_global_state() {
    let state = GlobalState {
        mode: create_rw_signal(ReportMode::default()),
        drafts: create_rw_signal(BTreeMap::new()),
        submitting: create_rw_signal(None),
        saved_version: create_rw_signal(0),
        error: create_rw_signal(None),
        success: create_rw_signal(None),
    };

    provide_context(state);
}

impl GlobalState {
    /// Switch the active mode. Drafts of both modes are kept.
    pub fn select_mode(&self, mode: ReportMode) {
        if self.mode.get_untracked() != mode {
            self.mode.set(mode);
        }
    }

    /// Copy of a mode's draft (empty if none)
    pub fn draft(&self, mode: ReportMode) -> Draft {
        self.drafts
            .with(|drafts| drafts.get(&mode).cloned())
            .unwrap_or_default()
    }

    pub fn answer(&self, mode: ReportMode, question_id: &str) -> String {
        self.drafts.with(|drafts| {
            drafts
                .get(&mode)
                .map(|d| d.answer(question_id))
                .unwrap_or_default()
        })
    }

    /// Whether the form for `mode` accepts input right now
    pub fn can_edit(&self, mode: ReportMode) -> bool {
        is_editable(self.submitting.get(), mode)
    }

    pub fn update_field(&self, mode: ReportMode, question_id: &str, value: String) {
        if !is_editable(self.submitting.get_untracked(), mode) {
            return;
        }
        self.drafts.update(|drafts| {
            drafts
                .entry(mode)
                .or_default()
                .answers
                .insert(question_id.to_string(), value);
        });
    }

    /// Replace a mode's images with the latest accepted selection
    pub fn update_images(&self, mode: ReportMode, images: Vec<web_sys::File>) {
        if !is_editable(self.submitting.get_untracked(), mode) {
            return;
        }
        self.drafts.update(|drafts| {
            drafts.entry(mode).or_default().images = images;
        });
    }

    pub fn images(&self, mode: ReportMode) -> Vec<web_sys::File> {
        self.drafts.with(|drafts| {
            drafts
                .get(&mode)
                .map(|d| d.images.clone())
                .unwrap_or_default()
        })
    }

    /// The active mode's files, changing only when the file list does.
    /// Text edits rewrite the same drafts signal and must not re-render
    /// previews.
    pub fn image_files(&self) -> Memo<Vec<web_sys::File>> {
        let state = *self;
        create_memo(move |_| state.images(state.mode.get()))
    }

    /// Drop a mode's draft on the user's request
    pub fn discard_draft(&self, mode: ReportMode) {
        if is_editable(self.submitting.get_untracked(), mode) {
            self.remove_draft(mode);
        }
    }

    fn remove_draft(&self, mode: ReportMode) {
        self.drafts.update(|drafts| {
            drafts.remove(&mode);
        });
    }

    pub fn has_draft(&self, mode: ReportMode) -> bool {
        self.drafts
            .with(|drafts| drafts.get(&mode).is_some_and(|d| !d.is_blank()))
    }

    /// Modes whose input would be lost if the page closed now
    pub fn unsaved_modes(&self) -> Vec<ReportMode> {
        let pending = self.submitting.get();
        ReportMode::ALL
            .into_iter()
            .filter(|mode| self.has_draft(*mode) || pending == Some(*mode))
            .collect()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.get().is_some()
    }

    /// Record a successful save and let dependent views refresh
    ///
    /// The draft was frozen while in flight, so it is exactly what the
    /// server stored.
    pub fn mark_saved(&self, mode: ReportMode) {
        self.remove_draft(mode);
        self.saved_version.update(|v| *v += 1);
    }

    /// Show a success message (auto-clears after timeout)
    pub fn show_success(&self, message: &str) {
        self.success.set(Some(message.to_string()));

        let success_signal = self.success;
        gloo_timers::callback::Timeout::new(3000, move || {
            success_signal.set(None);
        }).forget();
    }

    /// Show an error message (auto-clears after timeout)
    pub fn show_error(&self, message: &str) {
        self.error.set(Some(message.to_string()));

        let error_signal = self.error;
        gloo_timers::callback::Timeout::new(5000, move || {
            error_signal.set(None);
        }).forget();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_state(test: impl FnOnce(GlobalState)) {
        let runtime = create_runtime();
        provide_global_state();
        test(use_context::<GlobalState>().unwrap());
        runtime.dispose();
    }

    #[test]
    fn test_text_edits_leave_image_list_alone() {
        with_state(|state| {
            let files = state.image_files();
            let runs = create_rw_signal(0);
            create_isomorphic_effect(move |_| {
                files.track();
                runs.update_untracked(|n| *n += 1);
            });

            state.update_field(ReportMode::Morning, "priorities", "P".to_string());
            state.update_field(ReportMode::Morning, "priorities", "Plan".to_string());
            state.update_field(ReportMode::Evening, "reflection", "Calm".to_string());

            assert_eq!(runs.get_untracked(), 1);
        });
    }

    #[test]
    fn test_pending_mode_rejects_edits() {
        with_state(|state| {
            state.update_field(ReportMode::Morning, "priorities", "Ship it".to_string());
            state.submitting.set(Some(ReportMode::Morning));

            state.update_field(ReportMode::Morning, "intention", "typed while saving".to_string());
            state.discard_draft(ReportMode::Morning);
            state.update_field(ReportMode::Evening, "reflection", "Quiet".to_string());

            assert_eq!(state.answer(ReportMode::Morning, "intention"), "");
            assert_eq!(state.answer(ReportMode::Morning, "priorities"), "Ship it");
            assert_eq!(state.answer(ReportMode::Evening, "reflection"), "Quiet");

            assert_eq!(
                state.unsaved_modes(),
                vec![ReportMode::Morning, ReportMode::Evening]
            );

            state.mark_saved(ReportMode::Morning);
            state.submitting.set(None);
            assert!(!state.has_draft(ReportMode::Morning));
            assert_eq!(state.unsaved_modes(), vec![ReportMode::Evening]);
            assert_eq!(state.saved_version.get_untracked(), 1);
        });
    }
}
