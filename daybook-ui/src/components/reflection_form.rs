//! Reflection Form Component
//!
//! One textarea per question of the active mode, the image picker and a
//! submit button. Text goes into the active mode's draft on every input.
//! The draft is cleared only after the server confirms the save, and the
//! fields are disabled while that save is pending.

use leptos::*;

use crate::api::{self, Question};
use crate::components::ImageUpload;
use crate::state::GlobalState;

#[component]
pub fn ReflectionForm(
    /// Questions for the active mode
    #[prop(into)]
    questions: Signal<Vec<Question>>,
) -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        if state.submitting.get_untracked().is_some() {
            return;
        }

        let mode = state.mode.get_untracked();
        let draft = state.draft(mode);
        let answers = questions.with_untracked(|qs| draft.answers_for(qs.iter().map(|q| q.id.as_str())));

        state.submitting.set(Some(mode));

        spawn_local(async move {
            match api::submit_reflection(mode, answers, &draft.images).await {
                Ok(id) => {
                    state.mark_saved(mode);
                    state.show_success(&format!("{} saved (#{})", mode.title(), id));
                }
                Err(e) => {
                    state.show_error(&format!("Failed to save {}: {}", mode.title(), e));
                }
            }
            state.submitting.set(None);
        });
    };

    let discard = move |_| {
        state.discard_draft(state.mode.get_untracked());
    };

    view! {
        <form on:submit=on_submit class="bg-gray-800 rounded-xl p-6 space-y-6">
            <fieldset
                disabled=move || !state.can_edit(state.mode.get())
                class="space-y-6 disabled:opacity-60"
            >
                <For
                    each=move || questions.get()
                    key=|q| q.id.clone()
                    children=move |question| view! { <QuestionField question=question /> }
                />

                <ImageUpload />
            </fieldset>

            <div class="flex items-center space-x-3">
                <button
                    type="submit"
                    disabled=move || state.is_submitting()
                    class="flex-1 bg-indigo-600 hover:bg-indigo-700 disabled:bg-gray-600
                           disabled:cursor-not-allowed rounded-lg py-3 font-semibold
                           transition-colors flex items-center justify-center space-x-2"
                >
                    {move || if state.is_submitting() {
                        view! {
                            <div class="loading-spinner w-5 h-5" />
                            <span>"Saving..."</span>
                        }.into_view()
                    } else {
                        view! {
                            <span>{format!("Save {}", state.mode.get().title())}</span>
                        }.into_view()
                    }}
                </button>

                <button
                    type="button"
                    on:click=discard
                    disabled=move || !state.has_draft(state.mode.get()) || state.is_submitting()
                    class="px-4 py-3 rounded-lg text-gray-400 hover:text-white hover:bg-gray-700
                           disabled:opacity-40 disabled:cursor-not-allowed transition-colors"
                >
                    "Discard draft"
                </button>
            </div>
        </form>
    }
}

#[component]
fn QuestionField(question: Question) -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let input_id = format!("question-{}", question.id);
    let id = store_value(question.id);

    view! {
        <div>
            <label for=input_id.clone() class="block text-sm text-gray-300 mb-2">
                {question.label}
            </label>
            <textarea
                id=input_id
                rows=3
                prop:value=move || id.with_value(|id| state.answer(state.mode.get(), id))
                on:input=move |ev| {
                    let value = event_target_value(&ev);
                    id.with_value(|id| state.update_field(state.mode.get_untracked(), id, value));
                }
                class="w-full bg-gray-700 rounded-lg px-4 py-3 text-white resize-y
                       border border-gray-600 focus:border-indigo-500 focus:outline-none"
            />
        </div>
    }
}
