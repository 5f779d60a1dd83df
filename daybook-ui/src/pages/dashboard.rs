//! Dashboard Page
//!
//! Today's report: mode toggle, overview card and the reflection form.

use leptos::*;

use crate::api::{self, Question};
use crate::components::{DailyOverview, ModeToggle, ReflectionForm};
use crate::state::GlobalState;

/// Dashboard page component
#[component]
pub fn Dashboard() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    // Question set follows the active mode
    let question_set = create_local_resource(
        move || state.mode.get(),
        |mode| async move { api::fetch_questions(mode).await },
    );

    create_effect(move |_| {
        if let Some(Err(e)) = question_set.get() {
            web_sys::console::error_1(&format!("Failed to fetch questions: {}", e).into());
            state.show_error("Could not load questions from the server");
        }
    });

    let questions = Signal::derive(move || {
        question_set
            .get()
            .and_then(Result::ok)
            // Ignore the previous mode's set while the new one loads
            .filter(|set| set.mode == state.mode.get())
            .map(|set| set.questions)
            .unwrap_or_default()
    });

    view! {
        <div class="max-w-3xl mx-auto space-y-6">
            <div class="flex justify-center">
                <ModeToggle />
            </div>

            <DailyOverview questions=questions />

            {move || {
                let loaded: Vec<Question> = questions.get();
                if loaded.is_empty() {
                    view! {
                        <div class="bg-gray-800 rounded-xl p-6 text-center text-gray-400">
                            "Loading questions..."
                        </div>
                    }.into_view()
                } else {
                    view! { <ReflectionForm questions=questions /> }.into_view()
                }
            }}
        </div>
    }
}
