//! Daily Overview Component
//!
//! Header card for the active mode: title, today's date, how many questions
//! are answered in the draft, and whether today's report is already saved.
//! The day's tasks and weather follow underneath.

use leptos::*;

use crate::api::{self, Question};
use crate::components::DailyContext;
use crate::state::GlobalState;

#[component]
pub fn DailyOverview(
    /// Questions for the active mode
    #[prop(into)]
    questions: Signal<Vec<Question>>,
) -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    let today = chrono::Utc::now().date_naive();
    let date_key = today.format("%Y-%m-%d").to_string();
    let date_label = today.format("%A, %B %-d").to_string();

    let saved = create_local_resource(
        move || (state.mode.get(), state.saved_version.get()),
        move |(mode, _)| {
            let date_key = date_key.clone();
            async move { api::fetch_reflection(&date_key, mode).await }
        },
    );

    let progress = move || {
        let mode = state.mode.get();
        let ids = questions.get();
        let answered = state
            .drafts
            .with(|drafts| {
                drafts
                    .get(&mode)
                    .map(|d| d.answered(ids.iter().map(|q| q.id.as_str())))
            })
            .unwrap_or(0);
        (answered, ids.len())
    };

    view! {
        <div class="space-y-4">
            <section class="bg-gray-800 rounded-xl p-6 flex items-center justify-between">
                <div>
                    <h1 class="text-3xl font-bold">
                        {move || format!("{} {}", state.mode.get().icon(), state.mode.get().title())}
                    </h1>
                    <p class="text-gray-400 mt-1">{date_label}</p>
                </div>

                <div class="text-right space-y-1">
                    <div class="text-sm text-gray-300">
                        {move || {
                            let (answered, total) = progress();
                            format!("{} of {} answered", answered, total)
                        }}
                    </div>
                    <Suspense fallback=|| view! { <div class="text-sm text-gray-500">"Checking..."</div> }>
                        {move || saved.get().map(|result| match result {
                            Ok(Some(reflection)) => view! {
                                <div class="text-sm text-green-400">
                                    {format!("Saved today (#{})", reflection.id)}
                                </div>
                            }.into_view(),
                            Ok(None) => view! {
                                <div class="text-sm text-gray-500">"Not saved yet today"</div>
                            }.into_view(),
                            Err(e) => view! {
                                <div class="text-sm text-red-400" title=e>"Server unavailable"</div>
                            }.into_view(),
                        })}
                    </Suspense>
                </div>
            </section>
            <DailyContext />
        </div>
    }
}
