//! Weekly Summary Page
//!
//! Reflections saved over the last 7 days.

use leptos::*;

use crate::api::{self, WeeklyEntry};
use crate::state::{GlobalState, ReportMode};

/// Weekly summary page component
#[component]
pub fn Weekly() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    let entries = create_local_resource(
        move || state.saved_version.get(),
        |_| async move { api::fetch_weekly().await },
    );

    view! {
        <div class="max-w-3xl mx-auto space-y-6">
            <div>
                <h1 class="text-3xl font-bold">"This Week"</h1>
                <p class="text-gray-400 mt-1">"Your reflections from the last 7 days"</p>
            </div>

            <Suspense fallback=|| view! { <div class="text-gray-400">"Loading..."</div> }>
                {move || entries.get().map(|result| match result {
                    Ok(list) if list.is_empty() => view! {
                        <div class="bg-gray-800 rounded-xl p-6 text-center text-gray-400">
                            "No reflections yet this week."
                        </div>
                    }.into_view(),
                    Ok(list) => view! {
                        <ul class="space-y-3">
                            {list.into_iter().map(|entry| view! { <EntryRow entry=entry /> }).collect_view()}
                        </ul>
                    }.into_view(),
                    Err(e) => view! {
                        <div class="bg-red-900/40 text-red-300 rounded-xl p-6">
                            {format!("Could not load the weekly summary: {}", e)}
                        </div>
                    }.into_view(),
                })}
            </Suspense>
        </div>
    }
}

#[component]
fn EntryRow(entry: WeeklyEntry) -> impl IntoView {
    let summary = match entry.mode {
        ReportMode::Morning => entry.priorities,
        ReportMode::Evening => entry.reflection,
    }
    .filter(|s| !s.trim().is_empty())
    .unwrap_or_else(|| "-".to_string());

    view! {
        <li class="bg-gray-800 rounded-xl p-4 flex items-start space-x-4">
            <span class="text-2xl">{entry.mode.icon()}</span>
            <div class="flex-1">
                <div class="flex items-center justify-between text-sm text-gray-400">
                    <span>{entry.mode.title()}</span>
                    <span>{entry.date}</span>
                </div>
                <p class="mt-1 whitespace-pre-line">{summary}</p>
            </div>
        </li>
    }
}
