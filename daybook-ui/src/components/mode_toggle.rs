//! Mode Toggle Component
//!
//! Switches the dashboard between the morning and evening report. The
//! other mode's draft stays in global state and is marked with a dot.

use leptos::*;

use crate::state::{GlobalState, ReportMode};

#[component]
pub fn ModeToggle() -> impl IntoView {
    view! {
        <div class="inline-flex bg-gray-800 rounded-xl p-1 space-x-1" role="tablist">
            {ReportMode::ALL
                .into_iter()
                .map(|mode| view! { <ModeButton mode=mode /> })
                .collect_view()}
        </div>
    }
}

#[component]
fn ModeButton(mode: ReportMode) -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let active = move || state.mode.get() == mode;

    view! {
        <button
            type="button"
            role="tab"
            aria-selected=move || active().to_string()
            on:click=move |_| state.select_mode(mode)
            class=move || {
                let base = "px-5 py-2 rounded-lg text-sm font-medium transition-colors flex items-center space-x-2";
                if active() {
                    format!("{} bg-indigo-600 text-white", base)
                } else {
                    format!("{} text-gray-400 hover:text-white hover:bg-gray-700", base)
                }
            }
        >
            <span>{mode.icon()}</span>
            <span>{mode.label()}</span>
            {move || {
                (state.has_draft(mode) && !active()).then(|| view! {
                    <span class="w-2 h-2 bg-yellow-400 rounded-full" title="Unsaved draft" />
                })
            }}
        </button>
    }
}
