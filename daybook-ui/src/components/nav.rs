//! Header Bar
//!
//! Shows which report is open and whether any draft is still unsaved, so
//! leaving the page never comes as a surprise.

use leptos::*;
use leptos_router::*;

use crate::state::GlobalState;

#[component]
pub fn Nav() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    view! {
        <header class="bg-gray-800 border-b border-gray-700">
            <div class="container mx-auto px-4 h-16 flex items-center justify-between">
                <A href="/" class="flex items-center space-x-3">
                    <span class="text-2xl">{move || state.mode.get().icon()}</span>
                    <span class="text-lg font-semibold text-white">
                        {move || state.mode.get().title()}
                    </span>
                </A>

                <div class="flex items-center space-x-4 text-sm">
                    {move || {
                        if let Some(mode) = state.submitting.get() {
                            view! {
                                <span class="text-indigo-300">{format!("Saving {}...", mode.label())}</span>
                            }
                            .into_view()
                        } else {
                            let pending = state.unsaved_modes();
                            (!pending.is_empty())
                                .then(|| {
                                    let labels: Vec<&str> = pending.iter().map(|m| m.label()).collect();
                                    view! {
                                        <span class="text-amber-400" title="Unsaved input">
                                            {format!("● Unsaved: {}", labels.join(", "))}
                                        </span>
                                    }
                                })
                                .into_view()
                        }
                    }}

                    <A
                        href="/weekly"
                        class="px-3 py-2 rounded-lg text-gray-300 hover:text-white hover:bg-gray-700"
                        active_class="bg-gray-700 text-white"
                    >
                        "This week"
                    </A>
                </div>
            </div>
        </header>
    }
}
