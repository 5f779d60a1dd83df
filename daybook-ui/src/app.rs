//! App Shell
//!
//! Provides global state, routes between today's report and the weekly
//! summary, and asks before the tab closes on an unsaved draft.

use leptos::*;
use leptos_router::*;

use crate::components::{Nav, Toast};
use crate::pages::{Dashboard, Weekly};
use crate::state::{provide_global_state, GlobalState};

#[component]
pub fn App() -> impl IntoView {
    provide_global_state();
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    let guard = window_event_listener(ev::beforeunload, move |ev| {
        if !state.unsaved_modes().is_empty() {
            ev.prevent_default();
            ev.set_return_value("You have an unsaved reflection.");
        }
    });
    on_cleanup(move || guard.remove());

    view! {
        <Router>
            <div class="min-h-screen bg-gray-900 text-white flex flex-col">
                <Nav />
                <main class="flex-1 container mx-auto px-4 py-8 max-w-3xl">
                    <Routes>
                        <Route path="/" view=Dashboard />
                        <Route path="/weekly" view=Weekly />
                        <Route path="/*any" view=|| view! { <Redirect path="/" /> } />
                    </Routes>
                </main>
                <Toast />
            </div>
        </Router>
    }
}
