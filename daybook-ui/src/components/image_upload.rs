//! Image Upload Component
//!
//! Drop zone plus file input for attaching photos to the active report.
//! Only image/* files ending in .jpeg, .jpg or .png are kept; every drop
//! or selection replaces the previous attachments.
//!
//! Previews are `blob:` URLs owned by this component. They are revoked when
//! the attachments change and when the component unmounts.

use leptos::*;
use std::rc::Rc;

use crate::state::{accepts_image, GlobalState, ObjectUrl, ACCEPT_ATTR};

/// A rendered preview; the URL is revoked when the last clone drops
#[derive(Clone)]
struct Preview {
    name: String,
    url: Rc<ObjectUrl>,
}

#[component]
pub fn ImageUpload() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    let (dragging, set_dragging) = create_signal(false);
    let previews = create_rw_signal(Vec::<Preview>::new());

    // Blob URLs are revoked and recreated only when the file list changes
    let files = state.image_files();

    create_effect(move |_| {
        let fresh: Vec<Preview> = files
            .get()
            .iter()
            .filter_map(|file| {
                ObjectUrl::new(file).map(|url| Preview {
                    name: file.name(),
                    url: Rc::new(url),
                })
            })
            .collect();
        previews.set(fresh);
    });

    on_cleanup(move || {
        previews.try_set(Vec::new());
    });

    let accept_files = move |files: Option<web_sys::FileList>| {
        let Some(files) = files else { return };
        let mode = state.mode.get_untracked();

        let selected: Vec<web_sys::File> = (0..files.length()).filter_map(|i| files.get(i)).collect();
        let total = selected.len();
        let accepted: Vec<web_sys::File> = selected
            .into_iter()
            .filter(|file| accepts_image(&file.name(), &file.type_()))
            .collect();

        if accepted.len() < total {
            web_sys::console::log_1(
                &format!("Skipped {} file(s) that are not .jpeg/.jpg/.png images", total - accepted.len()).into(),
            );
        }
        state.update_images(mode, accepted);
    };

    let on_drop = move |ev: web_sys::DragEvent| {
        ev.prevent_default();
        set_dragging.set(false);
        if !state.can_edit(state.mode.get_untracked()) {
            return;
        }
        accept_files(ev.data_transfer().and_then(|dt| dt.files()));
    };

    let on_change = move |ev: web_sys::Event| {
        let input = event_target::<web_sys::HtmlInputElement>(&ev);
        accept_files(input.files());
        // Allow picking the same file again
        input.set_value("");
    };

    view! {
        <div class="space-y-3">
            <label class="block text-sm text-gray-400">"Photos"</label>

            <label
                on:dragover=move |ev: web_sys::DragEvent| {
                    ev.prevent_default();
                    set_dragging.set(true);
                }
                on:dragleave=move |_| set_dragging.set(false)
                on:drop=on_drop
                class=move || {
                    let base = "flex flex-col items-center justify-center border-2 border-dashed \
                                rounded-xl p-6 cursor-pointer transition-colors";
                    if dragging.get() {
                        format!("{} border-indigo-400 bg-gray-700", base)
                    } else {
                        format!("{} border-gray-600 hover:border-gray-500", base)
                    }
                }
            >
                <span class="text-3xl mb-2">"📷"</span>
                <span class="text-sm text-gray-300">"Drop images here, or click to select"</span>
                <span class="text-xs text-gray-500 mt-1">".jpeg, .jpg or .png"</span>
                <input
                    type="file"
                    multiple=true
                    accept=ACCEPT_ATTR
                    class="hidden"
                    on:change=on_change
                />
            </label>

            {move || {
                let items = previews.get();
                (!items.is_empty()).then(|| view! {
                    <div class="grid grid-cols-3 gap-3">
                        {items
                            .into_iter()
                            .map(|preview| view! {
                                <figure class="bg-gray-700 rounded-lg overflow-hidden">
                                    <img
                                        src=preview.url.as_str().to_string()
                                        alt=preview.name.clone()
                                        class="w-full h-24 object-cover"
                                    />
                                    <figcaption class="text-xs text-gray-400 px-2 py-1 truncate">
                                        {preview.name}
                                    </figcaption>
                                </figure>
                            })
                            .collect_view()}
                    </div>
                })
            }}
        </div>
    }
}
