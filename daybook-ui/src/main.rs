//! Daybook dashboard (Leptos CSR).
//!
//! Morning and evening reflection form with one draft per mode, image
//! attachments with previews and a weekly summary. Talks to the Daybook
//! API over HTTP.

mod api;
mod app;
mod components;
mod pages;
mod state;

fn main() {
    console_error_panic_hook::set_once();
    leptos::mount_to_body(app::App);
}
