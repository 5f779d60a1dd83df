//! UI Components
//!
//! Reusable Leptos components for the dashboard.

pub mod daily_context;
pub mod daily_overview;
pub mod image_upload;
pub mod mode_toggle;
pub mod nav;
pub mod reflection_form;
pub mod toast;

pub use daily_context::DailyContext;
pub use daily_overview::DailyOverview;
pub use image_upload::ImageUpload;
pub use mode_toggle::ModeToggle;
pub use nav::Nav;
pub use reflection_form::ReflectionForm;
pub use toast::Toast;
