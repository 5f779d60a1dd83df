//! State Management
//!
//! Global dashboard state and the journal model behind it.

pub mod global;
pub mod journal;
pub mod object_url;

pub use global::{provide_global_state, GlobalState};
pub use journal::{accepts_image, is_editable, Draft, ReportMode, ACCEPT_ATTR};
pub use object_url::ObjectUrl;
