//! Pages
//!
//! Top-level page components for each route.

pub mod dashboard;
pub mod weekly;

pub use dashboard::Dashboard;
pub use weekly::Weekly;
