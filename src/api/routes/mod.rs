//! API Routes
//!
//! Route handlers organized by functionality.

pub mod health;
pub mod questions;
pub mod reflections;
pub mod tasks;
pub mod weather;
