//! Reflection Stores
//!
//! The persistence port the journal submits through, plus its
//! implementations:
//!
//! - **sqlite**: durable local store used by the API server
//! - **http**: client for a remote Daybook API (used by the CLI)
//! - **memory**: in-process store for dry runs and tests
//! - **types**: what stores return after saving
//! - **error**: error types

pub mod error;
pub mod http;
pub mod memory;
pub mod sqlite;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use http::HttpStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use types::{ReflectionId, StoredImage, StoredReflection};

use async_trait::async_trait;

use crate::journal::Submission;

/// Persistence port for submitted reflections
///
/// Called once per explicit submit with the complete snapshot of the
/// active mode. An `Err` leaves the caller's draft untouched.
#[async_trait]
pub trait ReflectionStore: Send + Sync {
    async fn save_reflection(&self, submission: &Submission) -> StoreResult<ReflectionId>;
}
