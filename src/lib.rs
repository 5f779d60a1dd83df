//! # Daybook
//!
//! Morning and evening reflection journal: a typed form model, a persistence
//! port with SQLite, HTTP and in-memory stores, a REST API and a CLI.
//!
//! ## Modules
//!
//! - [`journal`]: report modes, question sets, drafts, image picker and the
//!   submit lifecycle
//! - [`store`]: the `ReflectionStore` port and its implementations
//! - [`integrations`]: daily context (Things 3 tasks, weather) for the overview
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use daybook::journal::{ImagePicker, JournalSession, ReportMode, SelectedFile};
//! use daybook::store::SqliteStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = SqliteStore::open(std::path::Path::new("daybook_data"))?;
//!     let picker = ImagePicker::default();
//!
//!     let mut session = JournalSession::new();
//!     session.select_mode(ReportMode::Evening);
//!     session.edit("reflection", "Shipped the release")?;
//!     session.attach(picker.on_drop(vec![SelectedFile::new(
//!         "sunset.png",
//!         "image/png",
//!         std::fs::read("sunset.png")?,
//!     )]))?;
//!
//!     let receipt = session.submit(&store).await?;
//!     println!("Saved {} reflection #{}", receipt.mode, receipt.id);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod integrations;
pub mod journal;
pub mod store;

// Re-export top-level types for convenience
pub use journal::{
    AttachmentRecord, ImagePicker, JournalSession, Question, ReflectionError, ReflectionForm,
    ReflectionRecord, ReflectionResult, ReportMode, SelectedFile, Submission, SubmitStatus,
};

pub use store::{
    HttpStore, MemoryStore, ReflectionId, ReflectionStore, SqliteStore, StoreError, StoreResult,
    StoredReflection,
};

pub use api::{build_router, serve, ApiError, AppState};

pub use integrations::{Integration, IntegrationError, Integrations};

pub use config::{
    ApiConfig, Config, ConfigError, IntegrationsConfig, LoggingConfig, StorageConfig,
};
