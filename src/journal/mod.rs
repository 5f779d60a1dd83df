//! Daybook Journal Core
//!
//! The reflection-form model, independent of any transport or view layer:
//!
//! - **mode**: `ReportMode` (morning / evening)
//! - **question**: static question set per mode
//! - **attachment**: image picker and preview handles
//! - **record**: drafts and submission snapshots
//! - **form**: per-mode drafts and the submit lifecycle
//! - **session**: single state container (mode + form)
//! - **error**: error types
//!
//! # Data Flow
//!
//! ```text
//!   select_mode ──▶ JournalSession.mode
//!                         │
//!   edit / attach ──▶ ReflectionForm.drafts[mode] ──snapshot──▶ ReflectionStore
//!                         ▲
//!   ImagePicker::on_drop ─┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use daybook::journal::{JournalSession, ReportMode};
//! use daybook::store::MemoryStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MemoryStore::new();
//!     let mut session = JournalSession::with_mode(ReportMode::Morning);
//!
//!     session.edit("priorities", "Finish design doc")?;
//!     session.edit("intention", "Deep work block")?;
//!
//!     let receipt = session.submit(&store).await?;
//!     println!("Saved reflection #{}", receipt.id);
//!     Ok(())
//! }
//! ```

pub mod attachment;
pub mod error;
pub mod form;
pub mod mode;
pub mod question;
pub mod record;
pub mod session;

pub use attachment::{AcceptFilter, AttachmentRecord, ImagePicker, PreviewHandle, PreviewRegistry, SelectedFile};
pub use error::{ReflectionError, ReflectionResult};
pub use form::{ReflectionForm, SubmissionReceipt, SubmissionResult, SubmitStatus};
pub use mode::ReportMode;
pub use question::{find_question, questions_for, questions_for_name, Question};
pub use record::{Answer, FieldView, ReflectionRecord, Submission};
pub use session::{DashboardView, JournalSession, Overview};
