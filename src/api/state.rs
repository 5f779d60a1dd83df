//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::config::ApiConfig;
use crate::integrations::Integrations;
use crate::journal::{ImagePicker, PreviewRegistry};
use crate::store::SqliteStore;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Durable reflection store
    pub store: Arc<SqliteStore>,
    /// Filters uploaded images the same way the dashboard picker does
    pub picker: ImagePicker,
    /// Daily context sources; absent ones answer 503
    pub integrations: Integrations,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: Arc<SqliteStore>, config: ApiConfig) -> Self {
        Self {
            store,
            picker: ImagePicker::new(PreviewRegistry::new()),
            integrations: Integrations::default(),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    pub fn with_integrations(mut self, integrations: Integrations) -> Self {
        self.integrations = integrations;
        self
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
