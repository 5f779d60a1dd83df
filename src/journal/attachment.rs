//! Image Attachments
//!
//! Turns a raw file selection (drag-and-drop or browse) into ordered
//! [`AttachmentRecord`]s. Each record owns a preview handle acquired from a
//! [`PreviewRegistry`]; the handle is released when the last clone of the
//! record is dropped, so replacing or discarding a draft's images frees
//! their previews deterministically.
//!
//! ```text
//! files ──▶ AcceptFilter ──▶ PreviewRegistry::acquire ──▶ AttachmentRecord
//!                                      ▲                        │
//!                                      └──── release on Drop ◀──┘
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

/// Raw content and metadata of one selected file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    name: String,
    content_type: String,
    data: Arc<[u8]>,
}

impl SelectedFile {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Lowercased file extension, if any
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
    }
}

/// Tracks live preview handles and the content they display
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    live: Arc<Mutex<HashMap<Uuid, Arc<[u8]>>>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a preview handle for a file
    pub fn acquire(&self, file: &SelectedFile) -> PreviewHandle {
        let id = Uuid::new_v4();
        self.entries().insert(id, Arc::clone(&file.data));
        tracing::trace!(preview = %id, file = %file.name, "Preview acquired");

        PreviewHandle {
            id,
            registry: self.clone(),
        }
    }

    /// Content behind a preview URL, while the handle is alive
    pub fn resolve(&self, url: &str) -> Option<Arc<[u8]>> {
        let id = url
            .strip_prefix(PreviewHandle::SCHEME)
            .and_then(|raw| Uuid::parse_str(raw).ok())?;
        self.entries().get(&id).cloned()
    }

    /// Number of previews not yet released
    pub fn live_count(&self) -> usize {
        self.entries().len()
    }

    fn release(&self, id: Uuid) {
        if self.entries().remove(&id).is_some() {
            tracing::trace!(preview = %id, "Preview released");
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<Uuid, Arc<[u8]>>> {
        // A panic while holding the lock leaves the map itself consistent
        self.live.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Ephemeral display handle for a selected file
///
/// Revoked from its registry on drop.
pub struct PreviewHandle {
    id: Uuid,
    registry: PreviewRegistry,
}

impl PreviewHandle {
    const SCHEME: &'static str = "preview:";

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// URL a view layer can use to display the preview
    pub fn url(&self) -> String {
        format!("{}{}", Self::SCHEME, self.id)
    }
}

impl fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewHandle").field("id", &self.id).finish()
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.registry.release(self.id);
    }
}

/// A selected image plus its preview handle
#[derive(Debug, Clone)]
pub struct AttachmentRecord {
    file: SelectedFile,
    preview: Arc<PreviewHandle>,
}

impl AttachmentRecord {
    pub fn new(file: SelectedFile, preview: PreviewHandle) -> Self {
        Self {
            file,
            preview: Arc::new(preview),
        }
    }

    pub fn file(&self) -> &SelectedFile {
        &self.file
    }

    pub fn name(&self) -> &str {
        self.file.name()
    }

    pub fn preview_url(&self) -> String {
        self.preview.url()
    }
}

impl PartialEq for AttachmentRecord {
    fn eq(&self, other: &Self) -> bool {
        self.file == other.file && self.preview.id == other.preview.id
    }
}

/// Which files the picker accepts
#[derive(Debug, Clone, Copy)]
pub struct AcceptFilter {
    /// Required content type prefix
    pub mime_prefix: &'static str,
    /// Allowed lowercase extensions, without the dot
    pub extensions: &'static [&'static str],
}

impl Default for AcceptFilter {
    fn default() -> Self {
        Self {
            mime_prefix: "image/",
            extensions: &["jpeg", "jpg", "png"],
        }
    }
}

impl AcceptFilter {
    pub fn accepts(&self, file: &SelectedFile) -> bool {
        let type_ok = file
            .content_type()
            .to_ascii_lowercase()
            .starts_with(self.mime_prefix);

        let ext_ok = file
            .extension()
            .map(|ext| self.extensions.contains(&ext.as_str()))
            .unwrap_or(false);

        type_ok && ext_ok
    }
}

/// Converts file selections into attachment records
#[derive(Debug, Clone, Default)]
pub struct ImagePicker {
    registry: PreviewRegistry,
    filter: AcceptFilter,
}

impl ImagePicker {
    pub fn new(registry: PreviewRegistry) -> Self {
        Self {
            registry,
            filter: AcceptFilter::default(),
        }
    }

    pub fn with_filter(mut self, filter: AcceptFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn registry(&self) -> &PreviewRegistry {
        &self.registry
    }

    pub fn accepts(&self, file: &SelectedFile) -> bool {
        self.filter.accepts(file)
    }

    /// Handle a drop or browse event
    ///
    /// Returns one record per accepted file in selection order. Rejected
    /// files are left out without an error.
    pub fn on_drop<I>(&self, files: I) -> Vec<AttachmentRecord>
    where
        I: IntoIterator<Item = SelectedFile>,
    {
        files
            .into_iter()
            .filter_map(|file| {
                if !self.filter.accepts(&file) {
                    tracing::debug!(
                        file = %file.name(),
                        content_type = %file.content_type(),
                        "Skipping file rejected by image filter"
                    );
                    return None;
                }
                let preview = self.registry.acquire(&file);
                Some(AttachmentRecord::new(file, preview))
            })
            .collect()
    }
}
