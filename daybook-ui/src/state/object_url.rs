//! Object URLs for image previews
//!
//! An [`ObjectUrl`] owns a `blob:` URL created for a selected file and
//! revokes it when dropped, so replacing previews or unmounting the picker
//! releases the browser memory behind them.

/// A `blob:` URL revoked on drop
#[derive(Debug)]
pub struct ObjectUrl {
    url: String,
}

impl ObjectUrl {
    pub fn new(file: &web_sys::File) -> Option<Self> {
        match web_sys::Url::create_object_url_with_blob(file) {
            Ok(url) => Some(Self { url }),
            Err(e) => {
                web_sys::console::error_2(&"Failed to create preview URL".into(), &e);
                None
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        let _ = web_sys::Url::revoke_object_url(&self.url);
    }
}
