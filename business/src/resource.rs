//! The in-memory image behind the preview, the download and the full-size view.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};

use crate::file_name::download_file_name;

static NEXT_LOCATOR: AtomicU64 = AtomicU64::new(1);

/// Owner of one fetched image payload.
///
/// Clones share the bytes. The payload is freed when the last clone is
/// dropped, which is what releasing a handle means here; a locator is never
/// handed out twice in one process.
#[derive(Clone)]
pub struct ResourceHandle {
    locator: String,
    content_type: String,
    bytes: Arc<[u8]>,
    source_text: String,
    fetched_at: DateTime<Utc>,
}

impl ResourceHandle {
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>, source_text: impl Into<String>) -> Self {
        let content_type = content_type.into();
        let n = NEXT_LOCATOR.fetch_add(1, Ordering::Relaxed);
        Self {
            locator: format!("bytes://qrgen/{n}.{}", extension_for(&content_type)),
            content_type,
            bytes: bytes.into(),
            source_text: source_text.into(),
            fetched_at: Utc::now(),
        }
    }

    /// Opaque local address, also used as the texture/cache key.
    pub fn locator(&self) -> &str {
        &self.locator
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn download_file_name(&self) -> String {
        download_file_name(&self.source_text)
    }

    #[cfg(test)]
    pub(crate) fn weak_bytes(&self) -> std::sync::Weak<[u8]> {
        Arc::downgrade(&self.bytes)
    }
}

impl PartialEq for ResourceHandle {
    fn eq(&self, other: &Self) -> bool {
        self.locator == other.locator
    }
}

impl Eq for ResourceHandle {}

impl fmt::Debug for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceHandle")
            .field("locator", &self.locator)
            .field("content_type", &self.content_type)
            .field("bytes", &self.bytes.len())
            .field("fetched_at", &self.fetched_at)
            .finish_non_exhaustive()
    }
}

fn extension_for(content_type: &str) -> String {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.strip_prefix("image/") {
        Some("svg+xml") => "svg".to_owned(),
        Some("jpeg") => "jpg".to_owned(),
        Some(sub) if !sub.is_empty() && sub.chars().all(|c| c.is_ascii_alphanumeric()) => {
            sub.to_owned()
        }
        _ => "bin".to_owned(),
    }
}
