//! Image store trait

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;

use crate::error::StorageError;

/// Image store abstraction
///
/// Implementations persist uploaded image bytes and hand back a durable
/// public URL; deletion accepts a URL the store issued earlier.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store an image, returning its public URL.
    async fn upload(
        &self,
        data: Bytes,
        filename: &str,
        content_type: &str,
    ) -> Result<String, StorageError>;

    /// Delete an image by its previously issued URL. Returns `false`
    /// when the key cannot be derived from the URL or the object is
    /// already gone; callers treat deletion as best effort.
    async fn delete(&self, url: &str) -> Result<bool, StorageError>;
}

/// Build the object key for an upload: `case-studies/{millis}-{filename}`.
/// Path separators in the client-supplied filename are flattened so the
/// key stays inside the prefix.
pub fn object_key(filename: &str) -> String {
    let safe: String = filename
        .chars()
        .map(|c| if c == '/' || c == '\\' { '-' } else { c })
        .collect();
    format!("case-studies/{}-{}", Utc::now().timestamp_millis(), safe)
}
