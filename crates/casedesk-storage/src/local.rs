//! Local disk image store
//!
//! Development backend: images land under a base directory and are
//! served by the application under `/public/uploads/`.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, info};

use crate::error::StorageError;
use crate::store::{ImageStore, object_key};

/// Local disk image store
pub struct LocalStore {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStore {
    /// Create a new local image store rooted at `base_path`, issuing
    /// URLs under `base_url` (e.g. `http://localhost:5000`).
    pub async fn new(
        base_path: impl Into<PathBuf>,
        base_url: &str,
    ) -> Result<Self, StorageError> {
        let base_path = base_path.into();
        fs::create_dir_all(base_path.join("case-studies")).await?;

        info!("Initialized local image store at {:?}", base_path);

        Ok(Self {
            base_path,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url_prefix(&self) -> String {
        format!("{}/public/uploads/", self.base_url)
    }
}

#[async_trait]
impl ImageStore for LocalStore {
    async fn upload(
        &self,
        data: Bytes,
        filename: &str,
        _content_type: &str,
    ) -> Result<String, StorageError> {
        let key = object_key(filename);
        let path = self.base_path.join(&key);

        debug!("Writing image to {:?}", path);
        fs::write(&path, &data).await?;

        Ok(format!("{}{}", self.url_prefix(), key))
    }

    async fn delete(&self, url: &str) -> Result<bool, StorageError> {
        let Some(key) = url.strip_prefix(&self.url_prefix()) else {
            debug!("URL not issued by this store: {}", url);
            return Ok(false);
        };

        let path = self.base_path.join(key);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}
