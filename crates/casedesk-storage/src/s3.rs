//! S3-compatible image store
//!
//! Uses the `object_store` crate for S3-compatible storage. Supports
//! AWS S3, MinIO, and other S3-compatible services.

use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions, PutPayload};
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

use crate::error::StorageError;
use crate::store::{ImageStore, object_key};

/// S3 storage configuration
#[derive(Debug, Clone)]
pub struct S3Config {
    /// S3 bucket name
    pub bucket: String,
    /// S3 region (e.g., "us-east-1")
    pub region: String,
    /// S3 endpoint URL (for MinIO or other S3-compatible services)
    pub endpoint: Option<String>,
    /// AWS access key ID
    pub access_key_id: Option<String>,
    /// AWS secret access key
    pub secret_access_key: Option<String>,
    /// Allow HTTP (not HTTPS) connections
    pub allow_http: bool,
}

/// S3 image store
///
/// Objects live under `case-studies/{millis}-{filename}`; issued URLs
/// are virtual-hosted style for AWS, path style when a custom endpoint
/// is configured.
pub struct S3Store {
    store: Arc<dyn ObjectStore>,
    public_base: String,
}

impl S3Store {
    /// Create a new S3 image store
    pub fn new(config: S3Config) -> Result<Self, StorageError> {
        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(&config.bucket)
            .with_region(&config.region);

        if let Some(endpoint) = &config.endpoint {
            builder = builder.with_endpoint(endpoint);
        }
        if let Some(access_key) = &config.access_key_id {
            builder = builder.with_access_key_id(access_key);
        }
        if let Some(secret_key) = &config.secret_access_key {
            builder = builder.with_secret_access_key(secret_key);
        }
        if config.allow_http {
            builder = builder.with_allow_http(true);
        }

        let store = builder.build().map_err(|e| {
            StorageError::Configuration(format!("Failed to create S3 client: {}", e))
        })?;

        let public_base = match &config.endpoint {
            Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), config.bucket),
            None => format!(
                "https://{}.s3.{}.amazonaws.com",
                config.bucket, config.region
            ),
        };

        info!(
            "Initialized S3 image store: bucket={}, region={}, endpoint={:?}",
            config.bucket, config.region, config.endpoint
        );

        Ok(Self {
            store: Arc::new(store),
            public_base,
        })
    }

    /// Derive the object key from a previously issued URL.
    fn key_from_url(&self, url: &str) -> Option<String> {
        extract_object_key(url)
            .or_else(|| {
                url.strip_prefix(&self.public_base)
                    .map(|rest| rest.trim_start_matches('/').to_string())
            })
            .filter(|key| !key.is_empty())
    }
}

/// Extract the object key from an S3 URL. Handles both shapes:
/// `https://bucket.s3.region.amazonaws.com/key` (virtual-hosted) and
/// `https://s3.region.amazonaws.com/bucket/key` (path style).
pub(crate) fn extract_object_key(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    let path = parsed.path().trim_start_matches('/');

    if host.contains(".s3.") {
        Some(path.to_string())
    } else if host.starts_with("s3.") {
        // Path style: first segment is the bucket name.
        let (_bucket, key) = path.split_once('/')?;
        Some(key.to_string())
    } else {
        None
    }
}

#[async_trait]
impl ImageStore for S3Store {
    async fn upload(
        &self,
        data: Bytes,
        filename: &str,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let key = object_key(filename);
        let path = ObjectPath::parse(&key)
            .map_err(|e| StorageError::InvalidUrl(format!("Invalid object key: {}", e)))?;

        debug!("Uploading image to S3: {:?}", path);

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());

        self.store
            .put_opts(&path, PutPayload::from(data), PutOptions::from(attributes))
            .await
            .map_err(|e| StorageError::S3(e.to_string()))?;

        Ok(format!("{}/{}", self.public_base, key))
    }

    async fn delete(&self, url: &str) -> Result<bool, StorageError> {
        let Some(key) = self.key_from_url(url) else {
            debug!("Could not extract object key from URL: {}", url);
            return Ok(false);
        };

        let path = ObjectPath::parse(&key)
            .map_err(|e| StorageError::InvalidUrl(format!("Invalid object key: {}", e)))?;

        debug!("Deleting image from S3: {:?}", path);

        match self.store.delete(&path).await {
            Ok(()) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::S3(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_key_virtual_hosted() {
        let url = "https://my-bucket.s3.us-east-1.amazonaws.com/case-studies/170-a.png";
        assert_eq!(
            extract_object_key(url).as_deref(),
            Some("case-studies/170-a.png")
        );
    }

    #[test]
    fn test_extract_key_path_style() {
        let url = "https://s3.us-east-1.amazonaws.com/my-bucket/case-studies/170-a.png";
        assert_eq!(
            extract_object_key(url).as_deref(),
            Some("case-studies/170-a.png")
        );
    }

    #[test]
    fn test_extract_key_unrelated_host() {
        assert_eq!(extract_object_key("https://example.com/x.png"), None);
        assert_eq!(extract_object_key("not a url"), None);
    }

    #[test]
    fn test_public_base_for_custom_endpoint() {
        let store = S3Store::new(S3Config {
            bucket: "images".to_string(),
            region: "us-east-1".to_string(),
            endpoint: Some("http://localhost:9000".to_string()),
            access_key_id: Some("minio".to_string()),
            secret_access_key: Some("minio123".to_string()),
            allow_http: true,
        })
        .unwrap();

        assert_eq!(store.public_base, "http://localhost:9000/images");
        assert_eq!(
            store
                .key_from_url("http://localhost:9000/images/case-studies/170-a.png")
                .as_deref(),
            Some("case-studies/170-a.png")
        );
    }
}
