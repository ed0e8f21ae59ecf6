//! Storage module for product images
//!
//! Product images live in an object store. S3 (and S3-compatible services)
//! is the production backend; the in-memory store serves local runs and tests.

mod memory;
mod s3;

use async_trait::async_trait;
use aws_config::SdkConfig;
use bytes::Bytes;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{StorageBackend, StorageSettings};

pub use memory::MemoryObjectStore;
pub use s3::S3ObjectStore;

/// Errors that can occur during object store operations
#[derive(Error, Debug)]
pub enum ObjectStoreError {
    #[error("Object store not configured: {0}")]
    NotConfigured(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),
}

/// Result of an upload operation
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    /// The object key
    pub key: String,
    /// Size in bytes
    pub size: u64,
    /// ETag reported by the store
    pub etag: Option<String>,
    /// Where the object can be fetched from
    pub location: String,
}

/// Object store holding product images, addressed by key
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` under `key`, replacing any existing object
    async fn upload(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<StoredObject, ObjectStoreError>;

    /// Fetch the object stored under `key`
    async fn download(&self, key: &str) -> Result<Bytes, ObjectStoreError>;

    /// Delete the object under `key`. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<(), ObjectStoreError>;
}

/// Build the configured object store
pub fn connect(
    settings: &StorageSettings,
    sdk_config: &SdkConfig,
) -> Result<Arc<dyn ObjectStore>, ObjectStoreError> {
    match settings.backend {
        StorageBackend::S3 => Ok(Arc::new(S3ObjectStore::new(settings, sdk_config)?)),
        StorageBackend::Memory => Ok(Arc::new(MemoryObjectStore::new(&settings.bucket))),
    }
}
