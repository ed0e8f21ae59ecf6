//! In-process object store

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

use super::{ObjectStore, ObjectStoreError, StoredObject};

#[derive(Debug, Clone)]
struct MemoryObject {
    data: Bytes,
    content_type: String,
}

/// Object store kept in a concurrent map, for local runs and tests
#[derive(Clone, Default)]
pub struct MemoryObjectStore {
    bucket: String,
    objects: Arc<DashMap<String, MemoryObject>>,
}

impl MemoryObjectStore {
    pub fn new(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            objects: Arc::new(DashMap::new()),
        }
    }

    /// Whether an object exists under `key`
    pub fn contains(&self, key: &str) -> bool {
        self.objects.contains_key(key)
    }

    /// Content type recorded for `key`
    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects.get(key).map(|o| o.content_type.clone())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn upload(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<StoredObject, ObjectStoreError> {
        let size = data.len() as u64;
        self.objects.insert(
            key.to_string(),
            MemoryObject { data, content_type: content_type.to_string() },
        );

        debug!(key = %key, size, "Stored object in memory");

        Ok(StoredObject {
            key: key.to_string(),
            size,
            etag: None,
            location: format!("memory://{}/{}", self.bucket, key),
        })
    }

    async fn download(&self, key: &str) -> Result<Bytes, ObjectStoreError> {
        self.objects
            .get(key)
            .map(|o| o.data.clone())
            .ok_or_else(|| ObjectStoreError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<(), ObjectStoreError> {
        self.objects.remove(key);
        Ok(())
    }
}
