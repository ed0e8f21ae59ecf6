//! Test helpers: in-memory stores wrapped with call recording and fault injection

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashSet;
use std::sync::{Arc, Mutex};

use crate::catalog::ProductCatalog;
use crate::db::{MemoryProductTable, ProductTable, TableError};
use crate::domain::{NewProduct, Product};
use crate::storage::{MemoryObjectStore, ObjectStore, ObjectStoreError, StoredObject};

/// 1x1 transparent PNG
pub const PIXEL_PNG: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

pub fn widget() -> NewProduct {
    NewProduct {
        name: "Widget".to_string(),
        description: "A widget".to_string(),
        price: 9.99,
        image_name: "w.png".to_string(),
        image_content_type: "image/png".to_string(),
        image_base64: PIXEL_PNG.to_string(),
    }
}

/// Store calls observed by the harness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Call {
    Upload,
    Download,
    DeleteObject,
    Scan,
    Get,
    Put,
    DeleteRecord,
}

#[derive(Clone, Default)]
struct Recorder {
    calls: Arc<Mutex<Vec<Call>>>,
    failing: Arc<DashSet<Call>>,
}

impl Recorder {
    /// Record `call`; true when it should fail
    fn hit(&self, call: Call) -> bool {
        self.calls.lock().unwrap().push(call);
        self.failing.contains(&call)
    }
}

/// Memory-backed stores whose calls are recorded and can be made to fail
pub struct Harness {
    pub objects: MemoryObjectStore,
    pub table: MemoryProductTable,
    recorder: Recorder,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            objects: MemoryObjectStore::new("images"),
            table: MemoryProductTable::new(),
            recorder: Recorder::default(),
        }
    }

    pub fn object_store(&self) -> Arc<dyn ObjectStore> {
        Arc::new(RecordingObjectStore { inner: self.objects.clone(), recorder: self.recorder.clone() })
    }

    pub fn product_table(&self) -> Arc<dyn ProductTable> {
        Arc::new(RecordingTable { inner: self.table.clone(), recorder: self.recorder.clone() })
    }

    pub fn catalog(&self) -> ProductCatalog {
        ProductCatalog::new(self.object_store(), self.product_table())
    }

    /// Make every subsequent `call` fail
    pub fn fail(&self, call: Call) {
        self.recorder.failing.insert(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.recorder.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: Call) -> usize {
        self.calls().into_iter().filter(|c| *c == call).count()
    }

    pub fn clear_calls(&self) {
        self.recorder.calls.lock().unwrap().clear();
    }
}

struct RecordingObjectStore {
    inner: MemoryObjectStore,
    recorder: Recorder,
}

#[async_trait]
impl ObjectStore for RecordingObjectStore {
    async fn upload(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<StoredObject, ObjectStoreError> {
        if self.recorder.hit(Call::Upload) {
            return Err(ObjectStoreError::UploadFailed("injected failure".to_string()));
        }
        self.inner.upload(key, data, content_type).await
    }

    async fn download(&self, key: &str) -> Result<Bytes, ObjectStoreError> {
        if self.recorder.hit(Call::Download) {
            return Err(ObjectStoreError::DownloadFailed("injected failure".to_string()));
        }
        self.inner.download(key).await
    }

    async fn delete(&self, key: &str) -> Result<(), ObjectStoreError> {
        if self.recorder.hit(Call::DeleteObject) {
            return Err(ObjectStoreError::DeleteFailed("injected failure".to_string()));
        }
        self.inner.delete(key).await
    }
}

struct RecordingTable {
    inner: MemoryProductTable,
    recorder: Recorder,
}

fn injected(operation: &'static str) -> TableError {
    TableError::Dynamo { operation, message: "injected failure".to_string() }
}

#[async_trait]
impl ProductTable for RecordingTable {
    async fn scan(&self) -> Result<Vec<Product>, TableError> {
        if self.recorder.hit(Call::Scan) {
            return Err(injected("Scan"));
        }
        self.inner.scan().await
    }

    async fn get(&self, product_id: &str) -> Result<Option<Product>, TableError> {
        if self.recorder.hit(Call::Get) {
            return Err(injected("GetItem"));
        }
        self.inner.get(product_id).await
    }

    async fn put(&self, product: &Product) -> Result<(), TableError> {
        if self.recorder.hit(Call::Put) {
            return Err(injected("PutItem"));
        }
        self.inner.put(product).await
    }

    async fn delete(&self, product_id: &str) -> Result<(), TableError> {
        if self.recorder.hit(Call::DeleteRecord) {
            return Err(injected("DeleteItem"));
        }
        self.inner.delete(product_id).await
    }
}
