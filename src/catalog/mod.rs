//! Product catalog operations
//!
//! Lists, adds and removes products across the product table and the image
//! object store. Each operation runs its store calls strictly in sequence.

mod error;
pub mod saga;

use bytes::Bytes;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::db::ProductTable;
use crate::domain::{image_key, NewProduct, Product, ProductId};
use crate::storage::ObjectStore;

pub use error::CatalogError;
pub use saga::{Inconsistency, Saga, SagaError, Step};

/// Catalog service over long-lived store clients shared by all requests
#[derive(Clone)]
pub struct ProductCatalog {
    objects: Arc<dyn ObjectStore>,
    table: Arc<dyn ProductTable>,
}

impl ProductCatalog {
    pub fn new(objects: Arc<dyn ObjectStore>, table: Arc<dyn ProductTable>) -> Self {
        Self { objects, table }
    }

    /// Every product record in the table
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        let products = self.table.scan().await?;
        info!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Store the image, then the record. Returns the generated identifier.
    ///
    /// The record is only written once the upload succeeded. A failed record
    /// write leaves the uploaded image in place.
    #[instrument(skip(self, request), fields(image_name = %request.image_name))]
    pub async fn add_product(&self, request: NewProduct) -> Result<ProductId, CatalogError> {
        let product_id = ProductId::generate();
        let image = request.decode_image()?;
        let key = image_key(product_id.as_str(), &request.image_name);

        let mut saga = Saga::create(product_id.as_str(), &key);

        let stored = saga
            .step(
                Step::UploadImage,
                self.objects.upload(&key, Bytes::from(image), &request.image_content_type),
            )
            .await?;

        let record = request.into_record(&product_id, stored.location);
        saga.step(Step::WriteRecord, self.table.put(&record)).await?;
        saga.finish();

        info!(
            product_id = %product_id,
            key = %stored.key,
            size = stored.size,
            etag = stored.etag.as_deref().unwrap_or("-"),
            "Product added"
        );
        Ok(product_id)
    }

    /// Delete the image, then the record.
    ///
    /// Returns `NotFound` without touching the object store when no record
    /// exists. A failed record delete leaves the record pointing at a deleted
    /// image.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, product_id: &str) -> Result<(), CatalogError> {
        let record = self
            .table
            .get(product_id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(product_id.to_string()))?;

        let key = record.image_key();
        let mut saga = Saga::remove(product_id, key.as_deref());

        match &key {
            Some(key) => saga.step(Step::DeleteImage, self.objects.delete(key)).await?,
            None => warn!(product_id = %product_id, "Product has no image reference, removing record only"),
        }

        saga.step(Step::DeleteRecord, self.table.delete(product_id)).await?;
        saga.finish();

        info!(product_id = %product_id, "Product deleted");
        Ok(())
    }
}
