//! In-process product table

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use super::{ProductTable, TableError};
use crate::domain::Product;

/// Product table kept in a concurrent map, for local runs and tests.
/// Scans return records ordered by `productId`.
#[derive(Clone, Default)]
pub struct MemoryProductTable {
    records: Arc<DashMap<String, Product>>,
}

impl MemoryProductTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl ProductTable for MemoryProductTable {
    async fn scan(&self) -> Result<Vec<Product>, TableError> {
        let mut products: Vec<Product> = self.records.iter().map(|r| r.value().clone()).collect();
        products.sort_by(|a, b| a.product_id.cmp(&b.product_id));
        Ok(products)
    }

    async fn get(&self, product_id: &str) -> Result<Option<Product>, TableError> {
        Ok(self.records.get(product_id).map(|r| r.value().clone()))
    }

    async fn put(&self, product: &Product) -> Result<(), TableError> {
        self.records.insert(product.product_id.clone(), product.clone());
        Ok(())
    }

    async fn delete(&self, product_id: &str) -> Result<(), TableError> {
        self.records.remove(product_id);
        Ok(())
    }
}
