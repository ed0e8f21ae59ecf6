//! Product table module
//!
//! Product records live in a key-value table keyed by `productId`. DynamoDB is
//! the production backend; PostgreSQL and an in-memory map are also supported.

pub mod dynamo;
pub mod memory;
pub mod pool;
pub mod postgres;

use async_trait::async_trait;
use aws_config::SdkConfig;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::config::{TableBackend, TableSettings};
use crate::domain::Product;

pub use dynamo::DynamoProductTable;
pub use memory::MemoryProductTable;
pub use pool::DbPool;
pub use postgres::PostgresProductTable;

/// Product table errors
#[derive(Debug, Error)]
pub enum TableError {
    #[error("Pool error: {0}")]
    Pool(#[from] deadpool_postgres::CreatePoolError),
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),
    #[error("Pool get error: {0}")]
    PoolGet(#[from] deadpool_postgres::PoolError),
    #[error("DynamoDB {operation} failed: {message}")]
    Dynamo { operation: &'static str, message: String },
    #[error("Malformed record: {0}")]
    Malformed(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Key-value table of product records
#[async_trait]
pub trait ProductTable: Send + Sync {
    /// Every record in the table, in backend order
    async fn scan(&self) -> Result<Vec<Product>, TableError>;

    /// Record for `product_id`, if any
    async fn get(&self, product_id: &str) -> Result<Option<Product>, TableError>;

    /// Insert or replace a record
    async fn put(&self, product: &Product) -> Result<(), TableError>;

    /// Remove the record for `product_id`. Removing a missing record succeeds.
    async fn delete(&self, product_id: &str) -> Result<(), TableError>;
}

/// Build the configured product table
pub async fn connect(
    settings: &TableSettings,
    sdk_config: &SdkConfig,
) -> Result<Arc<dyn ProductTable>, TableError> {
    match settings.backend {
        TableBackend::DynamoDb => {
            let table = DynamoProductTable::new(settings, sdk_config)?;
            info!(table = %settings.name, "Using DynamoDB product table");
            Ok(Arc::new(table))
        }
        TableBackend::Postgres => {
            let pool = DbPool::new(settings)?;
            pool.check().await?;

            let table = PostgresProductTable::new(pool, &settings.name)?;
            table.ensure_schema().await?;
            info!(table = %settings.name, "Using PostgreSQL product table");
            Ok(Arc::new(table))
        }
        TableBackend::Memory => {
            info!("Using in-memory product table");
            Ok(Arc::new(MemoryProductTable::new()))
        }
    }
}
