//! PostgreSQL product table

use async_trait::async_trait;
use tokio_postgres::Row;
use tracing::{debug, info, instrument};

use super::pool::DbPool;
use super::{ProductTable, TableError};
use crate::domain::Product;

const COLUMNS: &str = "product_id, product_name, product_description, product_price, \
                       product_image_url, product_image_name";

/// SQL for one product table, rendered once for its validated name
#[derive(Debug, Clone)]
struct Statements {
    create: String,
    scan: String,
    get: String,
    upsert: String,
    delete: String,
}

impl Statements {
    fn for_table(table: &str) -> Self {
        Statements {
            create: format!(
                r#"
                CREATE TABLE IF NOT EXISTS {table} (
                    product_id          TEXT PRIMARY KEY,
                    product_name        TEXT NOT NULL,
                    product_description TEXT NOT NULL,
                    product_price       DOUBLE PRECISION NOT NULL,
                    product_image_url   TEXT NOT NULL,
                    product_image_name  TEXT,
                    created_at          TIMESTAMPTZ NOT NULL DEFAULT now()
                )
                "#
            ),
            scan: format!("SELECT {COLUMNS} FROM {table} ORDER BY created_at, product_id"),
            get: format!("SELECT {COLUMNS} FROM {table} WHERE product_id = $1"),
            // created_at is kept on replace so listing order stays stable
            upsert: format!(
                r#"
                INSERT INTO {table} ({COLUMNS})
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (product_id) DO UPDATE SET
                    product_name = EXCLUDED.product_name,
                    product_description = EXCLUDED.product_description,
                    product_price = EXCLUDED.product_price,
                    product_image_url = EXCLUDED.product_image_url,
                    product_image_name = EXCLUDED.product_image_name
                "#
            ),
            delete: format!("DELETE FROM {table} WHERE product_id = $1"),
        }
    }
}

/// Product table stored in a PostgreSQL table keyed by `product_id`
pub struct PostgresProductTable {
    pool: DbPool,
    table: String,
    sql: Statements,
}

impl PostgresProductTable {
    /// Create a repository over `table`. The name is interpolated into SQL,
    /// so only ASCII letters, digits and underscores are accepted.
    pub fn new(pool: DbPool, table: &str) -> Result<Self, TableError> {
        validate_table_name(table)?;
        Ok(PostgresProductTable {
            pool,
            table: table.to_string(),
            sql: Statements::for_table(table),
        })
    }

    /// Create the table if it does not exist yet
    pub async fn ensure_schema(&self) -> Result<(), TableError> {
        let client = self.pool.get().await?;
        client.batch_execute(&self.sql.create).await?;

        info!(table = %self.table, "Product table schema ready");
        Ok(())
    }
}

#[async_trait]
impl ProductTable for PostgresProductTable {
    #[instrument(skip(self), fields(table = %self.table))]
    async fn scan(&self) -> Result<Vec<Product>, TableError> {
        let client = self.pool.get().await?;
        let rows = client.query(self.sql.scan.as_str(), &[]).await?;

        let products = rows.iter().map(product_from_row).collect::<Result<Vec<_>, _>>()?;

        debug!("Scanned {} products", products.len());
        Ok(products)
    }

    #[instrument(skip(self), fields(table = %self.table))]
    async fn get(&self, product_id: &str) -> Result<Option<Product>, TableError> {
        let client = self.pool.get().await?;
        let row = client.query_opt(self.sql.get.as_str(), &[&product_id]).await?;

        row.as_ref().map(product_from_row).transpose()
    }

    #[instrument(skip(self, product), fields(table = %self.table, product_id = %product.product_id))]
    async fn put(&self, product: &Product) -> Result<(), TableError> {
        let client = self.pool.get().await?;

        client.execute(
            self.sql.upsert.as_str(),
            &[
                &product.product_id,
                &product.product_name,
                &product.product_description,
                &product.product_price,
                &product.product_image_url,
                &product.product_image_name,
            ]
        ).await?;

        Ok(())
    }

    #[instrument(skip(self), fields(table = %self.table))]
    async fn delete(&self, product_id: &str) -> Result<(), TableError> {
        let client = self.pool.get().await?;
        let removed = client.execute(self.sql.delete.as_str(), &[&product_id]).await?;

        debug!(removed, "Deleted product row");
        Ok(())
    }
}

fn product_from_row(row: &Row) -> Result<Product, TableError> {
    Ok(Product {
        product_id: row.try_get("product_id")?,
        product_name: row.try_get("product_name")?,
        product_description: row.try_get("product_description")?,
        product_price: row.try_get("product_price")?,
        product_image_url: row.try_get("product_image_url")?,
        product_image_name: row.try_get("product_image_name")?,
    })
}

fn validate_table_name(table: &str) -> Result<(), TableError> {
    let valid = !table.is_empty()
        && !table.starts_with(|c: char| c.is_ascii_digit())
        && table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(TableError::Config(format!("Invalid table name: {:?}", table)))
    }
}
