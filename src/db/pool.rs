//! PostgreSQL connection pool for the product table

use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime, Timeouts};
use std::time::Duration;
use tokio_postgres::NoTls;
use tracing::info;

use super::TableError;
use crate::config::TableSettings;

/// Pooled connections to the database holding the product table
#[derive(Clone)]
pub struct DbPool {
    pool: Pool,
}

impl DbPool {
    /// Build a pool from `table.database_url`, sized by `table.pool_size`.
    ///
    /// No connection is opened here; use [`DbPool::check`] to verify the
    /// database is reachable.
    pub fn new(settings: &TableSettings) -> Result<Self, TableError> {
        let database_url = settings
            .database_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| TableError::Config("table.database_url is required for postgres".to_string()))?;

        let target = describe_url(database_url)?;

        if settings.pool_size == 0 {
            return Err(TableError::Config("table.pool_size must be at least 1".to_string()));
        }

        let timeout = Duration::from_secs(settings.connect_timeout_secs.max(1));
        let mut timeouts = Timeouts::new();
        timeouts.wait = Some(timeout);
        timeouts.create = Some(timeout);

        let mut pool_config = PoolConfig::new(settings.pool_size);
        pool_config.timeouts = timeouts;

        let mut cfg = Config::new();
        cfg.url = Some(database_url.to_string());
        cfg.pool = Some(pool_config);
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let pool = cfg.create_pool(Some(Runtime::Tokio1), NoTls)?;

        info!(
            target_db = %target,
            pool_size = settings.pool_size,
            timeout_secs = timeout.as_secs(),
            "Product table pool created"
        );

        Ok(DbPool { pool })
    }

    /// Get a connection from the pool
    pub async fn get(&self) -> Result<deadpool_postgres::Object, TableError> {
        Ok(self.pool.get().await?)
    }

    /// Largest number of connections the pool will open
    pub fn max_size(&self) -> usize {
        self.pool.status().max_size
    }

    /// Round-trip a trivial query
    pub async fn check(&self) -> Result<(), TableError> {
        let client = self.get().await?;
        client.query_one("SELECT 1", &[]).await?;
        info!("Product table database reachable");
        Ok(())
    }
}

/// `host:port/dbname` of a postgres URL, without credentials, for logging
fn describe_url(database_url: &str) -> Result<String, TableError> {
    let url = url::Url::parse(database_url)
        .map_err(|e| TableError::Config(format!("Invalid database URL: {}", e)))?;

    if !matches!(url.scheme(), "postgres" | "postgresql") {
        return Err(TableError::Config(format!(
            "Unsupported database URL scheme: {}",
            url.scheme()
        )));
    }

    let host = url
        .host_str()
        .ok_or_else(|| TableError::Config("Missing host in database URL".to_string()))?;

    Ok(format!(
        "{}:{}/{}",
        host,
        url.port().unwrap_or(5432),
        url.path().trim_start_matches('/')
    ))
}
