//! Configuration module for the catalog service

use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};
use std::path::PathBuf;

/// Main application settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub aws: AwsSettings,
    pub storage: StorageSettings,
    pub table: TableSettings,
    pub logging: LoggingSettings,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    /// Upper bound on request bodies (base64 images travel inline)
    pub max_body_bytes: usize,
}

/// Shared AWS client configuration
///
/// Static credentials are optional; without them the default provider chain
/// (environment, profile, instance role) is used.
#[derive(Debug, Clone, Deserialize)]
pub struct AwsSettings {
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

/// Which object store holds product images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Memory,
}

/// Object store configuration for product images
///
/// `endpoint_url` points the client at an S3-compatible service (MinIO, R2,
/// LocalStack) and switches to path-style addressing.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub bucket: String,
    pub endpoint_url: Option<String>,
    pub public_url_prefix: Option<String>,
}

/// Which key-value table holds product records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableBackend {
    DynamoDb,
    Postgres,
    Memory,
}

/// Product table configuration
///
/// `pool_size` and `connect_timeout_secs` only apply to the postgres backend.
#[derive(Debug, Clone, Deserialize)]
pub struct TableSettings {
    pub backend: TableBackend,
    pub name: String,
    pub endpoint_url: Option<String>,
    pub database_url: Option<String>,
    pub pool_size: usize,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub filter: String,
    pub json: bool,
}

impl Settings {
    /// Load configuration from files and environment variables
    ///
    /// Configuration priority (highest to lowest):
    /// 1. `BUCKET_NAME` / `TABLE_NAME`
    /// 2. Environment variables (prefixed with CATALOG_)
    /// 3. config/local.toml (gitignored)
    /// 4. config/default.toml
    /// 5. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let config_dir = std::env::var("CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"));

        let builder = Self::with_defaults(Config::builder())?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // CATALOG_SERVER__PORT, CATALOG_TABLE__BACKEND, etc.
            .add_source(
                Environment::with_prefix("CATALOG")
                    .separator("__")
                    .try_parsing(true)
            )
            .set_override_option("storage.bucket", std::env::var("BUCKET_NAME").ok())?
            .set_override_option("table.name", std::env::var("TABLE_NAME").ok())?;

        builder.build()?.try_deserialize()
    }

    fn with_defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        let defaults = Settings::default();

        builder
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", defaults.server.port as i64)?
            .set_default("server.max_body_bytes", defaults.server.max_body_bytes as i64)?
            .set_default("aws.region", defaults.aws.region)?
            .set_default("storage.backend", "s3")?
            .set_default("storage.bucket", defaults.storage.bucket)?
            .set_default("table.backend", "dynamodb")?
            .set_default("table.name", defaults.table.name)?
            .set_default("table.pool_size", defaults.table.pool_size as i64)?
            .set_default("table.connect_timeout_secs", defaults.table.connect_timeout_secs as i64)?
            .set_default("logging.filter", defaults.logging.filter)?
            .set_default("logging.json", defaults.logging.json)
    }

    /// Number of actix workers, two per CPU unless configured
    pub fn worker_count(&self) -> usize {
        self.server.workers.unwrap_or_else(|| num_cpus::get() * 2)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            server: ServerSettings {
                host: "0.0.0.0".to_string(),
                port: 8080,
                workers: None,
                max_body_bytes: 10 * 1024 * 1024,
            },
            aws: AwsSettings {
                region: "us-east-1".to_string(),
                access_key_id: None,
                secret_access_key: None,
            },
            storage: StorageSettings {
                backend: StorageBackend::S3,
                bucket: "product-images".to_string(),
                endpoint_url: None,
                public_url_prefix: None,
            },
            table: TableSettings {
                backend: TableBackend::DynamoDb,
                name: "products".to_string(),
                endpoint_url: None,
                database_url: None,
                pool_size: 16,
                connect_timeout_secs: 5,
            },
            logging: LoggingSettings {
                filter: "product_catalog=info,actix_web=info".to_string(),
                json: true,
            },
        }
    }
}
