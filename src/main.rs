//! Product Catalog
//!
//! Lists, adds and deletes products. Product records live in a key-value table
//! (DynamoDB, PostgreSQL or memory); product images live in an object store
//! (S3 or memory).

use actix_web::{web, App, HttpServer, middleware};
use anyhow::Context;
use chrono::{DateTime, Utc};
use tracing::info;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

mod api;
mod aws;
mod catalog;
mod config;
mod db;
mod domain;
mod storage;
#[cfg(test)]
mod test_support;

use crate::catalog::ProductCatalog;
use crate::config::{LoggingSettings, Settings};

/// Application state shared across all handlers
pub struct AppState {
    pub settings: Settings,
    pub catalog: ProductCatalog,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(settings: Settings, catalog: ProductCatalog) -> Self {
        Self { settings, catalog, started_at: Utc::now() }
    }
}

fn init_tracing(logging: &LoggingSettings) {
    // RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.filter));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let settings = Settings::load().context("Failed to load configuration")?;
    init_tracing(&settings.logging);

    let bind_addr = format!("{}:{}", settings.server.host, settings.server.port);

    info!(
        "Starting Product Catalog v{} on {}",
        env!("CARGO_PKG_VERSION"),
        bind_addr
    );

    // Store clients are built once and shared by every worker
    let sdk_config = aws::load_sdk_config(&settings.aws).await;

    let objects = storage::connect(&settings.storage, &sdk_config)
        .context("Failed to initialize object store")?;
    info!(backend = ?settings.storage.backend, bucket = %settings.storage.bucket, "Object store ready");

    let table = db::connect(&settings.table, &sdk_config)
        .await
        .context("Failed to initialize product table")?;

    let max_body_bytes = settings.server.max_body_bytes;
    let workers = settings.worker_count();

    let app_state = web::Data::new(AppState::new(
        settings,
        ProductCatalog::new(objects, table),
    ));

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(api::json_config(max_body_bytes))
            .wrap(TracingLogger::default())
            .wrap(middleware::Compress::default())
            .wrap(
                middleware::DefaultHeaders::new()
                    .add(("X-Service", "product-catalog"))
                    .add(("X-Version", env!("CARGO_PKG_VERSION")))
            )
            .configure(api::configure_routes)
    })
    .workers(workers)
    .bind(&bind_addr)
    .with_context(|| format!("Failed to bind {}", bind_addr))?
    .run()
    .await
    .context("HTTP server terminated with an error")
}
