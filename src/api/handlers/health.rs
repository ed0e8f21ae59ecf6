//! Health check endpoint

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::AppState;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: i64,
    pub storage_backend: String,
    pub table_backend: String,
}

/// GET /health - Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let uptime = (Utc::now() - state.started_at).num_seconds().max(0);

    let response = HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: uptime,
        storage_backend: format!("{:?}", state.settings.storage.backend).to_lowercase(),
        table_backend: format!("{:?}", state.settings.table.backend).to_lowercase(),
    };

    HttpResponse::Ok().json(response)
}
