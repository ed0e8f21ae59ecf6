//! API module - HTTP routes and handlers

pub mod error;
pub mod handlers;
pub mod openapi;

use actix_web::{error::JsonPayloadError, web, HttpRequest};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::openapi::ApiDoc;
use crate::catalog::CatalogError;

/// Configure all API routes
///
/// Any method or path not listed here answers 405.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/products")
            .route(web::get().to(handlers::products::list_products))
            .route(web::post().to(handlers::products::add_product))
            .default_service(web::to(handlers::products::method_not_allowed))
    )
    .service(
        web::resource("/products/{product_id}")
            .route(web::delete().to(handlers::products::delete_product))
            .default_service(web::to(handlers::products::method_not_allowed))
    )
    .route("/health", web::get().to(handlers::health::health_check))
    // Swagger UI and OpenAPI spec
    .service(
        SwaggerUi::new("/swagger-ui/{_:.*}")
            .url("/api-docs/openapi.json", ApiDoc::openapi())
    )
    .default_service(web::to(handlers::products::method_not_allowed));
}

/// JSON body settings for product payloads.
///
/// Bodies are parsed regardless of their declared content type, and any
/// parse failure is reported like every other internal failure.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .content_type_required(false)
        .error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
            CatalogError::InvalidPayload(err.to_string()).into()
        })
}
