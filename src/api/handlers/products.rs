//! Product endpoints

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::api::error::METHOD_NOT_ALLOWED_MESSAGE;
use crate::catalog::CatalogError;
use crate::domain::{NewProduct, Product};
use crate::AppState;

/// Body of every message-only response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Response after adding a product
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreatedResponse {
    pub message: String,
    pub product_id: String,
}

/// GET /products - List every product
#[utoipa::path(
    get,
    path = "/products",
    tag = "products",
    responses(
        (status = 200, description = "All product records", body = Vec<Product>),
        (status = 500, description = "Product table unavailable", body = MessageResponse)
    )
)]
pub async fn list_products(state: web::Data<AppState>) -> Result<HttpResponse, CatalogError> {
    let products = state.catalog.list_products().await?;
    Ok(HttpResponse::Ok().json(products))
}

/// POST /products - Add a product with its image
#[utoipa::path(
    post,
    path = "/products",
    tag = "products",
    request_body = NewProduct,
    responses(
        (status = 201, description = "Product added", body = ProductCreatedResponse),
        (status = 500, description = "Payload or storage failure", body = MessageResponse)
    )
)]
pub async fn add_product(
    state: web::Data<AppState>,
    body: web::Json<NewProduct>,
) -> Result<HttpResponse, CatalogError> {
    let product_id = state.catalog.add_product(body.into_inner()).await?;

    Ok(HttpResponse::Created().json(ProductCreatedResponse {
        message: "Product added successfully".to_string(),
        product_id: product_id.into_inner(),
    }))
}

/// DELETE /products/{product_id} - Delete a product and its image
#[utoipa::path(
    delete,
    path = "/products/{product_id}",
    tag = "products",
    params(
        ("product_id" = String, Path, description = "Product identifier")
    ),
    responses(
        (status = 200, description = "Product deleted", body = MessageResponse),
        (status = 404, description = "Product not found", body = MessageResponse),
        (status = 500, description = "Storage failure", body = MessageResponse)
    )
)]
pub async fn delete_product(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, CatalogError> {
    let product_id = path.into_inner();
    state.catalog.delete_product(&product_id).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Product deleted successfully")))
}

/// Fallback for every unrecognized method or path
pub async fn method_not_allowed(req: HttpRequest) -> HttpResponse {
    debug!(method = %req.method(), path = %req.path(), "Unsupported request");
    HttpResponse::MethodNotAllowed().json(MessageResponse::new(METHOD_NOT_ALLOWED_MESSAGE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::{INTERNAL_ERROR_MESSAGE, NOT_FOUND_MESSAGE};
    use crate::config::Settings;
    use crate::test_support::{Call, Harness, PIXEL_PNG};
    use actix_web::http::{header, StatusCode};
    use actix_web::{test, App};
    use serde_json::json;

    fn app_state(harness: &Harness) -> web::Data<AppState> {
        web::Data::new(AppState::new(Settings::default(), harness.catalog()))
    }

    macro_rules! init_app {
        ($harness:expr) => {
            test::init_service(
                App::new()
                    .app_data(app_state(&$harness))
                    .app_data(crate::api::json_config(1024 * 1024))
                    .configure(crate::api::configure_routes),
            )
            .await
        };
    }

    fn widget_body() -> serde_json::Value {
        json!({
            "name": "Widget",
            "description": "A widget",
            "price": 9.99,
            "imageName": "w.png",
            "imageContentType": "image/png",
            "imageBase64": PIXEL_PNG,
        })
    }

    fn assert_json(resp: &actix_web::dev::ServiceResponse) {
        let content_type = resp.headers().get(header::CONTENT_TYPE).unwrap();
        assert_eq!(content_type, "application/json");
    }

    #[actix_rt::test]
    async fn test_widget_lifecycle() {
        let harness = Harness::new();
        let app = init_app!(harness);

        let req = test::TestRequest::post().uri("/products").set_json(widget_body()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_json(&resp);
        let created: ProductCreatedResponse = test::read_body_json(resp).await;
        assert_eq!(created.message, "Product added successfully");
        let id = created.product_id;

        let key = format!("products/{}/w.png", id);
        let image = harness.object_store().download(&key).await.unwrap();
        assert_eq!(image.len(), 70);

        let req = test::TestRequest::get().uri("/products").to_request();
        let listed: Vec<Product> = test::call_and_read_body_json(&app, req).await;
        let widget = listed.iter().find(|p| p.product_id == id).unwrap();
        assert_eq!(widget.product_name, "Widget");
        assert_eq!(widget.product_image_url, format!("memory://images/{}", key));

        let req = test::TestRequest::delete().uri(&format!("/products/{}", id)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let deleted: MessageResponse = test::read_body_json(resp).await;
        assert_eq!(deleted.message, "Product deleted successfully");

        let req = test::TestRequest::get().uri("/products").to_request();
        let listed: Vec<Product> = test::call_and_read_body_json(&app, req).await;
        assert!(listed.iter().all(|p| p.product_id != id));

        let req = test::TestRequest::delete().uri(&format!("/products/{}", id)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: MessageResponse = test::read_body_json(resp).await;
        assert_eq!(body.message, NOT_FOUND_MESSAGE);
    }

    #[actix_rt::test]
    async fn test_unrecognized_requests_are_rejected_without_store_calls() {
        let harness = Harness::new();
        let app = init_app!(harness);

        let requests = vec![
            test::TestRequest::put().uri("/products").set_json(widget_body()).to_request(),
            test::TestRequest::patch().uri("/products/abc").to_request(),
            test::TestRequest::get().uri("/products/abc").to_request(),
            test::TestRequest::delete().uri("/products/abc/extra").to_request(),
            test::TestRequest::get().uri("/orders").to_request(),
        ];

        for req in requests {
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
            assert_json(&resp);
            let body: MessageResponse = test::read_body_json(resp).await;
            assert_eq!(body.message, METHOD_NOT_ALLOWED_MESSAGE);
        }

        assert!(harness.calls().is_empty());
    }

    #[actix_rt::test]
    async fn test_list_failure_returns_fixed_error() {
        let harness = Harness::new();
        harness.fail(Call::Scan);
        let app = init_app!(harness);

        let req = test::TestRequest::get().uri("/products").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_json(&resp);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "message": INTERNAL_ERROR_MESSAGE }));
    }

    #[actix_rt::test]
    async fn test_malformed_body_is_internal_error() {
        let harness = Harness::new();
        let app = init_app!(harness);

        let bodies = vec![
            test::TestRequest::post()
                .uri("/products")
                .insert_header((header::CONTENT_TYPE, "application/json"))
                .set_payload("{not json")
                .to_request(),
            test::TestRequest::post()
                .uri("/products")
                .set_json(json!({ "name": "Widget" }))
                .to_request(),
            test::TestRequest::post()
                .uri("/products")
                .set_json(json!({ "name": "Widget", "description": "", "price": 1,
                    "imageName": "w.png", "imageContentType": "image/png", "imageBase64": "%%%" }))
                .to_request(),
        ];

        for req in bodies {
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
            let body: MessageResponse = test::read_body_json(resp).await;
            assert_eq!(body.message, INTERNAL_ERROR_MESSAGE);
        }

        assert!(harness.calls().is_empty());
        assert!(harness.table.is_empty());
    }

    #[actix_rt::test]
    async fn test_body_without_json_content_type_is_accepted() {
        let harness = Harness::new();
        let app = init_app!(harness);

        let req = test::TestRequest::post()
            .uri("/products")
            .insert_header((header::CONTENT_TYPE, "text/plain"))
            .set_payload(widget_body().to_string())
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(harness.table.len(), 1);
    }

    #[actix_rt::test]
    async fn test_record_write_failure_returns_500_and_keeps_image() {
        let harness = Harness::new();
        harness.fail(Call::Put);
        let app = init_app!(harness);

        let req = test::TestRequest::post().uri("/products").set_json(widget_body()).to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(harness.objects.len(), 1);
        assert!(harness.table.is_empty());
    }
}
