//! OpenAPI 3.0 specification definition

use utoipa::OpenApi;

use crate::api::handlers::{
    health::HealthResponse,
    products::{MessageResponse, ProductCreatedResponse},
};
use crate::domain::{NewProduct, Product};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Product Catalog API",
        version = "1.0.0",
        description = "Product records with images kept in an object store",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "/", description = "Current server")
    ),
    tags(
        (name = "system", description = "System health and status endpoints"),
        (name = "products", description = "Product catalog endpoints")
    ),
    paths(
        crate::api::handlers::health::health_check,
        crate::api::handlers::products::list_products,
        crate::api::handlers::products::add_product,
        crate::api::handlers::products::delete_product,
    ),
    components(
        schemas(
            HealthResponse,
            Product,
            NewProduct,
            MessageResponse,
            ProductCreatedResponse,
        )
    )
)]
pub struct ApiDoc;
