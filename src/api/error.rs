//! Conversion of catalog failures into HTTP responses
//!
//! Every failure reaching the HTTP layer is turned into a response here, once.
//! Only a fixed message is returned to the caller; details go to the log.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use std::error::Error as StdError;
use tracing::{error, info};

use crate::api::handlers::products::MessageResponse;
use crate::catalog::CatalogError;

pub const NOT_FOUND_MESSAGE: &str = "Product not found";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method Not Allowed";

impl ResponseError for CatalogError {
    fn status_code(&self) -> StatusCode {
        match self {
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            CatalogError::NotFound(product_id) => {
                info!(product_id = %product_id, "Product not found");
                NOT_FOUND_MESSAGE
            }
            _ => {
                error!(
                    error = %error_chain(self),
                    inconsistency = ?self.inconsistency(),
                    "Request failed"
                );
                INTERNAL_ERROR_MESSAGE
            }
        };

        HttpResponse::build(self.status_code()).json(MessageResponse::new(message))
    }
}

/// Render an error followed by its sources
fn error_chain(err: &dyn StdError) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();

    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }

    rendered
}
