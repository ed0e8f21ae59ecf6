//! Catalog error types

use thiserror::Error;

use super::saga::{Inconsistency, SagaError};
use crate::db::TableError;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Product not found: {0}")]
    NotFound(String),

    #[error("Invalid product payload: {0}")]
    InvalidPayload(String),

    #[error("Invalid image content: {0}")]
    ImageDecode(#[from] base64::DecodeError),

    #[error("Product table error: {0}")]
    Table(#[from] TableError),

    #[error(transparent)]
    Saga(#[from] SagaError),
}

impl CatalogError {
    /// Inconsistency left across the two stores, if the failure produced one
    pub fn inconsistency(&self) -> Option<&Inconsistency> {
        match self {
            CatalogError::Saga(err) => err.inconsistency.as_ref(),
            _ => None,
        }
    }
}
