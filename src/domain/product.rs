//! Product catalog domain models
//!
//! A product is stored as a record in the product table and an image object in
//! the object store. The record keeps both the location the object store
//! reported at upload time and the image file name used to build its key.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

/// Prefix shared by every product image key
pub const IMAGE_KEY_PREFIX: &str = "products";

/// Standard alphabet, padding optional
const IMAGE_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Product identifier, generated at creation time
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductId(String);

impl ProductId {
    /// Random 128-bit identifier
    pub fn generate() -> Self {
        ProductId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Product record as stored in the product table and returned by listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_id: String,
    pub product_name: String,
    pub product_description: String,
    pub product_price: f64,
    /// Location reported by the object store when the image was uploaded
    pub product_image_url: String,
    /// Image file name; absent on records written before it was stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_image_name: Option<String>,
}

impl Product {
    /// Image file name used to build the object key.
    ///
    /// A stored name is used as is, even when empty. Records that only carry
    /// the URL fall back to its last path segment.
    pub fn image_name(&self) -> Option<String> {
        if let Some(name) = &self.product_image_name {
            return Some(name.clone());
        }

        let path = self.product_image_url.split(['?', '#']).next().unwrap_or_default();
        let segment = path.rsplit('/').next().filter(|s| !s.is_empty())?;

        Some(percent_decode_str(segment).decode_utf8_lossy().into_owned())
    }

    /// Object key of this product's image
    pub fn image_key(&self) -> Option<String> {
        self.image_name().map(|name| image_key(&self.product_id, &name))
    }
}

/// Create-product request body
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image_name: String,
    pub image_content_type: String,
    /// Image content, base64 encoded
    pub image_base64: String,
}

impl NewProduct {
    /// Decode the inline image.
    ///
    /// Accepts an optional `data:<type>;base64,` prefix, embedded ASCII
    /// whitespace and missing padding.
    pub fn decode_image(&self) -> Result<Vec<u8>, base64::DecodeError> {
        let encoded = match self.image_base64.split_once(";base64,") {
            Some((scheme, data)) if scheme.starts_with("data:") => data,
            _ => self.image_base64.as_str(),
        };

        let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        IMAGE_BASE64.decode(compact)
    }

    /// Build the record written once the image is stored
    pub fn into_record(self, product_id: &ProductId, image_url: String) -> Product {
        Product {
            product_id: product_id.as_str().to_string(),
            product_name: self.name,
            product_description: self.description,
            product_price: self.price,
            product_image_url: image_url,
            product_image_name: Some(self.image_name),
        }
    }
}

/// Object key for a product image: `products/<productId>/<imageName>`
pub fn image_key(product_id: &str, image_name: &str) -> String {
    format!("{}/{}/{}", IMAGE_KEY_PREFIX, product_id, image_name)
}
