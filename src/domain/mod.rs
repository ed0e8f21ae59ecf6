//! Domain types and models

pub mod product;

pub use product::{image_key, NewProduct, Product, ProductId};
