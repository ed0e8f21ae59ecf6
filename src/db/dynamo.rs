//! DynamoDB product table
//!
//! Items carry the record fields under their camelCase names, with
//! `productId` as the partition key and `productPrice` stored as a number.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_dynamodb::{
    config::Builder,
    error::DisplayErrorContext,
    types::AttributeValue,
    Client as DynamoClient,
};
use std::collections::HashMap;
use tracing::{debug, instrument};

use super::{ProductTable, TableError};
use crate::config::TableSettings;
use crate::domain::Product;

pub const PARTITION_KEY: &str = "productId";

type Item = HashMap<String, AttributeValue>;

/// Product table backed by a DynamoDB table
#[derive(Clone)]
pub struct DynamoProductTable {
    client: DynamoClient,
    table: String,
}

impl DynamoProductTable {
    pub fn new(settings: &TableSettings, sdk_config: &SdkConfig) -> Result<Self, TableError> {
        if settings.name.trim().is_empty() {
            return Err(TableError::Config("table.name is empty".to_string()));
        }

        let mut builder = Builder::from(sdk_config);
        if let Some(endpoint) = &settings.endpoint_url {
            debug!("Creating DynamoDB client with endpoint: {}", endpoint);
            builder = builder.endpoint_url(endpoint);
        }

        Ok(Self {
            client: DynamoClient::from_conf(builder.build()),
            table: settings.name.clone(),
        })
    }

    fn key(product_id: &str) -> Item {
        HashMap::from([(PARTITION_KEY.to_string(), AttributeValue::S(product_id.to_string()))])
    }
}

#[async_trait]
impl ProductTable for DynamoProductTable {
    #[instrument(skip(self), fields(table = %self.table))]
    async fn scan(&self) -> Result<Vec<Product>, TableError> {
        let mut products = Vec::new();
        let mut start_key: Option<Item> = None;
        let mut pages = 0usize;

        // A single Scan call stops at 1 MB; follow LastEvaluatedKey to the end
        loop {
            let output = self.client
                .scan()
                .table_name(&self.table)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| TableError::Dynamo {
                    operation: "Scan",
                    message: DisplayErrorContext(&e).to_string(),
                })?;

            pages += 1;
            for item in output.items.unwrap_or_default() {
                products.push(product_from_item(&item)?);
            }

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        debug!(pages, count = products.len(), "Scanned products");
        Ok(products)
    }

    #[instrument(skip(self), fields(table = %self.table))]
    async fn get(&self, product_id: &str) -> Result<Option<Product>, TableError> {
        let output = self.client
            .get_item()
            .table_name(&self.table)
            .set_key(Some(Self::key(product_id)))
            .send()
            .await
            .map_err(|e| TableError::Dynamo {
                operation: "GetItem",
                message: DisplayErrorContext(&e).to_string(),
            })?;

        output.item.as_ref().map(product_from_item).transpose()
    }

    #[instrument(skip(self, product), fields(table = %self.table, product_id = %product.product_id))]
    async fn put(&self, product: &Product) -> Result<(), TableError> {
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(item_from_product(product)))
            .send()
            .await
            .map_err(|e| TableError::Dynamo {
                operation: "PutItem",
                message: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(())
    }

    #[instrument(skip(self), fields(table = %self.table))]
    async fn delete(&self, product_id: &str) -> Result<(), TableError> {
        self.client
            .delete_item()
            .table_name(&self.table)
            .set_key(Some(Self::key(product_id)))
            .send()
            .await
            .map_err(|e| TableError::Dynamo {
                operation: "DeleteItem",
                message: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(())
    }
}

fn item_from_product(product: &Product) -> Item {
    let mut item = HashMap::from([
        (PARTITION_KEY.to_string(), AttributeValue::S(product.product_id.clone())),
        ("productName".to_string(), AttributeValue::S(product.product_name.clone())),
        ("productDescription".to_string(), AttributeValue::S(product.product_description.clone())),
        ("productPrice".to_string(), AttributeValue::N(product.product_price.to_string())),
        ("productImageUrl".to_string(), AttributeValue::S(product.product_image_url.clone())),
    ]);

    if let Some(name) = &product.product_image_name {
        item.insert("productImageName".to_string(), AttributeValue::S(name.clone()));
    }

    item
}

fn product_from_item(item: &Item) -> Result<Product, TableError> {
    let product_id = string_attr(item, PARTITION_KEY)
        .ok_or_else(|| TableError::Malformed(format!("item without {}", PARTITION_KEY)))?;

    let product_price = match item.get("productPrice") {
        Some(AttributeValue::N(n)) | Some(AttributeValue::S(n)) => n.parse::<f64>().map_err(|_| {
            TableError::Malformed(format!("product {} has non-numeric price {:?}", product_id, n))
        })?,
        _ => 0.0,
    };

    Ok(Product {
        product_name: string_attr(item, "productName").unwrap_or_default(),
        product_description: string_attr(item, "productDescription").unwrap_or_default(),
        product_price,
        product_image_url: string_attr(item, "productImageUrl").unwrap_or_default(),
        product_image_name: string_attr(item, "productImageName"),
        product_id,
    })
}

fn string_attr(item: &Item, name: &str) -> Option<String> {
    item.get(name).and_then(|v| v.as_s().ok()).cloned()
}
