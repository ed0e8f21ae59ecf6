//! S3 object store client for product images
//!
//! Works against AWS S3 and any S3-compatible service (MinIO, R2, LocalStack)
//! through `storage.endpoint_url`.
//!
//! ## Bucket Layout
//! ```text
//! {bucket}/
//! └── products/
//!     └── {product_id}/
//!         └── {image_name}
//! ```

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::{
    config::Builder,
    error::DisplayErrorContext,
    primitives::ByteStream,
    Client as S3Client,
};
use bytes::Bytes;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::{debug, info, instrument};

use super::{ObjectStore, ObjectStoreError, StoredObject};
use crate::config::StorageSettings;

/// Characters left as-is in a key segment of an object URL
const KEY_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// S3 client bound to the product image bucket
#[derive(Clone)]
pub struct S3ObjectStore {
    client: S3Client,
    bucket: String,
    region: String,
    endpoint_url: Option<String>,
    public_url_prefix: Option<String>,
}

impl S3ObjectStore {
    /// Create a new S3 client from settings
    pub fn new(settings: &StorageSettings, sdk_config: &SdkConfig) -> Result<Self, ObjectStoreError> {
        if settings.bucket.trim().is_empty() {
            return Err(ObjectStoreError::NotConfigured("storage.bucket is empty".to_string()));
        }

        let region = sdk_config
            .region()
            .map(|r| r.as_ref().to_string())
            .unwrap_or_else(|| "us-east-1".to_string());

        let mut builder = Builder::from(sdk_config);
        if let Some(endpoint) = &settings.endpoint_url {
            debug!("Creating S3 client with endpoint: {}", endpoint);
            // S3-compatible services generally need path-style addressing
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Ok(Self {
            client: S3Client::from_conf(builder.build()),
            bucket: settings.bucket.clone(),
            region,
            endpoint_url: settings.endpoint_url.clone(),
            public_url_prefix: settings.public_url_prefix.clone(),
        })
    }

    /// Location reported for an uploaded object
    pub fn location(&self, key: &str) -> String {
        object_location(
            self.public_url_prefix.as_deref(),
            self.endpoint_url.as_deref(),
            &self.bucket,
            &self.region,
            key,
        )
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    #[instrument(skip(self, data), fields(bucket = %self.bucket, size = data.len()))]
    async fn upload(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<StoredObject, ObjectStoreError> {
        let size = data.len() as u64;

        debug!("Uploading {} bytes to S3: {}", size, key);

        let result = self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| ObjectStoreError::UploadFailed(DisplayErrorContext(&e).to_string()))?;

        info!("Uploaded to S3: {} ({} bytes)", key, size);

        Ok(StoredObject {
            key: key.to_string(),
            size,
            etag: result.e_tag().map(String::from),
            location: self.location(key),
        })
    }

    #[instrument(skip(self), fields(bucket = %self.bucket))]
    async fn download(&self, key: &str) -> Result<Bytes, ObjectStoreError> {
        debug!("Downloading from S3: {}", key);

        let result = self.client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let context = DisplayErrorContext(&e).to_string();
                match e.into_service_error() {
                    err if err.is_no_such_key() => ObjectStoreError::NotFound(key.to_string()),
                    _ => ObjectStoreError::DownloadFailed(context),
                }
            })?;

        let data = result.body
            .collect()
            .await
            .map_err(|e| ObjectStoreError::DownloadFailed(format!("Failed to read body: {:?}", e)))?
            .into_bytes();

        debug!("Downloaded {} bytes from S3: {}", data.len(), key);

        Ok(data)
    }

    #[instrument(skip(self), fields(bucket = %self.bucket))]
    async fn delete(&self, key: &str) -> Result<(), ObjectStoreError> {
        debug!("Deleting from S3: {}", key);

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| ObjectStoreError::DeleteFailed(DisplayErrorContext(&e).to_string()))?;

        info!("Deleted from S3: {}", key);
        Ok(())
    }
}

/// Build the URL an object is reachable at.
///
/// A configured public prefix wins, then a custom endpoint (path-style), then
/// the regional virtual-hosted AWS URL.
fn object_location(
    public_url_prefix: Option<&str>,
    endpoint_url: Option<&str>,
    bucket: &str,
    region: &str,
    key: &str,
) -> String {
    let encoded = encode_key(key);

    if let Some(prefix) = public_url_prefix {
        return format!("{}/{}", prefix.trim_end_matches('/'), encoded);
    }

    if let Some(endpoint) = endpoint_url {
        return format!("{}/{}/{}", endpoint.trim_end_matches('/'), bucket, encoded);
    }

    format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, encoded)
}

/// Percent-encode each segment of a key, keeping the separators
fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| utf8_percent_encode(segment, KEY_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}
