//! Shared AWS SDK configuration
//!
//! Loaded once at startup and handed to both the S3 and DynamoDB clients.

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_s3::config::Credentials;
use tracing::{debug, warn};

use crate::config::AwsSettings;

/// Resolve region and credentials into an `SdkConfig`
pub async fn load_sdk_config(settings: &AwsSettings) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(settings.region.clone()));

    match (&settings.access_key_id, &settings.secret_access_key) {
        (Some(access_key_id), Some(secret_access_key)) => {
            debug!(region = %settings.region, "Using static AWS credentials");
            loader = loader.credentials_provider(Credentials::new(
                access_key_id,
                secret_access_key,
                None, // session token
                None, // expiry
                "catalog-static-credentials",
            ));
        }
        (Some(_), None) | (None, Some(_)) => {
            warn!("Only one of aws.access_key_id / aws.secret_access_key is set, using the default credential chain");
        }
        (None, None) => {
            debug!(region = %settings.region, "Using default AWS credential chain");
        }
    }

    loader.load().await
}
