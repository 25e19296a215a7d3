//! Durable object storage for generated assets.
//!
//! Uploads go to an S3-compatible bucket (path-style addressing, so
//! Tigris/MinIO-style endpoints work); retrieval is via presigned GET URLs
//! with a bounded lifetime.

use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use std::time::Duration;
use tracing::debug;

use crate::config::StorageSettings;
use crate::error::{AppError, Result};

/// Upper bound on any single storage operation; a hung upload becomes an
/// upload failure instead of pinning the request forever.
const OPERATION_TIMEOUT_SECS: u64 = 60;

/// S3-compatible store issuing time-limited retrieval URLs
pub struct ObjectStorage {
    client: aws_sdk_s3::Client,
    bucket: String,
    url_ttl: Duration,
}

impl ObjectStorage {
    pub async fn new(settings: &StorageSettings) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(Duration::from_secs(OPERATION_TIMEOUT_SECS))
                    .build(),
            );
        if let Some(endpoint) = &settings.endpoint {
            loader = loader.endpoint_url(endpoint.clone());
        }
        let sdk_config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();

        Self {
            client: aws_sdk_s3::Client::from_conf(s3_config),
            bucket: settings.bucket.clone(),
            url_ttl: Duration::from_secs(settings.url_ttl_hours * 3600),
        }
    }

    /// Upload an asset and return a presigned retrieval URL
    pub async fn store(&self, bytes: Vec<u8>, object_key: &str) -> Result<String> {
        let size = bytes.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(object_key)
            .content_type("image/png")
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| AppError::Upload(format!("put object {object_key}: {e}")))?;

        debug!(key = %object_key, size, "Uploaded asset to bucket");

        let presigning = PresigningConfig::expires_in(self.url_ttl)
            .map_err(|e| AppError::Upload(format!("presigning config: {e}")))?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(object_key)
            .presigned(presigning)
            .await
            .map_err(|e| AppError::Upload(format!("presign {object_key}: {e}")))?;

        Ok(presigned.uri().to_string())
    }
}
