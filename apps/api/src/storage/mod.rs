use anyhow::{bail, Context};
use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::Url;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::Config;

/// Location of an uploaded object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub public_url: String,
    /// Key inside the bucket; the handle used for deletion.
    pub storage_path: String,
    pub size: i64,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload of {key} failed: {message}")]
    Upload { key: String, message: String },

    #[error("Download of {key} failed: {message}")]
    Download { key: String, message: String },

    #[error("Delete of {key} failed: {message}")]
    Delete { key: String, message: String },
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<StoredObject, StorageError>;

    async fn get(&self, storage_path: &str) -> Result<Bytes, StorageError>;

    /// Deleting a key that does not exist succeeds.
    async fn delete(&self, storage_path: &str) -> Result<(), StorageError>;
}

/// Object key for a candidate's upload: `resumes/{candidate}/{unix_millis}_{file_name}`.
///
/// Uniqueness rests on the millisecond timestamp; two uploads of the same
/// file name by one candidate within the same millisecond share a key.
pub fn object_key(candidate_id: Uuid, file_name: &str, at: DateTime<Utc>) -> String {
    let safe_name: String = file_name
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    format!(
        "resumes/{}/{}_{}",
        candidate_id,
        at.timestamp_millis(),
        safe_name
    )
}

/// S3 / MinIO backed object store for a single bucket.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: S3Client,
    bucket: String,
    public_base_url: Url,
}

impl S3ObjectStore {
    pub fn new(client: S3Client, bucket: String, public_base_url: Url) -> Self {
        Self {
            client,
            bucket,
            public_base_url,
        }
    }

    /// Constructs a client configured for MinIO (local) or AWS (production).
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let public_base_url = Url::parse(&config.s3_public_url)
            .with_context(|| format!("S3 public URL '{}' is invalid", config.s3_public_url))?;
        if public_base_url.cannot_be_a_base() {
            bail!("S3 public URL '{}' cannot carry a path", config.s3_public_url);
        }

        let credentials = Credentials::new(
            &config.aws_access_key_id,
            &config.aws_secret_access_key,
            None,
            None,
            "resume-api-static",
        );

        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.s3_region.clone()))
            .credentials_provider(credentials)
            .endpoint_url(&config.s3_endpoint)
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();

        info!("S3 client initialized (bucket: {})", config.s3_bucket);
        Ok(Self::new(
            S3Client::from_conf(s3_config),
            config.s3_bucket.clone(),
            public_base_url,
        ))
    }

    pub fn public_url(&self, key: &str) -> String {
        public_url(&self.public_base_url, &self.bucket, key)
    }
}

/// `{base}/{bucket}/{key}` with every path segment percent-encoded, so names
/// containing `#`, `?` or spaces stay inside the path.
fn public_url(base: &Url, bucket: &str, key: &str) -> String {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(bucket).extend(key.split('/'));
    }
    url.to_string()
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        let size = data.len() as i64;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::Upload {
                key: key.to_string(),
                message: format!("{e:?}"),
            })?;

        info!("Uploaded {size} bytes to s3://{}/{}", self.bucket, key);

        Ok(StoredObject {
            public_url: self.public_url(key),
            storage_path: key.to_string(),
            size,
        })
    }

    async fn get(&self, storage_path: &str) -> Result<Bytes, StorageError> {
        let download_error = |message: String| StorageError::Download {
            key: storage_path.to_string(),
            message,
        };
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(storage_path)
            .send()
            .await
            .map_err(|e| download_error(format!("{e:?}")))?;
        let data = output
            .body
            .collect()
            .await
            .map_err(|e| download_error(e.to_string()))?;
        Ok(data.into_bytes())
    }

    async fn delete(&self, storage_path: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(storage_path)
            .send()
            .await
            .map_err(|e| StorageError::Delete {
                key: storage_path.to_string(),
                message: format!("{e:?}"),
            })?;
        debug!("Deleted s3://{}/{}", self.bucket, storage_path);
        Ok(())
    }
}
