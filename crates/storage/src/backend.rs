use std::path::Path;
use std::sync::Arc;

use object_store::aws::{AmazonS3, AmazonS3Builder, AmazonS3ConfigKey};
use object_store::local::LocalFileSystem;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions};
use tracing::info;

use skillboard_core::config::{AwsConfig, StorageKind};
use skillboard_core::Config;

use crate::error::StorageError;

/// Object store that raw batches are written to, with the key prefix every
/// object lives under.
///
/// Built once per run from config and passed by reference.
pub struct StorageBackend {
    store: Arc<dyn ObjectStore>,
    prefix: String,
    /// `s3://bucket` or the local root directory, for log lines.
    root: String,
    /// The local filesystem store cannot persist object attributes.
    keeps_attributes: bool,
}

impl StorageBackend {
    /// Local directory or S3 bucket, according to `STORAGE_BACKEND`.
    pub fn from_config(config: &Config) -> Result<Self, StorageError> {
        match config.storage.backend {
            StorageKind::Local => Self::local(&config.storage.data_dir),
            StorageKind::S3 => Self::s3(&config.aws),
        }
    }

    /// Store rooted at `data_dir`, created if missing.
    pub fn local(data_dir: &Path) -> Result<Self, StorageError> {
        std::fs::create_dir_all(data_dir)?;
        let root = std::fs::canonicalize(data_dir)?;
        let store = LocalFileSystem::new_with_prefix(&root)
            .map_err(|e| StorageError::Other(format!("local filesystem error: {e}")))?;
        info!(root = %root.display(), "raw batches on local disk");

        Ok(Self {
            store: Arc::new(store),
            prefix: String::new(),
            root: root.display().to_string(),
            keeps_attributes: false,
        })
    }

    pub fn s3(aws: &AwsConfig) -> Result<Self, StorageError> {
        let bucket = aws
            .s3_bucket
            .as_deref()
            .ok_or_else(|| StorageError::NotConfigured("S3_BUCKET not set".into()))?;
        let region = aws
            .region
            .as_deref()
            .ok_or_else(|| StorageError::NotConfigured("AWS_REGION not set".into()))?;

        let store = s3_store(aws, bucket, region)?;
        let prefix = aws.s3_prefix.as_deref().unwrap_or("").trim_matches('/').to_string();
        info!(bucket, prefix = %prefix, region, "raw batches on S3");

        Ok(Self {
            store: Arc::new(store),
            prefix,
            root: format!("s3://{bucket}"),
            keeps_attributes: true,
        })
    }

    #[cfg(test)]
    pub(crate) fn in_memory(prefix: &str) -> Self {
        Self {
            store: Arc::new(object_store::memory::InMemory::new()),
            prefix: prefix.to_string(),
            root: "memory:/".into(),
            keeps_attributes: true,
        }
    }

    pub fn store(&self) -> &dyn ObjectStore {
        self.store.as_ref()
    }

    /// Key prefix every object lives under ("" for none).
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Human-readable location of a key, for logs.
    pub fn describe(&self, key: &str) -> String {
        format!("{}/{}", self.root, key)
    }

    /// Put options for an object of the given media type.
    pub(crate) fn put_options(&self, content_type: &'static str) -> PutOptions {
        let mut attributes = Attributes::new();
        if self.keeps_attributes {
            attributes.insert(Attribute::ContentType, content_type.into());
        }
        PutOptions {
            attributes,
            ..PutOptions::default()
        }
    }
}

fn s3_store(aws: &AwsConfig, bucket: &str, region: &str) -> Result<AmazonS3, StorageError> {
    let mut builder = AmazonS3Builder::new()
        .with_region(region)
        .with_bucket_name(bucket);

    let credentials = [
        (AmazonS3ConfigKey::AccessKeyId, &aws.access_key_id),
        (AmazonS3ConfigKey::SecretAccessKey, &aws.secret_access_key),
        (AmazonS3ConfigKey::Token, &aws.session_token),
    ];
    for (key, value) in credentials {
        if let Some(value) = value {
            builder = builder.with_config(key, value);
        }
    }

    if let Some(endpoint) = aws.endpoint_url.as_deref().filter(|e| !e.is_empty()) {
        let endpoint = absolute_endpoint(endpoint);
        builder = builder
            .with_allow_http(endpoint.starts_with("http://"))
            .with_endpoint(endpoint);
    }

    Ok(builder.build()?)
}

/// object_store only accepts endpoints with a scheme; bare hosts get https.
fn absolute_endpoint(endpoint: &str) -> String {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.to_string()
    } else {
        format!("https://{endpoint}")
    }
}
