use std::collections::BTreeSet;

use chrono::NaiveDate;
use futures::TryStreamExt;
use object_store::path::Path as ObjectPath;
use tracing::{error, info};

use skillboard_core::RawPosting;

use crate::backend::StorageBackend;
use crate::error::StorageError;

const RAW_ROOT: &str = "raw";
const BATCH_FILE: &str = "jobs.json";
const DATE_PARTITION: &str = "ingestion_date=";
const BATCH_CONTENT_TYPE: &str = "application/json";

/// Raw posting batches, one JSON array per ingestion date:
/// `[{prefix}/]raw/ingestion_date=YYYY-MM-DD/jobs.json`.
pub struct RawStore;

impl RawStore {
    pub fn raw_key(prefix: &str, date: NaiveDate) -> String {
        let key = format!("{RAW_ROOT}/{DATE_PARTITION}{}/{BATCH_FILE}", date.format("%Y-%m-%d"));
        if prefix.is_empty() {
            key
        } else {
            format!("{prefix}/{key}")
        }
    }

    /// Write a batch, replacing any batch already stored for `date`.
    /// Returns the object key.
    pub async fn write_raw(
        backend: &StorageBackend,
        postings: &[RawPosting],
        date: NaiveDate,
    ) -> Result<String, StorageError> {
        let key = Self::raw_key(backend.prefix(), date);
        info!("Writing {} jobs to {}", postings.len(), backend.describe(&key));

        let body = serde_json::to_vec_pretty(postings)?;
        let path = ObjectPath::from(key.as_str());
        let opts = backend.put_options(BATCH_CONTENT_TYPE);
        if let Err(e) = backend
            .store()
            .put_opts(&path, bytes::Bytes::from(body).into(), opts)
            .await
        {
            error!(key = %key, error = %e, "Failed to write raw batch");
            return Err(e.into());
        }

        info!("Successfully wrote jobs to {}", backend.describe(&key));
        Ok(key)
    }

    /// Read the batch stored for `date`.
    pub async fn read_raw(
        backend: &StorageBackend,
        date: NaiveDate,
    ) -> Result<Vec<RawPosting>, StorageError> {
        let key = Self::raw_key(backend.prefix(), date);
        info!("Reading raw jobs from {}", backend.describe(&key));

        let path = ObjectPath::from(key.as_str());
        let data = match backend.store().get(&path).await {
            Ok(result) => result.bytes().await?,
            Err(object_store::Error::NotFound { .. }) => return Err(StorageError::NotFound(key)),
            Err(e) => return Err(e.into()),
        };

        let postings: Vec<RawPosting> = serde_json::from_slice(&data)?;
        info!(count = postings.len(), "read raw batch");
        Ok(postings)
    }

    /// Ingestion dates that have a stored batch, ascending.
    pub async fn list_ingestion_dates(
        backend: &StorageBackend,
    ) -> Result<Vec<NaiveDate>, StorageError> {
        let root = if backend.prefix().is_empty() {
            RAW_ROOT.to_string()
        } else {
            format!("{}/{RAW_ROOT}", backend.prefix())
        };
        let root_path = ObjectPath::from(root.as_str());

        let mut stream = backend.store().list(Some(&root_path));
        let mut dates = BTreeSet::new();
        while let Some(meta) = stream.try_next().await? {
            if let Some(date) = Self::date_from_key(meta.location.as_ref()) {
                dates.insert(date);
            }
        }
        Ok(dates.into_iter().collect())
    }

    fn date_from_key(key: &str) -> Option<NaiveDate> {
        let dir = key.strip_suffix(&format!("/{BATCH_FILE}"))?;
        let partition = dir.rsplit('/').next()?;
        let date = partition.strip_prefix(DATE_PARTITION)?;
        NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
    }
}
