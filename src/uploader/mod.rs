//! Uploader stage
//!
//! Copies a local image into the store under a timestamped key. The new
//! object is what the store's notification hands to the dispatcher.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::info;

use crate::keys::timestamped_key;
use crate::storage::ObjectStore;
use crate::types::ObjectRef;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Upload `local_path` to `bucket` under `prefix`, stamped with the current UTC time.
pub async fn upload_file_with_timestamp(
    store: &dyn ObjectStore,
    local_path: &Path,
    bucket: &str,
    prefix: &str,
) -> Result<ObjectRef> {
    upload_file_at(store, local_path, bucket, prefix, Utc::now()).await
}

/// Same as [`upload_file_with_timestamp`] with an explicit timestamp.
pub async fn upload_file_at(
    store: &dyn ObjectStore,
    local_path: &Path,
    bucket: &str,
    prefix: &str,
    now: DateTime<Utc>,
) -> Result<ObjectRef> {
    let key = timestamped_key(local_path, prefix, now)?;
    let data = tokio::fs::read(local_path)
        .await
        .with_context(|| format!("Failed to read {}", local_path.display()))?;
    let content_type = mime_guess::from_path(local_path)
        .first_raw()
        .unwrap_or(FALLBACK_CONTENT_TYPE);

    let target = ObjectRef::new(bucket, key);
    store.put_object(&target, &data, content_type).await?;

    info!("Uploaded to {}", target);
    Ok(target)
}
