// S3 client backed by rust-s3

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, Region};
use tracing::debug;

use super::{ObjectStore, StorageError};
use crate::config::StorageConfig;
use crate::types::ObjectRef;

/// Object store talking to S3 (or an S3-compatible endpoint).
///
/// Bucket handles are cheap and created per request, so one store serves
/// any bucket named in an [`ObjectRef`].
pub struct S3Store {
    region: Region,
    credentials: Credentials,
    path_style: bool,
}

impl S3Store {
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        let region = match &config.endpoint {
            Some(endpoint) => Region::Custom {
                region: config.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => config
                .region
                .parse::<Region>()
                .map_err(|e| StorageError::Region(format!("{}: {}", config.region, e)))?,
        };

        let credentials = match (&config.access_key_id, &config.secret_access_key) {
            (Some(access_key), Some(secret_key)) => {
                Credentials::new(
                    Some(access_key.as_str()),
                    Some(secret_key.as_str()),
                    None,
                    None,
                    None,
                )
            }
            _ => Credentials::default(),
        }
        .map_err(|e| StorageError::Credentials(e.to_string()))?;

        Ok(Self {
            region,
            credentials,
            // Custom endpoints (MinIO, localstack) rarely support virtual-host addressing
            path_style: config.endpoint.is_some(),
        })
    }

    fn bucket(&self, object: &ObjectRef) -> Result<Bucket, StorageError> {
        let bucket = Bucket::new(&object.bucket, self.region.clone(), self.credentials.clone())
            .map_err(|e| request_error(object, e))?;
        Ok(if self.path_style {
            bucket.with_path_style()
        } else {
            bucket
        })
    }
}

fn request_error(object: &ObjectRef, err: s3::error::S3Error) -> StorageError {
    StorageError::S3 {
        object: object.clone(),
        message: err.to_string(),
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn get_object(&self, object: &ObjectRef) -> Result<Vec<u8>, StorageError> {
        let bucket = self.bucket(object)?;
        let response = bucket
            .get_object(&object.key)
            .await
            .map_err(|e| request_error(object, e))?;
        debug!("GET {} -> {} bytes", object, response.bytes().len());
        Ok(response.bytes().to_vec())
    }

    async fn put_object(
        &self,
        object: &ObjectRef,
        data: &[u8],
        content_type: &str,
    ) -> Result<(), StorageError> {
        let bucket = self.bucket(object)?;
        let response = bucket
            .put_object_with_content_type(&object.key, data, content_type)
            .await
            .map_err(|e| request_error(object, e))?;
        debug!("PUT {} ({} bytes) -> status {}", object, data.len(), response.status_code());
        Ok(())
    }
}
