// Storage layer (S3-compatible)

use async_trait::async_trait;

use crate::types::ObjectRef;

pub mod memory;
pub mod s3_client;

pub use memory::MemoryStore;
pub use s3_client::S3Store;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Credentials error: {0}")]
    Credentials(String),

    #[error("Invalid region: {0}")]
    Region(String),

    #[error("S3 request for {object} failed: {message}")]
    S3 { object: ObjectRef, message: String },

    #[error("Object not found: {0}")]
    NotFound(ObjectRef),
}

/// Byte-level access to a key-addressed object store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get_object(&self, object: &ObjectRef) -> Result<Vec<u8>, StorageError>;

    /// Writes `data` at `object`, replacing anything already stored there.
    async fn put_object(
        &self,
        object: &ObjectRef,
        data: &[u8],
        content_type: &str,
    ) -> Result<(), StorageError>;
}
