use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ObjectStore, StorageError};
use crate::types::ObjectRef;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// In-process object store. Clones share the same contents.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<ObjectRef, StoredObject>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, object: ObjectRef, data: Vec<u8>, content_type: &str) {
        let mut guard = self.inner.write().await;
        guard.insert(
            object,
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
    }

    pub async fn get(&self, object: &ObjectRef) -> Option<StoredObject> {
        let guard = self.inner.read().await;
        guard.get(object).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get_object(&self, object: &ObjectRef) -> Result<Vec<u8>, StorageError> {
        self.get(object)
            .await
            .map(|stored| stored.data)
            .ok_or_else(|| StorageError::NotFound(object.clone()))
    }

    async fn put_object(
        &self,
        object: &ObjectRef,
        data: &[u8],
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.insert(object.clone(), data.to_vec(), content_type).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_then_get() {
        let store = MemoryStore::new();
        let obj = ObjectRef::new("bucket", "inputs/a.png");

        store.put_object(&obj, b"png-bytes", "image/png").await.unwrap();

        assert_eq!(store.get_object(&obj).await.unwrap(), b"png-bytes");
        assert_eq!(store.get(&obj).await.unwrap().content_type, "image/png");
    }

    #[tokio::test]
    async fn test_missing_object_is_an_error() {
        let store = MemoryStore::new();
        let result = store.get_object(&ObjectRef::new("bucket", "nope")).await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = MemoryStore::new();
        let obj = ObjectRef::new("bucket", "outputs/a-fft-plot.png");

        store.put_object(&obj, b"first", "image/png").await.unwrap();
        store.put_object(&obj, b"second", "image/png").await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(store.get_object(&obj).await.unwrap(), b"second");
    }
}
