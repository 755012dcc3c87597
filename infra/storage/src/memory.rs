use crate::error::StorageError;
use crate::key::StorageKey;
use crate::store::KeyValueStore;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::trace;

/// A process-local store backed by a hash map.
///
/// Clones share the same map, which lets a test keep a handle and inspect what
/// the code under test persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<FxHashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, key: &StorageKey) -> bool {
        self.entries.read().contains_key(key.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &StorageKey) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.entries.read().get(key.as_str()).cloned())
    }

    async fn put(&self, key: &StorageKey, value: &[u8]) -> Result<(), StorageError> {
        self.entries.write().insert(key.as_str().to_owned(), value.to_vec());
        trace!(key = %key, bytes = value.len(), "Value stored in memory");
        Ok(())
    }

    async fn remove(&self, key: &StorageKey) -> Result<(), StorageError> {
        self.entries.write().remove(key.as_str());
        Ok(())
    }
}
