use crate::error::StorageError;
use crate::key::StorageKey;
use std::future::Future;

/// The persisted key-value surface.
///
/// Implementations must tolerate concurrent callers. `remove` on a missing key
/// succeeds, and `get` on a missing key yields `Ok(None)`.
pub trait KeyValueStore: Send + Sync + 'static {
    /// Reads the value stored under `key`.
    fn get(
        &self,
        key: &StorageKey,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, StorageError>> + Send;

    /// Replaces the value stored under `key`.
    fn put(
        &self,
        key: &StorageKey,
        value: &[u8],
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Deletes the value stored under `key`.
    fn remove(&self, key: &StorageKey) -> impl Future<Output = Result<(), StorageError>> + Send;
}
