//! File-backed key-value engine with atomic replacement and optional LZ4 compression.
//!
//! Every key maps to `<root>/<key>.kv`. Writes go through a unique temporary file that is
//! synced to disk and renamed over the target, so a reader never observes a torn value.

use crate::builder::FileStoreBuilder;
use crate::error::{StorageError, StorageErrorExt};
use crate::key::StorageKey;
use crate::maintenance;
use crate::store::KeyValueStore;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

pub(crate) const TMP_MARKER: &str = ".mkptmp.";
const VALUE_EXTENSION: &str = "kv";

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum Compression {
    #[default]
    None,
    Lz4,
}

impl Compression {
    #[must_use]
    fn compress(self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::None => data.to_vec(),
            Self::Lz4 => lz4_flex::compress_prepend_size(data),
        }
    }

    fn decompress(self, data: Vec<u8>) -> Result<Vec<u8>, StorageError> {
        match self {
            Self::None => Ok(data),
            Self::Lz4 => {
                lz4_flex::decompress_size_prepended(&data).context("Lz4 decompression failed")
            },
        }
    }
}

/// The internal shared state of a [`FileStore`] instance.
#[derive(Debug)]
pub struct FileStoreInner {
    /// The canonicalized physical directory holding every value.
    pub(crate) root: PathBuf,
    pub(crate) compression: Compression,
    /// Source of unique temporary file names.
    pub(crate) tmp_counter: AtomicU64,
}

/// A thread-safe handle to the file-backed store.
///
/// The handle is reference-counted and can be cloned freely across tasks.
///
/// # Example
///
/// ```rust
/// use mkp_storage::{Compression, FileStore, KeyValueStore, StorageError, StorageKey};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), StorageError> {
///     # let tmp = tempfile::tempdir().unwrap();
///     let store = FileStore::builder()
///         .root(tmp.path().join("data"))
///         .compression(Compression::Lz4)
///         .connect()
///         .await?;
///
///     let key = StorageKey::from_static("registration-storage")?;
///     store.put(&key, b"draft").await?;
///     assert_eq!(store.get(&key).await?.as_deref(), Some(&b"draft"[..]));
///
///     store.remove(&key).await?;
///     assert!(store.get(&key).await?.is_none());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileStore {
    pub(crate) inner: Arc<FileStoreInner>,
}

impl Deref for FileStore {
    type Target = FileStoreInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FileStore {
    #[must_use = "The store is not initialized until you call .connect()"]
    pub fn builder() -> FileStoreBuilder {
        FileStoreBuilder::new()
    }

    /// Physical location of the value stored under `key`.
    #[must_use]
    pub fn path_of(&self, key: &StorageKey) -> PathBuf {
        self.root.join(format!("{key}.{VALUE_EXTENSION}"))
    }

    async fn read_value(&self, key: &StorageKey) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.path_of(key);

        let data = match fs::read(&path).await {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(StorageError::Io {
                    source: err,
                    context: Some(format!("Read failed: {}", path.display()).into()),
                });
            },
        };

        self.compression.decompress(data).map(Some)
    }

    async fn write_value(&self, key: &StorageKey, data: &[u8]) -> Result<(), StorageError> {
        let target = self.path_of(key);
        let temp = unique_tmp_path(&target, &self.tmp_counter);
        let encoded = self.compression.compress(data);

        {
            let mut file = fs::OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(&temp)
                .await
                .context(format!("Temp creation failed: {}", temp.display()))?;
            file.write_all(&encoded).await.context("Write failed")?;
            file.sync_all().await.context("Hardware sync failed")?;
        }

        if let Err(err) = fs::rename(&temp, &target).await {
            if err.kind() != std::io::ErrorKind::AlreadyExists {
                let _ = fs::remove_file(&temp).await;
                return Err(StorageError::Io {
                    source: err,
                    context: Some(
                        format!("Atomic swap failed: {} -> {}", temp.display(), target.display())
                            .into(),
                    ),
                });
            }
            fs::remove_file(&target)
                .await
                .context(format!("Failed to replace existing value: {}", target.display()))?;
            fs::rename(&temp, &target).await.context(format!(
                "Atomic swap failed: {} -> {}",
                temp.display(),
                target.display()
            ))?;
        }

        Self::sync_dir(&self.root).await;

        debug!(key = %key, bytes = data.len(), "Value saved atomically");
        Ok(())
    }

    async fn remove_value(&self, key: &StorageKey) -> Result<(), StorageError> {
        let path = self.path_of(key);
        match fs::remove_file(&path).await {
            Ok(()) => debug!(key = %key, "Value removed"),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(key = %key, "Remove skipped, value absent");
            },
            Err(err) => {
                return Err(StorageError::Io {
                    source: err,
                    context: Some(format!("Failed to delete: {}", path.display()).into()),
                });
            },
        }
        Ok(())
    }

    /// Removes temporary files left behind by interrupted writes.
    pub async fn purge_tmp(&self) {
        maintenance::purge_tmp(&self.root).await;
    }

    async fn sync_dir(path: &Path) {
        match fs::File::open(path).await {
            Ok(dir) => {
                if let Err(err) = dir.sync_all().await {
                    warn!(path = %path.display(), error = %err, "Directory sync failed");
                }
            },
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Directory open failed");
            },
        }
    }
}

impl KeyValueStore for FileStore {
    async fn get(&self, key: &StorageKey) -> Result<Option<Vec<u8>>, StorageError> {
        self.read_value(key).await
    }

    async fn put(&self, key: &StorageKey, value: &[u8]) -> Result<(), StorageError> {
        self.write_value(key, value).await
    }

    async fn remove(&self, key: &StorageKey) -> Result<(), StorageError> {
        self.remove_value(key).await
    }
}

fn unique_tmp_path(target: &Path, counter: &AtomicU64) -> PathBuf {
    let counter = counter.fetch_add(1, Ordering::Relaxed);
    let file_name = target.file_name().and_then(|s| s.to_str()).unwrap_or("value");
    target.with_file_name(format!("{file_name}{TMP_MARKER}{counter}"))
}
