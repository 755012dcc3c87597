use crate::engine::{Compression, FileStore, FileStoreInner};
use crate::error::{StorageError, StorageErrorExt};
use private::Sealed;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use tokio::fs;
use tracing::info;

#[derive(Debug, Clone)]
struct FileStoreConfig {
    compression: Compression,
    create: bool,
}

impl Default for FileStoreConfig {
    fn default() -> Self {
        Self { compression: Compression::None, create: true }
    }
}

#[derive(Debug, Default)]
pub struct NoRoot;
#[derive(Debug)]
pub struct WithRoot(PathBuf);

mod private {
    pub(super) trait Sealed {}
}
impl Sealed for NoRoot {}
impl Sealed for WithRoot {}

#[allow(private_bounds)]
#[derive(Debug, Default)]
pub struct FileStoreBuilder<S: Sealed = NoRoot> {
    state: S,
    config: FileStoreConfig,
}

#[allow(private_bounds)]
impl<S: Sealed> FileStoreBuilder<S> {
    #[must_use = "Sets compression for stored values"]
    pub const fn compression(mut self, compression: Compression) -> Self {
        self.config.compression = compression;
        self
    }

    #[must_use = "Sets whether the root directory should be created if it does not exist"]
    pub const fn create(mut self, enable: bool) -> Self {
        self.config.create = enable;
        self
    }

    fn transition<N: Sealed>(self, state: N) -> FileStoreBuilder<N> {
        FileStoreBuilder { state, config: self.config }
    }
}

impl FileStoreBuilder<NoRoot> {
    #[must_use = "Creates a new store builder with default configuration"]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "Sets the root directory of the store"]
    pub fn root(self, path: impl Into<PathBuf>) -> FileStoreBuilder<WithRoot> {
        self.transition(WithRoot(path.into()))
    }
}

impl FileStoreBuilder<WithRoot> {
    /// Consumes the configuration and opens the store.
    ///
    /// The root is created when `create(true)` is set (the default), canonicalized,
    /// and swept for temporary files orphaned by interrupted writes. A failed sweep
    /// is logged and does not abort initialization.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::DirectoryNotFound`] if the root does not exist and `create`
    /// is false, or [`StorageError::Io`] if it cannot be created or resolved.
    pub async fn connect(self) -> Result<FileStore, StorageError> {
        let root = &self.state.0;

        if self.config.create {
            fs::create_dir_all(root)
                .await
                .context(format!("Failed to bootstrap store root: {}", root.display()))?;
            info!(path = %root.display(), "Bootstrapped store root directory");
        } else if !fs::try_exists(root).await.unwrap_or(false) {
            return Err(StorageError::DirectoryNotFound {
                message: root.display().to_string().into(),
                context: Some("Store root is missing and creation is disabled".into()),
            });
        }

        let canonical = fs::canonicalize(root)
            .await
            .context(format!("Failed to resolve store root: {}", root.display()))?;

        let store = FileStore {
            inner: Arc::new(FileStoreInner {
                root: canonical,
                compression: self.config.compression,
                tmp_counter: AtomicU64::new(1),
            }),
        };

        store.purge_tmp().await;

        Ok(store)
    }
}
