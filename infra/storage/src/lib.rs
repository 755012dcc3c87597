//! Persisted key-value surface for wizard state.
//!
//! The crate exposes the [`KeyValueStore`] trait with two backends:
//!
//! - **[`FileStore`]**: one file per key under a sandboxed root. Writes use an atomic swap
//!   (unique temp write + `fsync` + `rename`), values can be transparently LZ4-compressed, and
//!   temporary files orphaned by crashes are purged on connect.
//! - **[`MemoryStore`]**: a shared in-process map for tests and ephemeral hosts.
//!
//! Keys are validated by [`StorageKey`] so they can never address anything outside the root.
//!
//! # Examples
//!
//! ```rust
//! use mkp_storage::{KeyValueStore, MemoryStore, StorageError, StorageKey};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), StorageError> {
//!     let store = MemoryStore::new();
//!     let key = StorageKey::try_from("session-draft")?;
//!
//!     store.put(&key, b"state").await?;
//!     assert!(store.contains(&key));
//!
//!     store.remove(&key).await?;
//!     store.remove(&key).await?; // removing twice is fine
//!     assert!(store.get(&key).await?.is_none());
//!     Ok(())
//! }
//! ```

mod builder;
mod engine;
mod error;
mod key;
mod maintenance;
mod memory;
mod store;

pub use builder::FileStoreBuilder;
pub use engine::{Compression, FileStore};
pub use error::{StorageError, StorageErrorExt};
pub use key::StorageKey;
pub use memory::MemoryStore;
pub use store::KeyValueStore;
