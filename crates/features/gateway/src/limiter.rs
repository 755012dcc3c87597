use crate::error::{GatewayError, GatewayErrorExt};
use mkp_kernel::domain::config::RateLimitConfig;
use mkp_kernel::domain::constants::NO_EMAIL;
use mkp_kernel::security::signature::ClientSignature;
use mkp_storage::{KeyValueStore, MemoryStore, StorageKey};
use moka::sync::Cache;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use tracing::{trace, warn};

/// Outcome of recording one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { attempt: u32, remaining: u32 },
    Limited { attempts: u32 },
}

impl RateDecision {
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Persisted state of one key's window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Window {
    key: String,
    started_ms: u64,
    count: u32,
}

impl Window {
    fn open(key: &str, now_ms: u64) -> Self {
        Self { key: key.to_owned(), started_ms: now_ms, count: 0 }
    }
}

/// Fixed-window attempt counter.
///
/// The first attempt for a key opens a window of `window` length; the window is not
/// extended by later attempts. Attempts beyond `max_attempts` inside the window are
/// limited. Nothing is ever locked permanently: once the window lapses the key starts over.
///
/// Windows live in a [`KeyValueStore`], so separate processes sharing a store root share
/// their counts. The in-process cache serializes attempts on the same key and answers
/// already exhausted keys without touching the store.
#[derive(Debug, Clone)]
pub struct RateLimiter<S = MemoryStore> {
    store: S,
    front: Cache<String, Arc<Mutex<Option<Window>>>>,
    namespace: Arc<str>,
    max_attempts: u32,
    window: Duration,
}

impl RateLimiter<MemoryStore> {
    /// Limiter whose windows only live as long as the process.
    #[must_use]
    pub fn new(
        namespace: impl Into<Arc<str>>,
        max_attempts: u32,
        window: Duration,
        capacity: u64,
    ) -> Self {
        Self::with_store(MemoryStore::new(), namespace, max_attempts, window, capacity)
    }

    #[must_use]
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::from_config_with_store(MemoryStore::new(), config)
    }
}

impl<S: KeyValueStore> RateLimiter<S> {
    #[must_use]
    pub fn with_store(
        store: S,
        namespace: impl Into<Arc<str>>,
        max_attempts: u32,
        window: Duration,
        capacity: u64,
    ) -> Self {
        Self {
            store,
            front: Cache::builder().max_capacity(capacity).time_to_live(window).build(),
            namespace: namespace.into(),
            max_attempts,
            window,
        }
    }

    #[must_use]
    pub fn from_config_with_store(store: S, config: &RateLimitConfig) -> Self {
        Self::with_store(
            store,
            config.namespace.as_str(),
            config.max_attempts,
            config.window(),
            config.capacity,
        )
    }

    /// Builds `<namespace>:ratelimit:<endpoint>:<signature>:<email|no-email>`.
    #[must_use]
    pub fn key(&self, endpoint: &str, signature: &ClientSignature, email: Option<&str>) -> String {
        let email = email.map(str::trim).filter(|e| !e.is_empty()).unwrap_or(NO_EMAIL);
        format!("{}:ratelimit:{endpoint}:{signature}:{email}", self.namespace)
    }

    /// Records an attempt for `key` and reports whether it may proceed.
    ///
    /// # Errors
    /// Returns [`GatewayError::Storage`] if the window cannot be read or written back.
    pub async fn hit(&self, key: &str) -> Result<RateDecision, GatewayError> {
        let slot = self.front.get_with_by_ref(key, || Arc::new(Mutex::new(None)));
        let mut cached = slot.lock().await;
        let now = now_ms();

        // Counts only grow inside a window, so an exhausted live window stays exhausted.
        if let Some(window) =
            cached.as_mut().filter(|w| self.is_live(w, now) && w.count >= self.max_attempts)
        {
            window.count = window.count.saturating_add(1);
            trace!(key, attempt = window.count, "Rate limit answered from memory");
            return Ok(RateDecision::Limited { attempts: window.count });
        }

        let storage_key = storage_key(key)?;
        let stored = self
            .store
            .get(&storage_key)
            .await
            .context("Failed to read rate-limit window")?
            .and_then(|bytes| decode(&bytes, key));

        let mut window = stored
            .filter(|w| w.key == key && self.is_live(w, now))
            .unwrap_or_else(|| Window::open(key, now));
        window.count = window.count.saturating_add(1);

        let bytes = postcard::to_stdvec(&window).context("Failed to encode rate-limit window")?;
        self.store
            .put(&storage_key, &bytes)
            .await
            .context("Failed to persist rate-limit window")?;

        let attempt = window.count;
        *cached = Some(window);
        trace!(key, attempt, max = self.max_attempts, "Rate limit attempt recorded");

        if attempt > self.max_attempts {
            Ok(RateDecision::Limited { attempts: attempt })
        } else {
            Ok(RateDecision::Allowed { attempt, remaining: self.max_attempts - attempt })
        }
    }

    fn is_live(&self, window: &Window, now_ms: u64) -> bool {
        let elapsed = Duration::from_millis(now_ms.saturating_sub(window.started_ms));
        elapsed < self.window
    }
}

/// Maps a rate-limit key onto the storage alphabet.
fn storage_key(key: &str) -> Result<StorageKey, GatewayError> {
    let key = StorageKey::try_from(format!("ratelimit-{:016x}", fxhash::hash64(key)))?;
    Ok(key)
}

fn decode(bytes: &[u8], key: &str) -> Option<Window> {
    postcard::from_bytes(bytes)
        .inspect_err(|e| warn!(key, error = %e, "Discarding unreadable rate-limit window"))
        .ok()
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}
