//! Facade crate for the registration wizard.
//! Re-exports domain/kernel primitives and the feature crates, and composes a ready wizard
//! from [`domain::config::WizardConfig`].
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! - Add `mkp` (feature `http` is on by default for the upstream transport).
//! - Call [`bootstrap`] inside a Tokio runtime and drive the returned [`Wizard`].

mod error;

pub use error::{BootstrapError, BootstrapErrorExt};
pub use mkp_domain as domain;
pub use mkp_gateway as gateway;
pub use mkp_kernel as kernel;
pub use mkp_registration as registration;
pub use mkp_registration::Wizard;
pub use mkp_storage as storage;

use mkp_domain::config::{CompressionKind, StorageConfig, WizardConfig};
use mkp_gateway::{RateLimitedGateway, RateLimiter, SubmissionContext, SubmissionGateway};
use mkp_registration::{AttachmentPipeline, DraftStore};
use mkp_storage::{Compression, FileStore};
use tracing::info;

/// Build-time enabled features (by Cargo feature).
pub const ENABLED: &[&str] = &[
    #[cfg(feature = "http")]
    "http",
];

#[must_use]
pub fn is_enabled(name: &str) -> bool {
    ENABLED.contains(&name)
}

/// Wizard wired to the file-backed draft and the rate-limited HTTP upstream.
#[cfg(feature = "http")]
pub type HttpWizard = Wizard<FileStore, RateLimitedGateway<mkp_gateway::HttpUpstream, FileStore>>;

/// Opens the configured draft storage.
///
/// # Errors
/// Returns [`BootstrapError::Storage`] if the data directory cannot be prepared.
pub async fn open_storage(config: &StorageConfig) -> Result<FileStore, BootstrapError> {
    let compression = match config.compression {
        CompressionKind::None => Compression::None,
        CompressionKind::Lz4 => Compression::Lz4,
    };
    let store = FileStore::builder()
        .root(config.data_dir.clone())
        .compression(compression)
        .connect()
        .await
        .context(format!("Failed to open {}", config.data_dir.display()))?;
    Ok(store)
}

/// Mounts a wizard over any upstream, applying the configured rate limit in front of it.
///
/// Rate-limit windows are kept in the draft's storage root, so the limit spans host processes.
///
/// # Errors
/// Returns [`BootstrapError`] if the draft storage cannot be opened.
pub async fn bootstrap_with<G: SubmissionGateway>(
    config: &WizardConfig,
    upstream: G,
    context: SubmissionContext,
) -> Result<Wizard<FileStore, RateLimitedGateway<G, FileStore>>, BootstrapError> {
    let storage = open_storage(&config.storage).await?;
    let store = DraftStore::open(storage.clone()).await?;

    let limiter = RateLimiter::from_config_with_store(storage, &config.gateway.rate_limit);
    let gateway = RateLimitedGateway::new(upstream, limiter, config.gateway.endpoint.as_str());
    let pipeline = AttachmentPipeline::from_config(&config.attachments);

    info!(
        data_dir = %config.storage.data_dir.display(),
        step = %store.step(),
        endpoint = %config.gateway.endpoint,
        locale = %context.locale,
        "Registration wizard ready"
    );
    Ok(Wizard::mount(store, gateway, pipeline, context, &config.registration))
}

/// Mounts a wizard that submits to the configured HTTP backend.
///
/// # Errors
/// Returns [`BootstrapError`] if storage cannot be opened or the HTTP client cannot be built.
#[cfg(feature = "http")]
pub async fn bootstrap(config: &WizardConfig, context: SubmissionContext) -> Result<HttpWizard, BootstrapError> {
    let upstream = mkp_gateway::HttpUpstream::new(&config.gateway)?;
    bootstrap_with(config, upstream, context).await
}
