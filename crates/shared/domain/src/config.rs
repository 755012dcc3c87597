use crate::locale::Locale;
use serde::Deserialize;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Top-level configuration of the registration wizard host.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WizardConfigInner {
    pub storage: StorageConfig,
    pub registration: RegistrationConfig,
    pub attachments: AttachmentConfig,
    pub gateway: GatewayConfig,
    pub logging: LoggingConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct WizardConfig {
    #[serde(flatten, default)]
    inner: Arc<WizardConfigInner>,
}

impl Deref for WizardConfig {
    type Target = WizardConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for WizardConfig {
    fn deref_mut(&mut self) -> &mut WizardConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// On-disk encoding of persisted values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionKind {
    None,
    #[default]
    Lz4,
}

/// Where the draft is persisted.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub compression: CompressionKind,
}

/// Behaviour of the wizard flow itself.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegistrationConfig {
    /// Upper bound for the terminal-step validation handshake.
    pub bridge_timeout_ms: u64,
    pub locale: Locale,
    /// Redirect target after a successful submission; `{locale}` is substituted.
    pub login_path: String,
}

impl RegistrationConfig {
    #[must_use]
    pub const fn bridge_timeout(&self) -> Duration {
        Duration::from_millis(self.bridge_timeout_ms)
    }

    #[must_use]
    pub fn login_url(&self, locale: Locale) -> String {
        self.login_path.replace("{locale}", locale.as_str())
    }
}

/// File pre-validation policy for attachment fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AttachmentConfig {
    pub max_bytes: u64,
    pub allowed_types: Vec<String>,
}

/// Upstream registration endpoint and its rate limit.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub base_url: String,
    pub endpoint: String,
    pub request_timeout_ms: u64,
    pub rate_limit: RateLimitConfig,
}

impl GatewayConfig {
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Application prefix of every rate-limit key.
    pub namespace: String,
    pub window_secs: u64,
    pub max_attempts: u32,
    /// Bound on simultaneously tracked keys.
    pub capacity: u64,
}

impl RateLimitConfig {
    #[must_use]
    pub const fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub name: String,
    pub level: String,
    pub console: bool,
    pub json: bool,
    pub directory: Option<PathBuf>,
    pub env_filter: Option<String>,
}

// --- Default ---

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: PathBuf::from("data"), compression: CompressionKind::Lz4 }
    }
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            bridge_timeout_ms: 5_000,
            locale: Locale::default(),
            login_path: "/{locale}/login".to_owned(),
        }
    }
}

impl Default for AttachmentConfig {
    fn default() -> Self {
        Self {
            max_bytes: 5 * 1024 * 1024,
            allowed_types: vec![
                "image/jpeg".to_owned(),
                "image/png".to_owned(),
                "image/webp".to_owned(),
            ],
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_owned(),
            endpoint: "register".to_owned(),
            request_timeout_ms: 30_000,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            namespace: "market_place_admin_panel".to_owned(),
            window_secs: 3_600,
            max_attempts: 3,
            capacity: 10_000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            name: "mkp-register".to_owned(),
            level: "info".to_owned(),
            console: true,
            json: false,
            directory: None,
            env_filter: None,
        }
    }
}
