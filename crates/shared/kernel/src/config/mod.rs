use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::Path;
use tracing::info;

/// Default configuration file stem looked up in the working directory.
pub const DEFAULT_CONFIG_STEM: &str = "mkp-register";
/// Prefix of environment overrides (`MKP__GATEWAY__BASE_URL` maps to `gateway.base_url`).
pub const ENV_PREFIX: &str = "MKP";

/// Custom error type for config loading.
#[mkp_derive::mkp_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads configuration by layering a file with environment overrides.
///
/// 1. **Base File**: an explicit `path` must exist. Without one, `mkp-register.{toml,json,yaml}`
///    in the working directory is used when present.
/// 2. **Environment Overrides**: variables prefixed with `MKP__`, nested with double
///    underscores. Numeric and boolean strings are parsed.
///
/// Fields missing from every source fall back to the target's `Default` through
/// `#[serde(default)]`.
///
/// # Errors
/// Returns [`ConfigError::Config`] if an explicit file is missing or the merged sources do
/// not match `T`.
///
/// # Example
/// ```rust
/// use mkp_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local.toml")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let file = match &path {
        Some(p) => {
            let p = p.as_ref();
            info!(path = %p.display(), "Loading config");
            File::from(p).required(true)
        },
        None => {
            info!(stem = DEFAULT_CONFIG_STEM, "Loading optional default config");
            File::with_name(DEFAULT_CONFIG_STEM).required(false)
        },
    };

    Config::builder()
        .add_source(file)
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .convert_case(config::Case::Snake),
        )
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")
}
