//! # Logger
//!
//! Process-wide `tracing` setup for the wizard hosts: a stderr console output, an optional
//! rolling file behind a non-blocking writer, and `EnvFilter` directives.
//!
//! ```rust
//! use mkp_logger::{LevelFilter, Logger};
//!
//! let _logger = Logger::builder()
//!     .name("mkp-register")
//!     .level(LevelFilter::DEBUG)
//!     .env_filter("mkp_gateway=trace")
//!     .init()
//!     .unwrap();
//! ```

mod builder;
mod error;
mod layers;

pub use builder::{ConsoleOnly, LoggerBuilder, Named, OutputFormat, Rolling, Unnamed};
pub use error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use mkp_domain::config::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;

/// Keeps the file writer alive; dropping it flushes pending records.
#[must_use = "Dropping this handle will stop background logging threads."]
#[derive(Debug)]
pub struct Logger {
    pub(crate) guard: Option<WorkerGuard>,
}

impl Logger {
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Installs logging as described by the `logging` configuration section.
    ///
    /// # Errors
    /// Returns [`LoggerError::InvalidConfiguration`] for an unknown level, and any error
    /// [`LoggerBuilder::init`] reports.
    pub fn from_config(config: &LoggingConfig) -> Result<Self, LoggerError> {
        let mut builder = Self::builder()
            .name(config.name.clone())
            .level(layers::parse_level(&config.level)?)
            .console(config.console)
            .json(config.json);
        if let Some(directives) = &config.env_filter {
            builder = builder.env_filter(directives.clone());
        }

        match &config.directory {
            Some(directory) => builder.path(directory.clone()).init(),
            None => builder.init(),
        }
    }

    #[must_use]
    pub const fn has_file_output(&self) -> bool {
        self.guard.is_some()
    }

    #[must_use]
    pub const fn guard(&self) -> Option<&WorkerGuard> {
        self.guard.as_ref()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::debug!("Flushing log file before shutdown");
        }
    }
}
