use crate::Logger;
use crate::error::LoggerError;
use crate::layers::{self, BoxedLayer};
use private::Sealed;
use std::marker::PhantomData;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::Registry;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_MAX_FILES: usize = 10;

/// Record layout of every enabled output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

#[derive(Debug)]
pub(crate) struct Settings {
    pub(crate) console: bool,
    pub(crate) directory: Option<PathBuf>,
    pub(crate) level: LevelFilter,
    pub(crate) format: OutputFormat,
    pub(crate) directives: Option<String>,
    pub(crate) rotation: Rotation,
    pub(crate) max_files: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            console: true,
            directory: None,
            level: LevelFilter::INFO,
            format: OutputFormat::Compact,
            directives: None,
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
        }
    }
}

#[derive(Debug)]
pub struct Unnamed;
#[derive(Debug)]
pub struct Named(String);
#[derive(Debug)]
pub struct ConsoleOnly;
#[derive(Debug)]
pub struct Rolling;

mod private {
    pub trait Sealed {}
}
impl Sealed for Unnamed {}
impl Sealed for Named {}
impl Sealed for ConsoleOnly {}
impl Sealed for Rolling {}

/// Typestate builder: a name is required before [`LoggerBuilder::init`], and rotation
/// settings exist only once a log directory is set.
#[derive(Debug)]
pub struct LoggerBuilder<N: Sealed = Unnamed, F: Sealed = ConsoleOnly> {
    pub(crate) settings: Settings,
    name: N,
    output: PhantomData<F>,
}

impl LoggerBuilder {
    pub(crate) fn new() -> Self {
        Self { settings: Settings::default(), name: Unnamed, output: PhantomData }
    }
}

impl<F: Sealed> LoggerBuilder<Unnamed, F> {
    /// Names the process; also the prefix of rolling files (`<name>.<date>.log`).
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<Named, F> {
        LoggerBuilder { settings: self.settings, name: Named(name.into()), output: PhantomData }
    }
}

impl<F: Sealed> LoggerBuilder<Named, F> {
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.settings.level = level;
        self
    }

    /// Module directives such as `mkp_registration=debug,reqwest=info`; replaces `RUST_LOG`.
    ///
    /// Invalid directives make [`LoggerBuilder::init`] fail.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn env_filter(mut self, directives: impl Into<String>) -> Self {
        self.settings.directives = Some(directives.into());
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.settings.console = enabled;
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn format(mut self, format: OutputFormat) -> Self {
        self.settings.format = format;
        self
    }

    /// Shorthand for [`OutputFormat::Json`] or the compact default.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn json(self, enabled: bool) -> Self {
        self.format(if enabled { OutputFormat::Json } else { OutputFormat::Compact })
    }

    /// Adds rolling file output under `directory`.
    pub fn path(self, directory: impl Into<PathBuf>) -> LoggerBuilder<Named, Rolling> {
        let mut settings = self.settings;
        settings.directory = Some(directory.into());
        LoggerBuilder { settings, name: self.name, output: PhantomData }
    }

    /// Installs the global subscriber.
    ///
    /// The returned [`Logger`] owns the file writer's guard; keep it alive until shutdown.
    ///
    /// # Errors
    /// [`LoggerError::InvalidConfiguration`] for an empty name, zero retained files, bad
    /// directives or no enabled output; [`LoggerError::Subscriber`] when a global subscriber
    /// is already installed.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let name = self.name.0.trim();
        if name.is_empty() {
            return Err(LoggerError::InvalidConfiguration { message: "Logger name cannot be empty".into(), context: None });
        }
        if self.settings.max_files == 0 {
            return Err(LoggerError::InvalidConfiguration {
                message: "max_files must be greater than zero".into(),
                context: None,
            });
        }

        let filter = layers::env_filter(&self.settings)?;
        let mut outputs: Vec<BoxedLayer<Registry>> = Vec::with_capacity(2);

        if self.settings.console {
            outputs.push(layers::console(self.settings.format));
        }
        let guard = match &self.settings.directory {
            Some(directory) => {
                let (layer, guard) = layers::rolling_file(directory, name, &self.settings)?;
                outputs.push(layer);
                Some(guard)
            },
            None => None,
        };

        if outputs.is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "No logging output enabled. Enable the console or set a directory.".into(),
                context: None,
            });
        }

        tracing_subscriber::registry().with(outputs).with(filter).try_init()?;
        Ok(Logger { guard })
    }
}

impl LoggerBuilder<Named, Rolling> {
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn max_files(mut self, max: usize) -> Self {
        self.settings.max_files = max;
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn rotation(mut self, rotation: Rotation) -> Self {
        self.settings.rotation = rotation;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn defaults_are_compact_console_at_info() {
        let builder = LoggerBuilder::new().name("mkp-register").env_filter("mkp=debug");
        assert!(builder.settings.console);
        assert_eq!(builder.settings.format, OutputFormat::Compact);
        assert_eq!(builder.settings.level, LevelFilter::INFO);
        assert_eq!(builder.settings.directives.as_deref(), Some("mkp=debug"));
        assert!(builder.settings.directory.is_none());
    }

    #[test]
    fn rolling_options_follow_the_directory() {
        let builder = LoggerBuilder::new()
            .name("mkp-register")
            .json(true)
            .path("logs")
            .max_files(5)
            .rotation(Rotation::HOURLY)
            .level(LevelFilter::DEBUG);

        assert_eq!(builder.settings.format, OutputFormat::Json);
        assert_eq!(builder.settings.level, LevelFilter::DEBUG);
        assert_eq!(builder.settings.max_files, 5);
        assert_eq!(builder.settings.directory, Some(PathBuf::from("logs")));
    }

    #[test]
    #[serial]
    fn no_output_is_rejected() {
        let err = LoggerBuilder::new().name("silent").console(false).init().unwrap_err();
        assert_eq!(err.code(), "invalid_configuration");
    }

    #[test]
    #[serial]
    fn blank_names_are_rejected() {
        let err = LoggerBuilder::new().name("  ").init().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    #[serial]
    fn zero_retained_files_are_rejected() {
        let err = LoggerBuilder::new().name("rolling").path("logs").max_files(0).init().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }
}
