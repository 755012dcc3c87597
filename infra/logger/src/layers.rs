use crate::builder::{OutputFormat, Settings};
use crate::error::LoggerError;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::Subscriber;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, fmt};

const LOG_FILE_SUFFIX: &str = "log";

pub(crate) type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

/// Console records go to stderr; stdout belongs to command output.
pub(crate) fn console<S>(format: OutputFormat) -> BoxedLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let layer = fmt::layer().with_writer(std::io::stderr).with_ansi(true);
    match format {
        OutputFormat::Compact => layer.compact().boxed(),
        OutputFormat::Pretty => layer.pretty().boxed(),
        OutputFormat::Json => layer.json().boxed(),
    }
}

/// Rolling file output behind a non-blocking writer; the guard must outlive logging.
pub(crate) fn rolling_file<S>(
    directory: &Path,
    name: &str,
    settings: &Settings,
) -> Result<(BoxedLayer<S>, WorkerGuard), LoggerError>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fs::create_dir_all(directory).map_err(|e| LoggerError::Internal {
        message: e.to_string().into(),
        context: Some(format!("Failed to create log directory {}", directory.display()).into()),
    })?;

    let appender = RollingFileAppender::builder()
        .rotation(settings.rotation.clone())
        .filename_prefix(name)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(settings.max_files)
        .build(directory)?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer = fmt::layer().with_writer(writer).with_ansi(false);
    let layer = match settings.format {
        OutputFormat::Json => layer.json().boxed(),
        OutputFormat::Compact | OutputFormat::Pretty => layer.boxed(),
    };
    Ok((layer, guard))
}

/// Explicit directives win; otherwise `RUST_LOG` on top of the default level.
pub(crate) fn env_filter(settings: &Settings) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(settings.level.into());
    match &settings.directives {
        Some(directives) => builder.parse(directives).map_err(|e| LoggerError::InvalidConfiguration {
            message: format!("Invalid env filter '{directives}': {e}").into(),
            context: None,
        }),
        None => Ok(builder.from_env_lossy()),
    }
}

pub(crate) fn parse_level(level: &str) -> Result<LevelFilter, LoggerError> {
    LevelFilter::from_str(level.trim()).map_err(|e| LoggerError::InvalidConfiguration {
        message: format!("Unknown log level '{level}': {e}").into(),
        context: None,
    })
}
