use std::borrow::Cow;

#[mkp_derive::mkp_error]
pub enum LoggerError {
    #[error("Log file could not be opened{}: {source}", format_context(context))]
    Appender { source: tracing_appender::rolling::InitError, context: Option<Cow<'static, str>> },

    /// A global subscriber is already installed in this process.
    #[error("Logging already initialized{}: {source}", format_context(context))]
    Subscriber { source: tracing_subscriber::util::TryInitError, context: Option<Cow<'static, str>> },

    #[error("Invalid logging configuration{}: {message}", format_context(context))]
    InvalidConfiguration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal logger error{}: {message}", format_context(context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
