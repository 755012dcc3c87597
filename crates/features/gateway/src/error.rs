use std::borrow::Cow;

/// Failures of the submission transport itself.
///
/// A rejected submission (validation error reported by the backend, rate limit) is not an
/// error: it comes back as an unsuccessful [`crate::GatewayResponse`].
#[mkp_derive::mkp_error]
pub enum GatewayError {
    #[cfg(feature = "http")]
    #[error("Transport failure{}: {source}", format_context(.context))]
    Transport { source: reqwest::Error, context: Option<Cow<'static, str>> },

    #[cfg(feature = "http")]
    #[error("Malformed upstream response{}: {source}", format_context(.context))]
    Decode { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("Rate-limit storage failure{}: {source}", format_context(.context))]
    Storage { source: mkp_storage::StorageError, context: Option<Cow<'static, str>> },

    #[error("Rate-limit window codec failure{}: {source}", format_context(.context))]
    Codec { source: postcard::Error, context: Option<Cow<'static, str>> },

    #[error("Invalid payload{}: {message}", format_context(.context))]
    InvalidPayload { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal gateway error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
