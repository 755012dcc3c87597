use std::borrow::Cow;

#[mkp_derive::mkp_error]
pub enum RegistrationError {
    #[error("Draft persistence failure{}: {source}", format_context(.context))]
    Storage { source: mkp_storage::StorageError, context: Option<Cow<'static, str>> },

    #[error("Draft snapshot codec failure{}: {source}", format_context(.context))]
    Codec { source: postcard::Error, context: Option<Cow<'static, str>> },

    #[error("Unsupported draft snapshot version {found}, expected {expected}")]
    SnapshotVersion { found: u16, expected: u16 },

    #[error("Preview rendering failed{}: {message}", format_context(.context))]
    Preview { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal registration error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
