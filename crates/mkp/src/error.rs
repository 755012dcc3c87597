use std::borrow::Cow;

#[mkp_derive::mkp_error]
pub enum BootstrapError {
    #[error("Draft storage unavailable{}: {source}", format_context(.context))]
    Storage { source: mkp_storage::StorageError, context: Option<Cow<'static, str>> },

    #[error("Draft store failed to open{}: {source}", format_context(.context))]
    Registration { source: mkp_registration::RegistrationError, context: Option<Cow<'static, str>> },

    #[error("Gateway setup failed{}: {source}", format_context(.context))]
    Gateway { source: mkp_gateway::GatewayError, context: Option<Cow<'static, str>> },

    #[error("Internal bootstrap error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
