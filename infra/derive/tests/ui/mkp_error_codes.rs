use mkp_derive::mkp_error;
use std::borrow::Cow;

#[mkp_error]
pub enum GatewayError {
    #[error("Rate limited{}: {message}", format_context(.context))]
    RateLimited { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Upstream rejected submission: {status}")]
    UpstreamStatus { status: u16 },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn main() {
    let limited = GatewayError::RateLimited { message: "register".into(), context: None };
    assert_eq!(limited.code(), "rate_limited");
    assert_eq!(GatewayError::UpstreamStatus { status: 500 }.code(), "upstream_status");

    let err: Result<(), GatewayError> = Err(GatewayError::from(String::from("oops")));
    let err = err.context("submitting").unwrap_err();
    assert_eq!(err.code(), "internal");
    assert_eq!(err.to_string(), "Internal error (submitting): oops");
}
