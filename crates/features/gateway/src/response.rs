use mkp_kernel::domain::constants::TOO_MANY_REQUESTS;
use mkp_kernel::domain::locale::Locale;
use serde::{Deserialize, Serialize};

/// Structured result of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl GatewayResponse {
    #[must_use]
    pub fn accepted(message: Option<String>) -> Self {
        Self { success: true, message, status: None }
    }

    #[must_use]
    pub fn rejected(message: Option<String>, status: Option<u16>) -> Self {
        Self { success: false, message, status }
    }

    /// Failure returned without contacting upstream once a client exhausts its attempts.
    #[must_use]
    pub fn rate_limited(locale: Locale) -> Self {
        Self::rejected(Some(rate_limit_message(locale).to_owned()), Some(TOO_MANY_REQUESTS))
    }

    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        !self.success && self.status == Some(TOO_MANY_REQUESTS)
    }
}

#[must_use]
pub const fn rate_limit_message(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Something went wrong please try again later.",
        Locale::Ar => "حدث خطأ، برجاء المحاولة لاحقاً.",
    }
}
