use mkp_domain::constants::{BROWSER_SIGNATURE_HEADER, UNKNOWN_SIGNATURE};
use std::fmt;

const USER_AGENT_HEADER: &str = "user-agent";

/// Fingerprint of the submitting client, used to key rate limits.
///
/// Resolution order: explicit browser signature, then user agent, then `unknown`.
/// Blank values count as absent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientSignature(String);

impl ClientSignature {
    #[must_use]
    pub fn resolve(browser_signature: Option<&str>, user_agent: Option<&str>) -> Self {
        let picked = [browser_signature, user_agent]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|value| !value.is_empty())
            .unwrap_or(UNKNOWN_SIGNATURE);
        Self(picked.to_owned())
    }

    /// Resolves the signature from request headers; names match case-insensitively.
    #[must_use]
    pub fn from_headers<'a, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut browser = None;
        let mut agent = None;
        for (name, value) in headers {
            if name.eq_ignore_ascii_case(BROWSER_SIGNATURE_HEADER) {
                browser = Some(value);
            } else if name.eq_ignore_ascii_case(USER_AGENT_HEADER) {
                agent = Some(value);
            }
        }
        Self::resolve(browser, agent)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ClientSignature {
    fn default() -> Self {
        Self(UNKNOWN_SIGNATURE.to_owned())
    }
}

impl fmt::Display for ClientSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
