use crate::error::{GatewayError, GatewayErrorExt};
use crate::gateway::{SubmissionContext, SubmissionGateway};
use crate::payload::RegistrationPayload;
use crate::response::GatewayResponse;
use mkp_kernel::domain::config::GatewayConfig;
use mkp_kernel::domain::constants::BROWSER_SIGNATURE_HEADER;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, warn};

/// Multipart `POST` to `<base_url>/<endpoint>`.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct UpstreamBody {
    success: Option<bool>,
    message: Option<String>,
}

impl HttpUpstream {
    /// # Errors
    /// Returns [`GatewayError::Transport`] if the HTTP client cannot be constructed.
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("Failed to build HTTP client")?;
        let url = format!(
            "{}/{}",
            config.base_url.trim_end_matches('/'),
            config.endpoint.trim_start_matches('/')
        );
        Ok(Self { client, url })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl SubmissionGateway for HttpUpstream {
    async fn submit(
        &self,
        payload: RegistrationPayload,
        context: &SubmissionContext,
    ) -> Result<GatewayResponse, GatewayError> {
        let form = into_form(payload)?;

        let response = self
            .client
            .post(&self.url)
            .header(ACCEPT, "application/json")
            .header(ACCEPT_LANGUAGE, context.locale.as_str())
            .header(BROWSER_SIGNATURE_HEADER, context.signature.as_str())
            .multipart(form)
            .send()
            .await
            .context("Registration request failed")?;

        let status = response.status();
        let body = response.bytes().await.context("Failed to read registration response")?;
        debug!(url = %self.url, status = status.as_u16(), bytes = body.len(), "Upstream answered");

        let parsed = match serde_json::from_slice::<UpstreamBody>(&body) {
            Ok(parsed) => parsed,
            Err(e) if status.is_success() => {
                return Err(e).context(format!("Unexpected body from {}", self.url));
            },
            Err(e) => {
                warn!(status = status.as_u16(), error = %e, "Non-JSON error body from upstream");
                UpstreamBody { success: Some(false), message: None }
            },
        };

        let success = status.is_success() && parsed.success.unwrap_or(true);
        Ok(if success {
            GatewayResponse::accepted(parsed.message)
        } else {
            GatewayResponse::rejected(parsed.message, Some(status.as_u16()))
        })
    }
}

fn into_form(payload: RegistrationPayload) -> Result<Form, GatewayError> {
    let (text, files) = payload.into_parts();
    let mut form = Form::new();

    for (name, value) in text {
        form = form.text(name, value);
    }

    for (name, file) in files {
        let part = Part::bytes(file.bytes.to_vec())
            .file_name(file.file_name)
            .mime_str(&file.mime)
            .context(format!("Invalid MIME type for part '{name}'"))?;
        form = form.part(name, part);
    }

    Ok(form)
}
