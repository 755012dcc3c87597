use crate::error::GatewayError;
use crate::limiter::{RateDecision, RateLimiter};
use crate::payload::RegistrationPayload;
use crate::response::GatewayResponse;
use mkp_kernel::domain::locale::Locale;
use mkp_kernel::security::signature::ClientSignature;
use mkp_storage::{KeyValueStore, MemoryStore};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Per-request facts the gateway needs besides the payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionContext {
    pub signature: ClientSignature,
    pub locale: Locale,
}

/// Forwards an assembled registration to the backend.
///
/// `Ok` carries every answer the backend (or a guard in front of it) produced, accepted
/// or not. `Err` is reserved for transport failures where no answer exists.
pub trait SubmissionGateway: Send + Sync + 'static {
    fn submit(
        &self,
        payload: RegistrationPayload,
        context: &SubmissionContext,
    ) -> impl Future<Output = Result<GatewayResponse, GatewayError>> + Send;
}

impl<G: SubmissionGateway> SubmissionGateway for Arc<G> {
    fn submit(
        &self,
        payload: RegistrationPayload,
        context: &SubmissionContext,
    ) -> impl Future<Output = Result<GatewayResponse, GatewayError>> + Send {
        (**self).submit(payload, context)
    }
}

/// Applies the per-client attempt limit before delegating to `inner`.
///
/// When the limiter's store fails the attempt is answered as limited.
#[derive(Debug, Clone)]
pub struct RateLimitedGateway<G, S = MemoryStore> {
    inner: G,
    limiter: RateLimiter<S>,
    endpoint: Arc<str>,
}

impl<G: SubmissionGateway, S: KeyValueStore> RateLimitedGateway<G, S> {
    pub fn new(inner: G, limiter: RateLimiter<S>, endpoint: impl Into<Arc<str>>) -> Self {
        Self { inner, limiter, endpoint: endpoint.into() }
    }

    pub const fn inner(&self) -> &G {
        &self.inner
    }
}

impl<G: SubmissionGateway, S: KeyValueStore> SubmissionGateway for RateLimitedGateway<G, S> {
    async fn submit(
        &self,
        payload: RegistrationPayload,
        context: &SubmissionContext,
    ) -> Result<GatewayResponse, GatewayError> {
        let key = self.limiter.key(&self.endpoint, &context.signature, payload.email());

        match self.limiter.hit(&key).await {
            Err(e) => {
                error!(endpoint = %self.endpoint, error = %e, "Rate limit state unavailable");
                Ok(GatewayResponse::rate_limited(context.locale))
            },
            Ok(RateDecision::Limited { attempts }) => {
                warn!(endpoint = %self.endpoint, attempts, "Submission rate limited");
                Ok(GatewayResponse::rate_limited(context.locale))
            },
            Ok(RateDecision::Allowed { attempt, remaining }) => {
                debug!(endpoint = %self.endpoint, attempt, remaining, "Forwarding submission");
                self.inner.submit(payload, context).await
            },
        }
    }
}
