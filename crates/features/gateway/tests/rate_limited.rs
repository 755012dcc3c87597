use mkp_gateway::*;
use mkp_kernel::domain::config::RateLimitConfig;
use mkp_kernel::domain::locale::Locale;
use mkp_kernel::security::signature::ClientSignature;
use mkp_storage::{FileStore, KeyValueStore, StorageError, StorageKey};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
struct CountingUpstream {
    calls: AtomicUsize,
}

impl SubmissionGateway for CountingUpstream {
    async fn submit(
        &self,
        payload: RegistrationPayload,
        _context: &SubmissionContext,
    ) -> Result<GatewayResponse, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(GatewayResponse::accepted(payload.email().map(str::to_owned)))
    }
}

fn payload_for(email: &str) -> RegistrationPayload {
    let mut payload = RegistrationPayload::new();
    payload.push_text("companyName", "Acme");
    payload.push_text("email", email);
    payload
}

fn gateway() -> (Arc<CountingUpstream>, RateLimitedGateway<Arc<CountingUpstream>>) {
    let upstream = Arc::new(CountingUpstream::default());
    let limiter = RateLimiter::from_config(&RateLimitConfig::default());
    (upstream.clone(), RateLimitedGateway::new(upstream, limiter, "register"))
}

#[tokio::test]
async fn three_attempts_pass_and_the_fourth_never_reaches_upstream() {
    let (upstream, gateway) = gateway();
    let context = SubmissionContext {
        signature: ClientSignature::resolve(Some("fp-1"), None),
        locale: Locale::En,
    };

    for _ in 0..3 {
        let response = gateway.submit(payload_for("owner@acme.test"), &context).await.unwrap();
        assert!(response.success);
    }

    let limited = gateway.submit(payload_for("owner@acme.test"), &context).await.unwrap();
    assert!(!limited.success);
    assert_eq!(limited.status, Some(429));
    assert_eq!(limited.message.as_deref(), Some(rate_limit_message(Locale::En)));
    assert_eq!(upstream.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn keys_are_isolated_by_signature_and_email() {
    let (upstream, gateway) = gateway();
    let first = SubmissionContext {
        signature: ClientSignature::resolve(Some("fp-1"), None),
        locale: Locale::Ar,
    };
    let second = SubmissionContext {
        signature: ClientSignature::resolve(None, Some("agent/2")),
        locale: Locale::Ar,
    };

    for _ in 0..3 {
        gateway.submit(payload_for("a@acme.test"), &first).await.unwrap();
    }
    assert!(gateway.submit(payload_for("a@acme.test"), &first).await.unwrap().is_rate_limited());

    assert!(gateway.submit(payload_for("b@acme.test"), &first).await.unwrap().success);
    assert!(gateway.submit(payload_for("a@acme.test"), &second).await.unwrap().success);
    assert_eq!(upstream.calls.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn missing_email_shares_the_no_email_bucket() {
    let (_, gateway) = gateway();
    let context = SubmissionContext::default();

    for _ in 0..3 {
        assert!(gateway.submit(RegistrationPayload::new(), &context).await.unwrap().success);
    }
    let limited = gateway.submit(payload_for("   "), &context).await.unwrap();
    assert_eq!(limited.message.as_deref(), Some(rate_limit_message(Locale::Ar)));
}

fn file_backed_gateway(
    store: FileStore,
    upstream: Arc<CountingUpstream>,
) -> RateLimitedGateway<Arc<CountingUpstream>, FileStore> {
    let limiter = RateLimiter::from_config_with_store(store, &RateLimitConfig::default());
    RateLimitedGateway::new(upstream, limiter, "register")
}

#[tokio::test]
async fn attempts_are_counted_across_gateways_sharing_a_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let upstream = Arc::new(CountingUpstream::default());
    let context = SubmissionContext {
        signature: ClientSignature::resolve(None, Some("cli/1.0")),
        locale: Locale::En,
    };

    // Each gateway stands in for one short-lived host process.
    for _ in 0..3 {
        let store = FileStore::builder().root(dir.path()).connect().await.unwrap();
        let gateway = file_backed_gateway(store, upstream.clone());
        assert!(gateway.submit(payload_for("owner@acme.test"), &context).await.unwrap().success);
    }

    let store = FileStore::builder().root(dir.path()).connect().await.unwrap();
    let gateway = file_backed_gateway(store, upstream.clone());
    let limited = gateway.submit(payload_for("owner@acme.test"), &context).await.unwrap();

    assert!(limited.is_rate_limited());
    assert_eq!(limited.message.as_deref(), Some(rate_limit_message(Locale::En)));
    assert_eq!(upstream.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn two_live_gateways_over_one_file_store_share_the_budget() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::builder().root(dir.path()).connect().await.unwrap();
    let upstream = Arc::new(CountingUpstream::default());
    let first = file_backed_gateway(store.clone(), upstream.clone());
    let second = file_backed_gateway(store, upstream.clone());
    let context = SubmissionContext::default();

    assert!(first.submit(payload_for("a@acme.test"), &context).await.unwrap().success);
    assert!(second.submit(payload_for("a@acme.test"), &context).await.unwrap().success);
    assert!(first.submit(payload_for("a@acme.test"), &context).await.unwrap().success);
    assert!(second.submit(payload_for("a@acme.test"), &context).await.unwrap().is_rate_limited());
    assert_eq!(upstream.calls.load(Ordering::SeqCst), 3);
}

#[derive(Debug)]
struct BrokenStore;

impl KeyValueStore for BrokenStore {
    async fn get(&self, _key: &StorageKey) -> Result<Option<Vec<u8>>, StorageError> {
        Err(StorageError::from("disk unavailable"))
    }

    async fn put(&self, _key: &StorageKey, _value: &[u8]) -> Result<(), StorageError> {
        Err(StorageError::from("disk unavailable"))
    }

    async fn remove(&self, _key: &StorageKey) -> Result<(), StorageError> {
        Ok(())
    }
}

#[tokio::test]
async fn unavailable_rate_limit_state_blocks_the_submission() {
    let upstream = Arc::new(CountingUpstream::default());
    let limiter = RateLimiter::from_config_with_store(BrokenStore, &RateLimitConfig::default());
    let gateway = RateLimitedGateway::new(upstream.clone(), limiter, "register");

    let response = gateway.submit(payload_for("a@acme.test"), &SubmissionContext::default()).await.unwrap();

    assert!(response.is_rate_limited());
    assert_eq!(upstream.calls.load(Ordering::SeqCst), 0);
}
