//! Request/response handshake between the step controller and the terminal step.
//!
//! The controller owns a [`ValidationBridge`] and the terminal step owns the matching
//! [`BridgeResponder`]. Each [`ValidationBridge::request`] creates its reply slot before the
//! request is sent, so an answer can never arrive ahead of the listener. A request resolves
//! exactly once: [`ValidationRequest::resolve`] consumes the request, and the bridge stops
//! listening after the first answer, the deadline, or the responder going away.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace, warn};

const PENDING_REQUESTS: usize = 4;

/// Answer of the terminal step's full schema check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Invalid,
}

impl Verdict {
    #[must_use]
    pub const fn from_valid(valid: bool) -> Self {
        if valid { Self::Valid } else { Self::Invalid }
    }

    #[must_use]
    pub const fn is_valid(self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// One pending "please validate" signal.
pub struct ValidationRequest {
    id: u64,
    reply: oneshot::Sender<Verdict>,
}

impl ValidationRequest {
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Answers the request; `false` if the controller stopped waiting.
    pub fn resolve(self, verdict: Verdict) -> bool {
        let delivered = self.reply.send(verdict).is_ok();
        trace!(request = self.id, ?verdict, delivered, "Validation request resolved");
        delivered
    }
}

impl fmt::Debug for ValidationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationRequest").field("id", &self.id).finish_non_exhaustive()
    }
}

/// Controller side of the handshake.
#[derive(Debug, Clone)]
pub struct ValidationBridge {
    requests: mpsc::Sender<ValidationRequest>,
    timeout: Duration,
    next_id: Arc<AtomicU64>,
}

/// Terminal-step side of the handshake.
#[derive(Debug)]
pub struct BridgeResponder {
    requests: mpsc::Receiver<ValidationRequest>,
}

/// Creates a connected bridge whose requests resolve to [`Verdict::Invalid`] after `timeout`.
#[must_use]
pub fn channel(timeout: Duration) -> (ValidationBridge, BridgeResponder) {
    let (tx, rx) = mpsc::channel(PENDING_REQUESTS);
    (
        ValidationBridge { requests: tx, timeout, next_id: Arc::new(AtomicU64::new(1)) },
        BridgeResponder { requests: rx },
    )
}

impl ValidationBridge {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Asks the terminal step to validate and waits for its verdict.
    ///
    /// A missing responder, a dropped request or the deadline all count as invalid.
    pub async fn request(&self) -> Verdict {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (reply, answer) = oneshot::channel();

        let handshake = async {
            if self.requests.send(ValidationRequest { id, reply }).await.is_err() {
                warn!(request = id, "Terminal step is not listening");
                return Verdict::Invalid;
            }
            answer.await.unwrap_or_else(|_| {
                warn!(request = id, "Validation request dropped without an answer");
                Verdict::Invalid
            })
        };

        match tokio::time::timeout(self.timeout, handshake).await {
            Ok(verdict) => {
                debug!(request = id, ?verdict, "Validation handshake finished");
                verdict
            },
            Err(_) => {
                warn!(request = id, timeout_ms = self.timeout.as_millis(), "Validation handshake timed out");
                Verdict::Invalid
            },
        }
    }
}

impl BridgeResponder {
    /// Next pending request; `None` once every bridge handle is gone.
    pub async fn recv(&mut self) -> Option<ValidationRequest> {
        self.requests.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn answered_request_resolves_to_the_answer() {
        let (bridge, mut responder) = channel(Duration::from_secs(1));
        let serve = tokio::spawn(async move {
            let request = responder.recv().await.unwrap();
            request.resolve(Verdict::Valid)
        });

        assert_eq!(bridge.request().await, Verdict::Valid);
        assert!(serve.await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn silent_responder_times_out_as_invalid() {
        let (bridge, mut responder) = channel(Duration::from_millis(50));

        assert_eq!(bridge.request().await, Verdict::Invalid);

        let late = responder.recv().await.unwrap();
        assert!(!late.resolve(Verdict::Valid));
    }

    #[tokio::test]
    async fn dropped_responder_is_invalid() {
        let (bridge, responder) = channel(Duration::from_secs(5));
        drop(responder);
        assert_eq!(bridge.request().await, Verdict::Invalid);
    }

    #[tokio::test]
    async fn dropped_request_is_invalid() {
        let (bridge, mut responder) = channel(Duration::from_secs(5));
        let serve = tokio::spawn(async move {
            drop(responder.recv().await);
        });

        assert_eq!(bridge.request().await, Verdict::Invalid);
        serve.await.unwrap();
    }

    #[test]
    fn verdict_from_bool() {
        assert!(Verdict::from_valid(true).is_valid());
        assert_eq!(Verdict::from_valid(false), Verdict::Invalid);
    }
}
