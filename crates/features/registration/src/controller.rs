use crate::assembler::assemble;
use crate::bridge::{ValidationBridge, Verdict};
use crate::field::Section;
use crate::steps::ReadinessCheck;
use crate::store::{DraftStore, StepCursor};
use mkp_gateway::{GatewayResponse, SubmissionContext, SubmissionGateway};
use mkp_kernel::domain::config::RegistrationConfig;
use mkp_kernel::domain::constants::TOTAL_STEPS;
use mkp_storage::KeyValueStore;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

const EVENT_CAPACITY: usize = 32;

/// Primary navigation action and its label key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    Next,
    CompleteRegister,
    Submitting,
}

impl NavAction {
    #[must_use]
    pub const fn label_key(self) -> &'static str {
        match self {
            Self::Next => "next",
            Self::CompleteRegister => "completeRegister",
            Self::Submitting => "submitting",
        }
    }
}

/// What the wizard frame renders around the current step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepChrome {
    pub step: StepCursor,
    pub section: Section,
    pub title_key: String,
    pub subtitle_key: String,
    /// `step N of 6`.
    pub ordinal: String,
    pub back_enabled: bool,
    pub action: NavAction,
    pub action_enabled: bool,
}

/// Notifications for hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardEvent {
    StepChanged { from: StepCursor, to: StepCursor },
    Submitting,
    Submitted { redirect: String, message: Option<String> },
    SubmitFailed { code: &'static str, message: Option<String> },
}

/// Result of one run of the submit protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The backend accepted; the draft is cleared and the host should leave for `redirect`.
    Submitted { redirect: String, message: Option<String> },
    /// The terminal step reported invalid (or never answered); nothing was sent.
    Invalid,
    /// The gateway answered with a failure, rate limiting included.
    Rejected(GatewayResponse),
    /// The gateway could not produce an answer.
    Failed { code: &'static str, message: String },
    /// Another submission is still in flight.
    Busy,
    /// Submission was asked for before the terminal step.
    NotOnTerminalStep { step: StepCursor },
}

impl SubmitOutcome {
    #[must_use]
    pub const fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted { .. })
    }
}

/// Result of the primary navigation action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextOutcome {
    Advanced(StepCursor),
    NotReady,
    Submit(SubmitOutcome),
}

/// Orchestrates step transitions and the single-flight submit protocol.
pub struct StepController<S, G> {
    inner: Arc<ControllerInner<S, G>>,
}

struct ControllerInner<S, G> {
    store: DraftStore<S>,
    gateway: G,
    bridge: ValidationBridge,
    loading: AtomicBool,
    events: broadcast::Sender<WizardEvent>,
    context: SubmissionContext,
    redirect: String,
}

impl<S, G> Clone for StepController<S, G> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<S, G> fmt::Debug for StepController<S, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepController")
            .field("step", &self.inner.store.step())
            .field("loading", &self.inner.loading.load(Ordering::Relaxed))
            .field("context", &self.inner.context)
            .finish_non_exhaustive()
    }
}

/// Holds the loading flag for the duration of one submission.
struct LoadingGuard<'a>(&'a AtomicBool);

impl<'a> LoadingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).ok().map(|_| Self(flag))
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<S, G> StepController<S, G>
where
    S: KeyValueStore,
    G: SubmissionGateway,
{
    pub fn new(
        store: DraftStore<S>,
        gateway: G,
        bridge: ValidationBridge,
        context: SubmissionContext,
        config: &RegistrationConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let redirect = config.login_url(context.locale);
        Self {
            inner: Arc::new(ControllerInner {
                store,
                gateway,
                bridge,
                loading: AtomicBool::new(false),
                events,
                context,
                redirect,
            }),
        }
    }

    #[must_use]
    pub fn store(&self) -> &DraftStore<S> {
        &self.inner.store
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.loading.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<WizardEvent> {
        self.inner.events.subscribe()
    }

    #[must_use]
    pub fn chrome(&self) -> StepChrome {
        let step = self.inner.store.step();
        let section = step.section();
        let loading = self.is_loading();
        let action = match (step.is_last(), loading) {
            (true, true) => NavAction::Submitting,
            (true, false) => NavAction::CompleteRegister,
            (false, _) => NavAction::Next,
        };

        StepChrome {
            step,
            section,
            title_key: format!("steps.{section}.title"),
            subtitle_key: format!("steps.{section}.subtitle"),
            ordinal: format!("step {step} of {TOTAL_STEPS}"),
            back_enabled: !step.is_first() && !loading,
            action,
            action_enabled: !loading,
        }
    }

    /// Goes back one step; a no-op on step 1.
    pub async fn back(&self) -> StepCursor {
        let from = self.inner.store.step();
        let to = self.inner.store.previous_step().await;
        if from != to {
            self.emit(WizardEvent::StepChanged { from, to });
        }
        to
    }

    /// Advances after `readiness` agrees, or runs the submit protocol on the terminal step.
    pub async fn next(&self, mut readiness: impl ReadinessCheck) -> NextOutcome {
        let from = self.inner.store.step();
        if from.is_last() {
            return NextOutcome::Submit(self.submit().await);
        }

        if !readiness.is_ready().await {
            debug!(step = %from, "Step not ready, staying");
            return NextOutcome::NotReady;
        }

        let to = self.inner.store.next_step().await;
        if from != to {
            self.emit(WizardEvent::StepChanged { from, to });
        }
        NextOutcome::Advanced(to)
    }

    /// Validates through the bridge, assembles the payload and sends it exactly once.
    ///
    /// Only an accepted submission clears the draft; every other outcome leaves it intact.
    #[instrument(skip(self), fields(signature = %self.inner.context.signature, locale = %self.inner.context.locale))]
    pub async fn submit(&self) -> SubmitOutcome {
        let step = self.inner.store.step();
        if !step.is_last() {
            warn!(step = %step, "Submit requested before the terminal step");
            return SubmitOutcome::NotOnTerminalStep { step };
        }

        let Some(_loading) = LoadingGuard::acquire(&self.inner.loading) else {
            debug!("Submission already in flight");
            return SubmitOutcome::Busy;
        };
        self.emit(WizardEvent::Submitting);

        if self.inner.bridge.request().await == Verdict::Invalid {
            info!("Terminal step is invalid, submission aborted");
            self.emit(WizardEvent::SubmitFailed { code: "invalid", message: None });
            return SubmitOutcome::Invalid;
        }

        let payload = assemble(&self.inner.store.flattened());
        debug!(
            text = payload.text_entries().count(),
            files = payload.file_parts().count(),
            "Payload assembled"
        );

        match self.inner.gateway.submit(payload, &self.inner.context).await {
            Ok(response) if response.success => {
                self.inner.store.reset_form().await;
                info!(redirect = %self.inner.redirect, "Registration submitted");
                let redirect = self.inner.redirect.clone();
                self.emit(WizardEvent::Submitted { redirect: redirect.clone(), message: response.message.clone() });
                SubmitOutcome::Submitted { redirect, message: response.message }
            },
            Ok(response) => {
                let code = if response.is_rate_limited() { "rate_limited" } else { "rejected" };
                warn!(code, status = ?response.status, message = ?response.message, "Registration rejected");
                self.emit(WizardEvent::SubmitFailed { code, message: response.message.clone() });
                SubmitOutcome::Rejected(response)
            },
            Err(e) => {
                warn!(error = %e, code = e.code(), "Registration submission failed");
                self.emit(WizardEvent::SubmitFailed { code: e.code(), message: Some(e.to_string()) });
                SubmitOutcome::Failed { code: e.code(), message: e.to_string() }
            },
        }
    }

    fn emit(&self, event: WizardEvent) {
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_the_action() {
        assert_eq!(NavAction::Next.label_key(), "next");
        assert_eq!(NavAction::CompleteRegister.label_key(), "completeRegister");
        assert_eq!(NavAction::Submitting.label_key(), "submitting");
    }

    #[test]
    fn loading_guard_is_exclusive_and_released_on_drop() {
        let flag = AtomicBool::new(false);
        let first = LoadingGuard::acquire(&flag);
        assert!(first.is_some());
        assert!(LoadingGuard::acquire(&flag).is_none());

        drop(first);
        assert!(!flag.load(Ordering::Acquire));
        assert!(LoadingGuard::acquire(&flag).is_some());
    }
}
