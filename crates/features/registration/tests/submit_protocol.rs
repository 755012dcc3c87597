mod common;

use common::*;
use mkp_gateway::{
    GatewayError, GatewayResponse, RegistrationPayload, SubmissionContext, SubmissionGateway,
};
use mkp_kernel::domain::config::RegistrationConfig;
use mkp_registration::{
    DraftStore, NavAction, Section, SectionPatch, StepController, SubmitOutcome, TextField, WizardEvent, bridge,
};
use mkp_storage::MemoryStore;
use std::time::Duration;
use tokio::time::Instant;

/// Answers like `inner`, after `delay`.
#[derive(Debug, Clone)]
struct SlowGateway {
    inner: RecordingGateway,
    delay: Duration,
}

impl SubmissionGateway for SlowGateway {
    async fn submit(
        &self,
        payload: RegistrationPayload,
        context: &SubmissionContext,
    ) -> Result<GatewayResponse, GatewayError> {
        tokio::time::sleep(self.delay).await;
        self.inner.submit(payload, context).await
    }
}

#[tokio::test(start_paused = true)]
async fn second_submit_during_flight_is_busy_and_sends_nothing() {
    let recorder = RecordingGateway::answering(GatewayResponse::rejected(Some("tax id taken".to_owned()), Some(422)));
    let gateway = SlowGateway { inner: recorder.clone(), delay: Duration::from_millis(200) };
    let mut wizard = mount(MemoryStore::new(), gateway).await;
    fill_through_branch(&mut wizard, false).await;
    fill_security(&wizard, true).await;

    let first = wizard.controller().clone();
    let second = wizard.controller().clone();

    let (in_flight, (chrome, busy)) = tokio::join!(first.submit(), async {
        while !second.is_loading() {
            tokio::task::yield_now().await;
        }
        (second.chrome(), second.submit().await)
    });

    assert_eq!(busy, SubmitOutcome::Busy);
    assert_eq!(chrome.action, NavAction::Submitting);
    assert!(!chrome.action_enabled);
    assert!(!chrome.back_enabled);
    assert!(matches!(in_flight, SubmitOutcome::Rejected(ref r) if r.status == Some(422)));
    assert_eq!(recorder.call_count(), 1);

    // The flag is released once the flight lands.
    assert!(!wizard.controller().is_loading());
    assert_eq!(wizard.chrome().action, NavAction::CompleteRegister);
    assert!(matches!(wizard.submit().await, SubmitOutcome::Rejected(_)));
    assert_eq!(recorder.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn silent_terminal_step_times_out_as_invalid() {
    let store = DraftStore::open(MemoryStore::new()).await.unwrap();
    for _ in 0..5 {
        store.next_step().await;
    }
    assert_eq!(store.step(), step(6));
    store.update_section(SectionPatch::new(Section::Security).text(TextField::Email, "owner@acme.example")).await;

    let timeout = Duration::from_secs(2);
    let (bridge, _responder) = bridge::channel(timeout);
    let gateway = RecordingGateway::accepting();
    let controller = StepController::new(
        store,
        gateway.clone(),
        bridge,
        SubmissionContext::default(),
        &RegistrationConfig::default(),
    );
    let mut events = controller.subscribe();

    let started = Instant::now();
    let outcome = controller.submit().await;

    assert_eq!(outcome, SubmitOutcome::Invalid);
    assert!(started.elapsed() >= timeout);
    assert!(!controller.is_loading());
    assert_eq!(controller.store().step(), step(6));
    assert_eq!(controller.store().flattened().text("email"), Some("owner@acme.example"));
    assert_eq!(gateway.call_count(), 0);

    assert_eq!(events.recv().await.unwrap(), WizardEvent::Submitting);
    assert_eq!(events.recv().await.unwrap(), WizardEvent::SubmitFailed { code: "invalid", message: None });
}
