mod common;

use common::*;
use mkp_gateway::{GatewayResponse, RateLimitedGateway, RateLimiter};
use mkp_kernel::domain::constants::DRAFT_STORAGE_KEY;
use mkp_registration::{
    AttachmentField, Field, FileRejection, FlagField, NavAction, NextOutcome, SubmitOutcome, TextField,
    WizardEvent,
};
use mkp_storage::{MemoryStore, StorageKey};
use std::time::Duration;

fn draft_key() -> StorageKey {
    StorageKey::from_static(DRAFT_STORAGE_KEY).unwrap()
}

#[tokio::test]
async fn valid_registration_is_sent_once_and_clears_the_draft() {
    let backend = MemoryStore::new();
    let gateway = RecordingGateway::accepting();
    let mut wizard = mount(backend.clone(), gateway.clone()).await;
    let mut events = wizard.controller().subscribe();

    fill_through_branch(&mut wizard, true).await;
    fill_security(&wizard, true).await;
    assert!(backend.contains(&draft_key()));
    assert_eq!(wizard.chrome().action, NavAction::CompleteRegister);

    let outcome = wizard.next().await;

    assert_eq!(
        outcome,
        NextOutcome::Submit(SubmitOutcome::Submitted {
            redirect: "/ar/login".to_owned(),
            message: Some("created".to_owned()),
        })
    );
    assert_eq!(gateway.call_count(), 1);

    let payload = &gateway.calls()[0];
    assert_eq!(payload.text("companyType"), Some("developer"));
    assert_eq!(payload.text("companyName"), Some("Acme Developments"));
    assert_eq!(payload.text("phoneNumber"), Some("01012345678"));
    assert_eq!(payload.text("branchPhone"), Some("01000000000"));
    assert_eq!(payload.text("email"), Some("owner@acme.example"));
    assert_eq!(payload.text("confirmPassword"), Some(PASSWORD));
    assert_eq!(payload.text("acceptTerms"), Some("true"));
    assert_eq!(payload.text("companyLogoPreview"), None);
    for part in ["logo", "commercial_registration_image", "tax_image", "tax_image_back"] {
        assert!(payload.file(part).is_some(), "missing part {part}");
    }
    assert_eq!(payload.file("logo").map(|f| f.bytes.len()), Some(64));

    assert!(!backend.contains(&draft_key()));
    assert!(!wizard.controller().store().has_data());
    assert_eq!(wizard.step(), step(1));
    assert!(!wizard.controller().is_loading());

    assert_eq!(events.recv().await.unwrap(), WizardEvent::StepChanged { from: step(1), to: step(2) });
    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert!(seen.contains(&WizardEvent::Submitting));
    assert!(seen.iter().any(|event| matches!(event, WizardEvent::Submitted { .. })));
}

#[tokio::test]
async fn unset_logo_is_left_out_of_the_payload() {
    let gateway = RecordingGateway::accepting();
    let mut wizard = mount(MemoryStore::new(), gateway.clone()).await;

    fill_through_branch(&mut wizard, false).await;
    fill_security(&wizard, true).await;
    assert!(wizard.submit().await.is_submitted());

    let payload = &gateway.calls()[0];
    assert!(payload.file("logo").is_none());
    assert_eq!(payload.file_parts().count(), 3);
}

#[tokio::test]
async fn oversized_logo_is_rejected_without_touching_the_draft() {
    let mut wizard = mount(MemoryStore::new(), RecordingGateway::accepting()).await;
    fill_through_branch(&mut wizard, true).await;
    assert_eq!(wizard.back().await, step(5));
    assert_eq!(wizard.back().await, step(4));
    assert_eq!(wizard.back().await, step(3));

    let before = wizard.controller().store().flattened();
    let contact = wizard.contact();
    let rejection = contact.select_logo(Some(png("huge.png", 4096))).await.unwrap_err();

    assert_eq!(rejection, FileRejection::TooLarge { size: 4096, max: MAX_FILE_BYTES });
    assert_eq!(
        contact.unit().error(Field::Attachment(AttachmentField::CompanyLogo)),
        Some("validation.file_too_large")
    );

    let after = wizard.controller().store().flattened();
    assert_eq!(after, before);
    let logo = after.attachment(AttachmentField::CompanyLogo).unwrap();
    assert_eq!(logo.file_name, "logo.png");
    assert!(after.preview(AttachmentField::CompanyLogo).is_some_and(|p| p.starts_with("data:image/png;base64,")));
}

#[tokio::test]
async fn wrong_type_is_rejected_before_size_on_an_empty_field() {
    let mut wizard = mount(MemoryStore::new(), RecordingGateway::accepting()).await;
    fill_through_branch(&mut wizard, false).await;

    let store = wizard.controller().store().clone();
    let rejection = wizard
        .contact()
        .select_logo(Some(mkp_registration::AttachmentInput::new("logo.gif", "image/gif", vec![0_u8; 4096])))
        .await
        .unwrap_err();

    assert_eq!(rejection.code(), "unsupported_type");
    assert!(store.flattened().attachment(AttachmentField::CompanyLogo).is_none());
    assert!(store.flattened().preview(AttachmentField::CompanyLogo).is_none());
}

#[tokio::test]
async fn unaccepted_terms_abort_before_the_network() {
    let gateway = RecordingGateway::accepting();
    let mut wizard = mount(MemoryStore::new(), gateway.clone()).await;
    fill_through_branch(&mut wizard, true).await;
    fill_security(&wizard, false).await;

    let outcome = wizard.next().await;

    assert_eq!(outcome, NextOutcome::Submit(SubmitOutcome::Invalid));
    assert_eq!(gateway.call_count(), 0);
    assert!(!wizard.controller().is_loading());
    assert_eq!(wizard.step(), step(6));
    assert!(wizard.controller().store().has_data());
    assert_eq!(
        wizard.security().error(Field::Flag(FlagField::AcceptTerms)),
        Some("validation.must_accept_terms")
    );
}

#[tokio::test]
async fn rate_limited_submission_keeps_the_draft_and_recovers_after_the_window() {
    let upstream = RecordingGateway::answering(GatewayResponse::rejected(Some("tax id taken".to_owned()), Some(422)));
    let limiter = RateLimiter::new("market_place_admin_panel", 1, Duration::from_millis(200), 64);
    let gateway = RateLimitedGateway::new(upstream.clone(), limiter, "register");
    let backend = MemoryStore::new();
    let mut wizard = mount(backend.clone(), gateway).await;
    fill_through_branch(&mut wizard, true).await;
    fill_security(&wizard, true).await;

    let first = wizard.submit().await;
    assert!(matches!(first, SubmitOutcome::Rejected(ref r) if r.status == Some(422)));

    let second = wizard.submit().await;
    let SubmitOutcome::Rejected(limited) = second.clone() else {
        panic!("expected a rejection, got {second:?}");
    };
    assert!(limited.is_rate_limited());
    assert_eq!(limited.message.as_deref(), Some("حدث خطأ، برجاء المحاولة لاحقاً."));
    assert_eq!(upstream.call_count(), 1);
    assert!(backend.contains(&draft_key()));
    assert_eq!(wizard.step(), step(6));
    assert!(!wizard.controller().is_loading());

    tokio::time::sleep(Duration::from_millis(400)).await;
    upstream.respond_with(GatewayResponse::accepted(None));

    assert!(wizard.submit().await.is_submitted());
    assert_eq!(upstream.call_count(), 2);
}

#[tokio::test]
async fn failed_readiness_keeps_the_cursor_and_shows_errors() {
    let mut wizard = mount(MemoryStore::new(), RecordingGateway::accepting()).await;

    assert_eq!(wizard.next().await, NextOutcome::NotReady);
    assert_eq!(wizard.step(), step(1));
    assert_eq!(wizard.company_type().error(), Some("step1.please_select"));

    wizard.company_type().select(mkp_registration::steps::CompanyType::Broker).await;
    assert_eq!(wizard.next().await, NextOutcome::Advanced(step(2)));

    wizard.company().set(TextField::CompanyName, "Acme").await;
    assert_eq!(wizard.next().await, NextOutcome::NotReady);
    assert_eq!(wizard.step(), step(2));
    assert_eq!(
        wizard.company().unit().error(Field::Text(TextField::TaxId)),
        Some("validation.please_enter_tax_id")
    );
}

#[tokio::test]
async fn submit_outside_the_terminal_step_is_refused() {
    let gateway = RecordingGateway::accepting();
    let mut wizard = mount(MemoryStore::new(), gateway.clone()).await;

    assert_eq!(wizard.submit().await, SubmitOutcome::NotOnTerminalStep { step: step(1) });
    assert_eq!(gateway.call_count(), 0);
}

#[tokio::test]
async fn chrome_tracks_the_cursor() {
    let mut wizard = mount(MemoryStore::new(), RecordingGateway::accepting()).await;

    let chrome = wizard.chrome();
    assert_eq!(chrome.ordinal, "step 1 of 6");
    assert_eq!(chrome.title_key, "steps.type.title");
    assert!(!chrome.back_enabled);
    assert_eq!(chrome.action, NavAction::Next);

    assert_eq!(wizard.back().await, step(1));

    fill_through_branch(&mut wizard, false).await;
    let chrome = wizard.chrome();
    assert_eq!(chrome.ordinal, "step 6 of 6");
    assert_eq!(chrome.subtitle_key, "steps.security.subtitle");
    assert!(chrome.back_enabled);
    assert_eq!(chrome.action.label_key(), "completeRegister");
}
