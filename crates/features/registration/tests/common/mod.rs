#![allow(dead_code)]

use mkp_gateway::{
    GatewayError, GatewayResponse, RegistrationPayload, SubmissionContext, SubmissionGateway,
};
use mkp_kernel::domain::config::RegistrationConfig;
use mkp_registration::steps::CompanyType;
use mkp_registration::{
    AttachmentField, AttachmentInput, AttachmentPipeline, AttachmentPolicy, DataUrlRenderer,
    DraftStore, NextOutcome, StepCursor, TextField, Wizard,
};
use mkp_storage::KeyValueStore;
use parking_lot::Mutex;
use std::sync::Arc;

pub const MAX_FILE_BYTES: u64 = 1024;
pub const PASSWORD: &str = "Str0ng#Pass";

/// Gateway double that records every payload and answers with a scripted response.
#[derive(Debug, Clone)]
pub struct RecordingGateway {
    calls: Arc<Mutex<Vec<RegistrationPayload>>>,
    response: Arc<Mutex<GatewayResponse>>,
}

impl RecordingGateway {
    pub fn answering(response: GatewayResponse) -> Self {
        Self { calls: Arc::default(), response: Arc::new(Mutex::new(response)) }
    }

    pub fn accepting() -> Self {
        Self::answering(GatewayResponse::accepted(Some("created".to_owned())))
    }

    pub fn respond_with(&self, response: GatewayResponse) {
        *self.response.lock() = response;
    }

    pub fn calls(&self) -> Vec<RegistrationPayload> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl SubmissionGateway for RecordingGateway {
    async fn submit(
        &self,
        payload: RegistrationPayload,
        _context: &SubmissionContext,
    ) -> Result<GatewayResponse, GatewayError> {
        self.calls.lock().push(payload);
        Ok(self.response.lock().clone())
    }
}

pub fn pipeline() -> AttachmentPipeline {
    AttachmentPipeline::new(AttachmentPolicy::new(MAX_FILE_BYTES, ["image/png", "image/jpeg"]), DataUrlRenderer)
}

pub fn png(name: &str, size: usize) -> AttachmentInput {
    AttachmentInput::new(name, "image/png", vec![0x89_u8; size])
}

pub fn step(n: u8) -> StepCursor {
    StepCursor::new(n).unwrap()
}

pub async fn mount<S: KeyValueStore, G: SubmissionGateway>(backend: S, gateway: G) -> Wizard<S, G> {
    let store = DraftStore::open(backend).await.unwrap();
    Wizard::mount(store, gateway, pipeline(), SubmissionContext::default(), &RegistrationConfig::default())
}

/// Fills steps 1 to 5 with valid data and lands on step 6.
pub async fn fill_through_branch<S: KeyValueStore, G: SubmissionGateway>(wizard: &mut Wizard<S, G>, with_logo: bool) {
    wizard.company_type().select(CompanyType::Developer).await;
    assert_eq!(wizard.next().await, NextOutcome::Advanced(step(2)));

    let company = wizard.company();
    company.set(TextField::CompanyName, "Acme Developments").await;
    company.set(TextField::CommercialRegistrationId, "CR-2231").await;
    company.set(TextField::TaxId, "311-554-920").await;
    company.set(TextField::CompanyAddress, "12 Nile St, Cairo").await;
    assert_eq!(wizard.next().await, NextOutcome::Advanced(step(3)));

    let contact = wizard.contact();
    contact.set(TextField::Hotline, "19999").await;
    contact.set(TextField::PhoneNumber, "٠١٠١٢٣٤٥٦٧٨").await;
    contact.set(TextField::Website, "https://acme.example").await;
    if with_logo {
        contact.select_logo(Some(png("logo.png", 64))).await.unwrap();
    }
    assert_eq!(wizard.next().await, NextOutcome::Advanced(step(4)));

    let documents = wizard.documents();
    documents.select(AttachmentField::CommercialRegistrationImage, Some(png("cr.png", 128))).await.unwrap();
    documents.select(AttachmentField::TaxCardFront, Some(png("front.png", 96))).await.unwrap();
    documents.select(AttachmentField::TaxCardBack, Some(png("back.png", 96))).await.unwrap();
    assert_eq!(wizard.next().await, NextOutcome::Advanced(step(5)));

    let branch = wizard.branch();
    branch.set(TextField::BranchName, "Head Office").await;
    branch.set(TextField::BranchAddress, "12 Nile St, Cairo").await;
    branch.set(TextField::BranchEmail, "hq@acme.example").await;
    branch.set(TextField::BranchPhone, "0100 000 0000").await;
    assert_eq!(wizard.next().await, NextOutcome::Advanced(step(6)));
}

pub async fn fill_security<S: KeyValueStore, G: SubmissionGateway>(wizard: &Wizard<S, G>, accept_terms: bool) {
    let security = wizard.security();
    security.set(TextField::Email, "owner@acme.example").await;
    security.set(TextField::Password, PASSWORD).await;
    security.set(TextField::ConfirmPassword, PASSWORD).await;
    security.set_accept_terms(accept_terms).await;
}
