use crate::attachment::AttachmentPipeline;
use crate::bridge;
use crate::controller::{NextOutcome, StepChrome, StepController, SubmitOutcome};
use crate::field::Section;
use crate::steps::{
    AlwaysReady, BranchStep, CompanyStep, CompanyTypeStep, ContactStep, DocumentsStep, SecurityStep,
};
use crate::store::{DraftStore, StepCursor};
use mkp_gateway::{SubmissionContext, SubmissionGateway};
use mkp_kernel::domain::config::RegistrationConfig;
use mkp_storage::KeyValueStore;
use tokio::task::JoinHandle;
use tracing::debug;

/// The mounted wizard: controller, six step units and the terminal step's bridge task.
///
/// Must be created inside a Tokio runtime. Dropping the wizard stops the bridge task.
#[derive(Debug)]
pub struct Wizard<S, G> {
    controller: StepController<S, G>,
    company_type: CompanyTypeStep<S>,
    company: CompanyStep<S>,
    contact: ContactStep<S>,
    documents: DocumentsStep<S>,
    branch: BranchStep<S>,
    security: SecurityStep<S>,
    responder: JoinHandle<()>,
}

impl<S, G> Wizard<S, G>
where
    S: KeyValueStore,
    G: SubmissionGateway,
{
    pub fn mount(
        store: DraftStore<S>,
        gateway: G,
        pipeline: AttachmentPipeline,
        context: SubmissionContext,
        config: &RegistrationConfig,
    ) -> Self {
        let (bridge, responder) = bridge::channel(config.bridge_timeout());
        let writer = store.writer();
        let security = SecurityStep::mount(writer.clone());
        let responder = tokio::spawn(security.clone().serve(responder));

        debug!(step = %store.step(), "Wizard mounted");
        Self {
            company_type: CompanyTypeStep::mount(writer.clone()),
            company: CompanyStep::mount(writer.clone()),
            contact: ContactStep::mount(writer.clone(), pipeline.clone()),
            documents: DocumentsStep::mount(writer.clone(), pipeline),
            branch: BranchStep::mount(writer),
            security,
            controller: StepController::new(store, gateway, bridge, context, config),
            responder,
        }
    }

    #[must_use]
    pub const fn controller(&self) -> &StepController<S, G> {
        &self.controller
    }

    #[must_use]
    pub fn step(&self) -> StepCursor {
        self.controller.store().step()
    }

    #[must_use]
    pub fn chrome(&self) -> StepChrome {
        self.controller.chrome()
    }

    pub fn company_type(&mut self) -> &mut CompanyTypeStep<S> {
        &mut self.company_type
    }

    pub fn company(&mut self) -> &mut CompanyStep<S> {
        &mut self.company
    }

    pub fn contact(&mut self) -> &mut ContactStep<S> {
        &mut self.contact
    }

    pub fn documents(&mut self) -> &mut DocumentsStep<S> {
        &mut self.documents
    }

    pub fn branch(&mut self) -> &mut BranchStep<S> {
        &mut self.branch
    }

    #[must_use]
    pub const fn security(&self) -> &SecurityStep<S> {
        &self.security
    }

    /// Primary action: asks the current step for readiness, or submits on the terminal step.
    pub async fn next(&mut self) -> NextOutcome {
        let outcome = match self.step().section() {
            Section::Type => self.controller.next(&mut self.company_type).await,
            Section::Company => self.controller.next(&mut self.company).await,
            Section::Contact => self.controller.next(&mut self.contact).await,
            Section::Documents => self.controller.next(&mut self.documents).await,
            Section::Branch => self.controller.next(&mut self.branch).await,
            Section::Security => self.controller.next(AlwaysReady).await,
        };

        match &outcome {
            NextOutcome::Advanced(_) => self.remount_current(),
            NextOutcome::Submit(submit) if submit.is_submitted() => self.remount_all(),
            _ => {},
        }
        outcome
    }

    pub async fn back(&mut self) -> StepCursor {
        let step = self.controller.back().await;
        self.remount_current();
        step
    }

    pub async fn submit(&mut self) -> SubmitOutcome {
        let outcome = self.controller.submit().await;
        if outcome.is_submitted() {
            self.remount_all();
        }
        outcome
    }

    /// Clears the draft and every step's local state.
    pub async fn reset(&mut self) {
        self.controller.store().reset_form().await;
        self.remount_all();
    }

    fn remount_current(&mut self) {
        match self.step().section() {
            Section::Type => self.company_type.unit_mut().remount(),
            Section::Company => self.company.unit_mut().remount(),
            Section::Contact => self.contact.unit_mut().remount(),
            Section::Documents => self.documents.unit_mut().remount(),
            Section::Branch => self.branch.unit_mut().remount(),
            Section::Security => self.security.remount(),
        }
    }

    fn remount_all(&mut self) {
        self.company_type.unit_mut().remount();
        self.company.unit_mut().remount();
        self.contact.unit_mut().remount();
        self.documents.unit_mut().remount();
        self.branch.unit_mut().remount();
        self.security.remount();
    }
}

impl<S, G> Drop for Wizard<S, G> {
    fn drop(&mut self) {
        self.responder.abort();
    }
}
