//! The six step units.
//!
//! Steps 1 to 5 wrap a [`StepUnit`]: local form state mirrored into the draft on every
//! change, with a [`ReadinessCheck`] the controller awaits before advancing. The terminal
//! [`SecurityStep`] answers through the validation bridge instead.

mod branch;
mod company;
mod company_type;
mod contact;
mod documents;
mod security;

pub use branch::BranchStep;
pub use company::CompanyStep;
pub use company_type::{CompanyType, CompanyTypeStep};
pub use contact::ContactStep;
pub use documents::DocumentsStep;
pub use security::{PasswordRequirement, SecurityStep};

use crate::attachment::{AttachmentInput, AttachmentPipeline, FileRejection};
use crate::field::{AttachmentField, Field, FlagField, Section, TextField};
use crate::schema::{StepForm, StepSchema};
use crate::store::DraftWriter;
use mkp_storage::KeyValueStore;
use std::future::Future;
use tracing::{debug, warn};

/// "May I advance?" asked by the controller before leaving a step.
pub trait ReadinessCheck: Send {
    fn is_ready(&mut self) -> impl Future<Output = bool> + Send;
}

/// Readiness for steps without a local schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysReady;

impl ReadinessCheck for AlwaysReady {
    async fn is_ready(&mut self) -> bool {
        true
    }
}

impl<R: ReadinessCheck> ReadinessCheck for &mut R {
    fn is_ready(&mut self) -> impl Future<Output = bool> + Send {
        (**self).is_ready()
    }
}

/// Form state of one step bound to the draft.
#[derive(Debug)]
pub struct StepUnit<S> {
    form: StepForm,
    draft: DraftWriter<S>,
}

impl<S: KeyValueStore> StepUnit<S> {
    /// Mounts the unit with values rehydrated from the draft.
    #[must_use]
    pub fn mount(schema: StepSchema, draft: DraftWriter<S>) -> Self {
        let section = schema.section();
        let mut form = StepForm::new(schema);
        form.load(draft.section(section));
        Self { form, draft }
    }

    /// Discards local state and reloads from the draft.
    pub fn remount(&mut self) {
        self.form.remount(self.draft.section(self.form.section()));
    }

    #[must_use]
    pub const fn section(&self) -> Section {
        self.form.section()
    }

    #[must_use]
    pub const fn form(&self) -> &StepForm {
        &self.form
    }

    #[must_use]
    pub fn error(&self, field: Field) -> Option<&'static str> {
        self.form.error(field)
    }

    pub async fn set_text(&mut self, field: TextField, value: &str) {
        let patch = self.form.set_text(field, value);
        if !patch.is_empty() {
            self.draft.update_section(patch).await;
        }
    }

    pub async fn set_flag(&mut self, field: FlagField, value: bool) {
        let patch = self.form.set_flag(field, value);
        if !patch.is_empty() {
            self.draft.update_section(patch).await;
        }
    }

    /// Pre-validates a picked file and stores it with its preview in one update.
    ///
    /// `None` clears the attachment and its preview.
    ///
    /// # Errors
    /// Returns the [`FileRejection`]; the draft keeps its previous value and the rejection is
    /// shown on the control.
    pub async fn select_file(
        &mut self,
        pipeline: &AttachmentPipeline,
        field: AttachmentField,
        input: Option<AttachmentInput>,
    ) -> Result<(), FileRejection> {
        if field.section() != self.section() {
            warn!(field = %field, section = %self.section(), "Attachment does not belong to this step");
            return Ok(());
        }

        let file = match input {
            Some(input) => match pipeline.accept(input).await {
                Ok(file) => Some(file),
                Err(rejection) => {
                    debug!(field = %field, code = rejection.code(), "File rejected");
                    self.form.reject(field, rejection.clone());
                    return Err(rejection);
                },
            },
            None => None,
        };

        let patch = self.form.set_attachment(field, file);
        self.draft.update_section(patch).await;
        Ok(())
    }
}

impl<S: KeyValueStore> ReadinessCheck for StepUnit<S> {
    async fn is_ready(&mut self) -> bool {
        let ready = self.form.check();
        debug!(section = %self.section(), ready, errors = self.form.visible_errors().count(), "Readiness checked");
        ready
    }
}
