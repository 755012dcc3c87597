use super::{ReadinessCheck, StepUnit};
use crate::attachment::{AttachmentInput, AttachmentPipeline, FileRejection};
use crate::field::{AttachmentField, Section};
use crate::schema::{FieldRules, StepSchema};
use crate::store::DraftWriter;
use mkp_storage::KeyValueStore;

/// Step 4: commercial registration and both sides of the tax card.
#[derive(Debug)]
pub struct DocumentsStep<S> {
    unit: StepUnit<S>,
    pipeline: AttachmentPipeline,
}

impl<S: KeyValueStore> DocumentsStep<S> {
    /// Missing scans report `validation.field_required`, not the security step's
    /// `validation.required_field`: each step keeps its own catalog key.
    #[must_use]
    pub fn schema() -> StepSchema {
        StepSchema::new(Section::Documents)
            .field(FieldRules::attachment(AttachmentField::CommercialRegistrationImage).required("validation.field_required"))
            .field(FieldRules::attachment(AttachmentField::TaxCardFront).required("validation.field_required"))
            .field(FieldRules::attachment(AttachmentField::TaxCardBack).required("validation.field_required"))
    }

    #[must_use]
    pub fn mount(draft: DraftWriter<S>, pipeline: AttachmentPipeline) -> Self {
        Self { unit: StepUnit::mount(Self::schema(), draft), pipeline }
    }

    /// Picks (or with `None` clears) one of the document scans.
    ///
    /// # Errors
    /// Returns the [`FileRejection`] when the file fails pre-validation.
    pub async fn select(
        &mut self,
        field: AttachmentField,
        input: Option<AttachmentInput>,
    ) -> Result<(), FileRejection> {
        self.unit.select_file(&self.pipeline, field, input).await
    }

    #[must_use]
    pub const fn unit(&self) -> &StepUnit<S> {
        &self.unit
    }

    pub fn unit_mut(&mut self) -> &mut StepUnit<S> {
        &mut self.unit
    }
}

impl<S: KeyValueStore> ReadinessCheck for DocumentsStep<S> {
    async fn is_ready(&mut self) -> bool {
        self.unit.is_ready().await
    }
}
