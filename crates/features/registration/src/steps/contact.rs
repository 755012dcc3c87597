use super::{ReadinessCheck, StepUnit};
use crate::attachment::{AttachmentInput, AttachmentPipeline, FileRejection};
use crate::field::{AttachmentField, Section, TextField};
use crate::schema::{FieldRules, Rule, StepSchema};
use crate::store::DraftWriter;
use mkp_storage::KeyValueStore;
use regex::Regex;
use std::sync::LazyLock;

static HOTLINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^1\d{4}$").expect("valid hotline pattern"));
static MOBILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^01[0125]\d{8}$").expect("valid mobile pattern"));

/// Step 3: contact channels and the optional company logo.
#[derive(Debug)]
pub struct ContactStep<S> {
    unit: StepUnit<S>,
    pipeline: AttachmentPipeline,
}

impl<S: KeyValueStore> ContactStep<S> {
    #[must_use]
    pub fn schema() -> StepSchema {
        StepSchema::new(Section::Contact)
            .field(
                FieldRules::text(TextField::Hotline)
                    .required("validation.hotline_invalid")
                    .rule(Rule::Pattern(&HOTLINE), "validation.hotline_invalid"),
            )
            .field(
                FieldRules::text(TextField::PhoneNumber)
                    .required("validation.phone_invalid")
                    .rule(Rule::Pattern(&MOBILE), "validation.phone_invalid"),
            )
            .field(FieldRules::text(TextField::Website).rule(Rule::Url, "validation.url_invalid"))
    }

    #[must_use]
    pub fn mount(draft: DraftWriter<S>, pipeline: AttachmentPipeline) -> Self {
        Self { unit: StepUnit::mount(Self::schema(), draft), pipeline }
    }

    /// Hotline and phone are digit-normalized before they are stored.
    pub async fn set(&mut self, field: TextField, value: &str) {
        self.unit.set_text(field, value).await;
    }

    /// Picks (or with `None` clears) the company logo.
    ///
    /// # Errors
    /// Returns the [`FileRejection`] when the file fails pre-validation.
    pub async fn select_logo(&mut self, input: Option<AttachmentInput>) -> Result<(), FileRejection> {
        self.unit.select_file(&self.pipeline, AttachmentField::CompanyLogo, input).await
    }

    #[must_use]
    pub const fn unit(&self) -> &StepUnit<S> {
        &self.unit
    }

    pub fn unit_mut(&mut self) -> &mut StepUnit<S> {
        &mut self.unit
    }
}

impl<S: KeyValueStore> ReadinessCheck for ContactStep<S> {
    async fn is_ready(&mut self) -> bool {
        self.unit.is_ready().await
    }
}
